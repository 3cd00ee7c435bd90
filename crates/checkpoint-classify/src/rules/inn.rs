// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! INN lookup rule table.

use crate::classifier::{ClassificationRule, Pattern, ResponseClassifier};
use crate::extract::LABELLED_INN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InnOutcome {
    /// The page names a taxpayer number; fetch it with [`extract_inn`](crate::extract_inn).
    Found,
    NotFound,
}

const NOT_FOUND: &[&str] = &[
    "не найден",
    "не найдена",
    "сведения не найдены",
    "нет данных",
    "данных нет",
    "not found",
];

/// Ordered INN classifier defaulting to "not found".
pub fn inn_classifier() -> ResponseClassifier<InnOutcome> {
    ResponseClassifier::new(InnOutcome::NotFound)
        .rule(ClassificationRule::new(
            Pattern::regex(&LABELLED_INN),
            InnOutcome::Found,
        ))
        .phrases(NOT_FOUND, InnOutcome::NotFound, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{extract_inn, strip_markup};

    #[test]
    fn labelled_number_is_found() {
        let text = strip_markup("<p>Ваш ИНН:</p><p><b>770123456789</b></p>");
        let c = inn_classifier().classify_text(&text);
        assert_eq!(c.outcome, InnOutcome::Found);
        assert_eq!(extract_inn(&text).as_deref(), Some("770123456789"));
    }

    #[test]
    fn unlabelled_number_is_not_enough() {
        assert_eq!(
            inn_classifier().classify("Заявка 770123456789 принята").outcome,
            InnOutcome::NotFound
        );
    }

    #[test]
    fn explicit_not_found() {
        let c = inn_classifier().classify("Информация об ИНН не найдена");
        assert_eq!(c.outcome, InnOutcome::NotFound);
        assert!(c.matched_rule.is_some());
    }

    #[test]
    fn found_rule_precedes_not_found_phrases() {
        assert_eq!(
            inn_classifier()
                .classify("ИНН 770123456789. Сведения о патенте не найдены")
                .outcome,
            InnOutcome::Found
        );
    }
}
