// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Entry-ban rule table.
//!
//! Explicit "no ban" phrases come first so a page that says a ban is *not*
//! established never matches a ban keyword further down. Specific ban kinds
//! precede the generic "ban" wording. Unrecognized pages resolve to
//! [`EntryBanOutcome::NoBan`] rather than blocking the user.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::classifier::{ClassificationRule, Pattern, ResponseClassifier};

/// Legal basis of an entry ban.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BanType {
    Criminal,
    Administrative,
    Deportation,
    Sanitary,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryBanOutcome {
    NoBan,
    Ban(BanType),
}

const NO_BAN: &[&str] = &[
    "запрет не установлен",
    "запрет на въезд не установлен",
    "запрета нет",
    "запрета не имеется",
    "не выявлен",
    "данных нет",
    "нет данных",
    "сведения отсутствуют",
    "сведений не найдено",
    "информация отсутствует",
    "не найдено",
    "no entry ban",
    "not found",
];

const CRIMINAL: &[&str] = &["уголовн", "судимост", "criminal"];

const ADMINISTRATIVE: &[&str] = &[
    "административное выдворение",
    "административн",
    "выдворен",
    "administrative",
];

const DEPORTATION: &[&str] = &["депортац", "deport"];

const SANITARY: &[&str] = &["санитарн", "эпидемиолог", "sanitary"];

const OTHER: &[&str] = &[
    "нежелательн",
    "запрет на въезд",
    "въезд запрещен",
    "въезд запрещён",
    "въезд не разрешен",
    "entry ban",
];

static BANNED_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bban(?:ned)?\b").unwrap());

/// Ordered entry-ban classifier with the "no ban" default.
pub fn entry_ban_classifier() -> ResponseClassifier<EntryBanOutcome> {
    use EntryBanOutcome::{Ban, NoBan};

    ResponseClassifier::new(NoBan)
        .phrases(NO_BAN, NoBan, false)
        .phrases(CRIMINAL, Ban(BanType::Criminal), true)
        .phrases(ADMINISTRATIVE, Ban(BanType::Administrative), true)
        .phrases(DEPORTATION, Ban(BanType::Deportation), true)
        .phrases(SANITARY, Ban(BanType::Sanitary), true)
        .phrases(OTHER, Ban(BanType::Other), true)
        .rule(ClassificationRule::new(Pattern::regex(&BANNED_WORD), Ban(BanType::Other)).with_details())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn classify(text: &str) -> EntryBanOutcome {
        entry_ban_classifier().classify(text).outcome
    }

    #[test]
    fn known_phrases_map_to_expected_type() {
        let cases = [
            ("Данных нет", EntryBanOutcome::NoBan),
            ("Запрет не установлен", EntryBanOutcome::NoBan),
            ("Не разрешать въезд: уголовное преследование", EntryBanOutcome::Ban(BanType::Criminal)),
            ("Административное выдворение", EntryBanOutcome::Ban(BanType::Administrative)),
            ("Решение о депортации", EntryBanOutcome::Ban(BanType::Deportation)),
            ("Санитарно-эпидемиологические основания", EntryBanOutcome::Ban(BanType::Sanitary)),
            ("Пребывание признано нежелательным", EntryBanOutcome::Ban(BanType::Other)),
            ("Status: BANNED", EntryBanOutcome::Ban(BanType::Other)),
        ];
        for (text, expected) in cases {
            assert_eq!(classify(text), expected, "payload: {text}");
        }
    }

    #[test]
    fn no_ban_phrase_outranks_ban_keywords() {
        assert_eq!(
            classify("Запрет на въезд не установлен, уголовных дел нет"),
            EntryBanOutcome::NoBan
        );
    }

    #[test]
    fn specific_type_outranks_generic_ban() {
        assert_eq!(
            classify("Запрет на въезд. Основание: депортация"),
            EntryBanOutcome::Ban(BanType::Deportation)
        );
        assert_eq!(
            classify("Уголовная судимость, административное выдворение"),
            EntryBanOutcome::Ban(BanType::Criminal)
        );
    }

    #[test]
    fn unknown_page_defaults_to_no_ban() {
        let c = entry_ban_classifier().classify("<html><body>Сервис на обслуживании</body></html>");
        assert_eq!(c.outcome, EntryBanOutcome::NoBan);
        assert_eq!(c.matched_rule, None);
    }

    #[test]
    fn ban_extracts_reason_and_expiry() {
        let c = entry_ban_classifier()
            .classify("Запрет на въезд до: 31.12.2025. Причина: административное выдворение");
        assert_eq!(c.outcome, EntryBanOutcome::Ban(BanType::Administrative));
        assert_eq!(c.expires_at, NaiveDate::from_ymd_opt(2025, 12, 31));
        assert!(c.reason.unwrap().contains("административное выдворение"));
    }

    #[test]
    fn no_ban_carries_no_details() {
        let c = entry_ban_classifier().classify("Данных нет. Проверено 01.01.2025");
        assert_eq!(c.expires_at, None);
        assert_eq!(c.reason, None);
    }

    #[test]
    fn ban_type_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&BanType::Administrative).unwrap(),
            "\"administrative\""
        );
    }
}
