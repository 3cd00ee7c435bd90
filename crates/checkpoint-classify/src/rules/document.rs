// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rule tables for document validity checks (patent, work permit,
//! residence permit).
//!
//! Order: not found, expired, invalid, valid. "недействителен" contains
//! "действителен", so every negative form must come before the positive one.

use crate::classifier::ResponseClassifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentOutcome {
    Valid,
    Invalid,
    Expired,
    NotFound,
}

const NOT_FOUND: &[&str] = &[
    "не найден",
    "не найдено",
    "сведения отсутствуют",
    "нет данных",
    "данных нет",
    "not found",
];

const EXPIRED: &[&str] = &[
    "срок действия истек",
    "срок действия истёк",
    "истек срок",
    "истёк срок",
    "просрочен",
    "expired",
];

const INVALID: &[&str] = &[
    "недействител",
    "не действител",
    "аннулирован",
    "отозван",
    "приостановлен",
    "invalid",
    "revoked",
];

const VALID: &[&str] = &["действителен", "действительно", "действующ", "valid"];

fn document_classifier(extra_invalid: &[&str], extra_valid: &[&str]) -> ResponseClassifier<DocumentOutcome> {
    use DocumentOutcome::*;

    ResponseClassifier::new(NotFound)
        .phrases(NOT_FOUND, NotFound, false)
        .phrases(EXPIRED, Expired, true)
        .phrases(INVALID, Invalid, true)
        .phrases(extra_invalid, Invalid, true)
        .phrases(VALID, Valid, true)
        .phrases(extra_valid, Valid, true)
}

/// Labour patent validity.
pub fn patent_classifier() -> ResponseClassifier<DocumentOutcome> {
    document_classifier(&["оплата не поступала"], &["патент оплачен"])
}

/// Work permit validity.
pub fn work_permit_classifier() -> ResponseClassifier<DocumentOutcome> {
    document_classifier(&[], &["разрешение выдано"])
}

/// Residence permit (ВНЖ / РВП) application or document status.
pub fn residence_permit_classifier() -> ResponseClassifier<DocumentOutcome> {
    document_classifier(
        &["отказано", "отказ в выдаче"],
        &["принято положительное решение", "одобрено", "готово к выдаче"],
    )
}
