// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Maps raw text or HTML from an external source to a structured outcome.
//!
//! Classification is pure: markup is stripped, the text is lower-cased, and
//! an ordered rule list is walked until the first match. Rules flagged for
//! detail extraction additionally pull a free-text reason and the first
//! `DD.MM.YYYY` date out of the original text. No match yields the
//! classifier's conservative default.

pub mod classifier;
pub mod extract;
pub mod rules;

pub use classifier::{Classification, ClassificationRule, Pattern, ResponseClassifier};
pub use extract::{DetailExtractor, extract_expiry, extract_inn, strip_markup};
pub use rules::document::{
    DocumentOutcome, patent_classifier, residence_permit_classifier, work_permit_classifier,
};
pub use rules::entry_ban::{BanType, EntryBanOutcome, entry_ban_classifier};
pub use rules::inn::{InnOutcome, inn_classifier};
