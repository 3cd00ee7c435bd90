// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Taxpayer number (INN) lookup by passport details.

use chrono::NaiveDate;
use checkpoint_classify::{InnOutcome, ResponseClassifier, extract_inn, inn_classifier, strip_markup};
use checkpoint_core::query::{require_document_code, require_non_empty};
use checkpoint_core::{CheckpointError, DomainKind, VerificationQuery};
use serde::{Deserialize, Serialize};

use super::require_past_date;
use crate::domain::{CheckedAtPolicy, Verdict, VerificationDomain};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InnQuery {
    pub surname: String,
    pub given_names: String,
    #[serde(default)]
    pub patronymic: Option<String>,
    pub birth_date: NaiveDate,
    pub passport_series: String,
    pub passport_number: String,
}

impl VerificationQuery for InnQuery {
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("surname", self.surname.clone()),
            ("given_names", self.given_names.clone()),
            ("patronymic", self.patronymic.clone().unwrap_or_default()),
            ("birth_date", self.birth_date.to_string()),
            ("passport_series", self.passport_series.clone()),
            ("passport_number", self.passport_number.clone()),
        ]
    }

    fn validate(&self) -> Result<(), CheckpointError> {
        require_non_empty("surname", &self.surname)?;
        require_non_empty("givenNames", &self.given_names)?;
        require_past_date("birthDate", self.birth_date)?;
        require_document_code("passportSeries", &self.passport_series)?;
        require_document_code("passportNumber", &self.passport_number)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "code",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum InnStatus {
    Found { inn: String },
    NotFound,
    Unknown,
}

/// The INN never changes once issued, so cached answers are served as if
/// freshly checked.
#[derive(Debug, Clone)]
pub struct InnDomain {
    classifier: ResponseClassifier<InnOutcome>,
}

impl Default for InnDomain {
    fn default() -> Self {
        Self {
            classifier: inn_classifier(),
        }
    }
}

impl InnDomain {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VerificationDomain for InnDomain {
    type Query = InnQuery;
    type Status = InnStatus;

    fn kind(&self) -> DomainKind {
        DomainKind::Inn
    }

    fn interpret(&self, raw: &str) -> Verdict<InnStatus> {
        let text = strip_markup(raw);
        let classification = self.classifier.classify_text(&text);
        let status = match classification.outcome {
            InnOutcome::Found => match extract_inn(&text) {
                Some(inn) => InnStatus::Found { inn },
                None => InnStatus::NotFound,
            },
            InnOutcome::NotFound => InnStatus::NotFound,
        };
        Verdict {
            status,
            reason: classification.reason,
            expires_at: None,
        }
    }

    fn degraded_status(&self) -> InnStatus {
        InnStatus::Unknown
    }

    fn checked_at_policy(&self) -> CheckedAtPolicy {
        CheckedAtPolicy::Refresh
    }
}
