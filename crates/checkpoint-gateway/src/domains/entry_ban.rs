// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Entry-ban check: is the person barred from entering the country?

use chrono::NaiveDate;
use checkpoint_classify::{BanType, EntryBanOutcome, ResponseClassifier, entry_ban_classifier};
use checkpoint_core::query::require_non_empty;
use checkpoint_core::{CheckpointError, DomainKind, VerificationQuery};
use serde::{Deserialize, Serialize};

use super::require_past_date;
use crate::domain::{Verdict, VerificationDomain};

/// Identity of the person being checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonQuery {
    pub surname: String,
    pub given_names: String,
    #[serde(default)]
    pub patronymic: Option<String>,
    pub birth_date: NaiveDate,
    #[serde(default)]
    pub citizenship: Option<String>,
}

impl VerificationQuery for PersonQuery {
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("surname", self.surname.clone()),
            ("given_names", self.given_names.clone()),
            ("patronymic", self.patronymic.clone().unwrap_or_default()),
            ("birth_date", self.birth_date.to_string()),
            ("citizenship", self.citizenship.clone().unwrap_or_default()),
        ]
    }

    fn validate(&self) -> Result<(), CheckpointError> {
        require_non_empty("surname", &self.surname)?;
        require_non_empty("givenNames", &self.given_names)?;
        require_past_date("birthDate", self.birth_date)
    }
}

/// Entry-ban status as reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "code",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum EntryBanStatus {
    NoBan,
    HasBan { ban_type: BanType },
    Unknown,
}

#[derive(Debug, Clone)]
pub struct EntryBanDomain {
    classifier: ResponseClassifier<EntryBanOutcome>,
}

impl Default for EntryBanDomain {
    fn default() -> Self {
        Self {
            classifier: entry_ban_classifier(),
        }
    }
}

impl EntryBanDomain {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VerificationDomain for EntryBanDomain {
    type Query = PersonQuery;
    type Status = EntryBanStatus;

    fn kind(&self) -> DomainKind {
        DomainKind::EntryBan
    }

    fn interpret(&self, raw: &str) -> Verdict<EntryBanStatus> {
        let classification = self.classifier.classify(raw);
        let status = match classification.outcome {
            EntryBanOutcome::NoBan => EntryBanStatus::NoBan,
            EntryBanOutcome::Ban(ban_type) => EntryBanStatus::HasBan { ban_type },
        };
        Verdict {
            status,
            reason: classification.reason,
            expires_at: classification.expires_at,
        }
    }

    fn degraded_status(&self) -> EntryBanStatus {
        EntryBanStatus::Unknown
    }
}
