// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Document validity checks: labour patent, work permit, residence permit.
//!
//! The three share a status vocabulary and differ only in their query shape
//! and rule table.

use std::marker::PhantomData;

use chrono::{NaiveDate, Utc};
use checkpoint_classify::{
    DocumentOutcome, ResponseClassifier, patent_classifier, residence_permit_classifier,
    work_permit_classifier,
};
use checkpoint_core::query::require_document_code;
use checkpoint_core::{CheckpointError, DomainKind, VerificationQuery};
use serde::{Deserialize, Serialize};
use strum::Display;

use super::require_past_date;
use crate::domain::{Verdict, VerificationDomain};

/// Series and number of an issued document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentQuery {
    pub series: String,
    pub number: String,
    #[serde(default)]
    pub issue_date: Option<NaiveDate>,
}

pub type PatentQuery = DocumentQuery;
pub type WorkPermitQuery = DocumentQuery;

impl VerificationQuery for DocumentQuery {
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("series", self.series.clone()),
            ("number", self.number.clone()),
            (
                "issue_date",
                self.issue_date.map(|d| d.to_string()).unwrap_or_default(),
            ),
        ]
    }

    fn validate(&self) -> Result<(), CheckpointError> {
        require_document_code("series", &self.series)?;
        require_document_code("number", &self.number)?;
        if let Some(issued) = self.issue_date {
            require_past_date("issueDate", issued)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResidencePermitQuery {
    pub series: String,
    pub number: String,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
}

impl VerificationQuery for ResidencePermitQuery {
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("series", self.series.clone()),
            ("number", self.number.clone()),
            (
                "birth_date",
                self.birth_date.map(|d| d.to_string()).unwrap_or_default(),
            ),
        ]
    }

    fn validate(&self) -> Result<(), CheckpointError> {
        require_document_code("series", &self.series)?;
        require_document_code("number", &self.number)?;
        if let Some(born) = self.birth_date {
            require_past_date("birthDate", born)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    Valid,
    Invalid,
    Expired,
    NotFound,
    Error,
}

impl From<DocumentOutcome> for DocumentStatus {
    fn from(outcome: DocumentOutcome) -> Self {
        match outcome {
            DocumentOutcome::Valid => Self::Valid,
            DocumentOutcome::Invalid => Self::Invalid,
            DocumentOutcome::Expired => Self::Expired,
            DocumentOutcome::NotFound => Self::NotFound,
        }
    }
}

/// A document domain bound to its query type.
#[derive(Debug, Clone)]
pub struct DocumentDomain<Q> {
    kind: DomainKind,
    classifier: ResponseClassifier<DocumentOutcome>,
    _query: PhantomData<fn() -> Q>,
}

pub type PatentDomain = DocumentDomain<PatentQuery>;
pub type WorkPermitDomain = DocumentDomain<WorkPermitQuery>;
pub type ResidencePermitDomain = DocumentDomain<ResidencePermitQuery>;

impl<Q> DocumentDomain<Q> {
    fn with_classifier(kind: DomainKind, classifier: ResponseClassifier<DocumentOutcome>) -> Self {
        Self {
            kind,
            classifier,
            _query: PhantomData,
        }
    }
}

impl DocumentDomain<DocumentQuery> {
    pub fn patent() -> Self {
        Self::with_classifier(DomainKind::Patent, patent_classifier())
    }

    pub fn work_permit() -> Self {
        Self::with_classifier(DomainKind::WorkPermit, work_permit_classifier())
    }
}

impl DocumentDomain<ResidencePermitQuery> {
    pub fn residence_permit() -> Self {
        Self::with_classifier(DomainKind::ResidencePermit, residence_permit_classifier())
    }
}

impl<Q: VerificationQuery + 'static> VerificationDomain for DocumentDomain<Q> {
    type Query = Q;
    type Status = DocumentStatus;

    fn kind(&self) -> DomainKind {
        self.kind
    }

    fn interpret(&self, raw: &str) -> Verdict<DocumentStatus> {
        let classification = self.classifier.classify(raw);
        let mut status = DocumentStatus::from(classification.outcome);

        // A "valid" page quoting an end date that has already passed.
        if status == DocumentStatus::Valid
            && let Some(expires) = classification.expires_at
            && expires < Utc::now().date_naive()
        {
            status = DocumentStatus::Expired;
        }

        Verdict {
            status,
            reason: classification.reason,
            expires_at: classification.expires_at,
        }
    }

    fn degraded_status(&self) -> DocumentStatus {
        DocumentStatus::Error
    }
}
