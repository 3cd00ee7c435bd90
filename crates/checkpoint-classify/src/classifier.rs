// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generic first-match-wins classifier.

use chrono::NaiveDate;
use regex::Regex;

use crate::extract::{DetailExtractor, strip_markup};

/// What a rule looks for in the lower-cased text.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Plain substring, stored lower-cased.
    Contains(String),
    /// Regular expression, evaluated against the lower-cased text.
    Regex(Regex),
}

impl Pattern {
    pub fn contains(needle: &str) -> Self {
        Self::Contains(needle.to_lowercase())
    }

    pub fn regex(re: &Regex) -> Self {
        Self::Regex(re.clone())
    }

    pub fn matches(&self, normalized: &str) -> bool {
        match self {
            Self::Contains(needle) => normalized.contains(needle.as_str()),
            Self::Regex(re) => re.is_match(normalized),
        }
    }
}

/// One entry of an ordered rule table.
#[derive(Debug, Clone)]
pub struct ClassificationRule<O> {
    pub pattern: Pattern,
    pub outcome: O,
    /// Extract reason and expiry date when this rule matches.
    pub extract_details: bool,
}

impl<O> ClassificationRule<O> {
    pub fn new(pattern: Pattern, outcome: O) -> Self {
        Self {
            pattern,
            outcome,
            extract_details: false,
        }
    }

    pub fn with_details(mut self) -> Self {
        self.extract_details = true;
        self
    }
}

/// Outcome of classifying one payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification<O> {
    pub outcome: O,
    /// Index of the rule that matched; `None` means the default applied.
    pub matched_rule: Option<usize>,
    pub reason: Option<String>,
    pub expires_at: Option<NaiveDate>,
}

/// Ordered rule list plus a conservative default.
#[derive(Debug, Clone)]
pub struct ResponseClassifier<O> {
    rules: Vec<ClassificationRule<O>>,
    default: O,
    extractor: DetailExtractor,
}

impl<O: Clone> ResponseClassifier<O> {
    pub fn new(default: O) -> Self {
        Self {
            rules: Vec::new(),
            default,
            extractor: DetailExtractor::default(),
        }
    }

    /// Append a rule. Later rules only apply if no earlier rule matched.
    pub fn rule(mut self, rule: ClassificationRule<O>) -> Self {
        self.rules.push(rule);
        self
    }

    /// Append one rule per phrase, all mapping to `outcome`.
    pub fn phrases(mut self, phrases: &[&str], outcome: O, extract_details: bool) -> Self {
        for phrase in phrases {
            self.rules.push(ClassificationRule {
                pattern: Pattern::contains(phrase),
                outcome: outcome.clone(),
                extract_details,
            });
        }
        self
    }

    pub fn with_extractor(mut self, extractor: DetailExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn rules(&self) -> &[ClassificationRule<O>] {
        &self.rules
    }

    pub fn default_outcome(&self) -> &O {
        &self.default
    }

    /// Classify a raw payload (HTML or plain text).
    pub fn classify(&self, raw: &str) -> Classification<O> {
        self.classify_text(&strip_markup(raw))
    }

    /// Classify text that has already been stripped of markup.
    pub fn classify_text(&self, text: &str) -> Classification<O> {
        let normalized = text.to_lowercase();

        let Some((index, rule)) = self
            .rules
            .iter()
            .enumerate()
            .find(|(_, rule)| rule.pattern.matches(&normalized))
        else {
            return Classification {
                outcome: self.default.clone(),
                matched_rule: None,
                reason: None,
                expires_at: None,
            };
        };

        let (reason, expires_at) = if rule.extract_details {
            (self.extractor.reason(text), self.extractor.expiry(text))
        } else {
            (None, None)
        };

        Classification {
            outcome: rule.outcome.clone(),
            matched_rule: Some(index),
            reason,
            expires_at,
        }
    }
}
