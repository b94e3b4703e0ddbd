//! Per-field record validation.
//!
//! Every rule is checked against every record; a record with any failing
//! rule goes to `invalid` with all of its messages. Other records are not
//! affected.

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::Record;
use crate::error::LabelError;

/// Constraints on one field. Lengths count characters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRule {
    pub field: String,
    #[serde(default)]
    pub required: bool,
    /// Regular expression the whole value must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

impl FieldRule {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ..Default::default()
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn min_length(mut self, n: usize) -> Self {
        self.min_length = Some(n);
        self
    }

    pub fn max_length(mut self, n: usize) -> Self {
        self.max_length = Some(n);
        self
    }
}

/// A record that failed one or more rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidRecord {
    pub record: Record,
    pub errors: Vec<String>,
}

/// Outcome of validating a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub valid: Vec<Record>,
    pub invalid: Vec<InvalidRecord>,
    /// Total number of messages across all invalid records.
    pub error_count: usize,
}

impl ValidationReport {
    pub fn total(&self) -> usize {
        self.valid.len() + self.invalid.len()
    }

    pub fn is_clean(&self) -> bool {
        self.invalid.is_empty()
    }
}

/// A compiled rule set.
#[derive(Debug, Clone)]
pub struct Validator {
    rules: Vec<(FieldRule, Option<Regex>)>,
}

impl Validator {
    /// Compile `rules`. Patterns are anchored to the whole value.
    pub fn new(rules: Vec<FieldRule>) -> Result<Self, LabelError> {
        let rules = rules
            .into_iter()
            .map(|rule| {
                let regex = match &rule.pattern {
                    Some(p) => Some(Regex::new(&format!("^(?:{})$", p)).map_err(|e| {
                        LabelError::Import(format!("invalid pattern for '{}': {}", rule.field, e))
                    })?),
                    None => None,
                };
                Ok((rule, regex))
            })
            .collect::<Result<_, LabelError>>()?;
        Ok(Self { rules })
    }

    /// Messages for one record, empty when it passes.
    pub fn check(&self, record: &Record) -> Vec<String> {
        let mut errors = Vec::new();
        for (rule, regex) in &self.rules {
            let value = record.get(&rule.field).unwrap_or("").trim();
            if value.is_empty() {
                if rule.required {
                    errors.push(format!("{} is required", rule.field));
                }
                continue;
            }

            if let Some(regex) = regex
                && !regex.is_match(value)
            {
                errors.push(format!("{} has an invalid format", rule.field));
            }
            let len = value.chars().count();
            if let Some(min) = rule.min_length
                && len < min
            {
                errors.push(format!("{} must be at least {} characters", rule.field, min));
            }
            if let Some(max) = rule.max_length
                && len > max
            {
                errors.push(format!("{} must be at most {} characters", rule.field, max));
            }
        }
        errors
    }

    /// Partition `records` into valid and invalid.
    pub fn validate(&self, records: Vec<Record>) -> ValidationReport {
        let mut report = ValidationReport::default();
        for record in records {
            let errors = self.check(&record);
            if errors.is_empty() {
                report.valid.push(record);
            } else {
                report.error_count += errors.len();
                report.invalid.push(InvalidRecord { record, errors });
            }
        }
        report
    }
}
