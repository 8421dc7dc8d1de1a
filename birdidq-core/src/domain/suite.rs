// birdidq-core/src/domain/suite.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::rule::Rule;

/// Suite used for rules written from natural-language requests.
pub fn suite_name_for(asset: &str) -> String {
    format!("{asset}_expectation_suite")
}

pub fn checkpoint_name_for(asset: &str) -> String {
    format!("{asset}_checkpoint")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    /// An identical rule was already present and has been replaced.
    Replaced,
}

/// Named, persisted collection of rules for one data asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationSuite {
    pub name: String,
    #[serde(default)]
    pub data_asset: Option<String>,
    #[serde(default, rename = "expectations")]
    pub rules: Vec<Rule>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ValidationSuite {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            data_asset: None,
            rules: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn for_asset(name: impl Into<String>, asset: impl Into<String>) -> Self {
        Self {
            data_asset: Some(asset.into()),
            ..Self::new(name)
        }
    }

    /// `<asset>_checkpoint` for the asset's request suite, `<suite>_checkpoint` for any other
    /// suite (assistant suites), so their runs stay apart.
    pub fn checkpoint_name(&self) -> String {
        match &self.data_asset {
            Some(asset) if self.name == suite_name_for(asset) => checkpoint_name_for(asset),
            _ => checkpoint_name_for(&self.name),
        }
    }

    pub fn add_rule(&mut self, rule: Rule) -> AddOutcome {
        self.updated_at = Utc::now();
        match self.rules.iter_mut().find(|r| r.same_config(&rule)) {
            Some(existing) => {
                *existing = rule;
                AddOutcome::Replaced
            }
            None => {
                self.rules.push(rule);
                AddOutcome::Added
            }
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_rule_replaces() {
        let mut suite = ValidationSuite::new(suite_name_for("orders"));
        let rule = Rule::parse("validator.expect_column_values_to_be_unique(column='id')").unwrap();
        assert_eq!(suite.add_rule(rule.clone()), AddOutcome::Added);

        let mut annotated = rule.clone();
        annotated.notes = Some("note".into());
        assert_eq!(suite.add_rule(annotated), AddOutcome::Replaced);
        assert_eq!(suite.len(), 1);
        assert_eq!(suite.rules[0].notes.as_deref(), Some("note"));

        let other =
            Rule::parse("validator.expect_column_values_to_be_unique(column='id', mostly=0.9)")
                .unwrap();
        assert_eq!(suite.add_rule(other), AddOutcome::Added);
        assert_eq!(suite.len(), 2);
        assert_eq!(suite.name, "orders_expectation_suite");
    }
}
