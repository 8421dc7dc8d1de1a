// birdidq-core/src/domain/outcome.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::domain::rule::Rule;

/// Why a single statement could not be registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Syntax,
    UnknownRule,
    InvalidArguments,
    UnknownColumn,
    Evaluation,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureKind::Syntax => "syntax",
            FailureKind::UnknownRule => "unknown rule",
            FailureKind::InvalidArguments => "invalid arguments",
            FailureKind::UnknownColumn => "unknown column",
            FailureKind::Evaluation => "evaluation",
        };
        f.write_str(label)
    }
}

/// Statement-level failure. Never propagated past the executor.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{kind}: {reason}")]
pub struct StatementError {
    pub kind: FailureKind,
    pub reason: String,
}

impl StatementError {
    pub fn new(kind: FailureKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }

    pub fn syntax(reason: impl Into<String>) -> Self {
        Self::new(FailureKind::Syntax, reason)
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::new(FailureKind::InvalidArguments, reason)
    }

    pub fn unknown_column(column: &str) -> Self {
        Self::new(
            FailureKind::UnknownColumn,
            format!("column '{column}' does not exist in the dataset"),
        )
    }
}

/// Verdict of one rule against one table snapshot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RuleResult {
    pub success: bool,
    #[serde(default)]
    pub observed_value: Option<serde_json::Value>,
    #[serde(default)]
    pub element_count: usize,
    #[serde(default)]
    pub unexpected_count: usize,
    #[serde(default)]
    pub unexpected_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub partial_unexpected_list: Vec<serde_json::Value>,
}

impl RuleResult {
    pub fn aggregate(success: bool, observed: serde_json::Value, element_count: usize) -> Self {
        Self {
            success,
            observed_value: Some(observed),
            element_count,
            ..Default::default()
        }
    }
}

/// Outcome of one attempted statement.
#[derive(Debug, Clone)]
pub enum RuleOutcome {
    Registered {
        statement: String,
        rule: Rule,
        result: RuleResult,
    },
    Failed {
        statement: String,
        error: StatementError,
    },
}

impl RuleOutcome {
    pub fn statement(&self) -> &str {
        match self {
            RuleOutcome::Registered { statement, .. } | RuleOutcome::Failed { statement, .. } => {
                statement
            }
        }
    }

    pub fn is_registered(&self) -> bool {
        matches!(self, RuleOutcome::Registered { .. })
    }
}

/// Per-statement breakdown of one execution.
#[derive(Debug, Clone, Default)]
pub struct ExecutionReport {
    pub suite_name: String,
    pub outcomes: Vec<RuleOutcome>,
}

impl ExecutionReport {
    pub fn registered(&self) -> impl Iterator<Item = &RuleOutcome> {
        self.outcomes.iter().filter(|o| o.is_registered())
    }

    pub fn failures(&self) -> impl Iterator<Item = &RuleOutcome> {
        self.outcomes.iter().filter(|o| !o.is_registered())
    }

    pub fn registered_count(&self) -> usize {
        self.registered().count()
    }

    pub fn failed_count(&self) -> usize {
        self.failures().count()
    }

    /// Some statements registered and some did not.
    pub fn is_partial(&self) -> bool {
        self.registered_count() > 0 && self.failed_count() > 0
    }

    pub fn failure_reasons(&self) -> Vec<String> {
        self.failures()
            .filter_map(|o| match o {
                RuleOutcome::Failed { statement, error } => Some(format!("{statement} -> {error}")),
                RuleOutcome::Registered { .. } => None,
            })
            .collect()
    }
}
