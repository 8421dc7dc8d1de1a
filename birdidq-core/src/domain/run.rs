// birdidq-core/src/domain/run.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::outcome::RuleResult;
use crate::domain::rule::Rule;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExceptionInfo {
    pub raised_exception: bool,
    pub exception_message: String,
}

/// One rule's verdict inside a checkpoint run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleEvaluation {
    #[serde(rename = "expectation_config")]
    pub rule: Rule,
    pub result: RuleResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception_info: Option<ExceptionInfo>,
}

impl RuleEvaluation {
    pub fn success(&self) -> bool {
        self.exception_info.is_none() && self.result.success
    }

    pub fn raised(rule: Rule, message: impl Into<String>) -> Self {
        Self {
            rule,
            result: RuleResult::default(),
            exception_info: Some(ExceptionInfo {
                raised_exception: true,
                exception_message: message.into(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RunStatistics {
    pub evaluated_expectations: usize,
    pub successful_expectations: usize,
    pub unsuccessful_expectations: usize,
    pub success_percent: Option<f64>,
}

impl RunStatistics {
    pub fn from_results(results: &[RuleEvaluation]) -> Self {
        let evaluated = results.len();
        let successful = results.iter().filter(|r| r.success()).count();
        Self {
            evaluated_expectations: evaluated,
            successful_expectations: successful,
            unsuccessful_expectations: evaluated - successful,
            success_percent: (evaluated > 0)
                .then(|| successful as f64 / evaluated as f64 * 100.0),
        }
    }
}

/// Result of a checkpoint: the whole suite evaluated against current data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRun {
    pub run_id: String,
    pub run_name: String,
    pub run_time: DateTime<Utc>,
    pub checkpoint_name: String,
    pub suite_name: String,
    pub data_asset: String,
    pub success: bool,
    pub results: Vec<RuleEvaluation>,
    pub statistics: RunStatistics,
}

impl ValidationRun {
    pub fn new(
        checkpoint_name: impl Into<String>,
        suite_name: impl Into<String>,
        data_asset: impl Into<String>,
        results: Vec<RuleEvaluation>,
    ) -> Self {
        let run_time = Utc::now();
        let statistics = RunStatistics::from_results(&results);
        Self {
            run_id: run_time.format("%Y%m%dT%H%M%S%.6fZ").to_string(),
            run_name: run_time.format("%Y%m%d-%H%M%S").to_string(),
            run_time,
            checkpoint_name: checkpoint_name.into(),
            suite_name: suite_name.into(),
            data_asset: data_asset.into(),
            success: statistics.unsuccessful_expectations == 0,
            results,
            statistics,
        }
    }
}
