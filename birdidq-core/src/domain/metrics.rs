// birdidq-core/src/domain/metrics.rs

use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::run::ValidationRun;

const TABLE_LEVEL: &str = "table-level";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Below 70% is high risk, up to 85% medium.
    pub fn from_success_rate(rate: f64) -> Self {
        if rate < 0.70 {
            RiskLevel::High
        } else if rate <= 0.85 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupMetrics {
    pub total_expectations: usize,
    pub successful_expectations: usize,
    pub exceptions: usize,
}

impl GroupMetrics {
    pub fn success_rate(&self) -> f64 {
        if self.total_expectations == 0 {
            return 0.0;
        }
        self.successful_expectations as f64 / self.total_expectations as f64
    }

    pub fn risk(&self) -> RiskLevel {
        RiskLevel::from_success_rate(self.success_rate())
    }

    fn record(&mut self, success: bool, exception: bool) {
        self.total_expectations += 1;
        self.successful_expectations += usize::from(success);
        self.exceptions += usize::from(exception);
    }
}

/// Aggregate quality over every stored validation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QualityMetrics {
    pub run_count: usize,
    pub overall: GroupMetrics,
    pub by_suite: BTreeMap<String, GroupMetrics>,
    pub by_type: BTreeMap<String, GroupMetrics>,
    pub by_column: BTreeMap<String, GroupMetrics>,
    pub first_run: Option<String>,
    pub last_run: Option<String>,
}

impl QualityMetrics {
    pub fn from_runs(runs: &[ValidationRun]) -> Self {
        let mut metrics = QualityMetrics {
            run_count: runs.len(),
            ..Default::default()
        };
        for run in runs {
            for eval in &run.results {
                let success = eval.success();
                let exception = eval.exception_info.is_some();
                metrics.overall.record(success, exception);
                metrics
                    .by_suite
                    .entry(run.suite_name.clone())
                    .or_default()
                    .record(success, exception);
                metrics
                    .by_type
                    .entry(eval.rule.rule_type.name().to_string())
                    .or_default()
                    .record(success, exception);
                metrics
                    .by_column
                    .entry(eval.rule.column().unwrap_or(TABLE_LEVEL).to_string())
                    .or_default()
                    .record(success, exception);
            }
        }
        metrics.first_run = runs.iter().map(|r| r.run_time).min().map(|t| t.to_rfc3339());
        metrics.last_run = runs.iter().map(|r| r.run_time).max().map(|t| t.to_rfc3339());
        metrics
    }

    pub fn is_empty(&self) -> bool {
        self.overall.total_expectations == 0
    }

    pub fn overall_success_rate(&self) -> f64 {
        self.overall.success_rate()
    }

    pub fn exception_rate(&self) -> f64 {
        if self.overall.total_expectations == 0 {
            return 0.0;
        }
        self.overall.exceptions as f64 / self.overall.total_expectations as f64
    }

    pub fn lowest_suite(&self) -> Option<(&str, &GroupMetrics)> {
        lowest(&self.by_suite)
    }

    pub fn lowest_type(&self) -> Option<(&str, &GroupMetrics)> {
        lowest(&self.by_type)
    }
}

fn lowest(groups: &BTreeMap<String, GroupMetrics>) -> Option<(&str, &GroupMetrics)> {
    groups
        .iter()
        .min_by(|a, b| a.1.success_rate().total_cmp(&b.1.success_rate()))
        .map(|(name, m)| (name.as_str(), m))
}
