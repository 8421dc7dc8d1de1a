// birdidq-core/src/domain/rule/checks.rs

// Executable form of a rule, bound to a column position.
// Map checks test each value on its own, aggregate checks summarise the column.

use regex::Regex;
use serde_json::json;
use std::collections::{BTreeSet, HashMap, HashSet};

use crate::domain::outcome::RuleResult;
use crate::domain::rule::grammar::ArgValue;
use crate::domain::table::{Table, TypeFamily, Value};

const PARTIAL_UNEXPECTED_LIMIT: usize = 20;

/// A rule ready to run against a table snapshot.
pub trait Expectation: Send + Sync {
    fn evaluate(&self, table: &Table) -> RuleResult;
}

/// Per-value condition used by [`MapCheck`].
pub trait ValueCondition: Send + Sync {
    fn accepts(&self, value: &Value) -> bool;
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub strict_min: bool,
    pub strict_max: bool,
}

impl Bounds {
    pub fn exact(value: f64) -> Self {
        Self {
            min: Some(value),
            max: Some(value),
            ..Default::default()
        }
    }

    pub fn contains(&self, x: f64) -> bool {
        let above = match self.min {
            Some(min) if self.strict_min => x > min,
            Some(min) => x >= min,
            None => true,
        };
        let below = match self.max {
            Some(max) if self.strict_max => x < max,
            Some(max) => x <= max,
            None => true,
        };
        above && below
    }
}

// --- VALUE CONDITIONS ---

pub struct NotNull;

impl ValueCondition for NotNull {
    fn accepts(&self, value: &Value) -> bool {
        !value.is_null()
    }
}

pub struct IsNull;

impl ValueCondition for IsNull {
    fn accepts(&self, value: &Value) -> bool {
        value.is_null()
    }
}

pub struct InRange(pub Bounds);

impl ValueCondition for InRange {
    fn accepts(&self, value: &Value) -> bool {
        value.as_f64().is_some_and(|x| self.0.contains(x))
    }
}

pub struct LengthInRange(pub Bounds);

impl ValueCondition for LengthInRange {
    fn accepts(&self, value: &Value) -> bool {
        self.0.contains(value.to_text().chars().count() as f64)
    }
}

/// Set membership. A cell matches a member by canonical key or by text.
pub struct ValueSet {
    keys: HashSet<String>,
    texts: HashSet<String>,
}

impl ValueSet {
    pub fn new(members: &[ArgValue]) -> Self {
        let mut keys = HashSet::new();
        let mut texts = HashSet::new();
        for member in members {
            let value = arg_to_value(member);
            keys.insert(value.key());
            texts.insert(value.to_text());
        }
        Self { keys, texts }
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.keys.contains(&value.key()) || self.texts.contains(&value.to_text())
    }
}

pub struct InSet {
    pub set: ValueSet,
    pub negate: bool,
}

impl ValueCondition for InSet {
    fn accepts(&self, value: &Value) -> bool {
        self.set.contains(value) != self.negate
    }
}

pub struct MatchesRegex {
    pub regex: Regex,
    pub negate: bool,
}

impl ValueCondition for MatchesRegex {
    fn accepts(&self, value: &Value) -> bool {
        self.regex.is_match(&value.to_text()) != self.negate
    }
}

pub struct OfType(pub TypeFamily);

impl ValueCondition for OfType {
    fn accepts(&self, value: &Value) -> bool {
        value.family() == Some(self.0)
    }
}

// --- CHECKS ---

/// Tests every value of a column. Nulls are skipped unless `include_nulls` is set,
/// in which case they count like any other value (the null rules).
pub struct MapCheck {
    pub column: usize,
    pub condition: Box<dyn ValueCondition>,
    pub mostly: f64,
    pub include_nulls: bool,
}

impl Expectation for MapCheck {
    fn evaluate(&self, table: &Table) -> RuleResult {
        let mut considered = 0usize;
        let mut unexpected = Vec::new();
        for value in table.column_values(self.column) {
            if value.is_null() && !self.include_nulls {
                continue;
            }
            considered += 1;
            if !self.condition.accepts(value) {
                unexpected.push(value);
            }
        }
        map_result(table.row_count(), considered, &unexpected, self.mostly)
    }
}

pub struct Unique {
    pub column: usize,
    pub mostly: f64,
}

impl Expectation for Unique {
    fn evaluate(&self, table: &Table) -> RuleResult {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for value in table.column_values(self.column).filter(|v| !v.is_null()) {
            *counts.entry(value.key()).or_default() += 1;
        }
        let mut considered = 0usize;
        let mut unexpected = Vec::new();
        for value in table.column_values(self.column).filter(|v| !v.is_null()) {
            considered += 1;
            if counts.get(&value.key()).copied().unwrap_or(0) > 1 {
                unexpected.push(value);
            }
        }
        map_result(table.row_count(), considered, &unexpected, self.mostly)
    }
}

fn map_result(
    element_count: usize,
    considered: usize,
    unexpected: &[&Value],
    mostly: f64,
) -> RuleResult {
    let (success, percent) = if considered == 0 {
        (true, None)
    } else {
        let unexpected_ratio = unexpected.len() as f64 / considered as f64;
        (1.0 - unexpected_ratio >= mostly, Some(unexpected_ratio * 100.0))
    };
    RuleResult {
        success,
        observed_value: None,
        element_count,
        unexpected_count: unexpected.len(),
        unexpected_percent: percent,
        partial_unexpected_list: unexpected
            .iter()
            .take(PARTIAL_UNEXPECTED_LIMIT)
            .map(|v| v.to_json())
            .collect(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statistic {
    Min,
    Max,
    Mean,
}

/// Compares a column statistic against bounds. Fails when the column holds no numbers.
pub struct ColumnStatistic {
    pub column: usize,
    pub statistic: Statistic,
    pub bounds: Bounds,
}

impl Expectation for ColumnStatistic {
    fn evaluate(&self, table: &Table) -> RuleResult {
        let numbers: Vec<f64> = table
            .column_values(self.column)
            .filter_map(Value::as_f64)
            .collect();
        let observed = match self.statistic {
            _ if numbers.is_empty() => None,
            Statistic::Min => numbers.iter().copied().reduce(f64::min),
            Statistic::Max => numbers.iter().copied().reduce(f64::max),
            Statistic::Mean => Some(numbers.iter().sum::<f64>() / numbers.len() as f64),
        };
        match observed {
            Some(x) => RuleResult::aggregate(self.bounds.contains(x), json!(x), table.row_count()),
            None => RuleResult::aggregate(false, serde_json::Value::Null, table.row_count()),
        }
    }
}

pub struct DistinctInSet {
    pub column: usize,
    pub set: ValueSet,
}

impl Expectation for DistinctInSet {
    fn evaluate(&self, table: &Table) -> RuleResult {
        let mut seen = HashSet::new();
        let mut distinct = Vec::new();
        for value in table.column_values(self.column).filter(|v| !v.is_null()) {
            if seen.insert(value.key()) {
                distinct.push(value);
            }
        }
        let success = distinct.iter().all(|v| self.set.contains(v));
        let observed: BTreeSet<String> = distinct.iter().map(|v| v.to_text()).collect();
        RuleResult::aggregate(success, json!(observed), table.row_count())
    }
}

pub struct UniqueValueCount {
    pub column: usize,
    pub bounds: Bounds,
}

impl Expectation for UniqueValueCount {
    fn evaluate(&self, table: &Table) -> RuleResult {
        let distinct: HashSet<String> = table
            .column_values(self.column)
            .filter(|v| !v.is_null())
            .map(Value::key)
            .collect();
        let count = distinct.len();
        RuleResult::aggregate(self.bounds.contains(count as f64), json!(count), table.row_count())
    }
}

pub struct RowCount {
    pub bounds: Bounds,
}

impl Expectation for RowCount {
    fn evaluate(&self, table: &Table) -> RuleResult {
        let rows = table.row_count();
        RuleResult::aggregate(self.bounds.contains(rows as f64), json!(rows), rows)
    }
}

pub struct ColumnsMatch {
    pub expected: Vec<String>,
}

impl Expectation for ColumnsMatch {
    fn evaluate(&self, table: &Table) -> RuleResult {
        let actual = table.column_names();
        RuleResult::aggregate(actual == self.expected, json!(actual), table.row_count())
    }
}

/// Column presence, optionally at a fixed position.
pub struct ColumnExists {
    pub column: String,
    pub index: Option<usize>,
}

impl Expectation for ColumnExists {
    fn evaluate(&self, table: &Table) -> RuleResult {
        let found = table.column_index(&self.column);
        let success = match (found, self.index) {
            (Some(actual), Some(expected)) => actual == expected,
            (Some(_), None) => true,
            (None, _) => false,
        };
        RuleResult::aggregate(success, json!(found), table.row_count())
    }
}

pub fn arg_to_value(arg: &ArgValue) -> Value {
    match arg {
        ArgValue::None => Value::Null,
        ArgValue::Bool(b) => Value::Bool(*b),
        ArgValue::Int(i) => Value::Int(*i),
        ArgValue::Float(f) => Value::Float(*f),
        ArgValue::Str(s) => Value::Text(s.clone()),
        ArgValue::List(_) => Value::Text(arg.to_text()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::table::ColumnSchema;

    fn amounts(values: Vec<Value>) -> Table {
        Table::new("orders", vec![ColumnSchema::new("amount", "DOUBLE")])
            .with_rows(values.into_iter().map(|v| vec![v]).collect())
    }

    #[test]
    fn test_bounds_strictness() {
        let b = Bounds {
            min: Some(0.0),
            strict_min: true,
            ..Default::default()
        };
        assert!(!b.contains(0.0));
        assert!(b.contains(0.1));
        assert!(Bounds::default().contains(f64::MAX));
    }

    #[test]
    fn test_map_check_skips_nulls_and_honours_mostly() {
        let table = amounts(vec![
            Value::Float(5.0),
            Value::Null,
            Value::Float(-1.0),
            Value::Float(3.0),
            Value::Float(8.0),
        ]);
        let check = |mostly| MapCheck {
            column: 0,
            condition: Box::new(InRange(Bounds {
                min: Some(0.0),
                ..Default::default()
            })),
            mostly,
            include_nulls: false,
        };

        let strict = check(1.0).evaluate(&table);
        assert!(!strict.success);
        assert_eq!(strict.element_count, 5);
        assert_eq!(strict.unexpected_count, 1);
        assert_eq!(strict.unexpected_percent, Some(25.0));
        assert_eq!(strict.partial_unexpected_list, vec![json!(-1.0)]);

        assert!(check(0.75).evaluate(&table).success);
    }

    #[test]
    fn test_not_null_counts_every_row() {
        let table = amounts(vec![Value::Float(1.0), Value::Null]);
        let result = MapCheck {
            column: 0,
            condition: Box::new(NotNull),
            mostly: 1.0,
            include_nulls: true,
        }
        .evaluate(&table);
        assert!(!result.success);
        assert_eq!(result.unexpected_percent, Some(50.0));
    }

    #[test]
    fn test_map_check_on_empty_table_succeeds() {
        let result = MapCheck {
            column: 0,
            condition: Box::new(NotNull),
            mostly: 1.0,
            include_nulls: true,
        }
        .evaluate(&amounts(vec![]));
        assert!(result.success);
        assert_eq!(result.unexpected_percent, None);
    }

    #[test]
    fn test_unique_flags_every_duplicate() {
        let table = amounts(vec![Value::Int(1), Value::Float(1.0), Value::Int(2)]);
        let result = Unique {
            column: 0,
            mostly: 1.0,
        }
        .evaluate(&table);
        assert!(!result.success);
        assert_eq!(result.unexpected_count, 2);
    }

    #[test]
    fn test_statistics() {
        let table = amounts(vec![Value::Int(2), Value::Float(4.0), Value::Null]);
        let stat = |statistic, min| ColumnStatistic {
            column: 0,
            statistic,
            bounds: Bounds {
                min: Some(min),
                ..Default::default()
            },
        };
        let mean = stat(Statistic::Mean, 3.0).evaluate(&table);
        assert!(mean.success);
        assert_eq!(mean.observed_value, Some(json!(3.0)));
        assert!(!stat(Statistic::Min, 3.0).evaluate(&table).success);
        assert!(stat(Statistic::Max, 3.0).evaluate(&table).success);

        let empty = stat(Statistic::Mean, 0.0).evaluate(&amounts(vec![Value::Null]));
        assert!(!empty.success);
        assert_eq!(empty.observed_value, Some(serde_json::Value::Null));
    }

    #[test]
    fn test_set_membership_matches_by_text() {
        let set = ValueSet::new(&[ArgValue::Int(1), ArgValue::Str("A".into())]);
        assert!(set.contains(&Value::Text("1".into())));
        assert!(set.contains(&Value::Float(1.0)));
        assert!(set.contains(&Value::Text("A".into())));
        assert!(!set.contains(&Value::Text("a".into())));
    }

    #[test]
    fn test_regex_uses_search_semantics() {
        let cond = MatchesRegex {
            regex: Regex::new(r"\d").unwrap(),
            negate: true,
        };
        assert!(!cond.accepts(&Value::Text("12 Main St".into())));
        assert!(cond.accepts(&Value::Text("Main St".into())));
    }

    #[test]
    fn test_column_exists_with_index() {
        let table = amounts(vec![]);
        let at = |index| ColumnExists {
            column: "amount".into(),
            index,
        };
        assert!(at(Some(0)).evaluate(&table).success);
        assert!(!at(Some(1)).evaluate(&table).success);
        let missing = ColumnExists {
            column: "price".into(),
            index: None,
        };
        assert!(!missing.evaluate(&table).success);
    }
}
