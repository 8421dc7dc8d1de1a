// birdidq-core/src/domain/profiling.rs

// Data assistants: propose rules from the data itself, without a request.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::domain::error::DomainError;
use crate::domain::rule::{ArgValue, Invocation, Rule, RuleType};
use crate::domain::table::{Table, TypeFamily, Value};

/// Text columns with at most this many distinct values get a value-set rule.
const LOW_CARDINALITY: usize = 10;
/// Row-count range proposed around the observed count.
const ROW_COUNT_TOLERANCE: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataAssistant {
    Onboarding,
    Missingness,
}

impl DataAssistant {
    pub fn name(self) -> &'static str {
        match self {
            DataAssistant::Onboarding => "onboarding",
            DataAssistant::Missingness => "missingness",
        }
    }

    pub fn suite_name(self, asset: &str) -> String {
        format!("{asset}_{}_suite", self.name())
    }

    pub fn propose(self, table: &Table) -> Vec<Rule> {
        match self {
            DataAssistant::Onboarding => onboarding(table),
            DataAssistant::Missingness => missingness(table),
        }
    }
}

impl fmt::Display for DataAssistant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DataAssistant {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "onboarding" => Ok(DataAssistant::Onboarding),
            "missingness" => Ok(DataAssistant::Missingness),
            other => Err(DomainError::InvalidInput(format!(
                "unknown data assistant '{other}' (expected onboarding or missingness)"
            ))),
        }
    }
}

fn rule(rule_type: RuleType, args: Vec<(&str, ArgValue)>) -> Option<Rule> {
    Rule::from_invocation(Invocation {
        name: rule_type.name().to_string(),
        positional: Vec::new(),
        keywords: args.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
    })
    .ok()
}

fn col(name: &str) -> (&'static str, ArgValue) {
    ("column", ArgValue::Str(name.to_string()))
}

/// Non-null share rounded down to two decimals so the proposed rule holds today.
fn observed_mostly(non_null: usize, rows: usize) -> f64 {
    (non_null as f64 / rows as f64 * 100.0).floor() / 100.0
}

fn number(x: f64) -> ArgValue {
    if x.fract() == 0.0 && x.abs() < 9.0e15 {
        ArgValue::Int(x as i64)
    } else {
        ArgValue::Float(x)
    }
}

fn missingness(table: &Table) -> Vec<Rule> {
    let rows = table.row_count();
    if rows == 0 {
        return Vec::new();
    }
    table
        .columns
        .iter()
        .enumerate()
        .filter_map(|(idx, column)| {
            let non_null = table.column_values(idx).filter(|v| !v.is_null()).count();
            match non_null {
                0 => rule(RuleType::ValuesNull, vec![col(&column.name)]),
                n if n == rows => rule(RuleType::ValuesNotNull, vec![col(&column.name)]),
                n => rule(
                    RuleType::ValuesNotNull,
                    vec![
                        col(&column.name),
                        ("mostly", ArgValue::Float(observed_mostly(n, rows))),
                    ],
                ),
            }
        })
        .collect()
}

fn onboarding(table: &Table) -> Vec<Rule> {
    let rows = table.row_count();
    let mut rules = Vec::new();

    let low = (rows as f64 * (1.0 - ROW_COUNT_TOLERANCE)).floor();
    let high = (rows as f64 * (1.0 + ROW_COUNT_TOLERANCE)).ceil();
    rules.extend(rule(
        RuleType::TableRowCountBetween,
        vec![("min_value", number(low)), ("max_value", number(high))],
    ));
    rules.extend(rule(
        RuleType::TableColumnsMatchOrderedList,
        vec![(
            "column_list",
            ArgValue::List(
                table
                    .column_names()
                    .into_iter()
                    .map(ArgValue::Str)
                    .collect(),
            ),
        )],
    ));

    if rows == 0 {
        return rules;
    }

    rules.extend(missingness(table));

    for (idx, column) in table.columns.iter().enumerate() {
        let values: Vec<&Value> = table.column_values(idx).filter(|v| !v.is_null()).collect();
        if values.is_empty() {
            continue;
        }
        let family = TypeFamily::from_sql(&column.data_type);
        rules.extend(rule(
            RuleType::ValuesOfType,
            vec![
                col(&column.name),
                ("type_", ArgValue::Str(family_type_name(family).to_string())),
            ],
        ));

        let distinct: HashSet<String> = values.iter().map(|v| v.key()).collect();
        if distinct.len() == values.len() && values.len() > 1 {
            rules.extend(rule(RuleType::ValuesUnique, vec![col(&column.name)]));
        }

        let numbers: Vec<f64> = values.iter().filter_map(|v| v.as_f64()).collect();
        if matches!(family, TypeFamily::Integer | TypeFamily::Float) && !numbers.is_empty() {
            let min = numbers.iter().copied().fold(f64::INFINITY, f64::min);
            let max = numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            rules.extend(rule(
                RuleType::ValuesBetween,
                vec![
                    col(&column.name),
                    ("min_value", number(min)),
                    ("max_value", number(max)),
                ],
            ));
        } else if family == TypeFamily::Text
            && distinct.len() <= LOW_CARDINALITY
            && distinct.len() < values.len()
        {
            let mut seen = HashSet::new();
            let mut members: Vec<String> = values
                .iter()
                .map(|v| v.to_text())
                .filter(|t| seen.insert(t.clone()))
                .collect();
            members.sort();
            rules.extend(rule(
                RuleType::ValuesInSet,
                vec![
                    col(&column.name),
                    (
                        "value_set",
                        ArgValue::List(members.into_iter().map(ArgValue::Str).collect()),
                    ),
                ],
            ));
        }
    }
    rules
}

fn family_type_name(family: TypeFamily) -> &'static str {
    match family {
        TypeFamily::Integer => "int",
        TypeFamily::Float => "float",
        TypeFamily::Boolean => "bool",
        TypeFamily::Text => "str",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::table::ColumnSchema;

    fn customers() -> Table {
        Table::new(
            "customers",
            vec![
                ColumnSchema::new("id", "BIGINT"),
                ColumnSchema::new("country", "VARCHAR"),
                ColumnSchema::new("email", "VARCHAR"),
            ],
        )
        .with_rows(vec![
            vec![Value::Int(1), Value::Text("FR".into()), Value::Text("a@x.io".into())],
            vec![Value::Int(2), Value::Text("FR".into()), Value::Null],
            vec![Value::Int(3), Value::Text("SN".into()), Value::Text("c@x.io".into())],
        ])
    }

    fn types(rules: &[Rule]) -> Vec<RuleType> {
        rules.iter().map(|r| r.rule_type).collect()
    }

    #[test]
    fn test_missingness_uses_observed_share() {
        let rules = DataAssistant::Missingness.propose(&customers());
        assert_eq!(rules.len(), 3);
        assert_eq!(rules[2].column(), Some("email"));
        assert_eq!(rules[2].kwargs.get("mostly"), Some(&ArgValue::Float(0.66)));
        assert!(rules[0].kwargs.get("mostly").is_none());
    }

    #[test]
    fn test_onboarding_rules_hold_on_the_profiled_data() {
        let table = customers();
        let rules = DataAssistant::Onboarding.propose(&table);
        let kinds = types(&rules);
        assert!(kinds.contains(&RuleType::TableRowCountBetween));
        assert!(kinds.contains(&RuleType::ValuesUnique));
        assert!(kinds.contains(&RuleType::ValuesBetween));
        assert!(kinds.contains(&RuleType::ValuesInSet));

        for rule in &rules {
            let check = match rule.bind(&table) {
                Ok(check) => check,
                Err(e) => panic!("{} failed to bind: {e}", rule.to_statement()),
            };
            assert!(check.evaluate(&table).success, "{}", rule.to_statement());
        }
    }

    #[test]
    fn test_empty_table_yields_only_table_rules() {
        let empty = Table::new("empty", vec![ColumnSchema::new("id", "BIGINT")]);
        let rules = DataAssistant::Onboarding.propose(&empty);
        assert_eq!(
            types(&rules),
            vec![
                RuleType::TableRowCountBetween,
                RuleType::TableColumnsMatchOrderedList
            ]
        );
        assert!(DataAssistant::Missingness.propose(&empty).is_empty());
    }

    #[test]
    fn test_suite_name() -> anyhow::Result<()> {
        let assistant: DataAssistant = "Onboarding".parse()?;
        assert_eq!(assistant.suite_name("orders"), "orders_onboarding_suite");
        Ok(())
    }
}
