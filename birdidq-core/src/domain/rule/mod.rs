// birdidq-core/src/domain/rule/mod.rs

pub mod catalog;
pub mod checks;
pub mod grammar;
pub mod notes;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::outcome::{FailureKind, StatementError};
use crate::domain::table::{Table, TypeFamily};

pub use catalog::{Param, ParamKind, RuleType, PASSTHROUGH_PARAMS};
pub use checks::{Bounds, Expectation};
pub use grammar::{parse_statement, ArgValue, GrammarError, Invocation, VALIDATOR_PREFIX};

use checks::{
    ColumnExists, ColumnStatistic, ColumnsMatch, DistinctInSet, InRange, InSet, IsNull,
    LengthInRange, MapCheck, MatchesRegex, NotNull, OfType, RowCount, Statistic, Unique,
    UniqueValueCount, ValueSet,
};

/// A validated rule: its type plus arguments keyed by parameter name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(rename = "expectation_type")]
    pub rule_type: RuleType,
    pub kwargs: BTreeMap<String, ArgValue>,
    /// Markdown note shown in the data docs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Rule {
    /// Parses and validates one statement.
    pub fn parse(statement: &str) -> Result<Self, StatementError> {
        let invocation =
            parse_statement(statement).map_err(|e| StatementError::syntax(e.to_string()))?;
        Self::from_invocation(invocation)
    }

    pub fn from_invocation(invocation: Invocation) -> Result<Self, StatementError> {
        let rule_type = RuleType::from_name(&invocation.name).ok_or_else(|| {
            StatementError::new(
                FailureKind::UnknownRule,
                format!("'{}' is not a supported rule", invocation.name),
            )
        })?;
        let params = rule_type.params();

        if invocation.positional.len() > params.len() {
            return Err(StatementError::invalid(format!(
                "{rule_type} takes at most {} positional argument(s), got {}",
                params.len(),
                invocation.positional.len()
            )));
        }

        let mut kwargs = BTreeMap::new();
        for (param, value) in params.iter().zip(invocation.positional) {
            kwargs.insert(param.name.to_string(), value);
        }

        for (key, value) in invocation.keywords {
            if PASSTHROUGH_PARAMS.contains(&key.as_str()) {
                continue;
            }
            if rule_type.param(&key).is_none() {
                return Err(StatementError::invalid(format!(
                    "unexpected argument '{key}' for {rule_type}"
                )));
            }
            if kwargs.contains_key(&key) {
                return Err(StatementError::invalid(format!(
                    "argument '{key}' given twice"
                )));
            }
            kwargs.insert(key, value);
        }

        // `None` on an optional parameter means "not set".
        kwargs.retain(|key, value| {
            !(matches!(value, ArgValue::None)
                && rule_type.param(key).is_some_and(|p| !p.required))
        });

        for param in params {
            match kwargs.get(param.name) {
                Some(value) => check_kind(param, value)?,
                None if param.required => {
                    return Err(StatementError::invalid(format!(
                        "missing required argument '{}'",
                        param.name
                    )));
                }
                None => {}
            }
        }

        let rule = Rule {
            rule_type,
            kwargs,
            notes: None,
        };
        rule.check_bounds()?;
        Ok(rule)
    }

    fn check_bounds(&self) -> Result<(), StatementError> {
        if !self.rule_type.needs_bound() {
            return Ok(());
        }
        let min = self.number("min_value");
        let max = self.number("max_value");
        match (min, max) {
            (None, None) => Err(StatementError::invalid(
                "at least one of 'min_value' or 'max_value' is required",
            )),
            (Some(lo), Some(hi)) if lo > hi => Err(StatementError::invalid(format!(
                "min_value ({lo}) is greater than max_value ({hi})"
            ))),
            _ => Ok(()),
        }
    }

    pub fn column(&self) -> Option<&str> {
        self.kwargs.get("column").and_then(ArgValue::as_str)
    }

    fn number(&self, key: &str) -> Option<f64> {
        self.kwargs.get(key).and_then(ArgValue::as_f64)
    }

    fn flag(&self, key: &str) -> bool {
        self.kwargs
            .get(key)
            .and_then(ArgValue::as_bool)
            .unwrap_or(false)
    }

    fn mostly(&self) -> f64 {
        self.number("mostly").unwrap_or(1.0)
    }

    fn bounds(&self) -> Bounds {
        Bounds {
            min: self.number("min_value"),
            max: self.number("max_value"),
            strict_min: self.flag("strict_min"),
            strict_max: self.flag("strict_max"),
        }
    }

    fn list(&self, key: &str) -> Result<&[ArgValue], StatementError> {
        match self.kwargs.get(key) {
            Some(ArgValue::List(items)) => Ok(items),
            _ => Err(StatementError::invalid(format!("'{key}' must be a list"))),
        }
    }

    fn text(&self, key: &str) -> Result<&str, StatementError> {
        self.kwargs
            .get(key)
            .and_then(ArgValue::as_str)
            .ok_or_else(|| StatementError::invalid(format!("'{key}' must be a string")))
    }

    /// Same type and arguments, notes aside.
    pub fn same_config(&self, other: &Rule) -> bool {
        self.rule_type == other.rule_type && self.kwargs == other.kwargs
    }

    /// Canonical statement, arguments in declaration order.
    pub fn to_statement(&self) -> String {
        let args: Vec<String> = self
            .rule_type
            .params()
            .iter()
            .filter_map(|p| self.kwargs.get(p.name).map(|v| format!("{}={v}", p.name)))
            .collect();
        format!("{VALIDATOR_PREFIX}{}({})", self.rule_type, args.join(", "))
    }

    /// Resolves the column against `table` and builds the executable check.
    pub fn bind(&self, table: &Table) -> Result<Box<dyn Expectation>, StatementError> {
        let rule_type = self.rule_type;

        let column = match (rule_type, self.column()) {
            (RuleType::ColumnToExist, _) | (_, None) => None,
            (_, Some(name)) => Some(
                table
                    .column_index(name)
                    .ok_or_else(|| StatementError::unknown_column(name))?,
            ),
        };
        let col = || {
            column.ok_or_else(|| {
                StatementError::new(FailureKind::Evaluation, format!("{rule_type} has no column"))
            })
        };

        let map = |condition: Box<dyn checks::ValueCondition>, include_nulls: bool| {
            Ok::<Box<dyn Expectation>, StatementError>(Box::new(MapCheck {
                column: col()?,
                condition,
                mostly: self.mostly(),
                include_nulls,
            }))
        };
        let statistic = |statistic| {
            Ok::<Box<dyn Expectation>, StatementError>(Box::new(ColumnStatistic {
                column: col()?,
                statistic,
                bounds: self.bounds(),
            }))
        };

        match rule_type {
            RuleType::ColumnToExist => Ok(Box::new(ColumnExists {
                column: self.text("column")?.to_string(),
                index: self.number("column_index").map(|i| i as usize),
            })),
            RuleType::ValuesNotNull => map(Box::new(NotNull), true),
            RuleType::ValuesNull => map(Box::new(IsNull), true),
            RuleType::ValuesUnique => Ok(Box::new(Unique {
                column: col()?,
                mostly: self.mostly(),
            })),
            RuleType::ValuesBetween => map(Box::new(InRange(self.bounds())), false),
            RuleType::ValuesInSet | RuleType::ValuesNotInSet => map(
                Box::new(InSet {
                    set: ValueSet::new(self.list("value_set")?),
                    negate: rule_type == RuleType::ValuesNotInSet,
                }),
                false,
            ),
            RuleType::ValuesMatchRegex | RuleType::ValuesNotMatchRegex => {
                let regex = Regex::new(self.text("regex")?).map_err(|e| {
                    StatementError::new(FailureKind::Evaluation, format!("invalid regex: {e}"))
                })?;
                map(
                    Box::new(MatchesRegex {
                        regex,
                        negate: rule_type == RuleType::ValuesNotMatchRegex,
                    }),
                    false,
                )
            }
            RuleType::ValueLengthsBetween => map(Box::new(LengthInRange(self.bounds())), false),
            RuleType::ValuesOfType => {
                let type_name = self.text("type_")?;
                let family = TypeFamily::from_type_name(type_name).ok_or_else(|| {
                    StatementError::invalid(format!("unknown type '{type_name}'"))
                })?;
                map(Box::new(OfType(family)), false)
            }
            RuleType::MinBetween => statistic(Statistic::Min),
            RuleType::MaxBetween => statistic(Statistic::Max),
            RuleType::MeanBetween => statistic(Statistic::Mean),
            RuleType::DistinctValuesInSet => Ok(Box::new(DistinctInSet {
                column: col()?,
                set: ValueSet::new(self.list("value_set")?),
            })),
            RuleType::UniqueValueCountBetween => Ok(Box::new(UniqueValueCount {
                column: col()?,
                bounds: self.bounds(),
            })),
            RuleType::TableRowCountBetween => Ok(Box::new(RowCount {
                bounds: self.bounds(),
            })),
            RuleType::TableRowCountEqual => {
                let value = self
                    .number("value")
                    .ok_or_else(|| StatementError::invalid("'value' must be a number"))?;
                Ok(Box::new(RowCount {
                    bounds: Bounds::exact(value),
                }))
            }
            RuleType::TableColumnsMatchOrderedList => Ok(Box::new(ColumnsMatch {
                expected: self
                    .list("column_list")?
                    .iter()
                    .map(ArgValue::to_text)
                    .collect(),
            })),
        }
    }
}

fn check_kind(param: &Param, value: &ArgValue) -> Result<(), StatementError> {
    let name = param.name;
    let ok = match param.kind {
        ParamKind::Column => value.as_str().is_some_and(|s| !s.is_empty()),
        ParamKind::Number => value.as_f64().is_some(),
        ParamKind::Bool => value.as_bool().is_some(),
        ParamKind::Text => value.as_str().is_some(),
        ParamKind::Regex => match value.as_str() {
            Some(pattern) => {
                return Regex::new(pattern)
                    .map(|_| ())
                    .map_err(|e| StatementError::invalid(format!("invalid regex for '{name}': {e}")));
            }
            None => false,
        },
        ParamKind::List => matches!(value, ArgValue::List(_)),
        ParamKind::ColumnList => match value {
            ArgValue::List(items) => items.iter().all(|i| i.as_str().is_some()),
            _ => false,
        },
        ParamKind::Fraction => value.as_f64().is_some_and(|x| (0.0..=1.0).contains(&x)),
        ParamKind::Index => value.as_f64().is_some_and(|x| x >= 0.0 && x.fract() == 0.0),
    };
    if ok {
        Ok(())
    } else {
        Err(StatementError::invalid(format!(
            "argument '{name}' has an invalid value: {value}"
        )))
    }
}
