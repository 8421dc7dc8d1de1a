// birdidq-core/src/domain/rule/catalog.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// Every rule type the validator understands. Anything else is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RuleType {
    #[serde(rename = "expect_column_to_exist")]
    ColumnToExist,
    #[serde(rename = "expect_column_values_to_not_be_null")]
    ValuesNotNull,
    #[serde(rename = "expect_column_values_to_be_null")]
    ValuesNull,
    #[serde(rename = "expect_column_values_to_be_unique")]
    ValuesUnique,
    #[serde(rename = "expect_column_values_to_be_between")]
    ValuesBetween,
    #[serde(rename = "expect_column_values_to_be_in_set")]
    ValuesInSet,
    #[serde(rename = "expect_column_values_to_not_be_in_set")]
    ValuesNotInSet,
    #[serde(rename = "expect_column_values_to_match_regex")]
    ValuesMatchRegex,
    #[serde(rename = "expect_column_values_to_not_match_regex")]
    ValuesNotMatchRegex,
    #[serde(rename = "expect_column_value_lengths_to_be_between")]
    ValueLengthsBetween,
    #[serde(rename = "expect_column_values_to_be_of_type")]
    ValuesOfType,
    #[serde(rename = "expect_column_min_to_be_between")]
    MinBetween,
    #[serde(rename = "expect_column_max_to_be_between")]
    MaxBetween,
    #[serde(rename = "expect_column_mean_to_be_between")]
    MeanBetween,
    #[serde(rename = "expect_column_distinct_values_to_be_in_set")]
    DistinctValuesInSet,
    #[serde(rename = "expect_column_unique_value_count_to_be_between")]
    UniqueValueCountBetween,
    #[serde(rename = "expect_table_row_count_to_be_between")]
    TableRowCountBetween,
    #[serde(rename = "expect_table_row_count_to_equal")]
    TableRowCountEqual,
    #[serde(rename = "expect_table_columns_to_match_ordered_list")]
    TableColumnsMatchOrderedList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Column,
    Number,
    Bool,
    Text,
    Regex,
    List,
    ColumnList,
    /// `mostly`: a fraction in `[0, 1]`.
    Fraction,
    /// Zero-based position: a non-negative whole number.
    Index,
}

#[derive(Debug, Clone, Copy)]
pub struct Param {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
}

const fn req(name: &'static str, kind: ParamKind) -> Param {
    Param {
        name,
        kind,
        required: true,
    }
}

const fn opt(name: &'static str, kind: ParamKind) -> Param {
    Param {
        name,
        kind,
        required: false,
    }
}

use ParamKind::*;

const COLUMN: Param = req("column", Column);
const MOSTLY: Param = opt("mostly", Fraction);
const MIN: Param = opt("min_value", Number);
const MAX: Param = opt("max_value", Number);
const STRICT_MIN: Param = opt("strict_min", Bool);
const STRICT_MAX: Param = opt("strict_max", Bool);
const COLUMN_INDEX: Param = opt("column_index", Index);
const VALUE_SET: Param = req("value_set", List);
const REGEX: Param = req("regex", Regex);
const TYPE: Param = req("type_", Text);
const VALUE: Param = req("value", Number);
const COLUMN_LIST: Param = req("column_list", ColumnList);

/// Accepted by every rule and dropped at binding time.
pub const PASSTHROUGH_PARAMS: [&str; 4] = ["result_format", "include_config", "catch_exceptions", "meta"];

impl RuleType {
    pub const ALL: [RuleType; 19] = [
        RuleType::ColumnToExist,
        RuleType::ValuesNotNull,
        RuleType::ValuesNull,
        RuleType::ValuesUnique,
        RuleType::ValuesBetween,
        RuleType::ValuesInSet,
        RuleType::ValuesNotInSet,
        RuleType::ValuesMatchRegex,
        RuleType::ValuesNotMatchRegex,
        RuleType::ValueLengthsBetween,
        RuleType::ValuesOfType,
        RuleType::MinBetween,
        RuleType::MaxBetween,
        RuleType::MeanBetween,
        RuleType::DistinctValuesInSet,
        RuleType::UniqueValueCountBetween,
        RuleType::TableRowCountBetween,
        RuleType::TableRowCountEqual,
        RuleType::TableColumnsMatchOrderedList,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RuleType::ColumnToExist => "expect_column_to_exist",
            RuleType::ValuesNotNull => "expect_column_values_to_not_be_null",
            RuleType::ValuesNull => "expect_column_values_to_be_null",
            RuleType::ValuesUnique => "expect_column_values_to_be_unique",
            RuleType::ValuesBetween => "expect_column_values_to_be_between",
            RuleType::ValuesInSet => "expect_column_values_to_be_in_set",
            RuleType::ValuesNotInSet => "expect_column_values_to_not_be_in_set",
            RuleType::ValuesMatchRegex => "expect_column_values_to_match_regex",
            RuleType::ValuesNotMatchRegex => "expect_column_values_to_not_match_regex",
            RuleType::ValueLengthsBetween => "expect_column_value_lengths_to_be_between",
            RuleType::ValuesOfType => "expect_column_values_to_be_of_type",
            RuleType::MinBetween => "expect_column_min_to_be_between",
            RuleType::MaxBetween => "expect_column_max_to_be_between",
            RuleType::MeanBetween => "expect_column_mean_to_be_between",
            RuleType::DistinctValuesInSet => "expect_column_distinct_values_to_be_in_set",
            RuleType::UniqueValueCountBetween => "expect_column_unique_value_count_to_be_between",
            RuleType::TableRowCountBetween => "expect_table_row_count_to_be_between",
            RuleType::TableRowCountEqual => "expect_table_row_count_to_equal",
            RuleType::TableColumnsMatchOrderedList => "expect_table_columns_to_match_ordered_list",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    /// Declared parameters, in positional order.
    pub fn params(self) -> &'static [Param] {
        match self {
            RuleType::ColumnToExist => &[COLUMN, COLUMN_INDEX],
            RuleType::ValuesNotNull | RuleType::ValuesNull | RuleType::ValuesUnique => {
                &[COLUMN, MOSTLY]
            }
            RuleType::ValuesBetween => &[COLUMN, MIN, MAX, STRICT_MIN, STRICT_MAX, MOSTLY],
            RuleType::ValuesInSet | RuleType::ValuesNotInSet => {
                &[COLUMN, VALUE_SET, MOSTLY]
            }
            RuleType::ValuesMatchRegex | RuleType::ValuesNotMatchRegex => {
                &[COLUMN, REGEX, MOSTLY]
            }
            RuleType::ValueLengthsBetween => &[COLUMN, MIN, MAX, MOSTLY],
            RuleType::ValuesOfType => &[COLUMN, TYPE, MOSTLY],
            RuleType::MinBetween | RuleType::MaxBetween | RuleType::MeanBetween => {
                &[COLUMN, MIN, MAX, STRICT_MIN, STRICT_MAX]
            }
            RuleType::DistinctValuesInSet => &[COLUMN, VALUE_SET],
            RuleType::UniqueValueCountBetween => &[COLUMN, MIN, MAX],
            RuleType::TableRowCountBetween => &[MIN, MAX],
            RuleType::TableRowCountEqual => &[VALUE],
            RuleType::TableColumnsMatchOrderedList => &[COLUMN_LIST],
        }
    }

    pub fn param(self, name: &str) -> Option<&'static Param> {
        self.params().iter().find(|p| p.name == name)
    }

    /// Rules that need at least one of `min_value` / `max_value`.
    pub fn needs_bound(self) -> bool {
        matches!(
            self,
            RuleType::ValuesBetween
                | RuleType::ValueLengthsBetween
                | RuleType::MinBetween
                | RuleType::MaxBetween
                | RuleType::MeanBetween
                | RuleType::UniqueValueCountBetween
                | RuleType::TableRowCountBetween
        )
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
