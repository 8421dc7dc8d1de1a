// birdidq-core/src/domain/rule/notes.rs

// Markdown notes attached to registered rules and shown in the data docs.

use super::{ArgValue, Rule, RuleType};

/// Approximate SQL for a rule. Simplified on purpose: the checks run in memory.
pub fn sql_preview(rule: &Rule, table: &str) -> String {
    let column = rule.column().unwrap_or("*");
    let lo = bound(rule, "min_value", "MIN");
    let hi = bound(rule, "max_value", "MAX");
    let set = value_list(rule.kwargs.get("value_set"));
    let regex = rule
        .kwargs
        .get("regex")
        .map(ArgValue::to_text)
        .unwrap_or_default()
        .replace('\'', "''");

    match rule.rule_type {
        RuleType::ColumnToExist => format!(
            "SELECT column_name\nFROM information_schema.columns\nWHERE table_name = '{table}'\n  AND column_name = '{column}';"
        ),
        RuleType::ValuesNotNull => {
            format!("SELECT COUNT(*) AS null_count\nFROM {table}\nWHERE {column} IS NULL;")
        }
        RuleType::ValuesNull => {
            format!("SELECT COUNT(*) AS not_null_count\nFROM {table}\nWHERE {column} IS NOT NULL;")
        }
        RuleType::ValuesUnique => format!(
            "SELECT {column}, COUNT(*) AS duplicate_count\nFROM {table}\nGROUP BY {column}\nHAVING COUNT(*) > 1;"
        ),
        RuleType::ValuesBetween => format!(
            "SELECT COUNT(*) AS out_of_range_count\nFROM {table}\nWHERE {};",
            out_of_range(rule, column, &lo, &hi)
        ),
        RuleType::ValuesInSet => format!(
            "SELECT {column}, COUNT(*) AS invalid_count\nFROM {table}\nWHERE {column} NOT IN {set}\nGROUP BY {column};"
        ),
        RuleType::ValuesNotInSet => format!(
            "SELECT {column}, COUNT(*) AS forbidden_count\nFROM {table}\nWHERE {column} IN {set}\nGROUP BY {column};"
        ),
        RuleType::ValuesMatchRegex => format!(
            "SELECT {column}, COUNT(*) AS non_matching_count\nFROM {table}\nWHERE {column} !~ '{regex}'\nGROUP BY {column};"
        ),
        RuleType::ValuesNotMatchRegex => format!(
            "SELECT {column}, COUNT(*) AS matching_count\nFROM {table}\nWHERE {column} ~ '{regex}'\nGROUP BY {column};"
        ),
        RuleType::ValueLengthsBetween => format!(
            "SELECT COUNT(*) AS bad_length_count\nFROM {table}\nWHERE {};",
            out_of_range(rule, &format!("LENGTH({column})"), &lo, &hi)
        ),
        RuleType::ValuesOfType => format!(
            "SELECT data_type\nFROM information_schema.columns\nWHERE table_name = '{table}'\n  AND column_name = '{column}';"
        ),
        RuleType::MinBetween => aggregate("MIN", column, table, &expected(rule, &lo, &hi)),
        RuleType::MaxBetween => aggregate("MAX", column, table, &expected(rule, &lo, &hi)),
        RuleType::MeanBetween => aggregate("AVG", column, table, &expected(rule, &lo, &hi)),
        RuleType::DistinctValuesInSet => format!(
            "SELECT DISTINCT {column}\nFROM {table}\nWHERE {column} NOT IN {set};"
        ),
        RuleType::UniqueValueCountBetween => format!(
            "SELECT COUNT(DISTINCT {column}) AS unique_count\nFROM {table};\n-- expected {}",
            expected(rule, &lo, &hi)
        ),
        RuleType::TableRowCountBetween => format!(
            "SELECT COUNT(*) AS row_count\nFROM {table};\n-- expected {}",
            expected(rule, &lo, &hi)
        ),
        RuleType::TableRowCountEqual => format!(
            "SELECT COUNT(*) AS row_count\nFROM {table};\n-- expected = {}",
            bound(rule, "value", "N")
        ),
        RuleType::TableColumnsMatchOrderedList => format!(
            "SELECT column_name\nFROM information_schema.columns\nWHERE table_name = '{table}'\nORDER BY ordinal_position;"
        ),
    }
}

fn aggregate(func: &str, column: &str, table: &str, expected: &str) -> String {
    format!("SELECT {func}({column}) AS observed\nFROM {table};\n-- expected {expected}")
}

fn is_strict(rule: &Rule) -> bool {
    rule.flag("strict_min") || rule.flag("strict_max")
}

/// Condition selecting the rows outside the range. `BETWEEN` is inclusive, so strict
/// bounds are spelled out as comparisons.
fn out_of_range(rule: &Rule, expr: &str, lo: &str, hi: &str) -> String {
    if !is_strict(rule) {
        return format!("{expr} NOT BETWEEN {lo} AND {hi}");
    }
    let mut conditions = Vec::new();
    if rule.kwargs.contains_key("min_value") {
        let op = if rule.flag("strict_min") { "<=" } else { "<" };
        conditions.push(format!("{expr} {op} {lo}"));
    }
    if rule.kwargs.contains_key("max_value") {
        let op = if rule.flag("strict_max") { ">=" } else { ">" };
        conditions.push(format!("{expr} {op} {hi}"));
    }
    conditions.join(" OR ")
}

/// Accepted range, as shown after `-- expected`.
fn expected(rule: &Rule, lo: &str, hi: &str) -> String {
    if !is_strict(rule) {
        return format!("BETWEEN {lo} AND {hi}");
    }
    let mut parts = Vec::new();
    if rule.kwargs.contains_key("min_value") {
        let op = if rule.flag("strict_min") { ">" } else { ">=" };
        parts.push(format!("{op} {lo}"));
    }
    if rule.kwargs.contains_key("max_value") {
        let op = if rule.flag("strict_max") { "<" } else { "<=" };
        parts.push(format!("{op} {hi}"));
    }
    parts.join(" AND ")
}

fn bound(rule: &Rule, key: &str, placeholder: &str) -> String {
    rule.kwargs
        .get(key)
        .map(ArgValue::to_string)
        .unwrap_or_else(|| placeholder.to_string())
}

fn value_list(values: Option<&ArgValue>) -> String {
    let Some(ArgValue::List(items)) = values else {
        return "(...)".to_string();
    };
    let rendered: Vec<String> = items
        .iter()
        .map(|item| match item {
            ArgValue::Int(_) | ArgValue::Float(_) => item.to_string(),
            other => format!("'{}'", other.to_text().replace('\'', "''")),
        })
        .collect();
    format!("({})", rendered.join(", "))
}

/// Note with the canonical statement, the engine that ran it, and the SQL preview.
pub fn implementation_note(rule: &Rule, engine: &str, table: &str) -> String {
    format!(
        "### Implementation Details\n\n**Statement:**\n```python\n{}\n```\n\n**Execution Engine:** {engine}\n\n**Approximate SQL Query:**\n```sql\n{}\n```\n",
        rule.to_statement(),
        sql_preview(rule, table)
    )
}
