// birdidq-core/src/application/prompt.rs

use crate::domain::request::CheckRequest;

const INSTRUCTIONS: &str = r#"You are an expert in data validation rules.
Convert the following natural language description into rule invocations using the validator.expect_*() format.

CRITICAL INSTRUCTIONS:
- Return ONLY rule invocations using validator.expect_*() methods
- NO explanations, NO thinking process, NO markdown, NO comments
- Use the format: validator.expect_column_values_to_be_unique(column="column_name")
- Each rule on a new line
- Do NOT use expectation_suite.add_expectation()
- Do NOT import anything
- Use EXACT column names as provided in the available columns list
- Column names are CASE-SENSITIVE - use them EXACTLY as shown"#;

const EXAMPLES: &[(&str, &str)] = &[
    (
        "Check that none of the values in the address column match the pattern for an address starting with a digit",
        r#"validator.expect_column_values_to_not_match_regex(column="address", regex=r"^\d")"#,
    ),
    (
        "transaction_id should be unique and customer_id should not be null",
        "validator.expect_column_values_to_be_unique(column=\"transaction_id\")\nvalidator.expect_column_values_to_not_be_null(column=\"customer_id\")",
    ),
    (
        "amount should be greater than 0",
        r#"validator.expect_column_values_to_be_between(column="amount", min_value=0, strict_min=True)"#,
    ),
];

/// Full prompt for one request: instructions, examples, known columns, then the request.
pub fn build_prompt(request: &CheckRequest) -> String {
    let mut prompt = String::from(INSTRUCTIONS);
    prompt.push('\n');

    for (i, (input, output)) in EXAMPLES.iter().enumerate() {
        prompt.push_str(&format!(
            "\nExample {}:\nInput: \"{input}\"\nOutput: {output}\n",
            i + 1
        ));
    }

    if !request.columns().is_empty() {
        let columns = request
            .columns()
            .iter()
            .map(|c| format!("\"{c}\""))
            .collect::<Vec<_>>()
            .join(", ");
        prompt.push_str(&format!(
            "\nIMPORTANT - Available columns in this dataset: {columns}\n\
             You MUST use these exact column names (case-sensitive) in your rules.\n"
        ));
    }

    prompt.push_str("\nNatural language description:\n");
    prompt.push_str(request.text());
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_lists_every_column_verbatim() -> anyhow::Result<()> {
        let columns = vec![
            "CustomerID".to_string(),
            "order date".to_string(),
            "amount_€".to_string(),
        ];
        let request = CheckRequest::new("amount should be greater than 0")?.with_columns(columns.clone());
        let prompt = build_prompt(&request);
        for column in &columns {
            assert!(prompt.contains(&format!("\"{column}\"")), "missing {column}");
        }
        assert!(prompt.ends_with("amount should be greater than 0"));
        Ok(())
    }

    #[test]
    fn test_prompt_without_columns_has_no_column_section() -> anyhow::Result<()> {
        let prompt = build_prompt(&CheckRequest::new("ids are unique")?);
        assert!(!prompt.contains("Available columns"));
        assert!(prompt.contains("Example 3:"));
        Ok(())
    }
}
