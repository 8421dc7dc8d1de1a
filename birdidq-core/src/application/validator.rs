// birdidq-core/src/application/validator.rs

use tracing::debug;

use crate::domain::outcome::{RuleResult, StatementError};
use crate::domain::rule::Rule;
use crate::domain::rule::notes::implementation_note;
use crate::domain::suite::{AddOutcome, ValidationSuite};
use crate::domain::table::Table;

/// A rule accepted into the suite, with its verdict on the current data.
#[derive(Debug, Clone)]
pub struct Registration {
    pub rule: Rule,
    pub result: RuleResult,
    pub added: AddOutcome,
}

/// Live validator: one dataset snapshot plus the suite being built against it.
pub struct Validator {
    table: Table,
    suite: ValidationSuite,
    engine: String,
}

impl Validator {
    pub fn new(table: Table, suite: ValidationSuite, engine: impl Into<String>) -> Self {
        Self {
            table,
            suite,
            engine: engine.into(),
        }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn suite(&self) -> &ValidationSuite {
        &self.suite
    }

    /// Parses, binds and evaluates one statement, then adds the rule to the suite.
    /// The suite is left untouched on any failure. A rule whose verdict is false
    /// is still added.
    pub fn register_rule(&mut self, statement: &str) -> Result<Registration, StatementError> {
        let mut rule = Rule::parse(statement)?;
        let check = rule.bind(&self.table)?;
        let result = check.evaluate(&self.table);

        rule.notes = Some(implementation_note(&rule, &self.engine, &self.table.name));
        let added = self.suite.add_rule(rule.clone());
        debug!(
            "Registered {} (success: {}, {:?})",
            rule.rule_type, result.success, added
        );

        Ok(Registration {
            rule,
            result,
            added,
        })
    }
}
