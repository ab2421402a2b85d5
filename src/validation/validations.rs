use super::{ValidationErrors, ValidationRule};
use crate::core::Value;
use std::fmt;
use std::sync::Arc;

/// When a rule should be skipped because the value is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmptyPolicy {
    pub allow_nil: bool,
    pub allow_blank: bool,
}

impl EmptyPolicy {
    pub fn skips(&self, value: &Value) -> bool {
        (self.allow_nil && value.is_null()) || (self.allow_blank && value.is_blank())
    }
}

#[derive(Clone)]
struct RegisteredRule {
    field: String,
    rule: Arc<dyn ValidationRule>,
    policy: EmptyPolicy,
}

/// Rule table of one entity type.
///
/// Rules are keyed by field name and evaluated against whatever the caller
/// reads for that field, so virtual fields are checked through their accessors.
#[derive(Clone, Default)]
pub struct Validations {
    rules: Vec<RegisteredRule>,
}

impl Validations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, field: impl Into<String>, rule: Arc<dyn ValidationRule>) {
        self.register_with_policy(field, rule, EmptyPolicy::default());
    }

    pub fn register_with_policy(
        &mut self,
        field: impl Into<String>,
        rule: Arc<dyn ValidationRule>,
        policy: EmptyPolicy,
    ) {
        self.rules.push(RegisteredRule {
            field: field.into(),
            rule,
            policy,
        });
    }

    /// Names of the rules registered for `field`, in registration order.
    pub fn rule_names(&self, field: &str) -> Vec<&'static str> {
        self.rules
            .iter()
            .filter(|registered| registered.field == field)
            .map(|registered| registered.rule.name())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Runs every rule, recording failures in `errors`. Returns true when all passed.
    pub fn run<F>(&self, mut read: F, errors: &mut ValidationErrors) -> bool
    where
        F: FnMut(&str) -> Value,
    {
        let mut valid = true;

        for registered in &self.rules {
            let value = read(&registered.field);
            if registered.policy.skips(&value) {
                continue;
            }

            if let Err(message) = registered.rule.validate(&value) {
                errors.add(registered.field.clone(), message);
                valid = false;
            }
        }

        valid
    }
}

impl fmt::Debug for Validations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(
                self.rules
                    .iter()
                    .map(|registered| (&registered.field, registered.rule.name())),
            )
            .finish()
    }
}
