//!
//! The structured validation error model.
//!
//! Validation errors never abort processing: unmarshalling keeps populating
//! the model best-effort and appends every semantic deviation to a flat
//! slice. Each error carries a severity, a rule tag from a closed set, a
//! message, and the source location of the offending key or value node.
//! [`sort_validation_errors`] puts a collected slice into the stable total
//! order test expectations depend on.

use std::any::{Any, TypeId};
use std::fmt;

use serde::Serialize;

use crate::location::Location;
use crate::node::NodeRef;

/// How bad a finding is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

/// The closed set of validation rule tags. The tag, not the message prose,
/// is the contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rule {
    RequiredField,
    TypeMismatch,
    AllowedValues,
    InvalidFormat,
    InvalidSyntax,
    SupportedVersion,
    DuplicateKey,
    InvalidSchema,
}

impl Rule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rule::RequiredField => "required-field",
            Rule::TypeMismatch => "type-mismatch",
            Rule::AllowedValues => "allowed-values",
            Rule::InvalidFormat => "invalid-format",
            Rule::InvalidSyntax => "invalid-syntax",
            Rule::SupportedVersion => "supported-version",
            Rule::DuplicateKey => "duplicate-key",
            Rule::InvalidSchema => "invalid-schema",
        }
    }
}

/// One semantic deviation from the Swagger 2.0 specification or from the
/// declared wire types.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub severity: Severity,
    pub rule: Rule,
    pub message: String,
    pub location: Location,
}

impl ValidationError {
    /// New error-severity finding located at `node` (unknown location when
    /// the node handle is absent).
    pub fn new<S: Into<String>>(rule: Rule, message: S, node: Option<&NodeRef>) -> Self {
        Self {
            severity: Severity::Error,
            rule,
            message: message.into(),
            location: node
                .map(|n| n.borrow().location)
                .unwrap_or(Location::UNKNOWN),
        }
    }

    /// New warning-severity finding.
    pub fn warning<S: Into<String>>(rule: Rule, message: S, node: Option<&NodeRef>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::new(rule, message, node)
        }
    }

    pub(crate) fn at(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    /// 1-indexed source line (0 when unknown).
    pub fn line(&self) -> u64 {
        self.location.line()
    }

    /// 1-indexed source column (0 when unknown).
    pub fn column(&self) -> u64 {
        self.location.column()
    }
}

impl fmt::Display for ValidationError {
    /// Wire form: `[<line>:<column>] error <rule-tag> <message>`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}:{}] {} {} {}",
            self.location.line,
            self.location.column,
            self.severity.as_str(),
            self.rule.as_str(),
            self.message
        )
    }
}

/// Sort errors by (line, column, rule tag, message) ascending. The result is
/// the same permutation for any two runs on the same input.
pub fn sort_validation_errors(errors: &mut [ValidationError]) {
    errors.sort_by(|a, b| {
        (a.location.line, a.location.column, a.rule.as_str(), &a.message).cmp(&(
            b.location.line,
            b.location.column,
            b.rule.as_str(),
            &b.message,
        ))
    });
}

/// Context bag passed down `Validate` calls. Holds at most one context value
/// per runtime type; children look contexts up by type (e.g. the current
/// `Operation` while validating a `Parameter`, or the root `Swagger` while
/// validating a `SecurityRequirement`).
#[derive(Default)]
pub struct ValidationOptions {
    contexts: ahash::AHashMap<TypeId, Box<dyn Any>>,
}

impl ValidationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store (or replace) the context value of type `T`.
    pub fn set<T: Any>(&mut self, value: T) {
        self.contexts.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Builder form of [`ValidationOptions::set`].
    pub fn with<T: Any>(mut self, value: T) -> Self {
        self.set(value);
        self
    }

    /// Look up the context value of type `T`.
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.contexts
            .get(&TypeId::of::<T>())
            .and_then(|b| b.downcast_ref::<T>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_form() {
        let mut e = ValidationError::new(Rule::RequiredField, "info.title is missing", None);
        e.location = Location::new(3, 7);
        assert_eq!(e.to_string(), "[3:7] error required-field info.title is missing");
    }

    #[test]
    fn sorted_order_is_total() {
        let mk = |line, rule: Rule, msg: &str| ValidationError {
            severity: Severity::Error,
            rule,
            message: msg.to_owned(),
            location: Location::new(line, 1),
        };
        let mut a = vec![
            mk(2, Rule::TypeMismatch, "b"),
            mk(1, Rule::RequiredField, "z"),
            mk(2, Rule::TypeMismatch, "a"),
            mk(2, Rule::AllowedValues, "a"),
        ];
        let mut b = a.clone();
        b.reverse();
        sort_validation_errors(&mut a);
        sort_validation_errors(&mut b);
        assert_eq!(a, b);
        assert_eq!(a[0].message, "z");
        // "allowed-values" sorts before "type-mismatch" on the same line.
        assert_eq!(a[1].rule, Rule::AllowedValues);
    }

    #[test]
    fn context_lookup_is_by_type() {
        struct Current(&'static str);
        let opts = ValidationOptions::new().with(Current("op"));
        assert_eq!(opts.get::<Current>().unwrap().0, "op");
        assert!(opts.get::<String>().is_none());
    }
}
