// Error types for shape validation

use std::fmt;

use thiserror::Error;

/// Errors raised while compiling a schema fragment.
///
/// These are author-side mistakes: a bad descriptor string, a mapping that
/// cannot mean anything as a schema. They surface at [`define_type`] time,
/// never during validation.
///
/// [`define_type`]: crate::define_type
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// Unrecognized descriptor token
    UnknownToken(String),

    /// Descriptor string that does not parse
    MalformedDescriptor { descriptor: String, reason: String },

    /// Schema fragment of a kind that cannot be compiled
    InvalidFragment(String),

    /// Non-string value under the reserved type-name key; carries the
    /// runtime type word of what was found
    InvalidTypeName(&'static str),

    /// `equal` marker whose payload is not an array; carries the runtime
    /// type word of what was found
    InvalidEqualPayload(&'static str),
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::UnknownToken(token) => write!(f, "Unknown type token '{}'", token),
            SchemaError::MalformedDescriptor { descriptor, reason } => {
                write!(f, "Malformed type descriptor '{}': {}", descriptor, reason)
            }
            SchemaError::InvalidFragment(message) => {
                write!(f, "Invalid schema fragment: {}", message)
            }
            SchemaError::InvalidTypeName(found) => {
                write!(f, "Reserved key '__typeName' must be a string, got {}", found)
            }
            SchemaError::InvalidEqualPayload(found) => {
                write!(
                    f,
                    "The 'equal' marker needs an array of allowed values, got {}",
                    found
                )
            }
        }
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema compilation operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, Violation>;

/// Structured violation kinds
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum ViolationKind {
    /// Key-count parity failure between schema and element (strict mode)
    LengthMismatch {
        schema_keys: Vec<String>,
        element_keys: Vec<String>,
    },

    /// Element key with no schema counterpart (strict mode)
    UnknownKey { key: String },

    /// Value that fails its type descriptor
    TypeMismatch {
        key: String,
        expected: String,
        actual: String,
    },

    /// Value that fails a special-marker predicate
    EqualityMismatch {
        key: String,
        marker: String,
        actual: String,
    },
}

impl ViolationKind {
    /// Strict-mode kinds carry a `Strict mode` tag in their rendered header.
    pub fn is_strict(&self) -> bool {
        matches!(
            self,
            ViolationKind::LengthMismatch { .. } | ViolationKind::UnknownKey { .. }
        )
    }

    /// Format the human-readable message body for this violation kind
    pub fn message(&self) -> String {
        match self {
            ViolationKind::LengthMismatch {
                schema_keys,
                element_keys,
            } => {
                format!(
                    "Invalid type length\n  Element has '{}' keys but schema has '{}' keys.",
                    element_keys.join(" | "),
                    schema_keys.join(" | ")
                )
            }
            ViolationKind::UnknownKey { key } => {
                format!("Unknown type for key {}", key)
            }
            ViolationKind::TypeMismatch {
                key,
                expected,
                actual,
            } => {
                format!(
                    "Invalid value '{}' supplied to '{}' ({})",
                    actual, key, expected
                )
            }
            ViolationKind::EqualityMismatch {
                key,
                marker,
                actual,
            } => {
                format!(
                    "Invalid value '{}' supplied to '{}' ({})",
                    actual, key, marker
                )
            }
        }
    }
}

/// A single validation violation: what went wrong, under which named type.
///
/// `type_name` is the display name of the *innermost* struct schema
/// enclosing the failed check, so nested failures point at the nested type.
#[derive(Debug, Clone, PartialEq, Error, serde::Serialize, serde::Deserialize)]
pub struct Violation {
    /// Display name of the enclosing struct schema
    pub type_name: String,
    /// The structured violation kind
    pub kind: ViolationKind,
}

impl Violation {
    pub fn new(type_name: impl Into<String>, kind: ViolationKind) -> Violation {
        Violation {
            type_name: type_name.into(),
            kind,
        }
    }

    /// Get the human-readable message body for this violation
    pub fn message(&self) -> String {
        self.kind.message()
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind.is_strict() {
            write!(f, "[{} - Strict mode] {}", self.type_name, self.message())
        } else {
            write!(f, "[{}] {}", self.type_name, self.message())
        }
    }
}

/// The ordered outcome of one full validation walk.
///
/// Violations appear in walk order: strict parity checks first, then the
/// element's own key order, depth-first through nested structs. An empty
/// report means the element matched.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct Report {
    violations: Vec<Violation>,
}

impl Report {
    pub(crate) fn new(violations: Vec<Violation>) -> Report {
        Report { violations }
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn first(&self) -> Option<&Violation> {
        self.violations.first()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.violations.iter()
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }

    /// Emit every violation on the warning channel.
    pub fn emit_warnings(&self) {
        for violation in &self.violations {
            tracing::warn!("{}", violation);
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", violation)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Report {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
