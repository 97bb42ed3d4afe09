//! Structured validation failures.

use std::collections::HashMap;
use std::fmt;

/// A failed validation of an untrusted payload.
///
/// Enumerates every field that failed and why. A payload that produces one
/// of these produced no typed value at all: validation is
/// reject-whole-on-any-failure.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    entity: &'static str,
    field_errors: HashMap<String, Vec<String>>,
}

impl ValidationError {
    /// An empty error for the given entity. Not a failure until fields are
    /// recorded; see [`Self::is_empty`].
    #[must_use]
    pub fn new(entity: &'static str) -> Self {
        Self {
            entity,
            field_errors: HashMap::new(),
        }
    }

    /// A payload that could not even be deserialized into the expected
    /// shape. Recorded under the pseudo-field `payload`.
    #[must_use]
    pub fn malformed(entity: &'static str, message: impl Into<String>) -> Self {
        let mut err = Self::new(entity);
        err.add("payload", message);
        err
    }

    /// Record a failure for a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.field_errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Builder-style [`Self::add`].
    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.add(field, message);
        self
    }

    /// Merge the failures collected by the `validator` crate.
    ///
    /// Field names are reported in their wire (camelCase) form, matching
    /// the payload the caller actually sent.
    pub fn extend_from_validator(&mut self, errors: &validator::ValidationErrors) {
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                self.add(wire_field_name(&field), message);
            }
        }
    }

    /// Merge another error's fields under a prefix (e.g. nested
    /// entitlement failures under `entitlements.<key>`).
    pub fn extend_prefixed(&mut self, prefix: &str, other: ValidationError) {
        for (field, messages) in other.field_errors {
            for message in messages {
                self.add(format!("{}.{}", prefix, field), message);
            }
        }
    }

    /// The entity the payload claimed to be.
    #[must_use]
    pub fn entity(&self) -> &'static str {
        self.entity
    }

    /// Per-field failure messages.
    #[must_use]
    pub fn field_errors(&self) -> &HashMap<String, Vec<String>> {
        &self.field_errors
    }

    /// The failing field names, sorted.
    #[must_use]
    pub fn fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = self.field_errors.keys().map(String::as_str).collect();
        fields.sort_unstable();
        fields
    }

    /// Whether a specific field failed.
    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        self.field_errors.contains_key(field)
    }

    /// True when no failures have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.field_errors.is_empty()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed for {}: ", self.entity)?;
        let mut first = true;
        for field in self.fields() {
            for message in &self.field_errors[field] {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Convert a Rust-side snake_case field identifier to its wire (camelCase)
/// name.
fn wire_field_name(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper_next = false;
    for c in field.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}
