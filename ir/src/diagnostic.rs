//! Diagnostics reported against operations.
//!
//! A [`Diagnostic`] is the user-facing record of why a rewrite did not happen.
//! Every diagnostic pushed into a [`Diagnostics`] sink is also emitted as a
//! `tracing` event so it shows up in logs without extra plumbing.

use std::fmt;

use crate::graph::OpName;
use crate::location::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Note,
    Warning,
    Error,
}

/// Message attached to an operation (or to nothing in particular).
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub location: Location,
    pub op: Option<OpName>,
    pub message: String,
}

impl Diagnostic {
    pub fn error(location: Location, message: impl Into<String>) -> Self {
        Self { severity: Severity::Error, location, op: None, message: message.into() }
    }

    pub fn op_error(op: OpName, location: Location, message: impl Into<String>) -> Self {
        Self { severity: Severity::Error, location, op: Some(op), message: message.into() }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: ", self.location, self.severity)?;
        if let Some(op) = self.op {
            write!(f, "'{op}' op ")?;
        }
        f.write_str(&self.message)
    }
}

/// Ordered collection of diagnostics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, diagnostic: Diagnostic) {
        let Diagnostic { location, op, message, .. } = &diagnostic;
        match diagnostic.severity {
            Severity::Error => tracing::error!(%location, ?op, "{message}"),
            Severity::Warning => tracing::warn!(%location, ?op, "{message}"),
            Severity::Note => tracing::debug!(%location, ?op, "{message}"),
        }
        self.0.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.0.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }

    /// Whether any diagnostic message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.0.iter().any(|d| d.message.contains(needle))
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, diagnostic) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{diagnostic}")?;
        }
        Ok(())
    }
}
