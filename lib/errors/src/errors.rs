use std::{fmt::Display, ops::Deref};

use cursor::Line;
use itertools::Itertools;

/// A diagnostic as it is shown to the user, independent of which stage produced it.
#[derive(thiserror::Error, Clone, Debug, PartialEq)]
#[error("[line {line}] {message}")]
pub struct LoxError {
    pub line: Line,
    pub message: String,
}

impl LoxError {
    pub fn new(line: Line, message: impl ToString) -> Self {
        Self { line, message: message.to_string() }
    }
}

#[derive(thiserror::Error, Debug, Default, PartialEq)]
pub struct LoxErrors(pub Vec<LoxError>);

impl LoxErrors {
    /// Orders diagnostics by line, keeping the relative order of errors on the same line.
    pub fn sorted(self) -> Self {
        Self(self.0.into_iter().sorted_by_key(|e| e.line).collect())
    }
}

impl From<LoxError> for LoxErrors {
    fn from(e: LoxError) -> Self {
        Self(vec![e])
    }
}

impl<E: Into<LoxError>> Extend<E> for LoxErrors {
    fn extend<T: IntoIterator<Item = E>>(&mut self, iter: T) {
        self.0.extend(iter.into_iter().map(Into::into))
    }
}

impl<E: Into<LoxError>> FromIterator<E> for LoxErrors {
    fn from_iter<T: IntoIterator<Item = E>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl Deref for LoxErrors {
    type Target = Vec<LoxError>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for LoxErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0.iter().join("\n"))
    }
}
