//! Mismatch records and their rendering into a readable path.
//!
//! The comparator keeps a stack of [`Segment`]s while it descends. When a leaf
//! fails, the stack is copied into a [`Mismatch`] together with the reason.
//! Rendering joins keys with the configured separator and attaches indexes to
//! the segment before them, so `[Key("items"), Index(2), Key("id")]` becomes
//! `items[2]->id`.

use shapematch_expr::ExprError;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => f.write_str(key),
            Segment::Index(index) => write!(f, "[{}]", index),
        }
    }
}

/// Why a leaf of the data failed to satisfy the pattern.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MismatchKind {
    #[error("expected: {expected}, actual: {actual}")]
    Value { expected: String, actual: String },
    #[error("expected length: {expected}, actual length: {actual}")]
    Length { expected: String, actual: usize },
    #[error("types are not comparable, expected: {expected}, actual: {actual}")]
    Type {
        expected: &'static str,
        actual: &'static str,
    },
    #[error("invalid numeric expression '{expression}': {error}")]
    InvalidExpression { expression: String, error: ExprError },
    #[error("no elements left to compare")]
    NoCandidates,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    pub path: Vec<Segment>,
    pub kind: MismatchKind,
}

impl Mismatch {
    pub fn path_string(&self, separator: &str) -> String {
        render_path(&self.path, separator)
    }

    /// `<path>: <reason>`, or just the reason when the failure is at the root.
    pub fn render(&self, separator: &str) -> String {
        let path = self.path_string(separator);
        let message = if path.is_empty() {
            self.kind.to_string()
        } else {
            format!("{}: {}", path, self.kind)
        };
        message.trim().to_string()
    }
}

pub fn render_path(path: &[Segment], separator: &str) -> String {
    let mut out = String::new();
    let mut first = true;
    for segment in path {
        if let Segment::Key(_) = segment {
            if !first {
                out.push_str(separator);
            }
        }
        out.push_str(&segment.to_string());
        first = false;
    }
    out
}
