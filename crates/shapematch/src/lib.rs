//! Structural pattern matching for JSON-like values.
//!
//! A pattern is an ordinary JSON value describing what the data must contain.
//! Objects are matched as subsets, arrays element by element, and a few
//! sentinels make assertions that plain values cannot:
//!
//! - `"_check_number >= 5"` matches any number that is at least 5,
//! - an object matched against an array may carry `length`, `ignoreIndexes`
//!   and `toCompare`, and its other keys are applied to every element.
//!
//! When the data does not match, the outcome carries a path to the first
//! failing leaf.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use shapematch::{compare, Options};
//!
//! let data = json!({
//!     "status": "ok",
//!     "items": [{"id": 1, "price": 12.5}, {"id": 2, "price": 3}],
//! });
//!
//! let pattern = json!({
//!     "status": "ok",
//!     "items": {"length": 2, "price": "_check_number > 0"},
//! });
//! assert!(compare(&data, &pattern, &Options::default()).matched);
//!
//! let outcome = compare(&json!({"a": {"b": 1}}), &json!({"a": {"b": 2}}), &Options::default());
//! assert!(!outcome.matched);
//! assert_eq!(outcome.message, "a->b: expected: 2, actual: 1");
//! ```

pub mod cli;
pub mod compare;
pub mod diagnostic;
pub mod error;
pub mod kind;
pub mod one_or_many;
pub mod options;
pub mod output;
pub mod pattern;

pub use compare::{compare, Outcome};
pub use diagnostic::{Mismatch, MismatchKind, Segment};
pub use one_or_many::OneOrMany;
pub use options::Options;
pub use pattern::Pattern;
pub use shapematch_expr::{evaluate as evaluate_numeric, ExprError, NumericExpr, Operator};
