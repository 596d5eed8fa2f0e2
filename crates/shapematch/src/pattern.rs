//! Compilation of raw JSON patterns into a tagged tree.
//!
//! Sentinels are recognized once, here, so the comparator never inspects
//! marker strings or control keys while it descends:
//!
//! - a string starting with the numeric marker becomes [`Node::NumericRange`],
//! - every object becomes an [`ObjectNode`] carrying both its plain field view
//!   (used against object data) and its array directives (`length`,
//!   `ignoreIndexes`, `toCompare`, used against array data),
//! - keys listed in [`Options::ignore_properties`] are left out.
//!
//! The raw pattern is only read; compilation builds a fresh tree.

use crate::compare;
use crate::diagnostic::MismatchKind;
use crate::kind::{is_empty_object, type_tag};
use crate::one_or_many::flatten;
use crate::options::Options;
use crate::Outcome;
use serde_json::{Map, Value};
use shapematch_expr::{ExprError, NumericExpr};
use std::collections::{BTreeSet, HashSet};

pub const LENGTH_KEY: &str = "length";
pub const IGNORE_INDEXES_KEY: &str = "ignoreIndexes";
pub const TO_COMPARE_KEY: &str = "toCompare";

const CONTROL_KEYS: &[&str] = &[LENGTH_KEY, IGNORE_INDEXES_KEY, TO_COMPARE_KEY];

/// A pattern compiled against a set of options, reusable across many data values.
///
/// ```
/// use serde_json::json;
/// use shapematch::{Options, Pattern};
///
/// let pattern = Pattern::compile(
///     &json!({"status": "ok", "items": {"length": "_check_number >= 1"}}),
///     &Options::default(),
/// );
/// assert!(pattern.matches(&json!({"status": "ok", "items": [1, 2]})).matched);
/// assert!(!pattern.matches(&json!({"status": "ok", "items": []})).matched);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    root: Node,
    options: Options,
}

impl Pattern {
    pub fn compile(raw: &Value, options: &Options) -> Self {
        let compiler = Compiler::new(options);
        Self {
            root: compiler.node(raw),
            options: options.clone(),
        }
    }

    #[cfg(test)]
    pub(crate) fn root(&self) -> &Node {
        &self.root
    }

    pub fn matches(&self, data: &Value) -> Outcome {
        compare::run(&self.root, data, &self.options)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// null, boolean, number or plain string.
    Literal(Value),
    NumericRange(NumericCheck),
    Object(ObjectNode),
    Array(Vec<Node>),
}

impl Node {
    pub fn type_tag(&self) -> &'static str {
        match self {
            Node::Literal(value) => type_tag(Some(value)),
            Node::NumericRange(_) => "string",
            Node::Object(_) => "object",
            Node::Array(_) => "array",
        }
    }
}

/// Writes strings bare, absent values as `undefined` and everything else as JSON.
pub fn describe_value(value: Option<&Value>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// A numeric comparison parsed from a pattern string or a `length` directive.
///
/// Expressions that fail to parse are kept so the failure can be reported
/// where the check is used; such a check never holds.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericCheck {
    source: String,
    expr: Result<NumericExpr, ExprError>,
}

impl NumericCheck {
    pub fn new(source: impl Into<String>, expression: &str) -> Self {
        Self {
            source: source.into(),
            expr: shapematch_expr::parse(expression),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn test(&self, actual: f64) -> Result<bool, &ExprError> {
        self.expr.as_ref().map(|expr| expr.holds(actual))
    }

    /// The mismatch to report when [`NumericCheck::test`] did not pass.
    pub(crate) fn failure(&self, actual: impl FnOnce() -> MismatchKind) -> MismatchKind {
        match &self.expr {
            Ok(_) => actual(),
            Err(error) => MismatchKind::InvalidExpression {
                expression: self.source.clone(),
                error: error.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: String,
    pub pattern: Node,
    /// One of `length`, `ignoreIndexes` or `toCompare`.
    pub control: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectNode {
    pub fields: Vec<Field>,
    pub array: ArrayDirectives,
}

impl ObjectNode {
    /// The pattern each element is matched against when this object is
    /// applied to an array: the object itself without its control keys.
    pub fn residual(&self) -> &ObjectNode {
        self.array.residual.as_deref().unwrap_or(self)
    }
}

/// How an object pattern constrains array data.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArrayDirectives {
    pub length: Option<NumericCheck>,
    pub ignore_indexes: BTreeSet<usize>,
    pub to_compare: Option<ToCompare>,
    /// No residual fields and no `toCompare`: only the length is checked.
    pub wildcard: bool,
    /// Set when the object has control keys; `None` means the object is its
    /// own residual.
    pub residual: Option<Box<ObjectNode>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ToCompare {
    /// Every candidate element is compared with the same primitive.
    Each(Box<Node>),
    /// The `i`-th candidate left after `ignoreIndexes` is compared with entry `i`.
    PerIndex(Vec<Node>),
    /// `toCompare` was an object; the residual fields are used instead.
    Residual,
}

struct Compiler<'a> {
    marker: &'a str,
    ignored: HashSet<&'a str>,
}

impl<'a> Compiler<'a> {
    fn new(options: &'a Options) -> Self {
        Self {
            marker: &options.numeric_marker,
            ignored: options.ignore_properties.iter().map(String::as_str).collect(),
        }
    }

    fn node(&self, raw: &Value) -> Node {
        match raw {
            Value::String(s) if !self.marker.is_empty() && s.starts_with(self.marker) => {
                Node::NumericRange(NumericCheck::new(s.as_str(), &s[self.marker.len()..]))
            }
            Value::Object(map) => Node::Object(self.object(raw, map)),
            Value::Array(items) => Node::Array(items.iter().map(|item| self.node(item)).collect()),
            primitive => Node::Literal(primitive.clone()),
        }
    }

    fn object(&self, raw: &Value, map: &Map<String, Value>) -> ObjectNode {
        if is_empty_object(raw) {
            return ObjectNode {
                fields: Vec::new(),
                array: ArrayDirectives {
                    wildcard: true,
                    ..ArrayDirectives::default()
                },
            };
        }

        let kept: Vec<(&String, &Value)> = map
            .iter()
            .filter(|(key, _)| !self.ignored.contains(key.as_str()))
            .collect();
        let directive = |name: &str| {
            kept.iter()
                .find(|(key, _)| key.as_str() == name)
                .map(|(_, value)| *value)
        };

        let fields: Vec<Field> = kept
            .iter()
            .map(|(key, value)| Field {
                key: (*key).clone(),
                pattern: self.node(value),
                control: CONTROL_KEYS.contains(&key.as_str()),
            })
            .collect();

        let length = directive(LENGTH_KEY).map(|value| self.length_check(value));
        let ignore_indexes = directive(IGNORE_INDEXES_KEY)
            .map(indexes)
            .unwrap_or_default();
        let to_compare = directive(TO_COMPARE_KEY).map(|value| match value {
            Value::Array(items) => ToCompare::PerIndex(items.iter().map(|item| self.node(item)).collect()),
            Value::Object(_) => ToCompare::Residual,
            primitive => ToCompare::Each(Box::new(self.node(primitive))),
        });
        let wildcard = to_compare.is_none() && fields.iter().all(|field| field.control);
        let residual = fields
            .iter()
            .any(|field| field.control)
            .then(|| Box::new(residual_of(&fields)));

        ObjectNode {
            fields,
            array: ArrayDirectives {
                length,
                ignore_indexes,
                to_compare,
                wildcard,
                residual,
            },
        }
    }

    /// Numbers are exact lengths and strings are expressions, with or without
    /// the numeric marker. Anything else is kept as an expression that fails
    /// to parse.
    fn length_check(&self, value: &Value) -> NumericCheck {
        match value {
            Value::String(s) => {
                let expression = match s.strip_prefix(self.marker) {
                    Some(rest) if !self.marker.is_empty() => rest,
                    _ => s.as_str(),
                };
                NumericCheck::new(s.as_str(), expression)
            }
            other => {
                let source = other.to_string();
                NumericCheck::new(source.as_str(), &source)
            }
        }
    }
}

/// The non-control fields as an object of their own. It carries no
/// directives, so against nested arrays it applies to each inner element.
fn residual_of(fields: &[Field]) -> ObjectNode {
    let fields: Vec<Field> = fields.iter().filter(|field| !field.control).cloned().collect();
    ObjectNode {
        array: ArrayDirectives {
            wildcard: fields.is_empty(),
            ..ArrayDirectives::default()
        },
        fields,
    }
}

/// Non-negative integers from a single value or a list; anything else is skipped.
fn indexes(value: &Value) -> BTreeSet<usize> {
    flatten(value)
        .into_iter()
        .filter_map(Value::as_u64)
        .filter_map(|index| usize::try_from(index).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn compile(raw: Value) -> Node {
        Pattern::compile(&raw, &Options::default()).root().clone()
    }

    fn object(raw: Value) -> ObjectNode {
        match compile(raw) {
            Node::Object(object) => object,
            other => panic!("expected object node, got {:?}", other),
        }
    }

    #[test]
    fn test_primitives_are_literals() {
        assert_eq!(compile(json!(1)), Node::Literal(json!(1)));
        assert_eq!(compile(json!("text")), Node::Literal(json!("text")));
        assert_eq!(compile(json!(null)), Node::Literal(json!(null)));
    }

    #[test]
    fn test_numeric_marker() {
        match compile(json!("_check_number >= 3")) {
            Node::NumericRange(check) => {
                assert_eq!(check.source(), "_check_number >= 3");
                assert_eq!(check.test(4.0), Ok(true));
                assert_eq!(check.test(2.0), Ok(false));
            }
            other => panic!("expected numeric range, got {:?}", other),
        }
    }

    #[test]
    fn test_custom_numeric_marker() {
        let options = Options::new().numeric_marker("__numeric__");
        let pattern = Pattern::compile(&json!("__numeric__ < 10"), &options);
        assert!(matches!(pattern.root(), Node::NumericRange(_)));

        let pattern = Pattern::compile(&json!("_check_number < 10"), &options);
        assert!(matches!(pattern.root(), Node::Literal(_)));
    }

    #[test]
    fn test_malformed_numeric_marker_is_kept() {
        match compile(json!("_check_number about 3")) {
            Node::NumericRange(check) => assert!(check.test(3.0).is_err()),
            other => panic!("expected numeric range, got {:?}", other),
        }
    }

    #[test]
    fn test_array_directives() {
        let node = object(json!({
            "length": 3,
            "ignoreIndexes": [0, 2],
            "toCompare": [1, 2, 3],
        }));
        let array = &node.array;
        assert_eq!(array.length.as_ref().map(|l| l.source()), Some("3"));
        assert_eq!(array.ignore_indexes, BTreeSet::from([0, 2]));
        assert!(matches!(array.to_compare, Some(ToCompare::PerIndex(ref items)) if items.len() == 3));
        assert!(!array.wildcard);
        assert!(node.residual().fields.is_empty());
        assert!(node.residual().array.wildcard);
    }

    #[test]
    fn test_single_ignore_index() {
        let node = object(json!({"ignoreIndexes": 1, "id": 1}));
        assert_eq!(node.array.ignore_indexes, BTreeSet::from([1]));
        assert_eq!(object(json!({"ignoreIndexes": "1", "id": 1})).array.ignore_indexes, BTreeSet::new());
    }

    #[test]
    fn test_to_compare_shapes() {
        let each = object(json!({"toCompare": "x"}));
        assert!(matches!(each.array.to_compare, Some(ToCompare::Each(_))));

        let residual = object(json!({"toCompare": {"a": 1}, "b": 2}));
        assert!(matches!(residual.array.to_compare, Some(ToCompare::Residual)));
        let keys: Vec<&str> = residual.residual().fields.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["b"]);
    }

    #[test]
    fn test_residual_drops_directives() {
        let node = object(json!({"length": 2, "ignoreIndexes": 0, "a": 1}));
        let residual = node.residual();
        assert_eq!(residual.fields.len(), 1);
        assert!(!residual.fields[0].control);
        assert!(residual.array.length.is_none());
        assert!(residual.array.ignore_indexes.is_empty());
        assert!(!residual.array.wildcard);

        let plain = object(json!({"a": 1}));
        assert!(plain.array.residual.is_none());
        assert_eq!(plain.residual(), &plain);
    }

    #[test]
    fn test_wildcard() {
        assert!(object(json!({})).array.wildcard);
        assert!(object(json!({"length": 2})).array.wildcard);
        assert!(object(json!({"length": 2, "ignoreIndexes": [0]})).array.wildcard);
        assert!(!object(json!({"length": 2, "toCompare": 1})).array.wildcard);
        assert!(!object(json!({"id": 1})).array.wildcard);
    }

    #[test]
    fn test_length_expression_and_invalid_length() {
        let node = object(json!({"length": ">= 2"}));
        let length = node.array.length.unwrap();
        assert_eq!(length.test(2.0), Ok(true));

        let node = object(json!({"length": "_check_number < 2"}));
        let length = node.array.length.unwrap();
        assert_eq!(length.source(), "_check_number < 2");
        assert_eq!(length.test(1.0), Ok(true));

        let node = object(json!({"length": true}));
        assert!(node.array.length.unwrap().test(1.0).is_err());
    }

    #[test]
    fn test_ignore_properties_are_stripped() {
        let options = Options::new().ignore_properties(vec!["id".to_string(), "length".to_string()]);
        let raw = json!({"id": 1, "name": "a", "length": 4});
        let pattern = Pattern::compile(&raw, &options);
        match pattern.root() {
            Node::Object(node) => {
                let keys: Vec<&str> = node.fields.iter().map(|f| f.key.as_str()).collect();
                assert_eq!(keys, vec!["name"]);
                assert!(node.array.length.is_none());
            }
            other => panic!("expected object node, got {:?}", other),
        }
        assert_eq!(raw, json!({"id": 1, "name": "a", "length": 4}));
    }

    #[test]
    fn test_describe_value() {
        assert_eq!(describe_value(Some(&json!("abc"))), "abc");
        assert_eq!(describe_value(Some(&json!(2.5))), "2.5");
        assert_eq!(describe_value(Some(&json!(null))), "null");
        assert_eq!(describe_value(Some(&json!([1, 2]))), "[1,2]");
        assert_eq!(describe_value(None), "undefined");
    }
}
