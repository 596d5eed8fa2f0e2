//! Recursive structural comparison of data against a compiled pattern.

use crate::diagnostic::{Mismatch, MismatchKind, Segment};
use crate::kind::{type_tag, Kind};
use crate::options::Options;
use crate::pattern::{describe_value, Field, NumericCheck, Node, ObjectNode, Pattern, ToCompare};
use serde_json::{Map, Value};
use tracing::{debug, trace};

/// Result of matching data against a pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub matched: bool,
    /// Empty when the data matched.
    pub message: String,
    pub mismatch: Option<Mismatch>,
}

impl Outcome {
    fn success() -> Self {
        Self {
            matched: true,
            message: String::new(),
            mismatch: None,
        }
    }

    fn failure(mismatch: Option<Mismatch>, separator: &str) -> Self {
        let message = mismatch
            .as_ref()
            .map(|m| m.render(separator))
            .unwrap_or_default();
        Self {
            matched: false,
            message,
            mismatch,
        }
    }
}

/// Checks whether `data` satisfies `pattern`.
///
/// Object patterns only require their own keys to be present in the data.
/// Arrays are compared element by element, unless the pattern is an object,
/// in which case its `length`, `ignoreIndexes` and `toCompare` keys describe
/// the array and its remaining keys are applied to each element.
///
/// ```
/// use serde_json::json;
/// use shapematch::{compare, Options};
///
/// let data = json!({"outer": {"items": [{"id": 1}, {"id": 2}, {"id": 2}]}});
/// let pattern = json!({"outer": {"items": [{"id": 1}, {"id": 2}, {"id": 1}]}});
///
/// let outcome = compare(&data, &pattern, &Options::default());
/// assert!(!outcome.matched);
/// assert_eq!(outcome.message, "outer->items[2]->id: expected: 1, actual: 2");
/// ```
pub fn compare(data: &Value, pattern: &Value, options: &Options) -> Outcome {
    Pattern::compile(pattern, options).matches(data)
}

pub(crate) fn run(root: &Node, data: &Value, options: &Options) -> Outcome {
    let mut comparator = Comparator::new(options);
    if comparator.compare(Some(data), root) {
        Outcome::success()
    } else {
        Outcome::failure(comparator.mismatch, &options.separator)
    }
}

#[derive(Debug, Clone, Copy)]
enum Step<'p> {
    Key(&'p str),
    Index(usize),
}

impl From<&Step<'_>> for Segment {
    fn from(step: &Step<'_>) -> Self {
        match *step {
            Step::Key(key) => Segment::Key(key.to_string()),
            Step::Index(index) => Segment::Index(index),
        }
    }
}

struct Comparator<'p> {
    options: &'p Options,
    path: Vec<Step<'p>>,
    mismatch: Option<Mismatch>,
}

impl<'p> Comparator<'p> {
    fn new(options: &'p Options) -> Self {
        Self {
            options,
            path: Vec::new(),
            mismatch: None,
        }
    }

    /// Records the first failure with the current path and returns false.
    fn fail(&mut self, kind: MismatchKind) -> bool {
        if self.mismatch.is_none() {
            let path: Vec<Segment> = self.path.iter().map(Segment::from).collect();
            let mismatch = Mismatch { path, kind };
            debug!(
                path = %mismatch.path_string(&self.options.separator),
                reason = %mismatch.kind,
                "mismatch"
            );
            self.mismatch = Some(mismatch);
        }
        false
    }

    fn descend<F>(&mut self, step: Step<'p>, f: F) -> bool
    where
        F: FnOnce(&mut Self) -> bool,
    {
        self.path.push(step);
        let matched = f(self);
        self.path.pop();
        matched
    }

    fn compare(&mut self, data: Option<&Value>, pattern: &'p Node) -> bool {
        let kind = Kind::of(data);
        match (pattern, data) {
            (Node::Literal(expected), Some(actual)) if kind == Kind::Primitive => {
                self.compare_literal(actual, expected)
            }
            (Node::NumericRange(check), Some(actual)) if kind == Kind::Primitive => {
                self.compare_numeric(actual, check)
            }
            (Node::Object(object), _) => self.compare_object(data, object),
            (Node::Array(items), Some(Value::Array(values))) => self.compare_array(values, items),
            _ => self.fail(MismatchKind::Type {
                expected: pattern.type_tag(),
                actual: type_tag(data),
            }),
        }
    }

    fn compare_object(&mut self, data: Option<&Value>, object: &'p ObjectNode) -> bool {
        match data {
            Some(Value::Object(map)) => self.compare_fields(map, &object.fields),
            Some(Value::Array(values)) => self.compare_array_dsl(values, object),
            _ => self.fail(MismatchKind::Type {
                expected: "object",
                actual: type_tag(data),
            }),
        }
    }

    fn compare_literal(&mut self, actual: &Value, expected: &Value) -> bool {
        let matched = match (actual, expected) {
            (Value::String(actual), Value::String(expected)) => {
                if self.options.strict_strings {
                    actual == expected
                } else {
                    actual.contains(expected.as_str())
                }
            }
            (Value::Number(actual), Value::Number(expected)) => actual.as_f64() == expected.as_f64(),
            _ => actual == expected,
        };

        matched
            || self.fail(MismatchKind::Value {
                expected: describe_value(Some(expected)),
                actual: describe_value(Some(actual)),
            })
    }

    fn compare_numeric(&mut self, actual: &Value, check: &NumericCheck) -> bool {
        let value_mismatch = || MismatchKind::Value {
            expected: check.source().to_string(),
            actual: describe_value(Some(actual)),
        };

        match actual {
            Value::Number(number) => {
                let Some(number) = number.as_f64() else {
                    return self.fail(value_mismatch());
                };
                match check.test(number) {
                    Ok(true) => true,
                    _ => self.fail(check.failure(value_mismatch)),
                }
            }
            // String data is compared with the marker string as written.
            Value::String(_) => self.compare_literal(actual, &Value::String(check.source().to_string())),
            _ => self.fail(value_mismatch()),
        }
    }

    fn compare_fields(&mut self, map: &Map<String, Value>, fields: &'p [Field]) -> bool {
        for field in fields {
            let matched = self.descend(Step::Key(&field.key), |this| {
                this.compare(map.get(&field.key), &field.pattern)
            });
            if !matched {
                return false;
            }
        }
        true
    }

    fn compare_array(&mut self, values: &[Value], items: &'p [Node]) -> bool {
        if values.len() != items.len() {
            return self.fail(MismatchKind::Length {
                expected: items.len().to_string(),
                actual: values.len(),
            });
        }

        for (index, (value, item)) in values.iter().zip(items).enumerate() {
            if !self.descend(Step::Index(index), |this| this.compare(Some(value), item)) {
                return false;
            }
        }
        true
    }

    fn compare_array_dsl(&mut self, values: &[Value], object: &'p ObjectNode) -> bool {
        let directives = &object.array;

        if let Some(length) = &directives.length {
            let actual = values.len();
            if !matches!(length.test(actual as f64), Ok(true)) {
                return self.fail(length.failure(|| MismatchKind::Length {
                    expected: length.source().to_string(),
                    actual,
                }));
            }
        }

        if directives.wildcard {
            trace!(len = values.len(), "array wildcard");
            return true;
        }

        let candidates: Vec<usize> = (0..values.len())
            .filter(|index| !directives.ignore_indexes.contains(index))
            .collect();
        trace!(
            candidates = candidates.len(),
            ignored = values.len() - candidates.len(),
            strict = self.options.strict_arrays,
            "array candidates"
        );

        if self.options.strict_arrays {
            for (position, &index) in candidates.iter().enumerate() {
                if !self.compare_element(&values[index], index, position, object) {
                    return false;
                }
            }
            return true;
        }

        if candidates.is_empty() {
            return self.fail(MismatchKind::NoCandidates);
        }
        let had_mismatch = self.mismatch.is_some();
        for (position, &index) in candidates.iter().enumerate() {
            if self.compare_element(&values[index], index, position, object) {
                // Failures from earlier candidates no longer apply.
                if !had_mismatch {
                    self.mismatch = None;
                }
                return true;
            }
        }
        false
    }

    /// Matches the element at `index`, the `position`-th candidate left after
    /// `ignoreIndexes`.
    fn compare_element(
        &mut self,
        value: &Value,
        index: usize,
        position: usize,
        object: &'p ObjectNode,
    ) -> bool {
        self.descend(Step::Index(index), |this| match &object.array.to_compare {
            Some(ToCompare::Each(expected)) => this.compare(Some(value), expected),
            Some(ToCompare::PerIndex(expected)) => match expected.get(position) {
                Some(expected) => this.compare(Some(value), expected),
                None => this.fail(MismatchKind::Value {
                    expected: describe_value(None),
                    actual: describe_value(Some(value)),
                }),
            },
            Some(ToCompare::Residual) | None => this.compare_object(Some(value), object.residual()),
        })
    }
}
