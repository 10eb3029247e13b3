//! Per-request JSON body generation.
//!
//! A body template is an ordinary JSON value in which a single-key object
//! whose key starts with `$` is an operator, expanded anew on every
//! [`BodyGenerator::produce`] call:
//!
//! ```yaml
//! body:
//!   n: { $sequence: {} }
//!   user: { $random_string: { length: 8 } }
//!   amount: { $random_int: { min: 1, max: 100 } }
//!   region: { $choose: { from: [eu, us, apac] } }
//! ```
//!
//! Everything else (objects, arrays, scalars) passes through structurally.

use rand::distributions::Alphanumeric;
use rand::prelude::*;
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors found while parsing a body template. Surfaced at phase setup,
/// never during iteration.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("unknown body operator: {0}")]
    UnknownOperator(String),

    #[error("body operator {operator}: {message}")]
    BadOperator { operator: String, message: String },
}

/// Parsed template node.
#[derive(Debug, Clone)]
enum Node {
    Literal(Value),
    Object(Vec<(String, Node)>),
    Array(Vec<Node>),
    Sequence { start: u64 },
    RandomInt { min: i64, max: i64 },
    RandomString { length: usize },
    Choose { from: Vec<Value> },
}

impl Node {
    fn parse(template: &Value) -> Result<Node, TemplateError> {
        match template {
            Value::Object(map) if map.len() == 1 => {
                let (key, args) = map.iter().next().expect("len checked above");
                if key.starts_with('$') {
                    Self::parse_operator(key, args)
                } else {
                    Self::parse_object(map)
                }
            }
            Value::Object(map) => Self::parse_object(map),
            Value::Array(items) => Ok(Node::Array(
                items.iter().map(Node::parse).collect::<Result<_, _>>()?,
            )),
            other => Ok(Node::Literal(other.clone())),
        }
    }

    fn parse_object(map: &Map<String, Value>) -> Result<Node, TemplateError> {
        let entries = map
            .iter()
            .map(|(key, value)| Ok((key.clone(), Node::parse(value)?)))
            .collect::<Result<_, _>>()?;
        Ok(Node::Object(entries))
    }

    fn parse_operator(key: &str, args: &Value) -> Result<Node, TemplateError> {
        let bad = |message: &str| TemplateError::BadOperator {
            operator: key.to_string(),
            message: message.to_string(),
        };
        match key {
            "$sequence" => {
                let start = args
                    .get("start")
                    .map(|v| v.as_u64().ok_or_else(|| bad("start must be a non-negative integer")))
                    .transpose()?
                    .unwrap_or(1);
                Ok(Node::Sequence { start })
            }
            "$random_int" => {
                let min = args
                    .get("min")
                    .and_then(Value::as_i64)
                    .ok_or_else(|| bad("min is required and must be an integer"))?;
                let max = args
                    .get("max")
                    .and_then(Value::as_i64)
                    .ok_or_else(|| bad("max is required and must be an integer"))?;
                if min > max {
                    return Err(bad("min must not exceed max"));
                }
                Ok(Node::RandomInt { min, max })
            }
            "$random_string" => {
                let length = args
                    .get("length")
                    .and_then(Value::as_u64)
                    .ok_or_else(|| bad("length is required and must be a non-negative integer"))?;
                Ok(Node::RandomString { length: length as usize })
            }
            "$choose" => {
                let from = args
                    .get("from")
                    .and_then(Value::as_array)
                    .ok_or_else(|| bad("from is required and must be an array"))?;
                if from.is_empty() {
                    return Err(bad("from must not be empty"));
                }
                Ok(Node::Choose { from: from.clone() })
            }
            other => Err(TemplateError::UnknownOperator(other.to_string())),
        }
    }
}

/// Produces one fresh request body per call, from a template parsed once at
/// phase setup. The value sequence is lazy and unbounded; there is no
/// rewind, and nothing is cached between calls.
#[derive(Debug)]
pub struct BodyGenerator {
    root: Node,
    rng: StdRng,
    produced: u64,
}

impl BodyGenerator {
    /// Parse `template` and bind a generator to it. Seeded generators are
    /// reproducible run-to-run.
    pub fn from_template(template: &Value, seed: Option<u64>) -> Result<Self, TemplateError> {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            root: Node::parse(template)?,
            rng,
            produced: 0,
        })
    }

    /// Produce the next body value. All operators in one document see the
    /// same iteration ordinal.
    pub fn produce(&mut self) -> Value {
        let ordinal = self.produced;
        self.produced += 1;
        expand(&self.root, ordinal, &mut self.rng)
    }
}

fn expand(node: &Node, ordinal: u64, rng: &mut StdRng) -> Value {
    match node {
        Node::Literal(value) => value.clone(),
        Node::Object(entries) => Value::Object(
            entries
                .iter()
                .map(|(key, child)| (key.clone(), expand(child, ordinal, rng)))
                .collect(),
        ),
        Node::Array(items) => {
            Value::Array(items.iter().map(|child| expand(child, ordinal, rng)).collect())
        }
        Node::Sequence { start } => Value::from(start + ordinal),
        Node::RandomInt { min, max } => Value::from(rng.gen_range(*min..=*max)),
        Node::RandomString { length } => Value::String(
            std::iter::repeat_with(|| rng.sample(Alphanumeric))
                .take(*length)
                .map(char::from)
                .collect(),
        ),
        Node::Choose { from } => from[rng.gen_range(0..from.len())].clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sequence_counts_up_from_start() {
        let template = json!({"n": {"$sequence": {}}});
        let mut generator = BodyGenerator::from_template(&template, Some(1)).unwrap();
        assert_eq!(generator.produce(), json!({"n": 1}));
        assert_eq!(generator.produce(), json!({"n": 2}));
        assert_eq!(generator.produce(), json!({"n": 3}));

        let template = json!({"$sequence": {"start": 10}});
        let mut generator = BodyGenerator::from_template(&template, Some(1)).unwrap();
        assert_eq!(generator.produce(), json!(10));
        assert_eq!(generator.produce(), json!(11));
    }

    #[test]
    fn seeded_generators_are_reproducible() {
        let template = json!({
            "id": {"$random_int": {"min": 0, "max": 1000000}},
            "tag": {"$random_string": {"length": 12}}
        });
        let mut a = BodyGenerator::from_template(&template, Some(42)).unwrap();
        let mut b = BodyGenerator::from_template(&template, Some(42)).unwrap();
        assert_eq!(a.produce(), b.produce());
        assert_eq!(a.produce(), b.produce());
    }

    #[test]
    fn random_int_varies_between_calls() {
        let template = json!({"id": {"$random_int": {"min": 0, "max": i64::MAX}}});
        let mut generator = BodyGenerator::from_template(&template, Some(7)).unwrap();
        let first = generator.produce();
        let second = generator.produce();
        assert_ne!(first, second);
    }

    #[test]
    fn random_int_respects_bounds() {
        let template = json!({"$random_int": {"min": 5, "max": 7}});
        let mut generator = BodyGenerator::from_template(&template, Some(3)).unwrap();
        for _ in 0..50 {
            let value = generator.produce();
            let n = value.as_i64().unwrap();
            assert!((5..=7).contains(&n), "out of range: {n}");
        }
    }

    #[test]
    fn random_string_has_requested_length() {
        let template = json!({"$random_string": {"length": 16}});
        let mut generator = BodyGenerator::from_template(&template, Some(3)).unwrap();
        let value = generator.produce();
        assert_eq!(value.as_str().unwrap().len(), 16);
    }

    #[test]
    fn choose_picks_from_the_list() {
        let template = json!({"$choose": {"from": ["eu", "us", "apac"]}});
        let mut generator = BodyGenerator::from_template(&template, Some(9)).unwrap();
        for _ in 0..20 {
            let value = generator.produce();
            assert!(["eu", "us", "apac"].contains(&value.as_str().unwrap()));
        }
    }

    #[test]
    fn plain_values_pass_through() {
        let template = json!({
            "kind": "event",
            "nested": {"flag": true, "items": [1, 2, 3]}
        });
        let mut generator = BodyGenerator::from_template(&template, Some(1)).unwrap();
        assert_eq!(generator.produce(), template);
        assert_eq!(generator.produce(), template);
    }

    #[test]
    fn unknown_operator_is_rejected_at_parse() {
        let template = json!({"n": {"$fibonacci": {}}});
        let err = BodyGenerator::from_template(&template, None).unwrap_err();
        assert!(matches!(err, TemplateError::UnknownOperator(ref op) if op == "$fibonacci"));
    }

    #[test]
    fn malformed_operator_args_are_rejected_at_parse() {
        let template = json!({"$random_int": {"min": 10, "max": 1}});
        assert!(BodyGenerator::from_template(&template, None).is_err());

        let template = json!({"$choose": {"from": []}});
        assert!(BodyGenerator::from_template(&template, None).is_err());
    }
}
