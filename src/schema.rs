// Minimal JSON-Schema subset validator used as a data-integrity gate.
//
// Supported keywords: $ref (internal pointers), anyOf, enum, type, pattern,
// required, properties, additionalProperties, minProperties, minItems, items.
// Diagnostics accumulate instead of failing fast so one run reports every defect.

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub path: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Validates `data` against `schema`, resolving `$ref`s against `schema` itself.
pub fn validate(schema: &Value, data: &Value) -> Vec<Diagnostic> {
    let mut validator = Validator {
        root: schema,
        patterns: HashMap::new(),
    };
    let mut diagnostics = Vec::new();
    let mut path = vec!["root".to_string()];
    validator.check(schema, data, &mut path, &mut diagnostics);
    diagnostics
}

struct Validator<'a> {
    root: &'a Value,
    // None caches a pattern that failed to compile
    patterns: HashMap<String, Option<Regex>>,
}

impl<'a> Validator<'a> {
    fn check(&mut self, schema: &'a Value, data: &Value, path: &mut Vec<String>, out: &mut Vec<Diagnostic>) {
        // Non-object schemas (true, false, null) impose no constraint
        let Some(schema) = schema.as_object() else {
            return;
        };

        if let Some(reference) = schema.get("$ref") {
            let reference = reference.as_str().unwrap_or_default();
            match resolve_ref(self.root, reference) {
                Some(target) => self.check(target, data, path, out),
                None => push(out, path, format!("Unknown $ref {}", reference)),
            }
            return;
        }

        if let Some(branches) = schema.get("anyOf").and_then(Value::as_array) {
            let matched = branches.iter().any(|branch| {
                let mut branch_out = Vec::new();
                self.check(branch, data, path, &mut branch_out);
                branch_out.is_empty()
            });
            if !matched {
                push(out, path, "Value does not match anyOf schemas".to_string());
            }
            return;
        }

        if let Some(allowed) = schema.get("enum").and_then(Value::as_array) {
            if !allowed.iter().any(|candidate| json_equal(candidate, data)) {
                let listed: Vec<String> = allowed.iter().map(display_scalar).collect();
                push(out, path, format!("Value must be one of {}", listed.join(", ")));
                return;
            }
        }

        let declared_type = schema.get("type");
        if let Some(declared) = declared_type {
            let types: Vec<&str> = match declared {
                Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
                other => other.as_str().into_iter().collect(),
            };
            if !types.iter().any(|t| matches_type(t, data)) {
                push(out, path, format!("Expected type {}", types.join(" or ")));
                return;
            }
        }

        if let (Some(pattern), Some(text)) = (schema.get("pattern").and_then(Value::as_str), data.as_str()) {
            match self.compiled(pattern) {
                Some(regex) => {
                    if !regex.is_match(text) {
                        push(out, path, format!("Value does not match pattern {}", pattern));
                    }
                }
                None => push(out, path, format!("Invalid pattern {}", pattern)),
            }
        }

        match declared_type.and_then(Value::as_str) {
            Some("object") => self.check_object(schema, data, path, out),
            Some("array") => self.check_array(schema, data, path, out),
            _ => {}
        }
    }

    fn check_object(
        &mut self,
        schema: &'a Map<String, Value>,
        data: &Value,
        path: &mut Vec<String>,
        out: &mut Vec<Diagnostic>,
    ) {
        let Some(object) = data.as_object() else {
            push(out, path, "Expected object".to_string());
            return;
        };

        if let Some(required) = schema.get("required").and_then(Value::as_array) {
            for key in required.iter().filter_map(Value::as_str) {
                if !object.contains_key(key) {
                    path.push(key.to_string());
                    push(out, path, "Missing required property".to_string());
                    path.pop();
                }
            }
        }

        if let Some(min) = schema.get("minProperties").and_then(Value::as_u64) {
            if (object.len() as u64) < min {
                push(out, path, format!("Expected at least {} properties", min));
            }
        }

        let properties = schema.get("properties").and_then(Value::as_object);
        let additional = schema.get("additionalProperties");

        for (key, value) in object {
            path.push(key.clone());
            match properties.and_then(|p| p.get(key)) {
                Some(property_schema) => self.check(property_schema, value, path, out),
                None => match additional {
                    Some(Value::Bool(false)) => push(out, path, "Unexpected property".to_string()),
                    Some(extra) if extra.is_object() => self.check(extra, value, path, out),
                    _ => {}
                },
            }
            path.pop();
        }
    }

    fn check_array(
        &mut self,
        schema: &'a Map<String, Value>,
        data: &Value,
        path: &mut Vec<String>,
        out: &mut Vec<Diagnostic>,
    ) {
        let Some(items) = data.as_array() else {
            push(out, path, "Expected array".to_string());
            return;
        };

        if let Some(min) = schema.get("minItems").and_then(Value::as_u64) {
            if (items.len() as u64) < min {
                push(out, path, format!("Expected at least {} items", min));
            }
        }

        if let Some(item_schema) = schema.get("items") {
            for (index, item) in items.iter().enumerate() {
                path.push(index.to_string());
                self.check(item_schema, item, path, out);
                path.pop();
            }
        }
    }

    fn compiled(&mut self, pattern: &str) -> Option<&Regex> {
        self.patterns
            .entry(pattern.to_string())
            .or_insert_with(|| match Regex::new(pattern) {
                Ok(regex) => Some(regex),
                Err(e) => {
                    tracing::warn!(pattern, error = %e, "Schema pattern failed to compile");
                    None
                }
            })
            .as_ref()
    }
}

fn push(out: &mut Vec<Diagnostic>, path: &[String], message: String) {
    out.push(Diagnostic {
        path: path.join("."),
        message,
    });
}

/// Resolves an internal `#/a/b` pointer; anything else is unresolvable.
fn resolve_ref<'v>(root: &'v Value, reference: &str) -> Option<&'v Value> {
    let pointer = reference.strip_prefix("#/")?;
    let mut current = root;
    for segment in pointer.split('/') {
        let segment = segment.replace("~1", "/").replace("~0", "~");
        current = match current {
            Value::Object(map) => map.get(&segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

fn matches_type(name: &str, value: &Value) -> bool {
    match name {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => match value {
            Value::Number(n) => n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0),
            _ => false,
        },
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        // Unknown type names accept anything
        _ => true,
    }
}

// 1 and 1.0 are the same number
fn json_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn display_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn messages(diagnostics: &[Diagnostic]) -> Vec<String> {
        diagnostics.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn missing_required_property_is_reported_once() {
        let schema = json!({
            "type": "object",
            "required": ["a"],
            "properties": { "a": { "type": "string" } }
        });
        let diagnostics = validate(&schema, &json!({}));
        assert_eq!(messages(&diagnostics), vec!["root.a: Missing required property"]);
        assert!(validate(&schema, &json!({ "a": "x" })).is_empty());
    }

    #[test]
    fn reports_every_defect_in_one_pass() {
        let schema = json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "slug": { "type": "string", "pattern": "^[a-z-]+$" },
                "tags": { "type": "array", "minItems": 2, "items": { "type": "string" } }
            }
        });
        let data = json!({ "slug": "Bad Slug", "tags": [1], "extra": true });
        let found = messages(&validate(&schema, &data));
        assert_eq!(
            found,
            vec![
                "root.extra: Unexpected property",
                "root.slug: Value does not match pattern ^[a-z-]+$",
                "root.tags: Expected at least 2 items",
                "root.tags.0: Expected type string",
            ]
        );
    }

    #[test]
    fn refs_resolve_against_root_with_escapes() {
        let schema = json!({
            "$defs": { "a/b": { "type": "integer" } },
            "type": "array",
            "items": { "$ref": "#/$defs/a~1b" }
        });
        assert!(validate(&schema, &json!([1, 2.0])).is_empty());
        assert_eq!(messages(&validate(&schema, &json!([1.5]))), vec!["root.0: Expected type integer"]);

        let broken = json!({ "$ref": "#/nowhere" });
        assert_eq!(messages(&validate(&broken, &json!(1))), vec!["root: Unknown $ref #/nowhere"]);
        let external = json!({ "$ref": "other.json#/x" });
        assert_eq!(validate(&external, &json!(1)).len(), 1);
    }

    #[test]
    fn any_of_hides_branch_diagnostics() {
        let schema = json!({ "anyOf": [{ "type": "string" }, { "type": "number" }] });
        assert!(validate(&schema, &json!(3)).is_empty());
        assert_eq!(
            messages(&validate(&schema, &json!(true))),
            vec!["root: Value does not match anyOf schemas"]
        );
    }

    #[test]
    fn enum_and_type_lists() {
        let schema = json!({ "enum": ["new", "used", 1] });
        assert!(validate(&schema, &json!(1.0)).is_empty());
        assert_eq!(
            messages(&validate(&schema, &json!("broken"))),
            vec!["root: Value must be one of new, used, 1"]
        );

        let nullable = json!({ "type": ["string", "boolean"] });
        assert!(validate(&nullable, &json!(false)).is_empty());
        assert_eq!(
            messages(&validate(&nullable, &json!(3))),
            vec!["root: Expected type string or boolean"]
        );
    }

    #[test]
    fn additional_properties_schema_and_min_properties() {
        let schema = json!({
            "type": "object",
            "minProperties": 1,
            "additionalProperties": { "type": "array" }
        });
        assert_eq!(messages(&validate(&schema, &json!({}))), vec!["root: Expected at least 1 properties"]);
        assert_eq!(
            messages(&validate(&schema, &json!({ "vehicles": "nope" }))),
            vec!["root.vehicles: Expected type array"]
        );
        assert!(validate(&schema, &json!({ "vehicles": [] })).is_empty());
    }

    #[test]
    fn invalid_pattern_is_a_diagnostic() {
        let schema = json!({ "type": "string", "pattern": "([a-z" });
        assert_eq!(messages(&validate(&schema, &json!("abc"))), vec!["root: Invalid pattern ([a-z"]);
        // pattern only applies to strings
        let numeric = json!({ "pattern": "^a$" });
        assert!(validate(&numeric, &json!(5)).is_empty());
    }
}
