use crate::errors::ToolError;
use serde_json::{Map, Value};

/// Runtime type expected for a tool argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Str,
    Any,
}

/// One named argument a tool accepts. Specs are declared per tool and
/// applied at the dispatch boundary; handlers never touch raw payloads.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub required: bool,
    pub default: Option<Value>,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            required: true,
            default: None,
            kind,
        }
    }

    pub fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            required: false,
            default: None,
            kind,
        }
    }

    pub fn with_default(name: &'static str, kind: FieldKind, default: Value) -> Self {
        Self {
            name,
            required: false,
            default: Some(default),
            kind,
        }
    }
}

#[derive(Clone, Default)]
pub struct Validation;

impl Validation {
    pub fn new() -> Self {
        Self
    }

    /// Extracts and type-checks the declared fields from a tool's `args`
    /// object. A required field with no default must be present; defaults
    /// are bound for absent optionals; nothing is coerced.
    pub fn extract(
        &self,
        args: &Value,
        specs: &[FieldSpec],
    ) -> Result<Map<String, Value>, ToolError> {
        let empty = Map::new();
        let source = match args {
            Value::Null => &empty,
            Value::Object(map) => map,
            _ => return Err(ToolError::invalid_params("args must be an object")),
        };
        let mut out = Map::new();
        for spec in specs {
            let provided = source.get(spec.name).filter(|v| !v.is_null());
            let value = match provided {
                Some(value) => value.clone(),
                None => {
                    if let Some(default) = &spec.default {
                        out.insert(spec.name.to_string(), default.clone());
                        continue;
                    }
                    if spec.required {
                        return Err(ToolError::invalid_params(format!(
                            "Missing required argument: {}",
                            spec.name
                        )));
                    }
                    continue;
                }
            };
            if spec.kind == FieldKind::Str && !value.is_string() {
                return Err(ToolError::invalid_params(format!(
                    "Argument '{}' must be a string",
                    spec.name
                )));
            }
            out.insert(spec.name.to_string(), value);
        }
        Ok(out)
    }

    pub fn ensure_string(&self, value: &Value, label: &str) -> Result<String, ToolError> {
        let text = value.as_str().ok_or_else(|| {
            ToolError::invalid_params(format!("{} must be a non-empty string", label))
        })?;
        if text.trim().is_empty() {
            return Err(ToolError::invalid_params(format!(
                "{} must be a non-empty string",
                label
            )));
        }
        Ok(text.to_string())
    }

    /// Domain constraint: the value must be one of a closed set. The error
    /// lists the allowed set instead of silently coercing.
    pub fn ensure_enum(
        &self,
        value: &str,
        label: &str,
        allowed: &[&str],
    ) -> Result<String, ToolError> {
        if allowed.contains(&value) {
            return Ok(value.to_string());
        }
        Err(ToolError::invalid_params(format!(
            "{} must be one of: {}",
            label,
            allowed.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_required_argument_names_the_field() {
        let validation = Validation::new();
        let err = validation
            .extract(&json!({}), &[FieldSpec::required("title", FieldKind::Str)])
            .expect_err("must fail");
        assert!(err.message.contains("Missing required argument: title"));
    }

    #[test]
    fn defaults_bind_only_when_absent() {
        let validation = Validation::new();
        let specs = [FieldSpec::with_default(
            "status",
            FieldKind::Str,
            json!("publish"),
        )];

        let defaulted = validation.extract(&json!({}), &specs).expect("extract");
        assert_eq!(defaulted["status"], json!("publish"));

        let provided = validation
            .extract(&json!({"status": "draft"}), &specs)
            .expect("extract");
        assert_eq!(provided["status"], json!("draft"));
    }

    #[test]
    fn explicit_null_counts_as_absent() {
        let validation = Validation::new();
        let err = validation
            .extract(
                &json!({"title": null}),
                &[FieldSpec::required("title", FieldKind::Str)],
            )
            .expect_err("must fail");
        assert!(err.message.contains("Missing required argument: title"));
    }

    #[test]
    fn wrong_type_is_reported_not_coerced() {
        let validation = Validation::new();
        let err = validation
            .extract(
                &json!({"title": 7}),
                &[FieldSpec::required("title", FieldKind::Str)],
            )
            .expect_err("must fail");
        assert!(err.message.contains("'title' must be a string"));
    }

    #[test]
    fn null_args_extract_to_defaults() {
        let validation = Validation::new();
        let out = validation
            .extract(
                &serde_json::Value::Null,
                &[FieldSpec::with_default("status", FieldKind::Str, json!("publish"))],
            )
            .expect("extract");
        assert_eq!(out["status"], json!("publish"));
    }

    #[test]
    fn non_object_args_are_rejected() {
        let validation = Validation::new();
        let err = validation
            .extract(&json!([1, 2]), &[])
            .expect_err("must fail");
        assert!(err.message.contains("args must be an object"));
    }

    #[test]
    fn any_kind_accepts_structured_values() {
        let validation = Validation::new();
        let out = validation
            .extract(
                &json!({"option_value": {"a": 1}}),
                &[FieldSpec::required("option_value", FieldKind::Any)],
            )
            .expect("extract");
        assert_eq!(out["option_value"], json!({"a": 1}));
    }

    #[test]
    fn enum_violation_lists_the_allowed_set() {
        let validation = Validation::new();
        let err = validation
            .ensure_enum("scheduled", "status", &["publish", "draft"])
            .expect_err("must fail");
        assert!(err.message.contains("status must be one of: publish, draft"));
    }

    #[test]
    fn blank_strings_are_not_valid_identifiers() {
        let validation = Validation::new();
        let err = validation
            .ensure_string(&json!("   "), "plugin_slug")
            .expect_err("must fail");
        assert!(err.message.contains("plugin_slug must be a non-empty string"));
    }
}
