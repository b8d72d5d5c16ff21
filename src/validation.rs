//! Validation of plan JSON against a [`Schema`].
//!
//! Checks types, required attributes, block cardinality and value
//! constraints (size pattern, allowed values, integer ranges, JSON blobs).
//! Matching topology against a deployment template is not done here; that
//! needs the template and happens when building requests.
//!
//! # Example
//!
//! ```
//! use ec_deployment_provider::validation::validate_plan;
//! use serde_json::json;
//!
//! let diagnostics = validate_plan(&json!({
//!     "version": "8.4.3",
//!     "region": "us-east-1",
//!     "deployment_template_id": "aws-io-optimized-v2",
//!     "elasticsearch": {
//!         "topology": [{"id": "hot_content", "size": "8gb"}]
//!     }
//! }));
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(
//!     diagnostics[0].attribute.as_deref(),
//!     Some("elasticsearch.topology.0.size")
//! );
//! ```

use serde_json::Value;

use crate::schema::{
    deployment_schema, Attribute, AttributeType, Block, BlockNestingMode, Constraint, Diagnostic,
    NestedBlock, Schema,
};

/// Check `value` against `schema`; no diagnostics means it conforms.
///
/// `null` counts as absent. Read-only computed attributes are not checked,
/// since state read back from the API carries them. A constraint is only
/// checked once the value has the right type, and an empty string skips it.
pub fn validate(schema: &Schema, value: &Value) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    validate_block(&schema.block, value, "", &mut diagnostics);
    diagnostics
}

/// Validate a deployment plan against [`deployment_schema`].
pub fn validate_plan(value: &Value) -> Vec<Diagnostic> {
    validate(&deployment_schema(), value)
}

/// [`validate`] as a `Result`.
pub fn validate_result(schema: &Schema, value: &Value) -> Result<(), Vec<Diagnostic>> {
    let diagnostics = validate(schema, value);
    if diagnostics.is_empty() {
        Ok(())
    } else {
        Err(diagnostics)
    }
}

fn validate_block(block: &Block, value: &Value, path: &str, diagnostics: &mut Vec<Diagnostic>) {
    let obj = match value {
        Value::Object(map) => map,
        Value::Null => return,
        _ => {
            let mut diagnostic =
                Diagnostic::error("Expected object").with_detail(format!("Got {}", value_type_name(value)));
            if !path.is_empty() {
                diagnostic = diagnostic.with_attribute(path);
            }
            diagnostics.push(diagnostic);
            return;
        },
    };

    for (name, attr) in &block.attributes {
        let attr_path = join_path(path, name);
        validate_attribute(attr, obj.get(name), &attr_path, diagnostics);
    }

    for (name, nested_block) in &block.blocks {
        let block_path = join_path(path, name);
        validate_nested_block(nested_block, obj.get(name), &block_path, diagnostics);
    }
}

fn validate_attribute(
    attr: &Attribute,
    value: Option<&Value>,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    // Computed-only attributes are set by the provider.
    if attr.flags.computed && !attr.flags.optional && !attr.flags.required {
        return;
    }

    match value {
        None | Some(Value::Null) => {
            if attr.flags.required {
                diagnostics.push(
                    Diagnostic::error(format!("Missing required attribute '{}'", path))
                        .with_detail("This attribute is required and must be provided")
                        .with_attribute(path),
                );
            }
        },
        Some(v) => {
            let before = diagnostics.len();
            validate_attribute_type(&attr.attr_type, v, path, diagnostics);
            if diagnostics.len() == before {
                if let Some(constraint) = &attr.constraint {
                    validate_constraint(constraint, v, path, diagnostics);
                }
            }
        },
    }
}

fn validate_attribute_type(
    attr_type: &AttributeType,
    value: &Value,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match attr_type {
        AttributeType::String => {
            if !value.is_string() {
                diagnostics.push(type_error(path, "string", value));
            }
        },
        AttributeType::Int64 => {
            if !is_int64(value) {
                diagnostics.push(type_error(path, "int64", value));
            }
        },
        AttributeType::Bool => {
            if !value.is_boolean() {
                diagnostics.push(type_error(path, "bool", value));
            }
        },
        AttributeType::List(element_type) => {
            if let Some(arr) = value.as_array() {
                for (i, elem) in arr.iter().enumerate() {
                    let elem_path = format!("{}.{}", path, i);
                    validate_attribute_type(element_type, elem, &elem_path, diagnostics);
                }
            } else {
                diagnostics.push(type_error(path, "list", value));
            }
        },
        AttributeType::Map(value_type) => {
            if let Some(obj) = value.as_object() {
                for (key, val) in obj {
                    let key_path = format!("{}.{}", path, key);
                    validate_attribute_type(value_type, val, &key_path, diagnostics);
                }
            } else {
                diagnostics.push(type_error(path, "map", value));
            }
        },
    }
}

fn validate_constraint(
    constraint: &Constraint,
    value: &Value,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match (constraint, value) {
        // Empty strings mean "unset" throughout the plan.
        (_, Value::String(s)) if s.is_empty() => {},
        (Constraint::Pattern(pattern), Value::String(s)) => {
            if !pattern.is_match(s) {
                diagnostics.push(
                    Diagnostic::error(format!("Invalid value for attribute '{}'", path))
                        .with_detail(format!("\"{}\" does not match {}", s, pattern.as_str()))
                        .with_attribute(path),
                );
            }
        },
        (Constraint::OneOf(allowed), Value::String(s)) => {
            if !allowed.iter().any(|a| a == s) {
                diagnostics.push(
                    Diagnostic::error(format!("Invalid value for attribute '{}'", path))
                        .with_detail(format!(
                            "\"{}\" is not one of: {}",
                            s,
                            allowed.join(", ")
                        ))
                        .with_attribute(path),
                );
            }
        },
        (Constraint::Range { min, max }, Value::Number(n)) => {
            let in_range = n
                .as_f64()
                .is_some_and(|v| v >= *min as f64 && v <= *max as f64);
            if !in_range {
                diagnostics.push(
                    Diagnostic::error(format!("Value out of range for attribute '{}'", path))
                        .with_detail(format!("Expected {}..={}, got {}", min, max, n))
                        .with_attribute(path),
                );
            }
        },
        (Constraint::Json, Value::String(s)) => {
            if let Err(err) = serde_json::from_str::<Value>(s) {
                diagnostics.push(
                    Diagnostic::error(format!("Invalid JSON in attribute '{}'", path))
                        .with_detail(err.to_string())
                        .with_attribute(path),
                );
            }
        },
        _ => {},
    }
}

fn validate_nested_block(
    nested: &NestedBlock,
    value: Option<&Value>,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match nested.nesting_mode {
        BlockNestingMode::Single => validate_single_block(nested, value, path, diagnostics),
        BlockNestingMode::List => validate_list_block(nested, value, path, diagnostics),
    }
}

fn validate_single_block(
    nested: &NestedBlock,
    value: Option<&Value>,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match value {
        None | Some(Value::Null) => {
            if nested.min_items > 0 {
                diagnostics.push(
                    Diagnostic::error(format!("Missing required block '{}'", path))
                        .with_detail("At least one block is required")
                        .with_attribute(path),
                );
            }
        },
        Some(v) => validate_block(&nested.block, v, path, diagnostics),
    }
}

fn validate_list_block(
    nested: &NestedBlock,
    value: Option<&Value>,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match value {
        None | Some(Value::Null) => {
            if nested.min_items > 0 {
                diagnostics.push(
                    Diagnostic::error(format!(
                        "Block '{}' requires at least {} item(s)",
                        path, nested.min_items
                    ))
                    .with_attribute(path),
                );
            }
        },
        Some(Value::Array(arr)) => {
            let len = arr.len() as u32;

            if len < nested.min_items {
                diagnostics.push(
                    Diagnostic::error(format!(
                        "Block '{}' requires at least {} item(s), got {}",
                        path, nested.min_items, len
                    ))
                    .with_attribute(path),
                );
            }

            // 0 means unlimited
            if nested.max_items > 0 && len > nested.max_items {
                diagnostics.push(
                    Diagnostic::error(format!(
                        "Block '{}' allows at most {} item(s), got {}",
                        path, nested.max_items, len
                    ))
                    .with_attribute(path),
                );
            }

            for (i, item) in arr.iter().enumerate() {
                let item_path = format!("{}.{}", path, i);
                validate_block(&nested.block, item, &item_path, diagnostics);
            }
        },
        Some(v) => {
            diagnostics.push(
                Diagnostic::error(format!("Expected list for block '{}'", path))
                    .with_detail(format!("Got {}", value_type_name(v)))
                    .with_attribute(path),
            );
        },
    }
}

fn join_path(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", base, name)
    }
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn is_int64(value: &Value) -> bool {
    match value {
        Value::Number(n) => {
            n.as_i64().is_some()
                || n.as_f64().is_some_and(|f| {
                    f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64
                })
        },
        _ => false,
    }
}

fn type_error(path: &str, expected: &str, got: &Value) -> Diagnostic {
    Diagnostic::error(format!("Invalid type for attribute '{}'", path))
        .with_detail(format!("Expected {}, got {}", expected, value_type_name(got)))
        .with_attribute(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Pattern;
    use serde_json::json;

    fn plan(elasticsearch: Value) -> Value {
        json!({
            "version": "8.4.3",
            "region": "us-east-1",
            "deployment_template_id": "aws-io-optimized-v2",
            "elasticsearch": elasticsearch,
        })
    }

    fn attributes(diagnostics: &[Diagnostic]) -> Vec<&str> {
        diagnostics
            .iter()
            .filter_map(|d| d.attribute.as_deref())
            .collect()
    }

    #[test]
    fn test_valid_plan() {
        let mut value = plan(json!({
            "autoscale": true,
            "strategy": "rolling_all",
            "topology": [
                {"id": "hot_content", "size": "8g", "zone_count": 2},
                {"id": "warm", "size": "0.5g", "size_resource": "storage"}
            ],
            "config": {"user_settings_json": "{\"a\": 1}", "plugins": ["analysis-icu"]}
        }));
        value["kibana"] = json!({"topology": [{"size": "1g"}]});
        value["apm"] = json!({"config": {"debug_enabled": true}});
        value["tags"] = json!({"owner": "search-team"});
        value["traffic_filter"] = json!(["tf-1"]);
        value["observability"] = json!({"deployment_id": "self"});

        let diagnostics = validate_plan(&value);
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
    }

    #[test]
    fn test_missing_required_attributes() {
        let diagnostics = validate_plan(&json!({}));
        assert_eq!(
            attributes(&diagnostics),
            vec!["deployment_template_id", "region", "version", "elasticsearch"]
        );
    }

    #[test]
    fn test_missing_elasticsearch() {
        let mut value = plan(Value::Null);
        value.as_object_mut().unwrap().remove("elasticsearch");
        let diagnostics = validate_plan(&value);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.contains("Missing required block 'elasticsearch'"));
    }

    #[test]
    fn test_bad_size() {
        let diagnostics = validate_plan(&plan(json!({
            "topology": [{"id": "hot_content", "size": "2gb"}]
        })));
        assert_eq!(attributes(&diagnostics), vec!["elasticsearch.topology.0.size"]);
        assert!(diagnostics[0].detail.as_deref().unwrap().contains("\"2gb\""));
    }

    #[test]
    fn test_bad_size_resource_and_zone_count() {
        let mut value = plan(json!({}));
        value["integrations_server"] = json!({
            "topology": [{"size_resource": "cpu", "zone_count": 4}]
        });
        let diagnostics = validate_plan(&value);
        assert_eq!(
            attributes(&diagnostics),
            vec![
                "integrations_server.topology.0.size_resource",
                "integrations_server.topology.0.zone_count"
            ]
        );
        assert!(diagnostics[1].summary.contains("out of range"));
    }

    #[test]
    fn test_zero_zone_count_rejected() {
        let diagnostics = validate_plan(&plan(json!({
            "topology": [{"id": "hot_content", "zone_count": 0}]
        })));
        assert_eq!(attributes(&diagnostics), vec!["elasticsearch.topology.0.zone_count"]);
    }

    #[test]
    fn test_bad_strategy() {
        let diagnostics = validate_plan(&plan(json!({"strategy": "yolo"})));
        assert_eq!(attributes(&diagnostics), vec!["elasticsearch.strategy"]);
        assert!(diagnostics[0].detail.as_deref().unwrap().contains("rolling_all"));
    }

    #[test]
    fn test_bad_settings_json() {
        let mut value = plan(json!({}));
        value["kibana"] = json!({"config": {"user_settings_json": "{not json"}});
        let diagnostics = validate_plan(&value);
        assert_eq!(attributes(&diagnostics), vec!["kibana.config.user_settings_json"]);
    }

    #[test]
    fn test_type_errors_skip_constraints() {
        let diagnostics = validate_plan(&plan(json!({
            "topology": [{"id": "hot_content", "size": 8, "zone_count": "2"}]
        })));
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics.iter().all(|d| d.summary.contains("Invalid type")));
    }

    #[test]
    fn test_computed_attributes_are_skipped() {
        let diagnostics = validate_plan(&plan(json!({
            "cloud_id": 42,
            "topology": [{"id": "hot_content", "node_roles": "not-a-list"}]
        })));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_topology_must_be_a_list() {
        let diagnostics = validate_plan(&plan(json!({"topology": {"id": "hot_content"}})));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.contains("Expected list"));
    }

    #[test]
    fn test_root_not_object() {
        let diagnostics = validate_plan(&json!("not an object"));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.contains("Expected object"));
        assert!(diagnostics[0].attribute.is_none());
    }

    #[test]
    fn test_validate_result_helper() {
        let schema = Schema::v0().with_attribute("name", Attribute::required_string());
        assert!(validate_result(&schema, &json!({"name": "test"})).is_ok());
        assert_eq!(validate_result(&schema, &json!({})).unwrap_err().len(), 1);
    }

    #[test]
    fn test_pattern_constraint_on_every_list_entry() {
        let entry = Block::new().with_attribute(
            "size",
            Attribute::optional_string()
                .with_constraint(Constraint::Pattern(Pattern::new(r"^\d+g$").unwrap())),
        );
        let schema = Schema::v0().with_block("tiers", NestedBlock::list(entry));
        let diagnostics = validate(
            &schema,
            &json!({"tiers": [{"size": "1g"}, {"size": "2gb"}, {"size": "4g"}, {"size": "8"}]}),
        );
        let paths: Vec<_> = diagnostics
            .iter()
            .map(|d| d.attribute.as_deref().unwrap_or_default())
            .collect();
        assert_eq!(paths, vec!["tiers.1.size", "tiers.3.size"]);
        assert!(diagnostics[0]
            .detail
            .as_deref()
            .is_some_and(|d| d.contains(r"does not match ^\d+g$")));
    }
}
