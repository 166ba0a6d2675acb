//! Display projection of a schema node.
//!
//! Produces the compact example object shown next to a schema in the
//! generated documentation.

use serde_json::Value;

/// Build the display projection of a schema.
///
/// - A schema with `properties` and an `example` shows the example.
/// - A schema with `properties` and no example maps each property to its
///   example, or to its type name with the format in parentheses
///   (`"string(date-time)"`). Properties without a `type` are kept as they
///   are, so `$ref` objects survive for cross-linking.
/// - Anything else is returned unchanged.
///
/// The input is never modified; the result is an independent copy.
pub fn format_schema(schema: &Value) -> Value {
    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return schema.clone();
    };

    if let Some(example) = explicit_example(schema) {
        return example.clone();
    }

    let mut formatted = properties.clone();
    for prop in formatted.values_mut() {
        let Some(type_name) = prop.get("type").and_then(type_label) else {
            continue;
        };
        *prop = match explicit_example(prop) {
            Some(example) => example.clone(),
            None => match prop.get("format").and_then(Value::as_str) {
                Some(format) => Value::String(format!("{}({})", type_name, format)),
                None => Value::String(type_name),
            },
        };
    }
    Value::Object(formatted)
}

/// The `example` of a schema, unless missing or `null`.
fn explicit_example(schema: &Value) -> Option<&Value> {
    schema.get("example").filter(|example| !example.is_null())
}

/// Display name of a `type` keyword: a string, or a list joined with `,`.
fn type_label(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(items) if !items.is_empty() => Some(
            items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
        ),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn uses_schema_example() {
        let schema = json!({
            "type": "object",
            "properties": { "id": { "type": "string" } },
            "example": { "id": "abc-123" }
        });
        assert_eq!(format_schema(&schema), json!({ "id": "abc-123" }));
    }

    #[test]
    fn maps_properties_to_types() {
        let schema = json!({
            "properties": {
                "id": { "type": "integer", "format": "int64" },
                "name": { "type": "string" },
                "created": { "type": "string", "format": "date-time" }
            }
        });
        assert_eq!(
            format_schema(&schema),
            json!({
                "id": "integer(int64)",
                "name": "string",
                "created": "string(date-time)"
            })
        );
    }

    #[test]
    fn property_example_wins_over_type() {
        let schema = json!({
            "properties": {
                "status": { "type": "string", "example": "active" },
                "count": { "type": "integer", "example": 0 }
            }
        });
        assert_eq!(
            format_schema(&schema),
            json!({ "status": "active", "count": 0 })
        );
    }

    #[test]
    fn untyped_properties_are_kept() {
        let schema = json!({
            "properties": {
                "widget": { "$ref": "#/definitions/Widget" }
            }
        });
        assert_eq!(
            format_schema(&schema),
            json!({ "widget": { "$ref": "#/definitions/Widget" } })
        );
    }

    #[test]
    fn type_list_is_joined() {
        let schema = json!({
            "properties": { "note": { "type": ["string", "null"] } }
        });
        assert_eq!(format_schema(&schema), json!({ "note": "string,null" }));
    }

    #[test]
    fn null_example_is_ignored() {
        let schema = json!({
            "properties": { "id": { "type": "string" } },
            "example": null
        });
        assert_eq!(format_schema(&schema), json!({ "id": "string" }));
    }

    #[test]
    fn passes_through_without_properties() {
        for value in [
            json!({ "type": "string" }),
            json!("text"),
            json!(null),
            json!([1, 2]),
            json!({ "properties": "not-a-map" }),
        ] {
            assert_eq!(format_schema(&value), value);
        }
    }

    #[test]
    fn does_not_mutate_input() {
        let schema = json!({
            "properties": { "id": { "type": "string", "format": "uuid" } }
        });
        let before = schema.clone();
        let _ = format_schema(&schema);
        assert_eq!(schema, before);
    }
}
