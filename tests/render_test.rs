//! Integration tests for schema display and HTML rendering.

use std::sync::Arc;

use schema_refdoc::{format_schema, markdown, print_schema, Document, Resolver, SharedOptions};
use serde_json::json;

#[test]
fn resolved_schema_renders_with_definition_links() {
    let spec = json!({
        "definitions": {
            "Order": {
                "type": "object",
                "properties": {
                    "placed": { "type": "string", "format": "date-time" },
                    "quantity": { "type": "integer", "example": 3 },
                    "widget": { "$ref": "#/definitions/Widget" },
                    "gadgets": { "type": "array", "items": { "$ref": "#/definitions/Gadget" } }
                }
            }
        }
    });
    let doc = Document::root(spec, Arc::new(SharedOptions::new()));
    let order = Resolver::offline()
        .resolve("#/definitions/Order", &doc)
        .unwrap();

    let display = format_schema(&order.value);
    assert_eq!(
        display,
        json!({
            "placed": "string(date-time)",
            "quantity": 3,
            "widget": { "$ref": "#/definitions/Widget" },
            "gadgets": "array"
        })
    );

    let html = print_schema(&display);
    assert!(html.contains(
        r##"<span class="hljs-string"><a href="#definition-Widget">&quot;#/definitions/Widget&quot;</a></span>"##
    ));
    assert!(html.contains(r#"<span class="hljs-string">&quot;string(date-time)&quot;</span>"#));
    assert!(!html.contains("Gadget"));
}

#[test]
fn formatting_leaves_resolved_document_untouched() {
    let spec = json!({
        "definitions": {
            "Pet": {
                "properties": { "name": { "type": "string" } },
                "example": { "name": "Rex" }
            }
        }
    });
    let doc = Document::root(spec.clone(), Arc::new(SharedOptions::new()));
    let pet = Resolver::offline().resolve("#/definitions/Pet", &doc).unwrap();

    let display = format_schema(&pet.value);
    assert_eq!(display, json!({ "name": "Rex" }));
    assert_eq!(doc.value, spec);
}

#[test]
fn description_markdown_with_inline_json() {
    let html = markdown(
        "Creates an order.\n\n```json\n{\"ok\": true}\n```",
        true,
    );
    assert!(html.starts_with("<p>Creates an order.</p>"));
    assert!(html.contains(r#"<span class="hljs-literal">true</span>"#));
}
