use super::form_session::{FormSession, SessionInput};
use crate::domain::{EngineError, LayoutElement};
use crate::engine::{compose, LayoutPolicy};
use serde_json::{json, Value};

fn resolved() -> crate::engine::ResolvedSchema {
    let fields = vec![
        json!({ "$id": "#/definitions/fields/Name", "type": "string" }),
        json!({ "$id": "#/definitions/fields/Count", "type": "integer", "default": 1 }),
    ];
    let objects = vec![json!({
        "$id": "#/definitions/objects/Item",
        "type": "object",
        "properties": {
            "name": { "$ref": "#/definitions/fields/Name" },
            "count": { "$ref": "#/definitions/fields/Count" }
        }
    })];
    compose(&fields, &objects).unwrap()
}

#[test]
fn test_new_session_shows_name_field() {
    let session = FormSession::new();
    assert_eq!(session.layout(), &LayoutElement::control("#/properties/name"));
    assert!(session.data().is_empty());
    assert!(session.active_object().is_none());
}

#[test]
fn test_activate_sets_triple_and_keeps_foreign_keys() {
    let mut session = FormSession::new();
    assert!(session.set_data(json!({ "name": "old", "note": "kept" })));

    session
        .activate(&resolved(), "Item", &LayoutPolicy::default())
        .unwrap();

    assert_eq!(session.active_object(), Some("Item"));
    assert_eq!(session.schema()["properties"]["count"]["type"], "integer");
    assert_eq!(session.layout().elements().len(), 2);
    assert_eq!(
        Value::Object(session.data().clone()),
        json!({ "name": "", "note": "kept", "count": 1 })
    );
}

#[test]
fn test_activate_unknown_object_leaves_state() {
    let mut session = FormSession::new();
    let before = session.snapshot();

    let err = session
        .activate(&resolved(), "Missing", &LayoutPolicy::default())
        .unwrap_err();
    assert!(matches!(err, EngineError::UnresolvedReference { .. }));
    assert_eq!(session.snapshot(), before);
}

#[test]
fn test_invalid_text_keeps_previous_state() {
    let mut session = FormSession::new();
    assert!(session.set_data("{\"a\": 1}"));

    assert!(!session.set_schema("{ not json"));
    assert!(!session.set_schema("[1, 2]"));
    assert!(!session.set_layout(r#"{ "type": "Nope" }"#));
    assert!(!session.set_data("42"));

    assert_eq!(session.schema()["properties"]["name"]["type"], "string");
    assert_eq!(session.layout().scope(), Some("#/properties/name"));
    assert_eq!(session.data()["a"], 1);
}

#[test]
fn test_set_accepts_text_and_values() {
    let mut session = FormSession::new();
    assert!(session.set_schema(SessionInput::Value(json!({ "type": "object" }))));
    assert!(session.set_layout(
        r##"{ "type": "VerticalLayout", "elements": [ { "type": "Control", "scope": "#" } ] }"##
    ));
    assert!(session.set_data(String::from(r#"{ "x": true }"#)));

    assert_eq!(session.schema(), &json!({ "type": "object" }));
    assert_eq!(session.layout().elements()[0].scope(), Some("#"));
    assert_eq!(session.data()["x"], true);
}

#[test]
fn test_set_data_replaces_contents() {
    let mut session = FormSession::new();
    session.set_data(json!({ "a": 1, "b": 2 }));
    session.set_data(json!({ "c": 3 }));
    assert_eq!(Value::Object(session.data().clone()), json!({ "c": 3 }));
}

#[test]
fn test_field_edit_by_dotted_path_and_scope() {
    let mut session = FormSession::new();
    session.on_field_edit("name", json!("Widget")).unwrap();
    session.on_field_edit("owner.email", json!("a@b.c")).unwrap();
    session
        .on_field_edit("#/properties/owner/properties/name", json!("Ada"))
        .unwrap();

    assert_eq!(
        Value::Object(session.data().clone()),
        json!({ "name": "Widget", "owner": { "email": "a@b.c", "name": "Ada" } })
    );
}

#[test]
fn test_field_edit_rejects_bad_paths() {
    let mut session = FormSession::new();
    session.on_field_edit("name", json!("Widget")).unwrap();

    assert!(session.on_field_edit("", json!(1)).is_err());
    assert!(session.on_field_edit("a..b", json!(1)).is_err());
    assert!(session.on_field_edit("#/items/0", json!(1)).is_err());
    assert!(session.on_field_edit("#/properties", json!(1)).is_err());

    let err = session.on_field_edit("name.first", json!("x")).unwrap_err();
    assert_eq!(err.pointer(), Some("name.first"));
    assert_eq!(session.data()["name"], "Widget");
}

#[test]
fn test_merge_data_is_shallow() {
    let mut session = FormSession::new();
    session.set_data(json!({ "a": { "x": 1 }, "b": 2 }));
    session.merge_data(json!({ "a": { "y": 2 } }).as_object().unwrap().clone());
    assert_eq!(
        Value::Object(session.data().clone()),
        json!({ "a": { "y": 2 }, "b": 2 })
    );
}

#[test]
fn test_snapshot_serializes() {
    let mut session = FormSession::new();
    session
        .activate(&resolved(), "Item", &LayoutPolicy::default())
        .unwrap();
    let snapshot = serde_json::to_value(session.snapshot()).unwrap();
    assert_eq!(snapshot["object"], "Item");
    assert_eq!(snapshot["layout"]["type"], "VerticalLayout");
    assert_eq!(snapshot["data"]["count"], 1);
}
