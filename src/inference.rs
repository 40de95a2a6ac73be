//! Schema inference: JSON document → ordered struct graph.
//!
//! Every JSON object becomes a [`Struct`] named after the key that held it
//! (`Root` for the document itself, `<key>Item` for array elements). Structs
//! are discovered pre-order: a parent comes before the structs its fields
//! introduce. Structs that end up with the same name are merged, also within a
//! single document.
//!
//! Known limitation: an array's element type comes from its FIRST element
//! only. Later elements are never looked at, so `[{"id": 1}, {"id": 2, "x": 0}]`
//! yields an element struct without `x`. Changing this changes the generated
//! shape, so it stays.
pub mod classify;

use serde_json::{Map, Value};
use tracing::debug;

use crate::ident::{sanitize, Casing};
use crate::ir::{Field, Schema, Struct, Ty};
use crate::merge;

pub use classify::{classify, classify_number};

/// Default suggested name for a document root.
pub const ROOT_NAME: &str = "Root";

/// Suffix appended to a key to name the element type of an array.
pub const ITEM_SUFFIX: &str = "Item";

// ------------------------------ Inferrer --------------------------------- //

#[derive(Debug, Clone, Copy)]
pub struct Inferrer {
    field_casing: Casing,
}

impl Default for Inferrer {
    fn default() -> Self {
        Self::new(Casing::Snake)
    }
}

impl Inferrer {
    pub fn new(field_casing: Casing) -> Self {
        Self { field_casing }
    }

    /// Infer the structs of one document. Scalars and empty arrays at the root
    /// produce an empty schema.
    pub fn infer(&self, value: &Value, suggested_name: &str) -> Schema {
        let mut schema = Schema::new();
        for s in self.structs_of(value, suggested_name) {
            merge::absorb(&mut schema, s);
        }
        schema
    }

    fn structs_of(&self, value: &Value, suggested_name: &str) -> Vec<Struct> {
        match value {
            Value::Object(map) => self.infer_object(map, suggested_name),
            Value::Array(xs) => match xs.first() {
                Some(first) => self.structs_of(first, &format!("{suggested_name}{ITEM_SUFFIX}")),
                None => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    /// The object's own struct first, then everything its fields introduced.
    fn infer_object(&self, map: &Map<String, Value>, suggested_name: &str) -> Vec<Struct> {
        let mut current = Struct::new(sanitize(suggested_name, Casing::UpperCamel));
        let mut nested = Vec::new();

        // serde_json's `preserve_order` keeps the document's key order here
        for (key, value) in map {
            let (ty, structs) = self.infer_ty(value, key);
            nested.extend(structs);
            current.fields.push(Field {
                name: sanitize(key, self.field_casing),
                source_key: key.clone(),
                ty,
                optional: value.is_null(),
            });
        }

        debug!(name = %current.name, fields = current.fields.len(), "inferred struct");
        let mut out = Vec::with_capacity(nested.len() + 1);
        out.push(current);
        out.extend(nested);
        out
    }

    fn infer_ty(&self, value: &Value, suggested_name: &str) -> (Ty, Vec<Struct>) {
        match value {
            Value::Object(map) => {
                let structs = self.infer_object(map, suggested_name);
                let name = structs[0].name.clone();
                (Ty::Object { name }, structs)
            }
            Value::Array(xs) => match xs.first() {
                Some(first) => {
                    let (element, structs) =
                        self.infer_ty(first, &format!("{suggested_name}{ITEM_SUFFIX}"));
                    (Ty::array_of(element), structs)
                }
                None => (Ty::Array { element: None }, Vec::new()),
            },
            scalar => {
                let ty = Ty::scalar(classify(scalar)).unwrap_or(Ty::Null);
                (ty, Vec::new())
            }
        }
    }
}

/// [`Inferrer::infer`] with snake_case field names.
pub fn infer(value: &Value, suggested_name: &str) -> Schema {
    Inferrer::default().infer(value, suggested_name)
}

// ------------------------------- Front API -------------------------------- //

/// Folds documents into one schema, one at a time, in the order observed.
pub struct Inference {
    inferrer: Inferrer,
    root_name: String,
    state: Schema,
    documents: usize,
}

impl Inference {
    pub fn new(inferrer: Inferrer, root_name: impl Into<String>) -> Self {
        Self {
            inferrer,
            root_name: root_name.into(),
            state: Schema::new(),
            documents: 0,
        }
    }

    pub fn observe_value(&mut self, value: &Value) {
        let incoming = self.inferrer.infer(value, &self.root_name);
        let state = std::mem::take(&mut self.state);
        self.state = if self.documents == 0 {
            incoming
        } else {
            merge::merge(state, incoming)
        };
        self.documents += 1;
    }

    pub fn documents(&self) -> usize {
        self.documents
    }

    /// Unified schema in dependency order.
    pub fn solve(self) -> Schema {
        crate::order::order(self.state)
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::ValueKind;
    use serde_json::json;

    fn field_names(s: &Struct) -> Vec<&str> {
        s.fields.iter().map(|f| f.source_key.as_str()).collect()
    }

    #[test]
    fn flat_object_keeps_key_order() {
        let schema = infer(&json!({"name": "Alice", "age": 30}), ROOT_NAME);
        assert_eq!(schema.len(), 1);
        let root = schema.get("Root").unwrap();
        assert_eq!(field_names(root), vec!["name", "age"]);
        assert_eq!(root.fields[0].ty, Ty::String);
        assert_eq!(root.fields[1].ty, Ty::Integer);
        assert!(root.fields.iter().all(|f| !f.optional));
    }

    #[test]
    fn one_field_per_distinct_key() {
        let doc = json!({"z": 1, "a": null, "m": [1], "q": {"x": true}, "Weird Key!": "s"});
        let schema = infer(&doc, ROOT_NAME);
        let root = schema.get("Root").unwrap();
        assert_eq!(field_names(root), vec!["z", "a", "m", "q", "Weird Key!"]);
        assert_eq!(root.field("Weird Key!").unwrap().name, "weird_key");
    }

    #[test]
    fn null_is_optional_and_unresolved() {
        let schema = infer(&json!({"gone": null}), ROOT_NAME);
        let gone = schema.get("Root").unwrap().field("gone").unwrap();
        assert!(gone.optional);
        assert_eq!(gone.ty, Ty::Null);
        assert_eq!(gone.nested_type(), None);
    }

    #[test]
    fn scalar_arrays_record_element_kind() {
        let schema = infer(&json!({"id": 1, "tags": ["a", "b"]}), ROOT_NAME);
        assert_eq!(schema.len(), 1);
        let tags = schema.get("Root").unwrap().field("tags").unwrap();
        assert_eq!(tags.kind(), ValueKind::Array);
        assert_eq!(tags.ty.element_kind(), Some(ValueKind::String));
        assert_eq!(tags.nested_type(), None);
    }

    #[test]
    fn array_elements_use_first_element_only() {
        let doc = json!({"items": [{"id": 1}, {"id": 2, "extra": "x"}]});
        let schema = infer(&doc, ROOT_NAME);
        let item = schema.get("ItemsItem").unwrap();
        assert_eq!(field_names(item), vec!["id"]);
        let items = schema.get("Root").unwrap().field("items").unwrap();
        assert_eq!(items.nested_type(), Some("ItemsItem"));
    }

    #[test]
    fn nested_objects_are_discovered_pre_order() {
        let doc = json!({
            "user": {"address": {"city": "Oslo"}, "name": "n"},
            "meta": {"v": 1}
        });
        let schema = infer(&doc, ROOT_NAME);
        assert_eq!(schema.names(), vec!["Root", "User", "Address", "Meta"]);
        let user = schema.get("User").unwrap();
        assert_eq!(user.field("address").unwrap().nested_type(), Some("Address"));
    }

    #[test]
    fn scalar_and_empty_roots_produce_nothing() {
        assert!(infer(&json!(42), ROOT_NAME).is_empty());
        assert!(infer(&json!("s"), ROOT_NAME).is_empty());
        assert!(infer(&json!([]), ROOT_NAME).is_empty());
        assert!(infer(&json!([1, 2]), ROOT_NAME).is_empty());
    }

    #[test]
    fn root_array_of_objects_names_item_struct() {
        let schema = infer(&json!([{"a": 1}]), ROOT_NAME);
        assert_eq!(schema.names(), vec!["RootItem"]);
    }

    #[test]
    fn empty_object_is_a_struct_without_fields() {
        let schema = infer(&json!({}), ROOT_NAME);
        assert_eq!(schema.len(), 1);
        assert!(schema.get("Root").unwrap().fields.is_empty());
    }

    #[test]
    fn same_name_structs_in_one_document_merge() {
        let doc = json!({
            "a": {"meta": {"x": 1}},
            "b": {"meta": {"y": "s"}}
        });
        let schema = infer(&doc, ROOT_NAME);
        let meta = schema.get("Meta").unwrap();
        assert_eq!(field_names(meta), vec!["x", "y"]);
        // each key is missing from one of the two occurrences
        assert!(meta.field("x").unwrap().optional);
        assert!(meta.field("y").unwrap().optional);
        assert_eq!(schema.names(), vec!["Root", "A", "Meta", "B"]);
    }

    #[test]
    fn camel_inferrer_names_fields() {
        let schema = Inferrer::new(Casing::LowerCamel).infer(&json!({"user_id": 1}), ROOT_NAME);
        assert_eq!(schema.get("Root").unwrap().fields[0].name, "userId");
    }

    #[test]
    fn inference_folds_documents() {
        let mut inf = Inference::new(Inferrer::default(), ROOT_NAME);
        inf.observe_value(&json!({"a": 1}));
        inf.observe_value(&json!({"a": 1.5, "b": "x"}));
        assert_eq!(inf.documents(), 2);
        let schema = inf.solve();
        let root = schema.get("Root").unwrap();
        assert_eq!(root.field("a").unwrap().ty, Ty::Float);
        assert!(root.field("b").unwrap().optional);
    }
}
