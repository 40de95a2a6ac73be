//! Strongly-typed schema IR. No `serde_json::Value` past this point.
//!
//! A [`Schema`] owns every [`Struct`]; fields refer to nested structs by name,
//! which is also the schema's lookup key, so references survive reordering and
//! merging without any shared ownership.
use indexmap::IndexMap;
use serde::Serialize;

/// Shape of a JSON value. Declaration order is the promotion rank: a later
/// variant wins over an earlier one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Null,
    Bool,
    Integer,
    Float,
    String,
    Array,
    Object,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Ty {
    /// Only ever seen as `null`; payload shape unknown.
    Null,
    Bool,
    Integer,
    Float,
    String,
    /// `element` is `None` when every observed array was empty.
    Array { element: Option<Box<Ty>> },
    /// Reference into the owning [`Schema`] by struct name.
    Object { name: String },
}

impl Ty {
    pub fn array_of(element: Ty) -> Self {
        Ty::Array { element: Some(Box::new(element)) }
    }

    /// Scalar type for a scalar kind. Containers need more than a tag.
    pub fn scalar(kind: ValueKind) -> Option<Self> {
        match kind {
            ValueKind::Null => Some(Ty::Null),
            ValueKind::Bool => Some(Ty::Bool),
            ValueKind::Integer => Some(Ty::Integer),
            ValueKind::Float => Some(Ty::Float),
            ValueKind::String => Some(Ty::String),
            ValueKind::Array | ValueKind::Object => None,
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Ty::Null => ValueKind::Null,
            Ty::Bool => ValueKind::Bool,
            Ty::Integer => ValueKind::Integer,
            Ty::Float => ValueKind::Float,
            Ty::String => ValueKind::String,
            Ty::Array { .. } => ValueKind::Array,
            Ty::Object { .. } => ValueKind::Object,
        }
    }

    pub fn element_kind(&self) -> Option<ValueKind> {
        match self {
            Ty::Array { element: Some(el) } => Some(el.kind()),
            _ => None,
        }
    }

    /// Struct this type depends on, looking through any level of arrays.
    pub fn nested_type(&self) -> Option<&str> {
        match self {
            Ty::Object { name } => Some(name),
            Ty::Array { element: Some(el) } => el.nested_type(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    /// Sanitized identifier, in the casing chosen at inference time.
    pub name: String,
    /// Original JSON key; identity for merging.
    pub source_key: String,
    pub ty: Ty,
    pub optional: bool,
}

impl Field {
    pub fn kind(&self) -> ValueKind {
        self.ty.kind()
    }

    pub fn nested_type(&self) -> Option<&str> {
        self.ty.nested_type()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Struct {
    pub name: String,
    pub fields: Vec<Field>,
}

impl Struct {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), fields: Vec::new() }
    }

    pub fn field(&self, source_key: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.source_key == source_key)
    }

    pub fn field_mut(&mut self, source_key: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.source_key == source_key)
    }

    /// Distinct nested struct names, in field order.
    pub fn dependencies(&self) -> Vec<&str> {
        let mut deps: Vec<&str> = Vec::new();
        for name in self.fields.iter().filter_map(Field::nested_type) {
            if !deps.contains(&name) {
                deps.push(name);
            }
        }
        deps
    }
}

/// Ordered arena of structs keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Schema {
    structs: IndexMap<String, Struct>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.structs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.structs.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Struct> {
        self.structs.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Struct> {
        self.structs.get_mut(name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.structs.get_index_of(name)
    }

    /// Append a struct. A struct with the same name is replaced in place;
    /// merging same-named structs is [`crate::merge::absorb`]'s job.
    pub fn insert(&mut self, s: Struct) {
        self.structs.insert(s.name.clone(), s);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Struct> {
        self.structs.values()
    }

    pub fn names(&self) -> Vec<String> {
        self.structs.keys().cloned().collect()
    }

    pub fn into_structs(self) -> impl Iterator<Item = Struct> {
        self.structs.into_values()
    }
}

impl FromIterator<Struct> for Schema {
    fn from_iter<I: IntoIterator<Item = Struct>>(iter: I) -> Self {
        let mut schema = Schema::new();
        for s in iter {
            schema.insert(s);
        }
        schema
    }
}
