//! C++ code generation.
//!
//! Every backend renders the same `types.h` from [`cpp::render_types`] and
//! differs only in its serialization header, which bridges those structs to one
//! JSON library. Structs are emitted in schema order, so callers hand over a
//! schema that has been through [`crate::order::order`].
pub mod config;
pub mod cpp;
pub mod emitter;
pub mod jsoncpp;
pub mod nlohmann;
pub mod rapidjson;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ir::{Schema, Struct};

pub use config::{Config, Dialect, FieldCasing, NullableRepr, StringPassing};
pub use cpp::Context;
pub use emitter::Emitter;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodegenError {
    #[error("schema has no structs")]
    EmptySchema,
    #[error("target dialect is not set")]
    UndeterminedDialect,
    #[error("struct {name} holds {nested} through field '{field}' before {nested} is complete")]
    RecursiveStruct { name: String, field: String, nested: String },
}

/// A file produced by a generator, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub name: String,
    pub contents: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    Rapidjson,
    Nlohmann,
    Jsoncpp,
}

impl Backend {
    pub fn name(self) -> &'static str {
        match self {
            Backend::Rapidjson => "rapidjson",
            Backend::Nlohmann => "nlohmann",
            Backend::Jsoncpp => "jsoncpp",
        }
    }

    pub fn generator(self) -> Box<dyn CodeGenerator> {
        match self {
            Backend::Rapidjson => Box::new(rapidjson::RapidJson),
            Backend::Nlohmann => Box::new(nlohmann::Nlohmann),
            Backend::Jsoncpp => Box::new(jsoncpp::JsonCpp),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// ADAPTER CONTRACT
// ————————————————————————————————————————————————————————————————————————————

pub trait CodeGenerator {
    fn backend(&self) -> Backend;

    /// Library headers the serialization file includes.
    fn includes(&self) -> &'static [&'static str];

    /// Decode and encode functions for one struct.
    fn emit_struct(&self, s: &Struct, cx: &Context<'_>, out: &mut Emitter);

    /// `types.h` plus this backend's serialization header.
    fn generate(&self, schema: &Schema, config: &Config) -> Result<Vec<RenderedFile>, CodegenError> {
        let cx = Context::new(schema, config)?;
        Ok(vec![cpp::render_types(&cx), self.render_serialization(&cx)])
    }

    fn render_serialization(&self, cx: &Context<'_>) -> RenderedFile {
        let backend = self.backend().name();
        let guard = format!("JSON2CPP_{}_SERIALIZATION_H", backend.to_uppercase());

        let mut out = Emitter::new();
        cpp::preamble(&mut out, &guard);
        for header in self.includes() {
            out.line(format!("#include {header}"));
        }
        out.line(format!("#include \"{}\"", cpp::TYPES_FILE));
        out.blank();
        cpp::open_namespace(cx, &mut out);
        for s in cx.schema.iter() {
            self.emit_struct(s, cx, &mut out);
        }
        cpp::close_namespace(cx, &mut out);
        out.line(format!("#endif  // {guard}"));

        RenderedFile {
            name: format!("{backend}_serialization.h"),
            contents: out.into_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::{infer, ROOT_NAME};
    use crate::order::order;
    use serde_json::json;

    const ALL: [Backend; 3] = [Backend::Rapidjson, Backend::Nlohmann, Backend::Jsoncpp];

    fn sample() -> Schema {
        order(infer(
            &json!({"id": 1, "owner": {"name": "n"}, "tags": ["a"], "note": null}),
            ROOT_NAME,
        ))
    }

    #[test]
    fn backends_share_types_file() {
        let schema = sample();
        let config = Config::default();
        let outputs: Vec<Vec<RenderedFile>> = ALL
            .iter()
            .map(|b| b.generator().generate(&schema, &config).unwrap())
            .collect();
        for files in &outputs {
            assert_eq!(files.len(), 2);
            assert_eq!(files[0], outputs[0][0]);
            assert_eq!(files[0].name, "types.h");
        }
        let names: Vec<&str> = outputs.iter().map(|f| f[1].name.as_str()).collect();
        assert_eq!(
            names,
            vec!["rapidjson_serialization.h", "nlohmann_serialization.h", "jsoncpp_serialization.h"]
        );
    }

    #[test]
    fn empty_schema_fails() {
        for b in ALL {
            let err = b.generator().generate(&Schema::new(), &Config::default()).unwrap_err();
            assert_eq!(err, CodegenError::EmptySchema);
        }
    }

    #[test]
    fn missing_dialect_fails() {
        let config = Config { target_dialect: None, ..Config::default() };
        let err = Backend::Nlohmann.generator().generate(&sample(), &config).unwrap_err();
        assert_eq!(err, CodegenError::UndeterminedDialect);
    }

    #[test]
    fn structs_follow_schema_order() {
        let files = Backend::Rapidjson.generator().generate(&sample(), &Config::default()).unwrap();
        let types = &files[0].contents;
        let owner = types.find("struct Owner {").unwrap();
        let root = types.find("struct Root {").unwrap();
        assert!(owner < root);
        let ser = &files[1].contents;
        assert!(ser.find("Owner& out").unwrap() < ser.find("Root& out").unwrap());
    }
}
