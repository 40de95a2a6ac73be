use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::ident::Casing;

/// Knobs shared by every backend. Every field has a safe default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// `None` means the dialect could not be determined; generation refuses it.
    pub target_dialect: Option<Dialect>,
    /// Enclosing namespace, `::`-separated for nesting.
    pub namespace: Option<String>,
    pub field_casing: FieldCasing,
    pub nullable: NullableRepr,
    pub string_passing: StringPassing,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_dialect: Some(Dialect::Modern),
            namespace: None,
            field_casing: FieldCasing::Snake,
            nullable: NullableRepr::Sentinel,
            string_passing: StringPassing::ByValue,
        }
    }
}

impl Config {
    /// Read a JSON config file. Errors carry the path of the offending key.
    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let source = std::fs::read_to_string(path).map_err(|source| Error::ReadInput {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&source).map_err(|message| Error::Config {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn from_json_str(source: &str) -> Result<Self, String> {
        let de = &mut serde_json::Deserializer::from_str(source);
        serde_path_to_error::deserialize(de).map_err(|err| {
            let path = err.path().to_string();
            format!("at {path}: {}", err.into_inner())
        })
    }

    /// Segments of the namespace, empty segments dropped.
    pub fn namespace_segments(&self) -> Vec<&str> {
        self.namespace
            .as_deref()
            .map(|ns| ns.split("::").map(str::trim).filter(|s| !s.is_empty()).collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    /// C++17: `std::optional`, `auto`, range-for, member initializers.
    Modern,
    /// C++98-compatible output for old toolchains.
    Legacy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldCasing {
    #[default]
    Snake,
    LowerCamel,
}

impl From<FieldCasing> for Casing {
    fn from(value: FieldCasing) -> Self {
        match value {
            FieldCasing::Snake => Casing::Snake,
            FieldCasing::LowerCamel => Casing::LowerCamel,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullableRepr {
    /// `std::optional<T>` (modern) or the bundled `Optional<T>` (legacy).
    Wrapper,
    /// Plain `T`; absence reads back as the default value.
    #[default]
    Sentinel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StringPassing {
    #[default]
    ByValue,
    ByConstRef,
}
