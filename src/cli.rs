//! CLI: infer → (schema | C++ headers)
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, info};

use crate::codegen::{Backend, Config, Dialect, FieldCasing, NullableRepr, RenderedFile, StringPassing};
use crate::error::Error;
use crate::inference::{Inference, Inferrer, ROOT_NAME};
use crate::ir::Schema;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// infer C++ structs from JSON samples and emit them with serialization glue
/// for one or more JSON libraries
#[derive(Parser, Debug)]
#[command(name = "json2cpp", version)]
pub struct CommandLineInterface {
    /// log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// infer and emit `types.h` plus one serialization header per backend
    Generate(GenerateOut),
    /// infer and print the ordered schema as JSON (debug view)
    Schema(SchemaOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// input JSON file, or a quoted glob pattern with --merge
    #[arg(long, short)]
    input: String,

    /// fold every file matching the input glob into one schema
    #[arg(long, default_value_t = false)]
    merge: bool,

    /// JSON Pointer to select a subnode in each document (e.g. /data/items/0)
    #[arg(long)]
    json_pointer: Option<String>,

    /// name of the top-level type
    #[arg(long, default_value = ROOT_NAME)]
    root_type: String,
}

#[derive(clap::Parser, Debug)]
struct GenerateOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output directory, created if absent; existing files are overwritten
    #[arg(short, long, default_value = "out")]
    out: PathBuf,

    /// emit C++98-compatible code
    #[arg(long)]
    legacy_cpp: bool,

    /// enclosing namespace (`a::b` nests)
    #[arg(long)]
    namespace: Option<String>,

    /// lowerCamelCase member names instead of snake_case
    #[arg(long)]
    camelcase: bool,

    /// wrap optional fields (`std::optional` / `Optional<T>`)
    #[arg(long)]
    optional_null: bool,

    /// pass strings to setters by const reference
    #[arg(long)]
    string_ref: bool,

    /// serialization library to target; repeat for several
    #[arg(long, value_enum, default_value = "rapidjson")]
    backend: Vec<Backend>,

    /// JSON config file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct SchemaOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

/// What a successful run produced.
#[derive(Debug)]
pub enum Outcome {
    Generated { files: Vec<PathBuf>, structs: usize },
    Schema { json: String, written: Option<PathBuf> },
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    /// Input files in fold order. Merge mode globs; otherwise the input is one
    /// literal path.
    fn resolve(&self) -> Result<Vec<PathBuf>, Error> {
        if !self.merge {
            let path = PathBuf::from(&self.input);
            if !path.exists() {
                return Err(Error::InputNotFound { path });
            }
            return Ok(vec![path]);
        }
        let entries = glob::glob(&self.input).map_err(|source| Error::Glob {
            pattern: self.input.clone(),
            source,
        })?;
        let mut paths = Vec::new();
        for entry in entries {
            let path = entry?;
            if path.is_file() {
                paths.push(path);
            }
        }
        if paths.is_empty() {
            return Err(Error::NoFilesMatched { pattern: self.input.clone() });
        }
        Ok(paths)
    }

    fn load_document(&self, path: &Path) -> Result<Value, Error> {
        let source = std::fs::read_to_string(path).map_err(|source| Error::ReadInput {
            path: path.to_path_buf(),
            source,
        })?;
        let mut value: Value = serde_json::from_str(&source).map_err(|source| Error::MalformedJson {
            path: path.to_path_buf(),
            source,
        })?;
        match self.json_pointer.as_deref() {
            None => Ok(value),
            Some(pointer) => value.pointer_mut(pointer).map(Value::take).ok_or_else(|| {
                Error::JsonPointer {
                    path: path.to_path_buf(),
                    pointer: pointer.to_string(),
                }
            }),
        }
    }

    /// Infer every input and fold them into one ordered schema.
    fn load_process(&self, inferrer: Inferrer) -> anyhow::Result<Schema> {
        let mut inference = Inference::new(inferrer, &self.root_type);
        for path in self.resolve()? {
            debug!(path = %path.display(), "observing document");
            let value = self.load_document(&path)?;
            inference.observe_value(&value);
        }
        info!(documents = inference.documents(), "inference done");
        let schema = inference.solve();
        // a bare `{}` root infers a struct with nothing in it
        if schema.iter().all(|s| s.fields.is_empty()) {
            return Err(Error::EmptySchema.into());
        }
        Ok(schema)
    }
}

impl GenerateOut {
    /// Config file (or defaults) with flags applied on top.
    fn config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };
        if self.legacy_cpp {
            config.target_dialect = Some(Dialect::Legacy);
        }
        if let Some(namespace) = &self.namespace {
            config.namespace = Some(namespace.clone());
        }
        if self.camelcase {
            config.field_casing = FieldCasing::LowerCamel;
        }
        if self.optional_null {
            config.nullable = NullableRepr::Wrapper;
        }
        if self.string_ref {
            config.string_passing = StringPassing::ByConstRef;
        }
        Ok(config)
    }

    fn run(&self) -> anyhow::Result<Outcome> {
        let config = self.config()?;
        let inferrer = Inferrer::new(config.field_casing.into());
        let schema = self
            .input_settings
            .load_process(inferrer)
            .with_context(|| format!("failed to infer schema from {}", self.input_settings.input))?;

        // `types.h` is shared, so it is written once.
        let mut rendered: IndexMap<String, RenderedFile> = IndexMap::new();
        for backend in &self.backend {
            let files = backend
                .generator()
                .generate(&schema, &config)
                .map_err(Error::from)
                .with_context(|| format!("{} backend", backend.name()))?;
            for file in files {
                rendered.entry(file.name.clone()).or_insert(file);
            }
        }
        let rendered: Vec<RenderedFile> = rendered.into_values().collect();
        let files = crate::output::write_all(&self.out, &rendered)
            .with_context(|| format!("failed to write output to {}", self.out.display()))?;

        Ok(Outcome::Generated { files, structs: schema.len() })
    }
}

impl SchemaOut {
    fn run(&self) -> anyhow::Result<Outcome> {
        let schema = self
            .input_settings
            .load_process(Inferrer::default())
            .with_context(|| format!("failed to infer schema from {}", self.input_settings.input))?;
        let json = serde_json::to_string_pretty(&schema).context("failed to render schema")?;
        let written = match &self.out {
            Some(path) => Some(crate::output::write_file(path, &json)?),
            None => None,
        };
        Ok(Outcome::Schema { json, written })
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn verbose(&self) -> u8 {
        self.verbose
    }

    pub fn run(&self) -> anyhow::Result<Outcome> {
        match &self.cmd {
            Command::Generate(target) => target.run(),
            Command::Schema(target) => target.run(),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Generated { files, structs } => {
                for file in files {
                    writeln!(f, "Generated: {}", file.display())?;
                }
                writeln!(f, "Structs: {structs}")
            }
            Outcome::Schema { written: Some(path), .. } => {
                writeln!(f, "Generated: {}", path.display())
            }
            Outcome::Schema { json, written: None } => writeln!(f, "{json}"),
        }
    }
}
