//! Error taxonomy for the whole pipeline. Every variant that concerns a file
//! names it.

use std::path::PathBuf;

use thiserror::Error;

use crate::codegen::CodegenError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("input file does not exist: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("invalid glob pattern '{pattern}': {source}")]
    Glob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("failed to read glob match: {0}")]
    GlobEntry(#[from] glob::GlobError),

    #[error("glob pattern matched no files: {pattern}")]
    NoFilesMatched { pattern: String },

    #[error("failed to read {}: {source}", path.display())]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {}: {source}", path.display())]
    MalformedJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON pointer '{pointer}' selects nothing in {}", path.display())]
    JsonPointer { path: PathBuf, pointer: String },

    #[error("no structs generated from input")]
    EmptySchema,

    #[error("failed to create output directory {}: {source}", path.display())]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("code generation failed: {0}")]
    Generation(#[from] CodegenError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
