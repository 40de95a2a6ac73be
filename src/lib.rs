//! Infer C++ data structures from JSON samples and generate them together with
//! serialization code for rapidjson, nlohmann/json or JsonCpp.
//!
//! Pipeline: [`inference`] turns each document into a [`ir::Schema`],
//! [`merge`] folds schemas of several documents, [`order`] puts nested types
//! first and [`codegen`] renders the headers.
pub mod cli;
pub mod codegen;
pub mod error;
pub mod ident;
pub mod inference;
pub mod ir;
pub mod merge;
pub mod order;
pub mod output;

pub use error::{Error, Result};
