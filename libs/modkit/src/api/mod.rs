//! API building blocks: the type-safe operation builder, problem responses
//! and the JSON body extractor.

pub mod json;
pub mod operation_builder;
pub mod problem;

pub use json::{JsonBody, JsonBodyOrDefault};
pub use operation_builder::{
    ensure_schema, state, Missing, OpenApiRegistry, OperationBuilder, OperationSpec,
    ParamLocation, ParamSpec, Present, RequestBodySpec, ResponseSpec, SchemaCollection,
};
