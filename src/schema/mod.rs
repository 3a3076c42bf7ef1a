//! Record schemas
//!
//! Caller-declared descriptors, per-record schema inference, and the structural
//! validator that checks one against the other.

pub mod descriptor;
pub mod inference;
pub mod validator;

pub use descriptor::{PropertySpec, SchemaDescriptor};
pub use inference::{canonical_key, infer_record_schema, InferredSchema};
pub use validator::{validate_records, Finding, SchemaValidation};
