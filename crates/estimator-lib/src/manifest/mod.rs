//! Manifest stream handling
//!
//! Splits a multi-document YAML stream into raw documents and decodes each
//! one into the handful of fields the estimator consumes. The engine never
//! looks at raw YAML itself; it only sees [`DecodedObject`]s.

mod decode;
mod split;

pub use decode::{YamlDecoder, AUTOSCALER_KIND, DEFAULT_WORKLOAD_KINDS};
pub use split::{split_documents, RawDocument};

use crate::error::DecodeError;
use crate::models::DecodedObject;

/// Trait for turning one raw document into a typed object
pub trait ManifestDecoder {
    /// Decode a single non-empty document
    fn decode(&self, document: &str) -> Result<DecodedObject, DecodeError>;
}
