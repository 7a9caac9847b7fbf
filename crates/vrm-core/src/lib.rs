//! VRM Core Library
//!
//! Leaf-level building blocks shared by the VRM import pipeline: a bounded
//! byte reader, the glTF numeric type enumerations, flattened typed arrays,
//! JSON path lookups and file name sanitization. Nothing in this crate knows
//! about the container layout; see `vrm-io` for that.

pub mod data_types;
pub mod decoded_array;
pub mod decoder_buffer;
pub mod filename;
pub mod json_path;
pub mod status;

pub use data_types::{ComponentType, ElementType};
pub use decoded_array::{DecodedArray, Scalar};
pub use decoder_buffer::DecoderBuffer;
pub use filename::remove_unsafe_path_chars;
pub use status::{CoreError, CoreResult};
