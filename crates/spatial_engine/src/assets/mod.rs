//! Asset parsing: Wavefront OBJ models and their MTL material libraries
//!
//! - [`obj_loader`] - OBJ subset parser producing deduplicated attribute
//!   streams and per-material face groups
//! - [`mtl_parser`] - MTL subset parser for the libraries OBJ files
//!   reference via `mtllib`

pub mod mtl_parser;
pub mod obj_loader;

pub use mtl_parser::{MtlError, MtlMaterial, MtlParser};
pub use obj_loader::{AttributeKey, FaceGroup, Model, ObjError};
