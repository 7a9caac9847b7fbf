//! VRM I/O Library
//!
//! Reads VRM 0.x avatar files: GLB containers whose JSON chunk is a glTF 2.0
//! document with a `VRM` extension.
//!
//! # Example
//!
//! ```no_run
//! use vrm_io::{ImportOptions, ImportOutcome, VrmReader};
//!
//! let outcome = VrmReader::open("avatar.vrm", &ImportOptions::default())?;
//! match outcome {
//!     ImportOutcome::Imported(document) => {
//!         println!("{} meshes", document.meshes.len());
//!     }
//!     ImportOutcome::LicenseConfirmationRequired(required) => {
//!         println!("{}", required);
//!     }
//! }
//! # Ok::<(), vrm_io::VrmError>(())
//! ```

pub mod accessor_decoder;
pub mod diff;
pub mod document;
pub mod error;
pub mod glb;
pub mod license;
pub mod materializer;
pub mod reader;

pub use diff::{dict_diff, vrm_diff, DiffError};
pub use document::{
    AlphaMode, ImportWarning, MaterialDescriptor, MeshPrimitive, MorphTarget, Node, OriginNode,
    PbrMetallicRoughness, Skin, VrmDocument, VrmMeta,
};
pub use error::{Result, VrmError};
pub use glb::{parse_glb, GlbContainer};
pub use license::{
    validate_license, Language, LicenseConfirmationItem, LicenseConfirmationRequired, LicenseStatus,
    LocalizedMessage,
};
pub use reader::{create_vrm_dict, ImportOptions, ImportOutcome, VrmReader};
