//! VRM import pipeline.
//!
//! ```text
//! bytes -> demux -> draco check -> license gate -> decode accessors -> materialize
//! ```
//!
//! Every stage runs to completion before the next starts; the first error
//! aborts the import and nothing partial is handed back.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::accessor_decoder::decode_accessors;
use crate::document::VrmDocument;
use crate::error::{Result, VrmError};
use crate::glb::parse_glb;
use crate::license::{validate_license, Language, LicenseConfirmationRequired, LicenseStatus};
use crate::materializer::materialize;

/// Extension this pipeline cannot decode.
pub const DRACO_EXTENSION: &str = "KHR_draco_mesh_compression";

/// Key under which [`create_vrm_dict`] stores the decoded accessors.
pub const DECODED_ACCESSORS_KEY: &str = "~accessors_decoded";

/// Import configuration.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Run the license gate before decoding.
    pub license_check: bool,
    /// Undo the flipped UVs written by old exporters.
    pub legacy_uv_fix: bool,
    /// Language for confirmation messages.
    pub language: Language,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            license_check: true,
            legacy_uv_fix: true,
            language: Language::English,
        }
    }
}

impl ImportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_license_check(mut self, enabled: bool) -> Self {
        self.license_check = enabled;
        self
    }

    pub fn with_legacy_uv_fix(mut self, enabled: bool) -> Self {
        self.legacy_uv_fix = enabled;
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }
}

/// What an import produced.
#[derive(Debug)]
pub enum ImportOutcome {
    Imported(Box<VrmDocument>),
    /// The license gate fired. Re-run with `license_check` disabled once the
    /// items have been acknowledged.
    LicenseConfirmationRequired(LicenseConfirmationRequired),
}

impl ImportOutcome {
    pub fn document(self) -> Option<VrmDocument> {
        match self {
            ImportOutcome::Imported(document) => Some(*document),
            ImportOutcome::LicenseConfirmationRequired(_) => None,
        }
    }

    pub fn is_imported(&self) -> bool {
        matches!(self, ImportOutcome::Imported(_))
    }
}

/// Entry point for reading VRM files.
pub struct VrmReader;

impl VrmReader {
    /// Reads and imports the file at `path`.
    pub fn open<P: AsRef<Path>>(path: P, options: &ImportOptions) -> Result<ImportOutcome> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        tracing::info!(path = %path.display(), bytes = data.len(), "reading VRM");
        Self::from_glb(&data, Some(path.to_path_buf()), options)
    }

    /// Imports an in-memory container.
    pub fn from_glb(data: &[u8], path: Option<PathBuf>, options: &ImportOptions) -> Result<ImportOutcome> {
        let glb = parse_glb(data)?;
        let json = glb.json;
        if !json.is_object() {
            return Err(VrmError::InvalidGltf(format!(
                "document root must be an object, found {}",
                json
            )));
        }
        reject_draco(&json)?;

        if options.license_check {
            if let LicenseStatus::ConfirmationRequired(required) = validate_license(&json) {
                return Ok(ImportOutcome::LicenseConfirmationRequired(required));
            }
        }

        let mut warnings = Vec::new();
        let decoded_accessors = decode_accessors(&json, glb.binary, &mut warnings)?;
        let scene = materialize(&json, &decoded_accessors, options.legacy_uv_fix, &mut warnings)?;

        tracing::info!(
            meshes = scene.meshes.len(),
            nodes = scene.nodes.len(),
            materials = scene.materials.len(),
            warnings = warnings.len(),
            "imported VRM"
        );
        Ok(ImportOutcome::Imported(Box::new(VrmDocument {
            path,
            json,
            decoded_accessors,
            meta: scene.meta,
            meshes: scene.meshes,
            nodes: scene.nodes,
            origin_nodes: scene.origin_nodes,
            skins: scene.skins,
            materials: scene.materials,
            warnings,
        })))
    }

    /// Demuxes `data` and evaluates only its license metadata.
    pub fn check_license(data: &[u8]) -> Result<LicenseStatus> {
        let glb = parse_glb(data)?;
        Ok(validate_license(&glb.json))
    }
}

fn is_draco(name: &str) -> bool {
    name.eq_ignore_ascii_case(DRACO_EXTENSION)
}

/// Fails if the document needs Draco-compressed geometry.
fn reject_draco(json: &Value) -> Result<()> {
    let required = vrm_core::json_path::get_array_or_empty(json, &["extensionsRequired"])
        .iter()
        .filter_map(Value::as_str)
        .any(is_draco);

    let on_primitive = vrm_core::json_path::get_array_or_empty(json, &["meshes"])
        .iter()
        .flat_map(|mesh| vrm_core::json_path::get_array_or_empty(mesh, &["primitives"]))
        .filter_map(|primitive| primitive.get("extensions").and_then(Value::as_object))
        .any(|extensions| extensions.keys().any(|k| is_draco(k)));

    if required || on_primitive {
        return Err(VrmError::Unsupported(
            "Draco compressed meshes cannot be decoded".into(),
        ));
    }
    Ok(())
}

/// Demuxes `data`, decodes its accessors, and returns the JSON tree with the
/// decoded arrays stored under [`DECODED_ACCESSORS_KEY`].
pub fn create_vrm_dict(data: &[u8]) -> Result<Value> {
    let glb = parse_glb(data)?;
    let mut json = glb.json;
    let decoded = decode_accessors(&json, glb.binary, &mut Vec::new())?;
    let object = json
        .as_object_mut()
        .ok_or_else(|| VrmError::InvalidGltf("document root must be an object".into()))?;
    object.insert(
        DECODED_ACCESSORS_KEY.to_string(),
        Value::Array(decoded.iter().map(|array| array.to_json_value()).collect()),
    );
    Ok(json)
}
