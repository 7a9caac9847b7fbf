//! Decoded VRM document model.
//!
//! Everything here is produced once by [`crate::reader::VrmReader`] and is
//! read-only afterwards. Cross references between tables (node to mesh,
//! primitive to material, skin to joint nodes, ...) are plain indices that
//! were range-checked during materialization.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use vrm_core::decoded_array::DecodedArray;

/// Shader marker meaning "use the plain glTF material".
pub const GLTF_SHADER: &str = "VRM_USE_GLTFSHADER";

/// A fully decoded VRM file.
#[derive(Debug, Clone, Serialize)]
pub struct VrmDocument {
    pub path: Option<PathBuf>,
    /// The JSON chunk as parsed, key order preserved.
    pub json: Value,
    /// One decoded array per accessor, indexed by accessor index.
    pub decoded_accessors: Vec<DecodedArray>,
    pub meta: VrmMeta,
    /// Primitives grouped by mesh index.
    pub meshes: Vec<Vec<MeshPrimitive>>,
    pub nodes: Vec<Node>,
    /// Nodes that instantiate a mesh, keyed by node index.
    pub origin_nodes: BTreeMap<usize, OriginNode>,
    pub skins: Vec<Skin>,
    pub materials: Vec<MaterialDescriptor>,
    /// Anomalies tolerated while importing.
    pub warnings: Vec<ImportWarning>,
}

impl VrmDocument {
    /// Decoded array of an accessor.
    pub fn accessor(&self, index: usize) -> Option<&DecodedArray> {
        self.decoded_accessors.get(index)
    }

    pub fn generator(&self) -> Option<&str> {
        vrm_core::json_path::get_str(&self.json, &["asset", "generator"])
    }

    pub fn primitive_count(&self) -> usize {
        self.meshes.iter().map(Vec::len).sum()
    }
}

/// Metadata from `extensions.VRM.meta`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VrmMeta {
    pub title: Option<String>,
    pub version: Option<String>,
    pub author: Option<String>,
    pub contact_information: Option<String>,
    pub reference: Option<String>,
    pub allowed_user_name: Option<String>,
    pub violent_usage_name: Option<String>,
    pub sexual_usage_name: Option<String>,
    pub commercial_usage_name: Option<String>,
    pub other_permission_url: Option<String>,
    pub license_name: Option<String>,
    pub other_license_url: Option<String>,
}

/// Decoded per-vertex position offsets of one morph target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MorphTarget {
    pub positions: DecodedArray,
    /// Accessor the deltas came from; consumers key caches on it.
    pub accessor_index: usize,
}

/// One triangle-list primitive of a mesh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeshPrimitive {
    pub name: String,
    pub mesh_index: usize,
    pub primitive_index: usize,
    pub face_indices: Vec<[u32; 3]>,
    /// Attribute name (`POSITION`, `TEXCOORD_0`, ...) to its array, in
    /// document order.
    pub attributes: IndexMap<String, DecodedArray>,
    pub morph_targets: Option<IndexMap<String, MorphTarget>>,
    pub material_index: Option<usize>,
    pub position_accessor: Option<usize>,
}

impl MeshPrimitive {
    pub fn attribute(&self, name: &str) -> Option<&DecodedArray> {
        self.attributes.get(name)
    }

    pub fn position(&self) -> Option<&DecodedArray> {
        self.attribute("POSITION")
    }

    pub fn normal(&self) -> Option<&DecodedArray> {
        self.attribute("NORMAL")
    }

    pub fn joints(&self) -> Option<&DecodedArray> {
        self.attribute("JOINTS_0")
    }

    pub fn weights(&self) -> Option<&DecodedArray> {
        self.attribute("WEIGHTS_0")
    }

    pub fn texcoord(&self, set: usize) -> Option<&DecodedArray> {
        self.attribute(&format!("TEXCOORD_{}", set))
    }

    pub fn num_faces(&self) -> usize {
        self.face_indices.len()
    }
}

/// A transform node / bone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub index: usize,
    pub name: Option<String>,
    pub translation: [f32; 3],
    /// Quaternion `[x, y, z, w]`.
    pub rotation: [f32; 4],
    pub scale: [f32; 3],
    /// Column-major local matrix, when the node declares one instead of TRS.
    pub matrix: Option<[f32; 16]>,
    pub children: Vec<usize>,
    pub parent: Option<usize>,
    pub mesh: Option<usize>,
    pub skin: Option<usize>,
}

/// A node that instantiates a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OriginNode {
    pub node: usize,
    pub mesh: usize,
    pub skin: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skin {
    pub index: usize,
    pub name: Option<String>,
    pub joints: Vec<usize>,
    pub skeleton: Option<usize>,
    pub inverse_bind_matrices: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AlphaMode {
    Opaque,
    Mask,
    Blend,
}

impl AlphaMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "OPAQUE" => Some(AlphaMode::Opaque),
            "MASK" => Some(AlphaMode::Mask),
            "BLEND" => Some(AlphaMode::Blend),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PbrMetallicRoughness {
    pub base_color_factor: [f32; 4],
    pub base_color_texture: Option<usize>,
    pub metallic_factor: f32,
    pub roughness_factor: f32,
}

impl Default for PbrMetallicRoughness {
    fn default() -> Self {
        Self {
            base_color_factor: [1.0, 1.0, 1.0, 1.0],
            base_color_texture: None,
            metallic_factor: 1.0,
            roughness_factor: 1.0,
        }
    }
}

/// A glTF material paired with its `extensions.VRM.materialProperties` entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialDescriptor {
    pub index: usize,
    pub name: Option<String>,
    /// Shader named by the extension entry, [`GLTF_SHADER`] when absent.
    pub shader: String,
    pub render_queue: Option<i64>,
    pub float_properties: IndexMap<String, f64>,
    pub vector_properties: IndexMap<String, Vec<f64>>,
    pub texture_properties: IndexMap<String, usize>,
    pub keyword_map: IndexMap<String, bool>,
    pub tag_map: IndexMap<String, String>,
    pub pbr: PbrMetallicRoughness,
    pub emissive_factor: [f32; 3],
    pub alpha_mode: AlphaMode,
    pub alpha_cutoff: f32,
    pub double_sided: bool,
}

impl MaterialDescriptor {
    pub fn uses_gltf_shader(&self) -> bool {
        self.shader == GLTF_SHADER
    }
}

/// Non-fatal anomalies recorded during import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ImportWarning {
    AccessorWithoutBufferView { accessor: usize },
    // Possibly a latent problem for consumers that expect skinned meshes.
    MeshNodeWithoutSkin { node: usize, name: Option<String> },
    MaterialSkipped { material: usize, reason: String },
    MaterialPropertiesIgnored { reason: String },
}

impl fmt::Display for ImportWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportWarning::AccessorWithoutBufferView { accessor } => {
                write!(f, "accessors[{}] has no bufferView; decoded as empty", accessor)
            }
            ImportWarning::MeshNodeWithoutSkin { node, name } => write!(
                f,
                "nodes[{}] ({}) has a mesh but no skin",
                node,
                name.as_deref().unwrap_or("unnamed")
            ),
            ImportWarning::MaterialSkipped { material, reason } => {
                write!(f, "materials[{}] skipped: {}", material, reason)
            }
            ImportWarning::MaterialPropertiesIgnored { reason } => {
                write!(f, "VRM material properties ignored: {}", reason)
            }
        }
    }
}
