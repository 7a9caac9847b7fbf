//! Scene materialization.
//!
//! Walks `meshes`, `materials`, `skins` and `nodes` of a parsed document and
//! builds the records of [`crate::document`] from the decoded accessor table.
//! Every cross-table index is range-checked here so that consumers can index
//! the sibling tables directly.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde_json::{Map, Value};
use vrm_core::decoded_array::DecodedArray;
use vrm_core::json_path;

use crate::document::{
    AlphaMode, ImportWarning, MaterialDescriptor, MeshPrimitive, MorphTarget, Node, OriginNode,
    PbrMetallicRoughness, Skin, VrmMeta, GLTF_SHADER,
};
use crate::error::{Result, VrmError};

/// glTF `TRIANGLES` primitive mode; also the default when `mode` is absent.
pub const MODE_TRIANGLES: u64 = 4;

/// Generator prefix of the producer whose old releases flipped UV `v`.
const LEGACY_UV_GENERATOR: &str = "UniGLTF";
/// First release of that producer that writes UVs correctly.
const LEGACY_UV_FIXED_VERSION: f64 = 1.16;

/// Everything the materializer derives from one document.
#[derive(Debug, Default)]
pub struct Scene {
    pub meta: VrmMeta,
    pub meshes: Vec<Vec<MeshPrimitive>>,
    pub nodes: Vec<Node>,
    pub origin_nodes: BTreeMap<usize, OriginNode>,
    pub skins: Vec<Skin>,
    pub materials: Vec<MaterialDescriptor>,
}

/// Builds the scene records of `json`.
///
/// `accessors` must be the output of
/// [`decode_accessors`](crate::accessor_decoder::decode_accessors) for the
/// same document.
pub fn materialize(
    json: &Value,
    accessors: &[DecodedArray],
    legacy_uv_fix: bool,
    warnings: &mut Vec<ImportWarning>,
) -> Result<Scene> {
    let fix_uv = legacy_uv_fix
        && json_path::get_str(json, &["asset", "generator"]).map_or(false, is_legacy_uv_generator);
    if fix_uv {
        tracing::info!("applying legacy UV orientation fix");
    }

    let meta = read_meta(json);
    let materials = read_materials(json, warnings);
    let meshes = read_meshes(json, accessors, fix_uv)?;
    let skins = read_skins(json)?;
    let (nodes, origin_nodes) = read_nodes(json, warnings)?;

    tracing::debug!(
        meshes = meshes.len(),
        nodes = nodes.len(),
        skins = skins.len(),
        materials = materials.len(),
        "materialized scene"
    );
    Ok(Scene {
        meta,
        meshes,
        nodes,
        origin_nodes,
        skins,
        materials,
    })
}

/// True for generator tags of the form `UniGLTF...x.yy` with a version
/// below 1.16.
pub fn is_legacy_uv_generator(generator: &str) -> bool {
    if !generator.starts_with(LEGACY_UV_GENERATOR) {
        return false;
    }
    let Some((start, _)) = generator.char_indices().rev().nth(3) else {
        return false;
    };
    generator[start..]
        .trim()
        .parse::<f64>()
        .map_or(false, |version| version < LEGACY_UV_FIXED_VERSION)
}

/// Reads `extensions.VRM.meta`.
pub fn read_meta(json: &Value) -> VrmMeta {
    let field = |key: &str| {
        json_path::get_str(json, &["extensions", "VRM", "meta", key]).map(str::to_string)
    };
    VrmMeta {
        title: field("title"),
        version: field("version"),
        author: field("author"),
        contact_information: field("contactInformation"),
        reference: field("reference"),
        allowed_user_name: field("allowedUserName"),
        violent_usage_name: field("violentUssageName"),
        sexual_usage_name: field("sexualUssageName"),
        commercial_usage_name: field("commercialUssageName"),
        other_permission_url: field("otherPermissionUrl"),
        license_name: field("licenseName"),
        other_license_url: field("otherLicenseUrl"),
    }
}

fn table_len(json: &Value, table: &str) -> usize {
    json_path::get_array_or_empty(json, &[table]).len()
}

/// Reads an optional index field and checks it against `bound`.
fn optional_index(object: &Value, key: &str, bound: usize, context: &str) -> Result<Option<usize>> {
    let Some(value) = object.get(key) else {
        return Ok(None);
    };
    let index = value
        .as_u64()
        .and_then(|v| usize::try_from(v).ok())
        .ok_or_else(|| VrmError::InvalidGltf(format!("{}.{} is not an index: {}", context, key, value)))?;
    check_index(index, bound, &format!("{}.{}", context, key))?;
    Ok(Some(index))
}

fn check_index(index: usize, bound: usize, context: &str) -> Result<()> {
    if index >= bound {
        return Err(VrmError::InvalidGltf(format!(
            "{} = {} is out of range (table has {} entries)",
            context, index, bound
        )));
    }
    Ok(())
}

fn decoded<'a>(accessors: &'a [DecodedArray], index: &Value, context: &str) -> Result<(usize, &'a DecodedArray)> {
    let index = index
        .as_u64()
        .and_then(|v| usize::try_from(v).ok())
        .ok_or_else(|| VrmError::InvalidGltf(format!("{} is not an accessor index: {}", context, index)))?;
    let array = accessors.get(index).ok_or_else(|| {
        VrmError::InvalidGltf(format!(
            "{} references missing accessor {} ({} accessors)",
            context,
            index,
            accessors.len()
        ))
    })?;
    Ok((index, array))
}

// ---------------------------------------------------------------------------
// Meshes
// ---------------------------------------------------------------------------

fn read_meshes(json: &Value, accessors: &[DecodedArray], fix_uv: bool) -> Result<Vec<Vec<MeshPrimitive>>> {
    let material_count = table_len(json, "materials");
    json_path::get_array_or_empty(json, &["meshes"])
        .iter()
        .enumerate()
        .map(|(mesh_index, mesh)| {
            let name = mesh
                .get("name")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("mesh{}", mesh_index));
            json_path::get_array_or_empty(mesh, &["primitives"])
                .iter()
                .enumerate()
                .map(|(primitive_index, primitive)| {
                    read_primitive(
                        primitive,
                        &name,
                        mesh_index,
                        primitive_index,
                        accessors,
                        material_count,
                        fix_uv,
                    )
                })
                .collect::<Result<Vec<_>>>()
        })
        .collect()
}

fn read_primitive(
    primitive: &Value,
    mesh_name: &str,
    mesh_index: usize,
    primitive_index: usize,
    accessors: &[DecodedArray],
    material_count: usize,
    fix_uv: bool,
) -> Result<MeshPrimitive> {
    let context = format!("meshes[{}].primitives[{}]", mesh_index, primitive_index);

    let mode = primitive.get("mode").map_or(Some(MODE_TRIANGLES), Value::as_u64);
    if mode != Some(MODE_TRIANGLES) {
        return Err(VrmError::Unsupported(format!(
            "{}: primitive mode {} (only triangles are supported)",
            context,
            primitive.get("mode").unwrap_or(&Value::Null)
        )));
    }

    let name = if primitive_index == 0 {
        mesh_name.to_string()
    } else {
        format!("{}{}", mesh_name, primitive_index)
    };

    let mut attributes = IndexMap::new();
    let mut position_accessor = None;
    if let Some(attribute_map) = primitive.get("attributes").and_then(Value::as_object) {
        for (attribute, index) in attribute_map {
            let (index, array) = decoded(accessors, index, &format!("{}.attributes.{}", context, attribute))?;
            if attribute == "POSITION" {
                position_accessor = Some(index);
            }
            attributes.insert(attribute.clone(), array.clone());
        }
    }

    if fix_uv {
        apply_legacy_uv_fix(&mut attributes);
    }

    let face_indices = read_faces(primitive, &attributes, accessors, &context)?;
    let material_index = optional_index(primitive, "material", material_count, &context)?;
    let morph_targets = read_morph_targets(primitive, accessors, &context)?;

    tracing::trace!(
        mesh = mesh_index,
        primitive = primitive_index,
        faces = face_indices.len(),
        attributes = attributes.len(),
        "read primitive"
    );
    Ok(MeshPrimitive {
        name,
        mesh_index,
        primitive_index,
        face_indices,
        attributes,
        morph_targets,
        material_index,
        position_accessor,
    })
}

fn read_faces(
    primitive: &Value,
    attributes: &IndexMap<String, DecodedArray>,
    accessors: &[DecodedArray],
    context: &str,
) -> Result<Vec<[u32; 3]>> {
    let indices: Vec<u32> = match primitive.get("indices") {
        Some(index) => {
            let (_, array) = decoded(accessors, index, &format!("{}.indices", context))?;
            array
                .cast::<u32>()
                .ok_or_else(|| VrmError::InvalidGltf(format!("{}: index values must be non-negative", context)))?
        }
        None => {
            // Non-indexed: consecutive vertices form triangles.
            let count = attributes.get("POSITION").map(DecodedArray::len).ok_or_else(|| {
                VrmError::InvalidGltf(format!("{}: non-indexed primitive without POSITION", context))
            })?;
            (0..count as u32).collect()
        }
    };

    if indices.len() % 3 != 0 {
        return Err(VrmError::InvalidGltf(format!(
            "{}: {} indices do not form whole triangles",
            context,
            indices.len()
        )));
    }
    Ok(indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]]).collect())
}

/// Rewrites `v` to `1 + v` on every `TEXCOORD_n` set, stopping at the first
/// missing set.
fn apply_legacy_uv_fix(attributes: &mut IndexMap<String, DecodedArray>) {
    for set in 0.. {
        let Some(texcoord) = attributes.get_mut(&format!("TEXCOORD_{}", set)) else {
            break;
        };
        for uv in texcoord.elements_mut() {
            if let Some(v) = uv.get_mut(1) {
                *v = v.offset_by(1);
            }
        }
    }
}

fn read_morph_targets(
    primitive: &Value,
    accessors: &[DecodedArray],
    context: &str,
) -> Result<Option<IndexMap<String, MorphTarget>>> {
    let Some(targets) = primitive.get("targets").and_then(Value::as_array) else {
        return Ok(None);
    };

    let mut morph_targets = IndexMap::with_capacity(targets.len());
    for (i, target) in targets.iter().enumerate() {
        let target_context = format!("{}.targets[{}]", context, i);
        let position = target
            .get("POSITION")
            .ok_or_else(|| VrmError::InvalidGltf(format!("{} has no POSITION", target_context)))?;
        let (accessor_index, positions) = decoded(accessors, position, &target_context)?;

        // Old exporters put the name on the target itself.
        let name = match target.get("extra") {
            Some(extra) => extra.get("name"),
            None => json_path::get(primitive, &["extras", "targetNames", i.to_string().as_str()]),
        };
        let name = match name {
            Some(Value::String(s)) => s.clone(),
            Some(other) if !other.is_null() => other.to_string(),
            _ => {
                return Err(VrmError::InvalidGltf(format!(
                    "{} has no name in extra.name or extras.targetNames",
                    target_context
                )))
            }
        };

        morph_targets.insert(
            name,
            MorphTarget {
                positions: positions.clone(),
                accessor_index,
            },
        );
    }
    Ok(Some(morph_targets))
}

// ---------------------------------------------------------------------------
// Skins and nodes
// ---------------------------------------------------------------------------

fn read_skins(json: &Value) -> Result<Vec<Skin>> {
    let node_count = table_len(json, "nodes");
    let accessor_count = table_len(json, "accessors");
    json_path::get_array_or_empty(json, &["skins"])
        .iter()
        .enumerate()
        .map(|(index, skin)| -> Result<Skin> {
            let context = format!("skins[{}]", index);
            let joints = json_path::get_usize_array(skin, &["joints"])
                .ok_or_else(|| VrmError::InvalidGltf(format!("{}.joints must be a list of node indices", context)))?;
            for joint in &joints {
                check_index(*joint, node_count, &format!("{}.joints", context))?;
            }
            Ok(Skin {
                index,
                name: json_path::get_str(skin, &["name"]).map(str::to_string),
                joints,
                skeleton: optional_index(skin, "skeleton", node_count, &context)?,
                inverse_bind_matrices: optional_index(skin, "inverseBindMatrices", accessor_count, &context)?,
            })
        })
        .collect()
}

fn read_nodes(json: &Value, warnings: &mut Vec<ImportWarning>) -> Result<(Vec<Node>, BTreeMap<usize, OriginNode>)> {
    let json_nodes = json_path::get_array_or_empty(json, &["nodes"]);
    let mesh_count = table_len(json, "meshes");
    let skin_count = table_len(json, "skins");

    let mut nodes = Vec::with_capacity(json_nodes.len());
    let mut origin_nodes = BTreeMap::new();
    for (index, node) in json_nodes.iter().enumerate() {
        let context = format!("nodes[{}]", index);
        let children = match node.get("children") {
            None => Vec::new(),
            Some(_) => json_path::get_usize_array(node, &["children"])
                .ok_or_else(|| VrmError::InvalidGltf(format!("{}.children must be a list of node indices", context)))?,
        };
        for child in &children {
            check_index(*child, json_nodes.len(), &format!("{}.children", context))?;
        }

        let record = Node {
            index,
            name: json_path::get_str(node, &["name"]).map(str::to_string),
            translation: json_path::get_f32_array(node, &["translation"]).unwrap_or([0.0; 3]),
            rotation: json_path::get_f32_array(node, &["rotation"]).unwrap_or([0.0, 0.0, 0.0, 1.0]),
            scale: json_path::get_f32_array(node, &["scale"]).unwrap_or([1.0; 3]),
            matrix: json_path::get_f32_array(node, &["matrix"]),
            children,
            parent: None,
            mesh: optional_index(node, "mesh", mesh_count, &context)?,
            skin: optional_index(node, "skin", skin_count, &context)?,
        };

        if let Some(mesh) = record.mesh {
            if record.skin.is_none() {
                tracing::warn!(node = index, name = ?record.name, "node has a mesh but no skin");
                warnings.push(ImportWarning::MeshNodeWithoutSkin {
                    node: index,
                    name: record.name.clone(),
                });
            }
            origin_nodes.insert(
                index,
                OriginNode {
                    node: index,
                    mesh,
                    skin: record.skin,
                },
            );
        }
        nodes.push(record);
    }

    link_parents(&mut nodes)?;
    Ok((nodes, origin_nodes))
}

fn link_parents(nodes: &mut [Node]) -> Result<()> {
    let links: Vec<(usize, usize)> = nodes
        .iter()
        .flat_map(|node| node.children.iter().map(move |child| (node.index, *child)))
        .collect();
    for (parent, child) in links {
        let slot = &mut nodes[child].parent;
        if let Some(existing) = *slot {
            return Err(VrmError::InvalidGltf(format!(
                "nodes[{}] is a child of both nodes[{}] and nodes[{}]",
                child, existing, parent
            )));
        }
        *slot = Some(parent);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Materials
// ---------------------------------------------------------------------------

fn default_material_properties() -> Value {
    let mut entry = Map::new();
    entry.insert("shader".into(), Value::from(GLTF_SHADER));
    Value::Object(entry)
}

fn read_materials(json: &Value, warnings: &mut Vec<ImportWarning>) -> Vec<MaterialDescriptor> {
    let json_materials = json_path::get_array_or_empty(json, &["materials"]);
    let texture_count = table_len(json, "textures");

    let extension_entries: &[Value] = match json_path::get(json, &["extensions", "VRM", "materialProperties"]) {
        None => &[],
        Some(Value::Array(entries)) => entries.as_slice(),
        Some(_) => {
            let reason = "extensions.VRM.materialProperties is not a list".to_string();
            tracing::warn!("{}", reason);
            warnings.push(ImportWarning::MaterialPropertiesIgnored { reason });
            &[]
        }
    };
    let default_entry = default_material_properties();

    let mut materials = Vec::with_capacity(json_materials.len());
    for (index, material) in json_materials.iter().enumerate() {
        let extension = extension_entries.get(index).unwrap_or(&default_entry);
        match read_material(index, material, extension, texture_count) {
            Ok(descriptor) => materials.push(descriptor),
            Err(reason) => {
                tracing::warn!(material = index, %reason, "skipping malformed material");
                warnings.push(ImportWarning::MaterialSkipped { material: index, reason });
            }
        }
    }
    materials
}

/// Reads an object-valued property map whose values all convert with `convert`.
fn property_map<T>(
    extension: &Map<String, Value>,
    key: &str,
    convert: impl Fn(&Value) -> Option<T>,
) -> std::result::Result<IndexMap<String, T>, String> {
    let Some(value) = extension.get(key) else {
        return Ok(IndexMap::new());
    };
    let object = value
        .as_object()
        .ok_or_else(|| format!("{} is not an object", key))?;
    object
        .iter()
        .map(|(name, v)| {
            convert(v)
                .map(|converted| (name.clone(), converted))
                .ok_or_else(|| format!("{}.{} has an unexpected value: {}", key, name, v))
        })
        .collect()
}

fn read_material(
    index: usize,
    material: &Value,
    extension: &Value,
    texture_count: usize,
) -> std::result::Result<MaterialDescriptor, String> {
    if !material.is_object() {
        return Err("material is not an object".into());
    }
    let extension = extension
        .as_object()
        .ok_or_else(|| "materialProperties entry is not an object".to_string())?;

    let shader = match extension.get("shader") {
        None => GLTF_SHADER.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => return Err(format!("shader is not a string: {}", other)),
    };
    let render_queue = match extension.get("renderQueue") {
        None => None,
        Some(v) => Some(v.as_i64().ok_or_else(|| format!("renderQueue is not an integer: {}", v))?),
    };

    let float_properties = property_map(extension, "floatProperties", Value::as_f64)?;
    let vector_properties = property_map(extension, "vectorProperties", |v| {
        v.as_array()?.iter().map(Value::as_f64).collect::<Option<Vec<f64>>>()
    })?;
    let texture_properties = property_map(extension, "textureProperties", |v| {
        v.as_u64().and_then(|t| usize::try_from(t).ok()).filter(|t| *t < texture_count)
    })?;
    let keyword_map = property_map(extension, "keywordMap", Value::as_bool)?;
    let tag_map = property_map(extension, "tagMap", |v| v.as_str().map(str::to_string))?;

    let pbr = match material.get("pbrMetallicRoughness") {
        None => PbrMetallicRoughness::default(),
        Some(pbr) => {
            let defaults = PbrMetallicRoughness::default();
            PbrMetallicRoughness {
                base_color_factor: json_path::get_f32_array(pbr, &["baseColorFactor"])
                    .unwrap_or(defaults.base_color_factor),
                base_color_texture: json_path::get_usize(pbr, &["baseColorTexture", "index"]),
                metallic_factor: json_path::get_f64(pbr, &["metallicFactor"])
                    .map_or(defaults.metallic_factor, |v| v as f32),
                roughness_factor: json_path::get_f64(pbr, &["roughnessFactor"])
                    .map_or(defaults.roughness_factor, |v| v as f32),
            }
        }
    };
    if let Some(texture) = pbr.base_color_texture {
        if texture >= texture_count {
            return Err(format!("baseColorTexture {} is out of range", texture));
        }
    }

    let alpha_mode = match json_path::get_str(material, &["alphaMode"]) {
        None => AlphaMode::Opaque,
        Some(mode) => AlphaMode::parse(mode).ok_or_else(|| format!("unknown alphaMode {:?}", mode))?,
    };

    Ok(MaterialDescriptor {
        index,
        name: json_path::get_str(material, &["name"]).map(str::to_string),
        shader,
        render_queue,
        float_properties,
        vector_properties,
        texture_properties,
        keyword_map,
        tag_map,
        pbr,
        emissive_factor: json_path::get_f32_array(material, &["emissiveFactor"]).unwrap_or([0.0; 3]),
        alpha_mode,
        alpha_cutoff: json_path::get_f64(material, &["alphaCutoff"]).map_or(0.5, |v| v as f32),
        double_sided: json_path::get_bool(material, &["doubleSided"]).unwrap_or(false),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vrm_core::data_types::{ComponentType, ElementType};
    use vrm_core::decoded_array::Scalar;

    fn floats(element_type: ElementType, values: &[f64]) -> DecodedArray {
        DecodedArray::new(
            ComponentType::Float32,
            element_type,
            values.iter().map(|v| Scalar::Float(*v)).collect(),
        )
    }

    fn indices(values: &[i64]) -> DecodedArray {
        DecodedArray::new(
            ComponentType::Uint16,
            ElementType::Scalar,
            values.iter().map(|v| Scalar::Int(*v)).collect(),
        )
    }

    /// Accessors: 0 = three positions, 1 = triangle indices, 2 = UVs, 3 = morph deltas.
    fn accessors() -> Vec<DecodedArray> {
        vec![
            floats(ElementType::Vec3, &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]),
            indices(&[0, 1, 2]),
            floats(ElementType::Vec2, &[0.2, -0.3, 0.5, -0.5, 0.0, 0.0]),
            floats(ElementType::Vec3, &[0.0; 9]),
        ]
    }

    fn document(generator: &str) -> Value {
        json!({
            "asset": {"version": "2.0", "generator": generator},
            "meshes": [{
                "name": "Body",
                "primitives": [
                    {"mode": 4, "indices": 1, "attributes": {"POSITION": 0, "TEXCOORD_0": 2}, "material": 0},
                    {"indices": 1, "attributes": {"POSITION": 0}}
                ]
            }],
            "materials": [{"name": "skin"}],
            "nodes": [{"name": "root", "children": [1]}, {"name": "body", "mesh": 0, "skin": 0}],
            "skins": [{"joints": [0], "skeleton": 0}]
        })
    }

    fn uv_v(scene: &Scene) -> f64 {
        scene.meshes[0][0].texcoord(0).unwrap().element(0).unwrap()[1].as_f64()
    }

    #[test]
    fn test_legacy_generator_detection() {
        assert!(is_legacy_uv_generator("UniGLTF-1.10"));
        assert!(is_legacy_uv_generator("UniGLTF-1.15"));
        assert!(!is_legacy_uv_generator("UniGLTF-1.16"));
        assert!(!is_legacy_uv_generator("UniGLTF-1.20"));
        assert!(!is_legacy_uv_generator("UniGLTF-beta"));
        assert!(!is_legacy_uv_generator("UniVRM-0.50"));
        assert!(!is_legacy_uv_generator("Uni"));
    }

    #[test]
    fn test_legacy_uv_fix_applied() {
        let scene = materialize(&document("UniGLTF-1.10"), &accessors(), true, &mut Vec::new()).unwrap();
        assert!((uv_v(&scene) - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_modern_generator_untouched() {
        let scene = materialize(&document("UniGLTF-1.20"), &accessors(), true, &mut Vec::new()).unwrap();
        assert!((uv_v(&scene) + 0.3).abs() < 1e-9);

        let disabled = materialize(&document("UniGLTF-1.10"), &accessors(), false, &mut Vec::new()).unwrap();
        assert!((uv_v(&disabled) + 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_uv_fix_leaves_accessor_table_untouched() {
        let table = accessors();
        materialize(&document("UniGLTF-1.10"), &table, true, &mut Vec::new()).unwrap();
        assert_eq!(table[2].element(0).unwrap()[1], Scalar::Float(-0.3));
    }

    #[test]
    fn test_primitive_naming_and_faces() {
        let scene = materialize(&document("test"), &accessors(), true, &mut Vec::new()).unwrap();
        let primitives = &scene.meshes[0];
        assert_eq!(primitives[0].name, "Body");
        assert_eq!(primitives[1].name, "Body1");
        assert_eq!(primitives[0].face_indices, vec![[0, 1, 2]]);
        assert_eq!(primitives[0].position_accessor, Some(0));
        assert_eq!(primitives[0].material_index, Some(0));
        assert_eq!(primitives[1].material_index, None);
        let names: Vec<&str> = primitives[0].attributes.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["POSITION", "TEXCOORD_0"]);
    }

    #[test]
    fn test_non_triangle_mode_rejected() {
        let doc = json!({
            "meshes": [{"name": "m", "primitives": [{"mode": 1, "attributes": {"POSITION": 99}}]}]
        });
        let err = materialize(&doc, &accessors(), true, &mut Vec::new()).unwrap_err();
        // The mode is checked before the dangling POSITION reference is resolved.
        assert!(matches!(err, VrmError::Unsupported(_)));
        assert!(err.is_format_error());
    }

    #[test]
    fn test_sequential_faces_without_indices() {
        let doc = json!({"meshes": [{"name": "m", "primitives": [{"attributes": {"POSITION": 0}}]}]});
        let scene = materialize(&doc, &accessors(), true, &mut Vec::new()).unwrap();
        assert_eq!(scene.meshes[0][0].face_indices, vec![[0, 1, 2]]);
    }

    #[test]
    fn test_partial_triangle_rejected() {
        let mut table = accessors();
        table[1] = indices(&[0, 1, 2, 0]);
        let err = materialize(&document("x"), &table, true, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, VrmError::InvalidGltf(_)));
    }

    #[test]
    fn test_morph_target_names() {
        let doc = json!({
            "meshes": [{"name": "Face", "primitives": [{
                "indices": 1,
                "attributes": {"POSITION": 0},
                "targets": [{"POSITION": 3}, {"POSITION": 3, "extra": {"name": "legacy"}}],
                "extras": {"targetNames": ["blink", "ignored"]}
            }]}]
        });
        let scene = materialize(&doc, &accessors(), true, &mut Vec::new()).unwrap();
        let targets = scene.meshes[0][0].morph_targets.as_ref().unwrap();
        let names: Vec<&str> = targets.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["blink", "legacy"]);
        assert_eq!(targets["blink"].accessor_index, 3);
        assert_eq!(targets["blink"].positions.len(), 3);
    }

    #[test]
    fn test_morph_target_without_name() {
        let doc = json!({
            "meshes": [{"name": "Face", "primitives": [{
                "indices": 1, "attributes": {"POSITION": 0}, "targets": [{"POSITION": 3}]
            }]}]
        });
        assert!(matches!(
            materialize(&doc, &accessors(), true, &mut Vec::new()),
            Err(VrmError::InvalidGltf(_))
        ));
    }

    #[test]
    fn test_nodes_and_skins() {
        let mut warnings = Vec::new();
        let scene = materialize(&document("x"), &accessors(), true, &mut warnings).unwrap();
        assert_eq!(scene.nodes[1].parent, Some(0));
        assert_eq!(scene.nodes[0].parent, None);
        assert_eq!(scene.nodes[0].rotation, [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(scene.skins[0].joints, vec![0]);
        assert_eq!(scene.skins[0].skeleton, Some(0));
        assert_eq!(
            scene.origin_nodes.get(&1),
            Some(&OriginNode { node: 1, mesh: 0, skin: Some(0) })
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_mesh_node_without_skin_is_tolerated() {
        let mut doc = document("x");
        doc["nodes"][1].as_object_mut().unwrap().remove("skin");
        let mut warnings = Vec::new();
        let scene = materialize(&doc, &accessors(), true, &mut warnings).unwrap();
        assert_eq!(scene.origin_nodes[&1].skin, None);
        assert_eq!(
            warnings,
            vec![ImportWarning::MeshNodeWithoutSkin { node: 1, name: Some("body".into()) }]
        );
    }

    #[test]
    fn test_dangling_indices_rejected() {
        let mut doc = document("x");
        doc["nodes"][1]["mesh"] = json!(5);
        assert!(matches!(
            materialize(&doc, &accessors(), true, &mut Vec::new()),
            Err(VrmError::InvalidGltf(_))
        ));

        let mut doc = document("x");
        doc["skins"][0]["joints"] = json!([0, 7]);
        assert!(matches!(
            materialize(&doc, &accessors(), true, &mut Vec::new()),
            Err(VrmError::InvalidGltf(_))
        ));
    }

    #[test]
    fn test_materials_default_and_skip() {
        let doc = json!({
            "materials": [{"name": "a"}, {"name": "b", "alphaMode": "MASK"}, {"name": "c"}],
            "extensions": {"VRM": {"materialProperties": [
                {"shader": "VRM/MToon", "renderQueue": 2450, "floatProperties": {"_Cutoff": 0.5},
                 "keywordMap": {"_ALPHATEST_ON": true}, "tagMap": {"RenderType": "TransparentCutout"}},
                {"shader": "VRM/MToon", "floatProperties": "broken"}
            ]}}
        });
        let mut warnings = Vec::new();
        let scene = materialize(&doc, &[], true, &mut warnings).unwrap();
        assert_eq!(scene.materials.len(), 2);
        assert_eq!(scene.materials[0].shader, "VRM/MToon");
        assert_eq!(scene.materials[0].render_queue, Some(2450));
        assert_eq!(scene.materials[0].float_properties["_Cutoff"], 0.5);
        assert_eq!(scene.materials[0].keyword_map["_ALPHATEST_ON"], true);
        assert_eq!(scene.materials[1].index, 2);
        assert!(scene.materials[1].uses_gltf_shader());
        assert!(matches!(warnings.as_slice(), [ImportWarning::MaterialSkipped { material: 1, .. }]));
    }

    #[test]
    fn test_materials_without_extension_use_gltf_shader() {
        let doc = json!({"materials": [{"name": "a", "doubleSided": true}]});
        let scene = materialize(&doc, &[], true, &mut Vec::new()).unwrap();
        assert!(scene.materials[0].uses_gltf_shader());
        assert!(scene.materials[0].double_sided);
        assert_eq!(scene.materials[0].alpha_mode, AlphaMode::Opaque);
        assert_eq!(scene.materials[0].pbr, PbrMetallicRoughness::default());
    }

    #[test]
    fn test_meta_fields() {
        let doc = json!({"extensions": {"VRM": {"meta": {
            "title": "Avatar", "author": "someone", "violentUssageName": "Disallow", "licenseName": 3
        }}}});
        let meta = read_meta(&doc);
        assert_eq!(meta.title.as_deref(), Some("Avatar"));
        assert_eq!(meta.author.as_deref(), Some("someone"));
        assert_eq!(meta.violent_usage_name.as_deref(), Some("Disallow"));
        assert_eq!(meta.license_name, None);
    }
}
