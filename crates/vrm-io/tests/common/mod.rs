//! In-memory GLB construction for integration tests.

#![allow(dead_code)]

use byteorder::{LittleEndian, WriteBytesExt};
use serde_json::{json, Value};

/// Accumulates a binary payload and the bufferViews/accessors describing it.
#[derive(Default)]
pub struct GlbBuilder {
    binary: Vec<u8>,
    buffer_views: Vec<Value>,
    accessors: Vec<Value>,
}

impl GlbBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn align(&mut self) {
        while self.binary.len() % 4 != 0 {
            self.binary.push(0);
        }
    }

    fn push_view(&mut self, bytes: &[u8]) -> usize {
        self.align();
        let offset = self.binary.len();
        self.binary.extend_from_slice(bytes);
        self.buffer_views.push(json!({
            "buffer": 0,
            "byteOffset": offset,
            "byteLength": bytes.len()
        }));
        self.buffer_views.len() - 1
    }

    fn push_accessor(&mut self, view: usize, component_type: u32, count: usize, kind: &str) -> usize {
        self.accessors.push(json!({
            "bufferView": view,
            "componentType": component_type,
            "count": count,
            "type": kind
        }));
        self.accessors.len() - 1
    }

    /// Adds a float accessor of `kind` (`VEC2`, `VEC3`, ...); returns its index.
    pub fn floats(&mut self, kind: &str, arity: usize, values: &[f32]) -> usize {
        let mut bytes = Vec::with_capacity(values.len() * 4);
        for v in values {
            bytes.write_f32::<LittleEndian>(*v).unwrap();
        }
        let view = self.push_view(&bytes);
        self.push_accessor(view, 5126, values.len() / arity, kind)
    }

    /// Adds an unsigned 16-bit scalar accessor; returns its index.
    pub fn u16_scalars(&mut self, values: &[u16]) -> usize {
        let mut bytes = Vec::with_capacity(values.len() * 2);
        for v in values {
            bytes.write_u16::<LittleEndian>(*v).unwrap();
        }
        let view = self.push_view(&bytes);
        self.push_accessor(view, 5123, values.len(), "SCALAR")
    }

    /// Adds an unsigned 8-bit VEC4 accessor, e.g. joint indices.
    pub fn u8_vec4(&mut self, values: &[u8]) -> usize {
        let view = self.push_view(values);
        self.push_accessor(view, 5121, values.len() / 4, "VEC4")
    }

    /// Adds an accessor with no bufferView.
    pub fn placeholder(&mut self, component_type: u32, count: usize, kind: &str) -> usize {
        self.accessors.push(json!({"componentType": component_type, "count": count, "type": kind}));
        self.accessors.len() - 1
    }

    /// Merges the accumulated tables into `document` and encodes the container.
    pub fn build(mut self, mut document: Value) -> Vec<u8> {
        self.align();
        let root = document.as_object_mut().expect("document must be an object");
        root.insert("bufferViews".into(), Value::Array(self.buffer_views));
        root.insert("accessors".into(), Value::Array(self.accessors));
        root.insert("buffers".into(), json!([{"byteLength": self.binary.len()}]));
        container(&document, Some(&self.binary))
    }
}

fn chunk(out: &mut Vec<u8>, kind: &[u8; 4], payload: &[u8]) {
    out.write_u32::<LittleEndian>(payload.len() as u32).unwrap();
    out.extend_from_slice(kind);
    out.extend_from_slice(payload);
}

/// Encodes a container from a JSON document and an optional binary chunk.
pub fn container(document: &Value, binary: Option<&[u8]>) -> Vec<u8> {
    let mut json = serde_json::to_vec(document).unwrap();
    while json.len() % 4 != 0 {
        json.push(b' ');
    }
    let mut body = Vec::new();
    chunk(&mut body, b"JSON", &json);
    if let Some(binary) = binary {
        chunk(&mut body, b"BIN\0", binary);
    }

    let mut out = Vec::with_capacity(12 + body.len());
    out.extend_from_slice(b"glTF");
    out.write_u32::<LittleEndian>(2).unwrap();
    out.write_u32::<LittleEndian>((12 + body.len()) as u32).unwrap();
    out.extend_from_slice(&body);
    out
}

/// A small skinned avatar: one triangle with UVs, joints and a morph target.
pub fn avatar(generator: &str, meta: Value) -> Vec<u8> {
    let mut builder = GlbBuilder::new();
    let position = builder.floats("VEC3", 3, &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
    let uv = builder.floats("VEC2", 2, &[0.2, -0.3, 1.0, -1.0, 0.0, -1.0]);
    let joints = builder.u8_vec4(&[0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0]);
    let weights = builder.floats("VEC4", 4, &[1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0]);
    let indices = builder.u16_scalars(&[0, 1, 2]);
    let morph = builder.floats("VEC3", 3, &[0.0, 0.0, 0.1, 0.0, 0.0, 0.1, 0.0, 0.0, 0.1]);

    builder.build(json!({
        "asset": {"version": "2.0", "generator": generator},
        "scene": 0,
        "scenes": [{"nodes": [0]}],
        "nodes": [
            {"name": "Root", "children": [1, 2]},
            {"name": "Hips", "translation": [0.0, 1.0, 0.0]},
            {"name": "Body", "mesh": 0, "skin": 0}
        ],
        "skins": [{"joints": [0, 1], "skeleton": 0}],
        "meshes": [{
            "name": "Body",
            "primitives": [{
                "mode": 4,
                "indices": indices,
                "material": 0,
                "attributes": {
                    "POSITION": position,
                    "TEXCOORD_0": uv,
                    "JOINTS_0": joints,
                    "WEIGHTS_0": weights
                },
                "targets": [{"POSITION": morph}],
                "extras": {"targetNames": ["Blink"]}
            }]
        }],
        "materials": [{"name": "Skin", "pbrMetallicRoughness": {"baseColorFactor": [1.0, 0.5, 0.5, 1.0]}}],
        "extensions": {"VRM": {
            "meta": meta,
            "materialProperties": [{"shader": "VRM/MToon", "renderQueue": 2000}]
        }}
    }))
}
