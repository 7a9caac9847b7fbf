//! Accessor decoding.
//!
//! Produces one [`DecodedArray`] per entry of the document's `accessors`
//! array. The output is indexed exactly like the input: other parts of the
//! document refer to accessors by position, so the decoded array at index `i`
//! always belongs to accessor `i`.

use serde::Deserialize;
use serde_json::Value;
use vrm_core::data_types::{ComponentType, ElementType};
use vrm_core::decoded_array::DecodedArray;
use vrm_core::decoder_buffer::DecoderBuffer;
use vrm_core::json_path;
use vrm_core::status::CoreError;

use crate::document::ImportWarning;
use crate::error::{Result, VrmError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Accessor {
    buffer_view: Option<usize>,
    #[serde(default)]
    byte_offset: usize,
    component_type: Option<u32>,
    count: Option<usize>,
    #[serde(rename = "type")]
    accessor_type: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BufferView {
    #[serde(default)]
    buffer: usize,
    #[serde(default)]
    byte_offset: usize,
    byte_stride: Option<usize>,
}

/// Decodes every accessor of `json` against the container's binary payload.
///
/// Accessors without a `bufferView` decode to empty arrays and are reported
/// through `warnings`.
pub fn decode_accessors(
    json: &Value,
    binary: &[u8],
    warnings: &mut Vec<ImportWarning>,
) -> Result<Vec<DecodedArray>> {
    let accessors = json_path::get_array_or_empty(json, &["accessors"]);
    let buffer_views = json_path::get_array_or_empty(json, &["bufferViews"]);
    let mut reader = DecoderBuffer::new(binary);

    let mut decoded = Vec::with_capacity(accessors.len());
    for (index, value) in accessors.iter().enumerate() {
        let accessor = Accessor::deserialize(value).map_err(|e| {
            VrmError::InvalidGltf(format!("accessors[{}] is malformed: {}", index, e))
        })?;
        if accessor.buffer_view.is_none() {
            warnings.push(ImportWarning::AccessorWithoutBufferView { accessor: index });
        }
        decoded.push(decode_accessor(index, &accessor, buffer_views, &mut reader)?);
    }

    tracing::debug!(accessors = decoded.len(), "decoded accessors");
    Ok(decoded)
}

fn decode_accessor(
    index: usize,
    accessor: &Accessor,
    buffer_views: &[Value],
    reader: &mut DecoderBuffer<'_>,
) -> Result<DecodedArray> {
    let element_type = ElementType::parse(&accessor.accessor_type)?;

    let Some(view_index) = accessor.buffer_view else {
        tracing::warn!(
            accessor = index,
            "accessor has no bufferView; decoding as an empty array"
        );
        // Only the arity matters for a placeholder.
        let component_type = accessor
            .component_type
            .and_then(|gl| ComponentType::from_gl(gl).ok())
            .unwrap_or(ComponentType::Float32);
        return Ok(DecodedArray::empty(component_type, element_type));
    };

    let component_type = ComponentType::from_gl(accessor.component_type.ok_or_else(|| {
        VrmError::InvalidGltf(format!("accessors[{}] has no componentType", index))
    })?)?;
    let count = accessor
        .count
        .ok_or_else(|| VrmError::InvalidGltf(format!("accessors[{}] has no count", index)))?;

    let view_value = buffer_views.get(view_index).ok_or_else(|| {
        VrmError::InvalidGltf(format!(
            "accessors[{}] references missing bufferView {}",
            index, view_index
        ))
    })?;
    let view = BufferView::deserialize(view_value).map_err(|e| {
        VrmError::InvalidGltf(format!("bufferViews[{}] is malformed: {}", view_index, e))
    })?;
    if view.buffer != 0 {
        return Err(VrmError::Unsupported(format!(
            "bufferViews[{}] references external buffer {}",
            view_index, view.buffer
        )));
    }

    let arity = element_type.arity();
    let element_size = arity * component_type.byte_length();
    let start = view
        .byte_offset
        .checked_add(accessor.byte_offset)
        .ok_or_else(|| offset_overflow(view.byte_offset, element_size, reader.len()))?;
    // A stride equal to the packed size is the same as no stride.
    let stride = view.byte_stride.filter(|s| *s != element_size);

    let total = count.saturating_mul(arity);
    let mut values = Vec::with_capacity(total.min(reader.len()));
    reader.seek(start)?;
    for element in 0..count {
        if let Some(stride) = stride {
            let offset = element
                .checked_mul(stride)
                .and_then(|delta| start.checked_add(delta))
                .ok_or_else(|| offset_overflow(start, element_size, reader.len()))?;
            reader.seek(offset)?;
        }
        for _ in 0..arity {
            values.push(reader.read_scalar(component_type)?);
        }
    }

    tracing::trace!(
        accessor = index,
        count,
        element_type = %element_type,
        component_type = ?component_type,
        "decoded accessor"
    );
    Ok(DecodedArray::new(component_type, element_type, values))
}

/// An element offset that does not fit in `usize` lies past any payload.
fn offset_overflow(offset: usize, requested: usize, available: usize) -> VrmError {
    VrmError::OutOfBounds(CoreError::OutOfBounds {
        offset,
        requested,
        available,
    })
}
