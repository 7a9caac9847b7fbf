use byteorder::{ByteOrder, LittleEndian};

use crate::data_types::ComponentType;
use crate::decoded_array::Scalar;
use crate::status::CoreError;

/// Positioned reader over an immutable byte buffer.
///
/// `DecoderBuffer` reads fixed-width scalars, fixed-length strings and raw
/// slices, advancing its cursor after every read. Reads that would run past
/// the end of the buffer fail with [`CoreError::OutOfBounds`] and leave the
/// cursor where it was.
///
/// # Example
///
/// ```
/// use vrm_core::decoder_buffer::DecoderBuffer;
///
/// let data = b"glTF\x02\x00\x00\x00";
/// let mut buffer = DecoderBuffer::new(data);
///
/// assert_eq!(buffer.read_fixed_string(4).unwrap(), "glTF");
/// assert_eq!(buffer.read_u32().unwrap(), 2);
/// assert_eq!(buffer.remaining_size(), 0);
/// ```
pub struct DecoderBuffer<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> DecoderBuffer<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Returns the current read position in bytes.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Total length of the underlying buffer.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Repositions the cursor to an absolute offset.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidPosition` if `pos` is beyond the buffer
    /// length. Seeking exactly to the end is allowed.
    pub fn seek(&mut self, pos: usize) -> Result<(), CoreError> {
        if pos > self.data.len() {
            return Err(CoreError::InvalidPosition {
                position: pos,
                len: self.data.len(),
            });
        }
        self.pos = pos;
        Ok(())
    }

    /// Returns the number of bytes remaining in the buffer.
    pub fn remaining_size(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Returns the next `len` bytes and advances past them.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], CoreError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or(CoreError::OutOfBounds {
                offset: self.pos,
                requested: len,
                available: self.data.len(),
            })?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    /// Reads `len` bytes as UTF-8 text.
    pub fn read_fixed_string(&mut self, len: usize) -> Result<String, CoreError> {
        let start = self.pos;
        let bytes = self.read_bytes(len)?;
        match std::str::from_utf8(bytes) {
            Ok(s) => Ok(s.to_string()),
            Err(e) => {
                self.pos = start;
                Err(CoreError::InvalidText(format!(
                    "{} bytes at offset {}: {}",
                    len, start, e
                )))
            }
        }
    }

    pub fn read_u8(&mut self) -> Result<u8, CoreError> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8, CoreError> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_u16(&mut self) -> Result<u16, CoreError> {
        self.read_u16_with::<LittleEndian>()
    }

    pub fn read_i16(&mut self) -> Result<i16, CoreError> {
        Ok(LittleEndian::read_i16(self.read_bytes(2)?))
    }

    /// Decodes a little-endian u32.
    pub fn read_u32(&mut self) -> Result<u32, CoreError> {
        self.read_u32_with::<LittleEndian>()
    }

    pub fn read_i32(&mut self) -> Result<i32, CoreError> {
        Ok(LittleEndian::read_i32(self.read_bytes(4)?))
    }

    pub fn read_f32(&mut self) -> Result<f32, CoreError> {
        Ok(LittleEndian::read_f32(self.read_bytes(4)?))
    }

    /// Reads a u16 with an explicit byte order.
    pub fn read_u16_with<B: ByteOrder>(&mut self) -> Result<u16, CoreError> {
        Ok(B::read_u16(self.read_bytes(2)?))
    }

    /// Reads a u32 with an explicit byte order.
    pub fn read_u32_with<B: ByteOrder>(&mut self) -> Result<u32, CoreError> {
        Ok(B::read_u32(self.read_bytes(4)?))
    }

    /// Reads one little-endian component of the given type, widened to a
    /// [`Scalar`].
    pub fn read_scalar(&mut self, component_type: ComponentType) -> Result<Scalar, CoreError> {
        let value = match component_type {
            ComponentType::Int8 => Scalar::Int(self.read_i8()? as i64),
            ComponentType::Uint8 => Scalar::Int(self.read_u8()? as i64),
            ComponentType::Int16 => Scalar::Int(self.read_i16()? as i64),
            ComponentType::Uint16 => Scalar::Int(self.read_u16()? as i64),
            ComponentType::Int32 => Scalar::Int(self.read_i32()? as i64),
            ComponentType::Uint32 => Scalar::Int(self.read_u32()? as i64),
            ComponentType::Float32 => Scalar::Float(self.read_f32()? as f64),
        };
        Ok(value)
    }
}
