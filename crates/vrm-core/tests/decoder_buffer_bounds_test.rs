use proptest::prelude::*;
use vrm_core::data_types::ComponentType;
use vrm_core::decoder_buffer::DecoderBuffer;
use vrm_core::status::CoreError;

fn component_type() -> impl Strategy<Value = ComponentType> {
    prop_oneof![
        Just(ComponentType::Int8),
        Just(ComponentType::Uint8),
        Just(ComponentType::Int16),
        Just(ComponentType::Uint16),
        Just(ComponentType::Int32),
        Just(ComponentType::Uint32),
        Just(ComponentType::Float32),
    ]
}

proptest! {
    #[test]
    fn read_bytes_succeeds_only_within_bounds(
        data in proptest::collection::vec(any::<u8>(), 0..64),
        start in 0usize..80,
        len in 0usize..80,
    ) {
        let mut buffer = DecoderBuffer::new(&data);
        match buffer.seek(start) {
            Ok(()) => {
                let result = buffer.read_bytes(len);
                if start + len <= data.len() {
                    prop_assert_eq!(result.unwrap(), &data[start..start + len]);
                    prop_assert_eq!(buffer.position(), start + len);
                } else {
                    prop_assert!(
                        matches!(result, Err(CoreError::OutOfBounds { .. })),
                        "expected OutOfBounds error"
                    );
                    prop_assert_eq!(buffer.position(), start);
                }
            }
            Err(err) => {
                prop_assert!(start > data.len());
                prop_assert!(err.is_out_of_bounds());
            }
        }
    }

    #[test]
    fn scalar_reads_consume_component_width(
        data in proptest::collection::vec(any::<u8>(), 0..16),
        component in component_type(),
    ) {
        let mut buffer = DecoderBuffer::new(&data);
        let result = buffer.read_scalar(component);
        if data.len() >= component.byte_length() {
            prop_assert!(result.is_ok());
            prop_assert_eq!(buffer.position(), component.byte_length());
            prop_assert_eq!(result.unwrap().is_integral(), component.is_integral());
        } else {
            prop_assert!(result.is_err());
            prop_assert_eq!(buffer.position(), 0);
        }
    }
}
