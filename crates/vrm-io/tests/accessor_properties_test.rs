//! Properties of accessor decoding over generated documents.

mod common;

use proptest::prelude::*;
use serde_json::json;
use vrm_io::accessor_decoder::decode_accessors;
use vrm_io::glb::parse_glb;

#[derive(Debug, Clone)]
struct AccessorSpec {
    kind: &'static str,
    arity: usize,
    count: usize,
    placeholder: bool,
}

fn accessor_spec() -> impl Strategy<Value = AccessorSpec> {
    (
        prop_oneof![
            Just(("SCALAR", 1usize)),
            Just(("VEC2", 2)),
            Just(("VEC3", 3)),
            Just(("VEC4", 4)),
            Just(("MAT4", 16)),
        ],
        0usize..12,
        prop::bool::weighted(0.2),
    )
        .prop_map(|((kind, arity), count, placeholder)| AccessorSpec {
            kind,
            arity,
            count,
            placeholder,
        })
}

proptest! {
    #[test]
    fn decoded_lengths_match_declared_counts(specs in prop::collection::vec(accessor_spec(), 0..8)) {
        let mut builder = common::GlbBuilder::new();
        for (i, spec) in specs.iter().enumerate() {
            if spec.placeholder {
                builder.placeholder(5126, spec.count, spec.kind);
            } else {
                // Tag every component with its accessor index so order can be checked.
                let values = vec![i as f32; spec.count * spec.arity];
                builder.floats(spec.kind, spec.arity, &values);
            }
        }
        let data = builder.build(json!({}));
        let glb = parse_glb(&data).unwrap();

        let mut warnings = Vec::new();
        let decoded = decode_accessors(&glb.json, glb.binary, &mut warnings).unwrap();

        prop_assert_eq!(decoded.len(), specs.len());
        prop_assert_eq!(warnings.len(), specs.iter().filter(|s| s.placeholder).count());
        for (i, (array, spec)) in decoded.iter().zip(&specs).enumerate() {
            prop_assert_eq!(array.arity(), spec.arity);
            if spec.placeholder {
                prop_assert!(array.is_empty());
            } else {
                prop_assert_eq!(array.len(), spec.count);
                prop_assert_eq!(array.values().len(), spec.count * spec.arity);
                prop_assert!(array.values().iter().all(|v| v.as_f64() == i as f64));
            }
        }
    }
}
