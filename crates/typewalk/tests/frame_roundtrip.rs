// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Property tests: encoded frames decode to the walked values, and printing
//! a decoded frame matches printing the value directly.

#![allow(dead_code)]

use proptest::prelude::*;
use typewalk::frame::get;
use typewalk::{
    decode_frame, encode_frame_with, print_frame, Described, EncoderConfig, FrameValue, Instance,
    Walker,
};

#[derive(Debug, Described)]
#[repr(C)]
struct Sample {
    id: i32,
    gain: f32,
    offset: i32,
}

#[derive(Described)]
#[repr(C)]
struct Pair {
    left: Sample,
    weight: f32,
    right: Sample,
}

fn arb_sample() -> impl Strategy<Value = Sample> {
    (any::<i32>(), -1.0e9f32..1.0e9f32, any::<i32>()).prop_map(|(id, gain, offset)| Sample {
        id,
        gain,
        offset,
    })
}

fn nested_config() -> EncoderConfig {
    EncoderConfig { nested_maps: true }
}

proptest! {
    #[test]
    fn test_flat_frame_decodes_to_fields(sample in arb_sample()) {
        let bytes = typewalk::encode_value(&sample).expect("encode");
        let frame = decode_frame(&bytes).expect("decode");

        prop_assert_eq!(frame.len(), 3);
        prop_assert_eq!(&frame[0].0, "id");
        prop_assert_eq!(get(&frame, "id"), Some(&FrameValue::Int(i64::from(sample.id))));
        prop_assert_eq!(get(&frame, "offset"), Some(&FrameValue::Int(i64::from(sample.offset))));
        match get(&frame, "gain") {
            Some(FrameValue::Float(v)) => prop_assert_eq!(v.to_bits(), sample.gain.to_bits()),
            other => prop_assert!(false, "gain decoded as {:?}", other),
        }
    }

    #[test]
    fn test_nested_frame_prints_like_value(
        left in arb_sample(),
        weight in -1.0e6f32..1.0e6f32,
        right in arb_sample(),
    ) {
        let pair = Pair { left, weight, right };
        let bytes = encode_frame_with(
            &Walker::default(),
            nested_config(),
            Pair::DESCRIPTOR,
            Instance::of(&pair),
        )
        .expect("encode");
        let frame = decode_frame(&bytes).expect("decode");

        let mut from_frame = String::new();
        print_frame(&frame, &mut from_frame, 4).expect("print frame");
        let mut from_value = String::new();
        typewalk::print_value(&pair, &mut from_value).expect("print value");
        prop_assert_eq!(from_frame, from_value);
    }

    #[test]
    fn test_truncated_frame_never_decodes(sample in arb_sample(), cut in 1usize..8) {
        let bytes = typewalk::encode_value(&sample).expect("encode");
        let keep = bytes.len().saturating_sub(cut);
        prop_assert!(decode_frame(&bytes[..keep]).is_err());
    }
}
