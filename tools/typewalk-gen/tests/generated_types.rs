// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The checked-in generated module compiles and walks like hand-written types.

use typewalk::{Cardinality, Described, WalkError};

#[allow(dead_code)]
mod sensors {
    include!("fixtures/sensors.rs");
}

use sensors::{Reading, SampleWindow};

fn reading() -> Reading {
    Reading {
        sensor: 3,
        value: 0.5,
        unit: "mV".into(),
    }
}

#[test]
fn test_generated_descriptor() {
    let desc = SampleWindow::DESCRIPTOR;
    let names: Vec<&str> = desc.entries.iter().map(|e| e.name).collect();
    assert_eq!(names, ["last", "samples", "flags", "type"]);
    assert_eq!(
        desc.entries[1].cardinality,
        Cardinality::DynamicArray { max_len: 8 }
    );
    assert_eq!(desc.entries[2].cardinality, Cardinality::FixedArray(4));
    assert_eq!(Reading::DESCRIPTOR.entries[2].max_size, 16);
}

#[test]
fn test_generated_type_prints() {
    let mut out = String::new();
    typewalk::print_value(&reading(), &mut out).expect("print");
    assert_eq!(out, "sensor: 3\nvalue: 0.500000\nunit: \"mV\"\n");
}

#[test]
fn test_generated_arrays_are_rejected_by_walk() {
    let window = SampleWindow {
        last: reading(),
        samples: [0.0; 8],
        samples_len: 0,
        flags: [0; 4],
        type_: 1,
    };
    let mut out = String::new();
    let err = typewalk::print_value(&window, &mut out).unwrap_err();
    assert!(matches!(
        err,
        WalkError::UnsupportedShape {
            field: "samples",
            ..
        }
    ));
    assert_eq!(
        out,
        "last:\n    sensor: 3\n    value: 0.500000\n    unit: \"mV\"\n"
    );
}
