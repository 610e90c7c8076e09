// THIS FILE IS GENERATED BY typewalk-gen. DO NOT EDIT.

use typewalk::{Described, FixedString};

// Sensor messages

/// A calibrated reading
#[derive(Debug, Clone, Copy, Described)]
#[repr(C)]
pub struct Reading {
    /// sensor index
    pub sensor: i32,
    pub value: f32,
    pub unit: FixedString<16>,
}

#[derive(Debug, Clone, Copy, Described)]
#[repr(C)]
pub struct SampleWindow {
    pub last: Reading,
    #[typewalk(dynamic)]
    pub samples: [f32; 8],
    #[typewalk(skip)]
    pub samples_len: u16,
    pub flags: [i32; 4],
    #[typewalk(rename = "type")]
    pub type_: i32,
}
