#![allow(dead_code)]
use std::path::PathBuf;

use beacon::{RawFrame, Schema, WireValue};

pub fn fixture_path(name: &str) -> PathBuf {
    let mut path =
        PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set"));
    path.push("tests/fixtures");
    path.push(name);
    path
}

/// A blank frame stamped with `rtc_s` and a CPU temperature code equal to it.
pub fn frame(schema: &Schema, rtc_s: u32) -> RawFrame {
    let mut frame = RawFrame::blank(schema);
    frame.platform.rtc_s = WireValue::from_native(rtc_s, schema.byte_order);
    frame.thermal.cpu_c = WireValue::from_native(rtc_s as i16, schema.byte_order);
    frame
}

/// Encoded frames, one per timestamp, back to back.
pub fn stream(schema: &Schema, times: &[u32]) -> Vec<u8> {
    times
        .iter()
        .flat_map(|&rtc| frame(schema, rtc).encode(schema))
        .collect()
}
