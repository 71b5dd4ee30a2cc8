//! Byte-order primitives and the [WireValue] wrapper used for every raw field.
//!
//! Raw sections keep their integers exactly as they arrived on the wire. A field
//! can only be turned into a usable number through [WireValue::native], which
//! takes the wire [ByteOrder] and swaps when it differs from the host.
use serde::{Deserialize, Serialize};

/// Reverse the byte order of a 16-bit value.
#[must_use]
pub const fn swap16(value: u16) -> u16 {
    (value >> 8) | (value << 8)
}

/// Reverse the byte order of a 32-bit value.
#[must_use]
pub const fn swap32(value: u32) -> u32 {
    ((value & 0x0000_00ff) << 24)
        | ((value & 0x0000_ff00) << 8)
        | ((value & 0x00ff_0000) >> 8)
        | ((value & 0xff00_0000) >> 24)
}

/// Byte order of multi-byte fields in a stream.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ByteOrder {
    #[default]
    Big,
    Little,
}

impl ByteOrder {
    /// True if values in this order can be used on this host without swapping.
    #[must_use]
    pub const fn is_native(self) -> bool {
        match self {
            ByteOrder::Big => cfg!(target_endian = "big"),
            ByteOrder::Little => cfg!(target_endian = "little"),
        }
    }
}

/// A 3-byte unsigned integer, as used by the platform reset counter.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct U24(pub [u8; 3]);

impl U24 {
    /// Interpret the stored bytes in host order.
    #[must_use]
    pub fn value(self) -> u32 {
        let [a, b, c] = self.0;
        if cfg!(target_endian = "big") {
            u32::from_be_bytes([0, a, b, c])
        } else {
            u32::from_le_bytes([a, b, c, 0])
        }
    }
}

/// Fixed-width integer that can be read from and written to the wire.
pub trait WireInt: Copy + Default {
    /// Width in bytes.
    const WIDTH: usize;
    const SIGNED: bool;

    /// Build from exactly `WIDTH` bytes without any byte-order conversion.
    fn from_wire_bytes(buf: &[u8]) -> Self;

    /// Append the in-memory bytes, again without conversion.
    fn put_wire_bytes(self, out: &mut Vec<u8>);

    /// Reverse the byte order.
    #[must_use]
    fn swapped(self) -> Self;
}

impl WireInt for u8 {
    const WIDTH: usize = 1;
    const SIGNED: bool = false;

    fn from_wire_bytes(buf: &[u8]) -> Self {
        buf[0]
    }

    fn put_wire_bytes(self, out: &mut Vec<u8>) {
        out.push(self);
    }

    fn swapped(self) -> Self {
        self
    }
}

impl WireInt for u16 {
    const WIDTH: usize = 2;
    const SIGNED: bool = false;

    fn from_wire_bytes(buf: &[u8]) -> Self {
        u16::from_ne_bytes([buf[0], buf[1]])
    }

    fn put_wire_bytes(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_ne_bytes());
    }

    fn swapped(self) -> Self {
        swap16(self)
    }
}

impl WireInt for i16 {
    const WIDTH: usize = 2;
    const SIGNED: bool = true;

    fn from_wire_bytes(buf: &[u8]) -> Self {
        i16::from_ne_bytes([buf[0], buf[1]])
    }

    fn put_wire_bytes(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_ne_bytes());
    }

    #[allow(clippy::cast_sign_loss, clippy::cast_possible_wrap)]
    fn swapped(self) -> Self {
        swap16(self as u16) as i16
    }
}

impl WireInt for U24 {
    const WIDTH: usize = 3;
    const SIGNED: bool = false;

    fn from_wire_bytes(buf: &[u8]) -> Self {
        U24([buf[0], buf[1], buf[2]])
    }

    fn put_wire_bytes(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.0);
    }

    fn swapped(self) -> Self {
        let [a, b, c] = self.0;
        U24([c, b, a])
    }
}

impl WireInt for u32 {
    const WIDTH: usize = 4;
    const SIGNED: bool = false;

    fn from_wire_bytes(buf: &[u8]) -> Self {
        u32::from_ne_bytes([buf[0], buf[1], buf[2], buf[3]])
    }

    fn put_wire_bytes(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_ne_bytes());
    }

    fn swapped(self) -> Self {
        swap32(self)
    }
}

impl WireInt for i32 {
    const WIDTH: usize = 4;
    const SIGNED: bool = true;

    fn from_wire_bytes(buf: &[u8]) -> Self {
        i32::from_ne_bytes([buf[0], buf[1], buf[2], buf[3]])
    }

    fn put_wire_bytes(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_ne_bytes());
    }

    #[allow(clippy::cast_sign_loss, clippy::cast_possible_wrap)]
    fn swapped(self) -> Self {
        swap32(self as u32) as i32
    }
}

/// An integer still in wire byte order.
///
/// There is intentionally no `Deref` or `From` into the inner type; use
/// [WireValue::native] with the stream's [ByteOrder].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct WireValue<T>(T);

impl<T: WireInt> WireValue<T> {
    /// Wrap a value exactly as it was read from the wire.
    pub fn from_raw(raw: T) -> Self {
        WireValue(raw)
    }

    /// Wrap a host value, converting it to `order`.
    pub fn from_native(value: T, order: ByteOrder) -> Self {
        if order.is_native() {
            WireValue(value)
        } else {
            WireValue(value.swapped())
        }
    }

    /// The unconverted in-memory value.
    pub fn raw(self) -> T {
        self.0
    }

    /// Normalize from `order` into host order.
    pub fn native(self, order: ByteOrder) -> T {
        if order.is_native() {
            self.0
        } else {
            self.0.swapped()
        }
    }

    pub(crate) fn write_to(self, out: &mut Vec<u8>) {
        self.0.put_wire_bytes(out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0x0000; "zero")]
    #[test_case(0xffff; "all set")]
    #[test_case(0x0001; "low byte")]
    #[test_case(0x0100; "high byte")]
    #[test_case(0x8000; "top bit")]
    #[test_case(0x1234; "mixed")]
    fn swap16_is_involutive(x: u16) {
        assert_eq!(swap16(swap16(x)), x);
    }

    #[test_case(0x0000_0000; "zero")]
    #[test_case(0xffff_ffff; "all set")]
    #[test_case(0x0000_0001; "byte 0")]
    #[test_case(0x0000_0100; "byte 1")]
    #[test_case(0x0001_0000; "byte 2")]
    #[test_case(0x0100_0000; "byte 3")]
    #[test_case(0xdead_beef; "mixed")]
    fn swap32_is_involutive(x: u32) {
        assert_eq!(swap32(swap32(x)), x);
    }

    #[test]
    fn swap16_exhaustive() {
        for x in 0..=u16::MAX {
            assert_eq!(swap16(swap16(x)), x, "failed for {x:#06x}");
            assert_eq!(swap16(x), x.swap_bytes());
        }
    }

    #[test]
    fn swaps_reverse_bytes() {
        assert_eq!(swap16(0x0401), 0x0104);
        assert_eq!(swap32(0x0102_0304), 0x0403_0201);
        assert_eq!(swap32(0x0000_0064), 0x6400_0000);
    }

    #[test]
    fn wire_value_big_endian() {
        let raw = u16::from_wire_bytes(&[0x04, 0x01]);
        let value = WireValue::from_raw(raw);
        assert_eq!(value.native(ByteOrder::Big), 0x0401);

        let raw = i16::from_wire_bytes(&[0x09, 0xc4]);
        assert_eq!(WireValue::from_raw(raw).native(ByteOrder::Big), 2500);

        let raw = i32::from_wire_bytes(&[0xff, 0xff, 0xff, 0xfe]);
        assert_eq!(WireValue::from_raw(raw).native(ByteOrder::Big), -2);
    }

    #[test]
    fn wire_value_little_endian() {
        let raw = u32::from_wire_bytes(&[0x64, 0x00, 0x00, 0x00]);
        assert_eq!(WireValue::from_raw(raw).native(ByteOrder::Little), 100);
    }

    #[test]
    fn from_native_round_trips_bytes() {
        let mut out = Vec::new();
        WireValue::from_native(0x0102_0304u32, ByteOrder::Big).write_to(&mut out);
        WireValue::from_native(-3i16, ByteOrder::Little).write_to(&mut out);
        assert_eq!(out, [0x01, 0x02, 0x03, 0x04, 0xfd, 0xff]);
    }

    #[test]
    fn u24_normalizes() {
        let raw = U24::from_wire_bytes(&[0x01, 0x02, 0x03]);
        let value = WireValue::from_raw(raw).native(ByteOrder::Big);
        assert_eq!(value.value(), 0x0001_0203);
    }
}
