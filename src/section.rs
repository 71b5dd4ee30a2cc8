//! Section layouts and the section decoder.
//!
//! Each section is a flat run of fixed-width integers with no padding. The
//! decoder reads the leading identifier, normalizes it to compare against the
//! [Schema], and then reads the remaining fields as-is: every field stays in
//! wire order inside a [WireValue] until a consumer normalizes it.
use std::io::Read;

use tracing::trace;

use crate::bytes::Bytes;
use crate::schema::{Schema, SectionKind};
use crate::wire::{ByteOrder, WireInt, WireValue, U24};
use crate::{Error, Result};

/// Describes one field of a section layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    /// Width in bytes.
    pub width: usize,
    pub signed: bool,
}

/// A fixed-layout frame section.
pub trait Section: Sized {
    const KIND: SectionKind;
    /// Ordered field list, identifier first.
    const LAYOUT: &'static [Field];

    /// Number of bytes the section occupies on the wire.
    fn wire_len() -> usize {
        Self::LAYOUT.iter().map(|f| f.width).sum()
    }

    /// The identifier as read, still in wire order.
    fn id(&self) -> WireValue<u16>;

    /// Read every field after the identifier.
    ///
    /// # Errors
    /// [Error::Truncated] on the first short read.
    fn read_body<R: Read>(id: WireValue<u16>, reader: &mut FieldReader<'_, R>) -> Result<Self>;

    /// Append the section, identifier included, exactly as it would appear on the wire.
    fn write_to(&self, out: &mut Vec<u8>);

    /// A section carrying the identifier `schema` expects and zero in every other field.
    fn blank(schema: &Schema) -> Self;
}

/// Reads exact-width fields for one section, reporting short reads against the
/// section and field being read.
pub struct FieldReader<'a, R>
where
    R: Read,
{
    bytes: &'a mut Bytes<R>,
    section: SectionKind,
}

impl<'a, R> FieldReader<'a, R>
where
    R: Read,
{
    pub fn new(bytes: &'a mut Bytes<R>, section: SectionKind) -> Self {
        FieldReader { bytes, section }
    }

    /// Read one field without byte-order conversion.
    ///
    /// # Errors
    /// [Error::Truncated] if fewer than `T::WIDTH` bytes remain, or [Error::Io].
    pub fn read<T: WireInt>(&mut self, field: &'static str) -> Result<WireValue<T>> {
        let mut buf = [0u8; 4];
        let buf = &mut buf[..T::WIDTH];
        let got = self.bytes.fill(buf)?;
        if got < T::WIDTH {
            return Err(Error::Truncated {
                section: self.section,
                field,
                needed: T::WIDTH,
                got,
            });
        }
        Ok(WireValue::from_raw(T::from_wire_bytes(buf)))
    }
}

/// Decode one section of type `S` from `bytes`.
///
/// The identifier is read first and compared, after conversion from the schema's
/// byte order, with the identifier the schema expects for `S`. Nothing beyond the
/// identifier is consumed on a mismatch.
///
/// # Errors
/// [Error::SchemaViolation] on an identifier mismatch, [Error::Truncated] if the
/// stream ends inside the section.
pub fn read_section<S, R>(bytes: &mut Bytes<R>, schema: &Schema) -> Result<S>
where
    S: Section,
    R: Read,
{
    let mut reader = FieldReader::new(bytes, S::KIND);
    let id: WireValue<u16> = reader.read("id")?;

    let expected = schema.ids.get(S::KIND);
    let actual = id.native(schema.byte_order);
    if actual != expected {
        return Err(Error::SchemaViolation {
            section: S::KIND,
            expected,
            actual,
        });
    }

    let section = S::read_body(id, &mut reader)?;
    trace!(section = %S::KIND, "decoded section");
    Ok(section)
}

macro_rules! section {
    (
        $(#[$meta:meta])*
        $name:ident => $kind:expr, {
            $( $(#[$fmeta:meta])* $field:ident : $ty:ty ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
        pub struct $name {
            pub id: WireValue<u16>,
            $( $(#[$fmeta])* pub $field: WireValue<$ty>, )*
        }

        impl Section for $name {
            const KIND: SectionKind = $kind;
            const LAYOUT: &'static [Field] = &[
                Field { name: "id", width: <u16 as WireInt>::WIDTH, signed: false },
                $(
                    Field {
                        name: stringify!($field),
                        width: <$ty as WireInt>::WIDTH,
                        signed: <$ty as WireInt>::SIGNED,
                    },
                )*
            ];

            fn id(&self) -> WireValue<u16> {
                self.id
            }

            fn read_body<R: Read>(
                id: WireValue<u16>,
                reader: &mut FieldReader<'_, R>,
            ) -> Result<Self> {
                Ok($name {
                    id,
                    $( $field: reader.read(stringify!($field))?, )*
                })
            }

            fn write_to(&self, out: &mut Vec<u8>) {
                self.id.write_to(out);
                $( self.$field.write_to(out); )*
            }

            fn blank(schema: &Schema) -> Self {
                $name {
                    id: WireValue::from_native(schema.ids.get($kind), schema.byte_order),
                    ..Default::default()
                }
            }
        }
    };
}

section! {
    /// Platform housekeeping; carries the frame timestamp.
    PlatformSection => SectionKind::Platform, {
        uptime_s: u32,
        /// Seconds since 1970-01-01.
        rtc_s: u32,
        reset_count: U24,
        /// Bits 0-6 are the mode, bit 7 the active computer (1 = A, 0 = B).
        current_mode: u8,
        last_boot_reason: u32,
    }
}

impl PlatformSection {
    pub fn mode(&self) -> u8 {
        self.current_mode.raw() & 0x7f
    }

    /// The active on-board computer, 'A' or 'B'.
    pub fn computer(&self) -> char {
        if self.current_mode.raw() & 0x80 == 0 {
            'B'
        } else {
            'A'
        }
    }

    pub fn reset_count(&self, order: ByteOrder) -> u32 {
        self.reset_count.native(order).value()
    }
}

section! {
    MemorySection => SectionKind::Memory, {
        heap_free_bytes: u32,
    }
}

section! {
    /// Command and data handling.
    CdhSection => SectionKind::Cdh, {
        last_seen_sequence_number: u32,
        antenna_deploy_status: u8,
    }
}

section! {
    PowerSection => SectionKind::Power, {
        low_voltage_counter: u16,
        nice_battery_mv: u16,
        raw_battery_mv: u16,
        battery_a: u16,
        pcm_3v3_v: u16,
        pcm_3v3_a: u16,
        pcm_5v_v: u16,
        pcm_5v_a: u16,
    }
}

section! {
    ThermalSection => SectionKind::Thermal, {
        cpu_c: i16,
        mirror_cell_c: i16,
    }
}

section! {
    /// Attitude and orbit control.
    AocsSection => SectionKind::Aocs, {
        mode: u32,
        sun_vector_x: i16,
        sun_vector_y: i16,
        sun_vector_z: i16,
        magnetometer_x_mg: i16,
        magnetometer_y_mg: i16,
        magnetometer_z_mg: i16,
        gyro_x_dps: i16,
        gyro_y_dps: i16,
        gyro_z_dps: i16,
        imu_temp_c: i16,
        fine_gyro_x_dps: i32,
        fine_gyro_y_dps: i32,
        fine_gyro_z_dps: i32,
        wheel_1_radsec: i16,
        wheel_2_radsec: i16,
        wheel_3_radsec: i16,
        wheel_4_radsec: i16,
    }
}

section! {
    PayloadSection => SectionKind::Payload, {
        experiments_run: u16,
        experiments_failed: u16,
        last_experiment_run: i16,
        current_state: u8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn thermal_bytes(id: [u8; 2]) -> Vec<u8> {
        let mut dat = id.to_vec();
        dat.extend_from_slice(&[0x09, 0xc4, 0xff, 0x38]);
        dat
    }

    #[test]
    fn layouts_match_wire_format() {
        assert_eq!(PlatformSection::wire_len(), 18);
        assert_eq!(MemorySection::wire_len(), 6);
        assert_eq!(CdhSection::wire_len(), 7);
        assert_eq!(PowerSection::wire_len(), 18);
        assert_eq!(ThermalSection::wire_len(), 6);
        assert_eq!(AocsSection::wire_len(), 46);
        assert_eq!(PayloadSection::wire_len(), 9);
    }

    #[test]
    fn layout_lists_fields_in_order() {
        let names: Vec<&str> = ThermalSection::LAYOUT.iter().map(|f| f.name).collect();
        assert_eq!(names, ["id", "cpu_c", "mirror_cell_c"]);
        assert!(ThermalSection::LAYOUT[1].signed);
        assert!(!ThermalSection::LAYOUT[0].signed);

        let reset = PlatformSection::LAYOUT[3];
        assert_eq!(reset.name, "reset_count");
        assert_eq!(reset.width, 3);
    }

    #[test]
    fn reads_thermal_section_in_wire_order() {
        let dat = thermal_bytes([0x04, 0x01]);
        let mut bytes = Bytes::new(&dat[..]);

        let thermal: ThermalSection =
            read_section(&mut bytes, &Schema::default()).expect("section should decode");
        assert_eq!(thermal.cpu_c.native(ByteOrder::Big), 2500);
        assert_eq!(thermal.mirror_cell_c.native(ByteOrder::Big), -200);
        assert_eq!(thermal.cpu_c.raw(), i16::from_ne_bytes([0x09, 0xc4]));
        assert_eq!(bytes.offset(), 6);
    }

    #[test_case([0x01, 0x04]; "byte swapped id")]
    #[test_case([0x04, 0x02]; "next id")]
    #[test_case([0x03, 0x01]; "power id")]
    #[test_case([0x00, 0x00]; "zero id")]
    fn wrong_thermal_id_is_schema_violation(id: [u8; 2]) {
        let dat = thermal_bytes(id);
        let mut bytes = Bytes::new(&dat[..]);

        let err = read_section::<ThermalSection, _>(&mut bytes, &Schema::default()).unwrap_err();
        match err {
            Error::SchemaViolation {
                section,
                expected,
                actual,
            } => {
                assert_eq!(section, SectionKind::Thermal);
                assert_eq!(expected, 0x0401);
                assert_eq!(actual, u16::from_be_bytes(id));
            }
            _ => panic!("expected schema violation, got {err:?}"),
        }
        assert_eq!(bytes.offset(), 2, "only the id should be consumed");
    }

    #[test]
    fn short_id_is_truncated() {
        let dat = [0x04];
        let mut bytes = Bytes::new(&dat[..]);

        let err = read_section::<ThermalSection, _>(&mut bytes, &Schema::default()).unwrap_err();
        assert!(
            matches!(
                err,
                Error::Truncated {
                    section: SectionKind::Thermal,
                    field: "id",
                    needed: 2,
                    got: 1
                }
            ),
            "got {err:?}"
        );
    }

    #[test]
    fn short_field_is_truncated() {
        let dat = hex::decode("0501000000020100").unwrap();
        let mut bytes = Bytes::new(&dat[..]);

        let err = read_section::<AocsSection, _>(&mut bytes, &Schema::default()).unwrap_err();
        assert!(
            matches!(
                err,
                Error::Truncated {
                    section: SectionKind::Aocs,
                    field: "sun_vector_y",
                    needed: 2,
                    got: 0
                }
            ),
            "got {err:?}"
        );
    }

    #[test]
    fn little_endian_schema_compares_swapped_id() {
        let schema = Schema::builder().byte_order(ByteOrder::Little).build();
        let dat = thermal_bytes([0x01, 0x04]);
        let mut bytes = Bytes::new(&dat[..]);

        let thermal: ThermalSection = read_section(&mut bytes, &schema).unwrap();
        assert_eq!(thermal.id().native(ByteOrder::Little), 0x0401);
    }

    #[test]
    fn custom_ids_are_honored() {
        let mut schema = Schema::default();
        schema.ids.memory = 0xbeef;
        let dat = hex::decode("beef00001000").unwrap();
        let mut bytes = Bytes::new(&dat[..]);

        let memory: MemorySection = read_section(&mut bytes, &schema).unwrap();
        assert_eq!(memory.heap_free_bytes.native(ByteOrder::Big), 4096);
    }

    #[test]
    fn write_to_reproduces_wire_bytes() {
        let dat = hex::decode("0001000000640000007b00020a8100000003").unwrap();
        let mut bytes = Bytes::new(&dat[..]);
        let platform: PlatformSection = read_section(&mut bytes, &Schema::default()).unwrap();

        assert_eq!(platform.uptime_s.native(ByteOrder::Big), 100);
        assert_eq!(platform.rtc_s.native(ByteOrder::Big), 123);
        assert_eq!(platform.reset_count(ByteOrder::Big), 0x0000_020a);
        assert_eq!(platform.mode(), 1);
        assert_eq!(platform.computer(), 'A');
        assert_eq!(platform.last_boot_reason.native(ByteOrder::Big), 3);

        let mut out = Vec::new();
        platform.write_to(&mut out);
        assert_eq!(out, dat);
    }

    #[test]
    fn blank_section_decodes() {
        let schema = Schema::default();
        let mut out = Vec::new();
        PayloadSection::blank(&schema).write_to(&mut out);
        assert_eq!(out.len(), PayloadSection::wire_len());

        let mut bytes = Bytes::new(&out[..]);
        let payload: PayloadSection = read_section(&mut bytes, &schema).unwrap();
        assert_eq!(payload, PayloadSection::blank(&schema));
    }
}
