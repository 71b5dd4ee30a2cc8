use std::fmt::Display;

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::wire::ByteOrder;
use crate::{Error, Result};

/// Marker preceding every frame in a beacon stream.
pub const DEFAULT_MARKER: [u8; 3] = [0xff, 0xff, 0xf0];

/// The seven sections of a frame, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Platform,
    Memory,
    Cdh,
    Power,
    Thermal,
    Aocs,
    Payload,
}

impl SectionKind {
    pub const ALL: [SectionKind; 7] = [
        SectionKind::Platform,
        SectionKind::Memory,
        SectionKind::Cdh,
        SectionKind::Power,
        SectionKind::Thermal,
        SectionKind::Aocs,
        SectionKind::Payload,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            SectionKind::Platform => "platform",
            SectionKind::Memory => "memory",
            SectionKind::Cdh => "cdh",
            SectionKind::Power => "power",
            SectionKind::Thermal => "thermal",
            SectionKind::Aocs => "aocs",
            SectionKind::Payload => "payload",
        }
    }
}

impl Display for SectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Expected identifier of each section, in host order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionIds {
    pub platform: u16,
    pub memory: u16,
    pub cdh: u16,
    pub power: u16,
    pub thermal: u16,
    pub aocs: u16,
    pub payload: u16,
}

impl Default for SectionIds {
    fn default() -> Self {
        Self {
            platform: 0x0001,
            memory: 0x0101,
            cdh: 0x0201,
            power: 0x0301,
            thermal: 0x0401,
            aocs: 0x0501,
            payload: 0x0601,
        }
    }
}

impl SectionIds {
    #[must_use]
    pub fn get(&self, kind: SectionKind) -> u16 {
        match kind {
            SectionKind::Platform => self.platform,
            SectionKind::Memory => self.memory,
            SectionKind::Cdh => self.cdh,
            SectionKind::Power => self.power,
            SectionKind::Thermal => self.thermal,
            SectionKind::Aocs => self.aocs,
            SectionKind::Payload => self.payload,
        }
    }
}

/// Scale factors used to convert raw sensor codes into engineering units.
///
/// Unless noted, a physical value is `raw * factor`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scales {
    /// degC per count for the CPU and mirror cell sensors.
    pub thermal_c: f64,
    /// Sun vector components are `raw / sun_vector_divisor`.
    pub sun_vector_divisor: f64,
    /// A per count for battery and rail currents.
    pub current_a: f64,
    pub pcm_3v3_v: f64,
    pub pcm_5v_v: f64,
    pub magnetometer_mg: f64,
    pub gyro_dps: f64,
    /// IMU temperature is `raw * imu_temp_scale + imu_temp_offset`.
    pub imu_temp_scale: f64,
    pub imu_temp_offset: f64,
    pub fine_gyro_dps: f64,
    pub wheel_radsec: f64,
}

impl Default for Scales {
    fn default() -> Self {
        Self {
            thermal_c: 0.01,
            sun_vector_divisor: 16384.0,
            current_a: 0.005_237,
            pcm_3v3_v: 0.003_988,
            pcm_5v_v: 0.005_865,
            magnetometer_mg: 0.5,
            gyro_dps: 0.0125,
            imu_temp_scale: 0.14,
            imu_temp_offset: 25.0,
            fine_gyro_dps: 256.0 / 6300.0 / 65536.0,
            wheel_radsec: 0.3,
        }
    }
}

impl Scales {
    fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> {
        [
            ("thermal_c", self.thermal_c),
            ("sun_vector_divisor", self.sun_vector_divisor),
            ("current_a", self.current_a),
            ("pcm_3v3_v", self.pcm_3v3_v),
            ("pcm_5v_v", self.pcm_5v_v),
            ("magnetometer_mg", self.magnetometer_mg),
            ("gyro_dps", self.gyro_dps),
            ("imu_temp_scale", self.imu_temp_scale),
            ("imu_temp_offset", self.imu_temp_offset),
            ("fine_gyro_dps", self.fine_gyro_dps),
            ("wheel_radsec", self.wheel_radsec),
        ]
        .into_iter()
    }
}

/// Everything needed to find, validate and calibrate frames in a stream.
///
/// A schema is passed explicitly to the decoder and the calibrator so several
/// frame versions can be handled side by side.
///
/// # Example
/// ```
/// use beacon::{ByteOrder, Schema};
///
/// let schema = Schema::builder()
///     .marker([0xaa, 0xbb, 0xcc])
///     .byte_order(ByteOrder::Little)
///     .build();
/// assert_eq!(schema.ids, Schema::default().ids);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[serde(default)]
pub struct Schema {
    #[builder(default = DEFAULT_MARKER)]
    pub marker: [u8; 3],
    #[builder(default)]
    pub byte_order: ByteOrder,
    #[builder(default)]
    pub ids: SectionIds,
    #[builder(default)]
    pub scales: Scales,
}

impl Default for Schema {
    fn default() -> Self {
        Schema::builder().build()
    }
}

impl Schema {
    /// Parse a schema from JSON. Missing keys take their default values.
    ///
    /// # Errors
    /// [Error::Schema] if the document cannot be parsed or fails [Schema::validate].
    pub fn from_json(s: &str) -> Result<Schema> {
        let schema: Schema = serde_json::from_str(s).map_err(|e| Error::Schema(e.to_string()))?;
        schema.validate()?;
        Ok(schema)
    }

    /// # Errors
    /// [Error::Schema] if a scale factor is not finite or the sun vector divisor is zero.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in self.scales.iter() {
            if !value.is_finite() {
                return Err(Error::Schema(format!("scale {name} is not finite")));
            }
        }
        if self.scales.sun_vector_divisor == 0.0 {
            return Err(Error::Schema("sun_vector_divisor must not be zero".into()));
        }
        Ok(())
    }
}
