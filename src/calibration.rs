//! Conversion of raw sensor codes into engineering units.
//!
//! Every conversion normalizes the fields it consumes from the wire byte order
//! first and then applies the linear scale from [Scales]. Records carry the
//! frame's platform `rtc_s`, normalized the same way, and nothing else from the
//! frame they came from.
use serde::Serialize;

use crate::compact::Timestamped;
use crate::frame::RawFrame;
use crate::schema::{Scales, Schema};
use crate::section::{AocsSection, PowerSection, ThermalSection};
use crate::wire::{ByteOrder, WireValue};

/// CPU and mirror cell temperatures.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct ThermalRecord {
    /// Seconds since 1970-01-01.
    pub rtc_s: u32,
    /// degC
    pub cpu_c: f64,
    /// degC
    pub mirror_cell_c: f64,
}

/// Unit sun vector from the AOCS sun sensors.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct SunVectorRecord {
    pub rtc_s: u32,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Battery and power conditioning module readings.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct PowerRecord {
    pub rtc_s: u32,
    pub nice_battery_mv: u16,
    pub raw_battery_mv: u16,
    pub battery_a: f64,
    pub pcm_3v3_v: f64,
    pub pcm_3v3_a: f64,
    pub pcm_5v_v: f64,
    pub pcm_5v_a: f64,
}

/// AOCS rate, field and wheel readings.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct AttitudeRecord {
    pub rtc_s: u32,
    /// milligauss
    pub magnetometer_mg: [f64; 3],
    /// deg/s
    pub gyro_dps: [f64; 3],
    /// degC
    pub imu_temp_c: f64,
    /// deg/s
    pub fine_gyro_dps: [f64; 3],
    /// rad/s
    pub wheel_radsec: [f64; 4],
}

/// Applies a schema's scale factors to raw sections.
#[derive(Debug, Clone, Copy)]
pub struct Calibrator {
    order: ByteOrder,
    scales: Scales,
}

impl Calibrator {
    pub fn new(schema: &Schema) -> Self {
        Calibrator {
            order: schema.byte_order,
            scales: schema.scales,
        }
    }

    fn i16(&self, v: WireValue<i16>) -> f64 {
        f64::from(v.native(self.order))
    }

    fn u16(&self, v: WireValue<u16>) -> f64 {
        f64::from(v.native(self.order))
    }

    fn i32(&self, v: WireValue<i32>) -> f64 {
        f64::from(v.native(self.order))
    }

    pub fn thermal(&self, section: &ThermalSection, timestamp: WireValue<u32>) -> ThermalRecord {
        let scale = self.scales.thermal_c;
        ThermalRecord {
            rtc_s: timestamp.native(self.order),
            cpu_c: self.i16(section.cpu_c) * scale,
            mirror_cell_c: self.i16(section.mirror_cell_c) * scale,
        }
    }

    pub fn sun_vector(&self, section: &AocsSection, timestamp: WireValue<u32>) -> SunVectorRecord {
        let divisor = self.scales.sun_vector_divisor;
        SunVectorRecord {
            rtc_s: timestamp.native(self.order),
            x: self.i16(section.sun_vector_x) / divisor,
            y: self.i16(section.sun_vector_y) / divisor,
            z: self.i16(section.sun_vector_z) / divisor,
        }
    }

    pub fn power(&self, section: &PowerSection, timestamp: WireValue<u32>) -> PowerRecord {
        let s = &self.scales;
        PowerRecord {
            rtc_s: timestamp.native(self.order),
            nice_battery_mv: section.nice_battery_mv.native(self.order),
            raw_battery_mv: section.raw_battery_mv.native(self.order),
            battery_a: self.u16(section.battery_a) * s.current_a,
            pcm_3v3_v: self.u16(section.pcm_3v3_v) * s.pcm_3v3_v,
            pcm_3v3_a: self.u16(section.pcm_3v3_a) * s.current_a,
            pcm_5v_v: self.u16(section.pcm_5v_v) * s.pcm_5v_v,
            pcm_5v_a: self.u16(section.pcm_5v_a) * s.current_a,
        }
    }

    pub fn attitude(&self, section: &AocsSection, timestamp: WireValue<u32>) -> AttitudeRecord {
        let s = &self.scales;
        let mag = |v| self.i16(v) * s.magnetometer_mg;
        let gyro = |v| self.i16(v) * s.gyro_dps;
        let fine = |v| self.i32(v) * s.fine_gyro_dps;
        let wheel = |v| self.i16(v) * s.wheel_radsec;
        AttitudeRecord {
            rtc_s: timestamp.native(self.order),
            magnetometer_mg: [
                mag(section.magnetometer_x_mg),
                mag(section.magnetometer_y_mg),
                mag(section.magnetometer_z_mg),
            ],
            gyro_dps: [
                gyro(section.gyro_x_dps),
                gyro(section.gyro_y_dps),
                gyro(section.gyro_z_dps),
            ],
            imu_temp_c: self.i16(section.imu_temp_c) * s.imu_temp_scale + s.imu_temp_offset,
            fine_gyro_dps: [
                fine(section.fine_gyro_x_dps),
                fine(section.fine_gyro_y_dps),
                fine(section.fine_gyro_z_dps),
            ],
            wheel_radsec: [
                wheel(section.wheel_1_radsec),
                wheel(section.wheel_2_radsec),
                wheel(section.wheel_3_radsec),
                wheel(section.wheel_4_radsec),
            ],
        }
    }
}

/// A record kind that can be derived from a whole frame.
pub trait Calibrated: Timestamped + Sized {
    /// Short name used in logs and summaries.
    const NAME: &'static str;

    fn from_frame(calibrator: &Calibrator, frame: &RawFrame) -> Self;
}

impl Timestamped for ThermalRecord {
    fn timestamp(&self) -> u32 {
        self.rtc_s
    }
}

impl Calibrated for ThermalRecord {
    const NAME: &'static str = "thermal";

    fn from_frame(calibrator: &Calibrator, frame: &RawFrame) -> Self {
        calibrator.thermal(&frame.thermal, frame.timestamp())
    }
}

impl Timestamped for SunVectorRecord {
    fn timestamp(&self) -> u32 {
        self.rtc_s
    }
}

impl Calibrated for SunVectorRecord {
    const NAME: &'static str = "sun_vector";

    fn from_frame(calibrator: &Calibrator, frame: &RawFrame) -> Self {
        calibrator.sun_vector(&frame.aocs, frame.timestamp())
    }
}

impl Timestamped for PowerRecord {
    fn timestamp(&self) -> u32 {
        self.rtc_s
    }
}

impl Calibrated for PowerRecord {
    const NAME: &'static str = "power";

    fn from_frame(calibrator: &Calibrator, frame: &RawFrame) -> Self {
        calibrator.power(&frame.power, frame.timestamp())
    }
}

impl Timestamped for AttitudeRecord {
    fn timestamp(&self) -> u32 {
        self.rtc_s
    }
}

impl Calibrated for AttitudeRecord {
    const NAME: &'static str = "attitude";

    fn from_frame(calibrator: &Calibrator, frame: &RawFrame) -> Self {
        calibrator.attitude(&frame.aocs, frame.timestamp())
    }
}
