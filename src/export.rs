//! Delimited text output for record series.
use std::io::Write;

use crate::calibration::{AttitudeRecord, PowerRecord, SunVectorRecord, ThermalRecord};
use crate::Result;

/// Field separator for every exported file.
pub const SEPARATOR: u8 = b';';

/// Decimal places used when none is given.
pub const DEFAULT_PRECISION: usize = 2;

/// Largest supported number of decimal places.
pub const MAX_PRECISION: usize = 9;

/// A record that can be written as one delimited row.
pub trait CsvRecord {
    /// Column names, in row order.
    const HEADER: &'static [&'static str];

    /// Row fields, floats rendered with `precision` decimal places.
    fn fields(&self, precision: usize) -> Vec<String>;
}

fn float(value: f64, precision: usize) -> String {
    format!("{value:.precision$}")
}

/// Write a header row then one row per record, as produced by `formatter`.
///
/// Returns the number of records written.
///
/// # Errors
/// [Error::Csv](crate::Error::Csv) or [Error::Io](crate::Error::Io) if writing fails.
pub fn write_rows<W, T, F, I>(
    writer: W,
    header: &[&str],
    records: &[T],
    mut formatter: F,
) -> Result<usize>
where
    W: Write,
    F: FnMut(&T) -> I,
    I: IntoIterator,
    I::Item: AsRef<[u8]>,
{
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(SEPARATOR)
        .from_writer(writer);
    wtr.write_record(header)?;
    for record in records {
        wtr.write_record(formatter(record))?;
    }
    wtr.flush()?;
    Ok(records.len())
}

/// Write `records` with their own header and row format.
///
/// `precision` is clamped to [MAX_PRECISION].
///
/// # Example
/// ```
/// use beacon::export::write_series;
/// use beacon::ThermalRecord;
///
/// let records = [ThermalRecord { rtc_s: 100, cpu_c: 25.0, mirror_cell_c: -1.5 }];
/// let mut out = Vec::new();
/// write_series(&mut out, &records, 2).unwrap();
/// assert_eq!(out, b"rtc_s;CPU_C;mirror_cell_C\n100;25.00;-1.50\n");
/// ```
pub fn write_series<W, T>(writer: W, records: &[T], precision: usize) -> Result<usize>
where
    W: Write,
    T: CsvRecord,
{
    let precision = precision.min(MAX_PRECISION);
    write_rows(writer, T::HEADER, records, |r| r.fields(precision))
}

impl CsvRecord for ThermalRecord {
    const HEADER: &'static [&'static str] = &["rtc_s", "CPU_C", "mirror_cell_C"];

    fn fields(&self, precision: usize) -> Vec<String> {
        vec![
            self.rtc_s.to_string(),
            float(self.cpu_c, precision),
            float(self.mirror_cell_c, precision),
        ]
    }
}

impl CsvRecord for SunVectorRecord {
    const HEADER: &'static [&'static str] =
        &["rtc_s", "sun_vector_x", "sun_vector_y", "sun_vector_z"];

    fn fields(&self, precision: usize) -> Vec<String> {
        vec![
            self.rtc_s.to_string(),
            float(self.x, precision),
            float(self.y, precision),
            float(self.z, precision),
        ]
    }
}

impl CsvRecord for PowerRecord {
    const HEADER: &'static [&'static str] = &[
        "rtc_s",
        "nice_battery_mV",
        "raw_battery_mV",
        "battery_A",
        "pcm_3v3_V",
        "pcm_3v3_A",
        "pcm_5v_V",
        "pcm_5v_A",
    ];

    fn fields(&self, precision: usize) -> Vec<String> {
        vec![
            self.rtc_s.to_string(),
            self.nice_battery_mv.to_string(),
            self.raw_battery_mv.to_string(),
            float(self.battery_a, precision),
            float(self.pcm_3v3_v, precision),
            float(self.pcm_3v3_a, precision),
            float(self.pcm_5v_v, precision),
            float(self.pcm_5v_a, precision),
        ]
    }
}

impl CsvRecord for AttitudeRecord {
    const HEADER: &'static [&'static str] = &[
        "rtc_s",
        "magnetometer_x_mG",
        "magnetometer_y_mG",
        "magnetometer_z_mG",
        "gyro_x_dps",
        "gyro_y_dps",
        "gyro_z_dps",
        "IMU_temp_C",
        "fine_gyro_x_dps",
        "fine_gyro_y_dps",
        "fine_gyro_z_dps",
        "wheel_1_radsec",
        "wheel_2_radsec",
        "wheel_3_radsec",
        "wheel_4_radsec",
    ];

    fn fields(&self, precision: usize) -> Vec<String> {
        let mut fields = Vec::with_capacity(Self::HEADER.len());
        fields.push(self.rtc_s.to_string());
        fields.extend(self.magnetometer_mg.iter().map(|v| float(*v, precision)));
        fields.extend(self.gyro_dps.iter().map(|v| float(*v, precision)));
        fields.push(float(self.imu_temp_c, precision));
        fields.extend(self.fine_gyro_dps.iter().map(|v| float(*v, precision)));
        fields.extend(self.wheel_radsec.iter().map(|v| float(*v, precision)));
        fields
    }
}
