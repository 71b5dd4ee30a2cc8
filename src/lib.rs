#![doc = include_str!("../README.md")]

mod bytes;
mod error;

pub mod calibration;
pub mod collector;
pub mod compact;
pub mod export;
pub mod frame;
pub mod schema;
pub mod section;
pub mod synchronizer;
pub mod telemetry;
pub mod wire;

pub use bytes::Bytes;
pub use calibration::{
    AttitudeRecord, Calibrated, Calibrator, PowerRecord, SunVectorRecord, ThermalRecord,
};
pub use collector::{Collector, Growth};
pub use error::{Error, Result};
pub use frame::{read_frames, FrameReader, FrameStats, RawFrame};
pub use schema::{Scales, Schema, SectionIds, SectionKind};
pub use telemetry::{SeriesSummary, Summaries, Telemetry};
pub use wire::{ByteOrder, WireValue};
