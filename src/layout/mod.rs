// src/layout/mod.rs
pub mod calibration;
pub mod config;
pub mod locator;

pub use calibration::{calibrate, CalibrationOffset, PageDims};
pub use config::{Bounds, ColumnIndex, HeadColumns, LayoutConfig, SectionDefinition};
