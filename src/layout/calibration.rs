// src/layout/calibration.rs
use serde::{Deserialize, Serialize};

/// Page geometry in points, as reported by the extraction tool's probe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageDims {
    pub height: f64,
    pub width: f64,
}

impl PageDims {
    pub fn new(height: f64, width: f64) -> Self {
        Self { height, width }
    }
}

/// Per-document drift from the reference layout. Lives only as long as one document.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CalibrationOffset {
    pub height: f64,
    pub width: f64,
}

/// `offset = base - detected`, per axis.
pub fn calibrate(detected: PageDims, base: PageDims) -> CalibrationOffset {
    CalibrationOffset {
        height: base.height - detected.height,
        width: base.width - detected.width,
    }
}
