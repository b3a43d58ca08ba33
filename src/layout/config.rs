// src/layout/config.rs
use crate::layout::calibration::PageDims;
use crate::utils::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// A rectangular region in page points: (x1, y1) top-left, (x2, y2) bottom-right.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Bounds {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    fn is_well_formed(&self) -> bool {
        [self.x1, self.y1, self.x2, self.y2].iter().all(|v| v.is_finite())
            && self.x1 <= self.x2
            && self.y1 <= self.y2
    }
}

/// Which edges of a section move with the calibration offset.
/// Written in the config as a string over `t`, `b`, `l`, `r`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Adjustment {
    pub top: bool,
    pub bottom: bool,
    pub left: bool,
    pub right: bool,
}

impl Adjustment {
    /// Parses the flag string; any character outside `tblr` is reported back.
    pub fn parse(flags: &str) -> Result<Self, char> {
        let mut adjustment = Adjustment::default();
        for flag in flags.chars() {
            match flag {
                't' => adjustment.top = true,
                'b' => adjustment.bottom = true,
                'l' => adjustment.left = true,
                'r' => adjustment.right = true,
                other => return Err(other),
            }
        }
        Ok(adjustment)
    }
}

/// A column position within a row. Negative config values count from the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum ColumnIndex {
    FromStart(usize),
    FromEnd(usize),
}

impl ColumnIndex {
    /// Resolves to an absolute index for a row of `len` cells.
    pub fn resolve(self, len: usize) -> Option<usize> {
        match self {
            ColumnIndex::FromStart(i) if i < len => Some(i),
            ColumnIndex::FromEnd(n) if n >= 1 && n <= len => Some(len - n),
            _ => None,
        }
    }
}

impl From<i64> for ColumnIndex {
    fn from(value: i64) -> Self {
        if value < 0 {
            ColumnIndex::FromEnd(value.unsigned_abs() as usize)
        } else {
            ColumnIndex::FromStart(value as usize)
        }
    }
}

impl From<ColumnIndex> for i64 {
    fn from(value: ColumnIndex) -> Self {
        match value {
            ColumnIndex::FromStart(i) => i as i64,
            ColumnIndex::FromEnd(n) => -(n as i64),
        }
    }
}

/// Where a head row keeps its current-period and year-to-date amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadColumns {
    pub current: ColumnIndex,
    pub ytd: ColumnIndex,
}

impl Default for HeadColumns {
    /// The two rightmost columns.
    fn default() -> Self {
        Self {
            current: ColumnIndex::FromEnd(2),
            ytd: ColumnIndex::FromEnd(1),
        }
    }
}

// Raw shape of a section entry in the config document.
#[derive(Debug, Deserialize)]
struct RawSection {
    name: String,
    page: u32,
    height: f64,
    width: f64,
    bounds: Bounds,
    #[serde(default)]
    adjustment: String,
    #[serde(default)]
    columns: Option<HeadColumns>,
}

#[derive(Debug, Deserialize)]
struct RawLayout {
    #[serde(default)]
    version: Option<String>,
    base_page_height: f64,
    base_page_width: f64,
    sections: Vec<RawSection>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionDefinition {
    pub name: String,
    pub page: u32,
    pub height: f64,
    pub width: f64,
    pub bounds: Bounds,
    pub adjustment: Adjustment,
    pub columns: HeadColumns,
}

/// The immutable section table shared by every document in a run.
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    version: Option<String>,
    base: PageDims,
    sections: Vec<SectionDefinition>,
    by_name: HashMap<String, usize>,
}

impl LayoutConfig {
    /// Reads and validates the layout config at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&data)?;
        tracing::info!(
            "Loaded layout config {} (version {}, {} sections)",
            path.display(),
            config.version().unwrap_or("unversioned"),
            config.sections.len()
        );
        Ok(config)
    }

    pub fn from_json(data: &str) -> Result<Self, ConfigError> {
        let raw: RawLayout = serde_json::from_str(data)?;

        let base = PageDims::new(raw.base_page_height, raw.base_page_width);
        if !(base.height.is_finite() && base.width.is_finite() && base.height > 0.0 && base.width > 0.0) {
            return Err(ConfigError::InvalidBaseDimensions {
                height: base.height,
                width: base.width,
            });
        }

        let mut sections = Vec::with_capacity(raw.sections.len());
        let mut by_name = HashMap::with_capacity(raw.sections.len());
        for section in raw.sections {
            let adjustment = Adjustment::parse(&section.adjustment).map_err(|flag| {
                ConfigError::InvalidAdjustment {
                    section: section.name.clone(),
                    flag,
                }
            })?;
            if !section.bounds.is_well_formed() {
                return Err(ConfigError::InvalidBounds(section.name));
            }
            if by_name.insert(section.name.clone(), sections.len()).is_some() {
                return Err(ConfigError::DuplicateSection(section.name));
            }
            sections.push(SectionDefinition {
                name: section.name,
                page: section.page,
                height: section.height,
                width: section.width,
                bounds: section.bounds,
                adjustment,
                columns: section.columns.unwrap_or_default(),
            });
        }

        Ok(Self {
            version: raw.version,
            base,
            sections,
            by_name,
        })
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Reference page geometry all section bounds are defined against.
    pub fn base_dims(&self) -> PageDims {
        self.base
    }

    pub fn sections(&self) -> &[SectionDefinition] {
        &self.sections
    }

    pub fn section(&self, name: &str) -> Option<&SectionDefinition> {
        self.by_name.get(name).map(|&i| &self.sections[i])
    }
}
