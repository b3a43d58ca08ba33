// src/layout/locator.rs
use crate::layout::calibration::CalibrationOffset;
use crate::layout::config::{Adjustment, Bounds, LayoutConfig, SectionDefinition};
use crate::utils::error::ExtractError;

impl Bounds {
    /// Shifts only the flagged edges: top/bottom by the height offset, left/right by the width offset.
    pub fn adjusted(&self, adjustment: Adjustment, offset: CalibrationOffset) -> Bounds {
        let shift = |edge: f64, flagged: bool, by: f64| if flagged { edge - by } else { edge };
        Bounds::new(
            shift(self.x1, adjustment.left, offset.width),
            shift(self.y1, adjustment.top, offset.height),
            shift(self.x2, adjustment.right, offset.width),
            shift(self.y2, adjustment.bottom, offset.height),
        )
    }
}

impl LayoutConfig {
    /// The named section together with its bounds calibrated for the extraction tool.
    pub fn locate(
        &self,
        name: &str,
        offset: CalibrationOffset,
    ) -> Result<(&SectionDefinition, Bounds), ExtractError> {
        let section = self
            .section(name)
            .ok_or_else(|| ExtractError::SectionNotFound(name.to_string()))?;
        let bounds = section.bounds.adjusted(section.adjustment, offset);
        tracing::debug!(
            "Located section {} at {:?} (reference {:?}, offset {:?})",
            name,
            bounds,
            section.bounds,
            offset
        );
        Ok((section, bounds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::calibration::{calibrate, PageDims};

    fn layout(adjustment: &str) -> LayoutConfig {
        let data = format!(
            r#"{{"base_page_height": 800, "base_page_width": 600, "sections": [
                {{"name": "pay_summary", "page": 1, "height": 800, "width": 600,
                  "bounds": {{"x1": 0, "y1": 0, "x2": 100, "y2": 20}}, "adjustment": "{}"}}
            ]}}"#,
            adjustment
        );
        LayoutConfig::from_json(&data).unwrap()
    }

    #[test]
    fn shifts_top_and_bottom_by_height_drift() {
        let config = layout("tb");
        // Detected page is 5 points taller than the reference.
        let offset = calibrate(PageDims::new(805.0, 600.0), config.base_dims());
        let (_, bounds) = config.locate("pay_summary", offset).unwrap();
        assert_eq!(bounds, Bounds::new(0.0, 5.0, 100.0, 25.0));
    }

    #[test]
    fn unflagged_edges_ignore_any_offset() {
        let config = layout("");
        let offset = CalibrationOffset { height: 13.0, width: -7.0 };
        let (_, bounds) = config.locate("pay_summary", offset).unwrap();
        assert_eq!(bounds, Bounds::new(0.0, 0.0, 100.0, 20.0));
    }

    #[test]
    fn each_flag_moves_only_its_edge_on_its_axis() {
        let reference = Bounds::new(10.0, 20.0, 110.0, 220.0);
        let offset = CalibrationOffset { height: 4.0, width: 3.0 };

        let top = Adjustment::parse("t").unwrap();
        assert_eq!(reference.adjusted(top, offset), Bounds::new(10.0, 16.0, 110.0, 220.0));

        let bottom = Adjustment::parse("b").unwrap();
        assert_eq!(reference.adjusted(bottom, offset), Bounds::new(10.0, 20.0, 110.0, 216.0));

        let left = Adjustment::parse("l").unwrap();
        assert_eq!(reference.adjusted(left, offset), Bounds::new(7.0, 20.0, 110.0, 220.0));

        let right = Adjustment::parse("r").unwrap();
        assert_eq!(reference.adjusted(right, offset), Bounds::new(10.0, 20.0, 107.0, 220.0));
    }

    #[test]
    fn hands_back_the_located_definition() {
        let config = layout("tb");
        let (section, bounds) = config.locate("pay_summary", CalibrationOffset::default()).unwrap();
        assert_eq!(section.name, "pay_summary");
        assert_eq!(section.page, 1);
        assert_eq!(bounds, section.bounds);
    }

    #[test]
    fn unknown_section_is_not_found() {
        let config = layout("tb");
        let err = config.locate("earnings", CalibrationOffset::default()).unwrap_err();
        assert!(matches!(err, ExtractError::SectionNotFound(name) if name == "earnings"));
    }
}
