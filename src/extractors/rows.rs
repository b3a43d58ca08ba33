// src/extractors/rows.rs
use crate::layout::ColumnIndex;
use crate::utils::error::ParseError;

/// One row of cells as emitted by the extraction tool. No typing at this layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row(Vec<String>);

impl Row {
    pub fn new(cells: Vec<String>) -> Self {
        Self(cells)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn cell(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn cell_at(&self, index: ColumnIndex) -> Option<&str> {
        index.resolve(self.len()).and_then(|i| self.cell(i))
    }

    pub fn cells(&self) -> &[String] {
        &self.0
    }
}

/// Parses comma-separated tool output into rows.
///
/// Rows must all have the same number of cells, and quoting must balance.
pub fn parse_rows(section: &str, raw: &[u8]) -> Result<Vec<Row>, ParseError> {
    let malformed = |detail: String| ParseError::Malformed {
        section: section.to_string(),
        detail,
    };

    // Escaped quotes come in pairs, so an odd count means an unterminated field.
    if raw.iter().filter(|&&b| b == b'"').count() % 2 != 0 {
        return Err(malformed("unbalanced quotes".to_string()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(false)
        .from_reader(raw);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| malformed(e.to_string()))?;
        rows.push(Row::new(record.iter().map(str::to_string).collect()));
    }
    tracing::debug!("Parsed section {} into {} rows", section, rows.len());
    tracing::trace!("Section {} rows: {:?}", section, rows);
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rows_in_order() {
        let raw = b"Description,Current,YTD\nRegular Pay,\"$1,000.00\",\"$12,000.00\"\n";
        let rows = parse_rows("earnings", raw).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].cells(), &["Description", "Current", "YTD"]);
        assert_eq!(rows[1].cell(1), Some("$1,000.00"));
        assert_eq!(rows[1].cell_at(ColumnIndex::FromEnd(1)), Some("$12,000.00"));
        assert_eq!(rows[1].cell(3), None);
    }

    #[test]
    fn keeps_empty_cells() {
        let rows = parse_rows("taxes", b"Medicare,,12.00\r\n").unwrap();
        assert_eq!(rows[0].cells(), &["Medicare", "", "12.00"]);
    }

    #[test]
    fn empty_output_has_no_rows() {
        assert!(parse_rows("taxes", b"").unwrap().is_empty());
    }

    #[test]
    fn rejects_ragged_rows() {
        let err = parse_rows("earnings", b"a,b,c\nd,e\n").unwrap_err();
        assert!(matches!(err, ParseError::Malformed { section, .. } if section == "earnings"));
    }

    #[test]
    fn rejects_unbalanced_quotes() {
        let err = parse_rows("earnings", b"a,\"b,c\nd,e,f\n").unwrap_err();
        assert!(matches!(err, ParseError::Malformed { detail, .. } if detail.contains("quotes")));
    }

    #[test]
    fn is_deterministic() {
        let raw = b"x,\"y \"\"quoted\"\"\",z\n";
        let first = parse_rows("s", raw).unwrap();
        assert_eq!(first, parse_rows("s", raw).unwrap());
        assert_eq!(first[0].cell(1), Some("y \"quoted\""));
    }
}
