// Primitives shared by the source readers.

use dashboard_pipeline::Datum;
use std::path::Path;

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum SourceFormat {
    Csv,
    Excel,
}

pub fn detect_format(path: &str) -> Option<SourceFormat> {
    match Path::new(path).extension().and_then(|e| e.to_str()) {
        Some(e) if e.eq_ignore_ascii_case("csv") => Some(SourceFormat::Csv),
        Some(e) if e.eq_ignore_ascii_case("xlsx") || e.eq_ignore_ascii_case("xlsm") => {
            Some(SourceFormat::Excel)
        }
        _ => None,
    }
}

/// Blank cells become missing, anything that parses as a finite number
/// becomes a number, the rest stays text. Literal "NaN" and infinities also
/// become missing. Malformed numeric content is therefore dropped later by
/// the aggregations, never an error here.
pub fn parse_cell(s: &str) -> Datum {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Datum::Missing;
    }
    match trimmed.parse::<f64>() {
        Ok(x) if x.is_finite() => Datum::Number(x),
        Ok(_) => Datum::Missing,
        Err(_) => Datum::Text(s.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_cells() {
        assert_eq!(parse_cell("12.5"), Datum::Number(12.5));
        assert_eq!(parse_cell(" 1 "), Datum::Number(1.0));
        assert_eq!(parse_cell(""), Datum::Missing);
        assert_eq!(parse_cell("   "), Datum::Missing);
        assert_eq!(parse_cell("Africa"), Datum::Text("Africa".to_string()));
    }

    #[test]
    fn non_finite_cells_are_missing() {
        assert_eq!(parse_cell("NaN"), Datum::Missing);
        assert_eq!(parse_cell("nan"), Datum::Missing);
        assert_eq!(parse_cell("inf"), Datum::Missing);
        assert_eq!(parse_cell("-inf"), Datum::Missing);
        assert_eq!(parse_cell("Infinity"), Datum::Missing);
    }

    #[test]
    fn detects_formats() {
        assert_eq!(detect_format("data.csv"), Some(SourceFormat::Csv));
        assert_eq!(detect_format("data.XLSX"), Some(SourceFormat::Excel));
        assert_eq!(detect_format("data.bin"), None);
    }
}
