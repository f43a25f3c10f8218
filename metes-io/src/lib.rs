use std::fs;
use std::path::{Path, PathBuf};

use metes_core::{Bearing, LinearSegment, MetesError, Segment};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, info};

static DISTANCE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+\.?\d*)\s?([a-zA-Z]+)").expect("distance pattern is a valid regex")
});

static AREA_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+\.?\d*)\s?([A-Za-z ]+)").expect("area pattern is a valid regex")
});

#[derive(Debug, Error)]
pub enum IoError {
    #[error("failed to read report {path:?}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: {source}")]
    Segment {
        line: usize,
        #[source]
        source: MetesError,
    },
    #[error("invalid area description: {0:?}")]
    InvalidArea(String),
    #[error("report does not contain an area line")]
    MissingArea,
}

/// 从报告中提取出的边界段与面积。
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub segments: Vec<Segment>,
    pub area: f64,
    pub area_unit: String,
}

pub trait ReportLoader {
    fn load(&self, path: &Path) -> Result<Report, IoError>;
}

/// AutoCAD "metes and bounds" 报告读取器。
pub struct AutoCadReport;

impl AutoCadReport {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AutoCadReport {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportLoader for AutoCadReport {
    fn load(&self, path: &Path) -> Result<Report, IoError> {
        let data = fs::read_to_string(path).map_err(|source| IoError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let report = parse_report(&data)?;
        info!(
            path = %path.display(),
            segments = report.segments.len(),
            area = report.area,
            "报告解析完成"
        );
        Ok(report)
    }
}

/// 解析整份报告：首行为标题跳过，空行忽略，`T` 开头为边界段，`C` 开头为面积。
pub fn parse_report(text: &str) -> Result<Report, IoError> {
    let mut segments = Vec::new();
    let mut area = None;

    for (index, line) in text.lines().enumerate() {
        if index == 0 || line.is_empty() {
            continue;
        }
        if line.starts_with('T') {
            let segment = parse_linear_segment(line).map_err(|source| IoError::Segment {
                line: index + 1,
                source,
            })?;
            debug!(line = index + 1, angle = segment.bearing_angle(), "解析直线段");
            segments.push(Segment::Linear(segment));
        } else if line.starts_with('C') {
            area = Some(parse_area_line(line)?);
        }
    }

    let (area, area_unit) = area.ok_or(IoError::MissingArea)?;
    Ok(Report {
        segments,
        area,
        area_unit,
    })
}

/// 解析 AutoCAD 输出的直线段，例如
/// `THENCE (1) North 1°38'38" East, 65.00 feet to a point of non-tangency;`。
///
/// 方位文本位于第一个 `)` 与第一个 `,` 之间，距离位于逗号之后、`to` 之前。
pub fn parse_linear_segment(line: &str) -> Result<LinearSegment, MetesError> {
    let invalid = || MetesError::InvalidSegmentDescription(line.to_string());
    let open = line.find(')').ok_or_else(invalid)?;
    let comma = line.find(',').ok_or_else(invalid)?;
    if comma < open {
        return Err(invalid());
    }

    let bearing = Bearing::parse(&line[open..comma])?;

    let rest = &line[comma + 1..];
    let distance_text = rest.find("to").map_or(rest, |end| &rest[..end]);
    let caps = DISTANCE_PATTERN.captures(distance_text).ok_or_else(invalid)?;
    let distance: f64 = caps[1].parse().map_err(|_| invalid())?;

    LinearSegment::from_bearing(&bearing, distance, &caps[2])
}

/// 解析面积行，如 `Containing 4,562.20 square feet`，千位分隔符会先被剔除。
pub fn parse_area_line(line: &str) -> Result<(f64, String), IoError> {
    let cleaned = line.replace(',', "");
    let caps = AREA_PATTERN
        .captures(&cleaned)
        .ok_or_else(|| IoError::InvalidArea(line.to_string()))?;
    let area: f64 = caps[1]
        .parse()
        .map_err(|_| IoError::InvalidArea(line.to_string()))?;
    let unit = caps[2].trim();
    if unit.is_empty() {
        return Err(IoError::InvalidArea(line.to_string()));
    }
    Ok((area, unit.to_string()))
}

/// 由引测方位（`N12d34m56sE`）与距离构造从引测点到起点的直线段。
pub fn commencement_leg(
    bearing_text: &str,
    distance: f64,
    unit: &str,
) -> Result<LinearSegment, MetesError> {
    let bearing = Bearing::parse(bearing_text)?;
    LinearSegment::from_bearing(&bearing, distance, unit)
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use super::*;

    #[test]
    fn parses_linear_segment_with_trailing_clause() {
        let segment =
            parse_linear_segment(r#"THENCE (1) North 1°38'38" East, 65.00 feet to a point of non-tangency;"#)
                .expect("parse segment");
        let expected = (1.0 + 38.0 / 60.0 + 38.0 / 3600.0) * PI / 180.0;
        assert!((segment.bearing_angle() - expected).abs() < 1e-12);
        assert!((segment.distance() - 65.0).abs() < 1e-12);
        assert_eq!(segment.unit(), "feet");
    }

    #[test]
    fn parses_linear_segment_without_trailing_clause() {
        let segment = parse_linear_segment(r#"THENCE (6) North 30°1'1" East, 25.00 feet"#).unwrap();
        let expected = (30.0 + 1.0 / 60.0 + 1.0 / 3600.0) * PI / 180.0;
        assert!((segment.bearing_angle() - expected).abs() < 1e-12);
        assert!((segment.distance() - 25.0).abs() < 1e-12);
        assert_eq!(segment.unit(), "feet");
    }

    #[test]
    fn rejects_line_without_delimiters() {
        let err = parse_linear_segment("THENCE North 1°38'38\" East 65.00 feet").unwrap_err();
        assert!(matches!(err, MetesError::InvalidSegmentDescription(_)));

        let err = parse_linear_segment("THENCE (1) North 1°38'38\" East, feet").unwrap_err();
        assert!(matches!(err, MetesError::InvalidSegmentDescription(_)));
    }

    #[test]
    fn bearing_errors_propagate_from_segment_parsing() {
        let err = parse_linear_segment("THENCE (1) Nowhere, 65.00 feet").unwrap_err();
        assert!(matches!(err, MetesError::InvalidBearingString(_)));
    }

    #[test]
    fn parses_area_with_thousands_separator() {
        let (area, unit) = parse_area_line("Containing 4,562.20 square feet").unwrap();
        assert!((area - 4562.2).abs() < 1e-9);
        assert_eq!(unit, "square feet");
        assert!(matches!(
            parse_area_line("Containing nothing"),
            Err(IoError::InvalidArea(_))
        ));
    }

    #[test]
    fn report_skips_title_and_collects_segments() {
        let text = "THENCE (0) title line is ignored\n\
                    THENCE (1) North 1°38'38\" East, 65.00 feet;\n\
                    \n\
                    Containing 120 acres\n";
        let report = parse_report(text).unwrap();
        assert_eq!(report.segments.len(), 1);
        assert!((report.area - 120.0).abs() < 1e-9);
        assert_eq!(report.area_unit, "acres");
    }

    #[test]
    fn commencement_leg_parses_compact_bearing() {
        let leg = commencement_leg("S1d2m3sW", 10.0, "FEET").unwrap();
        assert_eq!(leg.unit(), "FEET");
        let bearing = leg.bearing();
        assert_eq!(bearing.degrees(), 1);
        assert_eq!(bearing.minutes(), 2);
        assert!((bearing.seconds() - 3.0).abs() < 1e-6);
        assert!(commencement_leg("S1d2m3sW", 0.0, "FEET").is_err());
    }
}
