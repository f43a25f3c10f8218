use metes_core::{Bearing, ComposeOptions, Description, Segment};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct Summary<'a> {
    description: &'a str,
    area: f64,
    area_unit: &'a str,
    segments: Vec<SegmentSummary>,
}

#[derive(Debug, Serialize)]
struct SegmentSummary {
    kind: &'static str,
    clause: String,
    exit_tangent: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    chord_length: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    chord_bearing: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    arc_length: Option<f64>,
}

impl SegmentSummary {
    fn new(segment: &Segment, options: &ComposeOptions) -> Self {
        let mut summary = Self {
            kind: segment.kind(),
            clause: segment.render_with(options),
            exit_tangent: segment.exit_tangent(),
            radius: None,
            chord_length: None,
            chord_bearing: None,
            arc_length: None,
        };
        if let Segment::Arc(arc) = segment {
            summary.radius = Some(arc.radius());
            summary.chord_length = Some(arc.chord_length());
            let chord = Bearing::from_angle_with(arc.chord_angle(), options.negative_angles);
            summary.chord_bearing = Some(chord.describe());
            summary.arc_length = Some(arc.arc_length());
        }
        summary
    }
}

/// 将描述文本与逐段明细一并输出为 JSON。
pub fn to_json(
    description: &Description,
    text: &str,
    options: &ComposeOptions,
) -> serde_json::Result<String> {
    let summary = Summary {
        description: text,
        area: description.area,
        area_unit: &description.area_unit,
        segments: description
            .segments
            .iter()
            .map(|segment| SegmentSummary::new(segment, options))
            .collect(),
    };
    serde_json::to_string_pretty(&summary)
}
