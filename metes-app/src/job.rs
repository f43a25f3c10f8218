use anyhow::{Context, Result};
use metes_config::{AngleMode, AppConfig, TangentMode};
use metes_core::{ComposeOptions, Description, NegativeAngleRule, Segment, TangentTracking};
use metes_io::{AutoCadReport, Report, ReportLoader, commencement_leg};
use tracing::debug;

use crate::{Cli, OutputFormat, summary};

/// 读取报告、组装描述并按输出格式序列化。
pub fn run(cli: &Cli, config: &AppConfig) -> Result<String> {
    let report = AutoCadReport::new()
        .load(&cli.report)
        .with_context(|| format!("无法处理报告 {}", cli.report.display()))?;
    let description = build_description(cli, config, report)?;
    let options = compose_options(cli, config);
    let text = description.render_with(&options);

    match cli.format {
        OutputFormat::Text => Ok(text),
        OutputFormat::Json => {
            summary::to_json(&description, &text, &options).context("序列化 JSON 输出失败")
        }
    }
}

pub fn build_description(cli: &Cli, config: &AppConfig, report: Report) -> Result<Description> {
    let cdir = cli.cdir.as_deref().map(str::trim).filter(|text| !text.is_empty());

    let mut segments = Vec::with_capacity(report.segments.len() + 1);
    if let Some(bearing) = cdir {
        let leg = commencement_leg(bearing, cli.cdist, &config.report.default_unit)
            .with_context(|| format!("引测段无效: {bearing} / {}", cli.cdist))?;
        debug!(bearing, distance = cli.cdist, "加入引测段");
        segments.push(Segment::Linear(leg));
    }
    segments.extend(report.segments);

    let city = cli.city.as_deref().unwrap_or(&config.jurisdiction.city);
    let county = cli.county.as_deref().unwrap_or(&config.jurisdiction.county);
    let state = cli.state.as_deref().unwrap_or(&config.jurisdiction.state);

    Ok(Description {
        kind: cli.kind.trim().to_uppercase(),
        lot: optional(cli.lot.as_deref()),
        block: optional(cli.block.as_deref()),
        subdivision: cli.sub.trim().to_uppercase(),
        city: optional(Some(city)),
        county: county.trim().to_uppercase(),
        state: state.trim().to_uppercase(),
        start: cli.origin,
        commencement: cdir.is_some() || cli.cdist != 0.0,
        area: report.area,
        area_unit: report.area_unit.to_uppercase(),
        segments,
    })
}

pub fn compose_options(cli: &Cli, config: &AppConfig) -> ComposeOptions {
    let tangent_tracking = if cli.thread_tangents {
        TangentTracking::Threaded
    } else {
        match config.composition.tangent_tracking {
            TangentMode::Frozen => TangentTracking::Frozen,
            TangentMode::Threaded => TangentTracking::Threaded,
        }
    };
    let negative_angles = if cli.normalize_angles {
        NegativeAngleRule::Normalize
    } else {
        match config.composition.negative_angles {
            AngleMode::Reflect => NegativeAngleRule::Reflect,
            AngleMode::Normalize => NegativeAngleRule::Normalize,
        }
    };
    ComposeOptions {
        tangent_tracking,
        tangency_tolerance: config.composition.tangency_tolerance,
        negative_angles,
    }
}

fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_uppercase)
}
