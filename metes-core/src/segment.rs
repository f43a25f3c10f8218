use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use serde::{Deserialize, Serialize};

use crate::bearing::{Bearing, NegativeAngleRule};
use crate::description::ComposeOptions;
use crate::direction::Direction;
use crate::errors::MetesError;

/// 判定两段是否相切时允许的角度误差（弧度）。
pub const TANGENCY_TOLERANCE: f64 = 1e-9;

#[inline]
fn is_tangent(previous: f64, current: f64, tolerance: f64) -> bool {
    (previous - current).abs() <= tolerance
}

fn ensure_positive(value: f64, what: &str) -> Result<(), MetesError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(MetesError::InvalidSegment(format!(
            "{what} must be a positive finite number, got {value}"
        )))
    }
}

fn ensure_finite(value: f64, what: &str) -> Result<(), MetesError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(MetesError::InvalidSegment(format!(
            "{what} must be finite, got {value}"
        )))
    }
}

/// 沿圆弧行进的旋向，取值 ±1 便于推导切线角。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    Clockwise,
    CounterClockwise,
}

impl Rotation {
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Rotation::Clockwise => 1.0,
            Rotation::CounterClockwise => -1.0,
        }
    }
}

/// 直线边界段：方位角（弧度）、距离与单位。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearSegment {
    bearing_angle: f64,
    distance: f64,
    unit: String,
}

impl LinearSegment {
    pub fn new(bearing_angle: f64, distance: f64, unit: impl Into<String>) -> Result<Self, MetesError> {
        ensure_finite(bearing_angle, "bearing angle")?;
        ensure_positive(distance, "distance")?;
        Ok(Self {
            bearing_angle,
            distance,
            unit: unit.into(),
        })
    }

    pub fn from_bearing(
        bearing: &Bearing,
        distance: f64,
        unit: impl Into<String>,
    ) -> Result<Self, MetesError> {
        Self::new(bearing.to_angle(), distance, unit)
    }

    #[inline]
    pub fn bearing_angle(&self) -> f64 {
        self.bearing_angle
    }

    #[inline]
    pub fn bearing(&self) -> Bearing {
        Bearing::from_angle(self.bearing_angle)
    }

    #[inline]
    pub fn bearing_with(&self, rule: NegativeAngleRule) -> Bearing {
        Bearing::from_angle_with(self.bearing_angle, rule)
    }

    #[inline]
    pub fn distance(&self) -> f64 {
        self.distance
    }

    #[inline]
    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn render(&self) -> String {
        self.render_with(NegativeAngleRule::default())
    }

    pub fn render_with(&self, rule: NegativeAngleRule) -> String {
        format!(
            "{} A DISTANCE OF {:.2} {}",
            self.bearing_with(rule).describe(),
            self.distance,
            self.unit.to_uppercase()
        )
    }

    /// 直线的行进方向恒定，出口切线即方位角本身。
    #[inline]
    pub fn exit_tangent(&self) -> f64 {
        self.bearing_angle
    }

    pub fn transition_preamble(&self, previous_tangent: f64, tolerance: f64) -> String {
        if is_tangent(previous_tangent, self.bearing_angle, tolerance) {
            "A POINT OF TANGENCY".to_string()
        } else {
            "A POINT OF NON-TANGENCY".to_string()
        }
    }
}

/// 圆弧边界段。弦长、弦方位、凹向等均由圆心角、半径与起点切线推导。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArcSegment {
    central_angle: f64,
    radius: f64,
    unit: String,
    /// 起点处沿行进方向的切线角。
    tangent_angle: f64,
    rotation: Rotation,
}

impl ArcSegment {
    pub fn new(
        central_angle: f64,
        radius: f64,
        tangent_angle: f64,
        unit: impl Into<String>,
        rotation: Rotation,
    ) -> Result<Self, MetesError> {
        ensure_positive(central_angle, "central angle")?;
        ensure_positive(radius, "radius")?;
        ensure_finite(tangent_angle, "tangent angle")?;
        Ok(Self {
            central_angle,
            radius,
            unit: unit.into(),
            tangent_angle,
            rotation,
        })
    }

    #[inline]
    pub fn central_angle(&self) -> f64 {
        self.central_angle
    }

    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    #[inline]
    pub fn unit(&self) -> &str {
        &self.unit
    }

    #[inline]
    pub fn tangent_angle(&self) -> f64 {
        self.tangent_angle
    }

    #[inline]
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// 起讫点之间的直线距离。
    pub fn chord_length(&self) -> f64 {
        2.0 * self.radius * (self.central_angle / 2.0).sin()
    }

    /// 弦的方向角，同时也是弧中点处的切线角。
    pub fn chord_angle(&self) -> f64 {
        self.tangent_angle + self.rotation.sign() * self.central_angle / 2.0
    }

    pub fn chord_bearing(&self) -> Bearing {
        Bearing::from_angle(self.chord_angle())
    }

    /// 自弦中点指向圆心的角度，按固定 45° 偏移约定取值。
    pub fn concavity_angle(&self) -> f64 {
        self.chord_angle() + self.rotation.sign() * FRAC_PI_4
    }

    pub fn concavity(&self) -> Direction {
        Direction::from_angle(self.concavity_angle())
    }

    /// 非相切衔接时引用的径向线角度，可能为负。
    pub fn radial_angle(&self) -> f64 {
        self.tangent_angle + self.rotation.sign() * FRAC_PI_4 + FRAC_PI_2
    }

    pub fn arc_length(&self) -> f64 {
        self.radius * self.central_angle
    }

    /// 圆心角借用方位角的度分秒格式输出，前后的方向词只是格式副产物。
    pub fn render(&self) -> String {
        format!(
            "{}ERLY ALONG SAID CURVE THROUGH A CENTRAL ANGLE OF {} AN ARC DISTANCE OF {:.2} {}",
            self.concavity().describe(),
            Bearing::from_angle(self.central_angle).describe(),
            self.arc_length(),
            self.unit.to_uppercase()
        )
    }

    /// 链式比较时视圆弧不改变切线方向，直接返回起点切线。
    #[inline]
    pub fn exit_tangent(&self) -> f64 {
        self.tangent_angle
    }

    pub fn transition_preamble(
        &self,
        previous_tangent: f64,
        tolerance: f64,
        rule: NegativeAngleRule,
    ) -> String {
        let concavity = self.concavity().describe();
        let unit = self.unit.to_uppercase();
        if is_tangent(previous_tangent, self.tangent_angle, tolerance) {
            return format!(
                "THE BEGINNING OF A CURVE CONCAVE {concavity}ERLY, SAID CURVE HAS A RADIUS OF {:.2} {unit}",
                self.radius
            );
        }
        format!(
            "THE BEGINNING OF A NON-TANGENT CURVE CONCAVE {concavity}ERLY, SAID CURVE HAS A RADIUS OF {:.2} {unit}, TO WHICH A RADIAL LINE BEARS {}",
            self.radius,
            Bearing::from_angle_with(self.radial_angle(), rule).describe()
        )
    }
}

/// 边界的一段，直线或圆弧。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Segment {
    Linear(LinearSegment),
    Arc(ArcSegment),
}

impl Segment {
    #[inline]
    pub fn kind(&self) -> &'static str {
        match self {
            Segment::Linear(_) => "linear",
            Segment::Arc(_) => "arc",
        }
    }

    pub fn render(&self) -> String {
        self.render_with(&ComposeOptions::default())
    }

    pub fn render_with(&self, options: &ComposeOptions) -> String {
        match self {
            Segment::Linear(line) => line.render_with(options.negative_angles),
            Segment::Arc(arc) => arc.render(),
        }
    }

    /// 以前一段的出口切线为参照，描述本段的起始衔接关系。
    pub fn transition_preamble(&self, previous_tangent: f64) -> String {
        self.transition_preamble_with(previous_tangent, &ComposeOptions::default())
    }

    pub fn transition_preamble_with(&self, previous_tangent: f64, options: &ComposeOptions) -> String {
        match self {
            Segment::Linear(line) => {
                line.transition_preamble(previous_tangent, options.tangency_tolerance)
            }
            Segment::Arc(arc) => arc.transition_preamble(
                previous_tangent,
                options.tangency_tolerance,
                options.negative_angles,
            ),
        }
    }

    pub fn exit_tangent(&self) -> f64 {
        match self {
            Segment::Linear(line) => line.exit_tangent(),
            Segment::Arc(arc) => arc.exit_tangent(),
        }
    }
}

impl From<LinearSegment> for Segment {
    fn from(value: LinearSegment) -> Self {
        Segment::Linear(value)
    }
}

impl From<ArcSegment> for Segment {
    fn from(value: ArcSegment) -> Self {
        Segment::Arc(value)
    }
}
