use std::f64::consts::{FRAC_PI_2, PI, TAU};
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::direction::Direction;
use crate::errors::MetesError;

/// `{N|S}{任意非数字}{度}{D|°}{分}{M|'}{秒}{S|"}{E|W}`，匹配前已去空白并转大写。
static BEARING_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([NS])\D*(\d+)[D°](\d+)[M'](\d+\.?\d*)[S"]([EW])"#)
        .expect("bearing pattern is a valid regex")
});

/// 负弧度角在换算成方位角前的归约方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NegativeAngleRule {
    /// `θ < 0` 时先取 `|θ| + π` 再对 2π 取模，与既有报告文本逐字一致。
    /// 西北象限的方位因此会落到西南象限。
    #[default]
    Reflect,
    /// 直接归一化到 `[0, 2π)`，四个象限都能由 `to_angle` 往返还原。
    Normalize,
}

impl NegativeAngleRule {
    pub fn reduce(self, angle: f64) -> f64 {
        match self {
            NegativeAngleRule::Reflect if angle < 0.0 => (angle.abs() + PI).rem_euclid(TAU),
            _ => angle.rem_euclid(TAU),
        }
    }
}

/// 测量方位角，采用度分秒记法，相对南北子午线向东或向西偏转。
///
/// `primary` 恒为南北之一，`secondary` 恒为东西之一。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bearing {
    primary: Direction,
    degrees: i32,
    minutes: i32,
    seconds: f64,
    secondary: Direction,
}

impl Bearing {
    /// 校验后构造方位角。度、分、秒的取值区间 `[0, 90]`、`[0, 60]`、`[0, 60]`
    /// 两端均为闭区间，因此 `90°60'60"` 也会被接受。
    pub fn new(
        primary: Direction,
        secondary: Direction,
        degrees: i32,
        minutes: i32,
        seconds: f64,
    ) -> Result<Self, MetesError> {
        if !primary.is_meridian() || !secondary.is_parallel() {
            return Err(MetesError::InvalidQuadrant {
                primary,
                secondary,
            });
        }
        let seconds_in_range = (0.0..=60.0).contains(&seconds);
        if !(0..=90).contains(&degrees) || !(0..=60).contains(&minutes) || !seconds_in_range {
            return Err(MetesError::InvalidBearingComponent {
                degrees,
                minutes,
                seconds,
            });
        }
        Ok(Self {
            primary,
            degrees,
            minutes,
            seconds,
            secondary,
        })
    }

    /// 解析 `N10d15m30sW`、`South 87°30'54" East` 一类文本。
    pub fn parse(text: &str) -> Result<Self, MetesError> {
        let compact: String = text
            .chars()
            .filter(|ch| !ch.is_whitespace())
            .collect::<String>()
            .to_uppercase();
        let caps = BEARING_PATTERN
            .captures(&compact)
            .ok_or_else(|| MetesError::InvalidBearingString(text.to_string()))?;

        let primary = Direction::from_name(&caps[1])?;
        let degrees = parse_component::<i32>(&caps[2], text)?;
        let minutes = parse_component::<i32>(&caps[3], text)?;
        let seconds = parse_component::<f64>(&caps[4], text)?;
        let secondary = Direction::from_name(&caps[5])?;
        Self::new(primary, secondary, degrees, minutes, seconds)
    }

    /// 由带符号弧度角推导方位角，负角按 [`NegativeAngleRule::Reflect`] 处理。
    pub fn from_angle(angle: f64) -> Self {
        Self::from_angle_with(angle, NegativeAngleRule::default())
    }

    /// 由带符号弧度角推导方位角，结果总落在规范区间内（分、秒为 `[0, 60)`）。
    ///
    /// 角度以正北为 0、顺时针为正。换算只截断不舍入。
    pub fn from_angle_with(angle: f64, rule: NegativeAngleRule) -> Self {
        let mut theta = rule.reduce(angle);
        let (primary, secondary) = if theta < FRAC_PI_2 {
            (Direction::North, Direction::East)
        } else if theta < PI {
            theta = PI - theta;
            (Direction::South, Direction::East)
        } else if theta < 3.0 * FRAC_PI_2 {
            theta -= PI;
            (Direction::South, Direction::West)
        } else {
            theta = TAU - theta;
            (Direction::North, Direction::West)
        };

        let total = theta * 180.0 / PI;
        let degrees = total.floor();
        let total_minutes = (total - degrees) * 60.0;
        let minutes = total_minutes.floor();
        let seconds = (total_minutes - minutes) * 60.0;

        Self {
            primary,
            degrees: degrees as i32,
            minutes: minutes as i32,
            seconds,
            secondary,
        }
    }

    /// 转为弧度角：北向基准 0，南向基准 π；NE 与 SW 象限顺时针为正，其余为负。
    pub fn to_angle(&self) -> f64 {
        let start = if self.primary == Direction::North {
            0.0
        } else {
            180.0
        };
        let rotation = match (self.primary, self.secondary) {
            (Direction::North, Direction::East) | (Direction::South, Direction::West) => 1.0,
            _ => -1.0,
        };
        (start + rotation * self.decimal_degrees()) / 180.0 * PI
    }

    #[inline]
    pub fn decimal_degrees(&self) -> f64 {
        f64::from(self.degrees) + f64::from(self.minutes) / 60.0 + self.seconds / 3600.0
    }

    /// 法律文本格式：`SOUTH 87°30'54.00" EAST`。
    pub fn describe(&self) -> String {
        format!(
            "{} {}°{}'{:.2}\" {}",
            self.primary.describe(),
            self.degrees,
            self.minutes,
            self.seconds,
            self.secondary.describe()
        )
    }

    #[inline]
    pub fn primary(&self) -> Direction {
        self.primary
    }

    #[inline]
    pub fn secondary(&self) -> Direction {
        self.secondary
    }

    #[inline]
    pub fn degrees(&self) -> i32 {
        self.degrees
    }

    #[inline]
    pub fn minutes(&self) -> i32 {
        self.minutes
    }

    #[inline]
    pub fn seconds(&self) -> f64 {
        self.seconds
    }
}

fn parse_component<T: FromStr>(raw: &str, source: &str) -> Result<T, MetesError> {
    raw.parse::<T>()
        .map_err(|_| MetesError::InvalidBearingString(source.to_string()))
}

impl fmt::Display for Bearing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

impl FromStr for Bearing {
    type Err = MetesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_4;

    use super::*;

    fn bearing(p: Direction, s: Direction, d: i32, m: i32, sec: f64) -> Bearing {
        Bearing::new(p, s, d, m, sec).expect("valid bearing")
    }

    #[test]
    fn construction_bounds_are_inclusive() {
        assert!(Bearing::new(Direction::North, Direction::East, 90, 60, 60.0).is_ok());
        assert!(Bearing::new(Direction::North, Direction::East, 0, 0, 0.0).is_ok());

        let err = Bearing::new(Direction::North, Direction::East, 91, 0, 0.0).unwrap_err();
        assert!(matches!(err, MetesError::InvalidBearingComponent { degrees: 91, .. }));
        assert!(Bearing::new(Direction::North, Direction::East, 10, 61, 0.0).is_err());
        assert!(Bearing::new(Direction::North, Direction::East, 10, 0, -1.0).is_err());
        assert!(Bearing::new(Direction::North, Direction::East, -1, 0, 0.0).is_err());
        assert!(Bearing::new(Direction::North, Direction::East, 10, 0, f64::NAN).is_err());
    }

    #[test]
    fn construction_requires_meridian_and_parallel() {
        let err = Bearing::new(Direction::East, Direction::North, 10, 0, 0.0).unwrap_err();
        assert!(matches!(err, MetesError::InvalidQuadrant { .. }));
        assert!(Bearing::new(Direction::NorthEast, Direction::East, 10, 0, 0.0).is_err());
    }

    #[test]
    fn parses_compact_notation() {
        let parsed = Bearing::parse("N10d15m30sW").unwrap();
        assert_eq!(parsed, bearing(Direction::North, Direction::West, 10, 15, 30.0));
    }

    #[test]
    fn parses_verbose_notation() {
        let parsed: Bearing = "South 87°30'54\" East".parse().unwrap();
        assert_eq!(parsed, bearing(Direction::South, Direction::East, 87, 30, 54.0));

        let fractional = Bearing::parse("South 88°21'22.1\" East").unwrap();
        assert_eq!(fractional, bearing(Direction::South, Direction::East, 88, 21, 22.1));
    }

    #[test]
    fn parse_rejects_malformed_text() {
        let err = Bearing::parse("N10x15m30sW").unwrap_err();
        assert!(matches!(err, MetesError::InvalidBearingString(_)));
        assert!(Bearing::parse("").is_err());
        assert!(Bearing::parse("E10d15m30sN").is_err());
        // 位数过长导致整数溢出
        assert!(matches!(
            Bearing::parse("N99999999999d15m30sW").unwrap_err(),
            MetesError::InvalidBearingString(_)
        ));
    }

    #[test]
    fn describe_formats_dms_text() {
        let b = bearing(Direction::South, Direction::East, 87, 30, 54.0);
        assert_eq!(b.describe(), "SOUTH 87°30'54.00\" EAST");
        let b = bearing(Direction::North, Direction::West, 1, 2, 3.456);
        assert_eq!(b.to_string(), "NORTH 1°2'3.46\" WEST");
    }

    #[test]
    fn to_angle_matches_quadrant_rules() {
        let b = bearing(Direction::South, Direction::East, 45, 5, 5.0);
        let expected = (PI * 3.0 / 4.0) - (5.0 / 60.0 + 5.0 / 3600.0) * PI / 180.0;
        assert!((b.to_angle() - expected).abs() < 1e-9);

        let ne = bearing(Direction::North, Direction::East, 45, 0, 0.0);
        assert!((ne.to_angle() - FRAC_PI_4).abs() < 1e-12);
        let nw = bearing(Direction::North, Direction::West, 45, 0, 0.0);
        assert!((nw.to_angle() + FRAC_PI_4).abs() < 1e-12);
        let sw = bearing(Direction::South, Direction::West, 45, 0, 0.0);
        assert!((sw.to_angle() - 5.0 * FRAC_PI_4).abs() < 1e-12);
    }

    #[test]
    fn from_angle_selects_quadrant_and_truncates() {
        let angle = (PI * 3.0 / 4.0) - (10.0 / 60.0 + 10.0 / 3600.0) / 180.0 * PI;
        let b = Bearing::from_angle(angle);
        assert_eq!(b.primary(), Direction::South);
        assert_eq!(b.secondary(), Direction::East);
        assert_eq!(b.degrees(), 45);
        assert_eq!(b.minutes(), 10);
        assert!((b.seconds() - 10.0).abs() < 1e-6);

        // -0.3 rad 归一化后约为 N 17°11'19.44" W
        let west = Bearing::from_angle_with(-0.3, NegativeAngleRule::Normalize);
        assert_eq!(west.primary(), Direction::North);
        assert_eq!(west.secondary(), Direction::West);
        assert_eq!(west.degrees(), 17);
        assert_eq!(west.minutes(), 11);
    }

    #[test]
    fn reflect_rule_moves_negative_angles_by_pi() {
        assert_eq!(NegativeAngleRule::default(), NegativeAngleRule::Reflect);
        assert_eq!(
            Bearing::from_angle(-0.3).describe(),
            "SOUTH 17°11'19.44\" WEST"
        );
        assert_eq!(
            Bearing::from_angle_with(-0.3, NegativeAngleRule::Normalize).describe(),
            "NORTH 17°11'19.44\" WEST"
        );

        let nw = Bearing::parse("N87d30m54sW").unwrap();
        assert_eq!(
            Bearing::from_angle(nw.to_angle()).describe(),
            "SOUTH 87°30'54.00\" WEST"
        );
        assert_eq!(
            Bearing::from_angle_with(nw.to_angle(), NegativeAngleRule::Normalize).describe(),
            "NORTH 87°30'54.00\" WEST"
        );
    }

    #[test]
    fn rules_agree_on_non_negative_angles() {
        for text in ["N1d38m38sE", "S87d30m54sE", "S2d2m36sW"] {
            let angle = Bearing::parse(text).unwrap().to_angle();
            assert!(angle >= 0.0);
            assert_eq!(
                Bearing::from_angle_with(angle, NegativeAngleRule::Reflect),
                Bearing::from_angle_with(angle, NegativeAngleRule::Normalize)
            );
        }
        assert!((NegativeAngleRule::Reflect.reduce(TAU + 0.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn round_trip_through_angle_preserves_bearing() {
        let original = Bearing::parse("South 87°30'54\" East, 5.00 feet").unwrap();
        let restored = Bearing::from_angle(original.to_angle());
        assert_eq!(restored.primary(), original.primary());
        assert_eq!(restored.secondary(), original.secondary());
        assert_eq!(restored.degrees(), original.degrees());
        assert_eq!(restored.minutes(), original.minutes());
        assert!((restored.seconds() - original.seconds()).abs() < 1e-6);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn quadrant() -> impl Strategy<Value = (Direction, Direction)> {
            prop_oneof![
                Just((Direction::North, Direction::East)),
                Just((Direction::South, Direction::East)),
                Just((Direction::South, Direction::West)),
                Just((Direction::North, Direction::West)),
            ]
        }

        proptest! {
            #[test]
            fn canonical_bearings_round_trip(
                (primary, secondary) in quadrant(),
                degrees in 0i32..90,
                minutes in 0i32..60,
                seconds in 0.5f64..59.5,
            ) {
                let original = Bearing::new(primary, secondary, degrees, minutes, seconds)?;
                let restored =
                    Bearing::from_angle_with(original.to_angle(), NegativeAngleRule::Normalize);
                prop_assert_eq!(restored.primary(), primary);
                prop_assert_eq!(restored.secondary(), secondary);
                prop_assert_eq!(restored.degrees(), degrees);
                prop_assert_eq!(restored.minutes(), minutes);
                prop_assert!(
                    (restored.seconds() - seconds).abs() < 1e-6,
                    "seconds drifted: {} -> {}",
                    seconds,
                    restored.seconds()
                );
            }
        }
    }
}
