use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, TAU};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::MetesError;

/// 八方位罗盘方向，自正北起顺时针每 45° 一档。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// 大小写不敏感地匹配全称（`southwest`）或两字母缩写（`SW`）。
    pub fn from_name(name: &str) -> Result<Self, MetesError> {
        let token = name.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|dir| dir.describe() == token || dir.abbreviation() == token)
            .ok_or_else(|| MetesError::InvalidDirection(name.to_string()))
    }

    /// 将弧度角归一化到 `[0, 2π)` 后映射到方向。
    ///
    /// 只有四个正方向能通过精确边界命中，斜方向只在开区间内出现：
    /// `0 → N`, `(0, π/4) → NE`, `π/4 → E`, `(π/4, π/2) → SE`, `π/2 → S`,
    /// `(π/2, 3π/4) → SW`, `3π/4 → W`，其余全部为 `NW`。
    pub fn from_angle(angle: f64) -> Self {
        let angle = angle.rem_euclid(TAU);
        if angle == 0.0 {
            Direction::North
        } else if angle < FRAC_PI_4 {
            Direction::NorthEast
        } else if angle == FRAC_PI_4 {
            Direction::East
        } else if angle < FRAC_PI_2 {
            Direction::SouthEast
        } else if angle == FRAC_PI_2 {
            Direction::South
        } else if angle < 3.0 * FRAC_PI_4 {
            Direction::SouthWest
        } else if angle == 3.0 * FRAC_PI_4 {
            Direction::West
        } else {
            Direction::NorthWest
        }
    }

    /// 法律文本使用的大写全称。
    pub fn describe(self) -> &'static str {
        match self {
            Direction::North => "NORTH",
            Direction::NorthEast => "NORTHEAST",
            Direction::East => "EAST",
            Direction::SouthEast => "SOUTHEAST",
            Direction::South => "SOUTH",
            Direction::SouthWest => "SOUTHWEST",
            Direction::West => "WEST",
            Direction::NorthWest => "NORTHWEST",
        }
    }

    pub fn abbreviation(self) -> &'static str {
        match self {
            Direction::North => "N",
            Direction::NorthEast => "NE",
            Direction::East => "E",
            Direction::SouthEast => "SE",
            Direction::South => "S",
            Direction::SouthWest => "SW",
            Direction::West => "W",
            Direction::NorthWest => "NW",
        }
    }

    #[inline]
    pub(crate) fn is_meridian(self) -> bool {
        matches!(self, Direction::North | Direction::South)
    }

    #[inline]
    pub(crate) fn is_parallel(self) -> bool {
        matches!(self, Direction::East | Direction::West)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

impl FromStr for Direction {
    type Err = MetesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}
