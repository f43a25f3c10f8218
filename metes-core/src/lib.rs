pub mod bearing;
pub mod description;
pub mod direction;
pub mod segment;

pub mod errors {
    use thiserror::Error;

    use crate::direction::Direction;

    #[derive(Debug, Error)]
    pub enum MetesError {
        #[error("direction not recognized: {0:?}")]
        InvalidDirection(String),
        #[error("bearing component out of range: {degrees}° {minutes}' {seconds}\"")]
        InvalidBearingComponent {
            degrees: i32,
            minutes: i32,
            seconds: f64,
        },
        #[error("{primary} - {secondary} are not valid directions for a bearing")]
        InvalidQuadrant {
            primary: Direction,
            secondary: Direction,
        },
        #[error("invalid bearing string: {0:?}")]
        InvalidBearingString(String),
        #[error("invalid segment description: {0:?}")]
        InvalidSegmentDescription(String),
        #[error("invalid segment: {0}")]
        InvalidSegment(String),
    }
}

pub use bearing::{Bearing, NegativeAngleRule};
pub use description::{ComposeOptions, Description, TangentTracking};
pub use direction::Direction;
pub use errors::MetesError;
pub use segment::{ArcSegment, LinearSegment, Rotation, Segment, TANGENCY_TOLERANCE};
