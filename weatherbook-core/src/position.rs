use async_trait::async_trait;
use std::fmt::Debug;

use crate::{error::LocationError, model::Coordinate};

/// Source of the device's current position.
///
/// Implementations own any permission prompt; callers only see a coordinate
/// or the reason there is none.
#[async_trait]
pub trait CoordinateSource: Send + Sync + Debug {
    async fn request_current_coordinate(&self) -> Result<Coordinate, LocationError>;
}

/// A position fixed up front. `None` behaves like a denied permission.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticCoordinate(pub Option<Coordinate>);

#[async_trait]
impl CoordinateSource for StaticCoordinate {
    async fn request_current_coordinate(&self) -> Result<Coordinate, LocationError> {
        self.0.ok_or(LocationError::PermissionDenied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixed_coordinate_is_returned() {
        let here = Coordinate { latitude: 51.5, longitude: -0.12 };
        let got = StaticCoordinate(Some(here)).request_current_coordinate().await.unwrap();
        assert_eq!(got, here);
    }

    #[tokio::test]
    async fn missing_coordinate_is_denied() {
        let err = StaticCoordinate::default().request_current_coordinate().await.unwrap_err();
        assert!(matches!(err, LocationError::PermissionDenied));
    }
}
