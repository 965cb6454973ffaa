//! Axis-aligned bounding box in map coordinates.

use thiserror::Error;

/// Errors raised when constructing an [`Extent`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtentError {
    /// A coordinate was NaN or infinite
    #[error("extent coordinates must be finite")]
    NonFinite,

    /// Minimum exceeds maximum on an axis
    #[error("extent is inverted on the {axis} axis ({min} > {max})")]
    Inverted { axis: char, min: f64, max: f64 },
}

/// Bounding box `[min_x, min_y, max_x, max_y]`.
///
/// Units are whatever the host renderer's projection uses (degrees for
/// EPSG:4326, metres for web mercator).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl Extent {
    /// Creates a validated extent.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Result<Self, ExtentError> {
        if ![min_x, min_y, max_x, max_y].iter().all(|v| v.is_finite()) {
            return Err(ExtentError::NonFinite);
        }
        if min_x > max_x {
            return Err(ExtentError::Inverted {
                axis: 'x',
                min: min_x,
                max: max_x,
            });
        }
        if min_y > max_y {
            return Err(ExtentError::Inverted {
                axis: 'y',
                min: min_y,
                max: max_y,
            });
        }
        Ok(Self {
            min_x,
            min_y,
            max_x,
            max_y,
        })
    }

    /// The whole WGS84 globe.
    pub fn world() -> Self {
        Self {
            min_x: -180.0,
            min_y: -90.0,
            max_x: 180.0,
            max_y: 90.0,
        }
    }

    pub fn min_x(&self) -> f64 {
        self.min_x
    }

    pub fn min_y(&self) -> f64 {
        self.min_y
    }

    pub fn max_x(&self) -> f64 {
        self.max_x
    }

    pub fn max_y(&self) -> f64 {
        self.max_y
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Returns true if the point lies inside or on the boundary.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Returns true if the two extents overlap (touching counts).
    pub fn intersects(&self, other: &Extent) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }

    /// Smallest extent covering both.
    pub fn union(&self, other: &Extent) -> Extent {
        Extent {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Returns `[min_x, min_y, max_x, max_y]`.
    pub fn to_array(&self) -> [f64; 4] {
        [self.min_x, self.min_y, self.max_x, self.max_y]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_valid() {
        let extent = Extent::new(10.0, 40.0, 12.0, 42.5).unwrap();
        assert_eq!(extent.width(), 2.0);
        assert_eq!(extent.height(), 2.5);
        assert_eq!(extent.to_array(), [10.0, 40.0, 12.0, 42.5]);
    }

    #[test]
    fn test_inverted_rejected() {
        let err = Extent::new(5.0, 0.0, 1.0, 1.0).unwrap_err();
        assert_eq!(
            err,
            ExtentError::Inverted {
                axis: 'x',
                min: 5.0,
                max: 1.0
            }
        );
        assert_eq!(
            err.to_string(),
            "extent is inverted on the x axis (5 > 1)"
        );
    }

    #[test]
    fn test_non_finite_rejected() {
        assert_eq!(
            Extent::new(f64::NAN, 0.0, 1.0, 1.0),
            Err(ExtentError::NonFinite)
        );
        assert_eq!(
            Extent::new(0.0, 0.0, f64::INFINITY, 1.0),
            Err(ExtentError::NonFinite)
        );
    }

    #[test]
    fn test_degenerate_point_extent_allowed() {
        let extent = Extent::new(1.0, 1.0, 1.0, 1.0).unwrap();
        assert!(extent.contains_point(1.0, 1.0));
        assert_eq!(extent.width(), 0.0);
    }

    #[test]
    fn test_intersects_and_union() {
        let a = Extent::new(0.0, 0.0, 10.0, 10.0).unwrap();
        let b = Extent::new(10.0, 5.0, 20.0, 15.0).unwrap();
        let c = Extent::new(30.0, 30.0, 40.0, 40.0).unwrap();

        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert_eq!(a.union(&c).to_array(), [0.0, 0.0, 40.0, 40.0]);
    }

    #[test]
    fn test_world_contains_everything() {
        let world = Extent::world();
        assert!(world.contains_point(-180.0, 90.0));
        assert!(!world.contains_point(180.1, 0.0));
    }
}
