//! Geometric helpers for segment ordering.
//!
//! PAGE-XML stores every segment outline as a `points` string of the form
//! `"x1,y1 x2,y2 ..."` in image pixel coordinates (origin top-left, y
//! growing downwards). This module parses such strings into
//! [`geo::Polygon`]s; centroids come from [`geo::Centroid`].

use crate::error::{Error, Result};
use geo::{Centroid, Coord, LineString};

pub use geo::{Point, Polygon};

/// Sort axis for reordering children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Left to right, keyed on centroid x
    Horizontal,
    /// Top to bottom, keyed on centroid y
    Vertical,
}

impl Axis {
    /// Coordinate of `point` along this axis.
    pub fn coordinate(self, point: Point<f64>) -> f64 {
        match self {
            Axis::Horizontal => point.x(),
            Axis::Vertical => point.y(),
        }
    }
}

/// Parse a PAGE-XML `points` attribute into a polygon.
///
/// The ring needs at least three vertices besides an explicit closing
/// one, and every coordinate must be finite.
///
/// # Examples
///
/// ```
/// use page_order_repair::geometry::parse_points;
///
/// let polygon = parse_points("0,0 10,0 10,10 0,10").unwrap();
/// assert_eq!(polygon.exterior().0.len(), 5);
/// assert!(parse_points("0,0 10").is_err());
/// ```
pub fn parse_points(points: &str) -> Result<Polygon<f64>> {
    let coords = points
        .split_whitespace()
        .map(parse_coord)
        .collect::<Result<Vec<_>>>()?;

    let closed = coords.len() > 1 && coords.first() == coords.last();
    let distinct = if closed { coords.len() - 1 } else { coords.len() };
    if distinct < 3 {
        return Err(Error::InvalidPolygon(format!(
            "need at least 3 distinct vertices, got {}",
            distinct
        )));
    }
    if coords.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
        return Err(Error::InvalidPolygon("non-finite coordinate".to_string()));
    }
    Ok(Polygon::new(LineString::from(coords), vec![]))
}

/// Centroid of the area enclosed by `polygon`.
///
/// Zero-area outlines fall back to the centroid of the outline itself.
///
/// # Examples
///
/// ```
/// use page_order_repair::geometry::{centroid, parse_points};
///
/// let c = centroid(&parse_points("0,0 100,0 100,50 0,50").unwrap()).unwrap();
/// assert_eq!((c.x(), c.y()), (50.0, 25.0));
/// ```
pub fn centroid(polygon: &Polygon<f64>) -> Result<Point<f64>> {
    polygon
        .centroid()
        .ok_or_else(|| Error::InvalidPolygon("polygon has no centroid".to_string()))
}

fn parse_coord(pair: &str) -> Result<Coord<f64>> {
    let (x, y) = pair
        .split_once(',')
        .ok_or_else(|| Error::InvalidPolygon(format!("malformed point '{}'", pair)))?;
    let x = x
        .trim()
        .parse::<f64>()
        .map_err(|_| Error::InvalidPolygon(format!("malformed x coordinate in '{}'", pair)))?;
    let y = y
        .trim()
        .parse::<f64>()
        .map_err(|_| Error::InvalidPolygon(format!("malformed y coordinate in '{}'", pair)))?;
    Ok(Coord { x, y })
}
