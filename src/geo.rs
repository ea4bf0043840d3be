//! Bounding boxes and SRID-tagged envelope geometries
//!
//! Converts a four-element numeric box into the envelope construct used by
//! bounding-box containment predicates. Coordinates are interpreted in
//! EPSG:4326 (longitude/latitude), so `x` is longitude and `y` is latitude.

use geo_types::{Point, Rect, coord};
use sea_query::{Alias, Func, SimpleExpr};
use serde::{Deserialize, Serialize};

use crate::error::{FilterError, FilterResult};

/// EPSG code of the WGS 84 geodetic reference system.
pub const WGS84_SRID: u32 = 4326;

/// Axis-aligned rectangle defined by min/max coordinate pairs.
///
/// No reordering of the bounds is performed: callers must supply
/// `xmin <= xmax` and `ymin <= ymax`, otherwise the resulting envelope is
/// degenerate/empty.
///
/// # Examples
///
/// ```
/// use filterset::BoundingBox;
///
/// let bbox = BoundingBox::new(10.0, 20.0, 30.0, 40.0);
/// assert_eq!(bbox.xmin(), 10.0);
/// assert_eq!(bbox.ymax(), 40.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
	xmin: f64,
	ymin: f64,
	xmax: f64,
	ymax: f64,
}

impl BoundingBox {
	/// Creates a bounding box from its four bounds.
	pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
		Self {
			xmin,
			ymin,
			xmax,
			ymax,
		}
	}

	/// Creates a bounding box from a slice of coordinates.
	///
	/// Fails with [`FilterError::BoundingBoxShape`] unless exactly four
	/// values are supplied.
	pub fn from_slice(coords: &[f64]) -> FilterResult<Self> {
		match coords {
			[xmin, ymin, xmax, ymax] => Ok(Self::new(*xmin, *ymin, *xmax, *ymax)),
			other => Err(FilterError::BoundingBoxShape(other.len())),
		}
	}

	/// Creates a bounding box from a `geo_types` rectangle.
	pub fn from_rect(rect: Rect<f64>) -> Self {
		let min = rect.min();
		let max = rect.max();
		Self::new(min.x, min.y, max.x, max.y)
	}

	/// Converts the box into a `geo_types` rectangle.
	///
	/// Note that [`Rect`] normalizes its bounds, so a degenerate box comes
	/// back reordered.
	pub fn to_rect(self) -> Rect<f64> {
		Rect::new(
			coord! { x: self.xmin, y: self.ymin },
			coord! { x: self.xmax, y: self.ymax },
		)
	}

	/// Minimum x (longitude) bound.
	pub fn xmin(&self) -> f64 {
		self.xmin
	}

	/// Minimum y (latitude) bound.
	pub fn ymin(&self) -> f64 {
		self.ymin
	}

	/// Maximum x (longitude) bound.
	pub fn xmax(&self) -> f64 {
		self.xmax
	}

	/// Maximum y (latitude) bound.
	pub fn ymax(&self) -> f64 {
		self.ymax
	}

	/// Checks whether a point falls within the box (bounds inclusive).
	pub fn contains(&self, point: Point<f64>) -> bool {
		point.x() >= self.xmin
			&& point.x() <= self.xmax
			&& point.y() >= self.ymin
			&& point.y() <= self.ymax
	}

	/// Tags the box with the WGS 84 reference system, producing the envelope
	/// geometry used by containment predicates.
	pub fn envelope(&self) -> Envelope {
		Envelope {
			bbox: *self,
			srid: WGS84_SRID,
		}
	}
}

/// A rectangular envelope geometry tagged with a spatial reference system.
///
/// Rendered as `ST_MakeEnvelope(xmin, ymin, xmax, ymax, srid)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
	bbox: BoundingBox,
	srid: u32,
}

impl Envelope {
	/// The bounding box the envelope was built from.
	pub fn bbox(&self) -> BoundingBox {
		self.bbox
	}

	/// EPSG code of the envelope's reference system.
	pub fn srid(&self) -> u32 {
		self.srid
	}

	/// Emits the envelope as an `ST_MakeEnvelope` call.
	pub fn into_expr(self) -> SimpleExpr {
		let args: Vec<SimpleExpr> = vec![
			SimpleExpr::Value(self.bbox.xmin.into()),
			SimpleExpr::Value(self.bbox.ymin.into()),
			SimpleExpr::Value(self.bbox.xmax.into()),
			SimpleExpr::Value(self.bbox.ymax.into()),
			SimpleExpr::Value((self.srid as i32).into()),
		];
		Func::cust(Alias::new("ST_MakeEnvelope")).args(args).into()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use sea_query::{PostgresQueryBuilder, Query, QueryStatementWriter};

	fn render(expr: SimpleExpr) -> String {
		Query::select()
			.and_where(expr)
			.to_owned()
			.to_string(PostgresQueryBuilder)
	}

	#[test]
	fn test_envelope_srid_is_wgs84() {
		let envelope = BoundingBox::new(10.0, 20.0, 30.0, 40.0).envelope();
		assert_eq!(envelope.srid(), WGS84_SRID);
	}

	#[test]
	fn test_envelope_sql() {
		let envelope = BoundingBox::new(10.0, 20.0, 30.0, 40.0).envelope();
		let sql = render(envelope.into_expr());
		assert!(sql.contains("ST_MakeEnvelope(10, 20, 30, 40, 4326)"));
	}

	#[test]
	fn test_envelope_is_deterministic() {
		let a = BoundingBox::new(10.0, 20.0, 30.0, 40.0).envelope();
		let b = BoundingBox::new(10.0, 20.0, 30.0, 40.0).envelope();
		assert_eq!(a, b);
		assert_eq!(render(a.into_expr()), render(b.into_expr()));
	}

	#[test]
	fn test_degenerate_box_is_not_reordered() {
		// Caller supplied max before min; the box keeps the bounds as-is.
		let bbox = BoundingBox::new(30.0, 40.0, 10.0, 20.0);
		assert_eq!(bbox.xmin(), 30.0);
		assert_eq!(bbox.xmax(), 10.0);
		let sql = render(bbox.envelope().into_expr());
		assert!(sql.contains("ST_MakeEnvelope(30, 40, 10, 20, 4326)"));
	}

	#[test]
	fn test_from_slice_arity() {
		assert!(BoundingBox::from_slice(&[1.0, 2.0, 3.0, 4.0]).is_ok());

		let err = BoundingBox::from_slice(&[1.0, 2.0, 3.0]).unwrap_err();
		assert!(matches!(err, FilterError::BoundingBoxShape(3)));
	}

	#[test]
	fn test_contains() {
		let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0);

		assert!(bbox.contains(Point::new(5.0, 5.0)));
		assert!(bbox.contains(Point::new(0.0, 0.0)));
		assert!(bbox.contains(Point::new(10.0, 10.0)));

		assert!(!bbox.contains(Point::new(11.0, 5.0)));
		assert!(!bbox.contains(Point::new(5.0, -1.0)));
	}

	#[test]
	fn test_rect_round_trip() {
		let bbox = BoundingBox::new(1.0, 2.0, 3.0, 4.0);
		assert_eq!(BoundingBox::from_rect(bbox.to_rect()), bbox);
	}
}
