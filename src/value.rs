//! Filter values and pre-validation
//!
//! User-supplied values arrive as query-string text. Before a filter
//! instance is considered valid, each value is coerced to its field's
//! declared element type; fields backed by the `in`/`not_in`/`bbox`
//! operators and the ordering field additionally split a single
//! comma-separated string into a sequence.

use sea_query::Value;
use serde::{Deserialize, Serialize};

use crate::error::{FilterError, FilterResult};
use crate::filter::Filter;
use crate::geo::BoundingBox;
use crate::ops::FilterOperator;
use crate::schema::ColumnKind;

/// A value bound to a declared filter field.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
	/// Integer scalar
	Int(i64),
	/// Floating-point scalar
	Float(f64),
	/// Text scalar
	Str(String),
	/// Boolean scalar
	Bool(bool),
	/// Sequence produced by comma-splitting (or supplied directly)
	List(Vec<FilterValue>),
	/// A four-bound box for `__bbox` fields
	Bbox(BoundingBox),
	/// A nested filter instance whose own predicates are applied recursively
	Nested(Box<Filter>),
}

impl FilterValue {
	/// Converts a scalar into the query builder's value type.
	///
	/// Returns `None` for sequences, boxes, and nested filters.
	pub fn to_value(&self) -> Option<Value> {
		match self {
			Self::Int(i) => Some((*i).into()),
			Self::Float(f) => Some((*f).into()),
			Self::Str(s) => Some(s.clone().into()),
			Self::Bool(b) => Some((*b).into()),
			Self::List(_) | Self::Bbox(_) | Self::Nested(_) => None,
		}
	}
}

/// Declared element type of a filter field, used to coerce query-string
/// input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
	/// 64-bit integer
	Int,
	/// 64-bit float
	Float,
	/// Text, passed through unchanged
	Str,
	/// `true` / `false` (case-insensitive)
	Bool,
}

impl ElementType {
	/// Picks the element type for a declared field from its column kind and
	/// operator. The operator wins where it dictates the value's shape:
	/// `isnull` takes a boolean and the substring matches take text, whatever
	/// the column holds; `bbox` is numeric bounds.
	pub(crate) fn resolve(op: FilterOperator, kind: &ColumnKind) -> Self {
		match op {
			FilterOperator::IsNull => Self::Bool,
			FilterOperator::Like | FilterOperator::Ilike => Self::Str,
			FilterOperator::Bbox => Self::Float,
			_ => match kind {
				ColumnKind::Integer => Self::Int,
				ColumnKind::Float => Self::Float,
				ColumnKind::Boolean => Self::Bool,
				ColumnKind::Text
				| ColumnKind::DateTime
				| ColumnKind::Geometry { .. }
				| ColumnKind::Geography { .. } => Self::Str,
			},
		}
	}

	/// Coerces a single raw string to this element type.
	pub fn coerce(&self, field: &str, raw: &str) -> FilterResult<FilterValue> {
		match self {
			Self::Int => raw
				.trim()
				.parse::<i64>()
				.map(FilterValue::Int)
				.map_err(|_| FilterError::validation(field, format!("'{raw}' is not an integer"))),
			Self::Float => raw
				.trim()
				.parse::<f64>()
				.map(FilterValue::Float)
				.map_err(|_| FilterError::validation(field, format!("'{raw}' is not a number"))),
			Self::Str => Ok(FilterValue::Str(raw.to_string())),
			Self::Bool => match raw.trim().to_ascii_lowercase().as_str() {
				"true" => Ok(FilterValue::Bool(true)),
				"false" => Ok(FilterValue::Bool(false)),
				_ => Err(FilterError::validation(
					field,
					format!("'{raw}' is not a boolean"),
				)),
			},
		}
	}
}

/// Splits a comma-separated string and coerces each piece to the declared
/// element type.
pub(crate) fn split_str(field: &str, element: ElementType, raw: &str) -> FilterResult<Vec<FilterValue>> {
	raw.split(',')
		.map(|piece| element.coerce(field, piece))
		.collect()
}

/// Pre-validates a `__bbox` value: four comma-separated floats within
/// longitude/latitude range.
pub(crate) fn parse_bbox(field: &str, raw: &str) -> FilterResult<BoundingBox> {
	let pieces = split_str(field, ElementType::Float, raw)?;
	let coords: Vec<f64> = pieces
		.iter()
		.map(|piece| match piece {
			FilterValue::Float(f) => *f,
			_ => unreachable!("coerced as float"),
		})
		.collect();
	let bbox = BoundingBox::from_slice(&coords)?;

	for lon in [bbox.xmin(), bbox.xmax()] {
		if !(-180.0..=180.0).contains(&lon) {
			return Err(FilterError::validation(
				field,
				format!("longitude {lon} outside [-180, 180]"),
			));
		}
	}
	for lat in [bbox.ymin(), bbox.ymax()] {
		if !(-90.0..=90.0).contains(&lat) {
			return Err(FilterError::validation(
				field,
				format!("latitude {lat} outside [-90, 90]"),
			));
		}
	}
	Ok(bbox)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[test]
	fn test_split_str_counts_commas() {
		let values = split_str("id__in", ElementType::Int, "1,2,3").unwrap();
		assert_eq!(
			values,
			vec![FilterValue::Int(1), FilterValue::Int(2), FilterValue::Int(3)]
		);

		let values = split_str("name__in", ElementType::Str, "a,b").unwrap();
		assert_eq!(values.len(), 2);
	}

	#[test]
	fn test_split_str_single_value() {
		let values = split_str("id__in", ElementType::Int, "7").unwrap();
		assert_eq!(values, vec![FilterValue::Int(7)]);
	}

	#[rstest]
	#[case(ElementType::Int, "abc")]
	#[case(ElementType::Float, "1.2.3")]
	#[case(ElementType::Bool, "yes")]
	fn test_coercion_failure(#[case] element: ElementType, #[case] raw: &str) {
		let err = element.coerce("field", raw).unwrap_err();
		assert!(matches!(err, FilterError::Validation { .. }));
	}

	#[test]
	fn test_bool_coercion() {
		assert_eq!(
			ElementType::Bool.coerce("f", "True").unwrap(),
			FilterValue::Bool(true)
		);
		assert_eq!(
			ElementType::Bool.coerce("f", "false").unwrap(),
			FilterValue::Bool(false)
		);
	}

	#[test]
	fn test_parse_bbox() {
		let bbox = parse_bbox("location__bbox", "10,20,30,40").unwrap();
		assert_eq!(bbox, BoundingBox::new(10.0, 20.0, 30.0, 40.0));
	}

	#[test]
	fn test_parse_bbox_wrong_arity() {
		let err = parse_bbox("location__bbox", "10,20,30").unwrap_err();
		assert!(matches!(err, FilterError::BoundingBoxShape(3)));

		let err = parse_bbox("location__bbox", "1,2,3,4,5").unwrap_err();
		assert!(matches!(err, FilterError::BoundingBoxShape(5)));
	}

	#[rstest]
	#[case("200,0,10,10")]
	#[case("0,-95,10,10")]
	#[case("0,0,181,10")]
	#[case("0,0,10,91")]
	fn test_parse_bbox_out_of_range(#[case] raw: &str) {
		let err = parse_bbox("location__bbox", raw).unwrap_err();
		assert!(matches!(err, FilterError::Validation { .. }));
	}

	#[test]
	fn test_scalar_conversion() {
		assert!(FilterValue::Int(1).to_value().is_some());
		assert!(FilterValue::List(vec![]).to_value().is_none());
	}
}
