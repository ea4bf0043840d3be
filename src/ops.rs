//! Filter operators and their predicate transforms
//!
//! Field names encode the comparison to apply through a Django-style
//! `__`-delimited suffix (`count__lte`, `id__in`, `location__bbox`, ...).
//! Each operator is a closed enum variant carrying its own value transform,
//! so coverage is checked exhaustively instead of through a lookup table.

use sea_query::extension::postgres::PgExpr;
use sea_query::{Alias, Expr, Func, SimpleExpr, Value};

use crate::error::{FilterError, FilterResult};
use crate::value::FilterValue;

/// The comparisons a declared filter field can apply.
///
/// `Bbox` is the only geometry-aware operator: it ignores the raw value's
/// shape beyond its four bounds and always pairs a containment predicate
/// with an SRID-4326 envelope.
///
/// # Examples
///
/// ```
/// use filterset::FilterOperator;
///
/// assert_eq!(FilterOperator::parse("not_in").unwrap(), FilterOperator::NotIn);
/// assert!(FilterOperator::parse("bogus").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
	/// Equality (the default when no suffix is present)
	Eq,
	/// `!=`
	Neq,
	/// `>`
	Gt,
	/// `>=`
	Gte,
	/// `<`
	Lt,
	/// `<=`
	Lte,
	/// Membership in a comma-separated list
	In,
	/// Exclusion from a comma-separated list
	NotIn,
	/// `IS NULL` / `IS NOT NULL`, folded from the supplied boolean
	IsNull,
	/// Substring match; the value is wrapped in `%...%`
	Like,
	/// Case-insensitive substring match; the value is wrapped in `%...%`
	Ilike,
	/// `IS NOT`
	Not,
	/// Containment within a bounding-box envelope (EPSG:4326)
	Bbox,
}

impl FilterOperator {
	/// Resolves an operator suffix to its variant.
	///
	/// Fails with [`FilterError::UnknownOperator`] for anything not in the
	/// supported set.
	pub fn parse(suffix: &str) -> FilterResult<Self> {
		match suffix {
			"neq" => Ok(Self::Neq),
			"gt" => Ok(Self::Gt),
			"gte" => Ok(Self::Gte),
			"lt" => Ok(Self::Lt),
			"lte" => Ok(Self::Lte),
			"in" => Ok(Self::In),
			"not_in" => Ok(Self::NotIn),
			"isnull" => Ok(Self::IsNull),
			"like" => Ok(Self::Like),
			"ilike" => Ok(Self::Ilike),
			"not" => Ok(Self::Not),
			"bbox" => Ok(Self::Bbox),
			other => Err(FilterError::UnknownOperator(other.to_string())),
		}
	}

	/// The suffix this operator is declared with.
	pub fn suffix(&self) -> &'static str {
		match self {
			Self::Eq => "",
			Self::Neq => "neq",
			Self::Gt => "gt",
			Self::Gte => "gte",
			Self::Lt => "lt",
			Self::Lte => "lte",
			Self::In => "in",
			Self::NotIn => "not_in",
			Self::IsNull => "isnull",
			Self::Like => "like",
			Self::Ilike => "ilike",
			Self::Not => "not",
			Self::Bbox => "bbox",
		}
	}

	/// Builds the predicate for `target <op> value`.
	///
	/// `target` is the (possibly geometry-cast) column expression. The value
	/// transform of each operator is applied here: `%`-wrapping for the
	/// substring matches, boolean folding for `isnull`, envelope construction
	/// for `bbox`.
	pub fn predicate(
		&self,
		field: &str,
		target: SimpleExpr,
		value: &FilterValue,
	) -> FilterResult<SimpleExpr> {
		let expr = Expr::expr(target.clone());
		match self {
			Self::Eq => Ok(expr.eq(scalar(field, value)?)),
			Self::Neq => Ok(expr.ne(scalar(field, value)?)),
			Self::Gt => Ok(expr.gt(scalar(field, value)?)),
			Self::Gte => Ok(expr.gte(scalar(field, value)?)),
			Self::Lt => Ok(expr.lt(scalar(field, value)?)),
			Self::Lte => Ok(expr.lte(scalar(field, value)?)),
			Self::In => Ok(expr.is_in(list(field, value)?)),
			Self::NotIn => Ok(expr.is_not_in(list(field, value)?)),
			Self::IsNull => match value {
				FilterValue::Bool(true) => Ok(expr.is_null()),
				FilterValue::Bool(false) => Ok(expr.is_not_null()),
				_ => Err(FilterError::validation(field, "isnull expects a boolean")),
			},
			Self::Like => Ok(expr.like(pattern(field, value)?)),
			Self::Ilike => Ok(expr.ilike(pattern(field, value)?)),
			Self::Not => Ok(expr.is_not(scalar(field, value)?)),
			Self::Bbox => match value {
				FilterValue::Bbox(bbox) => {
					let args: Vec<SimpleExpr> = vec![bbox.envelope().into_expr(), target];
					Ok(Func::cust(Alias::new("ST_Contains")).args(args).into())
				}
				_ => Err(FilterError::validation(field, "bbox expects 4 coordinates")),
			},
		}
	}
}

fn scalar(field: &str, value: &FilterValue) -> FilterResult<Value> {
	value
		.to_value()
		.ok_or_else(|| FilterError::validation(field, "expected a scalar value"))
}

fn list(field: &str, value: &FilterValue) -> FilterResult<Vec<Value>> {
	match value {
		FilterValue::List(items) => items
			.iter()
			.map(|item| scalar(field, item))
			.collect(),
		// A single scalar is treated as a one-element list.
		other => Ok(vec![scalar(field, other)?]),
	}
}

fn pattern(field: &str, value: &FilterValue) -> FilterResult<String> {
	match value {
		FilterValue::Str(s) => Ok(format!("%{}%", s)),
		_ => Err(FilterError::validation(field, "substring match expects a string")),
	}
}
