//! Model schema: an explicit column-name-to-kind registry
//!
//! Built once per model and consulted in O(1) when filter declarations are
//! registered, instead of walking a class hierarchy per request. Geography
//! columns are the one kind that changes predicate construction: they are
//! cast to planar geometry before operators are applied, because the
//! geography representation lacks some of them (containment in particular).

use std::collections::HashMap;

use sea_query::{Alias, IntoColumnRef, SimpleExpr};

use crate::error::{FilterError, FilterResult};

/// Declared type of a model column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
	/// Integer-valued column
	Integer,
	/// Floating-point column
	Float,
	/// Text column
	Text,
	/// Boolean column
	Boolean,
	/// Date/time column; filter values pass through as text
	DateTime,
	/// Planar geometry column in the given reference system
	Geometry {
		/// EPSG code of the column's reference system
		srid: u32,
	},
	/// Geodetic geography column in the given reference system
	Geography {
		/// EPSG code of the column's reference system
		srid: u32,
	},
}

/// Schema description of a filterable model: its name and the declared kind
/// of every column.
///
/// # Examples
///
/// ```
/// use filterset::{ColumnKind, ModelSchema};
///
/// let schema = ModelSchema::new("Place")
///     .column("id", ColumnKind::Integer)
///     .column("name", ColumnKind::Text)
///     .column("location", ColumnKind::Geography { srid: 4326 });
///
/// assert!(schema.kind_of("location").is_some());
/// assert!(schema.kind_of("missing").is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSchema {
	model: String,
	columns: HashMap<String, ColumnKind>,
}

impl ModelSchema {
	/// Creates an empty schema for the named model.
	pub fn new(model: impl Into<String>) -> Self {
		Self {
			model: model.into(),
			columns: HashMap::new(),
		}
	}

	/// Declares a column and its kind.
	pub fn column(mut self, name: impl Into<String>, kind: ColumnKind) -> Self {
		self.columns.insert(name.into(), kind);
		self
	}

	/// The model's name, used in resolution errors.
	pub fn model(&self) -> &str {
		&self.model
	}

	/// Looks up a column's declared kind.
	pub fn kind_of(&self, name: &str) -> Option<ColumnKind> {
		self.columns.get(name).copied()
	}

	/// Resolves a column into a typed handle, failing with
	/// [`FilterError::UnknownField`] if the schema has no such column.
	pub fn resolve(&self, name: &str) -> FilterResult<Column> {
		match self.kind_of(name) {
			Some(kind) => Ok(Column {
				name: name.to_string(),
				kind,
			}),
			None => Err(FilterError::UnknownField {
				model: self.model.clone(),
				column: name.to_string(),
			}),
		}
	}
}

/// A resolved, typed column handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
	name: String,
	kind: ColumnKind,
}

impl Column {
	/// The column's name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// The column's declared kind.
	pub fn kind(&self) -> ColumnKind {
		self.kind
	}

	/// The expression predicates are built against.
	///
	/// Geography columns are cast to geometry here; every other kind is the
	/// bare column reference.
	pub(crate) fn target_expr(&self) -> SimpleExpr {
		let col = SimpleExpr::Column(Alias::new(&self.name).into_column_ref());
		match self.kind {
			ColumnKind::Geography { .. } => col.cast_as(Alias::new("geometry")),
			_ => col,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use sea_query::{PostgresQueryBuilder, Query, QueryStatementWriter};

	fn schema() -> ModelSchema {
		ModelSchema::new("Place")
			.column("id", ColumnKind::Integer)
			.column("name", ColumnKind::Text)
			.column("area", ColumnKind::Geometry { srid: 4326 })
			.column("location", ColumnKind::Geography { srid: 4326 })
	}

	fn render(expr: SimpleExpr) -> String {
		Query::select()
			.and_where(expr)
			.to_owned()
			.to_string(PostgresQueryBuilder)
	}

	#[test]
	fn test_resolve_known_column() {
		let column = schema().resolve("id").unwrap();
		assert_eq!(column.name(), "id");
		assert_eq!(column.kind(), ColumnKind::Integer);
	}

	#[test]
	fn test_resolve_unknown_column() {
		let err = schema().resolve("missing").unwrap_err();
		assert!(matches!(
			err,
			FilterError::UnknownField { model, column } if model == "Place" && column == "missing"
		));
	}

	#[test]
	fn test_geography_target_is_cast_to_geometry() {
		let column = schema().resolve("location").unwrap();
		let sql = render(column.target_expr());
		assert!(sql.contains(r#"CAST("location" AS geometry)"#));
	}

	#[test]
	fn test_geometry_target_is_not_cast() {
		let column = schema().resolve("area").unwrap();
		let sql = render(column.target_expr());
		assert!(sql.contains(r#""area""#));
		assert!(!sql.contains("CAST"));
	}
}
