//! Filter set declarations and per-request instances
//!
//! A [`FilterSetDef`] is declared once per concrete filter type: each field
//! name encodes `(column, operator)` through its `__` suffix and is resolved
//! into a typed column handle at registration time. A [`Filter`] is the
//! per-request instance, bound from query parameters through the
//! pre-validation step and immutable afterwards.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{FilterError, FilterResult};
use crate::ops::FilterOperator;
use crate::schema::{Column, ModelSchema};
use crate::value::{self, ElementType, FilterValue};

/// Sort direction for ordering field entries.
///
/// A leading `-` on an ordering entry means descending, mirroring the
/// Django-style convention the field names use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
	/// Ascending
	Asc,
	/// Descending
	Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum FieldKind {
	/// A column predicate field, fully resolved at registration time
	Column {
		column: Column,
		op: FilterOperator,
		element: ElementType,
	},
	/// The reserved free-text search field
	Search { columns: Vec<Column> },
	/// The reserved ordering field; split and validated, never a predicate
	Ordering,
	/// A nested filter whose own fields recurse into the same query
	Nested { def: Arc<FilterSetDef> },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FieldDef {
	pub(crate) param: String,
	pub(crate) kind: FieldKind,
}

/// A declared, registration-time-resolved filter type.
///
/// # Examples
///
/// ```
/// use filterset::{ColumnKind, FilterSetDef, ModelSchema};
///
/// let schema = ModelSchema::new("Place")
///     .column("id", ColumnKind::Integer)
///     .column("name", ColumnKind::Text);
///
/// let def = FilterSetDef::builder(schema)
///     .field("id__in")
///     .field("name__isnull")
///     .search("search", ["name"])
///     .build()
///     .unwrap();
///
/// assert_eq!(def.schema().model(), "Place");
/// ```
#[derive(Debug, PartialEq)]
pub struct FilterSetDef {
	schema: ModelSchema,
	pub(crate) fields: Vec<FieldDef>,
}

impl FilterSetDef {
	/// Starts declaring a filter set over the given model schema.
	pub fn builder(schema: ModelSchema) -> FilterSetBuilder {
		FilterSetBuilder {
			schema,
			decls: Vec::new(),
		}
	}

	/// The model schema the filter set targets.
	pub fn schema(&self) -> &ModelSchema {
		&self.schema
	}

	/// Declared field names, in declaration order.
	pub fn params(&self) -> impl Iterator<Item = &str> {
		self.fields.iter().map(|f| f.param.as_str())
	}

	/// Binds query parameters into a filter instance, running the
	/// pre-validation/splitting step on every supplied value.
	///
	/// Parameters that do not match a declared field are ignored; declared
	/// fields without a supplied value stay unset.
	pub fn bind(self: &Arc<Self>, params: &HashMap<String, String>) -> FilterResult<Filter> {
		let mut filter = self.empty();
		for (idx, field) in self.fields.iter().enumerate() {
			let Some(raw) = params.get(&field.param) else {
				continue;
			};
			filter.values[idx] = Some(bind_value(&self.schema, field, raw)?);
		}
		Ok(filter)
	}

	/// Creates an instance with every field unset, for programmatic
	/// construction via [`Filter::set`].
	pub fn empty(self: &Arc<Self>) -> Filter {
		Filter {
			def: Arc::clone(self),
			values: vec![None; self.fields.len()],
		}
	}
}

fn bind_value(schema: &ModelSchema, field: &FieldDef, raw: &str) -> FilterResult<FilterValue> {
	match &field.kind {
		FieldKind::Column { op, element, .. } => match op {
			FilterOperator::Bbox => Ok(FilterValue::Bbox(value::parse_bbox(&field.param, raw)?)),
			FilterOperator::In | FilterOperator::NotIn => Ok(FilterValue::List(
				value::split_str(&field.param, *element, raw)?,
			)),
			_ => element.coerce(&field.param, raw),
		},
		FieldKind::Search { .. } => Ok(FilterValue::Str(raw.to_string())),
		FieldKind::Ordering => {
			let entries = value::split_str(&field.param, ElementType::Str, raw)?;
			for entry in &entries {
				let FilterValue::Str(name) = entry else {
					unreachable!("coerced as string");
				};
				let bare = name.strip_prefix('-').unwrap_or(name);
				schema.resolve(bare)?;
			}
			Ok(FilterValue::List(entries))
		}
		FieldKind::Nested { .. } => Err(FilterError::validation(
			&field.param,
			"nested filters are attached with Filter::with_nested, not bound from parameters",
		)),
	}
}

/// Builder for [`FilterSetDef`]; resolution happens in [`build`](Self::build).
pub struct FilterSetBuilder {
	schema: ModelSchema,
	decls: Vec<(String, Decl)>,
}

enum Decl {
	Field,
	Search(Vec<String>),
	Ordering,
	Nested(Arc<FilterSetDef>),
}

impl FilterSetBuilder {
	/// Declares a predicate field. The name may carry a `__operator` suffix;
	/// without one the predicate is equality.
	pub fn field(mut self, name: impl Into<String>) -> Self {
		self.decls.push((name.into(), Decl::Field));
		self
	}

	/// Declares the reserved free-text search field and the model columns it
	/// matches against.
	pub fn search<I, S>(mut self, param: impl Into<String>, columns: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let columns = columns.into_iter().map(Into::into).collect();
		self.decls.push((param.into(), Decl::Search(columns)));
		self
	}

	/// Declares the reserved ordering field. Its comma-separated entries are
	/// validated against the schema; no ORDER BY clause is emitted by this
	/// crate.
	pub fn ordering(mut self, param: impl Into<String>) -> Self {
		self.decls.push((param.into(), Decl::Ordering));
		self
	}

	/// Declares a nested filter field holding another filter set's instance.
	pub fn nested(mut self, param: impl Into<String>, def: Arc<FilterSetDef>) -> Self {
		self.decls.push((param.into(), Decl::Nested(def)));
		self
	}

	/// Resolves every declaration against the schema.
	///
	/// Fails with [`FilterError::UnknownOperator`] for an unrecognized
	/// suffix and [`FilterError::UnknownField`] when a stripped field name
	/// is not a column of the model.
	pub fn build(self) -> FilterResult<Arc<FilterSetDef>> {
		let mut fields = Vec::with_capacity(self.decls.len());
		for (param, decl) in self.decls {
			let kind = match decl {
				Decl::Field => {
					let (name, op) = match param.split_once("__") {
						Some((name, suffix)) => (name, FilterOperator::parse(suffix)?),
						None => (param.as_str(), FilterOperator::Eq),
					};
					let column = self.schema.resolve(name)?;
					let element = ElementType::resolve(op, &column.kind());
					FieldKind::Column {
						column,
						op,
						element,
					}
				}
				Decl::Search(columns) => {
					let columns = columns
						.iter()
						.map(|name| self.schema.resolve(name))
						.collect::<FilterResult<Vec<_>>>()?;
					FieldKind::Search { columns }
				}
				Decl::Ordering => FieldKind::Ordering,
				Decl::Nested(def) => FieldKind::Nested { def },
			};
			fields.push(FieldDef { param, kind });
		}
		Ok(Arc::new(FilterSetDef {
			schema: self.schema,
			fields,
		}))
	}
}

/// A bound filter instance: the declaration plus one optional value per
/// declared field, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
	pub(crate) def: Arc<FilterSetDef>,
	pub(crate) values: Vec<Option<FilterValue>>,
}

impl Filter {
	/// Sets a declared field's value during construction, consuming and
	/// returning the instance.
	///
	/// Nested fields accept only nested filter values, and nested values
	/// attach only to nested fields.
	pub fn set(mut self, param: &str, value: FilterValue) -> FilterResult<Self> {
		let idx = self
			.def
			.fields
			.iter()
			.position(|f| f.param == param)
			.ok_or_else(|| FilterError::UnknownField {
				model: self.def.schema.model().to_string(),
				column: param.to_string(),
			})?;
		let nested_field = matches!(self.def.fields[idx].kind, FieldKind::Nested { .. });
		let nested_value = matches!(value, FilterValue::Nested(_));
		if nested_field != nested_value {
			return Err(FilterError::validation(
				param,
				if nested_field {
					"nested field expects a nested filter value"
				} else {
					"nested filter value on a non-nested field"
				},
			));
		}
		self.values[idx] = Some(value);
		Ok(self)
	}

	/// Attaches a nested filter instance to a declared nested field.
	pub fn with_nested(self, param: &str, child: Filter) -> FilterResult<Self> {
		self.set(param, FilterValue::Nested(Box::new(child)))
	}

	/// The value bound to a declared field, if any.
	pub fn value(&self, param: &str) -> Option<&FilterValue> {
		self.def
			.fields
			.iter()
			.zip(&self.values)
			.find(|(f, _)| f.param == param)
			.and_then(|(_, v)| v.as_ref())
	}

	/// Whether no field has a value bound.
	pub fn is_empty(&self) -> bool {
		self.values.iter().all(Option::is_none)
	}

	/// Parses the bound ordering entries into `(column, direction)` pairs.
	///
	/// Empty when no ordering field is declared or no value was supplied.
	pub fn ordering(&self) -> Vec<(String, Direction)> {
		let entries = self
			.def
			.fields
			.iter()
			.zip(&self.values)
			.find(|(f, _)| matches!(f.kind, FieldKind::Ordering))
			.and_then(|(_, v)| v.as_ref());
		let Some(FilterValue::List(entries)) = entries else {
			return Vec::new();
		};
		entries
			.iter()
			.filter_map(|entry| match entry {
				FilterValue::Str(name) => Some(match name.strip_prefix('-') {
					Some(bare) => (bare.to_string(), Direction::Desc),
					None => (name.clone(), Direction::Asc),
				}),
				_ => None,
			})
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::geo::BoundingBox;
	use crate::schema::ColumnKind;
	use rstest::rstest;

	fn schema() -> ModelSchema {
		ModelSchema::new("Place")
			.column("id", ColumnKind::Integer)
			.column("name", ColumnKind::Text)
			.column("count", ColumnKind::Integer)
			.column("location", ColumnKind::Geography { srid: 4326 })
	}

	fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
		pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect()
	}

	#[test]
	fn test_build_resolves_suffixes() {
		let def = FilterSetDef::builder(schema())
			.field("id")
			.field("count__lte")
			.field("id__in")
			.field("location__bbox")
			.build()
			.unwrap();
		assert_eq!(def.params().collect::<Vec<_>>(), vec![
			"id",
			"count__lte",
			"id__in",
			"location__bbox"
		]);
	}

	#[test]
	fn test_build_unknown_suffix() {
		let err = FilterSetDef::builder(schema())
			.field("id__bogus")
			.build()
			.unwrap_err();
		assert!(matches!(err, FilterError::UnknownOperator(s) if s == "bogus"));
	}

	#[test]
	fn test_build_unknown_column() {
		let err = FilterSetDef::builder(schema())
			.field("missing__gt")
			.build()
			.unwrap_err();
		assert!(matches!(err, FilterError::UnknownField { column, .. } if column == "missing"));
	}

	#[test]
	fn test_bind_splits_in_values() {
		let def = FilterSetDef::builder(schema()).field("id__in").build().unwrap();
		let filter = def.bind(&params(&[("id__in", "1,2,3")])).unwrap();
		assert_eq!(
			filter.value("id__in"),
			Some(&FilterValue::List(vec![
				FilterValue::Int(1),
				FilterValue::Int(2),
				FilterValue::Int(3)
			]))
		);
	}

	#[test]
	fn test_bind_bbox() {
		let def = FilterSetDef::builder(schema())
			.field("location__bbox")
			.build()
			.unwrap();
		let filter = def
			.bind(&params(&[("location__bbox", "10,20,30,40")]))
			.unwrap();
		assert_eq!(
			filter.value("location__bbox"),
			Some(&FilterValue::Bbox(BoundingBox::new(10.0, 20.0, 30.0, 40.0)))
		);
	}

	#[test]
	fn test_bind_ignores_undeclared_params() {
		let def = FilterSetDef::builder(schema()).field("id").build().unwrap();
		let filter = def.bind(&params(&[("other", "1")])).unwrap();
		assert!(filter.is_empty());
	}

	#[rstest]
	#[case("count__lte", "abc")]
	#[case("id__in", "1,x,3")]
	fn test_bind_coercion_failure(#[case] param: &str, #[case] raw: &str) {
		let def = FilterSetDef::builder(schema())
			.field("count__lte")
			.field("id__in")
			.build()
			.unwrap();
		let err = def.bind(&params(&[(param, raw)])).unwrap_err();
		assert!(matches!(err, FilterError::Validation { .. }));
	}

	#[test]
	fn test_ordering_split_and_direction() {
		let def = FilterSetDef::builder(schema())
			.ordering("order_by")
			.build()
			.unwrap();
		let filter = def.bind(&params(&[("order_by", "name,-count")])).unwrap();
		assert_eq!(filter.ordering(), vec![
			("name".to_string(), Direction::Asc),
			("count".to_string(), Direction::Desc)
		]);
	}

	#[test]
	fn test_ordering_rejects_unknown_column() {
		let def = FilterSetDef::builder(schema())
			.ordering("order_by")
			.build()
			.unwrap();
		let err = def.bind(&params(&[("order_by", "-missing")])).unwrap_err();
		assert!(matches!(err, FilterError::UnknownField { .. }));
	}

	#[test]
	fn test_nested_attachment() {
		let child_def = FilterSetDef::builder(schema()).field("name").build().unwrap();
		let def = FilterSetDef::builder(schema())
			.field("id")
			.nested("place", Arc::clone(&child_def))
			.build()
			.unwrap();

		let child = child_def
			.empty()
			.set("name", FilterValue::Str("x".into()))
			.unwrap();
		let filter = def.empty().with_nested("place", child).unwrap();
		assert!(matches!(filter.value("place"), Some(FilterValue::Nested(_))));

		// A nested value cannot land on a plain column field.
		let child = child_def.empty();
		let err = def.empty().with_nested("id", child).unwrap_err();
		assert!(matches!(err, FilterError::Validation { .. }));
	}
}
