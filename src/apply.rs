//! Filter application engine
//!
//! Walks a bound filter's declared fields in order and appends the
//! corresponding predicates to a select statement. Each field's predicate is
//! ANDed in; the reserved search field combines its per-column substring
//! matches with OR. Nested filter values recurse into the same accumulating
//! query. The updated statement is always carried forward as the new
//! accumulator.

use sea_query::extension::postgres::PgExpr;
use sea_query::{Alias, Expr, SelectStatement, SimpleExpr};
use tracing::debug;

use crate::error::{FilterError, FilterResult};
use crate::filter::{FieldKind, Filter};
use crate::value::FilterValue;

/// Escape `%`, `_` and `\`, which carry meaning in LIKE patterns, so search
/// input matches literally.
fn escape_like_pattern(pattern: &str) -> String {
	pattern
		.replace('\\', "\\\\")
		.replace('%', "\\%")
		.replace('_', "\\_")
}

impl Filter {
	/// Applies every bound field as a predicate on `query`.
	///
	/// Unset fields are skipped. Failures (a value whose shape does not fit
	/// its operator) propagate synchronously; the query built so far is
	/// discarded with them.
	///
	/// # Examples
	///
	/// ```
	/// use std::collections::HashMap;
	/// use filterset::{ColumnKind, FilterSetDef, ModelSchema};
	/// use sea_query::{Alias, PostgresQueryBuilder, Query, QueryStatementWriter};
	///
	/// let schema = ModelSchema::new("Place").column("count", ColumnKind::Integer);
	/// let def = FilterSetDef::builder(schema).field("count__lte").build().unwrap();
	///
	/// let params = HashMap::from([("count__lte".to_string(), "10".to_string())]);
	/// let filter = def.bind(&params).unwrap();
	///
	/// let query = Query::select()
	///     .column(Alias::new("count"))
	///     .from(Alias::new("places"))
	///     .to_owned();
	/// let query = filter.apply(query).unwrap();
	///
	/// let sql = query.to_string(PostgresQueryBuilder);
	/// assert!(sql.contains(r#""count" <= 10"#));
	/// ```
	pub fn apply(&self, mut query: SelectStatement) -> FilterResult<SelectStatement> {
		for (field, value) in self.def.fields.iter().zip(&self.values) {
			let Some(value) = value else {
				continue;
			};
			match (&field.kind, value) {
				// Nested instances recurse into the same accumulator.
				(_, FilterValue::Nested(child)) => {
					debug!(field = field.param.as_str(), "applying nested filter");
					query = child.apply(query)?;
				}
				(FieldKind::Search { columns }, FilterValue::Str(term)) => {
					let pattern = format!("%{}%", escape_like_pattern(term));
					let matches: Vec<SimpleExpr> = columns
						.iter()
						.map(|column| Expr::col(Alias::new(column.name())).ilike(pattern.clone()))
						.collect();
					debug!(
						field = field.param.as_str(),
						columns = columns.len(),
						"applying search disjunction"
					);
					match matches.len() {
						0 => {}
						1 => {
							query.and_where(matches.into_iter().next().unwrap());
						}
						n => {
							// Joining the ILIKE expressions in one custom
							// fragment keeps the disjunction grouped as a
							// whole without parenthesizing each operand.
							let template = format!(
								"({})",
								(1..=n)
									.map(|i| format!("${i}"))
									.collect::<Vec<_>>()
									.join(" OR ")
							);
							query.and_where(Expr::cust_with_exprs(template, matches));
						}
					}
				}
				(FieldKind::Search { .. }, _) => {
					return Err(FilterError::validation(
						&field.param,
						"search expects a string value",
					));
				}
				// Ordering entries were validated at bind time; no predicate
				// is emitted for them.
				(FieldKind::Ordering, _) => {}
				(FieldKind::Nested { .. }, _) => {
					return Err(FilterError::validation(
						&field.param,
						"nested field expects a nested filter value",
					));
				}
				(FieldKind::Column { column, op, .. }, value) => {
					debug!(
						field = field.param.as_str(),
						op = op.suffix(),
						"applying predicate"
					);
					let predicate = op.predicate(&field.param, column.target_expr(), value)?;
					query.and_where(predicate);
				}
			}
		}
		Ok(query)
	}
}
