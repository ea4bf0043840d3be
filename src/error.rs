//! Error types for filter declaration and application

use thiserror::Error;

/// Errors raised while declaring or applying a filter set.
///
/// All failures are synchronous and surface to whatever constructs or
/// applies the filter; nothing is retried internally.
#[derive(Debug, Error)]
pub enum FilterError {
	/// An operator suffix (the `__xxx` part of a field name) is not one of
	/// the supported operators.
	#[error("unknown filter operator '{0}'")]
	UnknownOperator(String),

	/// A field name, after stripping its operator suffix, does not resolve
	/// to a column on the target model schema.
	#[error("no column '{column}' on model '{model}'")]
	UnknownField {
		/// Name of the model schema the lookup ran against
		model: String,
		/// The column name that failed to resolve
		column: String,
	},

	/// A bounding box was supplied with the wrong number of coordinates.
	#[error("bounding box expects 4 coordinates (xmin,ymin,xmax,ymax), got {0}")]
	BoundingBoxShape(usize),

	/// A supplied value failed pre-validation (type coercion, coordinate
	/// range checks, or structural checks).
	#[error("invalid value for '{field}': {reason}")]
	Validation {
		/// The declared field the value was supplied for
		field: String,
		/// Human-readable reason the value was rejected
		reason: String,
	},
}

impl FilterError {
	pub(crate) fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
		Self::Validation {
			field: field.into(),
			reason: reason.into(),
		}
	}
}

/// Convenience alias used throughout the crate.
pub type FilterResult<T> = Result<T, FilterError>;
