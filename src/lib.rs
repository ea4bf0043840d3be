//! Declarative query filters with geospatial bounding-box support
//!
//! Translates Django-style field/operator declarations (`count__lte`,
//! `id__in`, `name__isnull`, `location__bbox`, ...) into predicates appended
//! to a [`sea_query`] select statement. A filter set is declared once over a
//! model schema, resolved at registration time, then bound per request from
//! query parameters:
//!
//! ```
//! use std::collections::HashMap;
//! use filterset::{ColumnKind, FilterSetDef, ModelSchema};
//! use sea_query::{Alias, PostgresQueryBuilder, Query, QueryStatementWriter};
//!
//! let schema = ModelSchema::new("Place")
//!     .column("id", ColumnKind::Integer)
//!     .column("name", ColumnKind::Text)
//!     .column("location", ColumnKind::Geography { srid: 4326 });
//!
//! let def = FilterSetDef::builder(schema)
//!     .field("id__in")
//!     .field("location__bbox")
//!     .search("search", ["name"])
//!     .build()
//!     .unwrap();
//!
//! let params = HashMap::from([
//!     ("id__in".to_string(), "1,2,3".to_string()),
//!     ("search".to_string(), "tower".to_string()),
//! ]);
//! let filter = def.bind(&params).unwrap();
//!
//! let query = Query::select()
//!     .column(Alias::new("id"))
//!     .from(Alias::new("places"))
//!     .to_owned();
//! let sql = filter.apply(query).unwrap().to_string(PostgresQueryBuilder);
//!
//! assert!(sql.contains(r#""id" IN (1, 2, 3)"#));
//! assert!(sql.contains(r#""name" ILIKE '%tower%'"#));
//! ```
//!
//! Geography columns are cast to planar geometry before predicates apply,
//! since the geography representation lacks the containment operators the
//! `__bbox` filter needs. Bounding boxes are interpreted in EPSG:4326.

mod apply;

pub mod error;
pub mod filter;
pub mod geo;
pub mod ops;
pub mod schema;
pub mod value;

pub use error::{FilterError, FilterResult};
pub use filter::{Direction, Filter, FilterSetBuilder, FilterSetDef};
pub use geo::{BoundingBox, Envelope, WGS84_SRID};
pub use ops::FilterOperator;
pub use schema::{Column, ColumnKind, ModelSchema};
pub use value::{ElementType, FilterValue};
