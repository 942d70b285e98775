//! # shapecheck
//!
//! Runtime structural validation for dynamic values.
//!
//! Schemas are plain [`Value`] fragments: strings written in a small
//! descriptor language (`"Number"`, `"Maybe String"`, `"[Number | String]"`),
//! marker objects for value-set and pending checks, and nested mappings for
//! structs. [`define_type`] compiles a fragment once; [`validate`] then walks
//! any number of elements against it, naming the struct each mismatch
//! occurred in.
//!
//! Validation never mutates the element and never throws on mismatches:
//! violations either accumulate into a [`Report`] or, under the `fatal`
//! option, abort the walk with the first one.
//!
//! ## Example
//!
//! ```rust
//! use shapecheck::{Options, Value, define_type, t, validate};
//!
//! let schema = define_type(
//!     "User",
//!     Value::object([
//!         ("name", t::STRING.into()),
//!         ("age", t::maybe(t::NUMBER).into()),
//!         ("role", t::equal(["admin", "guest"])),
//!     ]),
//! )?;
//!
//! let element = Value::object([
//!     ("name", "Ada".into()),
//!     ("age", Value::Null),
//!     ("role", "guest".into()),
//! ]);
//!
//! let report = validate(&schema).report(&element, Options::default());
//! assert!(report.is_empty());
//! # Ok::<(), shapecheck::SchemaError>(())
//! ```

pub mod descriptor;
pub mod error;
pub mod schema;
pub mod validator;
pub mod value;
pub mod vocabulary;

/// Short alias for the schema vocabulary, mirroring how schemas are
/// typically written: `t::STRING`, `t::maybe(..)`, `t::equal(..)`.
pub use self::vocabulary as t;

pub use descriptor::{Descriptor, Primitive};
pub use error::{Report, SchemaError, SchemaResult, ValidationResult, Violation, ViolationKind};
pub use schema::{
    MARKER_PREFIX, Marker, SchemaNode, StructSchema, TYPE_NAME_KEY, TypeSchema, define_type,
};
pub use validator::{
    ListValidator, Options, TupleValidator, Validator, validate, validate_list, validate_tuple,
};
pub use value::Value;
