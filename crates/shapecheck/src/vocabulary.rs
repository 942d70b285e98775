//! Schema vocabulary: the tokens and combinators schemas are written with.
//!
//! Everything here is pure data construction. Combinators build descriptor
//! strings by concatenation and marker/struct mappings as plain [`Value`]s;
//! nothing is checked until the fragment is compiled by
//! [`define_type`](crate::define_type), so a misspelled hand-written token
//! surfaces there, not here.
//!
//! The module is re-exported as `t`, which keeps schema declarations short:
//!
//! ```
//! use shapecheck::{t, Value};
//!
//! let fragment = Value::object([
//!     ("name", t::STRING.into()),
//!     ("age", t::maybe(t::NUMBER).into()),
//!     ("tags", t::array_of([t::STRING]).into()),
//!     ("role", t::equal(["admin", "guest"])),
//! ]);
//! ```

use indexmap::IndexMap;

use crate::schema::{EQUAL_KIND, MARKER_PREFIX, PROMISE_KIND, TYPE_NAME_KEY};
use crate::value::Value;

/// Wildcard descriptor: matches every value.
pub const ANY: &str = "*";
pub const NUMBER: &str = "Number";
pub const STRING: &str = "String";
pub const BOOLEAN: &str = "Boolean";
/// Shorthand alias for [`BOOLEAN`].
pub const BOOL: &str = BOOLEAN;
pub const ARRAY: &str = "Array";
pub const FUNCTION: &str = "Function";
pub const OBJECT: &str = "Object";
pub const DATE: &str = "Date";

/// Default display name attached by [`object_struct`].
const OBJECT_STRUCT_NAME: &str = "Type/objectStruct";

/// Union of descriptor tokens: `one_of([NUMBER, STRING])` is
/// `"Number | String"`.
pub fn one_of<I, S>(tokens: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tokens
        .into_iter()
        .map(|token| token.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Array whose items each match one of `tokens`:
/// `array_of([NUMBER, STRING])` is `"[Number | String]"`.
pub fn array_of<I, S>(tokens: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    format!("[{}]", one_of(tokens))
}

/// Nullable wrapping: `maybe(NUMBER)` is `"Maybe Number"`.
pub fn maybe(token: impl AsRef<str>) -> String {
    format!("Maybe {}", token.as_ref())
}

/// Marker fragment accepting exactly the listed values.
pub fn equal<I>(values: I) -> Value
where
    I: IntoIterator,
    I::Item: Into<Value>,
{
    Value::object([(
        format!("{}{}", MARKER_PREFIX, EQUAL_KIND),
        Value::Array(values.into_iter().map(Into::into).collect()),
    )])
}

/// Marker fragment accepting only the pending-async placeholder.
pub fn promise() -> Value {
    Value::object([(format!("{}{}", MARKER_PREFIX, PROMISE_KIND), Value::Bool(true))])
}

/// Wrap a mapping of child fragments as a nested struct, attaching the
/// default display name when the mapping does not carry one of its own.
pub fn object_struct(children: Value) -> Value {
    let mut entries = match children {
        Value::Object(entries) => entries,
        _ => IndexMap::new(),
    };
    if !entries.contains_key(TYPE_NAME_KEY) {
        entries.shift_insert(
            0,
            TYPE_NAME_KEY.to_string(),
            Value::String(OBJECT_STRUCT_NAME.to_string()),
        );
    }
    Value::Object(entries)
}
