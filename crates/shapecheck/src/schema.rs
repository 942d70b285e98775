//! Compiled schema representation.
//!
//! Schemas are authored as [`Value`] fragments (descriptor strings, marker
//! mappings, nested struct mappings) and compiled exactly once into a
//! [`SchemaNode`] tree. All string inspection happens here; the validator
//! walks an explicit sum type and never re-parses anything.

use indexmap::IndexMap;

use crate::descriptor::Descriptor;
use crate::error::{SchemaError, SchemaResult};
use crate::value::Value;

/// Reserved metadata key carrying a struct schema's display name.
///
/// Compilation lifts the key out of a struct's children, so it is never a
/// schema child. An element entry under this key still counts in strict
/// key-parity checks; only the rendered parity listing omits it.
pub const TYPE_NAME_KEY: &str = "__typeName";

/// Key prefix that turns a mapping into a special marker node. The suffix
/// after the prefix names the marker kind.
pub const MARKER_PREFIX: &str = "__type/";

pub(crate) const EQUAL_KIND: &str = "equal";
pub(crate) const PROMISE_KIND: &str = "promise";

/// Marker label shown in `equal` violation messages.
pub(crate) const EQUAL_LABEL: &str = "Type/Equal";
/// Marker label shown in `promise` violation messages.
pub(crate) const PROMISE_LABEL: &str = "Type/Promise";

pub(crate) const DEFAULT_TYPE_NAME: &str = "Type (unknown or not defined)";

/// A special-predicate schema node, decided once at compile time.
#[derive(Debug, Clone, PartialEq)]
pub enum Marker {
    /// Value must be structurally equal to one of the listed values.
    Equal(Vec<Value>),
    /// Value must be the pending-async placeholder.
    Promise,
    /// Unrecognized marker kind; validates as always-true.
    Other(String),
}

impl Marker {
    fn compile(kind: &str, payload: &Value) -> SchemaResult<Marker> {
        match kind {
            EQUAL_KIND => match payload {
                Value::Array(values) => Ok(Marker::Equal(values.clone())),
                other => Err(SchemaError::InvalidEqualPayload(other.type_name())),
            },
            PROMISE_KIND => Ok(Marker::Promise),
            other => Ok(Marker::Other(other.to_string())),
        }
    }
}

/// One position in a compiled schema tree.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// A parsed type descriptor.
    Leaf(Descriptor),
    /// A special-predicate marker.
    Marker(Marker),
    /// A nested struct with named children.
    Struct(StructSchema),
}

impl SchemaNode {
    /// Compile a schema fragment into its node form.
    ///
    /// A string fragment parses as a descriptor; a mapping whose first key
    /// starts with [`MARKER_PREFIX`] compiles as a marker; any other mapping
    /// compiles as a struct. Everything else is an error.
    pub fn compile(fragment: &Value) -> SchemaResult<SchemaNode> {
        match fragment {
            Value::String(descriptor) => Ok(SchemaNode::Leaf(Descriptor::parse(descriptor)?)),
            Value::Object(entries) => {
                if let Some((first_key, payload)) = entries.get_index(0)
                    && let Some(kind) = first_key.strip_prefix(MARKER_PREFIX)
                {
                    return Ok(SchemaNode::Marker(Marker::compile(kind, payload)?));
                }
                Ok(SchemaNode::Struct(StructSchema::compile(entries)?))
            }
            other => Err(SchemaError::InvalidFragment(format!(
                "a schema node must be a descriptor string, a marker, or a mapping, got {}",
                other.type_name()
            ))),
        }
    }
}

/// A compiled struct schema: an optional display name plus named children
/// in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct StructSchema {
    name: Option<String>,
    children: IndexMap<String, SchemaNode>,
}

impl StructSchema {
    pub(crate) fn compile(entries: &IndexMap<String, Value>) -> SchemaResult<StructSchema> {
        let name = match entries.get(TYPE_NAME_KEY) {
            None => None,
            Some(Value::String(name)) => Some(name.clone()),
            Some(other) => return Err(SchemaError::InvalidTypeName(other.type_name())),
        };
        let mut children = IndexMap::new();
        for (key, fragment) in entries {
            if key == TYPE_NAME_KEY {
                continue;
            }
            children.insert(key.clone(), SchemaNode::compile(fragment)?);
        }
        Ok(StructSchema { name, children })
    }

    /// Name used in violation messages; falls back to a placeholder when
    /// the schema was not given one.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_TYPE_NAME)
    }

    /// Child schemas in declaration order. Never contains the metadata key.
    pub fn children(&self) -> &IndexMap<String, SchemaNode> {
        &self.children
    }
}

/// A compiled, named, immutable root schema ready for validation.
///
/// Built with [`define_type`]; there are no mutators, so a `TypeSchema` can
/// be reused and shared freely.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSchema {
    root: StructSchema,
}

impl TypeSchema {
    pub(crate) fn from_struct(root: StructSchema) -> TypeSchema {
        TypeSchema { root }
    }

    /// The display name of the root struct.
    pub fn name(&self) -> &str {
        self.root.display_name()
    }

    pub fn root(&self) -> &StructSchema {
        &self.root
    }
}

/// Compile `fragment` into a named [`TypeSchema`].
///
/// The fragment must be a struct mapping. `name` becomes the root's display
/// name, overriding any `__typeName` the fragment carries.
pub fn define_type(name: impl Into<String>, fragment: Value) -> SchemaResult<TypeSchema> {
    match SchemaNode::compile(&fragment)? {
        SchemaNode::Struct(mut root) => {
            root.name = Some(name.into());
            Ok(TypeSchema { root })
        }
        _ => Err(SchemaError::InvalidFragment(
            "a named type must be defined from a struct mapping".to_string(),
        )),
    }
}
