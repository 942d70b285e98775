//! The validation engine: recursive structural walk of an element against a
//! compiled schema.

use indexmap::IndexMap;

use crate::error::{Report, SchemaResult, ValidationResult, Violation, ViolationKind};
use crate::schema::{
    EQUAL_LABEL, Marker, PROMISE_LABEL, SchemaNode, StructSchema, TYPE_NAME_KEY, TypeSchema,
};
use crate::value::Value;

/// Validation options, passed by value through the walk and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Enforce key-set parity between struct schemas and elements.
    pub strict: bool,
    /// Abort at the first violation instead of accumulating.
    pub fatal: bool,
}

impl Default for Options {
    fn default() -> Options {
        Options {
            strict: true,
            fatal: false,
        }
    }
}

/// Borrow a compiled schema for validation.
pub fn validate(schema: &TypeSchema) -> Validator<'_> {
    Validator { schema }
}

/// A validator over one compiled schema. Cheap to copy; each call walks
/// independently, so a validator can be reused any number of times.
#[derive(Debug, Clone, Copy)]
pub struct Validator<'s> {
    schema: &'s TypeSchema,
}

impl Validator<'_> {
    pub fn schema(&self) -> &TypeSchema {
        self.schema
    }

    /// Walk `element` against the schema under the error policy `options`
    /// selects.
    ///
    /// With `fatal` set, the first violation aborts the walk and comes back
    /// as `Err`; nothing after it is evaluated. Otherwise every violation is
    /// emitted on the warning channel and the call returns `Ok(true)`
    /// regardless; the return value is not a verdict. Callers that want
    /// the outcome as data use [`Validator::report`].
    pub fn check(&self, element: &Value, options: Options) -> ValidationResult<bool> {
        let mut checker = Checker::new(options, options.fatal);
        match checker.check_struct(self.schema.root(), element) {
            Ok(()) => {
                Report::new(checker.violations).emit_warnings();
                Ok(true)
            }
            Err(violation) => Err(violation),
        }
    }

    /// Walk `element` fully and return every violation in walk order.
    ///
    /// The traversal honors `strict` but never aborts, whatever `fatal`
    /// says: this is the collect-everything surface, and converting the
    /// report into a hard failure is the caller's decision.
    pub fn report(&self, element: &Value, options: Options) -> Report {
        let mut checker = Checker::new(options, false);
        // cannot fail with short-circuiting disabled
        let _ = checker.check_struct(self.schema.root(), element);
        Report::new(checker.violations)
    }
}

/// Validate a sequence of elements positionally.
///
/// The schema fragments are index-keyed (`"0"`, `"1"`, ...) and compiled as
/// an unnamed struct; elements are keyed the same way at check time, so a
/// wrong item reports its position as the key.
pub fn validate_list<I>(fragments: I) -> SchemaResult<ListValidator>
where
    I: IntoIterator<Item = Value>,
{
    let entries: IndexMap<String, Value> = fragments
        .into_iter()
        .enumerate()
        .map(|(index, fragment)| (index.to_string(), fragment))
        .collect();
    let root = StructSchema::compile(&entries)?;
    Ok(ListValidator {
        schema: TypeSchema::from_struct(root),
    })
}

/// Validate a single value against a single schema fragment.
///
/// The one-element special case of [`validate_list`].
pub fn validate_tuple(fragment: Value) -> SchemaResult<TupleValidator> {
    Ok(TupleValidator {
        list: validate_list([fragment])?,
    })
}

/// Positional validator built by [`validate_list`].
#[derive(Debug, Clone)]
pub struct ListValidator {
    schema: TypeSchema,
}

impl ListValidator {
    pub fn schema(&self) -> &TypeSchema {
        &self.schema
    }

    pub fn check(&self, elements: &[Value], options: Options) -> ValidationResult<bool> {
        validate(&self.schema).check(&index_keyed(elements), options)
    }

    pub fn report(&self, elements: &[Value], options: Options) -> Report {
        validate(&self.schema).report(&index_keyed(elements), options)
    }
}

/// Single-value validator built by [`validate_tuple`].
#[derive(Debug, Clone)]
pub struct TupleValidator {
    list: ListValidator,
}

impl TupleValidator {
    pub fn check(&self, element: &Value, options: Options) -> ValidationResult<bool> {
        self.list.check(std::slice::from_ref(element), options)
    }

    pub fn report(&self, element: &Value, options: Options) -> Report {
        self.list.report(std::slice::from_ref(element), options)
    }
}

fn index_keyed(elements: &[Value]) -> Value {
    Value::Object(
        elements
            .iter()
            .cloned()
            .enumerate()
            .map(|(index, value)| (index.to_string(), value))
            .collect(),
    )
}

/// Walk state: accumulated violations plus the short-circuit policy.
struct Checker {
    options: Options,
    short_circuit: bool,
    violations: Vec<Violation>,
}

impl Checker {
    fn new(options: Options, short_circuit: bool) -> Checker {
        Checker {
            options,
            short_circuit,
            violations: Vec::new(),
        }
    }

    /// Record a violation; with short-circuiting on, hand it back as `Err`
    /// so `?` unwinds the walk.
    fn record(&mut self, type_name: &str, kind: ViolationKind) -> ValidationResult<()> {
        let violation = Violation::new(type_name, kind);
        self.violations.push(violation.clone());
        if self.short_circuit {
            return Err(violation);
        }
        Ok(())
    }

    fn check_struct(&mut self, schema: &StructSchema, element: &Value) -> ValidationResult<()> {
        let name = schema.display_name();
        // Entry view of the element: an object's entries in insertion order;
        // any non-object element looks empty. Scalars against struct schemas
        // therefore only ever trip the strict length check.
        let entries: Vec<(&String, &Value)> = match element.as_object() {
            Some(map) => map.iter().collect(),
            None => Vec::new(),
        };

        if self.options.strict {
            if schema.children().len() != entries.len() {
                // a reserved metadata entry on the element counts toward
                // parity but stays out of the rendered listing
                self.record(
                    name,
                    ViolationKind::LengthMismatch {
                        schema_keys: schema.children().keys().cloned().collect(),
                        element_keys: entries
                            .iter()
                            .copied()
                            .filter(|(key, _)| key != &TYPE_NAME_KEY)
                            .map(|(key, _)| key.clone())
                            .collect(),
                    },
                )?;
            }
            for (key, _) in entries.iter().copied() {
                if !schema.children().contains_key(key) {
                    self.record(name, ViolationKind::UnknownKey { key: key.clone() })?;
                }
            }
        }

        // Main pass: element keys in element order, visiting only keys the
        // schema knows. Extra element keys were handled above (strict) or
        // are skipped silently; keys present only in the schema are never
        // reported by name.
        for (key, value) in entries.iter().copied() {
            if let Some(node) = schema.children().get(key) {
                self.check_node(name, key, node, value)?;
            }
        }
        Ok(())
    }

    fn check_node(
        &mut self,
        type_name: &str,
        key: &str,
        node: &SchemaNode,
        value: &Value,
    ) -> ValidationResult<()> {
        match node {
            SchemaNode::Leaf(descriptor) => {
                if !descriptor.matches(value) {
                    self.record(
                        type_name,
                        ViolationKind::TypeMismatch {
                            key: key.to_string(),
                            expected: descriptor.to_string(),
                            actual: value.to_string(),
                        },
                    )?;
                }
                Ok(())
            }
            SchemaNode::Marker(marker) => self.check_marker(type_name, key, marker, value),
            // Nested structs validate under their own display name, with
            // the same options.
            SchemaNode::Struct(inner) => self.check_struct(inner, value),
        }
    }

    fn check_marker(
        &mut self,
        type_name: &str,
        key: &str,
        marker: &Marker,
        value: &Value,
    ) -> ValidationResult<()> {
        match marker {
            Marker::Equal(allowed) => {
                // membership treats NaN as equal to itself
                let matched = allowed.iter().any(|member| match (member, value) {
                    (Value::Number(a), Value::Number(b)) => {
                        a == b || (a.is_nan() && b.is_nan())
                    }
                    _ => member == value,
                });
                if !matched {
                    self.record(
                        type_name,
                        ViolationKind::EqualityMismatch {
                            key: key.to_string(),
                            marker: EQUAL_LABEL.to_string(),
                            actual: value.to_string(),
                        },
                    )?;
                }
            }
            Marker::Promise => {
                if !matches!(value, Value::Pending) {
                    // the rejected value has no meaningful rendering here
                    self.record(
                        type_name,
                        ViolationKind::EqualityMismatch {
                            key: key.to_string(),
                            marker: PROMISE_LABEL.to_string(),
                            actual: String::new(),
                        },
                    )?;
                }
            }
            // Unrecognized marker kinds are inert: everything passes.
            Marker::Other(_) => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::define_type;
    use crate::vocabulary as t;

    fn user_schema() -> TypeSchema {
        define_type(
            "User",
            Value::object([
                ("name", t::STRING.into()),
                ("age", t::maybe(t::NUMBER).into()),
            ]),
        )
        .unwrap()
    }

    fn good_user() -> Value {
        Value::object([("name", "Ada".into()), ("age", 36.into())])
    }

    // ==================== Options tests ====================

    #[test]
    fn test_default_options() {
        let options = Options::default();
        assert!(options.strict);
        assert!(!options.fatal);
    }

    // ==================== check/report basics ====================

    #[test]
    fn test_matching_element_passes() {
        let schema = user_schema();
        assert_eq!(
            validate(&schema).check(&good_user(), Options::default()),
            Ok(true)
        );
        assert!(validate(&schema).report(&good_user(), Options::default()).is_empty());
    }

    #[test]
    fn test_non_fatal_check_returns_true_despite_violations() {
        let schema = user_schema();
        let element = Value::object([("name", 5.into()), ("age", 36.into())]);
        // return value is not a verdict in non-fatal mode
        assert_eq!(
            validate(&schema).check(&element, Options::default()),
            Ok(true)
        );
        let report = validate(&schema).report(&element, Options::default());
        assert_eq!(report.len(), 1);
        assert_eq!(
            report.first().unwrap().kind,
            ViolationKind::TypeMismatch {
                key: "name".to_string(),
                expected: "String".to_string(),
                actual: "5".to_string(),
            }
        );
    }

    #[test]
    fn test_fatal_check_returns_first_violation() {
        let schema = define_type(
            "Pair",
            Value::object([("a", t::NUMBER.into()), ("b", t::STRING.into())]),
        )
        .unwrap();
        let element = Value::object([("a", "x".into()), ("b", 5.into())]);
        let options = Options {
            fatal: true,
            ..Options::default()
        };

        let err = validate(&schema).check(&element, options).unwrap_err();
        assert_eq!(
            err.kind,
            ViolationKind::TypeMismatch {
                key: "a".to_string(),
                expected: "Number".to_string(),
                actual: "x".to_string(),
            }
        );

        // both violations exist; fatal mode just stops at the first
        assert_eq!(validate(&schema).report(&element, options).len(), 2);
    }

    #[test]
    fn test_fatal_check_passes_clean_element() {
        let schema = user_schema();
        let options = Options {
            fatal: true,
            ..Options::default()
        };
        assert_eq!(validate(&schema).check(&good_user(), options), Ok(true));
    }

    // ==================== strict mode tests ====================

    #[test]
    fn test_strict_flags_length_and_unknown_key() {
        let schema = define_type("T", Value::object([("a", t::NUMBER.into())])).unwrap();
        let element = Value::object([("a", true.into()), ("b", 2.into())]);

        let report = validate(&schema).report(&element, Options::default());
        let kinds: Vec<&ViolationKind> = report.iter().map(|v| &v.kind).collect();
        assert_eq!(report.len(), 3);
        assert_eq!(
            kinds[0],
            &ViolationKind::LengthMismatch {
                schema_keys: vec!["a".to_string()],
                element_keys: vec!["a".to_string(), "b".to_string()],
            }
        );
        assert_eq!(
            kinds[1],
            &ViolationKind::UnknownKey {
                key: "b".to_string()
            }
        );
        assert!(matches!(kinds[2], ViolationKind::TypeMismatch { key, .. } if key == "a"));
    }

    #[test]
    fn test_non_strict_skips_extra_keys() {
        let schema = define_type("T", Value::object([("a", t::NUMBER.into())])).unwrap();
        let element = Value::object([("a", 1.into()), ("b", 2.into()), ("c", 3.into())]);
        let options = Options {
            strict: false,
            ..Options::default()
        };
        assert!(validate(&schema).report(&element, options).is_empty());
    }

    #[test]
    fn test_missing_key_surfaces_only_as_length_parity() {
        let schema = define_type(
            "T",
            Value::object([("a", t::NUMBER.into()), ("b", t::NUMBER.into())]),
        )
        .unwrap();
        let element = Value::object([("a", 1.into())]);

        // strict: exactly one violation, and it never names 'b'
        let report = validate(&schema).report(&element, Options::default());
        assert_eq!(report.len(), 1);
        assert_eq!(
            report.first().unwrap().kind,
            ViolationKind::LengthMismatch {
                schema_keys: vec!["a".to_string(), "b".to_string()],
                element_keys: vec!["a".to_string()],
            }
        );

        // non-strict: an absent key is invisible
        let lenient = Options {
            strict: false,
            ..Options::default()
        };
        assert!(validate(&schema).report(&element, lenient).is_empty());
    }

    #[test]
    fn test_element_metadata_key_counts_in_strict_mode() {
        let schema = define_type("T", Value::object([("a", t::NUMBER.into())])).unwrap();
        let element = Value::object([("__typeName", "whatever".into()), ("a", 1.into())]);

        // the reserved key counts toward parity and gets swept as unknown,
        // but never shows in the parity listing
        let report = validate(&schema).report(&element, Options::default());
        assert_eq!(report.len(), 2);
        assert_eq!(
            report.first().unwrap().kind,
            ViolationKind::LengthMismatch {
                schema_keys: vec!["a".to_string()],
                element_keys: vec!["a".to_string()],
            }
        );
        assert_eq!(
            report.violations()[1].kind,
            ViolationKind::UnknownKey {
                key: "__typeName".to_string(),
            }
        );

        // non-strict has no parity checks and the main pass never visits it
        let lenient = Options {
            strict: false,
            ..Options::default()
        };
        assert!(validate(&schema).report(&element, lenient).is_empty());
    }

    #[test]
    fn test_scalar_element_against_struct_schema() {
        let schema = define_type("T", Value::object([("a", t::NUMBER.into())])).unwrap();

        // strict: the empty entry view trips the length check, nothing else
        let report = validate(&schema).report(&Value::from(5), Options::default());
        assert_eq!(report.len(), 1);
        assert_eq!(
            report.first().unwrap().kind,
            ViolationKind::LengthMismatch {
                schema_keys: vec!["a".to_string()],
                element_keys: vec![],
            }
        );

        // non-strict: a scalar sails through a struct schema untouched
        let lenient = Options {
            strict: false,
            ..Options::default()
        };
        assert!(validate(&schema).report(&Value::from(5), lenient).is_empty());
    }

    #[test]
    fn test_empty_schema_empty_element() {
        let schema = define_type("Empty", t::object_struct(Value::Null)).unwrap();
        let element = Value::Object(IndexMap::new());
        assert!(validate(&schema).report(&element, Options::default()).is_empty());
    }

    // ==================== marker tests ====================

    #[test]
    fn test_equal_marker_membership() {
        let schema = define_type(
            "User",
            Value::object([("role", t::equal(["admin", "guest"]))]),
        )
        .unwrap();

        let ok = Value::object([("role", "admin".into())]);
        assert!(validate(&schema).report(&ok, Options::default()).is_empty());

        let bad = Value::object([("role", "root".into())]);
        let report = validate(&schema).report(&bad, Options::default());
        assert_eq!(report.len(), 1);
        assert_eq!(
            report.first().unwrap().to_string(),
            "[User] Invalid value 'root' supplied to 'role' (Type/Equal)"
        );
    }

    #[test]
    fn test_equal_marker_structural_equality() {
        let schema = define_type(
            "T",
            Value::object([("pick", t::equal([Value::from(1), Value::array(["a".into()])]))]),
        )
        .unwrap();
        let ok = Value::object([("pick", Value::array(["a".into()]))]);
        assert!(validate(&schema).report(&ok, Options::default()).is_empty());

        let bad = Value::object([("pick", Value::array(["b".into()]))]);
        assert_eq!(validate(&schema).report(&bad, Options::default()).len(), 1);
    }

    #[test]
    fn test_equal_marker_nan_member_matches_nan() {
        let schema = define_type(
            "T",
            Value::object([("x", t::equal([Value::from(f64::NAN), Value::from(1)]))]),
        )
        .unwrap();

        let ok = Value::object([("x", f64::NAN.into())]);
        assert!(validate(&schema).report(&ok, Options::default()).is_empty());

        // a NaN element only matches a NaN member
        let plain = define_type("T", Value::object([("x", t::equal([Value::from(1)]))])).unwrap();
        let bad = Value::object([("x", f64::NAN.into())]);
        assert_eq!(validate(&plain).report(&bad, Options::default()).len(), 1);
    }

    #[test]
    fn test_promise_marker() {
        let schema = define_type("Task", Value::object([("result", t::promise())])).unwrap();

        let ok = Value::object([("result", Value::Pending)]);
        assert!(validate(&schema).report(&ok, Options::default()).is_empty());

        let bad = Value::object([("result", "done".into())]);
        let report = validate(&schema).report(&bad, Options::default());
        assert_eq!(
            report.first().unwrap().kind,
            ViolationKind::EqualityMismatch {
                key: "result".to_string(),
                marker: "Type/Promise".to_string(),
                actual: String::new(),
            }
        );
        assert_eq!(
            report.first().unwrap().to_string(),
            "[Task] Invalid value '' supplied to 'result' (Type/Promise)"
        );
    }

    #[test]
    fn test_unrecognized_marker_kind_passes_everything() {
        let schema = define_type(
            "T",
            Value::object([("x", Value::object([("__type/future", true.into())]))]),
        )
        .unwrap();
        for value in [Value::Null, Value::from(5), Value::Pending, Value::from("s")] {
            let element = Value::object([("x", value)]);
            assert!(validate(&schema).report(&element, Options::default()).is_empty());
        }
    }

    // ==================== nesting tests ====================

    #[test]
    fn test_nested_violation_uses_inner_name() {
        let schema = define_type(
            "Outer",
            Value::object([(
                "profile",
                Value::object([("__typeName", "Profile".into()), ("bio", t::STRING.into())]),
            )]),
        )
        .unwrap();
        let element = Value::object([(
            "profile",
            Value::object([("bio", 5.into())]),
        )]);

        let report = validate(&schema).report(&element, Options::default());
        assert_eq!(report.len(), 1);
        assert_eq!(report.first().unwrap().type_name, "Profile");
    }

    #[test]
    fn test_strict_propagates_into_nested_structs() {
        let schema = define_type(
            "Outer",
            Value::object([(
                "profile",
                Value::object([("__typeName", "Profile".into()), ("bio", t::STRING.into())]),
            )]),
        )
        .unwrap();
        let element = Value::object([(
            "profile",
            Value::object([("bio", "hi".into()), ("extra", 1.into())]),
        )]);

        let report = validate(&schema).report(&element, Options::default());
        assert_eq!(report.len(), 2);
        assert!(report.iter().all(|v| v.type_name == "Profile"));
        assert!(report.iter().all(|v| v.kind.is_strict()));

        // options propagate: lenient outer means lenient inner too
        let lenient = Options {
            strict: false,
            ..Options::default()
        };
        assert!(validate(&schema).report(&element, lenient).is_empty());
    }

    #[test]
    fn test_fatal_aborts_inside_nested_struct() {
        let schema = define_type(
            "Outer",
            Value::object([
                (
                    "profile",
                    Value::object([("__typeName", "Profile".into()), ("bio", t::STRING.into())]),
                ),
                ("age", t::NUMBER.into()),
            ]),
        )
        .unwrap();
        let element = Value::object([
            ("profile", Value::object([("bio", 5.into())])),
            ("age", "x".into()),
        ]);
        let options = Options {
            fatal: true,
            ..Options::default()
        };

        let err = validate(&schema).check(&element, options).unwrap_err();
        assert_eq!(err.type_name, "Profile");
    }

    // ==================== idempotence ====================

    #[test]
    fn test_repeated_runs_yield_identical_reports() {
        let schema = define_type("T", Value::object([("a", t::NUMBER.into())])).unwrap();
        let element = Value::object([("a", "x".into()), ("b", 1.into())]);

        let first = validate(&schema).report(&element, Options::default());
        let second = validate(&schema).report(&element, Options::default());
        assert_eq!(first, second);
    }

    // ==================== list/tuple tests ====================

    #[test]
    fn test_validate_list_positional() {
        let list = validate_list([t::NUMBER.into(), t::STRING.into()]).unwrap();

        assert_eq!(
            list.check(
                &[5.into(), "x".into()],
                Options::default()
            ),
            Ok(true)
        );

        let report = list.report(&[5.into(), 5.into()], Options::default());
        assert_eq!(report.len(), 1);
        let violation = report.first().unwrap();
        assert_eq!(violation.type_name, "Type (unknown or not defined)");
        assert_eq!(
            violation.kind,
            ViolationKind::TypeMismatch {
                key: "1".to_string(),
                expected: "String".to_string(),
                actual: "5".to_string(),
            }
        );
    }

    #[test]
    fn test_validate_list_strict_length() {
        let list = validate_list([t::NUMBER.into(), t::STRING.into()]).unwrap();
        let report = list.report(&[5.into()], Options::default());
        assert_eq!(report.len(), 1);
        assert_eq!(
            report.first().unwrap().kind,
            ViolationKind::LengthMismatch {
                schema_keys: vec!["0".to_string(), "1".to_string()],
                element_keys: vec!["0".to_string()],
            }
        );
    }

    #[test]
    fn test_validate_tuple() {
        let tuple = validate_tuple(t::NUMBER.into()).unwrap();
        assert_eq!(tuple.check(&5.into(), Options::default()), Ok(true));

        let report = tuple.report(&"x".into(), Options::default());
        assert_eq!(report.len(), 1);
        assert!(matches!(
            &report.first().unwrap().kind,
            ViolationKind::TypeMismatch { key, .. } if key == "0"
        ));
    }

    #[test]
    fn test_validate_list_rejects_bad_fragment() {
        assert!(validate_list([Value::from(5)]).is_err());
    }
}
