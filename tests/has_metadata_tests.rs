mod common;

use chrono::NaiveDate;
use common::{constructed, default_date, subclass_type, tester_type};
use metafields::{Directive, Entity, FieldSpec, MetaError, Value};

/// Fresh tester with a materialized container.
fn tester_with_metadata() -> Entity {
    let mut object = tester_type().new_entity();
    object.materialize_metadata();
    object
}

/// Fixture used by the writer tests: container present, required fields filled.
fn writable_tester() -> Entity {
    let mut object = tester_with_metadata();
    object.set("boolean", false).unwrap();
    object
        .set(
            "multiparam",
            constructed(vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]),
        )
        .unwrap();
    object
}

// ============================================================================
// Declaration
// ============================================================================

#[test]
fn test_defines_accessors_for_each_field() {
    let object = tester_type().new_entity();

    for field in ["untyped", "multiparam", "number"] {
        for method in [
            field.to_string(),
            format!("{}_before_type_cast", field),
            format!("{}=", field),
        ] {
            assert!(object.responds_to(&method), "missing accessor {}", method);
        }
    }
    assert!(!object.responds_to("inherited="));
}

#[test]
fn test_subclasses_extend_fields() {
    let tester = tester_type();
    let subclass = subclass_type(&tester);

    assert!(!tester.metadata_fields().contains(&"inherited".to_string()));
    assert!(subclass.metadata_fields().contains(&"inherited".to_string()));

    let err = tester.new_entity().set("inherited", true).unwrap_err();
    assert!(matches!(err, MetaError::UndefinedField { .. }));

    let mut sc = subclass.new_entity();
    sc.set("inherited", true).unwrap();
    assert_eq!(sc.get("inherited").unwrap(), Value::Boolean(true));
    sc.set("untyped", "foo").unwrap();
    assert_eq!(sc.get("untyped").unwrap(), Value::from("foo"));
}

#[test]
fn test_subclasses_cannot_redefine_fields() {
    let subclass = subclass_type(&tester_type());

    let err = subclass
        .reopen()
        .has_metadata([FieldSpec::new("untyped").validates(Directive::Presence)])
        .unwrap_err();
    assert!(err.to_string().contains("untyped"));
}

// ============================================================================
// Readers
// ============================================================================

fn readers() -> [fn(&Entity, &str) -> Value; 2] {
    [
        |object, field| object.get(field).unwrap(),
        |object, field| object.get_before_type_cast(field).unwrap(),
    ]
}

#[test]
fn test_reader_returns_stored_value() {
    for read in readers() {
        let mut object = tester_with_metadata();
        object
            .metadata_mut()
            .unwrap()
            .insert("untyped", Value::from("bar"));
        assert_eq!(read(&object, "untyped"), Value::from("bar"));
    }
}

#[test]
fn test_reader_without_metadata_is_null() {
    for read in readers() {
        let object = tester_type().new_entity();
        assert!(object.metadata().is_none());
        assert_eq!(read(&object, "untyped"), Value::Null);
        assert_eq!(read(&object, "has_default"), Value::Null);
    }
}

#[test]
fn test_reader_returns_default() {
    for read in readers() {
        let object = tester_with_metadata();
        assert_eq!(read(&object, "has_default"), Value::from("default"));
    }
}

#[test]
fn test_stored_null_wins_over_default() {
    for read in readers() {
        let mut object = tester_with_metadata();
        object
            .metadata_mut()
            .unwrap()
            .insert("has_default", Value::Null);
        assert_eq!(read(&object, "has_default"), Value::Null);
    }
}

// ============================================================================
// Writers
// ============================================================================

#[test]
fn test_writer_stores_in_metadata() {
    let mut object = writable_tester();
    object.set("untyped", "foo").unwrap();
    assert_eq!(
        object.metadata().unwrap().get("untyped"),
        Some(&Value::from("foo"))
    );
}

#[test]
fn test_writer_creates_metadata() {
    let mut object = tester_type().new_entity();
    assert!(object.metadata().is_none());

    object.set("untyped", "foo").unwrap();
    let metadata = object.metadata().unwrap();
    assert_eq!(metadata.get("untyped"), Some(&Value::from("foo")));
    assert!(metadata.is_dirty());
}

#[test]
fn test_writer_enforces_type() {
    let mut object = writable_tester();
    object.set("multiparam", "not correct").unwrap();

    assert!(!object.is_valid());
    assert!(!object.errors().on("multiparam").is_empty());
}

#[test]
fn test_writer_casts_when_possible() {
    let mut object = writable_tester();

    object.set("number", "50").unwrap();
    assert!(object.is_valid(), "{}", object.errors());
    assert_eq!(object.get("number").unwrap(), Value::Integer(50));

    object.set("boolean", "1").unwrap();
    assert!(object.is_valid());
    assert_eq!(object.get("boolean").unwrap(), Value::Boolean(true));

    object.set("boolean", "0").unwrap();
    assert!(object.is_valid());
    assert_eq!(object.get("boolean").unwrap(), Value::Boolean(false));
}

#[test]
fn test_writer_does_not_read_octal() {
    let mut object = writable_tester();
    object.set("number", "08").unwrap();
    assert!(object.is_valid());
    assert_eq!(object.get("number").unwrap(), Value::Integer(8));
}

#[test]
fn test_allow_nil_skips_type_check() {
    let mut object = writable_tester();
    object.set("can_be_nil", Value::Null).unwrap();
    object.is_valid();
    assert!(object.errors().on("can_be_nil").is_empty());
}

#[test]
fn test_allow_blank_skips_type_check() {
    let mut object = writable_tester();
    object.set("can_be_blank", "").unwrap();
    object.is_valid();
    assert!(object.errors().on("can_be_blank").is_empty());
}

#[test]
fn test_null_replaces_default() {
    let mut object = writable_tester();

    object.set("can_be_nil_with_default", Value::Null).unwrap();
    assert_eq!(object.get("can_be_nil_with_default").unwrap(), Value::Null);

    object.set("can_be_blank_with_default", Value::Null).unwrap();
    assert_eq!(object.get("can_be_blank_with_default").unwrap(), Value::Null);

    assert_eq!(
        object.get("cannot_be_nil_with_default").unwrap(),
        Value::Boolean(false)
    );

    object.set("cannot_be_nil_with_default", Value::Null).unwrap();
    assert!(!object.is_valid());
    assert!(!object.errors().on("cannot_be_nil_with_default").is_empty());
    assert!(object.errors().on("can_be_nil_with_default").is_empty());
    assert!(object.errors().on("can_be_blank_with_default").is_empty());
}

#[test]
fn test_writer_enforces_other_validations() {
    let mut object = writable_tester();
    object.set("number", "not number").unwrap();

    assert!(!object.is_valid());
    assert!(!object.errors().on("number").is_empty());
    assert!(
        object
            .errors()
            .on("number")
            .iter()
            .any(|message| message == "is not a number")
    );
}

#[test]
fn test_defaults_have_their_declared_type() {
    let object = tester_with_metadata();
    assert_eq!(
        object.get("can_be_nil_with_default").unwrap(),
        Value::Date(default_date())
    );
}

// ============================================================================
// Mass assignment
// ============================================================================

fn multiparam_args(object: &Entity) -> Vec<Value> {
    object
        .get("multiparam")
        .unwrap()
        .as_composite()
        .map(|composite| composite.args().to_vec())
        .unwrap_or_default()
}

#[test]
fn test_mass_assigns_multiparameter_field() {
    let mut object = writable_tester();
    object
        .assign_attributes([("multiparam(1)", "foo"), ("multiparam(2)", "1")])
        .unwrap();
    assert_eq!(
        multiparam_args(&object),
        vec![Value::from("foo"), Value::from("1")]
    );
}

#[test]
fn test_compacts_blank_multiparameter_parts() {
    let mut object = writable_tester();
    object
        .assign_attributes([("multiparam(1)", ""), ("multiparam(2)", "foo")])
        .unwrap();
    assert_eq!(multiparam_args(&object), vec![Value::from("foo")]);
}

#[test]
fn test_typecasts_multiparameter_parts() {
    let mut object = writable_tester();
    object
        .assign_attributes([("multiparam(1i)", "1982"), ("multiparam(2f)", "10.5")])
        .unwrap();
    assert_eq!(
        multiparam_args(&object),
        vec![Value::Integer(1982), Value::Float(10.5)]
    );
}

#[test]
fn test_mass_assignment_mixes_columns_and_fields() {
    let mut object = tester_type().new_entity();
    object
        .assign_attributes([("id", "7"), ("number", "12"), ("untyped", "x")])
        .unwrap();

    assert_eq!(object.read_attribute("id").unwrap(), Value::Integer(7));
    assert_eq!(object.get("number").unwrap(), Value::Integer(12));
    assert_eq!(object.get("untyped").unwrap(), Value::from("x"));
}

#[test]
fn test_mass_assignment_rejects_unknown_keys() {
    let mut object = tester_type().new_entity();
    let err = object.assign_attributes([("nope", "1")]).unwrap_err();
    assert!(matches!(err, MetaError::UnknownAttribute { .. }));

    let err = object.assign_attributes([("nope(1i)", "1")]).unwrap_err();
    assert!(matches!(err, MetaError::UnknownAttribute { .. }));
}

#[test]
fn test_untyped_field_cannot_be_assembled() {
    let mut object = tester_type().new_entity();
    let err = object
        .assign_attributes([("untyped(1)", "a"), ("untyped(2)", "b")])
        .unwrap_err();
    assert!(matches!(err, MetaError::Multiparameter(_)));
}

#[test]
fn test_failed_assembly_leaves_metadata_absent() {
    let mut object = tester_type().new_entity();
    let err = object
        .assign_attributes([("untyped(1)", "a"), ("untyped(2)", "b")])
        .unwrap_err();
    assert!(matches!(err, MetaError::Multiparameter(_)));

    assert!(object.metadata().is_none());
    assert_eq!(object.get("has_default").unwrap(), Value::Null);
}

#[test]
fn test_out_of_range_date_parts_are_rejected() {
    let mut object = tester_type().new_entity();
    let err = object
        .assign_attributes([
            ("can_be_nil(1i)", "4294969278"),
            ("can_be_nil(2i)", "10"),
            ("can_be_nil(3i)", "5"),
        ])
        .unwrap_err();
    assert!(matches!(err, MetaError::Multiparameter(_)));
    assert!(object.metadata().is_none());

    object
        .assign_attributes([
            ("can_be_nil(1i)", "1982"),
            ("can_be_nil(2i)", "10"),
            ("can_be_nil(3i)", "5"),
        ])
        .unwrap();
    assert_eq!(
        object.get("can_be_nil").unwrap(),
        Value::Date(NaiveDate::from_ymd_opt(1982, 10, 5).unwrap())
    );
}

// ============================================================================
// Presence queries
// ============================================================================

fn query_with(field: &str, value: Value) -> bool {
    let mut object = tester_with_metadata();
    object.metadata_mut().unwrap().insert(field, value);
    object.query(field).unwrap()
}

#[test]
fn test_untyped_query_checks_blankness() {
    assert!(query_with("untyped", Value::from("foo")));
    assert!(!query_with("untyped", Value::from(" ")));
    assert!(!query_with("untyped", Value::from("")));
}

#[test]
fn test_numeric_query_checks_zero() {
    assert!(query_with("number", Value::Integer(4)));
    assert!(!query_with("number", Value::Integer(0)));
}

#[test]
fn test_typed_query_checks_null() {
    assert!(query_with("can_be_nil", Value::Date(default_date())));
    assert!(!query_with("can_be_nil", Value::Null));
}

#[test]
fn test_query_without_metadata_is_false() {
    let object = tester_type().new_entity();
    assert!(!object.query("untyped").unwrap());
    assert!(!object.query("has_default").unwrap());
}
