#![allow(dead_code)]

use chrono::NaiveDate;
use metafields::{Column, CompositeType, DataType, Directive, EntityType, FieldSpec, Value};
use std::sync::Arc;

pub fn default_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
}

pub fn constructor_tester() -> DataType {
    DataType::Composite(CompositeType::new("ConstructorTester"))
}

pub fn constructed(args: Vec<Value>) -> Value {
    constructor_tester().construct(args).unwrap()
}

/// Users table with one native column and the full set of field declarations.
pub fn tester_type() -> Arc<EntityType> {
    EntityType::builder("HasMetadataTester")
        .column(Column::new("id", DataType::Integer))
        .unwrap()
        .has_metadata([
            FieldSpec::new("untyped"),
            FieldSpec::new("can_be_nil").typed(DataType::Date).allow_nil(),
            FieldSpec::new("can_be_nil_with_default")
                .typed(DataType::Date)
                .allow_nil()
                .default_value(default_date()),
            FieldSpec::new("can_be_blank").typed(DataType::Date).allow_blank(),
            FieldSpec::new("can_be_blank_with_default")
                .typed(DataType::Date)
                .allow_blank()
                .default_value(default_date()),
            FieldSpec::new("cannot_be_nil_with_default")
                .typed(DataType::Boolean)
                .default_value(false),
            FieldSpec::new("number")
                .typed(DataType::Integer)
                .validates(Directive::numericality()),
            FieldSpec::new("boolean").typed(DataType::Boolean),
            FieldSpec::new("multiparam").typed(constructor_tester()),
            FieldSpec::new("has_default").default_value("default"),
        ])
        .unwrap()
        .build()
}

pub fn subclass_type(parent: &Arc<EntityType>) -> Arc<EntityType> {
    EntityType::subtype(parent, "HasMetadataSubclass")
        .has_metadata([FieldSpec::new("inherited")])
        .unwrap()
        .build()
}
