use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use bson::{Bson, doc, oid::ObjectId};
use chrono::{DateTime, Utc};
use docmodel::{
    memory::MemoryDocument,
    prelude::*,
};

fn counter_field(calls: &Arc<AtomicUsize>, name: &str) -> Field {
    let calls = Arc::clone(calls);
    Field::new(
        name,
        FieldOptions::new()
            .field_type(FieldType::Integer)
            .default_fn(move || Value::Int(calls.fetch_add(1, Ordering::SeqCst) as i64)),
    )
}

#[test]
fn static_defaults_are_not_aliased() {
    let field = Field::new(
        "tags",
        FieldOptions::new()
            .field_type(FieldType::Array)
            .default_value(vec!["rock"]),
    );
    let document = MemoryDocument::new();

    let mut first = field.eval_default(&document).unwrap();
    if let Bson::Array(items) = &mut first {
        items.push(Bson::String("pop".into()));
    }
    let second = field.eval_default(&document).unwrap();

    assert_eq!(second, Bson::Array(vec![Bson::String("rock".into())]));
    assert_eq!(
        field.default_source().map(DefaultSource::is_callable),
        Some(false)
    );
}

#[test]
fn callable_defaults_receive_the_document() {
    let field = Field::new(
        "display_name",
        FieldOptions::new()
            .field_type(FieldType::String)
            .default_with(|document| match document.attribute("name") {
                Some(Bson::String(name)) => Value::from(format!("The {name}")),
                _ => Value::Null,
            }),
    );
    let document = MemoryDocument::from_attributes(doc! { "name": "Cure" });

    assert_eq!(field.eval_default(&document), Some(Bson::String("The Cure".into())));
}

#[test]
fn only_projection_skips_unlisted_defaults() {
    let calls = Arc::new(AtomicUsize::new(0));
    let a = counter_field(&calls, "a");
    let b = counter_field(&calls, "b");
    let document = MemoryDocument::loaded(doc! {}, Projection::new(doc! { "a": 1 }));

    assert!(a.eval_default(&document).is_some());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(b.eval_default(&document), None);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn without_projection_skips_listed_defaults() {
    let calls = Arc::new(AtomicUsize::new(0));
    let a = counter_field(&calls, "a");
    let b = counter_field(&calls, "b");
    let document = MemoryDocument::loaded(doc! {}, Projection::new(doc! { "a": 0 }));

    assert_eq!(a.eval_default(&document), None);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(b.eval_default(&document), Some(Bson::Int32(0)));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn zoned_time_evolves_to_utc() {
    let field = Field::new("founded", FieldOptions::new().field_type(FieldType::TimeWithZone));
    let zoned = DateTime::parse_from_rfc3339("2021-03-15T10:30:00-05:00").unwrap();
    let utc = DateTime::parse_from_rfc3339("2021-03-15T15:30:00Z")
        .unwrap()
        .with_timezone(&Utc);

    assert_eq!(field.evolve(Value::ZonedTime(zoned)), Value::Time(utc));

    let unrelated = Value::map([("genre", "post-punk")]);
    assert_eq!(field.evolve(unrelated.clone()), unrelated);
}

#[test]
fn standard_fields_replace_arrays() {
    let field = Field::new("tags", FieldOptions::new().field_type(FieldType::Array));
    let mut document = MemoryDocument::new();
    let mut mods = bson::Document::new();

    field.add_atomic_changes(
        &mut document,
        "tags",
        "tags",
        &mut mods,
        &[Bson::from("x"), Bson::from("y")],
        &[Bson::from("z")],
    );

    assert_eq!(mods, doc! { "tags": ["x", "y"] });
    assert!(document.add_to_sets().is_empty());
    assert!(document.pulls().is_empty());
}

#[test]
fn derived_attributes_are_stable_across_reads() {
    let field = Field::new(
        "_id",
        FieldOptions::new()
            .field_type(FieldType::ObjectId)
            .default_fn(|| Value::ObjectId(ObjectId::new())),
    );

    for _ in 0..2 {
        assert_eq!(field.field_type(), FieldType::ObjectId);
        assert!(field.is_object_id_field());
        assert!(!field.is_pre_processed());
    }
}

#[test]
fn foreign_key_arrays_record_deltas() {
    let field = Field::foreign_key(
        "member_ids",
        FieldOptions::new()
            .field_type(FieldType::Array)
            .association(Association::new("members", "Person")),
    );
    let (a, b, c) = (ObjectId::new(), ObjectId::new(), ObjectId::new());
    let mut document = MemoryDocument::new();
    let mut mods = bson::Document::new();

    field.add_atomic_changes(
        &mut document,
        "member_ids",
        "member_ids",
        &mut mods,
        &[a.into(), b.into(), c.into()],
        &[a.into()],
    );
    assert_eq!(document.add_to_sets(), &doc! { "member_ids": [b, c] });

    document.clear_atomic_updates();
    field.add_atomic_changes(
        &mut document,
        "member_ids",
        "member_ids",
        &mut mods,
        &[c.into()],
        &[b.into(), c.into()],
    );
    assert_eq!(document.pulls(), &doc! { "member_ids": [b] });
    assert!(mods.is_empty());

    assert_eq!(
        document.atomic_updates(&mods),
        doc! { "$pullAll": { "member_ids": [b] } }
    );
}

#[test]
fn localized_reads_fall_back_along_configured_locales() {
    let config = Config::builder()
        .locale("de-AT")
        .fallbacks("de-AT", ["de", "en"])
        .build()
        .unwrap();
    let mut schema = Schema::with_config("Album", config);
    schema
        .field(
            "title",
            FieldOptions::new()
                .field_type(FieldType::String)
                .localize(LocalizeMode::All),
        )
        .unwrap();
    let field = schema.require("title").unwrap();

    let document = MemoryDocument::from_attributes(doc! {
        "title": { "en": "Disintegration", "de": "Zerfall" },
    });
    assert_eq!(document.read(field), Value::from("Zerfall"));

    let english_only = MemoryDocument::from_attributes(doc! { "title": { "en": "Disintegration" } });
    assert_eq!(english_only.read(field), Value::from("Disintegration"));
}

#[test]
fn schema_defaults_fill_a_new_document() {
    let mut schema = Schema::new("Band");
    schema
        .field(
            "likes",
            FieldOptions::new().field_type(FieldType::Integer).default_value(0),
        )
        .unwrap();
    schema
        .field(
            "rating",
            FieldOptions::new()
                .field_type(FieldType::Float)
                .default_with(|document| match document.attribute("likes") {
                    Some(Bson::Int32(likes)) => Value::Float(f64::from(*likes) / 10.0),
                    _ => Value::Null,
                }),
        )
        .unwrap();

    let mut band = MemoryDocument::new();
    schema.apply_defaults(&mut band);

    assert_eq!(band.attributes(), &doc! { "likes": 0, "rating": 0.0 });
    assert_eq!(schema.default_resolvers(), ["__rating_default__".to_string()]);
}

#[test]
fn embedded_hashes_round_trip_in_storage_order() {
    let field = Field::new("meta", FieldOptions::new().field_type(FieldType::Hash));
    let stored = Bson::Document(doc! { "b": 1, "a": 2 });

    let Bson::Document(written) = field.mongoize(&field.demongoize(&stored)) else {
        panic!("expected a document");
    };
    assert_eq!(written.keys().collect::<Vec<_>>(), ["b", "a"]);
}
