//! Integration tests for attributes, entries and the entry collection.

use chrono::NaiveDate;
use s7n::errors::S7nError;
use s7n::model::{Attribute, AttributeKind, AttributeOptions, Entry, EntryCollection, Value};

fn named(name: &str) -> Entry {
    let mut entry = Entry::new();
    entry.set_attribute("name", name).unwrap();
    entry
}

// ---------------------------------------------------------------------------
// Attributes
// ---------------------------------------------------------------------------

#[test]
fn create_by_kind_name() {
    let attr = Attribute::create(
        "numeric",
        AttributeOptions {
            name: "pin_length".into(),
            value: Some(Value::from("42 digits")),
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(attr.kind(), AttributeKind::Numeric);
    assert_eq!(attr.as_numeric(), Some(42));
    assert!(attr.is_editable());
    assert!(!attr.is_protected());
}

#[test]
fn create_with_unknown_kind_fails() {
    assert!(matches!(
        Attribute::create("color", AttributeOptions::default()),
        Err(S7nError::UnknownTypeKind(kind)) if kind == "color"
    ));
}

#[test]
fn boolean_text_is_parsed_not_presence_checked() {
    let mut flag = Attribute::new(AttributeKind::Boolean, "expiration");
    for falsy in ["false", "no", "0", "off", ""] {
        flag.set_value(falsy).unwrap();
        assert_eq!(flag.as_boolean(), Some(false), "{falsy:?}");
    }
    for truthy in ["TRUE", "Yes", "y", "on", "1"] {
        flag.set_value(truthy).unwrap();
        assert_eq!(flag.as_boolean(), Some(true), "{truthy:?}");
    }
}

#[test]
fn values_are_coerced_to_the_kind() {
    let mut flag = Attribute::new(AttributeKind::Boolean, "expiration");
    flag.set_value("yes").unwrap();
    assert_eq!(flag.as_boolean(), Some(true));
    flag.set_value(0).unwrap();
    assert_eq!(flag.as_boolean(), Some(false));

    let mut text = Attribute::new(AttributeKind::Text, "note");
    text.set_value(17).unwrap();
    assert_eq!(text.as_text(), Some("17"));

    let mut when = Attribute::new(AttributeKind::DateTime, "expire_at");
    when.set_value("2009/10/05 09:00:00").unwrap();
    assert_eq!(
        when.as_datetime(),
        NaiveDate::from_ymd_opt(2009, 10, 5).unwrap().and_hms_opt(9, 0, 0)
    );
}

#[test]
fn unparsable_datetime_is_rejected() {
    let mut when = Attribute::new(AttributeKind::DateTime, "expire_at");
    assert!(matches!(
        when.set_value("next tuesday"),
        Err(S7nError::InvalidAttributeValue {
            kind: AttributeKind::DateTime,
            ..
        })
    ));
    assert!(when.value().is_none());
}

#[test]
fn secret_text_masks_every_character() {
    let attr = Attribute::text("password", "パスワード1").with_secret(true);
    assert_eq!(attr.display_default(), "******");
    assert_eq!(attr.display(false), "パスワード1");
}

#[test]
fn boolean_and_datetime_display() {
    assert_eq!(Attribute::boolean("expiration", true).display(false), "Yes");
    assert_eq!(Attribute::boolean("expiration", false).display(false), "No");

    let midnight = NaiveDate::from_ymd_opt(2008, 10, 21)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    assert_eq!(
        Attribute::datetime("created_at", midnight).display(false),
        "2008/10/21"
    );
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

#[test]
fn new_entry_has_protected_basics() {
    let entry = Entry::new();
    let names: Vec<_> = entry.attributes().iter().map(Attribute::name).collect();
    assert_eq!(names, ["id", "name", "rate"]);
    assert_eq!(entry.id(), None);
    assert_eq!(entry.rate(), 1);
    assert!(!entry.get_attribute("id").unwrap().is_editable());
    assert!(entry.attributes().iter().all(Attribute::is_protected));
}

#[test]
fn add_attributes_updates_same_kind_and_appends_new() {
    let mut entry = Entry::new();
    entry
        .add_attributes([
            Attribute::text("name", "mail"),
            Attribute::text("username", "alice"),
        ])
        .unwrap();

    assert_eq!(entry.name(), Some("mail"));
    assert_eq!(entry.attributes().len(), 4);
    // The existing attribute keeps its flags.
    assert!(entry.get_attribute("name").unwrap().is_protected());
}

#[test]
fn add_attributes_with_conflicting_kind_changes_nothing() {
    let mut entry = named("mail");
    let result = entry.add_attributes([
        Attribute::text("username", "alice"),
        Attribute::boolean("name", true),
    ]);

    assert!(matches!(
        result,
        Err(S7nError::AttributeTypeConflict {
            existing: AttributeKind::Text,
            incoming: AttributeKind::Boolean,
            ..
        })
    ));
    assert!(entry.get_attribute("username").is_none());
    assert_eq!(entry.name(), Some("mail"));
}

#[test]
fn set_attribute_requires_existing_name() {
    let mut entry = Entry::new();
    assert!(matches!(
        entry.set_attribute("url", "https://example.com"),
        Err(S7nError::NoSuchAttribute(name)) if name == "url"
    ));
}

#[test]
fn protected_attributes_cannot_be_removed() {
    let mut entry = Entry::new();
    entry
        .add_attributes([Attribute::text("hostname", "example.com")])
        .unwrap();

    assert!(matches!(
        entry.remove_attribute("name"),
        Err(S7nError::ProtectedAttribute(_))
    ));
    let removed = entry.remove_attribute("hostname").unwrap();
    assert_eq!(removed.as_text(), Some("example.com"));
}

#[test]
fn duplicate_attributes_are_independent() {
    let entry = named("mail");
    let mut copies = entry.duplicate_attributes(false);
    assert!(copies.iter().all(|a| a.name() != "id"));

    copies[0].set_value("changed").unwrap();
    assert_eq!(entry.name(), Some("mail"));
    assert_eq!(entry.duplicate_attributes(true).len(), 3);
}

#[test]
fn tags_are_unique_and_ordered() {
    let mut entry = Entry::new();
    entry.add_tags(["work", "mail", "work"]);
    assert_eq!(entry.tags(), ["work", "mail"]);
    assert!(entry.remove_tag("work"));
    assert!(!entry.has_tag("work"));
}

// ---------------------------------------------------------------------------
// Collection
// ---------------------------------------------------------------------------

#[test]
fn ids_are_monotonic_across_deletes() {
    let mut collection = EntryCollection::new();
    assert_eq!(
        collection.add_entries([named("a"), named("b"), named("c")]),
        [1, 2, 3]
    );

    let removed = collection.delete_entries(&[3, 1, 99]);
    let names: Vec<_> = removed.iter().filter_map(Entry::name).collect();
    assert_eq!(names, ["a", "c"]);

    assert_eq!(collection.add(named("d")), 4);
    assert_eq!(collection.max_id(), 4);
}

#[test]
fn delete_unknown_id_fails() {
    let mut collection = EntryCollection::new();
    assert!(matches!(
        collection.delete(7),
        Err(S7nError::NoSuchEntry(7))
    ));
}

#[test]
fn merge_assigns_fresh_ids() {
    let mut target = EntryCollection::new();
    target.add_entries([named("a"), named("b")]);

    let mut source = EntryCollection::new();
    source.add_entries([named("x"), named("y")]);

    assert_eq!(target.merge(source), [3, 4]);
    assert_eq!(target.find(4).and_then(Entry::name), Some("y"));
    assert_eq!(target.len(), 4);
}
