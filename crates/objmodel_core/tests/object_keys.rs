use objmodel_core::{
    AttributeValue, CollectionError, MessageObjectKey, ObjectKey, SchemaObjectKey,
    SimpleObjectKey, StringComparer, Urn, UrnError,
};
use std::cmp::Ordering;

#[test]
fn simple_key_survives_a_trip_through_a_path() {
    let key = SimpleObjectKey::new("O'Brien");
    let urn = Urn::parse(&format!("Server[@Name='local']/Login[{}]", key.to_filter_expression()))
        .unwrap();

    assert_eq!(urn.last().type_name(), "Login");
    let rebuilt = SimpleObjectKey::from_path_expression(urn.last()).unwrap();
    assert_eq!(rebuilt, key);
    assert_eq!(rebuilt.name(), "O'Brien");
}

#[test]
fn schema_key_filter_is_canonical_and_reversible() {
    let key = SchemaObjectKey::new("dbo", "Orders");
    let filter = key.to_filter_expression();
    assert_eq!(filter, "@Name='Orders' and @Schema='dbo'");

    let reordered = Urn::parse("Table[@Schema='dbo' and @Name='Orders']").unwrap();
    let rebuilt = SchemaObjectKey::from_path_expression(reordered.last()).unwrap();
    assert_eq!(rebuilt, key);
    assert_eq!(rebuilt.to_filter_expression(), filter);
}

#[test]
fn message_key_mixes_numeric_and_text_attributes() {
    let key = MessageObjectKey::new(50001, "us_english");
    let urn = Urn::parse(&format!(
        "Server[@Name='s']/UserDefinedMessage[{}]",
        key.to_filter_expression()
    ))
    .unwrap();

    assert_eq!(
        urn.last().attribute("ID"),
        Some(&AttributeValue::Number(50001))
    );
    let rebuilt = MessageObjectKey::from_path_expression(urn.last()).unwrap();
    assert_eq!(rebuilt, key);
}

#[test]
fn composite_keys_compare_field_by_field() {
    let strings = StringComparer::case_insensitive();

    let a = SchemaObjectKey::new("dbo", "zeta");
    let b = SchemaObjectKey::new("sales", "alpha");
    assert_eq!(a.compare(&b, &strings), Ordering::Less);

    let m1 = MessageObjectKey::new(50001, "us_english");
    let m2 = MessageObjectKey::new(50001, "French");
    let m3 = MessageObjectKey::new(50002, "aaa");
    assert_eq!(m1.compare(&m2, &strings), Ordering::Greater);
    assert_eq!(m1.compare(&m3, &strings), Ordering::Less);
}

#[test]
fn equality_follows_the_supplied_comparer() {
    let left = SchemaObjectKey::new("DBO", "Orders");
    let right = SchemaObjectKey::new("dbo", "ORDERS");

    assert!(left.equals(&right, &StringComparer::case_insensitive()));
    assert!(!left.equals(&right, &StringComparer::case_sensitive()));
}

#[test]
fn clones_are_detached_copies() {
    let original = SchemaObjectKey::new("dbo", "Orders");
    let copy = original.clone();

    assert_eq!(copy, original);
    assert_ne!(copy.name().as_ptr(), original.name().as_ptr());
    assert_ne!(copy.schema().as_ptr(), original.schema().as_ptr());
}

#[test]
fn missing_or_mistyped_attributes_are_malformed() {
    let missing_schema = Urn::parse("Table[@Name='Orders']").unwrap();
    assert!(matches!(
        SchemaObjectKey::from_path_expression(missing_schema.last()),
        Err(CollectionError::MalformedKey(_))
    ));

    let textual_id = Urn::parse("UserDefinedMessage[@ID='x' and @Language='en']").unwrap();
    assert!(matches!(
        MessageObjectKey::from_path_expression(textual_id.last()),
        Err(CollectionError::MalformedKey(_))
    ));
}

#[test]
fn null_keys_are_detectable() {
    assert!(SchemaObjectKey::new("", "Orders").is_null());
    assert!(SchemaObjectKey::new("dbo", "").is_null());
    assert!(MessageObjectKey::new(0, "en").is_null());
    assert!(!MessageObjectKey::new(1, "en").is_null());
}

#[test]
fn malformed_paths_are_rejected() {
    assert!(matches!(Urn::parse("   "), Err(UrnError::Empty)));
    assert!(matches!(
        Urn::parse("Login[@Name=unquoted]"),
        Err(UrnError::InvalidFilter(_))
    ));
    assert!(matches!(
        Urn::parse("Login[@Name='a' and @Name='b']"),
        Err(UrnError::DuplicateAttribute(_))
    ));
}

#[test]
fn urn_serializes_as_its_path_string() {
    let urn = Urn::parse("Server[@Name='local']/Database[@Name='main']").unwrap();
    let json = serde_json::to_string(&urn).unwrap();
    assert_eq!(json, "\"Server[@Name='local']/Database[@Name='main']\"");

    let parsed: Urn = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, urn);
    assert_eq!(parsed.parent().unwrap().to_string(), "Server[@Name='local']");
}
