use objmodel_core::{
    CollectionError, IdObjectKey, KeyComparer, KeyedStorage, SimpleObjectKey, StringComparer,
};

fn case_insensitive() -> KeyedStorage<SimpleObjectKey, u32> {
    KeyedStorage::new(KeyComparer::new(StringComparer::case_insensitive()))
}

#[test]
fn traversal_follows_comparer_order_not_insert_order() {
    let mut storage = case_insensitive();
    for (index, name) in ["delta", "Alpha", "charlie", "BRAVO"].iter().enumerate() {
        storage
            .insert(SimpleObjectKey::new(*name), index as u32)
            .unwrap();
    }

    let names: Vec<&str> = storage.keys().map(SimpleObjectKey::name).collect();
    assert_eq!(names, vec!["Alpha", "BRAVO", "charlie", "delta"]);
    assert_eq!(storage.len(), 4);
    assert_eq!(*storage.by_position(0).unwrap(), 1);
}

#[test]
fn case_sensitive_comparer_keeps_case_variants_apart() {
    let mut storage: KeyedStorage<SimpleObjectKey, u32> =
        KeyedStorage::new(KeyComparer::new(StringComparer::case_sensitive()));
    storage.insert(SimpleObjectKey::new("name"), 1).unwrap();
    storage.insert(SimpleObjectKey::new("NAME"), 2).unwrap();

    assert_eq!(storage.len(), 2);
    assert_eq!(*storage.lookup(&SimpleObjectKey::new("NAME")).unwrap(), 2);
    assert!(storage.try_lookup(&SimpleObjectKey::new("Name")).is_none());
}

#[test]
fn case_insensitive_comparer_treats_case_variants_as_duplicates() {
    let mut storage = case_insensitive();
    storage.insert(SimpleObjectKey::new("name"), 1).unwrap();

    let err = storage.insert(SimpleObjectKey::new("NAME"), 2).unwrap_err();
    assert!(matches!(err, CollectionError::DuplicateKey(_)));
    assert_eq!(*storage.lookup(&SimpleObjectKey::new("Name")).unwrap(), 1);
}

#[test]
fn trailing_spaces_are_ignored_when_configured() {
    let comparer = StringComparer::case_insensitive().ignoring_trailing_spaces(true);
    let mut storage: KeyedStorage<SimpleObjectKey, u32> =
        KeyedStorage::new(KeyComparer::new(comparer));
    storage.insert(SimpleObjectKey::new("orders"), 1).unwrap();

    assert!(storage.contains_key(&SimpleObjectKey::new("orders   ")));
}

#[test]
fn lookup_and_remove_misses_are_not_found() {
    let mut storage = case_insensitive();
    storage.insert(SimpleObjectKey::new("present"), 1).unwrap();

    assert!(matches!(
        storage.lookup(&SimpleObjectKey::new("absent")),
        Err(CollectionError::NotFound(_))
    ));
    assert!(matches!(
        storage.remove(&SimpleObjectKey::new("absent")),
        Err(CollectionError::NotFound(_))
    ));
    assert_eq!(storage.len(), 1);
}

#[test]
fn positional_access_is_bounded() {
    let mut storage = case_insensitive();
    storage.insert(SimpleObjectKey::new("only"), 7).unwrap();

    assert_eq!(*storage.by_position(0).unwrap(), 7);
    assert!(matches!(
        storage.by_position(1),
        Err(CollectionError::IndexOutOfRange { index: 1, count: 1 })
    ));
}

#[test]
fn null_keys_are_never_stored() {
    let mut storage: KeyedStorage<IdObjectKey, &str> =
        KeyedStorage::new(KeyComparer::new(StringComparer::default()));

    assert!(matches!(
        storage.insert(IdObjectKey::new(0), "zero"),
        Err(CollectionError::InvalidKey(_))
    ));
    assert!(storage.is_empty());
}

#[test]
fn numeric_keys_order_numerically() {
    let mut storage: KeyedStorage<IdObjectKey, &str> =
        KeyedStorage::new(KeyComparer::new(StringComparer::default()));
    storage.insert(IdObjectKey::new(10), "ten").unwrap();
    storage.insert(IdObjectKey::new(9), "nine").unwrap();
    storage.insert(IdObjectKey::new(100), "hundred").unwrap();

    let ordered: Vec<&&str> = storage.iter().collect();
    assert_eq!(ordered, vec![&"nine", &"ten", &"hundred"]);
}

#[test]
fn cursor_detects_structural_change() {
    let mut storage = case_insensitive();
    storage.insert(SimpleObjectKey::new("a"), 1).unwrap();
    storage.insert(SimpleObjectKey::new("b"), 2).unwrap();

    let mut cursor = storage.cursor();
    assert_eq!(storage.advance(&mut cursor).unwrap(), Some(&1));

    storage.insert(SimpleObjectKey::new("c"), 3).unwrap();
    assert!(matches!(
        storage.advance(&mut cursor),
        Err(CollectionError::ConcurrentModification { .. })
    ));
}

#[test]
fn cursor_runs_to_exhaustion_without_changes() {
    let mut storage = case_insensitive();
    storage.insert(SimpleObjectKey::new("b"), 2).unwrap();
    storage.insert(SimpleObjectKey::new("a"), 1).unwrap();

    let mut cursor = storage.cursor();
    let mut seen = Vec::new();
    while let Some(value) = storage.advance(&mut cursor).unwrap() {
        seen.push(*value);
    }
    assert_eq!(seen, vec![1, 2]);
    assert_eq!(cursor.position(), 2);
}
