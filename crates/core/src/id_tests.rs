use super::*;

crate::define_id! {
    /// Test-only id type.
    pub struct TestId;
}

#[test]
fn new_generates_uuid_shaped_id() {
    let id = TestId::new();
    assert_eq!(id.as_str().len(), 36);
    assert_eq!(id.as_str().chars().filter(|c| *c == '-').count(), 4);
}

#[test]
fn from_string_round_trips() {
    let id = TestId::from_string("abc-123");
    assert_eq!(id.as_str(), "abc-123");
    assert_eq!(id, "abc-123");
}

#[test]
fn distinct_ids_are_not_equal() {
    assert_ne!(TestId::new(), TestId::new());
}

#[test]
fn idbuf_rejects_oversized_debug_assert() {
    let s = "x".repeat(ID_MAX_LEN);
    let buf = IdBuf::new(&s);
    assert_eq!(buf.as_str(), s);
}

#[test]
fn short_truncates() {
    assert_eq!(short("abcdef", 3), "abc");
    assert_eq!(short("ab", 3), "ab");
}

#[test]
fn ids_sort_as_btreemap_keys_in_string_order() {
    let mut map = std::collections::BTreeMap::new();
    map.insert(TestId::from_string("b"), 2);
    map.insert(TestId::from_string("a"), 1);
    map.insert(TestId::from_string("c"), 3);

    let keys: Vec<&str> = map.keys().map(TestId::as_str).collect();
    assert_eq!(keys, vec!["a", "b", "c"]);
}
