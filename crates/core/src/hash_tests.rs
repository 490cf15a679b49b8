use super::*;
use serde::Serialize;

#[derive(Serialize)]
struct Sample {
    b: u32,
    a: String,
}

#[test]
fn hash_is_stable_across_field_order() {
    #[derive(Serialize)]
    struct Reordered {
        a: String,
        b: u32,
    }

    let s1 = Sample { b: 1, a: "x".into() };
    let s2 = Reordered { a: "x".into(), b: 1 };
    assert_eq!(canonical_hash(&s1), canonical_hash(&s2));
}

#[test]
fn hash_changes_with_content() {
    let s1 = Sample { b: 1, a: "x".into() };
    let s2 = Sample { b: 2, a: "x".into() };
    assert_ne!(canonical_hash(&s1), canonical_hash(&s2));
}

#[test]
fn hash_is_64_hex_chars() {
    let h = canonical_hash(&Sample { b: 1, a: "x".into() });
    assert_eq!(h.len(), 64);
    assert!(h.chars().all(|c| c.is_ascii_hexdigit()));
}
