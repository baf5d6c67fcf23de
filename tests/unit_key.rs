/// Unit tests for Identifier, ScopeKey and Lifetime

use ferrous_wire::{Identifier, Lifetime, ScopeKey};

#[test]
fn test_shared_identifier() {
    let id = Identifier::parse("cache");
    assert_eq!(id.raw(), "cache");
    assert_eq!(id.lifetime(), &Lifetime::Shared);
    assert!(id.is_default_scope());
    assert_eq!(id.scope_key(), Some(ScopeKey::shared("cache")));
    assert_eq!(id.to_string(), "cache");
}

#[test]
fn test_transient_identifier() {
    let id = Identifier::parse("cache@");
    assert_eq!(id.raw(), "cache");
    assert_eq!(id.lifetime(), &Lifetime::Transient);
    assert!(!id.is_default_scope());
    assert_eq!(id.scope_key(), None);
    assert_eq!(id.to_string(), "cache@");
}

#[test]
fn test_scoped_identifier() {
    let id = Identifier::parse("cache@SESSION");
    assert_eq!(id.raw(), "cache");
    assert_eq!(id.lifetime(), &Lifetime::Scoped("SESSION".to_string()));
    assert!(!id.is_default_scope());

    let key = id.scope_key().unwrap();
    assert_eq!(key.raw, "cache");
    assert_eq!(key.scope, "SESSION");
    assert_eq!(key.to_string(), "cache@SESSION");
}

#[test]
fn test_split_on_first_separator() {
    let id = Identifier::parse("cache@A@B");
    assert_eq!(id.raw(), "cache");
    assert_eq!(id.lifetime(), &Lifetime::Scoped("A@B".to_string()));
    assert_eq!(id.to_string(), "cache@A@B");
}

#[test]
fn test_scope_keys_are_distinct_per_tag() {
    let shared = Identifier::parse("a").scope_key().unwrap();
    let s = Identifier::parse("a@S").scope_key().unwrap();
    let t = Identifier::parse("a@T").scope_key().unwrap();
    assert_ne!(shared, s);
    assert_ne!(s, t);
    assert_eq!(s, Identifier::parse("a@S").scope_key().unwrap());
    assert_eq!(shared.to_string(), "a");
}

#[test]
fn test_from_str() {
    let id: Identifier = "db@REQ".parse().unwrap();
    assert_eq!(id, Identifier::parse("db@REQ"));
}

#[test]
fn test_lifetime_scope_tag() {
    assert_eq!(Lifetime::Shared.scope_tag(), Some(""));
    assert_eq!(Lifetime::Scoped("S".to_string()).scope_tag(), Some("S"));
    assert_eq!(Lifetime::Transient.scope_tag(), None);
}
