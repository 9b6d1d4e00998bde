//! Identity Tests
//!
//! A reference's type, id and identifier are fixed at construction.

use crate::common::*;
use proptest::prelude::*;

#[test]
fn type_and_id_are_stable() {
    let (store, _) = memory_store();
    let reference = store.get_reference("user", "1");

    for _ in 0..3 {
        assert_eq!(reference.record_type(), "user");
        assert_eq!(reference.id().as_deref(), Some("1"));
    }
}

#[test]
fn identifier_is_the_store_identifier() {
    let (store, _) = memory_store();
    let reference = store.get_reference("user", "1");
    let identifier = store.identifier_for("user", Some("1"));

    assert!(reference.identifier().ptr_eq(&identifier));
}

#[test]
fn record_reference_resolves_by_identity() {
    let (store, _) = memory_store();
    assert_eq!(
        store.get_reference("user", "1").remote_type(),
        RemoteType::Identity
    );
}

#[test]
fn two_references_share_one_identifier() {
    let (store, _) = memory_store();
    let a = store.get_reference("user", "1");
    let b = store.get_reference("user", "1");

    assert_ne!(a.key(), b.key());
    assert!(a.identifier().ptr_eq(&b.identifier()));
}

#[test]
fn different_ids_are_different_identities() {
    let (store, _) = memory_store();
    let a = store.get_reference("user", "1");
    let b = store.get_reference("user", "2");
    let c = store.get_reference("post", "1");

    assert_ne!(a.identifier(), b.identifier());
    assert_ne!(a.identifier(), c.identifier());
}

#[test]
fn references_from_different_stores_do_not_share_identity() {
    let (first, _) = memory_store();
    let (second, _) = memory_store();
    let a = first.get_reference("user", "1");
    let b = second.get_reference("user", "1");

    assert!(!a.identifier().ptr_eq(&b.identifier()));
}

proptest! {
    #[test]
    fn reference_reports_what_it_was_built_with(
        record_type in "[a-z][a-z-]{0,11}",
        id in "[0-9a-f]{1,12}",
    ) {
        let (store, _) = memory_store();
        let reference = store.get_reference(&record_type, &id);
        let again = store.get_reference(&record_type, &id);

        prop_assert_eq!(reference.record_type(), record_type);
        prop_assert_eq!(reference.id(), Some(id));
        prop_assert!(reference.identifier().ptr_eq(&again.identifier()));
    }
}
