//! Unit tests for alteration inverses.

use crate::store::domain::{Alteration, FieldKind, FieldSpec, IndexSpec};
use rstest::rstest;

#[test]
fn add_field_inverts_to_drop_field() {
    let add = Alteration::AddField {
        collection: "users".to_owned(),
        field: FieldSpec::new("nickname", FieldKind::Text { max_len: None }),
    };

    assert_eq!(
        add.inverse(),
        Some(Alteration::DropField {
            collection: "users".to_owned(),
            field: "nickname".to_owned(),
        })
    );
}

#[test]
fn resize_inverts_by_swapping_lengths() {
    let resize = Alteration::ResizeField {
        collection: "users".to_owned(),
        field: "email".to_owned(),
        from: 100,
        to: 254,
    };

    assert_eq!(
        resize.inverse(),
        Some(Alteration::ResizeField {
            collection: "users".to_owned(),
            field: "email".to_owned(),
            from: 254,
            to: 100,
        })
    );
}

#[test]
fn add_index_inverts_to_drop_index() {
    let add = Alteration::AddIndex {
        collection: "users".to_owned(),
        index: IndexSpec::new("users_email_idx", ["email"]).unique(),
    };

    assert_eq!(
        add.inverse(),
        Some(Alteration::DropIndex {
            collection: "users".to_owned(),
            index: "users_email_idx".to_owned(),
        })
    );
}

#[rstest]
#[case(Alteration::DropField { collection: "users".to_owned(), field: "email".to_owned() })]
#[case(Alteration::DropIndex {
    collection: "users".to_owned(),
    index: "users_email_idx".to_owned(),
})]
fn drops_have_no_derivable_inverse(#[case] alteration: Alteration) {
    assert_eq!(alteration.inverse(), None);
}

#[test]
fn display_names_collection_and_target() {
    let add = Alteration::AddField {
        collection: "users".to_owned(),
        field: FieldSpec::text("nickname", 32),
    };

    assert_eq!(add.to_string(), "add field users.nickname");
    assert_eq!(add.collection(), "users");
}
