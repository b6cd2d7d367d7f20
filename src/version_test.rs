use std::cmp::Ordering;

use crate::document::Element;
use crate::CibVersion;
use crate::ErrorKind;

fn v(
    admin_epoch: i32,
    epoch: i32,
    num_updates: i32,
) -> CibVersion {
    CibVersion {
        admin_epoch,
        epoch,
        num_updates,
    }
}

#[test]
fn test_display_form() {
    assert_eq!(v(1, 0, 7).to_string(), "1:0:7");
    assert_eq!(v(-1, 2, 3).to_string(), "-1:2:3");
}

#[test]
fn test_lexicographic_order() {
    assert_eq!(v(1, 0, 0).cmp(&v(0, 99, 99)), Ordering::Greater);
    assert_eq!(v(1, 2, 0).cmp(&v(1, 1, 99)), Ordering::Greater);
    assert_eq!(v(1, 2, 3).cmp(&v(1, 2, 4)), Ordering::Less);
    assert_eq!(v(1, 2, 3).cmp(&v(1, 2, 3)), Ordering::Equal);
}

#[test]
fn test_from_root_reads_attributes() {
    let root = Element::new("cib")
        .with_attr("admin_epoch", "1")
        .with_attr("epoch", "4")
        .with_attr("num_updates", "12");
    assert_eq!(CibVersion::from_root(&root).unwrap(), v(1, 4, 12));
}

#[test]
fn test_from_root_missing_field_is_generic() {
    let root = Element::new("cib").with_attr("admin_epoch", "1").with_attr("epoch", "4");
    let err = CibVersion::from_root(&root).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Generic);
    assert!(err.message().contains("num_updates"));
}

#[test]
fn test_from_root_malformed_field_is_generic() {
    let root = Element::new("cib")
        .with_attr("admin_epoch", "1")
        .with_attr("epoch", "four")
        .with_attr("num_updates", "0");
    assert_eq!(CibVersion::from_root(&root).unwrap_err().kind(), ErrorKind::Generic);
}
