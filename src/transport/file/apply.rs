//! Mutation semantics of a file-backed CIB.
//!
//! Every function works on a scratch copy of the root; the caller commits the
//! copy only when the whole mutation succeeded.

use crate::document::Element;
use crate::transport::CallOptions;
use crate::transport::MutationOp;
use crate::version::ADMIN_EPOCH;
use crate::version::EPOCH;
use crate::version::NUM_UPDATES;
use crate::StatusCode;

const CONFIGURATION: &str = "configuration";

/// Apply `op` to `root` and advance its version
pub(super) fn apply(
    root: &mut Element,
    op: MutationOp,
    section: &str,
    payload: Element,
    options: CallOptions,
) -> Result<(), StatusCode> {
    let before = root.child(CONFIGURATION).cloned();

    match op {
        MutationOp::Create => create(root, section, payload)?,
        MutationOp::Update => update(root, section, payload, options)?,
        MutationOp::Replace => replace(root, section, payload)?,
        MutationOp::Delete => delete(root, section, &payload)?,
    }

    let configuration_changed = root.child(CONFIGURATION) != before.as_ref();
    bump_version(root, configuration_changed);
    Ok(())
}

fn create(
    root: &mut Element,
    section: &str,
    payload: Element,
) -> Result<(), StatusCode> {
    if section.is_empty() || payload.name == root.name {
        merge_into_root(root, payload);
        return Ok(());
    }

    let path = section_path(root, section)?;
    let target = node_mut(root, &path).ok_or(StatusCode::ENXIO)?;

    let additions = if payload.name == target.name {
        payload.children
    } else {
        vec![payload]
    };

    for addition in &additions {
        if target.find(&|e| e.same_object(addition)).is_some() {
            return Err(StatusCode::ENOTUNIQ);
        }
    }
    target.children.extend(additions);
    Ok(())
}

fn update(
    root: &mut Element,
    section: &str,
    mut payload: Element,
    options: CallOptions,
) -> Result<(), StatusCode> {
    let section_path = section_path(root, section)?;
    if section_path.is_empty() && payload.same_object(root) {
        strip_version(&mut payload);
    }
    let section_el = node_mut(root, &section_path).ok_or(StatusCode::ENXIO)?;

    if payload.same_object(section_el) {
        merge(section_el, payload);
        return Ok(());
    }

    let found = locate_below(section_el, &|e| e.same_object(&payload));
    match found {
        Some(path) => {
            let target = node_mut(section_el, &path).ok_or(StatusCode::ENXIO)?;
            merge(target, payload);
            Ok(())
        }
        None if options.contains(CallOptions::CAN_CREATE) => {
            section_el.children.push(payload);
            Ok(())
        }
        None => Err(StatusCode::ENXIO),
    }
}

fn replace(
    root: &mut Element,
    section: &str,
    mut payload: Element,
) -> Result<(), StatusCode> {
    if payload.same_object(root) && (section.is_empty() || section == root.name) {
        for key in [ADMIN_EPOCH, EPOCH, NUM_UPDATES] {
            match root.attr(key) {
                Some(value) => payload.set_attr(key, value),
                None => {
                    payload.attributes.remove(key);
                }
            }
        }
        *root = payload;
        return Ok(());
    }

    let section_path = section_path(root, section)?;
    let section_el = node_mut(root, &section_path).ok_or(StatusCode::ENXIO)?;

    if payload.same_object(section_el) {
        *section_el = payload;
        return Ok(());
    }

    let path = locate_below(section_el, &|e| e.same_object(&payload)).ok_or(StatusCode::ENXIO)?;
    let target = node_mut(section_el, &path).ok_or(StatusCode::ENXIO)?;
    *target = payload;
    Ok(())
}

fn delete(
    root: &mut Element,
    section: &str,
    payload: &Element,
) -> Result<(), StatusCode> {
    let section_path = section_path(root, section)?;

    if section_path.is_empty() && payload.same_object(root) {
        return Err(StatusCode::EINVAL);
    }

    let section_el = node_mut(root, &section_path).ok_or(StatusCode::ENXIO)?;

    let victims: Vec<&Element> = if payload.same_object(section_el) && !section_path.is_empty() {
        payload.children.iter().collect()
    } else {
        vec![payload]
    };

    for victim in victims {
        let path = locate_below(section_el, &|e| matches_for_delete(e, victim)).ok_or(StatusCode::ENXIO)?;
        remove_at(section_el, &path);
    }
    Ok(())
}

/// The candidate must be the same object and carry every attribute of the
/// payload with the same value
fn matches_for_delete(
    candidate: &Element,
    payload: &Element,
) -> bool {
    candidate.same_object(payload)
        && payload
            .attributes
            .iter()
            .all(|(k, v)| candidate.attr(k) == Some(v.as_str()))
}

/// Create-style merge of a whole-document payload
fn merge_into_root(
    root: &mut Element,
    payload: Element,
) {
    if payload.name == root.name {
        let mut payload = payload;
        strip_version(&mut payload);
        root.attributes.extend(payload.attributes);
        for child in payload.children {
            merge_below(root, child);
        }
    } else {
        merge_below(root, payload);
    }
}

/// Merge into the first descendant with the same identity, or append to
/// `root` when there is none
fn merge_below(
    root: &mut Element,
    child: Element,
) {
    let found = locate_below(root, &|e| e.same_object(&child));
    if let Some(path) = found {
        if let Some(existing) = node_mut(root, &path) {
            merge(existing, child);
            return;
        }
    }
    root.children.push(child);
}

/// Version attributes are owned by the store, never by a payload
fn strip_version(payload: &mut Element) {
    for key in [ADMIN_EPOCH, EPOCH, NUM_UPDATES] {
        payload.attributes.remove(key);
    }
}

fn merge_child(
    parent: &mut Element,
    child: Element,
) {
    match parent.children.iter_mut().find(|c| c.same_object(&child)) {
        Some(existing) => merge(existing, child),
        None => parent.children.push(child),
    }
}

/// Overlay `payload` onto `target`: attributes are overwritten, children are
/// merged by identity and appended when missing
fn merge(
    target: &mut Element,
    payload: Element,
) {
    target.attributes.extend(payload.attributes);
    for child in payload.children {
        merge_child(target, child);
    }
}

fn bump_version(
    root: &mut Element,
    configuration_changed: bool,
) {
    let read = |key: &str| root.attr(key).and_then(|v| v.trim().parse::<i32>().ok()).unwrap_or(0);
    let epoch = read(EPOCH);
    let num_updates = read(NUM_UPDATES);

    if configuration_changed {
        root.set_attr(EPOCH, epoch.saturating_add(1).to_string());
        root.set_attr(NUM_UPDATES, "0");
    } else {
        root.set_attr(NUM_UPDATES, num_updates.saturating_add(1).to_string());
    }
    if root.attr(ADMIN_EPOCH).is_none() {
        root.set_attr(ADMIN_EPOCH, "0");
    }
}

/// Child-index path of the section element; empty means the root
fn section_path(
    root: &Element,
    section: &str,
) -> Result<Vec<usize>, StatusCode> {
    if section.is_empty() || section == root.name {
        return Ok(Vec::new());
    }
    locate_below(root, &|e| e.name == section).ok_or(StatusCode::ENXIO)
}

/// Child-index path of the first descendant (document order) matching
/// `predicate`, excluding `element` itself
fn locate_below(
    element: &Element,
    predicate: &dyn Fn(&Element) -> bool,
) -> Option<Vec<usize>> {
    for (index, child) in element.children.iter().enumerate() {
        if predicate(child) {
            return Some(vec![index]);
        }
        if let Some(mut path) = locate_below(child, predicate) {
            path.insert(0, index);
            return Some(path);
        }
    }
    None
}

fn node_mut<'a>(
    element: &'a mut Element,
    path: &[usize],
) -> Option<&'a mut Element> {
    let mut current = element;
    for &index in path {
        current = current.children.get_mut(index)?;
    }
    Some(current)
}

fn remove_at(
    element: &mut Element,
    path: &[usize],
) {
    if let Some((last, parent_path)) = path.split_last() {
        if let Some(parent) = node_mut(element, parent_path) {
            if *last < parent.children.len() {
                parent.children.remove(*last);
            }
        }
    }
}
