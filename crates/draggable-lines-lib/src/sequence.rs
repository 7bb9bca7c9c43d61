//! Pure index arithmetic over flat and nested sequences
//!
//! None of these functions mutate their input: they return a new [`Geometry`] in which
//! only the addressed part differs. An index whose depth does not match the geometry, or
//! which is out of range, is a caller bug and panics.

use crate::{Geometry, PolylineIndex};

/// Return the element at `idx`
///
/// # Panics
/// If the index depth does not match the geometry or the index is out of range.
pub fn read_at<T>(geometry: &Geometry<T>, idx: PolylineIndex) -> &T {
    let part = part_for(geometry, idx);
    let position = idx.position();
    assert!(
        position < part.len(),
        "index {position} out of range for part of length {}",
        part.len()
    );
    &part[position]
}

/// Return a copy of `geometry` with `item` inserted before `idx`
///
/// The innermost position may equal the part length, which appends.
///
/// # Panics
/// If the index depth does not match the geometry or the index is out of range.
pub fn insert_at<T: Clone>(geometry: &Geometry<T>, item: T, idx: PolylineIndex) -> Geometry<T> {
    replace_part(geometry, idx, |part, position| {
        assert!(
            position <= part.len(),
            "insert index {position} out of range for part of length {}",
            part.len()
        );
        let mut result = Vec::with_capacity(part.len() + 1);
        result.extend_from_slice(&part[..position]);
        result.push(item);
        result.extend_from_slice(&part[position..]);
        result
    })
}

/// Return a copy of `geometry` with the element at `idx` overwritten by `item`
///
/// # Panics
/// If the index depth does not match the geometry or the index is out of range.
pub fn update_at<T: Clone>(geometry: &Geometry<T>, item: T, idx: PolylineIndex) -> Geometry<T> {
    replace_part(geometry, idx, |part, position| {
        assert!(
            position < part.len(),
            "update index {position} out of range for part of length {}",
            part.len()
        );
        let mut result = part.to_vec();
        result[position] = item;
        result
    })
}

/// Return a copy of `geometry` with the element at `idx` removed
///
/// # Panics
/// If the index depth does not match the geometry or the index is out of range.
pub fn remove_at<T: Clone>(geometry: &Geometry<T>, idx: PolylineIndex) -> Geometry<T> {
    replace_part(geometry, idx, |part, position| {
        assert!(
            position < part.len(),
            "remove index {position} out of range for part of length {}",
            part.len()
        );
        let mut result = Vec::with_capacity(part.len() - 1);
        result.extend_from_slice(&part[..position]);
        result.extend_from_slice(&part[position + 1..]);
        result
    })
}

fn part_for<T>(geometry: &Geometry<T>, idx: PolylineIndex) -> &[T] {
    match (geometry, idx) {
        (Geometry::Flat(items), PolylineIndex::Flat(_)) => items,
        (Geometry::Nested(parts), PolylineIndex::Nested(part, _)) => {
            assert!(
                part < parts.len(),
                "part index {part} out of range for geometry with {} parts",
                parts.len()
            );
            &parts[part]
        }
        _ => panic!("index {idx:?} does not match the nesting depth of the geometry"),
    }
}

/// Rebuild the addressed part with `edit`, cloning every other part unchanged
fn replace_part<T: Clone>(
    geometry: &Geometry<T>,
    idx: PolylineIndex,
    edit: impl FnOnce(&[T], usize) -> Vec<T>,
) -> Geometry<T> {
    let position = idx.position();
    match (geometry, idx) {
        (Geometry::Flat(items), PolylineIndex::Flat(_)) => Geometry::Flat(edit(items, position)),
        (Geometry::Nested(parts), PolylineIndex::Nested(part, _)) => {
            assert!(
                part < parts.len(),
                "part index {part} out of range for geometry with {} parts",
                parts.len()
            );
            let mut result = parts.clone();
            result[part] = edit(&parts[part], position);
            Geometry::Nested(result)
        }
        _ => panic!("index {idx:?} does not match the nesting depth of the geometry"),
    }
}
