//! Alphabetical ordering by identity.

use crate::record::Record;

/// Quicksort by identity.
/// The middle element is the pivot; the rest is split into `<= pivot` and
/// `> pivot` and each side is sorted in turn. Identities are unique, so the
/// order is total.
pub fn sort_by_identity<'a>(mut records: Vec<&'a Record>) -> Vec<&'a Record> {
    quicksort(&mut records);
    records
}

/// Recurses into the smaller partition and loops on the larger one, so the
/// stack depth stays logarithmic whatever the input order.
fn quicksort(mut slice: &mut [&Record]) {
    while slice.len() > 1 {
        let pivot = partition(slice);
        let (lower, upper) = std::mem::take(&mut slice).split_at_mut(pivot);
        let upper = &mut upper[1..];

        if lower.len() < upper.len() {
            quicksort(lower);
            slice = upper;
        } else {
            quicksort(upper);
            slice = lower;
        }
    }
}

/// Moves the pivot to its final index and returns it.
fn partition(slice: &mut [&Record]) -> usize {
    let last = slice.len() - 1;
    slice.swap(slice.len() / 2, last);

    let mut boundary = 0;
    for i in 0..last {
        if slice[i].identity() <= slice[last].identity() {
            slice.swap(i, boundary);
            boundary += 1;
        }
    }
    slice.swap(boundary, last);
    boundary
}
