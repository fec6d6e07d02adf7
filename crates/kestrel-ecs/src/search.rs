//! Hybrid search over key-ordered sequences.
//!
//! The entity registry keeps its records ordered by ID, so lookups can
//! binary-search most of the way and finish with a short linear scan once
//! the candidate window is small. For the window sizes involved the linear
//! tail is cheaper than driving the bisection all the way down.

use std::cmp::Ordering;

/// Window size at which bisection hands off to a linear scan.
const LINEAR_SCAN_WINDOW: usize = 5;

/// Locate the element of `items` whose key equals `target`.
///
/// `items` must be sorted ascending by the key that `key_of` extracts.
/// Returns the element's index, or `None` if no key matches.
pub fn hybrid_search<T, K, F>(items: &[T], target: &K, key_of: F) -> Option<usize>
where
    K: Ord,
    F: Fn(&T) -> K,
{
    if items.is_empty() {
        return None;
    }

    let mut first = 0usize;
    let mut last = items.len() - 1;

    loop {
        if last - first <= LINEAR_SCAN_WINDOW {
            return items[first..=last]
                .iter()
                .position(|item| key_of(item) == *target)
                .map(|offset| first + offset);
        }

        // Window is wide enough that middle-1 / middle+1 stay inside it.
        let middle = (first + last) / 2;
        match key_of(&items[middle]).cmp(target) {
            Ordering::Equal => return Some(middle),
            Ordering::Greater => last = middle - 1,
            Ordering::Less => first = middle + 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
