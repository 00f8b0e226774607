//! Positional reordering helpers.
//!
//! # Responsibility
//! - Move one element of a sequence to a new position.
//! - Rewrite `order` fields so they match positions densely.
//!
//! # Invariants
//! - After `reorder`/`renumber`, `order` values are exactly `0..len`.
//! - Relative order of untouched elements is preserved.

use crate::model::Ordered;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// An index did not address a valid position in the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexOutOfRange {
    pub index: usize,
    pub len: usize,
}

impl Display for IndexOutOfRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "index {} is out of range for sequence of length {}",
            self.index, self.len
        )
    }
}

impl Error for IndexOutOfRange {}

/// Moves the element at `from_index` so it ends up at `to_index`.
///
/// `from_index` must address an element. `to_index` may equal the sequence
/// length, which appends.
pub fn move_index<T>(
    items: &mut Vec<T>,
    from_index: usize,
    to_index: usize,
) -> Result<(), IndexOutOfRange> {
    let len = items.len();
    if from_index >= len {
        return Err(IndexOutOfRange {
            index: from_index,
            len,
        });
    }
    if to_index > len {
        return Err(IndexOutOfRange {
            index: to_index,
            len,
        });
    }

    let item = items.remove(from_index);
    let insert_at = to_index.min(items.len());
    items.insert(insert_at, item);
    Ok(())
}

/// Returns a reordered copy of `sequence` with dense `order` values.
pub fn reorder<T: Ordered + Clone>(
    sequence: &[T],
    from_index: usize,
    to_index: usize,
) -> Result<Vec<T>, IndexOutOfRange> {
    let mut result = sequence.to_vec();
    move_index(&mut result, from_index, to_index)?;
    renumber(&mut result);
    Ok(result)
}

/// Rewrites every element's `order` to its position.
pub fn renumber<T: Ordered>(items: &mut [T]) {
    for (index, item) in items.iter_mut().enumerate() {
        item.set_order(index);
    }
}

/// Returns `0` for an empty sequence, else `1 + max(order)`.
///
/// Looks at the maximum rather than the count so existing gaps never cause a
/// duplicate rank.
pub fn next_order<'a, T, I>(sequence: I) -> usize
where
    T: Ordered + 'a,
    I: IntoIterator<Item = &'a T>,
{
    sequence
        .into_iter()
        .map(Ordered::order)
        .max()
        .map_or(0, |max| max + 1)
}

/// Stable sort by `order`; ties keep their storage order.
pub fn sort_by_order<T: Ordered>(items: &mut [T]) {
    items.sort_by_key(Ordered::order);
}

#[cfg(test)]
mod tests {
    use super::{move_index, next_order, renumber, reorder, IndexOutOfRange};
    use crate::model::Ordered;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Item {
        name: &'static str,
        order: usize,
    }

    impl Ordered for Item {
        fn order(&self) -> usize {
            self.order
        }

        fn set_order(&mut self, order: usize) {
            self.order = order;
        }
    }

    fn items(names: &[&'static str]) -> Vec<Item> {
        names
            .iter()
            .enumerate()
            .map(|(order, name)| Item { name, order })
            .collect()
    }

    fn names(items: &[Item]) -> Vec<&'static str> {
        items.iter().map(|item| item.name).collect()
    }

    fn orders(items: &[Item]) -> Vec<usize> {
        items.iter().map(|item| item.order).collect()
    }

    #[test]
    fn reorder_same_index_is_identity() {
        let sequence = items(&["a", "b", "c"]);
        for index in 0..sequence.len() {
            let result = reorder(&sequence, index, index).expect("valid indices");
            assert_eq!(result, sequence);
        }
    }

    #[test]
    fn reorder_moves_forward_and_backward() {
        let sequence = items(&["a", "b", "c", "d"]);

        let forward = reorder(&sequence, 0, 2).expect("valid indices");
        assert_eq!(names(&forward), vec!["b", "c", "a", "d"]);
        assert_eq!(orders(&forward), vec![0, 1, 2, 3]);

        let backward = reorder(&sequence, 3, 1).expect("valid indices");
        assert_eq!(names(&backward), vec!["a", "d", "b", "c"]);
        assert_eq!(orders(&backward), vec![0, 1, 2, 3]);
    }

    #[test]
    fn reorder_to_length_appends() {
        let sequence = items(&["a", "b", "c"]);
        let result = reorder(&sequence, 0, 3).expect("length is a valid target");
        assert_eq!(names(&result), vec!["b", "c", "a"]);
    }

    #[test]
    fn reorder_rejects_out_of_range_indices() {
        let sequence = items(&["a", "b"]);
        assert_eq!(
            reorder(&sequence, 2, 0),
            Err(IndexOutOfRange { index: 2, len: 2 })
        );
        assert_eq!(
            reorder(&sequence, 0, 3),
            Err(IndexOutOfRange { index: 3, len: 2 })
        );
    }

    #[test]
    fn reorder_does_not_mutate_input() {
        let sequence = items(&["a", "b", "c"]);
        let _ = reorder(&sequence, 2, 0).expect("valid indices");
        assert_eq!(names(&sequence), vec!["a", "b", "c"]);
    }

    #[test]
    fn move_index_on_empty_vec_fails() {
        let mut empty: Vec<u8> = Vec::new();
        assert!(move_index(&mut empty, 0, 0).is_err());
    }

    #[test]
    fn renumber_closes_gaps() {
        let mut sequence = vec![
            Item { name: "a", order: 3 },
            Item { name: "b", order: 7 },
            Item { name: "c", order: 9 },
        ];
        renumber(&mut sequence);
        assert_eq!(orders(&sequence), vec![0, 1, 2]);
    }

    #[test]
    fn next_order_uses_max_not_count() {
        assert_eq!(next_order::<Item, _>(&[]), 0);

        let gapped = vec![Item { name: "a", order: 0 }, Item { name: "b", order: 5 }];
        assert_eq!(next_order(&gapped), 6);
    }
}
