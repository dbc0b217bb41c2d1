//! Position sequencing for ordered columns and cards.
//!
//! Positions are plain integers. Whenever a list is materially reordered it is
//! renumbered `1..=N` in list order, so positions never drift apart and no
//! fractional values accumulate. All functions are pure; callers persist the
//! resulting positions.

use crate::types::{Card, CardId, Column, ColumnId};
use serde::{Deserialize, Serialize};

/// Anything that carries an id and an integer position
pub trait Positioned {
    type Id: Clone;

    fn id(&self) -> &Self::Id;
    fn position(&self) -> i64;
    fn set_position(&mut self, position: i64);
}

impl Positioned for Column {
    type Id = ColumnId;

    fn id(&self) -> &ColumnId {
        &self.id
    }

    fn position(&self) -> i64 {
        self.position
    }

    fn set_position(&mut self, position: i64) {
        self.position = position;
    }
}

impl Positioned for Card {
    type Id = CardId;

    fn id(&self) -> &CardId {
        &self.id
    }

    fn position(&self) -> i64 {
        self.position
    }

    fn set_position(&mut self, position: i64) {
        self.position = position;
    }
}

/// An `{id, position}` pair to be written back to the record service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionUpdate<I> {
    pub id: I,
    pub position: i64,
}

impl<I> PositionUpdate<I> {
    pub fn new(id: impl Into<I>, position: i64) -> Self {
        Self {
            id: id.into(),
            position,
        }
    }
}

impl<I: Clone> Positioned for PositionUpdate<I> {
    type Id = I;

    fn id(&self) -> &I {
        &self.id
    }

    fn position(&self) -> i64 {
        self.position
    }

    fn set_position(&mut self, position: i64) {
        self.position = position;
    }
}

/// Assign `position = index + 1` to every element in list order
pub fn renumber<T: Positioned>(list: &mut [T]) {
    for (i, item) in list.iter_mut().enumerate() {
        item.set_position(i as i64 + 1);
    }
}

/// Move the element at `from` to `to`, then renumber the whole list.
///
/// Returns the input unchanged when `from == to` or either index is out of range.
pub fn move_within_list<T: Positioned>(mut list: Vec<T>, from: usize, to: usize) -> Vec<T> {
    if from == to || from >= list.len() || to >= list.len() {
        return list;
    }
    let item = list.remove(from);
    list.insert(to, item);
    renumber(&mut list);
    list
}

/// Position for a new element appended after `list`: `max(existing, 0) + 1`.
///
/// `None` when the highest position is already `i64::MAX`.
pub fn append_at<T: Positioned>(list: &[T]) -> Option<i64> {
    last_position(list).checked_add(1)
}

/// Highest position in `list`, or 0 when it is empty or all non-positive
pub fn last_position<T: Positioned>(list: &[T]) -> i64 {
    list.iter().map(|item| item.position()).max().unwrap_or(0).max(0)
}

/// Insert `element` at `index` (clamped to `0..=len`), then renumber the whole list
pub fn insert_at_index<T: Positioned>(mut list: Vec<T>, element: T, index: usize) -> Vec<T> {
    let index = index.min(list.len());
    list.insert(index, element);
    renumber(&mut list);
    list
}

/// Project a list onto the `{id, position}` pairs to persist
pub fn position_updates<T: Positioned>(list: &[T]) -> Vec<PositionUpdate<T::Id>> {
    list.iter()
        .map(|item| PositionUpdate {
            id: item.id().clone(),
            position: item.position(),
        })
        .collect()
}

/// Pairs whose position differs from the one currently stored in `before`
pub fn changed_positions<T: Positioned>(
    before: &[T],
    after: &[PositionUpdate<T::Id>],
) -> Vec<PositionUpdate<T::Id>>
where
    T::Id: PartialEq,
{
    after
        .iter()
        .filter(|update| {
            before
                .iter()
                .find(|item| item.id() == &update.id)
                .map(|item| item.position() != update.position)
                .unwrap_or(true)
        })
        .cloned()
        .collect()
}
