use std::iter::Rev;
use std::slice::Iter;

use crate::types::Position;

/// Stacking order for a renderer, borrowed from a slice in insertion order.
///
/// Top anchors put the newest toast first, nearest the screen edge; every
/// other anchor keeps insertion order. `Clone` the iterator to walk it again.
#[derive(Debug)]
pub enum RenderOrder<'a, T> {
    Forward(Iter<'a, T>),
    Reverse(Rev<Iter<'a, T>>),
}

pub fn render_order<T>(items: &[T], position: Position) -> RenderOrder<'_, T> {
    if position.is_top() {
        RenderOrder::Reverse(items.iter().rev())
    } else {
        RenderOrder::Forward(items.iter())
    }
}

impl<T> Clone for RenderOrder<'_, T> {
    fn clone(&self) -> Self {
        match self {
            Self::Forward(iter) => Self::Forward(iter.clone()),
            Self::Reverse(iter) => Self::Reverse(iter.clone()),
        }
    }
}

impl<'a, T> Iterator for RenderOrder<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Forward(iter) => iter.next(),
            Self::Reverse(iter) => iter.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Self::Forward(iter) => iter.size_hint(),
            Self::Reverse(iter) => iter.size_hint(),
        }
    }
}

impl<T> DoubleEndedIterator for RenderOrder<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        match self {
            Self::Forward(iter) => iter.next_back(),
            Self::Reverse(iter) => iter.next_back(),
        }
    }
}

impl<T> ExactSizeIterator for RenderOrder<'_, T> {}

#[cfg(test)]
mod tests {
    use super::render_order;
    use crate::types::Position;

    #[test]
    fn top_anchors_reverse_insertion_order() {
        let items = ["a", "b", "c"];
        for position in [Position::TopLeft, Position::TopCenter, Position::TopRight] {
            let order: Vec<_> = render_order(&items, position).copied().collect();
            assert_eq!(order, ["c", "b", "a"]);
        }
    }

    #[test]
    fn bottom_anchors_keep_insertion_order() {
        let items = ["a", "b", "c"];
        for position in [
            Position::BottomLeft,
            Position::BottomCenter,
            Position::BottomRight,
        ] {
            let order: Vec<_> = render_order(&items, position).copied().collect();
            assert_eq!(order, ["a", "b", "c"]);
        }
    }

    #[test]
    fn order_is_restartable() {
        let items = [1, 2];
        let order = render_order(&items, Position::TopRight);
        let first: Vec<_> = order.clone().collect();
        let second: Vec<_> = order.collect();
        assert_eq!(first, second);
        assert_eq!(render_order(&items, Position::TopRight).len(), 2);
    }

    #[test]
    fn empty_input_yields_nothing() {
        let items: [u8; 0] = [];
        assert_eq!(render_order(&items, Position::TopLeft).next(), None);
    }
}
