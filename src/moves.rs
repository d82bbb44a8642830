//! Legal move generation

use crate::{
    board::{self, Board},
    MAX_WIDTH,
};

/// The order in which columns are offered to the search
///
/// Ordering affects how much alpha-beta can prune, never the search result.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MoveOrder {
    /// `board::center_column` first, then alternating outwards (right, then left)
    CenterFirst,
    /// Left to right
    Ascending,
}

impl Default for MoveOrder {
    fn default() -> Self {
        MoveOrder::CenterFirst
    }
}

/// Orders the columns of a `width`-wide board from the middle outwards, as
/// the middle columns are often better moves
pub fn center_first(width: usize) -> impl Iterator<Item = usize> {
    let middle = board::center_column(width);
    (0..width).map(move |i| middle + (i % 2) * (i / 2 + 1) - (1 - i % 2) * (i / 2))
}

/// A fixed-capacity list of columns, owned so the board stays free to mutate
/// while the moves are walked
#[derive(Copy, Clone, Debug)]
pub struct LegalMoves {
    size: usize,
    next: usize,
    moves: [usize; MAX_WIDTH],
}

impl LegalMoves {
    fn new() -> Self {
        Self {
            size: 0,
            next: 0,
            moves: [0; MAX_WIDTH],
        }
    }

    fn push(&mut self, column: usize) {
        self.moves[self.size] = column;
        self.size += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.size == self.next
    }
}

impl Iterator for LegalMoves {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next == self.size {
            return None;
        }
        self.next += 1;
        Some(self.moves[self.next - 1])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.size - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for LegalMoves {}

/// Enumerates the playable columns of a board in a fixed order
#[derive(Copy, Clone, Debug)]
pub struct MoveGenerator {
    width: usize,
    order: [usize; MAX_WIDTH],
}

impl MoveGenerator {
    pub fn new(width: usize, move_order: MoveOrder) -> Self {
        let mut order = [0; MAX_WIDTH];
        match move_order {
            MoveOrder::CenterFirst => {
                for (slot, column) in order.iter_mut().zip(center_first(width)) {
                    *slot = column;
                }
            }
            MoveOrder::Ascending => {
                for (slot, column) in order.iter_mut().zip(0..width) {
                    *slot = column;
                }
            }
        }
        Self { width, order }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// The columns of `board` with at least one open row, in generation order
    pub fn legal_moves(&self, board: &Board) -> LegalMoves {
        debug_assert_eq!(board.width(), self.width);

        let mut moves = LegalMoves::new();
        for &column in self.order[..self.width].iter() {
            if board.playable(column) {
                moves.push(column);
            }
        }
        moves
    }
}

/// The legal moves of `board` in ascending column order
pub fn legal_moves(board: &Board) -> LegalMoves {
    MoveGenerator::new(board.width(), MoveOrder::Ascending).legal_moves(board)
}
