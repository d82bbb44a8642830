//! Static scoring of positions at the search horizon

use crate::board::{Board, Cell, GameOutcome, Player};
use crate::CONNECT;

/// The score of a win on an empty board; wins lose a point per move played
pub const WIN_SCORE: i32 = 100_000;

/// Bound above any reachable score, used as the initial search window
pub const SCORE_INF: i32 = 1_000_000;

/// Score of a terminal win for the perspective player after `num_moves` moves
pub fn win_score(num_moves: usize) -> i32 {
    WIN_SCORE - num_moves as i32
}

/// Heuristic weights for scoring a position
///
/// `own[n]` scores a window holding `n` of the perspective player's pieces and
/// nothing of the opponent's, `opponent[n]` the reverse. Windows holding
/// pieces of both players can no longer be completed and score nothing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Evaluator {
    pub own: [i32; CONNECT],
    pub opponent: [i32; CONNECT],
    pub center: i32,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self {
            own: [0, 1, 4, 10],
            opponent: [0, -1, -4, -8],
            center: 6,
        }
    }
}

impl Evaluator {
    /// Scores `board` for `perspective`: positive favours `perspective`,
    /// negative favours its opponent
    pub fn evaluate(&self, board: &Board, perspective: Player) -> i32 {
        match board.outcome() {
            GameOutcome::Draw => 0,
            GameOutcome::Ongoing => self.heuristic(board, perspective),
            outcome => {
                let score = win_score(board.num_moves());
                if outcome.winner() == Some(perspective) {
                    score
                } else {
                    -score
                }
            }
        }
    }

    fn heuristic(&self, board: &Board, perspective: Player) -> i32 {
        let own_cell = perspective.cell();
        let mut score = 0;

        // center column pieces take part in the most alignments
        let center = board.center_column();
        for row in 0..board.height() {
            match board.cell(row, center) {
                Cell::Empty => {}
                cell if cell == own_cell => score += self.center,
                _ => score -= self.center,
            }
        }

        let (height, width) = (board.height() as isize, board.width() as isize);
        let reach = CONNECT as isize - 1;
        for row in 0..height {
            for column in 0..width {
                // each window is counted once, from its first cell
                for &(dy, dx) in [(0isize, 1isize), (1, 0), (1, 1), (-1, 1)].iter() {
                    let (end_y, end_x) = (row + dy * reach, column + dx * reach);
                    if end_y < 0 || end_y >= height || end_x >= width {
                        continue;
                    }
                    score += self.window(board, own_cell, (row, column), (dy, dx));
                }
            }
        }

        score
    }

    fn window(&self, board: &Board, own_cell: Cell, start: (isize, isize), step: (isize, isize)) -> i32 {
        let (mut own, mut opponent) = (0, 0);
        for i in 0..CONNECT as isize {
            let cell = board.cell((start.0 + step.0 * i) as usize, (start.1 + step.1 * i) as usize);
            match cell {
                Cell::Empty => {}
                cell if cell == own_cell => own += 1,
                _ => opponent += 1,
            }
        }

        match (own, opponent) {
            (0, 0) => 0,
            // a complete window only exists in a terminal position
            (own, 0) => self.own[own.min(CONNECT - 1)],
            (0, opponent) => self.opponent[opponent.min(CONNECT - 1)],
            _ => 0,
        }
    }
}
