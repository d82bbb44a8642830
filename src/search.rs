//! A depth-limited agent to play the game of Connect 4

use log::{debug, error};

use std::time::{Duration, Instant};

use crate::{
    board::{Board, GameOutcome, Player},
    error::{InvalidMoveError, SearchError},
    evaluator::{Evaluator, SCORE_INF},
    moves::{MoveGenerator, MoveOrder},
};

/// The move chosen by a search and the score it was given
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SearchResult {
    /// Zero-indexed column to play
    pub column: usize,
    /// Value of the position after `column`, from the searching player's perspective
    pub score: i32,
    /// Nodes visited to produce this result
    pub nodes: usize,
}

/// An agent choosing moves with a fixed-depth Minimax search
///
/// # Notes
/// Scores are always taken from the perspective of the player the search was
/// started for; only the maximizing/minimizing role alternates between plies.
/// The board is mutated in place with `drop`/`undo` and is returned in the
/// same state it was passed in.
///
/// When several moves share the best score the first one in generation order
/// is chosen, so repeated searches of a position always agree.
#[derive(Clone, Debug)]
pub struct Searcher {
    move_order: MoveOrder,
    evaluator: Evaluator,

    /// The number of nodes searched by this `Searcher` so far (for diagnostics only)
    pub node_count: usize,
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new(MoveOrder::default())
    }
}

impl Searcher {
    /// Creates a new `Searcher` with the default evaluation weights
    pub fn new(move_order: MoveOrder) -> Self {
        Self {
            move_order,
            evaluator: Evaluator::default(),
            node_count: 0,
        }
    }

    /// Replaces the evaluation weights of an existing `Searcher`
    pub fn with_evaluator(mut self, evaluator: Evaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn move_order(&self) -> MoveOrder {
        self.move_order
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    /// Finds the best move for `player` looking `depth` plies ahead, with
    /// alpha-beta pruning
    pub fn best_move(
        &mut self,
        board: &mut Board,
        player: Player,
        depth: u32,
    ) -> Result<SearchResult, SearchError> {
        self.timed_best_move(board, player, depth).map(|(found, _)| found)
    }

    /// Like `best_move`, also returning the wall-clock time of the search alone
    ///
    /// The clock stops before the result is logged.
    pub fn timed_best_move(
        &mut self,
        board: &mut Board,
        player: Player,
        depth: u32,
    ) -> Result<(SearchResult, Duration), SearchError> {
        let start = Instant::now();
        let result = self.top_level_search(board, player, depth, true);
        let elapsed = start.elapsed();

        self.log_result(player, depth, &result);
        result.map(|found| (found, elapsed))
    }

    /// Finds the best move for `player` with a plain minimax search of every
    /// node to `depth` plies
    pub fn best_move_unpruned(
        &mut self,
        board: &mut Board,
        player: Player,
        depth: u32,
    ) -> Result<SearchResult, SearchError> {
        let result = self.top_level_search(board, player, depth, false);
        self.log_result(player, depth, &result);
        result
    }

    /// Scores `board` with an alpha-beta search
    ///
    /// `maximizing` tells whether `perspective` is the player to move;
    /// otherwise its opponent moves and minimizes the score.
    pub fn search(
        &mut self,
        board: &mut Board,
        depth: u32,
        alpha: i32,
        beta: i32,
        maximizing: bool,
        perspective: Player,
    ) -> Result<i32, SearchError> {
        let moves = MoveGenerator::new(board.width(), self.move_order);
        Ok(self.alpha_beta(&moves, board, depth, alpha, beta, maximizing, perspective)?)
    }

    /// Scores `board` with a minimax search visiting every node
    pub fn minimax(
        &mut self,
        board: &mut Board,
        depth: u32,
        maximizing: bool,
        perspective: Player,
    ) -> Result<i32, SearchError> {
        let moves = MoveGenerator::new(board.width(), self.move_order);
        Ok(self.minimax_value(&moves, board, depth, maximizing, perspective)?)
    }

    fn log_result(&self, player: Player, depth: u32, result: &Result<SearchResult, SearchError>) {
        match result {
            Ok(found) => debug!(
                "{} depth {}: column {} score {} ({} nodes)",
                player, depth, found.column, found.score, found.nodes
            ),
            Err(SearchError::Invariant(err)) => error!("search for {} at depth {} failed: {}", player, depth, err),
            Err(_) => {}
        }
    }

    /// Performs the root of the search, keeping track of the best move
    fn top_level_search(
        &mut self,
        board: &mut Board,
        player: Player,
        depth: u32,
        pruning: bool,
    ) -> Result<SearchResult, SearchError> {
        if depth == 0 {
            return Err(SearchError::InvalidDepth);
        }
        if board.outcome() != GameOutcome::Ongoing {
            return Err(SearchError::GameOver);
        }

        let start_count = self.node_count;
        self.node_count += 1;

        let moves = MoveGenerator::new(board.width(), self.move_order);
        let mut alpha = -SCORE_INF;
        let mut best: Option<(usize, i32)> = None;

        for column in moves.legal_moves(board) {
            board.drop(column, player)?;
            let score = if pruning {
                self.alpha_beta(&moves, board, depth - 1, alpha, SCORE_INF, false, player)?
            } else {
                self.minimax_value(&moves, board, depth - 1, false, player)?
            };
            board.undo(column)?;

            // strictly better only, so ties keep the earlier move
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((column, score));
                alpha = alpha.max(score);
            }
        }

        let (column, score) = best.ok_or(SearchError::GameOver)?;
        Ok(SearchResult {
            column,
            score,
            nodes: self.node_count - start_count,
        })
    }

    /// Performs game tree search with alpha-beta pruning
    ///
    /// Returns the score of the position for `perspective`
    #[allow(clippy::too_many_arguments)]
    fn alpha_beta(
        &mut self,
        moves: &MoveGenerator,
        board: &mut Board,
        depth: u32,
        mut alpha: i32,
        mut beta: i32,
        maximizing: bool,
        perspective: Player,
    ) -> Result<i32, InvalidMoveError> {
        self.node_count += 1;

        if depth == 0 || board.outcome() != GameOutcome::Ongoing {
            return Ok(self.evaluator.evaluate(board, perspective));
        }

        let legal = moves.legal_moves(board);
        if legal.is_empty() {
            return Ok(0);
        }

        if maximizing {
            let mut best = -SCORE_INF;
            for column in legal {
                board.drop(column, perspective)?;
                let score = self.alpha_beta(moves, board, depth - 1, alpha, beta, false, perspective)?;
                board.undo(column)?;

                best = best.max(score);
                alpha = alpha.max(best);
                // the minimizing player already has a better option elsewhere
                if alpha >= beta {
                    break;
                }
            }
            Ok(best)
        } else {
            let mut best = SCORE_INF;
            for column in legal {
                board.drop(column, perspective.other())?;
                let score = self.alpha_beta(moves, board, depth - 1, alpha, beta, true, perspective)?;
                board.undo(column)?;

                best = best.min(score);
                beta = beta.min(best);
                if alpha >= beta {
                    break;
                }
            }
            Ok(best)
        }
    }

    fn minimax_value(
        &mut self,
        moves: &MoveGenerator,
        board: &mut Board,
        depth: u32,
        maximizing: bool,
        perspective: Player,
    ) -> Result<i32, InvalidMoveError> {
        self.node_count += 1;

        if depth == 0 || board.outcome() != GameOutcome::Ongoing {
            return Ok(self.evaluator.evaluate(board, perspective));
        }

        let mover = if maximizing { perspective } else { perspective.other() };
        let mut best = if maximizing { -SCORE_INF } else { SCORE_INF };
        let mut any = false;
        for column in moves.legal_moves(board) {
            any = true;
            board.drop(column, mover)?;
            let score = self.minimax_value(moves, board, depth - 1, !maximizing, perspective)?;
            board.undo(column)?;

            best = if maximizing { best.max(score) } else { best.min(score) };
        }

        Ok(if any { best } else { 0 })
    }
}
