//! A depth-limited agent for playing the board game 'Connect 4'
//!
//! This agent uses a Minimax game tree search with Alpha-Beta pruning and a
//! heuristic evaluation at the cutoff depth, plus a benchmarking harness
//! measuring search speed and win rate across search depths.
//!
//! # Basic Usage
//!
//! ```
//! use connect4_minimax::{board::{Board, Player}, search::Searcher};
//!
//!# use std::error::Error;
//!# fn main() -> Result<(), Box<dyn Error>> {
//! let mut board = Board::from_moves("112233")?;
//! let mut searcher = Searcher::default();
//! let result = searcher.best_move(&mut board, Player::One, 3)?;
//!
//! assert_eq!(result.column, 3);
//!# Ok(())
//!# }
//! ```

use static_assertions::*;
pub use anyhow;

pub mod error;

pub mod board;

pub mod moves;

pub mod evaluator;

pub mod search;

pub mod config;

pub mod benchmark;

mod test;

pub use board::{Board, Cell, GameOutcome, Player};
pub use error::{ConfigError, InvalidMoveError, SearchError};
pub use search::{SearchResult, Searcher};

/// The default width of the game board in tiles
pub const WIDTH: usize = 7;

/// The default height of the game board in tiles
pub const HEIGHT: usize = 6;

/// The number of aligned tiles needed to win
pub const CONNECT: usize = 4;

/// The widest board supported, bounding the fixed-size move lists
pub const MAX_WIDTH: usize = 16;

// ensure the default board can hold a win in every direction and fits the move lists
const_assert!(WIDTH >= CONNECT && HEIGHT >= CONNECT);
const_assert!(WIDTH <= MAX_WIDTH);
