//! Error types shared by the board, search and configuration layers

use thiserror::Error;

/// A move that cannot be applied to (or removed from) a board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidMoveError {
    #[error("column {column} out of range, columns must be below {width}")]
    OutOfRange { column: usize, width: usize },

    #[error("column {0} is full")]
    ColumnFull(usize),

    #[error("column {0} is empty")]
    ColumnEmpty(usize),

    #[error("the game is already over")]
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("search depth must be at least 1")]
    InvalidDepth,

    #[error("cannot search a finished game")]
    GameOver,

    /// The move generator offered a move the board rejected
    #[error("internal invariant violated during search: {0}")]
    Invariant(#[from] InvalidMoveError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid board dimensions {rows}x{cols}: need at least {min} rows and between {min} and {max} columns")]
    Dimensions {
        rows: usize,
        cols: usize,
        min: usize,
        max: usize,
    },

    #[error("invalid search depth {0}, depth must be at least 1")]
    Depth(u32),

    #[error("no search depths given")]
    NoDepths,

    #[error("game count must be at least 1")]
    Games,
}
