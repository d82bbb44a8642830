//! Validated settings for games and benchmarks

use crate::{error::ConfigError, moves::MoveOrder, CONNECT, HEIGHT, MAX_WIDTH, WIDTH};

/// Rejects boards too small to hold a win or too wide for the move lists
pub fn validate_dimensions(rows: usize, cols: usize) -> Result<(), ConfigError> {
    if rows < CONNECT || cols < CONNECT || cols > MAX_WIDTH {
        return Err(ConfigError::Dimensions {
            rows,
            cols,
            min: CONNECT,
            max: MAX_WIDTH,
        });
    }
    Ok(())
}

pub fn validate_depth(depth: u32) -> Result<(), ConfigError> {
    if depth == 0 {
        return Err(ConfigError::Depth(depth));
    }
    Ok(())
}

/// Settings for an interactive game
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameConfig {
    pub rows: usize,
    pub cols: usize,
    pub depth: u32,
    pub move_order: MoveOrder,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: HEIGHT,
            cols: WIDTH,
            depth: 6,
            move_order: MoveOrder::default(),
        }
    }
}

impl GameConfig {
    pub fn validate(self) -> Result<Self, ConfigError> {
        validate_dimensions(self.rows, self.cols)?;
        validate_depth(self.depth)?;
        Ok(self)
    }
}

/// The player the searching agent is measured against
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Opponent {
    /// Uniformly random legal moves
    Random,
    /// Another searcher with a fixed depth
    Minimax(u32),
}

/// Settings for a benchmark run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BenchmarkConfig {
    pub rows: usize,
    pub cols: usize,
    pub depths: Vec<u32>,
    /// Games played at each depth
    pub games: usize,
    pub seed: u64,
    pub opponent: Opponent,
    pub move_order: MoveOrder,
    /// Play the games of a depth on the rayon thread pool
    pub parallel: bool,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            rows: HEIGHT,
            cols: WIDTH,
            depths: (1..=5).collect(),
            games: 10,
            seed: 0,
            opponent: Opponent::Random,
            move_order: MoveOrder::default(),
            parallel: false,
        }
    }
}

impl BenchmarkConfig {
    pub fn validate(self) -> Result<Self, ConfigError> {
        validate_dimensions(self.rows, self.cols)?;
        if self.depths.is_empty() {
            return Err(ConfigError::NoDepths);
        }
        for &depth in self.depths.iter() {
            validate_depth(depth)?;
        }
        if let Opponent::Minimax(depth) = self.opponent {
            validate_depth(depth)?;
        }
        if self.games == 0 {
            return Err(ConfigError::Games);
        }
        Ok(self)
    }
}
