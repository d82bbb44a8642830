use anyhow::{anyhow, Result};

use std::fmt;

use crate::{config, error::ConfigError, error::InvalidMoveError, CONNECT, HEIGHT, WIDTH};

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum Player {
    One,
    Two,
}

impl Player {
    pub fn other(self) -> Self {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    pub fn cell(self) -> Cell {
        match self {
            Player::One => Cell::PlayerOne,
            Player::Two => Cell::PlayerTwo,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::One => write!(f, "Player 1"),
            Player::Two => write!(f, "Player 2"),
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Cell {
    PlayerOne,
    PlayerTwo,
    Empty,
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn player(&self) -> Option<Player> {
        match self {
            Cell::PlayerOne => Some(Player::One),
            Cell::PlayerTwo => Some(Player::Two),
            Cell::Empty => None,
        }
    }

    fn symbol(&self) -> char {
        match self {
            Cell::PlayerOne => 'X',
            Cell::PlayerTwo => 'O',
            Cell::Empty => '.',
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum GameOutcome {
    Ongoing,
    PlayerOneWin,
    PlayerTwoWin,
    Draw,
}

impl GameOutcome {
    pub fn winner(&self) -> Option<Player> {
        match self {
            GameOutcome::PlayerOneWin => Some(Player::One),
            GameOutcome::PlayerTwoWin => Some(Player::Two),
            _ => None,
        }
    }
}

/// The middle column of a `width`-wide board, left of centre on even widths
pub fn center_column(width: usize) -> usize {
    (width - 1) / 2
}

// horizontal, vertical and both diagonals as (row, column) steps
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// A Connect 4 grid mutated in place by `drop`/`undo`
///
/// Rows are numbered from the top: row 0 is the top of the board and row
/// `height - 1` is the row pieces land on first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    cells: Vec<Cell>, // cells are stored left-to-right, top-to-bottom
    heights: Vec<usize>,
    num_moves: usize,
    // the winner and the column of the winning drop
    winner: Option<(Player, usize)>,
}

impl Board {
    /// Creates an empty board of the default size
    pub fn new() -> Self {
        Self::empty(HEIGHT, WIDTH)
    }

    /// Creates an empty board with `rows` x `cols` tiles
    pub fn with_dimensions(rows: usize, cols: usize) -> Result<Self, ConfigError> {
        config::validate_dimensions(rows, cols)?;
        Ok(Self::empty(rows, cols))
    }

    fn empty(rows: usize, cols: usize) -> Self {
        Self {
            width: cols,
            height: rows,
            cells: vec![Cell::Empty; rows * cols],
            heights: vec![0; cols],
            num_moves: 0,
            winner: None,
        }
    }

    /// Builds a default-sized board from a string of 1-indexed column digits,
    /// with player one moving first
    pub fn from_moves<S: AsRef<str>>(moves: S) -> Result<Self> {
        let mut board = Self::new();
        let mut player = Player::One;

        for column_char in moves.as_ref().chars() {
            match column_char.to_digit(10).map(|c| c as usize) {
                Some(column) if column >= 1 && column <= board.width => {
                    board.drop(column - 1, player)?;
                    player = player.other();
                }
                _ => return Err(anyhow!("could not parse '{}' as a valid move", column_char)),
            }
        }
        Ok(board)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn num_moves(&self) -> usize {
        self.num_moves
    }

    pub fn winner(&self) -> Option<Player> {
        self.winner.map(|(player, _)| player)
    }

    pub fn center_column(&self) -> usize {
        center_column(self.width)
    }

    pub fn cell(&self, row: usize, column: usize) -> Cell {
        self.cells[row * self.width + column]
    }

    fn cell_at(&self, row: isize, column: isize) -> Option<Cell> {
        if row < 0 || column < 0 || row >= self.height as isize || column >= self.width as isize {
            return None;
        }
        Some(self.cell(row as usize, column as usize))
    }

    /// Whether a piece can be dropped into `column`
    pub fn playable(&self, column: usize) -> bool {
        column < self.width && self.heights[column] < self.height
    }

    /// Places `player`'s piece at the lowest open row of `column`, returning that row
    pub fn drop(&mut self, column: usize, player: Player) -> Result<usize, InvalidMoveError> {
        if column >= self.width {
            return Err(InvalidMoveError::OutOfRange {
                column,
                width: self.width,
            });
        }
        if self.heights[column] == self.height {
            return Err(InvalidMoveError::ColumnFull(column));
        }
        if self.winner.is_some() {
            return Err(InvalidMoveError::GameOver);
        }

        let row = self.height - 1 - self.heights[column];
        self.cells[row * self.width + column] = player.cell();
        self.heights[column] += 1;
        self.num_moves += 1;

        // a win must run through the piece just placed
        if self.check_win(row, column) {
            self.winner = Some((player, column));
        }
        Ok(row)
    }

    /// Removes the most recently dropped piece of `column`
    ///
    /// Once the game is won only the winning piece can be removed.
    pub fn undo(&mut self, column: usize) -> Result<(), InvalidMoveError> {
        if column >= self.width {
            return Err(InvalidMoveError::OutOfRange {
                column,
                width: self.width,
            });
        }
        if self.heights[column] == 0 {
            return Err(InvalidMoveError::ColumnEmpty(column));
        }
        if let Some((_, winning_column)) = self.winner {
            if winning_column != column {
                return Err(InvalidMoveError::GameOver);
            }
        }

        let row = self.height - self.heights[column];
        self.cells[row * self.width + column] = Cell::Empty;
        self.heights[column] -= 1;
        self.num_moves -= 1;
        // no drops follow a win, so the top of the winning column is the winning piece
        self.winner = None;
        Ok(())
    }

    pub fn is_full(&self) -> bool {
        self.num_moves == self.width * self.height
    }

    /// Tests whether the piece at (`row`, `column`) is part of an alignment of four
    pub fn check_win(&self, row: usize, column: usize) -> bool {
        let player = match self.cell_at(row as isize, column as isize) {
            Some(cell) if !cell.is_empty() => cell,
            _ => return false,
        };

        for &(dy, dx) in DIRECTIONS.iter() {
            // count the placed piece, then walk outwards both ways
            let mut run = 1;
            for sign in [-1isize, 1] {
                let mut y = row as isize + sign * dy;
                let mut x = column as isize + sign * dx;
                while self.cell_at(y, x) == Some(player) {
                    run += 1;
                    y += sign * dy;
                    x += sign * dx;
                }
            }
            if run >= CONNECT {
                return true;
            }
        }

        false
    }

    pub fn outcome(&self) -> GameOutcome {
        match self.winner() {
            Some(Player::One) => GameOutcome::PlayerOneWin,
            Some(Player::Two) => GameOutcome::PlayerTwoWin,
            None if self.is_full() => GameOutcome::Draw,
            None => GameOutcome::Ongoing,
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.height {
            let line: Vec<String> = (0..self.width)
                .map(|column| self.cell(row, column).symbol().to_string())
                .collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        let footer: Vec<String> = (1..=self.width).map(|x| (x % 10).to_string()).collect();
        write!(f, "{}", footer.join(" "))
    }
}
