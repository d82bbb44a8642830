//! Measures search speed and playing strength across search depths

use anyhow::Result;
use indicatif::*;
use log::info;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;

use std::fmt;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::*;

use crate::{
    board::{Board, GameOutcome, Player},
    config::{BenchmarkConfig, Opponent},
    moves,
    search::Searcher,
};

/// A finished game from the point of view of the searching agent
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum GameResult {
    Win,
    Loss,
    Draw,
}

#[derive(Clone, Debug)]
pub struct GameRecord {
    pub result: GameResult,
    /// The side the searching agent played
    pub agent: Player,
    /// Wall-clock time of every search the agent ran, in move order
    pub search_times: Vec<Duration>,
    pub nodes: usize,
    pub moves: usize,
}

/// Aggregated results of every game played at one depth
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DepthReport {
    pub depth: u32,
    pub games: usize,
    pub wins: usize,
    pub losses: usize,
    pub draws: usize,
    pub win_rate: f64,
    pub searches: usize,
    pub total_search_secs: f64,
    pub mean_search_secs: f64,
    pub max_search_secs: f64,
    pub mean_game_search_secs: f64,
    pub mean_nodes: f64,
}

impl DepthReport {
    pub fn from_records(depth: u32, records: &[GameRecord]) -> Self {
        let count = |result: GameResult| records.iter().filter(|r| r.result == result).count();
        let times: Vec<Duration> = records
            .iter()
            .flat_map(|r| r.search_times.iter().copied())
            .collect();
        let total: Duration = times.iter().sum();
        let nodes: usize = records.iter().map(|r| r.nodes).sum();
        let games = records.len();
        let searches = times.len();

        Self {
            depth,
            games,
            wins: count(GameResult::Win),
            losses: count(GameResult::Loss),
            draws: count(GameResult::Draw),
            win_rate: if games == 0 {
                0.0
            } else {
                count(GameResult::Win) as f64 / games as f64
            },
            searches,
            total_search_secs: total.as_secs_f64(),
            mean_search_secs: if searches == 0 {
                0.0
            } else {
                total.as_secs_f64() / searches as f64
            },
            max_search_secs: times.iter().max().copied().unwrap_or_default().as_secs_f64(),
            mean_game_search_secs: if games == 0 {
                0.0
            } else {
                total.as_secs_f64() / games as f64
            },
            mean_nodes: if searches == 0 {
                0.0
            } else {
                nodes as f64 / searches as f64
            },
        }
    }
}

/// Time of a single search from the empty board
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SpeedSample {
    pub depth: u32,
    pub secs: f64,
    pub nodes: usize,
    pub column: usize,
    pub score: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BenchmarkReport {
    pub seed: u64,
    pub games: usize,
    pub opponent: String,
    pub speed: Vec<SpeedSample>,
    pub depths: Vec<DepthReport>,
}

impl BenchmarkReport {
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}

impl fmt::Display for BenchmarkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Search speed from the empty board")?;
        writeln!(f, "{:>5} {:>12} {:>12} {:>6}", "depth", "time (ms)", "nodes", "move")?;
        for sample in self.speed.iter() {
            writeln!(
                f,
                "{:>5} {:>12.3} {:>12} {:>6}",
                sample.depth,
                sample.secs * 1000.0,
                sample.nodes,
                sample.column + 1
            )?;
        }

        writeln!(f)?;
        writeln!(
            f,
            "Win rate vs {} over {} games per depth (seed {})",
            self.opponent, self.games, self.seed
        )?;
        writeln!(
            f,
            "{:>5} {:>5} {:>6} {:>5} {:>8} {:>14} {:>14} {:>14} {:>12}",
            "depth", "wins", "losses", "draws", "win %", "mean (ms)", "max (ms)", "per game (ms)", "mean nodes"
        )?;
        for depth in self.depths.iter() {
            writeln!(
                f,
                "{:>5} {:>5} {:>6} {:>5} {:>8.1} {:>14.3} {:>14.3} {:>14.3} {:>12.1}",
                depth.depth,
                depth.wins,
                depth.losses,
                depth.draws,
                depth.win_rate * 100.0,
                depth.mean_search_secs * 1000.0,
                depth.max_search_secs * 1000.0,
                depth.mean_game_search_secs * 1000.0,
                depth.mean_nodes
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for Opponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Opponent::Random => write!(f, "random"),
            Opponent::Minimax(depth) => write!(f, "minimax depth {}", depth),
        }
    }
}

/// Seed of one game, independent of the order games are played in
pub fn game_seed(seed: u64, depth: u32, game: usize) -> u64 {
    seed ^ (depth as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (game as u64).wrapping_add(1).wrapping_mul(0xC2B2_AE3D_27D4_EB4F)
}

/// Plays one game between a searcher of `depth` and the configured opponent
///
/// The side the searcher plays is drawn from `rng`, as are the random
/// opponent's moves. Only the searches themselves are timed, excluding
/// their log output.
pub fn play_game<R: Rng>(config: &BenchmarkConfig, depth: u32, rng: &mut R) -> Result<GameRecord> {
    let mut board = Board::with_dimensions(config.rows, config.cols)?;
    let agent = if rng.gen_bool(0.5) { Player::One } else { Player::Two };

    let mut searcher = Searcher::new(config.move_order);
    let mut opponent = Searcher::new(config.move_order);

    let mut search_times = Vec::new();
    let mut nodes = 0;
    let mut player = Player::One;

    while board.outcome() == GameOutcome::Ongoing {
        let column = if player == agent {
            let (found, elapsed) = searcher.timed_best_move(&mut board, agent, depth)?;
            search_times.push(elapsed);
            nodes += found.nodes;
            found.column
        } else {
            match config.opponent {
                Opponent::Random => {
                    let mut legal = moves::legal_moves(&board);
                    let pick = rng.gen_range(0..legal.len());
                    // non-empty while the game is ongoing
                    legal.nth(pick).unwrap_or_default()
                }
                Opponent::Minimax(opponent_depth) => {
                    opponent.best_move(&mut board, player, opponent_depth)?.column
                }
            }
        };
        board.drop(column, player)?;
        player = player.other();
    }

    let result = match board.outcome().winner() {
        Some(winner) if winner == agent => GameResult::Win,
        Some(_) => GameResult::Loss,
        None => GameResult::Draw,
    };

    Ok(GameRecord {
        result,
        agent,
        search_times,
        nodes,
        moves: board.num_moves(),
    })
}

/// Times one search from the empty board at each configured depth
pub fn speed_profile(config: &BenchmarkConfig) -> Result<Vec<SpeedSample>> {
    let mut samples = Vec::with_capacity(config.depths.len());
    for &depth in config.depths.iter() {
        let mut board = Board::with_dimensions(config.rows, config.cols)?;
        let mut searcher = Searcher::new(config.move_order);

        let (found, elapsed) = searcher.timed_best_move(&mut board, Player::One, depth)?;
        let secs = elapsed.as_secs_f64();

        samples.push(SpeedSample {
            depth,
            secs,
            nodes: found.nodes,
            column: found.column,
            score: found.score,
        });
    }
    Ok(samples)
}

/// Plays `config.games` games at `depth`
///
/// Every game owns its board and random source, so the results are the
/// same whether the games run sequentially or in parallel.
pub fn run_depth(config: &BenchmarkConfig, depth: u32, progress: &ProgressBar) -> Result<DepthReport> {
    let play = |game: usize| -> Result<GameRecord> {
        let mut rng = StdRng::seed_from_u64(game_seed(config.seed, depth, game));
        let record = play_game(config, depth, &mut rng);
        progress.inc(1);
        record
    };

    let records: Vec<GameRecord> = if config.parallel {
        (0..config.games).into_par_iter().map(play).collect::<Result<_>>()?
    } else {
        (0..config.games).map(play).collect::<Result<_>>()?
    };

    Ok(DepthReport::from_records(depth, &records))
}

/// Runs the speed profile and the win-rate games for every configured depth
pub fn run(config: &BenchmarkConfig, show_progress: bool) -> Result<BenchmarkReport> {
    let start = Instant::now();

    info!("timing searches from the empty board at depths {:?}", config.depths);
    let speed = speed_profile(config)?;

    let mut depths = Vec::with_capacity(config.depths.len());
    for &depth in config.depths.iter() {
        let progress = if show_progress {
            ProgressBar::new(config.games as u64)
        } else {
            ProgressBar::hidden()
        };
        progress.set_style(
            ProgressStyle::default_bar()
                .template("Depth {msg}: {bar:40.cyan/blue} {pos}/{len} games ~{eta} remaining")
                .progress_chars("█▓▒░  "),
        );
        progress.set_message(&depth.to_string());

        let report = run_depth(config, depth, &progress)?;
        progress.finish_and_clear();

        info!(
            "depth {}: {} wins, {} losses, {} draws, mean search {:.3}ms",
            depth,
            report.wins,
            report.losses,
            report.draws,
            report.mean_search_secs * 1000.0
        );
        depths.push(report);
    }

    info!("benchmark completed in {}", HumanDuration(start.elapsed()));

    Ok(BenchmarkReport {
        seed: config.seed,
        games: config.games,
        opponent: config.opponent.to_string(),
        speed,
        depths,
    })
}
