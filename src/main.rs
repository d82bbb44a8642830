use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;
use rand::{rngs::StdRng, Rng, SeedableRng};

use std::io::{stdin, stdout, Write};

use connect4_minimax::{
    benchmark,
    config::{BenchmarkConfig, GameConfig, Opponent},
    moves::MoveOrder,
    Board, GameOutcome, InvalidMoveError, Player, Searcher, HEIGHT, WIDTH,
};

mod display;

#[derive(Parser, Debug)]
#[command(author, version, about = "Play Connect 4 against a minimax agent, or benchmark it")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play an interactive game in the terminal
    Play(PlayArgs),
    /// Measure search time and win rate across search depths
    Bench(BenchArgs),
}

#[derive(Args, Debug)]
struct BoardArgs {
    /// Number of rows on the board
    #[arg(long, default_value_t = HEIGHT)]
    rows: usize,

    /// Number of columns on the board
    #[arg(long, default_value_t = WIDTH)]
    cols: usize,

    /// Order in which the search tries columns
    #[arg(long, value_enum, default_value_t = OrderArg::Center)]
    order: OrderArg,
}

#[derive(Args, Debug)]
struct PlayArgs {
    #[command(flatten)]
    board: BoardArgs,

    /// Search depth of the AI in plies
    #[arg(short, long, default_value_t = 6)]
    depth: u32,

    /// Who moves first
    #[arg(long, value_enum, default_value_t = FirstArg::Random)]
    first: FirstArg,

    /// Let the AI play both sides
    #[arg(long)]
    self_play: bool,

    /// Print the board as plain text instead of colour
    #[arg(long)]
    plain: bool,

    /// Seed for choosing the first player
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args, Debug)]
struct BenchArgs {
    #[command(flatten)]
    board: BoardArgs,

    /// Search depths to benchmark
    #[arg(long, value_delimiter = ',', default_values_t = [1, 2, 3, 4, 5])]
    depths: Vec<u32>,

    /// Games played at each depth
    #[arg(short, long, default_value_t = 10)]
    games: usize,

    /// Seed for the random opponent and the choice of sides
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Opponent of the searching agent
    #[arg(long, value_enum, default_value_t = OpponentArg::Random)]
    opponent: OpponentArg,

    /// Search depth of a minimax opponent
    #[arg(long, default_value_t = 2)]
    opponent_depth: u32,

    /// Play the games of each depth in parallel
    #[arg(long)]
    parallel: bool,

    /// Write the report as JSON to this file
    #[arg(long)]
    json: Option<std::path::PathBuf>,

    /// Hide the progress bars
    #[arg(long)]
    quiet: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OrderArg {
    Center,
    Ascending,
}

impl From<OrderArg> for MoveOrder {
    fn from(order: OrderArg) -> Self {
        match order {
            OrderArg::Center => MoveOrder::CenterFirst,
            OrderArg::Ascending => MoveOrder::Ascending,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum FirstArg {
    Human,
    Ai,
    Random,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OpponentArg {
    Random,
    Minimax,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, log_level),
    )
    .init();

    match cli.command {
        Command::Play(args) => play(args),
        Command::Bench(args) => bench(args),
    }
}

fn bench(args: BenchArgs) -> Result<()> {
    let config = BenchmarkConfig {
        rows: args.board.rows,
        cols: args.board.cols,
        depths: args.depths,
        games: args.games,
        seed: args.seed,
        opponent: match args.opponent {
            OpponentArg::Random => Opponent::Random,
            OpponentArg::Minimax => Opponent::Minimax(args.opponent_depth),
        },
        move_order: args.board.order.into(),
        parallel: args.parallel,
    }
    .validate()?;

    info!("running benchmark with {:?}", config);
    let report = benchmark::run(&config, !args.quiet)?;

    // printed only after every timed search has finished
    println!("{}", report);

    if let Some(path) = args.json {
        report.write_json(&path)?;
        println!("Report written to {}", path.display());
    }
    Ok(())
}

fn play(args: PlayArgs) -> Result<()> {
    let config = GameConfig {
        rows: args.board.rows,
        cols: args.board.cols,
        depth: args.depth,
        move_order: args.board.order.into(),
    }
    .validate()?;

    let mut board = Board::with_dimensions(config.rows, config.cols)?;
    let mut searcher = Searcher::new(config.move_order);
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    // which of player 1 and player 2 the AI controls
    let ai_players = if args.self_play {
        (true, true)
    } else {
        let ai_first = match args.first {
            FirstArg::Human => false,
            FirstArg::Ai => true,
            FirstArg::Random => rng.gen_bool(0.5),
        };
        (ai_first, !ai_first)
    };

    let stdin = stdin();

    println!("Welcome to Connect 4\n");
    match ai_players {
        (true, true) => println!("The AI plays both sides."),
        (true, false) => println!("The AI is player 1 (red) and goes first."),
        _ => println!("You are player 1 (red) and go first."),
    }
    println!("Enter a column between 1 and {}, or q to quit.\n", board.width());

    let mut player = Player::One;

    // game loop
    loop {
        display::draw(&board, args.plain)?;

        match board.outcome() {
            GameOutcome::Ongoing => {
                let column =
                    // AI player
                    if (player == Player::One && ai_players.0) || (player == Player::Two && ai_players.1) {
                        println!("AI is thinking...");
                        stdout().flush()?;

                        // slow down play if both players are AI
                        if ai_players == (true, true) {
                            std::thread::sleep(std::time::Duration::from_secs(1));
                        }

                        let (found, elapsed) = searcher.timed_best_move(&mut board, player, config.depth)?;
                        println!(
                            "AI move calculated in {:.4} seconds ({} positions)",
                            elapsed.as_secs_f64(),
                            found.nodes
                        );
                        println!("Best move: {}, score {}", found.column + 1, found.score);
                        found.column

                    // human player
                    } else {
                        print!("Move input > ");
                        stdout().flush()?;
                        let mut input_str = String::new();
                        if stdin.read_line(&mut input_str)? == 0 {
                            println!();
                            return Ok(());
                        }

                        let input = input_str.trim();
                        if input.eq_ignore_ascii_case("q") {
                            println!("Goodbye!");
                            return Ok(());
                        }
                        match input.parse::<usize>() {
                            Ok(column) if column >= 1 && column <= board.width() => column - 1,
                            Ok(column) => {
                                println!(
                                    "Invalid move, column {} out of range. Columns must be between 1 and {}",
                                    column,
                                    board.width()
                                );
                                continue;
                            }
                            Err(_) => {
                                println!("Invalid number: {}", input);
                                continue;
                            }
                        }
                    };

                match board.drop(column, player) {
                    Ok(_) => player = player.other(),
                    Err(InvalidMoveError::ColumnFull(_)) => {
                        println!("Invalid move, column {} full", column + 1);
                        // try the move again
                        continue;
                    }
                    Err(err) => {
                        println!("{}", err);
                        continue;
                    }
                }
            }

            // end states
            GameOutcome::PlayerOneWin => {
                println!("Player 1 wins!");
                break;
            }
            GameOutcome::PlayerTwoWin => {
                println!("Player 2 wins!");
                break;
            }
            GameOutcome::Draw => {
                println!("Draw!");
                break;
            }
        }
    }
    Ok(())
}
