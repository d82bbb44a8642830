#[cfg(test)]
pub mod test {
    use anyhow::Result;

    use crate::benchmark::{self, GameResult};
    use crate::config::{BenchmarkConfig, GameConfig, Opponent};
    use crate::evaluator::{win_score, Evaluator};
    use crate::moves::{self, MoveGenerator, MoveOrder};
    use crate::{Board, Cell, ConfigError, GameOutcome, InvalidMoveError, Player, SearchError, Searcher};

    use rand::{rngs::StdRng, SeedableRng};

    fn to_move(board: &Board) -> Player {
        if board.num_moves() % 2 == 0 {
            Player::One
        } else {
            Player::Two
        }
    }

    #[test]
    pub fn drop_then_undo_restores_board() -> Result<()> {
        let mut board = Board::from_moves("4453")?;
        let before = board.clone();

        for column in 0..board.width() {
            let row = board.drop(column, Player::Two)?;
            assert_eq!(board.cell(row, column), Cell::PlayerTwo);
            board.undo(column)?;

            assert_eq!(board, before);
            for row in 0..board.height() {
                for column in 0..board.width() {
                    assert_eq!(board.cell(row, column), before.cell(row, column));
                }
            }
        }
        Ok(())
    }

    #[test]
    pub fn undo_clears_win() -> Result<()> {
        let mut board = Board::from_moves("121212")?;
        let before = board.clone();

        board.drop(0, Player::One)?;
        assert_eq!(board.outcome(), GameOutcome::PlayerOneWin);
        board.undo(0)?;

        assert_eq!(board.outcome(), GameOutcome::Ongoing);
        assert_eq!(board, before);
        Ok(())
    }

    #[test]
    pub fn won_board_only_undoes_winning_piece() -> Result<()> {
        let mut board = Board::from_moves("1212121")?;
        assert_eq!(board.outcome(), GameOutcome::PlayerOneWin);

        // removing any other piece would leave the four in a row standing
        assert_eq!(board.undo(1), Err(InvalidMoveError::GameOver));
        assert_eq!(board.outcome(), GameOutcome::PlayerOneWin);
        assert!(board.check_win(2, 0));
        assert_eq!(board.drop(4, Player::Two), Err(InvalidMoveError::GameOver));

        board.undo(0)?;
        assert_eq!(board.outcome(), GameOutcome::Ongoing);
        assert_eq!(board, Board::from_moves("121212")?);
        Ok(())
    }

    #[test]
    pub fn drop_lands_on_lowest_open_row() -> Result<()> {
        let mut board = Board::new();
        assert_eq!(board.drop(2, Player::One)?, 5);
        assert_eq!(board.drop(2, Player::Two)?, 4);
        assert_eq!(board.drop(3, Player::One)?, 5);
        assert_eq!(board.cell(4, 2), Cell::PlayerTwo);
        assert_eq!(board.num_moves(), 3);
        Ok(())
    }

    #[test]
    pub fn invalid_moves() -> Result<()> {
        let mut board = Board::from_moves("444444")?;

        assert_eq!(
            board.drop(7, Player::One),
            Err(InvalidMoveError::OutOfRange { column: 7, width: 7 })
        );
        assert_eq!(board.drop(3, Player::One), Err(InvalidMoveError::ColumnFull(3)));
        assert_eq!(board.undo(0), Err(InvalidMoveError::ColumnEmpty(0)));
        assert_eq!(
            board.undo(9),
            Err(InvalidMoveError::OutOfRange { column: 9, width: 7 })
        );

        let mut won = Board::from_moves("1212121")?;
        assert_eq!(won.drop(4, Player::Two), Err(InvalidMoveError::GameOver));

        assert!(Board::from_moves("1x").is_err());
        assert!(Board::from_moves("8").is_err());
        assert!(Board::from_moves("0").is_err());
        Ok(())
    }

    #[test]
    pub fn horizontal_win() -> Result<()> {
        let mut board = Board::new();
        for column in 0..3 {
            board.drop(column, Player::One)?;
            assert!(!board.check_win(5, column));
        }
        assert_eq!(board.outcome(), GameOutcome::Ongoing);

        board.drop(3, Player::One)?;
        assert!(board.check_win(5, 3));
        assert!(board.check_win(5, 0));
        assert_eq!(board.outcome(), GameOutcome::PlayerOneWin);
        Ok(())
    }

    #[test]
    pub fn vertical_win() -> Result<()> {
        let mut board = Board::new();
        for _ in 0..3 {
            board.drop(2, Player::Two)?;
        }
        assert!(!board.check_win(3, 2));

        let row = board.drop(2, Player::Two)?;
        assert_eq!(row, 2);
        assert!(board.check_win(row, 2));
        assert_eq!(board.outcome(), GameOutcome::PlayerTwoWin);
        Ok(())
    }

    #[test]
    pub fn diagonal_wins() -> Result<()> {
        use Player::*;

        // rising to the right
        let mut board = Board::new();
        for &(column, player) in [
            (0, One),
            (1, Two),
            (1, One),
            (2, Two),
            (2, Two),
            (2, One),
            (3, Two),
            (3, Two),
            (3, Two),
        ]
        .iter()
        {
            board.drop(column, player)?;
        }
        assert_eq!(board.outcome(), GameOutcome::Ongoing);
        let row = board.drop(3, One)?;
        assert_eq!(row, 2);
        assert!(board.check_win(2, 3));
        assert_eq!(board.outcome(), GameOutcome::PlayerOneWin);

        // rising to the left
        let mut board = Board::new();
        for &(column, player) in [
            (6, One),
            (5, Two),
            (5, One),
            (4, Two),
            (4, Two),
            (4, One),
            (3, Two),
            (3, Two),
            (3, Two),
        ]
        .iter()
        {
            board.drop(column, player)?;
        }
        assert_eq!(board.outcome(), GameOutcome::Ongoing);
        board.drop(3, One)?;
        assert!(board.check_win(2, 3));
        assert!(board.check_win(5, 6));
        assert_eq!(board.outcome(), GameOutcome::PlayerOneWin);
        Ok(())
    }

    #[test]
    pub fn check_win_ignores_empty_cells() {
        let board = Board::new();
        assert!(!board.check_win(5, 3));
        assert!(!board.check_win(0, 0));
    }

    #[test]
    pub fn full_board_without_alignment_is_draw() -> Result<()> {
        use Player::*;

        let mut board = Board::with_dimensions(4, 4)?;
        // columns filled bottom to top
        let columns = [[One, One, Two, Two], [Two, Two, One, One]];
        for column in 0..4 {
            for &player in columns[column % 2].iter() {
                assert_eq!(board.outcome(), GameOutcome::Ongoing);
                board.drop(column, player)?;
            }
        }

        assert!(board.is_full());
        assert_eq!(board.outcome(), GameOutcome::Draw);
        assert!(moves::legal_moves(&board).next().is_none());
        Ok(())
    }

    #[test]
    pub fn legal_moves_are_playable() -> Result<()> {
        for position in ["", "4", "444444", "4444441111", "1234567"].iter() {
            let board = Board::from_moves(position)?;
            assert_eq!(board.outcome(), GameOutcome::Ongoing);

            for &order in [MoveOrder::CenterFirst, MoveOrder::Ascending].iter() {
                let legal: Vec<usize> = MoveGenerator::new(board.width(), order)
                    .legal_moves(&board)
                    .collect();
                assert!(!legal.is_empty());
                for &column in legal.iter() {
                    assert!(column < board.width());
                    assert!(board.playable(column));
                }
                // every open column is offered exactly once
                let open = (0..board.width()).filter(|&c| board.playable(c)).count();
                assert_eq!(legal.len(), open);
            }
        }

        let board = Board::from_moves("444444")?;
        let legal: Vec<usize> = moves::legal_moves(&board).collect();
        assert_eq!(legal, vec![0, 1, 2, 4, 5, 6]);
        Ok(())
    }

    #[test]
    pub fn move_orders() {
        let board = Board::new();
        let center: Vec<usize> = MoveGenerator::new(7, MoveOrder::CenterFirst)
            .legal_moves(&board)
            .collect();
        assert_eq!(center, vec![3, 4, 2, 5, 1, 6, 0]);

        let ascending: Vec<usize> = moves::legal_moves(&board).collect();
        assert_eq!(ascending, vec![0, 1, 2, 3, 4, 5, 6]);

        let even: Vec<usize> = moves::center_first(8).collect();
        assert_eq!(even, vec![3, 4, 2, 5, 1, 6, 0, 7]);
    }

    #[test]
    pub fn evaluation_scores() -> Result<()> {
        let evaluator = Evaluator::default();
        assert_eq!(evaluator.evaluate(&Board::new(), Player::One), 0);

        // more pieces in open windows strictly increase the score
        let mut board = Board::new();
        board.drop(0, Player::One)?;
        let one = evaluator.evaluate(&board, Player::One);
        board.drop(1, Player::One)?;
        let two = evaluator.evaluate(&board, Player::One);
        board.drop(2, Player::One)?;
        let three = evaluator.evaluate(&board, Player::One);
        assert!(0 < one && one < two && two < three);
        assert!(evaluator.evaluate(&board, Player::Two) < 0);

        // center column pieces are favoured
        let center = Board::from_moves("4")?;
        let edge = Board::from_moves("1")?;
        assert!(evaluator.evaluate(&center, Player::One) > evaluator.evaluate(&edge, Player::One));
        Ok(())
    }

    #[test]
    pub fn even_width_center_column() -> Result<()> {
        let evaluator = Evaluator::default();
        let empty = Board::with_dimensions(6, 8)?;
        assert_eq!(empty.center_column(), 3);
        assert_eq!(moves::center_first(8).next(), Some(empty.center_column()));

        // columns 3 and 4 mirror each other, so only the center weight tells them apart
        let mut left = empty.clone();
        left.drop(3, Player::One)?;
        let mut right = empty.clone();
        right.drop(4, Player::One)?;
        assert_eq!(
            evaluator.evaluate(&left, Player::One) - evaluator.evaluate(&right, Player::One),
            evaluator.center
        );
        Ok(())
    }

    #[test]
    pub fn blocked_windows_score_nothing() -> Result<()> {
        let evaluator = Evaluator {
            center: 0,
            ..Evaluator::default()
        };
        let mut board = Board::with_dimensions(4, 4)?;
        board.drop(0, Player::One)?;
        board.drop(1, Player::Two)?;

        // the shared bottom row is blocked; each player keeps its open column,
        // and player one the open diagonal
        assert_eq!(evaluator.evaluate(&board, Player::One), 1);
        assert_eq!(evaluator.evaluate(&board, Player::Two), -1);
        Ok(())
    }

    #[test]
    pub fn terminal_scores() -> Result<()> {
        let evaluator = Evaluator::default();
        let board = Board::from_moves("1212121")?;
        assert_eq!(board.outcome(), GameOutcome::PlayerOneWin);
        assert_eq!(evaluator.evaluate(&board, Player::One), win_score(7));
        assert_eq!(evaluator.evaluate(&board, Player::Two), -win_score(7));
        // faster wins score higher
        assert!(win_score(7) > win_score(9));
        Ok(())
    }

    #[test]
    pub fn search_is_deterministic() -> Result<()> {
        for position in ["", "4453", "334455"].iter() {
            let mut board = Board::from_moves(position)?;
            let player = to_move(&board);

            let first = Searcher::default().best_move(&mut board, player, 4)?;
            let second = Searcher::default().best_move(&mut board, player, 4)?;
            assert_eq!(first, second);
        }
        Ok(())
    }

    #[test]
    pub fn search_restores_board() -> Result<()> {
        let mut board = Board::from_moves("44536")?;
        let before = board.clone();
        Searcher::default().best_move(&mut board, Player::Two, 5)?;
        assert_eq!(board, before);

        Searcher::default().search(&mut board, 3, -1_000, 1_000, true, Player::Two)?;
        assert_eq!(board, before);
        Ok(())
    }

    #[test]
    pub fn pruning_matches_minimax() -> Result<()> {
        for position in ["", "4", "4453", "112233", "334455", "44444433", "7162533"].iter() {
            for &order in [MoveOrder::CenterFirst, MoveOrder::Ascending].iter() {
                for depth in 1..=4 {
                    let mut board = Board::from_moves(position)?;
                    if board.outcome() != GameOutcome::Ongoing {
                        continue;
                    }
                    let player = to_move(&board);

                    let mut pruned = Searcher::new(order);
                    let mut full = Searcher::new(order);
                    let a = pruned.best_move(&mut board, player, depth)?;
                    let b = full.best_move_unpruned(&mut board, player, depth)?;

                    assert_eq!((a.column, a.score), (b.column, b.score), "{} at depth {}", position, depth);
                    assert!(pruned.node_count <= full.node_count);

                    let value = pruned.search(&mut board, depth, -1_000_000, 1_000_000, true, player)?;
                    let exact = full.minimax(&mut board, depth, true, player)?;
                    assert_eq!(value, exact);
                }
            }
        }
        Ok(())
    }

    #[test]
    pub fn depth_one_is_single_ply() -> Result<()> {
        let mut board = Board::new();
        let evaluator = Evaluator::default();

        // first move with the best immediate evaluation, in generation order
        let mut expected: Option<(usize, i32)> = None;
        for column in MoveGenerator::new(board.width(), MoveOrder::CenterFirst).legal_moves(&board) {
            board.drop(column, Player::One)?;
            let score = evaluator.evaluate(&board, Player::One);
            board.undo(column)?;
            if expected.map_or(true, |(_, best)| score > best) {
                expected = Some((column, score));
            }
        }

        let found = Searcher::default().best_move(&mut board, Player::One, 1)?;
        assert_eq!(Some((found.column, found.score)), expected);
        assert_eq!(found.column, 3);
        Ok(())
    }

    #[test]
    pub fn takes_immediate_win() -> Result<()> {
        for depth in 1..=5 {
            let mut board = Board::new();
            for column in 0..3 {
                board.drop(column, Player::One)?;
            }
            board.drop(6, Player::Two)?;
            board.drop(6, Player::Two)?;

            for &order in [MoveOrder::CenterFirst, MoveOrder::Ascending].iter() {
                let found = Searcher::new(order).best_move(&mut board, Player::One, depth)?;
                assert_eq!(found.column, 3);
                assert_eq!(found.score, win_score(board.num_moves() + 1));
            }
        }
        Ok(())
    }

    #[test]
    pub fn blocks_opponent_win() -> Result<()> {
        let mut board = Board::new();
        for column in 0..3 {
            board.drop(column, Player::Two)?;
        }
        board.drop(6, Player::One)?;
        board.drop(6, Player::One)?;

        let found = Searcher::new(MoveOrder::Ascending).best_move(&mut board, Player::One, 2)?;
        assert_eq!(found.column, 3);
        assert!(found.score > -win_score(0) / 2);
        Ok(())
    }

    #[test]
    pub fn search_errors() -> Result<()> {
        let mut board = Board::new();
        assert_eq!(
            Searcher::default().best_move(&mut board, Player::One, 0),
            Err(SearchError::InvalidDepth)
        );

        let mut won = Board::from_moves("1212121")?;
        assert_eq!(
            Searcher::default().best_move(&mut won, Player::Two, 3),
            Err(SearchError::GameOver)
        );
        Ok(())
    }

    #[test]
    pub fn config_validation() {
        assert!(GameConfig::default().validate().is_ok());
        assert!(BenchmarkConfig::default().validate().is_ok());

        let small = GameConfig {
            rows: 3,
            ..GameConfig::default()
        };
        assert!(matches!(small.validate(), Err(ConfigError::Dimensions { rows: 3, .. })));

        let wide = GameConfig {
            cols: 17,
            ..GameConfig::default()
        };
        assert!(wide.validate().is_err());
        assert!(Board::with_dimensions(0, 0).is_err());

        let shallow = GameConfig {
            depth: 0,
            ..GameConfig::default()
        };
        assert_eq!(shallow.validate(), Err(ConfigError::Depth(0)));

        let no_depths = BenchmarkConfig {
            depths: vec![],
            ..BenchmarkConfig::default()
        };
        assert_eq!(no_depths.validate(), Err(ConfigError::NoDepths));

        let no_games = BenchmarkConfig {
            games: 0,
            ..BenchmarkConfig::default()
        };
        assert_eq!(no_games.validate(), Err(ConfigError::Games));

        let bad_opponent = BenchmarkConfig {
            opponent: Opponent::Minimax(0),
            ..BenchmarkConfig::default()
        };
        assert_eq!(bad_opponent.validate(), Err(ConfigError::Depth(0)));
    }

    #[test]
    pub fn seeded_game_is_reproducible() -> Result<()> {
        let config = BenchmarkConfig::default();

        let first = benchmark::play_game(&config, 2, &mut StdRng::seed_from_u64(42))?;
        let second = benchmark::play_game(&config, 2, &mut StdRng::seed_from_u64(42))?;

        assert_eq!(first.result, second.result);
        assert_eq!(first.agent, second.agent);
        assert_eq!(first.moves, second.moves);
        assert_eq!(first.nodes, second.nodes);
        assert_eq!(first.search_times.len(), second.search_times.len());
        Ok(())
    }

    #[test]
    pub fn benchmark_is_reproducible() -> Result<()> {
        let config = BenchmarkConfig {
            depths: vec![1, 2, 3],
            games: 6,
            seed: 7,
            ..BenchmarkConfig::default()
        }
        .validate()?;

        let sequential = benchmark::run(&config, false)?;
        let again = benchmark::run(&config, false)?;
        let parallel = benchmark::run(
            &BenchmarkConfig {
                parallel: true,
                ..config.clone()
            },
            false,
        )?;

        let counts = |report: &benchmark::BenchmarkReport| -> Vec<(u32, usize, usize, usize, usize)> {
            report
                .depths
                .iter()
                .map(|d| (d.depth, d.wins, d.losses, d.draws, d.searches))
                .collect()
        };
        assert_eq!(counts(&sequential), counts(&again));
        assert_eq!(counts(&sequential), counts(&parallel));

        for depth in sequential.depths.iter() {
            assert_eq!(depth.games, 6);
            assert_eq!(depth.wins + depth.losses + depth.draws, 6);
        }

        // search time grows with the positions visited; node counts are
        // reproducible where wall-clock means on a shared machine are not
        let nodes: Vec<usize> = sequential.speed.iter().map(|s| s.nodes).collect();
        assert_eq!(nodes, again.speed.iter().map(|s| s.nodes).collect::<Vec<_>>());
        assert!(nodes.windows(2).all(|pair| pair[0] < pair[1]));
        Ok(())
    }

    mod slow_logger {
        use log::{Log, Metadata, Record};

        use std::cell::Cell;
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Once;
        use std::time::Duration;

        pub const DELAY: Duration = Duration::from_millis(50);

        thread_local! {
            static ENABLED: Cell<bool> = Cell::new(false);
        }

        struct SlowLogger {
            calls: AtomicUsize,
        }

        impl Log for SlowLogger {
            fn enabled(&self, _: &Metadata) -> bool {
                ENABLED.with(|enabled| enabled.get())
            }

            fn log(&self, record: &Record) {
                if self.enabled(record.metadata()) {
                    self.calls.fetch_add(1, Ordering::SeqCst);
                    std::thread::sleep(DELAY);
                }
            }

            fn flush(&self) {}
        }

        static LOGGER: SlowLogger = SlowLogger {
            calls: AtomicUsize::new(0),
        };
        static INIT: Once = Once::new();

        /// Runs `f` with every log record on this thread delayed by `DELAY`,
        /// returning its output and the number of records logged
        pub fn with_slow_logging<T>(f: impl FnOnce() -> T) -> (T, usize) {
            INIT.call_once(|| {
                if log::set_logger(&LOGGER).is_ok() {
                    log::set_max_level(log::LevelFilter::Debug);
                }
            });

            ENABLED.with(|enabled| enabled.set(true));
            let before = LOGGER.calls.load(Ordering::SeqCst);
            let output = f();
            let calls = LOGGER.calls.load(Ordering::SeqCst) - before;
            ENABLED.with(|enabled| enabled.set(false));
            (output, calls)
        }
    }

    #[test]
    pub fn search_times_exclude_logging() -> Result<()> {
        let (output, logged) = slow_logger::with_slow_logging(|| -> Result<_> {
            let record = benchmark::play_game(&BenchmarkConfig::default(), 1, &mut StdRng::seed_from_u64(1))?;
            let speed = benchmark::speed_profile(&BenchmarkConfig {
                depths: vec![1],
                ..BenchmarkConfig::default()
            })?;
            Ok((record, speed))
        });
        let (record, speed) = output?;

        // every search logs its result
        assert!(logged > record.search_times.len());
        assert!(!record.search_times.is_empty());
        assert!(record.search_times.iter().all(|&time| time < slow_logger::DELAY));
        assert!(speed[0].secs < slow_logger::DELAY.as_secs_f64());
        Ok(())
    }

    #[test]
    pub fn depth_report_aggregates() {
        use std::time::Duration;

        let record = |result, millis: &[u64]| benchmark::GameRecord {
            result,
            agent: Player::One,
            search_times: millis.iter().map(|&m| Duration::from_millis(m)).collect(),
            nodes: 10 * millis.len(),
            moves: 2 * millis.len(),
        };
        let records = vec![
            record(GameResult::Win, &[10, 30]),
            record(GameResult::Win, &[20]),
            record(GameResult::Draw, &[40, 40, 40]),
            record(GameResult::Loss, &[60]),
        ];

        let report = benchmark::DepthReport::from_records(3, &records);
        assert_eq!((report.wins, report.losses, report.draws), (2, 1, 1));
        assert_eq!(report.searches, 7);
        assert!((report.win_rate - 0.5).abs() < 1e-9);
        assert!((report.total_search_secs - 0.24).abs() < 1e-9);
        assert!((report.max_search_secs - 0.06).abs() < 1e-9);
        assert!((report.mean_game_search_secs - 0.06).abs() < 1e-9);
        assert!((report.mean_nodes - 10.0).abs() < 1e-9);
    }

    #[test]
    pub fn minimax_opponent_games_finish() -> Result<()> {
        let config = BenchmarkConfig {
            opponent: Opponent::Minimax(1),
            ..BenchmarkConfig::default()
        };
        let record = benchmark::play_game(&config, 3, &mut StdRng::seed_from_u64(3))?;
        assert!(record.moves >= 7);
        assert!(!record.search_times.is_empty());
        Ok(())
    }

    #[test]
    pub fn board_display() -> Result<()> {
        let board = Board::from_moves("45")?;
        let text = board.to_string();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], ". . . . . . .");
        assert_eq!(lines[5], ". . . X O . .");
        assert_eq!(lines[6], "1 2 3 4 5 6 7");
        Ok(())
    }

    #[test]
    pub fn error_messages() {
        assert_eq!(InvalidMoveError::ColumnFull(3).to_string(), "column 3 is full");
        assert_eq!(
            SearchError::from(InvalidMoveError::ColumnEmpty(2)).to_string(),
            "internal invariant violated during search: column 2 is empty"
        );
        assert_eq!(
            ConfigError::Depth(0).to_string(),
            "invalid search depth 0, depth must be at least 1"
        );
    }
}
