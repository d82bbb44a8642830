use anyhow::Result;
use crossterm::{
    cursor::MoveTo,
    style::{style, Attribute, Color, PrintStyledContent},
    QueueableCommand,
};

use std::io::{stdout, Write};

use connect4_minimax::{Board, Cell};

/// Draws the board in colour below the cursor, or as plain text when `plain` is set
pub fn draw(board: &Board, plain: bool) -> Result<()> {
    if plain {
        println!("{}\n", board);
        return Ok(());
    }

    let mut stdout = stdout();

    let cols: String = (1..=board.width()).map(|x| (x % 10).to_string()).collect();
    stdout.queue(PrintStyledContent(style(cols + "\n")))?;
    for _ in 0..board.height() {
        stdout.queue(PrintStyledContent(style("\n")))?;
    }
    stdout.flush()?;

    // the cursor now sits on the line of the bottom row
    let (origin_x, origin_y) = crossterm::cursor::position()?;

    for row in 0..board.height() {
        for column in 0..board.width() {
            let (pos_x, pos_y) = (
                origin_x + column as u16,
                origin_y - (board.height() - 1 - row) as u16,
            );

            stdout
                .queue(MoveTo(pos_x, pos_y))?
                .queue(PrintStyledContent(
                    style("O")
                        .attribute(Attribute::Bold)
                        .on(Color::DarkBlue)
                        .with(match board.cell(row, column) {
                            Cell::PlayerOne => Color::Red,
                            Cell::PlayerTwo => Color::Yellow,
                            Cell::Empty => Color::DarkBlue,
                        }),
                ))?;
        }
    }
    stdout
        .queue(MoveTo(origin_x + board.width() as u16, origin_y))?
        .queue(PrintStyledContent(style("\n")))?;
    stdout.flush()?;
    Ok(())
}
