//! Plain terminal printer for board snapshots.
//!
//! Each tile is one coloured letter; the top row is printed first so the
//! picture matches the board's bottom-up coordinates.

use std::io::Write;

use anyhow::Result;
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};

use match3_core::BoardSnapshot;
use match3_types::TileType;

/// Terminal colour for a tile kind
pub fn tile_color(kind: TileType) -> Color {
    match kind {
        TileType::RED => Color::Red,
        TileType::GREEN => Color::Green,
        TileType::BLUE => Color::Blue,
        TileType::YELLOW => Color::Yellow,
        TileType::PURPLE => Color::Magenta,
        TileType::ORANGE => Color::DarkYellow,
        TileType::WHITE => Color::White,
        _ => Color::Grey,
    }
}

/// Single-character label for a tile kind
pub fn tile_glyph(kind: TileType) -> char {
    match kind.as_str() {
        "custom" => char::from_digit(u32::from(kind.0 % 36), 36).unwrap_or('?'),
        name => name.chars().next().unwrap_or('?').to_ascii_uppercase(),
    }
}

/// Queue the board, one line per row, top row first.
pub fn write_board<W: Write>(out: &mut W, snapshot: &BoardSnapshot) -> Result<()> {
    for row in snapshot.board.iter().rev() {
        for (column, &code) in row.iter().enumerate() {
            let kind = TileType(code);
            if column > 0 {
                out.queue(Print(' '))?;
            }
            out.queue(SetForegroundColor(tile_color(kind)))?;
            out.queue(Print(tile_glyph(kind)))?;
        }
        out.queue(ResetColor)?;
        out.queue(Print("\r\n"))?;
    }
    out.flush()?;
    Ok(())
}
