//! Supported development boards.

use fpgaflow_platform::Board;

pub mod pipistrello;

pub use pipistrello::Pipistrello;

pub const BOARDS: &[&dyn Board] = &[&Pipistrello];

pub fn get_board(name: &str) -> Option<&'static dyn Board> {
    BOARDS.iter().copied().find(|board| board.name() == name)
}
