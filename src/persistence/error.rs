use std::fmt;

use crate::GridPos;

/// Reasons a snapshot cannot be turned back into a running game
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadError {
    Parse(String),
    UnsupportedVersion { found: u32 },
    InvalidDimensions { width: i32, height: i32 },
    GridSizeMismatch { expected: usize, actual: usize },
    PositionOutOfBounds { pos: GridPos },
    ObstacleConflict { pos: GridPos },
    UnknownEnemyKind(String),
    UnknownFruitKind(String),
    UnknownFlavor(String),
    InvalidPlayerIndex { index: u8 },
    InvalidTuning(String),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "snapshot is not valid json: {msg}"),
            Self::UnsupportedVersion { found } => write!(f, "unsupported snapshot version: {found}"),
            Self::InvalidDimensions { width, height } => {
                write!(f, "invalid map dimensions: {width}x{height}")
            }
            Self::GridSizeMismatch { expected, actual } => write!(
                f,
                "ice grid size mismatch: expected {expected} cells, got {actual}"
            ),
            Self::PositionOutOfBounds { pos } => {
                write!(f, "position out of bounds: row {} col {}", pos.row, pos.col)
            }
            Self::ObstacleConflict { pos } => {
                write!(f, "obstacle cannot be placed at row {} col {}", pos.row, pos.col)
            }
            Self::UnknownEnemyKind(tag) => write!(f, "unknown enemy kind: {tag:?}"),
            Self::UnknownFruitKind(tag) => write!(f, "unknown fruit kind: {tag:?}"),
            Self::UnknownFlavor(tag) => write!(f, "unknown flavor: {tag:?}"),
            Self::InvalidPlayerIndex { index } => write!(f, "invalid or duplicate player index: {index}"),
            Self::InvalidTuning(msg) => write!(f, "invalid tuning: {msg}"),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<serde_json::Error> for LoadError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}
