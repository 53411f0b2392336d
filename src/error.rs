use thiserror::Error;

/// Rejected input at the tree builder boundary. The whole batch fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("path #{index} is empty")]
    EmptyPath { index: usize },

    #[error("path #{index} ({path:?}) contains an empty segment")]
    EmptySegment { index: usize, path: String },
}

/// Failure of the text measurement oracle.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeasureError {
    #[error("no fonts available for text measurement")]
    NoFonts,

    #[error("measured width for {text:?} is not usable: {width}")]
    InvalidWidth { text: String, width: f32 },

    #[error("{0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("invalid layout config: {0}")]
    Config(String),

    #[error("text measurement failed: {0}")]
    Measure(#[from] MeasureError),
}
