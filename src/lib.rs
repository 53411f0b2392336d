//! Lay out lists of slash-delimited paths as column/row tree diagrams.
//!
//! [`tree::PathTree::build`] turns flat paths into a node graph,
//! [`tree::LayoutEngine`] positions it using a [`fonts::TextMeasure`] oracle,
//! and [`scene::Scene`] hands the result to a renderer.

pub mod config;
pub mod error;
pub mod export;
pub mod fonts;
pub mod input;
pub mod logging;
pub mod render;
pub mod scene;
pub mod theme;
pub mod tree;
pub mod xml;

pub use config::LayoutConfig;
pub use error::{LayoutError, MeasureError, TreeError};
pub use fonts::{CosmicTextMeasure, FixedWidthMeasure, TextMeasure};
pub use scene::{Camera, Scene};
pub use tree::{LayoutEngine, PathTree, TreeLayout};
