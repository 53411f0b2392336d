//! Path tree construction and column/row layout.

mod builder;
mod layout;
mod route;
mod types;

pub use layout::{LayoutEngine, TreeLayout};
pub use route::{Connector, Segment};
pub use types::{BBox, Node, NodeId, NodeKind, PathTree, Point};
