use std::fmt::Write;

use serde::Serialize;

use crate::config::LayoutConfig;

use super::layout::DisplayOrder;
use super::types::{NodeId, PathTree, Point};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
}

impl Segment {
    fn new(from: Point, to: Point) -> Self {
        Self { from, to }
    }
}

/// Orthogonal route from a directory to all of its children: a stem out of
/// the parent's right edge, one shared vertical trunk, then a horizontal
/// stub into each child's left edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Connector {
    pub parent: NodeId,
    pub trunk_x: f32,
    pub segments: Vec<Segment>,
}

impl Connector {
    /// SVG path data using absolute move/line commands.
    pub fn to_path_data(&self) -> String {
        let mut data = String::new();
        let mut pen: Option<Point> = None;

        for segment in &self.segments {
            if pen != Some(segment.from) {
                let _ = write!(data, "M {:.2} {:.2} ", segment.from.x, segment.from.y);
            }
            if segment.from.y == segment.to.y {
                let _ = write!(data, "H {:.2} ", segment.to.x);
            } else {
                let _ = write!(data, "V {:.2} ", segment.to.y);
            }
            pen = Some(segment.to);
        }

        data.truncate(data.trim_end().len());
        data
    }
}

pub(super) fn route_connectors(
    tree: &PathTree,
    display: &DisplayOrder,
    box_widths: &[f32],
    offsets: &[f32],
    config: &LayoutConfig,
) -> Vec<Connector> {
    let half_height = config.box_height / 2.0;
    let mut connectors = Vec::new();

    for (id, node) in tree.iter() {
        let children = display.children(id);
        if children.is_empty() {
            continue;
        }

        let parent_right = node.position.x + box_widths[id.index()];
        let parent_center = node.position.y + half_height;
        let child_left = offsets[node.depth + 1];
        let trunk_x = (parent_right + child_left) / 2.0;

        let child_centers: Vec<f32> = children
            .iter()
            .map(|child| tree.node(*child).position.y + half_height)
            .collect();
        let lowest = child_centers
            .iter()
            .copied()
            .fold(parent_center, f32::max);

        let mut segments = Vec::with_capacity(children.len() + 2);
        segments.push(Segment::new(
            Point::new(parent_right, parent_center),
            Point::new(trunk_x, parent_center),
        ));
        if lowest > parent_center {
            segments.push(Segment::new(
                Point::new(trunk_x, parent_center),
                Point::new(trunk_x, lowest),
            ));
        }
        for center in child_centers {
            segments.push(Segment::new(
                Point::new(trunk_x, center),
                Point::new(child_left, center),
            ));
        }

        connectors.push(Connector {
            parent: id,
            trunk_x,
            segments,
        });
    }

    connectors
}
