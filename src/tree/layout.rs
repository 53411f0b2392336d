use std::collections::HashMap;

use tracing::debug;

use crate::config::LayoutConfig;
use crate::error::{LayoutError, MeasureError};
use crate::fonts::TextMeasure;

use super::route::{Connector, route_connectors};
use super::types::{BBox, NodeId, NodeKind, PathTree, Point};

/// Result of one layout run. Node positions and sibling ranks are written
/// back onto the tree; everything else lives here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeLayout {
    /// Measured label width plus box padding, indexed by `NodeId`.
    pub box_widths: Vec<f32>,
    /// One entry per depth except the deepest.
    pub column_widths: Vec<f32>,
    /// Left x of every column, one entry per depth.
    pub column_offsets: Vec<f32>,
    pub connectors: Vec<Connector>,
    pub bounds: BBox,
}

impl TreeLayout {
    pub fn box_width(&self, id: NodeId) -> f32 {
        self.box_widths[id.index()]
    }
}

/// Display order of every sibling group, computed once per run.
pub(super) struct DisplayOrder {
    pub roots: Vec<NodeId>,
    pub children: Vec<Vec<NodeId>>,
}

impl DisplayOrder {
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.children[id.index()]
    }
}

/// Column/row layout engine for path trees.
pub struct LayoutEngine<'a, T: TextMeasure> {
    measure: &'a mut T,
    config: LayoutConfig,
}

impl<'a, T: TextMeasure> LayoutEngine<'a, T> {
    pub fn new(measure: &'a mut T, config: LayoutConfig) -> Self {
        Self { measure, config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lay out the whole tree from scratch.
    ///
    /// The config is validated and all labels are measured before anything
    /// is written back, so a failure leaves `tree` exactly as it was.
    pub fn layout(&mut self, tree: &mut PathTree) -> Result<TreeLayout, LayoutError> {
        self.config.validate().map_err(LayoutError::Config)?;

        if tree.is_empty() {
            return Ok(TreeLayout::default());
        }

        let label_widths = self.measure_labels(tree)?;
        let box_widths: Vec<f32> = label_widths
            .iter()
            .map(|w| w + self.config.box_padding)
            .collect();

        let display = sibling_order(tree);
        for (rank, &id) in display.roots.iter().enumerate() {
            tree.node_mut(id).order = rank;
        }
        for group in &display.children {
            for (rank, &id) in group.iter().enumerate() {
                tree.node_mut(id).order = rank;
            }
        }

        let column_widths = column_widths(tree, &box_widths);
        let column_offsets = column_offsets(&column_widths, self.config.column_gap);

        let row_height = self.config.row_height();
        let mut next_y = 0.0;
        for &root in &display.roots {
            next_y = place(tree, &display, &column_offsets, row_height, root, next_y);
        }

        let connectors = route_connectors(tree, &display, &box_widths, &column_offsets, &self.config);
        let bounds = bounds(tree, &box_widths, self.config.box_height);

        debug!(
            nodes = tree.len(),
            columns = column_offsets.len(),
            width = bounds.width,
            height = bounds.height,
            "laid out path tree"
        );

        Ok(TreeLayout {
            box_widths,
            column_widths,
            column_offsets,
            connectors,
            bounds,
        })
    }

    fn measure_labels(&mut self, tree: &PathTree) -> Result<Vec<f32>, MeasureError> {
        let mut seen: HashMap<&str, f32> = HashMap::new();
        let mut widths = Vec::with_capacity(tree.len());

        for node in tree.nodes() {
            let width = match seen.get(node.name.as_str()) {
                Some(&width) => width,
                None => {
                    let width = self.measure_label(&node.name)?;
                    seen.insert(node.name.as_str(), width);
                    width
                }
            };
            widths.push(width);
        }

        Ok(widths)
    }

    fn measure_label(&mut self, label: &str) -> Result<f32, MeasureError> {
        let cleaned = crate::xml::sanitize_xml_text(label);
        let (width, _) = self.measure.measure_text(
            &cleaned,
            self.config.font_size,
            self.config.monospace_labels,
        )?;
        if !width.is_finite() || width < 0.0 {
            return Err(MeasureError::InvalidWidth {
                text: label.to_string(),
                width,
            });
        }
        Ok(width)
    }
}

/// Directories before leaves, then by name. The sort is stable, so equal
/// keys keep build order.
fn sibling_order(tree: &PathTree) -> DisplayOrder {
    let sorted = |ids: &[NodeId]| {
        let mut ids = ids.to_vec();
        ids.sort_by(|a, b| {
            let (a, b) = (tree.node(*a), tree.node(*b));
            sort_key(a.kind)
                .cmp(&sort_key(b.kind))
                .then_with(|| a.name.cmp(&b.name))
        });
        ids
    };

    DisplayOrder {
        roots: sorted(tree.roots()),
        children: tree.nodes().iter().map(|n| sorted(&n.children)).collect(),
    }
}

fn sort_key(kind: NodeKind) -> u8 {
    match kind {
        NodeKind::Directory => 0,
        NodeKind::Leaf => 1,
    }
}

/// Widest parent box per depth. Nodes without children never widen a
/// column; the deepest depth gets no entry since nothing sits to its right.
/// Only the maximum matters, so nodes are visited in arena order.
fn column_widths(tree: &PathTree, box_widths: &[f32]) -> Vec<f32> {
    let max_depth = tree.max_depth().unwrap_or(0);
    let mut widths = vec![0.0_f32; max_depth];

    for (id, node) in tree.iter() {
        if node.has_children() {
            let width = &mut widths[node.depth];
            *width = width.max(box_widths[id.index()]);
        }
    }

    widths
}

fn column_offsets(widths: &[f32], gap: f32) -> Vec<f32> {
    let mut offsets = Vec::with_capacity(widths.len() + 1);
    offsets.push(0.0);
    for width in widths {
        let prev = offsets[offsets.len() - 1];
        offsets.push(prev + width + gap);
    }
    offsets
}

/// Place `id` and its subtree starting at `base_y`; returns the y of the
/// last node placed in the subtree.
///
/// Only the first sibling sits on `base_y`; later siblings start one row
/// below the previous subtree's last row.
fn place(
    tree: &mut PathTree,
    display: &DisplayOrder,
    offsets: &[f32],
    row_height: f32,
    id: NodeId,
    base_y: f32,
) -> f32 {
    let node = tree.node_mut(id);
    let y = if node.order > 0 {
        base_y + row_height
    } else {
        base_y
    };
    node.position = Point::new(offsets[node.depth], y);

    let mut last_y = y;
    for &child in display.children(id) {
        last_y = place(tree, display, offsets, row_height, child, last_y);
    }
    last_y
}

fn bounds(tree: &PathTree, box_widths: &[f32], box_height: f32) -> BBox {
    let mut min_x = f32::MAX;
    let mut min_y = f32::MAX;
    let mut max_x = f32::MIN;
    let mut max_y = f32::MIN;

    for (id, node) in tree.iter() {
        min_x = min_x.min(node.position.x);
        min_y = min_y.min(node.position.y);
        max_x = max_x.max(node.position.x + box_widths[id.index()]);
        max_y = max_y.max(node.position.y + box_height);
    }

    BBox::new(min_x, min_y, max_x - min_x, max_y - min_y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::FixedWidthMeasure;

    /// 10px per char.
    fn measure() -> FixedWidthMeasure {
        FixedWidthMeasure::new(1.0)
    }

    fn config() -> LayoutConfig {
        LayoutConfig {
            font_size: 10.0,
            ..LayoutConfig::default()
        }
    }

    fn laid_out(paths: &[&str]) -> (PathTree, TreeLayout) {
        let mut tree = PathTree::build(paths).unwrap();
        let mut measure = measure();
        let layout = LayoutEngine::new(&mut measure, config())
            .layout(&mut tree)
            .unwrap();
        (tree, layout)
    }

    fn pos(tree: &PathTree, path: &str) -> Point {
        tree.get(path).unwrap().position
    }

    struct FailingMeasure;

    impl TextMeasure for FailingMeasure {
        fn measure_text(&mut self, _: &str, _: f32, _: bool) -> Result<(f32, f32), MeasureError> {
            Err(MeasureError::Unavailable("no rendering context".to_string()))
        }
    }

    #[test]
    fn scenario_mixed_roots() {
        let (tree, _) = laid_out(&["a/x.js", "a/y.js", "b.js"]);

        assert_eq!(tree.get("a").unwrap().order, 0);
        assert_eq!(tree.get("b.js").unwrap().order, 1);
        assert_eq!(tree.get("a/x.js").unwrap().order, 0);
        assert_eq!(tree.get("a/y.js").unwrap().order, 1);

        assert_eq!(pos(&tree, "a").y, 0.0);
        assert_eq!(pos(&tree, "a/x.js").y, 0.0);
        assert_eq!(pos(&tree, "a/y.js").y, 48.0);
        assert_eq!(pos(&tree, "b.js").y, 96.0);
    }

    #[test]
    fn scenario_single_chain_is_one_row() {
        let (tree, layout) = laid_out(&["p/q/r.js"]);
        for (_, node) in tree.iter() {
            assert_eq!(node.position.y, 0.0);
            assert_eq!(node.order, 0);
        }
        assert_eq!(layout.bounds.height, 32.0);
    }

    #[test]
    fn scenario_three_leaves_one_row_apart() {
        let (tree, _) = laid_out(&["a/1.js", "a/2.js", "a/3.js"]);
        let ys: Vec<f32> = ["a/1.js", "a/2.js", "a/3.js"]
            .iter()
            .map(|p| pos(&tree, p).y)
            .collect();
        assert_eq!(ys, vec![0.0, 48.0, 96.0]);
    }

    #[test]
    fn directories_sort_before_leaves_regardless_of_name() {
        let (tree, _) = laid_out(&["root/a.txt", "root/z/inner.txt", "root/B.txt"]);
        assert_eq!(tree.get("root/z").unwrap().order, 0);
        // Uppercase sorts before lowercase in plain ordinal comparison.
        assert_eq!(tree.get("root/B.txt").unwrap().order, 1);
        assert_eq!(tree.get("root/a.txt").unwrap().order, 2);
    }

    #[test]
    fn stored_children_keep_build_order() {
        let (tree, _) = laid_out(&["d/b", "d/a"]);
        let d = tree.get("d").unwrap();
        let names: Vec<&str> = d
            .children
            .iter()
            .map(|id| tree.node(*id).name.as_str())
            .collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(tree.get("d/a").unwrap().order, 0);
    }

    #[test]
    fn column_width_uses_widest_parent_only() {
        // "src" = 30 + 40; "a-very-long-file-name.rs" is a leaf at depth 0.
        let (tree, layout) = laid_out(&["src/x.rs", "a-very-long-file-name.rs"]);
        assert_eq!(layout.column_widths, vec![70.0]);
        assert_eq!(layout.column_offsets, vec![0.0, 130.0]);
        assert_eq!(pos(&tree, "src/x.rs").x, 130.0);
    }

    #[test]
    fn column_width_ignores_input_order() {
        let (_, forward) = laid_out(&["a/x", "longer/y", "mid/z/q"]);
        let (_, reversed) = laid_out(&["mid/z/q", "longer/y", "a/x"]);
        // "longer" = 60 + 40.
        assert_eq!(forward.column_widths, vec![100.0, 50.0]);
        assert_eq!(forward.column_widths, reversed.column_widths);
        assert_eq!(forward.column_offsets, reversed.column_offsets);
    }

    #[test]
    fn offsets_accumulate_across_depths() {
        let (_, layout) = laid_out(&["ab/cdef/g"]);
        // ab: 20 + 40, cdef: 40 + 40.
        assert_eq!(layout.column_widths, vec![60.0, 80.0]);
        assert_eq!(layout.column_offsets, vec![0.0, 120.0, 260.0]);
    }

    #[test]
    fn sibling_subtrees_do_not_share_rows() {
        let (tree, _) = laid_out(&["r/a/1", "r/a/2", "r/b/1", "r/b/2/x"]);
        assert_eq!(pos(&tree, "r/a").y, 0.0);
        assert_eq!(pos(&tree, "r/a/2").y, 48.0);
        assert_eq!(pos(&tree, "r/b").y, 96.0);
        // "2" is a directory under r/b, so it comes before the leaf "1".
        assert_eq!(pos(&tree, "r/b/2").y, 96.0);
        assert_eq!(pos(&tree, "r/b/2/x").y, 96.0);
        assert_eq!(pos(&tree, "r/b/1").y, 144.0);
    }

    #[test]
    fn measurement_failure_leaves_tree_untouched() {
        let mut tree = PathTree::build(["a/b", "a/c"]).unwrap();
        let before = tree.nodes().to_vec();

        let mut measure = FailingMeasure;
        let err = LayoutEngine::new(&mut measure, LayoutConfig::default())
            .layout(&mut tree)
            .unwrap_err();

        assert!(matches!(err, LayoutError::Measure(MeasureError::Unavailable(_))));
        assert_eq!(tree.nodes(), before.as_slice());
    }

    #[test]
    fn invalid_config_is_rejected_before_layout() {
        let mut tree = PathTree::build(["a/b", "a/c/d"]).unwrap();
        let before = tree.nodes().to_vec();

        let config = LayoutConfig {
            column_gap: -500.0,
            ..config()
        };
        let mut measure = measure();
        let err = LayoutEngine::new(&mut measure, config)
            .layout(&mut tree)
            .unwrap_err();

        assert!(matches!(err, LayoutError::Config(ref msg) if msg.contains("column_gap")));
        assert_eq!(tree.nodes(), before.as_slice());
    }

    #[test]
    fn rejects_non_finite_widths() {
        let mut tree = PathTree::build(["a"]).unwrap();
        let mut measure = FixedWidthMeasure::new(f32::NAN);
        let err = LayoutEngine::new(&mut measure, LayoutConfig::default())
            .layout(&mut tree)
            .unwrap_err();
        assert!(matches!(
            err,
            LayoutError::Measure(MeasureError::InvalidWidth { .. })
        ));
    }

    #[test]
    fn empty_tree_has_empty_layout() {
        let (_, layout) = laid_out(&[]);
        assert_eq!(layout, TreeLayout::default());
    }

    #[test]
    fn relayout_is_idempotent() {
        let (mut tree, first) = laid_out(&["x/y/z", "x/a", "b", "x/y/c"]);
        let positions: Vec<Point> = tree.nodes().iter().map(|n| n.position).collect();

        let mut measure = measure();
        let second = LayoutEngine::new(&mut measure, config())
            .layout(&mut tree)
            .unwrap();

        assert_eq!(first, second);
        let again: Vec<Point> = tree.nodes().iter().map(|n| n.position).collect();
        assert_eq!(positions, again);
    }
}
