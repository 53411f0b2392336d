//! The positioned graph as a rendering surface consumes it, plus the camera
//! transform applied to the whole scene at paint time.

use serde::Serialize;

use crate::config::LayoutConfig;
use crate::tree::{NodeKind, PathTree, Point, Segment, TreeLayout};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneNode {
    /// Full path of the node.
    pub id: String,
    pub kind: NodeKind,
    pub depth: usize,
    pub x: f32,
    pub y: f32,
    pub label: String,
    pub width: f32,
    pub height: f32,
    pub radius: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneConnector {
    pub parent: String,
    pub segments: Vec<Segment>,
    /// Same geometry as `segments`, as SVG path data.
    pub path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub nodes: Vec<SceneNode>,
    pub connectors: Vec<SceneConnector>,
    pub columns: Vec<f32>,
    pub viewport: Viewport,
}

impl Scene {
    pub fn from_layout(tree: &PathTree, layout: &TreeLayout, config: &LayoutConfig) -> Self {
        let nodes = tree
            .iter()
            .map(|(id, node)| SceneNode {
                id: node.path.clone(),
                kind: node.kind,
                depth: node.depth,
                x: node.position.x,
                y: node.position.y,
                label: node.name.clone(),
                width: layout.box_width(id),
                height: config.box_height,
                radius: config.corner_radius,
            })
            .collect();

        let connectors = layout
            .connectors
            .iter()
            .map(|connector| SceneConnector {
                parent: tree.node(connector.parent).path.clone(),
                segments: connector.segments.clone(),
                path: connector.to_path_data(),
            })
            .collect();

        let viewport = if tree.is_empty() {
            Viewport {
                width: config.margin,
                height: config.margin,
            }
        } else {
            Viewport {
                width: layout.bounds.right() + config.margin,
                height: layout.bounds.bottom() + config.margin,
            }
        };

        Self {
            nodes,
            connectors,
            columns: layout.column_offsets.clone(),
            viewport,
        }
    }

    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string_pretty(self).map_err(|e| format!("Failed to encode JSON: {}", e))
    }
}

/// Pan/zoom transform. Interaction lives with the consumer; the renderer
/// only applies whatever camera it is handed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub pan_x: f32,
    pub pan_y: f32,
    /// 1.0 = 100%.
    pub zoom: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            pan_x: 0.0,
            pan_y: 0.0,
            zoom: 1.0,
        }
    }
}

impl Camera {
    pub fn new(pan_x: f32, pan_y: f32, zoom: f32) -> Result<Self, String> {
        if !zoom.is_finite() || zoom <= 0.0 {
            return Err(format!("Invalid zoom value: {}", zoom));
        }
        if !pan_x.is_finite() || !pan_y.is_finite() {
            return Err(format!("Invalid pan offset: ({}, {})", pan_x, pan_y));
        }
        Ok(Self { pan_x, pan_y, zoom })
    }

    pub fn canvas_to_screen(&self, point: Point) -> Point {
        Point::new(
            point.x * self.zoom + self.pan_x,
            point.y * self.zoom + self.pan_y,
        )
    }

    pub fn screen_to_canvas(&self, point: Point) -> Point {
        Point::new(
            (point.x - self.pan_x) / self.zoom,
            (point.y - self.pan_y) / self.zoom,
        )
    }

    /// Size of the painted surface needed to show `viewport` under this camera.
    pub fn screen_size(&self, viewport: Viewport) -> (f32, f32) {
        (viewport.width * self.zoom, viewport.height * self.zoom)
    }

    pub fn transform_attr(&self) -> String {
        format!(
            "translate({:.2},{:.2}) scale({:.4})",
            self.pan_x, self.pan_y, self.zoom
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::FixedWidthMeasure;
    use crate::tree::LayoutEngine;

    fn scene(paths: &[&str]) -> Scene {
        let config = LayoutConfig {
            font_size: 10.0,
            ..LayoutConfig::default()
        };
        let mut tree = PathTree::build(paths).unwrap();
        let mut measure = FixedWidthMeasure::new(1.0);
        let layout = LayoutEngine::new(&mut measure, config.clone())
            .layout(&mut tree)
            .unwrap();
        Scene::from_layout(&tree, &layout, &config)
    }

    #[test]
    fn nodes_carry_box_geometry() {
        let scene = scene(&["src/main.rs"]);
        let main = scene.nodes.iter().find(|n| n.id == "src/main.rs").unwrap();
        assert_eq!(main.label, "main.rs");
        assert_eq!(main.kind, NodeKind::Leaf);
        assert_eq!(main.depth, 1);
        assert_eq!(main.width, 110.0);
        assert_eq!(main.height, 32.0);
        assert_eq!(main.radius, 8.0);
        assert_eq!((main.x, main.y), (130.0, 0.0));
    }

    #[test]
    fn viewport_adds_margin_to_extent() {
        let scene = scene(&["src/main.rs", "src/lib.rs"]);
        // main.rs ends at 130 + 110; second row ends at 48 + 32.
        assert_eq!(scene.viewport.width, 260.0);
        assert_eq!(scene.viewport.height, 100.0);
    }

    #[test]
    fn empty_scene_is_just_margin() {
        let scene = scene(&[]);
        assert!(scene.nodes.is_empty());
        assert_eq!(scene.viewport, Viewport { width: 20.0, height: 20.0 });
    }

    #[test]
    fn json_uses_lowercase_kinds() {
        let json = scene(&["a/b"]).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["nodes"][0]["kind"], "directory");
        assert_eq!(value["nodes"][1]["kind"], "leaf");
        assert_eq!(value["connectors"][0]["parent"], "a");
    }

    #[test]
    fn camera_round_trips_points() {
        let camera = Camera::new(15.0, -5.0, 2.0).unwrap();
        let screen = camera.canvas_to_screen(Point::new(10.0, 10.0));
        assert_eq!(screen, Point::new(35.0, 15.0));
        assert_eq!(camera.screen_to_canvas(screen), Point::new(10.0, 10.0));
    }

    #[test]
    fn camera_rejects_bad_zoom() {
        assert!(Camera::new(0.0, 0.0, 0.0).is_err());
        assert!(Camera::new(0.0, 0.0, f32::NAN).is_err());
        assert!(Camera::new(f32::INFINITY, 0.0, 1.0).is_err());
    }
}
