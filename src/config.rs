use std::path::Path;

use serde::{Deserialize, Serialize};

const FONT_SIZE: f32 = 14.0;
const BOX_PADDING: f32 = 40.0;
const COLUMN_GAP: f32 = 60.0;
const BOX_HEIGHT: f32 = 32.0;
const ROW_GAP: f32 = 16.0;
const CORNER_RADIUS: f32 = 8.0;
const MARGIN: f32 = 20.0;

/// Geometry constants of the tree diagram. Every field has a default, so a
/// config file only needs the values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    /// Horizontal padding added to a measured label to get its box width.
    #[serde(default = "default_box_padding")]
    pub box_padding: f32,
    #[serde(default = "default_column_gap")]
    pub column_gap: f32,
    #[serde(default = "default_box_height")]
    pub box_height: f32,
    #[serde(default = "default_row_gap")]
    pub row_gap: f32,
    #[serde(default = "default_corner_radius")]
    pub corner_radius: f32,
    /// Space reserved right of and below the diagram in the viewport.
    #[serde(default = "default_margin")]
    pub margin: f32,
    #[serde(default)]
    pub monospace_labels: bool,
}

fn default_font_size() -> f32 {
    FONT_SIZE
}
fn default_box_padding() -> f32 {
    BOX_PADDING
}
fn default_column_gap() -> f32 {
    COLUMN_GAP
}
fn default_box_height() -> f32 {
    BOX_HEIGHT
}
fn default_row_gap() -> f32 {
    ROW_GAP
}
fn default_corner_radius() -> f32 {
    CORNER_RADIUS
}
fn default_margin() -> f32 {
    MARGIN
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            font_size: FONT_SIZE,
            box_padding: BOX_PADDING,
            column_gap: COLUMN_GAP,
            box_height: BOX_HEIGHT,
            row_gap: ROW_GAP,
            corner_radius: CORNER_RADIUS,
            margin: MARGIN,
            monospace_labels: false,
        }
    }
}

impl LayoutConfig {
    /// Vertical distance between two consecutive rows.
    pub fn row_height(&self) -> f32 {
        self.box_height + self.row_gap
    }

    pub fn from_toml(content: &str) -> Result<Self, String> {
        let config: LayoutConfig = toml::from_str(content)
            .map_err(|e| format!("Failed to parse layout config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {}", path.display(), e))?;
        Self::from_toml(&content)
    }

    /// Reject negative or non-finite geometry, and a zero font size or box
    /// height. The layout engine checks this before every run.
    pub fn validate(&self) -> Result<(), String> {
        let fields = [
            ("font_size", self.font_size),
            ("box_padding", self.box_padding),
            ("column_gap", self.column_gap),
            ("box_height", self.box_height),
            ("row_gap", self.row_gap),
            ("corner_radius", self.corner_radius),
            ("margin", self.margin),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("Invalid layout config value {} = {}", name, value));
            }
        }
        if self.font_size == 0.0 || self.box_height == 0.0 {
            return Err("font_size and box_height must be positive".to_string());
        }
        Ok(())
    }
}
