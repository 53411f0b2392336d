use crate::scene::{Camera, Scene, SceneNode};
use crate::theme::{Theme, font_family};
use crate::tree::NodeKind;
use crate::xml::escape_xml;

/// Style configuration for diagram rendering
#[derive(Debug, Clone)]
pub struct DiagramStyle {
    pub background: String,
    pub directory_fill: String,
    pub directory_fill_opacity: f32,
    pub directory_stroke: String,
    pub leaf_fill: String,
    pub leaf_stroke: String,
    pub text: String,
    pub connector_stroke: String,
    pub font_family: String,
    pub font_size: f32,
}

impl Default for DiagramStyle {
    fn default() -> Self {
        Self {
            background: "#ffffff".to_string(),
            directory_fill: "#f5f5f5".to_string(),
            directory_fill_opacity: 1.0,
            directory_stroke: "#333333".to_string(),
            leaf_fill: "#ffffff".to_string(),
            leaf_stroke: "#666666".to_string(),
            text: "#333333".to_string(),
            connector_stroke: "#999999".to_string(),
            font_family: font_family(false).to_string(),
            font_size: 14.0,
        }
    }
}

impl DiagramStyle {
    /// `font_size` and `monospace` must match what the layout measured with,
    /// or labels will not fit their boxes.
    pub fn from_theme(theme: &Theme, font_size: f32, monospace: bool) -> Self {
        let background = &theme.background_color;
        let text = pick_higher_contrast(background, &theme.text_color, &theme.panel_color);
        let connector =
            pick_higher_contrast(background, &theme.connector_color, &theme.text_color);

        Self {
            background: background.clone(),
            directory_fill: theme.panel_color.clone(),
            directory_fill_opacity: 0.12,
            directory_stroke: theme.directory_color.clone(),
            leaf_fill: background.clone(),
            leaf_stroke: theme.leaf_color.clone(),
            text,
            connector_stroke: connector,
            font_family: font_family(monospace).to_string(),
            font_size,
        }
    }
}

fn parse_hex_rgb(value: &str) -> Option<(f32, f32, f32)> {
    let hex = value.trim_start_matches('#');
    if hex.len() != 6 {
        return None;
    }

    let r = u8::from_str_radix(hex.get(0..2)?, 16).ok()? as f32 / 255.0;
    let g = u8::from_str_radix(hex.get(2..4)?, 16).ok()? as f32 / 255.0;
    let b = u8::from_str_radix(hex.get(4..6)?, 16).ok()? as f32 / 255.0;
    Some((r, g, b))
}

fn relative_luminance(color: (f32, f32, f32)) -> f32 {
    let linear = |v: f32| {
        if v <= 0.03928 {
            v / 12.92
        } else {
            ((v + 0.055) / 1.055).powf(2.4)
        }
    };

    let (r, g, b) = color;
    0.2126 * linear(r) + 0.7152 * linear(g) + 0.0722 * linear(b)
}

fn contrast_ratio(a: &str, b: &str) -> Option<f32> {
    let l1 = relative_luminance(parse_hex_rgb(a)?);
    let l2 = relative_luminance(parse_hex_rgb(b)?);
    let (hi, lo) = if l1 >= l2 { (l1, l2) } else { (l2, l1) };
    Some((hi + 0.05) / (lo + 0.05))
}

fn pick_higher_contrast(base: &str, primary: &str, secondary: &str) -> String {
    let p = contrast_ratio(base, primary).unwrap_or(0.0);
    let s = contrast_ratio(base, secondary).unwrap_or(0.0);

    if s > p {
        secondary.to_string()
    } else {
        primary.to_string()
    }
}

/// Render a laid-out scene to a standalone SVG document.
///
/// Connectors are drawn first so boxes sit on top of them. The camera
/// transform wraps the whole scene.
pub fn render_svg(scene: &Scene, style: &DiagramStyle, camera: &Camera) -> String {
    let (width, height) = camera.screen_size(scene.viewport);
    let mut svg = String::new();

    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.2}" height="{h:.2}" viewBox="0 0 {w:.2} {h:.2}">"#,
        w = width,
        h = height,
    ));
    svg.push_str(&format!(
        r#"<rect width="100%" height="100%" fill="{}" />"#,
        style.background
    ));
    svg.push_str(&format!(r#"<g transform="{}">"#, camera.transform_attr()));

    svg.push_str(&format!(
        r#"<g fill="none" stroke="{}" stroke-width="1.5">"#,
        style.connector_stroke
    ));
    for connector in &scene.connectors {
        if connector.path.is_empty() {
            continue;
        }
        svg.push_str(&format!(r#"<path d="{}" />"#, connector.path));
    }
    svg.push_str("</g>");

    for node in &scene.nodes {
        svg.push_str(&render_node(node, style));
    }

    svg.push_str("</g></svg>");
    svg
}

fn render_node(node: &SceneNode, style: &DiagramStyle) -> String {
    let mut svg = String::new();

    let (fill, opacity, stroke) = match node.kind {
        NodeKind::Directory => (
            &style.directory_fill,
            style.directory_fill_opacity,
            &style.directory_stroke,
        ),
        NodeKind::Leaf => (&style.leaf_fill, 1.0, &style.leaf_stroke),
    };

    svg.push_str(&format!(r#"<g data-path="{}">"#, escape_xml(&node.id)));
    svg.push_str(&format!(
        r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" rx="{:.2}" fill="{}" fill-opacity="{:.2}" stroke="{}" stroke-width="1.5" />"#,
        node.x, node.y, node.width, node.height, node.radius, fill, opacity, stroke
    ));

    let text_x = node.x + node.width / 2.0;
    let text_y = node.y + node.height / 2.0 + style.font_size / 3.0;
    svg.push_str(&format!(
        r#"<text x="{:.2}" y="{:.2}" font-family="{}" font-size="{:.1}" fill="{}" text-anchor="middle">{}</text>"#,
        text_x,
        text_y,
        style.font_family,
        style.font_size,
        style.text,
        escape_xml(&node.label)
    ));
    svg.push_str("</g>");

    svg
}
