//! Rasterize or print the SVG document.

use std::path::Path;

use resvg::usvg;
use tiny_skia::{Pixmap, Transform};
use tracing::debug;

const LOCAL_FONTS_DIR: &str = "fonts";
/// Longest side of a PNG we are willing to allocate. Very wide scans hit
/// this long before tiny-skia's own limits.
const MAX_RASTER_SIDE: u32 = 16_384;

/// resvg and svg2pdf pin different usvg releases, so their font databases
/// are distinct types with the same API.
macro_rules! configure_font_fallbacks {
    ($fontdb:expr) => {{
        let fontdb = &mut *$fontdb;
        let mut sans_family: Option<String> = None;
        let mut mono_family: Option<String> = None;
        let mut first_family: Option<String> = None;

        for face in fontdb.faces() {
            for (family, _) in &face.families {
                if first_family.is_none() {
                    first_family = Some(family.clone());
                }
                let lower = family.to_ascii_lowercase();
                if sans_family.is_none() && lower.contains("sans") {
                    sans_family = Some(family.clone());
                }
                if mono_family.is_none() && (lower.contains("mono") || lower.contains("code")) {
                    mono_family = Some(family.clone());
                }
            }
        }

        if let Some(family) = sans_family.as_deref().or(first_family.as_deref()) {
            fontdb.set_sans_serif_family(family);
            fontdb.set_serif_family(family);
        }
        if let Some(family) = mono_family
            .as_deref()
            .or(sans_family.as_deref())
            .or(first_family.as_deref())
        {
            fontdb.set_monospace_family(family);
        }
    }};
}

/// Pixel size of a `width` x `height` canvas rasterized at `scale`.
///
/// Fails up front when the diagram would produce an empty or oversized
/// pixmap, so large trees get a clear error instead of an allocation failure.
pub fn raster_size(width: f32, height: f32, scale: f32) -> Result<(u32, u32), String> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(format!("Invalid --png-scale value: {}", scale));
    }

    let px_width = (width * scale).ceil();
    let px_height = (height * scale).ceil();
    if !(px_width >= 1.0 && px_height >= 1.0) {
        return Err(format!(
            "Diagram is too small to rasterize: {}x{} px",
            px_width, px_height
        ));
    }
    if px_width > MAX_RASTER_SIDE as f32 || px_height > MAX_RASTER_SIDE as f32 {
        return Err(format!(
            "Diagram is too large to rasterize: {}x{} px (limit {} px per side); lower --png-scale or --zoom, or export SVG/PDF",
            px_width, px_height, MAX_RASTER_SIDE
        ));
    }

    Ok((px_width as u32, px_height as u32))
}

pub fn svg_to_png(svg: &str, scale: f32) -> Result<Vec<u8>, String> {
    let mut opts = usvg::Options::default();
    {
        let fontdb = opts.fontdb_mut();
        fontdb.load_system_fonts();

        let local_fonts = Path::new(LOCAL_FONTS_DIR);
        if local_fonts.is_dir() {
            fontdb.load_fonts_dir(local_fonts);
        }

        configure_font_fallbacks!(fontdb);
        debug!(faces = fontdb.len(), "loaded fonts for PNG export");
    }

    let tree =
        usvg::Tree::from_str(svg, &opts).map_err(|e| format!("Failed to parse SVG: {}", e))?;

    let (width, height) = raster_size(tree.size().width(), tree.size().height(), scale)?;
    debug!(width, height, "rasterizing diagram");

    let mut pixmap = Pixmap::new(width, height).ok_or("Failed to create pixmap")?;
    resvg::render(
        &tree,
        Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );

    pixmap
        .encode_png()
        .map_err(|e| format!("Failed to encode PNG: {}", e))
}

/// Text is converted to outlines so the PDF does not depend on font embedding.
pub fn svg_to_pdf(svg: &str) -> Result<Vec<u8>, String> {
    use svg2pdf::usvg::fontdb;

    let mut fontdb = fontdb::Database::new();
    fontdb.load_system_fonts();

    let local_fonts = Path::new(LOCAL_FONTS_DIR);
    if local_fonts.is_dir() {
        fontdb.load_fonts_dir(local_fonts);
    }

    configure_font_fallbacks!(&mut fontdb);
    debug!(faces = fontdb.len(), "loaded fonts for PDF export");

    let mut opts = svg2pdf::usvg::Options::default();
    opts.fontdb = std::sync::Arc::new(fontdb);

    let tree = svg2pdf::usvg::Tree::from_str(svg, &opts)
        .map_err(|e| format!("Failed to parse SVG: {}", e))?;

    let mut options = svg2pdf::ConversionOptions::default();
    options.embed_text = false;

    svg2pdf::to_pdf(&tree, options, svg2pdf::PageOptions::default())
        .map_err(|e| format!("Failed to convert SVG to PDF: {}", e))
}
