use std::num::NonZeroUsize;

use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping};
use lru::LruCache;

use crate::error::MeasureError;

const CACHE_CAPACITY: usize = 4096;

#[derive(Hash, PartialEq, Eq, Clone)]
struct MeasureKey {
    text: String,
    font_size_bits: u32,
    is_code: bool,
}

/// Measures the rendered size of a single line of label text.
///
/// Implementations must be deterministic for a given text and font setup;
/// the layout engine calls this once per node label per run.
pub trait TextMeasure {
    fn measure_text(
        &mut self,
        text: &str,
        font_size: f32,
        is_code: bool,
    ) -> Result<(f32, f32), MeasureError>;
}

pub struct CosmicTextMeasure {
    font_system: FontSystem,
    cache: LruCache<MeasureKey, (f32, f32)>,
}

impl CosmicTextMeasure {
    /// Measure with the system fonts.
    pub fn new() -> Result<Self, String> {
        Self::with_font_system(FontSystem::new())
    }

    /// Measure with a caller-provided font setup, e.g. one built from a
    /// custom `fontdb::Database`.
    pub fn with_font_system(font_system: FontSystem) -> Result<Self, String> {
        let capacity = NonZeroUsize::new(CACHE_CAPACITY).ok_or("Invalid cache capacity")?;
        Ok(Self {
            font_system,
            cache: LruCache::new(capacity),
        })
    }

    pub fn font_count(&self) -> usize {
        self.font_system.db().len()
    }
}

impl TextMeasure for CosmicTextMeasure {
    fn measure_text(
        &mut self,
        text: &str,
        font_size: f32,
        is_code: bool,
    ) -> Result<(f32, f32), MeasureError> {
        let key = MeasureKey {
            text: text.to_string(),
            font_size_bits: font_size.to_bits(),
            is_code,
        };

        if let Some(cached) = self.cache.get(&key) {
            return Ok(*cached);
        }

        if self.font_count() == 0 {
            return Err(MeasureError::NoFonts);
        }

        let line_height = font_size * 1.2;
        let mut buffer = Buffer::new(
            &mut self.font_system,
            Metrics {
                font_size,
                line_height,
            },
        );

        // Labels never wrap.
        buffer.set_size(&mut self.font_system, None, None);

        let attrs = Attrs::new().family(if is_code {
            Family::Monospace
        } else {
            Family::SansSerif
        });

        buffer.set_text(&mut self.font_system, text, &attrs, Shaping::Advanced, None);

        let mut total_width: f32 = 0.0;
        let mut total_height: f32 = 0.0;

        for run in buffer.layout_runs() {
            total_width = total_width.max(run.line_w);
            total_height += run.line_height;
        }

        let measured = (total_width, total_height);
        self.cache.put(key, measured);
        Ok(measured)
    }
}

/// Deterministic oracle: every char advances by the same fraction of the font size.
///
/// Useful headless and in tests where no font database is available.
#[derive(Debug, Clone, Copy)]
pub struct FixedWidthMeasure {
    pub advance: f32,
}

impl FixedWidthMeasure {
    pub fn new(advance: f32) -> Self {
        Self { advance }
    }
}

impl Default for FixedWidthMeasure {
    fn default() -> Self {
        Self::new(0.6)
    }
}

impl TextMeasure for FixedWidthMeasure {
    fn measure_text(
        &mut self,
        text: &str,
        font_size: f32,
        _is_code: bool,
    ) -> Result<(f32, f32), MeasureError> {
        let width = text.chars().count() as f32 * font_size * self.advance;
        Ok((width, font_size * 1.2))
    }
}
