//! Text measurement and wrapping.
//!
//! Measurement is delegated to a caller-supplied `TextMeasurer`. Results are
//! broken into words once and memoized in an LRU cache keyed by
//! (content hash, font, size), retained across frames. Wrapping runs after
//! widths are solved and only consumes cached word widths.

use std::num::NonZeroUsize;

use lru::LruCache;
use unicode_width::UnicodeWidthChar;

use crate::id::hash_str;
use crate::layout::declaration::{TextStyle, TextWrap, BASE_FONT_SIZE};
use crate::primitives::Size;

// Monospace metrics for JetBrains Mono at the 14px base size.
pub const CHAR_WIDTH: f32 = 8.4;
pub const LINE_HEIGHT: f32 = 18.0;

/// Slack for float comparisons when fitting words on a line.
const EPSILON: f32 = 0.01;

/// Measures a run of text. Must be pure: same input, same output.
pub trait TextMeasurer {
    fn measure(&self, text: &str, font_id: u16, font_size: f32) -> Size;
}

impl<F> TextMeasurer for F
where
    F: Fn(&str, u16, f32) -> Size,
{
    #[inline]
    fn measure(&self, text: &str, font_id: u16, font_size: f32) -> Size {
        self(text, font_id, font_size)
    }
}

/// Fixed-advance measurer: every display column has the same width.
///
/// Wide (CJK) characters count as two columns, combining marks as zero.
#[derive(Debug, Clone, Copy)]
pub struct MonospaceMeasurer {
    /// Column width at `BASE_FONT_SIZE`.
    pub char_width: f32,
    /// Line height at `BASE_FONT_SIZE`.
    pub line_height: f32,
}

impl Default for MonospaceMeasurer {
    fn default() -> Self {
        Self {
            char_width: CHAR_WIDTH,
            line_height: LINE_HEIGHT,
        }
    }
}

impl TextMeasurer for MonospaceMeasurer {
    fn measure(&self, text: &str, _font_id: u16, font_size: f32) -> Size {
        let scale = font_size / BASE_FONT_SIZE;
        let columns: usize = text.chars().map(|c| c.width().unwrap_or(0)).sum();
        Size::new(columns as f32 * self.char_width * scale, self.line_height * scale)
    }
}

/// A word (or the empty run between two adjacent separators).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasuredWord {
    /// Byte offset into the measured text.
    pub start: u32,
    pub len: u32,
    pub width: f32,
    /// First word of a line that follows a `\n`.
    pub after_newline: bool,
}

/// Measurement of a whole text payload.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredText {
    /// Size with breaks only at `\n` (or none, for `TextWrap::None`).
    pub size: Size,
    /// Widest single word.
    pub min_width: f32,
    pub line_height: f32,
    pub space_width: f32,
    pub words: Vec<MeasuredWord>,
}

impl MeasuredText {
    /// Split `text` into words and measure each one.
    pub fn measure(text: &str, style: &TextStyle, measurer: &dyn TextMeasurer) -> Self {
        let space = measurer.measure(" ", style.font_id, style.font_size);
        let mut line_height = space.height;

        if style.wrap == TextWrap::None {
            let whole = measurer.measure(text, style.font_id, style.font_size);
            line_height = line_height.max(whole.height);
            let line_height = resolved_line_height(style, line_height);
            return Self {
                size: Size::new(whole.width, line_height),
                min_width: whole.width,
                line_height,
                space_width: space.width,
                words: vec![MeasuredWord {
                    start: 0,
                    len: text.len() as u32,
                    width: whole.width,
                    after_newline: false,
                }],
            };
        }

        let mut words = Vec::new();
        let mut min_width: f32 = 0.0;
        let mut widest_line: f32 = 0.0;
        let mut line_count = 0u32;

        let mut line_start = 0usize;
        for line in text.split('\n') {
            line_count += 1;
            let mut line_width = 0.0;
            let mut word_start = line_start;
            for (i, word) in line.split(' ').enumerate() {
                let measured = if word.is_empty() {
                    Size::ZERO
                } else {
                    measurer.measure(word, style.font_id, style.font_size)
                };
                line_height = line_height.max(measured.height);
                min_width = min_width.max(measured.width);
                if i > 0 {
                    line_width += space.width;
                }
                line_width += measured.width;
                words.push(MeasuredWord {
                    start: word_start as u32,
                    len: word.len() as u32,
                    width: measured.width,
                    after_newline: i == 0 && line_start > 0,
                });
                word_start += word.len() + 1;
            }
            widest_line = widest_line.max(line_width);
            line_start += line.len() + 1;
        }

        let line_height = resolved_line_height(style, line_height);
        Self {
            size: Size::new(widest_line, line_height * line_count as f32),
            min_width,
            line_height,
            space_width: space.width,
            words,
        }
    }

    /// Break into lines no wider than `max_width` (single words may overflow).
    ///
    /// Calls `emit(start, len, width)` per line, byte offsets relative to the
    /// measured text.
    pub fn wrap(&self, style: &TextStyle, max_width: f32, mut emit: impl FnMut(u32, u32, f32)) {
        let break_words = style.wrap == TextWrap::Words;
        let mut line: Option<(u32, u32, f32)> = None;

        for word in &self.words {
            if word.after_newline {
                let (start, end, width) = line.take().unwrap_or((word.start, word.start, 0.0));
                emit(start, end - start, width);
            }
            line = match line {
                None => Some((word.start, word.start + word.len, word.width)),
                Some((start, end, width)) => {
                    let extended = width + self.space_width + word.width;
                    if break_words && extended > max_width + EPSILON {
                        emit(start, end - start, width);
                        Some((word.start, word.start + word.len, word.width))
                    } else {
                        Some((start, word.start + word.len, extended))
                    }
                }
            };
        }
        if let Some((start, end, width)) = line {
            emit(start, end - start, width);
        }
    }
}

fn resolved_line_height(style: &TextStyle, measured: f32) -> f32 {
    if style.line_height > 0.0 { style.line_height } else { measured }
}

/// Cache key: content hash plus the style fields measurement depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct MeasureKey {
    content: u64,
    len: usize,
    font_id: u16,
    font_size: u32,
    line_height: u32,
    wrap: TextWrap,
}

impl MeasureKey {
    fn new(text: &str, style: &TextStyle) -> Self {
        Self {
            content: hash_str(text),
            len: text.len(),
            font_id: style.font_id,
            font_size: style.font_size.to_bits(),
            line_height: style.line_height.to_bits(),
            wrap: style.wrap,
        }
    }
}

/// Persistent LRU cache of text measurements.
pub struct MeasureCache {
    entries: LruCache<MeasureKey, MeasuredText>,
    pub hits: u64,
    pub misses: u64,
}

impl MeasureCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Look up `text`, measuring and inserting it on a miss.
    pub fn measure(&mut self, text: &str, style: &TextStyle, measurer: &dyn TextMeasurer) -> &MeasuredText {
        let key = MeasureKey::new(text, style);
        if self.entries.contains(&key) {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        self.entries.get_or_insert(key, || MeasuredText::measure(text, style, measurer))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry, e.g. after fonts change.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl std::fmt::Debug for MeasureCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeasureCache")
            .field("len", &self.entries.len())
            .field("hits", &self.hits)
            .field("misses", &self.misses)
            .finish()
    }
}
