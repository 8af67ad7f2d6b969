//! Element declarations.
//!
//! A `Declaration` is a plain by-value description of one element. It is
//! built with chained setters, may be stored in a `static`-like binding and
//! reused, and is consumed by `Engine::open`. Nothing here is retained past
//! the frame it was declared in.

use serde::{Deserialize, Serialize};

use crate::id::ElementId;
use crate::primitives::{Color, Size};

use super::sizing::{Alignment, ChildAlignment, Direction, Padding, Sizing};

/// Default font size when a style does not specify one.
pub const BASE_FONT_SIZE: f32 = 14.0;

/// Opaque handle to an image owned by the rendering backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageHandle(pub u32);

/// Image payload of a leaf element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageConfig {
    pub handle: ImageHandle,
    /// Natural size of the image, used as content size by `Fit` axes.
    pub source_size: Size,
}

/// Border drawn on top of the background, inside the element bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Border {
    pub color: Color,
    pub width: f32,
}

/// Clip children to the element's bounds on either axis.
///
/// Clipping an axis also makes it scrollable: children are offset by the
/// scroll position remembered for the element's id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clip {
    pub horizontal: bool,
    pub vertical: bool,
}

impl Clip {
    pub const NONE: Self = Self { horizontal: false, vertical: false };
    pub const BOTH: Self = Self { horizontal: true, vertical: true };

    #[inline]
    pub fn is_active(&self) -> bool {
        self.horizontal || self.vertical
    }
}

/// How a text leaf breaks into lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextWrap {
    /// Break at spaces when a line exceeds the element width, and at `\n`.
    #[default]
    Words,
    /// Break only at `\n`.
    Newlines,
    /// Never break.
    None,
}

/// Style of a text leaf.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextStyle {
    pub font_id: u16,
    pub font_size: f32,
    pub color: Color,
    /// Line advance in pixels. 0 uses the measured line height.
    pub line_height: f32,
    pub wrap: TextWrap,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_id: 0,
            font_size: BASE_FONT_SIZE,
            color: Color::WHITE,
            line_height: 0.0,
            wrap: TextWrap::Words,
        }
    }
}

impl TextStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn font(mut self, font_id: u16) -> Self {
        self.font_id = font_id;
        self
    }

    pub fn size(mut self, font_size: f32) -> Self {
        self.font_size = font_size;
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn line_height(mut self, line_height: f32) -> Self {
        self.line_height = line_height;
        self
    }

    pub fn wrap(mut self, wrap: TextWrap) -> Self {
        self.wrap = wrap;
        self
    }
}

/// Text payload borrowed for the duration of a declaration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextContent<'a> {
    pub content: &'a str,
    pub style: TextStyle,
}

/// Layout properties of an element, without payload. This is what a layout
/// node keeps after its declaration has been validated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementConfig {
    pub width: Sizing,
    pub height: Sizing,
    pub padding: Padding,
    pub child_gap: f32,
    pub direction: Direction,
    pub child_alignment: ChildAlignment,
    pub background: Option<Color>,
    pub corner_radius: f32,
    pub border: Option<Border>,
    pub clip: Clip,
    pub image: Option<ImageConfig>,
}

impl Default for ElementConfig {
    fn default() -> Self {
        Self {
            width: Sizing::fit(),
            height: Sizing::fit(),
            padding: Padding::default(),
            child_gap: 0.0,
            direction: Direction::LeftToRight,
            child_alignment: ChildAlignment::default(),
            background: None,
            corner_radius: 0.0,
            border: None,
            clip: Clip::NONE,
            image: None,
        }
    }
}

/// Declarative description of one element.
///
/// # Example
///
/// ```
/// use plinth::{Color, Declaration, Direction, Padding, Sizing};
///
/// let sidebar = Declaration::new()
///     .id("SideBar")
///     .width(Sizing::fixed(300.0))
///     .height(Sizing::grow())
///     .padding(Padding::all(16.0))
///     .child_gap(16.0)
///     .direction(Direction::TopToBottom)
///     .background(Color::rgb8(224, 215, 210));
/// # let _ = sidebar;
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Declaration<'a> {
    pub id: Option<ElementId>,
    pub config: ElementConfig,
    pub text: Option<TextContent<'a>>,
}

impl<'a> Declaration<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a stable id for hit-testing and scroll memory.
    pub fn id(mut self, id: impl Into<ElementId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn width(mut self, width: Sizing) -> Self {
        self.config.width = width;
        self
    }

    pub fn height(mut self, height: Sizing) -> Self {
        self.config.height = height;
        self
    }

    /// Set both axes at once.
    pub fn size(self, width: Sizing, height: Sizing) -> Self {
        self.width(width).height(height)
    }

    pub fn padding(mut self, padding: Padding) -> Self {
        self.config.padding = padding;
        self
    }

    pub fn child_gap(mut self, gap: f32) -> Self {
        self.config.child_gap = gap;
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.config.direction = direction;
        self
    }

    pub fn align(mut self, x: Alignment, y: Alignment) -> Self {
        self.config.child_alignment = ChildAlignment::new(x, y);
        self
    }

    pub fn background(mut self, color: Color) -> Self {
        self.config.background = Some(color);
        self
    }

    pub fn corner_radius(mut self, radius: f32) -> Self {
        self.config.corner_radius = radius;
        self
    }

    pub fn border(mut self, color: Color, width: f32) -> Self {
        self.config.border = Some(Border { color, width });
        self
    }

    pub fn clip(mut self, clip: Clip) -> Self {
        self.config.clip = clip;
        self
    }

    pub fn image(mut self, handle: ImageHandle, source_size: Size) -> Self {
        self.config.image = Some(ImageConfig { handle, source_size });
        self
    }

    /// Attach a text payload. The element becomes a leaf.
    pub fn text(mut self, content: &'a str, style: TextStyle) -> Self {
        self.text = Some(TextContent { content, style });
        self
    }

    /// Whether this declaration carries a leaf payload.
    pub fn is_leaf(&self) -> bool {
        self.text.is_some() || self.config.image.is_some()
    }
}

// =========================================================================
// Validation
// =========================================================================

/// Correct invalid values in place, returning a description of each fix.
///
/// Invalid input never aborts layout: the offending value falls back to its
/// minimum or default and the caller raises `InvalidSizingConfig`.
pub(crate) fn sanitize(config: &mut ElementConfig, style: Option<&mut TextStyle>) -> Vec<String> {
    let mut problems = Vec::new();

    if !config.padding.is_valid() {
        problems.push(format!("negative or non-finite padding {:?}", config.padding));
        config.padding = config.padding.sanitized();
    }
    if !(config.child_gap >= 0.0 && config.child_gap.is_finite()) {
        problems.push(format!("invalid child gap {}", config.child_gap));
        config.child_gap = 0.0;
    }
    if !(config.corner_radius >= 0.0) {
        problems.push(format!("invalid corner radius {}", config.corner_radius));
        config.corner_radius = 0.0;
    }
    if let Some(border) = config.border.as_mut() {
        if !(border.width >= 0.0 && border.width.is_finite()) {
            problems.push(format!("invalid border width {}", border.width));
            border.width = 0.0;
        }
    }
    sanitize_sizing(&mut config.width, "width", &mut problems);
    sanitize_sizing(&mut config.height, "height", &mut problems);

    if let Some(style) = style {
        if !(style.font_size > 0.0 && style.font_size.is_finite()) {
            problems.push(format!("invalid font size {}", style.font_size));
            style.font_size = BASE_FONT_SIZE;
        }
        if !(style.line_height >= 0.0 && style.line_height.is_finite()) {
            problems.push(format!("invalid line height {}", style.line_height));
            style.line_height = 0.0;
        }
    }

    problems
}

fn sanitize_sizing(sizing: &mut Sizing, axis: &str, problems: &mut Vec<String>) {
    match sizing {
        Sizing::Fixed(px) => {
            if !(*px >= 0.0 && px.is_finite()) {
                problems.push(format!("{axis}: invalid fixed size {px}"));
                *px = 0.0;
            }
        }
        Sizing::Percent(fraction) => {
            if !(0.0..=1.0).contains(fraction) {
                problems.push(format!("{axis}: percent {fraction} outside 0..=1"));
                *fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
            }
        }
        Sizing::Fit { min, max } => sanitize_bounds(min, max, axis, problems),
        Sizing::Grow { min, max, weight } => {
            sanitize_bounds(min, max, axis, problems);
            if !(*weight > 0.0 && weight.is_finite()) {
                problems.push(format!("{axis}: invalid grow weight {weight}"));
                *weight = 1.0;
            }
        }
    }
}

fn sanitize_bounds(min: &mut f32, max: &mut f32, axis: &str, problems: &mut Vec<String>) {
    if !(*min >= 0.0 && min.is_finite()) {
        problems.push(format!("{axis}: invalid min {min}"));
        *min = 0.0;
    }
    if max.is_nan() || *max < 0.0 {
        problems.push(format!("{axis}: invalid max {max}"));
        *max = f32::INFINITY;
    }
    if *max < *min {
        problems.push(format!("{axis}: max {max} < min {min}"));
        *max = *min;
    }
}
