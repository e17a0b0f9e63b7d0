use crate::font::FontFace;
use crate::types::{Color, Pt, Rect, Size};

// Cubic Bezier handle length for a quarter circle.
const KAPPA: f32 = 0.552_284_8;

/// Drawing operations in page space: origin top-left, y grows downward.
/// The PDF writer flips to PDF user space.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SaveState,
    RestoreState,
    // Non-rendered metadata used for page-aware reporting. Ignored by the PDF writer.
    Meta {
        key: String,
        value: String,
    },
    SetFillColor(Color),
    SetStrokeColor(Color),
    SetLineWidth(Pt),
    SetFont(FontFace),
    SetFontSize(Pt),
    MoveTo {
        x: Pt,
        y: Pt,
    },
    LineTo {
        x: Pt,
        y: Pt,
    },
    CurveTo {
        x1: Pt,
        y1: Pt,
        x2: Pt,
        y2: Pt,
        x: Pt,
        y: Pt,
    },
    ClosePath,
    Fill,
    Stroke,
    FillStroke,
    // `y` is the top of the line box; the baseline sits one font size below.
    DrawString {
        x: Pt,
        y: Pt,
        text: String,
    },
    DrawRect {
        x: Pt,
        y: Pt,
        width: Pt,
        height: Pt,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub commands: Vec<Command>,
}

impl Page {
    pub fn strings(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|cmd| match cmd {
            Command::DrawString { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn meta_values<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.commands.iter().filter_map(move |cmd| match cmd {
            Command::Meta { key: k, value } if k == key => Some(value.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub page_size: Size,
    pub pages: Vec<Page>,
}

impl Document {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub face: FontFace,
    pub size: Pt,
    pub color: Color,
}

impl TextStyle {
    pub fn new(face: FontFace, size: Pt, color: Color) -> Self {
        Self { face, size, color }
    }
}

/// Fill and/or stroke for a single shape call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    pub fill: Option<Color>,
    pub stroke: Option<(Color, Pt)>,
}

impl Paint {
    pub fn fill(color: Color) -> Self {
        Self {
            fill: Some(color),
            stroke: None,
        }
    }

    pub fn stroke(color: Color, width: Pt) -> Self {
        Self {
            fill: None,
            stroke: Some((color, width)),
        }
    }

    pub fn fill_stroke(fill: Color, stroke: Color, width: Pt) -> Self {
        Self {
            fill: Some(fill),
            stroke: Some((stroke, width)),
        }
    }
}

// `None` means "unknown": the next setter always emits. Every page starts
// (and every page switch restarts) with unknown state.
#[derive(Debug, Clone, Default)]
struct GraphicsState {
    fill_color: Option<Color>,
    stroke_color: Option<Color>,
    line_width: Option<Pt>,
    font: Option<FontFace>,
    font_size: Option<Pt>,
}

pub struct Canvas {
    page_size: Size,
    pages: Vec<Page>,
    active: usize,
    state_stack: Vec<GraphicsState>,
    current_state: GraphicsState,
}

impl Canvas {
    pub fn new(page_size: Size) -> Self {
        Self {
            page_size,
            pages: vec![Page::default()],
            active: 0,
            state_stack: Vec::new(),
            current_state: GraphicsState::default(),
        }
    }

    pub fn page_size(&self) -> Size {
        self.page_size
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn current_page_index(&self) -> usize {
        self.active
    }

    /// Appends a blank page, makes it active and returns its index.
    pub fn add_page(&mut self) -> usize {
        self.pages.push(Page::default());
        self.switch_to(self.pages.len() - 1);
        self.active
    }

    /// Re-targets drawing at an existing page. Returns false for an
    /// out-of-range index and leaves the active page unchanged.
    pub fn select_page(&mut self, index: usize) -> bool {
        if index >= self.pages.len() {
            return false;
        }
        self.switch_to(index);
        true
    }

    fn switch_to(&mut self, index: usize) {
        self.active = index;
        self.state_stack.clear();
        self.current_state = GraphicsState::default();
    }

    fn push(&mut self, command: Command) {
        self.pages[self.active].commands.push(command);
    }

    pub fn current_command_count(&self) -> usize {
        self.pages[self.active].commands.len()
    }

    pub fn save_state(&mut self) {
        self.state_stack.push(self.current_state.clone());
        self.push(Command::SaveState);
    }

    pub fn restore_state(&mut self) {
        if let Some(state) = self.state_stack.pop() {
            self.current_state = state;
            self.push(Command::RestoreState);
        }
    }

    pub fn meta(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.push(Command::Meta {
            key: key.into(),
            value: value.into(),
        });
    }

    pub fn set_fill_color(&mut self, color: Color) {
        if self.current_state.fill_color == Some(color) {
            return;
        }
        self.current_state.fill_color = Some(color);
        self.push(Command::SetFillColor(color));
    }

    pub fn set_stroke_color(&mut self, color: Color) {
        if self.current_state.stroke_color == Some(color) {
            return;
        }
        self.current_state.stroke_color = Some(color);
        self.push(Command::SetStrokeColor(color));
    }

    pub fn set_line_width(&mut self, width: Pt) {
        let width = width.max(Pt::ZERO);
        if self.current_state.line_width == Some(width) {
            return;
        }
        self.current_state.line_width = Some(width);
        self.push(Command::SetLineWidth(width));
    }

    pub fn set_font(&mut self, face: FontFace) {
        if self.current_state.font == Some(face) {
            return;
        }
        self.current_state.font = Some(face);
        self.push(Command::SetFont(face));
    }

    pub fn set_font_size(&mut self, size: Pt) {
        if self.current_state.font_size == Some(size) {
            return;
        }
        self.current_state.font_size = Some(size);
        self.push(Command::SetFontSize(size));
    }

    fn apply_paint(&mut self, paint: Paint) -> Option<Command> {
        if let Some(color) = paint.fill {
            self.set_fill_color(color);
        }
        if let Some((color, width)) = paint.stroke {
            self.set_stroke_color(color);
            self.set_line_width(width);
        }
        match (paint.fill.is_some(), paint.stroke.is_some()) {
            (true, true) => Some(Command::FillStroke),
            (true, false) => Some(Command::Fill),
            (false, true) => Some(Command::Stroke),
            (false, false) => None,
        }
    }

    pub fn draw_rect(&mut self, rect: Rect, paint: Paint) {
        if paint.stroke.is_none() {
            if let Some(color) = paint.fill {
                self.set_fill_color(color);
                self.push(Command::DrawRect {
                    x: rect.x,
                    y: rect.y,
                    width: rect.width,
                    height: rect.height,
                });
            }
            return;
        }
        let Some(op) = self.apply_paint(paint) else {
            return;
        };
        self.push(Command::MoveTo {
            x: rect.x,
            y: rect.y,
        });
        self.push(Command::LineTo {
            x: rect.right(),
            y: rect.y,
        });
        self.push(Command::LineTo {
            x: rect.right(),
            y: rect.bottom(),
        });
        self.push(Command::LineTo {
            x: rect.x,
            y: rect.bottom(),
        });
        self.push(Command::ClosePath);
        self.push(op);
    }

    /// Radius is clamped to half the shorter side.
    pub fn draw_rounded_rect(&mut self, rect: Rect, radius: Pt, paint: Paint) {
        let radius = radius
            .max(Pt::ZERO)
            .min(rect.width / 2)
            .min(rect.height / 2);
        if radius <= Pt::ZERO {
            self.draw_rect(rect, paint);
            return;
        }
        let Some(op) = self.apply_paint(paint) else {
            return;
        };
        let k = radius * (1.0 - KAPPA);
        let (left, top, right, bottom) = (rect.x, rect.y, rect.right(), rect.bottom());
        self.push(Command::MoveTo {
            x: left + radius,
            y: top,
        });
        self.push(Command::LineTo {
            x: right - radius,
            y: top,
        });
        self.push(Command::CurveTo {
            x1: right - k,
            y1: top,
            x2: right,
            y2: top + k,
            x: right,
            y: top + radius,
        });
        self.push(Command::LineTo {
            x: right,
            y: bottom - radius,
        });
        self.push(Command::CurveTo {
            x1: right,
            y1: bottom - k,
            x2: right - k,
            y2: bottom,
            x: right - radius,
            y: bottom,
        });
        self.push(Command::LineTo {
            x: left + radius,
            y: bottom,
        });
        self.push(Command::CurveTo {
            x1: left + k,
            y1: bottom,
            x2: left,
            y2: bottom - k,
            x: left,
            y: bottom - radius,
        });
        self.push(Command::LineTo {
            x: left,
            y: top + radius,
        });
        self.push(Command::CurveTo {
            x1: left,
            y1: top + k,
            x2: left + k,
            y2: top,
            x: left + radius,
            y: top,
        });
        self.push(Command::ClosePath);
        self.push(op);
    }

    pub fn draw_circle(&mut self, cx: Pt, cy: Pt, radius: Pt, paint: Paint) {
        if radius <= Pt::ZERO {
            return;
        }
        let Some(op) = self.apply_paint(paint) else {
            return;
        };
        let k = radius * KAPPA;
        self.push(Command::MoveTo { x: cx + radius, y: cy });
        self.push(Command::CurveTo {
            x1: cx + radius,
            y1: cy + k,
            x2: cx + k,
            y2: cy + radius,
            x: cx,
            y: cy + radius,
        });
        self.push(Command::CurveTo {
            x1: cx - k,
            y1: cy + radius,
            x2: cx - radius,
            y2: cy + k,
            x: cx - radius,
            y: cy,
        });
        self.push(Command::CurveTo {
            x1: cx - radius,
            y1: cy - k,
            x2: cx - k,
            y2: cy - radius,
            x: cx,
            y: cy - radius,
        });
        self.push(Command::CurveTo {
            x1: cx + k,
            y1: cy - radius,
            x2: cx + radius,
            y2: cy - k,
            x: cx + radius,
            y: cy,
        });
        self.push(Command::ClosePath);
        self.push(op);
    }

    pub fn draw_line(&mut self, from: (Pt, Pt), to: (Pt, Pt), color: Color, width: Pt) {
        self.set_stroke_color(color);
        self.set_line_width(width);
        self.push(Command::MoveTo {
            x: from.0,
            y: from.1,
        });
        self.push(Command::LineTo { x: to.0, y: to.1 });
        self.push(Command::Stroke);
    }

    /// Draws one already-fitted line with its top edge at `y`.
    pub fn write_text(&mut self, text: &str, x: Pt, y: Pt, style: &TextStyle) {
        self.set_font(style.face);
        self.set_font_size(style.size);
        self.set_fill_color(style.color);
        self.push(Command::DrawString {
            x,
            y,
            text: text.to_string(),
        });
    }

    pub fn measure_text(&self, text: &str, style: &TextStyle) -> Pt {
        style.face.measure_text_width(style.size, text)
    }

    pub fn measure_wrapped_lines(&self, text: &str, max_width: Pt, style: &TextStyle) -> Vec<String> {
        wrap_text(text, max_width, style)
    }

    pub fn finish(self) -> Document {
        Document {
            page_size: self.page_size,
            pages: self.pages,
        }
    }
}

/// Greedy word wrap under `style`. Pure in its inputs, so callers can
/// measure before committing to draw. Words wider than `max_width` are
/// broken at character boundaries; explicit newlines are kept.
pub fn wrap_text(text: &str, max_width: Pt, style: &TextStyle) -> Vec<String> {
    let max_width = max_width.max(Pt::from_f32(1.0));
    let measure = |s: &str| style.face.measure_text_width(style.size, s);
    let space_width = measure(" ");
    let mut lines = Vec::new();

    for segment in text.split('\n') {
        if segment.trim().is_empty() {
            lines.push(String::new());
            continue;
        }
        let mut current = String::new();
        let mut current_width = Pt::ZERO;
        for word in segment.split_whitespace() {
            let word_width = measure(word);
            if !current.is_empty() {
                let next_width = current_width + space_width + word_width;
                if next_width <= max_width {
                    current.push(' ');
                    current.push_str(word);
                    current_width = next_width;
                    continue;
                }
                lines.push(std::mem::take(&mut current));
            }
            if word_width > max_width {
                let mut pieces = split_long_word_by_width(word, max_width, &measure);
                if let Some(last) = pieces.pop() {
                    lines.extend(pieces);
                    current_width = measure(&last);
                    current = last;
                }
            } else {
                current.push_str(word);
                current_width = word_width;
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn split_long_word_by_width(word: &str, max_width: Pt, measure: &impl Fn(&str) -> Pt) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    for ch in word.chars() {
        let mut candidate = current.clone();
        candidate.push(ch);
        if !current.is_empty() && measure(&candidate) > max_width {
            out.push(std::mem::take(&mut current));
            current.push(ch);
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body() -> TextStyle {
        TextStyle::new(FontFace::Helvetica, Pt::from_i32(10), Color::BLACK)
    }

    #[test]
    fn wrap_keeps_every_word_in_order() {
        let text = "the quick brown fox jumps over the lazy dog again and again";
        let lines = wrap_text(text, Pt::from_i32(80), &body());
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(FontFace::Helvetica.measure_text_width(Pt::from_i32(10), line) <= Pt::from_i32(80));
        }
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn wrap_is_restartable() {
        let text = "alpha beta gamma delta epsilon zeta eta theta";
        let first = wrap_text(text, Pt::from_i32(60), &body());
        let second = wrap_text(text, Pt::from_i32(60), &body());
        assert_eq!(first, second);
    }

    #[test]
    fn wrap_breaks_overlong_words() {
        let word = "x".repeat(60);
        let lines = wrap_text(&word, Pt::from_i32(50), &body());
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
    }

    #[test]
    fn wrap_keeps_explicit_blank_lines() {
        let lines = wrap_text("one\n\ntwo", Pt::from_i32(500), &body());
        assert_eq!(lines, vec!["one", "", "two"]);
        assert_eq!(wrap_text("", Pt::from_i32(500), &body()), vec![String::new()]);
    }

    #[test]
    fn redundant_state_changes_are_elided() {
        let mut canvas = Canvas::new(Size::a4());
        canvas.set_fill_color(Color::WHITE);
        canvas.set_fill_color(Color::WHITE);
        canvas.set_font(FontFace::Helvetica);
        canvas.set_font(FontFace::Helvetica);
        assert_eq!(canvas.current_command_count(), 2);
    }

    #[test]
    fn page_switch_resets_graphics_state() {
        let mut canvas = Canvas::new(Size::a4());
        canvas.set_fill_color(Color::WHITE);
        assert_eq!(canvas.add_page(), 1);
        canvas.set_fill_color(Color::WHITE);
        assert_eq!(canvas.current_command_count(), 1);
        assert!(canvas.select_page(0));
        canvas.set_fill_color(Color::WHITE);
        assert_eq!(canvas.current_command_count(), 2);
        assert!(!canvas.select_page(5));
        assert_eq!(canvas.current_page_index(), 0);
    }

    #[test]
    fn rounded_rect_closes_and_fills() {
        let mut canvas = Canvas::new(Size::a4());
        let rect = Rect {
            x: Pt::from_i32(10),
            y: Pt::from_i32(10),
            width: Pt::from_i32(100),
            height: Pt::from_i32(20),
        };
        canvas.draw_rounded_rect(rect, Pt::from_i32(50), Paint::fill(Color::BLACK));
        let doc = canvas.finish();
        let commands = &doc.pages[0].commands;
        assert_eq!(commands.last(), Some(&Command::Fill));
        assert_eq!(commands.iter().filter(|c| matches!(c, Command::CurveTo { .. })).count(), 4);
    }

    #[test]
    fn fill_only_rect_uses_rect_operator() {
        let mut canvas = Canvas::new(Size::a4());
        let rect = Rect {
            x: Pt::ZERO,
            y: Pt::ZERO,
            width: Pt::from_i32(5),
            height: Pt::from_i32(5),
        };
        canvas.draw_rect(rect, Paint::fill(Color::BLACK));
        canvas.draw_rect(rect, Paint::stroke(Color::BLACK, Pt::from_i32(1)));
        let doc = canvas.finish();
        let commands = &doc.pages[0].commands;
        assert!(matches!(commands[1], Command::DrawRect { .. }));
        assert_eq!(commands.last(), Some(&Command::Stroke));
    }
}
