//! Self-contained renderers for each visual block of the report.
//!
//! Flowing blocks take the cursor by value and answer with a [`Progress`]:
//! either the cursor for the next block, or the point at which they stopped
//! because the next piece would cross the frame's safe bottom. Nothing is
//! drawn past that bottom, and an overflowed block is re-invoked on a new
//! page with the resume state it returned.

use crate::canvas::{Canvas, Paint, TextStyle};
use crate::color::{ColorToken, Rgb, Theme, gradient_strips};
use crate::font::FontFace;
use crate::frame::Frame;
use crate::layout::LayoutConfig;
use crate::model::{ComplianceScore, MetadataEntries};
use crate::types::{Color, Pt, Rect};

pub const BRAND: &str = "ComplySummarize IA";
pub const HEADER_SUBTITLE: &str = "Rapport d'Analyse de Conformité";
pub const TITLE: &str = "Analyse de Conformité";
pub const TITLE_SUBTITLE: &str = "Rapport généré automatiquement par Intelligence Artificielle";
pub const METADATA_TITLE: &str = "INFORMATIONS TECHNIQUES";
pub const SCORE_TITLE: &str = "Score de Conformité";
pub const RISK_LABEL: &str = "Niveau de risque:";
pub const FOOTER_BRAND: &str = "Généré par ComplySummarize IA - Analyse automatisée de conformité";

pub const META_BLOCK_KEY: &str = "block";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Progress<R> {
    /// The block finished; carries the cursor for the next block.
    Continued(Pt),
    /// The block stopped before the safe bottom; carries where to resume.
    Overflowed(R),
}

impl<R> Progress<R> {
    pub fn is_overflowed(&self) -> bool {
        matches!(self, Progress::Overflowed(_))
    }

    pub fn map_resume<S>(self, f: impl FnOnce(R) -> S) -> Progress<S> {
        match self {
            Progress::Continued(y) => Progress::Continued(y),
            Progress::Overflowed(resume) => Progress::Overflowed(f(resume)),
        }
    }
}

/// Shared, read-only inputs for every block call.
#[derive(Debug, Clone, Copy)]
pub struct BlockContext<'a> {
    pub layout: &'a LayoutConfig,
    pub theme: &'a Theme,
    pub frame: Frame,
}

impl<'a> BlockContext<'a> {
    pub fn new(layout: &'a LayoutConfig, theme: &'a Theme) -> Self {
        Self {
            layout,
            theme,
            frame: layout.content_frame(),
        }
    }

    fn style(&self, face: FontFace, size: Pt, token: ColorToken) -> TextStyle {
        TextStyle::new(face, size, self.theme.color(token))
    }

    pub fn body_style(&self) -> TextStyle {
        self.style(FontFace::Helvetica, self.layout.fonts.body, ColorToken::Body)
    }
}

fn text_at_baseline(canvas: &mut Canvas, text: &str, x: Pt, baseline: Pt, style: &TextStyle) {
    canvas.write_text(text, x, baseline - style.size, style);
}

fn gradient_fill(canvas: &mut Canvas, rect: Rect, from: Rgb, to: Rgb, steps: usize) {
    let strips = gradient_strips(from, to, steps.max(1));
    let count = strips.len() as i32;
    let strip_height = rect.height / count;
    for (index, color) in strips.into_iter().enumerate() {
        let y = rect.y + strip_height * index as i32;
        // The last strip absorbs rounding so the band has no gap.
        let height = if index as i32 == count - 1 {
            rect.bottom() - y
        } else {
            strip_height
        };
        canvas.draw_rect(
            Rect {
                x: rect.x,
                y,
                width: rect.width,
                height,
            },
            Paint::fill(color.into()),
        );
    }
}

/// Banner in the reserved header band: brand, subtitle, page number and date.
/// Sits at a fixed position and never touches the flowing cursor.
pub fn header_band(canvas: &mut Canvas, ctx: &BlockContext<'_>, page_number: usize, date: &str) {
    let layout = ctx.layout;
    let theme = ctx.theme;
    canvas.meta(META_BLOCK_KEY, "header");
    let band = Rect {
        x: Pt::ZERO,
        y: Pt::ZERO,
        width: layout.page_size.width,
        height: layout.header_height,
    };
    gradient_fill(
        canvas,
        band,
        theme.rgb(ColorToken::Primary),
        theme.rgb(ColorToken::Secondary),
        layout.gradient_steps,
    );

    let brand = ctx.style(FontFace::HelveticaBold, layout.fonts.subtitle, ColorToken::White);
    let caption = ctx.style(FontFace::Helvetica, layout.fonts.caption, ColorToken::White);
    let first_baseline = layout.header_height * 0.42;
    let second_baseline = layout.header_height * 0.67;
    let left = layout.margins.left;
    let right = layout.page_size.width - layout.margins.right;

    text_at_baseline(canvas, BRAND, left, first_baseline, &brand);
    text_at_baseline(canvas, HEADER_SUBTITLE, left, second_baseline, &caption);

    let page_text = format!("Page {page_number}");
    let page_x = right - canvas.measure_text(&page_text, &caption);
    text_at_baseline(canvas, &page_text, page_x, first_baseline, &caption);
    let date_x = right - canvas.measure_text(date, &caption);
    text_at_baseline(canvas, date, date_x, second_baseline, &caption);
}

/// Main title card. Fixed height; overflows only when placed too low on a
/// page, never on a fresh one.
pub fn title_card(canvas: &mut Canvas, ctx: &BlockContext<'_>, cursor_y: Pt) -> Progress<()> {
    let layout = ctx.layout;
    let theme = ctx.theme;
    let height = layout.title_card_height;
    if !ctx.frame.fits(cursor_y, height) {
        return Progress::Overflowed(());
    }
    canvas.meta(META_BLOCK_KEY, "title_card");
    let mm = Pt::from_mm;
    let card = Rect {
        x: ctx.frame.x(),
        y: cursor_y,
        width: ctx.frame.width(),
        height,
    };
    gradient_fill(
        canvas,
        card,
        theme.rgb(ColorToken::Surface),
        theme.rgb(ColorToken::Border),
        layout.gradient_steps,
    );
    let primary = theme.color(ColorToken::Primary);
    canvas.draw_rounded_rect(card, layout.card_radius, Paint::stroke(primary, Pt::from_f32(1.5)));
    canvas.draw_rect(
        Rect {
            x: card.x + mm(15.0),
            y: card.y + mm(10.0),
            width: mm(1.5),
            height: mm(20.0),
        },
        Paint::fill(primary),
    );

    let title = ctx.style(FontFace::HelveticaBold, layout.fonts.title, ColorToken::Primary);
    let subtitle = ctx.style(FontFace::Helvetica, layout.fonts.body, ColorToken::TextSecondary);
    text_at_baseline(canvas, TITLE, card.x + mm(30.0), card.y + mm(20.0), &title);
    text_at_baseline(canvas, TITLE_SUBTITLE, card.x + mm(30.0), card.y + mm(31.0), &subtitle);

    Progress::Continued(cursor_y + height + layout.section_spacing)
}

/// Technical metadata card: up to four entries in a two-column grid.
/// Absent metadata takes no space and leaves the cursor untouched.
pub fn metadata_card(
    canvas: &mut Canvas,
    ctx: &BlockContext<'_>,
    cursor_y: Pt,
    metadata: Option<&MetadataEntries>,
) -> Progress<()> {
    let Some(metadata) = metadata.filter(|m| !m.is_empty()) else {
        return Progress::Continued(cursor_y);
    };
    let layout = ctx.layout;
    let theme = ctx.theme;
    let height = layout.metadata_card_height;
    if !ctx.frame.fits(cursor_y, height) {
        return Progress::Overflowed(());
    }
    canvas.meta(META_BLOCK_KEY, "metadata_card");
    let mm = Pt::from_mm;
    let card = Rect {
        x: ctx.frame.x(),
        y: cursor_y,
        width: ctx.frame.width(),
        height,
    };
    let border = theme.color(ColorToken::Border);
    canvas.draw_rounded_rect(
        card,
        layout.small_radius,
        Paint::fill_stroke(theme.color(ColorToken::Surface), border, Pt::from_f32(0.5)),
    );

    let heading = ctx.style(FontFace::HelveticaBold, layout.fonts.caption, ColorToken::TextSecondary);
    text_at_baseline(canvas, METADATA_TITLE, card.x + mm(10.0), card.y + mm(10.0), &heading);
    canvas.draw_line(
        (card.x + mm(10.0), card.y + mm(13.0)),
        (card.right() - mm(10.0), card.y + mm(13.0)),
        border,
        Pt::from_f32(0.5),
    );

    let entry = ctx.style(FontFace::Helvetica, layout.fonts.small, ColorToken::TextMuted);
    let columns = [card.x + mm(10.0), card.x + card.width / 2];
    let rows = [card.y + mm(20.0), card.y + mm(28.0)];
    for (slot, text) in metadata.slots().into_iter().enumerate() {
        if let Some(text) = text {
            text_at_baseline(canvas, text, columns[slot % 2], rows[slot / 2], &entry);
        }
    }

    Progress::Continued(cursor_y + height + layout.section_spacing)
}

/// Width of the filled part of the gauge bar.
pub fn gauge_fill_width(bar_width: Pt, score: ComplianceScore) -> Pt {
    bar_width.mul_ratio(score.value() as i32, 100)
}

/// Score badge, risk label and progress bar, all in the score's tier color.
pub fn compliance_score_card(
    canvas: &mut Canvas,
    ctx: &BlockContext<'_>,
    cursor_y: Pt,
    score: ComplianceScore,
    risk_level: &str,
) -> Progress<()> {
    let layout = ctx.layout;
    let theme = ctx.theme;
    let height = layout.score_card_height;
    if !ctx.frame.fits(cursor_y, height) {
        return Progress::Overflowed(());
    }
    canvas.meta(META_BLOCK_KEY, "score_card");
    let mm = Pt::from_mm;
    let card = Rect {
        x: ctx.frame.x(),
        y: cursor_y,
        width: ctx.frame.width(),
        height,
    };
    let tier = theme.score_color(score.value());
    let tier_color: Color = tier.into();

    gradient_fill(
        canvas,
        card,
        theme.rgb(ColorToken::White),
        theme.rgb(ColorToken::Surface),
        layout.gradient_steps,
    );
    canvas.draw_rounded_rect(card, layout.card_radius, Paint::stroke(tier_color, Pt::from_i32(2)));

    let badge_x = card.x + mm(20.0);
    let badge_y = card.y + mm(22.0);
    let radius = mm(15.0);
    canvas.draw_circle(
        badge_x + mm(1.0),
        badge_y + mm(1.0),
        radius + mm(2.0),
        Paint::fill(tier.shade(0.3).into()),
    );
    canvas.draw_circle(badge_x, badge_y, radius, Paint::fill(tier_color));
    canvas.draw_circle(
        badge_x,
        badge_y,
        radius - mm(3.0),
        Paint::fill(theme.color(ColorToken::White)),
    );

    let mut percent = ctx.style(FontFace::HelveticaBold, layout.fonts.heading, ColorToken::Text);
    percent.color = tier_color;
    let percent_text = format!("{}%", score.value());
    let percent_width = canvas.measure_text(&percent_text, &percent);
    text_at_baseline(
        canvas,
        &percent_text,
        badge_x - percent_width / 2,
        badge_y + percent.size * 0.35,
        &percent,
    );

    let text_x = card.x + mm(60.0);
    let title = ctx.style(FontFace::HelveticaBold, layout.fonts.subtitle, ColorToken::Text);
    text_at_baseline(canvas, SCORE_TITLE, text_x, card.y + mm(20.0), &title);

    let label = ctx.style(FontFace::Helvetica, layout.fonts.body, ColorToken::TextSecondary);
    let risk_baseline = card.y + mm(33.0);
    text_at_baseline(canvas, RISK_LABEL, text_x, risk_baseline, &label);
    let mut risk = ctx.style(FontFace::HelveticaBold, layout.fonts.subheading, ColorToken::Text);
    risk.color = tier_color;
    let risk_x = text_x + canvas.measure_text(RISK_LABEL, &label) + mm(3.0);
    text_at_baseline(canvas, &risk_level.to_uppercase(), risk_x, risk_baseline, &risk);

    let bar = Rect {
        x: text_x,
        y: card.y + mm(42.0),
        width: (card.width - mm(80.0)).max(Pt::ZERO),
        height: mm(8.0),
    };
    let bar_radius = mm(4.0);
    canvas.draw_rounded_rect(bar, bar_radius, Paint::fill(theme.color(ColorToken::Border)));
    let fill_width = gauge_fill_width(bar.width, score);
    if fill_width > Pt::ZERO {
        canvas.meta("gauge_fill_milli", fill_width.to_milli_i64().to_string());
        canvas.draw_rounded_rect(
            Rect {
                width: fill_width,
                ..bar
            },
            bar_radius,
            Paint::fill(tier_color),
        );
    }

    Progress::Continued(cursor_y + height + layout.section_spacing)
}

fn section_header(canvas: &mut Canvas, ctx: &BlockContext<'_>, y: Pt, title: &str, accent: Rgb) {
    let layout = ctx.layout;
    let bar = Rect {
        x: ctx.frame.x(),
        y,
        width: ctx.frame.width(),
        height: layout.section_title_height,
    };
    canvas.draw_rounded_rect(
        bar,
        layout.small_radius,
        Paint::fill_stroke(accent.tint(0.9).into(), accent.into(), Pt::from_i32(1)),
    );
    let style = TextStyle::new(FontFace::HelveticaBold, layout.fonts.heading, accent.into());
    let top = y + (bar.height - style.size) / 2;
    canvas.write_text(title, bar.x + layout.body_indent, top, &style);
}

/// Title and accent shared by prose and list sections.
#[derive(Debug, Clone, Copy)]
pub struct SectionSpec<'a> {
    pub key: &'a str,
    pub title: &'a str,
    pub accent: Rgb,
}

// Tags the page with the section's block key before its first drawn piece.
fn mark_block(canvas: &mut Canvas, key: &str, marked: &mut bool) {
    if !*marked {
        canvas.meta(META_BLOCK_KEY, key);
        *marked = true;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProseResume {
    pub header_drawn: bool,
    /// Index of the first wrapped line not yet drawn.
    pub next_line: usize,
}

pub fn prose_lines(ctx: &BlockContext<'_>, canvas: &Canvas, text: &str) -> Vec<String> {
    let width = ctx.frame.width() - ctx.layout.body_indent * 2;
    canvas.measure_wrapped_lines(text, width, &ctx.body_style())
}

/// Header bar then the wrapped body, one line at a time. Stops before any
/// line that would cross the safe bottom and resumes at exactly that line.
pub fn prose_section(
    canvas: &mut Canvas,
    ctx: &BlockContext<'_>,
    cursor_y: Pt,
    section: SectionSpec<'_>,
    text: &str,
    resume: ProseResume,
) -> Progress<ProseResume> {
    let layout = ctx.layout;
    let frame = ctx.frame;
    let lines = prose_lines(ctx, canvas, text);
    let line_height = layout.body_line_height();
    let body = ctx.body_style();
    let mut state = resume;
    let mut y = cursor_y;
    let mut marked = false;

    if !state.header_drawn {
        let pending = if state.next_line < lines.len() {
            line_height
        } else {
            Pt::ZERO
        };
        let needed = layout.section_title_height + layout.item_spacing + pending;
        if !frame.fits(y, needed) && !frame.is_fresh(y) {
            return Progress::Overflowed(state);
        }
        mark_block(canvas, section.key, &mut marked);
        section_header(canvas, ctx, y, section.title, section.accent);
        y += layout.section_title_height + layout.item_spacing;
        state.header_drawn = true;
    }

    while let Some(line) = lines.get(state.next_line) {
        if !frame.fits(y, line_height) {
            return Progress::Overflowed(state);
        }
        mark_block(canvas, section.key, &mut marked);
        canvas.write_text(line, frame.x() + layout.body_indent, y, &body);
        y += line_height;
        state.next_line += 1;
    }

    Progress::Continued(y + layout.section_spacing)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListResume {
    pub header_drawn: bool,
    /// Index of the first item not yet fully drawn.
    pub next_item: usize,
    /// Non-zero only while force-splitting an item taller than a fresh page.
    pub next_line: usize,
}

pub fn item_lines(ctx: &BlockContext<'_>, canvas: &Canvas, item: &str) -> Vec<String> {
    let layout = ctx.layout;
    let width = ctx.frame.width() - layout.item_text_indent - layout.bullet_indent;
    canvas.measure_wrapped_lines(item, width, &ctx.body_style())
}

fn draw_bullet(canvas: &mut Canvas, ctx: &BlockContext<'_>, y: Pt, accent: Rgb) {
    let layout = ctx.layout;
    let size = layout.bullet_size;
    canvas.draw_rect(
        Rect {
            x: ctx.frame.x() + layout.bullet_indent,
            y: y + (layout.fonts.body - size) / 2,
            width: size,
            height: size,
        },
        Paint::fill(accent.into()),
    );
}

/// Header bar then bulleted items. Items are atomic: an item that does not
/// fit below the cursor moves whole to the next page. Only an item that
/// cannot fit a fresh page is split, line by line, with the continuation
/// lines drawn unbulleted. For the first item of the section "a fresh page"
/// means the room left under the header bar, so the bar is never left alone.
pub fn list_section(
    canvas: &mut Canvas,
    ctx: &BlockContext<'_>,
    cursor_y: Pt,
    section: SectionSpec<'_>,
    items: &[String],
    resume: ListResume,
) -> Progress<ListResume> {
    let layout = ctx.layout;
    let frame = ctx.frame;
    let line_height = layout.body_line_height();
    let body = ctx.body_style();
    let text_x = frame.x() + layout.item_text_indent;
    let header_space = layout.section_title_height + layout.item_spacing;
    let room_under_header = frame.height() - header_space;
    let mut state = resume;
    let mut y = cursor_y;
    let mut marked = false;
    let mut under_header = false;

    if !state.header_drawn {
        let pending = items
            .get(state.next_item)
            .map(|item| {
                let lines = item_lines(ctx, canvas, item).len().saturating_sub(state.next_line);
                let height = line_height * lines as i32;
                // Too tall to sit whole under the bar: it will be split from here.
                if height <= room_under_header { height } else { line_height }
            })
            .unwrap_or(Pt::ZERO);
        if !frame.fits(y, header_space + pending) && !frame.is_fresh(y) {
            return Progress::Overflowed(state);
        }
        mark_block(canvas, section.key, &mut marked);
        section_header(canvas, ctx, y, section.title, section.accent);
        y += header_space;
        state.header_drawn = true;
        under_header = true;
    }

    while let Some(item) = items.get(state.next_item) {
        let lines = item_lines(ctx, canvas, item);
        let item_height = line_height * lines.len() as i32;

        if state.next_line == 0 {
            if frame.fits(y, item_height) {
                mark_block(canvas, section.key, &mut marked);
                draw_bullet(canvas, ctx, y, section.accent);
                for line in &lines {
                    canvas.write_text(line, text_x, y, &body);
                    y += line_height;
                }
                y += layout.item_spacing;
                state.next_item += 1;
                under_header = false;
                continue;
            }
            let room = if under_header { room_under_header } else { frame.height() };
            if item_height <= room {
                return Progress::Overflowed(state);
            }
            // Cannot fit whole anywhere: start splitting here if a line fits.
            if !frame.fits(y, line_height) {
                return Progress::Overflowed(state);
            }
            mark_block(canvas, section.key, &mut marked);
            draw_bullet(canvas, ctx, y, section.accent);
        }

        while let Some(line) = lines.get(state.next_line) {
            if !frame.fits(y, line_height) {
                return Progress::Overflowed(state);
            }
            mark_block(canvas, section.key, &mut marked);
            canvas.write_text(line, text_x, y, &body);
            y += line_height;
            state.next_line += 1;
        }
        y += layout.item_spacing;
        state.next_item += 1;
        state.next_line = 0;
        under_header = false;
    }

    Progress::Continued(y + layout.section_spacing)
}

/// Footer band drawn in the finalize pass, identical position on every page.
pub fn footer_band(
    canvas: &mut Canvas,
    ctx: &BlockContext<'_>,
    page_number: usize,
    total_pages: usize,
    timestamp: &str,
) {
    let layout = ctx.layout;
    let theme = ctx.theme;
    let mm = Pt::from_mm;
    canvas.meta(META_BLOCK_KEY, "footer");
    let baseline = layout.page_size.height - layout.footer_height + mm(15.0);
    let left = layout.margins.left;
    let right = layout.page_size.width - layout.margins.right;

    canvas.draw_line(
        (left, baseline - mm(8.0)),
        (right, baseline - mm(8.0)),
        theme.color(ColorToken::BorderDark),
        Pt::from_f32(0.8),
    );

    let brand = ctx.style(FontFace::Helvetica, layout.fonts.small, ColorToken::TextMuted);
    text_at_baseline(canvas, FOOTER_BRAND, left, baseline, &brand);

    let indicator = ctx.style(FontFace::HelveticaBold, layout.fonts.small, ColorToken::Primary);
    let indicator_text = format!("{page_number}/{total_pages}");
    let indicator_width = canvas.measure_text(&indicator_text, &indicator);
    let indicator_x = right - indicator_width;
    text_at_baseline(canvas, &indicator_text, indicator_x, baseline, &indicator);

    let stamp = ctx.style(
        FontFace::Helvetica,
        layout.fonts.small - Pt::from_i32(1),
        ColorToken::TextMuted,
    );
    let stamp_x = indicator_x - mm(5.0) - canvas.measure_text(timestamp, &stamp);
    text_at_baseline(canvas, timestamp, stamp_x, baseline, &stamp);
}
