use crate::error::{ReportError, Result};
use crate::frame::Frame;
use crate::types::{Margins, Pt, Rect, Size};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSizes {
    pub title: Pt,
    pub subtitle: Pt,
    pub heading: Pt,
    pub subheading: Pt,
    pub body: Pt,
    pub caption: Pt,
    pub small: Pt,
}

impl Default for FontSizes {
    fn default() -> Self {
        Self {
            title: Pt::from_i32(24),
            subtitle: Pt::from_i32(18),
            heading: Pt::from_i32(16),
            subheading: Pt::from_i32(14),
            body: Pt::from_i32(12),
            caption: Pt::from_i32(10),
            small: Pt::from_i32(8),
        }
    }
}

/// Page geometry and block dimensions. All values are fixed for the whole
/// render; nothing here is recomputed per block.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    pub page_size: Size,
    pub margins: Margins,
    pub header_height: Pt,
    pub footer_height: Pt,
    pub section_spacing: Pt,
    pub item_spacing: Pt,
    pub title_card_height: Pt,
    pub metadata_card_height: Pt,
    pub score_card_height: Pt,
    pub section_title_height: Pt,
    pub card_radius: Pt,
    pub small_radius: Pt,
    pub body_indent: Pt,
    pub bullet_indent: Pt,
    pub bullet_size: Pt,
    pub item_text_indent: Pt,
    pub gradient_steps: usize,
    pub line_height_factor: f32,
    pub fonts: FontSizes,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let mm = Pt::from_mm;
        Self {
            page_size: Size::a4(),
            margins: Margins {
                top: mm(10.0),
                right: mm(20.0),
                bottom: mm(5.0),
                left: mm(20.0),
            },
            header_height: mm(35.0),
            footer_height: mm(25.0),
            section_spacing: mm(10.0),
            item_spacing: mm(3.0),
            title_card_height: mm(40.0),
            metadata_card_height: mm(35.0),
            score_card_height: mm(60.0),
            section_title_height: mm(12.0),
            card_radius: mm(6.0),
            small_radius: mm(3.0),
            body_indent: mm(10.0),
            bullet_indent: mm(10.0),
            bullet_size: mm(1.5),
            item_text_indent: mm(16.0),
            gradient_steps: 10,
            line_height_factor: 1.4,
            fonts: FontSizes::default(),
        }
    }
}

impl LayoutConfig {
    /// Flowing region: below the header band and its margin, above the
    /// footer band and its margin.
    pub fn content_frame(&self) -> Frame {
        let top = self.header_height + self.margins.top;
        let bottom = self.page_size.height - self.footer_height - self.margins.bottom;
        Frame::new(Rect {
            x: self.margins.left,
            y: top,
            width: self.content_width(),
            height: (bottom - top).max(Pt::ZERO),
        })
    }

    pub fn content_width(&self) -> Pt {
        (self.page_size.width - self.margins.left - self.margins.right).max(Pt::ZERO)
    }

    pub fn line_height(&self, font_size: Pt) -> Pt {
        font_size * self.line_height_factor
    }

    pub fn body_line_height(&self) -> Pt {
        self.line_height(self.fonts.body)
    }

    /// Checks that every fixed-height block fits on a fresh page and that
    /// flowing sections can make progress on one.
    pub fn validate(&self) -> Result<()> {
        let frame = self.content_frame();
        if frame.height() <= Pt::ZERO || frame.width() <= Pt::ZERO {
            return Err(ReportError::InvalidConfiguration(format!(
                "content frame is empty ({}x{}pt)",
                frame.width().to_f32(),
                frame.height().to_f32()
            )));
        }
        if !(self.line_height_factor.is_finite() && self.line_height_factor > 0.0) {
            return Err(ReportError::InvalidConfiguration(
                "line_height_factor must be positive".to_string(),
            ));
        }
        if self.body_line_height() <= Pt::ZERO {
            return Err(ReportError::InvalidConfiguration(
                "body line height must be positive".to_string(),
            ));
        }
        let fixed = [
            ("title_card", self.title_card_height),
            ("metadata_card", self.metadata_card_height),
            ("score_card", self.score_card_height),
            (
                "section_header",
                self.section_title_height + self.item_spacing + self.body_line_height(),
            ),
        ];
        for (name, height) in fixed {
            if height > frame.height() {
                return Err(ReportError::OverflowMisconfiguration(format!(
                    "{} is {}pt tall but the content frame is {}pt",
                    name,
                    height.to_f32(),
                    frame.height().to_f32()
                )));
            }
        }
        if self.item_text_indent >= self.content_width() {
            return Err(ReportError::InvalidConfiguration(
                "item text indent leaves no room for text".to_string(),
            ));
        }
        Ok(())
    }
}
