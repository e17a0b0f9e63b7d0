use crate::types::{Pt, Rect};

/// The flowing content region of a page. Blocks write downward from
/// `rect.y` and must stay above `rect.bottom()`, the safe bottom margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    rect: Rect,
}

impl Frame {
    pub fn new(rect: Rect) -> Self {
        Self { rect }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn x(&self) -> Pt {
        self.rect.x
    }

    pub fn width(&self) -> Pt {
        self.rect.width
    }

    pub fn top(&self) -> Pt {
        self.rect.y
    }

    pub fn bottom(&self) -> Pt {
        self.rect.bottom()
    }

    pub fn height(&self) -> Pt {
        self.rect.height
    }

    pub fn remaining_height(&self, cursor_y: Pt) -> Pt {
        (self.bottom() - cursor_y).max(Pt::ZERO)
    }

    pub fn fits(&self, cursor_y: Pt, height: Pt) -> bool {
        cursor_y + height <= self.bottom()
    }

    /// True when nothing has been written below the top of the frame yet.
    pub fn is_fresh(&self, cursor_y: Pt) -> bool {
        cursor_y <= self.top()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> Frame {
        Frame::new(Rect {
            x: Pt::from_i32(10),
            y: Pt::from_i32(100),
            width: Pt::from_i32(400),
            height: Pt::from_i32(500),
        })
    }

    #[test]
    fn fits_is_inclusive_of_the_safe_bottom() {
        let frame = frame();
        assert!(frame.fits(Pt::from_i32(100), Pt::from_i32(500)));
        assert!(!frame.fits(Pt::from_i32(101), Pt::from_i32(500)));
    }

    #[test]
    fn remaining_height_never_goes_negative() {
        let frame = frame();
        assert_eq!(frame.remaining_height(Pt::from_i32(550)), Pt::from_i32(50));
        assert_eq!(frame.remaining_height(Pt::from_i32(900)), Pt::ZERO);
    }

    #[test]
    fn freshness_tracks_the_top_edge() {
        let frame = frame();
        assert!(frame.is_fresh(frame.top()));
        assert!(!frame.is_fresh(frame.top() + Pt::from_i32(1)));
    }
}
