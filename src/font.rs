use crate::types::Pt;

/// Base-14 faces the report draws with. Both are WinAnsi-encoded Type1
/// fonts, so no font program is embedded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FontFace {
    Helvetica,
    HelveticaBold,
}

impl FontFace {
    pub fn base_font(self) -> &'static str {
        match self {
            FontFace::Helvetica => "Helvetica",
            FontFace::HelveticaBold => "Helvetica-Bold",
        }
    }

    pub fn resource_name(self) -> &'static str {
        match self {
            FontFace::Helvetica => "F1",
            FontFace::HelveticaBold => "F2",
        }
    }

    fn metrics(self) -> &'static FontMetrics {
        match self {
            FontFace::Helvetica => &HELVETICA,
            FontFace::HelveticaBold => &HELVETICA_BOLD,
        }
    }

    pub fn measure_text_width(self, font_size: Pt, text: &str) -> Pt {
        self.metrics().measure_text_width(font_size, text)
    }

    pub fn line_height(self, font_size: Pt) -> Pt {
        self.metrics().line_height(font_size)
    }
}

// Advance widths in 1/1000 em for U+0020..=U+007E, from the Adobe AFM files.
struct FontMetrics {
    widths: [u16; 95],
    ascent: i16,
    descent: i16,
    missing_width: u16,
}

const HELVETICA: FontMetrics = FontMetrics {
    widths: [
        278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // 0x20
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0x30
        1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // 0x40
        667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 0x50
        333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 0x60
        556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 0x70
    ],
    ascent: 718,
    descent: -207,
    missing_width: 556,
};

const HELVETICA_BOLD: FontMetrics = FontMetrics {
    widths: [
        278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // 0x20
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 0x30
        975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // 0x40
        667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 0x50
        333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // 0x60
        611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 0x70
    ],
    ascent: 718,
    descent: -207,
    missing_width: 611,
};

impl FontMetrics {
    fn advance_for_char(&self, ch: char) -> u16 {
        let ch = match ch {
            '\u{2022}' => return 350,
            '\u{2013}' => return 556,
            '\u{2014}' | '\u{2026}' | '\u{2030}' => return 1000,
            '\u{2018}' | '\u{2019}' | '\u{201A}' => return 222,
            '\u{201C}' | '\u{201D}' | '\u{201E}' => return 333,
            '\u{00A0}' => ' ',
            '\u{00AB}' | '\u{00BB}' => return 556,
            '\u{0153}' | '\u{00E6}' => return 944,
            '\u{0152}' | '\u{00C6}' => return 1000,
            other => fold_latin1_accent(other),
        };
        let code = ch as u32;
        if !(0x20..=0x7E).contains(&code) {
            return self.missing_width;
        }
        self.widths[(code - 0x20) as usize]
    }

    fn measure_text_width(&self, font_size: Pt, text: &str) -> Pt {
        let total_units: i32 = text
            .chars()
            .map(|ch| self.advance_for_char(ch) as i32)
            .fold(0i32, |acc, w| acc.saturating_add(w));
        if total_units <= 0 {
            return Pt::ZERO;
        }
        font_size.mul_ratio(total_units, 1000)
    }

    fn line_height(&self, font_size: Pt) -> Pt {
        let height_1000 = self.ascent as i32 - self.descent as i32;
        if height_1000 <= 0 {
            return Pt::ZERO;
        }
        font_size.mul_ratio(height_1000, 1000)
    }
}

// Accented Latin-1 letters share the advance of their base letter in the
// Helvetica family.
fn fold_latin1_accent(ch: char) -> char {
    match ch {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'A',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'È' | 'É' | 'Ê' | 'Ë' => 'E',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'Ì' | 'Í' | 'Î' | 'Ï' => 'I',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' => 'O',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'Ù' | 'Ú' | 'Û' | 'Ü' => 'U',
        'ç' => 'c',
        'Ç' => 'C',
        'ñ' => 'n',
        'Ñ' => 'N',
        'ý' | 'ÿ' => 'y',
        'Ý' => 'Y',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measures_ascii_with_afm_widths() {
        let size = Pt::from_i32(10);
        // H(722) + i(222) = 944 units.
        let width = FontFace::Helvetica.measure_text_width(size, "Hi");
        assert_eq!(width.to_milli_i64(), 9440);
        let bold = FontFace::HelveticaBold.measure_text_width(size, "Hi");
        assert_eq!(bold.to_milli_i64(), 10000);
    }

    #[test]
    fn accented_letters_measure_like_their_base_letter() {
        let size = Pt::from_i32(12);
        assert_eq!(
            FontFace::Helvetica.measure_text_width(size, "Élevé"),
            FontFace::Helvetica.measure_text_width(size, "Eleve"),
        );
    }

    #[test]
    fn unknown_glyphs_use_missing_width() {
        let size = Pt::from_i32(1);
        let width = FontFace::Helvetica.measure_text_width(size, "\u{4e2d}");
        assert_eq!(width.to_milli_i64(), 556);
        assert_eq!(FontFace::Helvetica.measure_text_width(size, ""), Pt::ZERO);
    }

    #[test]
    fn line_height_spans_ascent_to_descent() {
        let height = FontFace::Helvetica.line_height(Pt::from_i32(10));
        assert_eq!(height.to_milli_i64(), 9250);
    }
}
