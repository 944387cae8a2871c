//! Approximate glyph widths for the preview's theme fonts.
//!
//! Widths are grouped into a handful of character classes per font rather than a full
//! per-glyph table. That is coarse, but the only consumer is the headless text-metrics
//! renderer, which needs line counts within a line or so, not exact advances.

use serde::{Deserialize, Serialize};

/// Fonts offered by the resume themes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontFamily {
    /// Modern theme.
    #[default]
    Inter,
    /// Professional theme.
    Roboto,
    /// Creative theme.
    Lato,
    /// Classic theme.
    Georgia,
    /// Academic theme.
    Merriweather,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Space,
    Narrow,
    Regular,
    Wide,
    Upper,
    Digit,
    Other,
}

fn classify(c: char) -> CharClass {
    match c {
        ' ' => CharClass::Space,
        'i' | 'l' | 'j' | 't' | 'f' | 'r' | 'I' | '.' | ',' | ':' | ';' | '\'' | '!' | '|' => {
            CharClass::Narrow
        }
        'm' | 'w' | 'M' | 'W' | '@' | '%' => CharClass::Wide,
        'A'..='Z' => CharClass::Upper,
        '0'..='9' => CharClass::Digit,
        c if c.is_ascii() => CharClass::Regular,
        _ => CharClass::Other,
    }
}

/// Per-class advance widths in em units.
#[derive(Debug, Clone, Copy)]
pub struct FontMetrics {
    pub font: FontFamily,
    space: f32,
    narrow: f32,
    regular: f32,
    wide: f32,
    upper: f32,
    digit: f32,
    /// Non-ASCII fallback.
    other: f32,
}

impl FontMetrics {
    fn width_of(&self, c: char) -> f32 {
        match classify(c) {
            CharClass::Space => self.space,
            CharClass::Narrow => self.narrow,
            CharClass::Regular => self.regular,
            CharClass::Wide => self.wide,
            CharClass::Upper => self.upper,
            CharClass::Digit => self.digit,
            CharClass::Other => self.other,
        }
    }

    /// Width of `s` in em units.
    pub fn measure_str(&self, s: &str) -> f32 {
        s.chars().map(|c| self.width_of(c)).sum()
    }

    /// Number of lines `text` wraps to at `max_width_em`, greedy word-wrap.
    ///
    /// Blank text is zero lines. A single word wider than the line still counts as one.
    pub fn wrapped_lines(&self, text: &str, max_width_em: f32) -> usize {
        let mut lines = 0usize;
        let mut current = 0.0_f32;

        for word in text.split_whitespace() {
            let word_w = self.measure_str(word);
            if lines == 0 {
                lines = 1;
                current = word_w;
            } else if current + self.space + word_w > max_width_em {
                lines += 1;
                current = word_w;
            } else {
                current += self.space + word_w;
            }
        }
        lines
    }
}

static INTER: FontMetrics = FontMetrics {
    font: FontFamily::Inter,
    space: 0.25,
    narrow: 0.27,
    regular: 0.54,
    wide: 0.80,
    upper: 0.65,
    digit: 0.56,
    other: 0.52,
};

static ROBOTO: FontMetrics = FontMetrics {
    font: FontFamily::Roboto,
    space: 0.25,
    narrow: 0.25,
    regular: 0.53,
    wide: 0.82,
    upper: 0.63,
    digit: 0.56,
    other: 0.51,
};

static LATO: FontMetrics = FontMetrics {
    font: FontFamily::Lato,
    space: 0.26,
    narrow: 0.28,
    regular: 0.56,
    wide: 0.85,
    upper: 0.68,
    digit: 0.58,
    other: 0.55,
};

static GEORGIA: FontMetrics = FontMetrics {
    font: FontFamily::Georgia,
    space: 0.24,
    narrow: 0.29,
    regular: 0.52,
    wide: 0.81,
    upper: 0.69,
    digit: 0.57,
    other: 0.53,
};

static MERRIWEATHER: FontMetrics = FontMetrics {
    font: FontFamily::Merriweather,
    space: 0.27,
    narrow: 0.31,
    regular: 0.60,
    wide: 0.90,
    upper: 0.73,
    digit: 0.62,
    other: 0.58,
};

pub fn get_metrics(font: FontFamily) -> &'static FontMetrics {
    match font {
        FontFamily::Inter => &INTER,
        FontFamily::Roboto => &ROBOTO,
        FontFamily::Lato => &LATO,
        FontFamily::Georgia => &GEORGIA,
        FontFamily::Merriweather => &MERRIWEATHER,
    }
}
