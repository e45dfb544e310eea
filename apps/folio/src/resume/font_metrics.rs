//! Static font-metric tables for the base-14 Helvetica faces.
//!
//! Character widths are in em units (relative to font size), taken from the
//! standard Helvetica AFM files. Oblique faces share the widths of their upright
//! counterparts. All tables cover ASCII 0x20..=0x7E (95 printable characters).
//! Index = (char as usize) - 32.

use crate::resume::theme::{FontSpec, FontStyle};

/// Millimetres per PostScript point.
pub const MM_PER_PT: f32 = 25.4 / 72.0;

/// The base-14 families the PDF backend can draw without embedding a font.
pub const SUPPORTED_FAMILIES: &[&str] = &["helvetica"];

// ────────────────────────────────────────────────────────────────────────────
// Faces
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFace {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
}

impl FontFace {
    pub const ALL: [FontFace; 4] = [
        FontFace::Helvetica,
        FontFace::HelveticaBold,
        FontFace::HelveticaOblique,
        FontFace::HelveticaBoldOblique,
    ];

    pub fn for_style(style: FontStyle) -> Self {
        match style {
            FontStyle::Normal => FontFace::Helvetica,
            FontStyle::Bold => FontFace::HelveticaBold,
            FontStyle::Italic => FontFace::HelveticaOblique,
            FontStyle::BoldItalic => FontFace::HelveticaBoldOblique,
        }
    }

    /// PostScript name of the face, as written into the PDF font dictionary.
    pub fn base_font(self) -> &'static str {
        match self {
            FontFace::Helvetica => "Helvetica",
            FontFace::HelveticaBold => "Helvetica-Bold",
            FontFace::HelveticaOblique => "Helvetica-Oblique",
            FontFace::HelveticaBoldOblique => "Helvetica-BoldOblique",
        }
    }
}

pub fn is_supported_family(family: &str) -> bool {
    SUPPORTED_FAMILIES
        .iter()
        .any(|f| f.eq_ignore_ascii_case(family))
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Static character-width table for a face.
///
/// `widths[i]` = width of ASCII character `(i + 32)` in em.
pub struct FontMetricTable {
    widths: [f32; 95],
    /// Fallback width for non-ASCII characters (codepoints > 0x7E).
    pub average_char_width: f32,
    pub space_width: f32,
}

impl FontMetricTable {
    /// Measures the rendered width of a string in em units.
    pub fn measure_str(&self, s: &str) -> f32 {
        s.chars()
            .map(|c| {
                let code = c as usize;
                if (32..=126).contains(&code) {
                    self.widths[code - 32]
                } else {
                    self.average_char_width
                }
            })
            .sum()
    }

    /// Rendered width in millimetres at `size_pt`.
    pub fn width_mm(&self, s: &str, size_pt: f32) -> f32 {
        self.measure_str(s) * size_pt * MM_PER_PT
    }

    /// Greedy word wrap to `max_width_mm`.
    ///
    /// Whitespace runs collapse to a single space. A word wider than a whole
    /// line is broken between characters. Empty input yields no lines.
    pub fn wrap_lines(&self, text: &str, max_width_mm: f32, size_pt: f32) -> Vec<String> {
        let max_em = max_width_mm / (size_pt * MM_PER_PT);
        let mut lines = Vec::new();
        let mut current = String::new();
        let mut current_width = 0.0_f32;

        for word in text.split_whitespace() {
            let word_w = self.measure_str(word);

            if word_w > max_em {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                    current_width = 0.0;
                }
                for piece in self.break_word(word, max_em) {
                    current_width = self.measure_str(&piece);
                    if !current.is_empty() {
                        lines.push(std::mem::take(&mut current));
                    }
                    current = piece;
                }
                continue;
            }

            let space_w = if current.is_empty() {
                0.0
            } else {
                self.space_width
            };
            if !current.is_empty() && current_width + space_w + word_w > max_em {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
                current_width = word_w;
            } else {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(word);
                current_width += space_w + word_w;
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
        lines
    }

    fn break_word(&self, word: &str, max_em: f32) -> Vec<String> {
        let mut pieces = Vec::new();
        let mut piece = String::new();
        let mut width = 0.0_f32;
        for c in word.chars() {
            let mut buf = [0u8; 4];
            let cw = self.measure_str(c.encode_utf8(&mut buf));
            if !piece.is_empty() && width + cw > max_em {
                pieces.push(std::mem::take(&mut piece));
                width = 0.0;
            }
            piece.push(c);
            width += cw;
        }
        if !piece.is_empty() {
            pieces.push(piece);
        }
        pieces
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables  (95 ASCII printable characters each)
// ────────────────────────────────────────────────────────────────────────────

/// Helvetica / Helvetica-Oblique.
static HELVETICA_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.278, 0.355, 0.556, 0.556, 0.889, 0.667, 0.222, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.278, 0.278, 0.584, 0.584, 0.584, 0.556, 1.015,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.667, 0.667, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.500, 0.667, 0.556, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.278, 0.278, 0.278, 0.469, 0.556, 0.222,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.556, 0.500, 0.556, 0.556, 0.278, 0.556, 0.556, 0.222, 0.222, 0.500, 0.222, 0.833,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.556, 0.556, 0.556, 0.556, 0.333, 0.500, 0.278, 0.556, 0.500, 0.722, 0.500, 0.500, 0.500,
        // {      |      }      ~
        0.334, 0.260, 0.334, 0.584,
    ],
    average_char_width: 0.513,
    space_width: 0.278,
};

/// Helvetica-Bold / Helvetica-BoldOblique.
static HELVETICA_BOLD_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.333, 0.474, 0.556, 0.556, 0.889, 0.722, 0.278, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.333, 0.333, 0.584, 0.584, 0.584, 0.611, 0.975,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.722, 0.722, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.556, 0.722, 0.611, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.333, 0.278, 0.333, 0.584, 0.556, 0.278,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.611, 0.556, 0.611, 0.556, 0.333, 0.611, 0.611, 0.278, 0.278, 0.556, 0.278, 0.889,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.611, 0.611, 0.611, 0.611, 0.389, 0.556, 0.333, 0.611, 0.556, 0.778, 0.556, 0.556, 0.500,
        // {      |      }      ~
        0.389, 0.280, 0.389, 0.584,
    ],
    average_char_width: 0.556,
    space_width: 0.278,
};

pub fn get_metrics(face: FontFace) -> &'static FontMetricTable {
    match face {
        FontFace::Helvetica | FontFace::HelveticaOblique => &HELVETICA_TABLE,
        FontFace::HelveticaBold | FontFace::HelveticaBoldOblique => &HELVETICA_BOLD_TABLE,
    }
}

/// Metric table for a theme font role.
pub fn metrics_for(font: &FontSpec) -> &'static FontMetricTable {
    get_metrics(FontFace::for_style(font.style))
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
