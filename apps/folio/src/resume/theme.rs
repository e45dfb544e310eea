//! PDF design system: colors, font roles, and layout constants.
//!
//! Every length is in millimetres, font sizes in points. The defaults produce
//! an A4 single-column resume; a JSON file may override any subset.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfTheme {
    pub page: PageSize,
    pub colors: Colors,
    pub fonts: FontRoles,
    pub layout: LayoutMetrics,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    pub const A4: PageSize = PageSize {
        width: 210.0,
        height: 297.0,
    };
}

impl Default for PageSize {
    fn default() -> Self {
        Self::A4
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Colors {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
    pub line: String,
}

impl Default for Colors {
    fn default() -> Self {
        Self {
            primary: "#000000".to_string(),
            secondary: "#333333".to_string(),
            accent: "#666666".to_string(),
            line: "#E0E0E0".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    Normal,
    Bold,
    Italic,
    BoldItalic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    pub family: String,
    pub style: FontStyle,
    pub size: f32,
}

impl FontSpec {
    fn helvetica(style: FontStyle, size: f32) -> Self {
        Self {
            family: "helvetica".to_string(),
            style,
            size,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontRoles {
    pub name: FontSpec,
    pub title: FontSpec,
    pub contact: FontSpec,
    pub section_title: FontSpec,
    pub job_title: FontSpec,
    pub body: FontSpec,
    pub small: FontSpec,
    pub italic: FontSpec,
}

impl FontRoles {
    pub fn all(&self) -> [&FontSpec; 8] {
        [
            &self.name,
            &self.title,
            &self.contact,
            &self.section_title,
            &self.job_title,
            &self.body,
            &self.small,
            &self.italic,
        ]
    }
}

impl Default for FontRoles {
    fn default() -> Self {
        Self {
            name: FontSpec::helvetica(FontStyle::Bold, 24.0),
            title: FontSpec::helvetica(FontStyle::Normal, 11.0),
            contact: FontSpec::helvetica(FontStyle::Normal, 9.0),
            section_title: FontSpec::helvetica(FontStyle::Bold, 11.0),
            job_title: FontSpec::helvetica(FontStyle::Bold, 10.0),
            body: FontSpec::helvetica(FontStyle::Normal, 9.0),
            small: FontSpec::helvetica(FontStyle::Normal, 8.0),
            italic: FontSpec::helvetica(FontStyle::Italic, 9.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutMetrics {
    pub margin: f32,
    /// Base line height; block spacing is expressed as multiples of it.
    pub line_height: f32,
    /// Line height for wrapped body text (summary, bullets).
    pub body_line_height: f32,
    pub section_spacing: f32,
    /// Indent reserved for the bullet glyph.
    pub bullet_width: f32,
    /// Extra space after each bullet item.
    pub bullet_gap: f32,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            margin: 25.0,
            line_height: 4.5,
            body_line_height: 4.0,
            section_spacing: 8.0,
            bullet_width: 4.0,
            bullet_gap: 2.5,
        }
    }
}

impl Default for PdfTheme {
    fn default() -> Self {
        Self {
            page: PageSize::A4,
            colors: Colors::default(),
            fonts: FontRoles::default(),
            layout: LayoutMetrics::default(),
        }
    }
}

impl PdfTheme {
    /// Loads a theme override file; missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read theme file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Theme file {} is not a valid theme", path.display()))
    }

    /// Width available to text between the side margins.
    pub fn content_width(&self) -> f32 {
        self.page.width - self.layout.margin * 2.0
    }
}

/// An RGB color with components in 0.0..=1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub f32, pub f32, pub f32);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0.0, 0.0, 0.0);

    /// Parses `#RRGGBB` (or `RRGGBB`). Unparseable input is black.
    pub fn from_hex(hex: &str) -> Self {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.is_ascii() {
            return Self::BLACK;
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map(|v| v as f32 / 255.0)
                .ok()
        };
        match (channel(0), channel(2), channel(4)) {
            (Some(r), Some(g), Some(b)) => Rgb(r, g, b),
            _ => Self::BLACK,
        }
    }
}
