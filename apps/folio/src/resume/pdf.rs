//! PDF Pagination Engine.
//!
//! Lays out a `ResumeOutline` top to bottom with a single vertical cursor.
//! Two guards keep content off the bottom margin:
//! - `ensure_block_fits` before a multi-line block, with an estimated height, so
//!   a heading is never separated from its first line;
//! - `check_page_break` before every wrapped line, so long paragraphs flow
//!   across a break without a line ever straddling two pages.
//!
//! Neither guard breaks when the cursor is already at the top margin, so a block
//! taller than a page flows instead of producing an empty page.

use tracing::debug;

use crate::models::content::{Education, Job};
use crate::resume::canvas::{Align, PdfCanvas};
use crate::resume::outline::{
    ResumeOutline, SkillsOutline, EDUCATION_TITLE, EXPERIENCE_TITLE, PROFILE_TITLE,
    PROJECTS_TITLE, REFERENCES_TITLE, SKILLS_TITLE,
};
use crate::resume::theme::{FontSpec, PageSize, PdfTheme, Rgb};
use crate::resume::ResumeError;

const BULLET: &str = "\u{2022}";
const CONTACT_SEPARATOR: &str = " | ";

// Block estimates, in millimetres.
const SECTION_HEADING_BLOCK: f32 = 16.0;
const PROJECT_BLOCK: f32 = 25.0;
const EDUCATION_BLOCK: f32 = 18.0;
const REFERENCE_BLOCK: f32 = 16.0;
const SKILL_GROUP_BASE: f32 = 14.0;
const SKILL_ROW_ESTIMATE: f32 = 7.0;
const SKILL_ROW_BLOCK: f32 = 8.0;
const JOB_GAP: f32 = 10.0;
const PROJECT_GAP: f32 = 8.0;
const SKILL_GROUP_GAP: f32 = 4.0;
const SECTION_TAIL: f32 = 4.0;

/// `"Ada  Lovelace "` → `"Ada_Lovelace_Resume.pdf"`.
pub fn pdf_file_name(name: &str) -> String {
    let joined = name.split_whitespace().collect::<Vec<_>>().join("_");
    format!("{joined}_Resume.pdf")
}

// ────────────────────────────────────────────────────────────────────────────
// Cursor
// ────────────────────────────────────────────────────────────────────────────

/// Running vertical write position; scoped to one render.
#[derive(Debug, Clone, Copy)]
pub struct PageCursor {
    pub y: f32,
    top: f32,
    bottom: f32,
}

impl PageCursor {
    pub fn new(page: PageSize, margin: f32) -> Self {
        Self {
            y: margin,
            top: margin,
            bottom: page.height - margin,
        }
    }

    pub fn advance(&mut self, dy: f32) {
        self.y += dy;
    }

    pub fn at_top(&self) -> bool {
        self.y <= self.top
    }

    /// Starts a new page when `required` would cross the bottom margin.
    /// Returns whether a page was added.
    pub fn check_page_break(&mut self, canvas: &mut dyn PdfCanvas, required: f32) -> bool {
        if self.y + required > self.bottom && !self.at_top() {
            canvas.add_page();
            self.y = self.top;
            return true;
        }
        false
    }

    /// Coarse guard before a whole block of estimated height `estimate`.
    pub fn ensure_block_fits(&mut self, canvas: &mut dyn PdfCanvas, estimate: f32) -> bool {
        self.check_page_break(canvas, estimate)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Renderer
// ────────────────────────────────────────────────────────────────────────────

struct Palette {
    primary: Rgb,
    secondary: Rgb,
    line: Rgb,
}

struct Renderer<'a> {
    canvas: &'a mut dyn PdfCanvas,
    theme: &'a PdfTheme,
    page: PageSize,
    palette: Palette,
    cursor: PageCursor,
}

/// Renders `outline` onto `canvas` and serializes it.
///
/// Nothing is returned unless the whole document was drawn and serialized.
pub fn render_to_pdf(
    outline: &ResumeOutline,
    theme: &PdfTheme,
    canvas: &mut dyn PdfCanvas,
) -> Result<Vec<u8>, ResumeError> {
    let page = canvas.page_size();
    debug!(
        sections = ?outline.section_titles(),
        width = page.width,
        height = page.height,
        "Rendering resume PDF"
    );
    let mut renderer = Renderer {
        palette: Palette {
            primary: Rgb::from_hex(&theme.colors.primary),
            secondary: Rgb::from_hex(&theme.colors.secondary),
            line: Rgb::from_hex(&theme.colors.line),
        },
        cursor: PageCursor::new(page, theme.layout.margin),
        canvas,
        theme,
        page,
    };

    renderer.header(outline)?;
    if outline.show_profile() {
        renderer.profile(&outline.profile)?;
    }
    if outline.show_projects() {
        renderer.projects(outline)?;
    }
    if let Some(jobs) = &outline.experience {
        renderer.experience(jobs)?;
    }
    if let Some(education) = &outline.education {
        renderer.education(education)?;
    }
    if outline.show_skills() {
        renderer.skills(&outline.skills)?;
    }
    if outline.show_references() {
        renderer.references(outline)?;
    }

    let pages = renderer.canvas.page_count();
    let bytes = renderer.canvas.finish()?;
    debug!(pages, bytes = bytes.len(), "Resume PDF rendered");
    Ok(bytes)
}

impl Renderer<'_> {
    fn margin(&self) -> f32 {
        self.theme.layout.margin
    }

    fn right_edge(&self) -> f32 {
        self.page.width - self.theme.layout.margin
    }

    fn line_height(&self) -> f32 {
        self.theme.layout.line_height
    }

    fn use_font(&mut self, font: &FontSpec, color: Rgb) -> Result<(), ResumeError> {
        self.canvas.set_font(font)?;
        self.canvas.set_text_color(color);
        Ok(())
    }

    fn text(&mut self, text: &str, x: f32, align: Align) -> Result<(), ResumeError> {
        self.canvas.text(text, x, self.cursor.y, align)?;
        Ok(())
    }

    fn rule(&mut self, width: f32) {
        self.canvas.set_draw_color(self.palette.line);
        self.canvas.set_line_width(width);
        let (left, right, y) = (self.margin(), self.right_edge(), self.cursor.y);
        self.canvas.line(left, y, right, y);
    }

    /// Draws `text` wrapped to `width`, one guarded line at a time.
    /// The optional `marker` is drawn at the margin beside the first line.
    fn wrapped(
        &mut self,
        text: &str,
        x: f32,
        width: f32,
        marker: Option<&str>,
    ) -> Result<usize, ResumeError> {
        let line_height = self.theme.layout.body_line_height;
        let lines = self.canvas.split_text_to_size(text, width);
        for (i, line) in lines.iter().enumerate() {
            self.cursor.check_page_break(self.canvas, line_height);
            if i == 0 {
                if let Some(marker) = marker {
                    let margin = self.margin();
                    self.text(marker, margin, Align::Left)?;
                }
            }
            self.text(line, x, Align::Left)?;
            self.cursor.advance(line_height);
        }
        Ok(lines.len())
    }

    fn bullet(&mut self, text: &str) -> Result<(), ResumeError> {
        let layout = &self.theme.layout;
        let (x, width, gap) = (
            layout.margin + layout.bullet_width,
            self.theme.content_width() - layout.bullet_width,
            layout.bullet_gap,
        );
        let body = self.theme.fonts.body.clone();
        self.use_font(&body, self.palette.primary)?;
        if self.wrapped(text, x, width, Some(BULLET))? > 0 {
            self.cursor.advance(gap);
        }
        Ok(())
    }

    /// Single-line bullet (skills): glyph plus text, no wrapping.
    fn bullet_row(&mut self, text: &str) -> Result<(), ResumeError> {
        self.cursor.ensure_block_fits(self.canvas, SKILL_ROW_BLOCK);
        let body = self.theme.fonts.body.clone();
        self.use_font(&body, self.palette.primary)?;
        let margin = self.margin();
        self.text(BULLET, margin, Align::Left)?;
        self.text(text, margin + self.theme.layout.bullet_width, Align::Left)?;
        self.cursor.advance(self.line_height() * 1.1);
        Ok(())
    }

    /// Upper-cased heading on the left, `period` right-aligned on the same line.
    fn heading_with_period(&mut self, heading: &str, period: &str) -> Result<(), ResumeError> {
        let fonts = self.theme.fonts.clone();
        self.use_font(&fonts.job_title, self.palette.primary)?;
        let margin = self.margin();
        self.text(&heading.to_uppercase(), margin, Align::Left)?;
        if !period.is_empty() {
            self.use_font(&fonts.small, self.palette.secondary)?;
            let right = self.right_edge();
            self.text(period, right, Align::Right)?;
        }
        self.cursor.advance(self.line_height() * 1.5);
        Ok(())
    }

    fn section(&mut self, title: &str) -> Result<(), ResumeError> {
        self.cursor.check_page_break(self.canvas, SECTION_HEADING_BLOCK);
        let font = self.theme.fonts.section_title.clone();
        self.use_font(&font, self.palette.primary)?;
        let margin = self.margin();
        self.text(&title.to_uppercase(), margin, Align::Left)?;
        self.cursor.advance(self.line_height() * 1.7);
        self.rule(0.4);
        self.cursor.advance(5.0);
        Ok(())
    }

    fn section_tail(&mut self) {
        self.cursor
            .advance(self.theme.layout.section_spacing + SECTION_TAIL);
    }

    fn header(&mut self, outline: &ResumeOutline) -> Result<(), ResumeError> {
        let fonts = self.theme.fonts.clone();
        let center = self.page.width / 2.0;
        let header = &outline.header;

        self.use_font(&fonts.name, self.palette.primary)?;
        self.text(&header.name.to_uppercase(), center, Align::Center)?;
        self.cursor.advance(6.0);

        if let Some(title) = &header.title {
            self.use_font(&fonts.title, self.palette.primary)?;
            self.text(title, center, Align::Center)?;
            self.cursor.advance(5.0);
        }

        if !header.contact.is_empty() {
            self.use_font(&fonts.contact, self.palette.secondary)?;
            self.text(&header.contact_line(CONTACT_SEPARATOR), center, Align::Center)?;
        }
        self.cursor.advance(12.0);

        self.rule(0.5);
        self.cursor.advance(10.0);
        Ok(())
    }

    fn profile(&mut self, summary: &str) -> Result<(), ResumeError> {
        self.section(PROFILE_TITLE)?;
        let body = self.theme.fonts.body.clone();
        self.use_font(&body, self.palette.primary)?;
        let (x, width) = (self.margin(), self.theme.content_width());
        self.wrapped(summary, x, width, None)?;
        self.cursor.advance(self.theme.layout.section_spacing);
        Ok(())
    }

    fn projects(&mut self, outline: &ResumeOutline) -> Result<(), ResumeError> {
        self.section(PROJECTS_TITLE)?;
        let fonts = self.theme.fonts.clone();
        let last = outline.projects.len().saturating_sub(1);
        for (i, project) in outline.projects.iter().enumerate() {
            self.cursor.ensure_block_fits(self.canvas, PROJECT_BLOCK);
            self.use_font(&fonts.job_title, self.palette.primary)?;
            let margin = self.margin();
            self.text(&project.title.to_uppercase(), margin, Align::Left)?;
            self.cursor.advance(self.line_height() * 1.5);

            if let Some(subtitle) = &project.subtitle {
                self.use_font(&fonts.italic, self.palette.secondary)?;
                self.text(subtitle, margin, Align::Left)?;
                self.cursor.advance(self.line_height() * 1.3);
            }

            for line in &project.bullets {
                self.bullet(line)?;
            }
            if i < last {
                self.cursor.advance(PROJECT_GAP);
            }
        }
        self.section_tail();
        Ok(())
    }

    fn estimate_job_height(&self, job: &Job) -> f32 {
        let lh = self.line_height();
        lh * 1.5
            + lh * 1.7
            + job.achievements.len() as f32 * (lh * 1.1 + self.theme.layout.bullet_gap)
            + JOB_GAP
    }

    fn experience(&mut self, jobs: &[Job]) -> Result<(), ResumeError> {
        self.section(EXPERIENCE_TITLE)?;
        let body = self.theme.fonts.body.clone();
        let last = jobs.len().saturating_sub(1);
        for (i, job) in jobs.iter().enumerate() {
            let estimate = self.estimate_job_height(job);
            self.cursor.ensure_block_fits(self.canvas, estimate);
            self.heading_with_period(&job.title, &job.period)?;

            let employer = [job.company.as_str(), job.location.as_str()]
                .into_iter()
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(", ");
            if !employer.is_empty() {
                self.use_font(&body, self.palette.secondary)?;
                let margin = self.margin();
                self.text(&employer, margin, Align::Left)?;
            }
            self.cursor.advance(self.line_height() * 1.7);

            for achievement in &job.achievements {
                self.bullet(achievement)?;
            }
            if i < last {
                self.cursor.advance(JOB_GAP);
            }
        }
        self.section_tail();
        Ok(())
    }

    fn education(&mut self, entries: &[Education]) -> Result<(), ResumeError> {
        self.section(EDUCATION_TITLE)?;
        let body = self.theme.fonts.body.clone();
        let last = entries.len().saturating_sub(1);
        for (i, entry) in entries.iter().enumerate() {
            self.cursor.ensure_block_fits(self.canvas, EDUCATION_BLOCK);
            self.heading_with_period(&entry.institution, &entry.period)?;
            self.use_font(&body, self.palette.secondary)?;
            let margin = self.margin();
            self.text(&entry.degree, margin, Align::Left)?;
            let gap = if i < last { 2.5 } else { 2.0 };
            self.cursor.advance(self.line_height() * gap);
        }
        self.section_tail();
        Ok(())
    }

    fn skills(&mut self, skills: &SkillsOutline) -> Result<(), ResumeError> {
        self.section(SKILLS_TITLE)?;
        match skills {
            SkillsOutline::Grouped(groups) => {
                let job_title = self.theme.fonts.job_title.clone();
                for group in groups {
                    let estimate = SKILL_GROUP_BASE + group.titles.len() as f32 * SKILL_ROW_ESTIMATE;
                    self.cursor.ensure_block_fits(self.canvas, estimate);
                    self.use_font(&job_title, self.palette.primary)?;
                    let margin = self.margin();
                    self.text(&group.category, margin, Align::Left)?;
                    self.cursor.advance(self.line_height() * 1.2);
                    for title in &group.titles {
                        self.bullet_row(title)?;
                    }
                    self.cursor.advance(SKILL_GROUP_GAP);
                }
            }
            SkillsOutline::Flat(titles) => {
                self.cursor
                    .ensure_block_fits(self.canvas, titles.len() as f32 * SKILL_ROW_ESTIMATE);
                for title in titles {
                    self.bullet_row(title)?;
                }
            }
        }
        self.section_tail();
        Ok(())
    }

    fn references(&mut self, outline: &ResumeOutline) -> Result<(), ResumeError> {
        self.section(REFERENCES_TITLE)?;
        let fonts = self.theme.fonts.clone();
        for reference in &outline.references {
            self.cursor.ensure_block_fits(self.canvas, REFERENCE_BLOCK);
            let margin = self.margin();
            self.use_font(&fonts.job_title, self.palette.primary)?;
            self.text(&reference.name, margin, Align::Left)?;
            self.cursor.advance(self.line_height() * 1.5);
            self.use_font(&fonts.body, self.palette.secondary)?;
            self.text(&reference.title, margin, Align::Left)?;
            self.cursor.advance(self.line_height() * 2.0);
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
