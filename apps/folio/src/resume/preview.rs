//! Resume preview modal.
//!
//! The modal is built from the same `ResumeOutline` as the PDF, so the two
//! outputs only differ in styling. At most one modal exists at a time.

use crate::content::markup::escape_html;
use crate::models::ContentDocument;
use crate::page::ModalHost;
use crate::resume::outline::{
    ResumeOutline, SkillsOutline, EDUCATION_TITLE, EXPERIENCE_TITLE, PROFILE_TITLE,
    PROJECTS_TITLE, REFERENCES_TITLE, SKILLS_TITLE,
};
use crate::resume::ResumeError;

pub const PREVIEW_MODAL_ID: &str = "resumePreviewModal";
pub const DOWNLOAD_ROUTE: &str = "/resume/download";

const PREVIEW_SEPARATOR: &str = "  |  ";

/// Replaces any open preview with one for `doc`.
///
/// The markup is built completely before the existing modal is touched; on
/// failure the host is left as it was.
pub fn show_preview<H: ModalHost + ?Sized>(
    host: &mut H,
    doc: &ContentDocument,
) -> Result<(), ResumeError> {
    let outline = ResumeOutline::from_document(doc)?;
    let html = render_modal(&outline);
    host.remove_overlay(PREVIEW_MODAL_ID);
    host.mount_overlay(PREVIEW_MODAL_ID, html);
    Ok(())
}

/// Removes the preview entirely. Returns whether one was open.
pub fn close_preview<H: ModalHost + ?Sized>(host: &mut H) -> bool {
    host.remove_overlay(PREVIEW_MODAL_ID)
}

pub fn render_modal(outline: &ResumeOutline) -> String {
    let mut sections = String::new();
    if outline.show_profile() {
        sections.push_str(&section(
            PROFILE_TITLE,
            &format!("<p>{}</p>", escape_html(&outline.profile)),
        ));
    }
    if outline.show_projects() {
        sections.push_str(&section(PROJECTS_TITLE, &render_projects(outline)));
    }
    if let Some(jobs) = &outline.experience {
        let body: String = jobs
            .iter()
            .map(|job| {
                let employer = [job.company.as_str(), job.location.as_str()]
                    .into_iter()
                    .filter(|part| !part.is_empty())
                    .collect::<Vec<_>>()
                    .join(", ");
                format!(
                    "{}<div class=\"preview-company\">{}</div>{}</div>",
                    entry_header(&job.title, &job.period),
                    escape_html(&employer),
                    bullet_list(&job.achievements),
                )
            })
            .collect();
        sections.push_str(&section(EXPERIENCE_TITLE, &body));
    }
    if let Some(education) = &outline.education {
        let body: String = education
            .iter()
            .map(|entry| {
                format!(
                    "{}<div class=\"preview-company\">{}</div></div>",
                    entry_header(&entry.institution, &entry.period),
                    escape_html(&entry.degree),
                )
            })
            .collect();
        sections.push_str(&section(EDUCATION_TITLE, &body));
    }
    if outline.show_skills() {
        sections.push_str(&section(SKILLS_TITLE, &render_skills(&outline.skills)));
    }
    if outline.show_references() {
        let body: String = outline
            .references
            .iter()
            .map(|r| {
                format!(
                    "<div class=\"preview-job\"><strong>{}</strong><div class=\"preview-company\">{}</div></div>",
                    escape_html(&r.name),
                    escape_html(&r.title),
                )
            })
            .collect();
        sections.push_str(&section(REFERENCES_TITLE, &body));
    }

    format!(
        concat!(
            "<div id=\"{id}\" class=\"resume-preview-modal\">",
            "<div class=\"resume-preview-container\">",
            "<div class=\"resume-preview-header\"><h2>Resume Preview</h2>",
            "<a class=\"close-preview\" href=\"/\" aria-label=\"Close\">&times;</a></div>",
            "<div class=\"resume-preview-content\">{header}{sections}</div>",
            "<div class=\"resume-preview-footer\">",
            "<a class=\"btn-secondary close-preview\" href=\"/\">Cancel</a>",
            "<a class=\"btn-primary\" id=\"downloadPdfBtn\" href=\"{download}\">Download PDF</a>",
            "</div></div></div>"
        ),
        id = PREVIEW_MODAL_ID,
        header = render_header(outline),
        sections = sections,
        download = DOWNLOAD_ROUTE,
    )
}

fn render_header(outline: &ResumeOutline) -> String {
    let header = &outline.header;
    let title = header
        .title
        .as_deref()
        .map(|t| format!("<p class=\"preview-title\">{}</p>", escape_html(t)))
        .unwrap_or_default();
    let contact = if header.contact.is_empty() {
        String::new()
    } else {
        format!(
            "<p class=\"preview-contact\">{}</p>",
            escape_html(&header.contact_line(PREVIEW_SEPARATOR))
        )
    };
    format!(
        "<div class=\"preview-section preview-header-section\"><h1>{}</h1>{title}{contact}</div>",
        escape_html(&header.name.to_uppercase())
    )
}

fn section(title: &str, content: &str) -> String {
    format!(
        "<div class=\"preview-section\"><h2 class=\"preview-heading\">{}</h2><div class=\"preview-section-content\">{content}</div></div>",
        escape_html(&title.to_uppercase())
    )
}

/// Opens a `preview-job` block; the caller closes it.
fn entry_header(heading: &str, period: &str) -> String {
    format!(
        "<div class=\"preview-job\"><div class=\"preview-job-header\"><strong>{}</strong><span>{}</span></div>",
        escape_html(&heading.to_uppercase()),
        escape_html(period)
    )
}

fn bullet_list(items: &[String]) -> String {
    if items.is_empty() {
        return String::new();
    }
    let items: String = items
        .iter()
        .map(|item| format!("<li>{}</li>", escape_html(item)))
        .collect();
    format!("<ul class=\"preview-achievements\">{items}</ul>")
}

fn render_projects(outline: &ResumeOutline) -> String {
    outline
        .projects
        .iter()
        .map(|project| {
            let subtitle = project
                .subtitle
                .as_deref()
                .map(|s| format!("<p class=\"preview-subtitle\">{}</p>", escape_html(s)))
                .unwrap_or_default();
            format!(
                "<div class=\"preview-project\"><div class=\"preview-job-header\"><strong>{}</strong></div>{subtitle}{}</div>",
                escape_html(&project.title.to_uppercase()),
                bullet_list(&project.bullets),
            )
        })
        .collect()
}

fn render_skills(skills: &SkillsOutline) -> String {
    let join = |titles: &[String]| {
        titles
            .iter()
            .map(|t| escape_html(t))
            .collect::<Vec<_>>()
            .join(PREVIEW_SEPARATOR)
    };
    match skills {
        SkillsOutline::Flat(titles) => format!("<p>{}</p>", join(titles)),
        SkillsOutline::Grouped(groups) => groups
            .iter()
            .map(|g| {
                format!(
                    "<p><strong>{}</strong>: {}</p>",
                    escape_html(&g.category),
                    join(&g.titles)
                )
            })
            .collect(),
    }
}
