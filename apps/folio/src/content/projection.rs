//! Projection table: which document field lands in which page region.
//!
//! The bindings are data: a region name plus a pure render function. A render
//! function returns `None` when its backing field is absent, in which case the
//! region keeps whatever fallback markup the skeleton ships with. Every applied
//! binding fully replaces its region, so projecting the same document twice
//! yields identical output.

use serde::Serialize;
use tracing::debug;

use crate::content::markup::{escape_html, link_attrs, pad_index};
use crate::models::content::{ContactMethod, ContentDocument, FooterLink, MetaItem, Project, Skill};
use crate::page::RenderTarget;

/// Rendered output of one binding.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    /// Plain text, escaped on insertion.
    Text(String),
    /// Markup, inserted verbatim.
    Html(String),
}

pub struct Binding {
    pub region: &'static str,
    pub render: fn(&ContentDocument) -> Option<Fragment>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct ProjectionReport {
    pub applied: Vec<&'static str>,
    pub skipped: Vec<&'static str>,
}

pub static BINDINGS: &[Binding] = &[
    // ── page metadata ───────────────────────────────────────────────────────
    Binding {
        region: "page.title",
        render: |d| Some(Fragment::Text(format!("{} | Portfolio", d.personal.name))),
    },
    Binding {
        region: "page.description",
        render: |d| {
            Some(Fragment::Text(match &d.personal.title {
                Some(title) => format!("{} - {} Portfolio", d.personal.name, title),
                None => format!("{} Portfolio", d.personal.name),
            }))
        },
    },
    Binding {
        region: "nav.resume",
        render: |d| {
            d.personal.resume_path.as_deref().map(|path| {
                Fragment::Html(format!(
                    "<a {} class=\"btn-resume\">Resume</a>",
                    link_attrs(path)
                ))
            })
        },
    },
    // ── hero ────────────────────────────────────────────────────────────────
    Binding {
        region: "hero.byline.label",
        render: |d| {
            let byline = d.hero.as_ref()?.byline.as_ref()?;
            text(byline.label.as_ref())
        },
    },
    Binding {
        region: "hero.byline.date",
        render: |d| {
            let byline = d.hero.as_ref()?.byline.as_ref()?;
            text(byline.date.as_ref())
        },
    },
    Binding {
        region: "hero.title",
        render: |d| Some(Fragment::Text(d.personal.name.clone())),
    },
    Binding {
        region: "hero.subtitle",
        render: |d| text(d.personal.tagline.as_ref()),
    },
    Binding {
        region: "hero.meta",
        render: |d| {
            let meta = d.hero.as_ref()?.meta.as_ref()?;
            Some(Fragment::Html(render_hero_meta(meta)))
        },
    },
    Binding {
        region: "hero.lede",
        render: |d| html(d.hero.as_ref()?.lede.as_ref()),
    },
    // ── about ───────────────────────────────────────────────────────────────
    Binding {
        region: "about.eyebrow",
        render: |d| text(d.about.as_ref()?.eyebrow.as_ref()),
    },
    Binding {
        region: "about.title",
        render: |d| text(d.about.as_ref()?.title.as_ref()),
    },
    Binding {
        region: "about.intro",
        render: |d| text(d.about.as_ref()?.intro.as_ref()),
    },
    Binding {
        region: "about.paragraphs",
        render: |d| {
            let paragraphs = d.about.as_ref()?.paragraphs.as_ref()?;
            Some(Fragment::Html(
                paragraphs
                    .iter()
                    .map(|p| format!("<p>{p}</p>"))
                    .collect::<Vec<_>>()
                    .join("\n"),
            ))
        },
    },
    Binding {
        region: "about.quote",
        render: |d| text(d.about.as_ref()?.quote.as_ref()),
    },
    Binding {
        region: "about.skills",
        render: |d| {
            let skills = d.about.as_ref()?.skills.as_ref()?;
            Some(Fragment::Html(render_skill_cards(skills)))
        },
    },
    // ── projects ────────────────────────────────────────────────────────────
    Binding {
        region: "projects.eyebrow",
        render: |d| text(d.projects.as_ref()?.eyebrow.as_ref()),
    },
    Binding {
        region: "projects.title",
        render: |d| text(d.projects.as_ref()?.title.as_ref()),
    },
    Binding {
        region: "projects.description",
        render: |d| text(d.projects.as_ref()?.description.as_ref()),
    },
    Binding {
        region: "projects.list",
        render: |d| {
            let items = d.projects.as_ref()?.items.as_ref()?;
            Some(Fragment::Html(
                items.iter().map(render_project_card).collect::<Vec<_>>().join("\n"),
            ))
        },
    },
    // ── contact ─────────────────────────────────────────────────────────────
    Binding {
        region: "contact.eyebrow",
        render: |d| text(d.contact.as_ref()?.eyebrow.as_ref()),
    },
    Binding {
        region: "contact.title",
        render: |d| text(d.contact.as_ref()?.title.as_ref()),
    },
    Binding {
        region: "contact.intro",
        render: |d| text(d.contact.as_ref()?.intro.as_ref()),
    },
    Binding {
        region: "contact.methods",
        render: |d| {
            let methods = d.contact.as_ref()?.methods.as_ref()?;
            Some(Fragment::Html(
                methods.iter().map(render_contact_card).collect::<Vec<_>>().join("\n"),
            ))
        },
    },
    Binding {
        region: "contact.form-title",
        render: |d| text(d.contact.as_ref()?.form_title.as_ref()),
    },
    // ── footer ──────────────────────────────────────────────────────────────
    Binding {
        region: "footer.copyright",
        render: |d| {
            let copyright = d.footer.as_ref()?.copyright.as_ref()?;
            Some(Fragment::Text(format!("© {copyright}")))
        },
    },
    Binding {
        region: "footer.links",
        render: |d| {
            let links = d.footer.as_ref()?.links.as_ref()?;
            Some(Fragment::Html(
                links.iter().map(render_footer_link).collect::<Vec<_>>().join("\n"),
            ))
        },
    },
];

/// Projects `doc` onto `target` using the full binding table.
pub fn project<T: RenderTarget + ?Sized>(doc: &ContentDocument, target: &mut T) -> ProjectionReport {
    project_with(BINDINGS, doc, target)
}

pub fn project_with<T: RenderTarget + ?Sized>(
    bindings: &[Binding],
    doc: &ContentDocument,
    target: &mut T,
) -> ProjectionReport {
    let mut report = ProjectionReport::default();

    for binding in bindings {
        if !target.has_region(binding.region) {
            report.skipped.push(binding.region);
            continue;
        }
        let applied = match (binding.render)(doc) {
            Some(Fragment::Text(t)) => target.replace_text(binding.region, &t),
            Some(Fragment::Html(h)) => target.replace_html(binding.region, h),
            None => false,
        };
        if applied {
            report.applied.push(binding.region);
        } else {
            report.skipped.push(binding.region);
        }
    }

    debug!(
        applied = report.applied.len(),
        skipped = report.skipped.len(),
        "Projected content document"
    );
    report
}

// ────────────────────────────────────────────────────────────────────────────
// Fragment renderers
// ────────────────────────────────────────────────────────────────────────────

fn text(value: Option<&String>) -> Option<Fragment> {
    value.map(|v| Fragment::Text(v.clone()))
}

fn html(value: Option<&String>) -> Option<Fragment> {
    value.map(|v| Fragment::Html(v.clone()))
}

/// Stacked label / multi-value blocks; a single value is a stack of one.
pub fn render_hero_meta(meta: &[MetaItem]) -> String {
    meta.iter()
        .map(|item| {
            let values: String = item
                .value
                .values()
                .into_iter()
                .map(|v| format!("<div class=\"meta-value\">{}</div>", escape_html(v)))
                .collect();
            format!(
                "<div class=\"meta-block\"><div class=\"meta-label\">{}</div>\
                 <div class=\"meta-values\">{values}</div></div>",
                escape_html(&item.label)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_skill_cards(skills: &[Skill]) -> String {
    skills
        .iter()
        .enumerate()
        .map(|(i, skill)| {
            let tags: String = skill
                .description
                .iter()
                .map(|tag| format!("<span class=\"skill-tag\">{}</span>", escape_html(tag)))
                .collect();
            format!(
                "<div class=\"skill-card\"><div class=\"skill-number\">{}</div>\
                 <h4>{}</h4><div class=\"skill-tags\">{tags}</div></div>",
                pad_index(i),
                escape_html(&skill.title)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_project_card(project: &Project) -> String {
    let (class, label) = if project.featured {
        (
            "project-card featured",
            "<span class=\"project-label\">Featured Project</span>",
        )
    } else {
        ("project-card", "")
    };
    let subtitle = project
        .subtitle
        .as_deref()
        .map(|s| format!("<p class=\"project-subtitle\">{}</p>", escape_html(s)))
        .unwrap_or_default();
    let link = project
        .link
        .as_ref()
        .and_then(|l| l.url.as_deref().filter(|u| !u.is_empty()).map(|u| (u, &l.text)))
        .map(|(url, text)| {
            format!(
                "<div class=\"project-link\"><a {} class=\"link-with-arrow\">{}</a></div>",
                link_attrs(url),
                escape_html(text)
            )
        })
        .unwrap_or_default();

    format!(
        "<article class=\"{class}\"><div class=\"project-header\">{label}\
         <h3 class=\"project-title\">{}</h3>{subtitle}</div>\
         <div class=\"project-content\"><p class=\"project-description\">{}</p>{link}</div></article>",
        escape_html(&project.title),
        escape_html(&project.description)
    )
}

pub fn render_contact_card(method: &ContactMethod) -> String {
    format!(
        "<a {} class=\"contact-card\"><div class=\"contact-number\">{}</div>\
         <h3>{}</h3><p>{}</p><span class=\"contact-arrow\">→</span></a>",
        link_attrs(&method.link),
        escape_html(&method.number),
        escape_html(&method.title),
        escape_html(&method.value)
    )
}

pub fn render_footer_link(link: &FooterLink) -> String {
    format!("<a {}>{}</a>", link_attrs(&link.url), escape_html(&link.text))
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::content::{About, Link, Personal};
    use crate::page::target::testing::FakeTarget;

    fn all_regions() -> FakeTarget {
        let names: Vec<&str> = BINDINGS.iter().map(|b| b.region).collect();
        FakeTarget::with_regions(&names)
    }

    fn minimal_doc() -> ContentDocument {
        serde_json::from_str(r#"{"personal":{"name":"Ada Lovelace"}}"#).unwrap()
    }

    fn full_doc() -> ContentDocument {
        serde_json::from_str(
            r#"{
            "personal": {"name":"Ada Lovelace","title":"Engineer","tagline":"Poet of numbers",
                         "resumePath":"assets/resume.pdf"},
            "hero": {"byline":{"label":"Issue","date":"1843"},
                     "meta":[{"label":"Role","value":"Analyst"},{"label":"Focus","value":["Engines","Notes"]}],
                     "lede":"I write <em>programs</em>."},
            "about": {"eyebrow":"About","title":"Me","intro":"Hello","paragraphs":["One","Two"],
                      "quote":"Imagination","skills":[{"title":"Math","description":["Calculus","Logic"]}]},
            "projects": {"eyebrow":"Work","title":"Projects","description":"Things",
                         "items":[{"title":"Engine","subtitle":"Analytical","description":"Notes G","featured":true,
                                   "link":{"url":"https://example.com","text":"See"}},
                                  {"title":"Loom","description":"Cards","featured":false}]},
            "contact": {"eyebrow":"Say hi","title":"Contact","intro":"Write","formTitle":"Form",
                        "methods":[{"number":"01","title":"Email","value":"ada@example.com","link":"mailto:ada@example.com"},
                                   {"number":"02","title":"GitHub","value":"ada","link":"https://github.com/ada"}]},
            "footer": {"copyright":"2024 Ada","links":[{"url":"https://x.com/ada","text":"X"},{"url":"/notes","text":"Notes"}]}
        }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_page_title_and_description() {
        let mut target = all_regions();
        project(&full_doc(), &mut target);
        assert_eq!(target.get("page.title"), Some("Ada Lovelace | Portfolio"));
        assert_eq!(target.get("page.description"), Some("Ada Lovelace - Engineer Portfolio"));
    }

    #[test]
    fn test_minimal_doc_leaves_absent_sections_as_fallback() {
        let mut target = all_regions();
        let report = project(&minimal_doc(), &mut target);
        assert_eq!(target.get("page.title"), Some("Ada Lovelace | Portfolio"));
        assert_eq!(target.get("hero.title"), Some("Ada Lovelace"));
        assert_eq!(target.get("about.skills"), Some("fallback:about.skills"));
        assert_eq!(target.get("footer.links"), Some("fallback:footer.links"));
        assert!(report.skipped.contains(&"projects.list"));
        assert!(report.applied.contains(&"page.title"));
    }

    #[test]
    fn test_projection_is_idempotent() {
        let doc = full_doc();
        let mut target = all_regions();
        project(&doc, &mut target);
        let first = target.clone();
        project(&doc, &mut target);
        assert_eq!(first, target);
    }

    #[test]
    fn test_missing_region_is_skipped_not_created() {
        let mut target = FakeTarget::with_regions(&["page.title"]);
        let report = project(&full_doc(), &mut target);
        assert_eq!(report.applied, vec!["page.title"]);
        assert_eq!(target.regions.len(), 1);
    }

    #[test]
    fn test_text_fields_are_escaped_rich_text_is_not() {
        let mut doc = full_doc();
        doc.personal.tagline = Some("<b>bold</b>".to_string());
        let mut target = all_regions();
        project(&doc, &mut target);
        assert_eq!(target.get("hero.subtitle"), Some("&lt;b&gt;bold&lt;/b&gt;"));
        assert_eq!(target.get("hero.lede"), Some("I write <em>programs</em>."));
    }

    #[test]
    fn test_paragraphs_render_in_order_and_empty_list_clears() {
        let mut target = all_regions();
        let mut doc = full_doc();
        project(&doc, &mut target);
        assert_eq!(target.get("about.paragraphs"), Some("<p>One</p>\n<p>Two</p>"));

        doc.about = Some(About {
            paragraphs: Some(vec![]),
            ..Default::default()
        });
        project(&doc, &mut target);
        assert_eq!(target.get("about.paragraphs"), Some(""));
    }

    fn skills(n: usize) -> Vec<Skill> {
        (0..n)
            .map(|i| Skill {
                title: format!("Skill {i}"),
                description: vec![],
                category: None,
            })
            .collect()
    }

    fn skill_numbers(html: &str) -> Vec<String> {
        html.split("<div class=\"skill-number\">")
            .skip(1)
            .map(|rest| rest.split('<').next().unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn test_skill_numbers_are_padded_and_gapless() {
        for n in [0usize, 1, 9, 10, 11] {
            let numbers = skill_numbers(&render_skill_cards(&skills(n)));
            let expected: Vec<String> = (1..=n).map(|i| format!("{i:02}")).collect();
            assert_eq!(numbers, expected, "for {n} skills");
        }
    }

    #[test]
    fn test_skill_card_lists_tags_in_order() {
        let html = render_skill_cards(&[Skill {
            title: "Math".to_string(),
            description: vec!["Calculus".to_string(), "Logic".to_string()],
            category: None,
        }]);
        let calc = html.find("Calculus").unwrap();
        let logic = html.find("Logic").unwrap();
        assert!(calc < logic);
    }

    #[test]
    fn test_featured_project_gets_label() {
        let doc = full_doc();
        let items = doc.projects.unwrap().items.unwrap();
        let featured = render_project_card(&items[0]);
        let plain = render_project_card(&items[1]);
        assert!(featured.contains("project-card featured"));
        assert!(featured.contains("Featured Project"));
        assert!(!plain.contains("Featured Project"));
        assert!(!plain.contains("featured"));
    }

    #[test]
    fn test_project_link_omitted_without_url() {
        let mut project = Project {
            title: "T".to_string(),
            subtitle: None,
            description: "D".to_string(),
            featured: false,
            link: None,
        };
        assert!(!render_project_card(&project).contains("project-link"));

        project.link = Some(Link {
            url: None,
            text: "Go".to_string(),
        });
        assert!(!render_project_card(&project).contains("project-link"));

        project.link = Some(Link {
            url: Some("https://example.com".to_string()),
            text: "Go".to_string(),
        });
        assert!(render_project_card(&project).contains("project-link"));
    }

    #[test]
    fn test_contact_and_footer_new_context_only_for_http() {
        let mut target = all_regions();
        project(&full_doc(), &mut target);
        let methods = target.get("contact.methods").unwrap();
        let cards: Vec<&str> = methods.split('\n').collect();
        assert!(!cards[0].contains("target=\"_blank\""), "mailto stays in context");
        assert!(cards[1].contains("target=\"_blank\""));

        let links: Vec<&str> = target.get("footer.links").unwrap().split('\n').collect();
        assert!(links[0].contains("target=\"_blank\""));
        assert!(!links[1].contains("target=\"_blank\""));
    }

    #[test]
    fn test_hero_meta_stacks_values() {
        let mut target = all_regions();
        project(&full_doc(), &mut target);
        let meta = target.get("hero.meta").unwrap();
        assert_eq!(meta.matches("class=\"meta-block\"").count(), 2);
        assert_eq!(meta.matches("class=\"meta-value\"").count(), 3);
    }

    #[test]
    fn test_footer_copyright_prefix_and_resume_trigger() {
        let mut target = all_regions();
        project(&full_doc(), &mut target);
        assert_eq!(target.get("footer.copyright"), Some("© 2024 Ada"));
        assert!(target.get("nav.resume").unwrap().contains("href=\"/resume\""));
    }

    #[test]
    fn test_description_without_title() {
        let doc = ContentDocument {
            personal: Personal {
                name: "Ada".to_string(),
                ..Default::default()
            },
            ..minimal_doc()
        };
        let mut target = all_regions();
        project(&doc, &mut target);
        assert_eq!(target.get("page.description"), Some("Ada Portfolio"));
    }
}
