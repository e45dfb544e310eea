//! The resume field set shared by the preview and the PDF engine.
//!
//! Both outputs are built from a `ResumeOutline`, never from the document
//! directly, so they cannot disagree about which sections exist or what they say.

use crate::content::markup::strip_tags;
use crate::models::content::{Education, Job, Reference, Skill};
use crate::models::ContentDocument;
use crate::resume::ResumeError;

pub const PROFILE_TITLE: &str = "Profile";
pub const PROJECTS_TITLE: &str = "Projects";
pub const EXPERIENCE_TITLE: &str = "Professional Experience";
pub const EDUCATION_TITLE: &str = "Education";
pub const SKILLS_TITLE: &str = "Skills and Interests";
pub const REFERENCES_TITLE: &str = "References";

/// Category for skills without one, when any skill declares a category.
pub const UNCATEGORIZED: &str = "Other";

#[derive(Debug, Clone, PartialEq)]
pub struct ResumeHeader {
    pub name: String,
    pub title: Option<String>,
    /// Phone, email, GitHub URL, in that order; blanks dropped.
    pub contact: Vec<String>,
}

impl ResumeHeader {
    pub fn contact_line(&self, separator: &str) -> String {
        self.contact.join(separator)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectEntry {
    pub title: String,
    pub subtitle: Option<String>,
    /// Description split on line breaks, trimmed, blanks dropped.
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkillGroup {
    pub category: String,
    pub titles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkillsOutline {
    Flat(Vec<String>),
    Grouped(Vec<SkillGroup>),
}

impl SkillsOutline {
    pub fn is_empty(&self) -> bool {
        match self {
            SkillsOutline::Flat(titles) => titles.is_empty(),
            SkillsOutline::Grouped(groups) => groups.is_empty(),
        }
    }

    fn from_skills(skills: &[Skill]) -> Self {
        let has_category = skills
            .iter()
            .any(|s| s.category.as_deref().is_some_and(|c| !c.is_empty()));
        if !has_category {
            return SkillsOutline::Flat(skills.iter().map(|s| s.title.clone()).collect());
        }

        let mut groups: Vec<SkillGroup> = Vec::new();
        for skill in skills {
            let category = skill
                .category
                .as_deref()
                .filter(|c| !c.is_empty())
                .unwrap_or(UNCATEGORIZED);
            match groups.iter_mut().find(|g| g.category == category) {
                Some(group) => group.titles.push(skill.title.clone()),
                None => groups.push(SkillGroup {
                    category: category.to_string(),
                    titles: vec![skill.title.clone()],
                }),
            }
        }
        SkillsOutline::Grouped(groups)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResumeOutline {
    pub header: ResumeHeader,
    /// Objective, or the tag-stripped hero lede. May be empty.
    pub profile: String,
    pub projects: Vec<ProjectEntry>,
    /// `Some` iff the document has a `resume` section.
    pub experience: Option<Vec<Job>>,
    pub education: Option<Vec<Education>>,
    pub skills: SkillsOutline,
    pub references: Vec<Reference>,
}

fn non_blank(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl ResumeOutline {
    pub fn from_document(doc: &ContentDocument) -> Result<Self, ResumeError> {
        let personal = &doc.personal;
        let name = personal.name.trim();
        if name.is_empty() {
            return Err(ResumeError::MissingField("personal.name"));
        }

        let contact = [&personal.phone, &personal.email, &personal.github_url]
            .into_iter()
            .filter_map(|field| non_blank(field.as_ref()))
            .collect();

        let resume = doc.resume.as_ref();
        let profile = non_blank(resume.and_then(|r| r.objective.as_ref()))
            .or_else(|| {
                doc.hero
                    .as_ref()
                    .and_then(|h| h.lede.as_deref())
                    .map(|lede| strip_tags(lede).trim().to_string())
            })
            .unwrap_or_default();

        let projects = doc
            .projects
            .as_ref()
            .and_then(|p| p.items.as_deref())
            .unwrap_or_default()
            .iter()
            .map(|project| ProjectEntry {
                title: project.title.clone(),
                subtitle: non_blank(project.subtitle.as_ref()),
                bullets: project
                    .description
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string)
                    .collect(),
            })
            .collect();

        let skills = SkillsOutline::from_skills(
            doc.about
                .as_ref()
                .and_then(|a| a.skills.as_deref())
                .unwrap_or_default(),
        );

        Ok(Self {
            header: ResumeHeader {
                name: name.to_string(),
                title: non_blank(personal.title.as_ref()),
                contact,
            },
            profile,
            projects,
            experience: resume.map(|r| r.experience.clone()),
            education: resume.map(|r| r.education.clone()),
            skills,
            references: resume
                .and_then(|r| r.references.clone())
                .unwrap_or_default(),
        })
    }

    pub fn show_profile(&self) -> bool {
        self.experience.is_some() || !self.profile.is_empty()
    }

    pub fn show_projects(&self) -> bool {
        !self.projects.is_empty()
    }

    pub fn show_experience(&self) -> bool {
        self.experience.is_some()
    }

    pub fn show_education(&self) -> bool {
        self.education.is_some()
    }

    pub fn show_skills(&self) -> bool {
        !self.skills.is_empty()
    }

    pub fn show_references(&self) -> bool {
        !self.references.is_empty()
    }

    /// Titles of the sections both outputs render, in order.
    pub fn section_titles(&self) -> Vec<&'static str> {
        [
            (self.show_profile(), PROFILE_TITLE),
            (self.show_projects(), PROJECTS_TITLE),
            (self.show_experience(), EXPERIENCE_TITLE),
            (self.show_education(), EDUCATION_TITLE),
            (self.show_skills(), SKILLS_TITLE),
            (self.show_references(), REFERENCES_TITLE),
        ]
        .into_iter()
        .filter_map(|(shown, title)| shown.then_some(title))
        .collect()
    }
}
