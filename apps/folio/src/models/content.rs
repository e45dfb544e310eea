//! The content document: the single JSON source that drives every rendered view.
//!
//! All sections and nearly all fields are optional. Renderers treat `None` as
//! "leave this region alone" and an empty list as "replace with nothing".

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDocument {
    pub personal: Personal,
    #[serde(default)]
    pub hero: Option<Hero>,
    #[serde(default)]
    pub about: Option<About>,
    #[serde(default)]
    pub projects: Option<Projects>,
    #[serde(default)]
    pub contact: Option<Contact>,
    #[serde(default)]
    pub footer: Option<Footer>,
    #[serde(default)]
    pub resume: Option<Resume>,
}

/// Identity fields. Only `name` is required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Personal {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub github_url: Option<String>,
    #[serde(default)]
    pub resume_path: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Hero
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hero {
    #[serde(default)]
    pub byline: Option<Byline>,
    #[serde(default)]
    pub meta: Option<Vec<MetaItem>>,
    /// Rich text (may contain inline markup).
    #[serde(default)]
    pub lede: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Byline {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaItem {
    pub label: String,
    pub value: MetaValue,
}

/// A hero meta value is either a single string or a stack of strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    One(String),
    Many(Vec<String>),
}

impl MetaValue {
    pub fn values(&self) -> Vec<&str> {
        match self {
            MetaValue::One(v) => vec![v.as_str()],
            MetaValue::Many(vs) => vs.iter().map(String::as_str).collect(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// About
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct About {
    #[serde(default)]
    pub eyebrow: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub intro: Option<String>,
    /// Rich-text paragraphs, rendered between the intro and the pullquote.
    #[serde(default)]
    pub paragraphs: Option<Vec<String>>,
    #[serde(default)]
    pub quote: Option<String>,
    #[serde(default)]
    pub skills: Option<Vec<Skill>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub title: String,
    /// Tag strings shown on the skill card.
    #[serde(default)]
    pub description: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Projects
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Projects {
    #[serde(default)]
    pub eyebrow: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub items: Option<Vec<Project>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub link: Option<Link>,
}

/// A hyperlink. `url` may be missing in hand-edited documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Link {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub text: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Contact & footer
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(default)]
    pub eyebrow: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub intro: Option<String>,
    #[serde(default)]
    pub methods: Option<Vec<ContactMethod>>,
    #[serde(default)]
    pub form_title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactMethod {
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub link: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Footer {
    #[serde(default)]
    pub copyright: Option<String>,
    #[serde(default)]
    pub links: Option<Vec<FooterLink>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FooterLink {
    pub url: String,
    #[serde(default)]
    pub text: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Resume
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resume {
    #[serde(default)]
    pub objective: Option<String>,
    #[serde(default)]
    pub experience: Vec<Job>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub references: Option<Vec<Reference>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub title: String,
    #[serde(default)]
    pub period: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Education {
    pub institution: String,
    #[serde(default)]
    pub period: String,
    #[serde(default)]
    pub degree: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    pub name: String,
    #[serde(default)]
    pub title: String,
}
