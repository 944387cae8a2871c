use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::models::section::{SectionConfig, SectionKind, DEFAULT_SECTION_ORDER};

// ────────────────────────────────────────────────────────────────────────────
// Resume record
// ────────────────────────────────────────────────────────────────────────────

/// The full resume record as produced by the builder's forms.
///
/// The layout code only ever reads from this; all mutation goes through the
/// `*_item` methods below. Every field defaults so partially filled drafts parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeData {
    pub personal_info: PersonalInfo,
    pub personal_statement: String,
    pub summary: String,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub projects: Vec<Project>,
    pub certifications: Vec<Certification>,
    pub volunteer_experience: Vec<VolunteerExperience>,
    pub publications: Vec<Publication>,
    pub references: Vec<Reference>,
    pub achievements: Vec<Achievement>,
    pub skills: Vec<String>,
    pub interests: Vec<String>,
    pub languages: Vec<String>,
    /// Section visibility and order. Empty means "use the default order".
    pub sections: Vec<SectionConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfo {
    pub full_name: String,
    pub title: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub website: String,
    pub linkedin: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Experience {
    pub id: String,
    pub company: String,
    pub position: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub current: bool,
    pub description: String,
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Education {
    pub id: String,
    pub institution: String,
    pub degree: String,
    pub field: String,
    pub start_date: String,
    pub end_date: String,
    pub gpa: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: String,
    pub technologies: Vec<String>,
    pub url: String,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Certification {
    pub id: String,
    pub name: String,
    pub issuer: String,
    pub date: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VolunteerExperience {
    pub id: String,
    pub organization: String,
    pub role: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Publication {
    pub id: String,
    pub title: String,
    pub publisher: String,
    pub date: String,
    pub url: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Reference {
    pub id: String,
    pub name: String,
    pub position: String,
    pub company: String,
    pub email: String,
    pub phone: String,
    pub relationship: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Achievement {
    pub id: String,
    pub title: String,
    pub date: String,
    pub description: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Entries
// ────────────────────────────────────────────────────────────────────────────

/// A row in one of the repeated-entry sections.
pub trait Entry {
    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
    /// Printable text of the entry in print order: heading line first, then body.
    fn text_blocks(&self) -> Vec<&str>;
}

macro_rules! impl_entry {
    ($ty:ty, |$it:ident| $blocks:expr) => {
        impl Entry for $ty {
            fn id(&self) -> &str {
                &self.id
            }

            fn set_id(&mut self, id: String) {
                self.id = id;
            }

            fn text_blocks(&self) -> Vec<&str> {
                let $it = self;
                $blocks
            }
        }
    };
}

impl_entry!(Experience, |e| {
    let mut blocks = vec![e.position.as_str(), e.company.as_str(), e.description.as_str()];
    blocks.extend(e.highlights.iter().map(String::as_str));
    blocks
});
impl_entry!(Education, |e| vec![
    e.degree.as_str(),
    e.institution.as_str(),
    e.description.as_str()
]);
impl_entry!(Project, |p| vec![p.name.as_str(), p.description.as_str()]);
impl_entry!(Certification, |c| vec![c.name.as_str(), c.issuer.as_str()]);
impl_entry!(VolunteerExperience, |v| vec![
    v.role.as_str(),
    v.organization.as_str(),
    v.description.as_str()
]);
impl_entry!(Publication, |p| vec![
    p.title.as_str(),
    p.publisher.as_str(),
    p.description.as_str()
]);
impl_entry!(Reference, |r| vec![
    r.name.as_str(),
    r.position.as_str(),
    r.company.as_str(),
    r.email.as_str()
]);
impl_entry!(Achievement, |a| vec![a.title.as_str(), a.description.as_str()]);

#[derive(Debug, Error)]
pub enum EntryError {
    #[error("unknown section '{0}'")]
    UnknownSection(String),

    #[error("section '{0}' does not hold a list of entries")]
    NotRepeated(&'static str),

    #[error("invalid entry: {0}")]
    InvalidItem(#[from] serde_json::Error),
}

/// Appends `item`, assigning a fresh id when it has none. Returns the id it was stored under.
pub fn add_entry<T: Entry>(list: &mut Vec<T>, mut item: T) -> String {
    if item.id().trim().is_empty() {
        item.set_id(Uuid::new_v4().to_string());
    }
    let id = item.id().to_string();
    list.push(item);
    id
}

/// Replaces the entry with `id` in place, keeping its id and position.
pub fn update_entry<T: Entry>(list: &mut [T], id: &str, mut item: T) -> bool {
    match list.iter_mut().find(|e| e.id() == id) {
        Some(slot) => {
            item.set_id(id.to_string());
            *slot = item;
            true
        }
        None => false,
    }
}

pub fn remove_entry<T: Entry>(list: &mut Vec<T>, id: &str) -> bool {
    let before = list.len();
    list.retain(|e| e.id() != id);
    list.len() != before
}

/// Expands `$body` once per repeated-entry list, binding the list mutably to `$list`.
macro_rules! with_entries {
    ($data:expr, $kind:expr, $list:ident => $body:expr) => {
        match $kind {
            SectionKind::Experience => {
                let $list = &mut $data.experience;
                $body
            }
            SectionKind::Education => {
                let $list = &mut $data.education;
                $body
            }
            SectionKind::Projects => {
                let $list = &mut $data.projects;
                $body
            }
            SectionKind::Certifications => {
                let $list = &mut $data.certifications;
                $body
            }
            SectionKind::VolunteerExperience => {
                let $list = &mut $data.volunteer_experience;
                $body
            }
            SectionKind::Publications => {
                let $list = &mut $data.publications;
                $body
            }
            SectionKind::References => {
                let $list = &mut $data.references;
                $body
            }
            SectionKind::Achievements => {
                let $list = &mut $data.achievements;
                $body
            }
            other => Err(EntryError::NotRepeated(other.id())),
        }
    };
}

impl ResumeData {
    /// Number of entries in a repeated-entry section; 0 for anything else.
    pub fn item_count(&self, kind: SectionKind) -> usize {
        match kind {
            SectionKind::Experience => self.experience.len(),
            SectionKind::Education => self.education.len(),
            SectionKind::Projects => self.projects.len(),
            SectionKind::Certifications => self.certifications.len(),
            SectionKind::VolunteerExperience => self.volunteer_experience.len(),
            SectionKind::Publications => self.publications.len(),
            SectionKind::References => self.references.len(),
            SectionKind::Achievements => self.achievements.len(),
            _ => 0,
        }
    }

    /// Printable text blocks of every entry in a repeated-entry section.
    pub fn entry_blocks(&self, kind: SectionKind) -> Vec<Vec<&str>> {
        fn blocks<T: Entry>(list: &[T]) -> Vec<Vec<&str>> {
            list.iter().map(|e| e.text_blocks()).collect()
        }
        match kind {
            SectionKind::Experience => blocks(&self.experience),
            SectionKind::Education => blocks(&self.education),
            SectionKind::Projects => blocks(&self.projects),
            SectionKind::Certifications => blocks(&self.certifications),
            SectionKind::VolunteerExperience => blocks(&self.volunteer_experience),
            SectionKind::Publications => blocks(&self.publications),
            SectionKind::References => blocks(&self.references),
            SectionKind::Achievements => blocks(&self.achievements),
            _ => Vec::new(),
        }
    }

    /// Ids of the visible sections, in configured order (ties keep their listed order).
    pub fn visible_section_ids(&self) -> Vec<String> {
        if self.sections.is_empty() {
            return DEFAULT_SECTION_ORDER
                .iter()
                .map(|kind| kind.id().to_string())
                .collect();
        }

        let mut visible: Vec<&SectionConfig> = self.sections.iter().filter(|s| s.visible).collect();
        visible.sort_by_key(|s| s.order);
        visible.into_iter().map(|s| s.id.clone()).collect()
    }

    /// Identity of the current content. Changes whenever any field changes.
    pub fn content_fingerprint(&self) -> u64 {
        let serialized = serde_json::to_string(self).unwrap_or_default();
        let mut hasher = DefaultHasher::new();
        serialized.hash(&mut hasher);
        hasher.finish()
    }

    pub fn add_item(&mut self, kind: SectionKind, item: Value) -> Result<String, EntryError> {
        with_entries!(self, kind, list => Ok(add_entry(list, serde_json::from_value(item)?)))
    }

    pub fn update_item(
        &mut self,
        kind: SectionKind,
        id: &str,
        item: Value,
    ) -> Result<bool, EntryError> {
        with_entries!(self, kind, list => Ok(update_entry(list, id, serde_json::from_value(item)?)))
    }

    pub fn remove_item(&mut self, kind: SectionKind, id: &str) -> Result<bool, EntryError> {
        with_entries!(self, kind, list => Ok(remove_entry(list, id)))
    }
}
