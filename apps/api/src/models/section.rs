use serde::{Deserialize, Serialize};

/// Every resume section the builder knows how to render.
///
/// Section ids on the wire are camelCase (`volunteerExperience`), matching the keys of
/// the resume data record. Ids that do not parse are still laid out, they just get the
/// bare base height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SectionKind {
    PersonalStatement,
    Summary,
    Experience,
    Education,
    Projects,
    Skills,
    Certifications,
    VolunteerExperience,
    Publications,
    References,
    Achievements,
    Interests,
    Languages,
}

impl SectionKind {
    pub const ALL: [SectionKind; 13] = [
        SectionKind::PersonalStatement,
        SectionKind::Summary,
        SectionKind::Experience,
        SectionKind::Education,
        SectionKind::Projects,
        SectionKind::Skills,
        SectionKind::Certifications,
        SectionKind::VolunteerExperience,
        SectionKind::Publications,
        SectionKind::References,
        SectionKind::Achievements,
        SectionKind::Interests,
        SectionKind::Languages,
    ];

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.id() == id)
    }

    pub fn id(self) -> &'static str {
        match self {
            SectionKind::PersonalStatement => "personalStatement",
            SectionKind::Summary => "summary",
            SectionKind::Experience => "experience",
            SectionKind::Education => "education",
            SectionKind::Projects => "projects",
            SectionKind::Skills => "skills",
            SectionKind::Certifications => "certifications",
            SectionKind::VolunteerExperience => "volunteerExperience",
            SectionKind::Publications => "publications",
            SectionKind::References => "references",
            SectionKind::Achievements => "achievements",
            SectionKind::Interests => "interests",
            SectionKind::Languages => "languages",
        }
    }

    /// Display title printed above the section body.
    pub fn title(self) -> &'static str {
        match self {
            SectionKind::PersonalStatement => "Personal Statement",
            SectionKind::Summary => "Professional Summary",
            SectionKind::Experience => "Work Experience",
            SectionKind::Education => "Education",
            SectionKind::Projects => "Projects",
            SectionKind::Skills => "Skills",
            SectionKind::Certifications => "Certifications",
            SectionKind::VolunteerExperience => "Volunteer Experience",
            SectionKind::Publications => "Publications",
            SectionKind::References => "References",
            SectionKind::Achievements => "Achievements",
            SectionKind::Interests => "Interests",
            SectionKind::Languages => "Languages",
        }
    }

    /// True for sections backed by a list of entries with their own ids.
    pub fn is_repeated(self) -> bool {
        matches!(
            self,
            SectionKind::Experience
                | SectionKind::Education
                | SectionKind::Projects
                | SectionKind::Certifications
                | SectionKind::VolunteerExperience
                | SectionKind::Publications
                | SectionKind::References
                | SectionKind::Achievements
        )
    }
}

/// Default section order used when the record carries no visibility/order config.
pub const DEFAULT_SECTION_ORDER: [SectionKind; 12] = [
    SectionKind::PersonalStatement,
    SectionKind::Experience,
    SectionKind::Education,
    SectionKind::Projects,
    SectionKind::Skills,
    SectionKind::Certifications,
    SectionKind::VolunteerExperience,
    SectionKind::Publications,
    SectionKind::Achievements,
    SectionKind::Languages,
    SectionKind::Interests,
    SectionKind::References,
];

/// One row of the section visibility/order configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionConfig {
    pub id: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub order: i32,
}

fn default_visible() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_id_round_trips_every_kind() {
        for kind in SectionKind::ALL {
            assert_eq!(SectionKind::from_id(kind.id()), Some(kind));
        }
    }

    #[test]
    fn test_from_id_unknown_is_none() {
        assert_eq!(SectionKind::from_id("hobbies"), None);
        assert_eq!(SectionKind::from_id("Experience"), None);
    }

    #[test]
    fn test_serde_uses_camel_case_ids() {
        let json = serde_json::to_string(&SectionKind::VolunteerExperience).unwrap();
        assert_eq!(json, "\"volunteerExperience\"");
    }

    #[test]
    fn test_section_config_defaults_to_visible() {
        let cfg: SectionConfig = serde_json::from_str(r#"{"id":"skills"}"#).unwrap();
        assert!(cfg.visible);
        assert_eq!(cfg.order, 0);
    }

    #[test]
    fn test_repeated_sections() {
        assert!(SectionKind::Experience.is_repeated());
        assert!(SectionKind::References.is_repeated());
        assert!(!SectionKind::Skills.is_repeated());
        assert!(!SectionKind::Summary.is_repeated());
    }
}
