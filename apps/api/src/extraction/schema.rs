//! Resume schema v1: the single source of truth for the extraction target.
//!
//! `RESUME_SCHEMA_TEMPLATE` is what the model is shown; `ResumeRecord` is what
//! its reply must deserialize into. Keep the two in lockstep and bump
//! `SCHEMA_VERSION` whenever either changes.
//!
//! Every leaf is a string, a list of strings, or null. Missing keys read as
//! null; unknown keys are rejected so drift shows up as a parse failure.

use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: u32 = 1;

/// The JSON skeleton embedded in extraction prompts.
pub const RESUME_SCHEMA_TEMPLATE: &str = r#"{
  "personal_info": {
    "name": "",
    "email": "",
    "phone": "",
    "address": "",
    "linkedin": "",
    "github": "",
    "portfolio_links": [],
    "other_links": []
  },
  "professional_summary": {
    "full_text": "",
    "key_points": []
  },
  "experience": [
    {
      "job_title": "",
      "company_name": "",
      "location": "",
      "dates": "",
      "bullet_points": [],
      "technologies": [],
      "metrics": []
    }
  ],
  "skills": {
    "technical_skills": [],
    "soft_skills": [],
    "tools": [],
    "frameworks": [],
    "languages": []
  },
  "education": [
    {
      "institution": "",
      "degree": "",
      "field": "",
      "dates": "",
      "honors": "",
      "coursework": []
    }
  ],
  "projects": [
    {
      "name": "",
      "description": "",
      "technologies": [],
      "role": "",
      "outcomes": []
    }
  ],
  "certifications": [
    {
      "name": "",
      "organization": "",
      "date": ""
    }
  ],
  "additional_sections": {
    "publications": [],
    "volunteer_work": [],
    "interests": [],
    "references": null
  }
}"#;

/// A leaf value. The skeleton suggests a shape per field, but models
/// sometimes answer a list where a string was shown (or the reverse), and
/// both carry source text, so either is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Leaf {
    Text(String),
    List(Vec<String>),
}

impl Leaf {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Leaf::Text(text) => Some(text),
            Leaf::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Leaf::Text(_) => None,
            Leaf::List(items) => Some(items),
        }
    }
}

impl From<&str> for Leaf {
    fn from(text: &str) -> Self {
        Leaf::Text(text.to_string())
    }
}

impl From<String> for Leaf {
    fn from(text: String) -> Self {
        Leaf::Text(text)
    }
}

impl From<Vec<String>> for Leaf {
    fn from(items: Vec<String>) -> Self {
        Leaf::List(items)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResumeRecord {
    pub personal_info: Option<PersonalInfo>,
    pub professional_summary: Option<ProfessionalSummary>,
    pub experience: Option<Vec<ExperienceEntry>>,
    pub skills: Option<Skills>,
    pub education: Option<Vec<EducationEntry>>,
    pub projects: Option<Vec<ProjectEntry>>,
    pub certifications: Option<Vec<CertificationEntry>>,
    pub additional_sections: Option<AdditionalSections>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PersonalInfo {
    pub name: Option<Leaf>,
    pub email: Option<Leaf>,
    pub phone: Option<Leaf>,
    pub address: Option<Leaf>,
    pub linkedin: Option<Leaf>,
    pub github: Option<Leaf>,
    pub portfolio_links: Option<Leaf>,
    pub other_links: Option<Leaf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProfessionalSummary {
    pub full_text: Option<Leaf>,
    pub key_points: Option<Leaf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExperienceEntry {
    pub job_title: Option<Leaf>,
    pub company_name: Option<Leaf>,
    pub location: Option<Leaf>,
    pub dates: Option<Leaf>,
    pub bullet_points: Option<Leaf>,
    pub technologies: Option<Leaf>,
    pub metrics: Option<Leaf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Skills {
    pub technical_skills: Option<Leaf>,
    pub soft_skills: Option<Leaf>,
    pub tools: Option<Leaf>,
    pub frameworks: Option<Leaf>,
    pub languages: Option<Leaf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EducationEntry {
    pub institution: Option<Leaf>,
    pub degree: Option<Leaf>,
    pub field: Option<Leaf>,
    pub dates: Option<Leaf>,
    pub honors: Option<Leaf>,
    pub coursework: Option<Leaf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectEntry {
    pub name: Option<Leaf>,
    pub description: Option<Leaf>,
    pub technologies: Option<Leaf>,
    pub role: Option<Leaf>,
    pub outcomes: Option<Leaf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CertificationEntry {
    pub name: Option<Leaf>,
    pub organization: Option<Leaf>,
    pub date: Option<Leaf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdditionalSections {
    pub publications: Option<Leaf>,
    pub volunteer_work: Option<Leaf>,
    pub interests: Option<Leaf>,
    pub references: Option<Leaf>,
}
