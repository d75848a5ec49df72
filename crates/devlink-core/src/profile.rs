//! Developer profiles: the one-per-user document holding career history.
//!
//! Experience and education are embedded lists. New entries are prepended so
//! the most recently added entry is always first.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, user::UserSummary};

// ─── Embedded entries ────────────────────────────────────────────────────────

/// A position held at a company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experience {
  pub experience_id: Uuid,
  pub title:         String,
  pub company:       String,
  pub location:      Option<String>,
  pub from:          NaiveDate,
  pub to:            Option<NaiveDate>,
  #[serde(default)]
  pub current:       bool,
  pub description:   Option<String>,
}

/// Input for [`Profile::add_experience`]; the id is assigned on insert.
#[derive(Debug, Clone)]
pub struct NewExperience {
  pub title:       String,
  pub company:     String,
  pub location:    Option<String>,
  pub from:        NaiveDate,
  pub to:          Option<NaiveDate>,
  pub current:     bool,
  pub description: Option<String>,
}

/// A course of study at a school.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Education {
  pub education_id:   Uuid,
  pub school:         String,
  pub degree:         String,
  pub field_of_study: String,
  pub from:           NaiveDate,
  pub to:             Option<NaiveDate>,
  #[serde(default)]
  pub current:        bool,
  pub description:    Option<String>,
}

/// Input for [`Profile::add_education`]; the id is assigned on insert.
#[derive(Debug, Clone)]
pub struct NewEducation {
  pub school:         String,
  pub degree:         String,
  pub field_of_study: String,
  pub from:           NaiveDate,
  pub to:             Option<NaiveDate>,
  pub current:        bool,
  pub description:    Option<String>,
}

/// Links to the user's accounts elsewhere.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Social {
  pub youtube:   Option<String>,
  pub twitter:   Option<String>,
  pub facebook:  Option<String>,
  pub linkedin:  Option<String>,
  pub instagram: Option<String>,
}

// ─── Profile ─────────────────────────────────────────────────────────────────

/// The user-editable scalar part of a profile.
#[derive(Debug, Clone, Default)]
pub struct ProfileFields {
  pub company:         Option<String>,
  pub website:         Option<String>,
  pub location:        Option<String>,
  pub status:          String,
  pub skills:          Vec<String>,
  pub bio:             Option<String>,
  pub github_username: Option<String>,
  pub social:          Social,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
  pub user_id:         Uuid,
  pub company:         Option<String>,
  pub website:         Option<String>,
  pub location:        Option<String>,
  pub status:          String,
  pub skills:          Vec<String>,
  pub bio:             Option<String>,
  pub github_username: Option<String>,
  #[serde(default)]
  pub experience:      Vec<Experience>,
  #[serde(default)]
  pub education:       Vec<Education>,
  #[serde(default)]
  pub social:          Social,
  pub updated_at:      DateTime<Utc>,
}

impl Profile {
  /// A fresh profile for `user_id` with empty career history.
  pub fn new(user_id: Uuid, fields: ProfileFields) -> Self {
    let mut profile = Self {
      user_id,
      company: None,
      website: None,
      location: None,
      status: String::new(),
      skills: Vec::new(),
      bio: None,
      github_username: None,
      experience: Vec::new(),
      education: Vec::new(),
      social: Social::default(),
      updated_at: Utc::now(),
    };
    profile.apply(fields);
    profile
  }

  /// Overwrite the scalar fields. Experience and education are untouched.
  pub fn apply(&mut self, fields: ProfileFields) {
    self.company = fields.company;
    self.website = fields.website;
    self.location = fields.location;
    self.status = fields.status;
    self.skills = fields.skills;
    self.bio = fields.bio;
    self.github_username = fields.github_username;
    self.social = fields.social;
    self.updated_at = Utc::now();
  }

  pub fn add_experience(&mut self, input: NewExperience) -> Uuid {
    let experience_id = Uuid::new_v4();
    self.experience.insert(0, Experience {
      experience_id,
      title: input.title,
      company: input.company,
      location: input.location,
      from: input.from,
      to: input.to,
      current: input.current,
      description: input.description,
    });
    self.updated_at = Utc::now();
    experience_id
  }

  pub fn remove_experience(&mut self, experience_id: Uuid) -> Result<Experience> {
    let idx = self
      .experience
      .iter()
      .position(|e| e.experience_id == experience_id)
      .ok_or(Error::ExperienceNotFound(experience_id))?;
    self.updated_at = Utc::now();
    Ok(self.experience.remove(idx))
  }

  pub fn add_education(&mut self, input: NewEducation) -> Uuid {
    let education_id = Uuid::new_v4();
    self.education.insert(0, Education {
      education_id,
      school: input.school,
      degree: input.degree,
      field_of_study: input.field_of_study,
      from: input.from,
      to: input.to,
      current: input.current,
      description: input.description,
    });
    self.updated_at = Utc::now();
    education_id
  }

  pub fn remove_education(&mut self, education_id: Uuid) -> Result<Education> {
    let idx = self
      .education
      .iter()
      .position(|e| e.education_id == education_id)
      .ok_or(Error::EducationNotFound(education_id))?;
    self.updated_at = Utc::now();
    Ok(self.education.remove(idx))
  }
}

/// A profile joined with its owner's public details. Never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileView {
  #[serde(flatten)]
  pub profile: Profile,
  pub user:    UserSummary,
}

/// Split a comma-separated skills string, dropping blanks.
pub fn parse_skills(raw: &str) -> Vec<String> {
  raw
    .split(',')
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(str::to_owned)
    .collect()
}
