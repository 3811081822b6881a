use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::{
    auth::ownership::Owned,
    collections::{self, Keyed},
    error::AppError,
};

time::serde::format_description!(calendar_date, Date, "[year]-[month]-[day]");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    #[serde(with = "calendar_date")]
    pub from: Date,
    #[serde(default, with = "calendar_date::option")]
    pub to: Option<Date>,
    pub current: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub id: Uuid,
    pub school: String,
    pub degree: String,
    pub fieldofstudy: String,
    #[serde(with = "calendar_date")]
    pub from: Date,
    #[serde(default, with = "calendar_date::option")]
    pub to: Option<Date>,
    pub current: bool,
    pub description: Option<String>,
}

impl Keyed for ExperienceEntry {
    fn key(&self) -> Uuid {
        self.id
    }
}

impl Keyed for EducationEntry {
    fn key(&self) -> Uuid {
        self.id
    }
}

/// Validated experience body; gets an id when it enters a profile.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperienceFields {
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub from: Date,
    pub to: Option<Date>,
    pub current: bool,
    pub description: Option<String>,
}

impl ExperienceFields {
    fn into_entry(self) -> ExperienceEntry {
        ExperienceEntry {
            id: Uuid::new_v4(),
            title: self.title,
            company: self.company,
            location: self.location,
            from: self.from,
            to: self.to,
            current: self.current,
            description: self.description,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EducationFields {
    pub school: String,
    pub degree: String,
    pub fieldofstudy: String,
    pub from: Date,
    pub to: Option<Date>,
    pub current: bool,
    pub description: Option<String>,
}

impl EducationFields {
    fn into_entry(self) -> EducationEntry {
        EducationEntry {
            id: Uuid::new_v4(),
            school: self.school,
            degree: self.degree,
            fieldofstudy: self.fieldofstudy,
            from: self.from,
            to: self.to,
            current: self.current,
            description: self.description,
        }
    }
}

/// Validated upsert body. `None` optionals leave the stored value alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileFields {
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub status: String,
    pub githubusername: Option<String>,
    pub skills: Vec<String>,
    pub social: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub owner: Uuid,
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub status: String,
    pub githubusername: Option<String>,
    pub skills: Vec<String>,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub social: BTreeMap<String, String>,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
}

impl Owned for Profile {
    fn owner(&self) -> Uuid {
        self.owner
    }
}

impl Profile {
    pub fn new(owner: Uuid, fields: ProfileFields) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            company: fields.company,
            website: fields.website,
            location: fields.location,
            bio: fields.bio,
            status: fields.status,
            githubusername: fields.githubusername,
            skills: fields.skills,
            experience: Vec::new(),
            education: Vec::new(),
            social: fields.social,
            date: OffsetDateTime::now_utc(),
        }
    }

    /// Sets the provided fields; owner and sub-collections are untouched.
    pub fn apply(&mut self, fields: ProfileFields) {
        fn set(slot: &mut Option<String>, value: Option<String>) {
            if value.is_some() {
                *slot = value;
            }
        }
        set(&mut self.company, fields.company);
        set(&mut self.website, fields.website);
        set(&mut self.location, fields.location);
        set(&mut self.bio, fields.bio);
        set(&mut self.githubusername, fields.githubusername);
        self.status = fields.status;
        self.skills = fields.skills;
        self.social = fields.social;
    }

    pub fn add_experience(&mut self, fields: ExperienceFields) -> &ExperienceEntry {
        collections::prepend(&mut self.experience, fields.into_entry())
    }

    /// Replaces the entry with a freshly keyed one at the head.
    pub fn update_experience(
        &mut self,
        id: Uuid,
        fields: ExperienceFields,
    ) -> Result<&ExperienceEntry, AppError> {
        collections::replace_to_head(&mut self.experience, id, fields.into_entry())
            .ok_or_else(|| AppError::not_found("Experience not found"))?;
        Ok(&self.experience[0])
    }

    pub fn remove_experience(&mut self, id: Uuid) -> Result<ExperienceEntry, AppError> {
        collections::remove_by_key(&mut self.experience, id)
            .ok_or_else(|| AppError::not_found("Experience not found"))
    }

    pub fn add_education(&mut self, fields: EducationFields) -> &EducationEntry {
        collections::prepend(&mut self.education, fields.into_entry())
    }

    pub fn update_education(
        &mut self,
        id: Uuid,
        fields: EducationFields,
    ) -> Result<&EducationEntry, AppError> {
        collections::replace_to_head(&mut self.education, id, fields.into_entry())
            .ok_or_else(|| AppError::not_found("Education not found"))?;
        Ok(&self.education[0])
    }

    pub fn remove_education(&mut self, id: Uuid) -> Result<EducationEntry, AppError> {
        collections::remove_by_key(&mut self.education, id)
            .ok_or_else(|| AppError::not_found("Education not found"))
    }
}
