use std::collections::BTreeMap;

use sqlx::{types::Json, FromRow};
use time::OffsetDateTime;
use uuid::Uuid;

use super::model::{EducationEntry, ExperienceEntry, Profile};

#[derive(Debug, FromRow)]
pub struct ProfileRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub status: String,
    pub githubusername: Option<String>,
    pub skills: Json<Vec<String>>,
    pub experience: Json<Vec<ExperienceEntry>>,
    pub education: Json<Vec<EducationEntry>>,
    pub social: Json<BTreeMap<String, String>>,
    pub created_at: OffsetDateTime,
}

impl From<ProfileRow> for Profile {
    fn from(r: ProfileRow) -> Self {
        Self {
            id: r.id,
            owner: r.owner_id,
            company: r.company,
            website: r.website,
            location: r.location,
            bio: r.bio,
            status: r.status,
            githubusername: r.githubusername,
            skills: r.skills.0,
            experience: r.experience.0,
            education: r.education.0,
            social: r.social.0,
            date: r.created_at,
        }
    }
}
