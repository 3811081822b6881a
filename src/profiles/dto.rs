use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::model::{EducationFields, ExperienceFields, Profile, ProfileFields};
use crate::{
    auth::dto::PublicIdentity,
    error::AppError,
    validation::{present, Checks},
};

/// Platforms collected into `Profile::social`.
const SOCIAL_PLATFORMS: [&str; 5] = ["youtube", "twitter", "facebook", "linkedin", "instagram"];

/// Profile with its owner's public fields populated as `user`.
#[derive(Debug, Serialize)]
pub struct ProfileView {
    #[serde(flatten)]
    pub profile: Profile,
    pub user: Option<PublicIdentity>,
}

/// Either `"rust, go"` or `["rust", "go"]`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SkillsInput {
    Csv(String),
    List(Vec<String>),
}

impl SkillsInput {
    fn into_list(self) -> Vec<String> {
        let raw: Vec<String> = match self {
            SkillsInput::Csv(s) => s.split(',').map(str::to_string).collect(),
            SkillsInput::List(v) => v,
        };
        raw.into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ProfileRequest {
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub status: Option<String>,
    pub githubusername: Option<String>,
    pub skills: Option<SkillsInput>,
    pub youtube: Option<String>,
    pub twitter: Option<String>,
    pub facebook: Option<String>,
    pub linkedin: Option<String>,
    pub instagram: Option<String>,
}

impl ProfileRequest {
    pub fn validate(self) -> Result<ProfileFields, AppError> {
        let mut checks = Checks::new();
        let status = checks.required(&self.status, "status", "Status is required");
        let skills = self.skills.map(SkillsInput::into_list).unwrap_or_default();
        checks.check(!skills.is_empty(), "skills", "Skills is required");
        checks.finish()?;

        let links = [
            &self.youtube,
            &self.twitter,
            &self.facebook,
            &self.linkedin,
            &self.instagram,
        ];
        let social: BTreeMap<String, String> = SOCIAL_PLATFORMS
            .iter()
            .zip(links)
            .filter_map(|(platform, url)| present(url).map(|u| (platform.to_string(), u)))
            .collect();

        Ok(ProfileFields {
            company: present(&self.company),
            website: present(&self.website),
            location: present(&self.location),
            bio: present(&self.bio),
            status,
            githubusername: present(&self.githubusername),
            skills,
            social,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ExperienceRequest {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub current: Option<bool>,
    pub description: Option<String>,
}

impl ExperienceRequest {
    pub fn validate(self) -> Result<ExperienceFields, AppError> {
        let mut checks = Checks::new();
        let title = checks.required(&self.title, "title", "Title is required");
        let company = checks.required(&self.company, "company", "Company is required");
        let from = checks.date(&self.from, "from", true);
        let to = checks.date(&self.to, "to", false);
        date_order(&mut checks, from, to);
        checks.finish()?;

        Ok(ExperienceFields {
            title,
            company,
            location: present(&self.location),
            // finish() has rejected a missing `from`
            from: from.unwrap_or(time::Date::MIN),
            to,
            current: self.current.unwrap_or(false),
            description: present(&self.description),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct EducationRequest {
    pub school: Option<String>,
    pub degree: Option<String>,
    pub fieldofstudy: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub current: Option<bool>,
    pub description: Option<String>,
}

impl EducationRequest {
    pub fn validate(self) -> Result<EducationFields, AppError> {
        let mut checks = Checks::new();
        let school = checks.required(&self.school, "school", "School is required");
        let degree = checks.required(&self.degree, "degree", "Degree is required");
        let fieldofstudy =
            checks.required(&self.fieldofstudy, "fieldofstudy", "Field of study is required");
        let from = checks.date(&self.from, "from", true);
        let to = checks.date(&self.to, "to", false);
        date_order(&mut checks, from, to);
        checks.finish()?;

        Ok(EducationFields {
            school,
            degree,
            fieldofstudy,
            from: from.unwrap_or(time::Date::MIN),
            to,
            current: self.current.unwrap_or(false),
            description: present(&self.description),
        })
    }
}

fn date_order(checks: &mut Checks, from: Option<time::Date>, to: Option<time::Date>) {
    if let (Some(from), Some(to)) = (from, to) {
        checks.check(to >= from, "to", "to date cannot be before from date");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn params(err: AppError) -> Vec<String> {
        match err {
            AppError::Validation(errors) => errors.into_iter().map(|e| e.param).collect(),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn skills_accept_csv_and_list() {
        let csv: ProfileRequest =
            serde_json::from_str(r#"{"status":"Dev","skills":" rust, go ,,sql"}"#).unwrap();
        assert_eq!(csv.validate().unwrap().skills, vec!["rust", "go", "sql"]);

        let list: ProfileRequest =
            serde_json::from_str(r#"{"status":"Dev","skills":["rust"," go "]}"#).unwrap();
        assert_eq!(list.validate().unwrap().skills, vec!["rust", "go"]);
    }

    #[test]
    fn profile_requires_status_and_skills() {
        let err = ProfileRequest {
            skills: Some(SkillsInput::Csv(" , ".into())),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(params(err), vec!["status", "skills"]);
    }

    #[test]
    fn social_links_are_collected_by_platform() {
        let fields = ProfileRequest {
            status: Some("Dev".into()),
            skills: Some(SkillsInput::Csv("rust".into())),
            twitter: Some("https://twitter.com/ann".into()),
            youtube: Some("  ".into()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(fields.social.len(), 1);
        assert_eq!(fields.social["twitter"], "https://twitter.com/ann");
    }

    #[test]
    fn experience_parses_dates() {
        let fields = ExperienceRequest {
            title: Some("Engineer".into()),
            company: Some("Acme".into()),
            from: Some("2019-02-01".into()),
            to: Some("2020-03-01".into()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(fields.from, date!(2019 - 02 - 01));
        assert_eq!(fields.to, Some(date!(2020 - 03 - 01)));
        assert!(!fields.current);
    }

    #[test]
    fn experience_rejects_missing_fields_and_reversed_dates() {
        let err = ExperienceRequest::default().validate().unwrap_err();
        assert_eq!(params(err), vec!["title", "company", "from"]);

        let err = ExperienceRequest {
            title: Some("Engineer".into()),
            company: Some("Acme".into()),
            from: Some("2020-01-01".into()),
            to: Some("2019-01-01".into()),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(params(err), vec!["to"]);
    }

    #[test]
    fn education_requires_field_of_study() {
        let err = EducationRequest {
            school: Some("MIT".into()),
            degree: Some("BSc".into()),
            from: Some("2010-09-01".into()),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(params(err), vec!["fieldofstudy"]);
    }
}
