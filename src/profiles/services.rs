use std::collections::HashMap;

use tracing::{error, info};
use uuid::Uuid;

use super::{
    dto::ProfileView,
    model::{EducationFields, ExperienceFields, Profile, ProfileFields},
};
use crate::{
    auth::{dto::PublicIdentity, ownership::ensure_owner},
    error::AppError,
    store::Store,
};

const NO_PROFILE: &str = "There is no profile for this user";

async fn views(store: &dyn Store, profiles: Vec<Profile>) -> Result<Vec<ProfileView>, AppError> {
    let owners: Vec<Uuid> = profiles.iter().map(|p| p.owner).collect();
    let identities: HashMap<Uuid, PublicIdentity> = store
        .find_identities(&owners)
        .await?
        .iter()
        .map(|i| (i.id, PublicIdentity::from(i)))
        .collect();
    Ok(profiles
        .into_iter()
        .map(|profile| ProfileView {
            user: identities.get(&profile.owner).cloned(),
            profile,
        })
        .collect())
}

async fn view(store: &dyn Store, profile: Profile) -> Result<ProfileView, AppError> {
    let user = store
        .find_identity(profile.owner)
        .await?
        .as_ref()
        .map(PublicIdentity::from);
    Ok(ProfileView { profile, user })
}

async fn load(store: &dyn Store, owner: Uuid) -> Result<Profile, AppError> {
    store
        .find_profile_by_owner(owner)
        .await?
        .ok_or_else(|| AppError::not_found(NO_PROFILE))
}

pub async fn own_profile(store: &dyn Store, caller: Uuid) -> Result<ProfileView, AppError> {
    let profile = load(store, caller).await?;
    view(store, profile).await
}

pub async fn profile_by_identity(
    store: &dyn Store,
    identity_id: Uuid,
) -> Result<ProfileView, AppError> {
    let profile = load(store, identity_id).await?;
    view(store, profile).await
}

pub async fn list_profiles(store: &dyn Store) -> Result<Vec<ProfileView>, AppError> {
    let profiles = store.list_profiles().await?;
    views(store, profiles).await
}

/// Creates the caller's profile, or overwrites the provided fields of the
/// existing one. The owner always comes from the authenticated identity.
pub async fn upsert_profile(
    store: &dyn Store,
    caller: Uuid,
    fields: ProfileFields,
) -> Result<ProfileView, AppError> {
    let profile = match store.find_profile_by_owner(caller).await? {
        Some(mut existing) => {
            existing.apply(fields);
            store.save_profile(&existing).await?;
            info!(profile_id = %existing.id, "profile updated");
            existing
        }
        None => {
            let created = Profile::new(caller, fields);
            store.insert_profile(&created).await?;
            info!(profile_id = %created.id, "profile created");
            created
        }
    };
    view(store, profile).await
}

/// Removes the caller's profile, then the identity. The caller's posts stay.
///
/// Two separate writes: if the second fails the profile is already gone and
/// the request reports a server error; repeating the call finishes the job.
pub async fn delete_account(store: &dyn Store, caller: Uuid) -> Result<(), AppError> {
    store.delete_profile_by_owner(caller).await?;
    if let Err(e) = store.delete_identity(caller).await {
        error!(error = %e, identity_id = %caller, "identity delete failed after profile delete");
        return Err(e.into());
    }
    info!(identity_id = %caller, "account deleted");
    Ok(())
}

/// Load, ownership check, mutate, save as one unit. Nothing is written when
/// the check or the mutation fails.
async fn mutate_profile<F>(
    store: &dyn Store,
    target_owner: Uuid,
    caller: Uuid,
    mutate: F,
) -> Result<ProfileView, AppError>
where
    F: FnOnce(&mut Profile) -> Result<(), AppError> + Send,
{
    let mut profile = load(store, target_owner).await?;
    ensure_owner(&profile, caller)?;
    mutate(&mut profile)?;
    store.save_profile(&profile).await?;
    view(store, profile).await
}

pub async fn add_experience(
    store: &dyn Store,
    target_owner: Uuid,
    caller: Uuid,
    fields: ExperienceFields,
) -> Result<ProfileView, AppError> {
    mutate_profile(store, target_owner, caller, |p| {
        let id = p.add_experience(fields).id;
        info!(experience_id = %id, "experience added");
        Ok(())
    })
    .await
}

pub async fn update_experience(
    store: &dyn Store,
    target_owner: Uuid,
    caller: Uuid,
    entry_id: Uuid,
    fields: ExperienceFields,
) -> Result<ProfileView, AppError> {
    mutate_profile(store, target_owner, caller, |p| {
        let id = p.update_experience(entry_id, fields)?.id;
        info!(old_id = %entry_id, new_id = %id, "experience updated");
        Ok(())
    })
    .await
}

pub async fn remove_experience(
    store: &dyn Store,
    target_owner: Uuid,
    caller: Uuid,
    entry_id: Uuid,
) -> Result<ProfileView, AppError> {
    mutate_profile(store, target_owner, caller, |p| {
        p.remove_experience(entry_id)?;
        info!(experience_id = %entry_id, "experience removed");
        Ok(())
    })
    .await
}

pub async fn add_education(
    store: &dyn Store,
    target_owner: Uuid,
    caller: Uuid,
    fields: EducationFields,
) -> Result<ProfileView, AppError> {
    mutate_profile(store, target_owner, caller, |p| {
        let id = p.add_education(fields).id;
        info!(education_id = %id, "education added");
        Ok(())
    })
    .await
}

pub async fn update_education(
    store: &dyn Store,
    target_owner: Uuid,
    caller: Uuid,
    entry_id: Uuid,
    fields: EducationFields,
) -> Result<ProfileView, AppError> {
    mutate_profile(store, target_owner, caller, |p| {
        let id = p.update_education(entry_id, fields)?.id;
        info!(old_id = %entry_id, new_id = %id, "education updated");
        Ok(())
    })
    .await
}

pub async fn remove_education(
    store: &dyn Store,
    target_owner: Uuid,
    caller: Uuid,
    entry_id: Uuid,
) -> Result<ProfileView, AppError> {
    mutate_profile(store, target_owner, caller, |p| {
        p.remove_education(entry_id)?;
        info!(education_id = %entry_id, "education removed");
        Ok(())
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::repo_types::Identity,
        profiles::model::tests::{education, experience, fields},
        store::MemoryStore,
    };
    use time::OffsetDateTime;

    async fn seeded() -> (MemoryStore, Uuid) {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();
        store
            .insert_identity(&Identity {
                id,
                name: "Ann".into(),
                email: "ann@x.com".into(),
                password_hash: "hash".into(),
                avatar: "https://avatar/ann".into(),
                created_at: OffsetDateTime::now_utc(),
            })
            .await
            .unwrap();
        (store, id)
    }

    #[tokio::test]
    async fn upsert_creates_then_updates_in_place() {
        let (store, ann) = seeded().await;

        let created = upsert_profile(&store, ann, fields("Developer")).await.unwrap();
        assert_eq!(created.user.as_ref().unwrap().name, "Ann");

        let updated = upsert_profile(&store, ann, fields("Lead")).await.unwrap();
        assert_eq!(updated.profile.id, created.profile.id);
        assert_eq!(updated.profile.status, "Lead");
        assert_eq!(list_profiles(&store).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn missing_profile_is_not_found() {
        let (store, ann) = seeded().await;
        assert!(matches!(
            own_profile(&store, ann).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            add_experience(&store, ann, ann, experience("x")).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn update_experience_moves_entry_to_head_and_persists() {
        let (store, ann) = seeded().await;
        upsert_profile(&store, ann, fields("Developer")).await.unwrap();
        let first = add_experience(&store, ann, ann, experience("first")).await.unwrap();
        let tail = first.profile.experience[0].id;
        add_experience(&store, ann, ann, experience("second")).await.unwrap();

        update_experience(&store, ann, ann, tail, experience("first, renamed"))
            .await
            .unwrap();

        let stored = own_profile(&store, ann).await.unwrap().profile;
        let titles: Vec<_> = stored.experience.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["first, renamed", "second"]);
    }

    #[tokio::test]
    async fn non_owner_cannot_touch_entries() {
        let (store, ann) = seeded().await;
        upsert_profile(&store, ann, fields("Developer")).await.unwrap();
        let view = add_education(&store, ann, ann, education("MIT")).await.unwrap();
        let entry = view.profile.education[0].id;
        let mallory = Uuid::new_v4();

        assert!(matches!(
            remove_education(&store, ann, mallory, entry).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            update_education(&store, ann, mallory, entry, education("Fake U")).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            add_experience(&store, ann, mallory, experience("x")).await,
            Err(AppError::Forbidden(_))
        ));

        let stored = own_profile(&store, ann).await.unwrap().profile;
        assert_eq!(stored.education, view.profile.education);
        assert!(stored.experience.is_empty());
    }

    #[tokio::test]
    async fn removing_unknown_entry_is_not_found() {
        let (store, ann) = seeded().await;
        upsert_profile(&store, ann, fields("Developer")).await.unwrap();
        assert!(matches!(
            remove_experience(&store, ann, ann, Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn delete_account_removes_profile_and_identity() {
        let (store, ann) = seeded().await;
        upsert_profile(&store, ann, fields("Developer")).await.unwrap();

        delete_account(&store, ann).await.unwrap();

        assert!(store.find_identity(ann).await.unwrap().is_none());
        assert!(store.find_profile_by_owner(ann).await.unwrap().is_none());
    }
}
