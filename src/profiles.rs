use crate::auth::{ROLE_ADMIN, ROLE_MEMBER};
use crate::database::models::{ProfileRecord, SessionRecord};
use crate::database::repositories::{
    FollowRepository, PostRepository, ProfileRepository, SessionRepository,
};
use crate::database::Database;
use crate::utils::now_utc_iso;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone)]
pub struct ProfileService {
    database: Database,
}

impl ProfileService {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    pub fn username_taken(&self, username: &str) -> Result<bool> {
        self.database
            .with_repositories(|repos| Ok(repos.profiles().get_by_username(username)?.is_some()))
    }

    /// Provisioning hook for the external identity provider: creates the
    /// profile row and issues an opaque session token for it. New accounts
    /// are always members; roles are assigned through [`Self::set_role`],
    /// never by the caller of this endpoint.
    pub fn create_profile(&self, input: CreateProfileInput) -> Result<ProvisionedProfile> {
        let username = input.username.trim().to_string();
        if username.is_empty() {
            anyhow::bail!("username may not be empty");
        }
        let profile_id = input.id.unwrap_or_else(|| Uuid::new_v4().to_string());
        let created_at = now_utc_iso();
        let record = ProfileRecord {
            id: profile_id.clone(),
            username,
            display_name: input.display_name,
            bio: input.bio,
            avatar_url: input.avatar_url,
            email: input.email,
            role: ROLE_MEMBER.to_string(),
            created_at: created_at.clone(),
            updated_at: None,
        };
        let session_token = Uuid::new_v4().to_string();

        self.database.with_repositories(|repos| {
            repos.profiles().create(&record)?;
            repos.sessions().create(&SessionRecord {
                token: session_token.clone(),
                user_id: profile_id.clone(),
                created_at,
            })
        })?;

        Ok(ProvisionedProfile {
            profile: ProfileSummary::from_record(record),
            session_token,
        })
    }

    pub fn get_profile_view(
        &self,
        profile_id: &str,
        viewer_id: Option<&str>,
    ) -> Result<Option<ProfileView>> {
        self.database.with_repositories(|repos| {
            let Some(record) = repos.profiles().get(profile_id)? else {
                return Ok(None);
            };
            let follows = repos.follows();
            let viewer_is_following = match viewer_id {
                Some(viewer) if viewer != profile_id => {
                    follows.is_following(viewer, profile_id)?
                }
                _ => false,
            };
            Ok(Some(ProfileView {
                follower_count: follows.follower_count(profile_id)?,
                following_count: follows.following_count(profile_id)?,
                post_count: repos.posts().count_for_user(profile_id)?,
                viewer_is_following,
                profile: ProfileSummary::from_record(record),
            }))
        })
    }

    /// Operator path for changing an account's role. Reachable only from
    /// the CLI, not from any HTTP endpoint.
    pub fn set_role(&self, username: &str, role: &str) -> Result<ProfileSummary> {
        if role != ROLE_ADMIN && role != ROLE_MEMBER {
            anyhow::bail!("unknown role '{role}'");
        }
        self.database.with_repositories(|repos| {
            let profiles = repos.profiles();
            let record = profiles
                .get_by_username(username)?
                .with_context(|| format!("no profile with username '{username}'"))?;
            profiles.set_role(&record.id, role)?;
            let record = profiles
                .get(&record.id)?
                .context("profile vanished during role change")?;
            Ok(ProfileSummary::from_record(record))
        })
    }

    /// Updates the mutable profile fields. The username is immutable after
    /// creation and is not accepted here.
    pub fn update_profile(&self, user_id: &str, input: UpdateProfileInput) -> Result<ProfileSummary> {
        let updated_at = now_utc_iso();
        self.database.with_repositories(|repos| {
            let profiles = repos.profiles();
            let changed = profiles.update_details(
                user_id,
                input.display_name.as_deref(),
                input.bio.as_deref(),
                input.avatar_url.as_deref(),
                &updated_at,
            )?;
            if !changed {
                anyhow::bail!("profile not found");
            }
            let record = profiles
                .get(user_id)?
                .context("profile vanished during update")?;
            Ok(ProfileSummary::from_record(record))
        })
    }
}

/// Public display shape of a profile; never carries email or role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: String,
}

impl ProfileSummary {
    pub fn from_record(record: ProfileRecord) -> Self {
        Self {
            id: record.id,
            username: record.username,
            display_name: record.display_name,
            bio: record.bio,
            avatar_url: record.avatar_url,
            created_at: record.created_at,
        }
    }

    /// Name to show in UI copy, falling back from display name to handle.
    pub fn display_label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.username)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileView {
    pub profile: ProfileSummary,
    pub follower_count: i64,
    pub following_count: i64,
    pub post_count: i64,
    pub viewer_is_following: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionedProfile {
    pub profile: ProfileSummary,
    pub session_token: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateProfileInput {
    /// Externally-issued auth identity id; generated when absent.
    #[serde(default)]
    pub id: Option<String>,
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileInput {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}
