use std::collections::BTreeMap;

use tracing::warn;

use crate::client::agent::Agent;
use crate::client::error::ClientError;
use crate::client::forms;
use crate::client::store::pending::{OpId, OpKind, PendingLog};
use crate::models::{PhotoDto, ProfileDto, ProfileEditForm, UserActivityDto};

/// Loaded profiles plus the lists shown on the profile page.
pub struct ProfileStore {
    agent: Agent,
    profiles: BTreeMap<String, ProfileDto>,
    pending: PendingLog<ProfileDto>,
    current: Option<String>,
    followings: Vec<ProfileDto>,
    user_activities: Vec<UserActivityDto>,
    uploading: bool,
}

impl ProfileStore {
    pub fn new(agent: Agent) -> Self {
        Self {
            agent,
            profiles: BTreeMap::new(),
            pending: PendingLog::new(),
            current: None,
            followings: Vec::new(),
            user_activities: Vec::new(),
            uploading: false,
        }
    }

    /// The profile most recently opened with [`load_profile`](Self::load_profile).
    pub fn profile(&self) -> Option<&ProfileDto> {
        self.current.as_deref().and_then(|u| self.profiles.get(u))
    }

    pub fn get(&self, username: &str) -> Option<&ProfileDto> {
        self.profiles.get(username)
    }

    pub fn followings(&self) -> &[ProfileDto] {
        &self.followings
    }

    pub fn user_activities(&self) -> &[UserActivityDto] {
        &self.user_activities
    }

    pub fn pending(&self) -> &PendingLog<ProfileDto> {
        &self.pending
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    pub fn clear(&mut self) {
        self.profiles.clear();
        self.pending.clear();
        self.current = None;
        self.followings.clear();
        self.user_activities.clear();
        self.uploading = false;
    }

    pub async fn load_profile(&mut self, username: &str) -> Result<ProfileDto, ClientError> {
        let profile = self.agent.profile(username).await?;
        self.profiles
            .insert(profile.username.clone(), profile.clone());
        self.current = Some(profile.username.clone());
        Ok(profile)
    }

    /// Adds an uploaded photo to `owner`'s profile. A first photo comes back
    /// as main and becomes the profile image.
    pub async fn upload_photo(
        &mut self,
        owner: &str,
        bytes: Vec<u8>,
        file_name: &str,
    ) -> Result<PhotoDto, ClientError> {
        self.uploading = true;
        let result = self.agent.upload_photo(bytes, file_name).await;
        self.uploading = false;

        let photo = result?;
        if let Some(profile) = self.profiles.get_mut(owner) {
            if photo.is_main {
                profile.image = Some(photo.url.clone());
            }
            profile.photos.push(photo.clone());
        }
        Ok(photo)
    }

    pub async fn set_main_photo(&mut self, owner: &str, photo_id: &str) -> Result<(), ClientError> {
        let op = self.begin_edit(owner, |profile| {
            let Some(url) = profile
                .photos
                .iter()
                .find(|p| p.id == photo_id)
                .map(|p| p.url.clone())
            else {
                return;
            };
            for photo in &mut profile.photos {
                photo.is_main = photo.id == photo_id;
            }
            profile.image = Some(url);
        });

        let result = self.agent.set_main_photo(photo_id).await;
        self.settle(op, result)
    }

    pub async fn delete_photo(&mut self, owner: &str, photo_id: &str) -> Result<(), ClientError> {
        let op = self.begin_edit(owner, |profile| {
            profile.photos.retain(|p| p.id != photo_id);
        });

        let result = self.agent.delete_photo(photo_id).await;
        self.settle(op, result)
    }

    /// Follows or unfollows `username`, flipping the flag and follower count
    /// before the server answers.
    pub async fn update_following(&mut self, username: &str, follow: bool) -> Result<(), ClientError> {
        let op = self.begin_edit(username, |profile| apply_following(profile, follow));

        let result = if follow {
            self.agent.follow(username).await
        } else {
            self.agent.unfollow(username).await
        };
        self.settle(op, result)?;

        for profile in self.followings.iter_mut().filter(|p| p.username == username) {
            apply_following(profile, follow);
        }
        Ok(())
    }

    /// `predicate` is `followers` or `following`.
    pub async fn load_followings(&mut self, username: &str, predicate: &str) -> Result<(), ClientError> {
        self.followings = self.agent.followings(username, predicate).await?;
        Ok(())
    }

    /// `predicate` is `past`, `hosting` or `future`.
    pub async fn load_user_activities(&mut self, username: &str, predicate: &str) -> Result<(), ClientError> {
        self.user_activities = self.agent.user_activities(username, predicate).await?;
        Ok(())
    }

    pub async fn update_profile(&mut self, owner: &str, form: &ProfileEditForm) -> Result<(), ClientError> {
        forms::check(form)?;
        let op = self.begin_edit(owner, |profile| {
            profile.display_name = form.display_name.clone();
            profile.bio = form.bio.clone();
        });

        let result = self.agent.update_profile(form).await;
        self.settle(op, result)
    }

    // Profiles that are not loaded get no local edit, only the server call.
    fn begin_edit(&mut self, username: &str, edit: impl FnOnce(&mut ProfileDto)) -> Option<OpId> {
        let previous = self.profiles.get(username).cloned()?;
        let op = self.pending.begin(username, OpKind::Update, Some(previous));
        if let Some(profile) = self.profiles.get_mut(username) {
            edit(profile);
        }
        Some(op)
    }

    fn settle(&mut self, op: Option<OpId>, result: Result<(), ClientError>) -> Result<(), ClientError> {
        let Some(op) = op else {
            return result;
        };
        match result {
            Ok(()) => {
                self.pending.commit(op);
                Ok(())
            }
            Err(e) => {
                if let Some(entry) = self.pending.rollback(op) {
                    warn!(username = %entry.key, "rolling back optimistic profile edit");
                    entry.restore_into(&mut self.profiles);
                }
                Err(e)
            }
        }
    }
}

fn apply_following(profile: &mut ProfileDto, follow: bool) {
    if profile.following == follow {
        return;
    }
    profile.following = follow;
    profile.followers_count += if follow { 1 } else { -1 };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> ProfileDto {
        ProfileDto {
            username: "jane".into(),
            display_name: "Jane".into(),
            bio: None,
            image: None,
            following: false,
            followers_count: 2,
            following_count: 0,
            photos: Vec::new(),
        }
    }

    #[test]
    fn following_is_applied_once() {
        let mut p = profile();
        apply_following(&mut p, true);
        apply_following(&mut p, true);
        assert!(p.following);
        assert_eq!(p.followers_count, 3);

        apply_following(&mut p, false);
        assert_eq!(p.followers_count, 2);
    }
}
