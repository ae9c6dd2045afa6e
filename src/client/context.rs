use std::sync::Arc;

use crate::client::agent::Agent;
use crate::client::effects::Effects;
use crate::client::error::ClientError;
use crate::client::store::{ActivityStore, CommonStore, ProfileStore, UserStore};
use crate::models::{ActivityDto, ActivityForm, PhotoDto, ProfileEditForm, UserDto};

/// Owns the agent and every store of one client session.
///
/// Operations that touch more than one store (the signed-in user's photo
/// appearing on their account, say) live here.
pub struct ClientContext {
    pub common: Arc<CommonStore>,
    pub agent: Agent,
    pub activities: ActivityStore,
    pub profiles: ProfileStore,
    pub users: UserStore,
}

impl ClientContext {
    pub fn new(base_url: &str, effects: Arc<dyn Effects>) -> Result<Self, ClientError> {
        let common = Arc::new(CommonStore::new());
        let agent = Agent::new(base_url, Arc::clone(&common), effects)?;
        Ok(Self {
            activities: ActivityStore::new(agent.clone()),
            profiles: ProfileStore::new(agent.clone()),
            users: UserStore::new(agent.clone()),
            common,
            agent,
        })
    }

    pub async fn submit_activity(&mut self, form: ActivityForm) -> Result<ActivityDto, ClientError> {
        let user = self.signed_in()?;
        self.activities.submit(form, &user).await
    }

    pub async fn attend(&mut self, activity_id: &str) -> Result<ActivityDto, ClientError> {
        let user = self.signed_in()?;
        self.activities.update_attendance(activity_id, &user).await
    }

    pub async fn upload_photo(&mut self, bytes: Vec<u8>, file_name: &str) -> Result<PhotoDto, ClientError> {
        let user = self.signed_in()?;
        let photo = self
            .profiles
            .upload_photo(&user.username, bytes, file_name)
            .await?;
        if photo.is_main {
            self.users.set_image(Some(photo.url.clone()));
        }
        Ok(photo)
    }

    pub async fn set_main_photo(&mut self, photo_id: &str) -> Result<(), ClientError> {
        let user = self.signed_in()?;
        self.profiles.set_main_photo(&user.username, photo_id).await?;
        let image = self
            .profiles
            .get(&user.username)
            .and_then(|p| p.image.clone());
        if image.is_some() {
            self.users.set_image(image);
        }
        Ok(())
    }

    pub async fn delete_photo(&mut self, photo_id: &str) -> Result<(), ClientError> {
        let user = self.signed_in()?;
        self.profiles.delete_photo(&user.username, photo_id).await
    }

    pub async fn update_profile(&mut self, form: &ProfileEditForm) -> Result<(), ClientError> {
        let user = self.signed_in()?;
        self.profiles.update_profile(&user.username, form).await?;
        self.users.set_display_name(&form.display_name);
        Ok(())
    }

    /// Signs out and drops everything cached for the session.
    pub fn teardown(mut self) {
        self.users.logout();
        self.activities.clear();
        self.profiles.clear();
    }

    fn signed_in(&self) -> Result<UserDto, ClientError> {
        self.users.user().cloned().ok_or(ClientError::Unauthorized)
    }
}
