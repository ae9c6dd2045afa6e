use std::sync::Arc;

use tracing::info;

use crate::client::agent::Agent;
use crate::client::error::ClientError;
use crate::client::forms;
use crate::client::store::common_store::CommonStore;
use crate::models::{LoginForm, RegisterForm, UserDto};

/// The signed-in account. Its token lives in the [`CommonStore`] so the agent
/// can attach it.
pub struct UserStore {
    agent: Agent,
    common: Arc<CommonStore>,
    user: Option<UserDto>,
}

impl UserStore {
    pub fn new(agent: Agent) -> Self {
        let common = Arc::clone(agent.common());
        Self {
            agent,
            common,
            user: None,
        }
    }

    pub fn user(&self) -> Option<&UserDto> {
        self.user.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    pub async fn login(&mut self, form: &LoginForm) -> Result<UserDto, ClientError> {
        let user = self.agent.login(form).await?;
        info!(username = %user.username, "logged in");
        Ok(self.sign_in(user))
    }

    pub async fn register(&mut self, form: &RegisterForm) -> Result<UserDto, ClientError> {
        forms::check_register(form)?;
        let user = self.agent.register(form).await?;
        info!(username = %user.username, "registered");
        Ok(self.sign_in(user))
    }

    pub fn logout(&mut self) {
        self.common.reset();
        self.user = None;
    }

    /// Reloads the account behind the stored token, e.g. on startup.
    pub async fn get_user(&mut self) -> Result<UserDto, ClientError> {
        let result = self.agent.current_user().await;
        self.common.set_app_loaded();
        let user = result?;
        self.user = Some(user.clone());
        Ok(user)
    }

    pub fn set_image(&mut self, url: Option<String>) {
        if let Some(user) = self.user.as_mut() {
            user.image = url;
        }
    }

    pub fn set_display_name(&mut self, display_name: &str) {
        if let Some(user) = self.user.as_mut() {
            user.display_name = display_name.to_string();
        }
    }

    fn sign_in(&mut self, user: UserDto) -> UserDto {
        self.common.set_token(Some(user.token.clone()));
        self.user = Some(user.clone());
        user
    }
}
