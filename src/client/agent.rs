use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::client::effects::{Effect, Effects, Route};
use crate::client::error::{ClientError, ServerErrorDetail};
use crate::client::store::CommonStore;
use crate::models::{
    ActivityDto, ActivityForm, LoginForm, PaginationHeader, PagingParams, PhotoDto, ProfileDto,
    ProfileEditForm, RegisterForm, UserActivityDto, UserDto,
};

const PAGINATION_HEADER: &str = "pagination";

/// A response body plus the paging metadata carried in its `Pagination` header.
#[derive(Debug, Clone, PartialEq)]
pub struct PaginatedResult<T> {
    pub data: T,
    pub pagination: Option<PaginationHeader>,
}

/// Which slice of the activity list to fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ActivityFilter {
    #[default]
    All,
    IsGoing,
    IsHost,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityQuery {
    pub paging: PagingParams,
    pub filter: ActivityFilter,
    pub start_date: Option<DateTime<Utc>>,
}

impl ActivityQuery {
    fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("pageNumber", self.paging.page_number.to_string()),
            ("pageSize", self.paging.page_size.to_string()),
        ];
        match self.filter {
            ActivityFilter::All => {}
            ActivityFilter::IsGoing => pairs.push(("isGoing", "true".to_string())),
            ActivityFilter::IsHost => pairs.push(("isHost", "true".to_string())),
        }
        if let Some(date) = self.start_date {
            pairs.push((
                "startDate",
                date.to_rfc3339_opts(SecondsFormat::Secs, true),
            ));
        }
        pairs
    }
}

/// Typed access to the `/api` endpoints.
///
/// Attaches the session token from the [`CommonStore`] to every request and
/// turns error responses into a [`ClientError`], firing the matching
/// [`Effects`] on the way.
#[derive(Clone)]
pub struct Agent {
    http: reqwest::Client,
    base_url: String,
    common: Arc<CommonStore>,
    effects: Arc<dyn Effects>,
}

impl Agent {
    pub fn new(
        base_url: &str,
        common: Arc<CommonStore>,
        effects: Arc<dyn Effects>,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            common,
            effects,
        })
    }

    pub fn common(&self) -> &Arc<CommonStore> {
        &self.common
    }

    // ----- activities -----

    pub async fn list_activities(
        &self,
        query: &ActivityQuery,
    ) -> Result<PaginatedResult<Vec<ActivityDto>>, ClientError> {
        let builder = self
            .request(Method::GET, "/activities")
            .query(&query.pairs());
        let response = self.execute(&Method::GET, builder).await?;
        let pagination = pagination_of(&response)?;
        let data = read_json(response).await?;
        Ok(PaginatedResult { data, pagination })
    }

    pub async fn activity_details(&self, id: &str) -> Result<ActivityDto, ClientError> {
        self.get(&format!("/activities/{}", id)).await
    }

    pub async fn create_activity(&self, form: &ActivityForm) -> Result<ActivityDto, ClientError> {
        self.send_json(Method::POST, "/activities", form).await
    }

    pub async fn update_activity(
        &self,
        id: &str,
        form: &ActivityForm,
    ) -> Result<ActivityDto, ClientError> {
        self.send_json(Method::PUT, &format!("/activities/{}", id), form)
            .await
    }

    pub async fn delete_activity(&self, id: &str) -> Result<(), ClientError> {
        self.send_empty(Method::DELETE, &format!("/activities/{}", id))
            .await
    }

    pub async fn attend(&self, id: &str) -> Result<ActivityDto, ClientError> {
        let path = format!("/activities/{}/attend", id);
        let response = self
            .execute(&Method::POST, self.request(Method::POST, &path))
            .await?;
        read_json(response).await
    }

    // ----- account -----

    pub async fn current_user(&self) -> Result<UserDto, ClientError> {
        self.get("/account").await
    }

    pub async fn login(&self, form: &LoginForm) -> Result<UserDto, ClientError> {
        self.send_json(Method::POST, "/account/login", form).await
    }

    pub async fn register(&self, form: &RegisterForm) -> Result<UserDto, ClientError> {
        self.send_json(Method::POST, "/account/register", form)
            .await
    }

    // ----- profiles -----

    pub async fn profile(&self, username: &str) -> Result<ProfileDto, ClientError> {
        self.get(&format!("/profiles/{}", username)).await
    }

    pub async fn update_profile(&self, form: &ProfileEditForm) -> Result<(), ClientError> {
        let builder = self.request(Method::PUT, "/profiles").json(form);
        self.execute(&Method::PUT, builder).await?;
        Ok(())
    }

    pub async fn user_activities(
        &self,
        username: &str,
        predicate: &str,
    ) -> Result<Vec<UserActivityDto>, ClientError> {
        let builder = self
            .request(Method::GET, &format!("/profiles/{}/activities", username))
            .query(&[("predicate", predicate)]);
        let response = self.execute(&Method::GET, builder).await?;
        read_json(response).await
    }

    pub async fn upload_photo(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
    ) -> Result<PhotoDto, ClientError> {
        let part = Part::bytes(bytes).file_name(file_name.to_string());
        let builder = self
            .request(Method::POST, "/photos")
            .multipart(Form::new().part("File", part));
        let response = self.execute(&Method::POST, builder).await?;
        read_json(response).await
    }

    pub async fn set_main_photo(&self, photo_id: &str) -> Result<(), ClientError> {
        self.send_empty(Method::POST, &format!("/photos/{}/setMain", photo_id))
            .await
    }

    pub async fn delete_photo(&self, photo_id: &str) -> Result<(), ClientError> {
        self.send_empty(Method::DELETE, &format!("/photos/{}", photo_id))
            .await
    }

    // ----- follow -----

    pub async fn follow(&self, username: &str) -> Result<(), ClientError> {
        self.send_empty(Method::POST, &format!("/follow/{}", username))
            .await
    }

    pub async fn unfollow(&self, username: &str) -> Result<(), ClientError> {
        self.send_empty(Method::DELETE, &format!("/follow/{}", username))
            .await
    }

    pub async fn followings(
        &self,
        username: &str,
        predicate: &str,
    ) -> Result<Vec<ProfileDto>, ClientError> {
        let builder = self
            .request(Method::GET, &format!("/follow/{}", username))
            .query(&[("predicate", predicate)]);
        let response = self.execute(&Method::GET, builder).await?;
        read_json(response).await
    }

    // ----- plumbing -----

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/api{}", self.base_url, path);
        let builder = self.http.request(method, url);
        match self.common.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self
            .execute(&Method::GET, self.request(Method::GET, path))
            .await?;
        read_json(response).await
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let builder = self.request(method.clone(), path).json(body);
        let response = self.execute(&method, builder).await?;
        read_json(response).await
    }

    async fn send_empty(&self, method: Method, path: &str) -> Result<(), ClientError> {
        let builder = self.request(method.clone(), path);
        self.execute(&method, builder).await?;
        Ok(())
    }

    async fn execute(
        &self,
        method: &Method,
        builder: RequestBuilder,
    ) -> Result<Response, ClientError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        debug!(method = %method, status = status.as_u16(), url = %response.url(), "request failed");
        let body = response.text().await?;
        Err(self.intercept(method, status, &body))
    }

    fn intercept(&self, method: &Method, status: StatusCode, body: &str) -> ClientError {
        let (error, effects) = classify_error(method, status, body);
        if let ClientError::Server(detail) = &error {
            self.common.set_server_error(detail.clone());
        }
        for effect in &effects {
            self.effects.apply(effect);
        }
        error
    }
}

/// Maps an error response to the error handed back to the caller plus the
/// effects the user should see.
pub fn classify_error(method: &Method, status: StatusCode, body: &str) -> (ClientError, Vec<Effect>) {
    match status {
        StatusCode::BAD_REQUEST => classify_bad_request(method, body),
        StatusCode::UNAUTHORIZED => (
            ClientError::Unauthorized,
            vec![Effect::Toast("unauthorised".to_string())],
        ),
        StatusCode::NOT_FOUND => (
            ClientError::NotFound,
            vec![Effect::Navigate(Route::NotFound)],
        ),
        StatusCode::INTERNAL_SERVER_ERROR => {
            let detail = serde_json::from_str::<ServerErrorDetail>(body).unwrap_or_else(|_| {
                ServerErrorDetail {
                    status_code: status.as_u16(),
                    message: non_empty(body).unwrap_or("Internal Server Error").to_string(),
                    details: None,
                }
            });
            (
                ClientError::Server(detail),
                vec![Effect::Navigate(Route::ServerError)],
            )
        }
        other => (ClientError::Status(other.as_u16()), Vec::new()),
    }
}

fn classify_bad_request(method: &Method, body: &str) -> (ClientError, Vec<Effect>) {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let errors = parsed
        .as_ref()
        .and_then(|v| v.get("errors"))
        .and_then(Value::as_object);

    match errors {
        // A malformed id on a read means there is nothing to show.
        Some(errors) if *method == Method::GET && errors.contains_key("id") => (
            ClientError::NotFound,
            vec![Effect::Navigate(Route::NotFound)],
        ),
        Some(errors) => {
            let messages = errors
                .values()
                .flat_map(|v| match v {
                    Value::Array(items) => items
                        .iter()
                        .filter_map(|m| m.as_str().map(str::to_string))
                        .collect::<Vec<_>>(),
                    Value::String(message) => vec![message.clone()],
                    _ => Vec::new(),
                })
                .collect();
            (ClientError::Validation(messages), Vec::new())
        }
        None => {
            let message = match parsed {
                Some(Value::String(message)) => message,
                _ => non_empty(body).unwrap_or("Bad request").to_string(),
            };
            (
                ClientError::BadRequest(message.clone()),
                vec![Effect::Toast(message)],
            )
        }
    }
}

fn non_empty(body: &str) -> Option<&str> {
    Some(body.trim()).filter(|b| !b.is_empty())
}

fn pagination_of(response: &Response) -> Result<Option<PaginationHeader>, ClientError> {
    match response.headers().get(PAGINATION_HEADER) {
        Some(raw) => {
            let raw = raw.to_str().unwrap_or_default();
            Ok(Some(serde_json::from_str(raw)?))
        }
        None => Ok(None),
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}
