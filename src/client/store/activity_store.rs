use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::client::agent::{ActivityFilter, ActivityQuery, Agent};
use crate::client::error::ClientError;
use crate::client::forms;
use crate::client::store::pending::{OpId, OpKind, PendingLog};
use crate::models::{
    ActivityDto, ActivityForm, AttendeeProfile, Category, PaginationHeader, PagingParams, UserDto,
};

/// Activities seen so far, keyed by id.
pub struct ActivityStore {
    agent: Agent,
    registry: BTreeMap<String, ActivityDto>,
    pending: PendingLog<ActivityDto>,
    selected: Option<String>,
    pagination: Option<PaginationHeader>,
    query: ActivityQuery,
    loading: bool,
}

impl ActivityStore {
    pub fn new(agent: Agent) -> Self {
        Self {
            agent,
            registry: BTreeMap::new(),
            pending: PendingLog::new(),
            selected: None,
            pagination: None,
            query: ActivityQuery::default(),
            loading: false,
        }
    }

    pub fn get(&self, id: &str) -> Option<&ActivityDto> {
        self.registry.get(id)
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn pending(&self) -> &PendingLog<ActivityDto> {
        &self.pending
    }

    pub fn pagination(&self) -> Option<PaginationHeader> {
        self.pagination
    }

    pub fn query(&self) -> &ActivityQuery {
        &self.query
    }

    pub fn selected(&self) -> Option<&ActivityDto> {
        self.selected.as_deref().and_then(|id| self.registry.get(id))
    }

    pub fn select(&mut self, id: &str) {
        self.selected = Some(id.to_string());
    }

    pub fn clear_selected(&mut self) {
        self.selected = None;
    }

    /// Activities ordered by date, earliest first.
    pub fn activities_by_date(&self) -> Vec<&ActivityDto> {
        let mut activities: Vec<&ActivityDto> = self.registry.values().collect();
        activities.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        activities
    }

    /// [`activities_by_date`](Self::activities_by_date) bucketed per calendar day.
    pub fn grouped_activities(&self) -> Vec<(NaiveDate, Vec<&ActivityDto>)> {
        let mut groups: Vec<(NaiveDate, Vec<&ActivityDto>)> = Vec::new();
        for activity in self.activities_by_date() {
            let day = activity.date.date_naive();
            if let Some((last, items)) = groups.last_mut() {
                if *last == day {
                    items.push(activity);
                    continue;
                }
            }
            groups.push((day, vec![activity]));
        }
        groups
    }

    pub fn set_paging(&mut self, paging: PagingParams) {
        self.query.paging = paging;
    }

    /// Switching filter starts over from page one with an empty registry.
    pub fn set_filter(&mut self, filter: ActivityFilter) {
        self.query.filter = filter;
        self.reset_listing();
    }

    pub fn set_start_date(&mut self, start_date: Option<DateTime<Utc>>) {
        self.query.start_date = start_date;
        self.reset_listing();
    }

    pub fn clear(&mut self) {
        self.registry.clear();
        self.pending.clear();
        self.selected = None;
        self.pagination = None;
        self.query = ActivityQuery::default();
        self.loading = false;
    }

    /// Fetches the current page and merges it into the registry.
    pub async fn load_activities(&mut self) -> Result<(), ClientError> {
        self.loading = true;
        let result = self.agent.list_activities(&self.query).await;
        self.loading = false;

        let page = result?;
        debug!(count = page.data.len(), "activities loaded");
        for activity in page.data {
            self.registry.insert(activity.id.clone(), activity);
        }
        self.pagination = page.pagination;
        Ok(())
    }

    /// Returns the cached activity, fetching it on a miss.
    pub async fn load_activity(&mut self, id: &str) -> Result<ActivityDto, ClientError> {
        if let Some(activity) = self.registry.get(id) {
            let activity = activity.clone();
            self.selected = Some(activity.id.clone());
            return Ok(activity);
        }

        self.loading = true;
        let result = self.agent.activity_details(id).await;
        self.loading = false;

        let activity = result?;
        self.registry.insert(activity.id.clone(), activity.clone());
        self.selected = Some(activity.id.clone());
        Ok(activity)
    }

    /// Creates when the form has no id, updates otherwise.
    pub async fn submit(&mut self, form: ActivityForm, user: &UserDto) -> Result<ActivityDto, ClientError> {
        let has_id = form.id.as_deref().map(|id| !id.trim().is_empty()).unwrap_or(false);
        if has_id {
            self.update_activity(form).await
        } else {
            self.create_activity(form, user).await
        }
    }

    pub async fn create_activity(
        &mut self,
        mut form: ActivityForm,
        user: &UserDto,
    ) -> Result<ActivityDto, ClientError> {
        forms::check(&form)?;

        let id = Uuid::new_v4().to_string();
        form.id = Some(id.clone());

        let speculative = draft_activity(&id, &form, user);
        let op = self.pending.begin(id.as_str(), OpKind::Create, None);
        self.registry.insert(id.clone(), speculative);

        let result = self.agent.create_activity(&form).await;
        self.settle(op, result)
    }

    pub async fn update_activity(&mut self, form: ActivityForm) -> Result<ActivityDto, ClientError> {
        forms::check(&form)?;
        let Some(id) = form.id.clone() else {
            return Err(ClientError::Validation(vec!["Activity id is required".to_string()]));
        };

        let previous = self.registry.get(&id).cloned();
        let op = self.pending.begin(id.as_str(), OpKind::Update, previous);
        if let Some(activity) = self.registry.get_mut(&id) {
            activity.apply_form(&form);
        }

        let result = self.agent.update_activity(&id, &form).await;
        self.settle(op, result)
    }

    pub async fn delete_activity(&mut self, id: &str) -> Result<(), ClientError> {
        let previous = self.registry.remove(id);
        let op = self.pending.begin(id, OpKind::Delete, previous);

        match self.agent.delete_activity(id).await {
            Ok(()) => {
                self.pending.commit(op);
                if self.selected.as_deref() == Some(id) {
                    self.selected = None;
                }
                Ok(())
            }
            Err(e) => {
                self.restore(op);
                Err(e)
            }
        }
    }

    /// Join, leave or (for the host) toggle cancellation, shown locally first.
    pub async fn update_attendance(&mut self, id: &str, user: &UserDto) -> Result<ActivityDto, ClientError> {
        let current = self.load_activity(id).await?;

        let mut speculative = current.clone();
        toggle_attendance(&mut speculative, user);
        let op = self.pending.begin(id, OpKind::Update, Some(current));
        self.registry.insert(id.to_string(), speculative);

        let result = self.agent.attend(id).await;
        self.settle(op, result)
    }

    /// The server copy wins on success; on failure the pre-edit state comes back.
    fn settle(
        &mut self,
        op: OpId,
        result: Result<ActivityDto, ClientError>,
    ) -> Result<ActivityDto, ClientError> {
        match result {
            Ok(activity) => {
                self.pending.commit(op);
                self.registry.insert(activity.id.clone(), activity.clone());
                Ok(activity)
            }
            Err(e) => {
                self.restore(op);
                Err(e)
            }
        }
    }

    fn restore(&mut self, op: OpId) {
        match self.pending.rollback(op) {
            Some(entry) => {
                warn!(activity_id = %entry.key, kind = ?entry.kind, "rolling back optimistic edit");
                entry.restore_into(&mut self.registry);
            }
            None => warn!("rollback for an unknown pending op"),
        }
    }

    fn reset_listing(&mut self) {
        self.query.paging = PagingParams::default();
        self.registry.clear();
        self.pagination = None;
    }
}

fn attendee_for(user: &UserDto) -> AttendeeProfile {
    AttendeeProfile {
        username: user.username.clone(),
        display_name: user.display_name.clone(),
        bio: None,
        image: user.image.clone(),
        following: false,
        followers_count: 0,
        following_count: 0,
    }
}

/// Local stand-in shown until the server returns the created activity.
fn draft_activity(id: &str, form: &ActivityForm, host: &UserDto) -> ActivityDto {
    ActivityDto {
        id: id.to_string(),
        title: form.title.clone(),
        date: form.date.unwrap_or_else(Utc::now),
        description: form.description.clone(),
        category: form.category.unwrap_or(Category::Culture),
        city: form.city.clone(),
        venue: form.venue.clone(),
        is_cancelled: false,
        host_username: Some(host.username.clone()),
        attendees: vec![attendee_for(host)],
    }
}

fn toggle_attendance(activity: &mut ActivityDto, user: &UserDto) {
    if activity.is_host(&user.username) {
        activity.is_cancelled = !activity.is_cancelled;
    } else if activity.is_going(&user.username) {
        activity.attendees.retain(|a| a.username != user.username);
    } else {
        activity.attendees.push(attendee_for(user));
    }
}
