use std::sync::{Mutex, PoisonError};

use tracing::{info, warn};

/// Views the client can be sent to when a request fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    NotFound,
    ServerError,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::NotFound => "/not-found",
            Route::ServerError => "/server-error",
        }
    }
}

/// A visible side effect of a failed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Toast(String),
    Navigate(Route),
}

/// Sink for the UI-facing effects the agent produces. The host application
/// decides how a toast or a navigation is actually shown.
pub trait Effects: Send + Sync {
    fn toast_error(&self, message: &str);
    fn navigate(&self, route: Route);

    fn apply(&self, effect: &Effect) {
        match effect {
            Effect::Toast(message) => self.toast_error(message),
            Effect::Navigate(route) => self.navigate(*route),
        }
    }
}

/// Logs effects instead of showing them. Used by headless callers.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEffects;

impl Effects for TracingEffects {
    fn toast_error(&self, message: &str) {
        warn!(message = %message, "client error");
    }

    fn navigate(&self, route: Route) {
        info!(route = route.path(), "client navigation");
    }
}

/// Keeps every effect in order so callers can inspect what happened.
#[derive(Debug, Default)]
pub struct RecordedEffects {
    effects: Mutex<Vec<Effect>>,
}

impl RecordedEffects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drains the recorded effects.
    pub fn take(&self) -> Vec<Effect> {
        let mut effects = self.effects.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *effects)
    }

    fn push(&self, effect: Effect) {
        self.effects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(effect);
    }
}

impl Effects for RecordedEffects {
    fn toast_error(&self, message: &str) {
        self.push(Effect::Toast(message.to_string()));
    }

    fn navigate(&self, route: Route) {
        self.push(Effect::Navigate(route));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorded_effects_drain_in_order() {
        let effects = RecordedEffects::new();
        effects.apply(&Effect::Toast("unauthorised".into()));
        effects.navigate(Route::NotFound);
        assert_eq!(
            effects.take(),
            vec![
                Effect::Toast("unauthorised".into()),
                Effect::Navigate(Route::NotFound)
            ]
        );
        assert!(effects.take().is_empty());
    }
}
