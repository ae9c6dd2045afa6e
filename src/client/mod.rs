//! Client library: a typed HTTP adapter plus in-memory stores that mirror
//! server data and apply edits optimistically.
//!
//! Everything hangs off a [`ClientContext`], built once and passed around
//! explicitly.

pub mod agent;
pub mod context;
pub mod effects;
pub mod error;
pub mod forms;
pub mod store;

pub use agent::{ActivityFilter, ActivityQuery, Agent, PaginatedResult};
pub use context::ClientContext;
pub use effects::{Effect, Effects, RecordedEffects, Route, TracingEffects};
pub use error::{ClientError, ServerErrorDetail};
