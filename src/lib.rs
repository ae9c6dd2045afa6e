//! Reactivities: a JSON API over activities, accounts, profiles, photos and
//! follow relationships, plus a client library that mirrors that data with
//! optimistic local edits.
//!
//! Server side: [`web`] routes into [`services`], which read and write
//! SQLite through [`database`]. Client side: [`client::ClientContext`] owns
//! the typed [`client::agent::Agent`] and the in-memory stores.

pub mod client;
pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod web;
