//! Wellness tracking: a key/value HTTP service for mood, meals, hydration,
//! stats and achievements, and the client-side data layer that talks to it
//! with transparent fallback to on-device storage.

use std::sync::Arc;

pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod server;

use config::Config;
use db::KvStore;

#[derive(Clone)]
pub struct AppState {
    pub kv: KvStore,
    pub config: Arc<Config>,
}
