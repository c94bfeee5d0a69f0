//! Request lifecycle: loading/success/failure state, notifications, and the
//! channel list cache.

pub mod channel_cache;
pub mod controller;

use crate::core::models::SummaryResult;

pub use channel_cache::ChannelCache;
pub use controller::{RequestController, RequestState};

/// Presentation host capability. Implemented by the terminal front end and by test recorders.
pub trait Notifier: Send + Sync {
    fn show_progress(&self, title: &str);
    fn show_success(&self, title: &str, message: &str);
    fn show_error(&self, title: &str, message: &str);
    /// `None` while a request is loading.
    fn render_result(&self, result: Option<&SummaryResult>);
}
