pub mod flatten;
pub mod form_feed;
pub mod node;
pub mod registry;
pub mod view;

use crate::error::FeedError;
use crate::model::{FeedConfig, DEFAULT_TIMEOUT_MS};
use std::time::Duration;

/// Identity and configuration shared by every feed type.
#[derive(Debug, Clone)]
pub struct FeedBase {
    pub name: String,
    pub path: String,
    pub config: FeedConfig,
}

impl FeedBase {
    pub fn new(name: impl Into<String>, path: impl Into<String>, config: FeedConfig) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            config,
        }
    }

    /// Endpoint for this feed: the explicit `url`, else `base_url` joined
    /// with the feed path. `${VAR}` references are expanded.
    pub fn get_url(&self) -> Option<String> {
        let raw = match (&self.config.url, &self.config.base_url) {
            (Some(url), _) if !url.trim().is_empty() => url.clone(),
            (_, Some(base)) if !base.trim().is_empty() => {
                let path = self.path.trim_start_matches('/');
                if path.is_empty() {
                    base.clone()
                } else {
                    format!("{}/{}", base.trim_end_matches('/'), path)
                }
            }
            _ => return None,
        };
        let url = crate::services::env::expand_env(&raw);
        if url.trim().is_empty() {
            None
        } else {
            Some(url)
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.config.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS))
    }
}

/// Lifecycle every dashboard feed implements.
pub trait Feed {
    fn base(&self) -> &FeedBase;

    fn name(&self) -> &str {
        &self.base().name
    }

    fn path(&self) -> &str {
        &self.base().path
    }

    fn get_url(&self) -> Option<String> {
        self.base().get_url()
    }

    /// (Re)build the feed's view.
    fn load(&mut self);

    /// Response body of a finished request.
    fn on_load(&mut self, body: &str);

    fn on_error(&mut self, err: &FeedError);

    fn last_result(&self) -> Option<&str> {
        None
    }

    fn is_busy(&self) -> bool {
        false
    }
}

/// A feed the dashboard can both drive and draw.
pub trait FeedWidget: Feed + crate::widgets::Widget {}

impl<T: Feed + crate::widgets::Widget> FeedWidget for T {}
