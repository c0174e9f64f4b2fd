use crate::error::FeedError;
use crate::feed::form_feed::FormFeed;
use crate::feed::FeedWidget;
use crate::model::{normalize_feed_type, DashboardConfig, FeedConfig};

/// Build the feed for one configuration entry.
pub fn resolve_feed(cfg: &FeedConfig) -> Result<Box<dyn FeedWidget>, FeedError> {
    match normalize_feed_type(&cfg.kind).as_str() {
        "form" => {
            let feed: FormFeed = FormFeed::new(cfg.name.clone(), cfg.path.clone(), cfg.clone());
            Ok(Box::new(feed))
        }
        other => Err(FeedError::UnsupportedType(other.to_string())),
    }
}

/// Build every configured feed; entries that fail are reported and skipped.
pub fn build_feeds(cfg: &DashboardConfig) -> (Vec<Box<dyn FeedWidget>>, Vec<String>) {
    let mut feeds = Vec::with_capacity(cfg.feeds.len());
    let mut errors = Vec::new();
    for entry in &cfg.feeds {
        match resolve_feed(entry) {
            Ok(feed) => {
                tracing::debug!(feed = %feed.name(), path = %feed.path(), "feed built");
                feeds.push(feed);
            }
            Err(e) => {
                tracing::warn!(feed = %entry.name, error = %e, "skipping feed");
                errors.push(format!("{}: {e}", entry.name));
            }
        }
    }
    (feeds, errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, kind: &str) -> FeedConfig {
        FeedConfig {
            name: name.into(),
            kind: kind.into(),
            ..Default::default()
        }
    }

    #[test]
    fn resolves_form_and_aliases() {
        for kind in ["form", "Form-Feed", "form_feed"] {
            let feed = resolve_feed(&entry("f", kind)).unwrap();
            assert_eq!(feed.name(), "f");
        }
    }

    #[test]
    fn unknown_type_is_an_error() {
        let err = resolve_feed(&entry("f", "chart")).err().unwrap();
        assert_eq!(err, FeedError::UnsupportedType("chart".into()));
    }

    #[test]
    fn build_feeds_skips_failures() {
        let cfg = DashboardConfig {
            feeds: vec![entry("a", "form"), entry("b", "chart"), entry("c", "form")],
            ..Default::default()
        };
        let (feeds, errors) = build_feeds(&cfg);
        let names: Vec<&str> = feeds.iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["a", "c"]);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("b:"));
    }
}
