use crate::feed::node::ConfigNode;
use serde::Deserialize;

pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SubmitMethod {
    #[default]
    Get,
    Post,
}

impl SubmitMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            SubmitMethod::Get => "GET",
            SubmitMethod::Post => "POST",
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct FeedConfig {
    pub name: String,
    // Feed path; joined onto the dashboard base_url when no url is given
    #[serde(default)]
    pub path: String,
    #[serde(default = "default_feed_type", rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub method: SubmitMethod,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    // Nested default values for form feeds
    #[serde(default)]
    pub form: Option<ConfigNode>,
    // Filled from the dashboard when loading; not read from the feed entry
    #[serde(skip)]
    pub base_url: Option<String>,
}

fn default_feed_type() -> String {
    "form".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub feeds: Vec<FeedConfig>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            base_url: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            feeds: vec![],
        }
    }
}

fn default_title() -> String {
    "Feeds".to_string()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl DashboardConfig {
    /// Push dashboard-wide defaults down into each feed entry.
    pub fn resolve_defaults(&mut self) {
        for feed in &mut self.feeds {
            if feed.timeout_ms.is_none() {
                feed.timeout_ms = Some(self.timeout_ms);
            }
            if feed.base_url.is_none() {
                feed.base_url = self.base_url.clone();
            }
        }
    }
}

/// Lowercased feed type with aliases folded, e.g. `form-feed` -> `form`.
pub fn normalize_feed_type(kind: &str) -> String {
    let k = kind.trim().to_ascii_lowercase();
    match k.as_str() {
        "form-feed" | "form_feed" | "formfeed" => "form".to_string(),
        _ => k,
    }
}

pub(crate) fn validate_dashboard_config(cfg: &DashboardConfig) -> Result<(), String> {
    use std::collections::HashSet;
    if cfg.timeout_ms == 0 {
        return Err("timeout_ms must be greater than zero".into());
    }
    let mut names = HashSet::new();
    for (i, feed) in cfg.feeds.iter().enumerate() {
        if feed.name.trim().is_empty() {
            return Err(format!("feed at index {i} has an empty name"));
        }
        if !names.insert(feed.name.as_str()) {
            return Err(format!("duplicate feed name: '{}' at index {}", feed.name, i));
        }
        match normalize_feed_type(&feed.kind).as_str() {
            "form" => {}
            other => {
                return Err(format!(
                    "feed '{}' has unsupported type '{}'",
                    feed.name, other
                ))
            }
        }
        if feed.timeout_ms == Some(0) {
            return Err(format!("feed '{}' timeout_ms must be greater than zero", feed.name));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> DashboardConfig {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn parses_feed_entries_with_defaults() {
        let cfg = parse(
            r#"
title: Ops
base_url: http://localhost:9000
feeds:
  - name: settings
    path: /settings
    form:
      user: Ada
  - name: deploy
    type: form-feed
    url: http://example.test/deploy
    method: post
    timeout_ms: 500
"#,
        );
        assert_eq!(cfg.title, "Ops");
        assert_eq!(cfg.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert_eq!(cfg.feeds.len(), 2);
        assert_eq!(cfg.feeds[0].kind, "form");
        assert_eq!(cfg.feeds[0].method, SubmitMethod::Get);
        assert!(cfg.feeds[0].form.is_some());
        assert_eq!(cfg.feeds[1].method, SubmitMethod::Post);
        assert!(cfg.feeds[1].form.is_none());
        assert!(validate_dashboard_config(&cfg).is_ok());
    }

    #[test]
    fn resolve_defaults_fills_timeout_and_base_url() {
        let mut cfg = parse(
            r#"
base_url: http://host
timeout_ms: 1234
feeds:
  - name: a
  - name: b
    timeout_ms: 50
"#,
        );
        cfg.resolve_defaults();
        assert_eq!(cfg.feeds[0].timeout_ms, Some(1234));
        assert_eq!(cfg.feeds[1].timeout_ms, Some(50));
        assert_eq!(cfg.feeds[0].base_url.as_deref(), Some("http://host"));
    }

    #[test]
    fn validate_detects_duplicate_names() {
        let cfg = DashboardConfig {
            feeds: vec![
                FeedConfig {
                    name: "a".into(),
                    kind: "form".into(),
                    ..Default::default()
                },
                FeedConfig {
                    name: "a".into(),
                    kind: "form".into(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let err = validate_dashboard_config(&cfg).unwrap_err();
        assert!(err.contains("duplicate feed name"));
    }

    #[test]
    fn validate_rejects_unknown_type() {
        let cfg = DashboardConfig {
            feeds: vec![FeedConfig {
                name: "chart".into(),
                kind: "chart".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let err = validate_dashboard_config(&cfg).unwrap_err();
        assert!(err.contains("unsupported type 'chart'"));
    }

    #[test]
    fn validate_rejects_empty_name_and_zero_timeout() {
        let mut cfg = DashboardConfig {
            feeds: vec![FeedConfig {
                name: " ".into(),
                kind: "form".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert!(validate_dashboard_config(&cfg)
            .unwrap_err()
            .contains("empty name"));
        cfg.feeds.clear();
        cfg.timeout_ms = 0;
        assert!(validate_dashboard_config(&cfg).is_err());
    }

    #[test]
    fn feed_type_aliases_normalize() {
        assert_eq!(normalize_feed_type("Form-Feed"), "form");
        assert_eq!(normalize_feed_type("form_feed"), "form");
        assert_eq!(normalize_feed_type("table"), "table");
    }
}
