use crate::model::{validate_dashboard_config, DashboardConfig};
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "dashboard.yaml";
pub const CONFIG_DIR: &str = ".feeds";

/// Locate the dashboard file.
///
/// Order: `<env_dir>/dashboard.yaml`; `<cwd>/dashboard.yaml`;
/// `<cwd>/.feeds/dashboard.yaml`; `<ancestor>/.feeds/dashboard.yaml`;
/// `<home>/.feeds/dashboard.yaml`.
pub fn discover_config_path(
    cwd: &Path,
    env_dir: Option<&Path>,
    home: Option<&Path>,
) -> Option<PathBuf> {
    if let Some(dir) = env_dir {
        return Some(dir.join(CONFIG_FILE));
    }
    let candidates = [cwd.join(CONFIG_FILE), cwd.join(CONFIG_DIR).join(CONFIG_FILE)];
    if let Some(p) = candidates.iter().find(|p| p.exists()) {
        return Some(p.clone());
    }
    let mut cur = cwd;
    while let Some(parent) = cur.parent() {
        let p = parent.join(CONFIG_DIR).join(CONFIG_FILE);
        if p.exists() {
            return Some(p);
        }
        cur = parent;
    }
    home.map(|h| h.join(CONFIG_DIR).join(CONFIG_FILE))
        .filter(|p| p.exists())
}

/// Read, validate and resolve a dashboard file.
pub fn load_config_file(path: &Path) -> Result<DashboardConfig> {
    let s = fs::read_to_string(path).with_context(|| format!("reading {path:?}"))?;
    let mut cfg: DashboardConfig =
        serde_yaml::from_str(&s).with_context(|| format!("parsing {path:?}"))?;
    validate_dashboard_config(&cfg).map_err(|e| anyhow!("invalid {path:?}: {e}"))?;
    cfg.resolve_defaults();
    Ok(cfg)
}

/// Load the dashboard from the environment-driven search path, or an empty
/// dashboard when nothing is found.
pub fn load_config() -> Result<DashboardConfig> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_dir = std::env::var("FEED_DASH_CONFIG_DIR").ok().map(PathBuf::from);
    let home = std::env::var("HOME")
        .ok()
        .or_else(|| std::env::var("USERPROFILE").ok())
        .map(PathBuf::from);
    match discover_config_path(&cwd, env_dir.as_deref(), home.as_deref()) {
        Some(p) => {
            tracing::info!(path = ?p, "loading dashboard config");
            load_config_file(&p)
        }
        None => {
            tracing::warn!("no dashboard.yaml found; starting with no feeds");
            Ok(DashboardConfig::default())
        }
    }
}
