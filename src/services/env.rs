use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

fn var_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{([A-Za-z0-9_]+)\}").expect("static regex"))
}

/// Expand `${VAR}` references from the process environment. Unset
/// variables expand to the empty string.
pub fn expand_env(s: &str) -> String {
    let env_map: HashMap<String, String> = std::env::vars().collect();
    expand_with(s, &env_map)
}

pub fn expand_with(s: &str, vars: &HashMap<String, String>) -> String {
    var_pattern()
        .replace_all(s, |caps: &regex::Captures| {
            vars.get(&caps[1]).cloned().unwrap_or_default()
        })
        .to_string()
}

/// Truthy environment flag: `1`, `true` or `yes`.
pub fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes"))
        .unwrap_or(false)
}
