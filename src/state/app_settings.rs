use crate::state::storage::default_store_path;
use log::LevelFilter;
use std::path::PathBuf;
use torikumi_api::client::DEFAULT_BASE_URL;
use torikumi_api::format::LEGACY_HEADER_KAOMOJI;

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: Option<LevelFilter>,
    /// Directory that serves `data/torikumi/...` and `data/quiz/...`.
    pub data_url: String,
    pub store_path: PathBuf,
    pub header_comment: String,
    pub footer_comment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            full_screen: false,
            log_level: None,
            data_url: DEFAULT_BASE_URL.to_string(),
            store_path: default_store_path(),
            header_comment: LEGACY_HEADER_KAOMOJI.to_string(),
            footer_comment: String::new(),
        }
    }
}

impl AppSettings {
    pub fn load() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build settings from a variable lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        Self {
            full_screen: false,
            log_level: var("SUMO_YOSO_LOG").and_then(|v| v.trim().parse().ok()),
            data_url: var("SUMO_YOSO_DATA_URL").unwrap_or(defaults.data_url),
            store_path: var("SUMO_YOSO_STORE").map(PathBuf::from).unwrap_or(defaults.store_path),
            header_comment: lookup("SUMO_YOSO_HEADER").unwrap_or(defaults.header_comment),
            footer_comment: lookup("SUMO_YOSO_FOOTER").unwrap_or(defaults.footer_comment),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> AppSettings {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppSettings::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let s = settings(&[]);
        assert_eq!(s.data_url, DEFAULT_BASE_URL);
        assert_eq!(s.header_comment, "（・ω・）ノ");
        assert_eq!(s.footer_comment, "");
        assert_eq!(s.log_level, None);
    }

    #[test]
    fn environment_overrides() {
        let s = settings(&[
            ("SUMO_YOSO_DATA_URL", "https://example.com/sumo/"),
            ("SUMO_YOSO_STORE", "/tmp/picks.json"),
            ("SUMO_YOSO_LOG", "debug"),
            ("SUMO_YOSO_FOOTER", "これで"),
        ]);
        assert_eq!(s.data_url, "https://example.com/sumo/");
        assert_eq!(s.store_path, PathBuf::from("/tmp/picks.json"));
        assert_eq!(s.log_level, Some(LevelFilter::Debug));
        assert_eq!(s.footer_comment, "これで");
    }

    #[test]
    fn empty_header_disables_the_comment() {
        let s = settings(&[("SUMO_YOSO_HEADER", ""), ("SUMO_YOSO_DATA_URL", "  ")]);
        assert_eq!(s.header_comment, "");
        assert_eq!(s.data_url, DEFAULT_BASE_URL);
    }
}
