use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::normalize::{LinkRules, Rewrite};
use crate::{Config, ConfigError};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub search: Option<SearchConfig>,
    pub heuristics: Option<HeuristicsConfig>,
    pub links: Option<LinksConfig>,
    pub scan: Option<ScanConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchConfig {
    /// "serply" or "searxng".
    pub backend: Option<String>,
    pub api_key: Option<String>,
    pub serply_base_url: Option<String>,
    pub searxng_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeuristicsConfig {
    pub line_gap_factor: Option<f64>,
    pub vertical_tolerance: Option<f64>,
}

/// Extra link rules, applied after the built-in ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinksConfig {
    pub blocked_prefixes: Option<Vec<String>>,
    pub rewrites: Option<Vec<Rewrite>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanConfig {
    pub interval_ms: Option<u64>,
}

/// Platform config directory path: `<config_dir>/citelink/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("citelink").join("config.toml"))
}

/// Load config by cascading CWD `.citelink.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".citelink.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparseable config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let base_search = base.search.unwrap_or_default();
    let over_search = overlay.search.unwrap_or_default();
    let base_heur = base.heuristics.unwrap_or_default();
    let over_heur = overlay.heuristics.unwrap_or_default();
    let base_links = base.links.unwrap_or_default();
    let over_links = overlay.links.unwrap_or_default();
    let base_scan = base.scan.unwrap_or_default();
    let over_scan = overlay.scan.unwrap_or_default();

    ConfigFile {
        search: Some(SearchConfig {
            backend: over_search.backend.or(base_search.backend),
            api_key: over_search.api_key.or(base_search.api_key),
            serply_base_url: over_search.serply_base_url.or(base_search.serply_base_url),
            searxng_url: over_search.searxng_url.or(base_search.searxng_url),
            timeout_secs: over_search.timeout_secs.or(base_search.timeout_secs),
        }),
        heuristics: Some(HeuristicsConfig {
            line_gap_factor: over_heur.line_gap_factor.or(base_heur.line_gap_factor),
            vertical_tolerance: over_heur.vertical_tolerance.or(base_heur.vertical_tolerance),
        }),
        links: Some(LinksConfig {
            blocked_prefixes: over_links.blocked_prefixes.or(base_links.blocked_prefixes),
            rewrites: over_links.rewrites.or(base_links.rewrites),
        }),
        scan: Some(ScanConfig {
            interval_ms: over_scan.interval_ms.or(base_scan.interval_ms),
        }),
    }
}

impl ConfigFile {
    /// Apply the file's values on top of `config`.
    pub fn apply_to(self, config: &mut Config) -> Result<(), ConfigError> {
        if let Some(search) = self.search {
            if let Some(backend) = search.backend {
                config.search_backend = backend.parse()?;
            }
            if search.api_key.is_some() {
                config.serply_api_key = search.api_key;
            }
            if search.serply_base_url.is_some() {
                config.serply_base_url = search.serply_base_url;
            }
            if search.searxng_url.is_some() {
                config.searxng_url = search.searxng_url;
            }
            if let Some(secs) = search.timeout_secs {
                config.search_timeout_secs = secs;
            }
        }
        if let Some(heuristics) = self.heuristics {
            if let Some(factor) = heuristics.line_gap_factor {
                config.heuristics.line_gap_factor = factor;
            }
            if let Some(tolerance) = heuristics.vertical_tolerance {
                config.heuristics.vertical_tolerance = tolerance;
            }
        }
        if let Some(links) = self.links {
            config.link_rules.extend(LinkRules {
                blocked_prefixes: links.blocked_prefixes.unwrap_or_default(),
                rewrites: links.rewrites.unwrap_or_default(),
            });
        }
        if let Some(interval) = self.scan.and_then(|s| s.interval_ms) {
            config.scan_interval_ms = interval;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SearchBackendKind;

    #[test]
    fn partial_file_parses() {
        let toml_str = "[search]\nbackend = \"searxng\"\nsearxng_url = \"http://localhost:8080\"\n";
        let parsed: ConfigFile = toml::from_str(toml_str).unwrap();
        let search = parsed.search.unwrap();
        assert_eq!(search.backend.as_deref(), Some("searxng"));
        assert!(search.api_key.is_none());
        assert!(parsed.heuristics.is_none());
    }

    #[test]
    fn rewrites_parse_as_tables() {
        let toml_str = r#"
[links]
blocked_prefixes = ["https://www.researchgate.net/"]

[[links.rewrites]]
from = "https://www.biorxiv.org/content/"
to = "https://www.biorxiv.org/content/full/"
"#;
        let parsed: ConfigFile = toml::from_str(toml_str).unwrap();
        let links = parsed.links.unwrap();
        assert_eq!(links.rewrites.unwrap()[0].from, "https://www.biorxiv.org/content/");
    }

    #[test]
    fn merge_overlay_wins() {
        let base = ConfigFile {
            search: Some(SearchConfig {
                api_key: Some("base-key".into()),
                timeout_secs: Some(30),
                ..Default::default()
            }),
            ..Default::default()
        };
        let overlay = ConfigFile {
            search: Some(SearchConfig {
                api_key: Some("overlay-key".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let merged = merge(base, overlay).search.unwrap();
        assert_eq!(merged.api_key.as_deref(), Some("overlay-key"));
        assert_eq!(merged.timeout_secs, Some(30));
    }

    #[test]
    fn apply_overrides_defaults() {
        let file = ConfigFile {
            search: Some(SearchConfig {
                backend: Some("searxng".into()),
                searxng_url: Some("http://searx.local".into()),
                ..Default::default()
            }),
            heuristics: Some(HeuristicsConfig {
                line_gap_factor: Some(1.5),
                vertical_tolerance: None,
            }),
            links: Some(LinksConfig {
                blocked_prefixes: Some(vec!["https://www.researchgate.net/".into()]),
                rewrites: None,
            }),
            scan: Some(ScanConfig {
                interval_ms: Some(250),
            }),
        };
        let mut config = Config::default();
        file.apply_to(&mut config).unwrap();
        assert_eq!(config.search_backend, SearchBackendKind::Searxng);
        assert_eq!(config.searxng_url.as_deref(), Some("http://searx.local"));
        assert_eq!(config.heuristics.line_gap_factor, 1.5);
        assert_eq!(config.heuristics.vertical_tolerance, 15.0);
        assert_eq!(config.link_rules.blocked_prefixes.len(), 3);
        assert_eq!(config.scan_interval_ms, 250);
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let file = ConfigFile {
            search: Some(SearchConfig {
                backend: Some("altavista".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(file.apply_to(&mut Config::default()).is_err());
    }

    #[test]
    fn load_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[scan]\ninterval_ms = 1000\n").unwrap();
        let loaded = load_from_path(&path).unwrap();
        assert_eq!(loaded.scan.unwrap().interval_ms, Some(1000));
    }

    #[test]
    fn load_from_path_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_from_path(&dir.path().join("absent.toml")).is_none());
    }
}
