use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub output: Option<OutputConfig>,
    pub concurrency: Option<ConcurrencyConfig>,
    pub scan: Option<ScanConfig>,
    pub display: Option<DisplayConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    pub dir: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConcurrencyConfig {
    pub threads: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanConfig {
    pub case_sensitive: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub color: Option<bool>,
}

impl ConfigFile {
    pub fn output_dir(&self) -> Option<PathBuf> {
        self.output
            .as_ref()
            .and_then(|o| o.dir.as_ref())
            .map(PathBuf::from)
    }

    pub fn threads(&self) -> Option<usize> {
        self.concurrency.as_ref().and_then(|c| c.threads)
    }

    pub fn case_sensitive(&self) -> Option<bool> {
        self.scan.as_ref().and_then(|s| s.case_sensitive)
    }

    pub fn color(&self) -> Option<bool> {
        self.display.as_ref().and_then(|d| d.color)
    }
}

/// Platform config directory path: `<config_dir>/unredact/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("unredact").join("config.toml"))
}

/// Load config by cascading CWD `.unredact.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".unredact.toml"));

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
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparsable config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        output: Some(OutputConfig {
            dir: overlay
                .output
                .as_ref()
                .and_then(|o| o.dir.clone())
                .or_else(|| base.output.as_ref().and_then(|o| o.dir.clone())),
        }),
        concurrency: Some(ConcurrencyConfig {
            threads: overlay.threads().or_else(|| base.threads()),
        }),
        scan: Some(ScanConfig {
            case_sensitive: overlay.case_sensitive().or_else(|| base.case_sensitive()),
        }),
        display: Some(DisplayConfig {
            color: overlay.color().or_else(|| base.color()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_parses() {
        let toml_str = "[concurrency]\nthreads = 3\n";
        let parsed: ConfigFile = toml::from_str(toml_str).unwrap();
        assert_eq!(parsed.threads(), Some(3));
        assert!(parsed.output_dir().is_none());
        assert!(parsed.case_sensitive().is_none());
    }

    #[test]
    fn full_config_parses() {
        let toml_str = r#"
[output]
dir = "/tmp/recovered"

[concurrency]
threads = 8

[scan]
case_sensitive = true

[display]
color = false
"#;
        let parsed: ConfigFile = toml::from_str(toml_str).unwrap();
        assert_eq!(parsed.output_dir(), Some(PathBuf::from("/tmp/recovered")));
        assert_eq!(parsed.threads(), Some(8));
        assert_eq!(parsed.case_sensitive(), Some(true));
        assert_eq!(parsed.color(), Some(false));
    }

    #[test]
    fn merge_overlay_wins() {
        let base = ConfigFile {
            concurrency: Some(ConcurrencyConfig { threads: Some(2) }),
            output: Some(OutputConfig {
                dir: Some("/base".to_string()),
            }),
            ..Default::default()
        };
        let overlay = ConfigFile {
            concurrency: Some(ConcurrencyConfig { threads: Some(6) }),
            ..Default::default()
        };
        let merged = merge(base, overlay);
        assert_eq!(merged.threads(), Some(6));
        assert_eq!(merged.output_dir(), Some(PathBuf::from("/base")));
    }

    #[test]
    fn load_from_path_handles_missing_and_garbage() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_from_path(&dir.path().join("absent.toml")).is_none());

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "threads = [").unwrap();
        assert!(load_from_path(&bad).is_none());

        let good = dir.path().join("good.toml");
        std::fs::write(&good, "[scan]\ncase_sensitive = false\n").unwrap();
        assert_eq!(load_from_path(&good).unwrap().case_sensitive(), Some(false));
    }
}
