use std::{
    collections::HashMap,
    env,
    ffi::OsString,
    fs,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use directories::BaseDirs;

use crate::plugins::PluginSource;

#[derive(Debug, Clone)]
pub struct Config {
    inner: HashMap<String, String>,
    pub config_path: PathBuf,
}

impl Config {
    /// Defaults, then `.awesomerc`, then `AWESOME_*` environment variables.
    pub fn load() -> Self {
        // Pairs that are not valid UTF-8 are skipped.
        let vars = env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)));
        Self::load_from(default_config_path(), vars)
    }

    pub fn load_from(
        config_path: impl Into<PathBuf>,
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        let config_path = config_path.into();
        let mut map = default_map();

        if let Ok(file) = fs::File::open(&config_path) {
            let reader = BufReader::new(file);
            for line in reader.lines().map_while(Result::ok) {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                if let Some((k, v)) = line.split_once('=') {
                    map.insert(k.trim().to_string(), v.trim().to_string());
                }
            }
        }

        for (k, v) in vars {
            if is_config_key(&k) {
                map.insert(k, v);
            }
        }

        Self { inner: map, config_path }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key).cloned()
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key)
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    pub fn get_path(&self, key: &str) -> Option<PathBuf> {
        self.get(key).filter(|v| !v.is_empty()).map(PathBuf::from)
    }

    pub fn verbose(&self) -> bool {
        self.get_bool("AWESOME_VERBOSE")
    }

    pub fn report_prefix(&self) -> String {
        self.get("AWESOME_REPORT_PREFIX")
            .unwrap_or_else(|| DEFAULT_REPORT_PREFIX.to_string())
    }

    /// Plugin scan order: primary directory, conditional directory, then
    /// every entry of `path_var` (the value of `PATH`) in listed order.
    pub fn plugin_sources(&self, path_var: Option<OsString>) -> Vec<PluginSource> {
        let prefix = self
            .get("AWESOME_PLUGIN_PREFIX")
            .unwrap_or_else(|| DEFAULT_PLUGIN_PREFIX.to_string());
        let conditional_prefix = self
            .get("AWESOME_CONDITIONAL_PLUGIN_PREFIX")
            .unwrap_or_else(|| prefix.clone());

        let mut sources = Vec::new();
        if let Some(dir) = self.get_path("AWESOME_PLUGIN_DIR") {
            sources.push(PluginSource::new(dir, &prefix));
        }
        if let Some(dir) = self.get_path("AWESOME_CONDITIONAL_PLUGIN_DIR") {
            sources.push(PluginSource::new(dir, &conditional_prefix));
        }
        if self.get_bool("AWESOME_SCAN_PATH") {
            if let Some(path_var) = path_var {
                sources.extend(
                    env::split_paths(&path_var)
                        .filter(|dir| !dir.as_os_str().is_empty())
                        .map(|dir| PluginSource::new(dir, &prefix)),
                );
            }
        }
        sources
    }
}

pub const DEFAULT_PLUGIN_PREFIX: &str = "awesome-";
pub const DEFAULT_REPORT_PREFIX: &str = "cucumber_report";

fn is_config_key(k: &str) -> bool {
    k.starts_with("AWESOME_")
}

fn config_dir() -> PathBuf {
    BaseDirs::new()
        .map(|b| b.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.config"))
}

fn default_config_path() -> PathBuf {
    config_dir().join("awesome").join(".awesomerc")
}

fn home_dir() -> PathBuf {
    BaseDirs::new()
        .map(|b| b.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~"))
}

fn default_map() -> HashMap<String, String> {
    let mut m = HashMap::new();
    let lossy = |p: &Path| p.to_string_lossy().into_owned();

    // Paths
    m.insert(
        "AWESOME_PLUGIN_DIR".into(),
        lossy(&home_dir().join(".foo").join("plugins")),
    );
    m.insert(
        "AWESOME_CONDITIONAL_PLUGIN_DIR".into(),
        lossy(&config_dir().join("awesome").join("plugins")),
    );

    // Strings
    m.insert("AWESOME_PLUGIN_PREFIX".into(), DEFAULT_PLUGIN_PREFIX.into());
    m.insert(
        "AWESOME_CONDITIONAL_PLUGIN_PREFIX".into(),
        DEFAULT_PLUGIN_PREFIX.into(),
    );
    m.insert("AWESOME_REPORT_PREFIX".into(), DEFAULT_REPORT_PREFIX.into());

    // Bools as strings
    m.insert("AWESOME_SCAN_PATH".into(), "true".into());
    m.insert("AWESOME_VERBOSE".into(), "false".into());

    m
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn rc_file_then_env_overlay() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        let rc = tmp.path().join(".awesomerc");
        fs::write(
            &rc,
            "# comment\nAWESOME_REPORT_PREFIX = from_file\nAWESOME_PLUGIN_PREFIX=ext-\n\n",
        )?;

        let cfg = Config::load_from(
            &rc,
            vars(&[("AWESOME_PLUGIN_PREFIX", "env-"), ("HOME_ISH", "ignored")]),
        );
        assert_eq!(cfg.report_prefix(), "from_file");
        assert_eq!(cfg.get("AWESOME_PLUGIN_PREFIX").as_deref(), Some("env-"));
        assert_eq!(cfg.get("HOME_ISH"), None);
        Ok(())
    }

    #[test]
    fn missing_rc_file_keeps_defaults() {
        let cfg = Config::load_from("/no/such/.awesomerc", Vec::new());
        assert_eq!(cfg.report_prefix(), DEFAULT_REPORT_PREFIX);
        assert!(!cfg.verbose());
        assert!(cfg.get_bool("AWESOME_SCAN_PATH"));
    }

    #[test]
    fn plugin_sources_follow_priority_order() {
        let cfg = Config::load_from(
            "/no/such/.awesomerc",
            vars(&[
                ("AWESOME_PLUGIN_DIR", "/primary"),
                ("AWESOME_CONDITIONAL_PLUGIN_DIR", "/conditional"),
                ("AWESOME_CONDITIONAL_PLUGIN_PREFIX", "ext-"),
            ]),
        );
        let path_var = env::join_paths(["/usr/local/bin", "/usr/bin"]).ok();
        let sources = cfg.plugin_sources(path_var);

        let dirs: Vec<_> = sources.iter().map(|s| s.dir.clone()).collect();
        assert_eq!(
            dirs,
            vec![
                PathBuf::from("/primary"),
                PathBuf::from("/conditional"),
                PathBuf::from("/usr/local/bin"),
                PathBuf::from("/usr/bin"),
            ]
        );
        assert_eq!(sources[0].prefix, "awesome-");
        assert_eq!(sources[1].prefix, "ext-");
        assert_eq!(sources[3].prefix, "awesome-");
    }

    #[test]
    fn path_scan_can_be_disabled() {
        let cfg = Config::load_from(
            "/no/such/.awesomerc",
            vars(&[
                ("AWESOME_SCAN_PATH", "false"),
                ("AWESOME_CONDITIONAL_PLUGIN_DIR", ""),
            ]),
        );
        let sources = cfg.plugin_sources(Some(OsString::from("/usr/bin")));
        assert_eq!(sources.len(), 1);
    }
}
