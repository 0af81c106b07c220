use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct ConfigFile {
    #[serde(alias = "start_url")]
    pub url: Option<String>,
    pub page_size: Option<usize>,
    pub rate: Option<u32>,
    pub timeout: Option<usize>,
    pub max_pages: Option<usize>,
    pub proxy: Option<String>,
    pub header: Option<String>,
    pub output: Option<String>,
    pub output_format: Option<String>,
    pub no_color: Option<bool>,
    pub interactive: Option<bool>,
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("USERPROFILE").map(PathBuf::from))
        .or_else(|| {
            let drive = env::var_os("HOMEDRIVE")?;
            let path = env::var_os("HOMEPATH")?;
            Some(PathBuf::from(drive).join(path))
        })
}

pub fn default_config_path() -> Option<PathBuf> {
    Some(home_dir()?.join(".rollcall").join("config.yml"))
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        if let Some(home) = home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

pub fn expand_tilde_string(path: &str) -> String {
    expand_tilde(path).to_string_lossy().to_string()
}

pub fn parse_config(contents: &str) -> Result<ConfigFile, String> {
    let blank = contents.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#')
    });
    if blank {
        return Ok(ConfigFile::default());
    }
    serde_yaml::from_str::<ConfigFile>(contents).map_err(|e| e.to_string())
}

pub fn load_config(path: &Path, allow_missing: bool) -> Result<ConfigFile, String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => parse_config(&contents)
            .map_err(|e| format!("failed to parse config '{}': {e}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && allow_missing => {
            Ok(ConfigFile::default())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(format!("config file not found '{}'", path.display()))
        }
        Err(e) => Err(format!("failed to read config '{}': {e}", path.display())),
    }
}

fn default_config_yaml() -> String {
    r#"# rollcall config
#
# Location (default):
#   ~/.rollcall/config.yml
#
# Command-line flags override every value here.

# Listing to load; every `next` page is followed.
url: https://swapi.dev/api/people/

# Display
page_size: 12
no_color: false
# output: ./characters.json
# output_format: json
interactive: false

# HTTP
timeout: 10
# Requests per second while following pages (0 = unpaced)
rate: 0
# Abort a load whose listing keeps going past this many pages
max_pages: 1000
# proxy: http://127.0.0.1:8080
# header: "Accept-Language: en"
"#
    .to_string()
}

pub fn ensure_default_config_file(path: &Path) -> Result<bool, String> {
    if path.exists() {
        return Ok(false);
    }
    let parent = path
        .parent()
        .ok_or_else(|| format!("invalid config path '{}'", path.display()))?;
    std::fs::create_dir_all(parent).map_err(|e| {
        format!(
            "failed to create config directory '{}': {e}",
            parent.display()
        )
    })?;
    std::fs::write(path, default_config_yaml())
        .map_err(|e| format!("failed to write config file '{}': {e}", path.display()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_yaml_parses_to_builtin_defaults() {
        let cfg = parse_config(&default_config_yaml()).unwrap();
        assert_eq!(cfg.url.as_deref(), Some("https://swapi.dev/api/people/"));
        assert_eq!(cfg.page_size, Some(12));
        assert_eq!(cfg.rate, Some(0));
        assert_eq!(cfg.max_pages, Some(1000));
        assert_eq!(cfg.proxy, None);
    }

    #[test]
    fn empty_config_is_default() {
        assert_eq!(parse_config("\n# nothing\n").unwrap(), ConfigFile::default());
        assert_eq!(parse_config("").unwrap(), ConfigFile::default());
    }

    #[test]
    fn start_url_alias_is_accepted() {
        let cfg = parse_config("start_url: http://localhost/people/\npage_size: 5\n").unwrap();
        assert_eq!(cfg.url.as_deref(), Some("http://localhost/people/"));
        assert_eq!(cfg.page_size, Some(5));
    }

    #[test]
    fn missing_file_is_allowed_only_when_asked() {
        let path = std::env::temp_dir().join("rollcall-missing-config-test.yml");
        assert_eq!(load_config(&path, true).unwrap(), ConfigFile::default());
        assert!(load_config(&path, false).is_err());
    }

    #[test]
    fn ensure_default_writes_once() {
        let dir = std::env::temp_dir().join(format!("rollcall-config-{}", std::process::id()));
        let path = dir.join("config.yml");
        let _ = std::fs::remove_dir_all(&dir);
        assert!(ensure_default_config_file(&path).unwrap());
        assert!(!ensure_default_config_file(&path).unwrap());
        let cfg = load_config(&path, false).unwrap();
        assert_eq!(cfg.page_size, Some(12));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
