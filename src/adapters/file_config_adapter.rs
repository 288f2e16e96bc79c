//! INI file configuration adapter.

use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut config = Ini::new();
        config.load(path).map_err(std::io::Error::other)?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }

    /// An adapter with no sections; every lookup falls back to defaults.
    pub fn empty() -> Self {
        Self { config: Ini::new() }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config
            .get(section, key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn has_key(&self, section: &str, key: &str) -> bool {
        // configparser lowercases sections and keys by default
        self.config
            .get_map_ref()
            .get(&section.to_lowercase())
            .is_some_and(|s| s.contains_key(&key.to_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_config() {
        let content = r#"
[source]
endpoint = https://api.dune.com/api/v1/query/5535180/results
timeout_secs = 15

[store]
path = data/tvl.csv
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(
            adapter.get_string("source", "endpoint"),
            Some("https://api.dune.com/api/v1/query/5535180/results".to_string())
        );
        assert_eq!(adapter.get_int("source", "timeout_secs", 30), 15);
        assert_eq!(
            adapter.get_string("store", "path"),
            Some("data/tvl.csv".to_string())
        );
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string("[source]\ntimeout_secs = 5\n").unwrap();
        assert_eq!(adapter.get_string("source", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn get_string_treats_blank_as_missing() {
        let adapter = FileConfigAdapter::from_string("[source]\napi_key =\n").unwrap();
        assert_eq!(adapter.get_string("source", "api_key"), None);
    }

    #[test]
    fn has_key_sees_blank_values() {
        let adapter = FileConfigAdapter::from_string("[store]\npath =\n").unwrap();
        assert!(adapter.has_key("store", "path"));
        assert!(!adapter.has_key("store", "other"));
        assert!(!adapter.has_key("source", "path"));
    }

    #[test]
    fn get_int_returns_default_for_missing() {
        let adapter = FileConfigAdapter::from_string("[source]\n").unwrap();
        assert_eq!(adapter.get_int("source", "timeout_secs", 42), 42);
    }

    #[test]
    fn get_int_returns_default_for_non_numeric() {
        let adapter =
            FileConfigAdapter::from_string("[source]\ntimeout_secs = abc\n").unwrap();
        assert_eq!(adapter.get_int("source", "timeout_secs", 42), 42);
    }

    #[test]
    fn empty_adapter_has_no_values() {
        let adapter = FileConfigAdapter::empty();
        assert_eq!(adapter.get_string("store", "path"), None);
        assert_eq!(adapter.get_int("source", "timeout_secs", 30), 30);
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[store]\npath = /var/lib/tvl/tvl_data.csv\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("store", "path"),
            Some("/var/lib/tvl/tvl_data.csv".to_string())
        );
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/tvltracker.ini");
        assert!(result.is_err());
    }
}
