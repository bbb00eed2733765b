use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::core::constants::{
    DEFAULT_APOLOGY_MARKERS, DEFAULT_BASE_URL, DEFAULT_LANGUAGE, DEFAULT_OUTPUT_DIR,
};
use crate::core::spaces::{SpaceDirectory, SpaceEntry};

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    /// API base URL, e.g. "https://mvp.slangit.ai/api"
    pub base_url: Option<String>,
    /// Language code sent with every message
    pub language: Option<String>,
    /// Directory batch results are written to
    pub output_dir: Option<String>,
    /// How many spaces a batch run may process at once
    pub jobs: Option<usize>,
    /// Case-insensitive substrings that mark an answer as failed
    pub apology_markers: Option<Vec<String>>,
    #[serde(default)]
    pub spaces: Vec<SpaceEntry>,
}

pub const CONFIG_KEYS: &[&str] = &["base-url", "language", "output-dir", "jobs"];

impl Config {
    pub fn load() -> Result<Config, Box<dyn std::error::Error>> {
        let config_path = Self::get_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn load_from_path(config_path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
        if config_path.exists() {
            let contents = fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let config_path = Self::get_config_path()?;
        self.save_to_path(&config_path)
    }

    /// Write the config atomically: a temp file in the same directory is
    /// renamed over the target.
    pub fn save_to_path(&self, config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let parent = config_path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty());
        if let Some(dir) = parent {
            fs::create_dir_all(dir)?;
        }

        let contents = toml::to_string_pretty(self)?;
        let mut temp_file = match parent {
            Some(dir) => NamedTempFile::new_in(dir)?,
            None => NamedTempFile::new()?,
        };
        temp_file.write_all(contents.as_bytes())?;
        temp_file.as_file_mut().sync_all()?;
        temp_file.persist(config_path).map_err(|err| err.error)?;
        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
        let proj_dirs = project_dirs().ok_or("Failed to determine config directory")?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn language(&self) -> &str {
        self.language.as_deref().unwrap_or(DEFAULT_LANGUAGE)
    }

    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(self.output_dir.as_deref().unwrap_or(DEFAULT_OUTPUT_DIR))
    }

    pub fn jobs(&self) -> usize {
        self.jobs.unwrap_or(1).max(1)
    }

    pub fn apology_markers(&self) -> Vec<String> {
        match &self.apology_markers {
            Some(markers) => markers.clone(),
            None => DEFAULT_APOLOGY_MARKERS
                .iter()
                .map(|marker| marker.to_string())
                .collect(),
        }
    }

    /// Configured spaces, or the built-in list when none are configured.
    pub fn space_directory(&self) -> SpaceDirectory {
        if self.spaces.is_empty() {
            SpaceDirectory::builtin()
        } else {
            SpaceDirectory::new(self.spaces.clone())
        }
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), String> {
        let value = value.trim();
        if value.is_empty() {
            return Err(format!("A value is required for '{key}'"));
        }
        match key {
            "base-url" => self.base_url = Some(value.to_string()),
            "language" => self.language = Some(value.to_ascii_uppercase()),
            "output-dir" => self.output_dir = Some(value.to_string()),
            "jobs" => {
                let jobs = value
                    .parse::<usize>()
                    .ok()
                    .filter(|jobs| *jobs > 0)
                    .ok_or_else(|| format!("'jobs' must be a positive integer, got '{value}'"))?;
                self.jobs = Some(jobs);
            }
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }

    pub fn unset_value(&mut self, key: &str) -> Result<(), String> {
        match key {
            "base-url" => self.base_url = None,
            "language" => self.language = None,
            "output-dir" => self.output_dir = None,
            "jobs" => self.jobs = None,
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }

    pub fn print_all(&self) {
        println!("Current configuration:");
        match &self.base_url {
            Some(url) => println!("  base-url: {url}"),
            None => println!("  base-url: (unset, using {DEFAULT_BASE_URL})"),
        }
        match &self.language {
            Some(language) => println!("  language: {language}"),
            None => println!("  language: (unset, using {DEFAULT_LANGUAGE})"),
        }
        match &self.output_dir {
            Some(dir) => println!("  output-dir: {dir}"),
            None => println!("  output-dir: (unset, using {DEFAULT_OUTPUT_DIR})"),
        }
        match self.jobs {
            Some(jobs) => println!("  jobs: {jobs}"),
            None => println!("  jobs: (unset, using 1)"),
        }
        if self.spaces.is_empty() {
            println!("  spaces: (none set, using built-in list)");
        } else {
            println!("  spaces:");
            for space in &self.spaces {
                println!("    {}: {}", space.id, space.name);
            }
        }
    }
}

fn unknown_key(key: &str) -> String {
    format!(
        "Unknown config key: {key} (expected one of: {})",
        CONFIG_KEYS.join(", ")
    )
}

pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("ai", "slangit", "slangit")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::spaces::SpaceId;
    use tempfile::TempDir;

    #[test]
    fn test_load_nonexistent_config() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config_path = temp_dir.path().join("nonexistent_config.toml");

        let config = Config::load_from_path(&config_path).expect("Failed to load config");

        assert_eq!(config, Config::default());
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert_eq!(config.language(), "EN");
        assert_eq!(config.jobs(), 1);
        assert_eq!(config.apology_markers(), vec!["sorry".to_string()]);
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let config = Config {
            base_url: Some("http://localhost:9000/api".to_string()),
            jobs: Some(3),
            spaces: vec![SpaceEntry::new(7, "Seven")],
            ..Config::default()
        };
        config.save_to_path(&config_path).expect("Failed to save config");

        let loaded = Config::load_from_path(&config_path).expect("Failed to load config");
        assert_eq!(loaded, config);
        assert_eq!(loaded.space_directory().display_name(SpaceId(7)), "Seven");
    }

    #[test]
    fn test_save_replaces_existing_file_without_leftovers() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "language = \"FR\"\njobs = 9\n").expect("seed config");

        let config = Config {
            language: Some("AR".to_string()),
            ..Config::default()
        };
        config.save_to_path(&config_path).expect("Failed to save config");

        let loaded = Config::load_from_path(&config_path).expect("Failed to load config");
        assert_eq!(loaded.language(), "AR");
        assert_eq!(loaded.jobs, None);

        let names: Vec<_> = fs::read_dir(temp_dir.path())
            .expect("read temp dir")
            .map(|entry| entry.expect("dir entry").file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("config.toml")]);
    }

    #[test]
    fn test_spaces_parse_from_toml() {
        let config: Config = toml::from_str(
            r#"
            base_url = "https://example.test/api"

            [[spaces]]
            id = 12
            name = "Twelve"

            [[spaces]]
            id = 13
            name = "Thirteen"
            "#,
        )
        .expect("config should parse");

        let directory = config.space_directory();
        assert_eq!(directory.len(), 2);
        assert_eq!(directory.entries()[1].id, SpaceId(13));
    }

    #[test]
    fn test_empty_spaces_fall_back_to_builtin() {
        let directory = Config::default().space_directory();
        assert_eq!(directory, SpaceDirectory::builtin());
    }

    #[test]
    fn test_set_and_unset_values() {
        let mut config = Config::default();
        config.set_value("language", "ar").unwrap();
        config.set_value("jobs", "4").unwrap();
        config.set_value("output-dir", "out").unwrap();
        assert_eq!(config.language(), "AR");
        assert_eq!(config.jobs(), 4);
        assert_eq!(config.output_dir(), PathBuf::from("out"));

        config.unset_value("language").unwrap();
        assert_eq!(config.language(), "EN");
    }

    #[test]
    fn test_set_rejects_bad_input() {
        let mut config = Config::default();
        assert!(config.set_value("jobs", "0").is_err());
        assert!(config.set_value("jobs", "many").is_err());
        assert!(config.set_value("colour", "blue").is_err());
        assert!(config.set_value("base-url", "  ").is_err());
        assert!(config.unset_value("colour").is_err());
    }

    #[test]
    fn test_explicit_empty_markers_disable_heuristic() {
        let config = Config {
            apology_markers: Some(Vec::new()),
            ..Config::default()
        };
        assert!(config.apology_markers().is_empty());
    }
}
