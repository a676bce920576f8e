use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::DevtrackError;
use crate::types::EventKind;

/// Top-level configuration loaded from `.devtrack.toml`.
///
/// Supports layered resolution: CLI flags > local config > defaults.
///
/// # Examples
///
/// ```
/// use devtrack_core::TrackerConfig;
///
/// let config = TrackerConfig::default();
/// assert_eq!(config.dashboard.default_projects, vec!["Ethereum"]);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Locations of the three input datasets.
    #[serde(default)]
    pub data: DataConfig,
    /// Selector defaults and chart options.
    #[serde(default)]
    pub dashboard: DashboardConfig,
    /// Filter engine behavior.
    #[serde(default)]
    pub filter: FilterConfig,
}

impl TrackerConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DevtrackError::Io`] if the file cannot be read, or
    /// [`DevtrackError::Toml`] if the content is not valid TOML.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use devtrack_core::TrackerConfig;
    /// use std::path::Path;
    ///
    /// let config = TrackerConfig::from_file(Path::new(".devtrack.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, DevtrackError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`DevtrackError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use devtrack_core::TrackerConfig;
    ///
    /// let toml = r#"
    /// [dashboard]
    /// default_projects = ["Bitcoin", "Solana"]
    /// "#;
    /// let config = TrackerConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.dashboard.default_projects.len(), 2);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, DevtrackError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }
}

/// Paths of the input CSV files.
///
/// # Examples
///
/// ```
/// use devtrack_core::DataConfig;
///
/// let config = DataConfig::default();
/// assert!(config.metadata.ends_with("2022-10-18-project_df.csv"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Project metadata file (`title`, `tags`).
    #[serde(default = "default_metadata_path")]
    pub metadata: PathBuf,
    /// Monthly contributor stats file.
    #[serde(default = "default_contributors_path")]
    pub contributors: PathBuf,
    /// Monthly GitHub event counts file.
    #[serde(default = "default_events_path")]
    pub events: PathBuf,
}

fn default_metadata_path() -> PathBuf {
    PathBuf::from("./data/2022-10-18-project_df.csv")
}

fn default_contributors_path() -> PathBuf {
    PathBuf::from("./data/2022-10-18-contributor_stats_by_month.csv")
}

fn default_events_path() -> PathBuf {
    PathBuf::from("./data/2022-10-18-gharchive_event_counts_by_month.csv")
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            metadata: default_metadata_path(),
            contributors: default_contributors_path(),
            events: default_events_path(),
        }
    }
}

impl DataConfig {
    /// Re-root every relative data path under `dir`.
    ///
    /// # Examples
    ///
    /// ```
    /// use devtrack_core::DataConfig;
    /// use std::path::Path;
    ///
    /// let config = DataConfig::default().rebased(Path::new("/srv/devtrack"));
    /// assert!(config.events.starts_with("/srv/devtrack"));
    /// ```
    pub fn rebased(&self, dir: &Path) -> Self {
        let rebase = |p: &PathBuf| {
            if p.is_absolute() {
                p.clone()
            } else {
                dir.join(p)
            }
        };
        Self {
            metadata: rebase(&self.metadata),
            contributors: rebase(&self.contributors),
            events: rebase(&self.events),
        }
    }
}

/// Selector defaults and chart options.
///
/// # Examples
///
/// ```
/// use devtrack_core::DashboardConfig;
///
/// let config = DashboardConfig::default();
/// assert_eq!(config.default_tag_index, Some(7));
/// assert!(!config.log_y);
/// assert_eq!(config.event_types.len(), 5);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Projects selected when a session starts (default: `["Ethereum"]`).
    #[serde(default = "default_projects")]
    pub default_projects: Vec<String>,
    /// Tags selected when a session starts. Takes precedence over
    /// `default_tag_index` when non-empty.
    #[serde(default)]
    pub default_tags: Vec<String>,
    /// Index into the sorted tag list used as the initial tag selection when
    /// `default_tags` is empty (default: 7).
    #[serde(default = "default_tag_index")]
    pub default_tag_index: Option<usize>,
    /// Event kinds kept when loading the event table.
    #[serde(default = "default_event_types")]
    pub event_types: Vec<EventKind>,
    /// Use a logarithmic y axis on every chart (default: false).
    #[serde(default)]
    pub log_y: bool,
}

fn default_projects() -> Vec<String> {
    vec!["Ethereum".into()]
}

fn default_tag_index() -> Option<usize> {
    Some(7)
}

fn default_event_types() -> Vec<EventKind> {
    EventKind::DEFAULT_SET.to_vec()
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            default_projects: default_projects(),
            default_tags: Vec::new(),
            default_tag_index: default_tag_index(),
            event_types: default_event_types(),
            log_y: false,
        }
    }
}

/// How a selected tag is matched against a project's tag field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagMatch {
    /// Unanchored substring match: `DEFI` also matches `GAMEDEFI`.
    #[default]
    Substring,
    /// Match only whole comma-separated tags: `DEFI` does not match
    /// `GAMEDEFI`.
    Word,
}

/// Filter engine behavior.
///
/// # Examples
///
/// ```
/// use devtrack_core::{FilterConfig, TagMatch};
///
/// assert_eq!(FilterConfig::default().tag_match, TagMatch::Substring);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Tag matching mode (default: `substring`).
    #[serde(default)]
    pub tag_match: TagMatch,
}
