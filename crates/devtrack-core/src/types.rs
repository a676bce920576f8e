use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Rows that belong to a single project, identified by its title.
///
/// The filter engine selects rows through this trait so the same code path
/// serves metadata, contributor and event tables.
pub trait Titled {
    /// Project title this row belongs to.
    fn title(&self) -> &str;
}

/// Rows that carry a calendar month.
pub trait Dated {
    /// Month of the observation (stored as a calendar date).
    fn date(&self) -> NaiveDate;
}

/// One row of the project metadata file.
///
/// # Examples
///
/// ```
/// use devtrack_core::ProjectMeta;
///
/// let meta = ProjectMeta {
///     title: "Uniswap".into(),
///     tags: Some("DeFi, DEX".into()),
/// };
/// assert_eq!(meta.tags.as_deref(), Some("DeFi, DEX"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMeta {
    /// Unique project title.
    pub title: String,
    /// Comma-delimited free-text tags; `None` when the cell was empty.
    pub tags: Option<String>,
}

/// Monthly distinct-contributor count for one project.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use devtrack_core::ContributorRecord;
///
/// let rec = ContributorRecord {
///     title: "Ethereum".into(),
///     date: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
///     contributor_count: 412,
/// };
/// assert_eq!(rec.contributor_count, 412);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributorRecord {
    /// Project title.
    pub title: String,
    /// Month of the observation.
    pub date: NaiveDate,
    /// Number of distinct contributors that month.
    pub contributor_count: u64,
}

/// Monthly count of one GitHub event kind for one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    /// Project title.
    pub title: String,
    /// Month of the observation.
    pub date: NaiveDate,
    /// GitHub event kind.
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Number of events of `kind` that month.
    pub event_count: u64,
}

/// One point of an aggregated time series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    /// Month of the point.
    pub date: NaiveDate,
    /// Summed value for that month.
    pub value: u64,
}

impl Titled for ProjectMeta {
    fn title(&self) -> &str {
        &self.title
    }
}

impl Titled for ContributorRecord {
    fn title(&self) -> &str {
        &self.title
    }
}

impl Titled for EventRecord {
    fn title(&self) -> &str {
        &self.title
    }
}

impl Dated for ContributorRecord {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl Dated for EventRecord {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

/// GitHub event kinds recognized in the event counts file.
///
/// See <https://docs.github.com/en/rest/using-the-rest-api/github-event-types>.
///
/// # Examples
///
/// ```
/// use devtrack_core::EventKind;
///
/// let kind: EventKind = "PushEvent".parse().unwrap();
/// assert_eq!(kind, EventKind::Push);
/// assert_eq!(kind.to_string(), "PushEvent");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "CommitCommentEvent")]
    CommitComment,
    #[serde(rename = "CreateEvent")]
    Create,
    #[serde(rename = "DeleteEvent")]
    Delete,
    #[serde(rename = "ForkEvent")]
    Fork,
    #[serde(rename = "GollumEvent")]
    Gollum,
    #[serde(rename = "IssueCommentEvent")]
    IssueComment,
    #[serde(rename = "IssuesEvent")]
    Issues,
    #[serde(rename = "PullRequestEvent")]
    PullRequest,
    #[serde(rename = "PullRequestReviewCommentEvent")]
    PullRequestReviewComment,
    #[serde(rename = "PullRequestReviewEvent")]
    PullRequestReview,
    #[serde(rename = "PushEvent")]
    Push,
    #[serde(rename = "ReleaseEvent")]
    Release,
    #[serde(rename = "WatchEvent")]
    Watch,
    #[serde(rename = "MemberEvent")]
    Member,
    #[serde(rename = "PublicEvent")]
    Public,
}

impl EventKind {
    /// Every recognized kind, in the order GitHub documents them.
    pub const ALL: [EventKind; 15] = [
        EventKind::CommitComment,
        EventKind::Create,
        EventKind::Delete,
        EventKind::Fork,
        EventKind::Gollum,
        EventKind::IssueComment,
        EventKind::Issues,
        EventKind::PullRequest,
        EventKind::PullRequestReviewComment,
        EventKind::PullRequestReview,
        EventKind::Push,
        EventKind::Release,
        EventKind::Watch,
        EventKind::Member,
        EventKind::Public,
    ];

    /// Kinds kept when loading the event table, sorted by name.
    ///
    /// # Examples
    ///
    /// ```
    /// use devtrack_core::EventKind;
    ///
    /// let names: Vec<_> = EventKind::DEFAULT_SET.iter().map(|k| k.as_str()).collect();
    /// let mut sorted = names.clone();
    /// sorted.sort();
    /// assert_eq!(names, sorted);
    /// ```
    pub const DEFAULT_SET: [EventKind; 5] = [
        EventKind::Fork,
        EventKind::Issues,
        EventKind::PullRequest,
        EventKind::Push,
        EventKind::Watch,
    ];

    /// The name used in the data files.
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::CommitComment => "CommitCommentEvent",
            EventKind::Create => "CreateEvent",
            EventKind::Delete => "DeleteEvent",
            EventKind::Fork => "ForkEvent",
            EventKind::Gollum => "GollumEvent",
            EventKind::IssueComment => "IssueCommentEvent",
            EventKind::Issues => "IssuesEvent",
            EventKind::PullRequest => "PullRequestEvent",
            EventKind::PullRequestReviewComment => "PullRequestReviewCommentEvent",
            EventKind::PullRequestReview => "PullRequestReviewEvent",
            EventKind::Push => "PushEvent",
            EventKind::Release => "ReleaseEvent",
            EventKind::Watch => "WatchEvent",
            EventKind::Member => "MemberEvent",
            EventKind::Public => "PublicEvent",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown event type: {s}"))
    }
}

/// Output format for CLI subcommands.
///
/// Implements [`FromStr`] so it can be used directly with `clap` argument parsing.
///
/// # Examples
///
/// ```
/// use devtrack_core::OutputFormat;
///
/// let fmt: OutputFormat = "json".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Json);
///
/// let fmt: OutputFormat = "md".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Markdown);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable tables and summaries.
    #[default]
    Text,
    /// Machine-readable JSON with camelCase keys.
    Json,
    /// Markdown-formatted output.
    Markdown,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}
