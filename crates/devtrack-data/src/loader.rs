//! CSV loading for the three input datasets.
//!
//! Every loader is all-or-nothing: a missing file, a missing required column,
//! or a single malformed row aborts the load with an error naming the file
//! and line. Extra columns are ignored.

use std::collections::BTreeSet;
use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::StringRecord;
use devtrack_core::{ContributorRecord, DevtrackError, EventKind, EventRecord, ProjectMeta};

use crate::dates::parse_date;
use crate::tags::{extract_tags, normalize_tags};

/// Cell values treated as an empty tag field.
const NULL_MARKERS: &[&str] = &["none", "nan", "na", "n/a", "null"];

/// The project metadata table together with the selector options derived
/// from it.
///
/// # Examples
///
/// ```
/// use devtrack_core::ProjectMeta;
/// use devtrack_data::loader::MetadataTable;
///
/// let table = MetadataTable::from_rows(vec![
///     ProjectMeta { title: "Uniswap".into(), tags: Some("DeFi, DEX".into()) },
///     ProjectMeta { title: "Aave".into(), tags: None },
/// ]);
/// assert_eq!(table.projects(), ["Aave", "Uniswap"]);
/// assert_eq!(table.tags(), ["DEFI", "DEX"]);
/// ```
#[derive(Debug, Clone)]
pub struct MetadataTable {
    rows: Vec<ProjectMeta>,
    projects: Vec<String>,
    tags: Vec<String>,
}

impl MetadataTable {
    /// Build the table and derive the sorted project list and the
    /// upper-cased tag set.
    pub fn from_rows(rows: Vec<ProjectMeta>) -> Self {
        let projects: BTreeSet<String> = rows.iter().map(|r| r.title.clone()).collect();
        let mut table = Self {
            rows,
            projects: projects.into_iter().collect(),
            tags: Vec::new(),
        };
        table.tags = normalize_tags(extract_tags(table.tag_column()));
        table
    }

    /// Metadata rows in file order.
    pub fn rows(&self) -> &[ProjectMeta] {
        &self.rows
    }

    /// Distinct project titles, sorted.
    pub fn projects(&self) -> &[String] {
        &self.projects
    }

    /// Distinct upper-cased tags, sorted.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// The raw `tags` column, one entry per row.
    pub fn tag_column(&self) -> impl Iterator<Item = Option<&str>> + '_ {
        self.rows.iter().map(|r| r.tags.as_deref())
    }

    /// Number of metadata rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// `true` if the file had no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Load the project metadata file (`title`, `tags`).
///
/// # Errors
///
/// Returns [`DevtrackError::FileNotFound`] if `path` does not exist,
/// [`DevtrackError::MissingColumn`] if either column is absent, and
/// [`DevtrackError::InvalidRow`] for a row with an empty title.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use devtrack_data::loader::load_metadata;
///
/// let meta = load_metadata(Path::new("data/2022-10-18-project_df.csv")).unwrap();
/// println!("{} projects, {} tags", meta.projects().len(), meta.tags().len());
/// ```
pub fn load_metadata(path: &Path) -> Result<MetadataTable, DevtrackError> {
    let mut reader = open_reader(path)?;
    let columns = Columns::locate(&mut reader, path, &["title", "tags"])?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| csv_error(path, &e))?;
        let row = RowContext::new(path, &record);
        let title = row.title(columns.index(0))?;
        let tags = record
            .get(columns.index(1))
            .map(str::trim)
            .filter(|s| !is_null_marker(s))
            .map(String::from);
        rows.push(ProjectMeta { title, tags });
    }

    tracing::debug!(path = %path.display(), rows = rows.len(), "loaded project metadata");
    Ok(MetadataTable::from_rows(rows))
}

/// Load the monthly contributor stats file (`title`, `date`,
/// `contributor_count`).
///
/// # Errors
///
/// Returns [`DevtrackError::InvalidRow`] for an unparseable date or count,
/// plus the file and column errors described on [`load_metadata`].
pub fn load_contributors(path: &Path) -> Result<Vec<ContributorRecord>, DevtrackError> {
    let mut reader = open_reader(path)?;
    let columns = Columns::locate(&mut reader, path, &["title", "date", "contributor_count"])?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| csv_error(path, &e))?;
        let row = RowContext::new(path, &record);
        rows.push(ContributorRecord {
            title: row.title(columns.index(0))?,
            date: row.date(columns.index(1))?,
            contributor_count: row.count(columns.index(2), "contributor_count")?,
        });
    }

    tracing::debug!(path = %path.display(), rows = rows.len(), "loaded contributor stats");
    Ok(rows)
}

/// Load the monthly event counts file (`title`, `date`, `type`,
/// `event_count`), keeping only rows whose `type` is in `kinds`.
///
/// Every row is validated before the kind filter, so a malformed row fails
/// the load even when its kind would have been dropped. Rows with a `type`
/// outside the recognized [`EventKind`] set are skipped.
///
/// # Errors
///
/// Same as [`load_contributors`].
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use devtrack_core::EventKind;
/// use devtrack_data::loader::load_events;
///
/// let events = load_events(
///     Path::new("data/2022-10-18-gharchive_event_counts_by_month.csv"),
///     &EventKind::DEFAULT_SET,
/// )
/// .unwrap();
/// assert!(events.iter().all(|e| EventKind::DEFAULT_SET.contains(&e.kind)));
/// ```
pub fn load_events(path: &Path, kinds: &[EventKind]) -> Result<Vec<EventRecord>, DevtrackError> {
    let mut reader = open_reader(path)?;
    let columns = Columns::locate(&mut reader, path, &["title", "date", "type", "event_count"])?;

    let mut rows = Vec::new();
    let mut unrecognized = 0usize;
    for record in reader.records() {
        let record = record.map_err(|e| csv_error(path, &e))?;
        let row = RowContext::new(path, &record);
        let title = row.title(columns.index(0))?;
        let date = row.date(columns.index(1))?;
        let event_count = row.count(columns.index(3), "event_count")?;

        let Ok(kind) = row.field(columns.index(2)).parse::<EventKind>() else {
            unrecognized += 1;
            continue;
        };
        if kinds.contains(&kind) {
            rows.push(EventRecord {
                title,
                date,
                kind,
                event_count,
            });
        }
    }

    if unrecognized > 0 {
        tracing::debug!(
            path = %path.display(),
            skipped = unrecognized,
            "skipped rows with unrecognized event types"
        );
    }
    tracing::debug!(path = %path.display(), rows = rows.len(), "loaded event counts");
    Ok(rows)
}

fn open_reader(path: &Path) -> Result<csv::Reader<File>, DevtrackError> {
    if !path.exists() {
        return Err(DevtrackError::FileNotFound(path.to_path_buf()));
    }
    csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| csv_error(path, &e))
}

fn csv_error(path: &Path, err: &csv::Error) -> DevtrackError {
    DevtrackError::Csv {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

fn is_null_marker(cell: &str) -> bool {
    cell.is_empty() || NULL_MARKERS.iter().any(|m| cell.eq_ignore_ascii_case(m))
}

/// Header positions of the required columns, in request order.
struct Columns(Vec<usize>);

impl Columns {
    fn locate(
        reader: &mut csv::Reader<File>,
        path: &Path,
        required: &[&str],
    ) -> Result<Self, DevtrackError> {
        let headers = reader.headers().map_err(|e| csv_error(path, &e))?.clone();
        let mut indices = Vec::with_capacity(required.len());
        for name in required {
            let idx = headers
                .iter()
                .position(|h| h.trim() == *name)
                .ok_or_else(|| DevtrackError::MissingColumn {
                    path: path.to_path_buf(),
                    column: (*name).to_string(),
                })?;
            indices.push(idx);
        }
        Ok(Self(indices))
    }

    fn index(&self, n: usize) -> usize {
        self.0[n]
    }
}

struct RowContext<'a> {
    path: &'a Path,
    record: &'a StringRecord,
}

impl<'a> RowContext<'a> {
    fn new(path: &'a Path, record: &'a StringRecord) -> Self {
        Self { path, record }
    }

    fn field(&self, idx: usize) -> &'a str {
        self.record.get(idx).unwrap_or_default().trim()
    }

    fn invalid(&self, message: String) -> DevtrackError {
        DevtrackError::InvalidRow {
            path: PathBuf::from(self.path),
            line: self.record.position().map_or(0, |p| p.line()),
            message,
        }
    }

    fn title(&self, idx: usize) -> Result<String, DevtrackError> {
        let title = self.field(idx);
        if title.is_empty() {
            return Err(self.invalid("empty `title`".into()));
        }
        Ok(title.to_string())
    }

    fn date(&self, idx: usize) -> Result<NaiveDate, DevtrackError> {
        let raw = self.field(idx);
        parse_date(raw).ok_or_else(|| self.invalid(format!("unparseable date `{raw}`")))
    }

    fn count(&self, idx: usize, column: &str) -> Result<u64, DevtrackError> {
        let raw = self.field(idx);
        parse_count(raw).ok_or_else(|| self.invalid(format!("invalid `{column}` value `{raw}`")))
    }
}

/// Parse a non-negative integer count, accepting integral floats (`5.0`)
/// as written by dataframe exports.
fn parse_count(raw: &str) -> Option<u64> {
    if let Ok(n) = raw.parse::<u64>() {
        return Some(n);
    }
    let f = raw.parse::<f64>().ok()?;
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 {
        Some(f as u64)
    } else {
        None
    }
}
