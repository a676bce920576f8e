use std::sync::Arc;

use devtrack_charts::{
    aggregate_chart, area_chart, faceted_bar_chart, line_chart, ChartOptions, ChartSpec,
};
use devtrack_core::{
    ContributorRecord, DashboardConfig, DevtrackError, EventRecord, TagMatch, TrackerConfig,
};
use devtrack_data::cache::LoadCache;
use devtrack_data::loader::MetadataTable;
use devtrack_pulse::aggregate::aggregate_contributors;
use devtrack_pulse::filter::{filter_by_projects, filter_by_tags, filter_by_title_set};
use serde::{Deserialize, Serialize};

use crate::view::{DashboardCharts, DashboardView};

const CONTRIBUTORS_TITLE: &str = "Monthly Developer Count";
const EVENTS_TITLE: &str = "Monthly GitHub Event Counts";

/// The two selector values driving a render pass.
///
/// # Examples
///
/// ```
/// use devtrack_dashboard::Selection;
///
/// let selection = Selection::new(["Ethereum"], ["DEFI", "NFT"]);
/// assert_eq!(selection.tag_phrase(), "DEFI or NFT");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    /// Selected project titles.
    pub projects: Vec<String>,
    /// Selected tags.
    pub tags: Vec<String>,
}

impl Selection {
    /// Build a selection from any iterables of names, kept as given.
    pub fn new<P, T>(projects: P, tags: T) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        T: IntoIterator,
        T::Item: Into<String>,
    {
        Self {
            projects: projects.into_iter().map(Into::into).collect(),
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    /// Selected tags joined with `" or "`, as used in chart titles.
    pub fn tag_phrase(&self) -> String {
        self.tags.join(" or ")
    }
}

/// Loaded tables plus dashboard settings, shared by every render pass.
///
/// # Examples
///
/// ```no_run
/// use devtrack_core::TrackerConfig;
/// use devtrack_dashboard::DashboardContext;
/// use devtrack_data::cache::LoadCache;
///
/// let cache = LoadCache::new();
/// let context = DashboardContext::load(&TrackerConfig::default(), &cache).unwrap();
/// let view = context.render(&context.default_selection()).unwrap();
/// println!("{view}");
/// ```
#[derive(Debug, Clone)]
pub struct DashboardContext {
    settings: DashboardConfig,
    tag_match: TagMatch,
    metadata: Arc<MetadataTable>,
    contributors: Arc<Vec<ContributorRecord>>,
    events: Arc<Vec<EventRecord>>,
}

impl DashboardContext {
    /// Load the three tables named by `config` through `cache`.
    ///
    /// # Errors
    ///
    /// Propagates any loader error; a failed load aborts construction.
    pub fn load(config: &TrackerConfig, cache: &LoadCache) -> Result<Self, DevtrackError> {
        let data = &config.data;
        let metadata = cache.metadata(&data.metadata)?;
        let contributors = cache.contributors(&data.contributors)?;
        let events = cache.events(&data.events, &config.dashboard.event_types)?;
        tracing::debug!(
            projects = metadata.projects().len(),
            tags = metadata.tags().len(),
            contributor_rows = contributors.len(),
            event_rows = events.len(),
            "dashboard context ready"
        );
        Ok(Self::from_tables(config, metadata, contributors, events))
    }

    /// Build a context from tables that are already in memory.
    pub fn from_tables(
        config: &TrackerConfig,
        metadata: Arc<MetadataTable>,
        contributors: Arc<Vec<ContributorRecord>>,
        events: Arc<Vec<EventRecord>>,
    ) -> Self {
        Self {
            settings: config.dashboard.clone(),
            tag_match: config.filter.tag_match,
            metadata,
            contributors,
            events,
        }
    }

    /// Project selector options, sorted.
    pub fn projects(&self) -> &[String] {
        self.metadata.projects()
    }

    /// Tag selector options, upper-cased and sorted.
    pub fn tags(&self) -> &[String] {
        self.metadata.tags()
    }

    /// The selection a fresh session starts with.
    ///
    /// Default projects not present in the project list are dropped. The
    /// default tags are `default_tags` when set, otherwise the single tag at
    /// `default_tag_index` of the sorted tag list, if there is one.
    pub fn default_selection(&self) -> Selection {
        let projects = self
            .settings
            .default_projects
            .iter()
            .filter_map(|p| {
                let resolved = self.resolve_project(p);
                if resolved.is_none() {
                    tracing::warn!(project = %p, "default project not found in metadata");
                }
                resolved
            })
            .collect();

        let tags = if self.settings.default_tags.is_empty() {
            self.settings
                .default_tag_index
                .and_then(|i| self.tags().get(i))
                .cloned()
                .into_iter()
                .collect()
        } else {
            self.settings
                .default_tags
                .iter()
                .map(|t| t.trim().to_uppercase())
                .collect()
        };

        Selection { projects, tags }
    }

    /// Canonical spelling of a project title, matched case-insensitively.
    ///
    /// Returns `None` if no project has that title.
    pub fn resolve_project(&self, name: &str) -> Option<String> {
        let name = name.trim();
        self.projects()
            .iter()
            .find(|p| p.as_str() == name)
            .or_else(|| self.projects().iter().find(|p| p.eq_ignore_ascii_case(name)))
            .cloned()
    }

    /// Run one full pass: filter, aggregate, and build all four charts.
    ///
    /// Unknown projects and tags are logged and match nothing.
    ///
    /// # Errors
    ///
    /// Returns [`DevtrackError::Pattern`] if a selection cannot be compiled.
    pub fn render(&self, selection: &Selection) -> Result<DashboardView, DevtrackError> {
        self.warn_unknown(selection)?;
        let options = ChartOptions {
            log_y: self.settings.log_y,
        };

        let project_contributors = filter_by_projects(&self.contributors, &selection.projects)?;
        let mut project_events = filter_by_title_set(&self.events, &selection.projects);
        project_events.sort_by_key(|r| r.date);

        let mut tagged_projects =
            filter_by_tags(self.metadata.rows(), &selection.tags, self.tag_match)?;
        let mut seen = std::collections::HashSet::new();
        tagged_projects.retain(|t| seen.insert(t.clone()));

        let tagged_contributors = filter_by_title_set(&self.contributors, &tagged_projects);
        let tagged_total = aggregate_contributors(&tagged_contributors);

        let phrase = selection.tag_phrase();
        let charts = DashboardCharts {
            contributors: line_chart(&project_contributors, CONTRIBUTORS_TITLE, options),
            events: faceted_bar_chart(&self.events, &selection.projects, EVENTS_TITLE, options),
            tagged_total: aggregate_chart(
                &tagged_total,
                &format!("Total Monthly Developer Count across all protocols tagged {phrase}"),
                options,
            ),
            tagged_area: area_chart(
                &tagged_contributors,
                &format!("Monthly Developer Count by Protocols tagged {phrase}"),
                options,
            ),
        };

        tracing::debug!(
            projects = selection.projects.len(),
            tags = selection.tags.len(),
            tagged_projects = tagged_projects.len(),
            points = charts.iter().map(ChartSpec::point_count).sum::<usize>(),
            "render pass complete"
        );

        Ok(DashboardView {
            selection: selection.clone(),
            project_contributors,
            project_events,
            tagged_projects,
            tagged_contributors,
            tagged_total,
            charts,
        })
    }

    fn warn_unknown(&self, selection: &Selection) -> Result<(), DevtrackError> {
        for project in &selection.projects {
            if self.resolve_project(project).is_none() {
                tracing::warn!(project = %project, "unknown project selected; it matches nothing");
            }
        }
        for tag in self.unmatched_tags(selection)? {
            tracing::warn!(tag = %tag, "selected tag matches no project");
        }
        Ok(())
    }

    /// Selected tags that match no metadata row on their own under the
    /// configured match mode.
    fn unmatched_tags<'s>(&self, selection: &'s Selection) -> Result<Vec<&'s str>, DevtrackError> {
        let mut unmatched = Vec::new();
        for tag in &selection.tags {
            if filter_by_tags(self.metadata.rows(), &[tag], self.tag_match)?.is_empty() {
                unmatched.push(tag.as_str());
            }
        }
        Ok(unmatched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use devtrack_core::{EventKind, ProjectMeta};

    fn month(m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, m, 1).unwrap()
    }

    fn contrib(title: &str, m: u32, count: u64) -> ContributorRecord {
        ContributorRecord {
            title: title.into(),
            date: month(m),
            contributor_count: count,
        }
    }

    fn event(title: &str, m: u32, kind: EventKind, count: u64) -> EventRecord {
        EventRecord {
            title: title.into(),
            date: month(m),
            kind,
            event_count: count,
        }
    }

    fn meta(title: &str, tags: Option<&str>) -> ProjectMeta {
        ProjectMeta {
            title: title.into(),
            tags: tags.map(Into::into),
        }
    }

    fn context(config: &TrackerConfig) -> DashboardContext {
        let metadata = MetadataTable::from_rows(vec![
            meta("Ethereum", Some("Layer 1, Smart Contracts")),
            meta("Aave", Some("DeFi, Lending")),
            meta("Axie Infinity", Some("GameDeFi, NFT")),
            meta("Bitcoin", None),
        ]);
        let contributors = vec![
            contrib("Ethereum", 1, 412),
            contrib("Ethereum", 2, 398),
            contrib("Aave", 1, 30),
            contrib("Aave", 2, 28),
            contrib("Axie Infinity", 2, 7),
            contrib("Bitcoin", 1, 60),
        ];
        let events = vec![
            event("Ethereum", 2, EventKind::Push, 1100),
            event("Ethereum", 1, EventKind::Push, 1200),
            event("Bitcoin", 1, EventKind::Fork, 40),
        ];
        DashboardContext::from_tables(
            config,
            Arc::new(metadata),
            Arc::new(contributors),
            Arc::new(events),
        )
    }

    #[test]
    fn default_selection_uses_configured_index() {
        let mut config = TrackerConfig::default();
        config.dashboard.default_tag_index = Some(1);
        let ctx = context(&config);
        // DEFI, GAMEDEFI, LAYER 1, LENDING, NFT, SMART CONTRACTS
        assert_eq!(ctx.default_selection(), Selection::new(["Ethereum"], ["GAMEDEFI"]));
    }

    #[test]
    fn default_tag_index_out_of_range_selects_nothing() {
        let ctx = context(&TrackerConfig::default());
        let selection = ctx.default_selection();
        assert_eq!(selection.projects, vec!["Ethereum"]);
        assert!(selection.tags.is_empty());
    }

    #[test]
    fn default_tags_override_index() {
        let mut config = TrackerConfig::default();
        config.dashboard.default_tags = vec!["defi".into()];
        config.dashboard.default_projects = vec!["aave".into(), "Cardano".into()];
        let selection = context(&config).default_selection();
        assert_eq!(selection, Selection::new(["Aave"], ["DEFI"]));
    }

    #[test]
    fn render_builds_all_four_charts() {
        let ctx = context(&TrackerConfig::default());
        let view = ctx
            .render(&Selection::new(["Ethereum"], ["DEFI"]))
            .unwrap();

        assert_eq!(view.project_contributors.len(), 2);
        assert_eq!(view.project_events.len(), 2);
        assert_eq!(view.project_events[0].date, month(1));
        assert_eq!(view.tagged_projects, vec!["Aave", "Axie Infinity"]);
        assert_eq!(view.tagged_contributors.len(), 3);
        assert_eq!(view.tagged_total.len(), 2);
        assert_eq!(view.tagged_total[1].value, 35);

        assert_eq!(view.charts.contributors.title, "Monthly Developer Count");
        assert_eq!(view.charts.events.title, "Monthly GitHub Event Counts");
        assert_eq!(
            view.charts.tagged_total.title,
            "Total Monthly Developer Count across all protocols tagged DEFI"
        );
        assert_eq!(
            view.charts.tagged_area.title,
            "Monthly Developer Count by Protocols tagged DEFI"
        );
        assert_eq!(view.charts.tagged_area.traces.len(), 2);
    }

    #[test]
    fn word_mode_narrows_tag_matches() {
        let mut config = TrackerConfig::default();
        config.filter.tag_match = TagMatch::Word;
        let view = context(&config)
            .render(&Selection::new(Vec::<String>::new(), ["DEFI"]))
            .unwrap();
        assert_eq!(view.tagged_projects, vec!["Aave"]);
    }

    #[test]
    fn empty_selection_renders_empty_charts() {
        let ctx = context(&TrackerConfig::default());
        let view = ctx.render(&Selection::default()).unwrap();
        assert!(view.project_contributors.is_empty());
        assert!(view.tagged_projects.is_empty());
        assert!(view.charts.contributors.is_empty());
        assert!(view.charts.events.is_empty());
        assert!(view.charts.tagged_total.is_empty());
        assert!(view.charts.tagged_area.is_empty());
    }

    #[test]
    fn unknown_names_match_nothing() {
        let ctx = context(&TrackerConfig::default());
        let view = ctx
            .render(&Selection::new(["Cardano"], ["ZK"]))
            .unwrap();
        assert!(view.project_contributors.is_empty());
        assert!(view.tagged_projects.is_empty());
    }

    #[test]
    fn project_filter_ignores_case_but_event_facets_do_not() {
        let ctx = context(&TrackerConfig::default());
        let view = ctx.render(&Selection::new(["ethereum"], ["NFT"])).unwrap();
        assert_eq!(view.project_contributors.len(), 2);
        assert!(view.project_events.is_empty());
        assert!(view.charts.events.is_empty());
    }

    #[test]
    fn resolve_project_prefers_exact_spelling() {
        let ctx = context(&TrackerConfig::default());
        assert_eq!(ctx.resolve_project(" bitcoin "), Some("Bitcoin".into()));
        assert_eq!(ctx.resolve_project("Solana"), None);
    }

    #[test]
    fn partial_tags_are_not_reported_as_unmatched() {
        let selection = Selection::new(Vec::<String>::new(), ["DEF", "nft", "NFTS", "ZK"]);

        let ctx = context(&TrackerConfig::default());
        assert_eq!(ctx.unmatched_tags(&selection).unwrap(), vec!["NFTS", "ZK"]);

        let mut config = TrackerConfig::default();
        config.filter.tag_match = TagMatch::Word;
        let ctx = context(&config);
        assert_eq!(ctx.unmatched_tags(&selection).unwrap(), vec!["DEF", "NFTS", "ZK"]);
    }
}
