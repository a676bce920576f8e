//! Line-oriented interactive session over a [`DashboardContext`].
//!
//! Each input line parses into an [`Interaction`]. Anything that changes the
//! selection, plus `show`, re-runs the whole render pass.

use std::str::FromStr;

use devtrack_core::DevtrackError;
use thiserror::Error;

use crate::context::{DashboardContext, Selection};
use crate::view::DashboardView;

/// Command reference printed by `help`.
pub const HELP: &str = "\
Commands:
  projects A, B        select exactly these projects
  tags X, Y            select exactly these tags
  add project A        add a project to the selection
  add tag X            add a tag to the selection
  remove project A     remove a project from the selection
  remove tag X         remove a tag from the selection
  clear projects|tags  empty one selector
  reset                restore the default selection
  show                 render the dashboard again
  list projects|tags   list the selector options
  help                 show this help
  quit                 leave the session";

/// A line that is not a valid session command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (type `help` for commands)")]
pub struct InteractionError {
    message: String,
}

impl InteractionError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Selector {
    Projects,
    Tags,
}

impl FromStr for Selector {
    type Err = InteractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "project" | "projects" => Ok(Selector::Projects),
            "tag" | "tags" => Ok(Selector::Tags),
            "" => Err(InteractionError::new("expected `projects` or `tags`")),
            other => Err(InteractionError::new(format!(
                "expected `projects` or `tags`, got `{other}`"
            ))),
        }
    }
}

/// One parsed input line.
///
/// # Examples
///
/// ```
/// use devtrack_dashboard::Interaction;
///
/// let cmd: Interaction = "projects Ethereum, Bitcoin".parse().unwrap();
/// assert_eq!(
///     cmd,
///     Interaction::SetProjects(vec!["Ethereum".into(), "Bitcoin".into()])
/// );
/// assert_eq!("q".parse::<Interaction>().unwrap(), Interaction::Quit);
/// assert!("frobnicate".parse::<Interaction>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    SetProjects(Vec<String>),
    SetTags(Vec<String>),
    AddProject(String),
    AddTag(String),
    RemoveProject(String),
    RemoveTag(String),
    ClearProjects,
    ClearTags,
    Reset,
    Show,
    ListProjects,
    ListTags,
    Help,
    Quit,
}

fn split_word(line: &str) -> (&str, &str) {
    let line = line.trim();
    match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    }
}

fn comma_list(rest: &str) -> Vec<String> {
    rest.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn required_name(rest: &str, verb: &str) -> Result<String, InteractionError> {
    let name = rest.trim();
    if name.is_empty() {
        Err(InteractionError::new(format!("`{verb}` needs a name")))
    } else {
        Ok(name.to_string())
    }
}

impl FromStr for Interaction {
    type Err = InteractionError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let (command, rest) = split_word(line);
        let interaction = match command.to_ascii_lowercase().as_str() {
            "projects" | "p" => Interaction::SetProjects(comma_list(rest)),
            "tags" | "t" => Interaction::SetTags(comma_list(rest)),
            "add" => {
                let (target, name) = split_word(rest);
                let name = required_name(name, "add")?;
                match target.parse()? {
                    Selector::Projects => Interaction::AddProject(name),
                    Selector::Tags => Interaction::AddTag(name),
                }
            }
            "remove" | "rm" => {
                let (target, name) = split_word(rest);
                let name = required_name(name, "remove")?;
                match target.parse()? {
                    Selector::Projects => Interaction::RemoveProject(name),
                    Selector::Tags => Interaction::RemoveTag(name),
                }
            }
            "clear" => match rest.parse()? {
                Selector::Projects => Interaction::ClearProjects,
                Selector::Tags => Interaction::ClearTags,
            },
            "list" | "ls" => match rest.parse()? {
                Selector::Projects => Interaction::ListProjects,
                Selector::Tags => Interaction::ListTags,
            },
            "reset" => Interaction::Reset,
            "show" => Interaction::Show,
            "help" | "?" => Interaction::Help,
            "quit" | "exit" | "q" => Interaction::Quit,
            "" => return Err(InteractionError::new("empty command")),
            other => return Err(InteractionError::new(format!("unknown command `{other}`"))),
        };
        Ok(interaction)
    }
}

/// What the caller should display after an interaction.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// A fresh render pass.
    Rendered(Box<DashboardView>),
    /// Selector options.
    Listing(Vec<String>),
    /// Print [`HELP`].
    Help,
    /// End the session.
    Quit,
}

/// Selection state carried between interactions.
pub struct Session<'a> {
    context: &'a DashboardContext,
    selection: Selection,
    passes: usize,
}

impl<'a> Session<'a> {
    /// Start a session on the context's default selection.
    pub fn new(context: &'a DashboardContext) -> Self {
        Self {
            context,
            selection: context.default_selection(),
            passes: 0,
        }
    }

    /// The selection the next render pass will use.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Number of render passes run so far.
    pub fn passes(&self) -> usize {
        self.passes
    }

    /// Run a render pass on the current selection.
    ///
    /// # Errors
    ///
    /// Propagates [`DashboardContext::render`] errors.
    pub fn render(&mut self) -> Result<DashboardView, DevtrackError> {
        self.passes += 1;
        self.context.render(&self.selection)
    }

    /// Apply one interaction, re-rendering if it changes the selection.
    ///
    /// # Errors
    ///
    /// Propagates [`DashboardContext::render`] errors.
    pub fn apply(&mut self, interaction: Interaction) -> Result<Outcome, DevtrackError> {
        match interaction {
            Interaction::SetProjects(names) => {
                self.selection.projects = Vec::new();
                for name in names {
                    self.add_project(&name);
                }
            }
            Interaction::SetTags(tags) => {
                self.selection.tags = Vec::new();
                for tag in tags {
                    self.add_tag(&tag);
                }
            }
            Interaction::AddProject(name) => self.add_project(&name),
            Interaction::AddTag(tag) => self.add_tag(&tag),
            Interaction::RemoveProject(name) => {
                let name = name.trim();
                self.selection
                    .projects
                    .retain(|p| !p.eq_ignore_ascii_case(name));
            }
            Interaction::RemoveTag(tag) => {
                let tag = tag.trim();
                self.selection.tags.retain(|t| !t.eq_ignore_ascii_case(tag));
            }
            Interaction::ClearProjects => self.selection.projects.clear(),
            Interaction::ClearTags => self.selection.tags.clear(),
            Interaction::Reset => self.selection = self.context.default_selection(),
            Interaction::Show => {}
            Interaction::ListProjects => {
                return Ok(Outcome::Listing(self.context.projects().to_vec()))
            }
            Interaction::ListTags => return Ok(Outcome::Listing(self.context.tags().to_vec())),
            Interaction::Help => return Ok(Outcome::Help),
            Interaction::Quit => return Ok(Outcome::Quit),
        }
        tracing::debug!(
            projects = ?self.selection.projects,
            tags = ?self.selection.tags,
            "selection changed"
        );
        Ok(Outcome::Rendered(Box::new(self.render()?)))
    }

    fn add_project(&mut self, name: &str) {
        let name = self
            .context
            .resolve_project(name)
            .unwrap_or_else(|| name.trim().to_string());
        if !self.selection.projects.contains(&name) {
            self.selection.projects.push(name);
        }
    }

    fn add_tag(&mut self, tag: &str) {
        let tag = tag.trim().to_uppercase();
        if !tag.is_empty() && !self.selection.tags.contains(&tag) {
            self.selection.tags.push(tag);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use chrono::NaiveDate;
    use devtrack_core::{ContributorRecord, ProjectMeta, TrackerConfig};
    use devtrack_data::loader::MetadataTable;

    fn context() -> DashboardContext {
        let date = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        let metadata = MetadataTable::from_rows(vec![
            ProjectMeta {
                title: "Ethereum".into(),
                tags: Some("Layer 1".into()),
            },
            ProjectMeta {
                title: "Aave".into(),
                tags: Some("DeFi".into()),
            },
        ]);
        let contributors = vec![
            ContributorRecord {
                title: "Ethereum".into(),
                date,
                contributor_count: 400,
            },
            ContributorRecord {
                title: "Aave".into(),
                date,
                contributor_count: 30,
            },
        ];
        DashboardContext::from_tables(
            &TrackerConfig::default(),
            Arc::new(metadata),
            Arc::new(contributors),
            Arc::new(Vec::new()),
        )
    }

    #[test]
    fn parses_every_command() {
        let cases = [
            ("projects A, B", Interaction::SetProjects(vec!["A".into(), "B".into()])),
            ("projects", Interaction::SetProjects(vec![])),
            ("tags defi ,  nft", Interaction::SetTags(vec!["defi".into(), "nft".into()])),
            ("add project Ethereum Classic", Interaction::AddProject("Ethereum Classic".into())),
            ("add tag DeFi", Interaction::AddTag("DeFi".into())),
            ("remove project Aave", Interaction::RemoveProject("Aave".into())),
            ("rm tag NFT", Interaction::RemoveTag("NFT".into())),
            ("clear projects", Interaction::ClearProjects),
            ("clear tags", Interaction::ClearTags),
            ("RESET", Interaction::Reset),
            ("  show  ", Interaction::Show),
            ("list projects", Interaction::ListProjects),
            ("ls tags", Interaction::ListTags),
            ("help", Interaction::Help),
            ("exit", Interaction::Quit),
        ];
        for (line, expected) in cases {
            assert_eq!(line.parse::<Interaction>().unwrap(), expected, "{line}");
        }
    }

    #[test]
    fn rejects_malformed_lines() {
        for line in ["", "add", "add project", "add widget X", "clear", "list everything", "dance"] {
            assert!(line.parse::<Interaction>().is_err(), "{line}");
        }
        let err = "dance".parse::<Interaction>().unwrap_err();
        assert_eq!(err.to_string(), "unknown command `dance` (type `help` for commands)");
    }

    #[test]
    fn selection_changes_rerender() {
        let ctx = context();
        let mut session = Session::new(&ctx);
        assert_eq!(session.selection().projects, vec!["Ethereum"]);

        let outcome = session
            .apply(Interaction::AddProject("aave".into()))
            .unwrap();
        let Outcome::Rendered(view) = outcome else {
            panic!("expected a render");
        };
        assert_eq!(view.selection.projects, vec!["Ethereum", "Aave"]);
        assert_eq!(view.project_contributors.len(), 2);
        assert_eq!(session.passes(), 1);

        session.apply(Interaction::AddTag(" defi ".into())).unwrap();
        assert_eq!(session.selection().tags, vec!["DEFI"]);
        session.apply(Interaction::AddTag("DeFi".into())).unwrap();
        assert_eq!(session.selection().tags, vec!["DEFI"]);
        assert_eq!(session.passes(), 3);
    }

    #[test]
    fn listing_and_help_do_not_render() {
        let ctx = context();
        let mut session = Session::new(&ctx);
        match session.apply(Interaction::ListTags).unwrap() {
            Outcome::Listing(tags) => assert_eq!(tags, vec!["DEFI", "LAYER 1"]),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(session.apply(Interaction::Help).unwrap(), Outcome::Help));
        assert!(matches!(session.apply(Interaction::Quit).unwrap(), Outcome::Quit));
        assert_eq!(session.passes(), 0);
    }

    #[test]
    fn remove_clear_and_reset() {
        let ctx = context();
        let mut session = Session::new(&ctx);
        session
            .apply(Interaction::SetProjects(vec!["Aave".into(), "Ethereum".into()]))
            .unwrap();
        session
            .apply(Interaction::RemoveProject("ETHEREUM".into()))
            .unwrap();
        assert_eq!(session.selection().projects, vec!["Aave"]);

        session.apply(Interaction::ClearProjects).unwrap();
        assert!(session.selection().projects.is_empty());

        session.apply(Interaction::Reset).unwrap();
        assert_eq!(session.selection(), &ctx.default_selection());
    }

    #[test]
    fn unknown_project_is_kept_as_typed() {
        let ctx = context();
        let mut session = Session::new(&ctx);
        session
            .apply(Interaction::SetProjects(vec!["Cardano".into()]))
            .unwrap();
        assert_eq!(session.selection().projects, vec!["Cardano"]);
    }
}
