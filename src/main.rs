use std::io::{BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use miette::{Context, IntoDiagnostic, Result};
use tracing_subscriber::EnvFilter;

use devtrack_core::{OutputFormat, TrackerConfig};
use devtrack_dashboard::{
    DashboardContext, DashboardView, Interaction, Outcome, Selection, Session, HELP,
};
use devtrack_data::cache::LoadCache;

const CONFIG_FILE: &str = ".devtrack.toml";

#[derive(Parser)]
#[command(
    name = "devtrack",
    version,
    about = "Crypto developer tracker",
    long_about = "Track open-source developer activity across crypto projects.\n\n\
                   Loads monthly contributor counts and GitHub event counts per project,\n\
                   filters them by project and by tag, and charts the result.\n\n\
                   Examples:\n  \
                     devtrack render                         Render the default dashboard\n  \
                     devtrack render --project Bitcoin --tag DEFI\n  \
                     devtrack interactive                    Change selections from a prompt\n  \
                     devtrack tags                           List the tag selector options\n  \
                     devtrack doctor                         Check config and data files"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (default: .devtrack.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory that relative data paths are resolved against
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        long_help = "Output format for command results.\n\n\
                       Formats:\n  \
                         text      Human-readable tables (default)\n  \
                         json      Machine-readable JSON with camelCase keys\n  \
                         markdown  GitHub-flavored Markdown"
    )]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(
        long,
        short,
        global = true,
        long_help = "Enable verbose output.\n\n\
                       Raises the default log level to debug. DEVTRACK_LOG takes\n\
                       precedence when set (e.g. DEVTRACK_LOG=devtrack_data=trace)."
    )]
    verbose: bool,

    /// When to use colors
    #[arg(long, global = true, default_value = "auto")]
    color: ColorChoice,
}

#[derive(Subcommand)]
enum Command {
    /// List the project selector options
    Projects,
    /// List the tag selector options
    Tags,
    /// Run one render pass and print the four charts
    #[command(long_about = "Run one render pass and print the four charts.\n\n\
        Starts from the configured default selection. Any --project replaces the\n\
        default projects and any --tag replaces the default tags.\n\n\
        Examples:\n  devtrack render\n  devtrack render --project Ethereum --project Bitcoin\n  \
        devtrack render --no-defaults --tag DEFI --tag NFT --format json")]
    Render {
        /// Project to select (repeatable)
        #[arg(long = "project")]
        projects: Vec<String>,
        /// Tag to select (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Start from an empty selection instead of the configured defaults
        #[arg(long)]
        no_defaults: bool,
    },
    /// Change selections from a prompt and re-render after each change
    #[command(long_about = "Change selections from a prompt and re-render after each change.\n\n\
        Reads one command per line from stdin. Type `help` for the command list.")]
    Interactive,
    /// Create a default .devtrack.toml configuration file
    #[command(long_about = "Create a default .devtrack.toml configuration file.\n\n\
        Generates a commented template with all available options.\n\
        Fails if .devtrack.toml already exists.")]
    Init,
    /// Check the configuration and data files
    #[command(long_about = "Check the configuration and data files.\n\n\
        Verifies that the config parses and that each of the three datasets\n\
        exists and loads. Use --format json for machine-readable output.")]
    Doctor,
    /// Generate shell completion scripts
    #[command(hide = true)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Clone, PartialEq, Eq, ValueEnum)]
enum ColorChoice {
    /// Auto-detect based on terminal
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

fn print_welcome(use_color: bool) {
    let version = env!("CARGO_PKG_VERSION");

    if use_color {
        println!("\x1b[1mdevtrack\x1b[0m v{version}: developer activity across crypto projects\n");

        println!("Quick start:");
        println!("  \x1b[36mdevtrack init\x1b[0m               Create a .devtrack.toml config file");
        println!("  \x1b[36mdevtrack doctor\x1b[0m             Check that the data files load");
        println!("  \x1b[36mdevtrack render\x1b[0m             Render the default dashboard\n");

        println!("All commands:");
        println!("  \x1b[32mrender\x1b[0m       One render pass for a selection");
        println!("  \x1b[32minteractive\x1b[0m  Change selections from a prompt");
        println!("  \x1b[32mprojects\x1b[0m     List project selector options");
        println!("  \x1b[32mtags\x1b[0m         List tag selector options");
        println!("  \x1b[32mdoctor\x1b[0m       Check config and data files");
        println!("  \x1b[32minit\x1b[0m         Create default configuration\n");
    } else {
        println!("devtrack v{version}: developer activity across crypto projects\n");

        println!("Quick start:");
        println!("  devtrack init               Create a .devtrack.toml config file");
        println!("  devtrack doctor             Check that the data files load");
        println!("  devtrack render             Render the default dashboard\n");

        println!("All commands:");
        println!("  render       One render pass for a selection");
        println!("  interactive  Change selections from a prompt");
        println!("  projects     List project selector options");
        println!("  tags         List tag selector options");
        println!("  doctor       Check config and data files");
        println!("  init         Create default configuration\n");
    }

    println!("Run 'devtrack <command> --help' for details.");
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("DEVTRACK_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .init();
}

/// Resolve the config: explicit `--config`, then `./.devtrack.toml`, then
/// defaults. Returns the path it was read from, if any.
fn load_config(cli: &Cli) -> Result<(TrackerConfig, Option<PathBuf>)> {
    let (mut config, source) = match &cli.config {
        Some(path) => {
            let config = TrackerConfig::from_file(path)
                .into_diagnostic()
                .wrap_err_with(|| format!("reading config {}", path.display()))?;
            (config, Some(path.clone()))
        }
        None => {
            let default_path = Path::new(CONFIG_FILE);
            if default_path.exists() {
                let config = TrackerConfig::from_file(default_path)
                    .into_diagnostic()
                    .wrap_err(format!("reading {CONFIG_FILE}"))?;
                (config, Some(default_path.to_path_buf()))
            } else {
                (TrackerConfig::default(), None)
            }
        }
    };
    if let Some(dir) = &cli.data_dir {
        config.data = config.data.rebased(dir);
    }
    Ok((config, source))
}

fn load_context(
    config: &TrackerConfig,
    cache: &LoadCache,
    show_spinner: bool,
) -> Result<DashboardContext> {
    let spinner = if show_spinner {
        let pb = indicatif::ProgressBar::new_spinner();
        if let Ok(style) =
            indicatif::ProgressStyle::with_template("{spinner:.cyan} {msg} ({elapsed})")
        {
            pb.set_style(style);
        }
        pb.set_message("Loading datasets...");
        pb.enable_steady_tick(std::time::Duration::from_millis(120));
        Some(pb)
    } else {
        None
    };

    let context = DashboardContext::load(config, cache);

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    context
        .into_diagnostic()
        .wrap_err("loading datasets (run 'devtrack doctor' to check the data paths)")
}

fn print_view(view: &DashboardView, format: OutputFormat, compact: bool) -> Result<()> {
    match format {
        OutputFormat::Json if compact => {
            println!("{}", serde_json::to_string(view).into_diagnostic()?);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(view).into_diagnostic()?);
        }
        OutputFormat::Markdown => print!("{}", view.to_markdown()),
        OutputFormat::Text => println!("{view}"),
    }
    Ok(())
}

fn print_listing(heading: &str, items: &[String], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(items).into_diagnostic()?);
        }
        OutputFormat::Markdown => {
            println!("## {heading}\n");
            for item in items {
                println!("- {item}");
            }
        }
        OutputFormat::Text => {
            for item in items {
                println!("{item}");
            }
        }
    }
    Ok(())
}

/// Build the selection for a one-shot render.
fn render_selection(
    context: &DashboardContext,
    projects: &[String],
    tags: &[String],
    no_defaults: bool,
) -> Selection {
    let mut selection = if no_defaults {
        Selection::default()
    } else {
        context.default_selection()
    };
    if !projects.is_empty() {
        selection.projects = projects
            .iter()
            .map(|p| {
                context
                    .resolve_project(p)
                    .unwrap_or_else(|| p.trim().to_string())
            })
            .collect();
    }
    if !tags.is_empty() {
        selection.tags = tags.iter().map(|t| t.trim().to_uppercase()).collect();
    }
    selection
}

fn run_interactive(context: &DashboardContext, format: OutputFormat) -> Result<()> {
    let prompt = std::io::stdin().is_terminal();
    let compact = true;
    let mut session = Session::new(context);

    let view = session.render().into_diagnostic()?;
    print_view(&view, format, compact)?;

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        if prompt {
            print!("devtrack> ");
            std::io::stdout().flush().into_diagnostic()?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.into_diagnostic().wrap_err("reading stdin")?;
        if line.trim().is_empty() {
            continue;
        }

        let interaction: Interaction = match line.parse() {
            Ok(interaction) => interaction,
            Err(e) => {
                eprintln!("error: {e}");
                continue;
            }
        };

        match session.apply(interaction).into_diagnostic()? {
            Outcome::Rendered(view) => print_view(&view, format, compact)?,
            Outcome::Listing(items) => print_listing("Options", &items, format)?,
            Outcome::Help => println!("{HELP}"),
            Outcome::Quit => break,
        }
    }

    tracing::debug!(passes = session.passes(), "interactive session ended");
    Ok(())
}

#[derive(serde::Serialize)]
struct CheckResult {
    name: &'static str,
    status: &'static str,
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
}

impl CheckResult {
    fn pass(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            status: "pass",
            detail: detail.into(),
            hint: None,
        }
    }

    fn fail(name: &'static str, detail: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            name,
            status: "fail",
            detail: detail.into(),
            hint: Some(hint.into()),
        }
    }

    fn info(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            status: "info",
            detail: detail.into(),
            hint: None,
        }
    }

    fn symbol(&self) -> &'static str {
        match self.status {
            "pass" => "\u{2713}",
            "fail" => "\u{2717}",
            _ => "~",
        }
    }

    fn colored_symbol(&self) -> String {
        match self.status {
            "pass" => "\x1b[32m\u{2713}\x1b[0m".into(),
            "fail" => "\x1b[31m\u{2717}\x1b[0m".into(),
            _ => "\x1b[33m~\x1b[0m".into(),
        }
    }
}

fn check_file<T>(
    name: &'static str,
    path: &Path,
    load: impl FnOnce(&Path) -> devtrack_core::Result<T>,
    describe: impl FnOnce(&T) -> String,
) -> CheckResult {
    if !path.exists() {
        return CheckResult::fail(
            name,
            format!("{} not found", path.display()),
            "set the path under [data] in .devtrack.toml or pass --data-dir",
        );
    }
    match load(path) {
        Ok(table) => CheckResult::pass(name, format!("{} ({})", path.display(), describe(&table))),
        Err(e) => CheckResult::fail(name, e.to_string(), "fix the file or point [data] at another one"),
    }
}

fn run_doctor(
    config: &TrackerConfig,
    source: Option<&Path>,
    format: OutputFormat,
    use_color: bool,
) -> Result<()> {
    let mut checks: Vec<CheckResult> = Vec::new();
    let cache = LoadCache::new();

    // 1. Config file
    match source {
        Some(path) => checks.push(CheckResult::pass(
            "config_file",
            format!("{} parsed", path.display()),
        )),
        None => checks.push(CheckResult::info(
            "config_file",
            format!("{CONFIG_FILE} not found, using defaults (run 'devtrack init' to create one)"),
        )),
    }

    // 2. Data files
    checks.push(check_file(
        "metadata",
        &config.data.metadata,
        |p| cache.metadata(p),
        |t| {
            format!(
                "{} rows, {} projects, {} tags",
                t.len(),
                t.projects().len(),
                t.tags().len()
            )
        },
    ));
    checks.push(check_file(
        "contributors",
        &config.data.contributors,
        |p| cache.contributors(p),
        |t| format!("{} rows", t.len()),
    ));
    let kinds = &config.dashboard.event_types;
    checks.push(check_file(
        "events",
        &config.data.events,
        |p| cache.events(p, kinds),
        |t| format!("{} rows of {} event types", t.len(), kinds.len()),
    ));

    // 3. Default selection
    if checks.iter().all(|c| c.status != "fail") {
        match DashboardContext::load(config, &cache) {
            Ok(context) => {
                let selection = context.default_selection();
                checks.push(CheckResult::info(
                    "default_selection",
                    format!(
                        "projects: [{}], tags: [{}]",
                        selection.projects.join(", "),
                        selection.tags.join(", ")
                    ),
                ));
            }
            Err(e) => checks.push(CheckResult::fail(
                "default_selection",
                e.to_string(),
                "run with --verbose for details",
            )),
        }
    }

    // Output
    match format {
        OutputFormat::Json => {
            let version = env!("CARGO_PKG_VERSION");
            let json = serde_json::json!({
                "version": version,
                "checks": checks,
            });
            println!("{}", serde_json::to_string_pretty(&json).into_diagnostic()?);
        }
        _ => {
            let version = env!("CARGO_PKG_VERSION");
            println!("devtrack v{version}: environment check\n");

            for check in &checks {
                let sym = if use_color {
                    check.colored_symbol()
                } else {
                    check.symbol().to_string()
                };
                let label = check.name.replace('_', " ");
                println!("  {sym} {label:<18} {}", check.detail);
                if let Some(hint) = &check.hint {
                    println!("    hint: {hint}");
                }
            }

            let passed = checks.iter().filter(|c| c.status == "pass").count();
            let failed = checks.iter().filter(|c| c.status == "fail").count();
            let info = checks.iter().filter(|c| c.status == "info").count();
            println!("\n{passed} checks passed, {failed} failed, {info} info");
        }
    }

    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# devtrack configuration

[data]
# Input CSV files. Relative paths resolve against the working directory,
# or against --data-dir when given.
# metadata = "./data/2022-10-18-project_df.csv"
# contributors = "./data/2022-10-18-contributor_stats_by_month.csv"
# events = "./data/2022-10-18-gharchive_event_counts_by_month.csv"

[dashboard]
# Projects selected when a session starts
# default_projects = ["Ethereum"]
# Tags selected when a session starts; overrides default_tag_index
# default_tags = ["DEFI"]
# Index into the sorted tag list used when default_tags is empty
# default_tag_index = 7
# Event types kept when loading the event table
# event_types = ["ForkEvent", "IssuesEvent", "PullRequestEvent", "PushEvent", "WatchEvent"]
# Logarithmic y axis on every chart
# log_y = false

[filter]
# "substring" (DEFI also matches GAMEDEFI) or "word"
# tag_match = "substring"
"#;

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .into_diagnostic()?;
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let use_color = match cli.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => std::io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    };

    match cli.command {
        None => {
            print_welcome(use_color);
            return Ok(());
        }
        Some(Command::Init) => {
            let path = Path::new(CONFIG_FILE);
            if path.exists() {
                miette::bail!(
                    help = "edit the existing file or delete it first",
                    "{} already exists",
                    CONFIG_FILE
                );
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!("Created {CONFIG_FILE} with default configuration");
            return Ok(());
        }
        Some(Command::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "devtrack", &mut std::io::stdout());
            return Ok(());
        }
        _ => {}
    }

    let (config, source) = load_config(&cli)?;
    tracing::debug!(
        format = %cli.format,
        config = ?source,
        metadata = %config.data.metadata.display(),
        "configuration resolved"
    );

    if let Some(Command::Doctor) = cli.command {
        return run_doctor(&config, source.as_deref(), cli.format, use_color);
    }

    let cache = LoadCache::new();
    let show_spinner = std::io::stderr().is_terminal() && cli.format == OutputFormat::Text;
    let context = load_context(&config, &cache, show_spinner)?;

    match cli.command {
        Some(Command::Projects) => print_listing("Projects", context.projects(), cli.format)?,
        Some(Command::Tags) => print_listing("Tags", context.tags(), cli.format)?,
        Some(Command::Render {
            ref projects,
            ref tags,
            no_defaults,
        }) => {
            let selection = render_selection(&context, projects, tags, no_defaults);
            let view = context.render(&selection).into_diagnostic()?;
            print_view(&view, cli.format, false)?;
        }
        Some(Command::Interactive) => run_interactive(&context, cli.format)?,
        None | Some(Command::Init) | Some(Command::Doctor) | Some(Command::Completions { .. }) => {}
    }

    Ok(())
}
