use crate::git::{GixRepository, LogOrder};
use crate::history::{load_branches, load_commits_with_progress};
use crate::model::short_id;
use crate::render::{render_graph, render_stats, render_timeline};
use crate::report::Report;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use console::Term;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::OnceLock;

/// `--version` banner: version, the short commit it was built from, and the author line.
///
/// The build id comes from `GITVIZ_BUILD` at compile time and reads `dev` otherwise.
fn long_version() -> &'static str {
    static LONG_VERSION: OnceLock<String> = OnceLock::new();
    LONG_VERSION.get_or_init(|| {
        format!(
            "{}\nBuild: {}\nDeveloper: {}",
            env!("CARGO_PKG_VERSION"),
            short_id(option_env!("GITVIZ_BUILD").unwrap_or("dev")),
            env!("CARGO_PKG_AUTHORS")
        )
    })
}

#[derive(Parser, Debug)]
#[command(name = "gitviz")]
#[command(about = "Visualize Git repositories with style")]
#[command(version, long_version = long_version())]
pub struct Cli {
    #[arg(
        short = 'n',
        long,
        default_value_t = 50,
        allow_negative_numbers = true,
        help = "Limit number of commits to display (0 or less shows all)"
    )]
    pub limit: i64,

    #[arg(short, long, help = "Compact display mode")]
    pub compact: bool,

    #[arg(short, long, help = "Show only statistics")]
    pub stats: bool,

    #[arg(short, long, help = "Show commit timeline")]
    pub timeline: bool,

    #[arg(long, default_value = ".", help = "Path to git repository")]
    pub repo: PathBuf,

    #[arg(long, value_enum, default_value_t = Order::Time, help = "Commit traversal order")]
    pub order: Order,

    #[arg(long, help = "Output the report as JSON")]
    pub json: bool,

    #[arg(long, value_enum, default_value_t = ColorChoice::Auto, help = "When to use colors")]
    pub color: ColorChoice,

    #[arg(short, long, action = clap::ArgAction::Count, help = "Increase log verbosity")]
    pub verbose: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Order {
    /// Newest committer time first
    Time,
    /// Breadth-first along the commit graph
    Graph,
}

impl From<Order> for LogOrder {
    fn from(order: Order) -> Self {
        match order {
            Order::Time => LogOrder::CommitterTime,
            Order::Graph => LogOrder::Graph,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    Auto,
    Always,
    Never,
}

/// Which view `execute` prints.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayMode {
    Json,
    Stats,
    Timeline,
    Graph { compact: bool },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn display_mode(&self) -> DisplayMode {
        if self.json {
            DisplayMode::Json
        } else if self.stats {
            DisplayMode::Stats
        } else if self.timeline {
            DisplayMode::Timeline
        } else {
            DisplayMode::Graph {
                compact: self.compact,
            }
        }
    }

    fn apply_color_choice(&self) {
        match self.color {
            ColorChoice::Auto => {}
            ColorChoice::Always => {
                console::set_colors_enabled(true);
                console::set_colors_enabled_stderr(true);
            }
            ColorChoice::Never => {
                console::set_colors_enabled(false);
                console::set_colors_enabled_stderr(false);
            }
        }
    }

    fn progress_bar(&self) -> ProgressBar {
        if self.json || !Term::stderr().is_term() {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg} {pos}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb
    }

    pub fn execute(self) -> Result<()> {
        self.apply_color_choice();

        let repo = GixRepository::open(&self.repo).context("Error opening repository")?;

        let pb = self.progress_bar();
        let history = load_commits_with_progress(&repo, self.limit, self.order.into(), &pb);
        pb.finish_and_clear();
        let history = history.context("Error loading commits")?;

        let branches = load_branches(&repo).context("Error loading branches")?;
        let report = Report::new(repo.path().to_string_lossy().to_string(), history, branches);

        match self.display_mode() {
            DisplayMode::Json => println!("{}", report.to_json()?),
            DisplayMode::Stats => println!("{}", render_stats(&report)),
            DisplayMode::Timeline => println!("{}", render_timeline(&report)),
            DisplayMode::Graph { compact } => {
                println!("{}", render_graph(&report, compact));
                println!();
                println!("{}", render_stats(&report));
            }
        }

        Ok(())
    }
}
