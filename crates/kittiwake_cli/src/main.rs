mod logging;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use kittiwake::{BuildPlan, Site};
use log::info;

use crate::logging::init_logging;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Silence all log output.
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the build plan for a site as JSON
    Plan {
        #[command(flatten)]
        site: SiteArgs,

        /// Pretty-print the JSON.
        #[arg(long)]
        pretty: bool,
    },
    /// Check that a site resolves, and print a summary
    Check {
        #[command(flatten)]
        site: SiteArgs,
    },
}

#[derive(Args)]
struct SiteArgs {
    /// The root directory of the site.
    #[arg(default_value = ".")]
    root: PathBuf,

    /// Include draft content.
    #[arg(long)]
    drafts: bool,

    /// Include content dated in the future.
    #[arg(long)]
    future: bool,

    /// The time to resolve the site at, as an RFC 3339 timestamp.
    #[arg(long)]
    now: Option<DateTime<Utc>>,
}

impl SiteArgs {
    async fn plan(&self) -> Result<BuildPlan> {
        let mut builder = Site::builder()
            .root(&self.root)
            .load_config()
            .with_context(|| format!("failed to load config in '{}'", self.root.display()))?;

        if self.drafts {
            builder = builder.include_drafts(true);
        }
        if self.future {
            builder = builder.include_future(true);
        }
        if let Some(now) = self.now {
            builder = builder.now(now);
        }

        let mut site = builder.build();
        site.load().context("failed to discover content")?;

        info!("found {} content files", site.sources().len());

        let plan = site.plan().await.context("failed to resolve build plan")?;

        Ok(plan)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.quiet);

    match cli.command {
        Commands::Plan { site, pretty } => {
            let plan = site.plan().await?;

            let json = if pretty {
                serde_json::to_string_pretty(&plan)?
            } else {
                serde_json::to_string(&plan)?
            };

            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{json}")?;
        }
        Commands::Check { site } => {
            let plan = site.plan().await?;

            print_summary(&plan);
        }
    }

    Ok(())
}

fn print_summary(plan: &BuildPlan) {
    if let Some(title) = &plan.title {
        println!("{title}");
    }

    println!("{} content items", plan.content_index.len());

    for language in &plan.languages {
        println!(
            "{} ({}): {} pages, {} menus",
            language.name,
            language.code,
            plan.pages_for(&language.code).count(),
            language.menus.len()
        );
    }

    for (name, taxonomy) in plan.taxonomies.iter() {
        println!("{name}: {} terms", taxonomy.terms.len());
    }

    for (kind, formats) in plan.output_targets.iter() {
        let formats = formats
            .iter()
            .map(|format| format.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        println!("{kind}: {formats}");
    }
}
