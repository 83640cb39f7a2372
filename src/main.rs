use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::error;

use invader_directory::config::Config;
use invader_directory::logging;
use invader_directory::pipeline::{self, RunMode};
use invader_directory::report::FsReportSink;
use invader_directory::types::ReportSink;

#[derive(Parser)]
#[command(name = "invader_directory")]
#[command(about = "Invader defense contact directory and report generator")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the TOML config file (optional; defaults apply if absent)
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceOverrides {
    /// Override the headquarters roster file
    #[arg(long)]
    roster: Option<PathBuf>,

    /// Override the contacts folder
    #[arg(long)]
    contacts: Option<PathBuf>,

    /// Override the output folder
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the directory and write the flat role report
    Extract {
        #[command(flatten)]
        sources: SourceOverrides,
    },
    /// Build the directory and write one matrix CSV per identity
    Matrices {
        #[command(flatten)]
        sources: SourceOverrides,
    },
    /// Run the whole pipeline: flat report plus identity matrices
    Run {
        #[command(flatten)]
        sources: SourceOverrides,
    },
}

fn apply_overrides(config: &mut Config, sources: &SourceOverrides) {
    if let Some(roster) = &sources.roster {
        config.inputs.roster_file = roster.clone();
    }
    if let Some(contacts) = &sources.contacts {
        config.inputs.contacts_dir = contacts.clone();
    }
    if let Some(output) = &sources.output {
        config.outputs.output_dir = output.clone();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_logging();

    let cli = Cli::parse();
    let mut config = Config::load_or_default(&cli.config)?;

    let (mode, sources) = match &cli.command {
        Commands::Extract { sources } => (RunMode::Extract, sources),
        Commands::Matrices { sources } => (RunMode::Matrices, sources),
        Commands::Run { sources } => (RunMode::Full, sources),
    };
    apply_overrides(&mut config, sources);

    println!("🚀 Running directory pipeline...");
    let sink: Arc<dyn ReportSink> = Arc::new(FsReportSink::new(
        &config.outputs.output_dir,
        &config.matrix_dir(),
    ));

    match pipeline::run(&config, mode, sink).await {
        Ok(summary) => {
            println!("\n📊 Pipeline Results:");
            println!("   Countries: {}", summary.countries);
            println!("   Contact groups: {}", summary.contact_groups);
            println!("   Assignments: {}", summary.assignments);
            println!("   Identities: {}", summary.identities);
            if let Some(path) = &summary.flat_report {
                println!("   Flat report: {path}");
            }
            if !summary.matrix_files.is_empty() {
                println!("   Matrix files: {}", summary.matrix_files.len());
            }

            if !summary.errors.is_empty() {
                println!("\n⚠️  {} problems encountered:", summary.errors.len());
                for problem in &summary.errors {
                    println!("   - {problem}");
                }
            }
            println!("✅ Pipeline completed successfully");
        }
        Err(e) => {
            error!("Pipeline failed: {}", e);
            println!("❌ Pipeline failed: {e}");
            std::process::exit(1);
        }
    }

    Ok(())
}
