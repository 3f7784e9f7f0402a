use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use manuscript_submit::config::Config;
use manuscript_submit::logger;
use manuscript_submit::orchestrator::{number_lines_file, App, StdinPrompt};

#[derive(Parser, Debug)]
#[command(name = "manuscript-submit")]
#[command(about = "Manuscript submission wizard and review-copy tools")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Backend API base URL (overrides MANUSCRIPT_API_BASE_URL)
    #[arg(long, global = true)]
    api_base_url: Option<String>,

    /// Output directory (overrides OUTPUT_DIR)
    #[arg(long, global = true)]
    output_dir: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the wizard for a TOML draft and submit it
    Submit {
        /// Draft description file
        draft: PathBuf,
    },
    /// Generate a line-numbered, double-spaced review PDF locally
    ReviewCopy {
        manuscript: PathBuf,
        /// Output PDF path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Add native line numbering to a DOCX (no network)
    NumberLines { input: PathBuf, output: PathBuf },
    /// Upload a line-numbered copy for conversion and print the PDF URL
    Preview { manuscript: PathBuf },
    /// Extract title, abstract and keywords from a DOCX
    ExtractMetadata { manuscript: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let mut config = Config::from_env();
    if let Some(url) = cli.api_base_url {
        config.api_base_url = url;
    }
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }
    config.verbose_logging |= cli.verbose;

    // 初始化日志
    logger::init_with_level(if config.verbose_logging { "debug" } else { "info" });

    // 初始化并运行应用
    let app = App::initialize(config)?;
    run(&app, cli.command).await
}

async fn run(app: &App, command: Command) -> Result<()> {
    match command {
        Command::Submit { draft } => {
            let mut prompt = StdinPrompt::new();
            app.submit_draft(&draft, &mut prompt).await?;
        }
        Command::ReviewCopy { manuscript, output } => {
            let path = app.review_copy(&manuscript, output).await?;
            info!("📄 {}", path.display());
        }
        Command::Preview { manuscript } => {
            let url = app.preview(&manuscript).await?;
            println!("{}", url);
        }
        Command::ExtractMetadata { manuscript } => {
            let metadata = app.extract_metadata(&manuscript).await?;
            println!("{}", serde_json::to_string_pretty(&metadata)?);
        }
        Command::NumberLines { input, output } => number_lines_file(&input, &output).await?,
    }
    Ok(())
}
