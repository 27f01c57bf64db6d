use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use legal_summarizer::{
    api,
    config::Config,
    extraction::Document,
    logging,
    pipeline::SummarizationPipeline,
    render::SummaryReport,
};
use std::{path::PathBuf, sync::Arc};
use tokio::net::TcpListener;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(
    name = "legal-summarizer",
    about = "Summarize legal documents (PDF, DOCX, TXT) with an Azure OpenAI deployment"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Summarize files, or every file under the given directories.
    Summarize {
        #[arg(long, value_enum, default_value_t = OutputFormat::Markdown)]
        format: OutputFormat,
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Serve the HTTP upload API.
    Serve,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Markdown,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing();
    let config = Config::load().context("invalid configuration")?;

    match cli.command {
        Command::Summarize { format, paths } => summarize(&config, format, &paths).await,
        Command::Serve => serve(&config).await,
    }
}

async fn summarize(config: &Config, format: OutputFormat, paths: &[PathBuf]) -> Result<()> {
    let pipeline =
        SummarizationPipeline::from_config(config).context("failed to build completion client")?;

    let mut documents = Vec::new();
    for path in collect_files(paths)? {
        let bytes = tokio::fs::read(&path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        documents.push(Document::new(path.display().to_string(), bytes));
    }

    let results = pipeline.run(&documents).await;
    let report = SummaryReport::new(documents.iter().map(Document::name).zip(results.iter()))
        .with_metrics(pipeline.metrics_snapshot());
    tracing::info!(
        documents = report.documents.len(),
        succeeded = report.succeeded(),
        "Summarization complete"
    );

    match format {
        OutputFormat::Markdown => print!("{}", report.to_markdown()),
        OutputFormat::Json => println!("{}", report.to_json()),
    }
    Ok(())
}

/// Expand directories recursively; files within a directory come back in name order.
fn collect_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry =
                    entry.with_context(|| format!("failed to walk {}", path.display()))?;
                if entry.file_type().is_file() {
                    files.push(entry.into_path());
                }
            }
        } else {
            bail!("{} is not a file or directory", path.display());
        }
    }
    Ok(files)
}

async fn serve(config: &Config) -> Result<()> {
    let pipeline =
        SummarizationPipeline::from_config(config).context("failed to build completion client")?;
    let app = api::create_router(Arc::new(pipeline));

    let (listener, port) = bind_listener(config.server_port)
        .await
        .context("failed to bind listener")?;
    tracing::info!("Listening on http://0.0.0.0:{}", port);
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

async fn bind_listener(configured: Option<u16>) -> Result<(TcpListener, u16), std::io::Error> {
    use std::net::Ipv4Addr;

    if let Some(port) = configured {
        return TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
            .await
            .map(|listener| (listener, port));
    }

    const PORT_RANGE: std::ops::RangeInclusive<u16> = 4200..=4299;
    for port in PORT_RANGE {
        match TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).await {
            Ok(listener) => {
                tracing::debug!(port, "Bound server port");
                return Ok((listener, port));
            }
            Err(err) if err.kind() == std::io::ErrorKind::AddrInUse => {
                tracing::debug!(port, "Port already in use; trying next");
                continue;
            }
            Err(err) => return Err(err),
        }
    }

    Err(std::io::Error::new(
        std::io::ErrorKind::AddrNotAvailable,
        "No available port found in range 4200-4299",
    ))
}
