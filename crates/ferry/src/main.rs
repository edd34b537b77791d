use clap::Parser;
use ferry::{logging, run_task, CsvInput};
use ferry_execution::TaskSettings;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Task configuration file; defaults to `FERRY_TASK_CONFIG`.
    #[arg(short, long)]
    config: Option<String>,

    /// CSV file to extract records from.
    #[arg(short, long)]
    input: PathBuf,

    /// Treat the first input row as a header and skip it.
    #[arg(long)]
    has_header: bool,

    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init(&args.log_level);

    let settings = match args.config {
        Some(path) => TaskSettings::from_file(&path)?,
        None => TaskSettings::new()?,
    };
    let input = CsvInput { path: args.input, has_header: args.has_header };

    let summary = run_task(settings, input).await?;
    println!(
        "Transferred {} of {} records",
        summary.records_loaded, summary.records_pushed
    );
    Ok(())
}
