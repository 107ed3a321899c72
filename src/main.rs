use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    svgpages::logging::init().context("init logging")?;

    let cli = svgpages::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    match cli.command {
        svgpages::cli::Command::Download(args) => {
            svgpages::download::run(args).await.context("download")?;
        }
        svgpages::cli::Command::Viewer(args) => {
            svgpages::viewer::run(args).context("viewer")?;
        }
    }

    Ok(())
}
