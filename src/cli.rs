use clap::{Args, Parser, Subcommand};

pub const DEFAULT_URL_TEMPLATE: &str =
    "https://svg.issuu.com/250712151426-cf4048364da52d8d0cbf6421a2e07a54/page_{i}.svg";

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch every page SVG that is not already on disk.
    Download(DownloadArgs),
    /// Generate the static HTML viewer from the local SVG tree.
    Viewer(ViewerArgs),
}

#[derive(Debug, Args)]
pub struct DownloadArgs {
    /// Remote URL template; `{i}` is replaced with the page number.
    #[arg(long, default_value = DEFAULT_URL_TEMPLATE)]
    pub url_template: String,

    /// Output directory for `page_<n>.svg` files.
    #[arg(long, default_value = "svg")]
    pub out: String,

    /// Number of pages to fetch, starting at 1.
    #[arg(long, default_value_t = 666)]
    pub total_pages: u32,

    /// Maximum concurrent HTTP requests.
    #[arg(long, default_value_t = 10)]
    pub concurrency: usize,

    /// Per-request timeout.
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,
}

#[derive(Debug, Args)]
pub struct ViewerArgs {
    /// Directory holding `c<n>/page_<m>.svg` (or flat `page_<m>.svg`) files.
    #[arg(long, default_value = "svg")]
    pub svg_dir: String,

    /// Output file path for the generated HTML.
    #[arg(long, default_value = "index.html")]
    pub out: String,

    /// Location of the SVG tree as referenced from the generated HTML.
    #[arg(long, default_value = "svg")]
    pub image_base: String,

    /// Document title.
    #[arg(long, default_value = "Deep Learning: Foundations and Concepts")]
    pub title: String,

    /// Chapter label override, e.g. `--label 0=Preface` (repeatable).
    #[arg(long = "label", value_name = "N=TEXT", value_parser = parse_label)]
    pub labels: Vec<(u32, String)>,
}

fn parse_label(raw: &str) -> Result<(u32, String), String> {
    let (number, text) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected N=TEXT, got {raw:?}"))?;
    let number = number
        .trim()
        .parse::<u32>()
        .map_err(|err| format!("invalid chapter number {number:?}: {err}"))?;
    let text = text.trim();
    if text.is_empty() {
        return Err(format!("label for chapter {number} must not be empty"));
    }
    Ok((number, text.to_owned()))
}
