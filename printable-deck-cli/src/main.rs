use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use printable_deck_core::{
    CatalogConfig, DeckOptions, FetchOptions, Phase, ProgressSink, build_deck,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "printable-deck")]
#[command(about = "Build print-ready 3x3 card sheets from a list of card names")]
struct Cli {
    /// Text file with one card name per line
    #[arg(short = 'p', long = "card_path", value_parser = existing_file)]
    card_path: PathBuf,
    /// Deck name; images and <deck_name>.pdf go into ./<deck_name>/
    #[arg(short = 'd', long = "deck_name")]
    deck_name: String,
    /// Number of cards looked up at the same time (default: CPU count)
    #[arg(short, long)]
    jobs: Option<usize>,
    /// Catalog search endpoint
    #[arg(long)]
    search_url: Option<String>,
    /// Hide the progress bar
    #[arg(short, long)]
    quiet: bool,
}

fn existing_file(path: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(path);
    if path.is_file() {
        Ok(path)
    } else {
        Err(format!("{} is not a readable file", path.display()))
    }
}

struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    fn new(quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(0)
        };
        let style = ProgressStyle::with_template("{prefix:>9.bold} [{bar:40.green/238}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        bar.set_style(style);
        BarProgress { bar }
    }
}

impl ProgressSink for BarProgress {
    fn on_phase(&self, phase: Phase, max: usize) {
        self.bar.set_length(max as u64);
        match phase {
            Phase::Fetching => self.bar.set_prefix("Fetching"),
            Phase::Layout => self.bar.set_prefix("Layout"),
            Phase::Done => self.bar.finish_and_clear(),
        }
    }

    fn on_progress(&self, value: usize, _max: usize) {
        self.bar.set_position(value as u64);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let mut options = DeckOptions::new(cli.card_path, cli.deck_name);
    if let Some(jobs) = cli.jobs {
        options.fetch = FetchOptions { concurrency: jobs };
    }
    if let Some(search_url) = cli.search_url {
        options.catalog = CatalogConfig {
            search_url,
            ..Default::default()
        };
    }

    let progress = Arc::new(BarProgress::new(cli.quiet));
    let report = match build_deck(&options, progress.clone()).await {
        Ok(report) => report,
        Err(e) => {
            progress.bar.abandon();
            eprintln!("Failed to build deck: {}", e);
            std::process::exit(1);
        }
    };

    println!(
        "Saved {} ({} pages, {} cards drawn)",
        report.sheet.path.display(),
        report.sheet.pages,
        report.sheet.drawn
    );
    if !report.fetch.missed.is_empty() {
        println!("No image found for {} card(s):", report.fetch.missed.len());
        for name in &report.fetch.missed {
            println!("  {}", name);
        }
    }
    if report.fetch.images_failed > 0 {
        println!("{} image download(s) failed", report.fetch.images_failed);
    }
    for skipped in &report.sheet.skipped {
        println!("Could not draw {}", skipped);
    }
    for collision in &report.collisions {
        println!(
            "'{}' and '{}' share {}; only the last download was kept",
            collision.first, collision.second, collision.file_name
        );
    }

    Ok(())
}
