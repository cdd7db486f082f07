mod app;
mod config;
mod keymap;
mod records;

use anyhow::{Context, Result};
use clap::Parser;
use rafex_core::Color;
use rafex_render::SkiaSurface;
use rafex_timing::HighPrecisionTimer;
use rafex_trial::Session;
use std::path::PathBuf;

use app::App;

#[derive(Parser, Debug)]
#[command(name = "rafex", version, about = "Rod-and-frame task", long_about = None)]
struct Cli {
    /// Session file with `[defaults]` and `[[trials]]` tables
    #[arg(short, long)]
    config: PathBuf,

    /// Append results here as JSON lines instead of printing them
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Run in a window instead of fullscreen
    #[arg(long)]
    windowed: bool,

    /// Font used for trial prompts
    #[arg(long)]
    font: Option<PathBuf>,

    /// Colour around the canvas
    #[arg(long, default_value = "white")]
    backdrop: Color,

    /// Prompt text colour
    #[arg(long, default_value = "black")]
    text_color: Color,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let trials = config::load(&cli.config)?;
    let mut surface = SkiaSurface::new().with_caption_color(cli.text_color);
    if let Some(path) = &cli.font {
        let data = std::fs::read(path).with_context(|| format!("cannot read font {}", path.display()))?;
        surface = surface.with_font(data)?;
    }
    let session = Session::new(trials, surface, HighPrecisionTimer::new())?;
    let sink = records::RecordSink::open(cli.output.as_deref())?;

    App::new(session, sink, cli.backdrop, !cli.windowed).run()
}
