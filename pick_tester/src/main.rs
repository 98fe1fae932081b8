use anyhow::{Context, bail};
use chroma_pick::core_modules::storage::FileStore;
use chroma_pick::{ClipboardSink, Color, PickerSession, SessionConfig, Upload};
use std::env;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// "Copies" by printing, so a terminal run shows what a shell would paste.
struct StdoutClipboard;

impl ClipboardSink for StdoutClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), String> {
        println!("clipboard: {text}");
        Ok(())
    }
}

fn hexes(colors: &[Color]) -> String {
    colors.iter().map(Color::to_hex).collect::<Vec<_>>().join(" ")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // --- 1. Argument Parsing & Setup ---
    let args: Vec<String> = env::args().collect();
    if args.len() < 4 {
        println!("Usage: pick_tester <image_path> <x> <y> [output_dir]");
        return Ok(());
    }
    let image_path = PathBuf::from(&args[1]);
    let x: f64 = args[2].parse().with_context(|| format!("x coordinate `{}`", args[2]))?;
    let y: f64 = args[3].parse().with_context(|| format!("y coordinate `{}`", args[3]))?;
    let output_dir = args.get(4).map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("creating output directory {}", output_dir.display()))?;

    // --- 2. Session Initialization ---
    let config = SessionConfig::from_env().context("reading CHROMA_PICK_* settings")?;
    let store = FileStore::open(output_dir.join(".chroma_pick")).context("opening history store")?;
    let mut session = PickerSession::new(config, store)?;

    // --- 3. Load & Pick ---
    let upload = Upload::from_path(&image_path)
        .await
        .with_context(|| format!("reading {}", image_path.display()))?;
    session.load_image(upload).await?;
    let color = session.pick_at(x, y)?;
    println!("picked {color} at ({x}, {y})");

    // --- 4. Derived Values ---
    if let Some(palette) = session.palette() {
        println!("shades:     {}", hexes(&palette.shades));
        println!("tints:      {}", hexes(&palette.tints));
        println!("complement: {}", hexes(&palette.complementary_pair()));
    }
    if let Some(contrast) = session.contrast() {
        println!(
            "contrast vs {}: {:.2}:1 ({:?})",
            session.background(),
            contrast.ratio,
            contrast.accessibility_tier
        );
    }
    session.copy_current(&mut StdoutClipboard)?;

    // --- 5. Exports ---
    let Some(palette) = session.palette() else {
        bail!("no color selected after a successful pick");
    };
    let history_path = session.write_history_export(&output_dir)?;
    let palette_path = session.write_palette_png(&output_dir, &palette.strip())?;
    info!(
        history = %history_path.display(),
        palette = %palette_path.display(),
        colors = session.history().len(),
        "exports written"
    );
    Ok(())
}
