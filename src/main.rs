use anyhow::Context;
use async_trait::async_trait;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dither_live::models::{
    PendingDecision, PipelineConfig, ParamField, UserChoice, Variant, VARIANT_TABLE,
};
use dither_live::services::preferences::{
    downscale_suppressed, SUPPRESS_DOWNSCALE_KEY, THEME_KEY,
};
use dither_live::services::{
    ChangeKind, IntervalClock, JsonFilePreferences, MemoryPreferences, PipelineSession,
    PreferenceStore, Prompter, Theme,
};

#[derive(Parser)]
#[command(name = "dither-live")]
#[command(about = "Live dithering pipeline: load, tune, rotate, recolour and export images")]
struct Cli {
    /// Pipeline configuration file (YAML)
    #[arg(long, global = true, env = "DITHER_LIVE_CONFIG")]
    config: Option<PathBuf>,

    /// Preference file (JSON); in-memory preferences when unset
    #[arg(long, global = true, env = "DITHER_LIVE_PREFS")]
    prefs: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one image through the pipeline and write the result as PNG
    Render(RenderArgs),
    /// List the available dithering variants
    Variants,
    /// Show stored preferences
    Prefs {
        /// Flip the theme between light and dark
        #[arg(long)]
        toggle_theme: bool,
    },
}

#[derive(Args)]
struct RenderArgs {
    /// Input PNG file
    input: PathBuf,

    /// Output PNG file path
    #[arg(short, long)]
    output: PathBuf,

    /// Dithering variant (see `dither-live variants`)
    #[arg(short, long)]
    variant: Option<String>,

    #[arg(long)]
    threshold: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    contrast: Option<f64>,

    #[arg(long)]
    gamma: Option<f64>,

    #[arg(long)]
    pixelation: Option<f64>,

    #[arg(long)]
    blur: Option<f64>,

    #[arg(long)]
    block_scale: Option<f64>,

    /// Ordered-dither matrix width
    #[arg(long)]
    bayer_width: Option<f64>,

    /// Ordered-dither matrix height
    #[arg(long)]
    bayer_height: Option<f64>,

    #[arg(long)]
    invert: bool,

    /// Rotation in degrees, snapped to a multiple of 90
    #[arg(long, allow_hyphen_values = true)]
    rotate: Option<i32>,

    /// Palette file: JSON array of hex colours, darkest first
    #[arg(long)]
    palette: Option<PathBuf>,

    /// Output width (height follows the aspect ratio when omitted)
    #[arg(long)]
    width: Option<i64>,

    /// Output height (width follows the aspect ratio when omitted)
    #[arg(long)]
    height: Option<i64>,

    /// Scale the natural size by this factor
    #[arg(long, conflicts_with_all = ["width", "height"])]
    scale: Option<f64>,

    /// Answer "downscale" to any size prompt
    #[arg(long, conflicts_with = "keep_size")]
    downscale: bool,

    /// Answer "keep size" to any size prompt
    #[arg(long)]
    keep_size: bool,

    /// Remember the answer and stop asking
    #[arg(long)]
    remember: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let prefs = open_preferences(cli.prefs.as_deref());

    match cli.command {
        Some(Commands::Render(args)) => {
            init_logging("dither_live=warn", false);
            let config = PipelineConfig::load_optional(cli.config.as_deref());
            run_render_command(args, config, prefs).await
        }
        Some(Commands::Variants) => {
            run_variants_command();
            Ok(())
        }
        Some(Commands::Prefs { toggle_theme }) => {
            init_logging("dither_live=info", true);
            run_prefs_command(prefs.as_ref(), toggle_theme).await
        }
        None => {
            let config = PipelineConfig::load_optional(cli.config.as_deref());
            run_status_command(&config, prefs.as_ref()).await;
            Ok(())
        }
    }
}

fn init_logging(default_filter: &str, with_time: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());
    let registry = tracing_subscriber::registry().with(filter);
    if with_time {
        registry.with(tracing_subscriber::fmt::layer()).init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().without_time())
            .init();
    }
}

fn open_preferences(path: Option<&Path>) -> Arc<dyn PreferenceStore> {
    match path {
        Some(p) => Arc::new(JsonFilePreferences::new(p)),
        None => Arc::new(MemoryPreferences::new()),
    }
}

/// Answers size prompts from flags, or asks on the terminal.
struct CliPrompter {
    answer: Option<bool>,
    remember: bool,
}

#[async_trait]
impl Prompter for CliPrompter {
    async fn ask(&self, decision: &PendingDecision) -> UserChoice {
        let downscale = match self.answer {
            Some(answer) => answer,
            None => ask_terminal(decision).await,
        };
        UserChoice {
            downscale,
            remember: self.remember,
        }
    }

    async fn notify(&self, message: &str) {
        eprintln!("{message}");
    }
}

async fn ask_terminal(decision: &PendingDecision) -> bool {
    let (w, h) = decision.proposed;
    let mut stderr = tokio::io::stderr();
    let question = format!("{} [y = {w}x{h} / N] ", decision.message);
    let _ = stderr.write_all(question.as_bytes()).await;
    let _ = stderr.flush().await;

    let mut line = String::new();
    let mut stdin = BufReader::new(tokio::io::stdin());
    match stdin.read_line(&mut line).await {
        Ok(0) | Err(_) => {
            tracing::warn!("No answer on stdin, keeping the requested size");
            false
        }
        Ok(_) => matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
    }
}

/// Render one image through the pipeline (no UI needed)
async fn run_render_command(
    args: RenderArgs,
    config: PipelineConfig,
    prefs: Arc<dyn PreferenceStore>,
) -> anyhow::Result<()> {
    let answer = if args.downscale {
        Some(true)
    } else if args.keep_size {
        Some(false)
    } else {
        None
    };
    let prompter = Arc::new(CliPrompter {
        answer,
        remember: args.remember,
    });
    let frame_interval = config.frame_interval_ms;
    let mut session = PipelineSession::new(config, prompter, prefs);

    let size = tokio::fs::metadata(&args.input)
        .await
        .with_context(|| format!("Cannot read {}", args.input.display()))?
        .len();
    session.check_ingestion(size)?;
    let bytes = tokio::fs::read(&args.input)
        .await
        .with_context(|| format!("Cannot read {}", args.input.display()))?;
    let incoming = session.ingest_png(&bytes)?;
    session.load_image(incoming).await?;

    if let Some(name) = &args.variant {
        let variant = Variant::from_name(name)
            .with_context(|| format!("Unknown variant {name:?}, see `dither-live variants`"))?;
        session.set_variant(variant);
    }
    let numeric = [
        (ParamField::Threshold, args.threshold),
        (ParamField::Contrast, args.contrast),
        (ParamField::Gamma, args.gamma),
        (ParamField::Pixelation, args.pixelation),
        (ParamField::Blur, args.blur),
        (ParamField::BlockScale, args.block_scale),
        (ParamField::MatrixWidth, args.bayer_width),
        (ParamField::MatrixHeight, args.bayer_height),
    ];
    for (field, value) in numeric {
        if let Some(v) = value {
            let applied = session.set_param(field, &v.to_string(), ChangeKind::Commit);
            tracing::debug!(field = field.name(), %applied, "Parameter");
        }
    }
    if args.invert {
        session.set_param(ParamField::Invert, "true", ChangeKind::Commit);
    }
    if let Some(degrees) = args.rotate {
        session.set_param(ParamField::Rotation, &degrees.to_string(), ChangeKind::Commit);
    }

    if let Some(path) = &args.palette {
        let json = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Cannot read palette {}", path.display()))?;
        let count = session
            .edit_palette(|p| p.import_json(&json))
            .with_context(|| format!("Invalid palette {}", path.display()))?;
        tracing::info!(colors = count, "Palette loaded");
    }

    if let Some(factor) = args.scale {
        session.scale_output_size(factor).await?;
    } else if let Some((w, h)) = requested_size(&session, args.width, args.height) {
        session.apply_output_size(w, h).await?;
    }

    let mut clock = IntervalClock::from_millis(frame_interval);
    session.next_frame(&mut clock).await?;

    let png_bytes = session.export_png()?;
    tokio::fs::write(&args.output, &png_bytes)
        .await
        .with_context(|| format!("Cannot write {}", args.output.display()))?;
    let (w, h) = session.presented_dimensions().unwrap_or_default();
    println!(
        "Rendered {} ({}x{}, {} bytes)",
        args.output.display(),
        w,
        h,
        png_bytes.len()
    );
    Ok(())
}

/// Fill in a missing side from the aspect ratio. Unusable input becomes 0,
/// which the session reports as invalid dimensions.
fn requested_size(
    session: &PipelineSession,
    width: Option<i64>,
    height: Option<i64>,
) -> Option<(i64, i64)> {
    match (width, height) {
        (Some(w), Some(h)) => Some((w, h)),
        (Some(w), None) => {
            let h = u32::try_from(w)
                .ok()
                .and_then(|w| session.companion_height(w))
                .map_or(0, i64::from);
            Some((w, h))
        }
        (None, Some(h)) => {
            let w = u32::try_from(h)
                .ok()
                .and_then(|h| session.companion_width(h))
                .map_or(0, i64::from);
            Some((w, h))
        }
        (None, None) => None,
    }
}

fn run_variants_command() {
    println!("{:<16} {:<22} {:<8} {:<10} block-scale", "name", "label", "matrix", "threshold");
    for d in VARIANT_TABLE.iter() {
        let yes_no = |b: bool| if b { "yes" } else { "-" };
        println!(
            "{:<16} {:<22} {:<8} {:<10} {}",
            d.name,
            d.label,
            yes_no(d.takes_matrix),
            yes_no(d.uses_threshold),
            yes_no(d.uses_block_scale)
        );
    }
    println!("\nDefault: {}", Variant::default());
}

async fn run_prefs_command(prefs: &dyn PreferenceStore, toggle_theme: bool) -> anyhow::Result<()> {
    if toggle_theme {
        let theme = Theme::toggle(prefs).await?;
        println!("Theme set to {}", theme.as_str());
        return Ok(());
    }
    let theme = prefs.get(THEME_KEY).await?;
    let suppress = prefs.get(SUPPRESS_DOWNSCALE_KEY).await?;
    println!("{THEME_KEY} = {}", theme.as_deref().unwrap_or("(unset)"));
    println!(
        "{SUPPRESS_DOWNSCALE_KEY} = {}",
        suppress.as_deref().unwrap_or("(unset)")
    );
    Ok(())
}

async fn run_status_command(config: &PipelineConfig, prefs: &dyn PreferenceStore) {
    println!("dither-live {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Configuration:");
    println!("  Max file size:      {} bytes", config.max_file_size);
    println!("  Optimal pixels:     {}", config.optimal_pixel_count);
    println!("  Output threshold:   {}", config.output_pixel_threshold);
    println!("  Default variant:    {}", config.default_variant);
    println!("  Frame interval:     {} ms", config.frame_interval_ms);

    let theme = Theme::load(prefs).await.unwrap_or_default();
    let suppressed = downscale_suppressed(prefs).await.unwrap_or(false);
    println!();
    println!("Preferences:");
    println!("  Theme:              {}", theme.as_str());
    println!("  Downscale prompts:  {}", if suppressed { "suppressed" } else { "on" });
    println!();
    println!("Run `dither-live render <input.png> -o <output.png>` to process an image.");
}
