use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "wirescene", version)]
struct Cli {
    /// Log verbosity written to stderr.
    #[arg(long, value_enum, global = true, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a wireframe document to a PNG.
    Render(RenderArgs),
    /// Print the render report, memory stats and a scene outline as JSON.
    Inspect(InspectArgs),
    /// Report sections that would render as placeholders.
    Validate(ValidateArgs),
}

#[derive(Parser, Debug)]
struct SceneArgs {
    /// Input wireframe document JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    #[arg(long, value_enum, default_value_t = DeviceChoice::Desktop)]
    device: DeviceChoice,

    /// Use the dark palette.
    #[arg(long)]
    dark: bool,

    /// Session config JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Draw an alignment grid beneath the scene.
    #[arg(long, value_enum)]
    grid: Option<GridChoice>,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    #[command(flatten)]
    scene: SceneArgs,
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Input wireframe document JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DeviceChoice {
    Mobile,
    Tablet,
    Desktop,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum GridChoice {
    Lines,
    Dots,
    Columns,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = match cli.log_level {
        LogLevel::Error => tracing::Level::ERROR,
        LogLevel::Warn => tracing::Level::WARN,
        LogLevel::Info => tracing::Level::INFO,
        LogLevel::Debug => tracing::Level::DEBUG,
        LogLevel::Trace => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Inspect(args) => cmd_inspect(args),
        Command::Validate(args) => cmd_validate(args),
    }
}

fn read_json(path: &Path) -> anyhow::Result<serde_json::Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read document '{}'", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse JSON '{}'", path.display()))
}

fn load_opts(path: Option<&Path>) -> anyhow::Result<wirescene::SessionOpts> {
    let opts = match path {
        Some(p) => {
            let text = std::fs::read_to_string(p)
                .with_context(|| format!("read config '{}'", p.display()))?;
            wirescene::SessionOpts::from_json_str(&text)?
        }
        None => wirescene::SessionOpts::default(),
    };
    Ok(opts.with_env_overrides())
}

fn render_options(args: &SceneArgs) -> wirescene::RenderOptions {
    let device_type = match args.device {
        DeviceChoice::Mobile => wirescene::DeviceType::Mobile,
        DeviceChoice::Tablet => wirescene::DeviceType::Tablet,
        DeviceChoice::Desktop => wirescene::DeviceType::Desktop,
    };
    wirescene::RenderOptions {
        device_type,
        dark_mode: args.dark,
        render_grid: false,
    }
}

/// Opens a session and renders the document into it.
fn open_scene(
    args: &SceneArgs,
) -> anyhow::Result<(wirescene::CanvasSession, wirescene::RenderReport)> {
    let opts = load_opts(args.config.as_deref())?;
    let doc = read_json(&args.in_path)?;
    let mut session = wirescene::CanvasSession::open(wirescene::SessionId(1), opts)?;
    let report = session.render_value(doc, render_options(args))?;
    for e in &report.per_section_errors {
        eprintln!("section {}: {}", e.index, e.message);
    }
    if let Some(e) = &report.document_error {
        eprintln!("document: {e}");
    }
    Ok((session, report))
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let (mut session, _report) = open_scene(&args.scene)?;

    if let Some(choice) = args.grid {
        let kind = match choice {
            GridChoice::Lines => wirescene::GridKind::Lines,
            GridChoice::Dots => wirescene::GridKind::Dots,
            GridChoice::Columns => wirescene::GridKind::Columns,
        };
        let config = wirescene::GridConfig {
            kind,
            ..*session.grid_config()
        };
        session.set_grid_config(config)?;
        session.toggle_grid(true)?;
    }

    // Whole scene, not just the initial viewport.
    let (w, h) = (session.canvas().width, session.canvas().height);
    session.resize_viewport(w.min(f64::from(u16::MAX)), h.min(f64::from(u16::MAX)))?;
    session.flush()?;
    let frame = session.frame();

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        &args.out,
        &frame.to_straight_rgba(),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let (session, report) = open_scene(&args.scene)?;
    let outline: Vec<serde_json::Value> = session
        .canvas()
        .content()
        .iter()
        .map(|root| {
            serde_json::json!({
                "id": root.id.0,
                "owner": root.owner,
                "role": root.role,
                "geometry": root.geometry,
                "nodes": root.node_count(),
                "texts": root.texts(),
            })
        })
        .collect();
    let out = serde_json::json!({
        "report": report,
        "memory": session.get_memory_stats()?,
        "scene": outline,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let value = read_json(&args.in_path)?;
    let doc = wirescene::WireframeDocument::from_value(value)?;
    let problems = doc.section_problems();
    for (idx, msg) in &problems {
        println!("section {idx}: {msg}");
    }
    if !problems.is_empty() {
        anyhow::bail!(
            "{} of {} sections would render as placeholders",
            problems.len(),
            doc.section_count()
        );
    }
    println!("ok: {} sections", doc.section_count());
    Ok(())
}
