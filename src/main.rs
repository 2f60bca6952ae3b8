//! sciview CLI - Load, inspect and play back datasets headless.

use std::cell::RefCell;
use std::env;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{bail, Context};
use sciview::io::{Fetcher, FileFetcher};
use sciview::loader::{SourceDescriptor, SourceKind};
use sciview::scene::{HeadlessView, SceneView, StaticHost};
use sciview::{Mounted, Orchestrator, Settings};
use tokio::task::LocalSet;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const SURFACE: &str = "sciview";

#[derive(Clone, Copy, PartialEq, Eq)]
enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

/// Parsed command line.
struct Args {
    command: String,
    urls: Vec<String>,
    kind: Option<SourceKind>,
    interval_ms: Option<u64>,
    duration_ms: Option<u64>,
    preset: Option<String>,
    no_gzip: bool,
    verbosity: Verbosity,
}

fn parse_args(raw: &[String]) -> anyhow::Result<Option<Args>> {
    let mut args = Args {
        command: String::new(),
        urls: Vec::new(),
        kind: None,
        interval_ms: None,
        duration_ms: None,
        preset: None,
        no_gzip: false,
        verbosity: Verbosity::Normal,
    };
    let mut positional = Vec::new();
    let mut it = raw.iter();
    while let Some(arg) = it.next() {
        let mut value = |name: &str| {
            it.next()
                .cloned()
                .with_context(|| format!("{} needs a value", name))
        };
        match arg.as_str() {
            "-v" | "--verbose" => args.verbosity = Verbosity::Verbose,
            "-q" | "--quiet" => args.verbosity = Verbosity::Quiet,
            "-k" | "--kind" => args.kind = Some(value("--kind")?.parse()?),
            "-i" | "--interval" => args.interval_ms = Some(value("--interval")?.parse()?),
            "-d" | "--duration" => args.duration_ms = Some(value("--duration")?.parse()?),
            "-p" | "--preset" => args.preset = Some(value("--preset")?),
            "--no-gzip" => args.no_gzip = true,
            "-h" | "--help" => return Ok(None),
            "-V" | "--version" => {
                print_version();
                std::process::exit(0);
            }
            s if s.starts_with('-') => bail!("unknown option {}", s),
            _ => positional.push(arg.clone()),
        }
    }
    let mut positional = positional.into_iter();
    let Some(command) = positional.next() else {
        return Ok(None);
    };
    args.command = command;
    args.urls = positional.collect();
    Ok(Some(args))
}

fn print_usage(prog: &str) {
    println!("sciview - Load and play back scientific datasets");
    println!();
    println!("Usage: {} [options] <command> <source>...", prog);
    println!();
    println!("Commands:");
    println!("  i, info     Load a source and summarize its units");
    println!("  p, play     Load a source and play its frames");
    println!("  s, scene    Load a scene bundle (.zip or directory)");
    println!("  presets     List color presets");
    println!("  h, help     Show this help");
    println!();
    println!("Options:");
    println!("  -k, --kind <kind>      Source kind (inferred when omitted):");
    for kind in SourceKind::ALL {
        println!("                           {}", kind);
    }
    println!("  -i, --interval <ms>    Playback period");
    println!("  -d, --duration <ms>    How long to play (default: one full cycle)");
    println!("  -p, --preset <name>    Color preset");
    println!("      --no-gzip          Fetch dataset arrays uncompressed");
    println!("  -v, --verbose          Debug output");
    println!("  -q, --quiet            Warnings only");
    println!("  -V, --version          Show version");
    println!();
    println!("Set SCIVIEW_TRACE=1 to write a chrome trace to trace.json.");
}

fn print_version() {
    println!(
        "sciview {} (built {} {})",
        env!("CARGO_PKG_VERSION"),
        env!("SCIVIEW_BUILD_DATE"),
        env!("SCIVIEW_BUILD_TIME"),
    );
}

fn init_tracing(verbosity: Verbosity) -> Option<tracing_chrome::FlushGuard> {
    let default = match verbosity {
        Verbosity::Quiet => "warn",
        Verbosity::Normal => "info,sciview=debug",
        Verbosity::Verbose => "debug,sciview=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let (chrome_layer, guard) = if env::var("SCIVIEW_TRACE").ok().as_deref() == Some("1") {
        let (layer, guard) = tracing_chrome::ChromeLayerBuilder::new()
            .file("trace.json")
            .build();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .with(chrome_layer)
        .init();
    guard
}

/// Pick a kind from the shape and extension of the given URLs.
fn infer_kind(urls: &[String]) -> SourceKind {
    if urls.len() > 1 {
        return SourceKind::XmlMeshSeries;
    }
    let url = urls.first().map(String::as_str).unwrap_or_default();
    if url.ends_with(".vtk") {
        SourceKind::SingleLegacyMesh
    } else if url.ends_with(".vtp") {
        SourceKind::SingleXmlMesh
    } else if url.ends_with(".zip") {
        SourceKind::SceneBundle
    } else {
        SourceKind::RemoteCompressedDataset
    }
}

fn descriptor(args: &Args, kind: SourceKind) -> SourceDescriptor {
    if kind.takes_list() {
        return SourceDescriptor::list(kind, args.urls.iter().cloned());
    }
    let url = args.urls[0].clone();
    if kind == SourceKind::SceneBundle && url.ends_with(".zip") {
        SourceDescriptor::local_scene(url)
    } else {
        SourceDescriptor::single(kind, url)
    }
}

fn main() -> anyhow::Result<()> {
    let raw: Vec<String> = env::args().collect();
    let prog = raw.first().cloned().unwrap_or_else(|| "sciview".to_string());
    let Some(args) = parse_args(raw.get(1..).unwrap_or_default())? else {
        print_usage(&prog);
        return Ok(());
    };
    let _trace_guard = init_tracing(args.verbosity);

    let kind = match args.command.as_str() {
        "help" | "h" => {
            print_usage(&prog);
            return Ok(());
        }
        "presets" => {
            for name in colormaps::preset_names() {
                println!("{}", name);
            }
            return Ok(());
        }
        "info" | "i" | "play" | "p" => args.kind.unwrap_or_else(|| infer_kind(&args.urls)),
        "scene" | "s" => SourceKind::SceneBundle,
        other => bail!("unknown command {} (try {} help)", other, prog),
    };
    if args.urls.is_empty() {
        bail!("{} needs a source", args.command);
    }

    // Command line overrides apply to this run only
    let mut stored = Settings::load();
    let mut settings = stored.clone();
    if let Some(ms) = args.interval_ms {
        settings.playback_interval_ms = ms;
    }
    if let Some(preset) = &args.preset {
        settings.color_preset = preset.clone();
    }
    if args.no_gzip {
        settings.fetch_gzip = false;
    }

    let source = descriptor(&args, kind);
    let playing = matches!(args.command.as_str(), "play" | "p");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start runtime")?;
    let local = LocalSet::new();
    local.block_on(&runtime, run(&source, &settings, playing, args.duration_ms))?;

    stored.add_recent(args.urls.join(" "));
    if let Err(e) = stored.save() {
        tracing::warn!(error = %e, "Failed to save settings");
    }
    Ok(())
}

async fn run(
    source: &SourceDescriptor,
    settings: &Settings,
    playing: bool,
    duration_ms: Option<u64>,
) -> anyhow::Result<()> {
    let host = StaticHost::new().with_surface(SURFACE, 800, 600);
    let view = Rc::new(RefCell::new(HeadlessView::attach(&host, SURFACE)?));
    view.borrow_mut().set_background(settings.background);

    let fetcher: Rc<dyn Fetcher> = Rc::new(FileFetcher::new());
    let orchestrator = Orchestrator::new(view.clone(), fetcher, settings);

    let frames_seen = Rc::new(RefCell::new(0usize));
    let counter = frames_seen.clone();
    let mounted = orchestrator
        .load(source, move |cursor| {
            *counter.borrow_mut() += 1;
            println!("  frame {}", cursor);
        })
        .await
        .with_context(|| format!("Failed to load {}", source.location.urls().join(", ")))?;

    print_summary(&mounted, &view.borrow());

    if playing {
        match mounted.playback() {
            Some(playback) => {
                let cycle = orchestrator.interval() * playback.frame_count() as u32;
                let duration = duration_ms.map(Duration::from_millis).unwrap_or(cycle);
                println!(
                    "Playing {} frames for {} ms",
                    playback.frame_count(),
                    duration.as_millis()
                );
                tokio::time::sleep(duration).await;
                println!(
                    "Shown {} frames, {} redraws",
                    frames_seen.borrow(),
                    view.borrow().frames_rendered()
                );
            }
            None => println!("Nothing to play"),
        }
    }
    orchestrator.teardown(mounted);
    Ok(())
}

fn print_summary(mounted: &Mounted, view: &HeadlessView) {
    for unit in mounted.units() {
        let unit = unit.borrow();
        println!("Unit: {}", unit.name());
        if let Some(dataset) = unit.mapper.input() {
            let data = dataset.data();
            println!("  points: {}", data.number_of_points());
            println!("  cells:  {}", data.number_of_cells());
            if let Some(t) = dataset.time_value() {
                println!("  time:   {}", t);
            }
        }
        match &unit.mapper.lookup_table {
            Some(table) => {
                let [lo, hi] = table.range();
                let array = unit
                    .mapper
                    .color_by_array_name
                    .as_deref()
                    .unwrap_or("(active scalars)");
                println!("  color:  {} by {} over [{}, {}]", table.preset_name(), array, lo, hi);
            }
            None => println!("  color:  none"),
        }
    }
    if let Some(playback) = mounted.playback() {
        println!("Frames: {}", playback.frame_count());
    }
    let (w, h) = view.size();
    let bounds = view.visible_bounds();
    println!(
        "View: {}x{}, {} units, {} legends",
        w,
        h,
        view.unit_count(),
        view.scalar_bars().len()
    );
    if bounds.is_valid() {
        println!("Bounds: {:?} - {:?}", bounds.min, bounds.max);
    }
}
