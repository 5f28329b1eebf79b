//! livepane - render a project directory into a sandboxed preview page
//!
//! Usage: `livepane <project-dir> [--out <file>] [--config <file>]`

use livepane::project::load_dir;
use livepane::sandbox::FileSurface;
use livepane::synth::DocumentOutline;
use livepane::{LivepaneError, PreviewConfig, PreviewEngine, Result, UpdateOutcome, NAME, VERSION};
use std::env;
use std::path::PathBuf;
use std::time::Instant;

const USAGE: &str = "usage: livepane <project-dir> [--out <file>] [--config <file>]";
const DEFAULT_OUT: &str = "livepane-preview.html";

struct Options {
    project: PathBuf,
    out: PathBuf,
    config: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("{} v{}\n{}", NAME, VERSION, USAGE);
        return;
    }

    if let Err(e) = parse_args(&args).and_then(run) {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}

fn parse_args(args: &[String]) -> Result<Options> {
    let mut project = None;
    let mut out = None;
    let mut config = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--out" | "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| LivepaneError::Config(format!("{} needs a value\n{}", arg, USAGE)))?;
                if arg == "--out" {
                    out = Some(PathBuf::from(value));
                } else {
                    config = Some(PathBuf::from(value));
                }
            }
            flag if flag.starts_with("--") => {
                return Err(LivepaneError::Config(format!("unknown option {}\n{}", flag, USAGE)));
            }
            path if project.is_none() => project = Some(PathBuf::from(path)),
            extra => {
                return Err(LivepaneError::Config(format!("unexpected argument {}\n{}", extra, USAGE)));
            }
        }
    }

    Ok(Options {
        project: project.ok_or_else(|| LivepaneError::Config(USAGE.to_string()))?,
        out: out.unwrap_or_else(|| PathBuf::from(DEFAULT_OUT)),
        config,
    })
}

fn run(options: Options) -> Result<()> {
    let config = match &options.config {
        Some(path) => PreviewConfig::load(path)?,
        None => PreviewConfig::default(),
    };

    let project = load_dir(&options.project)?;
    let mut engine = PreviewEngine::new(project, FileSurface::new(&options.out), &config);

    let now = Instant::now();
    engine.mount(now)?;
    let outcome = engine.tick(now)?;

    let document = engine.synthesizer().synthesize(engine.source());
    match DocumentOutline::parse(&document) {
        Ok(outline) => log::info!("injected blocks: {}", outline.markers().join(", ")),
        Err(e) => log::warn!("could not outline the document: {}", e),
    }

    engine.unmount();

    match outcome {
        UpdateOutcome::Applied { .. } => {
            println!("✅ {} v{} wrote {}", NAME, VERSION, options.out.display());
            Ok(())
        }
        other => Err(LivepaneError::Config(format!("preview not written ({:?})", other))),
    }
}
