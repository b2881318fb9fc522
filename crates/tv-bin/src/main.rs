//! termview entrypoint.
use anyhow::Result;
use clap::{Parser, ValueEnum};
use core_config::load_from;
use core_render::{Renderer, RendererOptions};
use core_terminal::{CrosstermTerminal, OutputMode, TerminalCapabilities};
use std::path::{Path, PathBuf};
use std::sync::Once;
use std::time::Duration;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

mod demo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Demo {
    /// Star and fixed grid tracks with wrapping cells.
    Grid,
    /// Table generated from a list of items.
    Table,
    /// Vertical and horizontal stacks.
    Stack,
    /// Live screen fed by a background producer.
    Live,
}

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "termview", version, about = "Terminal span layout demos")]
struct Args {
    #[arg(value_enum, default_value_t = Demo::Grid)]
    demo: Demo,
    /// Output mode: auto, ansi, non_ansi or file (overrides the config file).
    #[arg(long)]
    mode: Option<OutputMode>,
    /// Optional configuration file path (overrides discovery of `termview.toml`).
    #[arg(long = "config")]
    config: Option<PathBuf>,
    /// Updates produced by the live demo.
    #[arg(long, default_value_t = 20)]
    ticks: u32,
    /// Delay between live updates, in milliseconds.
    #[arg(long, default_value_t = 200)]
    interval_ms: u64,
}

fn configure_logging() -> Option<WorkerGuard> {
    let log_dir = Path::new(".");
    let log_path = log_dir.join("termview.log");
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(log_dir, "termview.log");
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .with_ansi(false)
        .try_init()
        .ok()
        // A subscriber is already installed; dropping the guard stops the writer.
        .map(|_| guard)
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

fn main() -> Result<()> {
    let _log_guard = configure_logging();
    install_panic_hook();

    let args = Args::parse();
    let config = load_from(args.config.clone())?;
    let options = RendererOptions {
        mode: args.mode.unwrap_or_else(|| config.output_mode()),
        ..config.renderer_options()
    };

    let mut terminal = CrosstermTerminal::new();
    let caps = TerminalCapabilities::detect(&terminal);
    let config_path = config.path.as_ref().map(|p| p.display().to_string());
    info!(
        target: "runtime",
        demo = ?args.demo,
        requested = %options.mode,
        detected = %caps.mode,
        config = config_path.as_deref(),
        "startup"
    );

    let view = match args.demo {
        Demo::Grid => demo::grid(&config)?,
        Demo::Table => demo::table(&config)?,
        Demo::Stack => demo::stack(),
        Demo::Live => {
            if options.mode.resolve(&terminal) != OutputMode::File {
                terminal.set_title("termview")?;
                terminal.enter_alternate_screen()?;
            }
            let renderer = Renderer::new(terminal, options);
            return demo::live(
                renderer,
                &config,
                args.ticks,
                Duration::from_millis(args.interval_ms),
            );
        }
    };
    let mut renderer = Renderer::new(terminal, options);
    demo::show(&mut renderer, view.as_ref(), config.overwrite_on_render())
}
