//! Sirenbox - keyboard control surface for a dub siren and delay rig

use std::path::Path;
use std::sync::atomic::Ordering;
use std::sync::Mutex;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use sirenbox::config::{self, OutputMap, SirenboxConfig};
use sirenbox::control::ControlLoop;
use sirenbox::engine::{Engine, EngineHandle, EngineStats};
use sirenbox::surface::{self, headless};
use sirenbox::transport::{LogTransport, OscSender, Transport};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{Cli, Commands};

fn init_tracing(writer: BoxMakeWriter, ansi: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(writer)
        .with_ansi(ansi)
        .try_init();
}

fn build_transport(cfg: &SirenboxConfig, dry_run: bool) -> Result<Box<dyn Transport>> {
    if dry_run {
        tracing::info!("dry run, outbound messages are only logged");
        return Ok(Box::new(LogTransport::new()));
    }
    let sender = OscSender::new(&cfg.osc.host, cfg.osc.port)
        .with_context(|| format!("failed to open OSC sender for {}:{}", cfg.osc.host, cfg.osc.port))?;
    tracing::info!(addr = %sender.target(), "sending OSC");
    Ok(Box::new(sender))
}

/// Start the engine on `rt`, run `adapter` against its handle, then wait for it to stop
fn drive<F>(rt: &tokio::runtime::Runtime, cfg: &SirenboxConfig, dry_run: bool, adapter: F) -> Result<EngineStats>
where
    F: FnOnce(EngineHandle) -> Result<()>,
{
    let transport = build_transport(cfg, dry_run)?;
    let (engine, handle) = Engine::new(cfg, transport)?;

    let flag = handle.running_flag();
    ctrlc::set_handler(move || flag.store(false, Ordering::SeqCst))?;

    let task = rt.spawn(engine.run());
    adapter(handle)?;

    let stats = rt.block_on(task)?;
    Ok(stats)
}

fn print_summary(cfg: &SirenboxConfig) -> Result<()> {
    println!("  OSC target: {}:{}", cfg.osc.host, cfg.osc.port);
    println!("  Tick rate: {} Hz", cfg.engine.tick_hz);
    println!(
        "  Tap window: {:.2}s - {:.2}s, median of {} intervals",
        cfg.tap.interval_min, cfg.tap.interval_max, cfg.tap.intervals
    );
    // Built the same way the engine builds it
    let control = ControlLoop::new(cfg)?;
    println!("  Parameters: {}", cfg.parameters.len());
    for param in control.parameters() {
        let settle_ms = param.settle_ticks() * 1000.0 / cfg.engine.tick_hz;
        println!(
            "    - {:<12} {:.3} in [{}, {}] step {} {}",
            param.id().as_str(),
            param.target(),
            param.min(),
            param.max(),
            param.step(),
            if param.is_instant() {
                "(instant)".to_string()
            } else {
                format!("alpha {}, settles in ~{:.0} ms", param.alpha(), settle_ms)
            }
        );
    }
    println!("  Outputs: {}", cfg.outputs.len());
    for output in &cfg.outputs {
        let map = match output.map {
            OutputMap::Direct => "direct".to_string(),
            OutputMap::Exponential { min, max } => format!("exp {}..{}", min, max),
        };
        println!(
            "    - /{} <- {} ({}, eps {})",
            output.address.trim_start_matches('/'),
            output.source,
            map,
            output.epsilon
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Play { config: config_path, dry_run, log_file } => {
            // The UI owns the terminal
            let writer = match log_file {
                Some(path) => {
                    let file = std::fs::File::create(&path)
                        .with_context(|| format!("failed to create log file {:?}", path))?;
                    BoxMakeWriter::new(Mutex::new(file))
                }
                None => BoxMakeWriter::new(std::io::sink),
            };
            init_tracing(writer, false);

            let cfg = config::load_or_default(&config_path)?;
            let rt = tokio::runtime::Runtime::new()?;
            let stats = drive(&rt, &cfg, dry_run, |handle| {
                let result = surface::run_surface(&handle);
                handle.stop();
                result
            })?;

            println!(
                "Stopped after {} ticks, {} events, {} messages sent ({} failed)",
                stats.ticks, stats.events, stats.sent, stats.failed
            );
        }

        Commands::Run { config: config_path, dry_run, linger } => {
            init_tracing(BoxMakeWriter::new(std::io::stderr), true);

            let cfg = config::load_or_default(&config_path)?;
            let rt = tokio::runtime::Runtime::new()?;

            drive(&rt, &cfg, dry_run, |handle| {
                // stdin blocks, so it gets its own thread; ctrl-c stops the engine regardless
                std::thread::Builder::new()
                    .name("stdin".to_string())
                    .spawn(move || {
                        let stdin = std::io::stdin();
                        if let Err(e) = headless::run_lines(stdin.lock(), &handle, Instant::now()) {
                            tracing::warn!(error = %e, "stdin read failed");
                        }
                        std::thread::sleep(linger);
                        handle.stop();
                    })?;
                Ok(())
            })?;
        }

        Commands::Check { config: config_path } => {
            println!("Checking configuration at {:?}...", config_path);

            match config::load_config(&config_path) {
                Ok(cfg) => {
                    println!("Configuration is valid!");
                    print_summary(&cfg)?;
                }
                Err(e) => {
                    println!("Configuration is invalid: {:#}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Init => {
            let path = "sirenbox.yaml";
            if Path::new(path).exists() {
                println!("sirenbox.yaml already exists. Not overwriting.");
            } else {
                std::fs::write(path, config::EXAMPLE_CONFIG)?;
                println!("Created sirenbox.yaml with example configuration.");
            }
        }

        Commands::Dump { config: config_path } => {
            init_tracing(BoxMakeWriter::new(std::io::stderr), true);

            let cfg = config::load_or_default(&config_path)?;
            print!("{}", serde_yaml::to_string(&cfg)?);
        }
    }

    Ok(())
}
