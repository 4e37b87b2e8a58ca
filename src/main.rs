//! Binary entrypoint: mounts the carousels described in a YAML page file and
//! drives them from console commands on stdin.

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use slide_carousel::config::Configuration;
use slide_carousel::console::{self, Command};
use slide_carousel::page::RunningPage;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{Level, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Debug, Parser)]
#[command(name = "carousel", version, about = "Slideshow carousel driven from the terminal")]
struct Cli {
    /// Path to YAML page description
    #[arg(short, long, value_name = "FILE", default_value = "carousel.yaml")]
    config: PathBuf,

    /// Override every slider's autoplay speed (ms)
    #[arg(long, value_name = "MILLIS")]
    speed_ms: Option<u64>,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("slide_carousel={level}").parse()?)
        .add_directive(format!("carousel={level}").parse()?);
    fmt().with_env_filter(filter).with_target(false).compact().init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let mut cfg = Configuration::from_yaml_file(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;
    if let Some(ms) = cli.speed_ms {
        cfg.speed_override = Some(Duration::from_millis(ms));
    }
    let cfg = cfg.validated().context("invalid configuration values")?;

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!("ctrl-c handler failed: {err}");
                return;
            }
            info!("ctrl-c received; initiating shutdown");
            cancel.cancel();
        });
    }

    let page = RunningPage::spawn(&cfg, &cancel);
    if page.is_empty() {
        info!("no slideshow on the page could be initialized");
        return Ok(());
    }
    for (idx, inst) in page.instances().iter().enumerate() {
        info!("{idx}: {} {}", inst.id(), inst.snapshot().view);
    }

    // Bridge blocking stdin reads into the async loop. A plain thread, so a
    // pending read does not hold up runtime shutdown.
    let (line_tx, mut line_rx) = mpsc::channel::<String>(16);
    std::thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if line_tx.blocking_send(line).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    warn!("stdin read failed: {err}");
                    break;
                }
            }
        }
    });

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            maybe_line = line_rx.recv() => {
                let Some(line) = maybe_line else {
                    info!("stdin closed; initiating shutdown");
                    break;
                };
                match console::parse_line(&line) {
                    Ok(None) => {}
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(Command::Status { target })) => print_status(&page, target),
                    Ok(Some(Command::Send { target, event })) => {
                        if let Err(err) = page.dispatch(target, event).await {
                            warn!("{err}");
                        }
                    }
                    Err(err) => warn!("{err}"),
                }
            }
        }
    }

    for (id, surface) in page.shutdown().await? {
        info!("{id}: {surface}");
    }
    Ok(())
}

fn print_status(page: &RunningPage, target: Option<usize>) {
    let selected: Vec<usize> = match target {
        Some(idx) => vec![idx],
        None => (0..page.len()).collect(),
    };
    for idx in selected {
        match page.instance(idx) {
            Ok(inst) => {
                let snap = inst.snapshot();
                println!(
                    "{idx}: {} slide {}/{} autoplay={} ({:?}) {}",
                    inst.id(),
                    snap.index + 1,
                    snap.slides,
                    snap.autoplay_enabled,
                    snap.autoplay,
                    snap.view
                );
            }
            Err(err) => warn!("{err}"),
        }
    }
}
