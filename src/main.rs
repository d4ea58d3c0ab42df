mod cli;
mod config;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::PathBuf;

use cli::Cli;
use config::Config;
use ffs::audio::source::Source;
use ffs::driver::analyze_source;
use ffs::report;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut cli = Cli::parse();

    // Load config: explicit --config path, or auto-detect ffs.toml / global config
    let config_path = cli.config.clone().or_else(|| {
        let local = PathBuf::from("ffs.toml");
        if local.exists() {
            return Some(local);
        }
        if let Some(home) = dirs::home_dir() {
            let xdg = home.join(".config").join("ffs").join("config.toml");
            if xdg.exists() {
                return Some(xdg);
            }
        }
        if let Some(config_dir) = dirs::config_dir() {
            let platform = config_dir.join("ffs").join("config.toml");
            if platform.exists() {
                return Some(platform);
            }
        }
        None
    });
    if let Some(ref path) = config_path {
        if let Some(cfg) = config::load_config(path) {
            log::info!("Loaded config from {}", path.display());
            merge_config(&mut cli, cfg);
        } else {
            log::warn!("Failed to load config from {}", path.display());
        }
    }

    if cli.jobs > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.jobs)
            .build_global()
            .context("Failed to configure worker pool")?;
    }

    let settings = cli.settings();
    let sources: Vec<Source> = cli.inputs.iter().map(|s| Source::parse(s)).collect();

    log::info!("ffs - spectral feature extraction");
    log::info!(
        "FFT size: {} ({} bins), buffer: {} samples",
        settings.fft_size,
        settings.fft_size / 2,
        settings.buffer_size
    );
    match settings.window.offset {
        Some(offset) => log::info!("Window: {:.1}s from {:.1}s", settings.window.duration, offset),
        None => log::info!("Window: {:.1}s from the middle of each track", settings.window.duration),
    }

    let pb = ProgressBar::new(sources.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} tracks ({eta} remaining)")
            .context("Invalid progress bar template")?
            .progress_chars("=>-"),
    );

    let outcomes: Vec<(Source, Result<ffs::AnalysisResult>)> = sources
        .into_par_iter()
        .map(|source| {
            let outcome = analyze_source(&source, &settings);
            pb.inc(1);
            (source, outcome)
        })
        .collect();

    pb.finish_with_message("Analysis complete");

    let mut results = Vec::with_capacity(outcomes.len());
    let mut failures = 0usize;
    for (source, outcome) in outcomes {
        match outcome {
            Ok(result) => {
                log::info!(
                    "{}: {} frames, avg ZCR {:.2}",
                    source,
                    result.frame_count,
                    result.average_zcr
                );
                results.push(result);
            }
            Err(err) => {
                log::error!("{}: {:#}", source, err);
                failures += 1;
            }
        }
    }

    let rendered = if cli.json {
        report::render_json(&results)?
    } else {
        report::render_text(&results)
    };

    match cli.output {
        Some(ref path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write report: {}", path.display()))?;
            log::info!("Report written to {}", path.display());
        }
        None => print!("{}", rendered),
    }

    if failures > 0 {
        anyhow::bail!("{} of {} inputs failed", failures, cli.inputs.len());
    }
    Ok(())
}

/// Config values apply only where the CLI is still at its default.
fn merge_config(cli: &mut Cli, cfg: Config) {
    if cli.fft_size == 2048 { cli.fft_size = cfg.analysis.fft_size; }
    if cli.buffer_size == 4096 { cli.buffer_size = cfg.analysis.buffer_size; }
    if cli.smoothing == 0.8 { cli.smoothing = cfg.analysis.smoothing; }
    if cli.rolloff == 0.85 { cli.rolloff = cfg.analysis.rolloff; }
    if cli.top_k == 10 { cli.top_k = cfg.analysis.top_k; }
    if cli.timeout == 30.0 { cli.timeout = cfg.analysis.timeout; }
    if !cli.realtime { cli.realtime = cfg.analysis.realtime; }
    if cli.offset.is_none() { cli.offset = cfg.window.offset; }
    if cli.duration == 5.0 { cli.duration = cfg.window.duration; }
    if !cli.json { cli.json = cfg.output.json; }
}
