use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use ffs::audio::window::SampleWindow;
use ffs::driver::DriverSettings;

#[derive(Parser, Debug)]
#[command(name = "ffs", about = "Spectral feature summaries (ZCR, centroid, rolloff, flux) for audio tracks")]
pub struct Cli {
    /// Audio files or http(s) URLs (WAV, MP3, FLAC, OGG, AAC)
    #[arg(required = true)]
    pub inputs: Vec<String>,

    /// Config file (default: ./ffs.toml or ~/.config/ffs/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Analyser FFT size; frames carry fft_size / 2 bins
    #[arg(long, default_value_t = 2048)]
    pub fft_size: usize,

    /// Samples between consecutive frames
    #[arg(long, default_value_t = 4096)]
    pub buffer_size: usize,

    /// Analyser smoothing time constant (0.0-1.0)
    #[arg(long, default_value_t = 0.8)]
    pub smoothing: f32,

    /// Window start in seconds (default: middle of the track)
    #[arg(long)]
    pub offset: Option<f64>,

    /// Window length in seconds
    #[arg(long, default_value_t = 5.0)]
    pub duration: f64,

    /// Spectral rolloff fraction (0.0-1.0]
    #[arg(long, default_value_t = 0.85)]
    pub rolloff: f64,

    /// Number of most active bins to report per metric
    #[arg(long, default_value_t = 10)]
    pub top_k: usize,

    /// Seconds before the watchdog finalizes a stream that never ended
    #[arg(long, default_value_t = 30.0)]
    pub timeout: f64,

    /// Feed frames at the buffer cadence instead of as fast as possible
    #[arg(long)]
    pub realtime: bool,

    /// Emit JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Inputs analysed in parallel (0 = one per core)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,
}

impl Cli {
    pub fn settings(&self) -> DriverSettings {
        DriverSettings {
            fft_size: self.fft_size,
            buffer_size: self.buffer_size,
            smoothing: self.smoothing,
            window: SampleWindow {
                offset: self.offset,
                duration: self.duration,
            },
            rolloff_threshold: self.rolloff,
            top_k: self.top_k,
            timeout: Duration::from_secs_f64(self.timeout.max(0.0)),
            realtime: self.realtime,
        }
    }
}
