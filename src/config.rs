use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_fft_size")]
    pub fft_size: usize,
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
    #[serde(default = "default_smoothing")]
    pub smoothing: f32,
    #[serde(default = "default_rolloff")]
    pub rolloff: f64,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_timeout")]
    pub timeout: f64,
    #[serde(default)]
    pub realtime: bool,
}

#[derive(Debug, Deserialize)]
pub struct WindowConfig {
    #[serde(default)]
    pub offset: Option<f64>,
    #[serde(default = "default_duration")]
    pub duration: f64,
}

#[derive(Debug, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub json: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            fft_size: default_fft_size(),
            buffer_size: default_buffer_size(),
            smoothing: default_smoothing(),
            rolloff: default_rolloff(),
            top_k: default_top_k(),
            timeout: default_timeout(),
            realtime: false,
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            offset: None,
            duration: default_duration(),
        }
    }
}

fn default_fft_size() -> usize { 2048 }
fn default_buffer_size() -> usize { 4096 }
fn default_smoothing() -> f32 { 0.8 }
fn default_rolloff() -> f64 { 0.85 }
fn default_top_k() -> usize { 10 }
fn default_timeout() -> f64 { 30.0 }
fn default_duration() -> f64 { 5.0 }

pub fn load_config(path: &Path) -> Option<Config> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(err) => {
            log::debug!("{}: {}", path.display(), err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.analysis.fft_size, 2048);
        assert_eq!(config.analysis.buffer_size, 4096);
        assert_eq!(config.analysis.top_k, 10);
        assert_eq!(config.window.offset, None);
        assert_eq!(config.window.duration, 5.0);
        assert!(!config.output.json);
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let config: Config = toml::from_str(
            r#"
            [analysis]
            fft_size = 1024
            realtime = true

            [window]
            offset = 12.5
            "#,
        )
        .unwrap();
        assert_eq!(config.analysis.fft_size, 1024);
        assert!(config.analysis.realtime);
        assert_eq!(config.analysis.rolloff, 0.85);
        assert_eq!(config.window.offset, Some(12.5));
        assert_eq!(config.window.duration, 5.0);
    }

    #[test]
    fn missing_file_is_none() {
        assert!(load_config(Path::new("/no/such/ffs.toml")).is_none());
    }
}
