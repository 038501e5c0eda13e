use std::{env, fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::{MixError, Result};

pub const ENV_SAMPLE_RATE: &str = "STOREMIX_SAMPLE_RATE";
pub const ENV_PAYLOAD_SAMPLE_RATE: &str = "STOREMIX_PAYLOAD_SAMPLE_RATE";
pub const ENV_API_KEY: &str = "STOREMIX_API_KEY";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MixConfig {
    /// Nominal rate of the decoding environment, and of the finished mix.
    pub sample_rate: u32,
    /// Resample decoded buffers to `sample_rate` inside the decoding environment.
    pub conform_sample_rate: bool,
    /// Share of the 0-100 progress scale spent decoding.
    pub decode_progress_share: u8,
    pub yield_between_tracks: bool,
    /// Format of headerless PCM speech payloads.
    pub payload_sample_rate: u32,
    pub payload_channels: u16,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for MixConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            conform_sample_rate: true,
            decode_progress_share: 80,
            yield_between_tracks: true,
            payload_sample_rate: 24_000,
            payload_channels: 1,
            api_key: None,
        }
    }
}

impl MixConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| MixError::Config(format!("cannot read {}: {e}", path.display())))?;
        let cfg: MixConfig = serde_json::from_str(&text)?;
        Ok(cfg)
    }

    /// Overlay `STOREMIX_*` environment variables on top of `self`.
    pub fn with_env(mut self) -> Result<Self> {
        if let Some(rate) = env_u32(ENV_SAMPLE_RATE)? {
            self.sample_rate = rate;
        }
        if let Some(rate) = env_u32(ENV_PAYLOAD_SAMPLE_RATE)? {
            self.payload_sample_rate = rate;
        }
        if let Ok(key) = env::var(ENV_API_KEY) {
            self.api_key = Some(key);
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(MixError::Config("sample_rate must be positive".into()));
        }
        if self.payload_sample_rate == 0 {
            return Err(MixError::Config("payload_sample_rate must be positive".into()));
        }
        if self.payload_channels == 0 {
            return Err(MixError::Config("payload_channels must be positive".into()));
        }
        if self.decode_progress_share == 0 || self.decode_progress_share > 100 {
            return Err(MixError::Config(format!(
                "decode_progress_share must be within 1..=100, got {}",
                self.decode_progress_share
            )));
        }
        Ok(())
    }
}

fn env_u32(name: &str) -> Result<Option<u32>> {
    match env::var(name) {
        Ok(v) => v
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| MixError::Config(format!("{name} is not a valid integer: {v:?}"))),
        Err(_) => Ok(None),
    }
}
