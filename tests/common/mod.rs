#![allow(dead_code)]

use std::{cell::RefCell, collections::HashMap, path::Path};

use storemix_core::{AudioDecoder, DecodeEnv, DecodeError, DecodedAudio, MediaRef, Track};

pub fn constant(channels: usize, frames: usize, value: f32, sample_rate: u32) -> DecodedAudio {
    DecodedAudio::from_channels(vec![vec![value; frames]; channels], sample_rate).unwrap()
}

/// Mono ramp from -1.0 up to (almost) 1.0.
pub fn ramp(frames: usize, sample_rate: u32) -> DecodedAudio {
    let ch: Vec<f32> = (0..frames)
        .map(|i| -1.0 + 2.0 * i as f32 / frames as f32)
        .collect();
    DecodedAudio::from_channels(vec![ch], sample_rate).unwrap()
}

/// Write 16-bit PCM interleaved `samples` as a WAV file with hound.
pub fn write_wav(path: &Path, channels: u16, sample_rate: u32, samples: &[i16]) {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for &s in samples {
        writer.write_sample(s).unwrap();
    }
    writer.finalize().unwrap();
}

/// Decoder that hands out scripted buffers keyed by the track's raw bytes.
#[derive(Default)]
pub struct MockDecoder {
    buffers: HashMap<Vec<u8>, DecodedAudio>,
    failing: Vec<Vec<u8>>,
    calls: RefCell<Vec<String>>,
}

impl MockDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&mut self, name: &str, audio: DecodedAudio) -> Track {
        let key = name.as_bytes().to_vec();
        self.buffers.insert(key.clone(), audio);
        Track::from_bytes(name, key, None)
    }

    pub fn broken_track(&mut self, name: &str) -> Track {
        let key = name.as_bytes().to_vec();
        self.failing.push(key.clone());
        Track::from_bytes(name, key, None)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl AudioDecoder for MockDecoder {
    fn decode(&self, _env: &DecodeEnv, media: &MediaRef) -> Result<DecodedAudio, DecodeError> {
        let key = match media {
            MediaRef::Bytes { data, .. } => data.to_vec(),
            MediaRef::Path(p) => p.to_string_lossy().as_bytes().to_vec(),
        };
        self.calls
            .borrow_mut()
            .push(String::from_utf8_lossy(&key).into_owned());

        if self.failing.contains(&key) {
            return Err(DecodeError::Corrupt("scripted failure".into()));
        }
        self.buffers
            .get(&key)
            .cloned()
            .ok_or_else(|| DecodeError::Unsupported("unknown mock track".into()))
    }
}
