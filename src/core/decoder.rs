use std::{fs::File, io::Cursor, io::ErrorKind};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use symphonia::core::{
    audio::SampleBuffer,
    codecs::{DecoderOptions, CODEC_TYPE_NULL},
    errors::Error as SymphoniaError,
    formats::FormatOptions,
    io::{MediaSource, MediaSourceStream},
    meta::MetadataOptions,
    probe::Hint,
};
use symphonia::default::{get_codecs, get_probe};
use tracing::{debug, warn};

use crate::{
    config::MixConfig,
    core::resample::conform,
    error::DecodeError,
    types::{DecodedAudio, MediaRef},
};

/// Layout of headerless 16-bit little-endian PCM coming from the speech service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PayloadFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

/// Decoding environment handle. Created once per session and passed by
/// reference into every decode call.
#[derive(Clone, Debug)]
pub struct DecodeEnv {
    pub sample_rate: u32,
    pub conform: bool,
    pub payload: PayloadFormat,
}

impl DecodeEnv {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            conform: true,
            payload: PayloadFormat {
                sample_rate: 24_000,
                channels: 1,
            },
        }
    }

    pub fn from_config(cfg: &MixConfig) -> Self {
        Self {
            sample_rate: cfg.sample_rate,
            conform: cfg.conform_sample_rate,
            payload: PayloadFormat {
                sample_rate: cfg.payload_sample_rate,
                channels: cfg.payload_channels,
            },
        }
    }

    /// Hand a freshly decoded buffer back at the environment's nominal rate.
    pub fn finish(&self, audio: DecodedAudio) -> Result<DecodedAudio, DecodeError> {
        if self.conform {
            conform(audio, self.sample_rate)
        } else {
            Ok(audio)
        }
    }
}

/// Turns raw media into a decoded buffer.
pub trait AudioDecoder {
    fn decode(&self, env: &DecodeEnv, media: &MediaRef) -> Result<DecodedAudio, DecodeError>;

    /// Decode a base64 speech payload. RIFF payloads go through [`decode`];
    /// anything else is read as raw PCM in `env.payload` format.
    ///
    /// [`decode`]: AudioDecoder::decode
    fn decode_payload(&self, env: &DecodeEnv, payload: &str) -> Result<DecodedAudio, DecodeError> {
        let cleaned: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        let bytes = BASE64
            .decode(cleaned.as_bytes())
            .map_err(|e| DecodeError::Payload(e.to_string()))?;

        if bytes.is_empty() {
            return Err(DecodeError::Empty);
        }

        if bytes.starts_with(b"RIFF") {
            let media = MediaRef::Bytes {
                data: bytes.into(),
                extension: Some("wav".into()),
            };
            return self.decode(env, &media);
        }

        let audio = pcm_s16le_to_audio(&bytes, env.payload)?;
        env.finish(audio)
    }
}

/// Decoder backed by symphonia's default codec and format registries.
#[derive(Clone, Copy, Debug, Default)]
pub struct SymphoniaDecoder;

impl SymphoniaDecoder {
    pub fn new() -> Self {
        Self
    }

    fn decode_source(
        &self,
        source: Box<dyn MediaSource>,
        extension: Option<&str>,
    ) -> Result<DecodedAudio, DecodeError> {
        let mss = MediaSourceStream::new(source, Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = extension {
            hint.with_extension(ext);
        }

        let probed = get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(probe_error)?;

        let mut format = probed.format;
        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| DecodeError::Unsupported("no audio track found".into()))?;

        let track_id = track.id;
        let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);
        let mut decoder = get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| DecodeError::Unsupported(e.to_string()))?;

        let mut channels: Vec<Vec<f32>> = Vec::new();
        let mut skipped = 0usize;

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == ErrorKind::UnexpectedEof => break,
                Err(SymphoniaError::ResetRequired) => break,
                Err(e) => return Err(DecodeError::Corrupt(e.to_string())),
            };

            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => {
                    let spec = *decoded.spec();
                    let count = spec.channels.count();
                    if channels.is_empty() {
                        channels = vec![Vec::new(); count];
                    } else if channels.len() != count {
                        return Err(DecodeError::Corrupt(format!(
                            "channel count changed mid-stream ({} -> {})",
                            channels.len(),
                            count
                        )));
                    }
                    sample_rate = spec.rate;

                    let mut buffer =
                        SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                    buffer.copy_interleaved_ref(decoded);

                    for frame in buffer.samples().chunks_exact(count) {
                        for (ch, &s) in channels.iter_mut().zip(frame) {
                            ch.push(s);
                        }
                    }
                }
                Err(SymphoniaError::DecodeError(msg)) => {
                    warn!("Skipping corrupt packet: {}", msg);
                    skipped += 1;
                }
                Err(SymphoniaError::IoError(_)) => break,
                Err(e) => return Err(DecodeError::Corrupt(e.to_string())),
            }
        }

        if channels.first().map_or(true, |c| c.is_empty()) {
            return Err(DecodeError::Corrupt("stream contains no audio frames".into()));
        }
        if sample_rate == 0 {
            return Err(DecodeError::Corrupt("stream does not declare a sample rate".into()));
        }

        debug!(
            "Decoded audio: sample_rate={}, channels={}, frames={}, skipped_packets={}",
            sample_rate,
            channels.len(),
            channels[0].len(),
            skipped
        );

        DecodedAudio::from_channels(channels, sample_rate)
    }
}

impl AudioDecoder for SymphoniaDecoder {
    fn decode(&self, env: &DecodeEnv, media: &MediaRef) -> Result<DecodedAudio, DecodeError> {
        let audio = match media {
            MediaRef::Path(path) => {
                let file = File::open(path).map_err(|e| {
                    DecodeError::Unreadable(format!("{}: {e}", path.display()))
                })?;
                let len = file
                    .metadata()
                    .map_err(|e| DecodeError::Unreadable(format!("{}: {e}", path.display())))?
                    .len();
                if len == 0 {
                    return Err(DecodeError::Empty);
                }
                self.decode_source(Box::new(file), media.extension())?
            }
            MediaRef::Bytes { data, .. } => {
                if data.is_empty() {
                    return Err(DecodeError::Empty);
                }
                self.decode_source(Box::new(Cursor::new(data.clone())), media.extension())?
            }
        };

        env.finish(audio)
    }
}

fn probe_error(e: SymphoniaError) -> DecodeError {
    match e {
        SymphoniaError::Unsupported(what) => DecodeError::Unsupported(what.to_string()),
        SymphoniaError::IoError(io) => {
            DecodeError::Unsupported(format!("unrecognised container: {io}"))
        }
        other => DecodeError::Corrupt(other.to_string()),
    }
}

/// Interpret `bytes` as interleaved 16-bit little-endian PCM.
pub fn pcm_s16le_to_audio(bytes: &[u8], format: PayloadFormat) -> Result<DecodedAudio, DecodeError> {
    let count = format.channels as usize;
    if count == 0 {
        return Err(DecodeError::Payload("payload declares zero channels".into()));
    }
    let frame_bytes = count * 2;
    if bytes.len() % frame_bytes != 0 {
        return Err(DecodeError::Payload(format!(
            "{} bytes is not a whole number of {}-channel frames",
            bytes.len(),
            count
        )));
    }

    let frames = bytes.len() / frame_bytes;
    let mut channels = vec![Vec::with_capacity(frames); count];
    for frame in bytes.chunks_exact(frame_bytes) {
        for (ch, pair) in channels.iter_mut().zip(frame.chunks_exact(2)) {
            let s = i16::from_le_bytes([pair[0], pair[1]]);
            ch.push(s as f32 / 32768.0);
        }
    }

    DecodedAudio::from_channels(channels, format.sample_rate)
}
