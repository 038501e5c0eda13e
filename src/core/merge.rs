//! Streaming merge: decode, normalize and drop one track at a time, then wrap
//! the collected PCM in a single WAV container.
//!
//! At most one decoded buffer is alive at any point. Only the normalized
//! 16-bit chunks are kept until assembly, and those are released one by one
//! as they are copied into the artifact.

use std::{borrow::Cow, thread};

use anyhow::anyhow;
use tracing::{debug, info};

use crate::{
    config::MixConfig,
    core::{
        decoder::{AudioDecoder, DecodeEnv},
        pcm::{normalize, OUTPUT_CHANNELS},
        wav::{build_header, fits_data_len, HEADER_LEN},
    },
    error::{DecodeError, MixError, Result},
    types::{
        DecodedAudio, MergeArtifact, PcmChunk, ProcessingPhase, ProcessingState, Segment, Track,
        TrackSource,
    },
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MergeOptions {
    /// Progress reached once every track is decoded (0-100).
    pub decode_share: u8,
    pub yield_between_tracks: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            decode_share: 80,
            yield_between_tracks: true,
        }
    }
}

impl From<&MixConfig> for MergeOptions {
    fn from(cfg: &MixConfig) -> Self {
        Self {
            decode_share: cfg.decode_progress_share,
            yield_between_tracks: cfg.yield_between_tracks,
        }
    }
}

/// One merge invocation, advanced a track at a time with [`MergeJob::step`].
pub struct MergeJob<'a, D: AudioDecoder + ?Sized> {
    tracks: &'a [Track],
    decoder: &'a D,
    env: &'a DecodeEnv,
    decode_share: u8,
    next: usize,
    chunks: Vec<PcmChunk>,
    segments: Vec<Segment>,
    total_len: u64,
}

impl<'a, D: AudioDecoder + ?Sized> MergeJob<'a, D> {
    pub fn new(
        tracks: &'a [Track],
        decoder: &'a D,
        env: &'a DecodeEnv,
        decode_share: u8,
    ) -> Result<Self> {
        if tracks.is_empty() {
            return Err(MixError::EmptyInput);
        }
        if env.sample_rate == 0 {
            return Err(MixError::Config("sample rate must be positive".into()));
        }

        Ok(Self {
            tracks,
            decoder,
            env,
            decode_share: decode_share.min(100),
            next: 0,
            chunks: Vec::with_capacity(tracks.len()),
            segments: Vec::with_capacity(tracks.len()),
            total_len: 0,
        })
    }

    pub fn total_tracks(&self) -> usize {
        self.tracks.len()
    }

    pub fn completed_tracks(&self) -> usize {
        self.next
    }

    pub fn remaining(&self) -> usize {
        self.tracks.len() - self.next
    }

    /// PCM bytes accumulated so far.
    pub fn data_len(&self) -> u64 {
        self.total_len
    }

    /// Decode and normalize the next track. `None` once every track is done.
    pub fn step(&mut self) -> Result<Option<ProcessingState>> {
        if self.next >= self.tracks.len() {
            return Ok(None);
        }

        let tracks = self.tracks;
        let index = self.next;
        let total = tracks.len();
        let track = &tracks[index];
        debug!("Decoding track {}/{}: {}", index + 1, total, track.name);

        let audio: Cow<'_, DecodedAudio> = match &track.source {
            TrackSource::Decoded(audio) => Cow::Borrowed(audio),
            TrackSource::File(media) => {
                let decoded =
                    self.decoder
                        .decode(self.env, media)
                        .map_err(|source| MixError::Decode {
                            index,
                            name: track.name.clone(),
                            source,
                        })?;
                Cow::Owned(decoded)
            }
        };

        if audio.channels() == 0 {
            return Err(MixError::Decode {
                index,
                name: track.name.clone(),
                source: DecodeError::Corrupt("buffer has no channels".into()),
            });
        }
        if audio.sample_rate != self.env.sample_rate {
            return Err(MixError::SampleRateMismatch {
                index,
                name: track.name.clone(),
                expected: self.env.sample_rate,
                actual: audio.sample_rate,
            });
        }

        let chunk = normalize(&audio);
        let frames = audio.frames();
        drop(audio);

        let total_len = self.total_len + chunk.len() as u64;
        if !fits_data_len(total_len) {
            return Err(MixError::PayloadTooLarge { bytes: total_len });
        }

        self.segments.push(Segment {
            track_id: track.id,
            name: track.name.clone(),
            kind: track.kind,
            offset: HEADER_LEN + self.total_len as usize,
            len: chunk.len(),
            frames,
            sample_rate: self.env.sample_rate,
        });
        self.total_len = total_len;
        self.chunks.push(chunk);
        self.next += 1;

        let progress = ((self.next as f64 / total as f64) * self.decode_share as f64).round() as u8;
        Ok(Some(ProcessingState::new(
            ProcessingPhase::Decoding,
            format!("Decoded {}/{}: {}", self.next, total, track.name),
            progress.min(self.decode_share),
        )))
    }

    /// Build the header and concatenate every chunk behind it.
    pub fn finish(mut self) -> Result<MergeArtifact> {
        if self.next < self.tracks.len() {
            return Err(anyhow!(
                "merge finished with {} of {} tracks decoded",
                self.next,
                self.tracks.len()
            )
            .into());
        }
        if !fits_data_len(self.total_len) {
            return Err(MixError::PayloadTooLarge {
                bytes: self.total_len,
            });
        }

        let header = build_header(self.env.sample_rate, OUTPUT_CHANNELS, self.total_len as u32);
        let mut bytes = Vec::with_capacity(HEADER_LEN + self.total_len as usize);
        bytes.extend_from_slice(&header);
        for chunk in self.chunks.drain(..) {
            bytes.extend_from_slice(chunk.bytes());
        }

        info!(
            "Merged {} tracks into {} bytes at {}Hz",
            self.tracks.len(),
            bytes.len(),
            self.env.sample_rate
        );

        Ok(MergeArtifact {
            bytes,
            sample_rate: self.env.sample_rate,
            channels: OUTPUT_CHANNELS,
            segments: self.segments,
        })
    }
}

/// Run a whole merge, reporting every phase transition and every finished track.
pub fn merge_tracks<D: AudioDecoder + ?Sized>(
    tracks: &[Track],
    decoder: &D,
    env: &DecodeEnv,
    opts: &MergeOptions,
    mut on_state: impl FnMut(&ProcessingState),
) -> Result<MergeArtifact> {
    let mut job = MergeJob::new(tracks, decoder, env, opts.decode_share)?;

    on_state(&ProcessingState::new(
        ProcessingPhase::Decoding,
        format!("Decoding {} tracks", job.total_tracks()),
        0,
    ));

    while let Some(state) = job.step()? {
        on_state(&state);
        // let observers catch up and the allocator reclaim before the next decode
        if opts.yield_between_tracks && job.remaining() > 0 {
            thread::yield_now();
        }
    }

    on_state(&ProcessingState::new(
        ProcessingPhase::Merging,
        "Building WAV container",
        opts.decode_share.min(100),
    ));
    let artifact = job.finish()?;

    on_state(&ProcessingState::new(
        ProcessingPhase::Completed,
        "Mix ready",
        100,
    ));
    Ok(artifact)
}
