use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DecodeError;

pub type TrackId = Uuid;

/// Where the raw, still-encoded media for a track lives.
#[derive(Clone, Debug)]
pub enum MediaRef {
    /// Read from disk only when the track's turn comes up in a merge.
    Path(PathBuf),
    Bytes {
        data: Arc<[u8]>,
        extension: Option<String>,
    },
}

impl MediaRef {
    pub fn extension(&self) -> Option<&str> {
        match self {
            MediaRef::Path(p) => p.extension().and_then(|e| e.to_str()),
            MediaRef::Bytes { extension, .. } => extension.as_deref(),
        }
    }
}

/// Provenance of a track: raw media to decode, or audio that is already decoded.
#[derive(Clone, Debug)]
pub enum TrackSource {
    File(MediaRef),
    Decoded(DecodedAudio),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrackKind {
    Music,
    Voiceover,
}

#[derive(Clone, Debug)]
pub struct Track {
    pub id: TrackId,
    pub name: String,
    /// Estimate until the track is decoded; see [`Segment::duration_secs`].
    pub duration_secs: f64,
    pub kind: TrackKind,
    pub source: TrackSource,
}

impl Track {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("untitled")
            .to_string();

        Self {
            id: Uuid::new_v4(),
            name,
            duration_secs: 0.0,
            kind: TrackKind::Music,
            source: TrackSource::File(MediaRef::Path(path.to_path_buf())),
        }
    }

    pub fn from_bytes(
        name: impl Into<String>,
        data: impl Into<Arc<[u8]>>,
        extension: Option<&str>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            duration_secs: 0.0,
            kind: TrackKind::Music,
            source: TrackSource::File(MediaRef::Bytes {
                data: data.into(),
                extension: extension.map(str::to_string),
            }),
        }
    }

    /// A generated spoken intro, already decoded by the speech collaborator.
    pub fn voiceover(name: impl Into<String>, audio: DecodedAudio) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            duration_secs: audio.duration_secs(),
            kind: TrackKind::Voiceover,
            source: TrackSource::Decoded(audio),
        }
    }

    pub fn is_decoded(&self) -> bool {
        matches!(self.source, TrackSource::Decoded(_))
    }
}

/// Per-channel float samples in [-1.0, 1.0], shaped `channels x frames`.
/// Always holds at least one channel; build it with [`DecodedAudio::from_channels`].
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedAudio {
    pub(crate) samples: Array2<f32>,
    pub sample_rate: u32,
}

impl DecodedAudio {
    pub fn from_channels(channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self, DecodeError> {
        let count = channels.len();
        if count == 0 {
            return Err(DecodeError::Corrupt("no audio channels".into()));
        }
        let frames = channels[0].len();
        if channels.iter().any(|c| c.len() != frames) {
            return Err(DecodeError::Corrupt("channels differ in length".into()));
        }

        let mut planar = Vec::with_capacity(count * frames);
        for ch in channels {
            planar.extend(ch);
        }
        let samples = Array2::from_shape_vec((count, frames), planar)
            .map_err(|e| DecodeError::Corrupt(e.to_string()))?;

        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// The whole buffer, one row per channel.
    pub fn samples(&self) -> &Array2<f32> {
        &self.samples
    }

    pub fn channels(&self) -> usize {
        self.samples.nrows()
    }

    pub fn frames(&self) -> usize {
        self.samples.ncols()
    }

    pub fn channel(&self, index: usize) -> ArrayView1<'_, f32> {
        self.samples.row(index)
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }
}

/// Interleaved 16-bit little-endian stereo bytes for one track.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PcmChunk(pub(crate) Vec<u8>);

impl PcmChunk {
    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn frames(&self) -> usize {
        self.0.len() / crate::core::pcm::STEREO_FRAME_BYTES
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

/// Where one track's PCM landed inside a [`MergeArtifact`].
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    pub track_id: TrackId,
    pub name: String,
    pub kind: TrackKind,
    /// Byte offset from the start of the artifact (header included).
    pub offset: usize,
    pub len: usize,
    pub frames: usize,
    pub sample_rate: u32,
}

impl Segment {
    pub fn duration_secs(&self) -> f64 {
        self.frames as f64 / self.sample_rate as f64
    }
}

/// The finished WAV file: header followed by every track's PCM in queue order.
#[derive(Clone, Debug, PartialEq)]
pub struct MergeArtifact {
    pub bytes: Vec<u8>,
    pub sample_rate: u32,
    pub channels: u16,
    pub segments: Vec<Segment>,
}

impl MergeArtifact {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn header(&self) -> &[u8] {
        &self.bytes[..crate::core::wav::HEADER_LEN]
    }

    pub fn data(&self) -> &[u8] {
        &self.bytes[crate::core::wav::HEADER_LEN..]
    }

    pub fn segment_bytes(&self, segment: &Segment) -> &[u8] {
        &self.bytes[segment.offset..segment.offset + segment.len]
    }

    pub fn duration_secs(&self) -> f64 {
        self.segments.iter().map(Segment::duration_secs).sum()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProcessingPhase {
    Idle,
    Analyzing,
    GeneratingIntro,
    Decoding,
    Merging,
    Completed,
    Error,
}

impl fmt::Display for ProcessingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProcessingPhase::Idle => "idle",
            ProcessingPhase::Analyzing => "analyzing",
            ProcessingPhase::GeneratingIntro => "generating-intro",
            ProcessingPhase::Decoding => "decoding",
            ProcessingPhase::Merging => "merging",
            ProcessingPhase::Completed => "completed",
            ProcessingPhase::Error => "error",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingState {
    pub phase: ProcessingPhase,
    pub message: String,
    /// 0..=100
    pub progress: u8,
}

impl ProcessingState {
    pub fn new(phase: ProcessingPhase, message: impl Into<String>, progress: u8) -> Self {
        Self {
            phase,
            message: message.into(),
            progress: progress.min(100),
        }
    }

    pub fn idle() -> Self {
        Self::new(ProcessingPhase::Idle, "Ready", 0)
    }

    pub fn is_idle(&self) -> bool {
        self.phase == ProcessingPhase::Idle
    }
}

impl Default for ProcessingState {
    fn default() -> Self {
        Self::idle()
    }
}
