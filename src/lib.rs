//! # storemix-core
//!
//! Streaming merge of an ordered track list (imported media files plus
//! optional generated voice intros) into one 16-bit stereo WAV file, keeping
//! at most one decoded track in memory at a time.

pub mod assist;
pub mod config;
pub mod core;
pub mod error;
pub mod io;
pub mod queue;
pub mod session;
pub mod types;

pub use crate::{
    config::MixConfig,
    core::{
        decoder::{AudioDecoder, DecodeEnv, SymphoniaDecoder},
        merge::{merge_tracks, MergeJob, MergeOptions},
        pcm::normalize,
        wav::{build_header, WavHeader},
    },
    error::{DecodeError, MixError, Result},
    io::{artifact::write_artifact, playlist::load_playlist},
    queue::TrackQueue,
    session::MixSession,
    types::{
        DecodedAudio, MediaRef, MergeArtifact, PcmChunk, ProcessingPhase, ProcessingState,
        Segment, Track, TrackId, TrackKind, TrackSource,
    },
};
