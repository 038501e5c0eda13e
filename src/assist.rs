//! Boundaries to the AI collaborators: intro narration and playlist ordering.
//! Both are black boxes; this crate only checks credentials, calls them, and
//! validates what comes back.

use serde::{Deserialize, Serialize};

use crate::{
    error::{MixError, Result},
    types::{Track, TrackKind},
};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct IntroRequest {
    pub store_name: String,
    /// Free-form brief: tone, promotions, opening hours.
    pub brief: String,
    pub language: Option<String>,
}

/// Script text plus the synthesized speech, base64 encoded.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpeechPayload {
    pub script: String,
    pub audio_base64: String,
}

/// What an ordering collaborator gets to see of each queued track.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrackInfo {
    pub index: usize,
    pub name: String,
    pub kind: TrackKind,
    pub duration_secs: f64,
}

impl TrackInfo {
    pub fn describe(tracks: &[Track]) -> Vec<TrackInfo> {
        tracks
            .iter()
            .enumerate()
            .map(|(index, t)| TrackInfo {
                index,
                name: t.name.clone(),
                kind: t.kind,
                duration_secs: t.duration_secs,
            })
            .collect()
    }
}

pub trait IntroGenerator {
    fn generate(&self, api_key: &str, request: &IntroRequest) -> anyhow::Result<SpeechPayload>;
}

pub trait Reorderer {
    /// Returns a permutation of `0..tracks.len()`: new position -> old index.
    fn reorder(&self, api_key: &str, tracks: &[TrackInfo]) -> anyhow::Result<Vec<usize>>;
}

pub fn require_credential(key: Option<&str>) -> Result<&str> {
    match key.map(str::trim) {
        Some(k) if !k.is_empty() => Ok(k),
        _ => Err(MixError::MissingCredential("API key")),
    }
}
