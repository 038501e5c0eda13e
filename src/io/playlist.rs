use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::{
    core::decoder::{AudioDecoder, DecodeEnv},
    error::{MixError, Result},
    types::Track,
};

#[derive(Debug, Deserialize)]
pub struct Playlist {
    pub tracks: Vec<PlaylistEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PlaylistEntry {
    /// A base64 speech payload stored in a file; becomes a voiceover track.
    Speech { name: String, payload: PathBuf },
    Media {
        path: PathBuf,
        #[serde(default)]
        name: Option<String>,
    },
}

/// Load a JSON playlist into queue order. Relative paths resolve against the
/// playlist's own directory. Media files are only checked for existence here;
/// speech payloads are decoded right away.
pub fn load_playlist<P, D>(path: P, decoder: &D, env: &DecodeEnv) -> Result<Vec<Track>>
where
    P: AsRef<Path>,
    D: AudioDecoder + ?Sized,
{
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .map_err(|e| MixError::Playlist(format!("cannot read {}: {e}", path.display())))?;
    let playlist: Playlist = serde_json::from_str(&text)
        .map_err(|e| MixError::Playlist(format!("{}: {e}", path.display())))?;

    let base = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tracks = Vec::with_capacity(playlist.tracks.len());

    for (index, entry) in playlist.tracks.into_iter().enumerate() {
        match entry {
            PlaylistEntry::Media { path, name } => {
                let full = base.join(path);
                if !full.is_file() {
                    return Err(MixError::Playlist(format!(
                        "track {} not found: {}",
                        index + 1,
                        full.display()
                    )));
                }
                let mut track = Track::from_path(&full);
                if let Some(name) = name {
                    track.name = name;
                }
                tracks.push(track);
            }
            PlaylistEntry::Speech { name, payload } => {
                let full = base.join(payload);
                let text = fs::read_to_string(&full).map_err(|e| {
                    MixError::Playlist(format!("cannot read payload {}: {e}", full.display()))
                })?;
                let audio = decoder
                    .decode_payload(env, &text)
                    .map_err(|source| MixError::Decode {
                        index,
                        name: name.clone(),
                        source,
                    })?;
                tracks.push(Track::voiceover(name, audio));
            }
        }
    }

    Ok(tracks)
}
