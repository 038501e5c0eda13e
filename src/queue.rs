use crate::{
    error::{MixError, Result},
    types::{Track, TrackId},
};

/// Ordered merge queue. Queue order is the order tracks appear in the mix.
#[derive(Clone, Debug, Default)]
pub struct TrackQueue {
    tracks: Vec<Track>,
}

impl TrackQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, track: Track) {
        self.tracks.push(track);
    }

    pub fn push_front(&mut self, track: Track) {
        self.tracks.insert(0, track);
    }

    pub fn remove(&mut self, id: TrackId) -> Option<Track> {
        let pos = self.tracks.iter().position(|t| t.id == id)?;
        Some(self.tracks.remove(pos))
    }

    pub fn move_track(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.tracks.len();
        if from >= len || to >= len {
            return Err(MixError::Reorder(format!(
                "cannot move {from} to {to} in a queue of {len}"
            )));
        }
        let track = self.tracks.remove(from);
        self.tracks.insert(to, track);
        Ok(())
    }

    /// Reorder so that position `i` holds the track previously at `order[i]`.
    pub fn apply_permutation(&mut self, order: &[usize]) -> Result<()> {
        let len = self.tracks.len();
        if order.len() != len {
            return Err(MixError::Reorder(format!(
                "expected {len} indices, got {}",
                order.len()
            )));
        }
        let mut seen = vec![false; len];
        for &i in order {
            if i >= len {
                return Err(MixError::Reorder(format!("index {i} out of range")));
            }
            if seen[i] {
                return Err(MixError::Reorder(format!("index {i} repeated")));
            }
            seen[i] = true;
        }

        let mut slots: Vec<Option<Track>> = self.tracks.drain(..).map(Some).collect();
        self.tracks = order.iter().filter_map(|&i| slots[i].take()).collect();
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Track> {
        self.tracks.iter()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn as_slice(&self) -> &[Track] {
        &self.tracks
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    pub fn total_duration_secs(&self) -> f64 {
        self.tracks.iter().map(|t| t.duration_secs).sum()
    }
}

impl Extend<Track> for TrackQueue {
    fn extend<I: IntoIterator<Item = Track>>(&mut self, iter: I) {
        self.tracks.extend(iter);
    }
}
