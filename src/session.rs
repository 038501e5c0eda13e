use tracing::warn;

use crate::{
    assist::{require_credential, IntroGenerator, IntroRequest, Reorderer, TrackInfo},
    config::MixConfig,
    core::{
        decoder::{AudioDecoder, DecodeEnv, SymphoniaDecoder},
        merge::{merge_tracks, MergeOptions},
    },
    error::{MixError, Result},
    io::progress::ProgressHub,
    queue::TrackQueue,
    types::{MergeArtifact, ProcessingPhase, ProcessingState, Track, TrackId},
};

/// One user session: the queue, the decoding environment, and the single
/// authoritative processing state that observers watch.
pub struct MixSession<D: AudioDecoder = SymphoniaDecoder> {
    config: MixConfig,
    env: DecodeEnv,
    decoder: D,
    queue: TrackQueue,
    state: ProcessingState,
    hub: ProgressHub,
    artifact: Option<MergeArtifact>,
}

impl MixSession<SymphoniaDecoder> {
    pub fn new(config: MixConfig) -> Result<Self> {
        Self::with_decoder(config, SymphoniaDecoder::new())
    }
}

impl<D: AudioDecoder> MixSession<D> {
    pub fn with_decoder(config: MixConfig, decoder: D) -> Result<Self> {
        config.validate()?;
        let env = DecodeEnv::from_config(&config);

        Ok(Self {
            config,
            env,
            decoder,
            queue: TrackQueue::new(),
            state: ProcessingState::idle(),
            hub: ProgressHub::new(),
            artifact: None,
        })
    }

    pub fn config(&self) -> &MixConfig {
        &self.config
    }

    pub fn env(&self) -> &DecodeEnv {
        &self.env
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    pub fn state(&self) -> &ProcessingState {
        &self.state
    }

    pub fn queue(&self) -> &TrackQueue {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut TrackQueue {
        &mut self.queue
    }

    pub fn subscribe(&mut self, cb: impl Fn(&ProcessingState) + Send + 'static) {
        self.hub.subscribe(cb);
    }

    pub fn artifact(&self) -> Option<&MergeArtifact> {
        self.artifact.as_ref()
    }

    pub fn take_artifact(&mut self) -> Option<MergeArtifact> {
        self.artifact.take()
    }

    /// Merge the queue, in queue order, into one WAV artifact.
    ///
    /// An empty queue is refused without touching the state. Any other failure
    /// leaves the session in `error` with no artifact until [`reset`] is called.
    ///
    /// [`reset`]: MixSession::reset
    pub fn merge(&mut self) -> Result<&MergeArtifact> {
        if self.queue.is_empty() {
            return Err(MixError::EmptyInput);
        }
        self.ensure_idle()?;
        self.artifact = None;

        let opts = MergeOptions::from(&self.config);
        let state = &mut self.state;
        let hub = &self.hub;
        let result = merge_tracks(
            self.queue.as_slice(),
            &self.decoder,
            &self.env,
            &opts,
            |s| {
                hub.emit(s);
                *state = s.clone();
            },
        );

        match result {
            Ok(artifact) => Ok(self.artifact.insert(artifact)),
            Err(e) => {
                warn!("Merge failed: {}", e);
                self.fail(&e);
                Err(e)
            }
        }
    }

    /// Return to `idle`, dropping any published artifact.
    pub fn reset(&mut self) {
        self.artifact = None;
        self.set_state(ProcessingState::idle());
    }

    /// Ask the speech collaborator for an intro and put it at the front of the queue.
    pub fn generate_intro<G: IntroGenerator + ?Sized>(
        &mut self,
        generator: &G,
        request: &IntroRequest,
    ) -> Result<TrackId> {
        self.ensure_idle()?;
        let key = require_credential(self.config.api_key.as_deref())?.to_string();

        self.set_state(ProcessingState::new(
            ProcessingPhase::GeneratingIntro,
            format!("Writing intro for {}", request.store_name),
            0,
        ));

        let name = format!("Intro: {}", request.store_name);
        let outcome = generator
            .generate(&key, request)
            .map_err(MixError::from)
            .and_then(|payload| {
                self.decoder
                    .decode_payload(&self.env, &payload.audio_base64)
                    .map_err(|source| MixError::Speech {
                        name: name.clone(),
                        source,
                    })
            });

        match outcome {
            Ok(audio) => {
                let track = Track::voiceover(name, audio);
                let id = track.id;
                self.queue.push_front(track);
                self.set_state(ProcessingState::new(
                    ProcessingPhase::Idle,
                    "Intro ready",
                    0,
                ));
                Ok(id)
            }
            Err(e) => {
                warn!("Intro generation failed: {}", e);
                self.fail(&e);
                Err(e)
            }
        }
    }

    /// Let the ordering collaborator permute the queue.
    pub fn reorder_with<R: Reorderer + ?Sized>(&mut self, reorderer: &R) -> Result<()> {
        if self.queue.is_empty() {
            return Err(MixError::EmptyInput);
        }
        self.ensure_idle()?;
        let key = require_credential(self.config.api_key.as_deref())?.to_string();

        self.set_state(ProcessingState::new(
            ProcessingPhase::Analyzing,
            format!("Ordering {} tracks", self.queue.len()),
            0,
        ));

        let infos = TrackInfo::describe(self.queue.as_slice());
        let outcome = reorderer
            .reorder(&key, &infos)
            .map_err(MixError::from)
            .and_then(|order| self.queue.apply_permutation(&order));

        match outcome {
            Ok(()) => {
                self.set_state(ProcessingState::new(
                    ProcessingPhase::Idle,
                    "Playlist reordered",
                    0,
                ));
                Ok(())
            }
            Err(e) => {
                warn!("Reordering failed: {}", e);
                self.fail(&e);
                Err(e)
            }
        }
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.state.is_idle() {
            Ok(())
        } else {
            Err(MixError::NotIdle(self.state.phase))
        }
    }

    fn fail(&mut self, e: &MixError) {
        let progress = self.state.progress;
        self.set_state(ProcessingState::new(
            ProcessingPhase::Error,
            e.to_string(),
            progress,
        ));
    }

    fn set_state(&mut self, state: ProcessingState) {
        self.hub.emit(&state);
        self.state = state;
    }
}
