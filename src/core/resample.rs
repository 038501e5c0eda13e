//! Sample-rate conforming for the decoding environment.
//!
//! The merge itself never resamples; the environment hands it buffers that
//! are already at the nominal rate, the way a host audio context would.

use rubato::{FastFixedIn, PolynomialDegree, Resampler};
use tracing::debug;

use crate::{error::DecodeError, types::DecodedAudio};

/// Return `audio` at `target_rate`, untouched when it already is.
pub fn conform(audio: DecodedAudio, target_rate: u32) -> Result<DecodedAudio, DecodeError> {
    let source_rate = audio.sample_rate;
    if source_rate == target_rate {
        return Ok(audio);
    }
    if source_rate == 0 {
        return Err(DecodeError::Corrupt("source sample rate is zero".into()));
    }

    let frames = audio.frames();
    let channels = audio.channels();
    if frames == 0 {
        return Err(DecodeError::Empty);
    }

    debug!(
        "Resampling {} frames from {}Hz to {}Hz ({} channels)",
        frames, source_rate, target_rate, channels
    );

    // rubato wants planar Vec<Vec<f32>>
    let planar: Vec<Vec<f32>> = audio.samples.rows().into_iter().map(|r| r.to_vec()).collect();
    drop(audio);

    let ratio = target_rate as f64 / source_rate as f64;
    let expected = (frames as f64 * ratio).round() as usize;

    let mut resampler = FastFixedIn::<f32>::new(
        ratio,
        1.0,
        PolynomialDegree::Septic,
        frames,
        channels,
    )
    .map_err(|e| DecodeError::Resample(e.to_string()))?;

    let delay = resampler.output_delay();
    let mut out = resampler
        .process(&planar, None)
        .map_err(|e| DecodeError::Resample(e.to_string()))?;
    drop(planar);

    // Flush the tail still held back by the interpolator.
    while out.first().map_or(0, Vec::len) < delay + expected {
        let tail = resampler
            .process_partial::<Vec<f32>>(None, None)
            .map_err(|e| DecodeError::Resample(e.to_string()))?;
        if tail.first().map_or(true, |t| t.is_empty()) {
            break;
        }
        for (ch, t) in out.iter_mut().zip(tail) {
            ch.extend(t);
        }
    }

    for ch in out.iter_mut() {
        ch.drain(..delay.min(ch.len()));
        ch.resize(expected, 0.0);
    }

    DecodedAudio::from_channels(out, target_rate)
}
