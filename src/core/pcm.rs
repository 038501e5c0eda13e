use crate::types::{DecodedAudio, PcmChunk};

pub const OUTPUT_CHANNELS: u16 = 2;
pub const BYTES_PER_SAMPLE: usize = 2;
pub const STEREO_FRAME_BYTES: usize = OUTPUT_CHANNELS as usize * BYTES_PER_SAMPLE;

/// Float sample to 16-bit PCM. Negative values scale by 32768 and the rest by
/// 32767, so both ends of [-1.0, 1.0] land exactly on the i16 limits.
#[inline]
pub fn sample_to_i16(sample: f32) -> i16 {
    let s = sample.clamp(-1.0, 1.0);
    if s < 0.0 {
        (s * 32768.0) as i16
    } else {
        (s * 32767.0) as i16
    }
}

/// Convert one decoded buffer to interleaved 16-bit little-endian stereo.
///
/// Mono is duplicated to both sides; with two or more channels the first two
/// become left and right and the rest are dropped.
pub fn normalize(audio: &DecodedAudio) -> PcmChunk {
    let frames = audio.frames();
    let mut out = Vec::with_capacity(frames * STEREO_FRAME_BYTES);

    let left = audio.channel(0);
    let right = if audio.channels() == 1 {
        audio.channel(0)
    } else {
        audio.channel(1)
    };

    for (&l, &r) in left.iter().zip(right.iter()) {
        out.extend_from_slice(&sample_to_i16(l).to_le_bytes());
        out.extend_from_slice(&sample_to_i16(r).to_le_bytes());
    }

    PcmChunk(out)
}

/// Read a normalized chunk back as (left, right) frames.
pub fn stereo_frames(bytes: &[u8]) -> Vec<[i16; 2]> {
    bytes
        .chunks_exact(STEREO_FRAME_BYTES)
        .map(|f| {
            [
                i16::from_le_bytes([f[0], f[1]]),
                i16::from_le_bytes([f[2], f[3]]),
            ]
        })
        .collect()
}
