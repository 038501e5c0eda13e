//! Canonical 44-byte RIFF/WAVE header for 16-bit PCM.

pub const HEADER_LEN: usize = 44;
pub const BITS_PER_SAMPLE: u16 = 16;
const FORMAT_PCM: u16 = 0x0001;
const FMT_CHUNK_LEN: u32 = 16;

/// Largest data payload whose RIFF size field (`36 + len`) still fits in a u32.
pub const MAX_DATA_LEN: u64 = u32::MAX as u64 - 36;

/// Whether `len` bytes of PCM can be described by a single header.
pub fn fits_data_len(len: u64) -> bool {
    len <= MAX_DATA_LEN
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WavHeader {
    pub sample_rate: u32,
    pub channels: u16,
    /// Payload length in bytes.
    pub data_len: u32,
}

impl WavHeader {
    pub fn new(sample_rate: u32, channels: u16, data_len: u32) -> Self {
        Self {
            sample_rate,
            channels,
            data_len,
        }
    }

    pub fn block_align(&self) -> u16 {
        self.channels.wrapping_mul(BITS_PER_SAMPLE / 8)
    }

    pub fn byte_rate(&self) -> u32 {
        self.sample_rate.wrapping_mul(self.block_align() as u32)
    }

    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut h = [0u8; HEADER_LEN];

        // RIFF chunk descriptor
        h[0..4].copy_from_slice(b"RIFF");
        h[4..8].copy_from_slice(&36u32.wrapping_add(self.data_len).to_le_bytes());
        h[8..12].copy_from_slice(b"WAVE");

        // fmt sub-chunk
        h[12..16].copy_from_slice(b"fmt ");
        h[16..20].copy_from_slice(&FMT_CHUNK_LEN.to_le_bytes());
        h[20..22].copy_from_slice(&FORMAT_PCM.to_le_bytes());
        h[22..24].copy_from_slice(&self.channels.to_le_bytes());
        h[24..28].copy_from_slice(&self.sample_rate.to_le_bytes());
        h[28..32].copy_from_slice(&self.byte_rate().to_le_bytes());
        h[32..34].copy_from_slice(&self.block_align().to_le_bytes());
        h[34..36].copy_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

        // data sub-chunk
        h[36..40].copy_from_slice(b"data");
        h[40..44].copy_from_slice(&self.data_len.to_le_bytes());

        h
    }

    /// Parse a canonical 44-byte PCM header. Anything else yields `None`.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < HEADER_LEN {
            return None;
        }
        if &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
            return None;
        }
        if &bytes[12..16] != b"fmt " || &bytes[36..40] != b"data" {
            return None;
        }

        let u16_at = |i: usize| u16::from_le_bytes([bytes[i], bytes[i + 1]]);
        let u32_at =
            |i: usize| u32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);

        if u32_at(16) != FMT_CHUNK_LEN
            || u16_at(20) != FORMAT_PCM
            || u16_at(34) != BITS_PER_SAMPLE
        {
            return None;
        }

        let header = Self {
            channels: u16_at(22),
            sample_rate: u32_at(24),
            data_len: u32_at(40),
        };

        if u32_at(4) != 36u32.wrapping_add(header.data_len)
            || u32_at(28) != header.byte_rate()
            || u16_at(32) != header.block_align()
        {
            return None;
        }

        Some(header)
    }
}

pub fn build_header(sample_rate: u32, channels: u16, data_len: u32) -> [u8; HEADER_LEN] {
    WavHeader::new(sample_rate, channels, data_len).to_bytes()
}
