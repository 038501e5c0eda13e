use std::fs;

use storemix_core::core::wav::{build_header, fits_data_len, WavHeader, HEADER_LEN, MAX_DATA_LEN};
use tempfile::tempdir;

fn u16_at(b: &[u8], i: usize) -> u16 {
    u16::from_le_bytes([b[i], b[i + 1]])
}

fn u32_at(b: &[u8], i: usize) -> u32 {
    u32::from_le_bytes([b[i], b[i + 1], b[i + 2], b[i + 3]])
}

#[test]
fn header_fields_for_cd_rate_stereo() {
    let h = build_header(44_100, 2, 1000);
    assert_eq!(h.len(), HEADER_LEN);

    assert_eq!(&h[0..4], b"RIFF");
    assert_eq!(u32_at(&h, 4), 1036);
    assert_eq!(&h[8..12], b"WAVE");
    assert_eq!(&h[12..16], b"fmt ");
    assert_eq!(u32_at(&h, 16), 16);
    assert_eq!(u16_at(&h, 20), 1);
    assert_eq!(u16_at(&h, 22), 2);
    assert_eq!(u32_at(&h, 24), 44_100);
    assert_eq!(u32_at(&h, 28), 176_400);
    assert_eq!(u16_at(&h, 32), 4);
    assert_eq!(u16_at(&h, 34), 16);
    assert_eq!(&h[36..40], b"data");
    assert_eq!(u32_at(&h, 40), 1000);
}

#[test]
fn header_is_byte_exact() {
    let expected: [u8; 44] = [
        b'R', b'I', b'F', b'F', 0x24, 0xFA, 0x00, 0x00, // 36 + 64000
        b'W', b'A', b'V', b'E', b'f', b'm', b't', b' ', //
        0x10, 0x00, 0x00, 0x00, 0x01, 0x00, 0x02, 0x00, // fmt len, PCM, 2ch
        0x40, 0x1F, 0x00, 0x00, 0x00, 0x7D, 0x00, 0x00, // 8000 Hz, 32000 B/s
        0x04, 0x00, 0x10, 0x00, b'd', b'a', b't', b'a', // align 4, 16 bit
        0x00, 0xFA, 0x00, 0x00, // 64000
    ];
    assert_eq!(build_header(8000, 2, 64_000), expected);
}

#[test]
fn empty_payload_header() {
    let h = build_header(48_000, 2, 0);
    assert_eq!(u32_at(&h, 4), 36);
    assert_eq!(u32_at(&h, 40), 0);
}

#[test]
fn parse_reads_back_what_was_built() {
    let header = WavHeader::new(22_050, 2, 4096);
    assert_eq!(WavHeader::parse(&header.to_bytes()), Some(header));
}

#[test]
fn parse_rejects_non_canonical_input() {
    assert_eq!(WavHeader::parse(&[0u8; 10]), None);

    let mut bad_magic = build_header(8000, 2, 16);
    bad_magic[0] = b'X';
    assert_eq!(WavHeader::parse(&bad_magic), None);

    let mut float_format = build_header(8000, 2, 16);
    float_format[20] = 3;
    assert_eq!(WavHeader::parse(&float_format), None);

    let mut bad_size = build_header(8000, 2, 16);
    bad_size[4] = 0;
    assert_eq!(WavHeader::parse(&bad_size), None);
}

#[test]
fn hound_accepts_header_and_payload() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("hdr.wav");

    let samples: Vec<i16> = vec![0, 1, -1, 1000, -1000, i16::MAX, i16::MIN, 7];
    let mut bytes = build_header(16_000, 2, (samples.len() * 2) as u32).to_vec();
    for s in &samples {
        bytes.extend_from_slice(&s.to_le_bytes());
    }
    fs::write(&path, &bytes).unwrap();

    let reader = hound::WavReader::open(&path).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 2);
    assert_eq!(spec.sample_rate, 16_000);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(spec.sample_format, hound::SampleFormat::Int);

    let read: Vec<i16> = reader.into_samples::<i16>().map(|s| s.unwrap()).collect();
    assert_eq!(read, samples);
}

#[test]
fn data_limit_keeps_riff_size_in_range() {
    assert!(fits_data_len(0));
    assert!(fits_data_len(MAX_DATA_LEN));
    assert!(!fits_data_len(MAX_DATA_LEN + 1));
    assert_eq!(36 + MAX_DATA_LEN, u32::MAX as u64);
}
