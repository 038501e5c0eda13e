mod common;

use std::sync::{Arc, Mutex};

use common::write_wav;
use storemix_core::{
    write_artifact, MixConfig, MixSession, ProcessingPhase, Track, WavHeader,
};
use tempfile::tempdir;

#[test]
fn mixes_real_files_end_to_end() {
    let tmp = tempdir().unwrap();
    let mono_path = tmp.path().join("jingle.wav");
    let stereo_path = tmp.path().join("song.wav");

    let mono: Vec<i16> = (0..400).map(|i| ((i % 40) * 500 - 10_000) as i16).collect();
    let stereo: Vec<i16> = (0..300).flat_map(|i| [i as i16 * 10, -(i as i16) * 10]).collect();
    write_wav(&mono_path, 1, 16_000, &mono);
    write_wav(&stereo_path, 2, 16_000, &stereo);

    let cfg = MixConfig {
        sample_rate: 16_000,
        yield_between_tracks: false,
        ..Default::default()
    };
    let mut session = MixSession::new(cfg).unwrap();
    session.queue_mut().push(Track::from_path(&mono_path));
    session.queue_mut().push(Track::from_path(&stereo_path));

    let phases = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&phases);
    session.subscribe(move |s| sink.lock().unwrap().push(s.phase));

    let out = tmp.path().join("mix.wav");
    {
        let artifact = session.merge().unwrap();
        assert_eq!(artifact.len(), 44 + (400 + 300) * 4);
        let header = WavHeader::parse(artifact.header()).unwrap();
        assert_eq!(header.sample_rate, 16_000);
        assert_eq!(header.data_len, 2800);
        assert_eq!(artifact.segments[0].name, "jingle.wav");
        write_artifact(&out, artifact).unwrap();
    }
    assert_eq!(
        phases.lock().unwrap().last(),
        Some(&ProcessingPhase::Completed)
    );

    let reader = hound::WavReader::open(&out).unwrap();
    assert_eq!(reader.spec().channels, 2);
    assert_eq!(reader.spec().sample_rate, 16_000);
    let samples: Vec<i16> = reader.into_samples::<i16>().map(|s| s.unwrap()).collect();
    assert_eq!(samples.len(), 1400);

    // mono is duplicated, and survives the float round trip within one step
    for (i, &m) in mono.iter().enumerate() {
        let (l, r) = (samples[2 * i], samples[2 * i + 1]);
        assert_eq!(l, r);
        assert!((l as i32 - m as i32).abs() <= 1, "frame {i}: {l} vs {m}");
    }
    for (i, &s) in stereo.iter().enumerate() {
        let got = samples[800 + i];
        assert!((got as i32 - s as i32).abs() <= 1, "sample {i}: {got} vs {s}");
    }
}
