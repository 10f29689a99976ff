//! Integration tests for poorhouse-platform.
//!
//! Tests cover cross-thread event delivery, ordering and logging paths.

use poorhouse_platform::{AudioEngine, ControlEvent, EngineError, engine};
use poorhouse_synth::{ChorusMode, ParamId, Patch, Synth};
use std::thread;

const SR: f32 = 48000.0;
const BLOCK: usize = 128;

fn block(audio: &mut AudioEngine) -> (Vec<f32>, Vec<f32>) {
    let mut left = vec![0.0; BLOCK];
    let mut right = vec![0.0; BLOCK];
    audio.process_block(&mut left, &mut right);
    (left, right)
}

// ---------------------------------------------------------------------------
// 1. Delivery and ordering
// ---------------------------------------------------------------------------

#[test]
fn events_from_many_threads_arrive() {
    let (control, mut audio) = AudioEngine::<6>::create(SR, 64).unwrap();

    let workers: Vec<_> = (0..3u8)
        .map(|i| {
            let handle = control.clone();
            thread::spawn(move || handle.note_on(60 + i * 4, 100))
        })
        .collect();
    for worker in workers {
        worker.join().unwrap().unwrap();
    }

    block(&mut audio);
    assert_eq!(audio.synth().active_voice_count(), 3);
}

#[test]
fn note_on_then_off_in_one_block_keeps_order() {
    let (control, mut audio) = engine(Synth::<6>::new(SR).unwrap(), 16);
    control.note_on(60, 100).unwrap();
    control.note_off(60).unwrap();
    block(&mut audio);

    let voice = &audio.synth().voices()[0];
    assert_eq!(voice.note(), 60);
    assert!(voice.is_releasing(), "off applied after on");
}

#[test]
fn full_queue_drops_and_recovers() {
    let (control, mut audio) = AudioEngine::<6>::create(SR, 4).unwrap();
    for note in 0..4 {
        control.note_on(60 + note, 100).unwrap();
    }
    assert_eq!(control.note_on(80, 100), Err(EngineError::QueueFull));

    block(&mut audio);
    assert_eq!(audio.synth().active_voice_count(), 4);
    assert!(control.note_on(80, 100).is_ok(), "space after drain");
}

// ---------------------------------------------------------------------------
// 2. Event kinds
// ---------------------------------------------------------------------------

#[test]
fn every_event_kind_applies() {
    let (control, mut audio) = AudioEngine::<6>::create(SR, 64).unwrap();
    let pad = Patch::factory_by_name("Pad").unwrap();

    control.load_patch(pad).unwrap();
    control.midi(0x90, 64, 90).unwrap();
    control.control_change(74, 0).unwrap();
    control.pitch_bend(-1.0).unwrap();
    control.set_param(ParamId::Chorus, 1.0).unwrap();
    block(&mut audio);

    let synth = audio.synth();
    assert_eq!(synth.amp_env_params(), pad.amp_env);
    assert_eq!(synth.filter_params().cutoff, 0.0);
    assert_eq!(synth.performance_params().pitch_bend, -1.0);
    assert_eq!(synth.chorus_mode(), ChorusMode::One);
    assert_eq!(synth.active_voice_count(), 1);

    control.send(ControlEvent::AllNotesOff).unwrap();
    block(&mut audio);
    assert!(audio.synth().voices().iter().all(|v| !v.is_held()));

    control.send(ControlEvent::Reset).unwrap();
    let (left, right) = block(&mut audio);
    assert_eq!(audio.synth().active_voice_count(), 0);
    assert!(left.iter().chain(&right).all(|&x| x == 0.0));
}

#[test]
fn block_length_is_shorter_buffer() {
    let (control, mut audio) = AudioEngine::<6>::create(SR, 8).unwrap();
    control.note_on(69, 127).unwrap();
    let mut left = vec![0.0; 64];
    let mut right = vec![f32::NAN; 96];
    audio.process_block(&mut left, &mut right);
    assert!(right[..64].iter().all(|x| x.is_finite()));
    assert!(right[64..].iter().all(|x| x.is_nan()), "tail untouched");
}

// ---------------------------------------------------------------------------
// 3. Logging
// ---------------------------------------------------------------------------

#[test]
fn logging_paths_run_under_a_subscriber() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("trace"))
        .with_test_writer()
        .finish();
    tracing::subscriber::with_default(subscriber, || {
        let (control, mut audio) = AudioEngine::<6>::create(SR, 1).unwrap();
        control.note_on(60, 100).unwrap();
        assert_eq!(control.note_on(61, 100), Err(EngineError::QueueFull));
        block(&mut audio);
        audio.set_sample_rate(44100.0).unwrap();
        assert!(audio.set_sample_rate(0.0).is_err());
        audio.synth_mut().load_patch(&Patch::default());
    });
}
