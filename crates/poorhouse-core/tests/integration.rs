//! Integration tests for poorhouse-core DSP primitives.
//!
//! Verifies the filter, delay and LFO building blocks with signal-level
//! measurements: ladder frequency response and resonance, high-pass
//! behaviour, fractional delay accuracy, and LFO period shape.

use poorhouse_core::{
    InterpolatedDelay, LadderFilter, Lfo, ZdfOnePole, midi_to_freq, semitones_to_ratio,
};

const SAMPLE_RATE: f32 = 48000.0;
const TAU: f32 = core::f32::consts::TAU;

/// Generate a sine wave buffer at the given frequency.
fn generate_sine(freq_hz: f32, amplitude: f32, num_samples: usize) -> Vec<f32> {
    (0..num_samples)
        .map(|n| amplitude * libm::sinf(TAU * freq_hz * n as f32 / SAMPLE_RATE))
        .collect()
}

/// Measure RMS amplitude of a signal buffer.
fn rms(signal: &[f32]) -> f32 {
    let sum_sq: f32 = signal.iter().map(|&s| s * s).sum();
    libm::sqrtf(sum_sq / signal.len() as f32)
}

/// Convert linear amplitude to dB.
fn to_db(linear: f32) -> f32 {
    20.0 * libm::log10f(linear.max(1e-10))
}

/// Settled ladder gain in dB for a sine at `freq_hz`.
fn ladder_response(cutoff: f32, resonance: f32, freq_hz: f32) -> f32 {
    let mut ladder = LadderFilter::new(SAMPLE_RATE);
    ladder.set_cutoff(cutoff);
    ladder.set_resonance(resonance);
    let input = generate_sine(freq_hz, 0.01, 24000);
    let output: Vec<f32> = input.iter().map(|&s| ladder.process(s)).collect();
    to_db(rms(&output[12000..]) / rms(&input[12000..]))
}

// ============================================================================
// 1. Ladder filter
// ============================================================================

#[test]
fn ladder_minus_twelve_db_at_cutoff() {
    // Four stages at -3 dB each
    let gain = ladder_response(1000.0, 0.0, 1000.0);
    assert!(
        (gain + 12.0).abs() < 1.0,
        "expected about -12 dB at cutoff, got {gain:.2} dB"
    );
}

#[test]
fn ladder_rolls_off_24_db_per_octave() {
    // One and two octaves above cutoff, well clear of the f32 noise floor
    let one = ladder_response(500.0, 0.0, 1000.0);
    let two = ladder_response(500.0, 0.0, 2000.0);
    let slope = one - two;
    assert!(
        slope > 18.0,
        "expected about 24 dB/oct, measured {slope:.2} dB between octaves"
    );
}

#[test]
fn ladder_resonance_strictly_increases_peak() {
    let mut previous = f32::NEG_INFINITY;
    for resonance in [0.0, 0.2, 0.4, 0.6, 0.8, 0.9] {
        let gain = ladder_response(2000.0, resonance, 2000.0);
        assert!(
            gain > previous,
            "resonance {resonance} gave {gain:.2} dB, not above {previous:.2} dB"
        );
        previous = gain;
    }
}

#[test]
fn ladder_cutoff_tracks_semitone_ratio() {
    let base = 440.0;
    let up = base * semitones_to_ratio(12.0);
    let g_base = ladder_response(base, 0.0, base);
    let g_up = ladder_response(up, 0.0, up);
    assert!(
        (g_base - g_up).abs() < 0.5,
        "response at cutoff should not depend on cutoff: {g_base:.2} vs {g_up:.2}"
    );
}

// ============================================================================
// 2. High-pass one-pole
// ============================================================================

#[test]
fn highpass_passes_treble_and_cuts_bass() {
    let measure = |freq: f32| {
        let mut hp = ZdfOnePole::new(SAMPLE_RATE, 120.0);
        let input = generate_sine(freq, 0.5, 24000);
        let output: Vec<f32> = input.iter().map(|&s| hp.process_highpass(s)).collect();
        to_db(rms(&output[12000..]) / rms(&input[12000..]))
    };
    let treble = measure(2000.0);
    let bass = measure(20.0);
    assert!(treble > -0.5, "2 kHz should pass, got {treble:.2} dB");
    assert!(bass < -12.0, "20 Hz should be cut, got {bass:.2} dB");
}

// ============================================================================
// 3. Delay line
// ============================================================================

#[test]
fn delay_reproduces_sine_shifted() {
    let mut delay = InterpolatedDelay::new(512);
    let input = generate_sine(midi_to_freq(69), 1.0, 2000);
    let shift = 100;
    for (i, &s) in input.iter().enumerate() {
        delay.write(s);
        if i >= shift {
            let out = delay.read(shift as f32);
            assert!(
                (out - input[i - shift]).abs() < 1e-6,
                "sample {i}: {out} vs {}",
                input[i - shift]
            );
        }
    }
}

// ============================================================================
// 4. LFO
// ============================================================================

#[test]
fn lfo_one_hz_period_shape() {
    let mut lfo = Lfo::new(SAMPLE_RATE, 1.0);
    let samples: Vec<f32> = (0..48000).map(|_| lfo.advance()).collect();

    assert_eq!(samples[0], 0.0);
    assert!((samples[12000] - 1.0).abs() < 0.01, "quarter peak {}", samples[12000]);
    assert!((samples[36000] + 1.0).abs() < 0.01, "three-quarter trough {}", samples[36000]);

    let max = samples.iter().copied().fold(f32::MIN, f32::max);
    let min = samples.iter().copied().fold(f32::MAX, f32::min);
    assert!((max - 1.0).abs() < 0.1 && (min + 1.0).abs() < 0.1);
}

#[test]
fn lfo_delay_gates_modulation_depth() {
    let mut lfo = Lfo::new(SAMPLE_RATE, 5.0);
    lfo.set_delay(1.0);
    lfo.trigger();

    let early = (0..4800).map(|_| lfo.advance().abs()).fold(0.0f32, f32::max);
    for _ in 0..48000 {
        lfo.advance();
    }
    let late = (0..9600).map(|_| lfo.advance().abs()).fold(0.0f32, f32::max);

    assert!(early < 0.11, "first 100 ms should be faded, got {early}");
    assert!(late > 0.99, "after the delay the full swing returns, got {late}");
}
