use thiserror::Error;

use crate::engine::AudioContext;
use crate::{DEFAULT_FEEDBACK, DEFAULT_FUNDAMENTAL_HZ, MIN_FUNDAMENTAL_HZ};

/*
String Resonator Channel
========================

One channel of a string resonator: the input is fed through a network of
comb, low-pass, and all-pass filters, the topology used in some versions of
the Karplus-Strong algorithm. The comb delay sets the pitch, the low-pass
damps the loop slightly more at high frequencies (strings lose their bright
partials first), and the all-pass realizes the fractional part of the delay
so pitch is not quantized to whole samples.

Signal path, per sample:

  input ──(+)──────────────────────────────▶ output
           ▲                          │
           │                          ▼
      feedback gain ◀── all-pass ◀── low-pass ◀── delay line

Parameters:
-----------

fundamental_frequency (Hz): pitch of the simulated string. Sets the comb
  delay to sample_rate / frequency samples. Clamped to MIN_FUNDAMENTAL_HZ
  at compute time; the delay buffer is sized against that floor.

feedback: loop gain, nominally [0, 1). Close to 1 rings long with a
  pronounced resonance; 0 reduces the network to a pass-through. NOT
  clamped: values >= 1 grow without bound. Stability is the caller's
  responsibility, matching the wrapped reference contract.

Lifecycle:
----------

The state is an explicit machine: Uninitialized -> Ready -> Destroyed.
`init` allocates the delay line against the injected context and may fail;
`process` and `destroy` outside Ready are precondition failures and panic
rather than corrupting the buffer. There is no resurrection after destroy.
*/

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StresonError {
    #[error("invalid sample rate: {0}")]
    InvalidSampleRate(f32),
    #[error("channel state already initialized")]
    AlreadyInitialized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Uninitialized,
    Ready,
    Destroyed,
}

pub struct ChannelState {
    /// Fundamental frequency of the string, in Hz.
    pub frequency: f32,
    /// Loop feedback gain, nominally [0, 1).
    pub feedback: f32,

    sample_rate: f32,
    delay: Vec<f32>,
    write_pos: usize,
    lp_state: f32,
    ap_state: f32,
    stage: Lifecycle,
}

impl ChannelState {
    /// Create an uninitialized channel. No storage is allocated until
    /// [`init`](Self::init) binds it to a context.
    pub fn new() -> Self {
        Self {
            frequency: DEFAULT_FUNDAMENTAL_HZ,
            feedback: DEFAULT_FEEDBACK,
            sample_rate: 0.0,
            delay: Vec::new(),
            write_pos: 0,
            lp_state: 0.0,
            ap_state: 0.0,
            stage: Lifecycle::Uninitialized,
        }
    }

    /// Bind the channel to the active sample rate and allocate the delay
    /// line. Must be called exactly once; a second call is rejected and
    /// leaves the existing buffer untouched.
    pub fn init(&mut self, ctx: &AudioContext) -> Result<(), StresonError> {
        if self.stage != Lifecycle::Uninitialized {
            return Err(StresonError::AlreadyInitialized);
        }
        let sample_rate = ctx.sample_rate;
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(StresonError::InvalidSampleRate(sample_rate));
        }

        let size = (sample_rate / MIN_FUNDAMENTAL_HZ) as usize + 1;
        self.sample_rate = sample_rate;
        self.delay = vec![0.0; size];
        self.write_pos = 0;
        self.stage = Lifecycle::Ready;
        Ok(())
    }

    /// One signal-processing step of the comb/low-pass/all-pass network.
    /// Pure function of (state, input, current coefficients); advances the
    /// delay line by one sample.
    pub fn process(&mut self, input: f32) -> f32 {
        assert!(
            self.stage == Lifecycle::Ready,
            "ChannelState::process called in {:?} state",
            self.stage
        );

        let freq = self.frequency.max(MIN_FUNDAMENTAL_HZ);
        // Loop period in samples. The half sample compensates the low-pass
        // group delay so the resonance lands on the requested fundamental.
        let period = (self.sample_rate / freq - 0.5).max(1.0);
        let whole = period as usize;
        let frac = period - whole as f32;
        let ap_coeff = (1.0 - frac) / (1.0 + frac);

        let size = self.delay.len();
        let read_pos = (self.write_pos + size - whole) % size;
        let delayed = self.delay[read_pos];

        let lp = 0.5 * (delayed + self.lp_state);
        self.lp_state = delayed;

        let ap = ap_coeff * lp + self.ap_state;
        self.ap_state = lp - ap_coeff * ap;

        let out = input + self.feedback * ap;
        self.delay[self.write_pos] = out;
        self.write_pos = (self.write_pos + 1) % size;
        out
    }

    /// Release the delay-line storage. Valid exactly once, from Ready.
    pub fn destroy(&mut self) {
        assert!(
            self.stage == Lifecycle::Ready,
            "ChannelState::destroy called in {:?} state",
            self.stage
        );
        self.delay = Vec::new();
        self.stage = Lifecycle::Destroyed;
    }
}

impl Default for ChannelState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 44_100.0;

    fn ready_channel() -> ChannelState {
        let mut state = ChannelState::new();
        state.init(&AudioContext::new(SR)).unwrap();
        state
    }

    #[test]
    fn init_rejects_bad_sample_rate() {
        for bad in [0.0, -44_100.0, f32::NAN, f32::INFINITY] {
            let mut state = ChannelState::new();
            // Structural equality would reject the NaN case (NaN != NaN),
            // so match the payload instead.
            let rejected = matches!(
                state.init(&AudioContext::new(bad)),
                Err(StresonError::InvalidSampleRate(v)) if v == bad || (v.is_nan() && bad.is_nan())
            );
            assert!(rejected, "sample rate {bad} should be rejected");
        }
    }

    #[test]
    fn double_init_is_rejected_without_corruption() {
        let mut state = ready_channel();
        assert_eq!(
            state.init(&AudioContext::new(SR)),
            Err(StresonError::AlreadyInitialized)
        );
        // The rejected call must not have touched the delay buffer.
        assert_eq!(state.process(1.0), 1.0);
    }

    #[test]
    #[should_panic(expected = "Uninitialized")]
    fn process_before_init_panics() {
        let mut state = ChannelState::new();
        state.process(0.0);
    }

    #[test]
    #[should_panic(expected = "Destroyed")]
    fn process_after_destroy_panics() {
        let mut state = ready_channel();
        state.destroy();
        state.process(0.0);
    }

    #[test]
    #[should_panic(expected = "Destroyed")]
    fn double_destroy_panics() {
        let mut state = ready_channel();
        state.destroy();
        state.destroy();
    }

    #[test]
    fn zero_feedback_is_passthrough() {
        let mut state = ready_channel();
        state.frequency = 100.0;
        state.feedback = 0.0;

        let input = [1.0, -0.5, 0.25, 0.0, 0.75];
        for &x in &input {
            assert_eq!(state.process(x), x);
        }
        // Nothing sustains once the input stops.
        for _ in 0..2_000 {
            assert_eq!(state.process(0.0), 0.0);
        }
    }

    #[test]
    fn impulse_response_is_periodic_and_decays() {
        let mut state = ready_channel();
        state.frequency = 100.0;
        state.feedback = 0.95;

        // Loop period in samples, including the half-sample low-pass
        // compensation.
        let period = SR / 100.0 - 0.5;
        let mut out = vec![0.0f32; (period * 56.0) as usize];
        out[0] = state.process(1.0);
        for sample in out.iter_mut().skip(1) {
            *sample = state.process(0.0);
        }

        // Peak amplitude around the p-th echo. The low-pass widens the
        // recirculating pulse a little each pass, so the window is
        // centered on the expected echo position.
        let peak_at = |p: usize| {
            let center = (p as f32 * period).round() as usize;
            out[center - 100..center + 100]
                .iter()
                .fold(0.0f32, |acc, s| acc.max(s.abs()))
        };

        assert!(peak_at(1) > 0.1, "first echo missing: {}", peak_at(1));
        // Pulse dispersion drags single-period peak ratios under the loop
        // gain, so the decay is measured as the geometric mean across ten
        // late periods, where it sits near the feedback value.
        let decay = (peak_at(50) / peak_at(40)).powf(0.1);
        assert!(
            (0.92..=0.97).contains(&decay),
            "per-period decay {decay} too far from feedback 0.95"
        );
        assert!(peak_at(50) < peak_at(40) && peak_at(40) < peak_at(30));
    }

    #[test]
    fn echo_lands_one_period_after_the_impulse() {
        let mut state = ready_channel();
        state.frequency = 100.0;
        state.feedback = 0.5;

        state.process(1.0);
        let first_echo = (1..2_000)
            .find(|_| state.process(0.0).abs() > 1e-4)
            .expect("no echo within 2000 samples");
        let period = (SR / 100.0).round() as i64;
        assert!(
            (first_echo as i64 - period).abs() <= 2,
            "echo at {first_echo}, expected near {period}"
        );
    }

    #[test]
    fn frequency_floor_clamps_to_20_hz() {
        let mut state = ready_channel();
        state.frequency = 5.0; // below the representable floor
        state.feedback = 0.5;

        state.process(1.0);
        let first_echo = (1..4_000)
            .find(|_| state.process(0.0).abs() > 1e-4)
            .expect("no echo within 4000 samples");
        let floor_period = (SR / MIN_FUNDAMENTAL_HZ).round() as i64;
        assert!(
            (first_echo as i64 - floor_period).abs() <= 2,
            "echo at {first_echo}, expected near {floor_period}"
        );
    }

    #[test]
    fn output_stays_bounded_for_stable_feedback() {
        let mut state = ready_channel();
        state.frequency = 100.0;
        state.feedback = 0.95;

        // Drive at the resonant frequency for two seconds. Steady-state
        // gain is on the order of 1 / (1 - feedback); well under 40x.
        let mut max_abs = 0.0f32;
        for n in 0..(2.0 * SR) as usize {
            let x = (std::f32::consts::TAU * 100.0 * n as f32 / SR).sin();
            max_abs = max_abs.max(state.process(x).abs());
        }
        assert!(max_abs < 40.0, "output grew to {max_abs}");
    }
}
