//! Resona - audio stream bring-up and key loop.

use std::io::Write;
use std::time::Duration;

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use rtrb::{Producer, RingBuffer};
use tracing::info;

use resona_dsp::engine::{AudioContext, SignalGraph};
use resona_dsp::graph::{InputNode, ResonatorParam, Signal, SignalNode, StringResonatorNode};
use resona_dsp::{DEFAULT_FEEDBACK, DEFAULT_FUNDAMENTAL_HZ};

/// Noise-burst length for one pluck, in samples.
const PLUCK_SAMPLES: usize = 400;
/// Output headroom; the resonator rings well above unity near feedback 1.
const OUTPUT_GAIN: f32 = 0.2;
const SEMITONE: f32 = 1.059_463_1;

/// UI -> audio callback commands, carried over the rtrb ring.
enum Command {
    Pluck,
    SetFrequency(f32),
    SetFeedback(f32),
}

pub struct Resona;

impl Default for Resona {
    fn default() -> Self {
        Self::new()
    }
}

impl Resona {
    pub fn new() -> Self {
        Self
    }

    /// Run the demo (takes over the terminal, plays audio).
    pub fn run(self) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;
        info!(sample_rate, channels, "audio device ready");

        // The graph lives inside the audio callback; the key loop only
        // talks to it through the command ring.
        let mut graph = SignalGraph::new(AudioContext::new(sample_rate));
        let input = graph.add_node(SignalNode::Input(InputNode::new()));
        let resonator = StringResonatorNode::new(input, graph.context())?;
        let resonator = graph.add_node(SignalNode::Resonator(resonator));

        let (mut tx, mut rx) = RingBuffer::<Command>::new(64);

        let mut pluck_remaining = 0usize;
        let mut rng_state = 0x9E37_79B9u32;

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                while let Ok(command) = rx.pop() {
                    // Ids are fixed above; these cannot fail on a live graph.
                    let _ = match command {
                        Command::Pluck => {
                            pluck_remaining = PLUCK_SAMPLES;
                            Ok(())
                        }
                        Command::SetFrequency(hz) => graph.set_parameter(
                            resonator,
                            ResonatorParam::FundamentalFrequency,
                            Signal::Value(hz),
                        ),
                        Command::SetFeedback(gain) => graph.set_parameter(
                            resonator,
                            ResonatorParam::Feedback,
                            Signal::Value(gain),
                        ),
                    };
                }

                for frame in data.chunks_mut(channels) {
                    let excitation = if pluck_remaining > 0 {
                        pluck_remaining -= 1;
                        // xorshift32 noise burst, roughly -0.5..0.5
                        rng_state ^= rng_state << 13;
                        rng_state ^= rng_state >> 17;
                        rng_state ^= rng_state << 5;
                        rng_state as f32 / u32::MAX as f32 - 0.5
                    } else {
                        0.0
                    };
                    let _ = graph.feed_input(input, excitation, excitation);
                    let _ = graph.process_frame();
                    let out = graph.output(resonator).unwrap_or_default();

                    frame[0] = (out.left * OUTPUT_GAIN).clamp(-1.0, 1.0);
                    if channels > 1 {
                        frame[1] = (out.right * OUTPUT_GAIN).clamp(-1.0, 1.0);
                    }
                    for extra in frame.iter_mut().skip(2) {
                        *extra = 0.0;
                    }
                }
            },
            |err| eprintln!("Audio error: {err}"),
            None,
        )?;
        stream.play()?;

        println!("=== resona ===");
        println!("space: pluck   up/down: tune   left/right: feedback   q: quit");
        println!();

        enable_raw_mode()?;
        let result = Self::key_loop(&mut tx);
        disable_raw_mode()?;
        println!();
        result
    }

    fn key_loop(tx: &mut Producer<Command>) -> EyreResult<()> {
        let mut frequency = DEFAULT_FUNDAMENTAL_HZ;
        let mut feedback = DEFAULT_FEEDBACK;

        loop {
            if !event::poll(Duration::from_millis(50))? {
                continue;
            }
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }

            let command = match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Char(' ') => Some(Command::Pluck),
                KeyCode::Up => {
                    frequency = (frequency * SEMITONE).min(2_000.0);
                    Some(Command::SetFrequency(frequency))
                }
                KeyCode::Down => {
                    frequency = (frequency / SEMITONE).max(20.0);
                    Some(Command::SetFrequency(frequency))
                }
                KeyCode::Right => {
                    feedback = (feedback + 0.01).min(0.999);
                    Some(Command::SetFeedback(feedback))
                }
                KeyCode::Left => {
                    feedback = (feedback - 0.01).max(0.0);
                    Some(Command::SetFeedback(feedback))
                }
                _ => None,
            };

            if let Some(command) = command {
                if tx.push(command).is_ok() {
                    print!("\rfundamental: {frequency:7.1} Hz   feedback: {feedback:.3}   ");
                    std::io::stdout().flush()?;
                }
            }
        }
    }
}
