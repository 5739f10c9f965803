/// Demonstrates the basic signal graph architecture
/// Shows how to feed an input node, run the driver, and read node outputs

use resona_dsp::engine::{AudioContext, SignalGraph};
use resona_dsp::graph::{InputNode, Signal, SignalNode, StringResonatorNode};

fn main() {
    println!("=== Signal Graph Basics ===\n");

    let sample_rate = 44_100.0;
    let mut graph = SignalGraph::new(AudioContext::new(sample_rate));

    // An input node republishes whatever the host feeds it each frame.
    let input = graph.add_node(SignalNode::Input(InputNode::new()));

    // A string resonator tuned to 100 Hz with a long decay.
    let node = StringResonatorNode::with_parameters(
        input,
        Signal::Value(100.0),
        Signal::Value(0.95),
        graph.context(),
    )
    .expect("resonator construction");
    let resonator = graph.add_node(SignalNode::Resonator(node));

    // Excite the string with a unit impulse and let it ring.
    let period = (sample_rate / 100.0).round() as usize;
    println!("1. Impulse response, one peak per {period}-sample period:");
    graph.feed_input(input, 1.0, 1.0).unwrap();

    let mut out = Vec::new();
    for _ in 0..period * 12 {
        graph.process_frame().unwrap();
        out.push(graph.output(resonator).unwrap().left);
        graph.feed_input(input, 0.0, 0.0).unwrap();
    }

    for p in 1..12 {
        let peak = out[p * period..(p + 1) * period]
            .iter()
            .fold(0.0f32, |acc, s| acc.max(s.abs()));
        println!("   period {p:2}: peak {peak:.4}");
    }
    println!("   (each peak ~0.95x the previous: the feedback gain)");

    // Retune mid-stream; no reconstruction needed.
    println!("\n2. Retuning to 220 Hz while ringing");
    graph
        .set_parameter(
            resonator,
            resona_dsp::graph::ResonatorParam::FundamentalFrequency,
            Signal::Value(220.0),
        )
        .unwrap();
    graph.process_frame().unwrap();
    match graph.node(resonator) {
        Some(SignalNode::Resonator(node)) => {
            let (left, right) = node.channel_frequencies();
            println!("   both channels now at {left} / {right} Hz");
        }
        _ => unreachable!(),
    }
}
