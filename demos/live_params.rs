/// Demonstrates live parameter signals: the resonator's fundamental is an
/// LFO output rather than a constant, so the tuning drifts every frame

use resona_dsp::engine::{AudioContext, SignalGraph};
use resona_dsp::graph::{
    InputNode, LfoNode, ResonatorParam, Signal, SignalNode, StringResonatorNode,
};

fn main() {
    println!("=== Live Parameter Signals ===\n");

    let sample_rate = 44_100.0;
    let mut graph = SignalGraph::new(AudioContext::new(sample_rate));

    let input = graph.add_node(SignalNode::Input(InputNode::new()));
    let node = StringResonatorNode::new(input, graph.context()).expect("resonator construction");
    let resonator = graph.add_node(SignalNode::Resonator(node));

    // 2 Hz LFO sweeping the fundamental between 85 and 115 Hz. The LFO is
    // a dependency of the resonator, so the driver computes it first.
    let lfo = LfoNode::sine(2.0, 100.0, 15.0, graph.context());
    let lfo = graph.add_node(SignalNode::Lfo(lfo));
    graph
        .set_parameter(
            resonator,
            ResonatorParam::FundamentalFrequency,
            Signal::Node(lfo),
        )
        .unwrap();

    // Pluck once, then watch the effective tuning follow the LFO.
    graph.feed_input(input, 1.0, 1.0).unwrap();
    for n in 0..sample_rate as usize {
        graph.process_frame().unwrap();
        graph.feed_input(input, 0.0, 0.0).unwrap();

        if n % 4_410 == 0 {
            let tuning = graph.output(lfo).unwrap().left;
            let ring = graph.output(resonator).unwrap().left;
            println!(
                "   t={:.2}s  fundamental={tuning:6.1} Hz  output={ring:+.4}",
                n as f32 / sample_rate
            );
        }
    }
}
