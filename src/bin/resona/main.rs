//! resona - live string resonator demo
//!
//! Run with: cargo run
//!
//! Space plucks the string, up/down retunes it, left/right adjusts the
//! feedback gain, q quits. Parameter changes cross to the audio callback
//! over a lock-free ring, so the graph is never locked on the audio path.

mod app;

use app::Resona;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt::init();

    Resona::new().run()
}
