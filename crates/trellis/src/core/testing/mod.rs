//! Helpers for exercising the scene graph in tests and benchmarks.

/// A render backend that records what it is asked to draw.
pub mod backend;
/// A registry driven by a scene, with a recording backend and journal.
pub mod harness;
/// Recording behaviors and listeners.
pub mod probe;

use tracing::Level;
use tracing_subscriber::fmt;

pub use backend::RecordingBackend;
pub use harness::Harness;
pub use probe::{Journal, Probe, Record};

/// Install a compact `fmt` subscriber that writes through the test harness
/// capture. Safe to call from every test; only the first call installs.
pub fn init_logging() {
    let format = fmt::format()
        .with_level(true)
        .with_line_number(true)
        .with_ansi(false)
        .without_time()
        .compact();
    // A subscriber may already be installed by another test.
    drop(
        fmt()
            .with_test_writer()
            .with_max_level(Level::TRACE)
            .event_format(format)
            .try_init(),
    );
}
