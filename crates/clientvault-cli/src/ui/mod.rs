//! Terminal UI helpers.

mod progress;

pub use progress::Spinner;
