// irkbd Event Handling
// The decode, translate, emit polling cycle

pub mod relay;

pub use relay::{Relay, RelayError, RelayResult, RelayStats};
