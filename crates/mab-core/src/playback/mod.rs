//! Remote playback service abstractions (queue + playback state live remotely).

pub mod port;
pub mod types;
