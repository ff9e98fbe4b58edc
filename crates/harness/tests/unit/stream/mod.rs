
/// Consumer throttling, ordering and metadata.
pub mod consumer;

/// Protocol properties: backpressure safety, throughput shaping, stability.
pub mod handshake;

/// Producer queueing, encoding errors and drive behavior.
pub mod producer;
