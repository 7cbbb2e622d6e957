// NATS vehicle feed integration

mod client;
mod subscriber;

pub use client::{connect, NatsConfig};
pub use subscriber::{decode_event, decode_stream, run_subscriber};
