// Per-vehicle state actors and their message protocol

mod actor;
mod handle;
mod message;

pub use actor::{ActorStatus, InitError, VehicleActor};
pub use handle::{AskError, TellError, VehicleHandle};
pub use message::{Outcome, Position, Reply, VehicleId, VehicleMessage};
