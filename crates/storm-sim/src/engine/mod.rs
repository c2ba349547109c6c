//! The tick-driven simulation engine.

mod registry;
mod simulator;

pub(crate) use self::registry::Registry;
pub use self::registry::TaskArena;
pub use self::simulator::Simulator;
