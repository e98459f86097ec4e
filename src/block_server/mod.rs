//! Block server contract, an in-memory implementation and the measuring
//! decorator that can be layered over any implementation.

pub mod error;
pub mod interface;
pub mod measured;
pub mod memory;

pub use {
    error::BlockServerError, interface::BlockServer, measured::BlockServerMeasured,
    memory::BlockServerMemory,
};
