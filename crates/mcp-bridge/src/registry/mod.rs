//! Server Registry and Connection Registry: synchronous, in-memory
//! catalogs the Bridge Manager and Supervisor consult to move
//! instances between their declared lifecycle states.

pub mod connection;
pub mod server;

pub use connection::{ConnectionRegistry, ConnectionSnapshot, ConnectionStatus};
pub use server::{ServerRegistry, ServerSnapshot, ServerStatus};
