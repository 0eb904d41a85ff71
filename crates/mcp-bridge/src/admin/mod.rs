//! Admin Surface: the external HTTP/JSON interface for driving the
//! Bridge Manager, implemented as a thin veneer over it.

pub mod dto;
pub mod http;

pub use http::router;
