//! Services module - the operation surface of the core
//!
//! Each function takes the shared state, an acting user id and validated
//! input, runs the Access Gateway first and only then touches the
//! repositories. Transports (HTTP, ws, whatever) stay out of this layer.

pub mod chat;
pub mod membership;
pub mod message;
pub mod presence;
