//! Route handlers, one module per resource.

pub mod maps;
pub mod players;
pub mod scores;
pub mod sessions;
