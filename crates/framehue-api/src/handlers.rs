//! Request handlers.

pub mod cache;
pub mod colors;
pub mod health;

pub use cache::*;
pub use colors::*;
pub use health::*;
