//! The descent stack and its walker

mod node;
mod walker;

pub use walker::Walker;
