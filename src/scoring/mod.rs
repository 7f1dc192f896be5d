//! Scoring module - early-warning score and risk classification

mod news;
mod risk;

pub use news::*;
pub use risk::*;
