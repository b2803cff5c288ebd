//! Duel generation
//!
//! A duel presents two distinct entities of the same category to a voter.

pub mod maker;
pub mod selector;

pub use maker::DuelMaker;
pub use selector::{selector_for, DuelSelector, ProximityDuelSelector, UniformDuelSelector};
