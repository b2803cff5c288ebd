//! Load tests for concurrent vote processing

pub mod concurrent_voting;
