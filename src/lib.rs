//! Duel Chronicle - turn-based duels with a heuristic AI and narrated battle logs

pub mod ai;
pub mod battle;
pub mod content;
pub mod core;
pub mod fighter;
pub mod narrative;
