//! Quiniela rules: when a match locks, how picks are collected and submitted,
//! and how the leaderboard is ordered.

pub mod board;
pub mod loader;
pub mod lock;
pub mod ranking;
pub mod score;
pub mod selection;
pub mod submission;

#[cfg(test)]
pub(crate) mod fixtures;
