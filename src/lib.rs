//! Simple to use cli/daemon for keeping track of how much water you drink.
//! The daily goal is spread over the day so you always know whether you're on schedule, and a
//! small daemon reminds you to drink every few hours.
//!

pub mod cli;
pub mod daemon;
pub mod fs;
pub mod goal;
pub mod storage;
pub mod utils;
