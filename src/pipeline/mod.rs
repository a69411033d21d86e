pub mod adapters;
pub mod cancel;
pub mod config;
pub mod group;
pub mod handoff;
pub mod parallel;
pub mod pipe;
pub mod stream;
