#![forbid(unsafe_code)]

pub mod coaching;
pub mod gesture;
pub mod model;
pub mod rest;
pub mod time;

pub use time::Clock;
