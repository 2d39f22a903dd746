//! Conflict-free class schedule planning.
//!
//! [`planner`] holds the scheduling core: time and day parsing, the overlap
//! rule, course expansion and the lazy search. [`sessions`] keeps one search
//! cursor per client and [`server`] exposes them over HTTP.

pub mod db;
pub mod planner;
pub mod server;
pub mod sessions;
pub mod types;
