//! Schedule assembly: catalog model, time parsing, conflict detection and the
//! lazy search over section combinations.

pub mod catalog;
pub mod config;
pub mod cursor;
pub mod days;
pub mod error;
pub mod expand;
pub mod overlap;
pub mod search;
pub mod time;
mod types;

pub use catalog::{Catalog, CatalogBuilder, CourseOffering, SectionRow};
pub use config::PlannerConfig;
pub use cursor::{CursorStep, ScheduleCursor};
pub use error::PlannerError;
pub use search::ConflictFreeSearch;
pub use types::*;
