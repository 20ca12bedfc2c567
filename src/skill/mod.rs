//! # Request Handling
//!
//! Turns a free-form request such as
//! `"Generate a blockscape map for the domain of\nfile: docs/plan.md"` into
//! generated maps.
//!
//! | Step | Module | Output |
//! |------|--------|--------|
//! | Plan | `planner` | [`SkillPlan`] with file reference and mode flags |
//! | Load | `source` | [`MapRequest`](crate::domain::MapRequest) with document text |
//! | Execute | `executor` | canonical JSON |
//!
//! Only the deterministic generator is available; plans always execute
//! locally.

mod executor;
mod planner;
mod source;

pub use executor::{execute, execute_plan, run_request};
pub use planner::{find_existing_path, plan, SkillPlan};
pub use source::{load_source, read_lossy};
