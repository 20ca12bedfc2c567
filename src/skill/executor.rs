//! Plan execution

use anyhow::Result;

use super::planner::{plan, SkillPlan};
use super::source::load_source;
use crate::domain::{generate, MapOutput};

/// Runs a plan and returns the generated maps
pub fn execute_plan(plan: &SkillPlan) -> Result<MapOutput> {
    let request = load_source(plan)?;
    Ok(generate(&request))
}

/// Runs a plan and returns canonical JSON
pub fn execute(plan: &SkillPlan) -> Result<String> {
    Ok(execute_plan(plan)?.to_canonical_json())
}

/// Plans and executes a free-form request in one step
pub fn run_request(request: &str) -> Result<String> {
    execute(&plan(request))
}
