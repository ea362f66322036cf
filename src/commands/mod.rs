pub mod completions;
pub mod reset;
pub mod rotate;
pub mod show;
