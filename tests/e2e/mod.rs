pub mod editing;
pub mod live_pipeline;
pub mod projects;
