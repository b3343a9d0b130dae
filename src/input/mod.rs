//! Text editing engine: key interception and snippet expansion.

pub mod actions;
pub mod snippets;
