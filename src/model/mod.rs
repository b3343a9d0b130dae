//! Core data model: buffers, edit events, generations, console entries and projects.

pub mod buffer;
pub mod console;
pub mod event;
pub mod generation;
pub mod project;
