pub mod engine;

pub use engine::AssignmentEngine;
