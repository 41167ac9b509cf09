pub mod engine;
pub mod evaluation;

pub use engine::{AiEngine, MinimaxAi, SearchStats};
pub use evaluation::evaluate;
