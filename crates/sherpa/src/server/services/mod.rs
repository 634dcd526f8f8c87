pub mod generation;
pub mod insights;
pub mod prompts;
