pub mod fallback;
pub mod insights;
pub mod status;
pub mod ui;
