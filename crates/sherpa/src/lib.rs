//! Sherpa - Meeting and Outreach Insights
//!
//! A small REST service that turns meeting transcripts and LinkedIn/pitch-deck
//! text into generated coaching and outreach insights, persists them next to
//! the request metadata, and lists them back newest first.

pub mod config;
pub mod server;
