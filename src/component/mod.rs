//! 功能元件模組
//!
//! 每個子模組實現一個獨立的功能，包含主要邏輯和專用工具

pub mod media_organizer;
mod prompt;
pub mod video_combiner;

pub use media_organizer::MediaOrganizer;
pub use video_combiner::VideoCombiner;
