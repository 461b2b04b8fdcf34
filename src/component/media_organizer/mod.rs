//! 整理媒體並產生圖片影片元件
//!
//! 依類型與影片長度將來源資料夾的檔案移到目的分類資料夾，
//! 再將本次移入的圖片平行轉成 Ken Burns 效果的短影片

mod batch_report;
mod destination_layout;
mod encode_orchestrator;
mod ken_burns;
mod main;
mod path_classifier;
mod pipeline;
mod relocator;

pub use batch_report::{BatchReport, BatchTally, format_elapsed};
pub use destination_layout::{Bucket, DestinationLayout, LayoutStatus, sanitize_folder_name};
pub use encode_orchestrator::{
    ConversionTask, EncodeOrchestrator, EncodeSummary, TaskOutcome, build_conversion_tasks,
};
pub use ken_burns::{KenBurnsRenderer, RenderStatus};
pub use main::MediaOrganizer;
pub use path_classifier::{DurationBucket, MediaItem, MediaKind, PathClassifier};
pub use pipeline::MediaPipeline;
pub use relocator::{MoveOutcome, MoveRecord, Relocator, move_file};
