//! 隨機排序並合併影片元件

mod concatenator;
mod main;
mod pipeline;
mod shuffle_renamer;

pub use concatenator::{
    Concatenator, OUTPUT_EXTENSION, OUTPUT_PREFIX, OutputNaming, manifest_line, next_numbered_path,
    next_output_path,
};
pub use main::VideoCombiner;
pub use pipeline::{CLIP_SUBFOLDER, CombineReport, STITCH_OUTPUT_FOLDER, VideoCombinePipeline};
pub use shuffle_renamer::{HOLDING_FOLDER, ShuffleRenamer, ShuffleStage};
