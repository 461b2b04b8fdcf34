mod cpu_monitor;
mod encoder;
mod ffprobe_info;
mod file_scanner;
mod path_validator;

pub use cpu_monitor::{CpuMonitor, resolve_worker_count};
pub use encoder::{Encoder, EncoderError, EncoderOutput, FfmpegEncoder, is_encoder_missing};
pub use ffprobe_info::{DurationProbe, FfprobeDurationProbe, get_video_duration};
pub use file_scanner::{scan_folder_files, scan_folder_files_matching, sort_by_natural_name};
pub use path_validator::{ensure_directory_exists, validate_directory_exists};
