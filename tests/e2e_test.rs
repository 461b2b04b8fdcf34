//! E2E Integration Tests
//!
//! 使用真實的 ffmpeg / ffprobe；系統未安裝時自動跳過

use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::Arc;

use auto_media_organize::component::media_organizer::MediaPipeline;
use auto_media_organize::component::video_combiner::{CLIP_SUBFOLDER, VideoCombinePipeline};
use auto_media_organize::config::{Config, FileTypeTable, KenBurnsSettings, UserSettings};
use auto_media_organize::tools::{
    Encoder, FfmpegEncoder, FfprobeDurationProbe, get_video_duration,
};
use indicatif::ProgressBar;
use tempfile::TempDir;

fn tools_available() -> bool {
    let ffprobe = Command::new("ffprobe")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|s| s.success());
    ffprobe && FfmpegEncoder::new().probe_version().is_ok()
}

/// 以 lavfi 產生單色測試圖片
fn make_image(path: &Path, color: &str) {
    let status = Command::new("ffmpeg")
        .args(["-hide_banner", "-loglevel", "error", "-y", "-f", "lavfi", "-i"])
        .arg(format!("color=c={color}:s=320x240"))
        .args(["-frames:v", "1"])
        .arg(path)
        .status()
        .unwrap();
    assert!(status.success());
}

fn make_video(path: &Path, seconds: u32) {
    let status = Command::new("ffmpeg")
        .args(["-hide_banner", "-loglevel", "error", "-y", "-f", "lavfi", "-i"])
        .arg("testsrc=size=320x240:rate=25")
        .args(["-t", &seconds.to_string(), "-pix_fmt", "yuv420p"])
        .arg(path)
        .status()
        .unwrap();
    assert!(status.success());
}

fn config() -> Config {
    let mut settings = UserSettings::default();
    settings.organizer.worker_count = 2;
    settings.ken_burns = KenBurnsSettings {
        width: 320,
        height: 180,
        duration_secs: 1,
        ..KenBurnsSettings::default()
    };
    Config {
        file_type_table: FileTypeTable {
            image_file: vec![".png".to_string(), ".jpg".to_string()],
            video_file: vec![".mp4".to_string()],
        },
        settings,
    }
}

/// 測試完整流程：整理、圖片轉影片、再隨機合併
#[test]
fn test_organize_and_combine_e2e() {
    if !tools_available() {
        println!("跳過測試：找不到 ffmpeg / ffprobe");
        return;
    }

    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path();
    make_image(&source.join("red.png"), "red");
    make_image(&source.join("blue.png"), "blue");
    make_video(&source.join("clip.mp4"), 2);

    let encoder: Arc<dyn Encoder> = Arc::new(FfmpegEncoder::new());
    let pipeline = MediaPipeline::new(config(), Arc::clone(&encoder), Arc::new(FfprobeDurationProbe));
    let report = pipeline
        .run(source, "e2e", &ProgressBar::hidden())
        .unwrap();

    println!("整理結果:");
    for line in report.summary_lines() {
        println!("  - {line}");
    }

    let base = source.join("WORKING/e2e");
    assert_eq!(report.processed, 3);
    assert_eq!(report.converted, 2);
    assert!(!report.has_errors());
    assert!(base.join("02_VIDS_10s/clip.mp4").exists());

    let red = base.join("01_IMAGES_VIDS/red.mp4");
    let duration = get_video_duration(&red).unwrap();
    assert!((duration - 1.0).abs() < 0.2, "影片長度應約 1 秒，實際 {duration}");

    // 以整理結果資料夾為根目錄合併
    let combiner = VideoCombinePipeline::new(config().file_type_table, encoder);
    let combined = combiner.run(&base).unwrap();

    assert_eq!(combined.clip_count, 2);
    let output = combined.output.unwrap();
    assert_eq!(output, base.join("combined_video_001.mp4"));
    assert!(base.join(CLIP_SUBFOLDER).join("001.mp4").exists());

    let total = get_video_duration(&output).unwrap();
    assert!((total - 2.0).abs() < 0.3, "合併長度應約 2 秒，實際 {total}");

    fs::remove_file(&output).unwrap();
    println!("✓ E2E 測試通過");
}
