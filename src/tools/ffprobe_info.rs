use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::Path;
use std::process::{Command, Stdio};

#[derive(Deserialize)]
struct FfprobeOutput {
    format: Option<FormatInfo>,
    streams: Option<Vec<StreamInfo>>,
}

#[derive(Deserialize)]
struct FormatInfo {
    duration: Option<String>,
}

#[derive(Deserialize)]
struct StreamInfo {
    codec_type: Option<String>,
    duration: Option<String>,
}

/// 取得影片長度（秒）的介面，測試時可替換
pub trait DurationProbe: Send + Sync {
    fn probe_duration(&self, path: &Path) -> Result<f64>;
}

/// 以 ffprobe 取得影片長度
pub struct FfprobeDurationProbe;

impl DurationProbe for FfprobeDurationProbe {
    fn probe_duration(&self, path: &Path) -> Result<f64> {
        get_video_duration(path)
    }
}

/// 使用 ffprobe 取得影片長度
///
/// `output()` 會等待子程序結束並回收所有管線，失敗時也不會遺留佔用中的檔案
pub fn get_video_duration(path: &Path) -> Result<f64> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .output()
        .with_context(|| format!("無法執行 ffprobe: {}", path.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("ffprobe 執行失敗: {} {}", path.display(), stderr.trim());
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_duration(&stdout).with_context(|| format!("無法取得影片長度: {}", path.display()))
}

/// 解析 ffprobe JSON，優先使用 format 的長度，其次是視訊串流
fn parse_duration(json: &str) -> Result<f64> {
    let probe: FfprobeOutput = serde_json::from_str(json).context("無法解析 ffprobe 輸出")?;

    // 長度可能是 "N/A"，無法解析時改用視訊串流的長度
    let format_duration = parse_seconds(probe.format.as_ref().and_then(|f| f.duration.as_ref()));
    let duration = format_duration
        .or_else(|| {
            probe.streams.as_ref().and_then(|streams| {
                streams
                    .iter()
                    .filter(|s| s.codec_type.as_deref() == Some("video"))
                    .find_map(|s| parse_seconds(s.duration.as_ref()))
            })
        })
        .ok_or_else(|| anyhow::anyhow!("ffprobe 輸出中沒有長度資訊"))?;

    if !duration.is_finite() || duration < 0.0 {
        bail!("影片長度無效: {duration}");
    }

    Ok(duration)
}

fn parse_seconds(value: Option<&String>) -> Option<f64> {
    value.and_then(|d| d.parse::<f64>().ok())
}
