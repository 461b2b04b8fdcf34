use crate::tools::Encoder;
use anyhow::{Context, Result, bail};
use log::{error, info, warn};
use regex::Regex;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};
use uuid::Uuid;

pub const OUTPUT_PREFIX: &str = "combined_video_";
pub const OUTPUT_EXTENSION: &str = ".mp4";

static COMBINED_NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^combined_video_(\d+)\.mp4$").expect("Invalid regex")
});

static STITCHED_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)_output\.mp4$").expect("Invalid regex"));

/// 輸出檔的命名方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputNaming {
    /// `combined_video_001.mp4`，隨機合併使用
    Combined,
    /// `001_output.mp4`，依檔名順序合併使用
    Stitched,
}

impl OutputNaming {
    fn pattern(self) -> &'static Regex {
        match self {
            Self::Combined => &*COMBINED_NAME_PATTERN,
            Self::Stitched => &*STITCHED_NAME_PATTERN,
        }
    }

    #[must_use]
    pub fn file_name(self, number: u64) -> String {
        match self {
            Self::Combined => format!("{OUTPUT_PREFIX}{number:03}{OUTPUT_EXTENSION}"),
            Self::Stitched => format!("{number:03}_output{OUTPUT_EXTENSION}"),
        }
    }
}

/// 下一個可用的輸出檔名：現有最大序號 + 1（沒有則從 1 開始）
pub fn next_output_path(directory: &Path) -> Result<PathBuf> {
    next_numbered_path(directory, OutputNaming::Combined)
}

pub fn next_numbered_path(directory: &Path, naming: OutputNaming) -> Result<PathBuf> {
    let entries = fs::read_dir(directory)
        .with_context(|| format!("無法掃描輸出資料夾: {}", directory.display()))?;

    let max_number = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let name = entry.file_name();
            let captures = naming.pattern().captures(name.to_str()?)?;
            captures[1].parse::<u64>().ok()
        })
        .max()
        .unwrap_or(0);

    let Some(next_number) = max_number.checked_add(1) else {
        bail!(
            "輸出序號已達上限 ({max_number})，請整理資料夾中的輸出檔案: {}",
            directory.display()
        );
    };

    let path = directory.join(naming.file_name(next_number));
    info!("下一個輸出檔案: {}", path.display());
    Ok(path)
}

/// concat 清單中的一行：路徑統一使用 `/`，單引號跳脫為 `'\''`
#[must_use]
pub fn manifest_line(path: &Path) -> String {
    let normalized = path.to_string_lossy().replace('\\', "/");
    format!("file '{}'", normalized.replace('\'', r"'\''"))
}

/// concat 清單檔，離開作用域時一定會刪除
struct ManifestGuard {
    path: PathBuf,
}

impl ManifestGuard {
    fn create(directory: &Path, clips: &[PathBuf]) -> Result<Self> {
        let path = directory.join(format!("ffmpeg_concat_list_{}.txt", Uuid::new_v4()));

        let mut content = String::new();
        for clip in clips {
            let absolute = std::path::absolute(clip)
                .with_context(|| format!("無法取得絕對路徑: {}", clip.display()))?;
            content.push_str(&manifest_line(&absolute));
            content.push('\n');
        }

        fs::write(&path, content)
            .with_context(|| format!("無法寫入 concat 清單: {}", path.display()))?;
        info!("已建立 concat 清單: {}", path.display());

        Ok(Self { path })
    }
}

impl Drop for ManifestGuard {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => info!("已刪除 concat 清單: {}", self.path.display()),
            Err(e) => warn!("無法刪除 concat 清單 {}: {}", self.path.display(), e),
        }
    }
}

/// 以串流複製（不重新編碼）依序合併影片
pub struct Concatenator {
    encoder: Arc<dyn Encoder>,
}

impl Concatenator {
    pub fn new(encoder: Arc<dyn Encoder>) -> Self {
        Self { encoder }
    }

    #[must_use]
    pub fn build_args(manifest: &Path, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "-hide_banner",
            "-nostdin",
            "-y",
            "-f",
            "concat",
            "-safe",
            "0",
            "-i",
        ]
        .iter()
        .map(OsString::from)
        .collect();
        args.push(manifest.as_os_str().to_os_string());
        args.extend(["-c", "copy"].iter().map(OsString::from));
        args.push(output.as_os_str().to_os_string());
        args
    }

    pub fn concatenate(&self, clips: &[PathBuf], output: &Path) -> Result<()> {
        if clips.is_empty() {
            bail!("沒有可合併的影片");
        }

        let directory = output
            .parent()
            .with_context(|| format!("無效的輸出路徑: {}", output.display()))?;
        let manifest = ManifestGuard::create(directory, clips)?;

        info!("開始合併 {} 部影片: {}", clips.len(), output.display());
        let result = self
            .encoder
            .run(&Self::build_args(&manifest.path, output))?;

        if !result.success {
            let diagnostics = result.diagnostics();
            error!("影片合併失敗 {}:\n{}", output.display(), diagnostics);
            if output.exists()
                && let Err(e) = fs::remove_file(output)
            {
                warn!("無法刪除失敗的輸出檔案 {}: {}", output.display(), e);
            }
            bail!("影片合併失敗:\n{diagnostics}");
        }

        info!("影片合併完成: {}", output.display());
        Ok(())
    }
}
