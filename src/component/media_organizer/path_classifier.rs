//! 依副檔名判斷媒體類型，並以影片長度決定分類區間

use crate::config::FileTypeTable;
use crate::tools::DurationProbe;
use log::warn;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Video,
}

/// 影片長度區間（下一區間的下界不包含在內：≤10、≤20、≤30、其餘）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DurationBucket {
    UpTo10s,
    UpTo20s,
    UpTo30s,
    Long,
}

impl DurationBucket {
    #[must_use]
    pub fn from_seconds(duration: f64) -> Self {
        if duration <= 10.0 {
            Self::UpTo10s
        } else if duration <= 20.0 {
            Self::UpTo20s
        } else if duration <= 30.0 {
            Self::UpTo30s
        } else {
            Self::Long
        }
    }
}

/// 已分類的媒體檔案
#[derive(Debug, Clone, PartialEq)]
pub struct MediaItem {
    pub path: PathBuf,
    pub kind: MediaKind,
    /// 影片長度（秒），圖片或無法取得時為 None
    pub duration: Option<f64>,
}

pub struct PathClassifier {
    file_type_table: FileTypeTable,
    probe: Arc<dyn DurationProbe>,
}

impl PathClassifier {
    pub fn new(file_type_table: FileTypeTable, probe: Arc<dyn DurationProbe>) -> Self {
        Self {
            file_type_table,
            probe,
        }
    }

    /// 只看副檔名，不存取檔案內容
    #[must_use]
    pub fn media_kind(&self, path: &Path) -> Option<MediaKind> {
        if self.file_type_table.is_image_file(path) {
            Some(MediaKind::Image)
        } else if self.file_type_table.is_video_file(path) {
            Some(MediaKind::Video)
        } else {
            None
        }
    }

    /// 分類檔案；影片會另外取得長度，失敗時 `duration` 為 None
    ///
    /// 無法辨識的副檔名回傳 None，呼叫端應保持檔案原狀
    #[must_use]
    pub fn classify(&self, path: &Path) -> Option<MediaItem> {
        let kind = self.media_kind(path)?;

        let duration = match kind {
            MediaKind::Image => None,
            MediaKind::Video => match self.probe.probe_duration(path) {
                Ok(seconds) => Some(seconds),
                Err(e) => {
                    warn!("無法取得影片長度 {}: {e:#}", path.display());
                    None
                }
            },
        };

        Some(MediaItem {
            path: path.to_path_buf(),
            kind,
            duration,
        })
    }
}
