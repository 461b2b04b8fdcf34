use super::destination_layout::{Bucket, DestinationLayout};
use super::path_classifier::{DurationBucket, MediaItem, MediaKind};
use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// 單一檔案的移動結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved { destination: PathBuf },
    /// 目標已有同名檔案，來源保持原狀
    Skipped { existing: PathBuf },
    Failed { reason: String },
}

#[derive(Debug, Clone)]
pub struct MoveRecord {
    pub source: PathBuf,
    pub bucket: Option<Bucket>,
    pub outcome: MoveOutcome,
}

/// 將已分類的檔案移動到目的分類資料夾，並記錄每一筆結果
pub struct Relocator<'a> {
    layout: &'a DestinationLayout,
    records: Vec<MoveRecord>,
}

impl<'a> Relocator<'a> {
    #[must_use]
    pub const fn new(layout: &'a DestinationLayout) -> Self {
        Self {
            layout,
            records: Vec::new(),
        }
    }

    /// 決定檔案所屬分類；影片沒有長度時無法分類
    #[must_use]
    pub fn bucket_for(item: &MediaItem) -> Option<Bucket> {
        match item.kind {
            MediaKind::Image => Some(Bucket::Images),
            MediaKind::Video => item
                .duration
                .map(|d| Bucket::from(DurationBucket::from_seconds(d))),
        }
    }

    pub fn relocate(&mut self, item: &MediaItem) -> &MoveOutcome {
        let bucket = Self::bucket_for(item);
        let outcome = match bucket {
            Some(bucket) => self.move_into(item, bucket),
            None => {
                warn!("無法取得影片長度，略過移動: {}", item.path.display());
                MoveOutcome::Failed {
                    reason: "無法取得影片長度".to_string(),
                }
            }
        };

        self.records.push(MoveRecord {
            source: item.path.clone(),
            bucket,
            outcome,
        });
        &self.records[self.records.len() - 1].outcome
    }

    fn move_into(&self, item: &MediaItem, bucket: Bucket) -> MoveOutcome {
        let Some(file_name) = item.path.file_name() else {
            return MoveOutcome::Failed {
                reason: "無法取得檔案名稱".to_string(),
            };
        };
        let target = self.layout.folder(bucket).join(file_name);

        if target.exists() {
            warn!("目標已有同名檔案，略過: {}", target.display());
            return MoveOutcome::Skipped { existing: target };
        }

        match move_file(&item.path, &target) {
            Ok(()) => {
                match item.duration {
                    Some(d) => info!(
                        "已移動影片 ({d:.2}s): {} -> {}",
                        item.path.display(),
                        bucket.folder_name()
                    ),
                    None => info!(
                        "已移動圖片: {} -> {}",
                        item.path.display(),
                        bucket.folder_name()
                    ),
                }
                MoveOutcome::Moved { destination: target }
            }
            Err(e) => {
                error!("移動檔案失敗 {}: {e:#}", item.path.display());
                MoveOutcome::Failed {
                    reason: format!("{e:#}"),
                }
            }
        }
    }

    #[must_use]
    pub fn records(&self) -> &[MoveRecord] {
        &self.records
    }

    /// 本次成功移入圖片分類的檔案（後續轉影片的來源）
    #[must_use]
    pub fn moved_images(&self) -> Vec<PathBuf> {
        self.records
            .iter()
            .filter(|r| r.bucket == Some(Bucket::Images))
            .filter_map(|r| match &r.outcome {
                MoveOutcome::Moved { destination } => Some(destination.clone()),
                _ => None,
            })
            .collect()
    }
}

/// 移動檔案；rename 失敗（例如跨檔案系統）時改用複製後刪除
///
/// 失敗時來源檔案保持原狀，不會留下不完整的目標檔
pub fn move_file(source: &Path, target: &Path) -> Result<()> {
    match fs::rename(source, target) {
        Ok(()) => {
            debug!("移動檔案: {} -> {}", source.display(), target.display());
            Ok(())
        }
        Err(rename_err) => {
            if !source.is_file() {
                return Err(rename_err)
                    .with_context(|| format!("來源檔案不存在: {}", source.display()));
            }
            copy_and_delete(source, target)
                .with_context(|| format!("rename 失敗 ({rename_err})，複製後刪除也失敗"))
        }
    }
}

fn copy_and_delete(source: &Path, target: &Path) -> Result<()> {
    if let Err(e) = fs::copy(source, target) {
        discard_partial_copy(target);
        return Err(e).with_context(|| {
            format!("複製檔案失敗: {} -> {}", source.display(), target.display())
        });
    }

    if let Err(e) = fs::remove_file(source) {
        // 來源仍在，移除複本以保持「完整移動或完全不動」
        discard_partial_copy(target);
        return Err(e).with_context(|| format!("刪除原檔案失敗: {}", source.display()));
    }

    Ok(())
}

fn discard_partial_copy(target: &Path) {
    if target.exists()
        && let Err(e) = fs::remove_file(target)
    {
        warn!("無法刪除不完整的複本 {}: {}", target.display(), e);
    }
}
