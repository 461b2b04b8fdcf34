use super::concatenator::{Concatenator, OutputNaming, next_numbered_path, next_output_path};
use super::shuffle_renamer::ShuffleRenamer;
use crate::config::FileTypeTable;
use crate::tools::{
    Encoder, ensure_directory_exists, scan_folder_files_matching, sort_by_natural_name,
    validate_directory_exists,
};
use anyhow::{Context, Result, bail};
use log::{info, warn};
use rand::Rng;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// 要合併的影片所在的子資料夾
pub const CLIP_SUBFOLDER: &str = "01_IMAGES_VIDS";

/// 依檔名順序合併時，輸出檔所在的子資料夾
pub const STITCH_OUTPUT_FOLDER: &str = "OUTPUT";

/// 依檔名順序合併時額外接受的分段影片格式
const SEGMENT_EXTENSION: &str = "ts";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombineReport {
    pub clip_count: usize,
    /// 沒有影片可合併時為 None
    pub output: Option<PathBuf>,
    pub elapsed: Duration,
}

/// 合併影片的三種流程：
///
/// - `run`：隨機重新命名 `01_IMAGES_VIDS` 中的影片後，在根資料夾產生 `combined_video_NNN.mp4`
/// - `shuffle_folder`：只隨機重新命名任一資料夾中的影片
/// - `stitch_folder`：依檔名順序合併任一資料夾中的影片到 `OUTPUT/NNN_output.mp4`
pub struct VideoCombinePipeline {
    file_type_table: FileTypeTable,
    encoder: Arc<dyn Encoder>,
}

impl VideoCombinePipeline {
    pub fn new(file_type_table: FileTypeTable, encoder: Arc<dyn Encoder>) -> Self {
        Self {
            file_type_table,
            encoder,
        }
    }

    pub fn run(&self, root: &Path) -> Result<CombineReport> {
        self.run_with_rng(root, &mut rand::thread_rng())
    }

    pub fn run_with_rng<R: Rng + ?Sized>(&self, root: &Path, rng: &mut R) -> Result<CombineReport> {
        let started = Instant::now();
        validate_directory_exists(root)?;

        self.encoder
            .probe_version()
            .context("找不到 ffmpeg，請先安裝並加入 PATH")?;

        let clip_folder = root.join(CLIP_SUBFOLDER);
        if !clip_folder.is_dir() {
            bail!(
                "找不到影片資料夾 '{CLIP_SUBFOLDER}'，請選擇包含此資料夾的根目錄: {}",
                root.display()
            );
        }

        let mut renamer = ShuffleRenamer::new(&clip_folder, self.file_type_table.clone());
        let clips = renamer.shuffle_rename_with_rng(rng)?;

        if clips.is_empty() {
            warn!("沒有可合併的影片: {}", clip_folder.display());
            return Ok(CombineReport {
                clip_count: 0,
                output: None,
                elapsed: started.elapsed(),
            });
        }

        let output = next_output_path(root)?;
        Concatenator::new(Arc::clone(&self.encoder)).concatenate(&clips, &output)?;

        info!(
            "已合併 {} 部影片: {}",
            clips.len(),
            output.display()
        );
        Ok(CombineReport {
            clip_count: clips.len(),
            output: Some(output),
            elapsed: started.elapsed(),
        })
    }

    pub fn shuffle_folder(&self, folder: &Path) -> Result<Vec<PathBuf>> {
        self.shuffle_folder_with_rng(folder, &mut rand::thread_rng())
    }

    pub fn shuffle_folder_with_rng<R: Rng + ?Sized>(
        &self,
        folder: &Path,
        rng: &mut R,
    ) -> Result<Vec<PathBuf>> {
        validate_directory_exists(folder)?;
        ShuffleRenamer::new(folder, self.file_type_table.clone()).shuffle_rename_with_rng(rng)
    }

    pub fn stitch_folder(&self, folder: &Path) -> Result<CombineReport> {
        let started = Instant::now();
        validate_directory_exists(folder)?;

        self.encoder
            .probe_version()
            .context("找不到 ffmpeg，請先安裝並加入 PATH")?;

        let clips = self.stitch_clips(folder)?;
        if clips.is_empty() {
            warn!("沒有可合併的影片: {}", folder.display());
            return Ok(CombineReport {
                clip_count: 0,
                output: None,
                elapsed: started.elapsed(),
            });
        }
        info!("依檔名順序合併 {} 部影片", clips.len());

        let output_dir = folder.join(STITCH_OUTPUT_FOLDER);
        ensure_directory_exists(&output_dir)?;
        let output = next_numbered_path(&output_dir, OutputNaming::Stitched)?;
        Concatenator::new(Arc::clone(&self.encoder)).concatenate(&clips, &output)?;

        Ok(CombineReport {
            clip_count: clips.len(),
            output: Some(output),
            elapsed: started.elapsed(),
        })
    }

    fn stitch_clips(&self, folder: &Path) -> Result<Vec<PathBuf>> {
        let mut clips = scan_folder_files_matching(folder, |path| {
            self.file_type_table.is_video_file(path)
                || path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(SEGMENT_EXTENSION))
        })
        .with_context(|| format!("無法讀取影片資料夾: {}", folder.display()))?;

        sort_by_natural_name(&mut clips);
        Ok(clips)
    }
}
