use super::batch_report::{BatchReport, BatchTally};
use super::destination_layout::{Bucket, DestinationLayout, sanitize_folder_name};
use super::encode_orchestrator::{EncodeOrchestrator, build_conversion_tasks};
use super::ken_burns::KenBurnsRenderer;
use super::path_classifier::PathClassifier;
use super::relocator::Relocator;
use crate::config::Config;
use crate::tools::{
    CpuMonitor, DurationProbe, Encoder, resolve_worker_count, scan_folder_files,
    validate_directory_exists,
};
use anyhow::{Context, Result};
use indicatif::ProgressBar;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// 整理媒體並產生圖片影片的完整流程（不含互動介面）
///
/// 1. 檢查編碼器（找不到即中止，不動任何檔案）
/// 2. 建立目的資料夾結構
/// 3. 逐一分類並移動來源資料夾第一層的檔案
/// 4. 將本次移入的圖片平行轉成影片
pub struct MediaPipeline {
    config: Config,
    encoder: Arc<dyn Encoder>,
    probe: Arc<dyn DurationProbe>,
    show_cpu_usage: bool,
}

impl MediaPipeline {
    pub fn new(config: Config, encoder: Arc<dyn Encoder>, probe: Arc<dyn DurationProbe>) -> Self {
        Self {
            config,
            encoder,
            probe,
            show_cpu_usage: false,
        }
    }

    /// 轉檔進度訊息中附上 CPU 使用率
    #[must_use]
    pub const fn with_cpu_usage(mut self, enabled: bool) -> Self {
        self.show_cpu_usage = enabled;
        self
    }

    pub fn run(&self, source: &Path, folder_name: &str, progress: &ProgressBar) -> Result<BatchReport> {
        validate_directory_exists(source)?;

        self.encoder
            .probe_version()
            .context("找不到 ffmpeg，請先安裝並加入 PATH")?;

        let folder_name = sanitize_folder_name(folder_name)?;
        let working_subdir = &self.config.settings.organizer.working_subdir;
        let working_dir = source.join(working_subdir);
        if !working_dir.is_dir() {
            warn!("工作資料夾不存在，將自動建立: {}", working_dir.display());
        }

        let layout = DestinationLayout::for_batch(source, working_subdir, &folder_name);
        layout.ensure()?;

        let mut tally = BatchTally::start();
        let moved_images = self.relocate_all(source, &layout, &mut tally)?;

        let output_dir = layout.folder(Bucket::ImageDerivedVideos);
        let tasks = build_conversion_tasks(&moved_images, &output_dir);
        info!(
            "本次移入 {} 張圖片，需轉換 {} 張",
            moved_images.len(),
            tasks.len()
        );

        let mut orchestrator = self.build_orchestrator();
        let summary = orchestrator.run(tasks, progress)?;
        tally.record_encoding(&summary);

        let report = tally.finish(Some(layout.base().to_path_buf()));
        info!(
            "批次作業{} - 移動: {}, 產生影片: {}, 轉換失敗: {}, 錯誤: {}",
            report.headline(),
            report.processed,
            report.converted,
            report.conversion_failed,
            report.errors
        );
        Ok(report)
    }

    fn relocate_all(
        &self,
        source: &Path,
        layout: &DestinationLayout,
        tally: &mut BatchTally,
    ) -> Result<Vec<PathBuf>> {
        let files = scan_folder_files(source)
            .with_context(|| format!("無法掃描來源資料夾: {}", source.display()))?;
        info!("來源資料夾共有 {} 個檔案", files.len());

        let classifier = PathClassifier::new(
            self.config.file_type_table.clone(),
            Arc::clone(&self.probe),
        );
        let mut relocator = Relocator::new(layout);

        for path in &files {
            let Some(item) = classifier.classify(path) else {
                debug!("非媒體檔案，保持原位: {}", path.display());
                tally.record_unclassified();
                continue;
            };
            relocator.relocate(&item);
        }

        for record in relocator.records() {
            tally.record_move(record);
        }

        Ok(relocator.moved_images())
    }

    fn build_orchestrator(&self) -> EncodeOrchestrator {
        let cpu_monitor = CpuMonitor::new();
        let worker_count = resolve_worker_count(
            self.config.settings.organizer.worker_count,
            cpu_monitor.logical_cores(),
        );

        let renderer = KenBurnsRenderer::new(
            self.config.settings.ken_burns.clone(),
            Arc::clone(&self.encoder),
        );
        let orchestrator = EncodeOrchestrator::new(Arc::new(renderer), worker_count);

        if self.show_cpu_usage {
            orchestrator.with_cpu_monitor(cpu_monitor)
        } else {
            orchestrator
        }
    }
}
