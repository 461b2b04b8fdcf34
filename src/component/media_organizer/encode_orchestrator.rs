use super::ken_burns::{KenBurnsRenderer, RenderStatus};
use crate::tools::{CpuMonitor, EncoderError};
use anyhow::{Context, Result};
use indicatif::ProgressBar;
use log::{error, info, warn};
use rayon::ThreadPoolBuilder;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;

/// 一張圖片轉一段影片
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionTask {
    pub source_path: PathBuf,
    pub target_path: PathBuf,
}

/// 單一任務的結果，不會重試
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOutcome {
    pub source_path: PathBuf,
    pub success: bool,
    pub error_message: Option<String>,
}

#[derive(Debug, Default)]
pub struct EncodeSummary {
    pub total: usize,
    pub converted: usize,
    pub failed: usize,
    pub outcomes: Vec<TaskOutcome>,
}

/// 工作執行緒回報的結果
enum WorkerReport {
    Done(RenderStatus),
    Fatal(EncoderError),
    Crashed(String),
    /// 已發生致命錯誤，尚未開始的任務直接略過
    Cancelled,
}

/// 由圖片清單建立轉檔任務；輸出已存在的圖片直接略過（不算錯誤）
#[must_use]
pub fn build_conversion_tasks(images: &[PathBuf], output_dir: &Path) -> Vec<ConversionTask> {
    images
        .iter()
        .filter_map(|image| {
            let stem = image.file_stem()?;
            let mut file_name = stem.to_os_string();
            file_name.push(".mp4");
            let target_path = output_dir.join(file_name);

            if target_path.exists() {
                warn!("輸出影片已存在，略過: {}", target_path.display());
                return None;
            }

            Some(ConversionTask {
                source_path: image.clone(),
                target_path,
            })
        })
        .collect()
}

/// 以固定大小的工作池平行執行轉檔任務
///
/// 每個工作執行緒一次只處理一個任務，實際編碼在獨立的 ffmpeg 程序中進行；
/// 任務與結果透過 channel 傳遞，彼此之間沒有共享的可變狀態
pub struct EncodeOrchestrator {
    renderer: Arc<KenBurnsRenderer>,
    worker_count: usize,
    cpu_monitor: Option<CpuMonitor>,
}

impl EncodeOrchestrator {
    pub fn new(renderer: Arc<KenBurnsRenderer>, worker_count: usize) -> Self {
        Self {
            renderer,
            worker_count: worker_count.max(1),
            cpu_monitor: None,
        }
    }

    /// 在進度訊息中顯示 CPU 使用率
    #[must_use]
    pub fn with_cpu_monitor(mut self, cpu_monitor: CpuMonitor) -> Self {
        self.cpu_monitor = Some(cpu_monitor);
        self
    }

    #[must_use]
    pub const fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// 執行全部任務並等待工作池清空
    ///
    /// 找不到編碼器時，尚未開始的任務會被略過，等所有工作結束後回傳該致命錯誤
    pub fn run(&mut self, tasks: Vec<ConversionTask>, progress: &ProgressBar) -> Result<EncodeSummary> {
        let total = tasks.len();
        let mut summary = EncodeSummary {
            total,
            ..EncodeSummary::default()
        };

        if tasks.is_empty() {
            info!("沒有需要轉換的圖片");
            return Ok(summary);
        }

        info!(
            "開始轉換 {} 張圖片，使用 {} 個平行工作",
            total, self.worker_count
        );

        let pool = ThreadPoolBuilder::new()
            .num_threads(self.worker_count)
            .thread_name(|i| format!("ken-burns-{i}"))
            .build()
            .context("無法建立轉檔工作池")?;

        let (sender, receiver) = mpsc::channel::<(usize, WorkerReport)>();
        let abort = Arc::new(AtomicBool::new(false));

        for (index, task) in tasks.iter().enumerate() {
            let sender = sender.clone();
            let renderer = Arc::clone(&self.renderer);
            let abort = Arc::clone(&abort);
            let task = task.clone();

            pool.spawn(move || {
                let report = run_task(&renderer, &task, &abort);
                // 接收端只會在全部結果收齊後才結束
                let _ = sender.send((index, report));
            });
        }
        drop(sender);

        progress.set_length(total as u64);
        progress.set_position(0);

        let mut fatal: Option<EncoderError> = None;

        for (completed, (index, report)) in receiver.iter().enumerate() {
            let task = &tasks[index];
            let outcome = match report {
                WorkerReport::Done(RenderStatus::Rendered) => TaskOutcome {
                    source_path: task.source_path.clone(),
                    success: true,
                    error_message: None,
                },
                WorkerReport::Done(RenderStatus::Failed(message)) => TaskOutcome {
                    source_path: task.source_path.clone(),
                    success: false,
                    error_message: Some(message),
                },
                WorkerReport::Crashed(message) => {
                    error!(
                        "轉檔工作異常終止 {}: {}",
                        task.source_path.display(),
                        message
                    );
                    TaskOutcome {
                        source_path: task.source_path.clone(),
                        success: false,
                        error_message: Some(format!("工作異常終止: {message}")),
                    }
                }
                WorkerReport::Fatal(e) => {
                    let message = e.to_string();
                    fatal.get_or_insert(e);
                    TaskOutcome {
                        source_path: task.source_path.clone(),
                        success: false,
                        error_message: Some(message),
                    }
                }
                WorkerReport::Cancelled => TaskOutcome {
                    source_path: task.source_path.clone(),
                    success: false,
                    error_message: Some("已取消".to_string()),
                },
            };

            if outcome.success {
                summary.converted += 1;
            } else {
                summary.failed += 1;
            }
            summary.outcomes.push(outcome);

            self.report_progress(progress, completed + 1, total, &task.source_path);
        }

        if let Some(e) = fatal {
            error!("找不到編碼器，轉檔作業中止");
            return Err(e.into());
        }

        info!(
            "圖片轉影片完成 - 成功: {}, 失敗: {}",
            summary.converted, summary.failed
        );
        Ok(summary)
    }

    fn report_progress(&mut self, progress: &ProgressBar, completed: usize, total: usize, last: &Path) {
        let name = last
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let message = match self.cpu_monitor.as_mut() {
            Some(monitor) => format!("CPU {:.1}% | 完成: {name}", monitor.current_usage()),
            None => format!("完成: {name}"),
        };

        progress.set_position(completed as u64);
        progress.set_message(message);
        info!("轉換進度 {completed}/{total}: {name}");
    }
}

fn run_task(renderer: &KenBurnsRenderer, task: &ConversionTask, abort: &AtomicBool) -> WorkerReport {
    if abort.load(Ordering::SeqCst) {
        return WorkerReport::Cancelled;
    }

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        renderer.render(&task.source_path, &task.target_path)
    }));

    match result {
        Ok(Ok(status)) => WorkerReport::Done(status),
        Ok(Err(e)) => {
            abort.store(true, Ordering::SeqCst);
            WorkerReport::Fatal(e)
        }
        Err(payload) => WorkerReport::Crashed(panic_message(payload.as_ref())),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "未知的錯誤".to_string()
    }
}
