use super::encode_orchestrator::EncodeSummary;
use super::relocator::{MoveOutcome, MoveRecord};
use crate::init::LOG_FILE;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// 批次進行中的計數器
#[derive(Debug)]
pub struct BatchTally {
    started: Instant,
    processed: usize,
    skipped: usize,
    errors: usize,
    unclassified: usize,
    converted: usize,
    conversion_failed: usize,
}

impl Default for BatchTally {
    fn default() -> Self {
        Self::start()
    }
}

impl BatchTally {
    #[must_use]
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            processed: 0,
            skipped: 0,
            errors: 0,
            unclassified: 0,
            converted: 0,
            conversion_failed: 0,
        }
    }

    pub fn record_move(&mut self, record: &MoveRecord) {
        match record.outcome {
            MoveOutcome::Moved { .. } => self.processed += 1,
            MoveOutcome::Skipped { .. } => self.skipped += 1,
            MoveOutcome::Failed { .. } => self.errors += 1,
        }
    }

    pub fn record_unclassified(&mut self) {
        self.unclassified += 1;
    }

    pub fn record_encoding(&mut self, summary: &EncodeSummary) {
        self.converted += summary.converted;
        self.conversion_failed += summary.failed;
    }

    #[must_use]
    pub fn finish(self, output: Option<PathBuf>) -> BatchReport {
        BatchReport {
            processed: self.processed,
            converted: self.converted,
            conversion_failed: self.conversion_failed,
            errors: self.errors,
            skipped: self.skipped,
            unclassified: self.unclassified,
            output,
            elapsed: self.started.elapsed(),
        }
    }
}

/// 批次作業的最終摘要
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    /// 成功移動的檔案數
    pub processed: usize,
    pub converted: usize,
    pub conversion_failed: usize,
    /// 移動或取得影片長度失敗的檔案數
    pub errors: usize,
    pub skipped: usize,
    pub unclassified: usize,
    pub output: Option<PathBuf>,
    pub elapsed: Duration,
}

impl BatchReport {
    #[must_use]
    pub const fn has_errors(&self) -> bool {
        self.errors > 0 || self.conversion_failed > 0
    }

    #[must_use]
    pub fn headline(&self) -> &'static str {
        if self.has_errors() {
            "完成但有錯誤"
        } else {
            "完成"
        }
    }

    /// 摘要內容，每行一個項目
    #[must_use]
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("已處理/移動: {} 個檔案", self.processed),
            format!("已產生影片: {} 個", self.converted),
        ];

        if self.conversion_failed > 0 {
            lines.push(format!("轉換失敗: {} 個", self.conversion_failed));
        }
        if self.skipped > 0 {
            lines.push(format!("同名已存在而略過: {} 個", self.skipped));
        }
        if self.unclassified > 0 {
            lines.push(format!("未分類（保持原位）: {} 個", self.unclassified));
        }
        if self.errors > 0 {
            lines.push(format!("處理失敗: {} 個", self.errors));
        }
        if let Some(output) = &self.output {
            lines.push(format!("結果資料夾: {}", output.display()));
        }
        lines.push(format!("總耗時: {}", format_elapsed(self.elapsed)));

        if self.has_errors() {
            lines.push(format!("詳細錯誤請查看記錄檔: {LOG_FILE}"));
        }

        lines
    }

    #[must_use]
    pub fn output_dir(&self) -> Option<&Path> {
        self.output.as_deref()
    }
}

/// 以 `1h 02m 03.4s` 形式顯示耗時
#[must_use]
pub fn format_elapsed(elapsed: Duration) -> String {
    // 先四捨五入到 0.1 秒再拆分，避免出現 `1m 60.0s`
    let tenths = (elapsed.as_secs_f64() * 10.0).round() as u64;
    let hours = tenths / 36_000;
    let minutes = tenths % 36_000 / 600;
    let seconds = (tenths % 600) as f64 / 10.0;

    if hours > 0 {
        format!("{hours}h {minutes:02}m {seconds:04.1}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds:04.1}s")
    } else {
        format!("{seconds:.1}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(outcome: MoveOutcome) -> MoveRecord {
        MoveRecord {
            source: PathBuf::from("/src/x"),
            bucket: None,
            outcome,
        }
    }

    #[test]
    fn test_tally_counts_outcomes() {
        let mut tally = BatchTally::start();
        tally.record_move(&record(MoveOutcome::Moved {
            destination: PathBuf::from("/dst/x"),
        }));
        tally.record_move(&record(MoveOutcome::Skipped {
            existing: PathBuf::from("/dst/y"),
        }));
        tally.record_move(&record(MoveOutcome::Failed {
            reason: "boom".to_string(),
        }));
        tally.record_unclassified();
        tally.record_encoding(&EncodeSummary {
            total: 3,
            converted: 2,
            failed: 1,
            outcomes: Vec::new(),
        });

        let report = tally.finish(Some(PathBuf::from("/dst")));
        assert_eq!(report.processed, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.errors, 1);
        assert_eq!(report.unclassified, 1);
        assert_eq!(report.converted, 2);
        assert_eq!(report.conversion_failed, 1);
        assert!(report.has_errors());
        assert_eq!(report.headline(), "完成但有錯誤");
        assert_eq!(report.output_dir(), Some(Path::new("/dst")));
    }

    #[test]
    fn test_summary_lines_without_errors() {
        let report = BatchTally::start().finish(None);
        let lines = report.summary_lines();

        assert!(!report.has_errors());
        assert_eq!(report.headline(), "完成");
        assert!(lines[0].contains('0'));
        assert!(!lines.iter().any(|l| l.contains(LOG_FILE)));
        assert!(lines.last().unwrap().starts_with("總耗時"));
    }

    #[test]
    fn test_summary_points_to_log_on_errors() {
        let mut tally = BatchTally::start();
        tally.record_move(&record(MoveOutcome::Failed {
            reason: "probe failed".to_string(),
        }));
        let lines = tally.finish(None).summary_lines();
        assert!(lines.last().unwrap().contains(LOG_FILE));
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_elapsed(Duration::from_secs(125)), "2m 05.0s");
        assert_eq!(format_elapsed(Duration::from_secs(3723)), "1h 02m 03.0s");
    }

    #[test]
    fn test_format_elapsed_rounds_before_carrying() {
        assert_eq!(format_elapsed(Duration::from_millis(59_960)), "1m 00.0s");
        assert_eq!(format_elapsed(Duration::from_millis(119_960)), "2m 00.0s");
        assert_eq!(format_elapsed(Duration::from_millis(3_599_970)), "1h 00m 00.0s");
        assert_eq!(format_elapsed(Duration::from_millis(9_940)), "9.9s");
    }
}
