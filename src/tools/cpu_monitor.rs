use std::thread;
use std::time::Duration;
use sysinfo::System;

pub struct CpuMonitor {
    system: System,
}

impl CpuMonitor {
    #[must_use]
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu_all();
        thread::sleep(Duration::from_millis(200));
        system.refresh_cpu_all();
        Self { system }
    }

    /// 邏輯核心數（至少為 1）
    #[must_use]
    pub fn logical_cores(&self) -> usize {
        self.system.cpus().len().max(1)
    }

    pub fn current_usage(&mut self) -> f32 {
        self.system.refresh_cpu_all();
        self.system.global_cpu_usage()
    }
}

impl Default for CpuMonitor {
    fn default() -> Self {
        Self::new()
    }
}

/// 決定平行轉檔數量：設定為 0 時保留一個核心給系統
#[must_use]
pub const fn resolve_worker_count(configured: usize, logical_cores: usize) -> usize {
    if configured > 0 {
        return configured;
    }
    if logical_cores > 1 { logical_cores - 1 } else { 1 }
}
