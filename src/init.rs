//! 全域記錄器初始化

use env_logger::{Builder, Env, Target};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};

/// 執行紀錄檔（附加寫入，不會覆蓋先前的紀錄）
pub const LOG_FILE: &str = "media_organizer.log";

/// 寫入紀錄檔，並在設定 `RUST_LOG` 時同步輸出到 stderr
struct RunLogWriter {
    file: File,
    mirror_to_stderr: bool,
}

impl Write for RunLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write_all(buf)?;
        if self.mirror_to_stderr {
            io::stderr().write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()?;
        if self.mirror_to_stderr {
            io::stderr().flush()?;
        }
        Ok(())
    }
}

/// 初始化記錄器，格式為 `時間 [等級] 訊息`
///
/// 預設等級為 info；無法開啟紀錄檔時改為只輸出到 stderr
pub fn init() {
    let mirror_to_stderr = std::env::var_os("RUST_LOG").is_some();
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));

    builder.format(|buf, record| {
        writeln!(
            buf,
            "{} [{}] {}",
            buf.timestamp_seconds(),
            record.level(),
            record.args()
        )
    });

    match OpenOptions::new().create(true).append(true).open(LOG_FILE) {
        Ok(file) => {
            builder.target(Target::Pipe(Box::new(RunLogWriter {
                file,
                mirror_to_stderr,
            })));
        }
        Err(e) => {
            eprintln!("無法開啟紀錄檔 {LOG_FILE}: {e}");
            builder.target(Target::Stderr);
        }
    }

    // 重複初始化（例如測試中）時忽略
    let _ = builder.try_init();
}
