//! 外部編碼器（ffmpeg）呼叫介面
//!
//! 編碼器被視為黑盒：參數進、結束碼與輸出出，測試時可替換成假的實作

use log::debug;
use std::ffi::OsString;
use std::io;
use std::process::{Command, Stdio};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EncoderError {
    /// 找不到編碼器執行檔，整批作業都無法繼續
    #[error("找不到或無法執行 {program}，請確認已安裝並加入 PATH")]
    NotFound { program: String },

    #[error("無法執行 {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// 編碼器一次執行的結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl EncoderOutput {
    /// 組合結束碼與標準輸出/錯誤，供失敗紀錄使用
    #[must_use]
    pub fn diagnostics(&self) -> String {
        let code = self
            .code
            .map_or_else(|| "無（被訊號終止）".to_string(), |c| c.to_string());
        format!(
            "結束碼: {}\nstdout:\n{}\nstderr:\n{}",
            code,
            self.stdout.trim(),
            self.stderr.trim()
        )
    }
}

pub trait Encoder: Send + Sync {
    /// 啟動前檢查編碼器是否可用（相當於 `ffmpeg -version`）
    fn probe_version(&self) -> Result<(), EncoderError>;

    fn run(&self, args: &[OsString]) -> Result<EncoderOutput, EncoderError>;
}

pub struct FfmpegEncoder {
    program: String,
}

impl FfmpegEncoder {
    #[must_use]
    pub fn new() -> Self {
        Self::with_program("ffmpeg")
    }

    #[must_use]
    pub fn with_program(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }

    fn spawn_error(&self, e: io::Error) -> EncoderError {
        if e.kind() == io::ErrorKind::NotFound {
            EncoderError::NotFound {
                program: self.program.clone(),
            }
        } else {
            EncoderError::Io {
                program: self.program.clone(),
                source: e,
            }
        }
    }
}

impl Default for FfmpegEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder for FfmpegEncoder {
    fn probe_version(&self) -> Result<(), EncoderError> {
        let output = Command::new(&self.program)
            .arg("-version")
            .stdin(Stdio::null())
            .output()
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(EncoderError::NotFound {
                program: self.program.clone(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        debug!(
            "{} 版本: {}",
            self.program,
            stdout.lines().next().unwrap_or_default()
        );
        Ok(())
    }

    fn run(&self, args: &[OsString]) -> Result<EncoderOutput, EncoderError> {
        debug!(
            "執行 {} {}",
            self.program,
            args.iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );

        let output = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| self.spawn_error(e))?;

        Ok(EncoderOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// 判斷錯誤鏈中是否為「找不到編碼器」的致命錯誤
#[must_use]
pub fn is_encoder_missing(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<EncoderError>(),
            Some(EncoderError::NotFound { .. })
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    const MISSING_PROGRAM: &str = "definitely-not-an-encoder-7f3a9c";

    #[test]
    fn test_missing_program_is_not_found() {
        let encoder = FfmpegEncoder::with_program(MISSING_PROGRAM);
        assert!(matches!(
            encoder.probe_version(),
            Err(EncoderError::NotFound { .. })
        ));
        assert!(matches!(
            encoder.run(&[OsString::from("-version")]),
            Err(EncoderError::NotFound { .. })
        ));
    }

    #[test]
    fn test_is_encoder_missing_through_context() {
        let result: anyhow::Result<()> = Err(EncoderError::NotFound {
            program: "ffmpeg".to_string(),
        })
        .context("轉檔失敗");
        let error = result.unwrap_err();
        assert!(is_encoder_missing(&error));

        let other = anyhow::anyhow!("其他錯誤");
        assert!(!is_encoder_missing(&other));
    }

    #[test]
    fn test_diagnostics_contains_both_streams() {
        let output = EncoderOutput {
            success: false,
            code: Some(1),
            stdout: "out text\n".to_string(),
            stderr: "err text\n".to_string(),
        };
        let text = output.diagnostics();
        assert!(text.contains("結束碼: 1"));
        assert!(text.contains("out text"));
        assert!(text.contains("err text"));
    }
}
