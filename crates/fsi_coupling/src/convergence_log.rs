// crates/fsi_coupling/src/convergence_log.rs

//! 外迭代收敛记录
//!
//! 每次外迭代一行纯文本：
//!
//! ```text
//! {time} {iteration} {residual:.6e}
//! ```
//!
//! 行先缓冲，每个时间步结束时刷新。内存中同时保留全部记录，便于事后检查。

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{CouplingError, CouplingResult};

/// 单条收敛记录
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResidualRecord {
    /// 物理时间
    pub time: f64,
    /// 外迭代编号（从 1 开始）
    pub iteration: usize,
    /// 残差范数
    pub residual: f64,
}

impl ResidualRecord {
    /// 格式化为一行
    pub fn to_line(&self) -> String {
        format!("{} {} {:.6e}\n", self.time, self.iteration, self.residual)
    }
}

/// 收敛记录
#[derive(Debug, Default)]
pub struct ConvergenceLog {
    path: Option<PathBuf>,
    writer: Option<BufWriter<File>>,
    records: Vec<ResidualRecord>,
}

impl ConvergenceLog {
    /// 仅内存记录
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// 创建（截断）记录文件
    pub fn create(path: impl AsRef<Path>) -> CouplingResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|source| CouplingError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            path: Some(path),
            writer: Some(BufWriter::new(file)),
            records: Vec::new(),
        })
    }

    /// 文件路径
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// 全部记录
    pub fn records(&self) -> &[ResidualRecord] {
        &self.records
    }

    /// 追加一条记录
    pub fn record(&mut self, time: f64, iteration: usize, residual: f64) -> CouplingResult<()> {
        let record = ResidualRecord {
            time,
            iteration,
            residual,
        };
        if let Some(writer) = self.writer.as_mut() {
            writer
                .write_all(record.to_line().as_bytes())
                .map_err(|source| CouplingError::Io {
                    path: self.path.clone().unwrap_or_default(),
                    source,
                })?;
        }
        self.records.push(record);
        Ok(())
    }

    /// 刷新到文件
    pub fn flush(&mut self) -> CouplingResult<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush().map_err(|source| CouplingError::Io {
                path: self.path.clone().unwrap_or_default(),
                source,
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_format() {
        let r = ResidualRecord {
            time: 0.25,
            iteration: 3,
            residual: 1.234567e-4,
        };
        assert_eq!(r.to_line(), "0.25 3 1.234567e-4\n");
    }

    #[test]
    fn test_write_and_flush() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fsiResiduals.dat");

        let mut log = ConvergenceLog::create(&path).unwrap();
        log.record(1.0, 1, 0.5).unwrap();
        log.record(1.0, 2, 0.0).unwrap();
        log.flush().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "1 1 5.000000e-1\n1 2 0.000000e0\n");
        assert_eq!(log.records().len(), 2);
    }

    #[test]
    fn test_in_memory() {
        let mut log = ConvergenceLog::in_memory();
        log.record(0.1, 1, 1e-3).unwrap();
        log.flush().unwrap();
        assert!(log.path().is_none());
        assert_eq!(log.records()[0].iteration, 1);
    }
}
