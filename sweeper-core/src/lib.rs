use serde::{Deserialize, Serialize};

pub mod actions;
pub mod archive;
pub mod entry;
pub mod error;
pub mod filter;
pub mod walker;

pub use actions::{AUDIT_PREFIX, ActionConfig, ActionDispatcher, AuditLog};
pub use archive::archive_file;
pub use entry::FileEntry;
pub use error::{Error, Result};
pub use filter::FilterCriteria;
pub use walker::{TreeWalker, WalkConfig};

/// 单次遍历的结果统计
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub listed: usize,
    pub archived: usize,
    pub deleted: usize,
    pub bytes_deleted: u64,
    pub duration_ms: u64,
}

impl Default for RunSummary {
    fn default() -> Self {
        Self::new()
    }
}

impl RunSummary {
    pub fn new() -> Self {
        Self {
            listed: 0,
            archived: 0,
            deleted: 0,
            bytes_deleted: 0,
            duration_ms: 0,
        }
    }

    /// 本次运行是否执行过任何动作
    pub fn is_empty(&self) -> bool {
        self.listed == 0 && self.archived == 0 && self.deleted == 0
    }

    pub fn format_size(&self) -> String {
        format_bytes(self.bytes_deleted)
    }
}

/// 格式化字节大小为人类可读格式
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}
