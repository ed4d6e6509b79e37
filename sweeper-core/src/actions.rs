use std::io::Write;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::RunSummary;
use crate::archive::archive_file;
use crate::entry::FileEntry;
use crate::error::{Error, Result};

/// 删除审计记录行的固定前缀
pub const AUDIT_PREFIX: &str = "DELETED FILE: ";

/// 动作配置
///
/// 一次运行构造一次，遍历期间只读。`list` 与其他动作互斥（短路），
/// 归档与删除可以组合：先归档后删除。
#[derive(Debug, Clone, Default)]
pub struct ActionConfig {
    /// 仅列出文件
    pub list: bool,
    /// 删除文件
    pub delete: bool,
    /// 归档目标目录，为 `None` 时不归档
    pub archive_to: Option<PathBuf>,
}

/// 删除操作的审计日志
///
/// 追加写入，每删除一个文件产生一行：`DELETED FILE: <时间戳> <路径>`。
/// 显式传入写入端，不依赖任何全局 logger 状态。
pub struct AuditLog<A: Write> {
    writer: A,
}

impl<A: Write> AuditLog<A> {
    /// 包装一个审计写入端
    pub fn new(writer: A) -> Self {
        Self { writer }
    }

    /// 追加一条删除记录
    pub fn record(&mut self, path: &std::path::Path) -> std::io::Result<()> {
        // 固定格式时间戳，与地区设置无关
        let timestamp = chrono::Local::now().format("%Y/%m/%d %H:%M:%S");
        writeln!(self.writer, "{AUDIT_PREFIX}{timestamp} {}", path.display())
    }
}

/// 动作分发器
///
/// 对每个通过过滤的条目按固定优先级执行动作：
/// 1. `list` 开启时写出一行路径，随即结束（不再归档或删除）；
/// 2. 否则若配置了归档目录，先归档，失败立即向上传播；
/// 3. 然后若 `delete` 开启，删除原文件并写审计记录；
/// 4. 若没有任何动作被执行，回退到列出动作。
pub struct ActionDispatcher<O: Write, A: Write> {
    config: ActionConfig,
    root: PathBuf,
    out: O,
    audit: AuditLog<A>,
}

impl<O: Write, A: Write> ActionDispatcher<O, A> {
    /// 创建新的分发器
    ///
    /// `root` 是遍历根目录，用于在归档时重建相对路径。
    pub fn new(config: ActionConfig, root: impl Into<PathBuf>, out: O, audit: A) -> Self {
        Self {
            config,
            root: root.into(),
            out,
            audit: AuditLog::new(audit),
        }
    }

    /// 对单个条目执行配置的动作
    ///
    /// 任何动作失败都会包装为 [`Error::Dispatch`] 返回，由调用方终止遍历。
    pub fn dispatch(&mut self, entry: &FileEntry, summary: &mut RunSummary) -> Result<()> {
        if self.config.list {
            return self.list_entry(entry, summary);
        }

        let mut acted = false;

        if let Some(dest) = self.config.archive_to.clone() {
            archive_file(&dest, &self.root, &entry.path)
                .map_err(|e| Error::dispatch(&entry.path, e))?;
            summary.archived += 1;
            acted = true;
        }

        if self.config.delete {
            return self.delete_entry(entry, summary);
        }

        if !acted {
            return self.list_entry(entry, summary);
        }

        Ok(())
    }

    /// 列出条目：向输出端写一行路径
    fn list_entry(&mut self, entry: &FileEntry, summary: &mut RunSummary) -> Result<()> {
        writeln!(self.out, "{}", entry.path.display())
            .map_err(|e| Error::dispatch(&entry.path, Error::Io(e)))?;
        summary.listed += 1;
        Ok(())
    }

    /// 删除条目并追加审计记录
    fn delete_entry(&mut self, entry: &FileEntry, summary: &mut RunSummary) -> Result<()> {
        std::fs::remove_file(&entry.path).map_err(|e| Error::dispatch(&entry.path, Error::Io(e)))?;

        self.audit
            .record(&entry.path)
            .map_err(|e| Error::dispatch(&entry.path, Error::Io(e)))?;

        summary.deleted += 1;
        summary.bytes_deleted += entry.size;
        debug!("删除条目 {:?}", entry.path);
        Ok(())
    }

    /// 结束分发，刷新并交回两个写入端
    pub fn finish(mut self) -> Result<(O, A)> {
        self.out.flush()?;
        self.audit.writer.flush()?;
        info!("动作分发结束");
        Ok((self.out, self.audit.writer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use tempfile::TempDir;

    fn dispatch_one(
        config: ActionConfig,
        root: &std::path::Path,
        entry: &FileEntry,
    ) -> Result<(RunSummary, String, String), Error> {
        let mut dispatcher = ActionDispatcher::new(config, root, Vec::new(), Vec::new());
        let mut summary = RunSummary::new();
        dispatcher.dispatch(entry, &mut summary)?;
        let (out, audit) = dispatcher.finish()?;
        Ok((
            summary,
            String::from_utf8_lossy(&out).into_owned(),
            String::from_utf8_lossy(&audit).into_owned(),
        ))
    }

    fn write_entry(root: &std::path::Path, name: &str, content: &str) -> Result<FileEntry> {
        let path = root.join(name);
        fs::write(&path, content)?;
        Ok(FileEntry::from_path(&path)?)
    }

    #[test]
    fn test_list_writes_one_line_per_entry() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let entry = write_entry(temp_dir.path(), "a.log", "twelve bytes")?;

        let config = ActionConfig {
            list: true,
            ..Default::default()
        };
        let (summary, out, audit) = dispatch_one(config, temp_dir.path(), &entry)?;

        assert_eq!(out, format!("{}\n", entry.path.display()));
        assert!(audit.is_empty());
        assert_eq!(summary.listed, 1);
        // 列出是终结动作，文件原样保留
        assert!(entry.path.exists());

        Ok(())
    }

    #[test]
    fn test_default_action_is_listing() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let entry = write_entry(temp_dir.path(), "a.log", "content")?;

        let (summary, out, _) = dispatch_one(ActionConfig::default(), temp_dir.path(), &entry)?;

        assert_eq!(out, format!("{}\n", entry.path.display()));
        assert_eq!(summary.listed, 1);

        Ok(())
    }

    #[test]
    fn test_delete_removes_file_and_records_audit_line() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let entry = write_entry(temp_dir.path(), "a.log", "twelve bytes")?;

        let config = ActionConfig {
            delete: true,
            ..Default::default()
        };
        let (summary, out, audit) = dispatch_one(config, temp_dir.path(), &entry)?;

        assert!(!entry.path.exists());
        assert!(out.is_empty());

        // 审计记录恰好一行，带前缀并包含文件路径
        assert_eq!(audit.lines().count(), 1);
        assert!(audit.starts_with(AUDIT_PREFIX));
        assert!(audit.contains(&entry.path.display().to_string()));

        assert_eq!(summary.deleted, 1);
        assert_eq!(summary.bytes_deleted, 12);

        Ok(())
    }

    #[test]
    fn test_list_short_circuits_before_archive_and_delete() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let dest = TempDir::new()?;
        let entry = write_entry(temp_dir.path(), "a.log", "content")?;

        // list 与归档、删除同时配置时，只执行列出
        let config = ActionConfig {
            list: true,
            delete: true,
            archive_to: Some(dest.path().to_path_buf()),
        };
        let (summary, out, audit) = dispatch_one(config, temp_dir.path(), &entry)?;

        assert!(!out.is_empty());
        assert!(audit.is_empty());
        assert!(entry.path.exists());
        assert!(!dest.path().join("a.log.gz").exists());
        assert_eq!(summary.archived, 0);
        assert_eq!(summary.deleted, 0);

        Ok(())
    }

    #[test]
    fn test_archive_then_delete_combine() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let dest = TempDir::new()?;
        let entry = write_entry(temp_dir.path(), "a.log", "archive me first")?;

        let config = ActionConfig {
            delete: true,
            archive_to: Some(dest.path().to_path_buf()),
            ..Default::default()
        };
        let (summary, _, audit) = dispatch_one(config, temp_dir.path(), &entry)?;

        // 一次分发内：压缩产物已就位，原文件已删除
        assert!(dest.path().join("a.log.gz").exists());
        assert!(!entry.path.exists());
        assert_eq!(audit.lines().count(), 1);
        assert_eq!(summary.archived, 1);
        assert_eq!(summary.deleted, 1);

        Ok(())
    }

    #[test]
    fn test_archive_only_does_not_list() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let dest = TempDir::new()?;
        let entry = write_entry(temp_dir.path(), "a.log", "content")?;

        let config = ActionConfig {
            archive_to: Some(dest.path().to_path_buf()),
            ..Default::default()
        };
        let (summary, out, _) = dispatch_one(config, temp_dir.path(), &entry)?;

        // 已有动作执行，不触发回退列出
        assert!(out.is_empty());
        assert!(dest.path().join("a.log.gz").exists());
        assert!(entry.path.exists());
        assert_eq!(summary.archived, 1);
        assert_eq!(summary.listed, 0);

        Ok(())
    }

    #[test]
    fn test_archive_failure_aborts_before_delete() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let entry = write_entry(temp_dir.path(), "a.log", "content")?;

        // 归档目录不存在：归档失败必须发生在删除之前
        let config = ActionConfig {
            delete: true,
            archive_to: Some(temp_dir.path().join("missing_dest")),
            ..Default::default()
        };
        let result = dispatch_one(config, temp_dir.path(), &entry);

        assert!(matches!(result, Err(Error::Dispatch { .. })));
        assert!(entry.path.exists());

        Ok(())
    }

    #[test]
    fn test_delete_missing_file_fails() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let entry = write_entry(temp_dir.path(), "a.log", "content")?;
        fs::remove_file(&entry.path)?;

        let config = ActionConfig {
            delete: true,
            ..Default::default()
        };
        let result = dispatch_one(config, temp_dir.path(), &entry);
        assert!(matches!(result, Err(Error::Dispatch { .. })));

        Ok(())
    }

    #[test]
    fn test_audit_line_format() -> Result<()> {
        let mut audit = AuditLog::new(Vec::new());
        audit.record(std::path::Path::new("/tmp/x/a.log"))?;

        let line = String::from_utf8(audit.writer)?;
        assert!(line.starts_with(AUDIT_PREFIX));
        assert!(line.ends_with("/tmp/x/a.log\n"));
        // 前缀之后是 "YYYY/MM/DD HH:MM:SS " 形式的时间戳
        let rest = &line[AUDIT_PREFIX.len()..];
        assert_eq!(rest.as_bytes()[4], b'/');
        assert_eq!(rest.as_bytes()[10], b' ');

        Ok(())
    }
}
