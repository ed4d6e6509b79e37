use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

use ignore::WalkBuilder;
use tracing::{debug, info};

use crate::RunSummary;
use crate::actions::ActionDispatcher;
use crate::entry::FileEntry;
use crate::error::{Error, Result};
use crate::filter::FilterCriteria;

/// 遍历器配置
#[derive(Debug, Clone)]
pub struct WalkConfig {
    pub max_depth: Option<usize>,
    pub follow_links: bool,
    /// 跳过隐藏文件与目录（默认不跳过：清扫工具默认看到一切）
    pub skip_hidden: bool,
    /// 遵循 .gitignore 规则（默认关闭）
    pub respect_gitignore: bool,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            follow_links: false,
            skip_hidden: false,
            respect_gitignore: false,
        }
    }
}

/// 目录树遍历器
///
/// 驱动整个处理流程：枚举条目、套用过滤条件、把通过的条目交给分发器。
pub struct TreeWalker {
    config: WalkConfig,
}

impl TreeWalker {
    /// 创建新的遍历器
    pub fn new(config: WalkConfig) -> Self {
        Self { config }
    }

    /// 从根目录开始递归遍历
    ///
    /// 访问顺序确定：每个目录内按文件名字典序，父目录先于子项，
    /// 同一棵未变动的树多次运行次序一致（与平台原生枚举顺序无关）。
    ///
    /// 首个错误（枚举、元数据读取或动作执行）立即终止整个遍历并原样返回，
    /// 不做逐条目恢复。被过滤排除的条目不产生任何副作用和输出。
    pub fn walk<P, O, A>(
        &self,
        root: P,
        criteria: &FilterCriteria,
        dispatcher: &mut ActionDispatcher<O, A>,
    ) -> Result<RunSummary>
    where
        P: AsRef<Path>,
        O: Write,
        A: Write,
    {
        let root = root.as_ref();
        let start = Instant::now();

        let root_info = fs::metadata(root).map_err(|source| Error::Metadata {
            path: root.to_path_buf(),
            source,
        })?;
        if !root_info.is_dir() {
            return Err(Error::NotADirectory(root.to_path_buf()));
        }

        info!("开始遍历 {:?}，过滤条件: {}", root, criteria);

        let mut builder = WalkBuilder::new(root);
        builder
            .standard_filters(false)
            .hidden(self.config.skip_hidden)
            .git_ignore(self.config.respect_gitignore)
            .follow_links(self.config.follow_links)
            .max_depth(self.config.max_depth)
            .sort_by_file_name(|a, b| a.cmp(b));

        let mut summary = RunSummary::new();

        for result in builder.build() {
            let dir_entry = result?;
            let path = dir_entry.path();

            let metadata = self.lookup_metadata(path)?;
            let entry = FileEntry::new(path, &metadata);

            if criteria.excludes(&entry) {
                continue;
            }

            debug!("条目通过过滤: {:?}", entry.path);
            dispatcher.dispatch(&entry, &mut summary)?;
        }

        summary.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            "遍历完成: 列出 {} 个，归档 {} 个，删除 {} 个，耗时 {}ms",
            summary.listed, summary.archived, summary.deleted, summary.duration_ms
        );

        Ok(summary)
    }

    /// 读取条目元数据，失败时终止遍历
    fn lookup_metadata(&self, path: &Path) -> Result<fs::Metadata> {
        let lookup = if self.config.follow_links {
            fs::metadata(path)
        } else {
            fs::symlink_metadata(path)
        };

        lookup.map_err(|source| Error::Metadata {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl Default for TreeWalker {
    fn default() -> Self {
        Self::new(WalkConfig::default())
    }
}
