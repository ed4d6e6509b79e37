use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;

use sweeper_core::{
    ActionConfig, ActionDispatcher, FilterCriteria, RunSummary, TreeWalker, WalkConfig,
};

#[derive(Debug, Parser)]
#[command(name = "sweeper")]
#[command(about = "A tool for sweeping directory trees: list, archive or delete matching files")]
#[command(version)]
pub struct Cli {
    /// Root directory to start the walk from
    #[arg(default_value = ".")]
    pub root: PathBuf,

    /// Only process files with this extension (e.g. ".log")
    #[arg(short, long)]
    pub ext: Option<String>,

    /// Minimum file size (plain bytes or human-readable, e.g. "10MB")
    #[arg(short, long)]
    pub size: Option<String>,

    /// List matching files only
    #[arg(short, long)]
    pub list: bool,

    /// Delete matching files
    #[arg(long)]
    pub del: bool,

    /// Archive matching files into this directory (must exist)
    #[arg(short, long)]
    pub archive: Option<PathBuf>,

    /// Append deletion audit records to this file instead of stdout
    #[arg(long)]
    pub log: Option<PathBuf>,

    /// Maximum depth to walk
    #[arg(short, long)]
    pub max_depth: Option<usize>,

    /// Follow symlinks
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Skip hidden files and directories
    #[arg(long)]
    pub skip_hidden: bool,

    /// Respect .gitignore files
    #[arg(long)]
    pub use_gitignore: bool,

    /// Skip the confirmation prompt before deleting
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Read default option values from a TOML file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,
}

/// 配置文件里的默认值，命令行显式给出的选项优先
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Defaults {
    pub ext: Option<String>,
    pub size: Option<String>,
    pub archive: Option<PathBuf>,
    pub log: Option<PathBuf>,
}

impl Defaults {
    /// 从 TOML 文件加载默认值
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {path:?}"))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file {path:?}"))
    }

    /// 把默认值填进未显式指定的命令行选项
    fn apply(self, cli: &mut Cli) {
        if cli.ext.is_none() {
            cli.ext = self.ext;
        }
        if cli.size.is_none() {
            cli.size = self.size;
        }
        if cli.archive.is_none() {
            cli.archive = self.archive;
        }
        if cli.log.is_none() {
            cli.log = self.log;
        }
    }
}

pub fn run_cli() -> Result<()> {
    let mut cli = Cli::parse();

    // 设置日志级别
    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!("sweeper={log_level}"))
        .init();

    if let Some(config_path) = cli.config.clone() {
        Defaults::load(&config_path)?.apply(&mut cli);
    }

    let criteria = build_criteria(&cli)?;
    let actions = ActionConfig {
        list: cli.list,
        delete: cli.del,
        archive_to: cli.archive.clone(),
    };
    let walk_config = WalkConfig {
        max_depth: cli.max_depth,
        follow_links: cli.follow_symlinks,
        skip_hidden: cli.skip_hidden,
        respect_gitignore: cli.use_gitignore,
    };

    // 删除是破坏性动作，除非显式跳过，先向操作者确认
    if cli.del && !cli.list && !cli.yes && !confirm_delete(&cli, &criteria)? {
        println!("Sweep cancelled.");
        return Ok(());
    }

    // 审计记录默认跟随标准输出，指定 --log 时追加写入文件
    let audit: Box<dyn Write> = match &cli.log {
        Some(path) => Box::new(
            OpenOptions::new()
                .append(true)
                .create(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {path:?}"))?,
        ),
        None => Box::new(io::stdout()),
    };

    let mut dispatcher = ActionDispatcher::new(
        actions,
        cli.root.clone(),
        Box::new(io::stdout()) as Box<dyn Write>,
        audit,
    );
    let walker = TreeWalker::new(walk_config);
    let summary = walker.walk(&cli.root, &criteria, &mut dispatcher)?;
    dispatcher.finish()?;

    // 纯列出运行不需要统计尾注，输出行本身就是结果
    if summary.archived > 0 || summary.deleted > 0 {
        display_summary(&summary);
    }

    Ok(())
}

/// 从命令行选项构造过滤条件
fn build_criteria(cli: &Cli) -> Result<FilterCriteria> {
    let min_size = match &cli.size {
        Some(size_str) => FilterCriteria::parse_size_string(size_str)
            .with_context(|| format!("Invalid --size value: {size_str}"))?,
        None => 0,
    };

    Ok(FilterCriteria::new(cli.ext.clone(), min_size))
}

/// 删除确认提示
fn confirm_delete(cli: &Cli, criteria: &FilterCriteria) -> Result<bool> {
    print!(
        "This will delete files under {:?} matching ({criteria}). Continue? [y/N]: ",
        cli.root
    );
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    let answer = input.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}

fn display_summary(summary: &RunSummary) {
    println!("\nSweep completed!");
    if summary.archived > 0 {
        println!("Files archived: {}", summary.archived);
    }
    if summary.deleted > 0 {
        println!("Files deleted: {}", summary.deleted);
        println!("Size freed: {}", summary.format_size());
    }
    println!("Duration: {}ms", summary.duration_ms);
}
