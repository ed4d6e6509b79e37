use std::fmt;

use tracing::debug;

use crate::entry::FileEntry;

/// 条目过滤条件
///
/// 在一次运行开始时构造一次，遍历期间只读。
#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
    /// 扩展名精确匹配过滤（包含前导点，如 `".log"`），为 `None` 时不过滤扩展名
    pub extension: Option<String>,
    /// 文件大小下限（字节，含边界）
    pub min_size: u64,
}

impl FilterCriteria {
    /// 创建新的过滤条件
    pub fn new(extension: Option<String>, min_size: u64) -> Self {
        Self {
            extension: extension.map(|ext| normalize_extension(&ext)),
            min_size,
        }
    }

    /// 判断条目是否应被排除，不产生任何副作用
    ///
    /// 规则按顺序求值，首个命中即返回：
    /// 1. 目录一律排除；
    /// 2. 小于 `min_size` 的文件排除；
    /// 3. 扩展名过滤非空且与条目扩展名不完全相等（区分大小写）时排除；
    /// 4. 其余保留。
    pub fn excludes(&self, entry: &FileEntry) -> bool {
        if entry.is_dir {
            return true;
        }

        if entry.size < self.min_size {
            debug!("条目 {:?} 小于大小下限 {}，排除", entry.path, self.min_size);
            return true;
        }

        if let Some(ext) = &self.extension {
            if entry.extension.as_deref() != Some(ext.as_str()) {
                debug!("条目 {:?} 扩展名不匹配 {}，排除", entry.path, ext);
                return true;
            }
        }

        false
    }

    /// 解析大小字符串（如 "10MB", "1GB", "500KB"）
    pub fn parse_size_string(size_str: &str) -> Result<u64, SizeParseError> {
        let size_str = size_str.trim().to_uppercase();

        // 提取数字部分和单位部分
        let (number_part, unit_part) = if let Some(pos) = size_str.find(|c: char| c.is_alphabetic())
        {
            (&size_str[..pos], &size_str[pos..])
        } else {
            (size_str.as_str(), "")
        };

        let number: f64 = number_part
            .parse()
            .map_err(|_| SizeParseError::InvalidNumber(number_part.to_string()))?;

        let multiplier = match unit_part {
            "" | "B" => 1,
            "KB" | "K" => 1_000,
            "KIB" => 1_024,
            "MB" | "M" => 1_000_000,
            "MIB" => 1_024 * 1_024,
            "GB" | "G" => 1_000_000_000,
            "GIB" => 1_024 * 1_024 * 1_024,
            "TB" | "T" => 1_000_000_000_000,
            "TIB" => 1_024_u64.pow(4),
            _ => return Err(SizeParseError::UnknownUnit(unit_part.to_string())),
        };

        Ok((number * multiplier as f64) as u64)
    }
}

/// 大小字符串解析错误
#[derive(Debug, thiserror::Error)]
pub enum SizeParseError {
    #[error("invalid number: {0}")]
    InvalidNumber(String),
    #[error("unsupported unit: {0}")]
    UnknownUnit(String),
}

/// 规范化扩展名过滤字符串，保证带前导点
pub fn normalize_extension(ext: &str) -> String {
    if ext.starts_with('.') {
        ext.to_string()
    } else {
        format!(".{ext}")
    }
}

impl fmt::Display for FilterCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.extension {
            Some(ext) => write!(f, "ext={ext}, min_size={}", self.min_size),
            None => write!(f, "min_size={}", self.min_size),
        }
    }
}
