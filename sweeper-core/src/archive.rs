use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use flate2::{Compression, GzBuilder};
use tracing::debug;

use crate::error::{Error, Result};

/// 将单个文件压缩归档到目标目录树中
///
/// 目标路径镜像源文件相对于遍历根目录的目录结构：
/// `root/sub/file.txt` 归档到 `dest_dir` 时产生 `dest_dir/sub/file.txt.gz`。
/// 源文件的基本名会写入 gzip 头的 filename 字段。
///
/// `dest_dir` 必须已经存在；中间子目录按需创建，但根目录不会被创建。
/// 归档失败时不清理写了一半的目标文件，由调用方处置。
pub fn archive_file<P, Q, R>(dest_dir: P, root: Q, source: R) -> Result<PathBuf>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    R: AsRef<Path>,
{
    let dest_dir = dest_dir.as_ref();
    let root = root.as_ref();
    let source = source.as_ref();

    // 校验归档目标必须是已存在的目录
    let info = fs::metadata(dest_dir).map_err(|source| Error::Metadata {
        path: dest_dir.to_path_buf(),
        source,
    })?;
    if !info.is_dir() {
        return Err(Error::NotADirectory(dest_dir.to_path_buf()));
    }

    let target_path = archive_target(dest_dir, root, source)?;

    // 按需创建镜像目录结构
    if let Some(parent) = target_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let base_name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| Error::PathResolution {
            path: source.to_path_buf(),
            root: root.to_path_buf(),
        })?;

    let mut input = File::open(source)?;
    let output = File::create(&target_path)?;

    // gzip 头记录原始文件名
    let mut encoder = GzBuilder::new()
        .filename(base_name.as_str())
        .write(output, Compression::default());

    io::copy(&mut input, &mut encoder)?;

    // 必须先结束编码器写出 gzip 尾部，再让底层文件句柄关闭，
    // 顺序颠倒会产生截断的压缩容器
    drop(encoder.finish()?);

    debug!("归档 {:?} -> {:?}", source, target_path);
    Ok(target_path)
}

/// 计算源文件的归档目标路径
fn archive_target(dest_dir: &Path, root: &Path, source: &Path) -> Result<PathBuf> {
    let parent = source.parent().ok_or_else(|| Error::PathResolution {
        path: source.to_path_buf(),
        root: root.to_path_buf(),
    })?;

    // 源文件父目录相对于遍历根目录的路径
    let rel_dir = parent
        .strip_prefix(root)
        .map_err(|_| Error::PathResolution {
            path: source.to_path_buf(),
            root: root.to_path_buf(),
        })?;

    let file_name = source.file_name().ok_or_else(|| Error::PathResolution {
        path: source.to_path_buf(),
        root: root.to_path_buf(),
    })?;

    let dest_name = format!("{}.gz", file_name.to_string_lossy());
    Ok(dest_dir.join(rel_dir).join(dest_name))
}
