use std::io;
use std::path::PathBuf;

/// 遍历与动作执行过程中可能出现的错误
///
/// 任何一个错误都会立即终止正在进行的遍历，原样返回给调用方。
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// 读取条目元数据失败
    #[error("failed to read metadata for {path:?}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 归档目标不存在或不是目录
    #[error("{0:?} is not a directory")]
    NotADirectory(PathBuf),

    /// 无法计算相对于遍历根目录的路径
    #[error("failed to resolve {path:?} relative to {root:?}")]
    PathResolution { path: PathBuf, root: PathBuf },

    /// 文件读写、创建或删除失败
    #[error(transparent)]
    Io(#[from] io::Error),

    /// 目录枚举本身失败
    #[error(transparent)]
    Walk(#[from] ignore::Error),

    /// 对某个条目执行动作时失败
    #[error("action failed for {path:?}")]
    Dispatch {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// 将错误包装为针对指定条目的动作失败
    pub(crate) fn dispatch(path: impl Into<PathBuf>, source: Error) -> Self {
        Self::Dispatch {
            path: path.into(),
            source: Box::new(source),
        }
    }
}
