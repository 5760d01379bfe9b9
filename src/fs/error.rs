use std::{fmt, io, path::PathBuf};

use thiserror::Error;

/// 写盘流程中的各个阶段，出错时用于指明是哪一步失败
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Dummy,
    SuperBlock,
    BlockBitmap,
    InodeBitmap,
    InodeTable,
    RootDirectory,
    Flush,
}

impl Stage {
    /// 按写盘顺序排列的全部阶段
    pub const ALL: [Stage; 7] = [
        Stage::Dummy,
        Stage::SuperBlock,
        Stage::BlockBitmap,
        Stage::InodeBitmap,
        Stage::InodeTable,
        Stage::RootDirectory,
        Stage::Flush,
    ];
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Dummy => "dummy block",
            Self::SuperBlock => "super block",
            Self::BlockBitmap => "block bitmap",
            Self::InodeBitmap => "inode bitmap",
            Self::InodeTable => "inode table",
            Self::RootDirectory => "root directory",
            Self::Flush => "flush",
        };
        f.write_str(name)
    }
}

/// 格式化过程中的错误类型，任何一种都会中止本次格式化
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("Usage error: {0}")]
    Usage(String),

    #[error("Cannot open device {}: {source}", .path.display())]
    DeviceOpen { path: PathBuf, source: io::Error },

    #[error("Cannot determine device size: {0}")]
    DeviceSize(#[source] io::Error),

    #[error("Device too small: {blocks} blocks available, at least {required} required")]
    DeviceTooSmall { blocks: u64, required: u64 },

    #[error("Bitmap index {index} out of range (capacity {capacity} bits)")]
    BitmapIndexOutOfRange { index: u64, capacity: u64 },

    #[error("Failed to write {stage}: {source}")]
    Write { stage: Stage, source: io::Error },

    #[error("Failed to read back {stage}: {source}")]
    Read { stage: Stage, source: io::Error },

    #[error("Failed to encode record: {0}")]
    Encode(#[from] bincode::Error),

    #[error("File name too long: {0}")]
    NameTooLong(String),

    #[error("Verification failed: {0}")]
    Verify(String),
}

impl FormatError {
    /// 进程退出码：用法错误为 2，其余为 1
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Usage(_) => 2,
            _ => 1,
        }
    }
}

/// 格式化统一结果类型
pub type Result<T> = std::result::Result<T, FormatError>;
