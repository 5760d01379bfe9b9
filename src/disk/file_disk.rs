use std::{
    fs::{File, OpenOptions},
    io::{Read, Result, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use log::debug;

use crate::{
    disk::block_device::BlockDevice,
    fs::error::{self, FormatError},
};

/// 以普通文件或块设备节点为后端的磁盘
#[derive(Debug)]
pub struct FileDisk {
    file: File,
    path: PathBuf,
}

impl FileDisk {
    /// 以读写方式打开已存在的设备，不会创建或改变其大小
    pub fn open(path: impl AsRef<Path>) -> error::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|source| FormatError::DeviceOpen {
                path: path.clone(),
                source,
            })?;
        debug!("opened {}", path.display());
        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BlockDevice for FileDisk {
    fn size(&mut self) -> Result<u64> {
        // 块设备的 metadata 长度为 0，seek 到末尾才能拿到真实大小
        let size = self.file.seek(SeekFrom::End(0))?;
        self.file.rewind()?;
        Ok(size)
    }

    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<()> {
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.read_exact(buf)?;
        Ok(())
    }

    fn write_at(&mut self, offset: u64, buf: &[u8]) -> Result<()> {
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(buf)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.file.flush()?;
        self.file.sync_all()
    }
}
