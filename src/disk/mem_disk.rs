use std::io::{Error, ErrorKind, Result};

use crate::disk::block_device::BlockDevice;

/// 内存中的磁盘，可设置在第 N 次写入时失败
#[derive(Debug, Clone)]
pub struct MemDisk {
    data: Vec<u8>,
    writes: usize,             // 已成功的写入次数
    fail_at: Option<usize>,    // 第几次写入（从 0 计）返回错误
}

impl MemDisk {
    pub fn new(size: usize) -> Self {
        Self::filled(size, 0)
    }

    /// 用 `byte` 填充整个磁盘，便于观察哪些字节没被写过
    pub fn filled(size: usize, byte: u8) -> Self {
        Self {
            data: vec![byte; size],
            writes: 0,
            fail_at: None,
        }
    }

    pub fn fail_at_write(mut self, nth: usize) -> Self {
        self.fail_at = Some(nth);
        self
    }

    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    fn range(&self, offset: u64, len: usize) -> Result<std::ops::Range<usize>> {
        let start = offset as usize;
        let end = start
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| Error::new(ErrorKind::UnexpectedEof, "access past end of disk"))?;
        Ok(start..end)
    }
}

impl BlockDevice for MemDisk {
    fn size(&mut self) -> Result<u64> {
        Ok(self.data.len() as u64)
    }

    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<()> {
        let range = self.range(offset, buf.len())?;
        buf.copy_from_slice(&self.data[range]);
        Ok(())
    }

    fn write_at(&mut self, offset: u64, buf: &[u8]) -> Result<()> {
        if self.fail_at == Some(self.writes) {
            return Err(Error::new(ErrorKind::WriteZero, "injected write failure"));
        }
        let range = self.range(offset, buf.len())?;
        self.data[range].copy_from_slice(buf);
        self.writes += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}
