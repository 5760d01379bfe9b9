use std::io::Result;

use crate::{disk::types::Block, fs::config::BLOCK_SIZE};

/// 被格式化的目标设备，按字节偏移读写
pub trait BlockDevice {
    /// 设备总字节数
    fn size(&mut self) -> Result<u64>;
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<()>;
    /// 在 `offset` 处整段写入，短写视为错误
    fn write_at(&mut self, offset: u64, buf: &[u8]) -> Result<()>;
    fn flush(&mut self) -> Result<()>;

    fn read_block(&mut self, block_id: u64, buf: &mut Block) -> Result<()> {
        self.read_at(block_id * BLOCK_SIZE, buf)
    }
}
