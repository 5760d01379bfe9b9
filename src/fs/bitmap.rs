use crate::fs::{
    config::BLOCK_SIZE,
    error::{FormatError, Result},
};

/// 定长位图，按整块分配，第 i 位位于 `bits[i / 8]` 的第 `i % 8` 位（低位在前）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    bits: Vec<u8>, // 位图数据，长度为整数个块
}

impl Bitmap {
    /// 创建占 `size_in_blocks` 个块、全部清零的位图
    pub fn new(size_in_blocks: u64) -> Self {
        Self {
            bits: vec![0; (size_in_blocks * BLOCK_SIZE) as usize],
        }
    }

    /// 从磁盘读回的原始字节构造位图
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bits: bytes }
    }

    /// 位图能表示的总位数
    pub fn capacity(&self) -> u64 {
        self.bits.len() as u64 * 8
    }

    pub fn set(&mut self, index: u64) -> Result<()> {
        let (byte_index, bit_index) = self.locate(index)?;
        self.bits[byte_index] |= 1 << bit_index;
        Ok(())
    }

    pub fn is_set(&self, index: u64) -> Result<bool> {
        let (byte_index, bit_index) = self.locate(index)?;
        Ok(self.bits[byte_index] & (1 << bit_index) != 0)
    }

    /// 把 `[0, end)` 范围内的位全部置 1
    pub fn set_range(&mut self, end: u64) -> Result<()> {
        (0..end).try_for_each(|index| self.set(index))
    }

    /// 已置位的个数
    pub fn count_ones(&self) -> u64 {
        self.bits.iter().map(|b| b.count_ones() as u64).sum()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bits
    }

    fn locate(&self, index: u64) -> Result<(usize, u8)> {
        if index >= self.capacity() {
            return Err(FormatError::BitmapIndexOutOfRange {
                index,
                capacity: self.capacity(),
            });
        }
        Ok(((index / 8) as usize, (index % 8) as u8))
    }
}
