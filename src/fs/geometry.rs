use log::debug;

use crate::fs::{
    config::{BITS_PER_BLOCK, BLOCK_SIZE, INODES_PER_BLOCK, RESERVE_BLOCKS},
    error::{FormatError, Result},
};

/// 由磁盘大小推导出的全部布局信息，计算一次后只读地传给后续各步骤
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub blocks_count: u64,       // 磁盘总块数
    pub inodes_count: u64,       // inode 总数（与块数一一对应）
    pub bmap_blocks: u64,        // 块位图占用的块数
    pub imap_blocks: u64,        // inode 位图占用的块数
    pub inode_table_blocks: u64, // inode 表占用的块数
    pub bmap_block: u64,         // 块位图起始块号
    pub imap_block: u64,         // inode 位图起始块号
    pub inode_table_block: u64,  // inode 表起始块号
    pub data_block_number: u64,  // 数据区起始块号，也是根目录的数据块
    pub free_blocks: u64,        // 格式化后的空闲块数
}

impl Geometry {
    /// 根据磁盘字节数计算布局
    ///
    /// inode 表大小用的是向下取整：`inodes_count / (BLOCK_SIZE / INODE_SIZE)`。
    /// 多出来的 inode 没有表空间，这是 HUST_fs 磁盘格式本身的约定，读端按同样方式计算。
    pub fn compute(device_size: u64) -> Result<Self> {
        let blocks_count = device_size / BLOCK_SIZE;
        let inodes_count = blocks_count;

        let bmap_blocks = bitmap_blocks(blocks_count);
        let imap_blocks = bitmap_blocks(inodes_count);
        let inode_table_blocks = inodes_count / INODES_PER_BLOCK;

        let bmap_block = RESERVE_BLOCKS;
        let imap_block = bmap_block + bmap_blocks;
        let inode_table_block = imap_block + imap_blocks;
        let data_block_number = inode_table_block + inode_table_blocks;

        // 两个初始 inode 必须落在 inode 表里，根目录还要占一个数据块
        if inode_table_blocks == 0 || blocks_count < data_block_number + 1 {
            return Err(FormatError::DeviceTooSmall {
                blocks: blocks_count,
                required: Self::minimum_blocks(),
            });
        }
        let free_blocks = blocks_count - data_block_number - 1;

        let geometry = Self {
            blocks_count,
            inodes_count,
            bmap_blocks,
            imap_blocks,
            inode_table_blocks,
            bmap_block,
            imap_block,
            inode_table_block,
            data_block_number,
            free_blocks,
        };
        debug!("computed geometry for {device_size} bytes: {geometry:?}");
        Ok(geometry)
    }

    /// 能格式化的最小块数，为 15 块（此时 `free_blocks = 9`）
    ///
    /// 不存在 `free_blocks == 0` 的最小布局：少于 15 块时 inode 表为 0 块，
    /// 两个初始 inode 会写在根目录数据块上并被目录项覆盖，因此这类设备一律视为过小。
    pub fn minimum_blocks() -> u64 {
        // blocks - blocks / INODES_PER_BLOCK 单调不减，第一个满足条件的就是最小值
        (INODES_PER_BLOCK..)
            .find(|&blocks| {
                let used = RESERVE_BLOCKS
                    + bitmap_blocks(blocks) * 2
                    + blocks / INODES_PER_BLOCK
                    + 1;
                blocks >= used
            })
            .unwrap_or(INODES_PER_BLOCK)
    }

    /// 格式化时被占用的块数：元数据加上根目录的一个数据块
    pub fn used_blocks(&self) -> u64 {
        self.data_block_number + 1
    }

    pub fn block_offset(block: u64) -> u64 {
        block * BLOCK_SIZE
    }

    /// 从磁盘读到的块号，必须落在设备范围内
    pub fn checked_block_offset(&self, block: u64) -> Result<u64> {
        if block >= self.blocks_count {
            return Err(FormatError::Verify(format!(
                "block {block} is outside the {} blocks of the device",
                self.blocks_count
            )));
        }
        block
            .checked_mul(BLOCK_SIZE)
            .ok_or_else(|| FormatError::Verify(format!("block {block} offset overflows")))
    }
}

/// 位图所需块数：ceil(count / (8 * BLOCK_SIZE))，至少 1 块
fn bitmap_blocks(count: u64) -> u64 {
    count.div_ceil(BITS_PER_BLOCK).max(1)
}
