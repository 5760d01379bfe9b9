use serde::{Deserialize, Serialize};

use crate::{
    disk::{Block, BlockDevice},
    fs::{
        config::{BLOCK_SIZE, MAGIC, SUPER_BLOCK_BLOCK_ID, VERSION},
        error::{FormatError, Result, Stage},
        geometry::Geometry,
    },
};

/// 十个 u64 字段的长度
const FIELDS_LEN: usize = 80;

/// 超级块，位于 block1，字段之后以 0 填满整块
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuperBlock {
    pub version: u64,
    pub magic: u64, // 魔数，用于识别文件系统
    /** 块信息 */
    pub block_size: u64,   // 每块大小（字节）
    pub inodes_count: u64, // 总 inode 数
    pub free_blocks: u64,  // 当前空闲块数
    pub blocks_count: u64, // 文件系统总块数
    /** 各区域起始块号 */
    pub bmap_block: u64,        // 块位图起始块
    pub imap_block: u64,        // inode 位图起始块
    pub inode_table_block: u64, // inode 表起始块
    pub data_block_number: u64, // 数据区起始块号
}

impl SuperBlock {
    pub fn new(geometry: &Geometry) -> Self {
        Self {
            version: VERSION,
            magic: MAGIC,
            block_size: BLOCK_SIZE,
            inodes_count: geometry.inodes_count,
            free_blocks: geometry.free_blocks,
            blocks_count: geometry.blocks_count,
            bmap_block: geometry.bmap_block,
            imap_block: geometry.imap_block,
            inode_table_block: geometry.inode_table_block,
            data_block_number: geometry.data_block_number,
        }
    }

    /// 编码为一整块：80 字节字段 + 4016 字节 0 填充
    pub fn to_block(&self) -> Result<Block> {
        let bytes = bincode::serialize(self)?;
        let mut block: Block = [0; BLOCK_SIZE as usize];
        block[..bytes.len()].copy_from_slice(&bytes);
        Ok(block)
    }

    pub fn from_block(block: &Block) -> Result<Self> {
        let sb: SuperBlock = bincode::deserialize(&block[..FIELDS_LEN])?;
        if sb.magic != MAGIC {
            return Err(FormatError::Verify(format!(
                "bad magic {:#x}, expected {MAGIC:#x}",
                sb.magic
            )));
        }
        if let Some(pos) = block[FIELDS_LEN..].iter().position(|&b| b != 0) {
            return Err(FormatError::Verify(format!(
                "super block padding byte {} is not zero",
                FIELDS_LEN + pos
            )));
        }
        Ok(sb)
    }

    /// 从磁盘 block1 读取超级块
    pub fn load<D: BlockDevice + ?Sized>(disk: &mut D) -> Result<Self> {
        let mut block: Block = [0; BLOCK_SIZE as usize];
        disk.read_block(SUPER_BLOCK_BLOCK_ID, &mut block)
            .map_err(|source| FormatError::Read {
                stage: Stage::SuperBlock,
                source,
            })?;
        Self::from_block(&block)
    }
}
