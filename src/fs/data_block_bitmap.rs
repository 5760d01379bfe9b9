use log::debug;

use crate::{
    disk::BlockDevice,
    fs::{
        bitmap::Bitmap,
        config::BLOCK_SIZE,
        error::{FormatError, Result, Stage},
        geometry::Geometry,
    },
};

/// 块位图：每一位对应磁盘上的一个块是否被使用
#[derive(Debug, Clone)]
pub struct DataBlockBitmap {
    pub bits: Bitmap, // 位图数据
}

impl DataBlockBitmap {
    /// 按布局生成格式化时的块位图
    ///
    /// block 0 到 `data_block_number`（含）全部置位：dummy 块、超级块、两个位图、
    /// inode 表以及根目录的那一个数据块。
    pub fn build(geometry: &Geometry) -> Result<Self> {
        let mut bits = Bitmap::new(geometry.bmap_blocks);
        bits.set_range(geometry.used_blocks())?;
        debug!(
            "block bitmap: {} of {} blocks in use",
            bits.count_ones(),
            geometry.blocks_count
        );
        Ok(Self { bits })
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.bits.as_bytes()
    }

    /// 从磁盘加载块位图
    pub fn load<D: BlockDevice + ?Sized>(disk: &mut D, geometry: &Geometry) -> Result<Self> {
        let bytes = read_bitmap(
            disk,
            geometry.bmap_block,
            geometry.bmap_blocks,
            Stage::BlockBitmap,
        )?;
        Ok(Self {
            bits: Bitmap::from_bytes(bytes),
        })
    }
}

/// 读取从 `start_block` 开始的 `size_in_blocks` 个块
pub(crate) fn read_bitmap<D: BlockDevice + ?Sized>(
    disk: &mut D,
    start_block: u64,
    size_in_blocks: u64,
    stage: Stage,
) -> Result<Vec<u8>> {
    let mut bytes = vec![0u8; (size_in_blocks * BLOCK_SIZE) as usize];
    disk.read_at(Geometry::block_offset(start_block), &mut bytes)
        .map_err(|source| FormatError::Read { stage, source })?;
    Ok(bytes)
}
