use log::debug;

use crate::{
    disk::BlockDevice,
    fs::{
        bitmap::Bitmap,
        config::{INITIAL_FILE_INODE_NUM, ROOT_INODE_NUM},
        data_block_bitmap::read_bitmap,
        error::{Result, Stage},
        geometry::Geometry,
    },
};

/// inode 位图：每一位对应一个 inode 号是否被占用
#[derive(Debug, Clone)]
pub struct InodeBitmap {
    pub bits: Bitmap, // 位图数据
}

impl InodeBitmap {
    /// 格式化时只有根目录和初始文件两个 inode 被占用，即 imap[0] 的低两位
    pub fn build(geometry: &Geometry) -> Result<Self> {
        let mut bits = Bitmap::new(geometry.imap_blocks);
        bits.set(ROOT_INODE_NUM)?;
        bits.set(INITIAL_FILE_INODE_NUM)?;
        debug!(
            "inode bitmap: {} of {} inodes in use",
            bits.count_ones(),
            geometry.inodes_count
        );
        Ok(Self { bits })
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.bits.as_bytes()
    }

    /// 从磁盘加载 inode 位图
    pub fn load<D: BlockDevice + ?Sized>(disk: &mut D, geometry: &Geometry) -> Result<Self> {
        let bytes = read_bitmap(
            disk,
            geometry.imap_block,
            geometry.imap_blocks,
            Stage::InodeBitmap,
        )?;
        Ok(Self {
            bits: Bitmap::from_bytes(bytes),
        })
    }
}
