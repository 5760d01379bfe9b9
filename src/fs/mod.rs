use log::{debug, info};

use crate::{
    disk::BlockDevice,
    fs::{
        data_block_bitmap::DataBlockBitmap,
        directory::RootDirectory,
        error::{FormatError, Result, Stage},
        geometry::Geometry,
        inode_bitmap::InodeBitmap,
        inode_table::InodeTable,
        super_block::SuperBlock,
        writer::DiskWriter,
    },
    utils::Owner,
};

pub mod bitmap;
pub mod config;
pub mod data_block_bitmap;
pub mod directory;
pub mod error;
pub mod geometry;
pub mod inode_bitmap;
pub mod inode_table;
pub mod super_block;
pub mod verify;
pub mod writer;

/// 一次格式化要写入磁盘的全部结构，只在本次运行中存在
#[derive(Debug, Clone)]
pub struct Layout {
    pub geometry: Geometry,            // 布局信息
    pub super_block: SuperBlock,       // 文件系统总体信息
    pub block_bitmap: DataBlockBitmap, // 块分配信息
    pub inode_bitmap: InodeBitmap,     // inode 分配信息
    pub inode_table: InodeTable,       // 根目录和初始文件的 inode
    pub root_dir: RootDirectory,       // 根目录数据块中的目录项
}

impl Layout {
    pub fn build(device_size: u64, owner: Owner, now: i64) -> Result<Self> {
        let geometry = Geometry::compute(device_size)?;
        Ok(Self {
            super_block: SuperBlock::new(&geometry),
            block_bitmap: DataBlockBitmap::build(&geometry)?,
            inode_bitmap: InodeBitmap::build(&geometry)?,
            inode_table: InodeTable::build(&geometry, owner, now),
            root_dir: RootDirectory::build()?,
            geometry,
        })
    }
}

/// 格式化设备：计算布局、构建各结构，然后按顺序写盘
///
/// 每写完一个阶段回调一次 `on_stage`。任一步失败立即返回，已写入的部分不回滚。
pub fn format<D, F>(disk: &mut D, owner: Owner, now: i64, on_stage: F) -> Result<Layout>
where
    D: BlockDevice + ?Sized,
    F: FnMut(Stage),
{
    let device_size = disk.size().map_err(FormatError::DeviceSize)?;
    debug!("device size is {device_size} bytes");

    let layout = Layout::build(device_size, owner, now)?;
    DiskWriter::new(disk).write(&layout, on_stage)?;
    info!(
        "formatted {} blocks, {} free, root directory at block {}",
        layout.geometry.blocks_count,
        layout.geometry.free_blocks,
        layout.geometry.data_block_number
    );
    Ok(layout)
}
