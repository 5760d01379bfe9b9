use log::{debug, info};

use crate::{
    disk::{Block, BlockDevice},
    fs::{
        config::{BLOCK_SIZE, SUPER_BLOCK_BLOCK_ID},
        error::{FormatError, Result, Stage},
        geometry::Geometry,
        Layout,
    },
};

/// 按固定顺序把各结构写到设备上
pub struct DiskWriter<'a, D: BlockDevice + ?Sized> {
    disk: &'a mut D,
}

impl<'a, D: BlockDevice + ?Sized> DiskWriter<'a, D> {
    pub fn new(disk: &'a mut D) -> Self {
        Self { disk }
    }

    /// 写盘顺序：dummy 块、超级块、块位图、inode 位图、inode 表、根目录数据块，最后 flush。
    /// 遇到第一个错误即返回，之后不再写任何东西。
    pub fn write<F: FnMut(Stage)>(&mut self, layout: &Layout, mut on_stage: F) -> Result<()> {
        let g = &layout.geometry;

        let dummy: Block = [0; BLOCK_SIZE as usize];
        self.write_stage(Stage::Dummy, 0, &dummy)?;
        on_stage(Stage::Dummy);

        let super_block = layout.super_block.to_block()?;
        self.write_stage(Stage::SuperBlock, SUPER_BLOCK_BLOCK_ID, &super_block)?;
        on_stage(Stage::SuperBlock);

        self.write_stage(Stage::BlockBitmap, g.bmap_block, layout.block_bitmap.as_bytes())?;
        on_stage(Stage::BlockBitmap);

        self.write_stage(Stage::InodeBitmap, g.imap_block, layout.inode_bitmap.as_bytes())?;
        on_stage(Stage::InodeBitmap);

        let inodes = layout.inode_table.to_bytes()?;
        self.write_stage(Stage::InodeTable, g.inode_table_block, &inodes)?;
        on_stage(Stage::InodeTable);

        // 根目录块与 inode 表不相邻，单独定位写入
        let entries = layout.root_dir.to_bytes();
        self.write_stage(Stage::RootDirectory, g.data_block_number, &entries)?;
        on_stage(Stage::RootDirectory);

        self.disk.flush().map_err(|source| FormatError::Write {
            stage: Stage::Flush,
            source,
        })?;
        on_stage(Stage::Flush);
        Ok(())
    }

    fn write_stage(&mut self, stage: Stage, block: u64, bytes: &[u8]) -> Result<()> {
        let offset = Geometry::block_offset(block);
        debug!("writing {stage}: {} bytes at offset {offset}", bytes.len());
        self.disk
            .write_at(offset, bytes)
            .map_err(|source| FormatError::Write { stage, source })?;
        info!("{stage} written");
        Ok(())
    }
}
