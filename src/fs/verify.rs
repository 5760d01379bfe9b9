use log::debug;

use crate::{
    disk::BlockDevice,
    fs::{
        config::{BLOCK_SIZE, DIR_RECORDS_PER_BLOCK, DIR_RECORD_SIZE, SUPER_BLOCK_BLOCK_ID},
        data_block_bitmap::DataBlockBitmap,
        directory::{DirRecord, RootDirectory},
        error::{FormatError, Result, Stage},
        geometry::Geometry,
        inode_bitmap::InodeBitmap,
        inode_table::{Inode, InodeTable},
        super_block::SuperBlock,
        Layout,
    },
};

/// 按磁盘格式从设备上读回的全部结构
#[derive(Debug, Clone)]
pub struct ReadBack {
    pub super_block: SuperBlock,
    pub block_bitmap: DataBlockBitmap,
    pub inode_bitmap: InodeBitmap,
    pub inodes: Vec<Inode>,
    pub entries: Vec<DirRecord>,
}

impl ReadBack {
    /// 像挂载端一样从超级块出发读取各区域
    ///
    /// 磁盘上的块号和计数都不可信，越界或溢出一律返回 `Verify` 错误。
    pub fn load<D: BlockDevice + ?Sized>(disk: &mut D) -> Result<Self> {
        let super_block = SuperBlock::load(disk)?;
        if super_block.block_size != BLOCK_SIZE {
            return Err(FormatError::Verify(format!(
                "unsupported block size {}",
                super_block.block_size
            )));
        }
        let device_size = disk.size().map_err(FormatError::DeviceSize)?;
        let fs_size = super_block
            .blocks_count
            .checked_mul(BLOCK_SIZE)
            .filter(|&size| size <= device_size)
            .ok_or_else(|| {
                FormatError::Verify(format!(
                    "super block claims {} blocks, device holds {}",
                    super_block.blocks_count,
                    device_size / BLOCK_SIZE
                ))
            })?;
        let geometry = Geometry::compute(fs_size)?;
        check(
            super_block.bmap_block == geometry.bmap_block
                && super_block.imap_block == geometry.imap_block
                && super_block.inode_table_block == geometry.inode_table_block
                && super_block.data_block_number == geometry.data_block_number,
            "super block region offsets",
        )?;

        let block_bitmap = DataBlockBitmap::load(disk, &geometry)?;
        let inode_bitmap = InodeBitmap::load(disk, &geometry)?;
        let inode_table = InodeTable::load(disk, &geometry, 2)?;

        let root = &inode_table.inodes[0];
        let children = root.dir_children_count().ok_or_else(|| {
            FormatError::Verify("root inode is not a directory".to_string())
        })?;
        if children > DIR_RECORDS_PER_BLOCK {
            return Err(FormatError::Verify(format!(
                "root directory claims {children} entries, one block holds {DIR_RECORDS_PER_BLOCK}"
            )));
        }
        let offset = geometry.checked_block_offset(root.block[0])?;
        let bytes = read_region(
            disk,
            offset,
            (children * DIR_RECORD_SIZE) as usize,
            Stage::RootDirectory,
        )?;
        let entries = RootDirectory::from_bytes(&bytes, children as usize)?;

        Ok(Self {
            super_block,
            block_bitmap,
            inode_bitmap,
            inodes: inode_table.inodes,
            entries,
        })
    }
}

/// 读回刚写入的结构，与内存中的版本逐项比较，再逐字节比较写入过的区域
pub fn verify<D: BlockDevice + ?Sized>(disk: &mut D, layout: &Layout) -> Result<ReadBack> {
    let read = ReadBack::load(disk)?;

    check(read.super_block == layout.super_block, "super block")?;
    check(
        read.block_bitmap.as_bytes() == layout.block_bitmap.as_bytes(),
        "block bitmap",
    )?;
    check(
        read.inode_bitmap.as_bytes() == layout.inode_bitmap.as_bytes(),
        "inode bitmap",
    )?;
    check(read.inodes == layout.inode_table.inodes, "inode table")?;
    check(read.entries == layout.root_dir.entries, "root directory")?;

    // 解码会丢掉填充和文件名 '\0' 之后的字节，这里按原始字节再比一遍
    let geometry = &layout.geometry;
    let regions = [
        (
            Stage::SuperBlock,
            SUPER_BLOCK_BLOCK_ID,
            layout.super_block.to_block()?.to_vec(),
        ),
        (
            Stage::InodeTable,
            geometry.inode_table_block,
            layout.inode_table.to_bytes()?,
        ),
        (
            Stage::RootDirectory,
            geometry.data_block_number,
            layout.root_dir.to_bytes(),
        ),
    ];
    for (stage, block, expected) in regions {
        let actual = read_region(disk, Geometry::block_offset(block), expected.len(), stage)?;
        if let Some(pos) = actual.iter().zip(&expected).position(|(a, e)| a != e) {
            return Err(FormatError::Verify(format!(
                "{stage} differs from what was written at byte {pos} of block {block}"
            )));
        }
    }

    debug!("read-back matches what was written");
    Ok(read)
}

fn read_region<D: BlockDevice + ?Sized>(
    disk: &mut D,
    offset: u64,
    len: usize,
    stage: Stage,
) -> Result<Vec<u8>> {
    let mut bytes = vec![0u8; len];
    disk.read_at(offset, &mut bytes)
        .map_err(|source| FormatError::Read { stage, source })?;
    Ok(bytes)
}

fn check(ok: bool, what: &str) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(FormatError::Verify(format!("{what} differs from what was written")))
    }
}
