use bitflags::bitflags;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    disk::BlockDevice,
    fs::{
        config::{INITIAL_FILE_INODE_NUM, INODE_SIZE, N_BLOCKS, ROOT_INODE_NUM},
        error::{FormatError, Result, Stage},
        geometry::Geometry,
    },
    utils::Owner,
};

bitflags! {
    /// inode 的文件类型位，取值与 `S_IFDIR` / `S_IFREG` 一致
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct InodeMode: u32 {
        const DIRECTORY = 0o040000;
        const REGULAR = 0o100000;
    }
}

/// 磁盘上 inode 记录中有效字段的长度，之后是 112 字节的保留区
const RAW_INODE_LEN: usize = 152;

/// 与磁盘字节一一对应的 inode 记录（小端，按 C 结构体对齐补齐）
#[derive(Debug, Serialize, Deserialize)]
struct RawInode {
    mode: u32,
    _align0: u32,
    inode_no: u64,
    blocks: u64,
    block: [u64; N_BLOCKS],
    size: u64, // file_size 与 dir_children_count 共用
    uid: i32,
    gid: i32,
    nlink: i32,
    _align1: u32,
    atime: i64,
    mtime: i64,
    ctime: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inode {
    pub mode: InodeMode,          // 文件类型
    pub inode_no: u64,            // inode 编号
    pub blocks: u64,              // 已分配的数据块数
    pub block: [u64; N_BLOCKS],   // 直接块指针
    pub size: u64,                // 普通文件为字节数，目录为子项个数
    pub uid: i32,                 // 所属用户
    pub gid: i32,                 // 所属组
    pub nlink: i32,               // 硬链接数
    pub atime: i64,               // 最后访问时间
    pub mtime: i64,               // 最后修改时间
    pub ctime: i64,               // 创建时间
}

impl Inode {
    /// 根目录 inode：一个数据块，包含 `.`、`..` 和初始文件三个目录项
    pub fn root_dir(data_block_number: u64, owner: Owner, now: i64) -> Self {
        let mut block = [0; N_BLOCKS];
        block[0] = data_block_number;
        Self {
            mode: InodeMode::DIRECTORY,
            inode_no: ROOT_INODE_NUM,
            blocks: 1,
            block,
            size: 3,
            uid: owner.uid,
            gid: owner.gid,
            nlink: 2,
            atime: now,
            mtime: now,
            ctime: now,
        }
    }

    /// 初始的空文件，不占数据块
    pub fn initial_file(owner: Owner, now: i64) -> Self {
        Self {
            mode: InodeMode::REGULAR,
            inode_no: INITIAL_FILE_INODE_NUM,
            blocks: 0,
            block: [0; N_BLOCKS],
            size: 0,
            uid: owner.uid,
            gid: owner.gid,
            nlink: 1,
            atime: now,
            mtime: now,
            ctime: now,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.mode.contains(InodeMode::DIRECTORY)
    }

    pub fn dir_children_count(&self) -> Option<u64> {
        self.is_dir().then_some(self.size)
    }

    pub fn file_size(&self) -> Option<u64> {
        (!self.is_dir()).then_some(self.size)
    }

    /// 编码为 264 字节的磁盘记录
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let raw = RawInode {
            mode: self.mode.bits(),
            _align0: 0,
            inode_no: self.inode_no,
            blocks: self.blocks,
            block: self.block,
            size: self.size,
            uid: self.uid,
            gid: self.gid,
            nlink: self.nlink,
            _align1: 0,
            atime: self.atime,
            mtime: self.mtime,
            ctime: self.ctime,
        };
        let mut bytes = bincode::serialize(&raw)?;
        bytes.resize(INODE_SIZE as usize, 0);
        Ok(bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < INODE_SIZE as usize {
            return Err(FormatError::Verify(format!(
                "inode record is {} bytes, expected {INODE_SIZE}",
                bytes.len()
            )));
        }
        let raw: RawInode = bincode::deserialize(&bytes[..RAW_INODE_LEN])?;
        let reserved = &bytes[RAW_INODE_LEN..INODE_SIZE as usize];
        if raw._align0 != 0 || raw._align1 != 0 || reserved.iter().any(|&b| b != 0) {
            return Err(FormatError::Verify(format!(
                "inode {} has non-zero padding",
                raw.inode_no
            )));
        }
        Ok(Self {
            mode: InodeMode::from_bits_retain(raw.mode),
            inode_no: raw.inode_no,
            blocks: raw.blocks,
            block: raw.block,
            size: raw.size,
            uid: raw.uid,
            gid: raw.gid,
            nlink: raw.nlink,
            atime: raw.atime,
            mtime: raw.mtime,
            ctime: raw.ctime,
        })
    }
}

/// 格式化时写入 inode 表的记录：第 0 槽为根目录，第 1 槽为初始文件
#[derive(Debug, Clone)]
pub struct InodeTable {
    pub inodes: Vec<Inode>,
}

impl InodeTable {
    pub fn build(geometry: &Geometry, owner: Owner, now: i64) -> Self {
        let inodes = vec![
            Inode::root_dir(geometry.data_block_number, owner, now),
            Inode::initial_file(owner, now),
        ];
        debug!(
            "inode table at block {}: {} records, uid={} gid={}",
            geometry.inode_table_block,
            inodes.len(),
            owner.uid,
            owner.gid
        );
        Self { inodes }
    }

    /// 依次拼接所有 inode 记录，其余槽位不写
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(self.inodes.len() * INODE_SIZE as usize);
        for inode in &self.inodes {
            bytes.extend_from_slice(&inode.to_bytes()?);
        }
        Ok(bytes)
    }

    /// 从磁盘读回前 `count` 个 inode
    pub fn load<D: BlockDevice + ?Sized>(
        disk: &mut D,
        geometry: &Geometry,
        count: usize,
    ) -> Result<Self> {
        let mut bytes = vec![0u8; count * INODE_SIZE as usize];
        disk.read_at(Geometry::block_offset(geometry.inode_table_block), &mut bytes)
            .map_err(|source| FormatError::Read {
                stage: Stage::InodeTable,
                source,
            })?;
        let inodes = bytes
            .chunks_exact(INODE_SIZE as usize)
            .map(Inode::from_bytes)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { inodes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: Owner = Owner { uid: 1000, gid: 100 };
    const NOW: i64 = 1_700_000_000;

    #[test]
    fn record_is_264_bytes() {
        let bytes = Inode::root_dir(10, OWNER, NOW).to_bytes().unwrap();
        assert_eq!(bytes.len(), INODE_SIZE as usize);
    }

    #[test]
    fn field_offsets_match_c_layout() {
        let bytes = Inode::root_dir(10, OWNER, NOW).to_bytes().unwrap();
        let u64_at = |off: usize| u64::from_le_bytes(bytes[off..off + 8].try_into().unwrap());
        let i32_at = |off: usize| i32::from_le_bytes(bytes[off..off + 4].try_into().unwrap());

        assert_eq!(u32::from_le_bytes(bytes[0..4].try_into().unwrap()), 0o040000);
        assert_eq!(&bytes[4..8], &[0; 4]);
        assert_eq!(u64_at(8), ROOT_INODE_NUM);
        assert_eq!(u64_at(16), 1);
        assert_eq!(u64_at(24), 10);
        assert_eq!(u64_at(32), 0);
        assert_eq!(u64_at(104), 3);
        assert_eq!(i32_at(112), 1000);
        assert_eq!(i32_at(116), 100);
        assert_eq!(i32_at(120), 2);
        assert_eq!(&bytes[124..128], &[0; 4]);
        assert_eq!(u64_at(128) as i64, NOW);
        assert_eq!(u64_at(136) as i64, NOW);
        assert_eq!(u64_at(144) as i64, NOW);
        assert!(bytes[RAW_INODE_LEN..].iter().all(|&b| b == 0));
    }

    #[test]
    fn root_and_file_inodes() {
        let g = Geometry::compute(409_600).unwrap();
        let table = InodeTable::build(&g, OWNER, NOW);

        let root = &table.inodes[0];
        assert!(root.is_dir());
        assert_eq!(root.block[0], 10);
        assert_eq!(root.dir_children_count(), Some(3));
        assert_eq!(root.file_size(), None);
        assert_eq!(root.nlink, 2);

        let file = &table.inodes[1];
        assert_eq!(file.mode, InodeMode::REGULAR);
        assert_eq!(file.inode_no, 1);
        assert_eq!(file.blocks, 0);
        assert_eq!(file.block, [0; N_BLOCKS]);
        assert_eq!(file.file_size(), Some(0));
        assert_eq!(file.nlink, 1);
        assert_eq!((file.uid, file.gid), (1000, 100));
        assert_eq!((file.atime, file.mtime, file.ctime), (NOW, NOW, NOW));
    }

    #[test]
    fn decode_restores_record() {
        let file = Inode::initial_file(Owner { uid: -1, gid: 0 }, -5);
        let decoded = Inode::from_bytes(&file.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded, file);
    }

    #[test]
    fn dirty_padding_is_rejected() {
        let clean = Inode::root_dir(10, OWNER, NOW).to_bytes().unwrap();
        for offset in [5, 126, RAW_INODE_LEN, 200, INODE_SIZE as usize - 1] {
            let mut bytes = clean.clone();
            bytes[offset] = 0x5A;
            assert!(
                matches!(Inode::from_bytes(&bytes), Err(FormatError::Verify(_))),
                "byte {offset} should be padding"
            );
        }
    }

    #[test]
    fn short_record_is_rejected() {
        assert!(matches!(
            Inode::from_bytes(&[0u8; 100]),
            Err(FormatError::Verify(_))
        ));
    }
}
