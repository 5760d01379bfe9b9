/// 块大小：4KB，文件系统以块为最小读写单位
pub const BLOCK_SIZE: u64 = 4096;

/// 魔数，用于识别 HUST_fs
pub const MAGIC: u64 = 0x2016_0105;

/// 格式版本号
pub const VERSION: u64 = 1;

/// 前置保留块：block0 为 dummy 块，block1 为超级块
pub const RESERVE_BLOCKS: u64 = 2;

/// 超级块所在的块号
pub const SUPER_BLOCK_BLOCK_ID: u64 = 1;

/// 每个 inode 的直接块指针个数
pub const N_BLOCKS: usize = 10;

/// 目录项中文件名字段的长度（含结尾的 '\0'）
pub const FILENAME_MAX_LEN: usize = 255;

/// 根目录的 inode 号
pub const ROOT_INODE_NUM: u64 = 0;

/// 格式化时创建的唯一普通文件
pub const INITIAL_FILE_NAME: &str = "file";
pub const INITIAL_FILE_INODE_NUM: u64 = 1;

/// 磁盘上一个 inode 记录的大小（字节）
pub const INODE_SIZE: u64 = 264;

/// 磁盘上一个目录项的大小（字节）
pub const DIR_RECORD_SIZE: u64 = 264;

/// 每个 inode 表块能放下的 inode 个数：4096 / 264 = 15
pub const INODES_PER_BLOCK: u64 = BLOCK_SIZE / INODE_SIZE;

/// 每个位图块能管理的对象个数
pub const BITS_PER_BLOCK: u64 = 8 * BLOCK_SIZE;

/// 根目录只有一个数据块，最多放下的目录项个数：4096 / 264 = 15
pub const DIR_RECORDS_PER_BLOCK: u64 = BLOCK_SIZE / DIR_RECORD_SIZE;
