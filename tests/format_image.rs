use std::fs;

use hust_mkfs::{
    disk::{BlockDevice, FileDisk},
    format,
    fs::{
        config::{BLOCK_SIZE, MAGIC},
        inode_table::InodeMode,
        verify::{verify, ReadBack},
    },
    utils::Owner,
    FormatError,
};
use tempfile::NamedTempFile;

const OWNER: Owner = Owner { uid: 1000, gid: 1000 };
const NOW: i64 = 1_650_000_000;

fn image(len: u64) -> NamedTempFile {
    let file = NamedTempFile::new().unwrap();
    file.as_file().set_len(len).unwrap();
    file
}

fn u64_at(bytes: &[u8], off: usize) -> u64 {
    u64::from_le_bytes(bytes[off..off + 8].try_into().unwrap())
}

#[test]
fn four_hundred_kilobyte_image_byte_layout() {
    let img = image(409_600);
    let mut disk = FileDisk::open(img.path()).unwrap();
    format(&mut disk, OWNER, NOW, |_| {}).unwrap();
    drop(disk);

    let bytes = fs::read(img.path()).unwrap();
    assert_eq!(bytes.len(), 409_600);
    let block = |n: usize| &bytes[n * 4096..(n + 1) * 4096];

    // block 0: dummy
    assert!(block(0).iter().all(|&b| b == 0));

    // block 1: super block
    let sb = block(1);
    let fields: Vec<u64> = (0..10).map(|i| u64_at(sb, i * 8)).collect();
    assert_eq!(fields, [1, MAGIC, 4096, 100, 89, 100, 2, 3, 4, 10]);
    assert!(sb[80..].iter().all(|&b| b == 0));

    // block 2: blocks 0..=10 used
    let bmap = block(2);
    assert_eq!(bmap[0], 0xFF);
    assert_eq!(bmap[1], 0b0000_0111);
    assert!(bmap[2..].iter().all(|&b| b == 0));

    // block 3: inodes 0 and 1 used
    let imap = block(3);
    assert_eq!(imap[0], 0b0000_0011);
    assert!(imap[1..].iter().all(|&b| b == 0));

    // block 4: root inode then file inode, 264 bytes each
    let root = &block(4)[..264];
    assert_eq!(u32::from_le_bytes(root[..4].try_into().unwrap()), 0o040000);
    assert_eq!(u64_at(root, 8), 0);
    assert_eq!(u64_at(root, 16), 1);
    assert_eq!(u64_at(root, 24), 10);
    assert_eq!(u64_at(root, 104), 3);
    assert_eq!(u64_at(root, 128) as i64, NOW);

    let file = &block(4)[264..528];
    assert_eq!(u32::from_le_bytes(file[..4].try_into().unwrap()), 0o100000);
    assert_eq!(u64_at(file, 8), 1);
    assert_eq!(u64_at(file, 16), 0);
    assert_eq!(u64_at(file, 104), 0);
    assert_eq!(i32::from_le_bytes(file[120..124].try_into().unwrap()), 1);

    // block 10: ".", "..", "file"
    let dir = block(10);
    for (i, (name, ino)) in [(&b"."[..], 0u64), (&b".."[..], 0), (&b"file"[..], 1)].iter().enumerate() {
        let rec = &dir[i * 264..(i + 1) * 264];
        assert_eq!(&rec[..name.len()], *name);
        assert_eq!(rec[name.len()], 0);
        assert_eq!(u64_at(rec, 256), *ino);
    }
    assert!(bytes[11 * 4096..].iter().all(|&b| b == 0));
}

#[test]
fn record_padding_is_written_as_zero() {
    // 先把整个镜像填成 0xAA，填充字节必须被显式写成 0
    let img = NamedTempFile::new().unwrap();
    fs::write(img.path(), vec![0xAA; 409_600]).unwrap();
    let mut disk = FileDisk::open(img.path()).unwrap();
    format(&mut disk, OWNER, NOW, |_| {}).unwrap();
    drop(disk);

    let bytes = fs::read(img.path()).unwrap();
    let zero = |range: &[u8]| range.iter().all(|&b| b == 0);

    assert!(zero(&bytes[4096 + 80..2 * 4096]));
    for slot in 0..2 {
        let inode = &bytes[4 * 4096 + slot * 264..4 * 4096 + (slot + 1) * 264];
        assert!(zero(&inode[4..8]), "inode {slot} mode padding");
        assert!(zero(&inode[124..128]), "inode {slot} nlink padding");
        assert!(zero(&inode[152..264]), "inode {slot} reserved area");
    }
    for (slot, name_len) in [(0, 1), (1, 2), (2, 4)] {
        let rec = &bytes[10 * 4096 + slot * 264..10 * 4096 + (slot + 1) * 264];
        assert!(zero(&rec[name_len..256]), "entry {slot} name tail");
    }
    // 未写入的槽位保持原样
    assert!(bytes[4 * 4096 + 528..5 * 4096].iter().all(|&b| b == 0xAA));
}

#[test]
fn flipped_padding_byte_fails_verification() {
    for offset in [4096 + 2000, 4 * 4096 + 5, 4 * 4096 + 200] {
        let img = image(409_600);
        let mut disk = FileDisk::open(img.path()).unwrap();
        let layout = format(&mut disk, OWNER, NOW, |_| {}).unwrap();
        disk.write_at(offset, &[0x5A]).unwrap();
        assert!(
            matches!(verify(&mut disk, &layout), Err(FormatError::Verify(_))),
            "byte at {offset} went unnoticed"
        );
    }
}

#[test]
fn read_back_reproduces_layout() {
    let img = image(409_600);
    let mut disk = FileDisk::open(img.path()).unwrap();
    let layout = format(&mut disk, OWNER, NOW, |_| {}).unwrap();

    let read = verify(&mut disk, &layout).unwrap();
    assert_eq!(read.super_block, layout.super_block);
    assert_eq!(read.block_bitmap.bits.count_ones(), 11);
    assert_eq!(read.inode_bitmap.bits.count_ones(), 2);

    let root = &read.inodes[0];
    assert_eq!(root.mode, InodeMode::DIRECTORY);
    assert_eq!(root.block[0], 10);
    assert_eq!(root.dir_children_count(), Some(3));
    assert_eq!((root.uid, root.gid), (1000, 1000));

    let file = &read.inodes[1];
    assert_eq!(file.inode_no, 1);
    assert_eq!(file.file_size(), Some(0));

    let names: Vec<_> = read.entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, [".", "..", "file"]);
}

#[test]
fn large_image_uses_multi_block_bitmaps() {
    // 32769 块，位图各需两块
    let blocks = 8 * BLOCK_SIZE + 1;
    let img = image(blocks * BLOCK_SIZE);
    let mut disk = FileDisk::open(img.path()).unwrap();
    let layout = format(&mut disk, OWNER, NOW, |_| {}).unwrap();

    let g = layout.geometry;
    assert_eq!(g.bmap_blocks, 2);
    assert_eq!(g.imap_blocks, 2);
    assert_eq!(g.inode_table_blocks, blocks / 15);
    assert_eq!(g.data_block_number, 2 + 2 + 2 + blocks / 15);

    let read = ReadBack::load(&mut disk).unwrap();
    assert_eq!(read.block_bitmap.as_bytes().len(), 2 * BLOCK_SIZE as usize);
    assert_eq!(read.block_bitmap.bits.count_ones(), g.data_block_number + 1);
    assert_eq!(read.inode_bitmap.bits.count_ones(), 2);
    assert_eq!(read.super_block.free_blocks, blocks - g.data_block_number - 1);
}

#[test]
fn minimum_image_succeeds_and_one_block_less_fails() {
    let img = image(15 * BLOCK_SIZE);
    let mut disk = FileDisk::open(img.path()).unwrap();
    let layout = format(&mut disk, OWNER, NOW, |_| {}).unwrap();
    assert_eq!(layout.geometry.data_block_number, 5);
    verify(&mut disk, &layout).unwrap();

    let img = image(14 * BLOCK_SIZE);
    let mut disk = FileDisk::open(img.path()).unwrap();
    let err = format(&mut disk, OWNER, NOW, |_| {}).unwrap_err();
    assert!(matches!(err, FormatError::DeviceTooSmall { blocks: 14, required: 15 }));
    drop(disk);
    assert!(fs::read(img.path()).unwrap().iter().all(|&b| b == 0));
}

#[test]
fn trailing_partial_block_is_left_alone() {
    let img = image(409_600 + 100);
    let mut disk = FileDisk::open(img.path()).unwrap();
    let layout = format(&mut disk, OWNER, NOW, |_| {}).unwrap();
    assert_eq!(layout.geometry.blocks_count, 100);
    assert_eq!(disk.size().unwrap(), 409_700);
}
