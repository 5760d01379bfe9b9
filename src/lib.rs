//! `mkfs` for HUST_fs: computes the fixed on-disk layout for a device and
//! writes the superblock, both bitmaps, the inode table and the root
//! directory in the byte format the HUST_fs driver reads.

pub mod cli;
pub mod disk;
pub mod fs;
pub mod utils;

pub use fs::{
    error::{FormatError, Result, Stage},
    format,
    geometry::Geometry,
    Layout,
};
