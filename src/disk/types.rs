use crate::fs::config::BLOCK_SIZE;

/// 定义一个逻辑块类型（每块 4KB 的字节数组）
pub type Block = [u8; BLOCK_SIZE as usize];
