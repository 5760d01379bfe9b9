use std::path::Path;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::fs::{
    config::{BLOCK_SIZE, INITIAL_FILE_NAME},
    error::{FormatError, Stage},
    Layout,
};

pub fn banner(device: &Path) {
    println!(
        "{} {}",
        "💾 Formatting HUST_fs on".bright_cyan().bold(),
        device.display().to_string().cyan()
    );
}

/// 每完成一个写盘阶段进度条前进一格
pub struct StageProgress {
    bar: ProgressBar,
}

impl StageProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::new(Stage::ALL.len() as u64);
        let style = ProgressStyle::with_template("[{bar:40.green/black}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        bar.set_style(style);
        Self { bar }
    }

    pub fn advance(&self, stage: Stage) {
        self.bar.set_message(format!("{stage} written"));
        self.bar.inc(1);
    }

    pub fn finish(&self) {
        self.bar.finish_with_message("✅ Disk formatted successfully!");
    }

    pub fn abandon(&self, err: &FormatError) {
        self.bar.abandon_with_message(format!("{}", err.to_string().red()));
    }
}

impl Default for StageProgress {
    fn default() -> Self {
        Self::new()
    }
}

pub fn summary(layout: &Layout) {
    let g = &layout.geometry;
    println!("{}", "📊 Layout".bright_yellow().bold());
    let rows = [
        ("Block size", format!("{BLOCK_SIZE} bytes")),
        ("Blocks", g.blocks_count.to_string()),
        ("Inodes", g.inodes_count.to_string()),
        ("Block bitmap", format!("block {} (+{})", g.bmap_block, g.bmap_blocks)),
        ("Inode bitmap", format!("block {} (+{})", g.imap_block, g.imap_blocks)),
        (
            "Inode table",
            format!("block {} (+{})", g.inode_table_block, g.inode_table_blocks),
        ),
        ("Root directory", format!("block {}", g.data_block_number)),
        ("Free blocks", g.free_blocks.to_string()),
    ];
    for (name, value) in rows {
        println!("  {:<16}{}", name.blue(), value);
    }
    println!(
        "{} {} {}",
        "📁 Created /".green(),
        format!("and /{INITIAL_FILE_NAME}").green(),
        format!("(owner {})", whoami::username()).bright_black()
    );
}
