pub mod report;

use std::{ffi::OsString, path::PathBuf};

use clap::{error::ErrorKind, Parser};
use log::{debug, warn};

use crate::{
    disk::FileDisk,
    fs::{
        self,
        error::{FormatError, Result},
        verify::verify,
    },
    utils::{current_timestamp, Owner},
};

/// Format a block device or disk image with HUST_fs
#[derive(Debug, Parser)]
#[command(name = "mkfs-hust", version)]
pub struct Cli {
    /// Path to the target device or image file
    pub device: PathBuf,
}

/// 命令行解析的结果
#[derive(Debug)]
pub enum Invocation {
    Format(Cli),
    /// `--help` / `--version`：只需打印，不碰设备
    Info(clap::Error),
}

/// 解析命令行，参数个数不对时返回 `Usage` 错误
pub fn parse<I, T>(args: I) -> Result<Invocation>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => Ok(Invocation::Format(cli)),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            Ok(Invocation::Info(e))
        }
        Err(e) => Err(FormatError::Usage(e.to_string().trim_end().to_string())),
    }
}

pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match parse(args)? {
        Invocation::Format(cli) => cli,
        Invocation::Info(info) => {
            if let Err(e) = info.print() {
                warn!("failed to print {:?}: {e}", info.kind());
            }
            return Ok(());
        }
    };
    let mut disk = FileDisk::open(&cli.device)?;
    report::banner(disk.path());

    let owner = Owner::current();
    let now = current_timestamp();
    debug!("formatting as uid={} gid={} at {now}", owner.uid, owner.gid);

    let progress = report::StageProgress::new();
    let layout = match fs::format(&mut disk, owner, now, |stage| progress.advance(stage)) {
        Ok(layout) => {
            progress.finish();
            layout
        }
        Err(e) => {
            progress.abandon(&e);
            return Err(e);
        }
    };

    verify(&mut disk, &layout)?;
    report::summary(&layout);
    Ok(())
}
