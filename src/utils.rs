use chrono::Utc;

/// 执行格式化的进程身份，写入 inode 的 uid/gid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Owner {
    pub uid: i32,
    pub gid: i32,
}

impl Owner {
    #[cfg(unix)]
    pub fn current() -> Self {
        // SAFETY: getuid/getgid 总是成功且没有副作用
        let (uid, gid) = unsafe { (libc::getuid(), libc::getgid()) };
        Self {
            uid: uid as i32,
            gid: gid as i32,
        }
    }

    #[cfg(not(unix))]
    pub fn current() -> Self {
        Self { uid: 0, gid: 0 }
    }
}

/// 当前时间，秒级 Unix 时间戳
pub fn current_timestamp() -> i64 {
    Utc::now().timestamp()
}
