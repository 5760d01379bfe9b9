use crate::fs::{
    config::{
        DIR_RECORD_SIZE, FILENAME_MAX_LEN, INITIAL_FILE_INODE_NUM, INITIAL_FILE_NAME,
        ROOT_INODE_NUM,
    },
    error::{FormatError, Result},
};

/// inode 号在目录项中的偏移：255 字节文件名之后按 8 字节对齐
const INODE_NO_OFFSET: usize = 256;

/// 一个目录项：定长文件名 + inode 号
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirRecord {
    pub name: String,
    pub inode_no: u64,
}

impl DirRecord {
    pub fn new(name: &str, inode_no: u64) -> Result<Self> {
        // 文件名以 '\0' 结尾，所以最多 254 字节
        if name.len() >= FILENAME_MAX_LEN || name.as_bytes().contains(&0) {
            return Err(FormatError::NameTooLong(name.to_string()));
        }
        Ok(Self {
            name: name.to_string(),
            inode_no,
        })
    }

    pub fn to_bytes(&self) -> [u8; DIR_RECORD_SIZE as usize] {
        let mut bytes = [0u8; DIR_RECORD_SIZE as usize];
        bytes[..self.name.len()].copy_from_slice(self.name.as_bytes());
        bytes[INODE_NO_OFFSET..].copy_from_slice(&self.inode_no.to_le_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < DIR_RECORD_SIZE as usize {
            return Err(FormatError::Verify(format!(
                "directory record is {} bytes, expected {DIR_RECORD_SIZE}",
                bytes.len()
            )));
        }
        let raw_name = &bytes[..FILENAME_MAX_LEN];
        let end = raw_name.iter().position(|&b| b == 0).unwrap_or(FILENAME_MAX_LEN);
        let name = std::str::from_utf8(&raw_name[..end])
            .map_err(|e| FormatError::Verify(format!("directory entry name: {e}")))?;
        let mut inode_no = [0u8; 8];
        inode_no.copy_from_slice(&bytes[INODE_NO_OFFSET..INODE_NO_OFFSET + 8]);
        Ok(Self {
            name: name.to_string(),
            inode_no: u64::from_le_bytes(inode_no),
        })
    }
}

/// 根目录唯一数据块里的内容
#[derive(Debug, Clone)]
pub struct RootDirectory {
    pub entries: Vec<DirRecord>,
}

impl RootDirectory {
    /// `.`、`..` 都指向根目录，第三项为初始文件
    pub fn build() -> Result<Self> {
        let entries = vec![
            DirRecord::new(".", ROOT_INODE_NUM)?,
            DirRecord::new("..", ROOT_INODE_NUM)?,
            DirRecord::new(INITIAL_FILE_NAME, INITIAL_FILE_INODE_NUM)?,
        ];
        Ok(Self { entries })
    }

    /// 只包含三个目录项本身，块内其余字节不写
    pub fn to_bytes(&self) -> Vec<u8> {
        self.entries.iter().flat_map(|e| e.to_bytes()).collect()
    }

    pub fn from_bytes(bytes: &[u8], count: usize) -> Result<Vec<DirRecord>> {
        bytes
            .chunks_exact(DIR_RECORD_SIZE as usize)
            .take(count)
            .map(DirRecord::from_bytes)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_layout() {
        let bytes = DirRecord::new("file", 1).unwrap().to_bytes();
        assert_eq!(bytes.len(), 264);
        assert_eq!(&bytes[..5], b"file\0");
        assert!(bytes[4..INODE_NO_OFFSET].iter().all(|&b| b == 0));
        assert_eq!(&bytes[INODE_NO_OFFSET..], &1u64.to_le_bytes());
    }

    #[test]
    fn root_entries_in_order() {
        let root = RootDirectory::build().unwrap();

        let bytes = root.to_bytes();
        assert_eq!(bytes.len(), 3 * DIR_RECORD_SIZE as usize);

        let entries = RootDirectory::from_bytes(&bytes, 3).unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, [".", "..", "file"]);
        assert_eq!(entries[0].inode_no, ROOT_INODE_NUM);
        assert_eq!(entries[1].inode_no, ROOT_INODE_NUM);
        assert_eq!(entries[2].inode_no, 1);
    }

    #[test]
    fn longest_name_fits() {
        let name = "a".repeat(FILENAME_MAX_LEN - 1);
        let record = DirRecord::new(&name, 7).unwrap();
        let decoded = DirRecord::from_bytes(&record.to_bytes()).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn overlong_name_is_rejected() {
        let name = "a".repeat(FILENAME_MAX_LEN);
        assert!(matches!(
            DirRecord::new(&name, 7),
            Err(FormatError::NameTooLong(_))
        ));
    }
}
