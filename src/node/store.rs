//! Line-indexed durable file store
//!
//! A storage unit maps a non-negative line index to string content in one
//! plain text file. Indices written past the current end pad the gap with
//! empty lines, so intermediate lines read back as empty content.

use crate::common::{Error, Result};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub struct LineStore {
    path: PathBuf,
    // Serializes the read-rewrite cycle across concurrent RPC handlers.
    lock: Mutex<()>,
}

impl LineStore {
    /// Open the backing file, creating it when absent.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read one line. A negative or past-the-end index is a not-found,
    /// distinct from an I/O failure.
    pub fn read(&self, index: i64) -> Result<String> {
        let _guard = self.lock.lock().expect("store lock poisoned");
        if index < 0 {
            return Err(Error::LineNotFound(index));
        }
        let text = fs::read_to_string(&self.path)?;
        text.lines()
            .nth(index as usize)
            .map(str::to_string)
            .ok_or(Error::LineNotFound(index))
    }

    /// Write one line, padding any gap below `index` with empty lines.
    pub fn write(&self, index: i64, content: &str) -> Result<()> {
        let _guard = self.lock.lock().expect("store lock poisoned");
        if index < 0 {
            return Err(Error::LineNotFound(index));
        }
        let text = fs::read_to_string(&self.path)?;
        let mut lines: Vec<String> = text.lines().map(str::to_string).collect();
        let index = index as usize;
        while lines.len() <= index {
            lines.push(String::new());
        }
        lines[index] = content.to_string();
        let mut out = lines.join("\n");
        out.push('\n');
        fs::write(&self.path, out)?;
        Ok(())
    }

    /// Number of stored lines, padding included.
    pub fn len(&self) -> Result<usize> {
        let _guard = self.lock.lock().expect("store lock poisoned");
        Ok(fs::read_to_string(&self.path)?.lines().count())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempdir().unwrap();
        let store = LineStore::open(dir.path().join("data.txt")).unwrap();

        store.write(0, "first").unwrap();
        store.write(1, "second").unwrap();
        assert_eq!(store.read(0).unwrap(), "first");
        assert_eq!(store.read(1).unwrap(), "second");
    }

    #[test]
    fn writing_past_the_end_pads_with_empty_lines() {
        let dir = tempdir().unwrap();
        let store = LineStore::open(dir.path().join("data.txt")).unwrap();

        store.write(5, "tail").unwrap();
        for i in 0..5 {
            assert_eq!(store.read(i).unwrap(), "");
        }
        assert_eq!(store.read(5).unwrap(), "tail");
        assert_eq!(store.len().unwrap(), 6);
    }

    #[test]
    fn out_of_range_reads_are_not_found() {
        let dir = tempdir().unwrap();
        let store = LineStore::open(dir.path().join("data.txt")).unwrap();
        store.write(0, "only").unwrap();

        assert!(matches!(store.read(1), Err(Error::LineNotFound(1))));
        assert!(matches!(store.read(-1), Err(Error::LineNotFound(-1))));
    }

    #[test]
    fn overwrite_replaces_in_place() {
        let dir = tempdir().unwrap();
        let store = LineStore::open(dir.path().join("data.txt")).unwrap();

        store.write(2, "old").unwrap();
        store.write(2, "new").unwrap();
        assert_eq!(store.read(2).unwrap(), "new");
        assert_eq!(store.len().unwrap(), 3);
    }

    #[test]
    fn contents_persist_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.txt");
        {
            let store = LineStore::open(&path).unwrap();
            store.write(1, "kept").unwrap();
        }
        let store = LineStore::open(&path).unwrap();
        assert_eq!(store.read(1).unwrap(), "kept");
    }
}
