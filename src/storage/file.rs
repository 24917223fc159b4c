//! File-backed flash page image.
//!
//! Lets the host binary keep calibration across runs the same way the
//! firmware keeps it across power cycles.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::{check_programmable, FlashPage, ERASED_BYTE};
use crate::error::{CalError, Result};

/// Flash page stored in a regular file of exactly `page_size` bytes.
#[derive(Debug)]
pub struct FileFlash {
    file: File,
    path: PathBuf,
    page_size: usize,
    locked: bool,
}

impl FileFlash {
    /// Opens the page image at `path`, creating an erased one if missing.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be opened or created, and `Storage`
    /// if an existing image has the wrong size.
    pub fn open<P: AsRef<Path>>(path: P, page_size: usize) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let exists = path.exists();

        if !exists {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        if exists {
            let len = file.metadata()?.len() as usize;
            if len != page_size {
                return Err(CalError::Storage(format!(
                    "{} is {} bytes, expected a {} byte page",
                    path.display(),
                    len,
                    page_size
                )));
            }
            debug!("Opened flash image {}", path.display());
        } else {
            file.write_all(&vec![ERASED_BYTE; page_size])?;
            file.sync_all()?;
            info!("Created erased flash image {} ({} bytes)", path.display(), page_size);
        }

        Ok(Self {
            file,
            path,
            page_size,
            locked: true,
        })
    }

    /// Path of the page image.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_page(&mut self) -> Result<Vec<u8>> {
        let mut page = vec![0u8; self.page_size];
        self.file.seek(SeekFrom::Start(0))?;
        self.file.read_exact(&mut page)?;
        Ok(page)
    }
}

impl FlashPage for FileFlash {
    fn capacity(&self) -> usize {
        self.page_size
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<()> {
        if buf.len() > self.page_size {
            return Err(CalError::Storage(format!(
                "read of {} bytes exceeds page size {}",
                buf.len(),
                self.page_size
            )));
        }
        self.file.seek(SeekFrom::Start(0))?;
        self.file.read_exact(buf)?;
        Ok(())
    }

    fn unlock(&mut self) -> Result<()> {
        self.locked = false;
        Ok(())
    }

    fn lock(&mut self) -> Result<()> {
        self.locked = true;
        Ok(())
    }

    fn erase(&mut self) -> Result<()> {
        if self.locked {
            return Err(CalError::FlashLocked);
        }
        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(&vec![ERASED_BYTE; self.page_size])?;
        self.file.sync_data()?;
        Ok(())
    }

    fn write(&mut self, data: &[u8]) -> Result<()> {
        if self.locked {
            return Err(CalError::FlashLocked);
        }
        let current = self.read_page()?;
        check_programmable(&current, data)?;

        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(data)?;
        self.file.sync_data()?;
        Ok(())
    }
}
