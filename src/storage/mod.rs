//! # Storage Module
//!
//! Non-volatile storage primitives for the calibration record.
//!
//! This module handles:
//! - The single erasable flash page the parameters live in
//! - Lock/unlock, erase and write with flash semantics (erased bytes are 0xFF,
//!   writes may only program erased bytes)
//! - An in-memory page for tests and a file-backed page image for the host

pub mod file;

pub use file::FileFlash;

use crate::error::{CalError, Result};

/// Value every byte holds after an erase.
pub const ERASED_BYTE: u8 = 0xFF;

/// Default page size (bytes), matching a 2 KiB MCU flash page.
pub const DEFAULT_PAGE_SIZE: usize = 2048;

/// One erasable flash page.
///
/// Callers are expected to `unlock`, `erase`, `write` and `lock` in that
/// order. Implementations refuse erase and write while locked.
#[cfg_attr(test, mockall::automock)]
pub trait FlashPage {
    /// Page size in bytes.
    fn capacity(&self) -> usize;

    /// Copies the first `buf.len()` bytes of the page into `buf`.
    fn read(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Allows erase and write.
    fn unlock(&mut self) -> Result<()>;

    /// Forbids erase and write.
    fn lock(&mut self) -> Result<()>;

    /// Resets the whole page to [`ERASED_BYTE`].
    fn erase(&mut self) -> Result<()>;

    /// Programs `data` at the start of the page.
    fn write(&mut self, data: &[u8]) -> Result<()>;
}

/// Checks that `data` can be programmed over `current` starting at offset 0.
pub(crate) fn check_programmable(current: &[u8], data: &[u8]) -> Result<()> {
    if data.len() > current.len() {
        return Err(CalError::RecordTooLarge {
            len: data.len(),
            capacity: current.len(),
        });
    }

    if let Some(offset) = current[..data.len()].iter().position(|&b| b != ERASED_BYTE) {
        return Err(CalError::Storage(format!(
            "write to non-erased byte at offset {}",
            offset
        )));
    }

    Ok(())
}

/// Flash page held in RAM.
///
/// Starts erased and locked, like a fresh part after reset.
#[derive(Debug, Clone)]
pub struct RamFlash {
    data: Vec<u8>,
    locked: bool,
}

impl RamFlash {
    /// Creates an erased, locked page of `page_size` bytes.
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        Self {
            data: vec![ERASED_BYTE; page_size],
            locked: true,
        }
    }

    /// Raw page contents.
    #[must_use]
    pub fn contents(&self) -> &[u8] {
        &self.data
    }

    /// Mutable page contents, bypassing flash rules. Used to simulate corruption.
    pub fn contents_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Returns whether the page is currently locked.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }
}

impl Default for RamFlash {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl FlashPage for RamFlash {
    fn capacity(&self) -> usize {
        self.data.len()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<()> {
        if buf.len() > self.data.len() {
            return Err(CalError::Storage(format!(
                "read of {} bytes exceeds page size {}",
                buf.len(),
                self.data.len()
            )));
        }
        buf.copy_from_slice(&self.data[..buf.len()]);
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
        self.data.fill(ERASED_BYTE);
        Ok(())
    }

    fn write(&mut self, data: &[u8]) -> Result<()> {
        if self.locked {
            return Err(CalError::FlashLocked);
        }
        check_programmable(&self.data, data)?;
        self.data[..data.len()].copy_from_slice(data);
        Ok(())
    }
}
