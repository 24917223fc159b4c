//! # Parameter Store
//!
//! Owns the in-memory calibration parameters and the flash page they are
//! persisted to.

use tracing::{error, info, warn};

use super::params::{CalibrationParameters, RECORD_LEN};
use super::Side;
use crate::error::{CalError, Result};
use crate::storage::FlashPage;

/// Calibration parameters plus their backing flash page.
#[derive(Debug)]
pub struct ParameterStore<F: FlashPage> {
    flash: F,
    params: CalibrationParameters,
}

impl<F: FlashPage> ParameterStore<F> {
    /// Loads the parameters from `flash`.
    ///
    /// A record whose checksum does not match, or a page that cannot be read,
    /// is treated as absent and replaced by the defaults. Never fails.
    pub fn load(mut flash: F) -> Self {
        let mut record = [0u8; RECORD_LEN];

        let params = match flash.read(&mut record) {
            Ok(()) => {
                let stored = CalibrationParameters::from_bytes(&record);
                if stored.is_checksum_valid() {
                    info!("Using saved calibration parameters");
                    stored
                } else {
                    info!("No valid calibration record, using default parameters");
                    CalibrationParameters::default()
                }
            }
            Err(e) => {
                warn!("Failed to read calibration record ({}), using default parameters", e);
                CalibrationParameters::default()
            }
        };

        log_params(&params);
        Self { flash, params }
    }

    /// Current parameters.
    #[must_use]
    pub fn get(&self) -> &CalibrationParameters {
        &self.params
    }

    pub(crate) fn params_mut(&mut self) -> &mut CalibrationParameters {
        &mut self.params
    }

    /// Stamps the checksum and rewrites the flash page with the record.
    ///
    /// Blocks for the erase/write cycle. The page is locked again even when
    /// erase or write fails.
    ///
    /// # Errors
    ///
    /// Returns `RecordTooLarge` if the page cannot hold the record, or the
    /// storage fault reported by the page.
    pub fn save(&mut self) -> Result<()> {
        let params = self.params.clone();
        self.commit(params)
    }

    /// Persists the default parameters and adopts them.
    ///
    /// The current parameters are kept if the save fails.
    ///
    /// # Errors
    ///
    /// Same as [`ParameterStore::save`].
    pub fn restore_defaults(&mut self) -> Result<()> {
        self.commit(CalibrationParameters::default())
    }

    /// Writes `params` to flash, then makes them current.
    fn commit(&mut self, mut params: CalibrationParameters) -> Result<()> {
        let capacity = self.flash.capacity();
        if capacity < RECORD_LEN {
            return Err(CalError::RecordTooLarge {
                len: RECORD_LEN,
                capacity,
            });
        }

        params.checksum = params.compute_checksum();
        let record = params.to_bytes();

        self.flash.unlock()?;
        let programmed = self
            .flash
            .erase()
            .and_then(|()| self.flash.write(&record));
        let relocked = self.flash.lock();

        if let Err(e) = programmed {
            error!("Failed to save calibration record: {}", e);
            return Err(e);
        }
        relocked?;

        self.params = params;
        info!("Calibration parameters saved (crc 0x{:08X})", self.params.checksum);
        Ok(())
    }

    /// Backing flash page.
    #[must_use]
    pub fn flash(&self) -> &F {
        &self.flash
    }

    /// Consumes the store, returning the backing flash page.
    pub fn into_flash(self) -> F {
        self.flash
    }
}

/// Logs the parts of the parameters an operator can sanity-check.
pub(crate) fn log_params(params: &CalibrationParameters) {
    for side in Side::BOTH {
        let (x, y) = params.center(side);
        let [min, max] = params.trigger(side);
        info!("{:?} stick center: {}, {}", side, x, y);
        info!("{:?} trigger: {}, {}", side, min, max);
    }
}
