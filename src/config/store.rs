//! Configuration persistence boundary.
//!
//! The endpoint only sees [`ConfigurationStore`]. [`RecordStore`] implements it
//! on top of any [`StorageMedium`] (flash sector, EEPROM record, file) using the
//! binary format from [`record`](crate::config::record).
//!
//! ## Example
//!
//! ```rust
//! use zigbee_switch::config::{Configuration, ConfigurationStore, MemoryMedium, RecordStore};
//!
//! let mut store = RecordStore::new(MemoryMedium::new(), 2);
//!
//! // First boot: nothing stored yet
//! assert!(store.load().unwrap_err().is_not_found());
//!
//! let cfg = Configuration { pin_mask: 0x200, ..Configuration::default() };
//! store.save(&cfg)?;
//! assert_eq!(store.load()?, cfg);
//! # Ok::<(), zigbee_switch::SwitchError>(())
//! ```

use heapless::Vec;

use crate::config::record::{self, MAX_RECORD_LEN};
use crate::config::Configuration;
use crate::error::{Result, SwitchError};

/// Durable configuration storage consumed by the endpoint.
pub trait ConfigurationStore {
    /// Load the stored configuration.
    ///
    /// # Errors
    ///
    /// Returns an error whose [`is_not_found()`](SwitchError::is_not_found)
    /// is `true` on first boot (nothing stored, or a corrupt record). A failed
    /// medium read is reported as `Persistence(ReadFailed)`.
    fn load(&mut self) -> Result<Configuration>;

    /// Store `cfg`, replacing any previous record.
    ///
    /// # Errors
    ///
    /// Returns `Persistence(WriteFailed)` if the medium rejected the write.
    fn save(&mut self, cfg: &Configuration) -> Result<()>;
}

impl<T: ConfigurationStore + ?Sized> ConfigurationStore for &mut T {
    fn load(&mut self) -> Result<Configuration> {
        (**self).load()
    }

    fn save(&mut self, cfg: &Configuration) -> Result<()> {
        (**self).save(cfg)
    }
}

/// Raw record storage (flash/EEPROM primitives).
pub trait StorageMedium {
    /// Read record `id` into `buf`, returning its length.
    ///
    /// # Errors
    ///
    /// Returns `SwitchError::record_not_found()` if the record does not exist.
    fn read(&mut self, id: u16, buf: &mut [u8]) -> Result<usize>;

    /// Write record `id`.
    fn write(&mut self, id: u16, data: &[u8]) -> Result<()>;
}

impl<T: StorageMedium + ?Sized> StorageMedium for &mut T {
    fn read(&mut self, id: u16, buf: &mut [u8]) -> Result<usize> {
        (**self).read(id, buf)
    }

    fn write(&mut self, id: u16, data: &[u8]) -> Result<()> {
        (**self).write(id, data)
    }
}

/// [`ConfigurationStore`] that keeps one binary record per endpoint.
#[derive(Debug)]
pub struct RecordStore<M> {
    medium: M,
    record_id: u16,
}

impl<M: StorageMedium> RecordStore<M> {
    /// Create a store writing record `record_id` (typically the endpoint number).
    pub fn new(medium: M, record_id: u16) -> Self {
        Self { medium, record_id }
    }

    /// Access the underlying medium
    pub fn medium(&self) -> &M {
        &self.medium
    }

    /// Mutable access to the underlying medium
    pub fn medium_mut(&mut self) -> &mut M {
        &mut self.medium
    }
}

impl<M: StorageMedium> ConfigurationStore for RecordStore<M> {
    fn load(&mut self) -> Result<Configuration> {
        let mut buf = [0u8; MAX_RECORD_LEN];
        let len = self.medium.read(self.record_id, &mut buf)?;
        record::decode(&buf[..len.min(buf.len())])
    }

    fn save(&mut self, cfg: &Configuration) -> Result<()> {
        let mut buf = [0u8; MAX_RECORD_LEN];
        let len = record::encode(cfg, &mut buf)?;
        self.medium.write(self.record_id, &buf[..len])
    }
}

/// In-memory [`StorageMedium`] holding a single record, for hosts and tests.
#[derive(Debug, Default)]
pub struct MemoryMedium {
    record: Option<(u16, Vec<u8, MAX_RECORD_LEN>)>,
    writes: usize,
    fail_reads: bool,
    fail_writes: bool,
}

impl MemoryMedium {
    /// Create an empty medium (first boot)
    pub const fn new() -> Self {
        Self {
            record: None,
            writes: 0,
            fail_reads: false,
            fail_writes: false,
        }
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.writes
    }

    /// Make every following read fail (the stored record is kept)
    pub fn set_fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    /// Make every following write fail
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Erase the stored record
    pub fn erase(&mut self) {
        self.record = None;
    }

    /// Raw bytes of the stored record
    pub fn raw(&self) -> Option<&[u8]> {
        self.record.as_ref().map(|(_, data)| data.as_slice())
    }
}

impl StorageMedium for MemoryMedium {
    fn read(&mut self, id: u16, buf: &mut [u8]) -> Result<usize> {
        if self.fail_reads {
            return Err(SwitchError::read_failed());
        }
        match &self.record {
            Some((stored_id, data)) if *stored_id == id => {
                if buf.len() < data.len() {
                    return Err(SwitchError::buffer_too_small());
                }
                buf[..data.len()].copy_from_slice(data);
                Ok(data.len())
            }
            _ => Err(SwitchError::record_not_found()),
        }
    }

    fn write(&mut self, id: u16, data: &[u8]) -> Result<()> {
        if self.fail_writes {
            return Err(SwitchError::write_failed());
        }
        let data = Vec::from_slice(data).map_err(|_| SwitchError::buffer_too_small())?;
        self.record = Some((id, data));
        self.writes += 1;
        Ok(())
    }
}
