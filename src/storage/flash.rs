//! EEPROM emulation on the MCU's internal flash.
//!
//! The emulated EEPROM is a small RAM image that serves every
//! [`KbEeprom`] access. The image is stored as a single item in a
//! `sequential-storage` map, which handles wear levelling and GC across the
//! reserved pages. Writes only mark the image dirty; the firmware flushes it
//! from its idle loop with [`FlashEeprom::save_to_flash`].

use crate::config::{KB_EEPROM_SIZE, STORAGE_FLASH_PAGE_COUNT, STORAGE_FLASH_PAGE_START};
use crate::error::Error;

use super::KbEeprom;

/// Flash page size (4 KB).
const FLASH_PAGE_SIZE: u32 = 4096;

/// Start address of our storage region.
const STORAGE_START: u32 = STORAGE_FLASH_PAGE_START * FLASH_PAGE_SIZE;

/// End address (exclusive) of our storage region.
const STORAGE_END: u32 = (STORAGE_FLASH_PAGE_START + STORAGE_FLASH_PAGE_COUNT) * FLASH_PAGE_SIZE;

/// Map key of the EEPROM image.
const KEY_EEPROM_IMAGE: u8 = 0x01;

/// Scratch buffer for sequential-storage: image plus item header.
const WORK_BUF_SIZE: usize = KB_EEPROM_SIZE + 32;

/// RAM image of the emulated EEPROM, synced with flash.
pub struct FlashEeprom {
    image: [u8; KB_EEPROM_SIZE],
    /// True if the image differs from flash.
    dirty: bool,
}

impl FlashEeprom {
    /// Zero-filled image, as on first boot.
    pub const fn new() -> Self {
        Self {
            image: [0; KB_EEPROM_SIZE],
            dirty: false,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Load the image from flash.
    ///
    /// When nothing is stored yet the image stays zero-filled and
    /// [`Error::RecordNotFound`] is returned; the caller treats the keyboard
    /// block as uninitialized.
    pub async fn load_from_flash(
        &mut self,
        flash: &mut impl embedded_storage_async::nor_flash::NorFlash,
    ) -> Result<(), Error> {
        let flash_range = STORAGE_START..STORAGE_END;
        let mut buf = [0u8; WORK_BUF_SIZE];

        let result = match sequential_storage::map::fetch_item::<u8, &[u8], _>(
            flash,
            flash_range,
            &mut sequential_storage::cache::NoCache::new(),
            &mut buf,
            &KEY_EEPROM_IMAGE,
        )
        .await
        {
            Ok(Some(data)) if data.len() == KB_EEPROM_SIZE => {
                self.image.copy_from_slice(data);
                info!("Loaded EEPROM image from flash");
                Ok(())
            }
            Ok(Some(data)) => {
                warn!("EEPROM image has wrong size: {}", data.len());
                self.image = [0; KB_EEPROM_SIZE];
                Err(Error::BufferOverflow)
            }
            Ok(None) => {
                info!("No EEPROM image in flash");
                self.image = [0; KB_EEPROM_SIZE];
                Err(Error::RecordNotFound)
            }
            Err(e) => {
                error!("Flash read error: {:?}", defmt::Debug2Format(&e));
                self.image = [0; KB_EEPROM_SIZE];
                Err(Error::Storage)
            }
        };
        self.dirty = false;
        result
    }

    /// Persist the image if it changed since the last load or save.
    pub async fn save_to_flash(
        &mut self,
        flash: &mut impl embedded_storage_async::nor_flash::NorFlash,
    ) -> Result<(), Error> {
        if !self.dirty {
            debug!("FlashEeprom: no changes to save");
            return Ok(());
        }

        let flash_range = STORAGE_START..STORAGE_END;
        let mut buf = [0u8; WORK_BUF_SIZE];
        let item: &[u8] = &self.image;

        match sequential_storage::map::store_item::<u8, &[u8], _>(
            flash,
            flash_range,
            &mut sequential_storage::cache::NoCache::new(),
            &mut buf,
            &KEY_EEPROM_IMAGE,
            &item,
        )
        .await
        {
            Ok(_) => {
                info!("Saved EEPROM image to flash");
                self.dirty = false;
                Ok(())
            }
            Err(e) => {
                error!("Flash write error: {:?}", defmt::Debug2Format(&e));
                Err(Error::Storage)
            }
        }
    }
}

impl Default for FlashEeprom {
    fn default() -> Self {
        Self::new()
    }
}

impl KbEeprom for FlashEeprom {
    fn read_byte(&self, addr: u16) -> u8 {
        self.image.get(addr as usize).copied().unwrap_or(0)
    }

    fn update_byte(&mut self, addr: u16, value: u8) {
        match self.image.get_mut(addr as usize) {
            Some(b) if *b != value => {
                *b = value;
                self.dirty = true;
            }
            Some(_) => {}
            None => warn!("EEPROM write past end: {}", addr),
        }
    }
}
