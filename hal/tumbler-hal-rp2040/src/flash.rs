//! Flash storage driver for RP2040
//!
//! Uses sequential-storage for wear-leveled key-value storage in the last
//! 16KB of flash. The display state record is rewritten on every SAVE and
//! after each calibration, so the partition spans several erase sectors.

use embassy_rp::dma::Channel;
use embassy_rp::flash::{Async, Flash, ERASE_SIZE};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use sequential_storage::cache::NoCache;
use sequential_storage::map;

pub use tumbler_hal::flash::{FlashError, StorageKey};

/// Flash storage configuration
pub const FLASH_SIZE: usize = 2 * 1024 * 1024; // 2MB flash on the Pico

/// Size of the state partition
///
/// The map needs one spare sector to migrate live items into before it can
/// erase, so two sectors is the floor. A record is under 32 bytes, so four
/// 4 KiB sectors hold many saves between erases of any one
/// sector. `memory.x` stops the program region 16 KiB short of the end.
pub const STATE_PARTITION_SIZE: usize = 4 * ERASE_SIZE;
pub const STATE_PARTITION_START: usize = FLASH_SIZE - STATE_PARTITION_SIZE;

const _: () = assert!(STATE_PARTITION_SIZE >= 2 * ERASE_SIZE);
const _: () = assert!(STATE_PARTITION_START % ERASE_SIZE == 0);
const _: () = assert!(STATE_PARTITION_SIZE == 16 * 1024);

/// Flash range for the state partition
pub const STATE_RANGE: core::ops::Range<u32> =
    (STATE_PARTITION_START as u32)..(FLASH_SIZE as u32);

/// Scratch buffer for one map item (key byte plus record text)
const ITEM_BUFFER_SIZE: usize = 128;

/// RP2040 Flash storage implementation
pub struct Rp2040FlashStorage<'d> {
    flash: Flash<'d, FLASH, Async, FLASH_SIZE>,
}

impl<'d> Rp2040FlashStorage<'d> {
    /// Create a new flash storage instance
    pub fn new(flash: Peri<'d, FLASH>, dma: Peri<'d, impl Channel>) -> Self {
        Self {
            flash: Flash::new(flash, dma),
        }
    }
}

impl<'d> tumbler_hal::FlashStorage for Rp2040FlashStorage<'d> {
    async fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, FlashError> {
        let mut item_buffer = [0u8; ITEM_BUFFER_SIZE];

        let result = map::fetch_item::<StorageKey, &[u8], _>(
            &mut self.flash,
            STATE_RANGE,
            &mut NoCache::new(),
            &mut item_buffer,
            &key,
        )
        .await;

        match result {
            Ok(Some(data)) => {
                let len = data.len();
                if buffer.len() < len {
                    return Err(FlashError::BufferTooSmall);
                }
                buffer[..len].copy_from_slice(data);
                Ok(len)
            }
            Ok(None) => Err(FlashError::NotFound),
            Err(sequential_storage::Error::Corrupted { .. }) => Err(FlashError::Corrupted),
            Err(_) => Err(FlashError::Storage),
        }
    }

    async fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), FlashError> {
        let mut item_buffer = [0u8; ITEM_BUFFER_SIZE];

        map::store_item(
            &mut self.flash,
            STATE_RANGE,
            &mut NoCache::new(),
            &mut item_buffer,
            &key,
            &data,
        )
        .await
        .map_err(|e| match e {
            sequential_storage::Error::FullStorage => FlashError::Full,
            sequential_storage::Error::Storage { .. } => FlashError::Flash,
            _ => FlashError::Storage,
        })
    }
}
