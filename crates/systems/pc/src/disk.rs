//! Block device set and boot-sector selection.
//!
//! Storage attachments are plain image files opened read+write. Each device
//! gets a one-byte id: removable media count up from 0x00, fixed disks from
//! 0x80, in attachment order, which is also the order the boot scan walks.
//! Handles stay open for the life of the machine and are released on drop.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::StartupError;

/// Bytes per sector; the boot sector is exactly one of these.
pub const SECTOR_SIZE: usize = 512;

/// Little-endian signature at offsets 510-511 marking a bootable sector.
pub const BOOT_SIGNATURE: u16 = 0xAA55;

/// First device id assigned to fixed disks (0x00-0x7F are removable).
pub const FIRST_FIXED_ID: u8 = 0x80;

/// One attached storage device.
#[derive(Debug)]
pub struct BlockDevice {
    id: u8,
    path: PathBuf,
    file: File,
}

impl BlockDevice {
    fn open(path: &Path, id: u8) -> Result<Self, StartupError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|source| StartupError::DiskOpen {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self {
            id,
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_fixed(&self) -> bool {
        self.id >= FIRST_FIXED_ID
    }

    /// Read the device's first sector, or `None` if the image is shorter than
    /// one sector (such an image can never be bootable).
    fn read_first_sector(&mut self) -> Result<Option<[u8; SECTOR_SIZE]>, StartupError> {
        let mut sector = [0u8; SECTOR_SIZE];
        self.file
            .seek(SeekFrom::Start(0))
            .and_then(|_| self.file.read_exact(&mut sector))
            .map(|_| Some(sector))
            .or_else(|err| {
                if err.kind() == io::ErrorKind::UnexpectedEof {
                    Ok(None)
                } else {
                    Err(StartupError::DiskRead {
                        path: self.path.clone(),
                        source: err,
                    })
                }
            })
    }
}

/// All attached storage devices, keyed by their one-byte ids.
#[derive(Debug, Default)]
pub struct DiskSet {
    devices: Vec<BlockDevice>,
}

impl DiskSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an image as a fixed disk; returns the assigned id (0x80 up).
    pub fn attach_fixed(&mut self, path: &Path) -> Result<u8, StartupError> {
        let count = self.devices.iter().filter(|d| d.is_fixed()).count();
        if count >= 0x80 {
            return Err(StartupError::DeviceLimit);
        }
        self.attach(path, FIRST_FIXED_ID + count as u8)
    }

    /// Attach an image as removable media; returns the assigned id (0x00 up).
    pub fn attach_removable(&mut self, path: &Path) -> Result<u8, StartupError> {
        let count = self.devices.iter().filter(|d| !d.is_fixed()).count();
        if count >= 0x80 {
            return Err(StartupError::DeviceLimit);
        }
        self.attach(path, count as u8)
    }

    fn attach(&mut self, path: &Path, id: u8) -> Result<u8, StartupError> {
        let device = BlockDevice::open(path, id)?;
        debug!("attached {} as device {:#04x}", path.display(), id);
        self.devices.push(device);
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn devices(&self) -> impl Iterator<Item = &BlockDevice> {
        self.devices.iter()
    }

    /// Find the boot device: the first fixed disk, in attachment order, whose
    /// first sector carries [`BOOT_SIGNATURE`] at offsets 510-511.
    ///
    /// Returns the device id and the sector contents so the caller can place
    /// them at the boot address. Non-bootable images stay attached as
    /// ordinary devices.
    pub fn select_boot(&mut self) -> Result<(u8, [u8; SECTOR_SIZE]), StartupError> {
        for device in self.devices.iter_mut().filter(|d| d.is_fixed()) {
            let Some(sector) = device.read_first_sector()? else {
                continue;
            };
            let signature = u16::from_le_bytes([sector[510], sector[511]]);
            if signature == BOOT_SIGNATURE {
                info!(
                    "booting from device {:#04x} ({})",
                    device.id,
                    device.path.display()
                );
                return Ok((device.id, sector));
            }
        }
        Err(StartupError::NoBootableDevice)
    }
}
