//! Real-mode PC machine.
//!
//! Wires the CPU core to the machine's physical memory, block devices,
//! firmware services and text-mode compositor. The whole machine state lives
//! in one owned [`Machine`] aggregate, so instances are independent and
//! directly testable.
//!
//! Power-on sequence: attach disk images to a [`DiskSet`], load a
//! [`GlyphFont`], then [`Machine::boot`] — which scans the fixed disks for a
//! signed boot sector, copies it to [`BOOT_SECTOR_ADDR`] and points the CPU
//! at it. The frontend then alternates [`Machine::step`] (one instruction)
//! with [`Machine::render`] (one composited frame).

mod bios;
mod disk;
mod font;
mod memory;
mod video;

pub use bios::{Bios, CursorPosition, DEFAULT_ATTRIBUTE, INT_VIDEO};
pub use disk::{BlockDevice, DiskSet, BOOT_SIGNATURE, FIRST_FIXED_ID, SECTOR_SIZE};
pub use font::{FontError, GlyphFont, GLYPH_HEIGHT, PSF1_MAGIC};
pub use memory::{PhysicalMemory, MEMORY_SIZE};
pub use video::{
    TextCompositor, VgaColor, FB_HEIGHT, FB_WIDTH, TEXT_COLUMNS, TEXT_ROWS, TEXT_WINDOW_BYTES,
};

use log::info;
use remu_core::cpu_386::{Cpu386, DecodeError, Reg8, Registers, StepEvent};
use remu_core::types::Frame;
use serde_json::Value;
use thiserror::Error;

/// Physical address the boot sector is copied to and entered at.
pub const BOOT_SECTOR_ADDR: u32 = 0x7C00;

/// Physical address of the 80x25 text-mode video window.
pub const VIDEO_MEMORY_ADDR: u32 = 0xB8000;

/// Fatal configuration failures detected before the first instruction runs.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("no bootable device")]
    NoBootableDevice,
    #[error("failed to open disk image {path}: {source}")]
    DiskOpen {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
    #[error("failed to read disk image {path}: {source}")]
    DiskRead {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
    #[error("too many devices of one class (maximum 128)")]
    DeviceLimit,
    #[error(transparent)]
    Font(#[from] FontError),
}

/// The emulated machine: CPU + memory, firmware, storage and video.
pub struct Machine {
    cpu: Cpu386<PhysicalMemory>,
    bios: Bios,
    disks: DiskSet,
    compositor: TextCompositor,
    boot_device: u8,
}

impl Machine {
    /// Power on: select the boot device, place its first sector at
    /// [`BOOT_SECTOR_ADDR`] and point the CPU at it with DL holding the boot
    /// device id. Fails (releasing every opened handle) if no fixed disk
    /// carries the boot signature.
    pub fn boot(mut disks: DiskSet, font: GlyphFont) -> Result<Self, StartupError> {
        let (boot_device, sector) = disks.select_boot()?;

        let mut memory = PhysicalMemory::new();
        memory.load(BOOT_SECTOR_ADDR, &sector);

        let mut cpu = Cpu386::new(memory);
        cpu.regs.eip = BOOT_SECTOR_ADDR;
        cpu.regs.set8(Reg8::DL, boot_device);
        info!(
            "boot sector resident at {:#07x}, entry from device {:#04x}",
            BOOT_SECTOR_ADDR, boot_device
        );

        Ok(Self {
            cpu,
            bios: Bios::new(),
            disks,
            compositor: TextCompositor::new(font),
            boot_device,
        })
    }

    /// Execute exactly one instruction, dispatching any software interrupt it
    /// raises to the firmware emulation. A no-op once halted.
    ///
    /// An unsupported opcode surfaces as a fatal [`DecodeError`]; the caller
    /// ends the run (dropping the machine releases its device handles).
    pub fn step(&mut self) -> Result<(), DecodeError> {
        match self.cpu.step()? {
            StepEvent::Interrupt(vector) => {
                self.bios
                    .dispatch(vector, &mut self.cpu.regs, &mut self.cpu.memory);
            }
            StepEvent::Executed | StepEvent::Halted => {}
        }
        Ok(())
    }

    /// Composite the video window into `frame` (created by [`Machine::new_frame`]).
    pub fn render(&self, frame: &mut Frame) {
        let vram = self.cpu.memory.window(VIDEO_MEMORY_ADDR, TEXT_WINDOW_BYTES);
        self.compositor.render(vram, &mut frame.pixels);
    }

    /// Allocate a frame with the machine's output geometry.
    pub fn new_frame() -> Frame {
        Frame::new(FB_WIDTH as u32, FB_HEIGHT as u32)
    }

    pub fn halted(&self) -> bool {
        self.cpu.is_halted()
    }

    pub fn boot_device(&self) -> u8 {
        self.boot_device
    }

    pub fn registers(&self) -> &Registers {
        &self.cpu.regs
    }

    pub fn cursor(&self) -> CursorPosition {
        self.bios.cursor()
    }

    pub fn cycles(&self) -> u64 {
        self.cpu.cycles
    }

    pub fn memory(&self) -> &PhysicalMemory {
        &self.cpu.memory
    }

    pub fn disks(&self) -> &DiskSet {
        &self.disks
    }

    /// Debug snapshot of the mutable machine state (registers, cursor,
    /// cycles). Memory and disk contents are deliberately excluded.
    pub fn save_state(&self) -> Value {
        serde_json::json!({
            "version": 1,
            "machine": "pc",
            "registers": self.cpu.regs,
            "cursor": self.bios.cursor(),
            "cycles": self.cpu.cycles,
        })
    }

    /// Restore a snapshot produced by [`Machine::save_state`].
    pub fn load_state(&mut self, v: &Value) -> Result<(), serde_json::Error> {
        let regs: Registers = serde_json::from_value(v["registers"].clone())?;
        let cursor: CursorPosition = serde_json::from_value(v["cursor"].clone())?;
        self.cpu.regs = regs;
        self.bios.set_cursor(cursor);
        if let Some(cycles) = v["cycles"].as_u64() {
            self.cpu.cycles = cycles;
        }
        Ok(())
    }
}
