//! BIOS interrupt services.
//!
//! Software interrupts are dispatched here instead of through an interrupt
//! vector table in guest memory: the machine emulates the narrow slice of
//! firmware the boot program relies on. Unknown vectors and unimplemented
//! sub-services are no-ops.
//!
//! Implemented: INT 10h (video), sub-service AH=0Eh teletype output, which
//! writes one character at the cursor and advances it with conventional
//! wrap and scroll behavior.

use log::debug;
use remu_core::cpu_386::{MemoryBus, Reg8, Registers};
use serde::{Deserialize, Serialize};

use crate::memory::PhysicalMemory;
use crate::video::{TEXT_COLUMNS, TEXT_ROWS};
use crate::VIDEO_MEMORY_ADDR;

/// Video services vector.
pub const INT_VIDEO: u8 = 0x10;

/// Teletype output sub-service (AH selector).
const VIDEO_TELETYPE: u8 = 0x0E;

/// Attribute used for teletype output and blanked lines: light gray on black.
pub const DEFAULT_ATTRIBUTE: u8 = 0x07;

/// Text cursor, mutated only by the teletype service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorPosition {
    pub col: u8,
    pub row: u8,
}

/// Firmware service state.
#[derive(Debug, Default)]
pub struct Bios {
    cursor: CursorPosition,
}

impl Bios {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> CursorPosition {
        self.cursor
    }

    /// Restore the cursor (snapshot load).
    pub fn set_cursor(&mut self, cursor: CursorPosition) {
        self.cursor = cursor;
    }

    /// Perform the firmware service for a software interrupt vector.
    pub fn dispatch(&mut self, vector: u8, regs: &mut Registers, mem: &mut PhysicalMemory) {
        match vector {
            INT_VIDEO => self.video_services(regs, mem),
            other => debug!("ignoring INT {:#04x}", other),
        }
    }

    /// INT 10h: sub-service selected by AH.
    fn video_services(&mut self, regs: &mut Registers, mem: &mut PhysicalMemory) {
        match regs.get8(Reg8::AH) {
            VIDEO_TELETYPE => self.teletype(regs.get8(Reg8::AL), mem),
            other => debug!("ignoring INT 10h sub-service {:#04x}", other),
        }
    }

    /// Write one character at the cursor with the default attribute, then
    /// advance: wrap the column at 80, scroll up at row 25.
    fn teletype(&mut self, ch: u8, mem: &mut PhysicalMemory) {
        let cell = self.cursor.row as u32 * TEXT_COLUMNS as u32 + self.cursor.col as u32;
        let addr = VIDEO_MEMORY_ADDR + cell * 2;
        mem.write(addr, ch);
        mem.write(addr + 1, DEFAULT_ATTRIBUTE);

        self.cursor.col += 1;
        if self.cursor.col as usize >= TEXT_COLUMNS {
            self.cursor.col = 0;
            self.cursor.row += 1;
            if self.cursor.row as usize >= TEXT_ROWS {
                Self::scroll_up(mem);
                self.cursor.row = TEXT_ROWS as u8 - 1;
            }
        }
    }

    /// Shift the text window up one line and blank the bottom row.
    fn scroll_up(mem: &mut PhysicalMemory) {
        let line_bytes = TEXT_COLUMNS as u32 * 2;
        let moved = line_bytes * (TEXT_ROWS as u32 - 1);
        for offset in 0..moved {
            let byte = mem.read(VIDEO_MEMORY_ADDR + line_bytes + offset);
            mem.write(VIDEO_MEMORY_ADDR + offset, byte);
        }
        let bottom = VIDEO_MEMORY_ADDR + moved;
        for col in 0..TEXT_COLUMNS as u32 {
            mem.write(bottom + col * 2, b' ');
            mem.write(bottom + col * 2 + 1, DEFAULT_ATTRIBUTE);
        }
    }
}
