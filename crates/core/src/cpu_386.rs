//! Real-mode 386-style CPU core.
//!
//! This module provides a reusable interpreter for the instruction subset the
//! machine boots with: register-immediate moves in all three operand widths,
//! the operand-size override prefix, short relative jumps, software
//! interrupts, NOP and HLT. The CPU is generic over the [`MemoryBus`] trait so
//! any system (or test harness) can supply its own physical address space.
//!
//! Register storage follows the 80386 layout: eight 32-bit general registers,
//! each with overlapping 16-bit and (for the first four) 8-bit views. The
//! overlap is modeled with masked accessors over a single `u32` backing value
//! rather than overlapping memory, so a sub-field write provably leaves the
//! owning register's remaining bits untouched.

use log::trace;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Memory interface trait for the CPU.
///
/// Systems using the CPU implement byte-level access; the multi-byte readers
/// and writers are provided little-endian compositions of those, so immediate
/// operands are never decoded through raw buffer casts.
pub trait MemoryBus {
    /// Read a byte from physical memory at the given address.
    fn read(&self, addr: u32) -> u8;

    /// Write a byte to physical memory at the given address.
    fn write(&mut self, addr: u32, val: u8);

    /// Read a little-endian 16-bit value.
    fn read_u16(&self, addr: u32) -> u16 {
        u16::from_le_bytes([self.read(addr), self.read(addr.wrapping_add(1))])
    }

    /// Read a little-endian 32-bit value.
    fn read_u32(&self, addr: u32) -> u32 {
        u32::from_le_bytes([
            self.read(addr),
            self.read(addr.wrapping_add(1)),
            self.read(addr.wrapping_add(2)),
            self.read(addr.wrapping_add(3)),
        ])
    }

    /// Write a little-endian 16-bit value.
    fn write_u16(&mut self, addr: u32, val: u16) {
        let bytes = val.to_le_bytes();
        self.write(addr, bytes[0]);
        self.write(addr.wrapping_add(1), bytes[1]);
    }

    /// Write a little-endian 32-bit value.
    fn write_u32(&mut self, addr: u32, val: u32) {
        let bytes = val.to_le_bytes();
        for (i, &b) in bytes.iter().enumerate() {
            self.write(addr.wrapping_add(i as u32), b);
        }
    }
}

/// 8-bit register views, in x86 encoding order (`opcode & 7` for B0-B7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reg8 {
    AL,
    CL,
    DL,
    BL,
    AH,
    CH,
    DH,
    BH,
}

impl Reg8 {
    /// Decode from the low three opcode bits.
    pub fn from_encoding(bits: u8) -> Self {
        match bits & 0x07 {
            0 => Reg8::AL,
            1 => Reg8::CL,
            2 => Reg8::DL,
            3 => Reg8::BL,
            4 => Reg8::AH,
            5 => Reg8::CH,
            6 => Reg8::DH,
            _ => Reg8::BH,
        }
    }

    /// Mnemonic name for tracing.
    pub fn name(&self) -> &'static str {
        match self {
            Reg8::AL => "AL",
            Reg8::CL => "CL",
            Reg8::DL => "DL",
            Reg8::BL => "BL",
            Reg8::AH => "AH",
            Reg8::CH => "CH",
            Reg8::DH => "DH",
            Reg8::BH => "BH",
        }
    }

    /// The 32-bit register owning this view, and whether it is the high byte.
    fn backing(&self) -> (Reg32, bool) {
        match self {
            Reg8::AL => (Reg32::EAX, false),
            Reg8::CL => (Reg32::ECX, false),
            Reg8::DL => (Reg32::EDX, false),
            Reg8::BL => (Reg32::EBX, false),
            Reg8::AH => (Reg32::EAX, true),
            Reg8::CH => (Reg32::ECX, true),
            Reg8::DH => (Reg32::EDX, true),
            Reg8::BH => (Reg32::EBX, true),
        }
    }
}

/// 16-bit register views, in x86 encoding order (`opcode & 7` for B8-BF).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reg16 {
    AX,
    CX,
    DX,
    BX,
    SP,
    BP,
    SI,
    DI,
}

impl Reg16 {
    /// Decode from the low three opcode bits.
    pub fn from_encoding(bits: u8) -> Self {
        match bits & 0x07 {
            0 => Reg16::AX,
            1 => Reg16::CX,
            2 => Reg16::DX,
            3 => Reg16::BX,
            4 => Reg16::SP,
            5 => Reg16::BP,
            6 => Reg16::SI,
            _ => Reg16::DI,
        }
    }

    /// Mnemonic name for tracing.
    pub fn name(&self) -> &'static str {
        match self {
            Reg16::AX => "AX",
            Reg16::CX => "CX",
            Reg16::DX => "DX",
            Reg16::BX => "BX",
            Reg16::SP => "SP",
            Reg16::BP => "BP",
            Reg16::SI => "SI",
            Reg16::DI => "DI",
        }
    }

    /// The 32-bit register owning this view.
    fn backing(&self) -> Reg32 {
        match self {
            Reg16::AX => Reg32::EAX,
            Reg16::CX => Reg32::ECX,
            Reg16::DX => Reg32::EDX,
            Reg16::BX => Reg32::EBX,
            Reg16::SP => Reg32::ESP,
            Reg16::BP => Reg32::EBP,
            Reg16::SI => Reg32::ESI,
            Reg16::DI => Reg32::EDI,
        }
    }
}

/// Full 32-bit general registers, in x86 encoding order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reg32 {
    EAX,
    ECX,
    EDX,
    EBX,
    ESP,
    EBP,
    ESI,
    EDI,
}

impl Reg32 {
    /// Decode from the low three opcode bits.
    pub fn from_encoding(bits: u8) -> Self {
        match bits & 0x07 {
            0 => Reg32::EAX,
            1 => Reg32::ECX,
            2 => Reg32::EDX,
            3 => Reg32::EBX,
            4 => Reg32::ESP,
            5 => Reg32::EBP,
            6 => Reg32::ESI,
            _ => Reg32::EDI,
        }
    }

    /// Mnemonic name for tracing.
    pub fn name(&self) -> &'static str {
        match self {
            Reg32::EAX => "EAX",
            Reg32::ECX => "ECX",
            Reg32::EDX => "EDX",
            Reg32::EBX => "EBX",
            Reg32::ESP => "ESP",
            Reg32::EBP => "EBP",
            Reg32::ESI => "ESI",
            Reg32::EDI => "EDI",
        }
    }
}

/// CPU register file.
///
/// The segment selectors are architectural state only: real-mode address
/// computation in this machine is flat, so they are stored but never combined
/// into physical addresses. `eflags` keeps its reserved bit 1 set and is
/// otherwise unused by the implemented instruction subset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers {
    pub eax: u32,
    pub ecx: u32,
    pub edx: u32,
    pub ebx: u32,
    pub esp: u32,
    pub ebp: u32,
    pub esi: u32,
    pub edi: u32,

    /// Instruction pointer (physical address in the flat space).
    pub eip: u32,
    /// Status flags; reserved bit 1 always set.
    pub eflags: u32,

    // Segment selectors, stored only.
    pub cs: u16,
    pub ds: u16,
    pub es: u16,
    pub ss: u16,
}

impl Registers {
    pub fn new() -> Self {
        Self {
            eax: 0,
            ecx: 0,
            edx: 0,
            ebx: 0,
            esp: 0,
            ebp: 0,
            esi: 0,
            edi: 0,
            eip: 0,
            eflags: 0x0000_0002,
            cs: 0,
            ds: 0,
            es: 0,
            ss: 0,
        }
    }

    fn gpr(&self, reg: Reg32) -> u32 {
        match reg {
            Reg32::EAX => self.eax,
            Reg32::ECX => self.ecx,
            Reg32::EDX => self.edx,
            Reg32::EBX => self.ebx,
            Reg32::ESP => self.esp,
            Reg32::EBP => self.ebp,
            Reg32::ESI => self.esi,
            Reg32::EDI => self.edi,
        }
    }

    fn gpr_mut(&mut self, reg: Reg32) -> &mut u32 {
        match reg {
            Reg32::EAX => &mut self.eax,
            Reg32::ECX => &mut self.ecx,
            Reg32::EDX => &mut self.edx,
            Reg32::EBX => &mut self.ebx,
            Reg32::ESP => &mut self.esp,
            Reg32::EBP => &mut self.ebp,
            Reg32::ESI => &mut self.esi,
            Reg32::EDI => &mut self.edi,
        }
    }

    /// Read an 8-bit view.
    pub fn get8(&self, reg: Reg8) -> u8 {
        let (owner, high) = reg.backing();
        let val = self.gpr(owner);
        if high {
            ((val >> 8) & 0xFF) as u8
        } else {
            (val & 0xFF) as u8
        }
    }

    /// Write an 8-bit view, leaving the owning register's other 24 bits
    /// unchanged.
    pub fn set8(&mut self, reg: Reg8, val: u8) {
        let (owner, high) = reg.backing();
        let slot = self.gpr_mut(owner);
        if high {
            *slot = (*slot & 0xFFFF_00FF) | ((val as u32) << 8);
        } else {
            *slot = (*slot & 0xFFFF_FF00) | (val as u32);
        }
    }

    /// Read a 16-bit view.
    pub fn get16(&self, reg: Reg16) -> u16 {
        (self.gpr(reg.backing()) & 0xFFFF) as u16
    }

    /// Write a 16-bit view, preserving the owning register's upper 16 bits.
    pub fn set16(&mut self, reg: Reg16, val: u16) {
        let slot = self.gpr_mut(reg.backing());
        *slot = (*slot & 0xFFFF_0000) | (val as u32);
    }

    /// Read a full 32-bit register.
    pub fn get32(&self, reg: Reg32) -> u32 {
        self.gpr(reg)
    }

    /// Write a full 32-bit register.
    pub fn set32(&mut self, reg: Reg32, val: u32) {
        *self.gpr_mut(reg) = val;
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of a successfully decoded and executed instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepEvent {
    /// An ordinary instruction ran to completion.
    Executed,
    /// A software interrupt was raised; the owning machine dispatches the
    /// vector against its firmware emulation. `eip` already points past the
    /// INT instruction.
    Interrupt(u8),
    /// The CPU is halted; no state was touched (the HLT instruction itself
    /// reports this from the step that executes it).
    Halted,
}

/// Fatal decode failure. The run ends; there is no guest-level fault
/// delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unsupported opcode {opcode:#04x} at {addr:#07x}")]
    UnsupportedOpcode { opcode: u8, addr: u32 },
}

/// Real-mode 386-subset CPU state and execution engine.
///
/// Generic over [`MemoryBus`] so the machine supplies its physical memory and
/// tests supply [`VecMemory`].
#[derive(Debug)]
pub struct Cpu386<M: MemoryBus> {
    /// Register file.
    pub regs: Registers,

    /// Memory interface.
    pub memory: M,

    /// Total cycles executed (approximate instruction costs).
    pub cycles: u64,

    /// One-shot operand-size override. Set by the 0x66 prefix, consumed and
    /// cleared by exactly the next size-sensitive instruction; instructions
    /// that do not care about operand size leave it pending.
    operand_size_override: bool,

    /// Halt latch. Once set, `step` returns [`StepEvent::Halted`] without
    /// fetching; the render loop outside keeps running.
    halted: bool,
}

impl<M: MemoryBus> Cpu386<M> {
    /// Create a new CPU with the given memory interface.
    pub fn new(memory: M) -> Self {
        Self {
            regs: Registers::new(),
            memory,
            cycles: 0,
            operand_size_override: false,
            halted: false,
        }
    }

    /// Reset registers, prefix state and the halt latch (preserves memory).
    pub fn reset(&mut self) {
        self.regs = Registers::new();
        self.cycles = 0;
        self.operand_size_override = false;
        self.halted = false;
    }

    /// Check if the CPU is halted.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// True while a 0x66 prefix is pending consumption.
    pub fn operand_size_override(&self) -> bool {
        self.operand_size_override
    }

    /// Fetch, decode and execute one instruction.
    ///
    /// Every opcode's length is known at decode time, so each family handler
    /// advances `eip` by its fixed length (or by the jump displacement) with
    /// no backtracking. Unknown opcodes are a fatal [`DecodeError`].
    pub fn step(&mut self) -> Result<StepEvent, DecodeError> {
        if self.halted {
            return Ok(StepEvent::Halted);
        }

        let pc = self.regs.eip;
        let opcode = self.memory.read(pc);

        match opcode {
            0x66 => Ok(self.exec_operand_size_prefix(pc)),
            0x90 => Ok(self.exec_nop(pc)),
            0xB0..=0xB7 => Ok(self.exec_mov_r8_imm8(opcode, pc)),
            0xB8..=0xBF => Ok(self.exec_mov_r32_imm(opcode, pc)),
            0xCD => Ok(self.exec_int(pc)),
            0xEB => Ok(self.exec_jmp_rel8(pc)),
            0xF4 => Ok(self.exec_hlt(pc)),
            _ => Err(DecodeError::UnsupportedOpcode { opcode, addr: pc }),
        }
    }

    fn exec_nop(&mut self, pc: u32) -> StepEvent {
        trace!("NOP");
        self.regs.eip = pc.wrapping_add(1);
        self.cycles += 3;
        StepEvent::Executed
    }

    fn exec_operand_size_prefix(&mut self, pc: u32) -> StepEvent {
        self.operand_size_override = true;
        self.regs.eip = pc.wrapping_add(1);
        self.cycles += 2;
        StepEvent::Executed
    }

    fn exec_mov_r8_imm8(&mut self, opcode: u8, pc: u32) -> StepEvent {
        let reg = Reg8::from_encoding(opcode);
        let val = self.memory.read(pc.wrapping_add(1));
        self.regs.set8(reg, val);
        trace!("MOV {}, {:#04x}", reg.name(), val);
        self.regs.eip = pc.wrapping_add(2);
        self.cycles += 4;
        StepEvent::Executed
    }

    /// MOV into a 32-bit register: imm16 into the low word when unprefixed
    /// (upper 16 bits preserved), imm32 into the full register when the
    /// operand-size override is pending. Consumes the prefix.
    fn exec_mov_r32_imm(&mut self, opcode: u8, pc: u32) -> StepEvent {
        if self.operand_size_override {
            let reg = Reg32::from_encoding(opcode);
            let val = self.memory.read_u32(pc.wrapping_add(1));
            self.regs.set32(reg, val);
            trace!("MOV {}, {:#010x}", reg.name(), val);
            self.regs.eip = pc.wrapping_add(5);
            self.operand_size_override = false;
        } else {
            let reg = Reg16::from_encoding(opcode);
            let val = self.memory.read_u16(pc.wrapping_add(1));
            self.regs.set16(reg, val);
            trace!("MOV {}, {:#06x}", reg.name(), val);
            self.regs.eip = pc.wrapping_add(3);
        }
        self.cycles += 4;
        StepEvent::Executed
    }

    fn exec_int(&mut self, pc: u32) -> StepEvent {
        let vector = self.memory.read(pc.wrapping_add(1));
        trace!("INT {:#04x}", vector);
        self.regs.eip = pc.wrapping_add(2);
        self.cycles += 51;
        StepEvent::Interrupt(vector)
    }

    fn exec_jmp_rel8(&mut self, pc: u32) -> StepEvent {
        // Displacement is relative to the end of the 2-byte instruction;
        // sign-extend it before the add so backward jumps wrap correctly.
        let disp = self.memory.read(pc.wrapping_add(1)) as i8;
        let target = pc.wrapping_add(2).wrapping_add(disp as i32 as u32);
        if disp == -2 {
            trace!("JMP $");
        } else {
            trace!("JMP {:+}", disp as i32 + 2);
        }
        self.regs.eip = target;
        self.cycles += 15;
        StepEvent::Executed
    }

    fn exec_hlt(&mut self, pc: u32) -> StepEvent {
        trace!("HLT");
        self.halted = true;
        self.regs.eip = pc.wrapping_add(1);
        self.cycles += 2;
        StepEvent::Halted
    }
}

/// Flat byte-array memory used by unit tests and benches.
///
/// Covers the full 1 MiB real-mode address space; out-of-range reads return
/// open-bus 0xFF and out-of-range writes are dropped.
#[derive(Debug)]
pub struct VecMemory {
    bytes: Vec<u8>,
}

impl VecMemory {
    pub fn new() -> Self {
        Self {
            bytes: vec![0; 1024 * 1024],
        }
    }

    /// Copy a program image into memory at the given address.
    pub fn load_program(&mut self, addr: u32, program: &[u8]) {
        let start = addr as usize;
        self.bytes[start..start + program.len()].copy_from_slice(program);
    }
}

impl Default for VecMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBus for VecMemory {
    fn read(&self, addr: u32) -> u8 {
        self.bytes.get(addr as usize).copied().unwrap_or(0xFF)
    }

    fn write(&mut self, addr: u32, val: u8) {
        if let Some(slot) = self.bytes.get_mut(addr as usize) {
            *slot = val;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cpu_with_program(addr: u32, program: &[u8]) -> Cpu386<VecMemory> {
        let mut mem = VecMemory::new();
        mem.load_program(addr, program);
        let mut cpu = Cpu386::new(mem);
        cpu.regs.eip = addr;
        cpu
    }

    #[test]
    fn test_cpu_initialization() {
        let cpu = Cpu386::new(VecMemory::new());
        assert_eq!(cpu.regs.eax, 0);
        assert_eq!(cpu.regs.eip, 0);
        assert_eq!(cpu.regs.eflags & 0x0002, 0x0002); // Reserved bit
        assert!(!cpu.is_halted());
    }

    #[test]
    fn test_reset_preserves_memory() {
        let mut cpu = cpu_with_program(0x100, &[0x90]);
        cpu.regs.eax = 0x1234_5678;
        cpu.step().unwrap();
        cpu.reset();
        assert_eq!(cpu.regs.eax, 0);
        assert_eq!(cpu.regs.eip, 0);
        assert_eq!(cpu.memory.read(0x100), 0x90);
    }

    #[test]
    fn test_nop_advances_eip() {
        let mut cpu = cpu_with_program(0x7C00, &[0x90]);
        assert_eq!(cpu.step(), Ok(StepEvent::Executed));
        assert_eq!(cpu.regs.eip, 0x7C01);
    }

    #[test]
    fn test_mov_imm8_targets_only_low_byte() {
        // MOV AL, 0x42 with garbage already in EAX
        let mut cpu = cpu_with_program(0x7C00, &[0xB0, 0x42]);
        cpu.regs.eax = 0xDEAD_BEEF;
        cpu.step().unwrap();
        assert_eq!(cpu.regs.eax, 0xDEAD_BE42);
        assert_eq!(cpu.regs.eip, 0x7C02);
    }

    #[test]
    fn test_mov_imm8_targets_only_high_byte() {
        // MOV AH, 0x0E
        let mut cpu = cpu_with_program(0x7C00, &[0xB4, 0x0E]);
        cpu.regs.eax = 0xDEAD_BEEF;
        cpu.step().unwrap();
        assert_eq!(cpu.regs.eax, 0xDEAD_0EEF);
    }

    #[test]
    fn test_mov_imm8_all_encodings() {
        let cases: [(u8, Reg8); 8] = [
            (0xB0, Reg8::AL),
            (0xB1, Reg8::CL),
            (0xB2, Reg8::DL),
            (0xB3, Reg8::BL),
            (0xB4, Reg8::AH),
            (0xB5, Reg8::CH),
            (0xB6, Reg8::DH),
            (0xB7, Reg8::BH),
        ];
        for (opcode, reg) in cases {
            let mut cpu = cpu_with_program(0x100, &[opcode, 0x5A]);
            cpu.step().unwrap();
            assert_eq!(cpu.regs.get8(reg), 0x5A, "opcode {:#04x}", opcode);
        }
    }

    #[test]
    fn test_mov_imm16_preserves_upper_half() {
        // MOV AX, 0x1234
        let mut cpu = cpu_with_program(0x7C00, &[0xB8, 0x34, 0x12]);
        cpu.regs.eax = 0xCAFE_0000;
        cpu.step().unwrap();
        assert_eq!(cpu.regs.eax, 0xCAFE_1234);
        assert_eq!(cpu.regs.eip, 0x7C03);
    }

    #[test]
    fn test_mov_imm32_with_prefix() {
        // 0x66 prefix, then MOV ECX, 0xAABBCCDD
        let mut cpu = cpu_with_program(0x7C00, &[0x66, 0xB9, 0xDD, 0xCC, 0xBB, 0xAA]);
        cpu.step().unwrap();
        assert!(cpu.operand_size_override());
        cpu.step().unwrap();
        assert_eq!(cpu.regs.ecx, 0xAABB_CCDD);
        assert_eq!(cpu.regs.eip, 0x7C06);
        assert!(!cpu.operand_size_override());
    }

    #[test]
    fn test_prefix_consumed_by_exactly_one_instruction() {
        // Prefixed full-width move, then an unprefixed one goes back to imm16.
        let mut cpu = cpu_with_program(
            0x100,
            &[
                0x66, 0xB8, 0x78, 0x56, 0x34, 0x12, // MOV EAX, 0x12345678
                0xBB, 0xCD, 0xAB, // MOV BX, 0xABCD
            ],
        );
        cpu.regs.ebx = 0xFFFF_0000;
        cpu.step().unwrap();
        cpu.step().unwrap();
        assert_eq!(cpu.regs.eax, 0x1234_5678);
        cpu.step().unwrap();
        assert_eq!(cpu.regs.ebx, 0xFFFF_ABCD);
    }

    #[test]
    fn test_prefix_survives_size_insensitive_instruction() {
        // A NOP between the prefix and the move does not consume it.
        let mut cpu = cpu_with_program(0x100, &[0x66, 0x90, 0xB8, 0x44, 0x33, 0x22, 0x11]);
        cpu.step().unwrap();
        cpu.step().unwrap();
        assert!(cpu.operand_size_override());
        cpu.step().unwrap();
        assert_eq!(cpu.regs.eax, 0x1122_3344);
        assert!(!cpu.operand_size_override());
    }

    #[test]
    fn test_int_yields_vector() {
        let mut cpu = cpu_with_program(0x7C00, &[0xCD, 0x10]);
        assert_eq!(cpu.step(), Ok(StepEvent::Interrupt(0x10)));
        assert_eq!(cpu.regs.eip, 0x7C02);
    }

    #[test]
    fn test_jmp_rel8_forward_and_backward() {
        let mut cpu = cpu_with_program(0x200, &[0xEB, 0x10]);
        cpu.step().unwrap();
        assert_eq!(cpu.regs.eip, 0x212);

        let mut cpu = cpu_with_program(0x200, &[0xEB, 0xF0]);
        cpu.step().unwrap();
        assert_eq!(cpu.regs.eip, 0x1F2);
    }

    #[test]
    fn test_jmp_rel8_self_loop() {
        // JMP $ (displacement -2) leaves eip where the instruction started.
        let mut cpu = cpu_with_program(0x7C00, &[0xEB, 0xFE]);
        cpu.step().unwrap();
        assert_eq!(cpu.regs.eip, 0x7C00);
        cpu.step().unwrap();
        assert_eq!(cpu.regs.eip, 0x7C00);
    }

    #[test]
    fn test_hlt_latches_and_freezes_state() {
        let mut cpu = cpu_with_program(0x7C00, &[0xF4, 0xB0, 0x99]);
        assert_eq!(cpu.step(), Ok(StepEvent::Halted));
        assert!(cpu.is_halted());
        assert_eq!(cpu.regs.eip, 0x7C01);

        // Further steps neither fetch nor mutate.
        let before = cpu.regs.clone();
        let cycles = cpu.cycles;
        for _ in 0..4 {
            assert_eq!(cpu.step(), Ok(StepEvent::Halted));
        }
        assert_eq!(cpu.regs, before);
        assert_eq!(cpu.cycles, cycles);
    }

    #[test]
    fn test_unsupported_opcode_is_fatal() {
        let mut cpu = cpu_with_program(0x7C00, &[0x0F]);
        assert_eq!(
            cpu.step(),
            Err(DecodeError::UnsupportedOpcode {
                opcode: 0x0F,
                addr: 0x7C00
            })
        );
    }

    #[test]
    fn test_registers_serde_roundtrip() {
        let mut regs = Registers::new();
        regs.eax = 0x1234_5678;
        regs.eip = 0x7C00;
        regs.ss = 0xB800;
        let json = serde_json::to_string(&regs).expect("serialize");
        let back: Registers = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(regs, back);
    }

    #[test]
    fn test_vec_memory_open_bus() {
        let mut mem = VecMemory::new();
        assert_eq!(mem.read(0x10_0000), 0xFF);
        mem.write(0x10_0000, 0x42); // dropped
        assert_eq!(mem.read(0x10_0000), 0xFF);
    }

    #[test]
    fn test_little_endian_helpers() {
        let mut mem = VecMemory::new();
        mem.write_u32(0x500, 0xAABB_CCDD);
        assert_eq!(mem.read(0x500), 0xDD);
        assert_eq!(mem.read(0x503), 0xAA);
        assert_eq!(mem.read_u16(0x500), 0xCCDD);
        assert_eq!(mem.read_u32(0x500), 0xAABB_CCDD);
    }
}
