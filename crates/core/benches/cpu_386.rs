use criterion::{criterion_group, criterion_main, Criterion};
use remu_core::cpu_386::{Cpu386, VecMemory};

/// Steps the CPU around a tight register-move loop, the hot path of the
/// interpreter.
fn bench_step_loop(c: &mut Criterion) {
    let mut mem = VecMemory::new();
    // MOV AL / MOV AX / NOP, then jump back to the start.
    mem.load_program(
        0x7C00,
        &[
            0xB0, 0x42, // MOV AL, 0x42
            0xB8, 0x34, 0x12, // MOV AX, 0x1234
            0x90, // NOP
            0xEB, 0xF8, // JMP -8 (back to 0x7C00)
        ],
    );
    let mut cpu = Cpu386::new(mem);
    cpu.regs.eip = 0x7C00;

    c.bench_function("cpu_386_step", |b| {
        b.iter(|| {
            cpu.step().expect("program contains no invalid opcodes");
        })
    });
}

criterion_group!(benches, bench_step_loop);
criterion_main!(benches);
