//! Headless frontend: boots the machine without a window, runs a bounded
//! number of instructions and dumps the machine state as JSON. Useful for
//! scripted runs and CI.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use remu_pc::{DiskSet, GlyphFont, Machine};

#[derive(Parser)]
#[command(name = "remu-cli", about = "Headless real-mode x86 machine runner")]
struct Args {
    /// Attach a disk image as a fixed disk (repeatable; ids from 0x80)
    #[arg(long = "hdd", value_name = "IMAGE")]
    hdd: Vec<PathBuf>,

    /// Attach a disk image as removable media (repeatable; ids from 0x00)
    #[arg(long = "fdd", value_name = "IMAGE")]
    fdd: Vec<PathBuf>,

    /// PSF1 glyph font used by the text-mode compositor
    #[arg(long, default_value = "font.psf")]
    font: PathBuf,

    /// Maximum number of instructions to execute (stops early on HLT)
    #[arg(long, default_value_t = 10_000)]
    steps: u64,

    /// Dump machine state to this file as JSON
    #[arg(long, default_value = "state.json")]
    save: String,

    /// Print registers after every instruction
    #[arg(long, default_value_t = false)]
    debug: bool,

    /// Suppress the run summary (still writes --save)
    #[arg(long, default_value_t = false)]
    quiet: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut disks = DiskSet::new();
    for path in &args.fdd {
        disks.attach_removable(path)?;
    }
    for path in &args.hdd {
        disks.attach_fixed(path)?;
    }

    let font = GlyphFont::load(&args.font)
        .with_context(|| format!("loading font {}", args.font.display()))?;
    let mut machine = Machine::boot(disks, font)?;

    let mut executed = 0u64;
    for _ in 0..args.steps {
        if machine.halted() {
            break;
        }
        machine.step().context("emulation stopped")?;
        executed += 1;
        if args.debug {
            println!(
                "step {}: {}",
                executed,
                serde_json::to_string(machine.registers())?
            );
        }
    }

    let mut frame = Machine::new_frame();
    machine.render(&mut frame);

    if !args.quiet {
        println!(
            "Executed {} instruction(s); halted: {}; cursor {:?}",
            executed,
            machine.halted(),
            machine.cursor()
        );
        println!("Produced frame {}x{}", frame.width, frame.height);
        let dump_len = std::cmp::min(8, frame.pixels.len());
        let mut out = String::new();
        for px in &frame.pixels[..dump_len] {
            out.push_str(&format!("{:08X} ", px));
        }
        println!("First {} pixels: {}", dump_len, out);
    }

    let state = machine.save_state();
    let mut f = File::create(&args.save)?;
    write!(f, "{}", serde_json::to_string_pretty(&state)?)?;

    Ok(())
}
