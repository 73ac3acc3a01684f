//! Windowed frontend: presents the machine's framebuffer and feeds it the
//! shutdown signal.
//!
//! One frame = poll the window's event queue (non-blocking) -> execute one
//! instruction if the CPU is not halted -> recomposite -> present. Closing
//! the window (or Escape) ends the run between frames; dropping the machine
//! releases its device handles.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use minifb::{Key, ScaleMode, Window, WindowOptions};
use remu_pc::{DiskSet, GlyphFont, Machine, FB_HEIGHT, FB_WIDTH};

#[derive(Parser)]
#[command(name = "remu", about = "Real-mode x86 machine emulator")]
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

    let mut window = Window::new(
        "Remu",
        FB_WIDTH,
        FB_HEIGHT,
        WindowOptions {
            resize: true,
            scale_mode: ScaleMode::AspectRatioStretch,
            ..WindowOptions::default()
        },
    )
    .context("creating emulator window")?;

    let mut frame = Machine::new_frame();

    while window.is_open() && !window.is_key_down(Key::Escape) {
        if !machine.halted() {
            machine.step().context("emulation stopped")?;
        }
        machine.render(&mut frame);
        window
            .update_with_buffer(&frame.pixels, FB_WIDTH, FB_HEIGHT)
            .context("presenting frame")?;
    }

    Ok(())
}
