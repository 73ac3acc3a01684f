use criterion::{criterion_group, criterion_main, Criterion};
use remu_pc::{GlyphFont, TextCompositor, FB_HEIGHT, FB_WIDTH, TEXT_WINDOW_BYTES};

fn checkerboard_font() -> GlyphFont {
    // PSF1 header + 256 glyphs of alternating scanlines.
    let mut data = vec![0x36, 0x04, 0x00, 16];
    for _ in 0..256 {
        for line in 0..16 {
            data.push(if line % 2 == 0 { 0xAA } else { 0x55 });
        }
    }
    GlyphFont::from_bytes(&data).expect("synthetic font is valid")
}

/// Composites a fully populated text screen, the per-frame hot path.
fn bench_full_screen(c: &mut Criterion) {
    let compositor = TextCompositor::new(checkerboard_font());
    let mut vram = vec![0u8; TEXT_WINDOW_BYTES];
    for (i, b) in vram.iter_mut().enumerate() {
        *b = if i % 2 == 0 { (i / 2 % 256) as u8 } else { 0x1E };
    }
    let mut pixels = vec![0u32; FB_WIDTH * FB_HEIGHT];

    c.bench_function("compositor_full_screen", |b| {
        b.iter(|| compositor.render(&vram, &mut pixels))
    });
}

criterion_group!(benches, bench_full_screen);
criterion_main!(benches);
