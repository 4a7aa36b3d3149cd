use fami_nes::{Bus, Cartridge, Cpu};

/// Frames to run headless before dumping state. Roughly ten seconds of
/// emulated time.
const FRAMES: usize = 600;

fn main() {
    let mut args = std::env::args();
    let program = args.next().unwrap_or_else(|| "fami".into());

    let path = match (args.next(), args.next()) {
        (Some(path), None) => path,
        _ => {
            eprintln!("usage: {} <rom.nes>", program);
            std::process::exit(1);
        }
    };

    let data = match std::fs::read(&path) {
        Ok(data) => data,
        Err(err) => {
            eprintln!("{}: {}", path, err);
            std::process::exit(1);
        }
    };

    let cart = match Cartridge::load(&data) {
        Ok(cart) => cart,
        Err(err) => {
            eprintln!("{}: {}", path, err);
            std::process::exit(1);
        }
    };

    let mut bus = Bus::new(cart);
    let mut cpu = Cpu::default();
    bus.reset(&mut cpu);

    let start = std::time::Instant::now();
    for _ in 0..FRAMES {
        while !bus.clock(&mut cpu) {}
    }
    let elapsed = start.elapsed();

    let s = cpu.state();
    println!(
        "ran {} frames in {:.2?} ({:.1} fps)",
        FRAMES,
        elapsed,
        FRAMES as f64 / elapsed.as_secs_f64()
    );
    println!(
        "CPU A:{:02X} X:{:02X} Y:{:02X} P:{:?} SP:{:02X} PC:{:04X}",
        s.a, s.x, s.y, s.p, s.sp, s.pc
    );
    let (line, dot) = bus.ppu().timing();
    let frame: u64 = bus.ppu().display_buf().iter().map(|&b| b as u64).sum();
    println!(
        "PPU line:{} dot:{} frame-sum:{:08x}  sample:{:.4}",
        line,
        dot,
        frame,
        bus.audio_sample()
    );
}
