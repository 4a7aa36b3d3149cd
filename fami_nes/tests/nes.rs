//! End-to-end checks through the public surface only: a hand-assembled
//! ROM goes through the loader, the bus and the CPU.

use fami_nes::{Bus, Cartridge, Cpu, InputStates};

/// One 16KB PRG page, CHR RAM, mapper 0, program at $8000.
fn image_with(prg: &[u8]) -> Vec<u8> {
    let mut image = vec![0u8; 0x10 + 0x4000];
    image[..4].copy_from_slice(&[b'N', b'E', b'S', 0x1a]);
    image[4] = 1;
    image[0x10..0x10 + prg.len()].copy_from_slice(prg);
    image[0x10 + 0x3ffc] = 0x00;
    image[0x10 + 0x3ffd] = 0x80;
    image
}

fn boot(prg: &[u8]) -> (Bus, Cpu) {
    let cart = Cartridge::load(&image_with(prg)).expect("synthetic image loads");
    let mut bus = Bus::new(cart);
    let mut cpu = Cpu::default();
    bus.reset(&mut cpu);
    (bus, cpu)
}

#[test]
fn reset_loads_the_vector() {
    let (_, cpu) = boot(&[]);
    let s = cpu.state();
    assert_eq!(s.pc, 0x8000);
    assert_eq!(s.sp, 0xfd);
    assert_eq!(s.p.to_u8() & 0b0010_0000, 0b0010_0000);
}

#[test]
fn reset_outcome_ignores_prior_state() {
    let (mut bus, mut cpu) = boot(&[0xa9, 0x77, 0xaa, 0xa8]);

    // scramble registers by running a bit, then reset again
    for _ in 0..5 {
        cpu.step(&mut bus);
    }
    bus.reset(&mut cpu);

    let s = cpu.state();
    assert_eq!(s.pc, 0x8000);
    assert_eq!(s.sp, 0xfd);
    assert_eq!((s.a, s.x, s.y), (0, 0, 0));
}

#[test]
fn hand_assembled_sequence() {
    // LDA #$10; STA $00; LDX $00
    let (mut bus, mut cpu) = boot(&[0xa9, 0x10, 0x85, 0x00, 0xa6, 0x00]);

    cpu.step(&mut bus); // drain the reset stall
    cpu.step(&mut bus);
    cpu.step(&mut bus);
    cpu.step(&mut bus);

    let s = cpu.state();
    assert_eq!(s.a, 0x10);
    assert_eq!(s.x, 0x10);
    assert_eq!(bus.read(0x0000), 0x10);
    assert!(!s.p.z);
    assert!(!s.p.n);
    assert_eq!(s.pc, 0x8006);
}

#[test]
fn frames_come_out_of_the_clock_loop() {
    let (mut bus, mut cpu) = boot(&[0x4c, 0x00, 0x80]);

    let mut ticks = 0usize;
    while !bus.clock(&mut cpu) {
        ticks += 1;
        assert!(ticks < 341 * 262 * 2, "no frame signal");
    }

    assert_eq!(bus.ppu().display_buf().len(), 256 * 240 * 3);
}

#[test]
fn controllers_reach_the_program() {
    // strobe $4016, read one bit into A
    // LDA #$01; STA $4016; LDA $4016
    let (mut bus, mut cpu) = boot(&[0xa9, 0x01, 0x8d, 0x16, 0x40, 0xad, 0x16, 0x40]);

    bus.set_input0(InputStates {
        a: true,
        ..Default::default()
    });

    cpu.step(&mut bus); // reset stall
    cpu.step(&mut bus);
    cpu.step(&mut bus);
    cpu.step(&mut bus);
    assert_eq!(cpu.state().a, 0x01, "the A button comes out first");
}

#[test]
fn bad_images_produce_no_cartridge() {
    assert!(Cartridge::load(&[0; 4]).is_err());

    let mut image = image_with(&[]);
    image[0] = 0;
    assert!(Cartridge::load(&image).is_err());

    let mut image = image_with(&[]);
    image[4] = 4; // claims 64KB PRG, provides 16KB
    assert!(Cartridge::load(&image).is_err());
}
