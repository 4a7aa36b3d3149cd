use crate::apu::Apu;
use crate::cart::Cartridge;
use crate::cpu::Cpu;
use crate::ppu::Ppu;

mod dma;
mod joystick;

pub use joystick::InputStates;

use dma::Dma;
use joystick::Joystick;

const RAM_SIZE: usize = 0x800;

/// The memory-mapped system bus. Owns everything the CPU can see; the
/// CPU itself is handed in for clocking so the two sides can borrow each
/// other cleanly.
pub struct Bus {
    ram: Box<[u8; RAM_SIZE]>,
    ppu: Ppu,
    apu: Apu,
    cart: Cartridge,
    joystick: Joystick,
    dma: Dma,

    cycles: usize,
}

impl Bus {
    pub fn new(cart: Cartridge) -> Self {
        Self {
            ram: Box::new([0u8; RAM_SIZE]),
            ppu: Ppu::new(),
            apu: Apu::new(),
            cart,
            joystick: Joystick::default(),
            dma: Dma::default(),

            cycles: 0,
        }
    }

    pub fn reset(&mut self, cpu: &mut Cpu) {
        self.ppu.reset();
        self.apu.reset();
        self.dma.reset();
        self.cycles = 0;

        cpu.reset(self);
    }

    /// One master clock: the PPU ticks every cycle, the CPU (or an
    /// active DMA transfer) every third, and the PPU's NMI line is
    /// polled last so it is delivered exactly once per assertion.
    /// Returns true when a frame just finished.
    pub fn clock(&mut self, cpu: &mut Cpu) -> bool {
        self.ppu.tick(&mut self.cart);

        if self.cycles % 3 == 0 {
            self.apu.tick();

            if self.dma.active() {
                self.dma_tick();
            } else {
                cpu.clock(self);
            }
        }

        if self.ppu.consume_nmi() {
            cpu.nmi(self);
        }

        self.cycles += 1;
        self.ppu.consume_frame()
    }

    fn dma_tick(&mut self) {
        if self.dma.waiting() {
            // hold until the alignment cycle before the first transfer
            if self.cycles % 2 == 1 {
                self.dma.begin();
            }
        } else if self.cycles % 2 == 0 {
            let data = self.read(self.dma.source());
            self.dma.latch(data);
        } else {
            let (offset, data) = self.dma.transfer();
            self.ppu.write_oam(offset, data);
        }
    }

    pub fn read(&mut self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1fff => self.ram[addr as usize & 0x07ff],
            0x2000..=0x3fff => self.ppu.read(&self.cart, addr),
            0x4015 => self.apu.read(addr),
            0x4016..=0x4017 => self.joystick.read(addr),
            0x4020..=0xffff => self.cart.read(addr),
            _ => 0x00,
        }
    }

    pub fn write(&mut self, addr: u16, data: u8) {
        match addr {
            0x0000..=0x1fff => self.ram[addr as usize & 0x07ff] = data,
            0x2000..=0x3fff => self.ppu.write(&mut self.cart, addr, data),
            0x4014 => self.dma.start(data),
            0x4016 => self.joystick.strobe(),
            0x4000..=0x4013 | 0x4015 | 0x4017 => self.apu.write(addr, data),
            0x4020..=0xffff => self.cart.write(addr, data),
            _ => {}
        }
    }

    pub fn set_input0(&mut self, states: InputStates) {
        self.joystick.set_input0(states);
    }

    pub fn set_input1(&mut self, states: InputStates) {
        self.joystick.set_input1(states);
    }

    pub fn ppu(&self) -> &Ppu {
        &self.ppu
    }

    /// The APU's rolling mixed sample.
    pub fn audio_sample(&self) -> f32 {
        self.apu.output()
    }

    pub fn cycles(&self) -> usize {
        self.cycles
    }
}
