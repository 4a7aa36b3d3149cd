use bit_field::BitField;

mod noise;
mod pulse;
mod units;

use noise::Noise;
use pulse::Pulse;
use units::{FrameCounter, Step};

trait Channel {
    fn sample(&mut self) -> u8;

    fn tick(&mut self);
    fn tick_len(&mut self);
    fn tick_env(&mut self);

    fn write_reg0(&mut self, data: u8);
    fn write_reg1(&mut self, data: u8);
    fn write_reg2(&mut self, data: u8);
    fn write_reg3(&mut self, data: u8);

    fn set_enable(&mut self, enable: bool);
    fn enabled(&self) -> bool;
}

pub struct Apu {
    frame: FrameCounter,
    pulse1: Pulse,
    pulse2: Pulse,
    noise: Noise,

    cycles: usize,
    output: f32,
}

impl Apu {
    pub fn new() -> Self {
        Self {
            frame: FrameCounter::new(),
            pulse1: Pulse::new(false),
            pulse2: Pulse::new(true),
            noise: Noise::new(),

            cycles: 0,
            output: 0.0,
        }
    }

    /// One CPU cycle; the sequencers run at half that rate.
    pub fn tick(&mut self) {
        self.cycles += 1;
        if self.cycles % 2 == 0 {
            let step = self.frame.tick();
            self.frame_tick(step);

            self.pulse1.tick();
            self.pulse2.tick();
            self.noise.tick();
        }

        let pulse_out = PULSE_TABLE[(self.pulse1.sample() + self.pulse2.sample()) as usize];
        let tnd_out = TND_TABLE[self.noise.sample() as usize * 2];
        self.output = pulse_out + tnd_out;
    }

    fn frame_tick(&mut self, step: Step) {
        if step.contains(Step::LENGTH) {
            self.pulse1.tick_len();
            self.pulse2.tick_len();
            self.noise.tick_len();
        }
        if step.contains(Step::ENVELOPE) {
            self.pulse1.tick_env();
            self.pulse2.tick_env();
            self.noise.tick_env();
        }
    }

    pub fn reset(&mut self) {
        self.write(0x4015, 0x00);
    }

    /// The rolling mixed sample, for the host to pull at its own rate.
    pub fn output(&self) -> f32 {
        self.output
    }

    pub fn read(&self, addr: u16) -> u8 {
        match addr {
            0x4015 => {
                let mut data = 0;
                data.set_bit(6, self.frame.irq());
                data.set_bit(2, self.noise.enabled());
                data.set_bit(1, self.pulse2.enabled());
                data.set_bit(0, self.pulse1.enabled());
                data
            }
            _ => 0x00,
        }
    }

    pub fn write(&mut self, addr: u16, data: u8) {
        match addr {
            0x4000 => self.pulse1.write_reg0(data),
            0x4001 => self.pulse1.write_reg1(data),
            0x4002 => self.pulse1.write_reg2(data),
            0x4003 => self.pulse1.write_reg3(data),

            0x4004 => self.pulse2.write_reg0(data),
            0x4005 => self.pulse2.write_reg1(data),
            0x4006 => self.pulse2.write_reg2(data),
            0x4007 => self.pulse2.write_reg3(data),

            0x400c => self.noise.write_reg0(data),
            0x400d => self.noise.write_reg1(data),
            0x400e => self.noise.write_reg2(data),
            0x400f => self.noise.write_reg3(data),

            0x4015 => {
                self.noise.set_enable(data.get_bit(2));
                self.pulse2.set_enable(data.get_bit(1));
                self.pulse1.set_enable(data.get_bit(0));
            }
            0x4017 => {
                self.frame.load(data);
                if data.get_bit(7) {
                    self.frame_tick(Step::LENGTH | Step::ENVELOPE);
                }
            }
            _ => {}
        }
    }
}

impl Default for Apu {
    fn default() -> Self {
        Self::new()
    }
}

lazy_static::lazy_static! {
    static ref PULSE_TABLE: [f32; 31] = {
        let mut table = [0.0f32; 31];
        for (n, v) in table.iter_mut().enumerate().skip(1) {
            *v = 95.52 / (8128.0 / n as f32 + 100.0);
        }
        table
    };

    static ref TND_TABLE: [f32; 203] = {
        let mut table = [0.0f32; 203];
        for (n, v) in table.iter_mut().enumerate().skip(1) {
            *v = 163.67 / (24329.0 / n as f32 + 100.0);
        }
        table
    };
}
