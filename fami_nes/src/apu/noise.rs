use super::units::{Divider, Envelope, LengthCounter};
use bit_field::BitField;

const PERIOD: [usize; 16] = [
    4, 8, 16, 32, 64, 96, 128, 160, 202, 254, 380, 508, 762, 1016, 2034, 4068,
];

#[derive(Debug)]
pub struct Noise {
    length: LengthCounter,
    envelope: Envelope,

    timer: Divider,
    lfsr: u16,
    tap: usize,
}

impl Noise {
    pub fn new() -> Self {
        Self {
            length: LengthCounter::new(),
            envelope: Envelope::new(),

            timer: Divider::new(),
            lfsr: 1,
            tap: 1,
        }
    }
}

impl super::Channel for Noise {
    fn sample(&mut self) -> u8 {
        self.envelope.volume() * self.length.count() * (!self.lfsr.get_bit(0) as u8)
    }

    fn tick(&mut self) {
        if self.timer.tick() {
            let feedback = self.lfsr.get_bit(0) ^ self.lfsr.get_bit(self.tap);
            self.lfsr >>= 1;
            self.lfsr.set_bit(14, feedback);
        }
    }

    fn tick_len(&mut self) {
        self.length.tick();
    }

    fn tick_env(&mut self) {
        self.envelope.tick();
    }

    fn write_reg0(&mut self, data: u8) {
        self.length.set_halt(data.get_bit(5));
        self.envelope.load(data.get_bits(0..6));
    }

    fn write_reg1(&mut self, _: u8) {}

    fn write_reg2(&mut self, data: u8) {
        // mode flag picks the short-sequence tap at bit 6
        self.tap = if data.get_bit(7) { 6 } else { 1 };
        self.timer.set_period(PERIOD[data.get_bits(0..4) as usize]);
    }

    fn write_reg3(&mut self, data: u8) {
        self.length.load(data);
        self.envelope.restart();
    }

    fn set_enable(&mut self, enable: bool) {
        self.length.set_enable(enable);
    }

    fn enabled(&self) -> bool {
        self.length.count() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::super::Channel;
    use super::*;

    #[test]
    fn lfsr_runs_the_long_sequence() {
        let mut n = Noise::new();
        n.set_enable(true);
        n.write_reg0(0b0001_1111);
        n.write_reg2(0x00); // shortest period, long mode
        n.write_reg3(0x08);

        // the 15-bit register must not get stuck and must stay nonzero
        let mut seen = std::collections::HashSet::new();
        for _ in 0..40000 {
            n.tick();
            assert_ne!(n.lfsr, 0);
            seen.insert(n.lfsr);
        }
        assert!(seen.len() > 1000, "long sequence covers most states");
    }

    #[test]
    fn short_mode_has_a_short_cycle() {
        let mut n = Noise::new();
        n.write_reg2(0x80); // tap 6

        let start = {
            for _ in 0..5 {
                n.tick();
            }
            n.lfsr
        };

        // the 93-step sequence must revisit the start state quickly
        let mut revisited = false;
        for _ in 0..1000 {
            n.tick();
            if n.lfsr == start {
                revisited = true;
                break;
            }
        }
        assert!(revisited);
    }
}
