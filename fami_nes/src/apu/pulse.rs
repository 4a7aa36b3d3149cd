use super::units::{Divider, Envelope, LengthCounter, Sweep};
use bit_field::BitField;

const DUTY: [[u8; 8]; 4] = [
    [0, 1, 0, 0, 0, 0, 0, 0],
    [0, 1, 1, 0, 0, 0, 0, 0],
    [0, 1, 1, 1, 1, 0, 0, 0],
    [1, 0, 0, 1, 1, 1, 1, 1],
];

#[derive(Debug)]
pub struct Pulse {
    length: LengthCounter,
    envelope: Envelope,
    sweep: Sweep,

    timer: Divider,
    duty: usize,
    step: usize,
}

impl Pulse {
    /// `channel2` selects the sweep unit's subtraction adjustment.
    pub fn new(channel2: bool) -> Self {
        Self {
            length: LengthCounter::new(),
            envelope: Envelope::new(),
            sweep: Sweep::new(channel2 as usize),

            timer: Divider::new(),
            duty: 0,
            step: 0,
        }
    }
}

impl super::Channel for Pulse {
    fn sample(&mut self) -> u8 {
        let wave = DUTY[self.duty][self.step];
        wave * self.envelope.volume() * self.length.count() * (!self.sweep.muting() as u8)
    }

    fn tick(&mut self) {
        if self.timer.tick() {
            self.step = (self.step + 1) % 8;
        }
    }

    fn tick_len(&mut self) {
        self.length.tick();
        self.sweep.tick(&mut self.timer);
    }

    fn tick_env(&mut self) {
        self.envelope.tick();
    }

    fn write_reg0(&mut self, data: u8) {
        self.duty = data.get_bits(6..8) as usize;
        self.length.set_halt(data.get_bit(5));
        self.envelope.load(data.get_bits(0..6));
    }

    fn write_reg1(&mut self, data: u8) {
        self.sweep.load(data);
    }

    fn write_reg2(&mut self, data: u8) {
        self.timer.set_period_lo(data);
    }

    fn write_reg3(&mut self, data: u8) {
        self.timer.set_period_hi(data);
        self.length.load(data);
        self.envelope.restart();
        self.step = 0;
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
    fn silent_without_a_length_counter() {
        let mut p = Pulse::new(false);
        p.write_reg0(0b1011_1111); // duty 2, halt, constant 15
        p.write_reg2(0x40);
        p.write_reg3(0x00); // length load blocked, channel disabled

        let heard = (0..2000).any(|_| {
            p.tick();
            p.sample() > 0
        });
        assert!(!heard);
    }

    #[test]
    fn plays_the_selected_duty_cycle() {
        let mut p = Pulse::new(false);
        p.set_enable(true);
        p.write_reg0(0b1011_1111);
        p.write_reg2(0x07); // period 8
        p.write_reg3(0x00);

        // one full waveform: 8 sequencer steps of (period + 1) ticks
        let mut wave = vec![];
        for _ in 0..8 {
            for _ in 0..9 {
                p.tick();
            }
            wave.push((p.sample() > 0) as u8);
        }
        assert_eq!(wave.iter().sum::<u8>(), 4, "duty 2 is high half the time");
    }
}
