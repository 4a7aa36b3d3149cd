use super::Divider;
use bit_field::BitField;

/// Volume generator: either a constant 4-bit level or a looping 15-to-0
/// decay stepped at the quarter-frame rate.
#[derive(Debug)]
pub struct Envelope {
    divider: Divider,
    volume: u8,
    decay: u8,
    looping: bool,
    constant: bool,
    restart: bool,
}

impl Envelope {
    pub fn new() -> Self {
        Self {
            divider: Divider::new(),
            volume: 0,
            decay: 0,
            looping: false,
            constant: true,
            restart: false,
        }
    }

    pub fn tick(&mut self) {
        if self.restart {
            self.restart = false;
            self.decay = 15;
            self.divider.restart();
            return;
        }

        if self.divider.tick() {
            if self.decay > 0 {
                self.decay -= 1;
            } else if self.looping {
                self.decay = 15;
            }
        }
    }

    /// Current output, always 0..=15.
    pub fn volume(&self) -> u8 {
        if self.constant {
            self.volume
        } else {
            self.decay
        }
    }

    /// Loads halt/constant/volume from the low 6 bits of a channel's
    /// first register.
    pub fn load(&mut self, data: u8) {
        self.looping = data.get_bit(5);
        self.constant = data.get_bit(4);
        self.volume = data.get_bits(0..4);
        self.divider.set_period(self.volume as usize + 1);
    }

    pub fn restart(&mut self) {
        self.restart = true;
    }
}
