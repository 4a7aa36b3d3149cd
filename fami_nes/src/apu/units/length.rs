use bit_field::BitField;

const LENGTH_TABLE: [u8; 32] = [
    10, 254, 20, 2, 40, 4, 80, 6, 160, 8, 60, 10, 14, 12, 26, 14, //
    12, 16, 24, 18, 48, 20, 96, 22, 192, 24, 72, 26, 16, 28, 32, 30,
];

/// Gates a channel off after a programmed duration of half-frame clocks.
#[derive(Debug, Default)]
pub struct LengthCounter {
    counter: u8,
    enabled: bool,
    halt: bool,
}

impl LengthCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 1 while the channel may sound, 0 once expired.
    pub fn count(&self) -> u8 {
        (self.counter != 0) as u8
    }

    pub fn tick(&mut self) {
        if !self.halt && self.counter > 0 {
            self.counter -= 1;
        }
    }

    pub fn set_enable(&mut self, enable: bool) {
        self.enabled = enable;
        if !enable {
            self.counter = 0;
        }
    }

    pub fn set_halt(&mut self, halt: bool) {
        self.halt = halt;
    }

    /// Reload from the 5-bit code in the channel's length register.
    pub fn load(&mut self, data: u8) {
        if self.enabled {
            self.counter = LENGTH_TABLE[data.get_bits(3..8) as usize];
        }
    }
}
