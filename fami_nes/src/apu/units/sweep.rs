use super::Divider;
use bit_field::BitField;

/// Periodically retunes a pulse channel's timer by a bit-shifted delta,
/// muting the channel whenever the target period leaves the audible
/// range. The second pulse channel subtracts one less than the first
/// (the hardware's one's-complement adder).
#[derive(Debug)]
pub struct Sweep {
    enabled: bool,
    negate: bool,
    shift: u8,
    period: usize,
    counter: usize,
    reload: bool,
    target: usize,
    muting: bool,
    channel_offset: usize,
}

impl Sweep {
    pub fn new(channel_offset: usize) -> Self {
        Self {
            enabled: false,
            negate: false,
            shift: 0,
            period: 0,
            counter: 0,
            reload: false,
            target: 0,
            muting: false,
            channel_offset,
        }
    }

    pub fn load(&mut self, data: u8) {
        self.enabled = data.get_bit(7);
        self.period = data.get_bits(4..7) as usize;
        self.negate = data.get_bit(3);
        self.shift = data.get_bits(0..3);
        self.reload = true;
    }

    /// Half-frame clock.
    pub fn tick(&mut self, timer: &mut Divider) {
        self.retarget(timer);

        if self.counter == 0 && self.enabled && self.shift > 0 && !self.muting {
            timer.retune(self.target);
        }

        if self.counter == 0 || self.reload {
            self.reload = false;
            self.counter = self.period;
        } else {
            self.counter -= 1;
        }
    }

    fn retarget(&mut self, timer: &Divider) {
        let period = timer.period();
        let delta = period >> self.shift;
        self.target = if self.negate {
            period.saturating_sub(delta + self.channel_offset)
        } else {
            period + delta
        };

        self.muting = period < 8 || self.target > 0x7ff;
    }

    pub fn muting(&self) -> bool {
        self.muting
    }
}
