use bit_field::BitField;
use std::cell::Cell;

// mode 0:    mode 1:       function
// ---------  -----------  -----------------------------
//  - - - f    - - - - -    IRQ (if bit 6 is clear)
//  - l - l    - l - - l    length counter and sweep
//  e e e e    e e e - e    envelope
//
// The clock points are the NTSC frame-counter positions, counted in APU
// cycles since the last sequence start.
const STEPS_4: [usize; 4] = [3729, 7457, 11186, 14916];
const STEPS_5: [usize; 5] = [3729, 7457, 11186, 14916, 18641];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Step4,
    Step5,
}

bitflags::bitflags! {
    pub struct Step: u8 {
        const LENGTH   = 0b01;
        const ENVELOPE = 0b10;
    }
}

/// Divides the APU clock into the quarter/half-frame pulses that drive
/// envelopes, length counters and sweeps.
#[derive(Debug)]
pub struct FrameCounter {
    counter: usize,
    mode: Mode,
    irq_on: bool,
    irq_level: Cell<bool>,
}

impl FrameCounter {
    pub fn new() -> Self {
        Self {
            counter: 0,
            mode: Mode::Step4,
            irq_on: false,
            irq_level: Cell::default(),
        }
    }

    /// One APU cycle; reports which sub-frame clocks fire now.
    pub fn tick(&mut self) -> Step {
        self.counter += 1;
        let mut step = Step::empty();

        match self.mode {
            Mode::Step4 => {
                if let Some(i) = STEPS_4.iter().position(|&p| p == self.counter) {
                    step.set(Step::ENVELOPE, true);
                    step.set(Step::LENGTH, i == 1 || i == 3);

                    if i == 3 {
                        if self.irq_on {
                            self.irq_level.set(true);
                        }
                        self.counter = 0;
                    }
                }
            }
            Mode::Step5 => {
                if let Some(i) = STEPS_5.iter().position(|&p| p == self.counter) {
                    step.set(Step::ENVELOPE, i != 3);
                    step.set(Step::LENGTH, i == 1 || i == 4);

                    if i == 4 {
                        self.counter = 0;
                    }
                }
            }
        }

        step
    }

    pub fn load(&mut self, data: u8) {
        self.counter = 0;
        self.mode = if data.get_bit(7) {
            Mode::Step5
        } else {
            Mode::Step4
        };
        self.irq_on = !data.get_bit(6);
    }

    /// Read-and-clear, surfaced through the $4015 status byte.
    pub fn irq(&self) -> bool {
        self.irq_level.replace(false)
    }
}
