mod divider;
mod envelope;
mod frame;
mod length;
mod sweep;

pub use divider::Divider;
pub use envelope::Envelope;
pub use frame::{FrameCounter, Step};
pub use length::LengthCounter;
pub use sweep::Sweep;
