//! Standard special columns

mod include;
mod delay;
mod set;

pub use include::IncludeColumn;
pub use delay::DelayColumn;
pub use set::SetColumn;
