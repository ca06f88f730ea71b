pub mod conditioning;
pub mod energy;
pub mod frame;
pub mod pitch;
pub mod suppress;

pub use energy::EnergyExtractor;
pub use frame::FrameGrid;
pub use pitch::{PeriodicityExtractor, PitchConfig};
pub use suppress::suppress_inactive;
