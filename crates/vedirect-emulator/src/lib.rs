//! VE.Direct Device Emulator
//!
//! Writes the text frames of a battery monitor, solar charger or inverter to
//! any async writer, such as one end of a virtual serial port pair.

mod emulator;
mod model;

pub use emulator::{Emulator, EmulatorConfig};
pub use model::{DeviceModel, ParseModelError};
