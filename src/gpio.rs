//! GPIO pin simulation mapped above the RAM image.
//!
//! Four function-select registers, one set register and one clear register.
//! Stores to set/clear switch pins on or off; loads from either return the
//! current pin levels. None of these addresses are backed by RAM cells.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cpu::Trap;
use crate::memory::{Bus, LinearMemory};

pub const GPIO_BASE: u32 = 0x2020_0000;
/// Function-select registers, one word each.
pub const GPIO_FSEL: [u32; 4] = [GPIO_BASE, GPIO_BASE + 0x4, GPIO_BASE + 0x8, GPIO_BASE + 0xC];
pub const GPIO_SET: u32 = GPIO_BASE + 0x1C;
pub const GPIO_CLEAR: u32 = GPIO_BASE + 0x28;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gpio {
    pub fsel: [u32; 4],
    /// Bit n is pin n.
    pub levels: u32,
}

impl Gpio {
    pub fn claims(addr: u32) -> bool {
        GPIO_FSEL.contains(&addr) || addr == GPIO_SET || addr == GPIO_CLEAR
    }

    pub fn is_on(&self, pin: u32) -> bool {
        pin < 32 && (self.levels >> pin) & 1 != 0
    }

    fn read(&self, addr: u32) -> u32 {
        match GPIO_FSEL.iter().position(|&a| a == addr) {
            Some(i) => self.fsel[i],
            None => self.levels,
        }
    }

    fn write(&mut self, addr: u32, val: u32) {
        if let Some(i) = GPIO_FSEL.iter().position(|&a| a == addr) {
            self.fsel[i] = val;
            return;
        }
        let on = addr == GPIO_SET;
        for pin in (0..32u32).filter(|&p| (val >> p) & 1 != 0) {
            info!(pin, on, "gpio pin {}", if on { "on" } else { "off" });
        }
        if on {
            self.levels |= val;
        } else {
            self.levels &= !val;
        }
    }
}

/// RAM plus the GPIO window; the bus the emulator runs against.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct MappedMemory {
    pub ram: LinearMemory,
    pub gpio: Gpio,
}

impl MappedMemory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Bus for MappedMemory {
    fn read_u32(&mut self, addr: u32) -> Result<u32, Trap> {
        if Gpio::claims(addr) {
            return Ok(self.gpio.read(addr));
        }
        self.ram.read_u32(addr)
    }

    fn write_u32(&mut self, addr: u32, val: u32) -> Result<(), Trap> {
        if Gpio::claims(addr) {
            self.gpio.write(addr, val);
            return Ok(());
        }
        self.ram.write_u32(addr, val)
    }
}
