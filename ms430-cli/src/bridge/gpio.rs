//! GP pins as digital inputs.
use bit_field::BitField;
use embedded_hal::digital::{self, InputPin};

use super::commands::{McpCommand, UsbReport};
use super::interrupt::Gp1EdgeLatch;
use super::{BridgeError, Mcp2221};

/// Level byte in the Get GPIO Values response for a pin not set to GPIO.
const NOT_GPIO: u8 = 0xEE;

/// One of the four GP pins of the MCP2221.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum GpPin {
    Gp0,
    Gp1,
    Gp2,
    Gp3,
}

impl GpPin {
    pub(super) fn index(self) -> usize {
        match self {
            GpPin::Gp0 => 0,
            GpPin::Gp1 => 1,
            GpPin::Gp2 => 2,
            GpPin::Gp3 => 3,
        }
    }
}

impl std::fmt::Display for GpPin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GP{}", self.index())
    }
}

/// GP settings byte for a GPIO input: designation 0b000, direction bit set.
pub(super) fn gpio_input_setting() -> u8 {
    let mut setting = 0u8;
    setting.set_bits(0..=2, 0b000);
    setting.set_bit(3, true);
    setting
}

impl Mcp2221 {
    /// GP0 to GP3 settings bytes currently in SRAM.
    pub(super) fn sram_read_gp_settings(&self) -> Result<[u8; 4], BridgeError> {
        let buf = self.transfer(&UsbReport::new(McpCommand::GetSramSettings))?;
        Ok([buf[22], buf[23], buf[24], buf[25]])
    }

    /// Replace the GP0 to GP3 settings in SRAM.
    ///
    /// Changing GP settings also resets the ADC and DAC voltage references. Nothing
    /// here uses them, so they are not restored.
    pub(super) fn sram_write_gp_settings(&self, settings: [u8; 4]) -> Result<(), BridgeError> {
        self.sram_write(None, Some(settings))
    }

    /// Set SRAM command with an optional interrupt settings byte (byte 6, built with
    /// its alter bit) and optional GP settings.
    pub(super) fn sram_write(
        &self,
        interrupt_settings: Option<u8>,
        gp_settings: Option<[u8; 4]>,
    ) -> Result<(), BridgeError> {
        let mut command = UsbReport::new(McpCommand::SetSramSettings);
        if let Some(interrupts) = interrupt_settings {
            command.set_data_byte(6, interrupts);
        }
        if let Some(settings) = gp_settings {
            let mut alter = 0u8;
            alter.set_bit(7, true);
            command.set_data_byte(7, alter);
            for (idx, setting) in settings.into_iter().enumerate() {
                command.set_data_byte(8 + idx, setting);
            }
        }
        self.transfer(&command)?;
        Ok(())
    }

    /// Read the input level of a GPIO pin.
    pub(super) fn gpio_is_high(&self, pin: GpPin) -> Result<bool, BridgeError> {
        let buf = self.transfer(&UsbReport::new(McpCommand::GetGpioValues))?;
        match buf[2 + 2 * pin.index()] {
            NOT_GPIO => Err(BridgeError::PinModeChanged(pin)),
            level => Ok(level == 0x01),
        }
    }

    /// Configure `pins` as GPIO inputs until the returned claim is dropped.
    ///
    /// The previous GP settings are restored on drop, including after an error
    /// unwinds out of the code using the pins.
    pub(crate) fn claim_inputs(&self, pins: &[GpPin]) -> Result<PinClaim<'_>, BridgeError> {
        for (idx, pin) in pins.iter().enumerate() {
            if pins[..idx].contains(pin) {
                return Err(BridgeError::PinReused(*pin));
            }
        }
        let saved = self.sram_read_gp_settings()?;
        let mut settings = saved;
        for pin in pins {
            settings[pin.index()] = gpio_input_setting();
        }
        self.sram_write_gp_settings(settings)?;
        log::debug!("Claimed {pins:?} as inputs, saved settings {saved:02X?}");
        Ok(PinClaim {
            device: self,
            saved,
        })
    }
}

/// GP pins held as GPIO inputs.
#[derive(Debug)]
pub(crate) struct PinClaim<'a> {
    device: &'a Mcp2221,
    saved: [u8; 4],
}

impl<'a> PinClaim<'a> {
    /// Digital input on a claimed pin.
    pub(crate) fn input(&self, pin: GpPin) -> Input<'a> {
        Input {
            device: self.device,
            pin,
        }
    }

    /// Falling edge latch on GP1, which must be one of the claimed pins.
    pub(crate) fn gp1_edge_latch(&self) -> Gp1EdgeLatch<'a, Mcp2221> {
        Gp1EdgeLatch::new(self.device)
    }
}

impl Drop for PinClaim<'_> {
    fn drop(&mut self) {
        match self.device.sram_write_gp_settings(self.saved) {
            Ok(()) => log::debug!("Restored GP settings {:02X?}", self.saved),
            Err(e) => log::warn!("Could not restore GP pin settings: {e}"),
        }
    }
}

/// A claimed GP pin read as a digital input.
#[derive(Debug)]
pub(crate) struct Input<'a> {
    device: &'a Mcp2221,
    pin: GpPin,
}

impl digital::Error for BridgeError {
    fn kind(&self) -> digital::ErrorKind {
        digital::ErrorKind::Other
    }
}

impl digital::ErrorType for Input<'_> {
    type Error = BridgeError;
}

impl InputPin for Input<'_> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.device.gpio_is_high(self.pin)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn input_setting_byte() {
        assert_eq!(gpio_input_setting(), 0b0000_1000);
    }

    #[test]
    fn pin_names() {
        assert_eq!(GpPin::Gp3.to_string(), "GP3");
    }
}
