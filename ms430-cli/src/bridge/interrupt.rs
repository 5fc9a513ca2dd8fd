//! Falling edge detection on GP1.
//!
//! GP1 is the only MCP2221 pin with interrupt-on-change detection. In that mode the
//! chip sets a flag on each configured edge and holds it until cleared, so an edge is
//! kept even when it comes and goes between two USB polls. The pin's level cannot be
//! read while it is detecting edges.
use bit_field::BitField;
use ms430_hal::EdgeSignal;

use super::commands::{McpCommand, UsbReport};
use super::gpio::gpio_input_setting;
use super::{BridgeError, GpPin, Mcp2221};

/// GP1 designation for interrupt detection.
const GP1_INTERRUPT_DETECTION: u8 = 0b100;

/// GP settings byte putting GP1 into interrupt detection.
fn interrupt_detection_setting() -> u8 {
    let mut setting = 0u8;
    setting.set_bits(0..=2, GP1_INTERRUPT_DETECTION);
    setting.set_bit(3, true);
    setting
}

/// Interrupt settings byte: detect negative edges only, and clear the flag.
fn falling_edge_interrupt_settings() -> u8 {
    let mut byte = 0u8;
    byte.set_bit(7, true);
    // Positive edge: alter, disabled.
    byte.set_bit(4, true);
    byte.set_bit(3, false);
    // Negative edge: alter, enabled.
    byte.set_bit(2, true);
    byte.set_bit(1, true);
    byte.set_bit(0, true);
    byte
}

/// Interrupt settings byte that only clears the flag.
fn clear_flag_interrupt_settings() -> u8 {
    let mut byte = 0u8;
    byte.set_bit(7, true);
    byte.set_bit(0, true);
    byte
}

/// The interrupt-detected flag from a Status response.
fn interrupt_flag(buf: &[u8; 64]) -> bool {
    buf[24] == 0x01
}

/// GP1 operations needed for edge detection.
pub(crate) trait Gp1Control {
    /// Make GP1 a GPIO input again.
    fn gp1_to_gpio_input(&self) -> Result<(), BridgeError>;
    /// Level of GP1. Fails unless GP1 is a GPIO input.
    fn gp1_is_high(&self) -> Result<bool, BridgeError>;
    /// Put GP1 into interrupt detection for falling edges only.
    fn gp1_detect_falling_edges(&self) -> Result<(), BridgeError>;
    /// True if the interrupt flag is set.
    fn interrupt_detected(&self) -> Result<bool, BridgeError>;
    /// Clear the interrupt flag.
    fn interrupt_clear(&self) -> Result<(), BridgeError>;
}

impl Gp1Control for Mcp2221 {
    fn gp1_to_gpio_input(&self) -> Result<(), BridgeError> {
        let mut settings = self.sram_read_gp_settings()?;
        settings[GpPin::Gp1.index()] = gpio_input_setting();
        self.sram_write_gp_settings(settings)
    }

    fn gp1_is_high(&self) -> Result<bool, BridgeError> {
        self.gpio_is_high(GpPin::Gp1)
    }

    fn gp1_detect_falling_edges(&self) -> Result<(), BridgeError> {
        let mut settings = self.sram_read_gp_settings()?;
        settings[GpPin::Gp1.index()] = interrupt_detection_setting();
        self.sram_write(Some(falling_edge_interrupt_settings()), Some(settings))
    }

    fn interrupt_detected(&self) -> Result<bool, BridgeError> {
        let buf = self.transfer(&UsbReport::new(McpCommand::StatusSetParameters))?;
        Ok(interrupt_flag(&buf))
    }

    fn interrupt_clear(&self) -> Result<(), BridgeError> {
        self.sram_write(Some(clear_flag_interrupt_settings()), None)
    }
}

/// [`EdgeSignal`] on GP1 backed by the MCP2221 interrupt flag.
///
/// The pin starts as a GPIO input, so [`EdgeSignal::is_high`] works for the reset
/// wait. Clearing or taking edges switches GP1 to interrupt detection, and reading the
/// level switches it back. Edges are only latched while detection is on.
#[derive(Debug)]
pub(crate) struct Gp1EdgeLatch<'a, C: ?Sized> {
    control: &'a C,
    detecting: bool,
}

impl<'a, C: Gp1Control + ?Sized> Gp1EdgeLatch<'a, C> {
    pub(crate) fn new(control: &'a C) -> Self {
        Self {
            control,
            detecting: false,
        }
    }

    fn start_detecting(&mut self) -> Result<(), BridgeError> {
        self.control.gp1_detect_falling_edges()?;
        // Changing the designation can itself raise the flag.
        self.control.interrupt_clear()?;
        self.detecting = true;
        log::debug!("GP1 detecting falling edges");
        Ok(())
    }
}

impl<C: Gp1Control + ?Sized> EdgeSignal for Gp1EdgeLatch<'_, C> {
    type Error = BridgeError;

    fn is_high(&mut self) -> Result<bool, Self::Error> {
        if self.detecting {
            self.control.gp1_to_gpio_input()?;
            self.detecting = false;
        }
        self.control.gp1_is_high()
    }

    fn take_falling_edge(&mut self) -> Result<bool, Self::Error> {
        if !self.detecting {
            self.start_detecting()?;
            return Ok(false);
        }
        if self.control.interrupt_detected()? {
            self.control.interrupt_clear()?;
            return Ok(true);
        }
        Ok(false)
    }

    fn clear_edges(&mut self) -> Result<(), Self::Error> {
        if self.detecting {
            self.control.interrupt_clear()
        } else {
            self.start_detecting()
        }
    }
}
