//! Minimal driver for the MCP2221 USB to I2C and GPIO converter.
//!
//! Only what is needed to talk to an MS430 is here: I2C transfers, GP pins as
//! digital inputs for the READY, LIT and SIT lines, and the GP1 edge latch.

use bit_field::BitField;
use hidapi::{HidApi, HidDevice};

use commands::{McpCommand, UsbReport};

mod commands;
mod gpio;
mod i2c;
mod interrupt;

pub(crate) use gpio::{GpPin, Input, PinClaim};
pub(crate) use interrupt::Gp1EdgeLatch;

const COMMAND_SUCCESS: u8 = 0x00;

/// Problems talking to the MCP2221.
#[derive(Debug, thiserror::Error)]
pub(crate) enum BridgeError {
    /// The MCP2221 reported failure for a command.
    #[error("MCP2221 command failed with code {0:#04X}")]
    CommandFailed(u8),
    /// The response echoed a different command than was sent.
    #[error("MCP2221 echoed command {received:#04X} in reply to {sent:#04X}")]
    MismatchedCommandCodeEcho { sent: u8, received: u8 },
    /// Fewer bytes than a full report were written or read.
    #[error("incomplete USB report ({0} bytes)")]
    ShortReport(usize),
    /// The I2C engine was busy; the command can be retried.
    #[error("I2C engine busy")]
    I2cEngineBusy,
    /// The I2C engine had no data ready; the command can be retried.
    #[error("I2C engine read error")]
    I2cEngineReadError,
    /// The target did not acknowledge its address.
    #[error("I2C target did not acknowledge its address")]
    I2cAddressNack,
    /// Transfers must be between 1 and 65,535 bytes.
    #[error("I2C transfer of {0} bytes is not possible")]
    I2cTransferLength(usize),
    /// Retries were exhausted.
    #[error("I2C transfer did not complete")]
    I2cOperationFailed,
    /// The `embedded-hal` transaction needs a read without STOP, which the MCP2221
    /// cannot do.
    #[error("unsupported I2C transaction")]
    I2cUnsupportedTransaction,
    /// A claimed pin is no longer configured for GPIO.
    #[error("pin {0} is not configured for GPIO")]
    PinModeChanged(GpPin),
    /// The same pin was given for two lines.
    #[error("pin {0} is assigned to more than one line")]
    PinReused(GpPin),
    /// The USB device could not be opened or used.
    #[error(transparent)]
    HidApi(#[from] hidapi::HidError),
}

/// Current state of the I2C engine, from the Status command.
#[derive(Debug)]
pub(crate) struct I2cStatus {
    /// Internal state machine value; zero when idle.
    pub(crate) communication_state: u8,
    /// True if the target acknowledged its address in the last transfer.
    pub(crate) ack_received: bool,
}

impl I2cStatus {
    fn from_buffer(buf: &[u8; 64]) -> Self {
        Self {
            communication_state: buf[8],
            // The bit is set when the address was NOT acknowledged.
            ack_received: !buf[20].get_bit(6),
        }
    }

    pub(crate) fn is_idle(&self) -> bool {
        self.communication_state == 0
    }
}

/// An open MCP2221.
///
/// All methods take `&self`, so the bus and the GPIO inputs can share the device.
/// The underlying hidapi handle is `!Sync`, which keeps that sharing on one thread.
#[derive(Debug)]
pub(crate) struct Mcp2221 {
    inner: HidDevice,
}

impl Mcp2221 {
    /// Open the first USB device with the given vendor and product ID.
    pub(crate) fn connect_with_vid_and_pid(
        vendor_id: u16,
        product_id: u16,
    ) -> Result<Self, BridgeError> {
        let hidapi = HidApi::new()?;
        let device = hidapi.open(vendor_id, product_id)?;
        log::debug!("Opened MCP2221 {vendor_id:04X}:{product_id:04X}");
        Ok(Self { inner: device })
    }

    /// Write a report and read the 64-byte response.
    fn transfer(&self, command: &UsbReport) -> Result<[u8; 64], BridgeError> {
        let written = self.inner.write(&command.report_bytes())?;
        if written != 65 {
            return Err(BridgeError::ShortReport(written));
        }

        let mut read_buffer = [0u8; 64];
        let read = self.inner.read(&mut read_buffer)?;
        if read != 64 {
            return Err(BridgeError::ShortReport(read));
        }

        let sent = command.command_code();
        let received = read_buffer[0];
        if received != sent {
            return Err(BridgeError::MismatchedCommandCodeEcho { sent, received });
        }

        match read_buffer[1] {
            COMMAND_SUCCESS => Ok(read_buffer),
            code => Err(command.error_for(code)),
        }
    }

    /// Read the I2C engine status.
    pub(crate) fn i2c_status(&self) -> Result<I2cStatus, BridgeError> {
        let buf = self.transfer(&UsbReport::new(McpCommand::StatusSetParameters))?;
        Ok(I2cStatus::from_buffer(&buf))
    }
}
