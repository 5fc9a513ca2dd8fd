use super::BridgeError;

/// HID commands of the MCP2221 used by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum McpCommand {
    /// Poll the I2C engine status, or cancel a transfer.
    StatusSetParameters,
    /// Change the run-time GP pin designations.
    SetSramSettings,
    /// Read the run-time chip and GP pin settings.
    GetSramSettings,
    /// Read the direction and level of GPIO pins.
    GetGpioValues,
    /// Request a read from an I2C target.
    I2cReadData,
    /// Request a read following a write with no STOP.
    I2cReadDataRepeatedStart,
    /// Collect data requested by one of the read commands.
    I2cGetData,
    /// Write to an I2C target.
    I2cWriteData,
    /// Write to an I2C target without a final STOP.
    I2cWriteDataNoStop,
}

impl McpCommand {
    fn code(self) -> u8 {
        match self {
            McpCommand::StatusSetParameters => 0x10,
            McpCommand::SetSramSettings => 0x60,
            McpCommand::GetSramSettings => 0x61,
            McpCommand::GetGpioValues => 0x51,
            McpCommand::I2cReadData => 0x91,
            McpCommand::I2cReadDataRepeatedStart => 0x93,
            McpCommand::I2cGetData => 0x40,
            McpCommand::I2cWriteData => 0x90,
            McpCommand::I2cWriteDataNoStop => 0x94,
        }
    }

    /// Map a command-specific failure code to an error.
    ///
    /// Engine-busy and engine-read errors are worth retrying after a short delay.
    fn check_error_code(self, code: u8) -> BridgeError {
        match (code, self) {
            (
                0x01,
                McpCommand::I2cWriteData
                | McpCommand::I2cWriteDataNoStop
                | McpCommand::I2cReadData
                | McpCommand::I2cReadDataRepeatedStart,
            ) => BridgeError::I2cEngineBusy,
            (0x41, McpCommand::I2cGetData) => BridgeError::I2cEngineReadError,
            (code, _) => BridgeError::CommandFailed(code),
        }
    }
}

/// Outgoing 64-byte HID report.
pub(crate) struct UsbReport {
    command: McpCommand,
    pub(crate) write_buffer: [u8; 64],
}

impl UsbReport {
    pub(crate) fn new(command: McpCommand) -> Self {
        let mut write_buffer = [0u8; 64];
        write_buffer[0] = command.code();
        Self {
            command,
            write_buffer,
        }
    }

    /// The report as written to hidapi, with the report number (0) in front.
    pub(crate) fn report_bytes(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out[1..].copy_from_slice(&self.write_buffer);
        out
    }

    pub(crate) fn command_code(&self) -> u8 {
        self.write_buffer[0]
    }

    pub(crate) fn error_for(&self, code: u8) -> BridgeError {
        self.command.check_error_code(code)
    }

    /// Set one data byte. The command byte at index 0 cannot be overwritten.
    pub(crate) fn set_data_byte(&mut self, byte_index: usize, value: u8) {
        assert!(
            (1..64).contains(&byte_index),
            "Byte index {byte_index} out of range."
        );
        self.write_buffer[byte_index] = value;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn report_has_leading_report_number() {
        let mut report = UsbReport::new(McpCommand::I2cWriteData);
        report.set_data_byte(3, 0xE2);
        let bytes = report.report_bytes();
        assert_eq!(bytes[0], 0);
        assert_eq!(bytes[1], 0x90);
        assert_eq!(bytes[4], 0xE2);
    }

    #[test]
    fn busy_engine_is_retryable() {
        let report = UsbReport::new(McpCommand::I2cReadData);
        assert!(matches!(report.error_for(0x01), BridgeError::I2cEngineBusy));
        let report = UsbReport::new(McpCommand::GetGpioValues);
        assert!(matches!(
            report.error_for(0x01),
            BridgeError::CommandFailed(0x01)
        ));
    }
}
