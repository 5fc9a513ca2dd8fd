//! I2C transfers through the MCP2221.
use std::time::Duration;

use embedded_hal::i2c::{self, I2c, Operation, SevenBitAddress};

use super::commands::{McpCommand, UsbReport};
use super::{BridgeError, Mcp2221};

/// Attempts at a command that reports a busy or unready I2C engine.
const MAX_RETRIES: u8 = 20;
const RETRY_DELAY: Duration = Duration::from_millis(2);

/// Largest data payload of a single write report.
const WRITE_CHUNK: usize = 60;

/// Response length byte signalling a failed engine read.
const GET_DATA_ERROR: u8 = 127;

#[derive(Debug, Clone, Copy)]
enum WriteType {
    Normal,
    NoStop,
}

impl From<WriteType> for McpCommand {
    fn from(value: WriteType) -> Self {
        match value {
            WriteType::Normal => McpCommand::I2cWriteData,
            WriteType::NoStop => McpCommand::I2cWriteDataNoStop,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum ReadType {
    Normal,
    RepeatedStart,
}

impl From<ReadType> for McpCommand {
    fn from(value: ReadType) -> Self {
        match value {
            ReadType::Normal => McpCommand::I2cReadData,
            ReadType::RepeatedStart => McpCommand::I2cReadDataRepeatedStart,
        }
    }
}

/// Transfer length as the two little-endian report bytes.
fn transfer_length(len: usize) -> Result<[u8; 2], BridgeError> {
    match u16::try_from(len) {
        Ok(0) | Err(_) => Err(BridgeError::I2cTransferLength(len)),
        Ok(n) => Ok(n.to_le_bytes()),
    }
}

impl Mcp2221 {
    /// Force a STOP condition if the I2C engine is mid-transfer.
    ///
    /// Cancelling while idle leaves the engine stuck busy, so it is only done when
    /// the status shows a transfer in progress.
    pub(crate) fn i2c_cancel_transfer(&self) -> Result<(), BridgeError> {
        if self.i2c_status()?.is_idle() {
            return Ok(());
        }
        let mut command = UsbReport::new(McpCommand::StatusSetParameters);
        command.set_data_byte(2, 0x10);
        self.transfer(&command)?;
        log::debug!("Cancelled I2C transfer");
        Ok(())
    }

    /// Clean up and fail if the target did not acknowledge its address.
    fn i2c_bail_for_nack(&self) -> Result<(), BridgeError> {
        if self.i2c_status()?.ack_received {
            Ok(())
        } else {
            self.i2c_cancel_transfer()?;
            Err(BridgeError::I2cAddressNack)
        }
    }

    /// Send a command, retrying while the I2C engine is busy.
    fn transfer_retrying_busy(&self, command: &UsbReport) -> Result<[u8; 64], BridgeError> {
        let mut retries = MAX_RETRIES;
        loop {
            match self.transfer(command) {
                Err(BridgeError::I2cEngineBusy) if retries > 0 => {
                    retries -= 1;
                    std::thread::sleep(RETRY_DELAY);
                }
                result => return result,
            }
        }
    }

    fn i2c_write(
        &self,
        address: SevenBitAddress,
        data: &[u8],
        write_type: WriteType,
    ) -> Result<(), BridgeError> {
        let [len_low, len_high] = transfer_length(data.len())?;
        let mut command = UsbReport::new(write_type.into());
        command.set_data_byte(1, len_low);
        command.set_data_byte(2, len_high);
        command.set_data_byte(3, address << 1);

        for (idx, chunk) in data.chunks(WRITE_CHUNK).enumerate() {
            command.write_buffer[4..4 + chunk.len()].copy_from_slice(chunk);
            self.transfer_retrying_busy(&command)?;
            // The MCP2221 accepts the rest of a write to a missing target, so
            // only the first chunk is checked.
            if idx == 0 {
                self.i2c_bail_for_nack()?;
            }
        }
        Ok(())
    }

    fn i2c_read(
        &self,
        address: SevenBitAddress,
        buf: &mut [u8],
        read_type: ReadType,
    ) -> Result<(), BridgeError> {
        let [len_low, len_high] = transfer_length(buf.len())?;
        let mut command = UsbReport::new(read_type.into());
        command.set_data_byte(1, len_low);
        command.set_data_byte(2, len_high);
        command.set_data_byte(3, (address << 1) | 1);
        self.transfer_retrying_busy(&command)?;
        self.i2c_bail_for_nack()?;
        self.i2c_get_data(buf)
    }

    /// Collect read data from the MCP2221, which arrives in chunks.
    fn i2c_get_data(&self, buf: &mut [u8]) -> Result<(), BridgeError> {
        let get_command = UsbReport::new(McpCommand::I2cGetData);
        let mut read_so_far = 0;
        let mut retries = MAX_RETRIES;

        while read_so_far < buf.len() {
            let chunk = match self.transfer(&get_command) {
                Ok(response) if !matches!(response[3], 0 | GET_DATA_ERROR) => response,
                Ok(_) | Err(BridgeError::I2cEngineReadError) => {
                    if retries == 0 {
                        return Err(BridgeError::I2cOperationFailed);
                    }
                    retries -= 1;
                    std::thread::sleep(RETRY_DELAY);
                    continue;
                }
                Err(e) => return Err(e),
            };
            retries = MAX_RETRIES;
            let len = usize::from(chunk[3]).min(buf.len() - read_so_far);
            buf[read_so_far..read_so_far + len].copy_from_slice(&chunk[4..4 + len]);
            read_so_far += len;
        }
        Ok(())
    }
}

impl i2c::Error for BridgeError {
    fn kind(&self) -> i2c::ErrorKind {
        match self {
            BridgeError::I2cAddressNack => {
                i2c::ErrorKind::NoAcknowledge(i2c::NoAcknowledgeSource::Address)
            }
            _ => i2c::ErrorKind::Other,
        }
    }
}

impl i2c::ErrorType for &Mcp2221 {
    type Error = BridgeError;
}

impl I2c<SevenBitAddress> for &Mcp2221 {
    /// Supports a run of writes, a run of reads, or writes followed by reads.
    ///
    /// The MCP2221 cannot end a read without a STOP, so reads followed by writes are
    /// rejected with [`BridgeError::I2cUnsupportedTransaction`].
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let split = operations
            .iter()
            .position(|op| matches!(op, Operation::Read(_)))
            .unwrap_or(operations.len());
        let (writes, reads) = operations.split_at_mut(split);
        if reads.iter().any(|op| matches!(op, Operation::Write(_))) {
            return Err(BridgeError::I2cUnsupportedTransaction);
        }

        let mut write_data = Vec::new();
        for op in writes.iter() {
            if let Operation::Write(data) = op {
                write_data.extend_from_slice(data);
            }
        }
        let read_length: usize = reads
            .iter()
            .map(|op| match op {
                Operation::Read(buf) => buf.len(),
                Operation::Write(_) => 0,
            })
            .sum();

        if !write_data.is_empty() {
            let write_type = if read_length > 0 {
                WriteType::NoStop
            } else {
                WriteType::Normal
            };
            self.i2c_write(address, &write_data, write_type)?;
        }

        if read_length > 0 {
            let read_type = if write_data.is_empty() {
                ReadType::Normal
            } else {
                ReadType::RepeatedStart
            };
            let mut read_data = vec![0u8; read_length];
            self.i2c_read(address, &mut read_data, read_type)?;
            let mut copied = 0;
            for op in reads.iter_mut() {
                if let Operation::Read(buf) = op {
                    buf.copy_from_slice(&read_data[copied..copied + buf.len()]);
                    copied += buf.len();
                }
            }
        }
        Ok(())
    }

    fn read(&mut self, address: SevenBitAddress, read: &mut [u8]) -> Result<(), Self::Error> {
        self.i2c_read(address, read, ReadType::Normal)
    }

    fn write(&mut self, address: SevenBitAddress, write: &[u8]) -> Result<(), Self::Error> {
        self.i2c_write(address, write, WriteType::Normal)
    }

    fn write_read(
        &mut self,
        address: SevenBitAddress,
        write: &[u8],
        read: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.i2c_write(address, write, WriteType::NoStop)?;
        self.i2c_read(address, read, ReadType::RepeatedStart)
    }
}
