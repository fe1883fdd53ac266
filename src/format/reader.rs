//! Streaming decoder for execution data files.

use std::io::{self, Read};

use byteorder::{BigEndian, ReadBytesExt};

use crate::core::errors::{ExecMergeError, Result};
use crate::data::execution::ExecutionData;
use crate::data::session::SessionInfo;
use crate::data::visitor::{ExecutionDataVisitor, SessionInfoVisitor};
use crate::format::{
    mutf8, FormatVersion, BLOCK_EXECUTION_DATA, BLOCK_HEADER, BLOCK_SESSION_INFO, MAGIC_NUMBER,
};

/// Decoder for one execution data stream, bound to a format version.
///
/// Every header block in the stream must carry the magic number and the
/// bound version character. Streams may concatenate several dumps, so
/// header blocks can repeat mid-stream. Premature end of input inside a
/// block is a decode error; end of input at a block boundary ends the
/// stream cleanly.
pub struct ExecutionDataReader<R: Read> {
    input: R,
    version: FormatVersion,
    first_block: bool,
}

impl<R: Read> ExecutionDataReader<R> {
    /// Create a decoder bound to the given format version.
    pub fn new(input: R, version: FormatVersion) -> Self {
        Self {
            input,
            version,
            first_block: true,
        }
    }

    /// Decode all records, dispatching each one into the visitor.
    ///
    /// An empty stream is valid and produces no records. A non-empty
    /// stream must start with a header block.
    pub fn read<V>(&mut self, visitor: &mut V) -> Result<()>
    where
        V: SessionInfoVisitor + ExecutionDataVisitor,
    {
        while let Some(block_type) = self.next_block_type()? {
            if self.first_block && block_type != BLOCK_HEADER {
                return Err(ExecMergeError::decode(
                    "Invalid execution data file: stream does not start with a header block",
                ));
            }
            self.first_block = false;
            self.read_block(block_type, visitor)?;
        }
        Ok(())
    }

    fn next_block_type(&mut self) -> Result<Option<u8>> {
        let mut block = [0u8; 1];
        match self.input.read_exact(&mut block) {
            Ok(()) => Ok(Some(block[0])),
            Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
            Err(err) => Err(ExecMergeError::io(
                "Failed to read execution data stream",
                err,
            )),
        }
    }

    fn read_block<V>(&mut self, block_type: u8, visitor: &mut V) -> Result<()>
    where
        V: SessionInfoVisitor + ExecutionDataVisitor,
    {
        match block_type {
            BLOCK_HEADER => self.read_header(),
            BLOCK_SESSION_INFO => self.read_session_info(visitor),
            BLOCK_EXECUTION_DATA => self.read_execution_data(visitor),
            other => Err(ExecMergeError::decode(format!(
                "Unknown block type 0x{other:02x}"
            ))),
        }
    }

    fn read_header(&mut self) -> Result<()> {
        let magic = self.read_u16()?;
        if magic != MAGIC_NUMBER {
            return Err(ExecMergeError::decode(format!(
                "Invalid magic number 0x{magic:04x}"
            )));
        }
        let version = self.read_u16()?;
        if version != self.version.version_char() {
            return Err(ExecMergeError::decode(format!(
                "Incompatible format version 0x{version:04x}, expected 0x{:04x}",
                self.version.version_char()
            )));
        }
        Ok(())
    }

    fn read_session_info<V: SessionInfoVisitor>(&mut self, visitor: &mut V) -> Result<()> {
        let id = self.read_utf()?;
        let start = self.read_i64()?;
        let dump = self.read_i64()?;
        visitor.visit_session_info(&SessionInfo::new(id, start, dump))
    }

    fn read_execution_data<V: ExecutionDataVisitor>(&mut self, visitor: &mut V) -> Result<()> {
        let id = self.read_u64()?;
        let name = self.read_utf()?;
        let probes = self.read_bool_array()?;
        visitor.visit_class_execution(&ExecutionData::new(id, name, probes))
    }

    fn read_utf(&mut self) -> Result<String> {
        let len = usize::from(self.read_u16()?);
        let mut bytes = vec![0u8; len];
        self.input.read_exact(&mut bytes).map_err(map_read_err)?;
        mutf8::decode(&bytes)
    }

    fn read_var_int(&mut self) -> Result<u32> {
        let mut value = 0u32;
        let mut shift = 0u32;
        loop {
            let byte = self.read_u8()?;
            value |= u32::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
            if shift >= 32 {
                return Err(ExecMergeError::decode("Var int value exceeds 32 bits"));
            }
        }
    }

    fn read_bool_array(&mut self) -> Result<Vec<bool>> {
        let count = self.read_var_int()? as usize;
        let mut probes = Vec::with_capacity(count.min(4096));
        let mut buffer = 0u8;
        for i in 0..count {
            if i % 8 == 0 {
                buffer = self.read_u8()?;
            }
            probes.push(buffer & 0x01 != 0);
            buffer >>= 1;
        }
        Ok(probes)
    }

    fn read_u8(&mut self) -> Result<u8> {
        self.input.read_u8().map_err(map_read_err)
    }

    fn read_u16(&mut self) -> Result<u16> {
        self.input.read_u16::<BigEndian>().map_err(map_read_err)
    }

    fn read_u64(&mut self) -> Result<u64> {
        self.input.read_u64::<BigEndian>().map_err(map_read_err)
    }

    fn read_i64(&mut self) -> Result<i64> {
        self.input.read_i64::<BigEndian>().map_err(map_read_err)
    }
}

fn map_read_err(err: io::Error) -> ExecMergeError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        ExecMergeError::decode("Unexpected end of execution data stream")
    } else {
        ExecMergeError::io("Failed to read execution data stream", err)
    }
}
