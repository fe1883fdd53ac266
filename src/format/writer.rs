//! Streaming encoder for execution data files.

use std::io::Write;

use byteorder::{BigEndian, WriteBytesExt};

use crate::core::errors::{ExecMergeError, Result};
use crate::data::execution::ExecutionData;
use crate::data::session::SessionInfo;
use crate::data::visitor::{ExecutionDataVisitor, SessionInfoVisitor};
use crate::format::{
    mutf8, FormatVersion, BLOCK_EXECUTION_DATA, BLOCK_HEADER, BLOCK_SESSION_INFO, MAGIC_NUMBER,
};

/// Encoder for execution data streams.
///
/// The header block for the bound format version is written at
/// construction, then one block per visited record. The writer implements
/// both visitor traits so stores and accumulators can be replayed straight
/// into it.
pub struct ExecutionDataWriter<W: Write> {
    output: W,
    version: FormatVersion,
}

impl<W: Write> ExecutionDataWriter<W> {
    /// Create an encoder and immediately write the stream header.
    pub fn new(output: W, version: FormatVersion) -> Result<Self> {
        let mut writer = Self { output, version };
        writer.write_header()?;
        Ok(writer)
    }

    /// The format version this writer encodes.
    pub fn version(&self) -> FormatVersion {
        self.version
    }

    /// Flush the underlying output.
    pub fn flush(&mut self) -> Result<()> {
        self.output.flush()?;
        Ok(())
    }

    /// Consume the writer, returning the underlying output.
    pub fn into_inner(self) -> W {
        self.output
    }

    fn write_header(&mut self) -> Result<()> {
        self.output.write_u8(BLOCK_HEADER)?;
        self.output.write_u16::<BigEndian>(MAGIC_NUMBER)?;
        self.output
            .write_u16::<BigEndian>(self.version.version_char())?;
        Ok(())
    }

    fn write_utf(&mut self, value: &str) -> Result<()> {
        let bytes = mutf8::encode(value)?;
        self.output.write_u16::<BigEndian>(bytes.len() as u16)?;
        self.output.write_all(&bytes)?;
        Ok(())
    }

    fn write_var_int(&mut self, mut value: u32) -> Result<()> {
        while value & !0x7F != 0 {
            self.output.write_u8((value & 0x7F) as u8 | 0x80)?;
            value >>= 7;
        }
        self.output.write_u8(value as u8)?;
        Ok(())
    }

    fn write_bool_array(&mut self, probes: &[bool]) -> Result<()> {
        self.write_var_int(probe_count(probes.len())?)?;
        let mut buffer = 0u8;
        let mut bits = 0u32;
        for probe in probes {
            if *probe {
                buffer |= 1 << bits;
            }
            bits += 1;
            if bits == 8 {
                self.output.write_u8(buffer)?;
                buffer = 0;
                bits = 0;
            }
        }
        if bits > 0 {
            self.output.write_u8(buffer)?;
        }
        Ok(())
    }
}

impl<W: Write> SessionInfoVisitor for ExecutionDataWriter<W> {
    fn visit_session_info(&mut self, info: &SessionInfo) -> Result<()> {
        self.output.write_u8(BLOCK_SESSION_INFO)?;
        self.write_utf(&info.id)?;
        self.output.write_i64::<BigEndian>(info.start)?;
        self.output.write_i64::<BigEndian>(info.dump)?;
        Ok(())
    }
}

impl<W: Write> ExecutionDataVisitor for ExecutionDataWriter<W> {
    fn visit_class_execution(&mut self, data: &ExecutionData) -> Result<()> {
        self.output.write_u8(BLOCK_EXECUTION_DATA)?;
        self.output.write_u64::<BigEndian>(data.id)?;
        self.write_utf(&data.name)?;
        self.write_bool_array(&data.probes)?;
        Ok(())
    }
}

fn probe_count(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| {
        ExecMergeError::decode(format!(
            "Probe array has {len} elements but the format allows at most {}",
            u32::MAX
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::reader::ExecutionDataReader;
    use proptest::prelude::*;
    use std::io::Cursor;

    fn encoded(write: impl FnOnce(&mut ExecutionDataWriter<Vec<u8>>) -> Result<()>) -> Vec<u8> {
        let mut writer = ExecutionDataWriter::new(Vec::new(), FormatVersion::Current).unwrap();
        write(&mut writer).unwrap();
        let mut bytes = writer.into_inner();
        bytes.drain(..5); // strip the header block
        bytes
    }

    #[test]
    fn test_writes_current_header_on_construction() {
        let writer = ExecutionDataWriter::new(Vec::new(), FormatVersion::Current).unwrap();
        assert_eq!(writer.into_inner(), vec![0x01, 0xC0, 0xC0, 0x10, 0x07]);
    }

    #[test]
    fn test_writes_legacy_header_on_construction() {
        let writer = ExecutionDataWriter::new(Vec::new(), FormatVersion::Legacy).unwrap();
        assert_eq!(writer.into_inner(), vec![0x01, 0xC0, 0xC0, 0x10, 0x06]);
    }

    #[test]
    fn test_session_info_block_layout() {
        let bytes = encoded(|writer| writer.visit_session_info(&SessionInfo::new("run1", 1, 2)));

        let mut expected = vec![0x10, 0x00, 0x04];
        expected.extend_from_slice(b"run1");
        expected.extend_from_slice(&1i64.to_be_bytes());
        expected.extend_from_slice(&2i64.to_be_bytes());
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_execution_data_block_layout() {
        let data = ExecutionData::new(1, "A", vec![true, false, true]);
        let bytes = encoded(|writer| writer.visit_class_execution(&data));

        let mut expected = vec![0x11];
        expected.extend_from_slice(&1u64.to_be_bytes());
        expected.extend_from_slice(&[0x00, 0x01, b'A']);
        // probe count 3, bits packed LSB-first: 0b101
        expected.extend_from_slice(&[0x03, 0x05]);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_all_false_probes_are_still_written() {
        let data = ExecutionData::new(7, "B", vec![false, false]);
        let bytes = encoded(|writer| writer.visit_class_execution(&data));
        assert_eq!(bytes[0], 0x11);
        assert_eq!(bytes.last(), Some(&0x00));
    }

    #[test]
    fn test_var_int_encoding() {
        let cases: [(u32, &[u8]); 6] = [
            (0, &[0x00]),
            (127, &[0x7F]),
            (128, &[0x80, 0x01]),
            (300, &[0xAC, 0x02]),
            (0x0010_0000, &[0x80, 0x80, 0x40]),
            (u32::MAX, &[0xFF, 0xFF, 0xFF, 0xFF, 0x0F]),
        ];
        for (value, expected) in cases {
            let bytes = encoded(|writer| writer.write_var_int(value));
            assert_eq!(bytes, expected, "var int encoding of {value}");
        }
    }

    #[test]
    fn test_empty_probe_array() {
        let bytes = encoded(|writer| writer.write_bool_array(&[]));
        assert_eq!(bytes, vec![0x00]);
    }

    #[test]
    fn test_nine_probes_span_two_bytes() {
        let probes = [true, false, false, false, false, false, false, false, true];
        let bytes = encoded(|writer| writer.write_bool_array(&probes));
        assert_eq!(bytes, vec![0x09, 0x01, 0x01]);
    }

    #[test]
    fn test_probe_count_within_var_int_range() {
        assert_eq!(probe_count(0).unwrap(), 0);
        assert_eq!(probe_count(300).unwrap(), 300);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_probe_count_beyond_var_int_range_is_rejected() {
        let err = probe_count(u32::MAX as usize + 1).unwrap_err();
        assert!(matches!(err, ExecMergeError::Decode { .. }));
    }

    #[derive(Default)]
    struct Recorder {
        sessions: Vec<SessionInfo>,
        data: Vec<ExecutionData>,
    }

    impl SessionInfoVisitor for Recorder {
        fn visit_session_info(&mut self, info: &SessionInfo) -> Result<()> {
            self.sessions.push(info.clone());
            Ok(())
        }
    }

    impl ExecutionDataVisitor for Recorder {
        fn visit_class_execution(&mut self, data: &ExecutionData) -> Result<()> {
            self.data.push(data.clone());
            Ok(())
        }
    }

    proptest! {
        #[test]
        fn prop_written_records_decode_back(
            id in any::<u64>(),
            name in "[a-zA-Z0-9/$]{1,60}",
            probes in prop::collection::vec(any::<bool>(), 0..300),
            start in any::<i64>(),
            dump in any::<i64>(),
        ) {
            let mut writer =
                ExecutionDataWriter::new(Vec::new(), FormatVersion::Current).unwrap();
            writer.visit_session_info(&SessionInfo::new(name.clone(), start, dump)).unwrap();
            writer
                .visit_class_execution(&ExecutionData::new(id, name.clone(), probes.clone()))
                .unwrap();
            let bytes = writer.into_inner();

            let mut recorder = Recorder::default();
            let mut reader = ExecutionDataReader::new(Cursor::new(bytes), FormatVersion::Current);
            reader.read(&mut recorder).unwrap();

            prop_assert_eq!(&recorder.sessions, &vec![SessionInfo::new(name.clone(), start, dump)]);
            prop_assert_eq!(&recorder.data, &vec![ExecutionData::new(id, name, probes)]);
        }
    }
}
