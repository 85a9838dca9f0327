// LogTrim - core/reader.rs
//
// Streaming DataFlash record reader with exact byte-offset tracking.
//
// The source file is memory-mapped read-only; records are decoded
// sequentially over the map, so only one record is materialised at a time
// regardless of file size. Offsets are derived from FMT-declared lengths,
// never from scanning, which makes re-opening the same path yield an
// identical sequence — the exporter relies on this to run an independent
// second pass instead of replaying the first.
//
// Error policy (two tiers):
//   - Field-level decode anomalies degrade the record (missing timestamp
//     falls back to the synthetic clock) and never stop the stream.
//   - Anything that prevents computing the next record's start offset is
//     `StructuralCorruption` and terminates the stream: continuing would
//     desynchronise the timeline from the real file and corrupt export
//     silently.

use crate::core::dataflash::{
    self, FormatTable, FMT_MSG_ID, HEAD1, HEAD2, HEADER_LEN,
};
use crate::core::model::RecordEnvelope;
use crate::core::timestamp::{self, FallbackClock};
use crate::util::error::ParseError;
use memmap2::Mmap;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Sequential reader over one DataFlash log file.
///
/// The map (and with it the file handle) is released when the stream is
/// dropped, on every exit path including error and cancellation.
#[derive(Debug)]
pub struct RecordStream {
    path: PathBuf,
    mmap: Mmap,
    table: FormatTable,
    pos: usize,
    sequence: u64,
    fallback: FallbackClock,
    saw_time: bool,
    finished: bool,
}

impl RecordStream {
    /// Open a log for streaming.
    ///
    /// A zero-length file is rejected up front: it cannot contain records
    /// and mapping it would be invalid anyway.
    pub fn open(path: &Path) -> Result<Self, ParseError> {
        let file = File::open(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let len = file
            .metadata()
            .map_err(|source| ParseError::Io {
                path: path.to_path_buf(),
                source,
            })?
            .len();
        if len == 0 {
            return Err(ParseError::EmptyLog {
                path: path.to_path_buf(),
            });
        }

        // SAFETY: the map is read-only and never mutated through this
        // process. External modification of the file during the map's
        // lifetime is the documented memmap2 caveat, acceptable for a
        // tool reading already-written flight logs.
        let mmap = unsafe { Mmap::map(&file) }.map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!(path = %path.display(), size = len, "Record stream opened");

        Ok(Self {
            path: path.to_path_buf(),
            mmap,
            table: FormatTable::new(),
            pos: 0,
            sequence: 0,
            fallback: FallbackClock::new(),
            saw_time: false,
            finished: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Source file size in bytes.
    pub fn file_size(&self) -> u64 {
        self.mmap.len() as u64
    }

    /// True once any yielded record carried a genuine time field.
    pub fn has_time(&self) -> bool {
        self.saw_time
    }

    /// Decode the next record, or `None` at end of file.
    ///
    /// After a structural error the stream is fused: further calls return
    /// `Ok(None)`.
    pub fn next_record(&mut self) -> Result<Option<RecordEnvelope>, ParseError> {
        if self.finished {
            return Ok(None);
        }
        match self.advance() {
            Ok(Some(env)) => Ok(Some(env)),
            Ok(None) => {
                self.finished = true;
                Ok(None)
            }
            Err(e) => {
                self.finished = true;
                Err(e)
            }
        }
    }

    /// The exact source bytes of an envelope previously yielded by this
    /// stream, suitable for verbatim copying.
    pub fn raw_bytes(&self, env: &RecordEnvelope) -> &[u8] {
        &self.mmap[env.byte_start as usize..env.byte_end as usize]
    }

    fn corruption(&self, offset: usize, reason: String) -> ParseError {
        ParseError::StructuralCorruption {
            path: self.path.clone(),
            offset: offset as u64,
            reason,
        }
    }

    fn advance(&mut self) -> Result<Option<RecordEnvelope>, ParseError> {
        let buf = &self.mmap[..];
        let start = self.pos;

        if start == buf.len() {
            return Ok(None);
        }
        if start + HEADER_LEN > buf.len() {
            return Err(self.corruption(
                start,
                format!("truncated header: {} trailing byte(s)", buf.len() - start),
            ));
        }
        if buf[start] != HEAD1 || buf[start + 1] != HEAD2 {
            return Err(self.corruption(
                start,
                format!(
                    "bad sync bytes {:#04x} {:#04x}, expected {HEAD1:#04x} {HEAD2:#04x}",
                    buf[start],
                    buf[start + 1]
                ),
            ));
        }

        let msg_id = buf[start + 2];
        let total_len = self.table.length_of(msg_id).ok_or_else(|| {
            self.corruption(
                start,
                format!("unknown message id {msg_id:#04x} with no FMT definition"),
            )
        })?;
        if start + total_len > buf.len() {
            return Err(self.corruption(
                start,
                format!(
                    "message '{}' needs {total_len} bytes but only {} remain",
                    self.table
                        .get(msg_id)
                        .map(|d| d.name.as_str())
                        .unwrap_or("?"),
                    buf.len() - start
                ),
            ));
        }

        let payload = &buf[start + HEADER_LEN..start + total_len];

        if msg_id == FMT_MSG_ID {
            let def = dataflash::parse_fmt_payload(payload);
            if def.length < HEADER_LEN {
                return Err(self.corruption(
                    start,
                    format!(
                        "FMT for '{}' declares impossible length {}",
                        def.name, def.length
                    ),
                ));
            }
            self.table.register(def);
        }

        // The definition for msg_id is guaranteed present: either it was
        // looked up above, or (for FMT) it is the seeded self-definition.
        let def = self.table.get(msg_id).ok_or_else(|| {
            self.corruption(start, format!("definition vanished for id {msg_id:#04x}"))
        })?;
        let record = dataflash::decode_record(def, payload);

        let timestamp = match timestamp::resolve(&record) {
            Some(t) => {
                self.saw_time = true;
                t
            }
            None => self.fallback.tick(),
        };

        let env = RecordEnvelope {
            sequence_number: self.sequence,
            timestamp,
            byte_start: start as u64,
            byte_end: (start + total_len) as u64,
            record,
        };

        self.pos = start + total_len;
        self.sequence += 1;
        Ok(Some(env))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn fixed(s: &str, width: usize) -> Vec<u8> {
        let mut out = s.as_bytes().to_vec();
        out.resize(width, 0);
        out
    }

    /// FMT message declaring `msg_id` with the given layout.
    fn fmt_msg(msg_id: u8, length: u8, name: &str, format: &str, columns: &str) -> Vec<u8> {
        let mut msg = vec![HEAD1, HEAD2, FMT_MSG_ID, msg_id, length];
        msg.extend(fixed(name, 4));
        msg.extend(fixed(format, 16));
        msg.extend(fixed(columns, 64));
        msg
    }

    /// "TEST" data message: format "Qf" -> TimeUS, Value. Total 15 bytes.
    fn test_msg(time_us: u64, value: f32) -> Vec<u8> {
        let mut msg = vec![HEAD1, HEAD2, 0x01];
        msg.extend(time_us.to_le_bytes());
        msg.extend(value.to_le_bytes());
        msg
    }

    fn write_log(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(bytes).unwrap();
        f.flush().unwrap();
        f
    }

    fn sample_log(n: u64) -> Vec<u8> {
        let mut bytes = fmt_msg(0x01, 15, "TEST", "Qf", "TimeUS,Value");
        for i in 0..n {
            bytes.extend(test_msg(i * 1_000_000, i as f32));
        }
        bytes
    }

    #[test]
    fn test_streams_records_in_file_order_with_exact_offsets() {
        let f = write_log(&sample_log(3));
        let mut stream = RecordStream::open(f.path()).unwrap();

        let fmt = stream.next_record().unwrap().unwrap();
        assert_eq!(fmt.sequence_number, 0);
        assert_eq!(fmt.byte_start, 0);
        assert_eq!(fmt.byte_end, 89);
        assert_eq!(fmt.record.name, "FMT");

        let mut prev_end = fmt.byte_end;
        for i in 0..3u64 {
            let env = stream.next_record().unwrap().unwrap();
            assert_eq!(env.sequence_number, i + 1);
            assert_eq!(env.byte_start, prev_end);
            assert_eq!(env.byte_end, prev_end + 15);
            assert_eq!(env.timestamp, i as f64);
            assert_eq!(env.record.name, "TEST");
            assert_eq!(env.record.numeric("Value"), Some(i as f64));
            prev_end = env.byte_end;
        }
        assert!(stream.next_record().unwrap().is_none());
        assert!(stream.has_time());
    }

    #[test]
    fn test_reopen_yields_identical_sequence() {
        let f = write_log(&sample_log(10));

        let collect = || {
            let mut stream = RecordStream::open(f.path()).unwrap();
            let mut out = Vec::new();
            while let Some(env) = stream.next_record().unwrap() {
                out.push((env.sequence_number, env.timestamp, env.byte_start, env.byte_end));
            }
            out
        };

        assert_eq!(collect(), collect());
    }

    #[test]
    fn test_empty_file_is_empty_log() {
        let f = write_log(&[]);
        // Zero-length file rejected at open.
        match RecordStream::open(f.path()) {
            Err(ParseError::EmptyLog { .. }) => {}
            other => panic!("expected EmptyLog, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_sync_bytes_is_structural_corruption() {
        let mut bytes = sample_log(2);
        let offset = 89 + 15; // start of the second data record
        bytes[offset] = 0xFF;
        let f = write_log(&bytes);

        let mut stream = RecordStream::open(f.path()).unwrap();
        stream.next_record().unwrap(); // FMT
        stream.next_record().unwrap(); // record 0
        match stream.next_record() {
            Err(ParseError::StructuralCorruption { offset: o, .. }) => {
                assert_eq!(o, offset as u64)
            }
            other => panic!("expected StructuralCorruption, got {other:?}"),
        }
        // Stream is fused after a structural error.
        assert!(stream.next_record().unwrap().is_none());
    }

    #[test]
    fn test_unknown_msg_id_is_structural_corruption() {
        let mut bytes = sample_log(1);
        bytes.extend([HEAD1, HEAD2, 0x55]); // no FMT for 0x55
        let f = write_log(&bytes);

        let mut stream = RecordStream::open(f.path()).unwrap();
        stream.next_record().unwrap();
        stream.next_record().unwrap();
        match stream.next_record() {
            Err(ParseError::StructuralCorruption { reason, .. }) => {
                assert!(reason.contains("no FMT definition"), "{reason}")
            }
            other => panic!("expected StructuralCorruption, got {other:?}"),
        }
    }

    #[test]
    fn test_truncated_tail_is_structural_corruption() {
        let mut bytes = sample_log(2);
        bytes.truncate(bytes.len() - 4); // cut into the last payload
        let f = write_log(&bytes);

        let mut stream = RecordStream::open(f.path()).unwrap();
        stream.next_record().unwrap();
        stream.next_record().unwrap();
        match stream.next_record() {
            Err(ParseError::StructuralCorruption { reason, .. }) => {
                assert!(reason.contains("remain"), "{reason}")
            }
            other => panic!("expected StructuralCorruption, got {other:?}"),
        }
    }

    #[test]
    fn test_timeless_records_use_synthetic_counter() {
        // "EVT" has no recognised time field.
        let mut bytes = fmt_msg(0x02, 4, "EVT", "B", "Id");
        for id in [7u8, 8, 9] {
            bytes.extend([HEAD1, HEAD2, 0x02, id]);
        }
        let f = write_log(&bytes);

        let mut stream = RecordStream::open(f.path()).unwrap();
        let mut timestamps = Vec::new();
        while let Some(env) = stream.next_record().unwrap() {
            timestamps.push(env.timestamp);
        }
        // FMT itself is also timeless, so the counter covers all 4 records.
        assert_eq!(timestamps, vec![0.0, 1.0, 2.0, 3.0]);
        assert!(!stream.has_time());
    }

    #[test]
    fn test_raw_bytes_match_source_slice() {
        let bytes = sample_log(2);
        let f = write_log(&bytes);

        let mut stream = RecordStream::open(f.path()).unwrap();
        while let Some(env) = stream.next_record().unwrap() {
            let slice = &bytes[env.byte_start as usize..env.byte_end as usize];
            assert_eq!(stream.raw_bytes(&env), slice);
        }
    }
}
