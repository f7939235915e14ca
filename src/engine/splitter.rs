//! Record splitter: buffered byte stream → delimited records backed by slabs.

use log::debug;
use std::io::{self, BufRead, BufReader, ErrorKind, Read};

use crate::engine::slab::{Record, SlabAllocator};
use crate::types::{Delimiter, ReaderOpts};

/// Splits a byte stream on a delimiter and hands each record to a callback.
///
/// A record may span any number of buffer fills; fragments are accumulated and
/// joined once the delimiter (or end of stream) is reached. A delimiter at the
/// very end does not produce a trailing empty record, while empty records
/// between two delimiters are kept.
pub struct Splitter {
    delim: u8,
    strip_cr: bool,
    buffer_size: usize,
    slabs: SlabAllocator,
}

impl Splitter {
    pub fn new(opts: &ReaderOpts) -> Self {
        Splitter {
            delim: opts.delimiter.byte(),
            strip_cr: cfg!(windows) && opts.delimiter == Delimiter::Newline,
            buffer_size: opts.buffer_size.max(1),
            slabs: SlabAllocator::new(opts.slab_size),
        }
    }

    /// Strip a carriage return before each line feed (CRLF input).
    pub fn with_strip_cr(mut self, strip_cr: bool) -> Self {
        self.strip_cr = strip_cr && self.delim == b'\n';
        self
    }

    /// Read `src` to end of stream, calling `on_record` once per record in
    /// stream order. Returns the number of records produced, or the I/O error
    /// that ended the stream (a partial record read before it is still emitted).
    pub fn feed<R, F>(&mut self, src: R, mut on_record: F) -> io::Result<usize>
    where
        R: Read,
        F: FnMut(Record),
    {
        let mut reader = BufReader::with_capacity(self.buffer_size, src);
        let mut pending: Vec<u8> = Vec::new();
        let mut count = 0_usize;
        loop {
            let (used, found) = {
                let buf = match reader.fill_buf() {
                    Ok(buf) => buf,
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(e) => {
                        if !pending.is_empty() {
                            on_record(self.slabs.alloc(&pending, &[]));
                            count += 1;
                        }
                        debug!("stream ended with error after {} records: {}", count, e);
                        return Err(e);
                    }
                };
                if buf.is_empty() {
                    if !pending.is_empty() {
                        on_record(self.slabs.alloc(&pending, &[]));
                        count += 1;
                    }
                    debug!(
                        "stream ended: {} records, {} slabs",
                        count,
                        self.slabs.slabs_allocated()
                    );
                    return Ok(count);
                }
                match buf.iter().position(|&b| b == self.delim) {
                    Some(i) => {
                        on_record(self.carve(&pending, &buf[..i]));
                        count += 1;
                        (i + 1, true)
                    }
                    None => {
                        pending.extend_from_slice(buf);
                        (buf.len(), false)
                    }
                }
            };
            reader.consume(used);
            if found && !pending.is_empty() {
                pending.clear();
                if pending.capacity() > self.buffer_size * 4 {
                    pending = Vec::new();
                }
            }
        }
    }

    /// Join the accumulated fragments with the final piece, dropping a trailing CR when enabled.
    fn carve(&mut self, head: &[u8], tail: &[u8]) -> Record {
        if self.strip_cr {
            if let Some(tail) = tail.strip_suffix(b"\r") {
                return self.slabs.alloc(head, tail);
            }
            if tail.is_empty()
                && let Some(head) = head.strip_suffix(b"\r")
            {
                return self.slabs.alloc(head, &[]);
            }
        }
        self.slabs.alloc(head, tail)
    }
}
