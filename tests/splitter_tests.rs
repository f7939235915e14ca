//! Splitter tests: delimiters, trailing remainders, fragments, slab placement.

use recfeed::engine::Splitter;
use recfeed::{Backing, Delimiter, ReaderOpts, Record};
use std::io::{self, Cursor, Read};

fn opts(delimiter: Delimiter, slab_size: usize, buffer_size: usize) -> ReaderOpts {
    ReaderOpts {
        delimiter,
        slab_size,
        buffer_size,
        ..Default::default()
    }
}

fn split_with(input: &[u8], opts: &ReaderOpts) -> Vec<Record> {
    let mut out = Vec::new();
    Splitter::new(opts)
        .feed(Cursor::new(input.to_vec()), |r| out.push(r))
        .unwrap();
    out
}

fn split(input: &[u8]) -> Vec<Vec<u8>> {
    split_with(input, &ReaderOpts::default())
        .into_iter()
        .map(|r| r.to_vec())
        .collect()
}

fn strs(items: &[&str]) -> Vec<Vec<u8>> {
    items.iter().map(|s| s.as_bytes().to_vec()).collect()
}

// --- delimiters and edge cases ---

#[test]
fn test_empty_input_yields_nothing() {
    assert!(split(b"").is_empty());
}

#[test]
fn test_lines_without_trailing_empty_record() {
    assert_eq!(split(b"a\nb\n"), strs(&["a", "b"]));
}

#[test]
fn test_unterminated_final_record() {
    assert_eq!(split(b"a\nbc"), strs(&["a", "bc"]));
}

#[test]
fn test_interior_empty_records_kept() {
    assert_eq!(split(b"a\n\n\nb\n"), strs(&["a", "", "", "b"]));
    assert_eq!(split(b"\n"), strs(&[""]));
}

#[test]
fn test_nul_delimited() {
    let o = opts(Delimiter::Nul, 128 * 1024, 64 * 1024);
    let got: Vec<Vec<u8>> = split_with(b"a\0b\0", &o).iter().map(|r| r.to_vec()).collect();
    assert_eq!(got, strs(&["a", "b"]));
}

#[test]
fn test_nul_mode_keeps_newlines() {
    let o = opts(Delimiter::Nul, 128 * 1024, 64 * 1024);
    let got: Vec<Vec<u8>> = split_with(b"a\nb\0c", &o).iter().map(|r| r.to_vec()).collect();
    assert_eq!(got, strs(&["a\nb", "c"]));
}

#[test]
fn test_crlf_stripped_when_enabled() {
    let mut out = Vec::new();
    Splitter::new(&ReaderOpts::default())
        .with_strip_cr(true)
        .feed(Cursor::new(b"a\r\nb\r\nc\r".to_vec()), |r| out.push(r.to_vec()))
        .unwrap();
    // The unterminated tail keeps its CR.
    assert_eq!(out, strs(&["a", "b", "c\r"]));
}

#[test]
fn test_crlf_split_across_buffer_fills() {
    let o = opts(Delimiter::Newline, 1024, 4);
    let mut out = Vec::new();
    Splitter::new(&o)
        .with_strip_cr(true)
        .feed(Cursor::new(b"abc\r\nxyz\n".to_vec()), |r| out.push(r.to_vec()))
        .unwrap();
    assert_eq!(out, strs(&["abc", "xyz"]));
}

#[test]
fn test_cr_kept_without_stripping() {
    let mut out = Vec::new();
    Splitter::new(&ReaderOpts::default())
        .with_strip_cr(false)
        .feed(Cursor::new(b"a\r\n".to_vec()), |r| out.push(r.to_vec()))
        .unwrap();
    assert_eq!(out, strs(&["a\r"]));
}

// --- fragments spanning buffer fills ---

#[test]
fn test_record_spanning_many_buffer_fills() {
    let long = "x".repeat(1000);
    let input = format!("short\n{long}\nend");
    let o = opts(Delimiter::Newline, 128 * 1024, 16);
    let got: Vec<Vec<u8>> = split_with(input.as_bytes(), &o)
        .iter()
        .map(|r| r.to_vec())
        .collect();
    assert_eq!(got, strs(&["short", &long, "end"]));
}

#[test]
fn test_concatenation_reproduces_input() {
    let input: Vec<u8> = (0..5000u32)
        .flat_map(|i| {
            let mut line = format!("line-{}", i * 7919 % 1013).into_bytes();
            if i % 37 == 0 {
                line.extend(std::iter::repeat_n(b'z', 300));
            }
            line.push(b'\n');
            line
        })
        .collect();
    let o = opts(Delimiter::Newline, 2048, 64);
    let records = split_with(&input, &o);
    let mut joined = Vec::new();
    for r in &records {
        joined.extend_from_slice(r);
        joined.push(b'\n');
    }
    assert_eq!(joined, input);
}

// --- slab placement ---

#[test]
fn test_oversized_record_not_in_slab() {
    // slab 1000 bytes → records over 100 bytes are dedicated
    let big = "b".repeat(101);
    let input = format!("s1\n{big}\ns2\n");
    let o = opts(Delimiter::Newline, 1000, 64);
    let records = split_with(input.as_bytes(), &o);
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].backing(), Backing::Slab(0));
    assert_eq!(records[1].backing(), Backing::Dedicated);
    assert_eq!(records[2].backing(), Backing::Slab(0));

    let slab_lo = records[0].as_ptr() as usize;
    let slab_hi = slab_lo + 1000;
    let big_ptr = records[1].as_ptr() as usize;
    assert!(big_ptr + records[1].len() <= slab_lo || big_ptr >= slab_hi);
}

#[test]
fn test_new_slab_when_current_is_full() {
    let line = "y".repeat(50);
    let input: String = (0..30).map(|_| format!("{line}\n")).collect();
    let o = opts(Delimiter::Newline, 500, 64);
    let records = split_with(input.as_bytes(), &o);
    assert_eq!(records.len(), 30);
    assert_eq!(records[0].backing(), Backing::Slab(0));
    assert_eq!(records[9].backing(), Backing::Slab(0));
    assert_eq!(records[10].backing(), Backing::Slab(1));
    assert_eq!(records[29].backing(), Backing::Slab(2));
    assert!(records.iter().all(|r| r.as_bytes() == line.as_bytes()));
}

#[test]
fn test_records_outlive_splitter() {
    let records = split_with(b"keep\nme\n", &ReaderOpts::default());
    let copy: Vec<Record> = records.to_vec();
    drop(records);
    assert_eq!(copy[0].as_bytes(), b"keep");
    assert_eq!(copy[1].as_bytes(), b"me");
}

// --- errors ---

/// Yields `data` then fails.
struct FailingReader {
    data: Cursor<Vec<u8>>,
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.data.read(buf)?;
        if n == 0 {
            return Err(io::Error::other("boom"));
        }
        Ok(n)
    }
}

#[test]
fn test_io_error_reported_after_partial_record() {
    let mut out = Vec::new();
    let src = FailingReader {
        data: Cursor::new(b"a\npart".to_vec()),
    };
    let res = Splitter::new(&ReaderOpts::default()).feed(src, |r| out.push(r.to_vec()));
    assert!(res.is_err());
    assert_eq!(out, strs(&["a", "part"]));
}

#[test]
fn test_feed_returns_record_count() {
    let n = Splitter::new(&ReaderOpts::default())
        .feed(Cursor::new(b"1\n2\n3".to_vec()), |_| {})
        .unwrap();
    assert_eq!(n, 3);
}
