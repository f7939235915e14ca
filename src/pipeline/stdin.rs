//! Standard-input driver.

use log::debug;

use crate::Result;
use crate::engine::slab::Record;
use crate::engine::splitter::Splitter;

/// Feed stdin through the splitter. Always succeeds: empty or unreadable
/// input just means no records.
pub fn read_from_stdin<F>(splitter: &mut Splitter, on_record: F) -> Result<()>
where
    F: FnMut(Record),
{
    match splitter.feed(std::io::stdin(), on_record) {
        Ok(n) => debug!("stdin: {} records", n),
        Err(e) => debug!("stdin: read stopped: {}", e),
    }
    Ok(())
}
