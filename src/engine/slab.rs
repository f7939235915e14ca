//! Slab arena for record storage.
//!
//! Records are views into large shared buffers. Small records are carved
//! contiguously from the current slab; a slab is freed once the last record
//! pointing into it is dropped. Records above a tenth of the slab size get a
//! dedicated allocation so rare long lines do not waste slab space.

use bytes::{Bytes, BytesMut};
use log::debug;
use std::ops::Deref;

use crate::utils::config::BufferConsts;

/// Where a record's bytes live.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backing {
    /// Shared slab, identified by its generation within one allocator.
    Slab(u64),
    /// Allocation owned by this record alone.
    Dedicated,
}

/// One candidate entry: a line, a NUL-terminated entry, or a path.
/// Cloning is cheap (reference count bump).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    data: Bytes,
    backing: Backing,
}

impl Record {
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn backing(&self) -> Backing {
        self.backing
    }
}

impl Deref for Record {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.data
    }
}

impl AsRef<[u8]> for Record {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

/// Hands out records from a current slab, starting a fresh slab when the next
/// record does not fit. A record never straddles two slabs.
pub struct SlabAllocator {
    slab: BytesMut,
    slab_size: usize,
    max_inline: usize,
    generation: u64,
}

impl SlabAllocator {
    pub fn new(slab_size: usize) -> Self {
        let slab_size = slab_size.max(1);
        SlabAllocator {
            slab: BytesMut::with_capacity(slab_size),
            slab_size,
            max_inline: slab_size / BufferConsts::OVERSIZE_DIVISOR,
            generation: 0,
        }
    }

    /// Number of slabs started so far (the first one included).
    pub fn slabs_allocated(&self) -> u64 {
        self.generation + 1
    }

    /// Copy `head` followed by `tail` into one contiguous record.
    pub fn alloc(&mut self, head: &[u8], tail: &[u8]) -> Record {
        let len = head.len() + tail.len();
        if len > self.max_inline {
            let mut buf = BytesMut::with_capacity(len);
            buf.extend_from_slice(head);
            buf.extend_from_slice(tail);
            return Record {
                data: buf.freeze(),
                backing: Backing::Dedicated,
            };
        }
        // After split(), capacity() is what is left of the current slab.
        if self.slab.capacity() < len {
            self.slab = BytesMut::with_capacity(self.slab_size);
            self.generation += 1;
            debug!("slab {} allocated ({} bytes)", self.generation, self.slab_size);
        }
        self.slab.extend_from_slice(head);
        self.slab.extend_from_slice(tail);
        Record {
            data: self.slab.split().freeze(),
            backing: Backing::Slab(self.generation),
        }
    }
}

impl Default for SlabAllocator {
    fn default() -> Self {
        Self::new(BufferConsts::SLAB_SIZE)
    }
}
