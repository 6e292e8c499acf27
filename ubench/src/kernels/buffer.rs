//! Anonymous buffers for kernel arguments.

use std::io;

use memmap2::{MmapMut, MmapOptions};

/// One anonymous, pre-faulted mapping, plus the byte offset at which the
/// kernel is told it starts.
///
/// Kernels take their input at deliberately misalignable addresses (that is
/// what the `off*` parameters are for), but handing out an offset pointer
/// must never obscure where the mapping actually begins. The buffer owns
/// `(base, offset, length)` as one value; derived pointers are produced on
/// demand and the base is what gets unmapped on drop.
pub struct ArgumentBuffer {
    map: MmapMut,
    offset: usize,
}

impl ArgumentBuffer {
    /// Map `len` zeroed bytes, pre-faulted so the first kernel invocation
    /// does not pay for page-in, and record `offset` as the published start.
    pub fn anonymous(len: usize, offset: usize) -> io::Result<ArgumentBuffer> {
        debug_assert!(offset <= len);
        let map = MmapOptions::new().len(len).populate().map_anon()?;
        Ok(ArgumentBuffer { map, offset })
    }

    /// The address the kernel sees.
    pub fn as_ptr(&self) -> *const u8 {
        unsafe { self.map.as_ptr().add(self.offset) }
    }

    /// The address the kernel sees, writable.
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        unsafe { self.map.as_mut_ptr().add(self.offset) }
    }

    /// Mapping length in bytes, offset included.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True for a zero-length request; never true for a mapped buffer.
    pub fn is_empty(&self) -> bool {
        self.map.len() == 0
    }
}
