//! Loading a submitted ELF image into executable memory.
//!
//! The service accepts self-contained, position-independent images: every
//! loadable segment is copied at its virtual offset into one anonymous
//! mapping, the mapping is sealed read+execute, and the requested symbol's
//! address inside it becomes the kernel entry point. Images that would need
//! relocation processing to run are rejected at ingest rather than loaded
//! wrong, so a client that links against anything external finds out
//! immediately instead of faulting mid-measurement.

use std::io;

use memmap2::{Mmap, MmapOptions};
use object::{Architecture, Object, ObjectSection, ObjectSegment, ObjectSymbol};
use thiserror::Error;

use crate::kernels::KernelFn;

/// Why an image could not be turned into a callable kernel.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The bytes are not a well-formed object file.
    #[error("malformed image: {0}")]
    Parse(#[from] object::read::Error),

    /// The image is for some other machine or byte order.
    #[error("image is not a little-endian x86-64 ELF")]
    WrongArchitecture,

    /// Nothing in the image asks to be loaded.
    #[error("image has no loadable segments")]
    NoSegments,

    /// The image carries relocations the loader will not process.
    #[error("image requires relocation processing")]
    Relocations,

    /// The promised kernel symbol is not defined in the image.
    #[error("symbol {0:?} not found in image")]
    MissingSymbol(String),

    /// The symbol exists but points outside the loadable segments.
    #[error("symbol {0:?} falls outside the loadable segments")]
    SymbolOutOfRange(String),

    /// The operating system refused the executable mapping.
    #[error("failed to map executable region: {0}")]
    Map(#[from] io::Error),
}

/// A kernel loaded into executable memory.
///
/// Owns the mapping; the function pointer from [`entry`](Self::entry) is
/// valid for exactly as long as this value lives.
pub struct LoadedKernel {
    map: Mmap,
    offset: usize,
}

impl LoadedKernel {
    /// The kernel's entry point.
    pub fn entry(&self) -> KernelFn {
        let address = unsafe { self.map.as_ptr().add(self.offset) };
        unsafe { std::mem::transmute::<*const u8, KernelFn>(address) }
    }

    /// Total bytes mapped for the image.
    pub fn mapped_len(&self) -> usize {
        self.map.len()
    }
}

impl std::fmt::Debug for LoadedKernel {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            fmt,
            "LoadedKernel {{ base: {:p}, offset: {:#x} }}",
            self.map.as_ptr(),
            self.offset
        )
    }
}

/// Load `image` and resolve `symbol` to a callable address.
pub fn load(image: &[u8], symbol: &str) -> Result<LoadedKernel, LoadError> {
    let object = object::File::parse(image)?;
    if object.architecture() != Architecture::X86_64 || !object.is_little_endian() {
        return Err(LoadError::WrongArchitecture);
    }

    // No relocation processing: an image that still has fixups pending
    // cannot be run by copying bytes around.
    for section in object.sections() {
        if section.relocations().next().is_some() {
            return Err(LoadError::Relocations);
        }
    }

    // The span of virtual addresses the segments occupy. Images link at
    // arbitrary (usually zero) base addresses; only the layout within the
    // span matters, since the whole thing must be position-independent
    // anyway.
    let mut lo = u64::MAX;
    let mut hi = 0;
    for segment in object.segments() {
        let size = segment.size();
        if size == 0 {
            continue;
        }
        lo = lo.min(segment.address());
        hi = hi.max(segment.address() + size);
    }
    if lo > hi {
        return Err(LoadError::NoSegments);
    }
    let base = lo & !(page_size() as u64 - 1);
    let span = (hi - base) as usize;

    let mut map = MmapOptions::new().len(span).map_anon()?;
    for segment in object.segments() {
        let data = segment.data()?;
        let offset = (segment.address() - base) as usize;
        // Anything past the file data within the segment (bss) stays as the
        // zeroes the anonymous mapping came with.
        map[offset..offset + data.len()].copy_from_slice(data);
    }

    let address = object
        .symbols()
        .chain(object.dynamic_symbols())
        .filter(|candidate| candidate.is_definition())
        .find(|candidate| candidate.name() == Ok(symbol))
        .map(|candidate| candidate.address())
        .ok_or_else(|| LoadError::MissingSymbol(symbol.to_owned()))?;
    if address < lo || address >= hi {
        return Err(LoadError::SymbolOutOfRange(symbol.to_owned()));
    }

    let map = map.make_exec()?;
    Ok(LoadedKernel {
        map,
        offset: (address - base) as usize,
    })
}

fn page_size() -> usize {
    // sysconf cannot fail for _SC_PAGESIZE.
    unsafe { libc::sysconf(libc::_SC_PAGESIZE) as usize }
}
