use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HunkError {
    #[error("bad header magic: expected {expected:#010x}, found {found:#010x}")]
    BadMagic { expected: u32, found: u32 },
    #[error("unexpected end of file while decoding hunk stream")]
    Truncated,
    #[error("header declares zero sections")]
    EmptySectionList,
    #[error("unsupported hunk load limits: first={first}, last={last}")]
    UnsupportedLoadLimits { first: u32, last: u32 },
    #[error("unsupported hunk type: {0:#010x}")]
    UnsupportedHunkType(u32),
    #[error("unknown hunk type: {0:#010x}")]
    UnknownHunkType(u32),
    #[error("relocation offset {offset:#x} exceeds section memory size {mem_size:#x}")]
    RelocOffsetOutOfRange { offset: u32, mem_size: u32 },
}

/// Non-fatal findings reported alongside a successful parse.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Diagnostic {
    #[error("{0} bytes of extra data at the end of the file")]
    TrailingBytes(usize),
    #[error("section {section}: unrecognized memory flags {flags:#010x}, treating as ANY")]
    UnknownMemoryFlags { section: usize, flags: u32 },
    #[error(
        "section {section}: data size {data_size} exceeds declared memory size {mem_size}, growing memory size"
    )]
    DataSizeExceedsMemSize {
        section: usize,
        data_size: u32,
        mem_size: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Code,
    Data,
    Bss,
}

/// Memory placement hint from the high bits of the header size word.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MemoryTarget {
    #[default]
    Any,
    Chip,
    Fast,
}

pub mod hunk;
