use crate::format::{Diagnostic, HunkError, MemoryTarget, SectionKind};

// Hunk type identifiers from the AmigaDOS doshunks definitions.
pub const HUNK_UNIT: u32 = 0x3e7;
pub const HUNK_NAME: u32 = 0x3e8;
pub const HUNK_CODE: u32 = 0x3e9;
pub const HUNK_DATA: u32 = 0x3ea;
pub const HUNK_BSS: u32 = 0x3eb;
pub const HUNK_RELOC32: u32 = 0x3ec;
pub const HUNK_RELOC16: u32 = 0x3ed;
pub const HUNK_RELOC8: u32 = 0x3ee;
pub const HUNK_EXT: u32 = 0x3ef;
pub const HUNK_SYMBOL: u32 = 0x3f0;
pub const HUNK_DEBUG: u32 = 0x3f1;
pub const HUNK_END: u32 = 0x3f2;
pub const HUNK_HEADER: u32 = 0x3f3;
pub const HUNK_OVERLAY: u32 = 0x3f5;
pub const HUNK_BREAK: u32 = 0x3f6;
pub const HUNK_DREL32: u32 = 0x3f7;
pub const HUNK_DREL16: u32 = 0x3f8;
pub const HUNK_DREL8: u32 = 0x3f9;
pub const HUNK_LIB: u32 = 0x3fa;
pub const HUNK_INDEX: u32 = 0x3fb;
pub const HUNK_RELOC32SHORT: u32 = 0x3fc;
pub const HUNK_RELRELOC32: u32 = 0x3fd;
pub const HUNK_ABSRELOC16: u32 = 0x3fe;

// Memory placement flags in the top nibble of a header size word.
pub const HUNKF_ADVISORY: u32 = 1 << 29;
pub const HUNKF_CHIP: u32 = 1 << 30;
pub const HUNKF_FAST: u32 = 1 << 31;

/// "LINE" - marks a source-line table inside a HUNK_DEBUG record.
pub const HUNK_DEBUG_LINE: u32 = 0x4c49_4e45;

const HUNK_VALUE_MASK: u32 = 0x0fff_ffff;
const HUNK_FLAGS_MASK: u32 = 0xf000_0000;

/// A borrowed view into the raw image, resolved against the owning
/// [`HunkFile`] at read time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub offset: usize,
    pub len: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolEntry {
    pub name: Span,
    /// Byte offset of the symbol within its section. Stored in the file
    /// as a byte value already; no longword conversion is applied.
    pub address: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineEntry {
    pub line: u32,
    pub address: u32,
}

/// One source-line table from a HUNK_DEBUG record. A section keeps its
/// tables in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugLineBlock {
    pub filename: Span,
    pub base_offset: u32,
    pub entries: Vec<LineEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub kind: SectionKind,
    pub memory_target: MemoryTarget,
    /// Load-time reservation in bytes.
    pub mem_size: u32,
    /// Bytes of initialized payload in the file (zero for BSS).
    pub data_size: u32,
    /// Byte offset of the payload in the image; `None` for BSS.
    pub data_offset: Option<usize>,
    /// Byte offset of the last relocation table seen for this section.
    pub reloc_offset: Option<usize>,
    pub reloc_count: u32,
    pub symbols: Vec<SymbolEntry>,
    pub debug_blocks: Vec<DebugLineBlock>,
}

/// A fully decoded load module. Owns the raw image so that every
/// [`Span`] handed out stays resolvable for the lifetime of the result.
#[derive(Debug, PartialEq, Eq)]
pub struct HunkFile {
    pub image: Vec<u8>,
    pub sections: Vec<Section>,
    pub diagnostics: Vec<Diagnostic>,
}

impl HunkFile {
    pub fn bytes(&self, span: Span) -> &[u8] {
        &self.image[span.offset..span.offset + span.len]
    }

    /// Resolves a name span with the trailing NUL padding removed.
    pub fn name(&self, span: Span) -> &[u8] {
        let bytes = self.bytes(span);
        let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        &bytes[..end]
    }

    pub fn section_data(&self, section: &Section) -> Option<&[u8]> {
        section
            .data_offset
            .map(|offset| &self.image[offset..offset + section.data_size as usize])
    }

    /// Wrapping sum of the payload longwords, for report output only.
    pub fn section_checksum(&self, section: &Section) -> Option<u32> {
        self.section_data(section).map(|data| {
            data.chunks_exact(4)
                .fold(0u32, |sum, word| {
                    sum.wrapping_add(u32::from_be_bytes([word[0], word[1], word[2], word[3]]))
                })
        })
    }
}

/// Decodes an AmigaDOS hunk-format load module.
///
/// The whole image must already be in memory; decoding is a single
/// forward pass. Non-fatal findings (trailing bytes, odd memory flags,
/// inconsistent size declarations) are collected in
/// [`HunkFile::diagnostics`].
///
/// # Errors
/// Returns `HunkError` when the image is truncated, carries a record
/// type outside the supported load-module profile, or is otherwise
/// malformed. Every error aborts the parse; there is no partial result.
pub fn parse_hunk_file(image: Vec<u8>) -> Result<HunkFile, HunkError> {
    let mut reader = Reader::new(&image);
    let mut diagnostics = Vec::new();

    let magic = reader.read_u32_be()?;
    if magic != HUNK_HEADER {
        return Err(HunkError::BadMagic {
            expected: HUNK_HEADER,
            found: magic,
        });
    }

    // Resident library names. Loaders in the supported profile emit an
    // empty list, so each entry is just skipped.
    loop {
        let name_words = reader.read_u32_be()?;
        if name_words == 0 {
            break;
        }
        reader.skip(u64::from(name_words) * 4)?;
    }

    let section_count = reader.read_u32_be()?;
    if section_count == 0 {
        return Err(HunkError::EmptySectionList);
    }

    let first = reader.read_u32_be()?;
    let last = reader.read_u32_be()?;
    if first != 0 || last != section_count - 1 {
        // Partial loading is valid per the format but outside this
        // engine's profile.
        return Err(HunkError::UnsupportedLoadLimits { first, last });
    }

    let mut sections = Vec::with_capacity(section_count as usize);
    for index in 0..section_count as usize {
        let word = reader.read_u32_be()?;
        let memory_target = match word & HUNK_FLAGS_MASK {
            0 => MemoryTarget::Any,
            HUNKF_CHIP => MemoryTarget::Chip,
            HUNKF_FAST => MemoryTarget::Fast,
            flags => {
                diagnostics.push(Diagnostic::UnknownMemoryFlags {
                    section: index,
                    flags,
                });
                MemoryTarget::Any
            }
        };
        sections.push(Section {
            kind: SectionKind::Bss,
            memory_target,
            mem_size: (word & HUNK_VALUE_MASK) * 4,
            data_size: 0,
            data_offset: None,
            reloc_offset: None,
            reloc_count: 0,
            symbols: Vec::new(),
            debug_blocks: Vec::new(),
        });
    }

    for (index, section) in sections.iter_mut().enumerate() {
        parse_section(&mut reader, section, index, &mut diagnostics)?;
    }

    if !reader.is_eof() {
        diagnostics.push(Diagnostic::TrailingBytes(reader.remaining()));
    }

    Ok(HunkFile {
        image,
        sections,
        diagnostics,
    })
}

fn parse_section(
    reader: &mut Reader<'_>,
    section: &mut Section,
    index: usize,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<(), HunkError> {
    loop {
        // The top nibble of a body tag is unused, unlike the header
        // size words.
        let tag = reader.read_u32_be()? & HUNK_VALUE_MASK;
        match tag {
            HUNK_END => return Ok(()),
            HUNK_DEBUG => parse_debug(reader, section)?,
            HUNK_SYMBOL => parse_symbols(reader, section)?,
            HUNK_CODE => parse_code_data_bss(reader, section, SectionKind::Code, index, diagnostics)?,
            HUNK_DATA => parse_code_data_bss(reader, section, SectionKind::Data, index, diagnostics)?,
            HUNK_BSS => parse_code_data_bss(reader, section, SectionKind::Bss, index, diagnostics)?,
            HUNK_RELOC32 => parse_reloc32(reader, section)?,
            HUNK_DREL32 | HUNK_RELOC32SHORT => parse_reloc_short(reader, section)?,
            HUNK_UNIT | HUNK_NAME | HUNK_RELOC16 | HUNK_RELOC8 | HUNK_EXT | HUNK_HEADER
            | HUNK_OVERLAY | HUNK_BREAK | HUNK_DREL16 | HUNK_DREL8 | HUNK_LIB | HUNK_INDEX
            | HUNK_RELRELOC32 | HUNK_ABSRELOC16 => {
                return Err(HunkError::UnsupportedHunkType(tag))
            }
            _ => return Err(HunkError::UnknownHunkType(tag)),
        }
    }
}

fn parse_code_data_bss(
    reader: &mut Reader<'_>,
    section: &mut Section,
    kind: SectionKind,
    index: usize,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<(), HunkError> {
    section.kind = kind;

    let data_bytes = u64::from(reader.read_u32_be()?) * 4;
    if kind != SectionKind::Bss {
        section.data_offset = Some(reader.position());
        reader.skip(data_bytes)?;
    }
    let data_size = data_bytes as u32;
    section.data_size = data_size;

    // The format allows a reservation larger than the payload but never
    // smaller; grow the reservation and flag the inconsistency.
    if data_size > section.mem_size {
        diagnostics.push(Diagnostic::DataSizeExceedsMemSize {
            section: index,
            data_size,
            mem_size: section.mem_size,
        });
        section.mem_size = data_size;
    }
    Ok(())
}

fn parse_reloc32(reader: &mut Reader<'_>, section: &mut Section) -> Result<(), HunkError> {
    section.reloc_offset = Some(reader.position());
    loop {
        let count = reader.read_u32_be()?;
        if count == 0 {
            return Ok(());
        }
        let _target_section = reader.read_u32_be()?;
        for _ in 0..count {
            let offset = reader.read_u32_be()?;
            check_reloc_offset(offset, section.mem_size)?;
        }
        section.reloc_count += count;
    }
}

fn parse_reloc_short(reader: &mut Reader<'_>, section: &mut Section) -> Result<(), HunkError> {
    section.reloc_offset = Some(reader.position());
    loop {
        let count = reader.read_u16_be()?;
        if count == 0 {
            break;
        }
        let _target_section = reader.read_u16_be()?;
        for _ in 0..count {
            let offset = u32::from(reader.read_u16_be()?);
            check_reloc_offset(offset, section.mem_size)?;
        }
        section.reloc_count += u32::from(count);
    }
    // Short tables are padded back to a longword boundary.
    reader.align_longword();
    Ok(())
}

fn check_reloc_offset(offset: u32, mem_size: u32) -> Result<(), HunkError> {
    // The patched longword must fit inside the section.
    if u64::from(offset) + 4 > u64::from(mem_size) {
        return Err(HunkError::RelocOffsetOutOfRange { offset, mem_size });
    }
    Ok(())
}

fn parse_symbols(reader: &mut Reader<'_>, section: &mut Section) -> Result<(), HunkError> {
    // First pass counts the entries so the vector is sized exactly.
    let table_start = reader.position();
    let mut count = 0usize;
    loop {
        let name_words = reader.read_u32_be()?;
        if name_words == 0 {
            break;
        }
        reader.skip(u64::from(name_words) * 4 + 4)?;
        count += 1;
    }

    let mut symbols = Vec::with_capacity(count);
    reader.seek(table_start)?;
    loop {
        let name_words = reader.read_u32_be()?;
        if name_words == 0 {
            break;
        }
        let name = Span {
            offset: reader.position(),
            len: name_words as usize * 4,
        };
        reader.skip(u64::from(name_words) * 4)?;
        let address = reader.read_u32_be()?;
        symbols.push(SymbolEntry { name, address });
    }
    section.symbols.append(&mut symbols);
    Ok(())
}

fn parse_debug(reader: &mut Reader<'_>, section: &mut Section) -> Result<(), HunkError> {
    let record_start = reader.position();
    let record_bytes = u64::from(reader.read_u32_be()?) * 4;
    let record_end = record_start as u64 + 4 + record_bytes;
    if record_end > reader.len() as u64 {
        return Err(HunkError::Truncated);
    }

    let base_offset = reader.read_u32_be()?.wrapping_mul(4);
    let block_kind = reader.read_u32_be()?;
    if block_kind != HUNK_DEBUG_LINE {
        // Other debug sub-formats are legitimately unsupported; the
        // record is dropped, not rejected.
        reader.seek(record_end as usize)?;
        return Ok(());
    }

    let string_bytes = u64::from(reader.read_u32_be()?) * 4;
    let filename = Span {
        offset: reader.position(),
        len: string_bytes as usize,
    };
    reader.skip(string_bytes)?;

    let pair_bytes = record_bytes
        .checked_sub(12 + string_bytes)
        .ok_or(HunkError::Truncated)?;
    let mut entries = Vec::with_capacity((pair_bytes / 8) as usize);
    for _ in 0..pair_bytes / 8 {
        let line = reader.read_u32_be()?;
        let address = reader.read_u32_be()?;
        entries.push(LineEntry { line, address });
    }
    reader.seek(record_end as usize)?;

    section.debug_blocks.push(DebugLineBlock {
        filename,
        base_offset,
        entries,
    });
    Ok(())
}

struct Reader<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    fn position(&self) -> usize {
        self.pos
    }

    fn len(&self) -> usize {
        self.input.len()
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn remaining(&self) -> usize {
        self.input.len() - self.pos
    }

    fn read_u32_be(&mut self) -> Result<u32, HunkError> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_u16_be(&mut self) -> Result<u16, HunkError> {
        let bytes = self.read_bytes(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    fn read_bytes(&mut self, size: usize) -> Result<&'a [u8], HunkError> {
        if self.pos + size > self.input.len() {
            return Err(HunkError::Truncated);
        }
        let begin = self.pos;
        self.pos += size;
        Ok(&self.input[begin..self.pos])
    }

    fn skip(&mut self, bytes: u64) -> Result<(), HunkError> {
        let end = self.pos as u64 + bytes;
        if end > self.input.len() as u64 {
            return Err(HunkError::Truncated);
        }
        self.pos = end as usize;
        Ok(())
    }

    fn seek(&mut self, pos: usize) -> Result<(), HunkError> {
        if pos > self.input.len() {
            return Err(HunkError::Truncated);
        }
        self.pos = pos;
        Ok(())
    }

    fn align_longword(&mut self) {
        if self.pos % 4 != 0 {
            self.pos = (self.pos + 2).min(self.input.len());
        }
    }
}
