use crate::format::hunk::HunkFile;
use crate::format::{MemoryTarget, SectionKind};

pub fn print_summary(file: &HunkFile) {
    println!("Sec Type  Target  memSize    relocCount  symCount   debugLineCount");
    for (index, section) in file.sections.iter().enumerate() {
        println!(
            "{:02}  {}  {}   {:8}      {:8}  {:8}   {:8}",
            index,
            kind_name(section.kind),
            target_name(section.memory_target),
            section.mem_size,
            section.reloc_count,
            section.symbols.len(),
            section.debug_blocks.len()
        );
    }
}

pub fn print_details(file: &HunkFile) {
    for (index, section) in file.sections.iter().enumerate() {
        println!("Section {index} ------------------------------------------------------");

        if let Some(sum) = file.section_checksum(section) {
            println!("  Checksum {sum:08x}");
        }

        if !section.symbols.is_empty() {
            println!("  Symbols ------------------------------------------------------");
        }
        for symbol in &section.symbols {
            println!(
                "  {:08x} - {}",
                symbol.address,
                String::from_utf8_lossy(file.name(symbol.name))
            );
        }

        if !section.debug_blocks.is_empty() {
            println!("  Debug lines --------------------------------------------------");
        }
        for block in &section.debug_blocks {
            println!(
                "  File {} (base {:#x})",
                String::from_utf8_lossy(file.name(block.filename)),
                block.base_offset
            );
            for entry in &block.entries {
                println!("    {:08x} - {}", entry.address, entry.line);
            }
        }
    }
}

fn kind_name(kind: SectionKind) -> &'static str {
    match kind {
        SectionKind::Code => "CODE",
        SectionKind::Data => "DATA",
        SectionKind::Bss => "BSS ",
    }
}

fn target_name(target: MemoryTarget) -> &'static str {
    match target {
        MemoryTarget::Any => "ANY ",
        MemoryTarget::Chip => "CHIP",
        MemoryTarget::Fast => "FAST",
    }
}
