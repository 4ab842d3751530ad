use rahp::format::hunk::{
    parse_hunk_file, HUNK_CODE, HUNK_END, HUNK_EXT, HUNK_HEADER, HUNK_SYMBOL,
};
use rahp::format::{HunkError, SectionKind};

fn be32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_be_bytes());
}

#[test]
fn rejects_unsupported_hunk_type() {
    let mut image = Vec::new();
    for word in [HUNK_HEADER, 0, 1, 0, 0, 1, HUNK_EXT] {
        be32(&mut image, word);
    }
    let err = parse_hunk_file(image).expect_err("parser must reject HUNK_EXT");
    assert!(matches!(err, HunkError::UnsupportedHunkType(HUNK_EXT)));
}

#[test]
fn decodes_a_two_section_executable() {
    let mut image = Vec::new();
    // header: two sections, full load limits, 8 + 4 byte reservations
    for word in [HUNK_HEADER, 0, 2, 0, 1, 2, 1] {
        be32(&mut image, word);
    }
    // section 0: code with one symbol
    for word in [HUNK_CODE, 2, 0x4e75_0000, 0, HUNK_SYMBOL, 1] {
        be32(&mut image, word);
    }
    image.extend_from_slice(b"main");
    for word in [0x10, 0, HUNK_END] {
        be32(&mut image, word);
    }
    // section 1: code, no extras
    for word in [HUNK_CODE, 1, 0, HUNK_END] {
        be32(&mut image, word);
    }

    let file = parse_hunk_file(image).expect("parse should succeed");
    assert_eq!(file.sections.len(), 2);
    assert_eq!(file.sections[0].kind, SectionKind::Code);
    assert_eq!(file.sections[0].symbols.len(), 1);
    assert_eq!(file.name(file.sections[0].symbols[0].name), b"main");
    assert_eq!(file.sections[0].symbols[0].address, 0x10);
    assert_eq!(file.sections[1].mem_size, 4);
    assert!(file.diagnostics.is_empty());
}
