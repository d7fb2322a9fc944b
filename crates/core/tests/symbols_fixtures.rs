#![cfg(feature = "object-symbols")]

use bookmark_core::model::SymbolKind;
use bookmark_core::symbols::SymbolIndex;
use object::write::{Object, SectionId, Symbol, SymbolSection};
use object::{Architecture, BinaryFormat, Endianness, SectionKind, SymbolFlags, SymbolScope};

fn symbol(
    name: &str,
    value: u64,
    size: u64,
    kind: object::SymbolKind,
    section: SectionId,
) -> Symbol {
    Symbol {
        name: name.as_bytes().to_vec(),
        value,
        size,
        kind,
        scope: SymbolScope::Linkage,
        weak: false,
        section: SymbolSection::Section(section),
        flags: SymbolFlags::None,
    }
}

fn build_elf_fixture() -> Vec<u8> {
    let mut obj = Object::new(BinaryFormat::Elf, Architecture::X86_64, Endianness::Little);

    // 0x40 bytes of nops; two functions at 0x10 and 0x20.
    let text_id = obj.add_section(Vec::new(), b".text".to_vec(), SectionKind::Text);
    obj.append_section_data(text_id, &[0x90; 0x40], 16);

    let data_id = obj.add_section(Vec::new(), b".data".to_vec(), SectionKind::Data);
    obj.append_section_data(data_id, &[0u8; 8], 8);

    obj.add_symbol(symbol("first_fn", 0x10, 0x10, object::SymbolKind::Text, text_id));
    obj.add_symbol(symbol("second_fn", 0x20, 0x08, object::SymbolKind::Text, text_id));
    obj.add_symbol(symbol("counter", 0, 8, object::SymbolKind::Data, data_id));

    obj.write().unwrap()
}

#[test]
fn elf_symbols_are_indexed_by_address() {
    let index = SymbolIndex::from_bytes(&build_elf_fixture());

    let first = index.symbol_at(0x10).expect("first_fn");
    assert_eq!(first.short_name, "first_fn");
    assert_eq!(first.kind, SymbolKind::Function);

    let names: Vec<String> =
        index.functions_containing(0x18).into_iter().map(|f| f.symbol.short_name).collect();
    assert_eq!(names, vec!["first_fn"]);
    assert!(index.functions_containing(0x28).is_empty());

    let counter = index.entries().iter().find(|e| e.name == "counter").expect("data symbol");
    assert_eq!(counter.kind, SymbolKind::Data);
}

#[test]
fn from_path_reads_fixture_and_reports_missing_files() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("fixture.o");
    std::fs::write(&path, build_elf_fixture()).unwrap();

    let index = SymbolIndex::from_path(&path).expect("read fixture");
    assert!(index.entries().iter().any(|e| e.name == "second_fn"));

    let err = SymbolIndex::from_path(&temp.path().join("missing.o")).unwrap_err();
    assert!(err.to_string().contains("missing.o"));
}
