//! Symbol lookups over an object file's symbol table.
//!
//! This is the headless host's answer to "which symbol is at this address"
//! and "which functions contain this address". It reads ELF, Mach-O, and PE
//! symbol tables through `goblin` (feature `object-symbols`); it does not
//! disassemble anything.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::model::{Function, Symbol, SymbolKind};

#[derive(Debug, Error)]
pub enum SymbolError {
    #[error("Failed to read binary at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One named symbol from a symbol table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolEntry {
    pub name: String,
    pub address: u64,
    pub size: Option<u64>,
    pub kind: SymbolKind,
}

impl SymbolEntry {
    pub fn new(name: impl Into<String>, address: u64, size: Option<u64>, kind: SymbolKind) -> Self {
        Self { name: name.into(), address, size, kind }
    }

    fn contains(&self, address: u64) -> bool {
        match self.size {
            Some(size) => address >= self.address && address < self.address.saturating_add(size),
            None => false,
        }
    }

    fn to_symbol(&self) -> Symbol {
        Symbol::new(self.name.clone(), self.address, self.kind)
    }
}

/// Address-sorted symbol table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolIndex {
    entries: Vec<SymbolEntry>,
}

impl SymbolIndex {
    /// Build an index from raw entries.
    ///
    /// Duplicate (address, name) pairs are dropped. Functions without a size
    /// extend up to the next function's start.
    pub fn new(mut entries: Vec<SymbolEntry>) -> Self {
        entries.retain(|e| !e.name.is_empty());
        entries.sort_by(|a, b| {
            a.address
                .cmp(&b.address)
                .then(kind_rank(a.kind).cmp(&kind_rank(b.kind)))
                .then(a.name.cmp(&b.name))
        });
        entries.dedup_by(|a, b| a.address == b.address && a.name == b.name);

        let function_starts: Vec<u64> =
            entries.iter().filter(|e| e.kind == SymbolKind::Function).map(|e| e.address).collect();
        let unsized_functions =
            entries.iter_mut().filter(|e| e.kind == SymbolKind::Function && e.size.is_none());
        for entry in unsized_functions {
            let next = function_starts.iter().copied().find(|&start| start > entry.address);
            entry.size = next.map(|start| start - entry.address);
        }

        Self { entries }
    }

    /// Parse the symbol table of an object file held in memory.
    ///
    /// Unrecognized formats produce an empty index.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::new(extract_symbols(bytes))
    }

    /// Read and parse an object file from disk.
    pub fn from_path(path: &Path) -> Result<Self, SymbolError> {
        let bytes = std::fs::read(path)
            .map_err(|source| SymbolError::Io { path: path.to_path_buf(), source })?;
        Ok(Self::from_bytes(&bytes))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[SymbolEntry] {
        &self.entries
    }

    /// Symbol defined exactly at `address`. Functions win over data symbols.
    pub fn symbol_at(&self, address: u64) -> Option<Symbol> {
        let start = self.entries.partition_point(|e| e.address < address);
        self.entries.get(start).filter(|e| e.address == address).map(SymbolEntry::to_symbol)
    }

    /// Functions whose extent covers `address`, in address order.
    pub fn functions_containing(&self, address: u64) -> Vec<Function> {
        let end = self.entries.partition_point(|e| e.address <= address);
        self.entries[..end]
            .iter()
            .filter(|e| e.kind == SymbolKind::Function && e.contains(address))
            .map(|e| Function::new(e.to_symbol()))
            .collect()
    }
}

fn kind_rank(kind: SymbolKind) -> u8 {
    match kind {
        SymbolKind::Function => 0,
        SymbolKind::Data => 1,
        SymbolKind::Other => 2,
    }
}

#[cfg(feature = "object-symbols")]
fn extract_symbols(bytes: &[u8]) -> Vec<SymbolEntry> {
    use goblin::{mach, Object};

    match Object::parse(bytes) {
        Ok(Object::Elf(elf)) => elf_symbols(&elf),
        Ok(Object::PE(pe)) => pe_symbols(&pe),
        Ok(Object::Mach(mach::Mach::Binary(bin))) => mach_symbols(&bin),
        _ => Vec::new(),
    }
}

#[cfg(not(feature = "object-symbols"))]
fn extract_symbols(_bytes: &[u8]) -> Vec<SymbolEntry> {
    Vec::new()
}

#[cfg(feature = "object-symbols")]
fn elf_symbols(elf: &goblin::elf::Elf) -> Vec<SymbolEntry> {
    use goblin::elf::section_header::SHN_UNDEF;
    use goblin::elf::sym::STT_OBJECT;

    let tables = [(&elf.syms, &elf.strtab), (&elf.dynsyms, &elf.dynstrtab)];
    let mut symbols = Vec::new();
    for (syms, strtab) in tables {
        for sym in syms.iter() {
            if sym.st_shndx == SHN_UNDEF as usize {
                continue;
            }
            let kind = if sym.is_function() {
                SymbolKind::Function
            } else if sym.st_type() == STT_OBJECT {
                SymbolKind::Data
            } else {
                continue;
            };
            let name = strtab.get_at(sym.st_name).unwrap_or("");
            if name.is_empty() {
                continue;
            }
            let size = if sym.st_size > 0 { Some(sym.st_size) } else { None };
            symbols.push(SymbolEntry::new(name, sym.st_value, size, kind));
        }
    }
    symbols
}

#[cfg(feature = "object-symbols")]
fn mach_symbols(bin: &goblin::mach::MachO) -> Vec<SymbolEntry> {
    let mut symbols = Vec::new();
    for sym in bin.symbols() {
        let Ok((name, nlist)) = sym else { continue };
        if nlist.n_value == 0 || nlist.is_undefined() {
            continue;
        }
        let name = name.trim_start_matches('_');
        if name.is_empty() {
            continue;
        }
        symbols.push(SymbolEntry::new(name, nlist.n_value, None, SymbolKind::Function));
    }
    symbols
}

#[cfg(feature = "object-symbols")]
fn pe_symbols(pe: &goblin::pe::PE) -> Vec<SymbolEntry> {
    let mut symbols = Vec::new();
    for exp in &pe.exports {
        if exp.rva == 0 {
            continue;
        }
        let name = exp.name.unwrap_or_default();
        if name.is_empty() {
            continue;
        }
        let address = pe.image_base as u64 + exp.rva as u64;
        symbols.push(SymbolEntry::new(name, address, None, SymbolKind::Function));
    }
    symbols
}
