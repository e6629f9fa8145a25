//! Tests for the processor module
//!
//! End-to-end runs through the loader, calculators and an in-memory store.


use crate::config::AssayConfig;
use crate::processor::AssayProcessor;
use crate::store::MemoryStore;
use std::io::Write;
use tempfile::NamedTempFile;

pub const TNS_HEADER: &str = "Formulation,Rep 1,Rep 2,Rep 3,Blank 1,Blank 2,Blank 3,Blank 4,\
                              Control 1,Control 2,Control 3,Control 4";

pub const ZETA_HEADER: &str = "Sample Name,Measurement Type,Zeta Potential (mV)";

/// Write a temporary export with the given extension
pub fn write_export(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    write!(file, "{}", content).unwrap();
    file
}

pub fn tns_csv(rows: &[&str]) -> NamedTempFile {
    let mut content = format!("{TNS_HEADER}\n");
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    write_export(".csv", &content)
}

pub fn zeta_csv(rows: &[(&str, &str)]) -> NamedTempFile {
    let mut content = format!("{ZETA_HEADER}\n");
    for (sample, zeta) in rows {
        content.push_str(&format!("{sample},Zeta,{zeta}\n"));
    }
    write_export(".csv", &content)
}

pub fn memory_processor() -> AssayProcessor<MemoryStore> {
    AssayProcessor::new(MemoryStore::new(), &AssayConfig::default())
}
