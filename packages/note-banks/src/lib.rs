//! Note banks compiled into the binary from `banks/`.
//!
//! Each file is one clef's bank, named `<clef>.yaml` or `<clef>.json`.

include!(concat!(env!("OUT_DIR"), "/banks.rs"));

/// Source text of an embedded bank file, e.g. `get_bank("treble.yaml")`
pub fn get_bank(name: &str) -> Option<&'static str> {
    BANKS
        .iter()
        .find(|(file, _)| *file == name)
        .map(|(_, content)| *content)
}

/// Names of all embedded bank files, sorted
pub fn list_banks() -> Vec<&'static str> {
    BANKS.iter().map(|(name, _)| *name).collect()
}
