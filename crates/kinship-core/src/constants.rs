//! Core constants used throughout the kinship engine
//!
//! Centralizes the wire-format details and loader defaults so the loader,
//! the writer and the CLI configuration agree on them.

/// Wire format constants
pub mod wire {
    /// Field delimiter of input and output lines
    pub const FIELD_DELIMITER: char = '\t';

    /// Characters trimmed from both ends of a raw line before splitting
    pub const LINE_TRIM: &[char] = &[' ', '\r', '\n', '.'];

    /// Characters trimmed from both ends of every field
    pub const FIELD_TRIM: &[char] = &[' ', '\r', '<', '>'];

    /// Leading bytes of a gzip stream
    pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
}

/// Loader defaults
pub mod loader {
    /// Long-form namespaces removed from every field
    pub const DEFAULT_NAMESPACE_PREFIXES: [&str; 2] =
        ["http://www.wikidata.org/prop/direct/", "http://www.wikidata.org/entity/"];

    /// Malformed lines reported individually before only being counted
    pub const DEFAULT_MAX_MALFORMED_REPORTS: usize = 20;
}

/// Output buffer sizing
pub mod output {
    /// Capacity of the buffered writers used for fact files
    pub const WRITE_BUFFER_BYTES: usize = 1 << 16;
}
