use std::io;

use thiserror::Error;

use classgraph_zip::ZipError;

/// Per-artifact decoding failures (spec. §4.1/§7). Always fatal to the
/// single file being decoded, never to the enclosing scan.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("invalid class file magic")]
    InvalidMagic,

    #[error("unexpected end of file while decoding class file")]
    UnexpectedEof,

    #[error("unknown constant pool tag: {0}")]
    UnknownConstantTag(u8),

    #[error("attribute content did not match its declared length")]
    CorruptAttribute,

    #[error("constant pool index out of range: {0}")]
    IndexOutOfRange(u16),
}

/// Usage errors and per-scan failures (spec §7: "Artifact errors" +
/// "Usage errors"). Propagates to the Builder's caller.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("root path does not exist: {0}")]
    RootNotFound(std::path::PathBuf),

    #[error("root path is neither a regular file nor a directory: {0}")]
    UnsupportedRoot(std::path::PathBuf),

    #[error("got I/O error while scanning artifacts: {0}")]
    Io(#[from] io::Error),

    #[error("failed to create scratch workspace: {0}")]
    WorkspaceCreation(io::Error),

    #[error("corrupt archive: {path}: {source}")]
    CorruptArchive {
        path: std::path::PathBuf,
        #[source]
        source: ZipError,
    },

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Model errors (spec §4.4/§7). Fatal to the enclosing pipeline step.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("attempted to merge into a closed model")]
    Closed,

    #[error("a node filter returned something that was neither a Node nor a rejection")]
    FilterTypeError,
}
