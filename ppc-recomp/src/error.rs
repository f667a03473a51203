//! Top-level recompiler errors (spec.md §7): the three kinds that abort a
//! run before or during emission. The four non-aborting diagnostic kinds
//! live in [`crate::diagnostics`] instead, since spec.md §7 is explicit that
//! they are recoverable and do not stop the translation.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

/// A cause for [`Error::ImageParse`]'s XEX-patch branch, mirroring the named
/// causes `XenonRecomp`'s `XexPatcher::Result` enumerates (spec.md §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PatchFailure {
    #[error("XEX file unsupported")]
    XexUnsupported,
    #[error("XEX file invalid")]
    XexInvalid,
    #[error("patch file invalid")]
    PatchInvalid,
    #[error("patch file incompatible with the target image")]
    PatchIncompatible,
    #[error("patch application failed")]
    PatchFailed,
    #[error("patch format unsupported")]
    PatchUnsupported,
}

/// Aborting error kinds (spec.md §7): `ConfigurationError` and
/// `ImageParseError`. Both are reported and the run aborts before any
/// emission happens.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("failed to read image file {path}: {source}")]
    ImageIo { path: PathBuf, source: std::io::Error },

    #[error("failed to apply patch: {0}")]
    Patch(#[from] PatchFailure),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Decode(#[from] ppc_asm::DecodeError),
}
