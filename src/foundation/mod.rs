pub(crate) mod depth;
pub(crate) mod error;
pub(crate) mod format;
