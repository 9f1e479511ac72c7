pub(crate) mod core;
mod fingerprint;
pub(crate) mod node;
pub(crate) mod plan;
