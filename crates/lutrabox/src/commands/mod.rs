//! CLI command implementations.

pub(crate) mod build;
pub(crate) mod run;

pub(crate) use build::BuildArgs;
pub(crate) use run::RunArgs;
