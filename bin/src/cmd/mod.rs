//! CLI subcommand modules.

pub(crate) mod run;
pub(crate) mod score;
pub(crate) mod signals;
