//! The bundled capability providers, one module per capability domain.

pub mod cli;
pub mod dag;
pub mod fsops;
pub mod git;
pub mod libmgmt;
pub mod pnpm;
pub mod procedure;
pub mod shell;

pub use cli::CliProvider;
pub use dag::DagProvider;
pub use fsops::FsProvider;
pub use git::GitProvider;
pub use libmgmt::LibProvider;
pub use pnpm::PnpmProvider;
pub use procedure::ProcedureProvider;
pub use shell::ShellProvider;
