pub mod bundle;
pub mod console;
pub mod consts;
pub mod exceptions;
pub mod exec;
pub mod fs;
pub mod models;
pub mod provider;
pub mod providers;
pub mod registry;
