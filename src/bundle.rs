//! The composition root: assembles the eight capability providers into one
//! registry, in a fixed declared order.

use crate::exceptions::DevcallError;
use crate::provider::Provider;
use crate::providers::{
    CliProvider, DagProvider, FsProvider, GitProvider, LibProvider, PnpmProvider,
    ProcedureProvider, ShellProvider,
};
use crate::registry::Registry;
use std::sync::OnceLock;

/// The bundled providers, boxed, in registration order.
pub fn providers() -> Vec<Box<dyn Provider>> {
    vec![
        Box::new(ShellProvider),
        Box::new(FsProvider),
        Box::new(CliProvider),
        Box::new(PnpmProvider),
        Box::new(LibProvider),
        Box::new(GitProvider),
        Box::new(DagProvider),
        Box::new(ProcedureProvider),
    ]
}

/// Register a sequence of providers in order. The first failing provider
/// aborts the sequence and its error is returned unchanged; nothing after it
/// registers.
pub fn register_providers(
    registry: &mut Registry,
    providers: &[Box<dyn Provider>],
) -> Result<(), DevcallError> {
    for provider in providers {
        provider.register(registry)?;
    }
    Ok(())
}

/// Register every bundled provider into `registry`.
pub fn register_all(registry: &mut Registry) -> Result<(), DevcallError> {
    register_providers(registry, &providers())
}

/// Build a fresh registry holding the whole bundle.
pub fn build() -> Result<Registry, DevcallError> {
    let mut registry = Registry::new();
    register_all(&mut registry)?;
    Ok(registry)
}

/// Process-wide registry, assembled at most once. A failed first build is
/// cached and re-reported on every call (registration errors are not Clone,
/// so the cached form is the rendered message).
pub fn shared() -> Result<&'static Registry, DevcallError> {
    static SHARED: OnceLock<Result<Registry, String>> = OnceLock::new();

    match SHARED.get_or_init(|| build().map_err(|e| e.to_string())) {
        Ok(registry) => Ok(registry),
        Err(message) => Err(DevcallError::Provider(message.clone())),
    }
}
