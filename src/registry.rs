use crate::exceptions::DevcallError;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

const SEGMENT_PATTERN: &str = r"^[a-z0-9][a-z0-9_-]*$";

fn is_valid_segment(segment: &str) -> bool {
    static RE: std::sync::LazyLock<regex::Regex> =
        std::sync::LazyLock::new(|| regex::Regex::new(SEGMENT_PATTERN).unwrap());
    RE.is_match(segment)
}

/// A procedure identifier: a non-empty sequence of name segments.
///
/// The canonical text form joins segments with dots, e.g. `git.status`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProcPath(Vec<String>);

impl ProcPath {
    pub fn new<I, S>(segments: I) -> Result<Self, DevcallError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(DevcallError::Registry(
                "procedure path must have at least one segment".to_string(),
            ));
        }
        for segment in &segments {
            if !is_valid_segment(segment) {
                return Err(DevcallError::Registry(format!(
                    "invalid path segment '{}' (expected {})",
                    segment, SEGMENT_PATTERN
                )));
            }
        }
        Ok(ProcPath(segments))
    }

    /// Parse the dot-joined form, e.g. `"git.status"`.
    pub fn parse(text: &str) -> Result<Self, DevcallError> {
        Self::new(text.split('.'))
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for ProcPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

/// Per-call environment handed to every handler.
///
/// Carries the registry itself (the procedure provider introspects it) and the
/// directory relative paths resolve against.
pub struct CallContext<'a> {
    registry: &'a Registry,
    cwd: PathBuf,
}

impl CallContext<'_> {
    pub fn registry(&self) -> &Registry {
        self.registry
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Resolve a possibly-relative path against the call's working directory.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let candidate = Path::new(path);
        if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            crate::fs::normalize_path(&self.cwd.join(candidate))
        }
    }
}

pub type HandlerFn = dyn Fn(&CallContext, Value) -> Result<Value, DevcallError> + Send + Sync;

/// One registered procedure: its path, owning provider, help line and handler.
pub struct Registration {
    path: ProcPath,
    provider: &'static str,
    summary: String,
    handler: Box<HandlerFn>,
}

impl Registration {
    pub fn new<F>(path: ProcPath, provider: &'static str, summary: &str, handler: F) -> Self
    where
        F: Fn(&CallContext, Value) -> Result<Value, DevcallError> + Send + Sync + 'static,
    {
        Registration {
            path,
            provider,
            summary: summary.to_string(),
            handler: Box::new(handler),
        }
    }

    pub fn path(&self) -> &ProcPath {
        &self.path
    }

    pub fn provider(&self) -> &'static str {
        self.provider
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }
}

/// The process-wide procedure store. Providers populate it once during the
/// startup phase; dispatch happens through [`Registry::call`] afterwards.
#[derive(Default)]
pub struct Registry {
    procedures: BTreeMap<ProcPath, Registration>,
    providers: Vec<&'static str>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a registration. Registering the same path twice is an error;
    /// the bundle's provider order must never decide which handler wins.
    pub fn register(&mut self, registration: Registration) -> Result<(), DevcallError> {
        if self.procedures.contains_key(&registration.path) {
            return Err(DevcallError::Registry(format!(
                "procedure '{}' is already registered (provider '{}')",
                registration.path, registration.provider
            )));
        }
        if !self.providers.contains(&registration.provider) {
            self.providers.push(registration.provider);
        }
        self.procedures
            .insert(registration.path.clone(), registration);
        Ok(())
    }

    /// Convenience wrapper: parse the dot-path and register a closure.
    pub fn register_fn<F>(
        &mut self,
        path: &str,
        provider: &'static str,
        summary: &str,
        handler: F,
    ) -> Result<(), DevcallError>
    where
        F: Fn(&CallContext, Value) -> Result<Value, DevcallError> + Send + Sync + 'static,
    {
        let path = ProcPath::parse(path)?;
        self.register(Registration::new(path, provider, summary, handler))
    }

    pub fn get(&self, path: &ProcPath) -> Option<&Registration> {
        self.procedures.get(path)
    }

    pub fn contains(&self, path: &ProcPath) -> bool {
        self.procedures.contains_key(path)
    }

    /// Dispatch a call with the process working directory.
    pub fn call(&self, path: &ProcPath, args: Value) -> Result<Value, DevcallError> {
        let cwd = std::env::current_dir()?;
        self.call_from(path, args, cwd)
    }

    /// Dispatch a call resolving relative paths against an explicit directory.
    pub fn call_from(
        &self,
        path: &ProcPath,
        args: Value,
        cwd: PathBuf,
    ) -> Result<Value, DevcallError> {
        let registration = self
            .get(path)
            .ok_or_else(|| DevcallError::UnknownProcedure(path.to_string()))?;
        let ctx = CallContext {
            registry: self,
            cwd,
        };
        (registration.handler)(&ctx, args)
    }

    /// Registrations in path order.
    pub fn procedures(&self) -> impl Iterator<Item = &Registration> {
        self.procedures.values()
    }

    /// Provider names in the order they first registered something.
    pub fn provider_names(&self) -> &[&'static str] {
        &self.providers
    }

    pub fn len(&self) -> usize {
        self.procedures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.procedures.is_empty()
    }
}

/// Deserialize a handler's JSON arguments into its typed form.
pub fn from_args<T: DeserializeOwned>(args: Value) -> Result<T, DevcallError> {
    serde_json::from_value(args)
        .map_err(|e| DevcallError::InvalidInput(format!("bad procedure arguments: {}", e)))
}
