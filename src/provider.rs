use crate::exceptions::DevcallError;
use crate::registry::Registry;

/// A capability provider. Each implementation registers its procedures into
/// the shared registry when the bundle is assembled.
pub trait Provider: Send + Sync {
    fn name(&self) -> &'static str;

    fn register(&self, registry: &mut Registry) -> Result<(), DevcallError>;
}
