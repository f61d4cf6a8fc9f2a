use crate::exceptions::DevcallError;
use crate::models::ProcInfo;
use crate::provider::Provider;
use crate::registry::{CallContext, ProcPath, Registry, from_args};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Introspection over the registry itself, so callers can discover what the
/// bundle exposes without any out-of-band listing.
pub struct ProcedureProvider;

impl Provider for ProcedureProvider {
    fn name(&self) -> &'static str {
        "procedure"
    }

    fn register(&self, registry: &mut Registry) -> Result<(), DevcallError> {
        let name = self.name();
        registry.register_fn(
            "procedure.list",
            name,
            "List every registered procedure",
            list,
        )?;
        registry.register_fn(
            "procedure.describe",
            name,
            "Describe one registered procedure",
            describe,
        )?;
        registry.register_fn(
            "procedure.providers",
            name,
            "Provider names in registration order",
            providers,
        )?;
        Ok(())
    }
}

#[derive(Deserialize)]
struct DescribeArgs {
    path: String,
}

#[derive(Serialize)]
struct ProvidersResponse {
    providers: Vec<String>,
}

fn list(ctx: &CallContext, _args: Value) -> Result<Value, DevcallError> {
    let infos: Vec<ProcInfo> = ctx
        .registry()
        .procedures()
        .map(|registration| ProcInfo {
            path: registration.path().to_string(),
            provider: registration.provider().to_string(),
            summary: registration.summary().to_string(),
        })
        .collect();
    Ok(serde_json::to_value(infos)?)
}

fn describe(ctx: &CallContext, args: Value) -> Result<Value, DevcallError> {
    let args: DescribeArgs = from_args(args)?;
    let path = ProcPath::parse(&args.path)?;
    let registration = ctx
        .registry()
        .get(&path)
        .ok_or_else(|| DevcallError::UnknownProcedure(args.path.clone()))?;
    Ok(serde_json::to_value(ProcInfo {
        path: registration.path().to_string(),
        provider: registration.provider().to_string(),
        summary: registration.summary().to_string(),
    })?)
}

fn providers(ctx: &CallContext, _args: Value) -> Result<Value, DevcallError> {
    let providers = ctx
        .registry()
        .provider_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    Ok(serde_json::to_value(ProvidersResponse { providers })?)
}
