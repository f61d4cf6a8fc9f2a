use crate::exceptions::DevcallError;
use crate::provider::Provider;
use crate::providers::libmgmt::scan_packages;
use crate::registry::{CallContext, Registry, from_args};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};
use std::path::Path;

pub struct DagProvider;

impl Provider for DagProvider {
    fn name(&self) -> &'static str {
        "dag"
    }

    fn register(&self, registry: &mut Registry) -> Result<(), DevcallError> {
        let name = self.name();
        registry.register_fn(
            "dag.graph",
            name,
            "Internal dependency graph of a package tree",
            graph,
        )?;
        registry.register_fn(
            "dag.order",
            name,
            "Topological build order (dependencies first)",
            order,
        )?;
        Ok(())
    }
}

/// Package name -> names of its dependencies inside the scanned set.
/// Dependencies on packages outside the set are dropped.
pub(crate) fn internal_deps(root: &Path) -> Result<BTreeMap<String, BTreeSet<String>>, DevcallError> {
    let packages = scan_packages(root)?;
    let names: BTreeSet<String> = packages.iter().map(|(_, m)| m.name.clone()).collect();

    let mut deps = BTreeMap::new();
    for (_, manifest) in packages {
        let internal: BTreeSet<String> = manifest
            .dependencies
            .keys()
            .filter(|dep| names.contains(*dep))
            .cloned()
            .collect();
        deps.insert(manifest.name, internal);
    }
    Ok(deps)
}

/// Kahn's algorithm with a min-heap so equal-rank packages come out in name
/// order, keeping the result deterministic.
pub(crate) fn topo_order(
    deps: &BTreeMap<String, BTreeSet<String>>,
) -> Result<Vec<String>, DevcallError> {
    let mut indegree: BTreeMap<&str, usize> =
        deps.iter().map(|(name, d)| (name.as_str(), d.len())).collect();

    // dependency -> dependents
    let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for (name, d) in deps {
        for dep in d {
            dependents.entry(dep.as_str()).or_default().push(name.as_str());
        }
    }

    let mut ready: BinaryHeap<Reverse<&str>> = indegree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(name, _)| Reverse(*name))
        .collect();

    let mut ordered = Vec::with_capacity(deps.len());
    while let Some(Reverse(name)) = ready.pop() {
        ordered.push(name.to_string());
        for dependent in dependents.get(name).into_iter().flatten() {
            let degree = indegree
                .get_mut(dependent)
                .ok_or_else(|| DevcallError::Registry(format!("unknown package '{}'", dependent)))?;
            *degree -= 1;
            if *degree == 0 {
                ready.push(Reverse(*dependent));
            }
        }
    }

    if ordered.len() < deps.len() {
        let stuck = indegree
            .iter()
            .find(|(name, _)| !ordered.iter().any(|o| o == *name))
            .map(|(name, _)| *name)
            .unwrap_or("?");
        return Err(DevcallError::InvalidInput(format!(
            "dependency cycle involving '{}'",
            stuck
        )));
    }
    Ok(ordered)
}

#[derive(Deserialize)]
struct RootArgs {
    root: String,
}

#[derive(Serialize)]
struct Edge {
    from: String,
    to: String,
}

#[derive(Serialize)]
struct GraphResponse {
    nodes: Vec<String>,
    edges: Vec<Edge>,
}

#[derive(Serialize)]
struct OrderResponse {
    order: Vec<String>,
}

fn graph(ctx: &CallContext, args: Value) -> Result<Value, DevcallError> {
    let args: RootArgs = from_args(args)?;
    let deps = internal_deps(&ctx.resolve(&args.root))?;

    let nodes: Vec<String> = deps.keys().cloned().collect();
    let edges = deps
        .iter()
        .flat_map(|(name, d)| {
            d.iter().map(|dep| Edge {
                from: name.clone(),
                to: dep.clone(),
            })
        })
        .collect();
    Ok(serde_json::to_value(GraphResponse { nodes, edges })?)
}

fn order(ctx: &CallContext, args: Value) -> Result<Value, DevcallError> {
    let args: RootArgs = from_args(args)?;
    let deps = internal_deps(&ctx.resolve(&args.root))?;
    let order = topo_order(&deps)?;
    Ok(serde_json::to_value(OrderResponse { order })?)
}
