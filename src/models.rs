use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Captured result of a spawned process.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecOutput {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
}

/// Public description of one registered procedure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcInfo {
    pub path: String,
    pub provider: String,
    pub summary: String,
}

/// Package manifest shape the lib and dag providers agree on (package.json).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PackageManifest {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
}
