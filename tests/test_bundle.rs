mod common;

use devcall::bundle;
use devcall::exceptions::DevcallError;
use devcall::provider::Provider;
use devcall::registry::{ProcPath, Registry};
use serde_json::{Value, json};

struct StubProvider {
    name: &'static str,
    path: &'static str,
}

impl Provider for StubProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    fn register(&self, registry: &mut Registry) -> Result<(), DevcallError> {
        registry.register_fn(self.path, self.name, "stub", |_, args| {
            Ok(json!({ "echo": args }))
        })
    }
}

struct FailingProvider;

impl Provider for FailingProvider {
    fn name(&self) -> &'static str {
        "boom"
    }

    fn register(&self, _registry: &mut Registry) -> Result<(), DevcallError> {
        Err(DevcallError::Provider("stub provider exploded".to_string()))
    }
}

#[test]
fn bundle_registers_all_eight_domains() {
    let registry = common::bundled_registry();

    // Declared provider order survives assembly
    assert_eq!(
        registry.provider_names(),
        ["shell", "fs", "cli", "pnpm", "lib", "git", "dag", "procedure"]
    );

    // One representative procedure per capability domain
    for path in [
        "shell.exec",
        "fs.read",
        "cli.run",
        "pnpm.install",
        "lib.new",
        "git.status",
        "dag.order",
        "procedure.list",
    ] {
        assert!(
            registry.contains(&ProcPath::parse(path).unwrap()),
            "missing {}",
            path
        );
    }
}

#[test]
fn shared_registry_is_built_exactly_once() {
    let first = bundle::shared().unwrap();
    let second = bundle::shared().unwrap();

    // Same instance, no duplicated entries on repeated loads
    assert!(std::ptr::eq(first, second));
    assert_eq!(first.len(), second.len());
}

#[test]
fn failing_provider_aborts_registration_unchanged() {
    // GIVEN a sequence where the middle provider fails
    let providers: Vec<Box<dyn Provider>> = vec![
        Box::new(StubProvider {
            name: "alpha",
            path: "alpha.ping",
        }),
        Box::new(FailingProvider),
        Box::new(StubProvider {
            name: "omega",
            path: "omega.ping",
        }),
    ];

    // WHEN registering the sequence
    let mut registry = Registry::new();
    let err = bundle::register_providers(&mut registry, &providers).unwrap_err();

    // THEN the failing provider's error surfaces unchanged
    assert_eq!(err.to_string(), "Provider error: stub provider exploded");

    // AND providers after the failure did not register
    assert!(registry.contains(&ProcPath::parse("alpha.ping").unwrap()));
    assert!(!registry.contains(&ProcPath::parse("omega.ping").unwrap()));
}

#[test]
fn stub_procedure_dispatches_through_the_registry() {
    let providers: Vec<Box<dyn Provider>> = vec![Box::new(StubProvider {
        name: "demo",
        path: "demo.echo",
    })];

    let mut registry = Registry::new();
    bundle::register_providers(&mut registry, &providers).unwrap();

    let result = registry
        .call(&ProcPath::parse("demo.echo").unwrap(), json!({ "n": 7 }))
        .unwrap();
    assert_eq!(result, json!({ "echo": { "n": 7 } }));
}

#[test]
fn bundled_procedures_carry_their_provider() {
    let registry = common::bundled_registry();
    let registration = registry.get(&ProcPath::parse("git.status").unwrap()).unwrap();
    assert_eq!(registration.provider(), "git");
    assert!(!registration.summary().is_empty());
}

#[test]
fn duplicate_paths_across_providers_collide() {
    let providers: Vec<Box<dyn Provider>> = vec![
        Box::new(StubProvider {
            name: "first",
            path: "demo.ping",
        }),
        Box::new(StubProvider {
            name: "second",
            path: "demo.ping",
        }),
    ];

    let mut registry = Registry::new();
    let err = bundle::register_providers(&mut registry, &providers).unwrap_err();
    assert!(matches!(err, DevcallError::Registry(_)));

    // The first registration is still intact and callable
    let result = registry
        .call(&ProcPath::parse("demo.ping").unwrap(), Value::Null)
        .unwrap();
    assert_eq!(result, json!({ "echo": Value::Null }));
}
