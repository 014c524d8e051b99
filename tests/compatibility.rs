//! Module compatibility against the builtin and custom rule tables.

use upgrade_gate::compat::{
    check_module_compatibility, CompatibilityError, CompatibilityValidator, ComponentVersions,
};
use upgrade_gate::rules::{CompatibilityRule, RuleGroup, RuleRegistry};

fn modules(pairs: &[(&str, &str)]) -> ComponentVersions {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn all_below_minimum() -> ComponentVersions {
    modules(&[
        ("auth", "v0.5.0"),
        ("logging", "v5.1.0"),
        ("networking", "v2.9.0"),
        ("monitoring", "v4.0.0"),
    ])
}

#[test]
fn test_rules_do_not_apply_before_their_introduction() {
    let result = CompatibilityValidator::default().validate("1.34.0", &all_below_minimum());
    assert_eq!(result.unwrap(), Vec::<String>::new());
}

#[test]
fn test_rules_keep_applying_after_their_introduction() {
    for target in ["1.35.0", "1.35.3", "1.36.0", "2.0.0"] {
        let err = CompatibilityValidator::default()
            .validate(target, &all_below_minimum())
            .unwrap_err();
        assert_eq!(err.messages().len(), 4, "target {}", target);
    }
}

#[test]
fn test_empty_components_never_fail() {
    let messages = CompatibilityValidator::default()
        .validate("1.35.0", &ComponentVersions::new())
        .unwrap();
    assert!(messages.is_empty());
}

#[test]
fn test_single_module_below_minimum() {
    let components = modules(&[
        ("auth", "v0.5.0"),
        ("logging", "v5.2.0"),
        ("networking", "v3.0.0"),
        ("monitoring", "v4.0.1"),
    ]);

    let err = CompatibilityValidator::default()
        .validate("1.35.0", &components)
        .unwrap_err();

    assert_eq!(err.messages().len(), 1);
    assert!(err.messages()[0].starts_with(
        "Module 'auth' version v0.5.0 is incompatible with Kubernetes 1.35.0. \
         Required: v0.6.0 or later."
    ));
}

#[test]
fn test_all_modules_below_minimum_are_reported_together() {
    let err = CompatibilityValidator::default()
        .validate("1.35.0", &all_below_minimum())
        .unwrap_err();

    let messages = err.messages();
    assert_eq!(messages.len(), 4);
    // Rule definition order, not map order.
    assert!(messages[0].contains("'networking'"));
    assert!(messages[1].contains("'monitoring'"));
    assert!(messages[2].contains("'auth'"));
    assert!(messages[3].contains("'logging'"));

    let text = err.to_string();
    assert!(text.starts_with("module compatibility check failed: 4 incompatibilities detected:"));
}

#[test]
fn test_exact_minimums_pass() {
    let components = modules(&[
        ("auth", "v0.6.0"),
        ("logging", "v5.2.0"),
        ("networking", "v3.0.0"),
        ("monitoring", "v4.0.1"),
    ]);
    assert!(check_module_compatibility("1.35.0", &components).is_ok());
}

#[test]
fn test_unversioned_and_prefixed_versions_compare_equal() {
    let components = modules(&[("auth", "0.6.0"), ("logging", "V5.2.0")]);
    assert!(check_module_compatibility("v1.35.0", &components).is_ok());
}

#[test]
fn test_malformed_component_version_is_a_message() {
    let components = modules(&[("auth", "latest"), ("logging", "v5.1.0")]);
    let err = CompatibilityValidator::default()
        .validate("1.35.0", &components)
        .unwrap_err();

    assert_eq!(err.messages().len(), 2);
    assert!(err
        .messages()
        .contains(&"Module 'auth' has invalid version format 'latest'".to_string()));
}

#[test]
fn test_invalid_target_fails_without_messages() {
    let err = CompatibilityValidator::default()
        .validate("one.three-five", &all_below_minimum())
        .unwrap_err();

    assert!(matches!(err, CompatibilityError::InvalidTarget(_)));
    assert!(err.messages().is_empty());
    assert!(err
        .to_string()
        .starts_with("invalid kubernetes version format:"));
}

#[test]
fn test_validation_is_deterministic() {
    let validator = CompatibilityValidator::default();
    let first = validator.report("1.35.0", &all_below_minimum()).unwrap();
    let second = validator.report("1.35.0", &all_below_minimum()).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.to_string(), second.to_string());
    assert!(first.to_string().starts_with("BLOCKER ISSUES (must fix):\n  - Module"));
}

#[test]
fn test_custom_registry_accumulates_groups() {
    let registry = RuleRegistry::new(vec![
        RuleGroup {
            kubernetes_version: "1.35.0".to_string(),
            rules: vec![CompatibilityRule {
                component: "auth".to_string(),
                min_version: "v0.6.0".to_string(),
                description: "Auth module must support the new API.".to_string(),
                migration_url: None,
            }],
        },
        RuleGroup {
            kubernetes_version: "1.36.0".to_string(),
            rules: vec![CompatibilityRule {
                component: "tracing".to_string(),
                min_version: "v1.2.0".to_string(),
                description: "Tracing must drop the legacy collector.".to_string(),
                migration_url: Some("https://example.com/tracing-1.2".to_string()),
            }],
        },
    ]);
    let components = modules(&[("auth", "v0.5.0"), ("tracing", "v1.1.0")]);
    let validator = CompatibilityValidator::new(&registry);

    let at_135 = validator.validate("1.35.0", &components).unwrap_err();
    assert_eq!(at_135.messages().len(), 1);

    let at_136 = validator.validate("1.36.1", &components).unwrap_err();
    assert_eq!(at_136.messages().len(), 2);
    assert!(at_136.messages()[1].ends_with(" See: https://example.com/tracing-1.2"));
}

#[test]
fn test_rule_table_from_yaml() {
    let registry = RuleRegistry::from_yaml(
        r#"
groups:
  - kubernetesVersion: 1.36.0
    rules:
      - component: opa
        minVersion: v1.14.0
        description: OPA must use the v1 constraint API.
"#,
    )
    .unwrap();

    let components = modules(&[("opa", "v1.13.2")]);
    let validator = CompatibilityValidator::new(&registry);
    assert!(validator.validate("1.35.0", &components).is_ok());
    assert_eq!(
        validator.validate("1.36.0", &components).unwrap_err().messages().len(),
        1
    );
}
