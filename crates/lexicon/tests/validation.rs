//! Tests for checking translation catalogs against the default catalog.

use lexicon::interpreter::{missing_keys, validate_catalog};
use lexicon::{Catalog, CatalogWarning, LocaleId, LocaleManager, SyntaxErrorKind};

fn locale(tag: &str) -> LocaleId {
    LocaleId::parse(tag).unwrap()
}

fn catalog(json: &str) -> Catalog {
    Catalog::from_json_str(json).unwrap()
}

fn default_catalog() -> Catalog {
    catalog(
        r#"{
            "submit": "Submit",
            "greeting": "Hello, {name}!",
            "team": { "members": "{count, plural, one{# member} other{# members}}" }
        }"#,
    )
}

#[test]
fn matching_catalog_has_no_warnings() {
    let target = catalog(
        r#"{
            "submit": "Trimite",
            "greeting": "Salut, {name}!",
            "team": { "members": "{count, plural, one{# membru} few{# membri} other{# de membri}}" }
        }"#,
    );
    assert!(validate_catalog(&default_catalog(), &target, &locale("ro")).is_empty());
}

#[test]
fn unknown_key_is_reported() {
    let target = catalog(r#"{ "submitt": "Trimite" }"#);
    let warnings = validate_catalog(&default_catalog(), &target, &locale("ro"));
    assert_eq!(
        warnings,
        vec![CatalogWarning::UnknownKey {
            key_path: "submitt".to_string(),
            locale: locale("ro"),
        }]
    );
    assert_eq!(
        warnings[0].to_string(),
        "'submitt' in 'ro' does not exist in the default catalog"
    );
}

#[test]
fn syntax_error_is_reported() {
    let target = catalog(r#"{ "greeting": "Salut, {name" }"#);
    let warnings = validate_catalog(&default_catalog(), &target, &locale("ro"));
    assert_eq!(warnings.len(), 1);
    match &warnings[0] {
        CatalogWarning::SyntaxError { key_path, error, .. } => {
            assert_eq!(key_path, "greeting");
            assert_eq!(error.kind, SyntaxErrorKind::UnbalancedBrace);
        }
        other => panic!("unexpected warning: {other}"),
    }
}

#[test]
fn argument_mismatch_is_reported() {
    let target = catalog(r#"{ "greeting": "Salut, {nume}!" }"#);
    let warnings = validate_catalog(&default_catalog(), &target, &locale("ro"));
    assert_eq!(
        warnings,
        vec![CatalogWarning::ArgumentMismatch {
            key_path: "greeting".to_string(),
            locale: locale("ro"),
            expected: vec!["name".to_string()],
            found: vec!["nume".to_string()],
        }]
    );
    assert_eq!(
        warnings[0].to_string(),
        "'greeting' in 'ro' uses arguments [nume] but the default uses [name]"
    );
}

#[test]
fn warnings_are_in_key_order() {
    let target = catalog(
        r#"{
            "zeta": "Z",
            "greeting": "Salut, {nume}!",
            "alpha": "A {"
        }"#,
    );
    let warnings = validate_catalog(&default_catalog(), &target, &locale("ro"));
    let keys: Vec<&str> = warnings.iter().map(CatalogWarning::key_path).collect();
    assert_eq!(keys, vec!["alpha", "alpha", "greeting", "zeta"]);
}

#[test]
fn missing_keys_lists_untranslated_entries() {
    let target = catalog(r#"{ "submit": "Trimite" }"#);
    assert_eq!(
        missing_keys(&default_catalog(), &target),
        vec!["greeting", "team.members"]
    );
    assert!(missing_keys(&default_catalog(), &default_catalog()).is_empty());
}

#[test]
fn manager_validates_loaded_catalogs() {
    let manager = LocaleManager::builder().default_locale(locale("en")).build();
    manager.load_catalog(locale("en"), default_catalog());
    manager.load_catalog(locale("ro"), catalog(r#"{ "extra": "x" }"#));

    let warnings = manager.validate(&locale("ro"));
    assert_eq!(warnings.len(), 1);
    assert!(matches!(warnings[0], CatalogWarning::UnknownKey { .. }));
    assert!(manager.validate(&locale("de")).is_empty());
}
