//! Integration tests for LocaleManager.

use std::fs;
use std::io::{Seek, Write};
use std::sync::{Arc, Mutex};
use std::thread;

use lexicon::{
    Catalog, CatalogError, Diagnostic, DiagnosticKind, LoadError, LocaleChange, LocaleError, LocaleId,
    LocaleManager, TranslateError, TranslateMode, args,
};
use tempfile::NamedTempFile;

fn locale(tag: &str) -> LocaleId {
    LocaleId::parse(tag).unwrap()
}

const EN: &str = r#"{
    "submit": "Submit",
    "greeting": "Hello, {name}!",
    "auth": { "resend": "Resend in {seconds} seconds" },
    "team": { "members": "{count, plural, one{# member} other{# members}}" },
    "broken": "Hello {name"
}"#;

const RO: &str = r#"{
    "submit": "Trimite",
    "team": { "members": "{count, plural, one{# membru} few{# membri} other{# de membri}}" }
}"#;

fn manager() -> LocaleManager {
    let manager = LocaleManager::builder().default_locale(locale("en")).build();
    manager.load_catalog_str(locale("en"), EN).unwrap();
    manager.load_catalog_str(locale("ro"), RO).unwrap();
    manager
}

fn collect_diagnostics(manager: &LocaleManager) -> Arc<Mutex<Vec<Diagnostic>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    manager.on_diagnostic(move |diagnostic| sink.lock().unwrap().push(diagnostic.clone()));
    seen
}

fn collect_changes(manager: &LocaleManager) -> Arc<Mutex<Vec<LocaleChange>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    manager.on_locale_change(move |change| sink.lock().unwrap().push(change.clone()));
    seen
}

// =========================================================================
// Builder and Basic API
// =========================================================================

#[test]
fn active_locale_defaults_to_default_locale() {
    let manager = LocaleManager::builder().default_locale(locale("en")).build();
    assert_eq!(manager.active_locale(), locale("en"));
    assert_eq!(manager.default_locale(), &locale("en"));
    assert_eq!(manager.mode(), TranslateMode::Lenient);
    assert!(manager.available_locales().is_empty());
}

#[test]
fn builder_accepts_initial_locale() {
    let manager = LocaleManager::builder()
        .default_locale(locale("en"))
        .initial_locale(locale("ro"))
        .build();
    assert_eq!(manager.active_locale(), locale("ro"));
    assert_eq!(
        manager.fallback_chain().locales(),
        &[locale("ro"), locale("en")]
    );
}

#[test]
fn manager_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<LocaleManager>();
}

// =========================================================================
// Translation
// =========================================================================

#[test]
fn translate_renders_arguments() {
    let manager = manager();
    assert_eq!(
        manager.translate("auth.resend", &args! { seconds: 30 }),
        "Resend in 30 seconds"
    );
    assert_eq!(manager.translate_plain("submit"), "Submit");
}

#[test]
fn translate_plural_in_active_locale() {
    let manager = manager();
    assert_eq!(
        manager.translate("team.members", &args! { count: 1 }),
        "1 member"
    );
    assert_eq!(
        manager.translate("team.members", &args! { count: 5 }),
        "5 members"
    );

    manager.set_locale("ro").unwrap();
    assert_eq!(
        manager.translate("team.members", &args! { count: 3 }),
        "3 membri"
    );
    assert_eq!(
        manager.translate("team.members", &args! { count: 20 }),
        "20 de membri"
    );
}

#[test]
fn translate_falls_back_to_default_catalog() {
    let manager = manager();
    manager.set_locale("ro").unwrap();
    assert_eq!(manager.translate_plain("submit"), "Trimite");
    assert_eq!(
        manager.translate("greeting", &args! { name: "Ana" }),
        "Hello, Ana!"
    );
}

#[test]
fn translate_falls_back_through_language_only_locale() {
    let manager = manager();
    manager
        .load_catalog_str(locale("pt"), r#"{ "submit": "Enviar" }"#)
        .unwrap();
    manager
        .load_catalog_str(locale("pt-BR"), r#"{ "greeting": "Olá, {name}!" }"#)
        .unwrap();
    manager.set_locale("pt-BR").unwrap();

    assert_eq!(manager.translate("greeting", &args! { name: "Ana" }), "Olá, Ana!");
    assert_eq!(manager.translate_plain("submit"), "Enviar");
    assert_eq!(
        manager.translate("auth.resend", &args! { seconds: 5 }),
        "Resend in 5 seconds"
    );
}

#[test]
fn plural_rules_follow_the_resolved_locale() {
    let manager = LocaleManager::builder().default_locale(locale("en")).build();
    manager
        .load_catalog_str(
            locale("en"),
            r#"{ "files": "{count, plural, one{# file} few{# files (few)} other{# files}}" }"#,
        )
        .unwrap();
    manager
        .load_catalog_str(locale("pl"), r#"{ "submit": "Wyślij" }"#)
        .unwrap();
    manager.set_locale("pl").unwrap();
    // The template comes from the English catalog, so English rules apply.
    assert_eq!(manager.translate("files", &args! { count: 2 }), "2 files");
}

#[test]
fn translate_missing_key_returns_key_path_with_one_diagnostic() {
    let manager = manager();
    let diagnostics = collect_diagnostics(&manager);

    assert_eq!(
        manager.translate_plain("nonexistent.key.path"),
        "nonexistent.key.path"
    );

    let diagnostics = diagnostics.lock().unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, DiagnosticKind::MissingTranslation);
    assert_eq!(
        diagnostics[0].key_path.as_deref(),
        Some("nonexistent.key.path")
    );
    assert_eq!(diagnostics[0].locale, "en");
}

#[test]
fn only_try_translate_suggests_close_keys() {
    let manager = manager();
    let diagnostics = collect_diagnostics(&manager);

    assert_eq!(manager.translate_plain("submitt"), "submitt");
    assert_eq!(
        diagnostics.lock().unwrap()[0].detail,
        "no translation for 'submitt' in [en]"
    );

    let error = manager.try_translate("submitt", &args! {}).unwrap_err();
    assert!(error.to_string().ends_with("did you mean: submit?"), "{error}");
}

#[test]
fn translate_missing_argument_emits_diagnostic() {
    let manager = manager();
    let diagnostics = collect_diagnostics(&manager);

    assert_eq!(manager.translate("greeting", &args! {}), "Hello, !");

    let diagnostics = diagnostics.lock().unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, DiagnosticKind::MissingArgument);
    assert_eq!(diagnostics[0].key_path.as_deref(), Some("greeting"));
}

#[test]
fn translate_malformed_template_returns_raw_text() {
    let manager = manager();
    let diagnostics = collect_diagnostics(&manager);

    assert_eq!(
        manager.translate("broken", &args! { name: "Ana" }),
        "Hello {name"
    );

    let diagnostics = diagnostics.lock().unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, DiagnosticKind::TemplateSyntaxError);
    assert_eq!(diagnostics[0].key_path.as_deref(), Some("broken"));
}

#[test]
#[should_panic(expected = "malformed template 'broken'")]
fn strict_mode_panics_on_malformed_template() {
    let manager = LocaleManager::builder()
        .default_locale(locale("en"))
        .mode(TranslateMode::Strict)
        .build();
    manager.load_catalog_str(locale("en"), EN).unwrap();
    manager.translate_plain("broken");
}

#[test]
fn strict_mode_still_returns_key_path_for_missing_keys() {
    let manager = LocaleManager::builder()
        .default_locale(locale("en"))
        .mode(TranslateMode::Strict)
        .build();
    manager.load_catalog_str(locale("en"), EN).unwrap();
    assert_eq!(manager.translate_plain("missing"), "missing");
}

#[test]
fn translate_in_does_not_switch_locale() {
    let manager = manager();
    assert_eq!(
        manager.translate_in(&locale("ro"), "submit", &args! {}),
        "Trimite"
    );
    assert_eq!(manager.active_locale(), locale("en"));
    assert_eq!(manager.translate_plain("submit"), "Submit");
}

#[test]
fn translate_is_shareable_across_threads() {
    let manager = Arc::new(manager());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let manager = Arc::clone(&manager);
            thread::spawn(move || manager.translate("team.members", &args! { count: i }))
        })
        .collect();
    let outputs: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(outputs, vec!["0 members", "1 member", "2 members", "3 members"]);
}

// =========================================================================
// try_translate
// =========================================================================

#[test]
fn try_translate_success() {
    let manager = manager();
    assert_eq!(
        manager.try_translate("greeting", &args! { name: "Ana" }),
        Ok("Hello, Ana!".to_string())
    );
}

#[test]
fn try_translate_reports_missing_key() {
    let manager = manager();
    let diagnostics = collect_diagnostics(&manager);
    assert!(matches!(
        manager.try_translate("nope", &args! {}),
        Err(TranslateError::Missing(_))
    ));
    assert!(diagnostics.lock().unwrap().is_empty());
}

#[test]
fn try_translate_reports_syntax_error() {
    let manager = manager();
    match manager.try_translate("broken", &args! {}) {
        Err(TranslateError::Syntax { key_path, locale: found, .. }) => {
            assert_eq!(key_path, "broken");
            assert_eq!(found, locale("en"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn try_translate_reports_degraded_render() {
    let manager = manager();
    match manager.try_translate_in(&locale("ro"), "greeting", &args! {}) {
        Err(TranslateError::Degraded {
            output,
            diagnostics,
            ..
        }) => {
            assert_eq!(output, "Hello, !");
            assert_eq!(diagnostics.len(), 1);
            assert_eq!(diagnostics[0].kind, DiagnosticKind::MissingArgument);
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

// =========================================================================
// format_str and the template cache
// =========================================================================

#[test]
fn format_str_renders_ad_hoc_templates() {
    let manager = manager();
    assert_eq!(
        manager.format_str("{n, plural, one{# day} other{# days}} left", &args! { n: 1 }),
        "1 day left"
    );
}

#[test]
fn format_str_caches_by_source() {
    let manager = manager();
    assert_eq!(manager.template_cache_len(), 0);
    manager.format_str("Hi {name}", &args! { name: "a" });
    manager.format_str("Hi {name}", &args! { name: "b" });
    assert_eq!(manager.template_cache_len(), 1);
    manager.clear_template_cache();
    assert_eq!(manager.template_cache_len(), 0);
}

#[test]
fn format_str_cache_stays_bounded() {
    let manager = manager();
    for i in 0..1000 {
        let template = format!("Item {i}: {{name}}");
        assert_eq!(
            manager.format_str(&template, &args! { name: "x" }),
            format!("Item {i}: x")
        );
    }
    let cached = manager.template_cache_len();
    assert!(cached > 0 && cached <= 256, "cached {cached} templates");
}

#[test]
fn format_str_malformed_returns_raw_text() {
    let manager = manager();
    let diagnostics = collect_diagnostics(&manager);
    assert_eq!(manager.format_str("oops }", &args! {}), "oops }");
    let diagnostics = diagnostics.lock().unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, DiagnosticKind::TemplateSyntaxError);
    assert_eq!(diagnostics[0].key_path, None);
}

#[test]
fn translate_caches_parsed_templates() {
    let manager = manager();
    manager.translate("greeting", &args! { name: "a" });
    manager.translate("greeting", &args! { name: "b" });
    manager.translate_plain("submit");
    assert_eq!(manager.template_cache_len(), 2);
}

#[test]
fn reloading_a_catalog_invalidates_cached_templates() {
    let manager = manager();
    assert_eq!(manager.translate_plain("submit"), "Submit");
    manager
        .load_catalog_str(locale("en"), r#"{ "submit": "Send" }"#)
        .unwrap();
    assert_eq!(manager.translate_plain("submit"), "Send");
}

// =========================================================================
// Locale Switching
// =========================================================================

#[test]
fn set_locale_notifies_subscribers() {
    let manager = manager();
    let changes = collect_changes(&manager);

    manager.set_locale("ro").unwrap();

    assert_eq!(manager.active_locale(), locale("ro"));
    assert_eq!(
        *changes.lock().unwrap(),
        vec![LocaleChange {
            previous: locale("en"),
            current: locale("ro"),
        }]
    );
}

#[test]
fn set_locale_to_current_locale_does_not_notify() {
    let manager = manager();
    let changes = collect_changes(&manager);
    manager.set_locale("en").unwrap();
    assert!(changes.lock().unwrap().is_empty());
}

#[test]
fn set_locale_canonicalises_tag() {
    let manager = manager();
    manager.set_locale("RO").unwrap();
    assert_eq!(manager.active_locale(), locale("ro"));
}

#[test]
fn set_unknown_locale_keeps_active_locale() {
    let manager = manager();
    let diagnostics = collect_diagnostics(&manager);
    let changes = collect_changes(&manager);

    let error = manager.set_locale("xx-unknown").unwrap_err();

    assert_eq!(
        error,
        LocaleError::UnknownLocale {
            requested: "xx-unknown".to_string(),
            available: vec!["en".to_string(), "ro".to_string()],
        }
    );
    assert_eq!(manager.active_locale(), locale("en"));
    assert!(changes.lock().unwrap().is_empty());

    let diagnostics = diagnostics.lock().unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, DiagnosticKind::UnknownLocale);
    assert_eq!(diagnostics[0].locale, "xx-unknown");
}

#[test]
fn set_malformed_locale_is_rejected() {
    let manager = manager();
    assert!(manager.set_locale("not a locale!").is_err());
    assert_eq!(manager.active_locale(), locale("en"));
}

#[test]
fn unsubscribe_stops_notifications() {
    let manager = manager();
    let changes = Arc::new(Mutex::new(0));
    let sink = Arc::clone(&changes);
    let subscription = manager.on_locale_change(move |_| *sink.lock().unwrap() += 1);

    manager.set_locale("ro").unwrap();
    assert!(subscription.unsubscribe());
    manager.set_locale("en").unwrap();

    assert_eq!(*changes.lock().unwrap(), 1);
}

#[test]
fn unsubscribe_diagnostic_listener_and_after_drop() {
    let manager = manager();
    let count = Arc::new(Mutex::new(0));
    let sink = Arc::clone(&count);
    let subscription = manager.on_diagnostic(move |_| *sink.lock().unwrap() += 1);

    manager.translate_plain("missing.one");
    assert!(subscription.unsubscribe());
    manager.translate_plain("missing.two");
    assert_eq!(*count.lock().unwrap(), 1);

    let orphan = manager.on_locale_change(|_| {});
    drop(manager);
    assert!(!orphan.unsubscribe());
}

#[test]
fn callbacks_may_translate_during_notification() {
    let manager = Arc::new(manager());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let weak = Arc::downgrade(&manager);
    manager.on_locale_change(move |_| {
        if let Some(manager) = weak.upgrade() {
            sink.lock().unwrap().push(manager.translate_plain("submit"));
        }
    });

    manager.set_locale("ro").unwrap();
    assert_eq!(*seen.lock().unwrap(), vec!["Trimite"]);
}

// =========================================================================
// Catalog Loading
// =========================================================================

#[test]
fn available_locales_are_sorted() {
    let manager = manager();
    manager.load_catalog(locale("id"), Catalog::new());
    assert_eq!(
        manager.available_locales(),
        vec![locale("en"), locale("id"), locale("ro")]
    );
}

#[test]
fn load_catalog_str_reports_key_count() {
    let manager = LocaleManager::builder().default_locale(locale("en")).build();
    assert_eq!(manager.load_catalog_str(locale("en"), EN).unwrap(), 5);
}

#[test]
fn load_catalog_str_rejects_malformed_catalog() {
    let manager = manager();
    let error = manager
        .load_catalog_str(locale("ro"), r#"{ "submit": 1 }"#)
        .unwrap_err();
    assert!(matches!(error, LoadError::Catalog { .. }));
    assert_eq!(manager.translate_plain("submit"), "Submit");
    manager.set_locale("ro").unwrap();
    assert_eq!(manager.translate_plain("submit"), "Trimite");
}

#[test]
fn load_catalog_file_and_reload() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, r#"{{ "submit": "Trimite" }}"#).unwrap();
    file.flush().unwrap();

    let manager = manager();
    manager.load_catalog_file(locale("ro"), file.path()).unwrap();
    manager.set_locale("ro").unwrap();
    assert_eq!(manager.translate_plain("submit"), "Trimite");

    file.as_file_mut().set_len(0).unwrap();
    file.rewind().unwrap();
    write!(file, r#"{{ "submit": "Trimite acum" }}"#).unwrap();
    file.flush().unwrap();

    assert_eq!(manager.reload_catalog(&locale("ro")).unwrap(), 1);
    assert_eq!(manager.translate_plain("submit"), "Trimite acum");
}

#[test]
fn reload_requires_file_loaded_catalog() {
    let manager = manager();
    assert!(matches!(
        manager.reload_catalog(&locale("ro")),
        Err(LoadError::NoPathForReload { .. })
    ));
}

#[test]
fn load_catalog_file_missing_path() {
    let manager = manager();
    assert!(matches!(
        manager.load_catalog_file(locale("de"), "/nonexistent/de.json"),
        Err(LoadError::Io { .. })
    ));
    assert!(!manager.available_locales().contains(&locale("de")));
}

#[test]
fn string_load_after_file_load_forgets_path() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, r#"{{ "submit": "Trimite" }}"#).unwrap();
    file.flush().unwrap();

    let manager = manager();
    manager.load_catalog_file(locale("ro"), file.path()).unwrap();
    manager.load_catalog_str(locale("ro"), RO).unwrap();
    assert!(matches!(
        manager.reload_catalog(&locale("ro")),
        Err(LoadError::NoPathForReload { .. })
    ));
}

// =========================================================================
// Catalog Fragments
// =========================================================================

#[test]
fn load_catalog_fragments_merges_into_one_catalog() {
    let manager = manager();
    let fragments = [
        Catalog::from_json_str(r#"{ "submit": "Trimite" }"#).unwrap(),
        Catalog::from_json_str(r#"{ "tour": { "start": "Începe" } }"#).unwrap(),
    ];
    assert_eq!(manager.load_catalog_fragments(locale("ro"), fragments).unwrap(), 2);
    manager.set_locale("ro").unwrap();
    assert_eq!(manager.translate_plain("submit"), "Trimite");
    assert_eq!(manager.translate_plain("tour.start"), "Începe");
}

#[test]
fn overlapping_fragments_keep_the_current_catalog() {
    let manager = manager();
    let fragments = [
        Catalog::from_json_str(r#"{ "submit": "A" }"#).unwrap(),
        Catalog::from_json_str(r#"{ "submit": "B" }"#).unwrap(),
    ];
    assert!(matches!(
        manager.load_catalog_fragments(locale("ro"), fragments),
        Err(LoadError::Catalog {
            source: CatalogError::DuplicateKey { .. },
            ..
        })
    ));
    manager.set_locale("ro").unwrap();
    assert_eq!(manager.translate_plain("submit"), "Trimite");
}

#[test]
fn load_catalog_dir_with_partial_locale_falls_back() {
    let dir = tempfile::tempdir().unwrap();
    let en = dir.path().join("en");
    fs::create_dir(&en).unwrap();
    fs::write(en.join("translations.json"), r#"{ "submit": "Submit" }"#).unwrap();
    fs::write(en.join("tour.json"), r#"{ "tour": { "start": "Start" } }"#).unwrap();
    fs::write(en.join("empty-state.json"), r#"{ "empty": { "title": "Nothing here" } }"#).unwrap();
    fs::write(en.join("notes.txt"), "not a fragment").unwrap();
    let ro = dir.path().join("ro");
    fs::create_dir(&ro).unwrap();
    fs::write(ro.join("translations.json"), r#"{ "submit": "Trimite" }"#).unwrap();
    fs::write(ro.join("tour.json"), r#"{ "tour": { "start": "Începe" } }"#).unwrap();

    let manager = LocaleManager::builder().default_locale(locale("en")).build();
    assert_eq!(manager.load_catalog_dir(locale("en"), &en).unwrap(), 3);
    assert_eq!(manager.load_catalog_dir(locale("ro"), &ro).unwrap(), 2);
    manager.set_locale("ro").unwrap();

    assert_eq!(manager.translate_plain("tour.start"), "Începe");
    assert_eq!(manager.translate_plain("empty.title"), "Nothing here");

    fs::write(ro.join("tour.json"), r#"{ "tour": { "start": "Pornește" } }"#).unwrap();
    assert_eq!(manager.reload_catalog(&locale("ro")).unwrap(), 2);
    assert_eq!(manager.translate_plain("tour.start"), "Pornește");
    assert_eq!(manager.translate_plain("submit"), "Trimite");
}

#[test]
fn load_catalog_dir_without_fragments_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let manager = manager();
    assert!(matches!(
        manager.load_catalog_dir(locale("de"), dir.path()),
        Err(LoadError::EmptyCatalogDir { .. })
    ));
    assert!(matches!(
        manager.load_catalog_dir(locale("de"), dir.path().join("missing")),
        Err(LoadError::Io { .. })
    ));
    assert!(!manager.available_locales().contains(&locale("de")));
}

#[test]
fn independent_managers_do_not_share_state() {
    let first = manager();
    let second = manager();
    first.set_locale("ro").unwrap();
    assert_eq!(first.active_locale(), locale("ro"));
    assert_eq!(second.active_locale(), locale("en"));
}
