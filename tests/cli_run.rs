//! Command execution tests: parsed commands run against wiremock with
//! captured output.

mod common;

use clap::Parser;
use common::Harness;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, body_string_contains, method, path};
use wiremock::{Mock, ResponseTemplate};

use wlc::cli::{run, Cli};
use wlc::{Config, ErrorKind};

/// Run `args` against the harness, returning stdout or the error.
fn run_wlc(h: &Harness, args: &[&str], stdin: &[u8]) -> wlc::Result<String> {
    let cli = Cli::parse_from(std::iter::once("wlc").chain(args.iter().copied()));
    let config = Config::default().with_overrides(Some(h.api()), Some("secret".to_string()));
    let mut out = Vec::new();
    let mut input = stdin;
    run(&cli, &config, &mut out, &mut input)?;
    Ok(String::from_utf8(out).unwrap())
}

fn mount_project(h: &Harness) {
    h.mount(
        Mock::given(method("GET"))
            .and(path("/api/projects/hello/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(h.project("hello"))),
    );
}

fn mount_translation(h: &Harness) {
    h.mount(
        Mock::given(method("GET"))
            .and(path("/api/translations/hello/weblate/cs/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(h.translation("hello", "weblate", "cs")),
            ),
    );
}

#[test]
fn test_list_projects_json() {
    let h = Harness::start();
    h.mount(
        Mock::given(method("GET"))
            .and(path("/api/projects/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(h.page(vec![h.project("hello"), h.project("world")], None)),
            ),
    );

    let output = run_wlc(&h, &["--format", "json", "list-projects"], b"").unwrap();
    let parsed: Value = serde_json::from_str(&output).unwrap();
    let slugs: Vec<&str> = parsed
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["slug"].as_str().unwrap())
        .collect();
    assert_eq!(slugs, ["hello", "world"]);
}

#[test]
fn test_empty_listing_json() {
    let h = Harness::start();
    h.mount(
        Mock::given(method("GET"))
            .and(path("/api/languages/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(h.page(vec![], None))),
    );

    let output = run_wlc(&h, &["--format", "json", "list-languages"], b"").unwrap();
    assert_eq!(output.trim(), "[]");
}

#[test]
fn test_show_text() {
    let h = Harness::start();
    mount_project(&h);

    let output = run_wlc(&h, &["show", "hello"], b"").unwrap();
    assert!(output.contains("name: HELLO\n"));
    assert!(output.contains("slug: hello\n"));
    // Links are not displayed.
    assert!(!output.contains("components_list_url"));
}

#[test]
fn test_show_nested_as_id() {
    let h = Harness::start();
    h.mount(
        Mock::given(method("GET"))
            .and(path("/api/components/hello/weblate/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(h.component("hello", "weblate"))),
    );

    let output = run_wlc(&h, &["--format", "csv", "show", "hello/weblate"], b"").unwrap();
    assert!(output.contains("project,hello\n"));
    assert!(output.contains("filemask,po/*.po\n"));
}

#[test]
fn test_ls_component_lists_translations() {
    let h = Harness::start();
    h.mount(
        Mock::given(method("GET"))
            .and(path("/api/components/hello/weblate/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(h.component("hello", "weblate"))),
    );
    h.mount(
        Mock::given(method("GET"))
            .and(path("/api/components/hello/weblate/translations/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(h.page(
                vec![
                    h.translation("hello", "weblate", "cs"),
                    h.translation("hello", "weblate", "de"),
                ],
                None,
            ))),
    );

    let output = run_wlc(&h, &["--format", "csv", "ls", "hello/weblate"], b"").unwrap();
    let mut lines = output.lines();
    assert!(lines.next().unwrap().starts_with("url,language,component,language_code"));
    assert_eq!(lines.count(), 2);
}

#[test]
fn test_missing_object() {
    let h = Harness::start();
    let err = run_wlc(&h, &["commit"], b"").unwrap_err();
    assert_eq!(err.to_string(), "No object passed on command line!");
    assert!(h.received().is_empty());
}

#[test]
fn test_commit_failure_message() {
    let h = Harness::start();
    mount_project(&h);
    h.mount(
        Mock::given(method("POST"))
            .and(path("/api/projects/hello/repository/"))
            .and(body_json(json!({ "operation": "commit" })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "result": false, "detail": "Nothing to commit." })),
            ),
    );

    let err = run_wlc(&h, &["commit", "hello"], b"").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Command);
    assert_eq!(err.to_string(), "Failed to commit changes!\nNothing to commit.");
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn test_lock_requires_component() {
    let h = Harness::start();
    mount_project(&h);

    let err = run_wlc(&h, &["lock", "hello"], b"").unwrap_err();
    assert_eq!(
        err.to_string(),
        "This command is supported only at component level"
    );
}

#[test]
fn test_lock_status() {
    let h = Harness::start();
    h.mount(
        Mock::given(method("GET"))
            .and(path("/api/components/hello/weblate/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(h.component("hello", "weblate"))),
    );
    h.mount(
        Mock::given(method("GET"))
            .and(path("/api/components/hello/weblate/lock/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "locked": true }))),
    );

    let output = run_wlc(&h, &["lock-status", "hello/weblate"], b"").unwrap();
    assert_eq!(output, "locked: true\n");
}

#[test]
fn test_download_to_stdout() {
    let h = Harness::start();
    mount_translation(&h);
    h.mount(
        Mock::given(method("GET"))
            .and(path("/api/translations/hello/weblate/cs/file/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("msgid \"\"\n")),
    );

    let output = run_wlc(&h, &["download", "hello/weblate/cs"], b"").unwrap();
    assert_eq!(output, "msgid \"\"\n");
}

#[test]
fn test_download_project_requires_output_dir() {
    let h = Harness::start();
    mount_project(&h);

    let err = run_wlc(&h, &["download", "hello"], b"").unwrap_err();
    assert_eq!(
        err.to_string(),
        "This command is supported only at translation level"
    );
}

#[test]
fn test_upload_from_stdin() {
    let h = Harness::start();
    mount_translation(&h);
    h.mount(
        Mock::given(method("POST"))
            .and(path("/api/translations/hello/weblate/cs/file/"))
            .and(body_string_contains("msgstr \"Ahoj\""))
            .and(body_string_contains("translate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": true,
                "count": 1,
                "total": 1,
                "accepted": 1,
                "not_found": 0,
                "skipped": 0,
            })))
            .expect(1),
    );

    run_wlc(
        &h,
        &["upload", "hello/weblate/cs"],
        b"msgid \"Hello\"\nmsgstr \"Ahoj\"\n",
    )
    .unwrap();
}

#[test]
fn test_upload_failure() {
    let h = Harness::start();
    mount_translation(&h);
    h.mount(
        Mock::given(method("POST"))
            .and(path("/api/translations/hello/weblate/cs/file/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "detail": "Invalid file." })),
            ),
    );

    let err = run_wlc(&h, &["upload", "hello/weblate/cs"], b"x").unwrap_err();
    assert_eq!(err.to_string(), "Failed to upload translations!\nInvalid file.");
}

#[test]
fn test_upload_garbled_reply_keeps_protocol_kind() {
    let h = Harness::start();
    mount_translation(&h);
    h.mount(
        Mock::given(method("POST"))
            .and(path("/api/translations/hello/weblate/cs/file/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>")),
    );

    let err = run_wlc(&h, &["upload", "hello/weblate/cs"], b"x").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Protocol);
    assert!(!err.to_string().starts_with("Failed to upload translations!"));
}

#[test]
fn test_stats_translation() {
    let h = Harness::start();
    mount_translation(&h);
    h.mount(
        Mock::given(method("GET"))
            .and(path("/api/translations/hello/weblate/cs/statistics/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": "cs",
                "name": "Czech",
                "total": 4,
                "translated": 2,
                "translated_percent": 50.0,
                "failing_checks": 1,
            }))),
    );

    let output = run_wlc(&h, &["stats", "hello/weblate/cs"], b"").unwrap();
    assert!(output.contains("translated_percent: 50.0\n"));
    assert!(output.contains("failing: 1\n"));
}

#[test]
fn test_auth_error_passes_through() {
    let h = Harness::start();
    h.mount(
        Mock::given(method("GET"))
            .and(path("/api/projects/"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({ "detail": "Invalid token." })),
            ),
    );

    let err = run_wlc(&h, &["list-projects"], b"").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Auth);
}

#[test]
fn test_key_is_sent() {
    let h = Harness::start();
    h.mount(
        Mock::given(method("GET"))
            .and(path("/api/projects/"))
            .and(wiremock::matchers::header("Authorization", "Token secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(h.page(vec![], None)))
            .expect(1),
    );

    run_wlc(&h, &["list-projects"], b"").unwrap();
}
