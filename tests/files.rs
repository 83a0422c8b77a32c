//! File download and upload tests against wiremock.

mod common;

use std::fs;

use common::Harness;
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use wlc::{ErrorKind, UploadMethod, UploadOptions};

const PO: &str = "msgid \"Hello\"\nmsgstr \"Ahoj\"\n";

fn mount_translation(h: &Harness) {
    h.mount(
        Mock::given(method("GET"))
            .and(path("/api/translations/hello/weblate/cs/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(h.translation("hello", "weblate", "cs")),
            ),
    );
}

fn file_reply(filename: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("Content-Type", "text/x-po; charset=utf-8")
        .insert_header(
            "Content-Disposition",
            format!("attachment; filename=\"{filename}\"").as_str(),
        )
        .set_body_bytes(PO)
}

#[test]
fn test_download_translation() {
    let h = Harness::start();
    mount_translation(&h);
    h.mount(
        Mock::given(method("GET"))
            .and(path("/api/translations/hello/weblate/cs/file/"))
            .respond_with(file_reply("cs.po")),
    );

    let mut translation = h.weblate("").get_translation("hello", "weblate", "cs").unwrap();
    let download = translation.download(None).unwrap();
    assert_eq!(download.content, PO.as_bytes());
    assert_eq!(download.filename.as_deref(), Some("cs.po"));
    assert_eq!(
        download.content_type.as_deref(),
        Some("text/x-po; charset=utf-8")
    );
}

#[test]
fn test_download_converted() {
    let h = Harness::start();
    mount_translation(&h);
    h.mount(
        Mock::given(method("GET"))
            .and(path("/api/translations/hello/weblate/cs/file/"))
            .and(query_param("format", "csv"))
            .respond_with(ResponseTemplate::new(200).set_body_string("source,target\n"))
            .expect(1),
    );

    let dir = tempfile::tempdir().unwrap();
    let mut translation = h.weblate("").get_translation("hello", "weblate", "cs").unwrap();
    // No filename hint: language code plus the requested format.
    let written = translation.download_to(dir.path(), Some("csv")).unwrap();
    assert_eq!(written, dir.path().join("hello").join("weblate").join("cs.csv"));
    assert_eq!(fs::read_to_string(written).unwrap(), "source,target\n");
}

#[test]
fn test_download_to_layout() {
    let h = Harness::start();
    mount_translation(&h);
    h.mount(
        Mock::given(method("GET"))
            .and(path("/api/translations/hello/weblate/cs/file/"))
            .respond_with(file_reply("cs.po")),
    );

    let dir = tempfile::tempdir().unwrap();
    let mut translation = h.weblate("").get_translation("hello", "weblate", "cs").unwrap();
    let written = translation.download_to(dir.path(), None).unwrap();
    assert_eq!(written, dir.path().join("hello/weblate/cs.po"));
    assert_eq!(fs::read(written).unwrap(), PO.as_bytes());
}

#[test]
fn test_download_rejects_traversal() {
    let h = Harness::start();
    mount_translation(&h);
    h.mount(
        Mock::given(method("GET"))
            .and(path("/api/translations/hello/weblate/cs/file/"))
            .respond_with(file_reply("../evil.po")),
    );

    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("out");
    let mut translation = h.weblate("").get_translation("hello", "weblate", "cs").unwrap();
    let err = translation.download_to(&target, None).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::PathValidation);
    assert!(!target.exists());
    assert!(!dir.path().join("evil.po").exists());
}

#[test]
fn test_download_rejects_unsafe_slug() {
    let h = Harness::start();
    let mut translation = h.translation("hello", "weblate", "cs");
    translation["component"]["slug"] = json!("..");
    h.mount(
        Mock::given(method("GET"))
            .and(path("/api/translations/hello/weblate/cs/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(translation)),
    );
    h.mount(
        Mock::given(method("GET"))
            .and(path("/api/translations/hello/weblate/cs/file/"))
            .respond_with(file_reply("cs.po")),
    );

    let dir = tempfile::tempdir().unwrap();
    let mut translation = h.weblate("").get_translation("hello", "weblate", "cs").unwrap();
    let err = translation.download_to(dir.path(), None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PathValidation);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_component_archive() {
    let h = Harness::start();
    h.mount(
        Mock::given(method("GET"))
            .and(path("/api/components/hello/weblate/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(h.component("hello", "weblate"))),
    );
    h.mount(
        Mock::given(method("GET"))
            .and(path("/api/components/hello/weblate/file/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Type", "application/zip")
                    .set_body_bytes(b"PK\x03\x04".to_vec()),
            ),
    );

    let dir = tempfile::tempdir().unwrap();
    let component = h.weblate("").get_component("hello", "weblate").unwrap();
    let written = component.download_to(dir.path(), None).unwrap();
    assert_eq!(written, dir.path().join("hello").join("weblate.zip"));
}

#[test]
fn test_upload_sends_options() {
    let h = Harness::start();
    mount_translation(&h);
    h.mount(
        Mock::given(method("POST"))
            .and(path("/api/translations/hello/weblate/cs/file/"))
            .and(body_string_contains("name=\"overwrite\""))
            .and(body_string_contains("name=\"method\""))
            .and(body_string_contains("filename=\"cs.po\""))
            .and(body_string_contains(PO))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": true,
                "count": 4,
                "total": 4,
                "accepted": 3,
                "not_found": 1,
                "skipped": 0,
            })))
            .expect(1),
    );

    let mut translation = h.weblate("key").get_translation("hello", "weblate", "cs").unwrap();
    let options = UploadOptions {
        overwrite: true,
        method: Some(UploadMethod::Suggest),
        ..UploadOptions::default()
    };
    let result = translation.upload(PO.as_bytes(), &options).unwrap();
    assert!(result.result);
    assert_eq!(result.accepted, 3);
    assert_eq!(result.not_found, 1);
}

#[test]
fn test_upload_failure_carries_detail() {
    let h = Harness::start();
    mount_translation(&h);
    h.mount(
        Mock::given(method("POST"))
            .and(path("/api/translations/hello/weblate/cs/file/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "detail": "Could not parse the file." })),
            ),
    );

    let mut translation = h.weblate("key").get_translation("hello", "weblate", "cs").unwrap();
    let err = translation
        .upload(b"garbage", &UploadOptions::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Protocol);
    assert!(err.to_string().contains("Could not parse the file."));
}
