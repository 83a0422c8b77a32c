//! CLI argument parsing tests.

use std::path::PathBuf;

use clap::Parser;
use wlc::cli::{Cli, Command, Target};
use wlc::output::Format;
use wlc::{Conflicts, UploadMethod};

#[test]
fn test_defaults() {
    let cli = Cli::parse_from(["wlc", "list-projects"]);

    assert_eq!(cli.format, Format::Text);
    assert_eq!(cli.config_section, "weblate");
    assert!(!cli.debug);
    assert!(cli.config.is_none());
    assert!(matches!(cli.command, Command::ListProjects));
}

#[test]
fn test_global_options_before_command() {
    let cli = Cli::parse_from([
        "wlc",
        "--format",
        "json",
        "--url",
        "https://hosted.weblate.org/api/",
        "--key",
        "secret",
        "-c",
        "/tmp/weblate.ini",
        "-s",
        "staging",
        "show",
        "hello/weblate",
    ]);

    assert_eq!(cli.format, Format::Json);
    assert_eq!(cli.url.as_deref(), Some("https://hosted.weblate.org/api/"));
    assert_eq!(cli.key.as_deref(), Some("secret"));
    assert_eq!(cli.config, Some(PathBuf::from("/tmp/weblate.ini")));
    assert_eq!(cli.config_section, "staging");
    match cli.command {
        Command::Show(target) => assert_eq!(target.object.as_deref(), Some("hello/weblate")),
        _ => panic!("Expected Show command"),
    }
}

#[test]
fn test_object_is_optional() {
    let cli = Cli::parse_from(["wlc", "ls"]);
    match cli.command {
        Command::Ls(target) => assert_eq!(target, Target::default()),
        _ => panic!("Expected Ls command"),
    }
}

#[test]
fn test_download_convert_short_flag() {
    // -c after the subcommand belongs to download, not to --config.
    let cli = Cli::parse_from([
        "wlc", "download", "hello/weblate/cs", "-c", "csv", "-o", "cs.csv",
    ]);

    assert!(cli.config.is_none());
    match cli.command {
        Command::Download {
            target,
            convert,
            output,
            output_dir,
        } => {
            assert_eq!(target.object.as_deref(), Some("hello/weblate/cs"));
            assert_eq!(convert.as_deref(), Some("csv"));
            assert_eq!(output, Some(PathBuf::from("cs.csv")));
            assert!(output_dir.is_none());
        }
        _ => panic!("Expected Download command"),
    }
}

#[test]
fn test_upload_options() {
    let cli = Cli::parse_from([
        "wlc",
        "upload",
        "hello/weblate/cs",
        "-i",
        "cs.po",
        "--overwrite",
        "--method",
        "suggest",
        "--conflicts",
        "replace-translated",
        "--author-name",
        "Jane",
    ]);

    match cli.command {
        Command::Upload {
            input,
            overwrite,
            method,
            conflicts,
            author_name,
            fuzzy,
            ..
        } => {
            assert_eq!(input, Some(PathBuf::from("cs.po")));
            assert!(overwrite);
            assert_eq!(method, UploadMethod::Suggest);
            assert_eq!(conflicts, Some(Conflicts::ReplaceTranslated));
            assert_eq!(author_name.as_deref(), Some("Jane"));
            assert!(fuzzy.is_none());
        }
        _ => panic!("Expected Upload command"),
    }
}

#[test]
fn test_upload_method_defaults_to_translate() {
    let cli = Cli::parse_from(["wlc", "upload", "hello/weblate/cs"]);
    match cli.command {
        Command::Upload { method, .. } => assert_eq!(method, UploadMethod::Translate),
        _ => panic!("Expected Upload command"),
    }
}

#[test]
fn test_rejects_unknown_format() {
    let result = Cli::try_parse_from(["wlc", "--format", "xml", "list-projects"]);
    assert!(result.is_err());
}

#[test]
fn test_rejects_unknown_command() {
    assert!(Cli::try_parse_from(["wlc", "frobnicate"]).is_err());
}

#[test]
fn test_version_bare() {
    let cli = Cli::parse_from(["wlc", "version", "--bare"]);
    assert!(matches!(cli.command, Command::Version { bare: true }));
}
