//! Command dispatcher.
//!
//! Runs one parsed [`Command`] against the API. Output goes to the injected
//! writer and upload content comes from the injected reader, so the whole
//! command surface can be driven from tests.

use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use serde::Serialize;

use crate::client::Weblate;
use crate::config::Config;
use crate::error::{Result, WeblateError};
use crate::models::{
    Component, Object, OperationResult, Project, Resource, Schema, Translation, UploadOptions,
};
use crate::output::{print_record, print_records, records_of, Format, Record};
use crate::pagination::Paginated;
use crate::traits::{Changes, Repository};

use super::{Cli, Command, Target};

/// Run the command selected in `cli`.
///
/// # Errors
///
/// API and file errors are passed through; command-level failures (missing
/// object, wrong object level, refused operation) are
/// [`Command`](WeblateError::Command) errors.
pub fn run(cli: &Cli, config: &Config, out: &mut dyn Write, input: &mut dyn Read) -> Result<()> {
    if let Command::Version { bare } = &cli.command {
        let version = env!("CARGO_PKG_VERSION");
        if *bare {
            writeln!(out, "{version}")?;
            return Ok(());
        }
        let record: Record = vec![("version".to_string(), version.into())];
        return print_record(out, cli.format, &record);
    }

    let mut runner = Runner {
        weblate: Weblate::from_config(config)?,
        config,
        format: cli.format,
        out,
        input,
    };
    runner.dispatch(&cli.command)
}

struct Runner<'a> {
    weblate: Weblate,
    config: &'a Config,
    format: Format,
    out: &'a mut dyn Write,
    input: &'a mut dyn Read,
}

impl Runner<'_> {
    fn dispatch(&mut self, command: &Command) -> Result<()> {
        match command {
            Command::Version { .. } => Ok(()),
            Command::ListProjects => self.print_listing(self.weblate.list_projects()),
            Command::ListComponents(target) => match self.optional_object(target)? {
                Some(object) => {
                    let mut project = expect_project(object)?;
                    let components = project.list_components()?;
                    self.print_listing(components)
                }
                None => self.print_listing(self.weblate.list_components()),
            },
            Command::ListTranslations(target) => match self.optional_object(target)? {
                Some(object) => {
                    let mut component = expect_component(object)?;
                    let translations = component.list_translations()?;
                    self.print_listing(translations)
                }
                None => self.print_listing(self.weblate.list_translations()),
            },
            Command::ListLanguages => self.print_listing(self.weblate.list_languages()),
            Command::Show(target) => {
                let mut object = self.object(target)?;
                object.ensure_complete()?;
                print_record(self.out, self.format, &object.record())
            }
            Command::Delete(target) => self.object(target)?.delete(),
            Command::Ls(target) => self.ls(target),
            Command::Commit(target) => {
                let result = self.object(target)?.commit()?;
                check_result(result, "Failed to commit changes!")
            }
            Command::Push(target) => {
                let result = self.object(target)?.push()?;
                check_result(result, "Failed to push changes!")
            }
            Command::Pull(target) => {
                let result = self.object(target)?.pull()?;
                check_result(result, "Failed to pull changes!")
            }
            Command::Reset(target) => {
                let result = self.object(target)?.reset()?;
                check_result(result, "Failed to reset changes!")
            }
            Command::Cleanup(target) => {
                let result = self.object(target)?.cleanup()?;
                check_result(result, "Failed to cleanup changes!")
            }
            Command::Repo(target) => {
                let status = self.object(target)?.repository()?;
                self.print_value(&status)
            }
            Command::Changes(target) => {
                let changes = self.object(target)?.list_changes()?;
                self.print_listing(changes)
            }
            Command::Stats(target) => {
                let mut object = self.object(target)?;
                let records = records_of(&object.statistics()?)?;
                match (&object, records.as_slice()) {
                    (Object::Component(_), records) => print_records(self.out, self.format, records),
                    (_, [record]) => print_record(self.out, self.format, record),
                    (_, records) => print_records(self.out, self.format, records),
                }
            }
            Command::LockStatus(target) => {
                let status = expect_component(self.object(target)?)?.lock_status()?;
                self.print_value(&status)
            }
            Command::Lock(target) => {
                expect_component(self.object(target)?)?.lock()?;
                Ok(())
            }
            Command::Unlock(target) => {
                expect_component(self.object(target)?)?.unlock()?;
                Ok(())
            }
            Command::Download {
                target,
                convert,
                output,
                output_dir,
            } => self.download(target, convert.as_deref(), output.as_deref(), output_dir.as_deref()),
            Command::Upload {
                target,
                input,
                overwrite,
                author_name,
                author_email,
                method,
                fuzzy,
                conflicts,
            } => {
                let options = UploadOptions {
                    overwrite: *overwrite,
                    author_name: author_name.clone(),
                    author_email: author_email.clone(),
                    method: Some(*method),
                    fuzzy: *fuzzy,
                    conflicts: *conflicts,
                };
                self.upload(target, input.as_deref(), &options)
            }
        }
    }

    /// Object path from the command line, else the configured default.
    fn object_path<'t>(&'t self, target: &'t Target) -> Option<&'t str> {
        target
            .object
            .as_deref()
            .or(self.config.translation.as_deref())
            .filter(|path| !path.is_empty())
    }

    fn optional_object(&self, target: &Target) -> Result<Option<Object>> {
        self.object_path(target)
            .map(|path| self.weblate.get_object(path))
            .transpose()
    }

    fn object(&self, target: &Target) -> Result<Object> {
        self.optional_object(target)?
            .ok_or_else(|| WeblateError::command("No object passed on command line!"))
    }

    fn ls(&mut self, target: &Target) -> Result<()> {
        match self.optional_object(target)? {
            None => self.print_listing(self.weblate.list_projects()),
            Some(Object::Project(mut project)) => {
                let components = project.list_components()?;
                self.print_listing(components)
            }
            Some(Object::Component(mut component)) => {
                let translations = component.list_translations()?;
                self.print_listing(translations)
            }
            Some(Object::Translation(mut translation)) => {
                let units = translation.list_units(None)?;
                self.print_listing(units)
            }
        }
    }

    fn download(
        &mut self,
        target: &Target,
        convert: Option<&str>,
        output: Option<&Path>,
        output_dir: Option<&Path>,
    ) -> Result<()> {
        let mut object = self.object(target)?;
        if let Some(dir) = output_dir {
            for path in object.download_to(dir, convert)? {
                tracing::info!(path = %path.display(), "downloaded");
            }
            return Ok(());
        }

        let download = expect_translation(object)?.download(convert)?;
        match output {
            Some(path) if path != Path::new("-") => fs::write(path, &download.content)?,
            _ => self.out.write_all(&download.content)?,
        }
        Ok(())
    }

    fn upload(&mut self, target: &Target, input: Option<&Path>, options: &UploadOptions) -> Result<()> {
        let mut translation = expect_translation(self.object(target)?)?;
        let content = match input {
            Some(path) if path != Path::new("-") => fs::read(path)?,
            _ => {
                let mut buffer = Vec::new();
                self.input.read_to_end(&mut buffer)?;
                buffer
            }
        };
        translation
            .upload(&content, options)
            .map_err(|err| match err {
                WeblateError::UploadRejected(detail) => {
                    WeblateError::command(format!("Failed to upload translations!\n{detail}"))
                }
                other => other,
            })?;
        Ok(())
    }

    fn print_listing<S: Schema>(&mut self, listing: Paginated<Resource<S>>) -> Result<()> {
        let records: Vec<Record> = listing
            .map(|item| item.map(|resource| resource.record()))
            .collect::<Result<_>>()?;
        print_records(self.out, self.format, &records)
    }

    fn print_value<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let records = records_of(value)?;
        match records.as_slice() {
            [record] => print_record(self.out, self.format, record),
            records => print_records(self.out, self.format, records),
        }
    }
}

fn check_result(result: OperationResult, message: &str) -> Result<()> {
    if result.result {
        return Ok(());
    }
    Err(WeblateError::command(match result.detail {
        Some(detail) => format!("{message}\n{detail}"),
        None => message.to_string(),
    }))
}

fn expect_project(object: Object) -> Result<Project> {
    match object {
        Object::Project(project) => Ok(project),
        _ => Err(WeblateError::command(
            "This command is supported only at project level",
        )),
    }
}

fn expect_component(object: Object) -> Result<Component> {
    match object {
        Object::Component(component) => Ok(component),
        _ => Err(WeblateError::command(
            "This command is supported only at component level",
        )),
    }
}

fn expect_translation(object: Object) -> Result<Translation> {
    match object {
        Object::Translation(translation) => Ok(translation),
        _ => Err(WeblateError::command(
            "This command is supported only at translation level",
        )),
    }
}
