mod cli;
mod error;
mod generators;
mod source;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::error::{report, Error};
use crate::generators::Generator;
use crate::source::{Definition, Input};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = cli::Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", report(&err));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &cli::Cli) -> Result<(), Error> {
    let generator = cli.generator.unwrap_or_default();
    let definitions = source::load(&Input::parse(&cli.input))?;

    let total = definitions.len();
    let mut failed = 0;
    for definition in definitions {
        let origin = definition.origin.clone();
        if let Err(err) = emit(generator, cli.output_dir.as_deref(), definition) {
            error!(%origin, "skipping interface: {}", report(&err));
            failed += 1;
        }
    }
    if failed > 0 {
        return Err(Error::Incomplete { failed, total });
    }
    Ok(())
}

fn emit(
    generator: Generator,
    output_dir: Option<&Path>,
    definition: Definition,
) -> Result<(), Error> {
    let text = definition.text?;
    let interface = varlink_idl::parse(&text).map_err(|source| Error::Idl {
        origin: definition.origin,
        source,
    })?;
    let code = generator.generate(&interface);
    match output_dir {
        Some(dir) => {
            write_output(dir, &interface.name, generator, &code)?;
        }
        None => print!("{code}"),
    }
    Ok(())
}

/// Writes the code generated for `interface` to `{dir}/{interface}.{extension}`.
fn write_output(
    dir: &Path,
    interface: &str,
    generator: Generator,
    code: &str,
) -> Result<PathBuf, Error> {
    let path = dir.join(format!("{interface}.{}", generator.extension()));
    std::fs::create_dir_all(dir)
        .and_then(|()| std::fs::write(&path, code))
        .map_err(|source| Error::Write {
            path: path.clone(),
            source,
        })?;
    info!(path = %path.display(), "written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SHOP: &str = include_str!("../../idl/tests/fixtures/org.example.shop.varlink");

    fn arguments(input: &Path, generator: Generator, output_dir: &Path) -> cli::Cli {
        cli::Cli {
            input: input.display().to_string(),
            generator: Some(generator),
            output_dir: Some(output_dir.to_path_buf()),
        }
    }

    #[test]
    fn writes_one_file_per_interface() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("shop.varlink");
        std::fs::write(&input, SHOP).unwrap();
        let output_dir = dir.path().join("generated");

        let generator = Generator::default();
        run(&arguments(&input, generator, &output_dir)).unwrap();

        let written = output_dir.join(format!("org.example.shop.{}", generator.extension()));
        let code = std::fs::read_to_string(written).unwrap();
        let interface = varlink_idl::parse(SHOP).unwrap();
        assert_eq!(code, generator.generate(&interface));
    }

    #[test]
    fn invalid_interface_fails_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("broken.varlink");
        std::fs::write(&input, "interface org.example.broken\nmethod Foo (x: Missing) -> ()\n")
            .unwrap();
        let output_dir = dir.path().join("generated");

        let err = run(&arguments(&input, Generator::default(), &output_dir)).unwrap_err();
        assert!(matches!(err, Error::Incomplete { failed: 1, total: 1 }));
        assert!(!output_dir.exists());
    }

    #[test]
    fn failed_definition_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let definition = Definition {
            origin: "unix:/run/org.example.shop (org.example.shop)".into(),
            text: Err(Error::Service {
                address: "unix:/run/org.example.shop".into(),
                source: varlink_runtime::Error::ConnectionClosed,
            }),
        };
        let err = emit(Generator::default(), Some(dir.path()), definition).unwrap_err();
        assert!(matches!(err, Error::Service { .. }));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn output_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let generator = Generator::default();
        let path = write_output(dir.path(), "org.example.a", generator, "code").unwrap();
        assert_eq!(
            path,
            dir.path().join(format!("org.example.a.{}", generator.extension()))
        );
        assert_eq!(std::fs::read_to_string(path).unwrap(), "code");
    }
}
