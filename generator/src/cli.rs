use std::path::PathBuf;

use clap::Parser;

use crate::generators::Generator;

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// Interface definition file, http(s) URL, or service address (`unix:PATH`, `tcp:HOST:PORT`)
    pub input: String,

    /// Target language of the generated code [default: rust]
    #[arg(short, long, value_enum)]
    pub generator: Option<Generator>,

    /// Write one file per interface into this directory instead of printing to stdout
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_arguments() {
        let cli = Cli::parse_from(["varlink-generator", "unix:/run/shop", "-o", "out"]);
        assert_eq!(cli.input, "unix:/run/shop");
        assert_eq!(cli.generator, None);
        assert_eq!(cli.output_dir, Some(PathBuf::from("out")));
    }
}
