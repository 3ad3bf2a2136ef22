use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "macromol - inspect, convert and fetch macromolecular structures in PDB and mmCIF formats.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads used when reading several files.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,

    /// Path to a TOML configuration file. Defaults to the platform config directory.
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a summary of one or more structure files.
    Info(InfoArgs),
    /// Convert a structure file between PDB and mmCIF.
    Convert(ConvertArgs),
    /// Write a biological assembly of a structure to a new file.
    Assembly(AssemblyArgs),
    /// Download a structure from the RCSB by its four-character code.
    Fetch(FetchArgs),
}

/// Options shared by the commands that build models.
#[derive(Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Do not infer bonds from the residue table or link consecutive residues.
    #[arg(long)]
    pub no_bonds: bool,

    /// Do not insert residues declared missing by the file.
    #[arg(long)]
    pub no_missing: bool,

    /// Residue connectivity table replacing the built-in one.
    #[arg(long, value_name = "PATH")]
    pub topology: Option<PathBuf>,
}

/// Arguments for the `info` subcommand.
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Structure files to summarise.
    #[arg(required = true, value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    #[command(flatten)]
    pub build: BuildArgs,
}

/// Arguments for the `convert` subcommand.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Input structure file (.pdb, .ent, .cif or .mmcif).
    #[arg(value_name = "IN")]
    pub input: PathBuf,

    /// Output file; its extension selects the format.
    #[arg(value_name = "OUT")]
    pub output: PathBuf,

    /// Round coordinates to this many decimal places before writing.
    #[arg(long, value_name = "PLACES")]
    pub trim: Option<u32>,

    #[command(flatten)]
    pub build: BuildArgs,
}

/// Arguments for the `assembly` subcommand.
#[derive(Args, Debug)]
pub struct AssemblyArgs {
    /// Input structure file.
    #[arg(value_name = "IN")]
    pub input: PathBuf,

    /// Assembly id, as listed by `info`.
    #[arg(value_name = "ID")]
    pub id: String,

    /// Output file; its extension selects the format.
    #[arg(value_name = "OUT")]
    pub output: PathBuf,

    /// Round coordinates to this many decimal places before writing.
    #[arg(long, value_name = "PLACES")]
    pub trim: Option<u32>,

    #[command(flatten)]
    pub build: BuildArgs,
}

/// Arguments for the `fetch` subcommand.
#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Four-character structure code (e.g., 1LYZ).
    #[arg(value_name = "CODE")]
    pub code: String,

    /// Save the downloaded file here instead of printing a summary.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Fail when the code is rejected instead of reporting that nothing was found.
    #[arg(long)]
    pub strict: bool,

    /// Override the download server, e.g. a mirror of files.rcsb.org/view.
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_flags_parse_after_the_subcommand() {
        let cli = Cli::try_parse_from(["macromol", "info", "a.pdb", "b.cif", "-vv", "-j", "4"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.threads, Some(4));
        let Commands::Info(args) = cli.command else {
            panic!("expected info");
        };
        assert_eq!(args.paths, vec![PathBuf::from("a.pdb"), PathBuf::from("b.cif")]);
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["macromol", "-q", "-v", "info", "a.pdb"]).is_err());
    }

    #[test]
    fn assembly_takes_three_positionals() {
        let cli = Cli::try_parse_from(["macromol", "assembly", "in.cif", "1", "out.pdb", "--no-bonds"]).unwrap();
        let Commands::Assembly(args) = cli.command else {
            panic!("expected assembly");
        };
        assert_eq!(args.id, "1");
        assert!(args.build.no_bonds);
        assert_eq!(args.output, PathBuf::from("out.pdb"));
    }

    #[test]
    fn fetch_accepts_strict_and_output() {
        let cli = Cli::try_parse_from(["macromol", "fetch", "1lyz", "--strict", "-o", "x.pdb"]).unwrap();
        let Commands::Fetch(args) = cli.command else {
            panic!("expected fetch");
        };
        assert!(args.strict);
        assert_eq!(args.output, Some(PathBuf::from("x.pdb")));
    }
}
