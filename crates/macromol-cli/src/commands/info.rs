use super::load;
use crate::cli::InfoArgs;
use crate::config::PartialAppConfig;
use crate::error::Result;
use macromol::engine::config::BuildOptions;
use macromol::workflows::file::File;
use rayon::prelude::*;
use std::fmt;
use std::path::PathBuf;
use tracing::error;

/// What `info` prints for one file.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub source: String,
    pub format: String,
    pub code: Option<String>,
    pub title: Option<String>,
    pub technique: Option<String>,
    pub resolution: Option<f64>,
    pub models: usize,
    pub polymers: usize,
    pub non_polymers: usize,
    pub waters: usize,
    pub atoms: usize,
    pub missing_residues: usize,
    pub assemblies: Vec<String>,
    pub warnings: usize,
}

impl Summary {
    pub fn of(source: &str, file: &File) -> Self {
        let model = file.model();
        let count = |f: fn(&macromol::core::models::model::Model) -> usize| model.map_or(0, f);
        Self {
            source: source.to_string(),
            format: file.format().to_string(),
            code: file.code().map(String::from),
            title: file.title().map(String::from),
            technique: file.technique().map(String::from),
            resolution: file.resolution(),
            models: file.models().len(),
            polymers: count(|m| m.polymers().count()),
            non_polymers: count(|m| m.non_polymers().count()),
            waters: count(|m| m.waters().count()),
            atoms: count(|m| m.atoms().filter(|(_, a)| !a.is_ghost()).count()),
            missing_residues: file.missing_residues().len(),
            assemblies: file.assemblies().iter().map(|a| a.id.clone()).collect(),
            warnings: file.warnings().len(),
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({})", self.source, self.format)?;
        writeln!(f, "  Code:        {}", self.code.as_deref().unwrap_or("-"))?;
        if let Some(title) = &self.title {
            writeln!(f, "  Title:       {}", title)?;
        }
        if let Some(technique) = &self.technique {
            match self.resolution {
                Some(resolution) => writeln!(f, "  Technique:   {} ({:.2} Å)", technique, resolution)?,
                None => writeln!(f, "  Technique:   {}", technique)?,
            }
        }
        writeln!(f, "  Models:      {}", self.models)?;
        writeln!(
            f,
            "  Molecules:   {} polymer(s), {} ligand(s), {} water(s)",
            self.polymers, self.non_polymers, self.waters
        )?;
        writeln!(f, "  Atoms:       {}", self.atoms)?;
        writeln!(f, "  Missing:     {} residue(s)", self.missing_residues)?;
        if self.assemblies.is_empty() {
            writeln!(f, "  Assemblies:  none")?;
        } else {
            writeln!(f, "  Assemblies:  {}", self.assemblies.join(", "))?;
        }
        write!(f, "  Warnings:    {}", self.warnings)
    }
}

/// Loads every path in parallel, keeping input order.
pub fn summarize(paths: &[PathBuf], options: &BuildOptions) -> Vec<Result<Summary>> {
    paths
        .par_iter()
        .map(|path| {
            let file = load(path, options)?;
            Ok(Summary::of(&path.display().to_string(), &file))
        })
        .collect()
}

pub fn run(args: &InfoArgs, config: &PartialAppConfig) -> Result<()> {
    let options = config.build_options(&args.build)?;
    let mut first_failure = None;
    for result in summarize(&args.paths, &options) {
        match result {
            Ok(summary) => println!("{}\n", summary),
            Err(e) => {
                error!("{}", e);
                first_failure.get_or_insert(e);
            }
        }
    }
    first_failure.map_or(Ok(()), Err)
}
