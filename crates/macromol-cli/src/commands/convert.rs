use super::{load, save, trim};
use crate::cli::ConvertArgs;
use crate::config::PartialAppConfig;
use crate::error::Result;
use tracing::info;

pub fn run(args: &ConvertArgs, config: &PartialAppConfig) -> Result<()> {
    let options = config.build_options(&args.build)?;
    let mut file = load(&args.input, &options)?;
    trim(&mut file, config.trim(args.trim));
    save(&file, &args.output)?;
    info!("Converted {:?} to {:?}", &args.input, &args.output);
    println!("✓ Written to: {}", args.output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::BuildArgs;
    use macromol::workflows::file::{File, FileFormat};
    use std::fs;
    use tempfile::tempdir;

    const INPUT: &str = "\
HEADER    TEST                                    01-JAN-20   1TST
ATOM      1  N   GLY A   1       1.235   2.000   3.000  1.00  0.00           N
END
";

    #[test]
    fn pdb_becomes_mmcif_with_trimmed_coordinates() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.pdb");
        let output = dir.path().join("out.cif");
        fs::write(&input, INPUT).unwrap();

        let args = ConvertArgs {
            input,
            output: output.clone(),
            trim: Some(1),
            build: BuildArgs::default(),
        };
        run(&args, &PartialAppConfig::default()).unwrap();

        let converted = File::open(&output).unwrap();
        assert_eq!(converted.format(), FileFormat::Mmcif);
        assert_eq!(converted.code(), Some("1TST"));
        let model = converted.model().unwrap();
        let atom = model.atom(model.atom_by_serial(1).unwrap()).unwrap();
        assert_eq!(atom.position.unwrap().x, 1.2);
    }
}
