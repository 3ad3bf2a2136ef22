use super::{load, save, trim};
use crate::cli::AssemblyArgs;
use crate::config::PartialAppConfig;
use crate::error::Result;
use macromol::core::models::ids::MoleculeId;
use macromol::core::models::model::Model;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

const CHAIN_LABELS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

fn next_label(used: &mut HashSet<String>) -> String {
    let single = CHAIN_LABELS.chars().map(String::from);
    let double = CHAIN_LABELS
        .chars()
        .flat_map(|a| CHAIN_LABELS.chars().map(move |b| format!("{}{}", a, b)));
    let label = single
        .chain(double)
        .find(|l| !used.contains(l))
        .unwrap_or_else(|| format!("{}", used.len()));
    used.insert(label.clone());
    label
}

/// Gives the second and later copies of each molecule their own asym and chain ids.
///
/// One copy's ligands and waters keep sharing the chain of that copy's polymer, since old
/// labels map to new ones per copy.
fn relabel_copies(model: &mut Model) {
    let mut used: HashSet<String> = model
        .molecules()
        .flat_map(|(_, m)| [m.asym_id().to_string(), m.entity().auth_id.clone()])
        .collect();
    let mut seen: HashMap<(String, Option<i64>, String), usize> = HashMap::new();
    let mut labels: HashMap<(String, usize), String> = HashMap::new();
    let ids: Vec<MoleculeId> = model.molecules().map(|(id, _)| id).collect();

    for id in ids {
        let Some(molecule) = model.molecule(id) else {
            continue;
        };
        let entity = molecule.entity().clone();
        let key = match molecule.small_molecule() {
            Some(small) => (entity.id.clone(), small.number, small.insertion_code.clone()),
            None => (entity.id.clone(), None, String::new()),
        };
        let counter = seen.entry(key).or_insert(0);
        let copy = *counter;
        *counter += 1;
        if copy == 0 {
            continue;
        }

        let mut fresh = |old: &str| {
            labels
                .entry((old.to_string(), copy))
                .or_insert_with(|| next_label(&mut used))
                .clone()
        };
        let asym = fresh(&entity.id);
        let auth = if entity.auth_id.is_empty() {
            String::new()
        } else {
            fresh(&entity.auth_id)
        };
        debug!(from = %entity.id, to = %asym, copy, "Relabelled molecule copy");

        let residues = molecule.residues().to_vec();
        if let Some(molecule) = model.molecule_mut(id) {
            let record = molecule.entity_mut();
            record.id = asym.clone();
            record.auth_id = auth;
        }
        for residue_id in residues {
            if let Some(residue) = model.residue_mut(residue_id) {
                if let Some((_, key)) = residue.id.split_once('.') {
                    residue.id = format!("{}.{}", asym, key);
                }
            }
        }
    }
}

pub fn run(args: &AssemblyArgs, config: &PartialAppConfig) -> Result<()> {
    let options = config.build_options(&args.build)?;
    let mut file = load(&args.input, &options)?;
    let mut model = file.generate_assembly(&args.id)?;
    relabel_copies(&mut model);
    let transformations = file
        .assembly(&args.id)
        .map_or(0, |a| a.transformations.len());
    info!(
        "Assembly {} built from {} transformation(s), {} atom(s).",
        args.id,
        transformations,
        model.atom_count()
    );
    file.replace_models(vec![model]);
    trim(&mut file, config.trim(args.trim));
    save(&file, &args.output)?;
    println!(
        "✓ Assembly {} ({} transformation(s)) written to: {}",
        args.id,
        transformations,
        args.output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::BuildArgs;
    use crate::error::CliError;
    use macromol::engine::error::AssemblyError;
    use macromol::workflows::file::File;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    const DIMER: &str = "\
REMARK 350 BIOMOLECULE: 1
REMARK 350 APPLY THE FOLLOWING TO CHAINS: A
REMARK 350   BIOMT1   1  1.000000  0.000000  0.000000        0.00000
REMARK 350   BIOMT2   1  0.000000  1.000000  0.000000        0.00000
REMARK 350   BIOMT3   1  0.000000  0.000000  1.000000        0.00000
REMARK 350   BIOMT1   2  1.000000  0.000000  0.000000        5.00000
REMARK 350   BIOMT2   2  0.000000  1.000000  0.000000        0.00000
REMARK 350   BIOMT3   2  0.000000  0.000000  1.000000        0.00000
ATOM      1  CA  GLY A   1       1.000   2.000   3.000  1.00  0.00           C
END
";

    fn args(dir: &std::path::Path, id: &str) -> AssemblyArgs {
        let input = dir.join("in.pdb");
        fs::write(&input, DIMER).unwrap();
        AssemblyArgs {
            input,
            id: id.to_string(),
            output: dir.join("assembly.pdb"),
            trim: None,
            build: BuildArgs::default(),
        }
    }

    #[test]
    fn assembly_file_holds_every_copy() {
        let dir = tempdir().unwrap();
        let args = args(dir.path(), "1");
        run(&args, &PartialAppConfig::default()).unwrap();

        let written = File::open(&args.output).unwrap();
        let model = written.model().unwrap();
        let xs: Vec<f64> = model
            .atoms()
            .map(|(_, a)| a.position.unwrap().x)
            .collect();
        assert_eq!(xs, vec![1.0, 6.0]);
        let chains: Vec<&str> = model.polymers().map(|(_, m)| m.asym_id()).collect();
        assert_eq!(chains, vec!["A", "B"]);
    }

    #[test]
    fn copies_of_ligands_follow_their_polymer() {
        let text = DIMER.replace(
            "END\n",
            "TER       2      GLY A   1\nHETATM    3 ZN    ZN A 101       0.000   0.000   0.000  1.00 20.00          ZN\nEND\n",
        );
        let file = File::parse(&text, macromol::workflows::file::FileFormat::Pdb).unwrap();
        let mut model = file.generate_assembly("1").unwrap();
        relabel_copies(&mut model);
        let labels: Vec<(String, String)> = model
            .molecules()
            .map(|(_, m)| (m.asym_id().to_string(), m.entity().auth_id.clone()))
            .collect();
        assert_eq!(
            labels,
            vec![
                ("A".to_string(), "A".to_string()),
                ("B".to_string(), "A".to_string()),
                ("C".to_string(), "C".to_string()),
                ("D".to_string(), "C".to_string()),
            ]
        );
    }

    #[test]
    fn unknown_assembly_id_fails() {
        let dir = tempdir().unwrap();
        let args = args(dir.path(), "7");
        assert!(matches!(
            run(&args, &PartialAppConfig::default()),
            Err(CliError::Assembly(AssemblyError::UnknownAssembly { .. }))
        ));
        assert!(!PathBuf::from(&args.output).exists());
    }
}
