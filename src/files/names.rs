//! Names of the files and directories within working and results directories.

use std::path::Path;

/// Every run writes its log to `results/LOG`; an empty `working/LOG` marks the working directory.
pub const LOG: &'static str = "Log.txt";

/// Identifies files, produced by this pipeline, e.g. `clusters_OrthoFinder_I1.5.txt`.
pub const FILE_IDENTIFIER: &'static str = "OrthoFinder";
/// Clusters file `X` is accompanied by `X` + `ID_PAIRS_SUFFIX`.
pub const ID_PAIRS_SUFFIX: &'static str = "_id_pairs.txt";
/// Glob for the cluster pairs files, written by a previous run.
pub const CLUSTERS_PAIRS_GLOB: &'static str = "clusters_OrthoFinder_*.txt_id_pairs.txt";
/// Cluster pairs file, supplied directly, must contain both substrings.
pub const CLUSTERS_PAIRS_MARKERS: [&'static str; 2] = ["clusters_OrthoFinder_", "txt_id_pairs.txt"];
/// Glob for species FASTA files `Species<N>.fa`.
pub const SPECIES_FASTA_GLOB: &'static str = "Species*.fa";
/// Orthogroup listing files; the first glob is the name before renaming.
pub const ORTHOGROUPS_GLOBS: [&'static str; 2] = ["OrthologousGroups*.txt", "Orthogroups*.txt"];

/// Species and sequence identifiers are stored in `working_base/SPECIES_IDS` and `working_base/SEQUENCE_IDS`.
pub const SPECIES_IDS: &'static str = "SpeciesIDs.txt";
pub const SEQUENCE_IDS: &'static str = "SequenceIDs.txt";

/// Legacy runs kept their working files in `continuation/WORKING_DIR`.
pub const WORKING_DIR: &'static str = "WorkingDirectory";
/// Legacy runs placed new results into `continuation/LEGACY_HOME`.
pub const LEGACY_HOME: &'static str = "OrthoFinder";
/// Prefixes of the paired results and working directories of one run.
pub const RESULTS_PREFIX: &'static str = "Results_";
pub const WORKING_PREFIX: &'static str = "WorkingDirectory_";

/// Subdirectories of the orthologues results directory.
pub const ORTHOLOGUES_DIR: &'static str = "Orthologues";
pub const SEQS_DIR: &'static str = "Sequences";
pub const ALIGN_DIR: &'static str = "MultipleSequenceAlignments";
pub const GENE_TREES_DIR: &'static str = "Gene_Trees";
pub const RESOLVED_TREES_DIR: &'static str = "Resolved_Gene_Trees";
pub const SPECIES_TREE_DIR: &'static str = "Species_Tree";
pub const POTENTIAL_ROOTS_DIR: &'static str = "Potential_Rooted_Species_Trees";
pub const MISPLACED_GENES_DIR: &'static str = "Phylogenetically_Misplaced_Genes";
/// Subdirectories of the orthogroups results directory.
pub const ORTHOGROUPS_DIR: &'static str = "Orthogroups";
pub const STATS_DIR: &'static str = "Comparative_Genomics_Statistics";
pub const DUPLICATIONS_DIR: &'static str = "Gene_Duplication_Events";
pub const DUPLICATIONS: &'static str = "Duplications.csv";

/// Subdirectories of the current working directory.
pub const SEQS_IDS_DIR: &'static str = "Sequences_ids";
pub const ALIGN_IDS_DIR: &'static str = "Alignments_ids";
pub const TREES_IDS_DIR: &'static str = "Trees_ids";
pub const DISTANCES_DIR: &'static str = "Distances";
pub const PHYLDOG_DIR: &'static str = "phyldog";
pub const PICKLE_DIR: &'static str = "pickle";

pub const SPECIES_TREE_ALIGNMENT: &'static str = "SpeciesTreeAlignment.fa";
pub const SPECIES_MATRIX: &'static str = "SpeciesMatrix.phy";
pub const SPECIES_TREE_UNROOTED: &'static str = "SpeciesTree_unrooted.txt";
pub const SPECIES_TREE_UNROOTED_IDS: &'static str = "SpeciesTree_unrooted_id.txt";
pub const SPECIES_TREE_ROOTED: &'static str = "SpeciesTree_rooted.txt";
pub const SPECIES_TREE_USER_IDS: &'static str = "SpeciesTree_UserSupplied_Rooted_IDs.txt";

/// Rooted species trees that a tree-stage run may have left behind, in the order they are probed.
pub const ROOTED_SPECIES_TREES: [&'static str; 5] = [
    "SpeciesTree_ids_0_rooted.txt",
    "SpeciesTree_ids_1_rooted.txt",
    "SpeciesTree_user_ids.txt",
    "SpeciesTree_unrooted_0_rooted.txt",
    "STAG_SpeciesTree_ids_0_rooted.txt",
];

/// Orthogroup name: `OG` followed by a 7-digit zero-padded number.
pub fn og(i: usize) -> String {
    format!("OG{:07}", i)
}

pub fn species_fasta(i: usize) -> String {
    format!("Species{}.fa", i)
}

/// Sequence database for one species, e.g. `BlastDBSpecies3` or `DiamondDBSpecies3`.
pub fn species_db(program: &str, i: usize) -> String {
    format!("{}DBSpecies{}", program, i)
}

/// Pairwise comparison of `query` species against `db` species.
pub fn comparison(query: usize, db: usize) -> String {
    format!("Blast{}_{}.txt", query, db)
}

pub fn graph() -> String {
    format!("{}_graph.txt", FILE_IDENTIFIER)
}

/// Clusters file stem for the given MCL inflation, e.g. `clusters_OrthoFinder_I1.5`.
pub fn clusters_stem(inflation: f64) -> String {
    format!("clusters_{}_I{:.1}", FILE_IDENTIFIER, inflation)
}

pub fn rooted_at_outgroup(i: usize) -> String {
    format!("SpeciesTree_rooted_at_outgroup_{}.txt", i)
}

/// Versioned name: `stem + ext` for version 0, `stem_<v> + ext` otherwise.
pub fn versioned(stem: &str, version: usize, ext: &str) -> String {
    if version == 0 {
        format!("{}{}", stem, ext)
    } else {
        format!("{}_{}{}", stem, version, ext)
    }
}

/// Extracts `N` from `Species<N>.fa`.
pub fn species_index(path: &Path) -> Option<usize> {
    lazy_static::lazy_static!{
        static ref SPECIES_RE: regex::Regex = regex::Regex::new(r"^Species([0-9]+)\.fa$").unwrap();
    }
    let name = path.file_name()?.to_str()?;
    SPECIES_RE.captures(name)?.get(1)?.as_str().parse().ok()
}
