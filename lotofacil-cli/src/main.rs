mod display;
mod export;
mod import;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use lotofacil_core::analysis::analyze;
use lotofacil_core::config::{GeneratorConfig, OVERLAP_K_RANGE};
use lotofacil_core::generator::{generate, generate_batch, GenerationRequest};
use lotofacil_core::history::{normalize, DrawHistory};
use lotofacil_core::CoreError;

use crate::display::{
    display_batch, display_bucket_counts, display_generation, display_history_tail,
    display_import_summary, display_insufficiency, display_reference,
};
use crate::import::import_file;

#[derive(Parser)]
#[command(name = "lotofacil", about = "Analyseur et générateur de combinaisons Lotofácil")]
struct Cli {
    /// Verbosité des journaux (-v info, -vv debug). RUST_LOG est prioritaire.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Comparer l'historique avec le dernier tirage
    Analyze {
        /// Fichier des résultats, CSV ou classeur xlsx/xls/ods (première ligne = en-tête)
        #[arg(short, long)]
        file: PathBuf,

        /// Séparateur de colonnes
        #[arg(short, long, default_value = ",")]
        delimiter: char,

        /// Nombre de derniers tirages à détailler
        #[arg(short, long, default_value = "15")]
        tail: usize,

        /// Répertoire d'export (un CSV par groupe, résumé, référence, historique)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Générer des combinaisons à partir du dernier tirage
    Generate {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long, default_value = ",")]
        delimiter: char,

        /// Fichier de configuration JSON (voir init-config)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Nombre de combinaisons à générer (1-5000)
        #[arg(short, long)]
        quantity: Option<usize>,

        /// Numéros repris du dernier tirage (5-12)
        #[arg(short)]
        k: Option<u8>,

        /// Nombre total de pairs dans la combinaison (0-15)
        #[arg(short, long)]
        even: Option<u8>,

        /// Budget de tentatives
        #[arg(long)]
        max_attempts: Option<u64>,

        /// Seed pour la reproductibilité (0 = aléatoire)
        #[arg(long)]
        seed: Option<u64>,

        /// Nombre de combinaisons affichées
        #[arg(long, default_value = "20")]
        show: usize,

        /// Répertoire d'export (combinations.csv + metadata.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Générer pour plusieurs valeurs de k en parallèle
    Batch {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long, default_value = ",")]
        delimiter: char,

        /// Valeurs de k (séparées par des virgules)
        #[arg(long, default_value = "5,6,7,8,9,10,11,12")]
        ks: String,

        #[arg(short, long)]
        config: Option<PathBuf>,

        #[arg(short, long)]
        quantity: Option<usize>,

        #[arg(short, long)]
        even: Option<u8>,

        #[arg(long)]
        max_attempts: Option<u64>,

        /// Seed de base : la requête i utilise seed + i
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Écrire la configuration par défaut
    InitConfig {
        #[arg(short, long, default_value = "lotofacil.json")]
        output: PathBuf,
    },
}

struct Overrides {
    quantity: Option<usize>,
    k: Option<u8>,
    even: Option<u8>,
    max_attempts: Option<u64>,
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Analyze {
            file,
            delimiter,
            tail,
            output,
        } => cmd_analyze(&file, delimiter, tail, output.as_deref()),
        Command::Generate {
            file,
            delimiter,
            config,
            quantity,
            k,
            even,
            max_attempts,
            seed,
            show,
            output,
        } => {
            let overrides = Overrides { quantity, k, even, max_attempts, seed };
            let config = resolve_config(config.as_deref(), overrides)?;
            cmd_generate(&file, delimiter, &config, show, output.as_deref())
        }
        Command::Batch {
            file,
            delimiter,
            ks,
            config,
            quantity,
            even,
            max_attempts,
            seed,
        } => {
            let overrides = Overrides { quantity, k: None, even, max_attempts, seed };
            let config = resolve_config(config.as_deref(), overrides)?;
            let ks = parse_ks(&ks)?;
            cmd_batch(&file, delimiter, &config, &ks)
        }
        Command::InitConfig { output } => {
            GeneratorConfig::default().save(&output)?;
            println!("Configuration écrite dans {}", output.display());
            Ok(())
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn resolve_config(path: Option<&Path>, overrides: Overrides) -> Result<GeneratorConfig> {
    let mut config = match path {
        Some(p) => GeneratorConfig::load(p)
            .with_context(|| format!("Impossible de charger la configuration {:?}", p))?,
        None => GeneratorConfig::default(),
    };
    if let Some(q) = overrides.quantity {
        config.quantity = q;
    }
    if let Some(k) = overrides.k {
        config.overlap_k = k;
    }
    if let Some(e) = overrides.even {
        config.target_even_count = e;
    }
    if let Some(m) = overrides.max_attempts {
        config.max_attempts = m;
    }
    if overrides.seed.is_some() {
        config.seed = overrides.seed;
    }
    config.validate()?;
    Ok(config)
}

fn parse_ks(raw: &str) -> Result<Vec<u8>> {
    let ks: Vec<u8> = raw
        .split(',')
        .map(|s| s.trim().parse::<u8>())
        .collect::<Result<_, _>>()
        .context("Format de k invalide")?;
    if let Some(k) = ks.iter().find(|&&k| !OVERLAP_K_RANGE.contains(&k)) {
        bail!("k = {} hors limites (5-12)", k);
    }
    Ok(ks)
}

fn load_history(file: &Path, delimiter: char) -> Result<DrawHistory> {
    if !delimiter.is_ascii() {
        bail!("Séparateur non ASCII : '{}'", delimiter);
    }
    let result = import_file(file, delimiter as u8)?;
    let history = normalize(&result.rows);
    display_import_summary(&result, &history);

    if history.is_empty() {
        bail!(
            "Impossible d'extraire des lignes de 15 numéros. Vérifiez le format du fichier {:?}.",
            file
        );
    }
    info!(draws = history.len(), discarded = history.discarded(), "historique normalisé");
    Ok(history)
}

fn cmd_analyze(file: &Path, delimiter: char, tail: usize, output: Option<&Path>) -> Result<()> {
    let history = load_history(file, delimiter)?;
    let analysis = analyze(&history)?;

    let complement = lotofacil_core::models::universe_complement(&analysis.reference.numbers);
    display_reference(&analysis.reference, &complement);
    display_history_tail(history.tail(tail));
    display_bucket_counts(&analysis.buckets);

    if let Some(dir) = output {
        let written = export::export_analysis(dir, &history, &analysis)?;
        println!("\n{} fichiers écrits dans {}", written.len(), dir.display());
    }
    Ok(())
}

fn cmd_generate(
    file: &Path,
    delimiter: char,
    config: &GeneratorConfig,
    show: usize,
    output: Option<&Path>,
) -> Result<()> {
    let history = load_history(file, delimiter)?;
    let reference = history.reference().ok_or(CoreError::EmptyHistory)?;

    let request = config.request(reference);
    display_reference(reference, &request.universe_complement());

    let outcome = generate(&request)?;
    display_generation(&request, &outcome, show);
    if outcome.exhausted {
        display_insufficiency(&outcome);
    }

    if let Some(dir) = output {
        if outcome.combinations.is_empty() {
            println!("Aucune combinaison : rien à exporter.");
        } else {
            let created_at = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
            let written = export::export_generation(dir, &request, &outcome, &created_at)?;
            println!("\n{} fichiers écrits dans {}", written.len(), dir.display());
        }
    }
    Ok(())
}

fn cmd_batch(file: &Path, delimiter: char, config: &GeneratorConfig, ks: &[u8]) -> Result<()> {
    let history = load_history(file, delimiter)?;
    let reference = history.reference().ok_or(CoreError::EmptyHistory)?;

    let base_seed = config.effective_seed();
    let requests: Vec<GenerationRequest> = ks
        .iter()
        .enumerate()
        .map(|(i, &k)| {
            let config = GeneratorConfig {
                overlap_k: k,
                ..config.clone()
            };
            config
                .request(reference)
                .with_seed(base_seed.map(|s| s.wrapping_add(i as u64)))
        })
        .collect();

    let outcomes = generate_batch(&requests);
    let mut rows = Vec::with_capacity(requests.len());
    for (request, outcome) in requests.into_iter().zip(outcomes) {
        match outcome {
            Ok(o) => rows.push((request, Some(o))),
            Err(e) => {
                error!(k = request.overlap_k, "échec de la génération : {}", e);
                rows.push((request, None));
            }
        }
    }
    display_batch(&rows);
    Ok(())
}
