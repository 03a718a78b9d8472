use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::json;

use lotofacil_core::analysis::{Analysis, ComparisonRecord};
use lotofacil_core::generator::{GenerationOutcome, GenerationRequest};
use lotofacil_core::history::DrawHistory;
use lotofacil_core::models::{Combination, DRAW_SIZE};

fn number_headers() -> Vec<String> {
    (1..=DRAW_SIZE).map(|i| format!("n{}", i)).collect()
}

fn header(prefix: &[&str], suffix: &[&str]) -> Vec<String> {
    prefix
        .iter()
        .map(|s| s.to_string())
        .chain(number_headers())
        .chain(suffix.iter().map(|s| s.to_string()))
        .collect()
}

fn numbers_fields(numbers: &[u8]) -> impl Iterator<Item = String> + '_ {
    numbers.iter().map(|n| n.to_string())
}

pub fn write_comparisons<W: Write>(writer: W, records: &[ComparisonRecord]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(header(&["draw_index", "common_with_reference", "sum", "evens", "odds"], &[]))?;
    for r in records {
        let mut row = vec![
            r.draw_index.to_string(),
            r.common_with_reference.to_string(),
            r.sum.to_string(),
            r.even_count.to_string(),
            r.odd_count.to_string(),
        ];
        row.extend(numbers_fields(&r.numbers));
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_summary<W: Write>(writer: W, analysis: &Analysis) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["overlap", "count"])?;
    for (overlap, count) in analysis.buckets.sizes() {
        wtr.write_record([overlap.to_string(), count.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_reference<W: Write>(writer: W, analysis: &Analysis) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(header(&["draw_index"], &[]))?;
    let mut row = vec![analysis.reference.draw_index.to_string()];
    row.extend(numbers_fields(&analysis.reference.sorted_numbers()));
    wtr.write_record(&row)?;
    wtr.flush()?;
    Ok(())
}

pub fn write_history<W: Write>(writer: W, history: &DrawHistory) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(header(&["draw_index"], &["sum", "evens", "odds"]))?;
    for draw in history.draws() {
        let mut row = vec![draw.draw_index.to_string()];
        row.extend(numbers_fields(&draw.numbers));
        row.extend([draw.sum.to_string(), draw.even_count.to_string(), draw.odd_count.to_string()]);
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_combinations<W: Write>(
    writer: W,
    combinations: &[Combination],
    generated_at: &str,
) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(header(
        &["combo_id"],
        &["sum", "evens", "odds", "overlap_k", "target_even_count", "generated_at"],
    ))?;
    for (i, combo) in combinations.iter().enumerate() {
        let mut row = vec![(i + 1).to_string()];
        row.extend(numbers_fields(&combo.numbers));
        row.extend([
            combo.sum.to_string(),
            combo.even_count.to_string(),
            combo.odd_count.to_string(),
            combo.params.overlap_k.to_string(),
            combo.params.target_even_count.to_string(),
            generated_at.to_string(),
        ]);
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn generation_metadata(
    request: &GenerationRequest,
    outcome: &GenerationOutcome,
    created_at: &str,
) -> serde_json::Value {
    let mut reference = request.reference;
    reference.sort();
    json!({
        "generated_from_reference": reference,
        "universe_complement": request.universe_complement(),
        "params": {
            "quantity": request.quantity,
            "overlap_k": request.overlap_k,
            "target_even_count": request.target_even_count,
            "max_attempts": request.max_attempts,
            "seed": request.seed,
        },
        "generated": outcome.combinations.len(),
        "attempts_used": outcome.attempts_used,
        "exhausted": outcome.exhausted,
        "created_at": created_at,
    })
}

fn create(dir: &Path, name: &str) -> Result<(std::fs::File, PathBuf)> {
    let path = dir.join(name);
    let file = std::fs::File::create(&path)
        .with_context(|| format!("Impossible de créer {:?}", path))?;
    Ok((file, path))
}

fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Impossible de créer le répertoire {:?}", dir))
}

/// Un fichier par groupe de recoupement, le résumé, la référence et l'historique.
pub fn export_analysis(dir: &Path, history: &DrawHistory, analysis: &Analysis) -> Result<Vec<PathBuf>> {
    ensure_dir(dir)?;
    let mut written = Vec::new();

    for (overlap, records) in analysis.buckets.iter() {
        let (file, path) = create(dir, &format!("overlap_{:02}.csv", overlap))?;
        write_comparisons(file, records)?;
        written.push(path);
    }

    let (file, path) = create(dir, "summary.csv")?;
    write_summary(file, analysis)?;
    written.push(path);

    let (file, path) = create(dir, "reference.csv")?;
    write_reference(file, analysis)?;
    written.push(path);

    let (file, path) = create(dir, "history.csv")?;
    write_history(file, history)?;
    written.push(path);

    Ok(written)
}

pub fn export_generation(
    dir: &Path,
    request: &GenerationRequest,
    outcome: &GenerationOutcome,
    created_at: &str,
) -> Result<Vec<PathBuf>> {
    ensure_dir(dir)?;

    let (file, combos_path) = create(dir, "combinations.csv")?;
    write_combinations(file, &outcome.combinations, created_at)?;

    let metadata = generation_metadata(request, outcome, created_at);
    let meta_path = dir.join("metadata.json");
    std::fs::write(&meta_path, serde_json::to_string_pretty(&metadata)?)
        .with_context(|| format!("Impossible d'écrire {:?}", meta_path))?;

    Ok(vec![combos_path, meta_path])
}
