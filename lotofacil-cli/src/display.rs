use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use crate::import::ImportResult;
use lotofacil_core::analysis::OverlapBuckets;
use lotofacil_core::generator::{GenerationOutcome, GenerationRequest};
use lotofacil_core::history::DrawHistory;
use lotofacil_core::models::Draw;

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn format_numbers(numbers: &[u8]) -> String {
    numbers
        .iter()
        .map(|n| format!("{:2}", n))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn display_import_summary(result: &ImportResult, history: &DrawHistory) {
    let report = history.report();
    println!("Lecture terminée :");
    println!("  Total lignes lues    : {}", result.total_records);
    println!("  Tirages valides (15) : {}", history.len());
    if report.incomplete > 0 {
        println!("  Lignes incomplètes   : {}", report.incomplete);
    }
    if report.duplicated > 0 {
        println!("  Lignes avec doublons : {}", report.duplicated);
    }
    if result.errors > 0 {
        println!("  Erreurs de lecture   : {}", result.errors);
    }
}

pub fn display_reference(reference: &Draw, complement: &[u8]) {
    println!("\n── Dernier tirage (ligne {}) ──", reference.draw_index);
    println!("  {}", format_numbers(&reference.sorted_numbers()));
    println!(
        "  Somme {} · {} pairs · {} impairs",
        reference.sum, reference.even_count, reference.odd_count
    );
    println!("  Absents ({}) : {}", complement.len(), format_numbers(complement));
}

pub fn display_history_tail(draws: &[Draw]) {
    println!("\n── Statistiques par tirage (pairs / impairs / somme) ──");
    let mut table = new_table(vec!["Ligne", "Pairs", "Impairs", "Somme"]);
    for draw in draws {
        table.add_row(vec![
            draw.draw_index.to_string(),
            draw.even_count.to_string(),
            draw.odd_count.to_string(),
            draw.sum.to_string(),
        ]);
    }
    println!("{table}");
}

pub fn display_bucket_counts(buckets: &OverlapBuckets) {
    println!("\n── Tirages par nombre de numéros communs avec le dernier (5-14) ──");
    let mut table = new_table(vec!["Communs", "Tirages"]);
    for (overlap, count) in buckets.sizes() {
        let color = if count == 0 { Color::DarkGrey } else { Color::White };
        table.add_row(vec![
            Cell::new(overlap.to_string()),
            Cell::new(count.to_string()).fg(color),
        ]);
    }
    println!("{table}");
}

pub fn display_generation(request: &GenerationRequest, outcome: &GenerationOutcome, show: usize) {
    println!(
        "\n🎲 {} combinaison(s) générée(s) sur {} demandée(s) · k={}, pairs={}, {} tentatives",
        outcome.combinations.len(),
        outcome.requested,
        request.overlap_k,
        request.target_even_count,
        outcome.attempts_used
    );

    if outcome.combinations.is_empty() {
        return;
    }

    let mut table = new_table(vec!["#", "Numéros", "Somme", "Pairs", "Impairs"]);
    for (i, combo) in outcome.combinations.iter().take(show).enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            format_numbers(&combo.numbers),
            combo.sum.to_string(),
            combo.even_count.to_string(),
            combo.odd_count.to_string(),
        ]);
    }
    println!("{table}");
    if outcome.combinations.len() > show {
        println!("  … {} autres non affichées", outcome.combinations.len() - show);
    }
}

pub fn display_insufficiency(outcome: &GenerationOutcome) {
    if outcome.combinations.is_empty() {
        println!(
            "\nImpossible de générer des combinaisons avec ces paramètres. \
             Ajustez k, le nombre de pairs ou le nombre de tentatives."
        );
    } else {
        println!(
            "\nSeulement {} combinaison(s) trouvée(s), il en manque {}. \
             Ajustez k, le nombre de pairs ou le nombre de tentatives.",
            outcome.combinations.len(),
            outcome.shortfall()
        );
    }
}

pub fn display_batch(rows: &[(GenerationRequest, Option<GenerationOutcome>)]) {
    println!("\n── Génération par lot ──");
    let mut table = new_table(vec!["k", "Pairs", "Demandées", "Générées", "Tentatives", "Statut"]);
    for (request, outcome) in rows {
        let (generated, attempts, status) = match outcome {
            Some(o) if o.is_complete() => (o.combinations.len(), o.attempts_used, Cell::new("OK").fg(Color::Green)),
            Some(o) => (o.combinations.len(), o.attempts_used, Cell::new("ÉPUISÉ").fg(Color::Red)),
            None => (0, 0, Cell::new("ERREUR").fg(Color::Red)),
        };
        table.add_row(vec![
            Cell::new(request.overlap_k.to_string()),
            Cell::new(request.target_even_count.to_string()),
            Cell::new(request.quantity.to_string()),
            Cell::new(generated.to_string()),
            Cell::new(attempts.to_string()),
            status,
        ]);
    }
    println!("{table}");
}
