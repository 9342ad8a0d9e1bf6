use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use playforge::alphabet::Alphabet;
use playforge::api;
use playforge::optimizer::{BestResult, SearchOutcome};

/// Prints a compact key (row-major symbols) as a square.
pub fn print_key_grid(alphabet: &Alphabet, key: &str) {
    let dim = alphabet.dim();
    println!("\nKey:");
    let mut table = Table::new();
    table.load_preset(ASCII_FULL);

    let symbols: Vec<char> = key.chars().collect();
    for row in symbols.chunks(dim) {
        let cells: Vec<Cell> = row
            .iter()
            .map(|c| Cell::new(c).set_alignment(CellAlignment::Center))
            .collect();
        table.add_row(cells);
    }
    println!("{}", table);
}

pub fn print_best_list(entries: &[BestResult]) {
    if entries.is_empty() {
        return;
    }
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("#").add_attribute(Attribute::Bold),
        Cell::new("Score").fg(Color::Cyan),
        Cell::new("Key"),
        Cell::new("Plaintext"),
        Cell::new("Task"),
        Cell::new("Found"),
    ]);
    for i in [0, 1, 4, 5] {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }

    for (rank, e) in entries.iter().enumerate() {
        table.add_row(vec![
            Cell::new(rank + 1),
            Cell::new(e.score).fg(Color::Cyan),
            Cell::new(&e.key),
            Cell::new(&e.plaintext),
            Cell::new(format!("{}/{}", e.task, e.cycle)),
            Cell::new(format!("{:.1?}", e.elapsed)),
        ]);
    }
    println!("\n{}", table);
}

pub fn print_summary(outcome: &SearchOutcome) {
    let secs = outcome.elapsed.as_secs_f64();
    let rate = if secs > 0.0 {
        outcome.evaluations as f64 / secs
    } else {
        0.0
    };

    let mut table = Table::new();
    table.load_preset(ASCII_FULL);
    table.add_row(vec![Cell::new("Cycles"), Cell::new(outcome.cycles_completed)]);
    table.add_row(vec![Cell::new("Keys tested"), Cell::new(outcome.evaluations)]);
    table.add_row(vec![
        Cell::new("Keys tested (approx.)"),
        Cell::new(approx(outcome.evaluations)),
    ]);
    table.add_row(vec![Cell::new("Keys/s"), Cell::new(format!("{:.0}", rate))]);
    table.add_row(vec![
        Cell::new("Elapsed"),
        Cell::new(format!("{:.2?}", outcome.elapsed)),
    ]);
    table.add_row(vec![
        Cell::new("Stopped early"),
        Cell::new(if outcome.stopped { "yes" } else { "no" }),
    ]);
    println!("\n{}", table);
}

fn approx(evaluations: u64) -> String {
    if evaluations < 10 {
        return evaluations.to_string();
    }
    api::scientific((evaluations as f64).log10())
}
