//! Output formatting and progress bars for CLI

use indicatif::{ProgressBar, ProgressStyle};

use crate::{Error, Result, tictactoe::BoardState};

/// Create a progress bar for self-play games
pub fn create_training_progress(total_games: u64) -> Result<ProgressBar> {
    let pb = ProgressBar::new(total_games);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} games ({msg})")
            .map_err(|e| Error::ProgressBarTemplate {
                message: e.to_string(),
            })?
            .progress_chars("=>-"),
    );
    Ok(pb)
}

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

/// Format a number with thousands separators
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i.is_multiple_of(3) {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:20} {}", format!("{}:", key), value);
}

/// Board as a grid with cell numbers in the empty squares
pub fn render_board(state: &BoardState) -> String {
    let mut out = String::new();
    for row in 0..3 {
        let cells: Vec<String> = (0..3)
            .map(|col| {
                let pos = row * 3 + col;
                if state.is_empty(pos) {
                    pos.to_string()
                } else {
                    state.get(pos).to_char().to_string()
                }
            })
            .collect();
        out.push_str(&format!(" {} \n", cells.join(" | ")));
        if row < 2 {
            out.push_str("---+---+---\n");
        }
    }
    out
}
