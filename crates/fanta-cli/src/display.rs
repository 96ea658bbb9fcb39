//! Plain-text rendering of tournament and player lists.

use fanta_core::models::{Player, Tournament};
use fanta_core::utils::truncate_string;

/// Maximum width of a tournament line before truncation
const MAX_LINE_WIDTH: usize = 100;

pub fn tournament_line(t: &Tournament) -> String {
    let status = if t.is_active { "active" } else { "closed" };
    format!(
        "{} [{}, {}, match day {}] {}",
        truncate_string(&t.display_name(), MAX_LINE_WIDTH),
        t.structure.format_display(),
        status,
        t.current_match_day,
        t.date_range()
    )
}

pub fn player_block(index: usize, p: &Player) -> String {
    format!(
        "{}. {}\n   Born: {}\n   Role: {}\n   Overall: {}  Fanta value: {}  Market value: {}\n   Nationality: {} (other: {})",
        index + 1,
        p.full_name(),
        p.birth_date_display(),
        p.role_display(),
        p.overall,
        p.fanta_value,
        p.value,
        p.nationality_display(),
        p.other_nationalities_display()
    )
}

pub fn print_tournaments(tournaments: &[Tournament]) {
    println!("Tournaments ({})", tournaments.len());
    for t in tournaments {
        println!("  {}", tournament_line(t));
    }
}

pub fn print_players(players: &[Player]) {
    println!("Players ({})", players.len());
    for (i, p) in players.iter().enumerate() {
        println!("{}", player_block(i, p));
    }
}
