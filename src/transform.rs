//! Pure transformace upstream odpovědí — žádné IO, všechno testovatelné přímo.

use serde_json::{json, Value};

/// Nechá jen fixtures se shodným kolem; pořadí zůstává.
pub fn filter_fixtures_by_round(data: &mut Value, round: &str) {
    if let Some(fixtures) = data
        .pointer_mut("/data/fixtures")
        .and_then(Value::as_array_mut)
    {
        fixtures.retain(|f| round_matches(&f["round"], round));
    }
}

// API vrací round většinou jako string, občas jako číslo
fn round_matches(value: &Value, round: &str) -> bool {
    match value {
        Value::String(s) => s == round,
        Value::Number(n) => n.to_string() == round,
        _ => false,
    }
}

/// {team, scored, conceded} z řádků tabulky, řazeno podle scored sestupně.
/// sort_by je stabilní → shody drží původní pořadí tabulky.
pub fn goals_by_team(table: &[Value]) -> Vec<Value> {
    let mut teams: Vec<(i64, Value)> = table
        .iter()
        .map(|row| {
            let scored = value_as_i64(&row["goals_scored"]);
            let conceded = value_as_i64(&row["goals_conceded"]);
            let team = row["name"].as_str().unwrap_or("?").to_string();
            (
                scored,
                json!({ "team": team, "scored": scored, "conceded": conceded }),
            )
        })
        .collect();

    teams.sort_by(|a, b| b.0.cmp(&a.0));
    teams.into_iter().map(|(_, entry)| entry).collect()
}

/// Odhad celkového počtu zápasů ze stránkování:
/// plné stránky × velikost první stránky + poslední stránka.
pub fn estimate_total_matches(page1_matches: u64, total_pages: u64, last_page_matches: u64) -> u64 {
    if total_pages > 1 {
        (total_pages - 1) * page1_matches + last_page_matches
    } else {
        page1_matches
    }
}

/// Počet zápasů v odpovědi history/live endpointu
pub fn match_count(data: &Value) -> u64 {
    data.pointer("/data/match")
        .and_then(Value::as_array)
        .map(|matches| matches.len() as u64)
        .unwrap_or(0)
}

/// livescore API míchá čísla a číselné stringy
pub fn value_as_u64(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n.as_u64().unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

fn value_as_i64(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n.as_i64().unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}
