use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use chrono_tz::Tz;
use maud::{DOCTYPE, Markup, html};

use profetas_core::board::BoardSnapshot;
use profetas_core::score::{ScoreEntry, display_score};
use profetas_core::selection::Selections;
use profetas_core::submission::{ContactDetails, Receipt};
use profetas_types::api::{PaymentInfo, RankingRow};
use profetas_types::models::{ENTRY_FEE, Match, MatchId, Selection, Team};

const WEEKDAYS: [&str; 7] = ["lun", "mar", "mié", "jue", "vie", "sáb", "dom"];
const MONTHS: [&str; 12] = [
    "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sep", "oct", "nov", "dic",
];

/// Kick-off in the display zone, e.g. "sáb 14 mar · 19:00".
pub fn format_kickoff(start: DateTime<Utc>, tz: Tz) -> String {
    let local = start.with_timezone(&tz);
    let weekday = WEEKDAYS[weekday_index(local.weekday())];
    let month = MONTHS[local.month0() as usize];
    format!(
        "{} {} {} · {:02}:{:02}",
        weekday,
        local.day(),
        month,
        local.hour(),
        local.minute()
    )
}

fn weekday_index(day: Weekday) -> usize {
    day.num_days_from_monday() as usize
}

/// What the user had typed, so a rejected submission can be shown again.
#[derive(Debug, Default)]
pub struct FormState<'a> {
    pub contact: Option<&'a ContactDetails>,
    pub selections: Option<&'a Selections>,
    pub scores: Option<&'a BTreeMap<MatchId, ScoreEntry>>,
    pub error: Option<String>,
}

fn layout(title: &str, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="es" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
            }
            body {
                header {
                    h1 { "LIGA DE PROFETAS" }
                    nav {
                        a href="/" { "Quiniela" }
                        " | "
                        a href="/ranking" { "Ranking" }
                    }
                }
                main { (body) }
            }
        }
    }
}

fn team_badge(team: &Team) -> Markup {
    html! {
        div class="team" {
            @if let Some(url) = &team.logo_url {
                img class="logo" src=(url) alt=(team.name) width="40" height="40";
            } @else {
                span class="logo-fallback" { (team.initial().map(String::from).unwrap_or_default()) }
            }
            span class="team-name" { (team.name) }
        }
    }
}

fn match_card(m: &Match, locked: bool, tz: Tz, form: &FormState<'_>) -> Markup {
    let picked = form.selections.and_then(|s| s.get(m.id));
    let entry = form.scores.and_then(|s| s.get(&m.id));
    let home_input = entry.map(ScoreEntry::home).unwrap_or("");
    let away_input = entry.map(ScoreEntry::away).unwrap_or("");
    let field = format!("pick_{}", m.id);

    html! {
        article.match.locked[locked] data-match-id=(m.id) {
            div class="meta" {
                span class="kickoff" { (format_kickoff(m.start_time, tz)) }
                span class="status" { (m.status.label()) }
            }
            div class="teams" {
                (team_badge(&m.home_team))
                div class="score" {
                    input type="text" inputmode="numeric" pattern="[0-9]*" maxlength="2"
                        name={ "home_" (m.id) }
                        value=(display_score(locked, m.home_score, home_input))
                        disabled[locked];
                    span { "-" }
                    input type="text" inputmode="numeric" pattern="[0-9]*" maxlength="2"
                        name={ "away_" (m.id) }
                        value=(display_score(locked, m.away_score, away_input))
                        disabled[locked];
                }
                (team_badge(&m.away_team))
            }
            fieldset class="picks" disabled[locked] {
                @for option in Selection::ALL {
                    label class="pick" {
                        input type="radio" name=(field) value=(option.code())
                            checked[picked == Some(option)];
                        (option.label())
                    }
                }
            }
        }
    }
}

pub fn quiniela_page(snapshot: &BoardSnapshot, tz: Tz, form: &FormState<'_>) -> Markup {
    let nombre = form.contact.map(|c| c.nombre.as_str()).unwrap_or("");
    let telefono = form.contact.map(|c| c.telefono.as_str()).unwrap_or("");

    layout(
        "Liga de Profetas",
        html! {
            h2 class="round" {
                @match snapshot.round() {
                    Some(round) => { "Jornada " (round) },
                    None => { "Jornada Actual" },
                }
            }
            @if let Some(error) = &form.error {
                div class="error" role="alert" { (error) }
            }
            form method="post" action="/" {
                @if snapshot.matches().is_empty() {
                    p class="empty" { "No se encontraron partidos." }
                } @else {
                    @for m in snapshot.matches() {
                        (match_card(m, snapshot.is_locked(m.id), tz, form))
                    }
                    section class="contact" {
                        label {
                            "Nombre completo"
                            input type="text" name="nombre" value=(nombre);
                        }
                        label {
                            "Teléfono"
                            input type="tel" name="telefono" value=(telefono);
                        }
                    }
                    button type="submit" { "CONFIRMAR ($" (ENTRY_FEE as u32) " MXN)" }
                }
            }
        },
    )
}

pub fn confirmation_page(receipt: &Receipt, payment: &PaymentInfo) -> Markup {
    layout(
        "Quiniela Enviada",
        html! {
            section class="confirmation" {
                h2 { "¡Quiniela Enviada!" }
                p { "Para validar tu participación, realiza tu pago:" }
                dl {
                    dt { "Monto" }
                    dd class="amount" { (payment.amount) }
                    dt { "Banco" }
                    dd { (payment.bank) }
                    dt { "Cuenta" }
                    dd class="account" { (payment.account) }
                }
                p class="folio" { "FOLIO: " (receipt.folio) }
                a href="/" { "Llenar otra quiniela" }
            }
        },
    )
}

pub fn ranking_page(rows: &[RankingRow]) -> Markup {
    layout(
        "Ranking de Profetas",
        html! {
            h2 { "Ranking de Profetas" }
            @if rows.is_empty() {
                p class="empty" { "No hay participantes aún" }
            } @else {
                table class="ranking" {
                    thead {
                        tr {
                            th { "Pos" }
                            th { "Usuario" }
                            th { "Puntos" }
                        }
                    }
                    tbody {
                        @for row in rows {
                            tr {
                                td {
                                    @match row.medal {
                                        Some(medal) => { (medal.emoji()) },
                                        None => { (row.position) },
                                    }
                                }
                                td { (row.username) }
                                td { (row.total_points) }
                            }
                        }
                    }
                }
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn kickoff_uses_display_zone_and_spanish_names() {
        // 2026-03-15 01:00 UTC is Saturday 19:00 in Mexico City (UTC-6).
        let start = Utc.with_ymd_and_hms(2026, 3, 15, 1, 0, 0).unwrap();
        assert_eq!(
            format_kickoff(start, chrono_tz::America::Mexico_City),
            "sáb 14 mar · 19:00"
        );
        assert_eq!(format_kickoff(start, chrono_tz::UTC), "dom 15 mar · 01:00");
    }

    #[test]
    fn empty_ranking_message() {
        let page = ranking_page(&[]).into_string();
        assert!(page.contains("No hay participantes aún"));
    }

    #[test]
    fn empty_board_message() {
        let page = quiniela_page(&BoardSnapshot::default(), chrono_tz::UTC, &FormState::default()).into_string();
        assert!(page.contains("No se encontraron partidos."));
        assert!(page.contains("Jornada Actual"));
        assert!(!page.contains("CONFIRMAR"));
        assert!(!page.contains("name=\"telefono\""));
    }

    #[test]
    fn board_with_matches_shows_contact_form() {
        let start = Utc.with_ymd_and_hms(2026, 3, 15, 1, 0, 0).unwrap();
        let m = Match {
            id: 4_811_902,
            home_team: Team {
                id: 1,
                name: "Toluca".into(),
                logo_url: None,
            },
            away_team: Team {
                id: 2,
                name: "León".into(),
                logo_url: Some("https://images.example/leon.png".into()),
            },
            start_time: start,
            status: profetas_types::models::MatchStatus::Scheduled,
            home_score: None,
            away_score: None,
            round: 10,
        };
        let snapshot = BoardSnapshot::evaluate(vec![m], start - chrono::Duration::hours(1));
        let page = quiniela_page(&snapshot, chrono_tz::UTC, &FormState::default()).into_string();

        assert!(page.contains("Jornada 10"));
        assert!(page.contains("name=\"telefono\""));
        assert!(page.contains("CONFIRMAR ($15 MXN)"));
        assert!(!page.contains("No se encontraron partidos."));
    }

    #[test]
    fn error_text_is_escaped() {
        let form = FormState {
            error: Some("<script>".to_string()),
            ..FormState::default()
        };
        let page = quiniela_page(&BoardSnapshot::default(), chrono_tz::UTC, &form).into_string();
        assert!(page.contains("&lt;script&gt;"));
        assert!(!page.contains("<script>"));
    }
}
