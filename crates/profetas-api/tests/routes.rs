use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use profetas_api::state::{AppStateInner, DEFAULT_ACCOUNT, DEFAULT_BANK, payment_info};
use profetas_core::board::MatchBoard;
use profetas_core::loader::MatchLoader;
use profetas_core::submission::{OrphanPolicy, SubmissionFlow};
use profetas_store::Backend;
use profetas_store::memory::{Call, MemoryBackend, Operation};
use profetas_types::models::{ENTRY_FEE, Match, MatchStatus, Profile, Team};

fn team(id: i64, name: &str) -> Team {
    Team {
        id,
        name: name.to_string(),
        logo_url: None,
    }
}

fn fixture(id: i64, hours: i64, status: MatchStatus) -> Match {
    Match {
        id,
        home_team: team(1, "Cruz Azul"),
        away_team: team(2, "Pumas UNAM"),
        start_time: Utc::now() + Duration::hours(hours),
        status,
        home_score: None,
        away_score: None,
        round: 12,
    }
}

fn profile(username: &str, total_points: i64) -> Profile {
    Profile {
        id: Uuid::new_v4(),
        username: username.to_string(),
        total_points,
        created_at: None,
    }
}

async fn app(backend: Arc<MemoryBackend>) -> Router {
    let dyn_backend: Arc<dyn Backend> = backend;
    let loader = MatchLoader::new(dyn_backend.clone(), 20);
    let board = MatchBoard::new();
    board.refresh(&loader).await;

    profetas_api::router(Arc::new(AppStateInner {
        loader,
        board,
        flow: SubmissionFlow::new(dyn_backend, OrphanPolicy::Keep),
        payment: payment_info(ENTRY_FEE, DEFAULT_BANK, DEFAULT_ACCOUNT),
        display_tz: chrono_tz::America::Mexico_City,
    }))
}

fn board_backend() -> Arc<MemoryBackend> {
    Arc::new(MemoryBackend::new().with_matches(vec![
        fixture(1, 24, MatchStatus::Scheduled),
        fixture(2, 48, MatchStatus::Scheduled),
        fixture(3, -1, MatchStatus::Live),
    ]))
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_form(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn writes(backend: &MemoryBackend) -> Vec<Call> {
    backend
        .calls()
        .into_iter()
        .filter(|c| !matches!(c, Call::LoadMatches { .. } | Call::LoadProfiles))
        .collect()
}

#[tokio::test]
async fn health_is_ok() {
    let app = app(board_backend()).await;
    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ok");
}

#[tokio::test]
async fn index_lists_matches() {
    let app = app(board_backend()).await;
    let response = app.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let page = body_string(response).await;
    assert!(page.contains("LIGA DE PROFETAS"));
    assert!(page.contains("Jornada 12"));
    assert!(page.contains("Cruz Azul"));
    assert!(page.contains("Pumas UNAM"));
    assert!(page.contains("name=\"pick_1\""));
    assert!(page.contains("En Vivo"));
}

#[tokio::test]
async fn index_without_matches_shows_empty_state() {
    let backend = Arc::new(MemoryBackend::new());
    backend.fail(Operation::LoadMatches);
    let app = app(backend).await;

    let page = body_string(app.oneshot(get("/")).await.unwrap()).await;
    assert!(page.contains("No se encontraron partidos."));
    assert!(!page.contains("CONFIRMAR"));
}

#[tokio::test]
async fn api_matches_reports_lock_state() {
    let app = app(board_backend()).await;
    let response = app.oneshot(get("/api/matches")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["round"], 12);
    let matches = body["matches"].as_array().unwrap();
    assert_eq!(matches.len(), 3);
    for m in matches {
        let expected = m["id"] == 3;
        assert_eq!(m["locked"], expected, "match {}", m["id"]);
    }
}

#[tokio::test]
async fn json_submit_writes_participation_then_picks() {
    let backend = board_backend();
    let app = app(backend.clone()).await;

    let response = app
        .oneshot(post_json(
            "/api/participaciones",
            json!({
                "nombre": "  Ana López ",
                "telefono": "5512345678",
                "selections": { "1": "L", "2": "E" }
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["folio"].as_str().unwrap().len(), 8);
    assert_eq!(body["jornada"], 12);
    assert_eq!(body["picks"], 2);
    assert_eq!(body["payment"]["amount"], "$15.00 MXN");
    assert_eq!(body["payment"]["bank"], DEFAULT_BANK);

    let calls = writes(&backend);
    assert_eq!(calls.len(), 2);
    let Call::CreateParticipation(new) = &calls[0] else {
        panic!("expected participation insert first, got {:?}", calls[0]);
    };
    assert_eq!(new.nombre_completo, "Ana López");
    assert_eq!(new.jornada, 12);
    let Call::CreatePicks(picks) = &calls[1] else {
        panic!("expected pick insert second, got {:?}", calls[1]);
    };

    let participation_id = backend.participations()[0].id;
    assert_eq!(body["participation_id"], participation_id.to_string());
    assert!(picks.iter().all(|p| p.participacion_id == participation_id));
}

#[tokio::test]
async fn json_submit_without_selections_writes_nothing() {
    let backend = board_backend();
    let app = app(backend.clone()).await;

    let response = app
        .oneshot(post_json(
            "/api/participaciones",
            json!({ "nombre": "Ana", "telefono": "55", "selections": {} }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error"], "no_selections");
    assert_eq!(body["message"], "Selecciona al menos un pronóstico.");
    assert!(writes(&backend).is_empty());
}

#[tokio::test]
async fn json_submit_missing_contact_is_rejected() {
    let backend = board_backend();
    let app = app(backend.clone()).await;

    let response = app
        .oneshot(post_json(
            "/api/participaciones",
            json!({ "nombre": "Ana", "telefono": "   ", "selections": { "1": "V" } }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "missing_contact");
    assert!(writes(&backend).is_empty());
}

#[tokio::test]
async fn json_submit_with_absent_phone_reports_missing_contact() {
    let backend = board_backend();
    let app = app(backend.clone()).await;

    let response = app
        .oneshot(post_json(
            "/api/participaciones",
            json!({ "nombre": "Ana", "selections": { "1": "L" } }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error"], "missing_contact");
    assert_eq!(body["message"], "Por favor escribe tu nombre y teléfono.");
    assert!(writes(&backend).is_empty());
}

#[tokio::test]
async fn json_submit_with_malformed_body_gets_json_error() {
    let backend = board_backend();
    let app = app(backend.clone()).await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/participaciones")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"nombre": "Ana", "selections": {"1": "X"}}"#))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error"], "invalid_body");
    assert!(body["message"].as_str().unwrap().starts_with("Solicitud inválida: "));
    assert!(writes(&backend).is_empty());
}

#[tokio::test]
async fn json_submit_on_locked_match_is_rejected() {
    let backend = board_backend();
    let app = app(backend.clone()).await;

    let response = app
        .oneshot(post_json(
            "/api/participaciones",
            json!({ "nombre": "Ana", "telefono": "55", "selections": { "1": "L", "3": "V" } }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["error"], "match_locked");
    assert!(writes(&backend).is_empty());
}

#[tokio::test]
async fn json_submit_on_unknown_match_is_rejected() {
    let backend = board_backend();
    let app = app(backend.clone()).await;

    let response = app
        .oneshot(post_json(
            "/api/participaciones",
            json!({ "nombre": "Ana", "telefono": "55", "selections": { "99": "E" } }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["error"], "unknown_match");
}

#[tokio::test]
async fn pick_failure_keeps_participation_and_reports_bad_gateway() {
    let backend = board_backend();
    backend.fail(Operation::CreatePicks);
    let app = app(backend.clone()).await;

    let response = app
        .oneshot(post_json(
            "/api/participaciones",
            json!({ "nombre": "Ana", "telefono": "55", "selections": { "1": "L" } }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body = body_json(response).await;
    assert_eq!(body["error"], "picks_failed");
    assert!(body["message"].as_str().unwrap().starts_with("Error al enviar: "));

    assert_eq!(backend.participations().len(), 1);
    assert!(backend.picks().is_empty());
    assert!(!writes(&backend).iter().any(|c| matches!(c, Call::DeleteParticipation(_))));
}

#[tokio::test]
async fn form_submit_renders_confirmation() {
    let backend = board_backend();
    let app = app(backend.clone()).await;

    let response = app
        .oneshot(post_form("nombre=Ana&telefono=5512345678&pick_1=L&pick_1=V&pick_2=E"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let page = body_string(response).await;
    let folio = backend.participations()[0].folio();
    assert!(page.contains("¡Quiniela Enviada!"));
    assert!(page.contains("$15.00 MXN"));
    assert!(page.contains(DEFAULT_ACCOUNT));
    assert!(page.contains(&format!("FOLIO: {}", folio)));

    let picks = backend.picks();
    assert_eq!(picks.len(), 2);
    assert_eq!(picks[0].partido_id, 1);
    assert_eq!(picks[0].seleccion.code(), "V");
}

#[tokio::test]
async fn form_submit_error_keeps_entered_values() {
    let backend = board_backend();
    let app = app(backend.clone()).await;

    let response = app
        .oneshot(post_form("nombre=Ana&telefono=&pick_2=E"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let page = body_string(response).await;
    assert!(page.contains("Por favor escribe tu nombre y teléfono."));
    assert!(page.contains("value=\"Ana\""));
    assert!(page.contains("value=\"E\" checked"));
    assert!(writes(&backend).is_empty());
}

#[tokio::test]
async fn api_ranking_orders_by_points() {
    let backend = Arc::new(MemoryBackend::new().with_profiles(vec![
        profile("A", 10),
        profile("B", 30),
        profile("C", 20),
    ]));
    let app = app(backend).await;

    let response = app.oneshot(get("/api/ranking")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["username"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["B", "C", "A"]);
    assert_eq!(body[0]["medal"], "gold");
    assert_eq!(body[0]["position"], 1);
}

#[tokio::test]
async fn ranking_page_renders_empty_state() {
    let app = app(Arc::new(MemoryBackend::new())).await;
    let page = body_string(app.oneshot(get("/ranking")).await.unwrap()).await;
    assert!(page.contains("Ranking de Profetas"));
    assert!(page.contains("No hay participantes aún"));
}
