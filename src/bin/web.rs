//! Single binary web server: JSON REST API over the padel tournament store.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default so the app is reachable via DNS on a VPS.
//! Override with env: HOST, PORT, DATA_FILE (JSON snapshot), RUST_LOG.

use actix_web::{
    delete, get, patch, post, put,
    web::{Data, Json, Path, Query},
    App, HttpResponse, HttpServer, Responder,
};
use padel_tournament_web::config::ServerConfig;
use padel_tournament_web::logic;
use padel_tournament_web::{
    AppSettings, MatchFormat, MatchId, NewPlayer, NewTournament, PairingStrategy, PlayerId,
    PlayerUpdate, SetScore, SettingsUpdate, SkillLevel, StatsSortBy, Store, Team, TeamId,
    TournamentError, TournamentId, TournamentResult, TournamentUpdate,
};
use serde::{Deserialize, Serialize};

type AppState = Data<Store>;

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Serialize)]
struct DeletedResponse {
    deleted: bool,
}

#[derive(Serialize)]
struct JoinedResponse {
    joined: bool,
}

#[derive(Serialize)]
struct CountResponse {
    count: usize,
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
    #[serde(default)]
    tier: Option<SkillLevel>,
}

#[derive(Deserialize)]
struct StandingsQuery {
    #[serde(default)]
    sort_by: StatsSortBy,
}

/// Strategy and format fall back to the settings defaults.
#[derive(Default, Deserialize)]
struct GenerateMatchesBody {
    #[serde(default)]
    strategy: Option<PairingStrategy>,
    #[serde(default)]
    format: Option<MatchFormat>,
}

#[derive(Deserialize)]
struct ManualMatchBody {
    team_1: [PlayerId; 2],
    team_2: [PlayerId; 2],
    #[serde(default)]
    format: Option<MatchFormat>,
    #[serde(default)]
    court: Option<String>,
}

#[derive(Deserialize)]
struct SaveResultsBody {
    #[serde(default)]
    scores: Vec<SetScore>,
    #[serde(default)]
    winner_team_id: Option<TeamId>,
}

#[derive(Deserialize)]
struct SaveDrawBody {
    scores: Vec<SetScore>,
}

#[derive(Deserialize)]
struct CurrentTournamentBody {
    tournament_id: Option<TournamentId>,
}

#[derive(Deserialize)]
struct SettingValueBody {
    value: serde_json::Value,
}

/// Path segment: entity id (e.g. /api/players/{id})
#[derive(Deserialize)]
struct IdPath {
    id: uuid::Uuid,
}

/// Path segments: tournament id and player id (e.g. /api/tournaments/{id}/players/{player_id})
#[derive(Deserialize)]
struct TournamentPlayerPath {
    id: TournamentId,
    player_id: PlayerId,
}

#[derive(Deserialize)]
struct SettingPath {
    name: String,
}

fn error_response(e: TournamentError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e {
        TournamentError::NotFound(..) => HttpResponse::NotFound().json(body),
        TournamentError::Conflict { .. } => HttpResponse::Conflict().json(body),
        TournamentError::InsufficientPlayers { .. } | TournamentError::InsufficientTeams { .. } => {
            HttpResponse::UnprocessableEntity().json(body)
        }
        TournamentError::Validation(_) => HttpResponse::BadRequest().json(body),
        TournamentError::Io(_) | TournamentError::Serialization(_) | TournamentError::Export(_) => {
            log::error!("Request failed: {}", e);
            HttpResponse::InternalServerError().json(body)
        }
    }
}

fn respond<T: Serialize>(result: TournamentResult<T>) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(e) => error_response(e),
    }
}

/// Run a result-changing unit of work, then rebuild the tournament's stats.
fn with_recompute<T: Serialize>(
    state: &Store,
    result: TournamentResult<T>,
    tournament_id: impl FnOnce(&T) -> TournamentId,
) -> HttpResponse {
    match result {
        Ok(value) => match state.recompute_stats(tournament_id(&value)) {
            Ok(()) => HttpResponse::Ok().json(value),
            Err(e) => error_response(e),
        },
        Err(e) => error_response(e),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "padel-tournament-web",
    })
}

// Players

#[get("/api/players")]
async fn api_list_players(state: AppState) -> HttpResponse {
    HttpResponse::Ok().json(state.read(logic::all_players))
}

/// Search by name, surname or nickname; optional `tier` filter.
#[get("/api/players/search")]
async fn api_search_players(state: AppState, query: Query<SearchQuery>) -> HttpResponse {
    HttpResponse::Ok().json(state.read(|db| logic::search_players(db, &query.q, query.tier)))
}

#[post("/api/players")]
async fn api_add_player(state: AppState, body: Json<NewPlayer>) -> HttpResponse {
    respond(state.transaction(|db| logic::add_player(db, body.into_inner())))
}

#[get("/api/players/{id}")]
async fn api_get_player(state: AppState, path: Path<IdPath>) -> HttpResponse {
    respond(state.read(|db| logic::player(db, path.id)))
}

#[put("/api/players/{id}")]
async fn api_update_player(state: AppState, path: Path<IdPath>, body: Json<PlayerUpdate>) -> HttpResponse {
    respond(state.transaction(|db| logic::update_player(db, path.id, body.into_inner())))
}

/// Delete a player everywhere (memberships, stats rows, tournament rosters).
#[delete("/api/players/{id}")]
async fn api_delete_player(state: AppState, path: Path<IdPath>) -> HttpResponse {
    let deleted = match state.transaction(|db| Ok(logic::delete_player(db, path.id))) {
        Ok(deleted) => deleted,
        Err(e) => return error_response(e),
    };
    if deleted {
        HttpResponse::Ok().json(DeletedResponse { deleted })
    } else {
        HttpResponse::NotFound().json(DeletedResponse { deleted })
    }
}

#[get("/api/players/{id}/tournaments")]
async fn api_player_tournaments(state: AppState, path: Path<IdPath>) -> HttpResponse {
    respond(state.read(|db| logic::player_tournaments(db, path.id)))
}

#[get("/api/players/{id}/stats")]
async fn api_player_stats(state: AppState, path: Path<IdPath>) -> HttpResponse {
    respond(state.read(|db| logic::player_stats(db, path.id)))
}

// Tournaments

#[get("/api/tournaments")]
async fn api_list_tournaments(state: AppState) -> HttpResponse {
    HttpResponse::Ok().json(state.read(logic::all_tournaments))
}

#[post("/api/tournaments")]
async fn api_create_tournament(state: AppState, body: Json<NewTournament>) -> HttpResponse {
    respond(state.transaction(|db| logic::create_tournament(db, body.into_inner())))
}

#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<IdPath>) -> HttpResponse {
    respond(state.read(|db| logic::tournament(db, path.id)))
}

#[put("/api/tournaments/{id}")]
async fn api_update_tournament(
    state: AppState,
    path: Path<IdPath>,
    body: Json<TournamentUpdate>,
) -> HttpResponse {
    let update = body.into_inner();
    let roster_changed = update.player_ids.is_some();
    let result = state.transaction(|db| logic::update_tournament(db, path.id, update));
    if roster_changed {
        with_recompute(&state, result, |t| t.id)
    } else {
        respond(result)
    }
}

/// Delete a tournament with its matches, stats and memberships.
#[delete("/api/tournaments/{id}")]
async fn api_delete_tournament(state: AppState, path: Path<IdPath>) -> HttpResponse {
    let deleted = match state.delete_tournament(path.id) {
        Ok(deleted) => deleted,
        Err(e) => return error_response(e),
    };
    if deleted {
        HttpResponse::Ok().json(DeletedResponse { deleted })
    } else {
        HttpResponse::NotFound().json(DeletedResponse { deleted })
    }
}

#[get("/api/tournaments/{id}/players")]
async fn api_tournament_players(state: AppState, path: Path<IdPath>) -> HttpResponse {
    respond(state.read(|db| logic::tournament_players(db, path.id)))
}

/// Join a player; `joined: false` when full or already a member.
#[post("/api/tournaments/{id}/players/{player_id}")]
async fn api_add_tournament_player(state: AppState, path: Path<TournamentPlayerPath>) -> HttpResponse {
    let result = state.transaction(|db| logic::add_player_to_tournament(db, path.id, path.player_id));
    match result {
        Ok(true) => match state.recompute_stats(path.id) {
            Ok(()) => HttpResponse::Ok().json(JoinedResponse { joined: true }),
            Err(e) => error_response(e),
        },
        Ok(joined) => HttpResponse::Ok().json(JoinedResponse { joined }),
        Err(e) => error_response(e),
    }
}

#[delete("/api/tournaments/{id}/players/{player_id}")]
async fn api_remove_tournament_player(state: AppState, path: Path<TournamentPlayerPath>) -> HttpResponse {
    let removed = state.transaction(|db| {
        Ok(logic::remove_player_from_tournament(db, path.id, path.player_id))
    });
    match removed {
        Ok(true) => match state.recompute_stats(path.id) {
            Ok(()) => HttpResponse::Ok().json(DeletedResponse { deleted: true }),
            Err(e) => error_response(e),
        },
        Ok(false) => HttpResponse::NotFound().json(DeletedResponse { deleted: false }),
        Err(e) => error_response(e),
    }
}

#[get("/api/tournaments/{id}/players/{player_id}/stats")]
async fn api_player_tournament_stats(state: AppState, path: Path<TournamentPlayerPath>) -> HttpResponse {
    match state.read(|db| logic::player_tournament_stats(db, path.player_id, path.id)) {
        Some(row) => HttpResponse::Ok().json(row),
        None => HttpResponse::NotFound().json(serde_json::json!({ "error": "No stats for this player" })),
    }
}

#[get("/api/tournaments/{id}/matches")]
async fn api_tournament_matches(state: AppState, path: Path<IdPath>) -> HttpResponse {
    respond(state.read(|db| logic::tournament_matches(db, path.id)))
}

/// Generate the next round (fails while matches are still open).
#[post("/api/tournaments/{id}/matches/generate")]
async fn api_generate_matches(
    state: AppState,
    path: Path<IdPath>,
    body: Option<Json<GenerateMatchesBody>>,
) -> HttpResponse {
    let body = body.map(Json::into_inner).unwrap_or_default();
    respond(state.transaction(|db| {
        let settings = logic::get_settings(db);
        logic::generate_matches(
            db,
            path.id,
            body.strategy.unwrap_or(settings.pairing_strategy),
            body.format.unwrap_or(settings.match_format),
        )
    }))
}

/// Create a hand-made match in the current round.
#[post("/api/tournaments/{id}/matches")]
async fn api_create_manual_match(
    state: AppState,
    path: Path<IdPath>,
    body: Json<ManualMatchBody>,
) -> HttpResponse {
    let body = body.into_inner();
    respond(state.transaction(|db| {
        let format = body
            .format
            .unwrap_or_else(|| logic::get_settings(db).match_format);
        logic::create_manual_match(
            db,
            path.id,
            Team::new(body.team_1[0], body.team_1[1]),
            Team::new(body.team_2[0], body.team_2[1]),
            format,
            body.court,
        )
    }))
}

#[delete("/api/tournaments/{id}/matches/uncompleted")]
async fn api_delete_uncompleted_matches(state: AppState, path: Path<IdPath>) -> HttpResponse {
    let result = state.transaction(|db| {
        logic::tournament(db, path.id)?;
        Ok(logic::delete_uncompleted_matches(db, path.id))
    });
    respond(result.map(|count| CountResponse { count }))
}

#[get("/api/tournaments/{id}/standings")]
async fn api_tournament_standings(
    state: AppState,
    path: Path<IdPath>,
    query: Query<StandingsQuery>,
) -> HttpResponse {
    respond(state.read(|db| logic::tournament_standings(db, path.id, query.sort_by)))
}

#[get("/api/tournaments/{id}/standings/csv")]
async fn api_tournament_standings_csv(
    state: AppState,
    path: Path<IdPath>,
    query: Query<StandingsQuery>,
) -> HttpResponse {
    let csv = state
        .read(|db| logic::tournament_standings(db, path.id, query.sort_by))
        .and_then(|standings| logic::standings_to_csv(&standings));
    match csv {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .body(body),
        Err(e) => error_response(e),
    }
}

#[post("/api/tournaments/{id}/stats/recompute")]
async fn api_recompute_tournament_stats(state: AppState, path: Path<IdPath>) -> HttpResponse {
    match state.recompute_stats(path.id) {
        Ok(()) => respond(state.read(|db| logic::tournament_standings(db, path.id, StatsSortBy::Points))),
        Err(e) => error_response(e),
    }
}

// Matches

#[get("/api/matches/{id}")]
async fn api_get_match(state: AppState, path: Path<IdPath>) -> HttpResponse {
    respond(state.read(|db| logic::match_by_id(db, path.id)))
}

/// Save set scores and optional winner, then rebuild the tournament's stats.
#[put("/api/matches/{id}/results")]
async fn api_save_results(state: AppState, path: Path<IdPath>, body: Json<SaveResultsBody>) -> HttpResponse {
    let body = body.into_inner();
    let result = state.transaction(|db| logic::save_results(db, path.id, body.scores, body.winner_team_id));
    with_recompute(&state, result, |game| game.tournament_id)
}

#[put("/api/matches/{id}/draw")]
async fn api_save_draw(state: AppState, path: Path<IdPath>, body: Json<SaveDrawBody>) -> HttpResponse {
    let body = body.into_inner();
    let result = state.transaction(|db| logic::save_draw(db, path.id, body.scores));
    with_recompute(&state, result, |game| game.tournament_id)
}

#[delete("/api/matches/{id}")]
async fn api_delete_match(state: AppState, path: Path<IdPath>) -> HttpResponse {
    let match_id: MatchId = path.id;
    let removed = state.transaction(|db| {
        let tournament_id = db.game(match_id).map(|m| m.tournament_id);
        logic::delete_match(db, match_id);
        Ok(tournament_id)
    });
    match removed {
        Ok(Some(tournament_id)) => match state.recompute_stats(tournament_id) {
            Ok(()) => HttpResponse::Ok().json(DeletedResponse { deleted: true }),
            Err(e) => error_response(e),
        },
        Ok(None) => HttpResponse::NotFound().json(DeletedResponse { deleted: false }),
        Err(e) => error_response(e),
    }
}

// Standings and stats

#[get("/api/standings")]
async fn api_overall_standings(state: AppState, query: Query<StandingsQuery>) -> HttpResponse {
    HttpResponse::Ok().json(state.read(|db| logic::overall_standings(db, query.sort_by)))
}

#[get("/api/standings/csv")]
async fn api_overall_standings_csv(state: AppState, query: Query<StandingsQuery>) -> HttpResponse {
    let standings = state.read(|db| logic::overall_standings(db, query.sort_by));
    match logic::standings_to_csv(&standings) {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .body(body),
        Err(e) => error_response(e),
    }
}

/// Rebuild every tournament's stats (administrative bulk action).
#[post("/api/stats/recompute")]
async fn api_recompute_all_stats(state: AppState) -> HttpResponse {
    let store = state.clone();
    match tokio::task::spawn_blocking(move || store.recompute_all_stats()).await {
        Ok(result) => respond(result.map(|count| CountResponse { count })),
        Err(e) => {
            log::error!("Stats recomputation task failed: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({ "error": "recomputation failed" }))
        }
    }
}

// Settings

#[get("/api/settings")]
async fn api_get_settings(state: AppState) -> HttpResponse {
    respond(state.transaction(|db| Ok(logic::get_settings(db))))
}

/// Replace all settings.
#[put("/api/settings")]
async fn api_replace_settings(state: AppState, body: Json<AppSettings>) -> HttpResponse {
    respond(state.transaction(|db| logic::update_settings(db, body.into_inner())))
}

/// Partial update; unknown fields are rejected.
#[patch("/api/settings")]
async fn api_patch_settings(state: AppState, body: Json<serde_json::Value>) -> HttpResponse {
    let update: SettingsUpdate = match serde_json::from_value(body.into_inner()) {
        Ok(update) => update,
        Err(e) => return error_response(TournamentError::validation(e.to_string())),
    };
    respond(state.transaction(|db| Ok(logic::apply_settings_update(db, &update))))
}

#[get("/api/settings/current-tournament")]
async fn api_current_tournament(state: AppState) -> HttpResponse {
    match state.read(logic::current_tournament) {
        Some(t) => HttpResponse::Ok().json(t),
        None => HttpResponse::NotFound().json(serde_json::json!({ "error": "No current tournament" })),
    }
}

/// Point settings at a tournament, or clear the pointer with `null`.
#[put("/api/settings/current-tournament")]
async fn api_set_current_tournament(state: AppState, body: Json<CurrentTournamentBody>) -> HttpResponse {
    match body.tournament_id {
        Some(id) => respond(state.transaction(|db| logic::set_current_tournament(db, id))),
        None => respond(state.transaction(|db| {
            logic::clear_current_tournament(db);
            Ok(logic::get_settings(db))
        })),
    }
}

/// Update a single setting by name, e.g. PUT /api/settings/points_win { "value": 2 }.
#[put("/api/settings/{name}")]
async fn api_update_setting(state: AppState, path: Path<SettingPath>, body: Json<SettingValueBody>) -> HttpResponse {
    let body = body.into_inner();
    respond(state.transaction(|db| {
        let update = SettingsUpdate::from_named(&path.name, body.value)?;
        Ok(logic::apply_settings_update(db, &update))
    }))
}

// Admin

#[get("/api/admin/counts")]
async fn api_data_counts(state: AppState) -> HttpResponse {
    HttpResponse::Ok().json(state.read(logic::data_counts))
}

/// Remove all tournaments, matches and stats; players stay with zeroed totals.
#[delete("/api/admin/data")]
async fn api_clear_all_data(state: AppState) -> HttpResponse {
    respond(state.clear_all_data())
}

/// Remove tournaments and players created as test data.
#[delete("/api/admin/test-data")]
async fn api_cleanup_test_data(state: AppState) -> HttpResponse {
    respond(state.cleanup_test_data())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env();
    let store = match &config.data_file {
        Some(path) => Store::open(path).map_err(|e| std::io::Error::other(e.to_string()))?,
        None => Store::default(),
    };
    let state = Data::new(store);

    let bind = (config.host.as_str(), config.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let app_state = state.clone();
    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .service(api_health)
            .service(api_list_players)
            .service(api_search_players)
            .service(api_add_player)
            .service(api_get_player)
            .service(api_update_player)
            .service(api_delete_player)
            .service(api_player_tournaments)
            .service(api_player_stats)
            .service(api_list_tournaments)
            .service(api_create_tournament)
            .service(api_get_tournament)
            .service(api_update_tournament)
            .service(api_delete_tournament)
            .service(api_tournament_players)
            .service(api_add_tournament_player)
            .service(api_remove_tournament_player)
            .service(api_player_tournament_stats)
            .service(api_tournament_matches)
            .service(api_generate_matches)
            .service(api_create_manual_match)
            .service(api_delete_uncompleted_matches)
            .service(api_tournament_standings)
            .service(api_tournament_standings_csv)
            .service(api_recompute_tournament_stats)
            .service(api_get_match)
            .service(api_save_results)
            .service(api_save_draw)
            .service(api_delete_match)
            .service(api_overall_standings)
            .service(api_overall_standings_csv)
            .service(api_recompute_all_stats)
            .service(api_get_settings)
            .service(api_replace_settings)
            .service(api_patch_settings)
            .service(api_current_tournament)
            .service(api_set_current_tournament)
            .service(api_update_setting)
            .service(api_data_counts)
            .service(api_clear_all_data)
            .service(api_cleanup_test_data)
    })
    .bind(bind)?
    .run()
    .await?;

    if let Err(e) = state.persist() {
        log::error!("Failed to write final snapshot: {}", e);
    }
    Ok(())
}
