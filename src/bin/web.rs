//! Single binary web server: start knockout tournaments and follow their progress via REST.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Env: HOST, PORT, AUTHORITY_URL (remote scoring authority; the in-process simulator
//! is used when unset), AUTHORITY_LATENCY_MS (simulator delay), AUTHORITY_SEED.

use actix_web::{
    get, post,
    web::{self, Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use knockout_bracket::{
    Authority, Event, EventKind, EventSink, HttpAuthority, SimulatedAuthority, Tournament,
    TournamentConfig, TournamentTag,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Per-tournament entry: config, events so far, and last activity time (for auto-cleanup).
struct TournamentEntry {
    config: TournamentConfig,
    events: Vec<Event>,
    last_activity: Instant,
}

type Entries = RwLock<HashMap<TournamentTag, TournamentEntry>>;

/// In-memory state: tournaments by routing tag. Entries are removed after 12h inactivity.
type AppState = Data<Entries>;

/// Inactivity threshold: tournaments not accessed for this long are removed.
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(12 * 3600);

/// Which scoring authority tournaments play against.
#[derive(Clone)]
struct AuthoritySettings {
    /// Remote authority; `None` means the in-process simulator.
    url: Option<String>,
    latency: Duration,
    seed: Option<u64>,
}

impl AuthoritySettings {
    fn authority(&self) -> Rc<dyn Authority> {
        match &self.url {
            Some(url) => Rc::new(HttpAuthority::new(url.as_str())),
            None => {
                let seed = self.seed.unwrap_or_else(rand::random);
                Rc::new(SimulatedAuthority::new(seed).with_latency(self.latency))
            }
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Serialize)]
struct CreatedResponse {
    tag: TournamentTag,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
enum TournamentStatus {
    Running,
    Completed,
    Failed,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TournamentView<'a> {
    tag: TournamentTag,
    config: &'a TournamentConfig,
    status: TournamentStatus,
    winner_name: Option<&'a str>,
    error: Option<&'a str>,
    events: &'a [Event],
}

impl<'a> TournamentView<'a> {
    fn new(tag: TournamentTag, entry: &'a TournamentEntry) -> Self {
        let mut view = Self {
            tag,
            config: &entry.config,
            status: TournamentStatus::Running,
            winner_name: None,
            error: None,
            events: &entry.events,
        };
        for event in &entry.events {
            match &event.kind {
                EventKind::TournamentEnded { winner_name } => {
                    view.status = TournamentStatus::Completed;
                    view.winner_name = Some(winner_name.as_str());
                }
                EventKind::TournamentError { message } => {
                    view.status = TournamentStatus::Failed;
                    view.error = Some(message.as_str());
                }
                _ => {}
            }
        }
        view
    }
}

/// Path segment: routing tag (e.g. /api/tournaments/{tag})
#[derive(Deserialize)]
struct TournamentPath {
    tag: TournamentTag,
}

/// Observer that appends events to the shared entry for one tournament.
struct SharedLog {
    tag: TournamentTag,
    state: AppState,
}

impl EventSink for SharedLog {
    fn record(&self, event: Event) {
        let mut g = match self.state.write() {
            Ok(guard) => guard,
            Err(_) => {
                log::warn!("Dropping event for {}: lock error", self.tag);
                return;
            }
        };
        if let Some(entry) = g.get_mut(&self.tag) {
            entry.events.push(event);
        }
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "knockout-bracket",
    })
}

/// Start a tournament in the background (returns its tag; poll it for progress).
#[post("/api/tournaments")]
async fn api_create_tournament(
    state: AppState,
    settings: Data<AuthoritySettings>,
    body: Json<TournamentConfig>,
) -> HttpResponse {
    let config = body.into_inner();
    if let Err(e) = config.validate() {
        return HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() }));
    }
    let tag = uuid::Uuid::new_v4();
    {
        let mut g = match state.write() {
            Ok(guard) => guard,
            Err(_) => return HttpResponse::InternalServerError().body("lock error"),
        };
        g.insert(
            tag,
            TournamentEntry {
                config,
                events: Vec::new(),
                last_activity: Instant::now(),
            },
        );
    }

    let settings = settings.get_ref().clone();
    let observer = SharedLog {
        tag,
        state: state.clone(),
    };
    // Tournament futures are not Send; rt::spawn keeps them on this worker's thread.
    actix_web::rt::spawn(async move {
        let mut tournament =
            Tournament::new(config, settings.authority(), Rc::new(observer)).with_tag(tag);
        match tournament.start().await {
            Ok(outcome) => log::info!("Tournament {} won by {}", tag, outcome.winner_name),
            Err(_) => log::warn!("Tournament {} ended with an error", tag),
        }
    });

    HttpResponse::Ok().json(CreatedResponse { tag })
}

/// Get a tournament's progress by tag (404 if not found). Touching it refreshes last_activity.
#[get("/api/tournaments/{tag}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.get_mut(&path.tag) {
        Some(entry) => {
            entry.last_activity = Instant::now();
            HttpResponse::Ok().json(TournamentView::new(path.tag, entry))
        }
        None => HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let settings = AuthoritySettings {
        url: std::env::var("AUTHORITY_URL").ok().filter(|u| !u.is_empty()),
        latency: Duration::from_millis(
            std::env::var("AUTHORITY_LATENCY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
        ),
        seed: std::env::var("AUTHORITY_SEED")
            .ok()
            .and_then(|v| v.parse().ok()),
    };
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);
    match &settings.url {
        Some(url) => log::info!("Using scoring authority at {}", url),
        None => log::info!("Using the simulated scoring authority"),
    }

    let state: AppState = Data::new(RwLock::new(HashMap::new()));
    let settings = Data::new(settings);

    // Background task: every 30 minutes, remove tournaments inactive for 12+ hours
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let before = g.len();
            g.retain(|_, entry| entry.last_activity.elapsed() < INACTIVITY_TIMEOUT);
            let removed = before - g.len();
            if removed > 0 {
                log::info!("Cleaned up {} inactive tournament(s) (no activity for 12h)", removed);
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(settings.clone())
            .service(api_health)
            .service(api_create_tournament)
            .service(api_get_tournament)
            .route("/", web::get().to(index))
    })
    .bind(bind)?
    .run()
    .await
}

async fn index() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "service": "knockout-bracket",
        "endpoints": ["GET /api/health", "POST /api/tournaments", "GET /api/tournaments/{tag}"],
    }))
}
