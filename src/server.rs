//! REST API for roster.
//!
//! Provides JSON endpoints over a single in-memory [`Store`] shared by all
//! workers. The store is loaded once at startup and every handler holds its
//! lock for the whole request, so operations never overlap.
//!
//! ## Endpoints
//!
//! - `POST /add` - Add or replace a record
//! - `GET /records` - All records ordered by identity
//! - `GET /records/{identity}` - One record by identity
//! - `POST /nearest` - K nearest records to an identity
//! - `GET /compensation` - Compensation per identity, for charting
//!
//! ## Usage
//!
//! ```rust,no_run
//! use actix_web::{web, App, HttpServer};
//! use roster::Store;
//! use std::sync::Mutex;
//!
//! #[actix_web::main]
//! async fn main() -> std::io::Result<()> {
//!     let store = Store::load("roster.json").expect("snapshot");
//!     let data = web::Data::new(Mutex::new(store));
//!     HttpServer::new(move || App::new().app_data(data.clone()).configure(roster::server::config))
//!         .bind("127.0.0.1:7878")?
//!         .run()
//!         .await
//! }
//! ```

use actix_web::{web, HttpResponse, Responder};
use serde::{Serialize, Deserialize};
use crate::config::DEFAULT_K;
use crate::error::{RosterError, ValidationError};
use crate::record::{normalize_identity, NewRecord, Record};
use crate::Store;
use std::sync::{Mutex, MutexGuard};
use tracing::error;

type SharedStore = web::Data<Mutex<Store>>;

// --- Request structs ---

#[derive(Deserialize)]
struct NearestRequest {
    identity: String,
    #[serde(default = "default_k")]
    k: usize,
}

fn default_k() -> usize {
    DEFAULT_K
}

// --- Response structs ---

#[derive(Serialize)]
struct AddResponse {
    identity: String,
    role: String,
    message: String,
}

#[derive(Serialize)]
struct RecordView {
    identity: String,
    role: String,
    compensation: f64,
    city: String,
    education_level: String,
    specialty: String,
    absenteeism_rate: f64,
    performance_score: f64,
    start_date: String,
    tenure_days: i64,
}

impl From<&Record> for RecordView {
    fn from(r: &Record) -> Self {
        RecordView {
            identity: r.identity().to_string(),
            role: r.role().to_string(),
            compensation: r.compensation(),
            city: r.city().to_string(),
            education_level: r.education_level().to_string(),
            specialty: r.specialty().to_string(),
            absenteeism_rate: r.absenteeism_rate(),
            performance_score: r.performance_score(),
            start_date: r.start_date().to_rfc3339(),
            tenure_days: r.tenure_days(),
        }
    }
}

#[derive(Serialize)]
struct RecordsResponse {
    count: usize,
    records: Vec<RecordView>,
}

#[derive(Serialize)]
struct NearestResponse {
    identity: String,
    matches: Vec<MatchResult>,
}

#[derive(Serialize)]
struct MatchResult {
    identity: String,
    distance: f64,
    performance_score: f64,
    absenteeism_rate: f64,
    compensation: f64,
}

#[derive(Serialize)]
struct CompensationPoint {
    identity: String,
    compensation: f64,
}

#[derive(Serialize)]
struct CompensationResponse {
    series: Vec<CompensationPoint>,
}

/// Maps each error family to its status code.
fn error_response(err: &RosterError) -> HttpResponse {
    let body = serde_json::json!({"error": err.to_string()});
    match err {
        RosterError::Validation(_) => HttpResponse::BadRequest().json(body),
        RosterError::NotFound { .. } => HttpResponse::NotFound().json(body),
        RosterError::Persistence(_) => {
            error!(%err, "persistence failure");
            HttpResponse::InternalServerError().json(body)
        }
    }
}

/// Helper function for taking the store lock
fn lock(store: &SharedStore) -> Result<MutexGuard<'_, Store>, HttpResponse> {
    store.lock().map_err(|_| {
        error!("store lock poisoned");
        HttpResponse::InternalServerError().json(serde_json::json!({"error": "store unavailable"}))
    })
}

// --- Handlers ---

async fn add_handler(store: SharedStore, body: web::Json<NewRecord>) -> impl Responder {
    let new = body.into_inner();
    if let Err(e) = new.check_ranges() {
        return error_response(&RosterError::from(e));
    }

    let mut store = match lock(&store) {
        Ok(guard) => guard,
        Err(resp) => return resp,
    };

    match store.add(new) {
        Ok(record) => HttpResponse::Ok().json(AddResponse {
            identity: record.identity().to_string(),
            role: record.role().to_string(),
            message: format!("{} ({}) added", record.identity(), record.role()),
        }),
        Err(e) => error_response(&e),
    }
}

async fn records_handler(store: SharedStore) -> impl Responder {
    let store = match lock(&store) {
        Ok(guard) => guard,
        Err(resp) => return resp,
    };

    let records: Vec<RecordView> = store
        .sorted_by_identity()
        .into_iter()
        .map(RecordView::from)
        .collect();

    HttpResponse::Ok().json(RecordsResponse { count: records.len(), records })
}

async fn get_handler(store: SharedStore, identity: web::Path<String>) -> impl Responder {
    let store = match lock(&store) {
        Ok(guard) => guard,
        Err(resp) => return resp,
    };

    match store.get(&identity) {
        Ok(record) => HttpResponse::Ok().json(RecordView::from(record)),
        Err(e) => error_response(&e),
    }
}

async fn nearest_handler(store: SharedStore, body: web::Json<NearestRequest>) -> impl Responder {
    if body.k == 0 {
        return error_response(&RosterError::from(ValidationError::ZeroNeighbors));
    }

    let store = match lock(&store) {
        Ok(guard) => guard,
        Err(resp) => return resp,
    };

    match store.find_nearest(&body.identity, body.k) {
        Ok(neighbors) => HttpResponse::Ok().json(NearestResponse {
            identity: normalize_identity(&body.identity),
            matches: neighbors
                .iter()
                .map(|n| MatchResult {
                    identity: n.record.identity().to_string(),
                    distance: n.distance,
                    performance_score: n.record.performance_score(),
                    absenteeism_rate: n.record.absenteeism_rate(),
                    compensation: n.record.compensation(),
                })
                .collect(),
        }),
        Err(e) => error_response(&e),
    }
}

async fn compensation_handler(store: SharedStore) -> impl Responder {
    let store = match lock(&store) {
        Ok(guard) => guard,
        Err(resp) => return resp,
    };

    let series = store
        .compensation_series()
        .into_iter()
        .map(|(identity, compensation)| CompensationPoint {
            identity: identity.to_string(),
            compensation,
        })
        .collect();

    HttpResponse::Ok().json(CompensationResponse { series })
}

/// Registers the routes. The caller must provide `web::Data<Mutex<Store>>`.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/add").route(web::post().to(add_handler)))
       .service(web::resource("/records").route(web::get().to(records_handler)))
       .service(web::resource("/records/{identity}").route(web::get().to(get_handler)))
       .service(web::resource("/nearest").route(web::post().to(nearest_handler)))
       .service(web::resource("/compensation").route(web::get().to(compensation_handler)));
}
