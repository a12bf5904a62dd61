use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use common::{routes, JobProgress, ReportAck, TaskAssignment, TaskReport};
use tower_http::trace::TraceLayer;

use crate::ledger::ReportOutcome;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(routes::HEALTH, get(health))
        .route(routes::JOB, get(get_job))
        .route(routes::NEXT_TASK, post(request_task))
        .route(routes::MAP_COMPLETE, post(map_complete))
        .route(routes::REDUCE_COMPLETE, post(reduce_complete))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/* ---------------- handlers HTTP ---------------- */

async fn health() -> &'static str {
    "ok"
}

// Avance del job (contadores, fase, tiempos)
async fn get_job(State(state): State<AppState>) -> Json<JobProgress> {
    Json(state.progress())
}

// Entrega la siguiente tarea: MAP, REDUCE, WAIT o DONE
async fn request_task(State(state): State<AppState>) -> Json<TaskAssignment> {
    Json(state.request_task())
}

// Un worker terminó un map
async fn map_complete(
    State(state): State<AppState>,
    Json(req): Json<TaskReport>,
) -> Json<ReportAck> {
    let outcome = state.report_map_complete(req.task_index, req.epoch);
    Json(ReportAck {
        accepted: outcome == ReportOutcome::Counted,
    })
}

// Un worker terminó un reduce
async fn reduce_complete(
    State(state): State<AppState>,
    Json(req): Json<TaskReport>,
) -> Json<ReportAck> {
    let outcome = state.report_reduce_complete(req.task_index, req.epoch);
    Json(ReportAck {
        accepted: outcome == ReportOutcome::Counted,
    })
}
