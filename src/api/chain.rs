use std::sync::Arc;

use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, Responder, get, post, web};
use log::{debug, error};

use super::models::{AppState, ReplaceResponse};
use crate::blockchain::Block;

/// Get the full blockchain as an indented JSON document.
#[get("/")]
pub async fn get_chain(state: web::Data<AppState>) -> impl Responder {
    let chain = state.store.snapshot();
    match serde_json::to_string_pretty(chain.as_slice()) {
        Ok(body) => HttpResponse::Ok()
            .content_type(ContentType::json())
            .body(body),
        Err(e) => {
            error!("GET / - failed to serialize chain: {e}");
            HttpResponse::InternalServerError().body(e.to_string())
        }
    }
}

/// Offer an alternative chain; it replaces ours only if strictly longer
/// and valid.
#[post("/chain/")]
pub async fn submit_chain(
    state: web::Data<AppState>,
    body: web::Json<Vec<Block>>,
) -> impl Responder {
    let candidate = body.into_inner();
    debug!("POST /chain/ - received candidate of {} blocks", candidate.len());

    // replace waits on the chain lock, which a miner may hold for a while
    let store = Arc::clone(&state.store);
    let result = web::block(move || {
        let outcome = store.replace(candidate);
        (outcome, store.len())
    })
    .await;

    match result {
        Ok((outcome, length)) => HttpResponse::Ok().json(ReplaceResponse::new(&outcome, length)),
        Err(e) => {
            error!("POST /chain/ - blocking task failed: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}
