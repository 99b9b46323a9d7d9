use actix_web::web::{self, HttpResponse};
use actix_web::{error, Responder, Result};
use serde::Serialize;
use tokio::sync::oneshot;

use system::RoomId;

use crate::server::{ServerCommand, ServerTx};
use crate::server_state::RoomMetadata;

pub fn configure_room_handlers(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(web::resource("/health").route(web::get().to(health)))
            .service(web::resource("/rooms/{room_id}").route(web::get().to(show_room))),
    );
}

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
}

pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthBody { status: "ok" })
}

/// Read-only room metadata, answered by the server task. No mutation
/// happens via this path.
pub async fn show_room(
    path: web::Path<RoomId>,
    srv_tx: web::Data<ServerTx>,
) -> Result<impl Responder> {
    let room_id = path.into_inner();

    let (tx, rx) = oneshot::channel::<Option<RoomMetadata>>();

    srv_tx
        .get_ref()
        .clone()
        .send(ServerCommand::GetRoomMetadata { room_id, tx })
        .await
        .map_err(|_| error::ErrorInternalServerError("Internal Server Error"))?;

    let metadata = rx
        .await
        .map_err(|_| error::ErrorInternalServerError("Receiver await error"))?;

    match metadata {
        Some(metadata) => Ok(HttpResponse::Ok().json(metadata)),
        None => Ok(HttpResponse::NotFound().json(ErrorBody {
            error: "Room not found",
        })),
    }
}
