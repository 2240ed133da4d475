//! Drawing upload handler

use axum::{
    Json,
    body::Body,
    extract::State,
    response::{IntoResponse, Response},
};
use futures::TryStreamExt;
use tokio_util::io::StreamReader;
use tracing::{error, info};

use crate::web::{AppState, responses::handle_error};

/// Accept a raw PNG body and reply with the public path of the stored copy.
pub async fn save_image(State(state): State<AppState>, body: Body) -> Response {
    let stream = body.into_data_stream().map_err(std::io::Error::other);
    let reader = StreamReader::new(stream);

    match state.pipeline.ingest(reader).await {
        Ok(saved) => {
            info!("saved {}", saved.path);
            Json(saved).into_response()
        }
        Err(e) => {
            if e.is_rejection() {
                info!("upload refused: {}", e);
            } else {
                error!("save error: {}", e);
            }
            handle_error(e)
        }
    }
}
