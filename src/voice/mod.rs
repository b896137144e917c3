use crate::routing::{CallEvent, RoutingInstruction, RoutingPolicy};
use crate::CONFIG;
use axum::{
    body::to_bytes,
    extract::Request,
    http::header,
    middleware,
    response::IntoResponse,
    routing::get,
    Extension, Router,
};

pub mod signature;

pub fn router() -> Router {
    Router::new()
        .route(
            CONFIG.settings.voice_route,
            get(voice_handler).post(voice_handler),
        )
        .route_layer(middleware::from_fn(signature::verify))
}

/// Answer a voice webhook with TwiML telling Twilio how to route the call.
///
/// Parameters are read leniently from the query string and the form body, so
/// every request gets a 200 with a valid document. A body that cannot be read
/// or is larger than any Twilio webhook contributes no parameters.
pub async fn voice_handler(policy: Extension<RoutingPolicy>, request: Request) -> impl IntoResponse {
    let (parts, body) = request.into_parts();

    let mut params = parts
        .uri
        .query()
        .map(|query| signature::args_from_urlencoded(query.as_bytes()))
        .unwrap_or_default();
    match to_bytes(body, signature::MAX_BODY_BYTES).await {
        Ok(body) => params.extend(signature::args_from_urlencoded(&body)),
        Err(e) => log::warn!("Ignoring unreadable webhook body: {e}"),
    }

    let event = CallEvent::from(params);
    log::info!(
        "Voice call from {:?} to {:?}",
        event.from_number,
        event.to_number
    );

    let instruction = policy.decide(&event);
    match &instruction {
        RoutingInstruction::Dial { target, .. } => {
            log::info!("Connecting outgoing call to {target}");
        }
        RoutingInstruction::Say { .. } if event.to_number.is_some() => {
            log::warn!(
                "Empty destination from {:?}, answering with the greeting",
                event.from_number
            );
        }
        RoutingInstruction::Say { .. } => {
            log::info!("No destination supplied, answering with the greeting");
        }
    }

    (
        [(header::CONTENT_TYPE, "text/xml")],
        instruction.to_twiml().as_twiml(),
    )
}
