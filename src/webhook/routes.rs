// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Request routing for the cert-manager webhook API.

use crate::constants::webhook::{API_VERSION, MAX_PAYLOAD_BYTES, PAYLOAD_KIND};
use crate::solver::Solver;
use crate::types::{ChallengeAction, ChallengePayload, ChallengeResponse};
use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::{Method, Request, Response, StatusCode};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{APIResource, APIResourceList, Status};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Routes webhook requests to a single solver
#[derive(Clone)]
pub struct Webhook {
    group_name: String,
    solver: Arc<dyn Solver>,
}

impl Webhook {
    pub fn new(group_name: &str, solver: Arc<dyn Solver>) -> Self {
        Self {
            group_name: group_name.to_string(),
            solver,
        }
    }

    pub async fn handle<B>(&self, req: Request<B>) -> Response<Full<Bytes>>
    where
        B: hyper::body::Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

        debug!("{} {}", method, path);

        match (&method, segments.as_slice()) {
            (&Method::GET, ["healthz" | "livez" | "readyz"]) => text(StatusCode::OK, "ok"),
            (&Method::GET, ["apis", group, version])
                if *group == self.group_name && *version == API_VERSION =>
            {
                self.discovery()
            }
            (&Method::POST, ["apis", group, version, solver])
            | (&Method::POST, ["apis", group, version, "namespaces", _, solver])
                if *group == self.group_name
                    && *version == API_VERSION
                    && *solver == self.solver.name() =>
            {
                match Limited::new(req.into_body(), MAX_PAYLOAD_BYTES).collect().await {
                    Ok(body) => self.challenge(&body.to_bytes()).await,
                    Err(e) if e.is::<LengthLimitError>() => {
                        warn!("Rejected challenge payload larger than {} bytes", MAX_PAYLOAD_BYTES);
                        status(
                            StatusCode::PAYLOAD_TOO_LARGE,
                            format!("Payload exceeds {} bytes", MAX_PAYLOAD_BYTES),
                        )
                    }
                    Err(e) => status(StatusCode::BAD_REQUEST, format!("Failed to read body: {}", e)),
                }
            }
            _ => status(StatusCode::NOT_FOUND, format!("{} {} not found", method, path)),
        }
    }

    fn discovery(&self) -> Response<Full<Bytes>> {
        let list = APIResourceList {
            group_version: format!("{}/{}", self.group_name, API_VERSION),
            resources: vec![APIResource {
                name: self.solver.name().to_string(),
                singular_name: self.solver.name().to_string(),
                kind: PAYLOAD_KIND.to_string(),
                namespaced: false,
                verbs: vec!["create".to_string()],
                ..Default::default()
            }],
        };
        json(StatusCode::OK, &list)
    }

    async fn challenge(&self, body: &[u8]) -> Response<Full<Bytes>> {
        let mut payload: ChallengePayload = match serde_json::from_slice(body) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Rejecting undecodable challenge payload: {}", e);
                return status(StatusCode::BAD_REQUEST, format!("Invalid ChallengePayload: {}", e));
            }
        };
        let Some(request) = payload.request.take() else {
            warn!("Rejecting challenge payload without request");
            return status(StatusCode::BAD_REQUEST, "ChallengePayload has no request".to_string());
        };

        info!(
            "Received {} for {} (uid {})",
            request.action, request.dns_name, request.uid
        );

        let result = match request.action {
            ChallengeAction::Present => self.solver.present(&request).await,
            ChallengeAction::CleanUp => self.solver.clean_up(&request).await,
        };
        let response = match result {
            Ok(()) => ChallengeResponse::success(&request.uid),
            Err(e) => ChallengeResponse::failure(&request.uid, e.to_string()),
        };

        payload.request = Some(request);
        json(StatusCode::CREATED, &payload.respond(response))
    }
}

fn response(code: StatusCode, content_type: &'static str, body: Vec<u8>) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = code;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

fn text(code: StatusCode, body: &str) -> Response<Full<Bytes>> {
    response(code, "text/plain", body.as_bytes().to_vec())
}

fn json<T: Serialize>(code: StatusCode, value: &T) -> Response<Full<Bytes>> {
    match serde_json::to_vec(value) {
        Ok(body) => response(code, "application/json", body),
        Err(e) => text(
            StatusCode::INTERNAL_SERVER_ERROR,
            &format!("Failed to encode response: {}", e),
        ),
    }
}

fn status(code: StatusCode, message: String) -> Response<Full<Bytes>> {
    let status = Status {
        status: Some("Failure".to_string()),
        message: Some(message),
        reason: code.canonical_reason().map(|r| r.replace(' ', "")),
        code: Some(i32::from(code.as_u16())),
        ..Default::default()
    };
    json(code, &status)
}
