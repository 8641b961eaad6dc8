//! Model gateway over `worker::Fetch`

use async_trait::async_trait;
use parley::{ChatPayload, Error, GatewayReply, GatewayTarget, ModelGateway, Result};
use worker::{Fetch, Headers, Method, Request, RequestInit};

/// Header the gateway checks in addition to the provider key
const GATEWAY_AUTH_HEADER: &str = "cf-aig-authorization";

pub struct FetchGateway;

fn transport_error(e: worker::Error) -> Error {
    Error::ProcessingFailed(format!("gateway request failed: {e}"))
}

#[async_trait(?Send)]
impl ModelGateway for FetchGateway {
    async fn send(&self, target: GatewayTarget<'_>, payload: &ChatPayload) -> Result<GatewayReply> {
        let body = serde_json::to_vec(payload)?;

        let headers = Headers::new();
        headers
            .set("Authorization", &format!("Bearer {}", target.api_key))
            .map_err(transport_error)?;
        headers
            .set("Content-Type", "application/json")
            .map_err(transport_error)?;
        if let Some(token) = target.token {
            headers
                .set(GATEWAY_AUTH_HEADER, &format!("Bearer {token}"))
                .map_err(transport_error)?;
        }

        let mut init = RequestInit::new();
        init.with_method(Method::Post);
        init.with_body(Some(body.into()));
        init.with_headers(headers);

        let upstream = Request::new_with_init(target.url, &init).map_err(transport_error)?;
        let mut response = Fetch::Request(upstream).send().await.map_err(transport_error)?;

        let status = response.status_code();
        let body = response.text().await.map_err(transport_error)?;
        Ok(GatewayReply { status, body })
    }
}
