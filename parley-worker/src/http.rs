//! Conversions between `worker` request/response types and Parley's

use parley::{Error, HttpReply, InboundRequest, Method};
use worker::{Request, Response, Result};

pub async fn inbound_request(req: &mut Request) -> parley::Result<InboundRequest> {
    let method = match req.method() {
        worker::Method::Get => Method::Get,
        worker::Method::Post => Method::Post,
        worker::Method::Options => Method::Options,
        other => Method::parse(&format!("{other:?}")),
    };
    let url = req
        .url()
        .map_err(|e| Error::ProcessingFailed(format!("invalid request URL: {e}")))?;

    let mut inbound = InboundRequest::new(method, url);
    if inbound.method == Method::Post {
        let body = req
            .text()
            .await
            .map_err(|e| Error::InvalidJsonBody(e.to_string()))?;
        inbound = inbound.with_body(body);
    }
    Ok(inbound)
}

pub fn into_response(reply: HttpReply) -> Result<Response> {
    // 204 and friends must not carry a body
    let mut response = if reply.body.is_empty() {
        Response::empty()?
    } else {
        Response::from_bytes(reply.body)?
    }
    .with_status(reply.status);

    let headers = response.headers_mut();
    for (name, value) in &reply.headers {
        headers.set(name, value)?;
    }
    Ok(response)
}

pub async fn read_reply(response: &mut Response) -> Result<HttpReply> {
    let status = response.status_code();
    let headers = response.headers().entries().collect();
    let body = response.bytes().await?;
    Ok(HttpReply {
        status,
        headers,
        body,
    })
}
