use crate::error::{FeedError, FeedResult};
use crate::model::SubmitMethod;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

/// One form submission, ready to hand to the worker thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    pub url: String,
    pub method: SubmitMethod,
    pub payload: Vec<(String, String)>,
    pub timeout: Duration,
}

impl SubmitRequest {
    /// `application/x-www-form-urlencoded` rendering of the payload.
    pub fn encoded_payload(&self) -> String {
        let mut ser = url::form_urlencoded::Serializer::new(String::new());
        for (k, v) in &self.payload {
            ser.append_pair(k, v);
        }
        ser.finish()
    }

    /// URL actually requested: GET carries the payload in the query string.
    pub fn target_url(&self) -> String {
        let body = self.encoded_payload();
        match self.method {
            SubmitMethod::Get if !body.is_empty() => {
                let sep = if self.url.contains('?') { '&' } else { '?' };
                format!("{}{}{}", self.url, sep, body)
            }
            _ => self.url.clone(),
        }
    }
}

pub struct SubmitMsg {
    pub feed: String,
    pub outcome: Result<String, FeedError>,
}

/// Perform the request on the calling thread and return the body text.
pub fn execute(req: &SubmitRequest) -> FeedResult<String> {
    let target = req.target_url();
    let mut builder = reqwest::blocking::Client::builder().timeout(req.timeout);
    if is_loopback(&target) {
        builder = builder.no_proxy();
    }
    let client = builder.build()?;
    let resp = match req.method {
        SubmitMethod::Get => client.get(&target).send()?,
        SubmitMethod::Post => client
            .post(&target)
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body(req.encoded_payload())
            .send()?,
    };
    let status = resp.status();
    let body = resp.text()?;
    if !status.is_success() {
        return Err(FeedError::Status {
            code: status.as_u16(),
            body,
        });
    }
    Ok(body)
}

fn is_loopback(target: &str) -> bool {
    let Ok(parsed) = url::Url::parse(target) else {
        return false;
    };
    match parsed.host() {
        Some(url::Host::Domain(d)) => d.eq_ignore_ascii_case("localhost"),
        Some(url::Host::Ipv4(ip)) => ip.is_loopback(),
        Some(url::Host::Ipv6(ip)) => ip.is_loopback(),
        None => false,
    }
}

pub fn spawn_submit(feed: String, req: SubmitRequest, tx: Sender<SubmitMsg>) {
    thread::spawn(move || {
        tracing::debug!(%feed, method = req.method.as_str(), url = %req.url, "submitting form");
        let outcome = execute(&req);
        match &outcome {
            Ok(body) => tracing::info!(%feed, bytes = body.len(), "submit finished"),
            Err(e) => tracing::warn!(%feed, error = %e, "submit failed"),
        }
        let _ = tx.send(SubmitMsg { feed, outcome });
    });
}
