//! Request execution
//!
//! Terminal method that connects, writes the request and parses the
//! response head.

use std::io::{Read, Write};

use spindle_client::config::{HttpConfig, Validator};
#[cfg(feature = "tls")]
use spindle_client::connect::TlsConnector;
use spindle_client::connect::{Connector, PlainConnector};
use spindle_client::{HttpConnection, RequestHead, error};
use url::{Host, Url};

use super::core::RequestBuilder;
use crate::response::Response;

/// Byte stream of either transport, boxed so responses share one type
pub trait Stream: Read + Write + Send {}

impl<T: Read + Write + Send> Stream for T {}

pub type BoxStream = Box<dyn Stream>;

impl RequestBuilder {
    /// Connect, send the request and read the response head
    pub fn send(self) -> spindle_client::Result<Response> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let url = self
            .url
            .ok_or_else(|| error::builder("request has no URL"))?;
        self.config.validate()?;

        let host = match url.host() {
            Some(Host::Domain(domain)) => domain.to_owned(),
            Some(Host::Ipv4(addr)) => addr.to_string(),
            Some(Host::Ipv6(addr)) => addr.to_string(),
            None => return Err(error::builder(format!("URL {url} has no host"))),
        };
        let port = url
            .port_or_known_default()
            .ok_or_else(|| error::builder(format!("URL {url} has no port")))?;

        let mut head = RequestHead::new(self.method, request_target(&url));
        head.headers = self.headers;
        if !head.headers.contains("Host") {
            head.headers.insert("Host", host_header(&url));
        }
        if !head.headers.contains("User-Agent") {
            head.headers.append("User-Agent", self.config.user_agent.clone());
        }
        if let Some(body) = &self.body
            && !head.headers.contains("Content-Length")
            && !head.headers.find_token("Transfer-Encoding", "chunked")
        {
            head.headers.append("Content-Length", body.len().to_string());
        }

        let stream = connect(&url, &host, port, &self.config)?;
        let mut conn = HttpConnection::from_stream(stream, self.config)?;
        conn.request(&mut head)?;
        if let Some(body) = &self.body {
            conn.write(body, false)?;
            conn.finish()?;
        }

        let response_head = conn.response_headers()?.clone();
        tracing::debug!(url = %url, status = %response_head.status, "response received");
        Ok(Response::new(url, response_head, conn))
    }
}

fn connect(url: &Url, host: &str, port: u16, config: &HttpConfig) -> spindle_client::Result<BoxStream> {
    match url.scheme() {
        "http" => {
            let stream = PlainConnector::new(config.tcp.clone()).connect(host, port)?;
            Ok(Box::new(stream))
        }
        #[cfg(feature = "tls")]
        "https" => {
            let stream = TlsConnector::new(config.tcp.clone(), &config.tls)?.connect(host, port)?;
            Ok(Box::new(stream))
        }
        other => Err(error::builder(format!("unsupported URL scheme {other:?}"))),
    }
}

/// Origin-form target: path plus query
fn request_target(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{query}", url.path()),
        None => url.path().to_owned(),
    }
}

/// `Host` value; the port appears only when it is not the scheme default
fn host_header(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_owned(),
    }
}
