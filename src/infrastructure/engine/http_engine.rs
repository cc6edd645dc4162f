// Copyright 2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! `QueryEngine` adapter for SQL gateways speaking the paginated HTTP
//! statement protocol (`POST /v1/statement`, then follow `nextUri`).
//!
//! Every request is bounded by whatever is left of the run deadline, so a
//! stalled gateway surfaces as `DeadlineExceeded` instead of hanging the run.

use crate::domain::deadline::Deadline;
use crate::domain::entities::{ConnectionConfig, IdentifierQuote};
use crate::domain::errors::{ExportError, Result};
use crate::infrastructure::engine::protocol::{decode_string_column, QueryResults, ServerInfo};
use crate::ports::query_engine::{Cursor, QueryEngine, Session};
use log::{debug, info, warn};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

const USER_HEADER: &str = "X-Trino-User";
const CATALOG_HEADER: &str = "X-Trino-Catalog";
const SCHEMA_HEADER: &str = "X-Trino-Schema";
const SOURCE_HEADER: &str = "X-Trino-Source";
const SOURCE_NAME: &str = env!("CARGO_PKG_NAME");

/// Upper bound for the best-effort cancel sent when a cursor is abandoned.
const CANCEL_TIMEOUT: Duration = Duration::from_secs(5);

/// Which request of the statement protocol is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// `POST /v1/statement`
    Submit,
    /// `GET nextUri`
    Poll,
}

impl Phase {
    fn operation(self) -> &'static str {
        match self {
            Phase::Submit => "execute",
            Phase::Poll => "has_more",
        }
    }
}

fn rejects_credentials(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

/// Opens sessions over HTTP(S). The gateway speaks ANSI SQL, so identifiers
/// are double-quoted.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpQueryEngine;

pub fn base_url(config: &ConnectionConfig) -> String {
    let scheme = if config.use_tls { "https" } else { "http" };
    format!("{}://{}:{}", scheme, config.host, config.port)
}

/// Client plus the per-session headers every request carries.
#[derive(Debug)]
struct Transport {
    client: Client,
    base_url: String,
    username: String,
    password: String,
    catalog: String,
    schema: String,
}

impl Transport {
    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let mut builder = self
            .client
            .request(method, url)
            .header(SOURCE_HEADER, SOURCE_NAME)
            .header(CATALOG_HEADER, &self.catalog)
            .header(SCHEMA_HEADER, &self.schema);
        if !self.username.is_empty() {
            builder = builder.header(USER_HEADER, &self.username);
        }
        if !self.password.is_empty() {
            builder = builder.basic_auth(&self.username, Some(&self.password));
        }
        builder
    }
}

impl QueryEngine for HttpQueryEngine {
    fn connect(&self, config: &ConnectionConfig, deadline: &Deadline) -> Result<Box<dyn Session>> {
        let budget = deadline.remaining("connect")?;
        let client = Client::builder()
            .connect_timeout(budget)
            .build()
            .map_err(|e| ExportError::ConnectionError(e.to_string()))?;

        let transport = Transport {
            client,
            base_url: base_url(config),
            username: config.username.clone(),
            password: config.password.clone(),
            catalog: config.catalog.clone(),
            schema: config.schema.clone(),
        };

        let url = format!("{}/v1/info", transport.base_url);
        let response = transport
            .request(Method::GET, &url)
            .timeout(budget)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    deadline.exceeded("connect")
                } else {
                    ExportError::ConnectionError(format!("{}: {}", config.address(), e))
                }
            })?;

        let status = response.status();
        if rejects_credentials(status) {
            return Err(ExportError::ConnectionError(format!(
                "{} rejected the credentials of user {:?} ({})",
                config.address(),
                config.username,
                status
            )));
        }
        if !status.is_success() {
            return Err(ExportError::ConnectionError(format!(
                "{} answered {}",
                config.address(),
                status
            )));
        }

        let server: ServerInfo = response.json().map_err(|e| {
            ExportError::ConnectionError(format!("unexpected server info from {}: {}", url, e))
        })?;
        if server.starting {
            return Err(ExportError::ConnectionError(format!(
                "{} is still starting up",
                config.address()
            )));
        }
        if let Some(v) = &server.node_version {
            info!("Server version {}", v.version);
        }

        Ok(Box::new(HttpSession {
            transport: Arc::new(transport),
            closed: false,
        }))
    }

    fn identifier_quote(&self) -> IdentifierQuote {
        IdentifierQuote::Double
    }
}

struct HttpSession {
    transport: Arc<Transport>,
    closed: bool,
}

impl Session for HttpSession {
    fn cursor(&mut self) -> Result<Box<dyn Cursor>> {
        if self.closed {
            return Err(ExportError::ConnectionError(format!(
                "session to {} is closed",
                self.transport.base_url
            )));
        }
        Ok(Box::new(HttpCursor {
            transport: self.transport.clone(),
            statement: String::new(),
            query_id: None,
            rows: VecDeque::new(),
            next_uri: None,
        }))
    }

    fn close(&mut self) -> Result<()> {
        // Statements live on the server side of each cursor; the session
        // itself holds nothing remote.
        self.closed = true;
        Ok(())
    }
}

struct HttpCursor {
    transport: Arc<Transport>,
    statement: String,
    query_id: Option<String>,
    rows: VecDeque<Vec<Value>>,
    next_uri: Option<String>,
}

impl HttpCursor {
    /// Sends one request and returns the parsed page. Engine-side failures
    /// become `QueryError`, malformed pages and broken polls `FetchError`,
    /// rejected credentials `ConnectionError`.
    fn send_page(
        &self,
        request: RequestBuilder,
        phase: Phase,
        deadline: &Deadline,
    ) -> Result<QueryResults> {
        let operation = phase.operation();
        let timeout = deadline.remaining(operation)?;
        let response = request.timeout(timeout).send().map_err(|e| {
            if e.is_timeout() {
                deadline.exceeded(operation)
            } else if phase == Phase::Poll {
                ExportError::FetchError(format!(
                    "result stream of `{}` broke: {}",
                    self.statement, e
                ))
            } else {
                ExportError::query(&self.statement, e.to_string())
            }
        })?;

        let status = response.status();
        if rejects_credentials(status) {
            return Err(ExportError::ConnectionError(format!(
                "{} rejected the credentials of user {:?} ({})",
                self.transport.base_url, self.transport.username, status
            )));
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ExportError::query(
                &self.statement,
                format!("HTTP {}: {}", status, body.trim()),
            ));
        }

        let page: QueryResults = response.json().map_err(|e| {
            if e.is_timeout() {
                deadline.exceeded(operation)
            } else {
                ExportError::FetchError(format!("malformed result page: {}", e))
            }
        })?;
        if let Some(failure) = &page.error {
            return Err(ExportError::query(&self.statement, failure.to_string()));
        }
        Ok(page)
    }

    fn absorb(&mut self, page: QueryResults) {
        debug!("Query {} is {}", page.id, page.state());
        if self.query_id.is_none() {
            if let Some(columns) = &page.columns {
                for c in columns {
                    debug!("  column {} {}", c.name, c.type_name);
                }
            }
        }
        if let Some(data) = page.data {
            self.rows.extend(data);
        }
        self.next_uri = page.next_uri;
        self.query_id = Some(page.id);
    }
}

impl Cursor for HttpCursor {
    fn execute(&mut self, statement: &str, deadline: &Deadline) -> Result<()> {
        self.statement = statement.to_string();
        let url = format!("{}/v1/statement", self.transport.base_url);
        let request = self
            .transport
            .request(Method::POST, &url)
            .body(statement.to_string());
        let page = self.send_page(request, Phase::Submit, deadline)?;
        self.absorb(page);
        Ok(())
    }

    fn has_more(&mut self, deadline: &Deadline) -> Result<bool> {
        loop {
            if !self.rows.is_empty() {
                return Ok(true);
            }
            let uri = match &self.next_uri {
                Some(uri) => uri.clone(),
                None => return Ok(false),
            };
            let request = self.transport.request(Method::GET, &uri);
            let page = self.send_page(request, Phase::Poll, deadline)?;
            self.absorb(page);
        }
    }

    fn fetch_one(&mut self, deadline: &Deadline) -> Result<String> {
        if !self.has_more(deadline)? {
            return Err(ExportError::FetchError(format!(
                "result stream of `{}` is exhausted",
                self.statement
            )));
        }
        match self.rows.pop_front() {
            Some(row) => decode_string_column(&row),
            None => Err(ExportError::FetchError("empty result page".to_string())),
        }
    }

    fn close(&mut self) -> Result<()> {
        self.rows.clear();
        if let Some(uri) = self.next_uri.take() {
            let query = self.query_id.as_deref().unwrap_or("<unknown>");
            match self
                .transport
                .request(Method::DELETE, &uri)
                .timeout(CANCEL_TIMEOUT)
                .send()
            {
                Ok(_) => debug!("Cancelled query {}", query),
                Err(e) => warn!("Failed to cancel query {}: {}", query, e),
            }
        }
        Ok(())
    }
}
