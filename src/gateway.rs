use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::time::Duration;

use serde_json::Value;

use crate::mapping;
use crate::model::Period;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug)]
pub enum GatewayError {
    /// No bearer token was configured; the request was never sent.
    MissingToken,
    Unauthorized(String),
    Forbidden(String),
    Status(u16, String),
    Transport(Box<dyn std::error::Error + Send + Sync>),
    Decode(String),
}

impl GatewayError {
    /// Errors that retrying with the same credentials cannot fix.
    pub fn is_authentication(&self) -> bool {
        matches!(
            self,
            GatewayError::MissingToken | GatewayError::Unauthorized(_) | GatewayError::Forbidden(_)
        )
    }
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayError::MissingToken => write!(f, "No authentication token configured"),
            GatewayError::Unauthorized(body) => write!(f, "Unauthorized: {body}"),
            GatewayError::Forbidden(body) => write!(f, "Forbidden: {body}"),
            GatewayError::Status(code, body) => write!(f, "HTTP {code}: {body}"),
            GatewayError::Transport(e) => write!(f, "{e}"),
            GatewayError::Decode(msg) => write!(f, "Unexpected response: {msg}"),
        }
    }
}

impl std::error::Error for GatewayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GatewayError::Transport(e) => Some(&**e),
            _ => None,
        }
    }
}

/// Remote store for the periods of a planning.
pub trait PeriodGateway {
    fn fetch_periods(&self, planning_id: &str) -> Result<Vec<Period>, GatewayError>;

    /// Persist a new period. The returned period carries the backend id.
    fn create_period(&self, planning_id: &str, period: &Period) -> Result<Period, GatewayError>;

    fn delete_period(&self, planning_id: &str, period_id: &str) -> Result<(), GatewayError>;
}

/// Credentials handed to the HTTP gateway at construction time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    token: Option<String>,
}

impl AuthContext {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Self::new(Some(token.into()))
    }

    fn header(&self) -> Result<String, GatewayError> {
        self.token
            .as_deref()
            .map(|t| format!("Bearer {t}"))
            .ok_or(GatewayError::MissingToken)
    }
}

/// `PeriodGateway` over the planning REST API.
pub struct HttpGateway {
    base_url: String,
    auth: AuthContext,
    agent: ureq::Agent,
}

impl HttpGateway {
    pub fn new(base_url: &str, auth: AuthContext) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(DEFAULT_TIMEOUT).build();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
            agent,
        }
    }

    /// Ids are sent as single path segments, so reserved characters are escaped.
    fn collection_url(&self, planning_id: &str) -> String {
        format!(
            "{}/plannings/{}/periodos",
            self.base_url,
            urlencoding::encode(planning_id)
        )
    }

    fn period_url(&self, planning_id: &str, period_id: &str) -> String {
        format!(
            "{}/{}",
            self.collection_url(planning_id),
            urlencoding::encode(period_id)
        )
    }

    fn send(&self, req: ureq::Request, body: Option<Value>) -> Result<String, GatewayError> {
        let req = req
            .set("Authorization", &self.auth.header()?)
            .set("Accept", "application/json");
        let response = match body {
            Some(body) => req.send_json(body),
            None => req.call(),
        };
        match response {
            Ok(r) => r
                .into_string()
                .map_err(|e| GatewayError::Transport(Box::new(e))),
            Err(ureq::Error::Status(401, r)) => {
                Err(GatewayError::Unauthorized(r.into_string().unwrap_or_default()))
            }
            Err(ureq::Error::Status(403, r)) => {
                Err(GatewayError::Forbidden(r.into_string().unwrap_or_default()))
            }
            Err(ureq::Error::Status(code, r)) => {
                Err(GatewayError::Status(code, r.into_string().unwrap_or_default()))
            }
            Err(e) => Err(GatewayError::Transport(Box::new(e))),
        }
    }

    fn parse(body: &str) -> Result<Value, GatewayError> {
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(body).map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

impl PeriodGateway for HttpGateway {
    fn fetch_periods(&self, planning_id: &str) -> Result<Vec<Period>, GatewayError> {
        let url = self.collection_url(planning_id);
        log::debug!("GET {url}");
        let body = self.send(self.agent.get(&url), None)?;
        mapping::periods_from_response(&Self::parse(&body)?)
    }

    fn create_period(&self, planning_id: &str, period: &Period) -> Result<Period, GatewayError> {
        let url = self.collection_url(planning_id);
        log::debug!("POST {url}");
        let body = self.send(self.agent.post(&url), Some(mapping::create_body(period)))?;
        mapping::created_period_from_response(&Self::parse(&body)?, period)
    }

    fn delete_period(&self, planning_id: &str, period_id: &str) -> Result<(), GatewayError> {
        let url = self.period_url(planning_id, period_id);
        log::debug!("DELETE {url}");
        self.send(self.agent.delete(&url), None).map(|_| ())
    }
}

/// Gateway keeping periods in memory, for tests and offline runs.
///
/// `fail_next` makes the next call of any kind return a transport error.
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    plannings: RefCell<HashMap<String, Vec<Period>>>,
    next_id: Cell<u64>,
    fail_next: Cell<bool>,
    calls: RefCell<Vec<String>>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_periods(planning_id: &str, periods: Vec<Period>) -> Self {
        let gateway = Self::default();
        gateway
            .plannings
            .borrow_mut()
            .insert(planning_id.to_string(), periods);
        gateway
    }

    pub fn fail_next(&self) {
        self.fail_next.set(true);
    }

    /// Calls made so far, as `"METHOD planning[/period]"`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn stored(&self, planning_id: &str) -> Vec<Period> {
        self.plannings
            .borrow()
            .get(planning_id)
            .cloned()
            .unwrap_or_default()
    }

    fn record(&self, call: String) -> Result<(), GatewayError> {
        self.calls.borrow_mut().push(call);
        if self.fail_next.replace(false) {
            return Err(GatewayError::Transport("simulated network failure".into()));
        }
        Ok(())
    }
}

impl PeriodGateway for InMemoryGateway {
    fn fetch_periods(&self, planning_id: &str) -> Result<Vec<Period>, GatewayError> {
        self.record(format!("GET {planning_id}"))?;
        Ok(self.stored(planning_id))
    }

    fn create_period(&self, planning_id: &str, period: &Period) -> Result<Period, GatewayError> {
        self.record(format!("POST {planning_id}"))?;
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        let created = Period {
            id: Some(format!("mem-{id}")),
            ..period.clone()
        };
        self.plannings
            .borrow_mut()
            .entry(planning_id.to_string())
            .or_default()
            .push(created.clone());
        Ok(created)
    }

    fn delete_period(&self, planning_id: &str, period_id: &str) -> Result<(), GatewayError> {
        self.record(format!("DELETE {planning_id}/{period_id}"))?;
        let mut plannings = self.plannings.borrow_mut();
        let periods = plannings.entry(planning_id.to_string()).or_default();
        let before = periods.len();
        periods.retain(|p| p.id.as_deref() != Some(period_id));
        if periods.len() == before {
            return Err(GatewayError::Status(404, format!("period {period_id} not found")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn gateway(server: &MockServer) -> HttpGateway {
        HttpGateway::new(&server.base_url(), AuthContext::bearer("tok"))
    }

    #[test]
    fn fetch_sends_bearer_token_and_maps_fields() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET)
                .path("/plannings/plan1/periodos")
                .header("Authorization", "Bearer tok");
            then.status(200).json_body(json!({
                "periodos": [{ "_id": "p1", "nombre": "Base", "inicioSemana": 1, "finSemana": 3, "ejercicios": [] }]
            }));
        });

        let periods = gateway(&server).fetch_periods("plan1").unwrap();
        assert_eq!(periods.len(), 1);
        assert_eq!(periods[0].name, "Base");
        assert_eq!((periods[0].start, periods[0].end), (1, 3));

        m.assert();
    }

    #[test]
    fn missing_token_fails_before_request() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET).path("/plannings/plan1/periodos");
            then.status(200).json_body(json!({ "periodos": [] }));
        });

        let gw = HttpGateway::new(&server.base_url(), AuthContext::new(Some("  ".into())));
        let err = gw.fetch_periods("plan1").unwrap_err();
        assert!(matches!(err, GatewayError::MissingToken));
        assert!(err.is_authentication());

        m.assert_hits(0);
    }

    #[test]
    fn maps_401_to_unauthorized() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET).path("/plannings/plan1/periodos");
            then.status(401).body("token expired");
        });

        match gateway(&server).fetch_periods("plan1").unwrap_err() {
            GatewayError::Unauthorized(body) => assert_eq!(body, "token expired"),
            e => panic!("unexpected error: {e:?}"),
        }

        m.assert();
    }

    #[test]
    fn maps_403_to_forbidden() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(DELETE).path("/plannings/plan1/periodos/p9");
            then.status(403).body("not your plan");
        });

        match gateway(&server).delete_period("plan1", "p9").unwrap_err() {
            GatewayError::Forbidden(body) => assert_eq!(body, "not your plan"),
            e => panic!("unexpected error: {e:?}"),
        }

        m.assert();
    }

    #[test]
    fn other_status_codes_keep_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/plannings/plan1/periodos");
            then.status(500).body("boom");
        });

        let err = gateway(&server).fetch_periods("plan1").unwrap_err();
        assert!(matches!(err, GatewayError::Status(500, ref b) if b == "boom"));
        assert!(!err.is_authentication());
    }

    #[test]
    fn create_posts_local_field_names() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST)
                .path("/plannings/plan1/periodos")
                .json_body(json!({ "start": 2, "end": 5, "name": "Periodo 1", "exercises": [] }));
            then.status(201).json_body(json!({
                "periodo": { "_id": "new", "nombre": "Periodo 1", "inicioSemana": 2, "finSemana": 5 }
            }));
        });

        let period = Period {
            id: None,
            start: 2,
            end: 5,
            name: "Periodo 1".into(),
            exercises: Vec::new(),
        };
        let created = gateway(&server).create_period("plan1", &period).unwrap();
        assert_eq!(created.id.as_deref(), Some("new"));

        m.assert();
    }

    #[test]
    fn delete_accepts_empty_body() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(DELETE).path("/plannings/plan1/periodos/p1");
            then.status(204);
        });

        gateway(&server).delete_period("plan1", "p1").unwrap();

        m.assert();
    }

    #[test]
    fn ids_are_escaped_as_single_path_segments() {
        let server = MockServer::start();
        let wrong = server.mock(|when, then| {
            when.method(DELETE).path("/plannings/plan/2/periodos/p");
            then.status(204);
        });

        let gw = gateway(&server);
        assert_eq!(
            gw.period_url("plan/2", "p?1#1"),
            format!("{}/plannings/plan%2F2/periodos/p%3F1%231", server.base_url())
        );
        assert!(gw.collection_url("a b").ends_with("/plannings/a%20b/periodos"));
        let _ = gw.delete_period("plan/2", "p?1#1");

        wrong.assert_hits(0);
    }

    #[test]
    fn in_memory_gateway_assigns_ids_and_fails_on_demand() {
        let gw = InMemoryGateway::new();
        let period = Period {
            id: None,
            start: 1,
            end: 1,
            name: "P".into(),
            exercises: Vec::new(),
        };
        let created = gw.create_period("a", &period).unwrap();
        assert_eq!(created.id.as_deref(), Some("mem-1"));
        assert_eq!(gw.stored("a").len(), 1);

        gw.fail_next();
        assert!(gw.delete_period("a", "mem-1").is_err());
        gw.delete_period("a", "mem-1").unwrap();
        assert!(gw.stored("a").is_empty());
        assert_eq!(gw.calls().len(), 3);
    }
}
