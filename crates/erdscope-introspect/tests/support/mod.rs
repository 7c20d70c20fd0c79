#![allow(dead_code)]

//! In-memory database doubles for extractor and orchestrator tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use erdscope_introspect::{CatalogConnection, CatalogRow, CatalogValue, Connector, DbError};

/// Build a row from anything convertible to catalog values.
macro_rules! row {
    ($($value:expr),* $(,)?) => {
        erdscope_introspect::CatalogRow::new(vec![$(erdscope_introspect::CatalogValue::from($value)),*])
    };
}

pub const NULL: CatalogValue = CatalogValue::Null;

#[derive(Debug, Clone)]
struct Rule {
    needle: String,
    params: Option<Vec<String>>,
    response: Result<Vec<CatalogRow>, DbError>,
}

/// Answers queries by matching SQL substrings (case-insensitive) in
/// registration order. Unmatched queries fail.
#[derive(Debug, Clone, Default)]
pub struct Script {
    rules: Vec<Rule>,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond to any query containing `needle`.
    pub fn on(mut self, needle: &str, rows: Vec<CatalogRow>) -> Self {
        self.rules.push(Rule {
            needle: needle.to_lowercase(),
            params: None,
            response: Ok(rows),
        });
        self
    }

    /// Respond to queries containing `needle` that were bound with exactly `params`.
    pub fn on_params(mut self, needle: &str, params: &[&str], rows: Vec<CatalogRow>) -> Self {
        self.rules.push(Rule {
            needle: needle.to_lowercase(),
            params: Some(params.iter().map(|param| param.to_string()).collect()),
            response: Ok(rows),
        });
        self
    }

    /// Fail any query containing `needle`.
    pub fn fail(mut self, needle: &str, message: &str) -> Self {
        self.rules.push(Rule {
            needle: needle.to_lowercase(),
            params: None,
            response: Err(DbError::Driver(message.to_string())),
        });
        self
    }

    /// Fail queries containing `needle` bound with exactly `params`.
    pub fn fail_params(mut self, needle: &str, params: &[&str], message: &str) -> Self {
        self.rules.push(Rule {
            needle: needle.to_lowercase(),
            params: Some(params.iter().map(|param| param.to_string()).collect()),
            response: Err(DbError::Driver(message.to_string())),
        });
        self
    }

    fn respond(&self, sql: &str, params: &[&str]) -> Result<Vec<CatalogRow>, DbError> {
        let sql = sql.to_lowercase();
        self.rules
            .iter()
            .find(|rule| {
                sql.contains(&rule.needle)
                    && rule
                        .params
                        .as_ref()
                        .is_none_or(|expected| expected.iter().map(String::as_str).eq(params.iter().copied()))
            })
            .map(|rule| rule.response.clone())
            .unwrap_or_else(|| Err(DbError::Driver(format!("unscripted query: {sql}"))))
    }
}

/// Every query a [`ScriptedConnection`] received, shared with the test.
#[derive(Debug, Clone, Default)]
pub struct QueryLog {
    queries: Arc<Mutex<Vec<(String, Vec<String>)>>>,
    closed: Arc<AtomicBool>,
}

impl QueryLog {
    pub fn count_matching(&self, needle: &str) -> usize {
        let needle = needle.to_lowercase();
        self.queries
            .lock()
            .unwrap()
            .iter()
            .filter(|(sql, _)| sql.to_lowercase().contains(&needle))
            .count()
    }

    pub fn params_for(&self, needle: &str) -> Vec<Vec<String>> {
        let needle = needle.to_lowercase();
        self.queries
            .lock()
            .unwrap()
            .iter()
            .filter(|(sql, _)| sql.to_lowercase().contains(&needle))
            .map(|(_, params)| params.clone())
            .collect()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ping {
    Ok,
    Fail,
    Hang,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Close {
    Ok,
    Hang,
}

#[derive(Debug)]
pub struct ScriptedConnection {
    script: Script,
    log: QueryLog,
    ping: Ping,
    close: Close,
}

impl ScriptedConnection {
    pub fn new(script: Script) -> (Self, QueryLog) {
        let log = QueryLog::default();
        (
            Self {
                script,
                log: log.clone(),
                ping: Ping::Ok,
                close: Close::Ok,
            },
            log,
        )
    }
}

#[async_trait]
impl CatalogConnection for ScriptedConnection {
    async fn ping(&mut self) -> Result<(), DbError> {
        match self.ping {
            Ping::Ok => Ok(()),
            Ping::Fail => Err(DbError::Driver("connection refused".to_string())),
            Ping::Hang => {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(())
            }
        }
    }

    async fn query(&mut self, sql: &str, params: &[&str]) -> Result<Vec<CatalogRow>, DbError> {
        self.log.queries.lock().unwrap().push((
            sql.to_string(),
            params.iter().map(|param| param.to_string()).collect(),
        ));
        self.script.respond(sql, params)
    }

    async fn close(self: Box<Self>) -> Result<(), DbError> {
        if self.close == Close::Hang {
            tokio::time::sleep(Duration::from_secs(60)).await;
        }
        self.log.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub enum Open {
    Ok,
    Fail(String),
    Hang,
}

/// Hands out [`ScriptedConnection`]s and records how often it was asked to.
#[derive(Debug)]
pub struct FakeConnector {
    script: Script,
    open: Open,
    ping: Ping,
    close: Close,
    opens: AtomicUsize,
    log: QueryLog,
    last_driver: Mutex<Option<String>>,
}

impl FakeConnector {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            open: Open::Ok,
            ping: Ping::Ok,
            close: Close::Ok,
            opens: AtomicUsize::new(0),
            log: QueryLog::default(),
            last_driver: Mutex::new(None),
        }
    }

    pub fn with_open(mut self, open: Open) -> Self {
        self.open = open;
        self
    }

    pub fn with_ping(mut self, ping: Ping) -> Self {
        self.ping = ping;
        self
    }

    pub fn with_close(mut self, close: Close) -> Self {
        self.close = close;
        self
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn log(&self) -> QueryLog {
        self.log.clone()
    }

    pub fn last_driver(&self) -> Option<String> {
        self.last_driver.lock().unwrap().clone()
    }
}

#[async_trait]
impl Connector for FakeConnector {
    async fn open(&self, driver: &str, _dsn: &str) -> Result<Box<dyn CatalogConnection>, DbError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        *self.last_driver.lock().unwrap() = Some(driver.to_string());
        match &self.open {
            Open::Ok => {}
            Open::Fail(message) => return Err(DbError::Driver(message.clone())),
            Open::Hang => {
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
        }
        Ok(Box::new(ScriptedConnection {
            script: self.script.clone(),
            log: self.log.clone(),
            ping: self.ping,
            close: self.close,
        }))
    }
}
