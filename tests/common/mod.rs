//! Shared test helpers: an in-memory connection factory that records inserted
//! rows and can be told to fail in each of the ways a real store fails.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use telemetry_gate::config::{Credentials, DbConfig, DbSettings};
use telemetry_gate::database::{ConnectionFactory, ConnectionGate, InsertStatement, TelemetryConnection};
use telemetry_gate::error::{DbError, DbResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Behavior {
    Healthy,
    DriverMissing,
    ConnectFails(String),
    HangOnConnect,
    /// Ping returns an error, i.e. validity cannot be confirmed.
    InvalidConnection,
    HangOnPing,
    WriteFails(String),
    /// Insert never completes, e.g. stuck behind a lock.
    HangOnExecute,
    PanicOnExecute,
}

#[derive(Debug, Default)]
pub struct FakeStore {
    pub rows: Mutex<Vec<InsertStatement>>,
    pub driver_loads: AtomicUsize,
    pub opened: AtomicUsize,
    pub closed: AtomicUsize,
}

impl FakeStore {
    pub fn rows(&self) -> Vec<InsertStatement> {
        self.rows.lock().clone()
    }

    pub fn driver_loads(&self) -> usize {
        self.driver_loads.load(Ordering::SeqCst)
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

pub struct FakeFactory {
    pub behavior: Behavior,
    pub store: Arc<FakeStore>,
    /// Artificial delay inside `load_driver`, to widen initialization races.
    pub load_delay: Duration,
}

impl FakeFactory {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            store: Arc::new(FakeStore::default()),
            load_delay: Duration::ZERO,
        }
    }
}

#[async_trait]
impl ConnectionFactory for FakeFactory {
    fn load_driver(&self, _url: Option<&str>) -> DbResult<()> {
        self.store.driver_loads.fetch_add(1, Ordering::SeqCst);
        if !self.load_delay.is_zero() {
            std::thread::sleep(self.load_delay);
        }
        match self.behavior {
            Behavior::DriverMissing => Err(DbError::DriverUnavailable("fake driver missing".into())),
            _ => Ok(()),
        }
    }

    async fn connect(&self, _credentials: Credentials<'_>) -> DbResult<Box<dyn TelemetryConnection>> {
        match &self.behavior {
            Behavior::ConnectFails(message) => Err(DbError::Connectivity(message.clone())),
            Behavior::HangOnConnect => {
                std::future::pending::<()>().await;
                unreachable!()
            }
            behavior => {
                self.store.opened.fetch_add(1, Ordering::SeqCst);
                Ok(Box::new(FakeConnection {
                    behavior: behavior.clone(),
                    store: self.store.clone(),
                }))
            }
        }
    }
}

#[derive(Debug)]
pub struct FakeConnection {
    behavior: Behavior,
    store: Arc<FakeStore>,
}

#[async_trait]
impl TelemetryConnection for FakeConnection {
    async fn ping(&mut self) -> DbResult<()> {
        match self.behavior {
            Behavior::InvalidConnection => Err(DbError::Connectivity("server closed the connection".into())),
            Behavior::HangOnPing => {
                std::future::pending::<()>().await;
                unreachable!()
            }
            _ => Ok(()),
        }
    }

    async fn execute(&mut self, statement: &InsertStatement) -> DbResult<u64> {
        match &self.behavior {
            Behavior::WriteFails(message) => Err(DbError::Write(message.clone())),
            Behavior::PanicOnExecute => panic!("fake store exploded"),
            Behavior::HangOnExecute => {
                std::future::pending::<()>().await;
                unreachable!()
            }
            _ => {
                self.store.rows.lock().push(statement.clone());
                Ok(1)
            }
        }
    }

    async fn close(self: Box<Self>) -> DbResult<()> {
        self.store.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub fn configured_vars() -> Vec<(&'static str, &'static str)> {
    vec![
        ("DB_URL", "postgres://telemetry.internal:5432/app"),
        ("DB_USER", "app"),
        ("DB_PASSWORD", "secret"),
    ]
}

/// Short timeouts so hang scenarios finish quickly. The write bound outlasts
/// the validity bound so a hung ping reports its own timeout.
pub fn fast_settings() -> DbSettings {
    DbSettings {
        validity_timeout: Duration::from_millis(50),
        connect_timeout: Duration::from_millis(50),
        write_timeout: Duration::from_millis(150),
    }
}

pub fn gate_with(
    behavior: Behavior,
    vars: Vec<(&'static str, &'static str)>,
) -> (Arc<ConnectionGate>, Arc<FakeStore>) {
    gate_with_factory(FakeFactory::new(behavior), vars)
}

pub fn gate_with_factory(
    factory: FakeFactory,
    vars: Vec<(&'static str, &'static str)>,
) -> (Arc<ConnectionGate>, Arc<FakeStore>) {
    let store = factory.store.clone();
    let gate = ConnectionGate::new(DbConfig::from_vars(vars), fast_settings(), Arc::new(factory));
    (Arc::new(gate), store)
}
