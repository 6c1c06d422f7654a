//! Database integration tests.

use super::*;
use crate::error::AppError;
use crate::id::IdIssuer;
use crate::models::paste::*;
use chrono::{Duration, Utc};
use std::collections::VecDeque;
use std::sync::{Arc, Barrier, Mutex};
use std::thread;
use tempfile::TempDir;

fn setup_test_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let db = Database::new(db_path.to_str().unwrap()).unwrap();
    (db, temp_dir)
}

fn setup_test_db_with_issuer(issuer: Arc<dyn IdIssuer>) -> (Database, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let db = Database::with_issuer(db_path.to_str().unwrap(), issuer).unwrap();
    (db, temp_dir)
}

/// Hands out a fixed script of ids, then repeats the last one forever.
struct ScriptedIssuer {
    ids: Mutex<VecDeque<String>>,
    last: Mutex<String>,
}

impl ScriptedIssuer {
    fn new(ids: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            ids: Mutex::new(ids.iter().map(|id| id.to_string()).collect()),
            last: Mutex::new(String::new()),
        })
    }
}

impl IdIssuer for ScriptedIssuer {
    fn issue(&self) -> String {
        let mut last = self.last.lock().unwrap();
        if let Some(next) = self.ids.lock().unwrap().pop_front() {
            *last = next;
        }
        last.clone()
    }
}

fn create_plain(db: &Database, content: &str, expiry: ExpiryMode) -> Paste {
    db.pastes
        .create(content.to_string(), "plain".to_string(), expiry)
        .expect("create paste")
}
