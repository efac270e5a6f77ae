use crate::errors::{AppError, AppResult};
use crate::guides;
use crate::models::{AccessibilitySettings, AiQueryItem, EmergencyContact, EmergencyInstruction};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

const SCHEMA_SQL: &str = include_str!("schema.sql");

pub const CONTACTS_KEY: &str = "apoio_vital_contacts";
pub const GUIDES_KEY: &str = "apoio_vital_guides";
pub const AI_HISTORY_KEY: &str = "apoio_vital_ai_history";
pub const ACCESSIBILITY_KEY: &str = "apoio_vital_accessibility";
pub const ONBOARDED_KEY: &str = "apoio_vital_onboarded";

/// Durable key/value store holding one JSON document per logical collection.
/// Every mutation of an in-memory collection rewrites its whole document.
#[derive(Debug)]
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn new(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| AppError::Io(err.to_string()))?;
        }
        let conn = Connection::open(path).map_err(AppError::from)?;
        conn.execute_batch(SCHEMA_SQL).map_err(AppError::from)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Reads and parses the document stored under `key`. Absent or
    /// unparseable documents degrade to `None`; corruption is never fatal.
    pub fn load_document<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| AppError::Internal("database mutex poisoned".to_string()))?;
        let raw = conn
            .query_row(
                "SELECT value_json FROM documents WHERE key = ?1",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        match raw {
            Some(raw) => match serde_json::from_str::<T>(&raw) {
                Ok(value) => Ok(Some(value)),
                Err(error) => {
                    tracing::warn!(key, error = %error, "stored document is unreadable, falling back to default");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// Serializes `value` and writes it under `key`, replacing any prior
    /// content.
    pub fn save_document<T: Serialize>(&self, key: &str, value: &T) -> AppResult<()> {
        let value_json = serde_json::to_string(value)?;
        let conn = self
            .conn
            .lock()
            .map_err(|_| AppError::Internal("database mutex poisoned".to_string()))?;
        conn.execute(
            "INSERT INTO documents (key, value_json, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value_json = excluded.value_json, updated_at = excluded.updated_at",
            params![key, value_json, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn load_contacts(&self) -> AppResult<Vec<EmergencyContact>> {
        Ok(self.load_document(CONTACTS_KEY)?.unwrap_or_default())
    }

    pub fn save_contacts(&self, contacts: &[EmergencyContact]) -> AppResult<()> {
        self.save_document(CONTACTS_KEY, &contacts)
    }

    /// First run, and any run where the stored list is unreadable, yields the
    /// built-in seed catalog.
    pub fn load_guides(&self) -> AppResult<Vec<EmergencyInstruction>> {
        Ok(self
            .load_document(GUIDES_KEY)?
            .unwrap_or_else(guides::default_guides))
    }

    pub fn save_guides(&self, guides: &[EmergencyInstruction]) -> AppResult<()> {
        self.save_document(GUIDES_KEY, &guides)
    }

    pub fn load_ai_history(&self) -> AppResult<Vec<AiQueryItem>> {
        Ok(self.load_document(AI_HISTORY_KEY)?.unwrap_or_default())
    }

    pub fn save_ai_history(&self, items: &[AiQueryItem]) -> AppResult<()> {
        self.save_document(AI_HISTORY_KEY, &items)
    }

    pub fn load_accessibility(&self) -> AppResult<AccessibilitySettings> {
        Ok(self.load_document(ACCESSIBILITY_KEY)?.unwrap_or_default())
    }

    pub fn save_accessibility(&self, settings: &AccessibilitySettings) -> AppResult<()> {
        self.save_document(ACCESSIBILITY_KEY, settings)
    }

    pub fn load_onboarded(&self) -> AppResult<bool> {
        Ok(self.load_document(ONBOARDED_KEY)?.unwrap_or(false))
    }

    pub fn save_onboarded(&self, onboarded: bool) -> AppResult<()> {
        self.save_document(ONBOARDED_KEY, &onboarded)
    }
}
