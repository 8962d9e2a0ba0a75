//! Child roster (`kidsInfo`)
//!
//! Reference data read by every screen. Children are keyed by name across
//! attendance and reports, so names must be unique. New children are stored
//! under their name as document id; older documents may carry generated ids.

use crate::domain::models::Child;
use crate::store::{Collection, DocumentStore, StoreError};
use serde::Deserialize;
use serde_json::json;
use std::io::Read;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RosterError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("A child named {0:?} is already on the roster")]
    Duplicate(String),

    #[error("CSV error: {0}")]
    Csv(String),
}

impl From<csv::Error> for RosterError {
    fn from(err: csv::Error) -> Self {
        RosterError::Csv(err.to_string())
    }
}

pub type RosterResult<T> = Result<T, RosterError>;

/// Input for adding a child
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct NewChild {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub email2: Option<String>,
}

impl NewChild {
    fn validated(self) -> RosterResult<Self> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(RosterError::Validation("Child name cannot be empty".to_string()));
        }
        let email = self.email.trim().to_string();
        if !looks_like_email(&email) {
            return Err(RosterError::Validation(format!("Invalid email: {:?}", email)));
        }
        let email2 = match self.email2.map(|e| e.trim().to_string()) {
            Some(e) if e.is_empty() => None,
            Some(e) if !looks_like_email(&e) => {
                return Err(RosterError::Validation(format!("Invalid email2: {:?}", e)))
            }
            other => other,
        };
        Ok(Self {
            name,
            email,
            email2,
        })
    }
}

fn looks_like_email(s: &str) -> bool {
    match s.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.'),
        None => false,
    }
}

/// Parse `name,email,email2` rows (header required, `email2` optional)
pub fn parse_roster_csv<R: Read>(reader: R) -> RosterResult<Vec<NewChild>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut children = Vec::new();
    for (line, row) in rdr.deserialize::<NewChild>().enumerate() {
        let child = row.map_err(|e| RosterError::Csv(format!("row {}: {}", line + 1, e)))?;
        children.push(child);
    }
    Ok(children)
}

/// Outcome of a roster import
#[derive(Debug, Default, Clone, PartialEq, serde::Serialize)]
pub struct ImportSummary {
    pub added: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
}

#[derive(Clone)]
pub struct RosterService {
    store: Arc<dyn DocumentStore>,
}

impl RosterService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// All children, sorted by name. Malformed documents are skipped.
    pub async fn list(&self) -> RosterResult<Vec<Child>> {
        let docs = self.store.list(Collection::KidsInfo).await?;
        let mut children: Vec<Child> = docs
            .into_iter()
            .filter_map(|doc| match doc.decode::<Child>() {
                Ok(mut child) => {
                    child.id = doc.id;
                    Some(child)
                }
                Err(e) => {
                    tracing::warn!(doc_id = %doc.id, error = %e, "Skipping malformed child document");
                    None
                }
            })
            .collect();
        children.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(children)
    }

    pub async fn find_by_name(&self, name: &str) -> RosterResult<Option<Child>> {
        Ok(self.list().await?.into_iter().find(|c| c.name == name))
    }

    pub async fn add(&self, child: NewChild) -> RosterResult<Child> {
        let child = child.validated()?;
        if self.find_by_name(&child.name).await?.is_some() {
            return Err(RosterError::Duplicate(child.name));
        }

        let mut body = json!({ "name": child.name, "email": child.email });
        if let Some(email2) = &child.email2 {
            body["email2"] = json!(email2);
        }

        let doc = self
            .store
            .create_unique(Collection::KidsInfo, &child.name, body)
            .await
            .map_err(|e| match e {
                StoreError::AlreadyExists { .. } => RosterError::Duplicate(child.name.clone()),
                other => RosterError::Store(other),
            })?;
        tracing::info!(child = %child.name, doc_id = %doc.id, "Added child to roster");

        Ok(Child {
            id: doc.id,
            name: child.name,
            email: child.email,
            email2: child.email2,
        })
    }

    /// Add every row of a roster CSV; duplicates are skipped, invalid rows reported
    pub async fn import_csv<R: Read>(&self, reader: R) -> RosterResult<ImportSummary> {
        let rows = parse_roster_csv(reader)?;
        let mut summary = ImportSummary::default();

        for row in rows {
            let name = row.name.clone();
            match self.add(row).await {
                Ok(_) => summary.added += 1,
                Err(RosterError::Duplicate(_)) => summary.skipped += 1,
                Err(RosterError::Validation(msg)) => summary.errors.push(format!("{}: {}", name, msg)),
                Err(e) => return Err(e),
            }
        }

        tracing::info!(
            added = summary.added,
            skipped = summary.skipped,
            failed = summary.errors.len(),
            "Roster import finished"
        );
        Ok(summary)
    }
}
