//! SQLite-backed catalog store
//!
//! Catalog YAML files are imported into four tables:
//! - `item`: every template and variant, with `variant_of` and flags
//! - `item_variant_attribute`: template axes (value NULL) and variant
//!   assignments (value set), keyed by (parent, attribute)
//! - `item_attribute_value`: global ordered value list per attribute
//! - `catalog_file`: content hash of each imported file for incremental sync

use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Transaction};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use walkdir::WalkDir;

use crate::core::error::StoreError;
use crate::core::identity::{AttributeName, AttributeValue, TemplateId, VariantId, VariantTriple};
use crate::store::document::CatalogDocument;
use crate::store::{CatalogStore, SyncStats};
use crate::yaml::parse_yaml;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS item (
    code TEXT PRIMARY KEY,
    variant_of TEXT,
    has_variants INTEGER NOT NULL DEFAULT 0,
    disabled INTEGER NOT NULL DEFAULT 0,
    source_file TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_item_variant_of ON item(variant_of);
CREATE INDEX IF NOT EXISTS idx_item_source ON item(source_file);

CREATE TABLE IF NOT EXISTS item_variant_attribute (
    parent TEXT NOT NULL,
    idx INTEGER NOT NULL,
    attribute TEXT NOT NULL,
    attribute_value TEXT,
    PRIMARY KEY (parent, attribute)
);
CREATE INDEX IF NOT EXISTS idx_iva_attribute_value
    ON item_variant_attribute(attribute, attribute_value);

CREATE TABLE IF NOT EXISTS item_attribute_value (
    attribute TEXT NOT NULL,
    idx INTEGER NOT NULL,
    attribute_value TEXT NOT NULL,
    source_file TEXT NOT NULL,
    PRIMARY KEY (attribute, attribute_value)
);

CREATE TABLE IF NOT EXISTS catalog_file (
    path TEXT PRIMARY KEY,
    sha256 TEXT NOT NULL,
    synced_at TEXT NOT NULL
);
"#;

/// Catalog store over a single SQLite connection
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a database file
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::with_connection(Connection::open(path)?)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Replace everything previously imported under `source` with `doc`
    ///
    /// Returns the templates whose data may have changed.
    pub fn import_document(
        &self,
        doc: &CatalogDocument,
        source: &str,
    ) -> Result<BTreeSet<TemplateId>, StoreError> {
        doc.validate(source)?;
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let mut touched = clear_source(&tx, source)?;
        touched.extend(insert_document(&tx, source, doc)?);
        tx.commit()?;
        Ok(touched)
    }

    /// Import every `*.yaml`/`*.yml` file under `dir`
    ///
    /// Unchanged files (same SHA-256) are skipped; rows of files that no
    /// longer exist are dropped. Rows of removed and changed files are all
    /// cleared before any new rows go in, so items and value lists may move
    /// between files. The whole sync is one transaction, so a malformed file
    /// leaves the store as it was.
    pub fn sync(&self, dir: &Path) -> Result<SyncStats, StoreError> {
        let mut stats = SyncStats::default();
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        let known: BTreeMap<String, String> = {
            let mut stmt = tx.prepare("SELECT path, sha256 FROM catalog_file")?;
            let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
            rows.collect::<Result<_, _>>()?
        };

        let mut seen = BTreeSet::new();
        let mut pending: Vec<(String, String, CatalogDocument)> = Vec::new();
        if dir.is_dir() {
            for entry in WalkDir::new(dir).sort_by_file_name() {
                let entry = entry?;
                let path = entry.path();
                if !entry.file_type().is_file() || !is_catalog_file(path) {
                    continue;
                }

                let source = path
                    .strip_prefix(dir)
                    .unwrap_or(path)
                    .to_string_lossy()
                    .replace('\\', "/");
                let content = std::fs::read_to_string(path)?;
                let hash = format!("{:x}", Sha256::digest(content.as_bytes()));
                seen.insert(source.clone());

                match known.get(&source) {
                    Some(previous) if *previous == hash => {
                        stats.files_unchanged += 1;
                        continue;
                    }
                    Some(_) => stats.files_updated += 1,
                    None => stats.files_added += 1,
                }

                let doc: CatalogDocument = parse_yaml(&content, &path.display().to_string())?;
                doc.validate(&source)?;
                pending.push((source, hash, doc));
            }
        }

        for source in known.keys().filter(|k| !seen.contains(*k)) {
            stats.templates_touched.extend(clear_source(&tx, source)?);
            tx.execute("DELETE FROM catalog_file WHERE path = ?1", [source])?;
            stats.files_removed += 1;
            tracing::debug!(file = %source, "removed catalog file");
        }
        for (source, _, _) in &pending {
            stats.templates_touched.extend(clear_source(&tx, source)?);
        }

        for (source, hash, doc) in &pending {
            stats.templates_touched.extend(insert_document(&tx, source, doc)?);
            tx.execute(
                "INSERT OR REPLACE INTO catalog_file (path, sha256, synced_at) VALUES (?1, ?2, ?3)",
                params![source, hash, Utc::now().to_rfc3339()],
            )?;
            tracing::debug!(file = %source, "imported catalog file");
        }

        tx.commit()?;

        if !stats.is_noop() {
            tracing::info!(
                added = stats.files_added,
                updated = stats.files_updated,
                removed = stats.files_removed,
                templates = stats.templates_touched.len(),
                "catalog synced"
            );
        }
        Ok(stats)
    }
}

fn is_catalog_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Drop the rows imported from `source`; returns the templates they touched
fn clear_source(tx: &Transaction<'_>, source: &str) -> Result<BTreeSet<TemplateId>, StoreError> {
    let mut touched = BTreeSet::new();

    {
        let mut stmt = tx.prepare(
            "SELECT code, variant_of, has_variants FROM item WHERE source_file = ?1",
        )?;
        let rows = stmt.query_map([source], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Option<TemplateId>>(1)?,
                row.get::<_, bool>(2)?,
            ))
        })?;
        for row in rows {
            let (code, variant_of, has_variants) = row?;
            if has_variants {
                touched.insert(TemplateId::new(code));
            } else if let Some(template) = variant_of {
                touched.insert(template);
            }
        }
    }

    tx.execute(
        "DELETE FROM item_variant_attribute WHERE parent IN (SELECT code FROM item WHERE source_file = ?1)",
        [source],
    )?;
    tx.execute("DELETE FROM item WHERE source_file = ?1", [source])?;
    tx.execute("DELETE FROM item_attribute_value WHERE source_file = ?1", [source])?;
    Ok(touched)
}

/// Insert the rows of `doc` under `source`
///
/// A global value list belongs to exactly one file; listing the same
/// attribute in a second file is rejected.
fn insert_document(
    tx: &Transaction<'_>,
    source: &str,
    doc: &CatalogDocument,
) -> Result<BTreeSet<TemplateId>, StoreError> {
    for list in &doc.attributes {
        let owner: Option<String> = tx
            .query_row(
                "SELECT source_file FROM item_attribute_value WHERE attribute = ?1 AND source_file <> ?2 LIMIT 1",
                params![list.name, source],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(owner) = owner {
            return Err(StoreError::InvalidCatalog {
                file: source.to_string(),
                message: format!("values of attribute {} are already listed in {}", list.name, owner),
            });
        }

        for (idx, value) in list.values.iter().enumerate() {
            tx.execute(
                "INSERT INTO item_attribute_value (attribute, idx, attribute_value, source_file) VALUES (?1, ?2, ?3, ?4)",
                params![list.name, idx as i64, value, source],
            )?;
        }
    }

    for template in &doc.templates {
        tx.execute(
            "INSERT INTO item (code, variant_of, has_variants, disabled, source_file) VALUES (?1, NULL, 1, 0, ?2)",
            params![template.code, source],
        )?;
        for (idx, attribute) in template.attributes.iter().enumerate() {
            tx.execute(
                "INSERT INTO item_variant_attribute (parent, idx, attribute, attribute_value) VALUES (?1, ?2, ?3, NULL)",
                params![template.code, idx as i64, attribute],
            )?;
        }
    }

    for variant in &doc.variants {
        tx.execute(
            "INSERT INTO item (code, variant_of, has_variants, disabled, source_file) VALUES (?1, ?2, 0, ?3, ?4)",
            params![variant.code, variant.variant_of, variant.disabled, source],
        )?;
        for (idx, (attribute, value)) in variant.attributes.iter().enumerate() {
            tx.execute(
                "INSERT INTO item_variant_attribute (parent, idx, attribute, attribute_value) VALUES (?1, ?2, ?3, ?4)",
                params![variant.code, idx as i64, attribute, value],
            )?;
        }
    }

    Ok(doc.touched_templates())
}

impl CatalogStore for SqliteStore {
    fn variant_attribute_assignments(
        &self,
        template: &TemplateId,
    ) -> Result<Vec<VariantTriple>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT v.parent, v.attribute, v.attribute_value
             FROM item_variant_attribute v
             JOIN item i ON i.code = v.parent
             WHERE i.variant_of = ?1
               AND i.disabled = 0
               AND v.attribute_value IS NOT NULL
             ORDER BY v.parent, v.idx",
        )?;
        let rows = stmt.query_map([template], |row| {
            Ok(VariantTriple {
                variant: row.get(0)?,
                attribute: row.get(1)?,
                value: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    fn attribute_definitions(
        &self,
        template: &TemplateId,
    ) -> Result<Vec<(AttributeName, u32)>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT v.attribute, v.idx
             FROM item_variant_attribute v
             JOIN item i ON i.code = v.parent
             WHERE v.parent = ?1 AND i.has_variants = 1
             ORDER BY v.idx",
        )?;
        let rows = stmt.query_map([template], |row| Ok((row.get(0)?, row.get(1)?)))?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    fn global_attribute_values(
        &self,
        attribute: &AttributeName,
    ) -> Result<Vec<AttributeValue>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT attribute_value FROM item_attribute_value
             WHERE attribute = ?1
             ORDER BY idx",
        )?;
        let rows = stmt.query_map([attribute], |row| row.get(0))?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    fn items_with_any_value(
        &self,
        attribute: &AttributeName,
        values: &[AttributeValue],
        template: Option<&TemplateId>,
    ) -> Result<BTreeSet<VariantId>, StoreError> {
        if values.is_empty() {
            return Ok(BTreeSet::new());
        }

        let placeholders = vec!["?"; values.len()].join(", ");
        let mut sql = format!(
            "SELECT DISTINCT v.parent
             FROM item_variant_attribute v
             JOIN item i ON i.code = v.parent
             WHERE v.attribute = ? AND v.attribute_value IN ({})",
            placeholders
        );
        if template.is_some() {
            sql.push_str(" AND i.variant_of = ?");
        }

        let mut bind: Vec<&str> = Vec::with_capacity(values.len() + 2);
        bind.push(attribute.as_str());
        bind.extend(values.iter().map(|v| v.as_str()));
        if let Some(template) = template {
            bind.push(template.as_str());
        }

        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(bind), |row| row.get(0))?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    fn templates(&self) -> Result<Vec<TemplateId>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt =
            conn.prepare_cached("SELECT code FROM item WHERE has_variants = 1 ORDER BY code")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        Ok(rows.collect::<Result<_, _>>()?)
    }
}
