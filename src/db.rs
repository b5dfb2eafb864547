use std::path::Path;

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension};

use crate::record::CaseRecord;

pub fn connect(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("failed to open database: {}", path.display()))?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS cases (
            id             INTEGER PRIMARY KEY,
            source         TEXT UNIQUE NOT NULL,
            title          TEXT NOT NULL,
            number         TEXT NOT NULL,
            decision_date  TEXT NOT NULL,
            tribunal_court TEXT NOT NULL,
            section_count  INTEGER NOT NULL,
            line_count     INTEGER NOT NULL,
            has_facts      BOOLEAN NOT NULL,
            record_json    TEXT NOT NULL,
            extracted_at   TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_cases_number ON cases(number);
        ",
    )?;
    Ok(())
}

// ── Archive ──

pub struct CaseRow {
    pub source: String,
    pub record: CaseRecord,
}

/// Upsert by source; re-ingesting a page keeps its id.
pub fn save_cases(conn: &Connection, rows: &[CaseRow]) -> Result<usize> {
    let extracted_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let tx = conn.unchecked_transaction()?;
    let mut count = 0;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO cases
             (source, title, number, decision_date, tribunal_court,
              section_count, line_count, has_facts, record_json, extracted_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(source) DO UPDATE SET
                title = excluded.title,
                number = excluded.number,
                decision_date = excluded.decision_date,
                tribunal_court = excluded.tribunal_court,
                section_count = excluded.section_count,
                line_count = excluded.line_count,
                has_facts = excluded.has_facts,
                record_json = excluded.record_json,
                extracted_at = excluded.extracted_at",
        )?;
        for r in rows {
            let c = &r.record;
            let json = serde_json::to_string(c)
                .with_context(|| format!("failed to serialize record for {}", r.source))?;
            count += stmt.execute(rusqlite::params![
                r.source,
                c.title,
                c.number,
                c.date,
                c.tribunal_court,
                c.body.len() as i64,
                c.line_count() as i64,
                !c.facts_text.is_empty(),
                json,
                extracted_at,
            ])?;
        }
    }
    tx.commit()?;
    Ok(count)
}

pub struct OverviewRow {
    pub id: i64,
    pub source: String,
    pub title: String,
    pub number: String,
    pub date: String,
    pub tribunal_court: String,
    pub section_count: i64,
    pub line_count: i64,
    pub has_facts: bool,
}

pub fn fetch_overview(conn: &Connection, limit: usize) -> Result<Vec<OverviewRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, source, title, number, decision_date, tribunal_court,
                section_count, line_count, has_facts
         FROM cases ORDER BY id LIMIT ?1",
    )?;
    let rows = stmt
        .query_map([limit as i64], |row| {
            Ok(OverviewRow {
                id: row.get(0)?,
                source: row.get(1)?,
                title: row.get(2)?,
                number: row.get(3)?,
                date: row.get(4)?,
                tribunal_court: row.get(5)?,
                section_count: row.get(6)?,
                line_count: row.get(7)?,
                has_facts: row.get(8)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn fetch_record(conn: &Connection, id: i64) -> Result<Option<CaseRecord>> {
    let json: Option<String> = conn
        .query_row("SELECT record_json FROM cases WHERE id = ?1", [id], |row| {
            row.get(0)
        })
        .optional()?;
    json.map(|j| {
        serde_json::from_str(&j).with_context(|| format!("corrupt record json for case {}", id))
    })
    .transpose()
}

pub struct Stats {
    pub total: i64,
    pub with_facts: i64,
    pub empty_body: i64,
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let stats = conn.query_row(
        "SELECT COUNT(*),
                COALESCE(SUM(has_facts), 0),
                COALESCE(SUM(section_count = 0), 0)
         FROM cases",
        [],
        |row| {
            Ok(Stats {
                total: row.get(0)?,
                with_facts: row.get(1)?,
                empty_body: row.get(2)?,
            })
        },
    )?;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::extract_case;

    fn memory() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    fn fixture_row() -> CaseRow {
        let html = std::fs::read_to_string("tests/fixtures/judgment.html").unwrap();
        CaseRow {
            source: "tests/fixtures/judgment.html".to_string(),
            record: extract_case(&html),
        }
    }

    #[test]
    fn save_and_fetch_round_trip() {
        let conn = memory();
        let row = fixture_row();
        assert_eq!(save_cases(&conn, std::slice::from_ref(&row)).unwrap(), 1);

        let overview = fetch_overview(&conn, 10).unwrap();
        assert_eq!(overview.len(), 1);
        assert_eq!(overview[0].number, "Civil Appeal No 68 of 2008");
        assert_eq!(overview[0].section_count, 4);
        assert!(overview[0].has_facts);

        let back = fetch_record(&conn, overview[0].id).unwrap().unwrap();
        assert_eq!(back, row.record);
        let keys: Vec<&str> = back.body.keys().map(String::as_str).collect();
        let expected: Vec<&str> = row.record.body.keys().map(String::as_str).collect();
        assert_eq!(keys, expected);
    }

    #[test]
    fn resave_keeps_id() {
        let conn = memory();
        save_cases(&conn, &[fixture_row()]).unwrap();
        let first = fetch_overview(&conn, 10).unwrap()[0].id;
        save_cases(&conn, &[fixture_row()]).unwrap();
        let rows = fetch_overview(&conn, 10).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, first);
    }

    #[test]
    fn empty_record_is_storable() {
        let conn = memory();
        let row = CaseRow {
            source: "empty.html".to_string(),
            record: CaseRecord::default(),
        };
        save_cases(&conn, &[row]).unwrap();
        let stats = get_stats(&conn).unwrap();
        assert_eq!(stats.total, 1);
        assert_eq!(stats.with_facts, 0);
        assert_eq!(stats.empty_body, 1);
    }

    #[test]
    fn unknown_id_is_none() {
        let conn = memory();
        assert!(fetch_record(&conn, 42).unwrap().is_none());
    }
}
