use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use crate::linker::{Link, PassReport};
use crate::matches::{BetexpRow, LotecaRow};

pub fn connect(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create database directory {:?}", parent))?;
    }
    let conn =
        Connection::open(path).with_context(|| format!("Failed to open database {:?}", path))?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn connect_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        -- Written by the Loteca scraper
        CREATE TABLE IF NOT EXISTS loteca_matches (
            id          TEXT PRIMARY KEY,
            roundno     INTEGER NOT NULL,
            gameno      INTEGER NOT NULL,
            date        TEXT,
            team_home   TEXT NOT NULL,
            team_away   TEXT NOT NULL,
            goals_home  INTEGER,
            goals_away  INTEGER
        );
        CREATE INDEX IF NOT EXISTS idx_loteca_round ON loteca_matches(roundno);

        -- Written by the BetExplorer scraper
        CREATE TABLE IF NOT EXISTS betexp_matches (
            id              TEXT PRIMARY KEY,
            league_category TEXT NOT NULL,
            league_name     TEXT NOT NULL,
            date            TEXT NOT NULL,
            team_home       TEXT NOT NULL,
            team_away       TEXT NOT NULL,
            score           TEXT NOT NULL DEFAULT '',
            score_modifier  TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS match_links (
            loteca_id   TEXT PRIMARY KEY REFERENCES loteca_matches(id),
            betexp_id   TEXT NOT NULL,
            pass_name   TEXT NOT NULL,
            run_id      TEXT NOT NULL,
            linked_at   TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_links_betexp ON match_links(betexp_id);

        CREATE TABLE IF NOT EXISTS pass_metrics (
            id          INTEGER PRIMARY KEY,
            run_id      TEXT NOT NULL,
            pass_name   TEXT NOT NULL,
            pool        INTEGER NOT NULL,
            linked      INTEGER NOT NULL,
            ambiguous   INTEGER NOT NULL,
            not_found   INTEGER NOT NULL,
            new_aliases INTEGER NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_pass_metrics_run ON pass_metrics(run_id);
        ",
    )?;
    Ok(())
}

pub fn insert_loteca_rows(conn: &Connection, rows: &[LotecaRow]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let mut count = 0;
    {
        let mut stmt = tx.prepare(
            "INSERT OR REPLACE INTO loteca_matches
             (id, roundno, gameno, date, team_home, team_away, goals_home, goals_away)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;
        for r in rows {
            count += stmt.execute(params![
                r.id,
                r.round,
                r.game,
                r.date,
                r.team_home,
                r.team_away,
                r.goals_home,
                r.goals_away,
            ])?;
        }
    }
    tx.commit()?;
    Ok(count)
}

pub fn insert_betexp_rows(conn: &Connection, rows: &[BetexpRow]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let mut count = 0;
    {
        let mut stmt = tx.prepare(
            "INSERT OR REPLACE INTO betexp_matches
             (id, league_category, league_name, date, team_home, team_away, score, score_modifier)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;
        for r in rows {
            count += stmt.execute(params![
                r.id,
                r.league_category,
                r.league_name,
                r.date,
                r.team_home,
                r.team_away,
                r.score,
                r.score_modifier,
            ])?;
        }
    }
    tx.commit()?;
    Ok(count)
}

/// Loteca rows from `start_round` on, played or not.
pub fn fetch_loteca(conn: &Connection, start_round: u32) -> Result<Vec<LotecaRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, roundno, gameno, date, team_home, team_away, goals_home, goals_away
         FROM loteca_matches WHERE roundno >= ?1 ORDER BY roundno, gameno",
    )?;
    let rows = stmt
        .query_map([start_round], |row| {
            Ok(LotecaRow {
                id: row.get(0)?,
                round: row.get(1)?,
                game: row.get(2)?,
                date: row.get(3)?,
                team_home: row.get(4)?,
                team_away: row.get(5)?,
                goals_home: row.get(6)?,
                goals_away: row.get(7)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn fetch_betexp(conn: &Connection) -> Result<Vec<BetexpRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, league_category, league_name, date, team_home, team_away, score, score_modifier
         FROM betexp_matches ORDER BY id",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(BetexpRow {
                id: row.get(0)?,
                league_category: row.get(1)?,
                league_name: row.get(2)?,
                date: row.get(3)?,
                team_home: row.get(4)?,
                team_away: row.get(5)?,
                score: row.get(6)?,
                score_modifier: row.get(7)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Replace the stored mapping with the one from `run_id`.
pub fn save_links(conn: &Connection, run_id: &str, links: &BTreeMap<String, Link>) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    tx.execute("DELETE FROM match_links", [])?;
    let mut count = 0;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO match_links (loteca_id, betexp_id, pass_name, run_id)
             VALUES (?1, ?2, ?3, ?4)",
        )?;
        for (loteca_id, link) in links {
            count += stmt.execute(params![loteca_id, link.betexp_id, link.pass, run_id])?;
        }
    }
    tx.commit()?;
    Ok(count)
}

pub fn insert_pass_metric(conn: &Connection, run_id: &str, metric: &PassReport) -> Result<()> {
    conn.execute(
        "INSERT INTO pass_metrics
         (run_id, pass_name, pool, linked, ambiguous, not_found, new_aliases)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            run_id,
            metric.name,
            metric.pool,
            metric.linked,
            metric.ambiguous,
            metric.not_found,
            metric.new_aliases,
        ],
    )?;
    Ok(())
}

pub struct Stats {
    pub loteca: usize,
    pub happened: usize,
    pub betexp: usize,
    pub linked: usize,
    pub last_run: Option<String>,
    /// (pass, links) for the links currently stored.
    pub per_pass: Vec<(String, usize)>,
}

pub fn get_stats(conn: &Connection, start_round: u32) -> Result<Stats> {
    let loteca: usize = conn.query_row(
        "SELECT COUNT(*) FROM loteca_matches WHERE roundno >= ?1",
        [start_round],
        |r| r.get(0),
    )?;
    let happened: usize = conn.query_row(
        "SELECT COUNT(*) FROM loteca_matches
         WHERE roundno >= ?1 AND date IS NOT NULL
           AND goals_home IS NOT NULL AND goals_away IS NOT NULL",
        [start_round],
        |r| r.get(0),
    )?;
    let betexp: usize = conn.query_row("SELECT COUNT(*) FROM betexp_matches", [], |r| r.get(0))?;
    let linked: usize = conn.query_row("SELECT COUNT(*) FROM match_links", [], |r| r.get(0))?;
    let last_run: Option<String> = conn
        .query_row(
            "SELECT run_id FROM pass_metrics ORDER BY id DESC LIMIT 1",
            [],
            |r| r.get(0),
        )
        .optional()?;

    let mut stmt = conn.prepare(
        "SELECT pass_name, COUNT(*) FROM match_links GROUP BY pass_name ORDER BY pass_name",
    )?;
    let per_pass = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Stats {
        loteca,
        happened,
        betexp,
        linked,
        last_run,
        per_pass,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetch_links(conn: &Connection) -> BTreeMap<String, String> {
        let mut stmt = conn.prepare("SELECT loteca_id, betexp_id FROM match_links").unwrap();
        let links = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .unwrap()
            .collect::<Result<BTreeMap<_, _>, _>>()
            .unwrap();
        links
    }

    fn loteca_row(id: &str, round: u32, played: bool) -> LotecaRow {
        LotecaRow {
            id: id.into(),
            round,
            game: 1,
            date: played.then(|| "2017-05-03".to_string()),
            team_home: "FLAMENGO/RJ".into(),
            team_away: "VASCO/RJ".into(),
            goals_home: played.then_some(2),
            goals_away: played.then_some(1),
        }
    }

    #[test]
    fn loteca_rows_respect_start_round() {
        let conn = connect_in_memory().unwrap();
        let rows = vec![
            loteca_row("1", 365, true),
            loteca_row("2", 366, true),
            loteca_row("3", 367, false),
        ];
        assert_eq!(insert_loteca_rows(&conn, &rows).unwrap(), 3);
        let fetched = fetch_loteca(&conn, 366).unwrap();
        assert_eq!(fetched, rows[1..].to_vec());
        assert!(!fetched[1].happened());
    }

    #[test]
    fn connect_reports_an_unusable_directory() {
        let blocker = std::env::temp_dir().join(format!("loteca-linker-{}-db-blocker", std::process::id()));
        std::fs::write(&blocker, "not a directory").unwrap();
        let err = connect(&blocker.join("loteca.sqlite")).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to create database directory"));
        std::fs::remove_file(&blocker).unwrap();
    }

    #[test]
    fn loteca_date_text_is_kept_verbatim() {
        let conn = connect_in_memory().unwrap();
        conn.execute(
            "INSERT INTO loteca_matches VALUES ('9', 400, 1, '03/05/2017', 'FLAMENGO/RJ', 'VASCO/RJ', 2, 1)",
            [],
        )
        .unwrap();
        let fetched = fetch_loteca(&conn, 366).unwrap();
        assert_eq!(fetched[0].date.as_deref(), Some("03/05/2017"));
        assert!(fetched[0].happened());
    }

    #[test]
    fn betexp_rows_roundtrip_as_text() {
        let conn = connect_in_memory().unwrap();
        let row = BetexpRow {
            id: "x1".into(),
            league_category: "brazil".into(),
            league_name: "Campeonato Carioca".into(),
            date: "03.05.2017".into(),
            team_home: "Flamengo".into(),
            team_away: "Vasco da Gama".into(),
            score: String::new(),
            score_modifier: "POSTP.".into(),
        };
        insert_betexp_rows(&conn, &[row.clone()]).unwrap();
        assert_eq!(fetch_betexp(&conn).unwrap(), vec![row]);
    }

    #[test]
    fn links_are_replaced_per_run() {
        let conn = connect_in_memory().unwrap();
        insert_loteca_rows(&conn, &[loteca_row("1", 400, true), loteca_row("2", 400, true)]).unwrap();

        let first = BTreeMap::from([
            ("1".to_string(), Link { betexp_id: "a".into(), pass: "a_rigid2_flex2" }),
            ("2".to_string(), Link { betexp_id: "b".into(), pass: "d_rigid0_flex2" }),
        ]);
        assert_eq!(save_links(&conn, "run-1", &first).unwrap(), 2);

        let second = BTreeMap::from([(
            "1".to_string(),
            Link { betexp_id: "c".into(), pass: "b_rigid1_flex2" },
        )]);
        save_links(&conn, "run-2", &second).unwrap();
        let stored = fetch_links(&conn);
        assert_eq!(stored.len(), 1);
        assert_eq!(stored["1"], "c");
    }

    #[test]
    fn stats_count_links_per_pass() {
        let conn = connect_in_memory().unwrap();
        insert_loteca_rows(
            &conn,
            &[loteca_row("1", 400, true), loteca_row("2", 400, true), loteca_row("3", 400, false)],
        )
        .unwrap();
        let links = BTreeMap::from([
            ("1".to_string(), Link { betexp_id: "a".into(), pass: "a_rigid2_flex2" }),
            ("2".to_string(), Link { betexp_id: "b".into(), pass: "a_rigid2_flex2" }),
        ]);
        save_links(&conn, "run-1", &links).unwrap();
        insert_pass_metric(
            &conn,
            "run-1",
            &PassReport { name: "a_rigid2_flex2".into(), pool: 2, linked: 2, ..PassReport::default() },
        )
        .unwrap();

        let s = get_stats(&conn, 366).unwrap();
        assert_eq!(s.loteca, 3);
        assert_eq!(s.happened, 2);
        assert_eq!(s.linked, 2);
        assert_eq!(s.last_run.as_deref(), Some("run-1"));
        assert_eq!(s.per_pass, vec![("a_rigid2_flex2".to_string(), 2)]);
    }
}
