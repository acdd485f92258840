//! End-to-end tests driving the `hhsync` binary in flag mode.

use assert_cmd::Command;
use predicates::prelude::*;
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SCHEMA: &str = r"
CREATE TABLE clientes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    nome TEXT NOT NULL,
    email TEXT,
    telefone TEXT
);
CREATE TABLE chamados (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    cliente_id INTEGER,
    descricao TEXT NOT NULL,
    status TEXT
);
CREATE TABLE chamado_andamentos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    chamado_id INTEGER NOT NULL REFERENCES chamados(id),
    data_hora TEXT NOT NULL,
    texto TEXT NOT NULL
);
";

fn store(dir: &Path, seed: &str) -> PathBuf {
    let path = dir.join("database.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(SCHEMA).unwrap();
    conn.execute_batch(seed).unwrap();
    path
}

fn hhsync(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("hhsync").unwrap();
    cmd.current_dir(dir)
        .env_remove("HHSYNC_DB")
        .env("HHSYNC_EXPORT_DIR", dir.join("export"))
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn export_clients_prints_json_report() {
    let temp_dir = TempDir::new().unwrap();
    let db = store(
        temp_dir.path(),
        "INSERT INTO clientes (nome, email) VALUES ('Ana', 'ana@example.com');
         INSERT INTO clientes (nome) VALUES ('Bruno');",
    );
    let doc = temp_dir.path().join("out").join("clientes");

    hhsync(temp_dir.path())
        .arg("--db")
        .arg(&db)
        .arg("--export-clients")
        .arg(&doc)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""success":true"#))
        .stdout(predicate::str::contains(r#""exported":2"#));

    let xml = fs::read_to_string(doc.with_extension("xml")).unwrap();
    assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
    assert!(xml.contains("<nome>Bruno</nome>"));
    assert!(xml.contains("<email/>"));
}

#[test]
fn import_calls_links_entries_to_new_ids() {
    let temp_dir = TempDir::new().unwrap();
    let db = store(
        temp_dir.path(),
        "INSERT INTO chamados (descricao, status) VALUES ('existing', 'Aberto');",
    );
    let doc = temp_dir.path().join("calls.xml");
    fs::write(
        &doc,
        r"<?xml version='1.0' encoding='UTF-8'?>
<calls>
  <call>
    <id>1</id>
    <descricao>Printer jam</descricao>
    <status>Aberto</status>
    <andamentos>
      <andamento><data_hora>2024-01-01 09:00</data_hora><texto>Opened</texto></andamento>
      <andamento><data_hora>2024-01-01 10:00</data_hora><texto>Fixed</texto></andamento>
    </andamentos>
  </call>
  <call><status>Aberto</status></call>
</calls>",
    )
    .unwrap();

    hhsync(temp_dir.path())
        .arg("--db")
        .arg(&db)
        .arg("--import-calls")
        .arg(&doc)
        .arg("--json")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""imported":1"#))
        .stdout(predicate::str::contains(r#""skipped":1"#))
        .stdout(predicate::str::contains(r#""entries_imported":2"#));

    let conn = Connection::open(&db).unwrap();
    let linked: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM chamado_andamentos a JOIN chamados c ON c.id = a.chamado_id
             WHERE c.descricao = 'Printer jam'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(linked, 2);
}

#[test]
fn unknown_root_is_reported_not_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let db = store(temp_dir.path(), "");
    let doc = temp_dir.path().join("orders.xml");
    fs::write(&doc, "<pedidos><pedido><nome>x</nome></pedido></pedidos>").unwrap();

    hhsync(temp_dir.path())
        .arg("--db")
        .arg(&db)
        .arg("--import-clients")
        .arg(&doc)
        .assert()
        .code(0)
        .stdout(predicate::str::contains(r#""success":false"#))
        .stdout(predicate::str::contains("unsupported_root_tag"))
        .stdout(predicate::str::contains(r#""processed":0"#));
}

#[test]
fn missing_store_exits_with_no_store() {
    let temp_dir = TempDir::new().unwrap();

    hhsync(temp_dir.path())
        .arg("--db")
        .arg(temp_dir.path().join("nowhere.db"))
        .arg("--export-clients")
        .arg("clientes.xml")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("NO_STORE"));
}

#[test]
fn operation_flags_conflict() {
    let temp_dir = TempDir::new().unwrap();

    hhsync(temp_dir.path())
        .args(["--export-clients", "a.xml", "--export-calls", "b.xml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn store_found_in_working_directory() {
    let temp_dir = TempDir::new().unwrap();
    store(
        temp_dir.path(),
        "INSERT INTO chamados (descricao, status) VALUES ('a', 'Aberto');
         INSERT INTO chamados (descricao, status) VALUES ('b', 'Finalizado');",
    );

    hhsync(temp_dir.path())
        .args(["--export-calls", "finished", "--calls-status", "Finalizado"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""exported":1"#))
        .stdout(predicate::str::contains(r#""status_filter":"Finalizado""#));

    let xml = fs::read_to_string(temp_dir.path().join("finished.xml")).unwrap();
    assert!(xml.contains("<descricao>b</descricao>"));
    assert!(!xml.contains("<descricao>a</descricao>"));
}

#[test]
fn missing_explicit_store_never_falls_back() {
    let temp_dir = TempDir::new().unwrap();
    let fallback = store(temp_dir.path(), "");
    let doc = temp_dir.path().join("clientes.xml");
    fs::write(&doc, "<clientes><cliente><nome>Ana</nome></cliente></clientes>").unwrap();

    hhsync(temp_dir.path())
        .args(["--db", "typo-store.db", "--import-clients"])
        .arg(&doc)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("NO_STORE"))
        .stderr(predicate::str::contains("typo-store.db"));

    let conn = Connection::open(&fallback).unwrap();
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM clientes", [], |r| r.get(0))
        .unwrap();
    assert_eq!(rows, 0);
}

#[test]
fn status_filter_rejected_for_other_operations() {
    let temp_dir = TempDir::new().unwrap();
    store(temp_dir.path(), "");

    hhsync(temp_dir.path())
        .args(["--import-calls", "c.xml", "--calls-status", "Aberto"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--export-calls"));
}
