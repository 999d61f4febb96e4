//! Database diagnostic: connectivity plus a row count per table.

use rolekeeper_db::Database;
use rolekeeper_db::postgres::{health_check, table_reports};
use serde::Serialize;

#[derive(Serialize)]
struct TableSummary {
    table: &'static str,
    rows: Option<i64>,
    error: Option<String>,
}

pub async fn execute(db: &Database, json: bool) -> anyhow::Result<()> {
    if !health_check(&db.pg).await {
        anyhow::bail!("database is unreachable");
    }

    let summaries: Vec<TableSummary> = table_reports(&db.pg)
        .await
        .into_iter()
        .map(|report| match report.rows {
            Ok(rows) => TableSummary {
                table: report.table,
                rows: Some(rows),
                error: None,
            },
            Err(e) => TableSummary {
                table: report.table,
                rows: None,
                error: Some(e.to_string()),
            },
        })
        .collect();

    if json {
        return crate::output::print_json(&summaries);
    }

    for summary in &summaries {
        match (&summary.rows, &summary.error) {
            (Some(rows), _) => println!("{:<28} {rows} row(s)", summary.table),
            (None, Some(error)) => println!("{:<28} unreadable: {error}", summary.table),
            (None, None) => println!("{:<28} unknown", summary.table),
        }
    }
    Ok(())
}
