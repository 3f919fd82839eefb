use anyhow::Result;
use std::collections::BTreeMap;
use tempfile::tempdir;

use summeval::generation::ModelVariant;
use summeval::metrics::{Metric, ScoreSet};
use summeval::storage::{Database, EvaluationRun};

fn scores(values: [f64; 4]) -> ScoreSet {
    Metric::ALL.into_iter().zip(values).collect()
}

#[test]
fn database_supports_run_history_workflow() -> Result<()> {
    let tmp = tempdir()?;
    let db_path = tmp.path().join("summeval.db");
    let db = Database::open_path(&db_path)?;

    let first = EvaluationRun::new("results.csv", 10, false).with_scores(BTreeMap::from([
        (ModelVariant::Base, scores([0.2334, 0.0760, 0.2015, 0.2015])),
        (ModelVariant::Full, scores([0.4216, 0.1804, 0.3384, 0.3384])),
        (ModelVariant::Adapter, scores([0.4081, 0.1633, 0.3251, 0.3249])),
    ]));
    db.insert_run(&first)?;

    let mut second = EvaluationRun::new("data/dialogsum (test)", 50, true);
    second.created_at = first.created_at + chrono::Duration::seconds(5);
    let second = second.with_scores(BTreeMap::from([(
        ModelVariant::Adapter,
        scores([0.40, 0.16, 0.32, 0.32]),
    )]));
    db.insert_run(&second)?;

    assert_eq!(db.count_runs()?, 2);

    let runs = db.list_runs(10)?;
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].id, second.id, "newest run should come first");
    assert!(runs[0].use_stemmer);
    assert_eq!(runs[1].scores.len(), 3);
    assert_eq!(
        runs[1].scores[&ModelVariant::Full].get(Metric::Rouge1),
        Some(0.4216)
    );

    let limited = db.list_runs(1)?;
    assert_eq!(limited.len(), 1);

    let found = db
        .find_run_by_prefix(&first.id[..6])?
        .expect("run should be found by prefix");
    assert_eq!(found.source, "results.csv");
    assert_eq!(found.scores, first.scores);

    Ok(())
}

#[test]
fn deleting_run_removes_its_scores() -> Result<()> {
    let tmp = tempdir()?;
    let db_path = tmp.path().join("summeval.db");
    let db = Database::open_path(&db_path)?;

    let run = EvaluationRun::new("results.csv", 1, false).with_scores(BTreeMap::from([(
        ModelVariant::Base,
        scores([1.0, 1.0, 1.0, 1.0]),
    )]));
    db.insert_run(&run)?;

    db.delete_run(&run.id)?;

    assert!(db.get_run(&run.id)?.is_none());
    assert_eq!(db.count_runs()?, 0);

    // Re-inserting the same id only works if the score rows went with the run.
    db.insert_run(&run)?;
    assert_eq!(db.get_run(&run.id)?.map(|r| r.scores), Some(run.scores.clone()));

    Ok(())
}

#[test]
fn reopening_database_keeps_runs() -> Result<()> {
    let tmp = tempdir()?;
    let db_path = tmp.path().join("summeval.db");

    let run = EvaluationRun::new("results.csv", 3, false);
    Database::open_path(&db_path)?.insert_run(&run)?;

    let reopened = Database::open_path(&db_path)?;
    assert_eq!(reopened.schema_version()?, 1);
    assert_eq!(reopened.get_run(&run.id)?.map(|r| r.example_count), Some(3));

    Ok(())
}
