mod common;

use common::{assert_success, run_summeval, TestEnv, RESULTS_CSV};

#[test]
fn summeval_help_shows_usage() {
    let output = run_summeval(&["--help"]);
    let (stdout, stderr) = assert_success(&output, "--help");

    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("Commands:"));
    assert!(stdout.contains("evaluate"));
    assert!(
        !stderr.contains("No config file found"),
        "--help should not log config fallback noise\nstderr:\n{}",
        stderr
    );
}

#[test]
fn summeval_version_shows_version() {
    let output = run_summeval(&["--version"]);
    let (stdout, _) = assert_success(&output, "--version");

    assert!(stdout.contains("summeval "));
}

#[test]
fn completions_bash_outputs_script() {
    let output = run_summeval(&["completions", "bash"]);
    let (stdout, _) = assert_success(&output, "completions bash");

    assert!(
        stdout.contains("summeval"),
        "expected completion output to reference command name\nstdout:\n{}",
        stdout
    );
}

#[test]
fn config_show_works() {
    let output = run_summeval(&["config", "show"]);
    let (stdout, _) = assert_success(&output, "config show");

    assert!(stdout.contains("[general]"));
    assert!(stdout.contains("data_dir"));
    assert!(stdout.contains("[scoring]"));
    assert!(stdout.contains("use_stemmer = false"));
    assert!(stdout.contains("[models.adapter]"));
}

#[test]
fn config_path_returns_valid_path() {
    let output = run_summeval(&["config", "path"]);
    let (stdout, _) = assert_success(&output, "config path");

    assert!(stdout.contains("config.toml"));
}

#[test]
fn config_init_refuses_to_overwrite_without_force() {
    let env = TestEnv::new();

    assert_success(&env.run(&["config", "init"]), "config init");
    assert!(env.config_path().exists());

    let output = env.run(&["config", "init"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--force"));

    assert_success(&env.run(&["config", "init", "--force"]), "config init --force");
}

#[test]
fn invalid_generation_config_is_rejected() {
    let env = TestEnv::new();
    env.write_config("[generation]\nmax_new_tokens = 200\ntemperature = 0.7\n");

    let output = env.run(&["config", "show"]);
    assert!(
        !output.status.success(),
        "unknown generation keys should fail\nstdout:\n{}",
        String::from_utf8_lossy(&output.stdout)
    );
    assert!(String::from_utf8_lossy(&output.stderr).contains("temperature"));
}

#[test]
fn history_works_with_empty_database() {
    let output = run_summeval(&["history"]);
    let (stdout, _) = assert_success(&output, "history");

    assert!(stdout.contains("No evaluation runs found"));
}

#[test]
fn view_reports_missing_run() {
    let output = run_summeval(&["view", "does-not-exist"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Run not found"),
        "expected missing run error, got:\n{}",
        stderr
    );
}

#[test]
fn prompt_wraps_dialogue_from_stdin() {
    let env = TestEnv::new();
    let dialogue = "#Person1#: Hi, how are you?\n#Person2#: Fine, thanks.\n";

    let output = env.run_with_stdin(&["prompt"], dialogue);
    let (stdout, _) = assert_success(&output, "prompt");

    assert_eq!(
        stdout,
        "Summarize the following conversation.\n\n#Person1#: Hi, how are you?\n#Person2#: Fine, thanks.\n\nSummary: \n"
    );
}

#[test]
fn prompt_reads_dialogue_file() {
    let env = TestEnv::new();
    env.write_file("dialogue.txt", "#Person1#: Shall we take the bus?");

    let output = env.run(&["prompt", "--file", "dialogue.txt"]);
    let (stdout, _) = assert_success(&output, "prompt --file");

    assert!(stdout.starts_with("Summarize the following conversation.\n\n#Person1#: Shall we take the bus?"));
    assert!(stdout.ends_with("Summary: \n"));
}

#[test]
fn score_reports_every_variant_and_records_history() {
    let env = TestEnv::new();
    env.write_file("results.csv", RESULTS_CSV);

    let output = env.run(&["score", "--input", "results.csv"]);
    let (stdout, _) = assert_success(&output, "score");

    assert!(stdout.contains("Scored 4 dialogues (0 excluded)"));
    assert!(stdout.contains("ORIGINAL MODEL"));
    assert!(stdout.contains("INSTRUCT MODEL"));
    assert!(stdout.contains("PEFT MODEL"));
    assert!(stdout.contains("rougeLsum"));
    assert!(stdout.contains("PEFT MODEL over ORIGINAL MODEL"));

    let output = env.run(&["history"]);
    let (stdout, _) = assert_success(&output, "history");
    assert!(stdout.contains("results.csv"));

    let run_id = stdout
        .lines()
        .find(|line| line.contains("results.csv"))
        .and_then(|line| line.split_whitespace().next())
        .expect("history row with run id")
        .to_string();

    let output = env.run(&["view", &run_id]);
    let (stdout, _) = assert_success(&output, "view");
    assert!(stdout.contains("Examples: 4"));
    assert!(stdout.contains("PEFT MODEL"));

    assert_success(&env.run(&["delete", &run_id]), "delete");
    let output = env.run(&["history"]);
    let (stdout, _) = assert_success(&output, "history after delete");
    assert!(stdout.contains("No evaluation runs found"));
}

#[test]
fn score_json_is_machine_readable() {
    let env = TestEnv::new();
    env.write_file("results.csv", RESULTS_CSV);

    let output = env.run(&["score", "--input", "results.csv", "--json", "--no-save"]);
    let (stdout, _) = assert_success(&output, "score --json");

    let report: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON report");
    assert_eq!(report["example_count"], 4);
    assert_eq!(report["excluded"], 0);

    let peft = report["scores"]["adapter"]["rouge1"].as_f64().unwrap();
    let original = report["scores"]["base"]["rouge1"].as_f64().unwrap();
    assert!(peft > original, "peft {} should beat original {}", peft, original);
    assert!((0.0..=1.0).contains(&peft));

    let comparisons = report["comparisons"].as_array().unwrap();
    assert_eq!(comparisons.len(), 3);

    let history = env.run(&["history"]);
    let (stdout, _) = assert_success(&history, "history");
    assert!(stdout.contains("No evaluation runs found"));
}

#[test]
fn score_excludes_rows_with_missing_summaries() {
    let env = TestEnv::new();
    env.write_file(
        "partial.csv",
        "human_baseline_summaries,original_model_summaries,peft_model_summaries\n\
         they meet,they meet,they meet\n\
         they part,,they part\n",
    );

    let output = env.run(&["score", "--input", "partial.csv", "--no-save", "--per-example"]);
    let (stdout, _) = assert_success(&output, "score partial");

    assert!(stdout.contains("Scored 1 dialogues (1 excluded)"));
    assert!(stdout.contains("PEFT MODEL per dialogue:"));
}

#[test]
fn compare_prints_percentage_point_deltas() {
    let env = TestEnv::new();
    env.write_file("results.csv", RESULTS_CSV);

    let output = env.run(&["compare", "--input", "results.csv"]);
    let (stdout, _) = assert_success(&output, "compare");

    assert!(stdout.contains("PEFT MODEL vs ORIGINAL MODEL over 4 dialogues"));
    assert!(stdout.contains("rouge1"));
    assert!(stdout.contains("+"));

    let output = env.run(&[
        "compare", "--input", "results.csv", "--a", "instruct", "--b", "instruct", "--json",
    ]);
    let (stdout, _) = assert_success(&output, "self compare");
    let comparison: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    for metric in ["rouge1", "rouge2", "rougeL", "rougeLsum"] {
        assert_eq!(comparison["deltas"][metric].as_f64(), Some(0.0));
    }
}

#[test]
fn compare_rejects_absent_columns() {
    let env = TestEnv::new();
    env.write_file(
        "base_only.csv",
        "human_baseline_summaries,original_model_summaries\nthey meet,they meet\n",
    );

    let output = env.run(&["compare", "--input", "base_only.csv"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("peft_model_summaries"));
}

#[test]
fn generate_fails_cleanly_without_dataset() {
    let env = TestEnv::new();

    let output = env.run(&["generate", "--dataset", "missing-dir"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("test.jsonl"));
}
