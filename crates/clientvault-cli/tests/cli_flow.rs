use std::path::PathBuf;
use std::process::{Command, Output};

use tempfile::TempDir;

const PASSPHRASE: &str = "Correct-Horse-1!";

fn bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_clientvault"))
}

struct Env {
    _dir: TempDir,
    config_home: PathBuf,
    data_home: PathBuf,
}

impl Env {
    fn new() -> Self {
        let dir = TempDir::new().expect("temp dir");
        let config_home = dir.path().join("c");
        let data_home = dir.path().join("d");
        std::fs::create_dir_all(&config_home).expect("create config dir");
        std::fs::create_dir_all(&data_home).expect("create data dir");
        Self {
            _dir: dir,
            config_home,
            data_home,
        }
    }

    fn store_path(&self) -> PathBuf {
        self.data_home.join("clientvault").join("vault.db")
    }

    fn config_path(&self) -> PathBuf {
        self.config_home.join("clientvault").join("config.toml")
    }

    fn command(&self, passphrase: Option<&str>) -> Command {
        let mut cmd = Command::new(bin());
        cmd.env("XDG_CONFIG_HOME", &self.config_home)
            .env("XDG_DATA_HOME", &self.data_home)
            .env("HOME", self.config_home.parent().expect("temp root"))
            .env_remove("CLIENTVAULT_STORE")
            .env_remove("CLIENTVAULT_USER")
            .env_remove("CLIENTVAULT_CONFIG")
            .env_remove("CLIENTVAULT_LOG");
        match passphrase {
            Some(value) => cmd.env("CLIENTVAULT_PASSPHRASE", value),
            None => cmd.env_remove("CLIENTVAULT_PASSPHRASE"),
        };
        cmd
    }

    fn run(&self, passphrase: Option<&str>, args: &[&str]) -> Output {
        self.command(passphrase)
            .args(args)
            .output()
            .expect("run clientvault")
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "expected success, got {:?}\nstdout: {}\nstderr: {}",
        output.status.code(),
        stdout(output),
        stderr(output)
    );
}

fn json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

fn init_and_setup(env: &Env) {
    assert_success(&env.run(None, &["init", "--user", "user_1"]));
    assert_success(&env.run(Some(PASSPHRASE), &["setup"]));
}

#[test]
fn test_init_writes_config_and_store() {
    let env = Env::new();
    let output = env.run(None, &["init", "--user", "user_1"]);
    assert_success(&output);

    assert!(env.store_path().exists());
    let config = std::fs::read_to_string(env.config_path()).expect("config written");
    assert!(config.contains("user_1"));
    assert!(config.contains("vault.db"));

    let again = env.run(None, &["init"]);
    assert_eq!(again.status.code(), Some(6));
}

#[test]
fn test_commands_before_init_report_not_found() {
    let env = Env::new();
    let output = env.run(Some(PASSPHRASE), &["status"]);
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("clientvault init"));
}

#[test]
fn test_key_setup_lifecycle() {
    let env = Env::new();
    assert_success(&env.run(None, &["init", "--user", "user_1"]));

    let status = env.run(None, &["status", "--json"]);
    assert_success(&status);
    assert_eq!(json(&status)["state"], "no_key_set");

    let unlock = env.run(Some(PASSPHRASE), &["unlock"]);
    assert_eq!(unlock.status.code(), Some(3));

    let weak = env.run(Some("password"), &["setup"]);
    assert_eq!(weak.status.code(), Some(4));
    assert!(stderr(&weak).contains("Passphrase does not meet requirements"));

    assert_success(&env.run(Some(PASSPHRASE), &["setup"]));

    let again = env.run(Some("Other-Horse-2@"), &["setup"]);
    assert_eq!(again.status.code(), Some(6));

    let status = env.run(None, &["status", "--json"]);
    assert_success(&status);
    let value = json(&status);
    assert_eq!(value["state"], "key_set_locked");
    assert_eq!(value["has_encryption_key"], true);
    assert_eq!(value["records"]["client"], 0);

    assert_success(&env.run(Some(PASSPHRASE), &["unlock"]));
    let wrong = env.run(Some("Wrong-Horse-1!"), &["unlock"]);
    assert_eq!(wrong.status.code(), Some(5));

    let metadata = env.run(None, &["metadata"]);
    assert_success(&metadata);
    let value = json(&metadata);
    assert!(value["encryption_key_salt"].is_string());
    assert!(value["encryption_test_iv"].is_string());
    assert!(value["encrypted_test_data"].is_string());
}

#[test]
fn test_record_flow() {
    let env = Env::new();
    init_and_setup(&env);

    let add = env.run(
        Some(PASSPHRASE),
        &[
            "add",
            "client",
            "--data",
            r#"{"email":"ada@example.com","first_name":"Ada","priority":"High"}"#,
        ],
    );
    assert_success(&add);

    let invalid = env.run(
        Some(PASSPHRASE),
        &["add", "client", "--data", r#"{"email":"nope"}"#],
    );
    assert_eq!(invalid.status.code(), Some(4));

    let not_json = env.run(Some(PASSPHRASE), &["add", "client", "--data", "{email"]);
    assert_eq!(not_json.status.code(), Some(4));

    let unknown_kind = env.run(Some(PASSPHRASE), &["add", "invoice", "--data", "{}"]);
    assert_eq!(unknown_kind.status.code(), Some(4));

    let list = env.run(Some(PASSPHRASE), &["list", "--json"]);
    assert_success(&list);
    let records = json(&list);
    let records = records.as_array().expect("array");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["kind"], "client");
    assert_eq!(records[0]["decrypted_data"]["email"], "ada@example.com");
    let id = records[0]["id"].as_str().expect("id").to_string();

    let table = env.run(Some(PASSPHRASE), &["list", "client"]);
    assert_success(&table);
    assert!(stdout(&table).contains("Ada <ada@example.com>"));

    let wrong = env.run(Some("Wrong-Horse-1!"), &["list"]);
    assert_eq!(wrong.status.code(), Some(5));

    let edit = env.run(
        Some(PASSPHRASE),
        &["edit", &id, "--data", r#"{"email":"ada@engines.example"}"#],
    );
    assert_success(&edit);

    let show = env.run(Some(PASSPHRASE), &["show", &id, "--json"]);
    assert_success(&show);
    assert_eq!(json(&show)["decrypted_data"]["email"], "ada@engines.example");

    let missing = env.run(
        Some(PASSPHRASE),
        &["show", "00000000-0000-0000-0000-000000000000"],
    );
    assert_eq!(missing.status.code(), Some(3));

    let bad_id = env.run(Some(PASSPHRASE), &["show", "not-a-uuid"]);
    assert_eq!(bad_id.status.code(), Some(4));

    let status = env.run(None, &["status", "--json"]);
    assert_eq!(json(&status)["records"]["client"], 1);

    assert_success(&env.run(Some(PASSPHRASE), &["delete", &id]));
    let list = env.run(Some(PASSPHRASE), &["list", "--json"]);
    assert_success(&list);
    assert_eq!(json(&list), serde_json::json!([]));

    let again = env.run(Some(PASSPHRASE), &["delete", &id]);
    assert_eq!(again.status.code(), Some(3));
}

#[test]
fn test_store_never_contains_plaintext() {
    let env = Env::new();
    init_and_setup(&env);

    assert_success(&env.run(
        Some(PASSPHRASE),
        &[
            "add",
            "strategy",
            "--data",
            r#"{"name":"Whisper campaign","details":"very secret plan"}"#,
        ],
    ));

    let bytes = std::fs::read(env.store_path()).expect("read store");
    let contents = String::from_utf8_lossy(&bytes);
    assert!(!contents.contains("very secret plan"));
    assert!(!contents.contains(PASSPHRASE));
}

#[test]
fn test_users_are_isolated() {
    let env = Env::new();
    init_and_setup(&env);
    assert_success(&env.run(
        Some(PASSPHRASE),
        &["add", "pitch_deck", "--data", r#"{"title":"Seed round"}"#],
    ));

    let other = |args: &[&str], passphrase: Option<&str>| {
        let mut full = vec!["--user", "user_2"];
        full.extend_from_slice(args);
        env.run(passphrase, &full)
    };

    let status = other(&["status", "--json"], None);
    assert_success(&status);
    assert_eq!(json(&status)["state"], "no_key_set");
    assert_eq!(json(&status)["records"]["pitch_deck"], 0);

    assert_success(&other(&["setup"], Some("Second-User-9#")));
    let list = other(&["list", "--json"], Some("Second-User-9#"));
    assert_success(&list);
    assert_eq!(json(&list), serde_json::json!([]));

    let wrong_key = other(&["list"], Some(PASSPHRASE));
    assert_eq!(wrong_key.status.code(), Some(5));
}

#[test]
fn test_completions_generate() {
    let env = Env::new();
    let output = env.run(None, &["completions", "bash"]);
    assert_success(&output);
    assert!(stdout(&output).contains("clientvault"));
}
