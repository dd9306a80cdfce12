use assert_cmd::Command;
use httpmock::prelude::*;
use predicates::str::contains;
use std::fs;
use tempfile::{tempdir, TempDir};

/// `mist` pointed at the mock server with a token and an empty config.
fn mist_cmd(server: &MockServer, tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("mist").expect("mist binary");
    cmd.env_clear()
        .arg("--uri")
        .arg(server.base_url())
        .arg("--token")
        .arg("test-key")
        .arg("--config")
        .arg(tmp.path().join("absent.toml"));
    cmd
}

fn backends_mock(server: &MockServer) -> httpmock::Mock<'_> {
    server.mock(|when, then| {
        when.method(GET)
            .path("/backends")
            .header("authorization", "Bearer test-key");
        then.status(200).json_body(serde_json::json!([
            {"id": "b1", "title": "ec2-eu", "enabled": true, "provider": "ec2_eu_west"}
        ]));
    })
}

#[test]
fn list_keys_with_no_keys_succeeds() {
    let server = MockServer::start();
    let tmp = tempdir().expect("tempdir");
    let list = server.mock(|when, then| {
        when.method(GET).path("/keys");
        then.status(200).json_body(serde_json::json!([]));
    });

    mist_cmd(&server, &tmp)
        .args(["list", "keys"])
        .assert()
        .success()
        .stdout(contains("No keys found"));
    list.assert();
}

#[test]
fn list_keys_pretty_renders_table() {
    let server = MockServer::start();
    let tmp = tempdir().expect("tempdir");
    server.mock(|when, then| {
        when.method(GET).path("/keys");
        then.status(200).json_body(serde_json::json!([
            {"id": "deploy", "isDefault": true},
            {"id": "ci", "isDefault": false}
        ]));
    });

    mist_cmd(&server, &tmp)
        .args(["ls", "keys", "--pretty"])
        .assert()
        .success()
        .stdout(contains("| Name   | Is Default |"))
        .stdout(contains("| deploy | true       |"));
}

#[test]
fn delete_key_without_name_is_usage_error() {
    let server = MockServer::start();
    let tmp = tempdir().expect("tempdir");

    mist_cmd(&server, &tmp)
        .args(["delete", "key"])
        .assert()
        .code(1)
        .stderr(contains("You have to provide key name"));
}

#[test]
fn delete_key_removes_it() {
    let server = MockServer::start();
    let tmp = tempdir().expect("tempdir");
    server.mock(|when, then| {
        when.method(GET).path("/keys");
        then.status(200)
            .json_body(serde_json::json!([{"id": "deploy", "isDefault": false}]));
    });
    let delete = server.mock(|when, then| {
        when.method(DELETE).path("/keys/deploy");
        then.status(200);
    });

    mist_cmd(&server, &tmp)
        .args(["rm", "key", "--name", "deploy"])
        .assert()
        .success()
        .stdout(contains("Deleted key deploy"));
    delete.assert();
}

#[test]
fn unknown_key_is_usage_error() {
    let server = MockServer::start();
    let tmp = tempdir().expect("tempdir");
    server.mock(|when, then| {
        when.method(GET).path("/keys");
        then.status(200).json_body(serde_json::json!([]));
    });

    mist_cmd(&server, &tmp)
        .args(["rename", "key", "--name", "ghost", "--new-name", "x"])
        .assert()
        .code(1)
        .stderr(contains("key not found: ghost"));
}

#[test]
fn add_tunnel_splits_cidrs() {
    let server = MockServer::start();
    let tmp = tempdir().expect("tempdir");
    let add = server.mock(|when, then| {
        when.method(POST).path("/tunnels").json_body(serde_json::json!({
            "name": "office",
            "cidrs": ["10.0.0.0/8", "192.168.0.0/16"],
            "client_addr": "203.0.113.7",
            "description": "hq link"
        }));
        then.status(200);
    });

    mist_cmd(&server, &tmp)
        .args([
            "add",
            "tunnel",
            "--name",
            "office",
            "--cidrs",
            "10.0.0.0/8, 192.168.0.0/16",
            "--client-addr",
            "203.0.113.7",
            "--description",
            "hq link",
        ])
        .assert()
        .success()
        .stdout(contains("Tunnel office to 10.0.0.0/8, 192.168.0.0/16 added successfully"));
    add.assert();
}

#[test]
fn list_tunnels_plain_has_no_header() {
    let server = MockServer::start();
    let tmp = tempdir().expect("tempdir");
    server.mock(|when, then| {
        when.method(GET).path("/tunnels");
        then.status(200).json_body(serde_json::json!([{
            "id": "t1", "name": "office", "cidrs": ["10.0.0.0/8"], "description": "hq"
        }]));
    });

    mist_cmd(&server, &tmp)
        .args(["list", "tunnels"])
        .assert()
        .success()
        .stdout("office  t1  10.0.0.0/8  hq\n");
}

#[test]
fn delete_missing_tunnel_fails_with_server_error() {
    let server = MockServer::start();
    let tmp = tempdir().expect("tempdir");
    server.mock(|when, then| {
        when.method(DELETE).path("/tunnels/nope");
        then.status(404).body("tunnel not found");
    });

    mist_cmd(&server, &tmp)
        .args(["delete", "tunnel", "--id", "nope"])
        .assert()
        .code(3)
        .stderr(contains("server returned 404"));
}

#[test]
fn rename_backend_by_title() {
    let server = MockServer::start();
    let tmp = tempdir().expect("tempdir");
    backends_mock(&server);
    let put = server.mock(|when, then| {
        when.method(PUT)
            .path("/backends/b1")
            .json_body(serde_json::json!({"new_name": "prod"}));
        then.status(200);
    });

    mist_cmd(&server, &tmp)
        .args(["rename", "backend", "--id", "ec2-eu", "--new-name", "prod"])
        .assert()
        .success()
        .stdout(contains("Renamed ec2-eu to prod"));
    put.assert();
}

#[test]
fn disable_backend_posts_new_state() {
    let server = MockServer::start();
    let tmp = tempdir().expect("tempdir");
    backends_mock(&server);
    let post = server.mock(|when, then| {
        when.method(POST)
            .path("/backends/b1")
            .json_body(serde_json::json!({"new_state": "0"}));
        then.status(200);
    });

    mist_cmd(&server, &tmp)
        .args(["disable", "backend", "--id", "b1"])
        .assert()
        .success()
        .stdout(contains("Disabled backend ec2-eu"));
    post.assert();
}

#[test]
fn list_machines_of_backend() {
    let server = MockServer::start();
    let tmp = tempdir().expect("tempdir");
    backends_mock(&server);
    server.mock(|when, then| {
        when.method(GET).path("/backends/b1/machines");
        then.status(200).json_body(serde_json::json!([
            {"id": "m-1", "name": "web", "state": "running"}
        ]));
    });

    mist_cmd(&server, &tmp)
        .args(["list", "machines", "--backend", "b1"])
        .assert()
        .success()
        .stdout("web  m-1  running\n");
}

#[test]
fn list_sizes_pretty_renders_table() {
    let server = MockServer::start();
    let tmp = tempdir().expect("tempdir");
    backends_mock(&server);
    server.mock(|when, then| {
        when.method(GET).path("/backends/b1/sizes");
        then.status(200)
            .json_body(serde_json::json!([{"id": "t2.micro", "name": "Micro"}]));
    });

    mist_cmd(&server, &tmp)
        .args(["list", "sizes", "--backend", "b1", "--pretty"])
        .assert()
        .success()
        .stdout(contains("| ID       | NAME  |"))
        .stdout(contains("| t2.micro | Micro |"));
}

#[test]
fn add_key_from_file_strips_surrounding_newlines() {
    let server = MockServer::start();
    let tmp = tempdir().expect("tempdir");
    let key_file = tmp.path().join("id_rsa");
    fs::write(&key_file, "\n-----BEGIN KEY-----\nabc\n-----END KEY-----\n\n")
        .expect("write key");
    let add = server.mock(|when, then| {
        when.method(PUT).path("/keys").json_body(serde_json::json!({
            "id": "ci",
            "priv": "-----BEGIN KEY-----\nabc\n-----END KEY-----"
        }));
        then.status(200);
    });

    mist_cmd(&server, &tmp)
        .args(["add", "key", "--name", "ci", "--key"])
        .arg(&key_file)
        .assert()
        .success()
        .stdout(contains("Added key ci"));
    add.assert();
}

#[test]
fn stop_machine_posts_action() {
    let server = MockServer::start();
    let tmp = tempdir().expect("tempdir");
    backends_mock(&server);
    let list = server.mock(|when, then| {
        when.method(GET).path("/backends/b1/machines");
        then.status(200)
            .json_body(serde_json::json!([{"id": "m-1", "name": "web", "state": "running"}]));
    });
    let stop = server.mock(|when, then| {
        when.method(POST)
            .path("/backends/b1/machines/m-1")
            .json_body(serde_json::json!({"action": "stop"}));
        then.status(200);
    });

    mist_cmd(&server, &tmp)
        .args(["stop", "machine", "--backend", "ec2-eu", "--name", "web"])
        .assert()
        .success()
        .stdout(contains("Machine web: stop requested"));
    stop.assert();
    assert_eq!(list.hits(), 2);
}

#[test]
fn login_with_email_and_password() {
    let server = MockServer::start();
    let tmp = tempdir().expect("tempdir");
    let login = server.mock(|when, then| {
        when.method(POST)
            .path("/auth")
            .json_body(serde_json::json!({"email": "ops@example.com", "password": "hunter2"}));
        then.status(200)
            .json_body(serde_json::json!({"mist_api_token": "test-key"}));
    });
    let list = backends_mock(&server);

    Command::cargo_bin("mist")
        .expect("mist binary")
        .env_clear()
        .args(["--uri", server.base_url().as_str()])
        .args(["--email", "ops@example.com", "--password", "hunter2"])
        .arg("--config")
        .arg(tmp.path().join("absent.toml"))
        .args(["list", "backends"])
        .assert()
        .success()
        .stdout(contains("ec2-eu"));
    login.assert();
    list.assert();
}

#[test]
fn failed_login_exits_with_auth_code() {
    let server = MockServer::start();
    let tmp = tempdir().expect("tempdir");
    server.mock(|when, then| {
        when.method(POST).path("/auth");
        then.status(401).body("bad credentials");
    });

    Command::cargo_bin("mist")
        .expect("mist binary")
        .env_clear()
        .args(["--uri", server.base_url().as_str(), "--email", "a@b.c", "--password", "x"])
        .arg("--config")
        .arg(tmp.path().join("absent.toml"))
        .args(["list", "keys"])
        .assert()
        .code(4)
        .stderr(contains("authentication failed"));
}

#[test]
fn config_file_supplies_uri_token_and_scheme() {
    let server = MockServer::start();
    let tmp = tempdir().expect("tempdir");
    let cfg = tmp.path().join("mist.toml");
    fs::write(
        &cfg,
        format!(
            "mist_uri = \"{}\"\napi_token = \"from-file\"\nauth_scheme = \"query:api_token\"\n",
            server.base_url()
        ),
    )
    .expect("write config");
    let list = server.mock(|when, then| {
        when.method(GET)
            .path("/tunnels")
            .query_param("api_token", "from-file");
        then.status(200).json_body(serde_json::json!([]));
    });

    Command::cargo_bin("mist")
        .expect("mist binary")
        .env_clear()
        .arg("--config")
        .arg(&cfg)
        .args(["list", "tunnels"])
        .assert()
        .success()
        .stdout(contains("No VPN tunnels found"));
    list.assert();
}

#[test]
fn unknown_verb_exits_with_one() {
    let server = MockServer::start();
    let tmp = tempdir().expect("tempdir");

    mist_cmd(&server, &tmp)
        .args(["explode", "backend"])
        .assert()
        .code(1);
}

#[test]
fn help_exits_cleanly() {
    Command::cargo_bin("mist")
        .expect("mist binary")
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("Usage"));
}
