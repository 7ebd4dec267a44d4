use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

const MULTI_ROUTER: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/routes.yaml");
const SINGLE_ROUTER: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/single.json");

fn apigw_cmd() -> Command {
    let mut cmd = Command::cargo_bin("apigw-openapi").unwrap();
    cmd.env("NO_COLOR", "1")
        .env_remove("OPENAPI_VERSION")
        .env_remove("CORS_ORIGINS")
        .env_remove("RUST_LOG");
    cmd
}

fn stdout_json(cmd: &mut Command) -> Value {
    let output = cmd.output().expect("Failed to execute");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

mod export {
    use super::*;

    #[test]
    fn public_document_on_stdout() {
        apigw_cmd()
            .args(["export", SINGLE_ROUTER])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"/health\""))
            .stdout(predicate::str::contains("x-amazon-apigateway-").not())
            .stderr(predicate::str::contains("Export complete"));
    }

    #[test]
    fn info_comes_from_flags() {
        let doc = stdout_json(apigw_cmd().args([
            "export",
            SINGLE_ROUTER,
            "--title",
            "Jobs API",
            "-V",
            "1.4.0",
        ]));

        assert_eq!(doc["openapi"], "3.0.1");
        assert_eq!(doc["info"]["title"], "Jobs API");
        assert_eq!(doc["info"]["version"], "1.4.0");
    }

    #[test]
    fn openapi_version_from_env() {
        let doc = stdout_json(
            apigw_cmd()
                .env("OPENAPI_VERSION", "3.0.3")
                .args(["export", SINGLE_ROUTER]),
        );

        assert_eq!(doc["openapi"], "3.0.3");
    }

    #[test]
    fn cors_enabled_by_default() {
        let doc = stdout_json(apigw_cmd().args(["export", SINGLE_ROUTER]));

        let options = &doc["paths"]["/jobs/{job_id}"]["options"];
        assert_eq!(options["tags"][0], "ops");
        assert_eq!(options["tags"][1], "CORS");
        let headers = &doc["paths"]["/health"]["get"]["responses"]["200"]["headers"];
        assert_eq!(headers["Access-Control-Allow-Origin"]["example"], "*");
    }

    #[test]
    fn cors_origins_from_env() {
        let doc = stdout_json(
            apigw_cmd()
                .env("CORS_ORIGINS", "https://a.example.com, https://b.example.com")
                .args(["export", SINGLE_ROUTER]),
        );

        let headers = &doc["paths"]["/health"]["get"]["responses"]["200"]["headers"];
        assert_eq!(
            headers["Access-Control-Allow-Origin"]["example"],
            "https://a.example.com,https://b.example.com"
        );
    }

    #[test]
    fn no_cors_flag() {
        let doc = stdout_json(apigw_cmd().args(["export", SINGLE_ROUTER, "--no-cors"]));

        for item in doc["paths"].as_object().unwrap().values() {
            assert!(item.get("options").is_none());
        }
        assert!(doc["paths"]["/health"]["get"]["responses"]["200"]
            .get("headers")
            .is_none());
    }

    #[test]
    fn private_and_public_files() {
        let dir = TempDir::new().unwrap();
        let private_path = dir.path().join("out/private.json");
        let public_path = dir.path().join("out/public.json");

        apigw_cmd()
            .args(["export", MULTI_ROUTER, "--router", "users", "--out-private"])
            .arg(&private_path)
            .arg("--out-public")
            .arg(&public_path)
            .assert()
            .success()
            .stdout(predicate::str::is_empty());

        let private: Value = serde_json::from_str(&fs::read_to_string(&private_path).unwrap()).unwrap();
        let public: Value = serde_json::from_str(&fs::read_to_string(&public_path).unwrap()).unwrap();

        let get_user = &private["paths"]["/users/{user_id}"]["get"];
        assert_eq!(get_user["x-amazon-apigateway-integration"]["type"], "aws_proxy");
        assert_eq!(get_user["security"][0]["UserPool"], serde_json::json!([]));
        assert_eq!(
            private["components"]["securitySchemes"]["UserPool"]["x-amazon-apigateway-authtype"],
            "cognito_user_pools"
        );

        let avatar = &private["paths"]["/users/{user_id}/avatar"]["get"];
        assert!(avatar["x-amazon-apigateway-integration"]["uri"]
            .as_str()
            .unwrap()
            .ends_with("avatars/{user_id}"));

        assert!(!fs::read_to_string(&public_path)
            .unwrap()
            .contains("x-amazon-apigateway-"));
        assert_eq!(public["paths"]["/users/{user_id}"]["get"]["security"], get_user["security"]);
    }

    #[test]
    fn api_key_source_in_private_document() {
        let dir = TempDir::new().unwrap();
        let private_path = dir.path().join("private.json");

        apigw_cmd()
            .args(["export", MULTI_ROUTER, "--router", "events", "--out-private"])
            .arg(&private_path)
            .assert()
            .success();

        let private: Value = serde_json::from_str(&fs::read_to_string(&private_path).unwrap()).unwrap();
        assert_eq!(private["x-amazon-apigateway-api-key-source"], "HEADER");
        assert_eq!(
            private["paths"]["/events/ingest"]["post"]["security"][0]["PartnerKey"],
            serde_json::json!([])
        );
        assert!(private["paths"]["/events/notify"]["post"].get("security").is_none());
    }

    #[test]
    fn several_routers_need_a_choice() {
        apigw_cmd()
            .args(["export", MULTI_ROUTER])
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("users, events"));
    }

    #[test]
    fn unknown_router() {
        apigw_cmd()
            .args(["export", MULTI_ROUTER, "--router", "billing"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("router 'billing' not found"));
    }

    #[test]
    fn missing_manifest() {
        apigw_cmd()
            .args(["export", "does-not-exist.yaml"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Failed to load manifest"));
    }

    #[test]
    fn empty_out_public_is_rejected() {
        apigw_cmd()
            .args(["export", SINGLE_ROUTER, "--out-public", ""])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid --out-public"));
    }
}

mod check {
    use super::*;

    #[test]
    fn lists_every_router() {
        apigw_cmd()
            .args(["check", MULTI_ROUTER])
            .assert()
            .success()
            .stdout(predicate::str::contains("users (2 routes)"))
            .stdout(predicate::str::contains("events (2 routes)"))
            .stdout(predicate::str::contains("/users/{user_id}/avatar"))
            .stdout(predicate::str::contains("Manifest is valid: 2 routers, 4 routes"));
    }

    #[test]
    fn single_router_verbose() {
        apigw_cmd()
            .args(["check", MULTI_ROUTER, "--router", "events", "--verbose"])
            .assert()
            .success()
            .stdout(predicate::str::contains("users").not())
            .stdout(predicate::str::contains("endpoint: create_event"))
            .stdout(predicate::str::contains("authorizers: PartnerKey"));
    }

    #[test]
    fn invalid_manifest() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.yaml");
        fs::write(
            &path,
            "routers:\n  api:\n    routes:\n      - path: no-slash\n        method: GET\n        endpoint: x\n        integration:\n          type: mock\n",
        )
        .unwrap();

        apigw_cmd()
            .arg("check")
            .arg(&path)
            .assert()
            .failure()
            .stderr(predicate::str::contains("route path must start with '/'"));
    }
}
