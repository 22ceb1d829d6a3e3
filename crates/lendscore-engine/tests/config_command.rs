mod support;

use lendscore_engine::commands::common::ConfigPaths;
use lendscore_engine::commands::config::{self, ConfigRunOptions};
use serde_json::json;
use support::testkit::{temp_home, write_file};

const CUSTOM_POLICY: &str = r#"{
  "version": "scoring/custom",
  "decision": { "approve_min": 75.0, "refer_min": 50.0 }
}"#;

#[test]
fn show_without_files_reports_builtin_policy() {
    let temp = temp_home("lendscore-config-builtin");
    assert!(temp.is_ok());
    if let Ok((_dir, home)) = temp {
        let result = config::show(ConfigRunOptions {
            config: ConfigPaths {
                home_override: Some(&home),
                ..ConfigPaths::default()
            },
        });
        assert!(result.is_ok());
        if let Ok(envelope) = result {
            assert_eq!(envelope.command, "config show");
            let data = envelope.data;
            assert_eq!(data["scoring_source"], json!({ "origin": "builtin" }));
            assert!(data.get("mapping_source").is_none());
            assert_eq!(data["mapping_entries"], json!(0));
            assert_eq!(data["config"]["version"], json!("scoring/v1"));
            assert_eq!(data["config"]["hard_decline"]["max_failed_payments"], json!(2));
            assert!(data["rule_groups"].as_u64().is_some_and(|groups| groups > 20));
        }
    }
}

#[test]
fn show_picks_up_files_in_config_home() {
    let temp = temp_home("lendscore-config-default-file");
    assert!(temp.is_ok());
    if let Ok((_dir, home)) = temp {
        assert!(write_file(&home, "scoring.json", CUSTOM_POLICY).is_ok());
        assert!(
            write_file(
                &home,
                "pfc_mapping.csv",
                "pfc_code,category,subcategory\nGAMBLING,risk,gambling\nRENT_AND_UTILITIES_RENT,essential,rent\n",
            )
            .is_ok()
        );

        let result = config::show(ConfigRunOptions {
            config: ConfigPaths {
                home_override: Some(&home),
                ..ConfigPaths::default()
            },
        });
        assert!(result.is_ok());
        if let Ok(envelope) = result {
            let data = envelope.data;
            assert_eq!(data["scoring_source"]["origin"], json!("default_file"));
            assert_eq!(data["mapping_source"]["origin"], json!("default_file"));
            assert_eq!(data["mapping_entries"], json!(2));
            assert_eq!(data["config"]["version"], json!("scoring/custom"));
            assert_eq!(data["config"]["decision"]["approve_min"], json!(75.0));
            assert_eq!(data["config"]["hard_decline"]["min_monthly_income"], json!(500.0));
        }
    }
}

#[test]
fn explicit_config_path_wins_over_home() {
    let temp = temp_home("lendscore-config-explicit");
    assert!(temp.is_ok());
    if let Ok((dir, home)) = temp {
        assert!(write_file(&home, "scoring.json", CUSTOM_POLICY).is_ok());
        let explicit = write_file(
            dir.path(),
            "strict.json",
            r#"{ "version": "scoring/strict", "hard_decline": { "max_failed_payments": 0 } }"#,
        );
        assert!(explicit.is_ok());
        if let Ok(explicit) = explicit {
            let result = config::show(ConfigRunOptions {
                config: ConfigPaths {
                    config_path: Some(&explicit),
                    home_override: Some(&home),
                    ..ConfigPaths::default()
                },
            });
            assert!(result.is_ok());
            if let Ok(envelope) = result {
                let data = envelope.data;
                assert_eq!(data["scoring_source"]["origin"], json!("explicit_file"));
                assert_eq!(data["config"]["version"], json!("scoring/strict"));
                assert_eq!(data["config"]["hard_decline"]["max_failed_payments"], json!(0));
            }
        }
    }
}

#[test]
fn validate_accepts_a_partial_document() {
    let temp = temp_home("lendscore-config-validate");
    assert!(temp.is_ok());
    if let Ok((dir, _home)) = temp {
        let path = write_file(dir.path(), "policy.json", CUSTOM_POLICY);
        assert!(path.is_ok());
        if let Ok(path) = path {
            let result = config::validate(&path);
            assert!(result.is_ok());
            if let Ok(envelope) = result {
                assert_eq!(envelope.command, "config validate");
                assert_eq!(envelope.data["valid"], json!(true));
                assert_eq!(envelope.data["version"], json!("scoring/custom"));
            }
        }
    }
}

#[test]
fn validate_rejects_inverted_thresholds_and_unknown_fields() {
    let temp = temp_home("lendscore-config-invalid");
    assert!(temp.is_ok());
    if let Ok((dir, _home)) = temp {
        let inverted = write_file(
            dir.path(),
            "inverted.json",
            r#"{ "decision": { "approve_min": 40.0, "refer_min": 50.0 } }"#,
        );
        let unknown = write_file(dir.path(), "unknown.json", r#"{ "colour": "blue" }"#);
        assert!(inverted.is_ok() && unknown.is_ok());
        if let (Ok(inverted), Ok(unknown)) = (inverted, unknown) {
            let result = config::validate(&inverted);
            assert!(result.is_err());
            if let Err(error) = result {
                assert_eq!(error.code, "config_invalid");
                assert!(error.message.contains("decision.approve_min"));
            }
            assert!(matches!(
                config::validate(&unknown),
                Err(ref error) if error.code == "config_invalid"
            ));
        }
    }
}

#[test]
fn missing_config_file_is_unreadable() {
    let temp = temp_home("lendscore-config-missing");
    assert!(temp.is_ok());
    if let Ok((dir, home)) = temp {
        let missing = dir.path().join("absent.json");
        assert!(matches!(
            config::validate(&missing),
            Err(ref error) if error.code == "config_unreadable"
        ));
        let result = config::show(ConfigRunOptions {
            config: ConfigPaths {
                config_path: Some(&missing),
                home_override: Some(&home),
                ..ConfigPaths::default()
            },
        });
        assert!(matches!(result, Err(ref error) if error.code == "config_unreadable"));
    }
}
