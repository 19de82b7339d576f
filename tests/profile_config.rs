// tests/profile_config.rs
use job_radar::config::{Settings, ENV_PROFILE_PATH};
use job_radar::profile::{core_role_terms, Profile};
use std::{env, fs};

const PROFILE_TOML: &str = r#"
negative_keywords = [" intern ", ""]

[target_titles]
primary = ["Senior Data Scientist", " "]
secondary = ["Machine Learning Engineer"]

[required_keywords]
primary = ["python"]

[target_companies]
tier1 = ["Acme"]
tier3 = ["Globex", "acme"]
"#;

const PROFILE_JSON: &str = r#"{
  "target_titles": { "primary": ["Data Scientist"] },
  "required_keywords": { "primary": ["python", "sql"], "secondary": ["dbt"] },
  "compensation": { "min_salary": 100000, "max_salary": 180000, "flexible": false },
  "location": { "remote_only": true }
}"#;

#[test]
fn parse_toml_and_json_paths() {
    let dir = tempfile::tempdir().unwrap();

    let p_toml = dir.path().join("profile.toml");
    fs::write(&p_toml, PROFILE_TOML).unwrap();
    let p = Profile::load_from(&p_toml).unwrap();
    assert_eq!(p.primary_titles(), ["Senior Data Scientist".to_string()]);
    assert_eq!(p.negative_keywords().len(), 1);
    // best tier wins
    assert_eq!(p.company_tier("ACME"), Some(1));
    assert_eq!(p.company_tier("globex"), Some(3));
    assert_eq!(p.company_tier("Initech"), None);
    assert_eq!(p.salary().max, 999_999);
    assert!(p.salary().flexible);

    let p_json = dir.path().join("profile.JSON");
    fs::write(&p_json, PROFILE_JSON).unwrap();
    let pj = Profile::load_from(&p_json).unwrap();
    assert_eq!(pj.primary_keywords().len(), 2);
    assert_eq!(pj.secondary_keywords().len(), 1);
    assert!(pj.location().remote_only);
    assert!(!pj.salary().flexible);
}

#[test]
fn invalid_profiles_fail_fast_with_path_context() {
    let dir = tempfile::tempdir().unwrap();
    let cases = [
        ("no_titles.toml", "[required_keywords]\nprimary = [\"python\"]\n"),
        (
            "no_keywords.toml",
            "[target_titles]\nprimary = [\"Data Scientist\"]\n[required_keywords]\nprimary = [\"  \"]\n",
        ),
        (
            "bad_salary.toml",
            "[target_titles]\nprimary = [\"DS\"]\n[required_keywords]\nprimary = [\"python\"]\n[compensation]\nmin_salary = 200000\nmax_salary = 100000\n",
        ),
        ("broken.toml", "[target_titles\nprimary = "),
    ];
    for (name, body) in cases {
        let path = dir.path().join(name);
        fs::write(&path, body).unwrap();
        let err = Profile::load_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains(name), "{name}: {err:#}");
    }

    let missing = dir.path().join("nope.toml");
    assert!(Profile::load_from(&missing).is_err());
}

#[test]
fn core_terms_strip_seniority_and_qualifiers() {
    let terms = core_role_terms(&[
        "Senior AI Product Manager",
        "Product Manager, Search",
        "Head of Data",
    ]);
    assert!(terms.contains("ai product manager"));
    assert!(terms.contains("ai product management"));
    assert!(terms.contains("product manager"));
    assert!(terms.contains("data"));
    assert!(!terms.iter().any(|t| t.starts_with("senior")));
}

#[test]
fn search_queries_are_deduplicated_in_order() {
    let p = Profile::from_toml_str(
        r#"
[target_titles]
primary = ["Data Scientist", "data scientist ", "ML Engineer"]
secondary = ["Analyst"]
[required_keywords]
primary = ["python"]
"#,
    )
    .unwrap();
    assert_eq!(p.search_queries(), vec!["Data Scientist", "ML Engineer", "Analyst"]);
}

#[serial_test::serial]
#[test]
fn default_uses_env_then_fallback() {
    // Isolate CWD so the test never reads a real config/
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();
    env::remove_var(ENV_PROFILE_PATH);

    // 1) nothing on disk → error
    assert!(Profile::load_default().is_err());

    // 2) fallback ./config/profile.toml
    fs::create_dir_all(tmp.path().join("config")).unwrap();
    fs::write(tmp.path().join("config/profile.toml"), PROFILE_TOML).unwrap();
    let p = Profile::load_default().unwrap();
    assert_eq!(p.primary_titles()[0], "Senior Data Scientist");

    // 3) env wins
    let p_env = tmp.path().join("other.json");
    fs::write(&p_env, PROFILE_JSON).unwrap();
    env::set_var(ENV_PROFILE_PATH, &p_env);
    let pe = Profile::load_default().unwrap();
    assert_eq!(pe.primary_titles()[0], "Data Scientist");
    assert_eq!(Settings::from_env().unwrap().profile_path, p_env);

    env::remove_var(ENV_PROFILE_PATH);
    env::set_current_dir(old).unwrap();
}
