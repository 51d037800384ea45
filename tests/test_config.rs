use std::collections::HashMap;
use std::io::Write;

use wirehttp::config::{CONFIG_PATH_VAR, Config, LISTEN_VAR, UPSTREAM_VAR};

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn test_config_default_address() {
    let cfg = Config::load_with(lookup(&[])).unwrap();

    assert_eq!(cfg.listen_addr, "127.0.0.1:42069");
    assert_eq!(cfg.upstream_url, "http://httpbin.org");
    assert_eq!(cfg.upstream_timeout_secs, 10);
}

#[test]
fn test_config_custom_address_from_env() {
    let cfg = Config::load_with(lookup(&[(LISTEN_VAR, "0.0.0.0:3000")])).unwrap();

    assert_eq!(cfg.listen_addr, "0.0.0.0:3000");
}

#[test]
fn test_config_upstream_from_env() {
    let cfg = Config::load_with(lookup(&[(UPSTREAM_VAR, "http://localhost:8081/base")])).unwrap();
    let url = cfg.upstream().unwrap();

    assert_eq!(url.host_str(), Some("localhost"));
    assert_eq!(url.port(), Some(8081));
    assert_eq!(url.path(), "/base");
}

#[test]
fn test_config_rejects_https_upstream() {
    let result = Config::load_with(lookup(&[(UPSTREAM_VAR, "https://httpbin.org")]));

    assert!(result.is_err());
}

#[test]
fn test_config_rejects_garbage_upstream() {
    let result = Config::load_with(lookup(&[(UPSTREAM_VAR, "not a url")]));

    assert!(result.is_err());
}

#[test]
fn test_config_from_yaml_with_defaults() {
    let cfg = Config::from_yaml_str("listen_addr: \"0.0.0.0:5000\"\n").unwrap();

    assert_eq!(cfg.listen_addr, "0.0.0.0:5000");
    assert_eq!(cfg.upstream_url, "http://httpbin.org");
}

#[test]
fn test_config_rejects_empty_listen_addr() {
    let result = Config::from_yaml_str("listen_addr: \"\"\n");

    assert!(result.is_err());
}

#[test]
fn test_config_file_then_env_override() {
    let path = std::env::temp_dir().join(format!("wirehttp-config-{}.yaml", std::process::id()));
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "listen_addr: \"127.0.0.1:7000\"").unwrap();
    writeln!(file, "upstream_url: \"http://example.com\"").unwrap();
    writeln!(file, "upstream_timeout_secs: 3").unwrap();
    drop(file);

    let path_str = path.to_string_lossy().into_owned();
    let cfg = Config::load_with(lookup(&[
        (CONFIG_PATH_VAR, path_str.as_str()),
        (LISTEN_VAR, "127.0.0.1:7001"),
    ]))
    .unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(cfg.listen_addr, "127.0.0.1:7001");
    assert_eq!(cfg.upstream_url, "http://example.com");
    assert_eq!(cfg.upstream_timeout().as_secs(), 3);
}

#[test]
fn test_config_missing_file_is_error() {
    let result = Config::load_with(lookup(&[(CONFIG_PATH_VAR, "/nonexistent/wirehttp.yaml")]));

    assert!(result.is_err());
}

#[test]
fn test_config_clone() {
    let cfg1 = Config::default();
    let cfg2 = cfg1.clone();

    assert_eq!(cfg1.listen_addr, cfg2.listen_addr);
}
