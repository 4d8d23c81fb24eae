use pretty_assertions::assert_eq;
use serial_test::serial;
use whareiq::{
    action::Action,
    cli::Cli,
    config::{parse_key_sequence, Config, Endpoints, ANON_KEY_ENV, API_URL_ENV, AUTH_URL_ENV},
    route::Route,
};

fn env_lookup(var: &str) -> Option<String> {
    std::env::var(var).ok()
}

fn clear_env() {
    for var in [API_URL_ENV, AUTH_URL_ENV, ANON_KEY_ENV] {
        std::env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_environment_fills_missing_flags() {
    clear_env();
    std::env::set_var(AUTH_URL_ENV, "https://project.supabase.co");
    std::env::set_var(ANON_KEY_ENV, "anon");
    std::env::set_var(API_URL_ENV, "https://api.whareiq.test");

    let cli = Cli { api_url: Some("http://localhost:9000".to_string()), ..Cli::default() };
    let endpoints = Endpoints::resolve(&cli, &Config::default().service, env_lookup).unwrap();
    clear_env();

    assert_eq!(endpoints.api_url, "http://localhost:9000");
    assert_eq!(endpoints.auth_url, "https://project.supabase.co");
    assert_eq!(endpoints.anon_key.expose(), "anon");
}

#[test]
#[serial]
fn test_missing_identity_provider_is_an_error() {
    clear_env();
    let result = Endpoints::resolve(&Cli::default(), &Config::default().service, env_lookup);
    assert!(result.is_err());
}

#[test]
fn test_user_file_overrides_defaults() {
    let config_dir = tempfile::tempdir().unwrap();
    let data_dir = tempfile::tempdir().unwrap();
    std::fs::write(
        config_dir.path().join("config.json5"),
        r#"{
            "service": { "api_url": "https://api.example.com", "auth_url": "https://auth.example.com" },
            "keybindings": { "Query": { "<Ctrl-q>": "Quit" } },
        }"#,
    )
    .unwrap();

    let config = Config::load(config_dir.path(), data_dir.path()).unwrap();
    assert_eq!(config.service.api_url.as_deref(), Some("https://api.example.com"));
    assert_eq!(config.service.auth_url.as_deref(), Some("https://auth.example.com"));

    let query = config.keybindings.get(&Route::Query).unwrap();
    assert_eq!(query.get(&parse_key_sequence("<Ctrl-q>").unwrap()), Some(&Action::Quit));
    // Defaults for the same route are kept
    assert_eq!(query.get(&parse_key_sequence("<Ctrl-o>").unwrap()), Some(&Action::SignOut));
}
