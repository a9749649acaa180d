use std::io::Cursor;

use fdwctl::cli::wizard::{validate_selection, Wizard};
use fdwctl::config::types::DatabaseConfig;

fn wizard(input: &str) -> Wizard<Cursor<Vec<u8>>, Vec<u8>> {
    Wizard::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
}

fn items() -> Vec<String> {
    vec!["ANALYTICS".to_string(), "BILLING".to_string(), "LEGACY".to_string()]
}

#[test]
fn test_choose_from_list_reprompts_until_valid() {
    let mut w = wizard("0\nabc\n4\n2\n");
    let items = items();
    let picked = w
        .choose_from_list("Pick one:", &items, |s| s.to_lowercase())
        .unwrap();
    assert_eq!(picked, "BILLING");
}

#[test]
fn test_choose_from_list_fails_on_closed_input() {
    let mut w = wizard("9\n");
    let items = items();
    assert!(w.choose_from_list("Pick one:", &items, |s| s.clone()).is_err());
}

#[test]
fn test_choose_from_list_rejects_empty_menu() {
    let mut w = wizard("1\n");
    let items: Vec<String> = Vec::new();
    assert!(w.choose_from_list("Nothing:", &items, |s| s.clone()).is_err());
}

#[test]
fn test_choose_multiple_ignores_out_of_range() {
    let mut w = wizard("3 1 7\n");
    let picked = w.choose_multiple("Schemas:", &items()).unwrap();
    assert_eq!(picked, vec!["LEGACY".to_string(), "ANALYTICS".to_string()]);
}

#[test]
fn test_choose_multiple_reprompts_on_garbage() {
    let mut w = wizard("one two\n2\n");
    let picked = w.choose_multiple("Schemas:", &items()).unwrap();
    assert_eq!(picked, vec!["BILLING".to_string()]);
}

#[test]
fn test_validate_selection() {
    let db = DatabaseConfig {
        name: "SALES".to_string(),
        schemas: vec!["ANALYTICS".to_string()],
    };
    assert!(validate_selection(&db, &["ANALYTICS".to_string()]).is_ok());

    let err = validate_selection(&db, &["BILLING".to_string()]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Configuration error: Schema 'BILLING' does not exist in this database target"
    );
}
