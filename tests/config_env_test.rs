//! Environment overrides for Settings.
//!
//! Kept in its own test binary: it mutates process environment.

use springtree::config::Settings;
use springtree::domain::Insets;

#[test]
fn given_env_vars_when_loading_then_override_files() {
    let temp = tempfile::TempDir::new().unwrap();
    let local = temp.path().join("local.toml");
    std::fs::write(&local, "[view]\nroot_label = \"From file\"\n").unwrap();
    std::env::set_var("SPRINGTREE_VIEW__ROOT_LABEL", "From env");
    std::env::set_var("SPRINGTREE_VIEW__HEIGHT", "640");
    std::env::set_var("SPRINGTREE_VIEW__PADDING", "5,10,5,10");

    let settings = Settings::load_from(None, Some(&local)).unwrap();

    std::env::remove_var("SPRINGTREE_VIEW__ROOT_LABEL");
    std::env::remove_var("SPRINGTREE_VIEW__HEIGHT");
    std::env::remove_var("SPRINGTREE_VIEW__PADDING");
    assert_eq!(settings.view.root_label, "From env");
    assert_eq!(settings.view.height, 640.0);
    assert_eq!(settings.view.padding, Insets::new(5.0, 10.0, 5.0, 10.0));
}
