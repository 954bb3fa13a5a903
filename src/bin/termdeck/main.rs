//! termdeck entrypoint: parse flags, load the menu tree, wire the handler
//! registry, and hand control to the run loop.
//!
//! Fast paths (`--doctor`, `--check-menu`) exit before the terminal is
//! touched, so they work fine in pipes and CI.

use anyhow::Result;
use clap::Parser;
use termdeck::{
    app, config::AppConfig, doctor::base_doctor_report, init_logging, log_debug, log_file_path,
    menu::MenuTree, registry::Registry,
};

fn main() -> Result<()> {
    let config = AppConfig::parse();

    if config.doctor {
        let report = base_doctor_report(&config, "termdeck");
        println!("{}", report.render());
        return Ok(());
    }

    config.validate()?;

    let tree = match &config.menu_file {
        Some(path) => MenuTree::load(path)?,
        None => MenuTree::builtin(),
    };

    if config.check_menu {
        println!(
            "menu OK ({} sections, {} items)",
            tree.sections.len(),
            tree.item_count()
        );
        return Ok(());
    }

    let registry = Registry::with_builtins(&tree)?;

    init_logging(&config);
    log_debug("=== termdeck started ===");
    log_debug(&format!("log file: {:?}", log_file_path()));

    let result = app::run(&config, tree, registry);

    log_debug("=== termdeck exiting ===");
    if let Err(ref err) = result {
        log_debug(&format!("exit with error: {err}"));
    }
    result.map_err(Into::into)
}
