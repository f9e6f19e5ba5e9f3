use crate::ui;
use anyhow::Result;
use squad_core::{load_servers_from_file, DEFAULT_BURST};
use std::path::PathBuf;

pub async fn execute(servers_file: PathBuf) -> Result<()> {
    ui::print_header("Validating Server List");
    println!("File: {}", servers_file.display());

    match load_servers_from_file(&servers_file).await {
        Ok(registry) => {
            println!();
            ui::print_success(&format!("Server list is valid ({} servers)", registry.len()));
            ui::print_servers(&registry);

            if registry.len() > DEFAULT_BURST as usize {
                println!();
                ui::print_warning(&format!(
                    "{} servers exceed the default burst of {}; cycles will be paced by the rate limiter",
                    registry.len(),
                    DEFAULT_BURST
                ));
            }

            Ok(())
        }
        Err(e) => {
            println!();
            ui::print_error("Server list is invalid!");
            println!("\nError: {}", e);
            Err(e.into())
        }
    }
}
