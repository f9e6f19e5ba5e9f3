// Terminal output for the interactive commands
use colored::Colorize;
use squad_core::ServerRegistry;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct ServerRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Url")]
    url: String,
}

pub fn print_header(text: &str) {
    println!("\n{}", text.bold().cyan());
    println!("{}", "=".repeat(text.len()).cyan());
}

pub fn print_success(text: &str) {
    println!("{} {}", "✓".green().bold(), text.green());
}

pub fn print_error(text: &str) {
    println!("{} {}", "✗".red().bold(), text.red());
}

pub fn print_warning(text: &str) {
    println!("{} {}", "⚠".yellow().bold(), text.yellow());
}

/// Prints the registry as a table, in collection order.
pub fn print_servers(registry: &ServerRegistry) {
    let rows: Vec<ServerRow> = registry
        .iter()
        .enumerate()
        .map(|(i, server)| ServerRow {
            index: i + 1,
            name: server.short_name.clone(),
            url: server.endpoint_url.clone(),
        })
        .collect();

    println!("\n{}", Table::new(rows));
}
