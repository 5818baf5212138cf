/// Example program to print the loaded configuration
///
/// Run with: cargo run -p rune-config --example print_config

fn main() {
    // Load configuration from rune.toml
    let config = rune_config::RuneConfig::load();

    println!("=== Rune Formatter Configuration ===\n");

    println!("Format Settings:");
    println!("  Indent Width: {}", config.format.indent_width);
    println!("  Use Tabs: {}", config.format.use_tabs);
    println!("  Line Ending: {:?}", config.format.line_ending);
    println!("  Inline Single Text: {}", config.format.inline_single_text);
    println!();

    match toml::to_string_pretty(&config) {
        Ok(toml_str) => {
            println!("=== Serialized Configuration ===");
            println!("{}", toml_str);
        }
        Err(e) => {
            eprintln!("Failed to serialize config: {}", e);
        }
    }
}
