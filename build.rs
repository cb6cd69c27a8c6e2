//! Build script that compiles the workbench Slint layout into Rust at compile time.

fn main() {
    let style = std::env::var("SLINT_STYLE").unwrap_or_else(|_| "fluent".to_string());
    let config = slint_build::CompilerConfiguration::new().with_style(style);
    slint_build::compile_with_config("src/papertrans.slint", config).unwrap();
}
