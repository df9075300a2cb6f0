use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = clap::Command::new("mdpick")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Pick an element out of an HTML page and convert it to clean Markdown")
        .arg(clap::arg!([INPUT] "URL to fetch, local HTML file, or '-' for stdin"))
        .arg(clap::arg!(-s --select <CSS> "CSS selector of the element to hover before confirming"))
        .arg(
            clap::arg!(-n --navigate <STEPS> "Comma-separated moves: up, down, left, right, wheel-up, wheel-down")
                .value_delimiter(','),
        )
        .arg(
            clap::arg!(-o --output <PATH> "Output file or directory (default: stdout)")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            clap::arg!(--preview <FILE> "Also write the rendered preview HTML")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(--shortcut <CHORD> "Activation chord to store, e.g. Ctrl+Shift+M"))
        .arg(
            clap::arg!(--config <FILE> "Config store file")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(--show_config "Print the effective filter and shortcut config"))
        .arg(clap::arg!(--set_filters <JSON> "Replace the filter config with a JSON object"))
        .arg(clap::arg!(--timeout <SECS> "HTTP timeout in seconds").default_value("30"))
        .arg(clap::arg!(--user_agent <UA> "Custom User-Agent for HTTP requests"))
        .arg(clap::arg!(-v --verbose "Enable debug logging"));

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "mdpick", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "mdpick", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "mdpick", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "mdpick", &completions_dir).unwrap();

    println!("cargo:warning=Shell completions generated in: {}", completions_dir.display());
}
