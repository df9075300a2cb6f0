use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context;
use clap::Parser;
use mdpick_core::{
    ConfigLoader, Direction, Document, FetchConfig, FilterConfig, InputEvent, JsonFileStore, KeyEvent, NodeId,
    Session, ShortcutConfig, download_file_name, fetch_file, fetch_stdin, fetch_url,
};
use owo_colors::OwoColorize;
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;

mod echo;

use echo::{format_size, print_banner, print_detail, print_error, print_info, print_step, print_success, print_warning};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// One scripted move of the selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NavStep {
    Up,
    Down,
    Left,
    Right,
    WheelUp,
    WheelDown,
}

impl NavStep {
    fn event(self) -> InputEvent<NodeId> {
        match self {
            Self::Up => InputEvent::Navigate(Direction::Up),
            Self::Down => InputEvent::Navigate(Direction::Down),
            Self::Left => InputEvent::Navigate(Direction::Left),
            Self::Right => InputEvent::Navigate(Direction::Right),
            Self::WheelUp => InputEvent::Wheel { delta_y: -100.0 },
            Self::WheelDown => InputEvent::Wheel { delta_y: 100.0 },
        }
    }
}

impl FromStr for NavStep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "wheel-up" => Ok(Self::WheelUp),
            "wheel-down" => Ok(Self::WheelDown),
            _ => Err(format!(
                "Invalid step: {}. Valid options: up, down, left, right, wheel-up, wheel-down",
                s
            )),
        }
    }
}

/// Pick an element out of an HTML page and convert it to clean Markdown
#[derive(Parser, Debug)]
#[command(name = "mdpick")]
#[command(version)]
#[command(about = "Pick an element out of an HTML page and convert it to clean Markdown", long_about = None)]
struct Args {
    /// URL to fetch, local HTML file, or "-" for stdin
    #[arg(value_name = "INPUT")]
    input: Option<String>,

    /// CSS selector of the element to hover before confirming
    #[arg(short, long, value_name = "CSS")]
    select: Option<String>,

    /// Comma-separated moves: up, down, left, right, wheel-up, wheel-down
    #[arg(short, long, value_name = "STEPS", value_delimiter = ',')]
    navigate: Vec<NavStep>,

    /// Output file or directory (default: stdout)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Also write the rendered preview HTML
    #[arg(long, value_name = "FILE")]
    preview: Option<PathBuf>,

    /// Activation chord to store, e.g. Ctrl+Shift+M
    #[arg(long, value_name = "CHORD")]
    shortcut: Option<String>,

    /// Config store file (default: platform config dir)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the effective filter and shortcut config
    #[arg(long)]
    show_config: bool,

    /// Replace the filter config with a JSON object, merged over the defaults
    #[arg(long, value_name = "JSON")]
    set_filters: Option<String>,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "30", value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for HTTP requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => EnvFilter::new(if verbose { "debug" } else { "warn" }),
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn is_web_url(input: &str) -> bool {
    url::Url::parse(input).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

async fn read_input(input: &str, args: &Args) -> anyhow::Result<String> {
    tracing::debug!(input, "reading input");

    if input == "-" {
        if args.verbose {
            print_step(1, 4, "Reading from stdin");
        }
        return fetch_stdin().context("Failed to read from stdin");
    }

    if is_web_url(input) {
        if args.verbose {
            print_step(1, 4, &format!("Fetching from {}", input.bright_white().underline()));
        }

        let defaults = FetchConfig::default();
        let config = FetchConfig {
            timeout: args.timeout,
            user_agent: args.user_agent.clone().unwrap_or(defaults.user_agent),
        };

        return fetch_url(input, &config).await.context("Failed to fetch URL");
    }

    if args.verbose {
        print_step(1, 4, &format!("Reading from file {}", input.bright_white()));
    }
    fetch_file(input).with_context(|| format!("Failed to read file: {}", input))
}

/// Session layer carrying a chord given on the command line
fn shortcut_layer(chord: &str) -> anyhow::Result<serde_json::Map<String, serde_json::Value>> {
    let shortcut = ShortcutConfig::parse(chord)?;
    match serde_json::to_value(shortcut)? {
        serde_json::Value::Object(map) => Ok(map),
        _ => anyhow::bail!("Shortcut did not serialize to an object"),
    }
}

/// Resolve `--output`: a directory receives a file named after the page title
fn output_path(path: &Path, title: &str) -> PathBuf {
    if path.is_dir() { path.join(download_file_name(title, OffsetDateTime::now_utc())) } else { path.to_path_buf() }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    if args.verbose {
        print_banner();
        print_info("Debug logging enabled");
        eprintln!();
    }

    let store = match &args.config {
        Some(path) => JsonFileStore::new(path),
        None => JsonFileStore::default_location(),
    };
    let mut loader = ConfigLoader::new(store);

    if let Some(raw) = &args.set_filters {
        loader.apply_filter_edit(raw).context("Rejected filter config")?;
        print_success(&format!("Filter config saved to {}", loader.store().path().display()));
    }

    let shortcut: ShortcutConfig = match &args.shortcut {
        Some(chord) => loader.load_with(&shortcut_layer(chord).context("Invalid --shortcut")?),
        None => loader.load(),
    };
    let filters: FilterConfig = loader.load();

    if args.show_config {
        let effective = serde_json::json!({ "filterConfig": filters, "shortCutConfig": shortcut });
        println!("{}", serde_json::to_string_pretty(&effective)?);
    }

    let Some(input) = args.input.as_deref() else {
        if args.show_config || args.set_filters.is_some() || args.shortcut.is_some() {
            return Ok(());
        }
        anyhow::bail!("No input given: pass a URL, an HTML file, or '-' for stdin");
    };

    let html = read_input(input, &args).await?;

    if args.verbose {
        print_detail("Size", &format_size(html.len()));
        eprintln!();
        print_step(2, 4, "Parsing HTML document");
    }

    let doc = Document::parse(&html).context("Failed to parse HTML")?;
    let title = doc.title().unwrap_or_default();
    tracing::info!(title = %title, bytes = html.len(), "parsed document");

    if args.verbose && !title.is_empty() {
        print_detail("Title", &title);
        eprintln!();
    }

    let mut session = Session::new(doc, filters, shortcut.clone());
    for notice in session.take_notices() {
        print_warning(&notice);
    }

    if args.verbose {
        print_step(3, 4, &format!("Selecting (chord {})", shortcut));
    }

    let chord = KeyEvent { ctrl: shortcut.ctrl, alt: shortcut.alt, shift: shortcut.shift, key: shortcut.key.clone() };
    session.handle_key(&chord);
    if !session.is_selecting() {
        anyhow::bail!("Document has no selectable element");
    }

    if let Some(css) = &args.select {
        let target = session
            .document()
            .select_first(css)
            .context("Invalid --select")?
            .with_context(|| format!("No element matches '{}'", css))?;
        session.dispatch(InputEvent::Hover { target, in_overlay: false });
    }

    for step in &args.navigate {
        session.dispatch(step.event());
    }

    if args.verbose
        && let Some(current) = session.navigator().current()
    {
        let tag = session.document().tree().tag_name(current).unwrap_or("?");
        print_detail("Element", &format!("<{}>", tag));
        eprintln!();
    }

    if let Some(current) = session.navigator().current() {
        tracing::debug!(tag = session.document().tree().tag_name(current), "confirming selection");
    }
    session.dispatch(InputEvent::Press { in_overlay: false });

    let notices = session.take_notices();
    let Some(preview) = session.preview() else {
        for notice in &notices {
            print_error(notice);
        }
        anyhow::bail!("Selection could not be converted");
    };

    if args.verbose {
        print_step(4, 4, "Writing output");
        print_detail("Markdown", &format_size(preview.markdown().len()));
        eprintln!();
    }

    match &args.output {
        Some(path) => {
            let target = output_path(path, &title);
            tracing::debug!(path = %target.display(), "writing markdown");
            fs::write(&target, preview.markdown())
                .with_context(|| format!("Failed to write to file: {}", target.display()))?;
            print_success(&format!("Markdown written to {}", target.display().bright_white()));
        }
        None => {
            println!("{}", preview.markdown());
        }
    }

    if let Some(path) = &args.preview {
        let rendered = preview.require_rendered_html().context("Cannot write preview")?;
        fs::write(path, rendered).with_context(|| format!("Failed to write to file: {}", path.display()))?;
        print_success(&format!("Preview written to {}", path.display().bright_white()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nav_step_parse() {
        assert_eq!("up".parse::<NavStep>(), Ok(NavStep::Up));
        assert_eq!(" Wheel-Down ".parse::<NavStep>(), Ok(NavStep::WheelDown));
        assert!("sideways".parse::<NavStep>().is_err());
    }

    #[test]
    fn test_wheel_steps_map_to_deltas() {
        assert_eq!(NavStep::WheelUp.event(), InputEvent::Wheel { delta_y: -100.0 });
        assert_eq!(NavStep::Left.event(), InputEvent::Navigate(Direction::Left));
    }

    #[test]
    fn test_is_web_url() {
        assert!(is_web_url("https://example.com/page"));
        assert!(!is_web_url("page.html"));
        assert!(!is_web_url("file:///tmp/page.html"));
    }

    #[test]
    fn test_shortcut_layer() {
        let layer = shortcut_layer("Alt+K").unwrap();
        assert_eq!(layer.get("Key"), Some(&serde_json::json!("K")));
        assert_eq!(layer.get("Alt"), Some(&serde_json::json!(true)));
        assert!(shortcut_layer("Hyper+").is_err());
    }
}
