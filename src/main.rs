use clap::Parser;
use serde_json::Value;
use tiny_template::{Config, TinyTemplate};
use tracing_subscriber::EnvFilter;

/// Simple runner: pass a template and JSON data via CLI.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Template text containing `${...}` placeholders
    template: String,
    /// JSON document (string). You can also pipe a file using shell quoting.
    data: String,
    /// Field whose string value is decoded as JSON before descending (repeatable)
    #[arg(long = "json-field", value_name = "NAME")]
    json_fields: Vec<String>,
    /// Alias as NAME=PATH, referenced as `${alias:NAME}` (repeatable)
    #[arg(long = "alias", value_name = "NAME=PATH", value_parser = parse_pair)]
    aliases: Vec<(String, String)>,
    /// Script returning fixed text, as NAME=TEXT, referenced as `${script:NAME}` (repeatable)
    #[arg(long = "script", value_name = "NAME=TEXT", value_parser = parse_pair)]
    scripts: Vec<(String, String)>,
    /// JSON config file with json_fields, aliases and interpolate_failure_as_blank
    #[arg(long)]
    config: Option<std::path::PathBuf>,
    /// Fail when any placeholder cannot be resolved
    #[arg(long)]
    validate: bool,
    /// Leave unresolved placeholders as written instead of blanking them
    #[arg(long)]
    keep_unresolved: bool,
}

fn parse_pair(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .ok_or_else(|| format!("expected NAME=VALUE, got `{s}`"))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("{msg}");
    std::process::exit(1);
}

fn main() {
    init_tracing();

    // Parse CLI arguments.
    let args = Args::parse();

    // Parse input JSON.
    let data: Value = match serde_json::from_str(&args.data) {
        Ok(v) => v,
        Err(e) => fail(format!("Invalid JSON: {e}")),
    };

    // Build config: file first, flags on top.
    let mut config = match args.config.as_ref() {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(text) => Config::from_json_str(&text).unwrap_or_else(|e| fail(e)),
            Err(e) => fail(format!("cannot read {}: {e}", path.display())),
        },
        None => Config::default(),
    };
    config.json_fields.extend(args.json_fields);
    config.aliases.extend(args.aliases);
    if args.keep_unresolved {
        config.interpolate_failure_as_blank = false;
    }

    let mut tpl = TinyTemplate::with_config(args.template, &config).unwrap_or_else(|e| fail(e));
    for (name, text) in args.scripts {
        tpl.register_script(&name, move || text.clone())
            .unwrap_or_else(|e| fail(e));
    }

    match tpl.render(&data, args.validate) {
        Ok(out) => println!("{out}"),
        Err(e) => fail(e),
    }
}
