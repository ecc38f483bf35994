//! Command-line interface for gadget documents.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use url::Url;

use crate::config::{validate_spec_url, DEFAULT_VIEW};
use crate::error::{GadgetError, Result};
use crate::fetch::{DocumentFetcher, HttpFetcher};
use crate::model::{ContentType, GadgetSpec};
use crate::parser::GadgetSpecParser;
use crate::substitution::{SubstitutionType, Substitutions};
use crate::summary::GadgetSummary;

/// Gadget Spec - Validate, inspect and render gadget XML descriptors.
#[derive(Parser)]
#[command(name = "gadget-spec")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse and validate a gadget document.
    Validate {
        /// Path to the gadget XML file
        file: PathBuf,

        /// URL the document is served from (default: the file's own URL)
        #[arg(short, long)]
        url: Option<String>,
    },

    /// Substitute placeholders and print a view.
    Render {
        /// Path to the gadget XML file
        file: PathBuf,

        /// URL the document is served from (default: the file's own URL)
        #[arg(short, long)]
        url: Option<String>,

        /// View to render
        #[arg(short, long, default_value = DEFAULT_VIEW)]
        view: String,

        /// Message bundle value (KEY=VALUE), repeatable
        #[arg(long = "msg", value_parser = parse_key_value)]
        messages: Vec<(String, String)>,

        /// User preference value (KEY=VALUE), repeatable
        #[arg(long = "pref", value_parser = parse_key_value)]
        prefs: Vec<(String, String)>,

        /// Module value (KEY=VALUE), repeatable
        #[arg(long = "module", value_parser = parse_key_value)]
        module: Vec<(String, String)>,

        /// Render for a right-to-left locale
        #[arg(long)]
        rtl: bool,
    },

    /// Print a metadata summary of a gadget.
    Inspect {
        /// Path or http(s)/file URL of the gadget document
        source: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,
    },

    /// Download a gadget document and validate it.
    Fetch {
        /// http(s) or file URL of the gadget document
        url: String,
    },
}

/// Serialization format of `inspect` output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Yaml,
    Json,
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { file, url } => validate_command(&file, url.as_deref()),
        Commands::Render {
            file,
            url,
            view,
            messages,
            prefs,
            module,
            rtl,
        } => {
            let mut substitutions = Substitutions::with_bidi_direction(rtl);
            substitutions.add_substitutions(SubstitutionType::Message, messages);
            substitutions.add_substitutions(SubstitutionType::UserPref, prefs);
            substitutions.add_substitutions(SubstitutionType::Module, module);
            render_command(&file, url.as_deref(), &view, &substitutions)
        }
        Commands::Inspect { source, format } => inspect_command(&source, format),
        Commands::Fetch { url } => fetch_command(&url),
    }
}

/// Parse a `KEY=VALUE` argument.
fn parse_key_value(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

/// Resolve the document URL for a local file.
fn document_url(file: &Path, url: Option<&str>) -> Result<Url> {
    if let Some(url) = url {
        return validate_spec_url(url);
    }
    let path = fs::canonicalize(file)?;
    Url::from_file_path(&path).map_err(|()| GadgetError::InvalidUrl {
        url: path.display().to_string(),
        reason: "not an absolute file path".to_string(),
    })
}

/// Read and parse a local gadget file.
fn load_file(file: &Path, url: Option<&str>) -> Result<GadgetSpec> {
    let bytes = fs::read(file)?;
    let url = document_url(file, url)?;
    GadgetSpecParser::new().parse(&bytes, &url)
}

/// Execute the validate command.
fn validate_command(file: &Path, url: Option<&str>) -> Result<()> {
    let spec = load_file(file, url)?;

    println!(
        "{} {}",
        style("Valid gadget:").green().bold(),
        style(file.display()).cyan()
    );
    print_report(&spec);
    Ok(())
}

/// Execute the render command.
fn render_command(
    file: &Path,
    url: Option<&str>,
    name: &str,
    substitutions: &Substitutions,
) -> Result<()> {
    let spec = load_file(file, url)?.substitute(substitutions)?;
    let view = spec
        .view_or_default(name)
        .ok_or_else(|| GadgetError::UnknownView {
            view: name.to_string(),
        })?;

    match (view.content_type(), view.href()) {
        (ContentType::Url, Some(href)) => println!("{href}"),
        _ => println!("{}", view.content()),
    }
    Ok(())
}

/// Execute the inspect command.
fn inspect_command(source: &str, format: OutputFormat) -> Result<()> {
    let spec = if source.contains("://") {
        let url = validate_spec_url(source)?;
        let document = HttpFetcher::new()?.fetch(&url)?;
        GadgetSpecParser::new().parse(&document.bytes, &document.source)?
    } else {
        load_file(Path::new(source), None)?
    };

    let summary = GadgetSummary::from_spec(&spec);
    let output = match format {
        OutputFormat::Yaml => serde_yaml_ng::to_string(&summary)?,
        OutputFormat::Json => serde_json::to_string_pretty(&summary)?,
    };
    println!("{}", output.trim_end());
    Ok(())
}

/// Execute the fetch command.
fn fetch_command(url: &str) -> Result<()> {
    let url = validate_spec_url(url)?;

    println!("{} {}", style("Fetching").bold(), style(&url).cyan());
    println!();

    // Create progress spinner
    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );

    pb.set_message("Downloading gadget document...");
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let document = match HttpFetcher::new().and_then(|fetcher| fetcher.fetch(&url)) {
        Ok(document) => document,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    pb.set_message("Parsing gadget document...");

    let spec = match GadgetSpecParser::new().parse(&document.bytes, &document.source) {
        Ok(spec) => spec,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    pb.finish_and_clear();

    println!(
        "{} {} bytes from {}",
        style("Downloaded").green().bold(),
        document.bytes.len(),
        document.source
    );
    print_report(&spec);
    Ok(())
}

/// Print the short human-readable description shared by several commands.
fn print_report(spec: &GadgetSpec) {
    let prefs = spec.module_prefs();
    if !prefs.title().is_empty() {
        println!("  Title: {}", style(prefs.title()).green());
    }
    let views: Vec<&str> = spec.views().keys().map(String::as_str).collect();
    println!("  Views: {}", views.join(", "));
    println!("  User prefs: {}", spec.user_prefs().len());
    println!("  Features: {}", prefs.features().len());
    if let Some(oauth) = prefs.oauth() {
        println!("  OAuth services: {}", oauth.services().len());
    }
    println!("  Checksum: {}", style(spec.checksum()).dim());
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_parse_validate() {
        let cli = Cli::parse_from(["gadget-spec", "validate", "gadget.xml"]);

        let Commands::Validate { file, url } = cli.command else {
            panic!("expected validate command");
        };
        assert_eq!(file, PathBuf::from("gadget.xml"));
        assert!(url.is_none());
    }

    #[test]
    fn test_cli_parse_render_substitutions() {
        let cli = Cli::parse_from([
            "gadget-spec",
            "render",
            "gadget.xml",
            "--view",
            "canvas",
            "--msg",
            "title=Hello",
            "--msg",
            "body=a=b",
            "--pref",
            "color=red",
            "--rtl",
        ]);

        let Commands::Render {
            view,
            messages,
            prefs,
            module,
            rtl,
            ..
        } = cli.command
        else {
            panic!("expected render command");
        };
        assert_eq!(view, "canvas");
        assert_eq!(
            messages,
            vec![
                ("title".to_string(), "Hello".to_string()),
                ("body".to_string(), "a=b".to_string()),
            ]
        );
        assert_eq!(prefs, vec![("color".to_string(), "red".to_string())]);
        assert!(module.is_empty());
        assert!(rtl);
    }

    #[test]
    fn test_cli_parse_render_default_view() {
        let cli = Cli::parse_from(["gadget-spec", "render", "gadget.xml"]);

        let Commands::Render { view, rtl, .. } = cli.command else {
            panic!("expected render command");
        };
        assert_eq!(view, DEFAULT_VIEW);
        assert!(!rtl);
    }

    #[test]
    fn test_cli_parse_inspect_format() {
        let cli = Cli::parse_from(["gadget-spec", "inspect", "gadget.xml", "--format", "json"]);

        let Commands::Inspect { source, format } = cli.command else {
            panic!("expected inspect command");
        };
        assert_eq!(source, "gadget.xml");
        assert_eq!(format, OutputFormat::Json);
    }

    #[test]
    fn test_cli_rejects_bad_key_value() {
        let result = Cli::try_parse_from(["gadget-spec", "render", "gadget.xml", "--msg", "oops"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("k=v"),
            Ok(("k".to_string(), "v".to_string()))
        );
        assert_eq!(parse_key_value("k="), Ok(("k".to_string(), String::new())));
        assert!(parse_key_value("=v").is_err());
        assert!(parse_key_value("kv").is_err());
    }

    #[test]
    fn test_document_url_explicit() {
        let url = document_url(Path::new("missing.xml"), Some("http://example.org/g.xml"))
            .unwrap();
        assert_eq!(url.as_str(), "http://example.org/g.xml");
    }

    #[test]
    fn test_document_url_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("g.xml");
        fs::write(&file, "<Module/>").unwrap();

        let url = document_url(&file, None).unwrap();
        assert_eq!(url.scheme(), "file");
        assert!(url.path().ends_with("/g.xml"));
    }
}
