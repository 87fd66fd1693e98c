//! Command-line boundary: argument checks and file preparation that happen
//! before a pipeline is ever started.

use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::info;

use crate::config::SieveConfig;
use crate::pipeline::{Pipeline, RunReport};
use crate::render::{self, RuleDocument};
use crate::SieveError;

/// Minimum length of a trimmed path argument (`a.xml`).
pub const MIN_PATH_LEN: usize = 5;

#[derive(Debug, Parser)]
#[command(name = "rulesieve")]
#[command(author, version, about = "Resolve duplicate rules in an XML rule file", long_about = None)]
pub struct Cli {
    /// Source rule document (.xml)
    pub source: String,

    /// Destination for the resolved rules (.xml); created if absent
    pub destination: String,

    /// TOML configuration file
    #[arg(short, long, env = "RULESIEVE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Open the HTML rendering when done, even if the config file disables it
    #[arg(long, conflicts_with_all = ["no_open", "no_html"])]
    pub open: bool,

    /// Write the HTML rendering but do not open it
    #[arg(long)]
    pub no_open: bool,

    /// Skip the HTML rendering
    #[arg(long)]
    pub no_html: bool,

    #[arg(short, long)]
    pub verbose: bool,
}

/// Whether `file_name` ends in a three-letter `xml` extension (any case) and
/// has at least one character before the dot.
#[must_use]
pub fn is_xml_file(file_name: &str) -> bool {
    if file_name.len() < MIN_PATH_LEN {
        return false;
    }
    file_name
        .rsplit_once('.')
        .is_some_and(|(_, ext)| ext.len() == 3 && ext.eq_ignore_ascii_case("xml"))
}

/// Trimmed source and destination paths after the argument checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arguments {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Check the two path arguments: both at least [`MIN_PATH_LEN`] characters
/// after trimming, and at least one of them with an `.xml` extension.
///
/// # Errors
///
/// Returns [`SieveError::InvalidArguments`] or [`SieveError::IllegalExtension`].
pub fn validate_arguments(source: &str, destination: &str) -> Result<Arguments, SieveError> {
    let source = source.trim();
    let destination = destination.trim();
    if source.chars().count() < MIN_PATH_LEN || destination.chars().count() < MIN_PATH_LEN {
        return Err(SieveError::InvalidArguments(format!(
            "source and destination must each be at least {MIN_PATH_LEN} characters"
        )));
    }
    if !is_xml_file(source) && !is_xml_file(destination) {
        return Err(SieveError::IllegalExtension {
            path: source.to_owned(),
        });
    }
    Ok(Arguments {
        source: PathBuf::from(source),
        destination: PathBuf::from(destination),
    })
}

/// The source must be an existing regular file.
///
/// # Errors
///
/// Returns [`SieveError::SourceNotFound`].
pub fn check_source(path: &Path) -> Result<(), SieveError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(SieveError::SourceNotFound {
            path: path.to_path_buf(),
        })
    }
}

/// Create the destination file, and its parent directories, if it does not
/// exist yet.
///
/// # Errors
///
/// Returns [`SieveError::DestinationCreate`] if creation fails.
pub fn prepare_destination(path: &Path) -> Result<(), SieveError> {
    if path.exists() {
        return Ok(());
    }
    info!(path = %path.display(), "destination does not exist, creating it");
    let create = || -> std::io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::File::create(path)?;
        Ok(())
    };
    create().map_err(|source| SieveError::DestinationCreate {
        path: path.to_path_buf(),
        source,
    })
}

/// The configuration for a run: the `--config` file (or defaults) with the
/// rendering flags applied on top.
///
/// # Errors
///
/// Returns [`SieveError::Config`] if the config file cannot be loaded.
pub fn load_config(cli: &Cli) -> Result<SieveConfig, SieveError> {
    let mut config = match &cli.config {
        Some(path) => SieveConfig::load(path)?,
        None => SieveConfig::default(),
    };
    if cli.open {
        config.render.open = true;
        config.render.html = true;
    }
    if cli.no_open {
        config.render.open = false;
    }
    if cli.no_html {
        config.render.html = false;
        config.render.open = false;
    }
    Ok(config)
}

/// Run the whole program for parsed command-line arguments: boundary checks,
/// the pipeline, then the result document and its HTML rendering.
///
/// # Errors
///
/// Returns [`SieveError`] for boundary faults, configuration problems, a
/// failed pipeline run, or an unwritable result document. HTML rendering and
/// display failures are logged and do not fail the run.
pub fn execute(cli: &Cli) -> Result<RunReport, SieveError> {
    let args = validate_arguments(&cli.source, &cli.destination)?;

    let config = load_config(cli)?;

    check_source(&args.source)?;
    prepare_destination(&args.destination)?;

    info!(source = %args.source.display(), "resolving rules");
    let report = Pipeline::new(&config).run_file(&args.source)?;

    let document =
        RuleDocument::with_names(&config.path.container, &config.path.item, report.winners());
    render::write_document(&document, &args.destination)?;

    if config.render.html {
        match render::write_html(&document, &args.destination) {
            Ok(html) => {
                if config.render.open {
                    render::display(&html);
                }
            }
            Err(err) => tracing::warn!(error = %err, "HTML rendering skipped"),
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xml_extension_cases() {
        let cases = [
            ("", false),
            ("xml.", false),
            ("0.txt", false),
            (".xml", false),
            ("0.xml", true),
            ("0.XML", true),
            ("0.xmL", true),
            ("0. xmL", false),
            ("test.xmls", false),
            (". xml", false),
            ("/tmp/dir.v2/rules.xml", true),
        ];
        for (name, expected) in cases {
            assert_eq!(is_xml_file(name), expected, "{name:?}");
        }
    }

    #[test]
    fn short_arguments_rejected() {
        for (src, dst) in [("", ""), ("a.xml", ""), ("", "a.xml"), ("  x  ", "b.xml")] {
            assert!(
                matches!(validate_arguments(src, dst), Err(SieveError::InvalidArguments(_))),
                "{src:?} {dst:?}"
            );
        }
    }

    #[test]
    fn arguments_are_trimmed() {
        let args = validate_arguments("  in.xml ", "\tout.xml\n").unwrap();
        assert_eq!(args.source, PathBuf::from("in.xml"));
        assert_eq!(args.destination, PathBuf::from("out.xml"));
    }

    #[test]
    fn one_xml_argument_is_enough() {
        let args = validate_arguments("rules.xml", "result.txt").unwrap();
        assert_eq!(args.destination, PathBuf::from("result.txt"));
        let args = validate_arguments("rules.txt", "result.xml").unwrap();
        assert_eq!(args.source, PathBuf::from("rules.txt"));
    }

    #[test]
    fn neither_argument_xml_rejected() {
        assert!(matches!(
            validate_arguments("in.txt", "out.doc"),
            Err(SieveError::IllegalExtension { ref path }) if path == "in.txt"
        ));
    }

    #[test]
    fn missing_source_reported() {
        let err = check_source(Path::new("/nonexistent/rulesieve/rules.xml")).unwrap_err();
        assert!(matches!(err, SieveError::SourceNotFound { .. }));
    }

    #[test]
    fn destination_created_with_parents() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("nested/deeper/out.xml");
        prepare_destination(&dest).unwrap();
        assert!(dest.is_file());
        // Existing destination is left alone.
        std::fs::write(&dest, "keep").unwrap();
        prepare_destination(&dest).unwrap();
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "keep");
    }

    #[test]
    fn cli_parses_flags() {
        let cli = Cli::try_parse_from(["rulesieve", "in.xml", "out.xml", "--open", "-v"]).unwrap();
        assert_eq!(cli.source, "in.xml");
        assert!(cli.open);
        assert!(cli.verbose);
        assert!(!cli.no_html);
    }

    #[test]
    fn rendering_is_displayed_by_default() {
        let cli = Cli::try_parse_from(["rulesieve", "in.xml", "out.xml"]).unwrap();
        let config = load_config(&cli).unwrap();
        assert!(config.render.html);
        assert!(config.render.open);
    }

    #[test]
    fn rendering_flags_override_config() {
        let cli = Cli::try_parse_from(["rulesieve", "in.xml", "out.xml", "--no-open"]).unwrap();
        let config = load_config(&cli).unwrap();
        assert!(config.render.html);
        assert!(!config.render.open);

        let cli = Cli::try_parse_from(["rulesieve", "in.xml", "out.xml", "--no-html"]).unwrap();
        let config = load_config(&cli).unwrap();
        assert!(!config.render.html);
        assert!(!config.render.open);

        assert!(Cli::try_parse_from(["rulesieve", "in.xml", "out.xml", "--open", "--no-open"]).is_err());
    }

    #[test]
    fn cli_requires_both_paths() {
        assert!(Cli::try_parse_from(["rulesieve", "in.xml"]).is_err());
    }

    fn cli(source: &Path, destination: &Path) -> Cli {
        Cli {
            source: source.display().to_string(),
            destination: destination.display().to_string(),
            config: None,
            open: false,
            no_open: true,
            no_html: false,
            verbose: false,
        }
    }

    #[test]
    fn execute_writes_result_and_html() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("rules.xml");
        let destination = dir.path().join("out/result.xml");
        std::fs::write(
            &source,
            r#"<rules>
                <rule name="a" type="root" weight="10"/>
                <rule name="a" type="child" weight="10"/>
            </rules>"#,
        )
        .unwrap();

        let report = execute(&cli(&source, &destination)).unwrap();
        assert_eq!(report.winners().len(), 1);

        let written = std::fs::read_to_string(&destination).unwrap();
        let doc = RuleDocument::parse(&written).unwrap();
        assert_eq!(doc.entries().len(), 1);
        assert_eq!(doc.entries()[0].class, crate::PriorityClass::Child);
        assert!(render::html_path(&destination).is_file());
    }

    #[test]
    fn execute_without_html() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("rules.xml");
        let destination = dir.path().join("result.xml");
        std::fs::write(&source, "<rules/>").unwrap();

        let mut args = cli(&source, &destination);
        args.no_html = true;
        execute(&args).unwrap();
        assert!(destination.is_file());
        assert!(!render::html_path(&destination).exists());
    }

    #[test]
    fn execute_fails_on_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let err = execute(&cli(&dir.path().join("none.xml"), &dir.path().join("out.xml")))
            .unwrap_err();
        assert!(matches!(err, SieveError::SourceNotFound { .. }));
        assert!(!dir.path().join("out.xml").exists());
    }

    #[test]
    fn execute_fails_on_malformed_source() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("rules.xml");
        let destination = dir.path().join("result.xml");
        std::fs::write(&source, r#"<rules><rule name="a" type="root" weight="1"/>"#).unwrap();

        let err = execute(&cli(&source, &destination)).unwrap_err();
        assert!(matches!(err, SieveError::Pipeline(_)));
        // The destination exists (created up front) but nothing was rendered into it.
        assert_eq!(std::fs::read_to_string(&destination).unwrap(), "");
        assert!(!render::html_path(&destination).exists());
    }
}
