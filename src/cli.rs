//! Command-line interface for hintcheck.

use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use crate::config::{self, Config, CONFIG_NAMES};
use crate::detect::{Rule, Runner};
use crate::discover;
use crate::report;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Python type-annotation coverage checker.
///
/// Hintcheck parses Python sources, finds every function and method, and
/// reports missing or inconsistent type annotations. Each file gets an
/// annotation coverage percentage and a letter grade; files below the
/// pass threshold fail the run.
#[derive(Parser)]
#[command(name = "hintcheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check annotation coverage of Python files
    #[command(visible_alias = "check")]
    Lint(LintArgs),
    /// Create a new hintcheck config from a template
    Init(InitArgs),
    /// List the annotation rules
    Rules,
}

/// Arguments for the lint command.
#[derive(Parser)]
pub struct LintArgs {
    /// Path to check (file or directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Minimum coverage percent for a file to pass (0-100)
    #[arg(short, long)]
    pub threshold: Option<f64>,

    /// Lenient mode: pass at 85% coverage unless a threshold is given
    #[arg(long)]
    pub lenient: bool,

    /// Only scan this top-level subdirectory (repeatable)
    #[arg(long = "target", value_name = "NAME")]
    pub targets: Vec<String>,

    /// Show every diagnostic per file
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "hintcheck.yaml")]
    pub output: PathBuf,

    /// Template to use
    #[arg(short, long, default_value = "strict")]
    pub template: String,

    /// List available templates
    #[arg(short, long)]
    pub list: bool,
}

/// Available config templates.
struct Template {
    name: &'static str,
    description: &'static str,
    content: &'static str,
}

/// All available templates.
static TEMPLATES: &[Template] = &[
    Template {
        name: "strict",
        description: "Every function fully annotated; Optional and literal mistakes are fatal",
        content: include_str!("templates/strict.yaml"),
    },
    Template {
        name: "lenient",
        description: "Pass at 85% coverage, tests and migrations excluded",
        content: include_str!("templates/lenient.yaml"),
    },
];

/// Directory to look for a config in, given the scan path.
fn config_search_dir(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.to_path_buf()
    } else {
        path.parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Load the explicit config, or discover one, or fall back to defaults.
fn load_config(args: &LintArgs) -> anyhow::Result<Config> {
    let path = match &args.config {
        Some(p) => Some(p.clone()),
        None => {
            let scan_dir = config_search_dir(&args.path);
            config::discover_config(&[scan_dir.as_path(), Path::new(".")])
        }
    };

    match path {
        Some(p) => {
            log::debug!("using config {}", p.display());
            Ok(Config::parse_file(&p)?)
        }
        None => {
            log::debug!("no config found (looked for {}); using defaults", CONFIG_NAMES.join(", "));
            Ok(Config::default())
        }
    }
}

/// Command-line flags win over file values.
fn apply_overrides(config: &mut Config, args: &LintArgs) {
    if args.lenient {
        config.strict = false;
    }
    if args.threshold.is_some() {
        config.threshold = args.threshold;
    }
    if !args.targets.is_empty() {
        config.targets = args.targets.clone();
    }
    config.verbose |= args.verbose;
}

/// Run the lint command.
pub fn run_lint(args: &LintArgs) -> anyhow::Result<i32> {
    if args.no_color || !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    // Validate format
    if args.format != "pretty" && args.format != "json" {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty' or 'json'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    let mut config = match load_config(args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };
    apply_overrides(&mut config, args);

    if let Err(e) = config::validate(&config) {
        eprintln!("Error: invalid configuration: {}", e);
        return Ok(EXIT_ERROR);
    }

    if let Err(e) = std::fs::metadata(&args.path) {
        eprintln!("Error: cannot access path {:?}: {}", args.path, e);
        return Ok(EXIT_ERROR);
    }

    let policy = config.scoring_policy()?;
    let excluded = config.excluded_globset()?;

    let discovery = match discover::discover(&args.path, &config.targets, &excluded) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    if discovery.candidates.is_empty() && discovery.directories.is_empty() {
        eprintln!("Warning: no files to scan");
        return Ok(EXIT_SUCCESS);
    }

    let runner = Runner::new(policy);
    let summary = runner.run(&discovery);

    let path_str = args.path.to_string_lossy().to_string();
    match args.format.as_str() {
        "json" => report::write_json(&path_str, runner.policy(), &summary)?,
        _ => report::write_pretty(&path_str, runner.policy(), &summary, config.verbose),
    }

    if summary.all_passed() {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_FAILED)
    }
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    if args.list {
        return list_templates();
    }

    let template = match TEMPLATES.iter().find(|t| t.name == args.template) {
        Some(t) => t,
        None => {
            eprintln!("Error: unknown template {:?}", args.template);
            eprintln!("Run 'hintcheck init --list' to see available templates");
            return Ok(EXIT_ERROR);
        }
    };

    if args.output.exists() {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or use --output to specify a different path");
        return Ok(EXIT_ERROR);
    }

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = std::fs::write(&args.output, template.content) {
        eprintln!("Error: failed to write config: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {} from template '{}'", args.output.display(), template.name);
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to customize for your project", args.output.display());
    println!("  2. Run: hintcheck lint . --config {}", args.output.display());

    Ok(EXIT_SUCCESS)
}

/// List available templates.
fn list_templates() -> anyhow::Result<i32> {
    println!("Available templates:");
    println!();

    for template in TEMPLATES {
        let name = if template.name == "strict" {
            format!("{} (default)", template.name)
        } else {
            template.name.to_string()
        };
        println!("  {:<20} {}", name, template.description);
    }

    println!();
    println!("Usage:");
    println!("  hintcheck init --template <name>");

    Ok(EXIT_SUCCESS)
}

/// Run the rules command.
pub fn run_rules() -> anyhow::Result<i32> {
    for rule in Rule::ALL {
        println!(
            "  {:<28} {:<8} {}",
            rule.as_str(),
            rule.default_severity().to_string(),
            rule.description()
        );
    }
    Ok(EXIT_SUCCESS)
}
