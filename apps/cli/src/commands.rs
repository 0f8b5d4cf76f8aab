//! CLI command definitions, routing, and tracing setup.

use std::io::{BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use schoolprompt_core::{PromptAssembler, RawForm, ReferenceTable, validate};
use schoolprompt_shared::{
    AppConfig, InputRecord, OTHER_COUNTRY, SchoolPromptError, init_config, init_config_at,
    load_config, load_config_from,
};

use crate::clipboard::copy_to_clipboard;
use crate::warnings::{critical_warnings, preview_title};

const VERIFY_NOTICE: &str = "AI research results must be verified against official sources \
     before use. / AIの調査結果は必ず公式情報で確認してください。";

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// SchoolPrompt: research prompts for international high school admissions.
#[derive(Parser)]
#[command(
    name = "schoolprompt",
    version,
    about = "Generate AI research prompts for verifying overseas high schools.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to ~/.schoolprompt/schoolprompt.toml).
    #[arg(long, global = true, env = "SCHOOLPROMPT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Generate a research prompt for one school.
    Generate(GenerateArgs),

    /// List supported countries.
    Countries,

    /// Print the reference record for a country.
    Show {
        /// Country key (e.g. Japan). Unknown keys show the "Other" record.
        country: String,

        /// Print JSON instead of TOML.
        #[arg(long)]
        json: bool,
    },

    /// Preview a country's critical warnings.
    Warnings {
        /// Country key.
        country: String,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Form fields for `generate`. Validation happens after parsing so that
/// every problem is reported at once.
#[derive(Args, Debug, Default)]
pub(crate) struct GenerateArgs {
    /// School name (2-200 characters).
    #[arg(long)]
    pub school_name: Option<String>,

    /// Country key, or "Other" together with --other-country.
    #[arg(long)]
    pub country: Option<String>,

    /// Country name when --country is "Other".
    #[arg(long)]
    pub other_country: Option<String>,

    /// City, state, or province.
    #[arg(long)]
    pub city: Option<String>,

    /// School type: Public, Private, International, or free text.
    #[arg(long)]
    pub school_type: Option<String>,

    /// Curriculum tag (IB, A-Level, AP, National, Unknown). Repeatable.
    #[arg(long)]
    pub curriculum: Vec<String>,

    /// Investigation purpose: new, update, or verify.
    #[arg(long)]
    pub purpose: Option<String>,

    /// Include local-language searches.
    #[arg(long, overrides_with = "no_local_search")]
    pub local_search: bool,

    /// Omit local-language searches.
    #[arg(long, overrides_with = "local_search")]
    pub no_local_search: bool,

    /// Extra URLs to check, comma-separated.
    #[arg(long)]
    pub urls: Option<String>,

    /// Write the prompt to a file instead of stdout.
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Copy the prompt to the clipboard.
    #[arg(long)]
    pub copy: bool,

    /// Acknowledge the verification notice without asking.
    #[arg(short, long)]
    pub yes: bool,
}

impl GenerateArgs {
    /// Raw form values, with unset fields taken from config.
    fn to_form(&self, config: &AppConfig) -> RawForm {
        let include_local_search = if self.local_search {
            true
        } else if self.no_local_search {
            false
        } else {
            config.defaults.include_local_search
        };

        RawForm {
            school_name: self.school_name.clone().unwrap_or_default(),
            country: self.country.clone().unwrap_or_default(),
            other_country: self.other_country.clone().unwrap_or_default(),
            city_state: self.city.clone().unwrap_or_default(),
            school_type: self.school_type.clone().unwrap_or_default(),
            curriculum: self.curriculum.clone(),
            purpose: self
                .purpose
                .clone()
                .unwrap_or_else(|| config.defaults.purpose.as_str().to_string()),
            include_local_search,
            additional_urls: self.urls.clone().unwrap_or_default(),
        }
    }
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr; stdout carries the prompt.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "schoolprompt=info",
        1 => "schoolprompt=debug",
        _ => "schoolprompt=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Command::Generate(args) => cmd_generate(config_path, &args),
        Command::Countries => cmd_countries(config_path),
        Command::Show { country, json } => cmd_show(config_path, &country, json),
        Command::Warnings { country } => cmd_warnings(config_path, &country),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(config_path),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_generate(config_path: Option<&Path>, args: &GenerateArgs) -> Result<()> {
    let config = resolve_config(config_path)?;
    let table = load_table(&config)?;

    let input = validate_form(args, &config, &table)?;

    print_warning_preview(&input.country, &table);

    let prompt = PromptAssembler::new(&table).assemble(&input);
    let fingerprint = fingerprint(&prompt);

    info!(
        school = %input.school_name,
        country = %input.resolved_country(),
        purpose = %input.purpose,
        fingerprint = %fingerprint,
        "prompt generated"
    );

    match &args.out {
        Some(path) => {
            std::fs::write(path, &prompt)
                .map_err(|e| eyre!("failed to write '{}': {e}", path.display()))?;
            eprintln!("Prompt written to {}", path.display());
        }
        None => print!("{prompt}"),
    }
    eprintln!("sha256: {fingerprint}");

    if args.copy {
        if args.yes || confirm_verification()? {
            let outcome = copy_to_clipboard(&prompt, &config.clipboard.resolved_fallback_dir())?;
            eprintln!("{outcome}");
        } else {
            eprintln!("Copy skipped. Re-run with --yes to acknowledge the notice.");
        }
    }

    Ok(())
}

fn cmd_countries(config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let table = load_table(&config)?;

    println!();
    for key in table.known_keys() {
        let record = table.lookup(key);
        println!(
            "  {key:<14} {}",
            record.local_name.as_deref().unwrap_or("-")
        );
    }
    println!("  {OTHER_COUNTRY:<14} (any other country, with --other-country)");
    println!();

    Ok(())
}

fn cmd_show(config_path: Option<&Path>, country: &str, json: bool) -> Result<()> {
    let config = resolve_config(config_path)?;
    let table = load_table(&config)?;

    if country != OTHER_COUNTRY && !table.is_known(country) {
        warn!(country, "unknown country, showing the \"{OTHER_COUNTRY}\" record");
    }
    let record = table.lookup(country);

    let rendered = if json {
        serde_json::to_string_pretty(record)?
    } else {
        toml::to_string_pretty(record)?
    };
    println!("{rendered}");

    Ok(())
}

fn cmd_warnings(config_path: Option<&Path>, country: &str) -> Result<()> {
    let config = resolve_config(config_path)?;
    let table = load_table(&config)?;

    if !print_warning_preview(country, &table) {
        println!("No country-specific warnings for '{country}'.");
    }
    Ok(())
}

fn cmd_config_init(config_path: Option<&Path>) -> Result<()> {
    let path = match config_path {
        Some(path) => {
            init_config_at(path)?;
            path.to_path_buf()
        }
        None => init_config()?,
    };
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Config from `--config`, or the default location.
fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    Ok(config)
}

/// Built-in reference data plus the configured overlay, if any.
fn load_table(config: &AppConfig) -> Result<ReferenceTable> {
    let mut table = ReferenceTable::embedded()?;

    if let Some(extra) = config
        .reference
        .extra_path
        .as_deref()
        .filter(|p| !p.trim().is_empty())
    {
        table.merge_file(Path::new(extra))?;
    }

    Ok(table)
}

/// Validate the `generate` flags, printing every field error on rejection.
fn validate_form(
    args: &GenerateArgs,
    config: &AppConfig,
    table: &ReferenceTable,
) -> schoolprompt_shared::Result<InputRecord> {
    validate(&args.to_form(config), table).map_err(|errors| {
        eprintln!();
        for error in errors.errors() {
            eprintln!("  ✗ {error}");
        }
        eprintln!();
        SchoolPromptError::from(errors)
    })
}

/// Print the critical warnings for `country` to stderr. Returns whether any were shown.
fn print_warning_preview(country: &str, table: &ReferenceTable) -> bool {
    let preview = critical_warnings(table.lookup(country));
    if preview.is_empty() {
        return false;
    }

    eprintln!();
    eprintln!("  {}", preview_title(country));
    for warning in preview {
        eprintln!("  - {warning}");
    }
    eprintln!();
    true
}

/// Ask for the verification acknowledgment on stderr/stdin.
fn confirm_verification() -> Result<bool> {
    let stdin = std::io::stdin();
    if !stdin.is_terminal() {
        warn!("stdin is not a terminal, cannot confirm verification notice");
        return Ok(false);
    }

    eprint!("{VERIFY_NOTICE}\nCopy to clipboard? [y/N] ");
    std::io::stderr().flush()?;

    let mut answer = String::new();
    stdin.lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "Yes"))
}

/// SHA-256 of the prompt, as lowercase hex.
fn fingerprint(prompt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(prompt.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use schoolprompt_shared::Purpose;

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("parse args")
    }

    fn generate_args(args: &[&str]) -> GenerateArgs {
        let mut argv = vec!["schoolprompt", "generate"];
        argv.extend_from_slice(args);
        match parse(&argv).command {
            Command::Generate(args) => args,
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn generate_collects_repeated_curriculum() {
        let args = generate_args(&[
            "--school-name",
            "Example High School",
            "--country",
            "Japan",
            "--curriculum",
            "IB",
            "--curriculum",
            "AP",
            "--copy",
            "-y",
        ]);
        assert_eq!(args.curriculum, ["IB", "AP"]);
        assert!(args.copy && args.yes);
    }

    #[test]
    fn form_uses_config_defaults() {
        let mut config = AppConfig::default();
        config.defaults.purpose = Purpose::Verify;
        config.defaults.include_local_search = false;

        let form = generate_args(&["--school-name", "X School", "--country", "Korea"])
            .to_form(&config);
        assert_eq!(form.purpose, "verify");
        assert!(!form.include_local_search);
    }

    #[test]
    fn flags_override_config_defaults() {
        let config = AppConfig::default();

        let form = generate_args(&["--purpose", "update", "--no-local-search"]).to_form(&config);
        assert_eq!(form.purpose, "update");
        assert!(!form.include_local_search);

        let form =
            generate_args(&["--no-local-search", "--local-search"]).to_form(&config);
        assert!(form.include_local_search);
    }

    #[test]
    fn missing_fields_reach_validation() {
        let config = AppConfig::default();
        let table = ReferenceTable::embedded().unwrap();

        let errors = validate(&generate_args(&[]).to_form(&config), &table).unwrap_err();
        assert!(errors.has("school_name"));
        assert!(errors.has("country"));
    }

    #[test]
    fn rejected_form_is_validation_error() {
        let config = AppConfig::default();
        let table = ReferenceTable::embedded().unwrap();

        let err = validate_form(&generate_args(&["--country", "Japan"]), &config, &table)
            .unwrap_err();
        assert!(matches!(err, SchoolPromptError::Validation { .. }));
        assert!(err.to_string().contains("Please enter school name"));

        let input = validate_form(
            &generate_args(&["--school-name", "Example High School", "--country", "Japan"]),
            &config,
            &table,
        )
        .expect("valid form");
        assert_eq!(input.country, "Japan");
    }

    #[test]
    fn load_table_applies_configured_overlay() {
        let dir = std::env::temp_dir().join(format!("sp-cli-overlay-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("overlay.toml");
        std::fs::write(
            &path,
            r#"
[[countries]]
key = "Atlantis"
local_name = "Ἀτλαντίς"
warnings = ["CRITICAL: check the tide tables"]

[countries.education_system]
total_years = 12
structure = "6 + 3 + 3"
high_school_name = "High School"
graduation_month = "June"
academic_calendar = "September - June"
"#,
        )
        .unwrap();

        let mut config = AppConfig::default();
        config.reference.extra_path = Some(path.display().to_string());
        let table = load_table(&config).unwrap();

        assert!(table.is_known("Atlantis"));
        assert_eq!(table.len(), 12);
        assert_eq!(table.lookup("Atlantis").local_name.as_deref(), Some("Ἀτλαντίς"));
        assert_eq!(
            critical_warnings(table.lookup("Atlantis")),
            ["CRITICAL: check the tide tables"]
        );

        // Blank paths are ignored; missing files are reported.
        config.reference.extra_path = Some("  ".into());
        assert_eq!(load_table(&config).unwrap().len(), 11);
        config.reference.extra_path = Some(dir.join("missing.toml").display().to_string());
        assert!(load_table(&config).is_err());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = parse(&["schoolprompt", "show", "Japan", "--json", "-vv", "--config", "a.toml"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config.as_deref(), Some(Path::new("a.toml")));
        assert!(matches!(cli.command, Command::Show { json: true, .. }));
    }

    #[test]
    fn fingerprint_is_sha256_hex() {
        assert_eq!(
            fingerprint(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(fingerprint("prompt").len(), 64);
    }

    #[test]
    fn record_renders_as_toml() {
        let table = ReferenceTable::embedded().unwrap();
        let rendered = toml::to_string_pretty(table.lookup("Malaysia")).unwrap();
        assert!(rendered.contains("key = \"Malaysia\""));
        assert!(rendered.contains("[[special_cases]]"));
    }
}
