use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use po_translator::mt::{MockMode, MockTranslator};
use po_translator::{Backend, PatternSet, PoCatalog, PoFileTranslator, Translator, TranslatorConfig};

/// Machine-translate a PO catalog, keeping reStructuredText markup intact
#[derive(Debug, Parser)]
#[command(name = "po-translator", version, about)]
struct Cli {
    /// PO file to translate in place
    file: PathBuf,

    /// Translation backend
    #[arg(long, value_enum, default_value_t = Backend::DeepL)]
    api: Backend,

    /// Source language code
    #[arg(short, long, default_value = "auto")]
    source_lang: String,

    /// Target language code
    #[arg(short, long, default_value = "en")]
    target_lang: String,

    /// Proxy URL (library only)
    #[arg(short, long)]
    proxies: Option<String>,

    /// Regex pattern for markup to keep untranslated (library only)
    #[arg(short, long)]
    exclude_patterns: Option<String>,

    /// Leave entries that already have a translation alone
    #[arg(long)]
    skip_translated: bool,

    /// With --skip-translated, still retranslate fuzzy entries
    #[arg(long)]
    retranslate_fuzzy: bool,

    /// Use the offline mock translator instead of a real backend
    #[arg(long)]
    mock: bool,

    /// Log every translated entry
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if cli.proxies.is_some() {
        bail!("--proxies is only available through the library API (TranslatorConfig::with_proxy)");
    }
    if cli.exclude_patterns.is_some() {
        bail!(
            "--exclude-patterns is only available through the library API (PatternSet::from_patterns)"
        );
    }

    let config = TranslatorConfig::new(cli.source_lang.as_str(), cli.target_lang.as_str());
    config.validate()?;

    let translator: Arc<dyn Translator> = if cli.mock {
        Arc::new(MockTranslator::new(MockMode::Suffix).with_target_lang(cli.target_lang.as_str()))
    } else {
        Arc::from(po_translator::build_translator(cli.api, &config)?)
    };

    let catalog = PoCatalog::load(&cli.file)
        .with_context(|| format!("cannot open catalog {}", cli.file.display()))?;

    info!(
        file = %cli.file.display(),
        api = %cli.api,
        source = %cli.source_lang,
        target = %cli.target_lang,
        "starting"
    );

    let mut driver = PoFileTranslator::new(catalog, PatternSet::sphinx(), translator);
    let report = driver
        .translate(cli.skip_translated, cli.retranslate_fuzzy)
        .await
        .context("translation stopped")?;
    driver.save()?;

    println!(
        "{}: {} translated, {} skipped, {} plural entries skipped",
        cli.file.display(),
        report.translated,
        report.skipped,
        report.plural_skipped
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["po-translator", "index.po"]).unwrap();
        assert_eq!(cli.file, PathBuf::from("index.po"));
        assert_eq!(cli.api, Backend::DeepL);
        assert_eq!(cli.source_lang, "auto");
        assert_eq!(cli.target_lang, "en");
        assert!(!cli.skip_translated && !cli.retranslate_fuzzy && !cli.mock);
    }

    #[test]
    fn test_library_only_flags_take_one_value() {
        let cli = Cli::try_parse_from([
            "po-translator",
            "-p",
            "http://127.0.0.1:8080",
            "-e",
            r"\{\w+\}",
            "index.po",
        ])
        .unwrap();
        assert_eq!(cli.file, PathBuf::from("index.po"));
        assert_eq!(cli.proxies.as_deref(), Some("http://127.0.0.1:8080"));
        assert_eq!(cli.exclude_patterns.as_deref(), Some(r"\{\w+\}"));
    }

    #[test]
    fn test_backend_and_flags() {
        let cli = Cli::try_parse_from([
            "po-translator",
            "--api",
            "google",
            "-s",
            "en",
            "-t",
            "tr",
            "--skip-translated",
            "--retranslate-fuzzy",
            "index.po",
        ])
        .unwrap();
        assert_eq!(cli.api, Backend::Google);
        assert_eq!(cli.target_lang, "tr");
        assert!(cli.skip_translated && cli.retranslate_fuzzy);
        assert!(Cli::try_parse_from(["po-translator", "--api", "bing", "index.po"]).is_err());
    }
}
