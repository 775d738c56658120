use clap::{Parser, Subcommand, ValueEnum};
use docnav::navigation::{Collections, Navigation};
use docnav::path::parse;
use docnav::pipeline::Reconciler;
use docnav::registry::Registry;
use docnav::skip::{SkipPresets, SkipRule};
use docnav::{config, output};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "docnav")]
#[command(about = "Reconcile documentation navigation trees")]
#[command(long_about = "\
Reconcile documentation navigation trees

Reads the raw per-collection navigation forests produced by the content layer
and prints the canonical menu a page would render.

Input format (collections JSON):

  {
    \"payments_en\":    [ { \"title\": \"En\", \"children\": [ ... ] } ],
    \"payments_zh_cn\": [ ... ]
  }

Collection names are {module_base}_{locale_suffix}. Request paths come in two
forms:

  /zh-cn/payments/v1/guides/refunds    full form
  /payments/guides/refunds             simplified (locale from --locale)

Set RUST_LOG=docnav=debug to trace each pipeline stage.

Run 'docnav gen-config' to generate a documented docnav.toml.")]
#[command(version)]
struct Cli {
    /// Directory containing docnav.toml
    #[arg(long, default_value = ".", global = true)]
    config: PathBuf,

    /// UI locale (en, zh-CN, zh-TW)
    #[arg(long, default_value = "en", global = true)]
    locale: String,

    #[command(subcommand)]
    command: Command,
}

/// Shared flags for commands that read a collections file.
#[derive(clap::Args, Clone)]
struct InputArgs {
    /// Collections JSON file
    #[arg(long, default_value = "navigation.json")]
    input: PathBuf,

    /// Print JSON instead of the tree view
    #[arg(long)]
    json: bool,
}

/// Which container levels to elide.
#[derive(ValueEnum, Clone, Copy, Debug)]
enum SkipPreset {
    /// Language, module and version wrappers
    Default,
    LanguageOnly,
    ModuleOnly,
    /// Keep every level
    None,
}

impl SkipPreset {
    fn rules(self, registry: &Registry) -> Option<Vec<SkipRule>> {
        let defaults = registry.default_skip_rules();
        match self {
            SkipPreset::Default => None,
            SkipPreset::LanguageOnly => Some(SkipPresets::language_only(&defaults)),
            SkipPreset::ModuleOnly => Some(SkipPresets::module_only(&defaults)),
            SkipPreset::None => Some(SkipPresets::none()),
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Side menu for a page: reconciled, marked active, with breadcrumbs
    Reconcile {
        #[command(flatten)]
        input: InputArgs,
        /// Page being viewed
        #[arg(long, default_value = "/")]
        path: String,
    },
    /// Reconcile one module's navigation
    Module {
        /// Module key or alias
        module: String,
        #[command(flatten)]
        input: InputArgs,
        #[arg(long, value_enum, default_value_t = SkipPreset::Default)]
        skip: SkipPreset,
    },
    /// Parse a request path into its module, version and collection
    Parse {
        path: String,
        #[arg(long)]
        json: bool,
    },
    /// Module switcher entries for a page
    Menu {
        #[arg(long, default_value = "/")]
        path: String,
    },
    /// List collections (from --input, or every configured one)
    Collections {
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Print a stock docnav.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Command::Reconcile { input, path } => {
            let registry = load_registry(&cli.config)?;
            let nav = navigation(&registry, &input)?;
            let view = nav.navigation_items(&path, &cli.locale)?;
            if input.json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                output::print_descriptor(&path, &view.descriptor);
                println!();
                output::print_navigation(&view.items);
                if !view.breadcrumbs.is_empty() {
                    println!("Breadcrumbs: {}", output::format_breadcrumbs(&view.breadcrumbs));
                }
            }
            tracing::debug!("{}", output::format_cache_stats(&nav.reconciler().cache_stats()));
        }
        Command::Module {
            module,
            input,
            skip,
        } => {
            let registry = load_registry(&cli.config)?;
            let nav = navigation(&registry, &input)?;
            let rules = skip.rules(&registry);
            let items = nav.module_navigation(&module, &cli.locale, rules.as_deref())?;
            if input.json {
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else {
                output::print_navigation(&items);
            }
        }
        Command::Parse { path, json } => {
            let registry = load_registry(&cli.config)?;
            let descriptor = parse(&path, registry.content_locale(&cli.locale), &registry);
            if json {
                println!("{}", serde_json::to_string_pretty(&descriptor)?);
            } else {
                output::print_descriptor(&path, &descriptor);
            }
        }
        Command::Menu { path } => {
            let registry = load_registry(&cli.config)?;
            let nav = Navigation::new(Reconciler::new(registry), Collections::default());
            output::print_module_menu(&nav.module_menu(&path));
        }
        Command::Collections { input } => {
            let registry = load_registry(&cli.config)?;
            match input {
                Some(file) => {
                    let collections = Collections::load(&file)?;
                    output::print_collections(collections.names(), &registry);
                }
                None => {
                    let names = registry.all_collection_names();
                    output::print_collections(names.iter().map(String::as_str), &registry);
                }
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Stock config overlaid with `docnav.toml` from `dir`, validated.
fn load_registry(dir: &Path) -> Result<Arc<Registry>, Box<dyn std::error::Error>> {
    let nav_config = config::load_config(dir)?;
    Ok(Arc::new(Registry::from_config(&nav_config)?))
}

fn navigation(
    registry: &Arc<Registry>,
    input: &InputArgs,
) -> Result<Navigation, Box<dyn std::error::Error>> {
    let collections = Collections::load(&input.input)?;
    Ok(Navigation::new(Reconciler::new(registry.clone()), collections))
}

/// Log to stderr so stdout stays clean for `--json`. `RUST_LOG` overrides
/// the default `warn` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
