use clap::{Parser, Subcommand};
use seo_maestro::config::{self, SeoConfig};
use seo_maestro::context::SeoContext;
use seo_maestro::field::FieldRegistry;
use seo_maestro::host::{ContentStore, Language};
use seo_maestro::imaging::FileProbe;
use seo_maestro::output::{self, CheckSummary};
use seo_maestro::page_value::PageSeoValue;
use seo_maestro::sitemap::{self, SitemapBuilder};
use seo_maestro::store::MemoryStore;
use std::path::PathBuf;
use std::time::SystemTime;

#[derive(Parser)]
#[command(name = "seo-maestro")]
#[command(about = "Render SEO tags and XML sitemaps for a CMS site")]
#[command(long_about = "\
Render SEO tags and XML sitemaps for a CMS site

Reads a site export (pages, languages, templates, stored SEO data) and the
SEO settings file, then renders the head tags of a page or writes the
sitemap.

Value resolution (first available wins):
  page override → template-context setting → field setting → module default

Text values may reference other page fields with {placeholders}, e.g.
  {title}, {parent.title}, {seo.meta.description}

Run 'seo-maestro gen-config' to generate a documented seo.toml.")]
#[command(version)]
struct Cli {
    /// SEO settings file
    #[arg(long, default_value = "seo.toml", global = true)]
    config: PathBuf,

    /// Site export (JSON)
    #[arg(long, default_value = "site.json", global = true)]
    site: PathBuf,

    /// Site root directory; the sitemap path is relative to it
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Directory serving the site's files, for reading Open Graph image sizes
    #[arg(long, global = true)]
    public_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the SEO tags of a page
    Render {
        /// Page id or name
        page: String,
        /// Language name; the default language if omitted
        #[arg(long)]
        language: Option<String>,
        /// SEO field to render; the first one of the page's template if omitted
        #[arg(long)]
        field: Option<String>,
    },
    /// Write the XML sitemap
    Sitemap {
        /// Output path, overriding the configured one
        #[arg(long)]
        output: Option<PathBuf>,
        /// Regenerate even if the existing sitemap is still fresh
        #[arg(long)]
        force: bool,
        /// List the entries without writing
        #[arg(long)]
        dry_run: bool,
    },
    /// List every SEO field with its description
    Fields,
    /// Validate the settings against the site without writing anything
    Check,
    /// Print a stock seo.toml with all options documented
    GenConfig,
}

/// Everything a command needs, loaded from disk.
struct Site {
    store: MemoryStore,
    config: SeoConfig,
    fields: FieldRegistry,
    probe: Option<FileProbe>,
}

impl Site {
    fn load(cli: &Cli) -> Result<Self, Box<dyn std::error::Error>> {
        let config = config::load_config(&cli.config)?;
        let fields = FieldRegistry::from_config(&config)?;
        let store = MemoryStore::load(&cli.site)?;
        let probe = cli
            .public_dir
            .as_ref()
            .map(|dir| FileProbe::new(dir).with_prefix(&config.module.base_url));
        Ok(Self {
            store,
            config,
            fields,
            probe,
        })
    }

    fn context(&self) -> SeoContext<'_> {
        let ctx = SeoContext::new(&self.store, &self.config.module, &self.fields);
        match &self.probe {
            Some(probe) => ctx.with_probe(probe),
            None => ctx,
        }
    }

    fn language(&self, name: &str) -> Result<Language, String> {
        let languages = self.store.languages();
        languages
            .iter()
            .find(|l| l.name == name || (l.default && name == self.config.module.default_language))
            .cloned()
            .ok_or_else(|| {
                let names: Vec<&str> = languages.iter().map(|l| l.name.as_str()).collect();
                format!("unknown language '{name}', available: {names:?}")
            })
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    match &cli.command {
        Command::Render {
            page,
            language,
            field,
        } => {
            let site = Site::load(&cli)?;
            let id = site
                .store
                .resolve_page(page)
                .ok_or_else(|| format!("page '{page}' not found"))?;
            let mut ctx = site.context();
            if let Some(name) = language {
                ctx = ctx.with_language(Some(site.language(name)?));
            }
            let info = ctx.page(id).ok_or_else(|| format!("page {id} has no info"))?;
            let field = match field {
                Some(field) => field.clone(),
                None => site
                    .store
                    .templates()
                    .into_iter()
                    .find(|t| t.name == info.template)
                    .and_then(|t| t.seo_fields.into_iter().next())
                    .ok_or_else(|| format!("template '{}' has no SEO field", info.template))?,
            };
            let value = PageSeoValue::load(&site.store, id, &field);
            println!("{}", value.render(&ctx)?);
        }
        Command::Sitemap {
            output: target,
            force,
            dry_run,
        } => {
            let site = Site::load(&cli)?;
            let path = target
                .clone()
                .unwrap_or_else(|| sitemap::sitemap_path(&site.config.sitemap, &cli.root));
            let due = target.is_some()
                || sitemap::should_generate(&site.config.sitemap, &cli.root, SystemTime::now());
            if !due && !force && !dry_run {
                println!("Sitemap {} is up to date", path.display());
                return Ok(());
            }
            let ctx = site.context();
            let builder = SitemapBuilder::new(&ctx);
            let items = builder.items();
            if *dry_run {
                output::print_sitemap_output(&items, None);
            } else if builder.write(&items, &path)? {
                output::print_sitemap_output(&items, Some(&path));
            } else {
                output::print_sitemap_output(&items, None);
            }
        }
        Command::Fields => {
            output::print_fields();
        }
        Command::Check => {
            let site = Site::load(&cli)?;
            println!("==> Checking {} against {}", cli.config.display(), cli.site.display());
            let ctx = site.context();
            let templates = site.store.templates();
            let path = sitemap::sitemap_path(&site.config.sitemap, &cli.root);
            let summary = CheckSummary {
                config: &site.config,
                templates: &templates,
                candidate_pages: sitemap::candidate_pages(&ctx).len(),
                sitemap_path: &path,
                sitemap_due: sitemap::should_generate(
                    &site.config.sitemap,
                    &cli.root,
                    SystemTime::now(),
                ),
            };
            output::print_check_output(&summary);
            println!("==> Settings are valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
