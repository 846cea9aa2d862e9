use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use navstate_lib::dom::{Dom, MemoryDom};
use navstate_lib::modules::navigation::{Crumb, Location};
use navstate_lib::page::{render_layout, LayoutOptions};
use navstate_lib::selector::Selector;
use navstate_lib::settings::NavConfig;
use navstate_lib::state::{AppContext, NavState};
use navstate_lib::storage::FileFlagStore;
use navstate_lib::NavigationStateController;

#[derive(Parser)]
#[command(name = "navstate")]
#[command(author, version, about = "Navigation UI state for server-rendered pages", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Navigation config (JSON). Defaults apply when omitted or missing
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Persisted UI flags file
    #[arg(short, long, global = true, default_value = "flags.json")]
    flags: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a page and print the resulting navigation state
    Show {
        /// Absolute URL or site path, e.g. /settings#account-info
        url: String,
    },

    /// Load a page, click the sidebar toggle and print the state
    ToggleSidebar { url: String },

    /// Load a page, click the dark mode switch and print the state
    ToggleDark { url: String },

    /// Load a page and click the first element matching a selector
    Click {
        url: String,

        /// Selector of the element to click, e.g. ".btn-delete"
        selector: String,
    },

    /// Print the breadcrumb trail for a URL without loading a page
    Breadcrumbs { url: String },
}

type Page = AppContext<MemoryDom, FileFlagStore>;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report<'a> {
    url: String,
    state: &'a NavState,
    active_menu: Option<String>,
    breadcrumbs: Vec<Crumb>,
    #[serde(skip_serializing_if = "Option::is_none")]
    click: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    navigate_to: Option<String>,
}

fn load_config(cli: &Cli) -> Result<NavConfig> {
    match &cli.config {
        Some(path) => NavConfig::load(path).with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(NavConfig::default()),
    }
}

async fn load_page(cli: &Cli, url: &str) -> Result<Page> {
    let config = load_config(cli)?;
    let location = Location::parse(url, &config.base_path).with_context(|| format!("Invalid URL {}", url))?;

    let options = LayoutOptions {
        settings_tabs: location.path == "/settings",
        success_alert: false,
        delete_button: true,
    };
    let doc = Rc::new(RefCell::new(render_layout(&config, options)));
    let store = FileFlagStore::open(&cli.flags);

    let nav = NavigationStateController::new(doc, store, config, &location).context("Invalid selector in config")?;
    let mut ctx = AppContext::new(nav);
    ctx.nav.on_page_load().await;
    Ok(ctx)
}

fn click_first(ctx: &mut Page, selector: &Selector) -> Result<String> {
    let node = ctx
        .nav
        .document()
        .borrow()
        .query(selector)
        .with_context(|| format!("No element matches {}", selector))?;
    Ok(format!("{:?}", ctx.click(node)))
}

fn active_menu(ctx: &Page) -> Option<String> {
    let dom = ctx.nav.document().borrow();
    let active = &ctx.nav.config().classes.active;
    dom.query_all(&ctx.nav.selectors().nav_links)
        .into_iter()
        .find(|link| dom.has_class(*link, active))
        .and_then(|link| dom.attr(link, "href"))
}

fn print_report(ctx: &mut Page, click: Option<String>) -> Result<()> {
    let state = ctx.nav.state().clone();
    let report = Report {
        url: state.url(),
        state: &state,
        active_menu: active_menu(ctx),
        breadcrumbs: ctx.nav.render_breadcrumbs(),
        click,
        navigate_to: ctx.take_navigation(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "navstate=debug,navstate_lib=debug"
    } else {
        "navstate=info,navstate_lib=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match &cli.command {
        Commands::Show { url } => {
            let mut ctx = load_page(&cli, url).await?;
            print_report(&mut ctx, None)?;
        }
        Commands::ToggleSidebar { url } => {
            let mut ctx = load_page(&cli, url).await?;
            let toggle = ctx.nav.selectors().toggle.clone();
            let outcome = click_first(&mut ctx, &toggle)?;
            print_report(&mut ctx, Some(outcome))?;
        }
        Commands::ToggleDark { url } => {
            let mut ctx = load_page(&cli, url).await?;
            let switch = ctx.nav.selectors().mode_switch.clone();
            let outcome = click_first(&mut ctx, &switch)?;
            print_report(&mut ctx, Some(outcome))?;
        }
        Commands::Click { url, selector } => {
            let selector: Selector = selector.parse().with_context(|| format!("Invalid selector {}", selector))?;
            let mut ctx = load_page(&cli, url).await?;
            let outcome = click_first(&mut ctx, &selector)?;
            print_report(&mut ctx, Some(outcome))?;
        }
        Commands::Breadcrumbs { url } => {
            let config = load_config(&cli)?;
            let location = Location::parse(url, &config.base_path).with_context(|| format!("Invalid URL {}", url))?;
            let crumbs = navstate_lib::modules::navigation::build_breadcrumbs(
                &config,
                &location.path,
                location.hash.as_deref().unwrap_or_default(),
            );
            println!("{}", serde_json::to_string_pretty(&crumbs)?);
        }
    }

    Ok(())
}
