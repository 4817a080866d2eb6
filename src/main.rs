use anyhow::{Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use market_chat::aggregator::{Aggregate, Notice};
use market_chat::app::{Answer, App, MarketOverview};
use market_chat::config::{Config, ProviderKind};
use market_chat::quote::QuoteRecord;
use market_chat::resolver::Strategy;
use market_chat::ticker::Ticker;
use market_chat::ui::formatters::format_percent;
use market_chat::ui::{render_portfolio, render_quotes};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[derive(Parser)]
#[command(name = "market-chat")]
#[command(about = "Financial assistant: ticker extraction, quotes and AI commentary", long_about = None)]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quote provider (overrides config)
    #[arg(long, global = true, value_enum)]
    provider: Option<ProviderArg>,

    /// Symbol extraction strategy (overrides config)
    #[arg(long, global = true, value_enum)]
    resolver: Option<ResolverArg>,

    /// Per-symbol fetch deadline in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum ProviderArg {
    Finnhub,
    Yahoo,
}

#[derive(Clone, Copy, ValueEnum)]
enum ResolverArg {
    Lexical,
    Model,
}

#[derive(Subcommand)]
enum Command {
    /// Extract ticker symbols from free text
    Symbols { text: Vec<String> },
    /// Fetch quotes for the given symbols
    Quotes { symbols: Vec<String> },
    /// Ask a question: symbols, quotes and AI commentary
    Ask { text: Vec<String> },
    /// Interactive chat session on stdin
    Chat,
    /// Quotes for the configured watchlist, with top movers
    Market {
        /// Add an AI market-wide analysis (counts as a query)
        #[arg(long)]
        analyze: bool,
    },
    /// Value the configured holdings
    Portfolio,
    /// Show config path and effective settings
    Config,
    /// Edit the watchlist used by `market`
    Watch {
        #[command(subcommand)]
        action: WatchAction,
    },
    /// Edit the holdings used by `portfolio`
    Hold {
        #[command(subcommand)]
        action: HoldAction,
    },
}

#[derive(Subcommand)]
enum WatchAction {
    Add { symbols: Vec<String> },
    Remove { symbols: Vec<String> },
}

#[derive(Subcommand)]
enum HoldAction {
    /// Buy shares; merges into an existing holding at the weighted average price
    Add { symbol: String, shares: u32, price: f64 },
    Remove { symbol: String },
}

fn init_logger() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();
}

fn apply_overrides(cli: &Cli, config: &mut Config) {
    if let Some(p) = cli.provider {
        config.provider = match p {
            ProviderArg::Finnhub => ProviderKind::Finnhub,
            ProviderArg::Yahoo => ProviderKind::Yahoo,
        };
    }
    if let Some(r) = cli.resolver {
        config.resolver = match r {
            ResolverArg::Lexical => Strategy::Lexical,
            ResolverArg::Model => Strategy::Model,
        };
    }
    if let Some(t) = cli.timeout.filter(|t| *t > 0) {
        config.fetch_timeout_secs = t;
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_notice(notice: &Option<Notice>) {
    if let Some(n) = notice {
        eprintln!("[{}] {}", n.title, n.message);
    }
}

fn print_aggregate(json: bool, aggregate: &Aggregate) -> Result<()> {
    if json {
        return print_json(aggregate);
    }
    print!("{}", render_quotes(&aggregate.records));
    print_notice(&aggregate.notice);
    Ok(())
}

fn print_movers(label: &str, records: &[QuoteRecord]) {
    if records.is_empty() {
        return;
    }
    let items: Vec<String> = records
        .iter()
        .map(|q| format!("{} {}", q.symbol, format_percent(q.changes_percentage)))
        .collect();
    println!("{}: {}", label, items.join("  "));
}

fn print_market(json: bool, overview: &MarketOverview) -> Result<()> {
    if json {
        return print_json(overview);
    }
    print!("{}", render_quotes(&overview.records));
    println!();
    print_movers("Top gainers", &overview.gainers);
    print_movers("Top losers", &overview.losers);
    if let Some(analysis) = &overview.analysis {
        println!("\n{}", analysis);
    }
    print_notice(&overview.notice);
    Ok(())
}

fn print_answer(json: bool, answer: &Answer) -> Result<()> {
    if json {
        return print_json(answer);
    }
    if let Some(summary) = &answer.summary {
        println!("{}", summary);
    }
    println!("{}", answer.commentary);
    print_notice(&answer.notice);
    Ok(())
}

async fn run_chat(app: &mut App, json: bool) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        let prompt = format!("[{}/{}] > ", app.usage.used, app.usage.limit);
        stdout.write_all(prompt.as_bytes()).await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            return Ok(());
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" || line == "exit" {
            return Ok(());
        }

        match app.ask(line).await {
            Ok(answer) => print_answer(json, &answer)?,
            Err(e) => eprintln!("Error: {}", e),
        }
        if app.usage.is_near_limit() && !app.usage.is_exhausted() {
            eprintln!("{} queries left today", app.usage.remaining());
        }
    }
}

fn edit_watchlist(config: &mut Config, action: &WatchAction) -> Result<()> {
    match action {
        WatchAction::Add { symbols } => {
            for t in Ticker::parse_all(symbols) {
                config.add_symbol(t.as_str());
            }
        }
        WatchAction::Remove { symbols } => {
            for s in symbols {
                config.remove_symbol(s);
            }
        }
    }
    config.save()?;
    println!("Watchlist: {}", config.watchlist.join(", "));
    Ok(())
}

fn edit_holdings(config: &mut Config, action: &HoldAction) -> Result<()> {
    match action {
        HoldAction::Add {
            symbol,
            shares,
            price,
        } => {
            let Some(t) = Ticker::parse(symbol) else {
                bail!("Invalid symbol: {}", symbol);
            };
            if *shares == 0 || *price <= 0.0 {
                bail!("Shares and price must be positive");
            }
            if !config.add_holding(t.as_str(), *shares, *price) {
                bail!("Share count overflow for {}", t);
            }
        }
        HoldAction::Remove { symbol } => config.remove_holding(symbol),
    }
    config.save()?;
    for h in &config.holdings {
        println!("{:<6} {:>8} @ {:.2}", h.symbol, h.shares, h.avg_price);
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load()?;

    // Edits persist the file as loaded, without command-line overrides.
    match &cli.command {
        Command::Watch { action } => return edit_watchlist(&mut config, action),
        Command::Hold { action } => return edit_holdings(&mut config, action),
        _ => {}
    }

    apply_overrides(&cli, &mut config);

    if let Command::Config = cli.command {
        if cli.json {
            return print_json(&config.redacted());
        }
        println!("Config file: {}", Config::config_path()?.display());
        println!("Provider:    {}", config.provider.label());
        println!("Resolver:    {:?}", config.resolver);
        println!("Max symbols: {}", config.max_symbols);
        println!("Timeout:     {}s", config.fetch_timeout_secs);
        println!("Watchlist:   {}", config.watchlist.join(", "));
        println!(
            "Keys:        finnhub {}, gemini {}",
            if config.finnhub_key().is_empty() { "missing" } else { "set" },
            if config.gemini_key().is_empty() { "missing" } else { "set" },
        );
        return Ok(());
    }

    let mut app = App::with_config(config);

    match cli.command {
        Command::Symbols { text } => {
            let symbols = app.resolve(&text.join(" ")).await;
            if cli.json {
                print_json(&symbols)?;
            } else if symbols.is_empty() {
                println!("No symbols found.");
            } else {
                let codes: Vec<String> = symbols.iter().map(|s| s.to_string()).collect();
                println!("{}", codes.join(", "));
            }
        }
        Command::Quotes { symbols } => {
            let tickers = Ticker::parse_all(&symbols);
            let aggregate = app.quotes(&tickers).await;
            print_aggregate(cli.json, &aggregate)?;
        }
        Command::Ask { text } => {
            let answer = app.ask(&text.join(" ")).await?;
            print_answer(cli.json, &answer)?;
        }
        Command::Chat => run_chat(&mut app, cli.json).await?,
        Command::Market { analyze } => {
            let overview = app.market_report(analyze).await?;
            print_market(cli.json, &overview)?;
            if let Some(ts) = &app.last_updated {
                eprintln!("Updated {} via {}", ts, app.provider_name());
            }
        }
        Command::Portfolio => {
            let (report, notice) = app.portfolio_report().await;
            if cli.json {
                print_json(&report)?;
            } else {
                print!("{}", render_portfolio(&report));
                print_notice(&notice);
            }
        }
        Command::Config | Command::Watch { .. } | Command::Hold { .. } => {}
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logger();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
