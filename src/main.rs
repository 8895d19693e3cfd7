use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use aiswitch_console::backend::types::{
    ChannelCreate, ChannelUpdate, ModelCreate, ModelSpec, ModelUpdate, TestType,
};
use aiswitch_console::cli::{self, Console, OutputFormat, catalog, testing};
use aiswitch_console::config::{self, ConsoleConfig};
use aiswitch_console::web;

#[derive(Debug, Parser)]
#[command(name = "aiswitch")]
#[command(about = "Operator console for the aiswitch model gateway")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show test analytics: daily trend, model comparison, type distribution
    Analytics {
        /// Day range: 7, 14 or 30 (default: analytics.default_days)
        #[arg(long)]
        days: Option<u32>,
        /// Output format: table (default), json, csv (trend only)
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Show one model's daily performance
    Performance {
        model_id: i64,
        #[arg(long, default_value = "7")]
        days: u32,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Manage upstream channels
    Channels {
        #[command(subcommand)]
        action: ChannelAction,
    },
    /// Manage models
    Models {
        #[command(subcommand)]
        action: ModelAction,
    },
    /// Trigger tests and inspect results
    Test {
        #[command(subcommand)]
        action: TestAction,
    },
    /// Generate the downstream config from the top-ranked models
    Generate {
        #[arg(long, default_value = "5")]
        top_n: u32,
        /// Restrict to one channel
        #[arg(long)]
        channel: Option<i64>,
        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Check backend reachability and local configuration
    Health,
    /// Show recent console activity
    Activity {
        #[arg(long, default_value = "20")]
        limit: usize,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// View and manage console configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Launch the web console
    Web {
        /// Address to bind (default: web.addr)
        #[arg(long)]
        addr: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
enum ChannelAction {
    /// List all channels
    List {
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Show one channel
    Show { id: i64 },
    /// Create a channel
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        base_url: String,
        #[arg(long)]
        api_key: Option<String>,
        #[arg(long, default_value = "bearer")]
        auth_type: String,
        /// Extra request header, `KEY=VALUE` (repeatable)
        #[arg(long = "header", value_parser = parse_header)]
        headers: Vec<(String, String)>,
        /// Create the channel disabled
        #[arg(long)]
        inactive: bool,
    },
    /// Update fields of a channel
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        base_url: Option<String>,
        #[arg(long)]
        api_key: Option<String>,
        #[arg(long)]
        auth_type: Option<String>,
        #[arg(long)]
        active: Option<bool>,
    },
    /// Delete a channel and its models
    Delete { id: i64 },
}

#[derive(Debug, Subcommand)]
enum ModelAction {
    /// List models
    List {
        /// Only models of this channel
        #[arg(long)]
        channel: Option<i64>,
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Show one model
    Show { id: i64 },
    /// Create a model
    Add {
        #[arg(long)]
        channel: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        identifier: String,
        #[arg(long)]
        display_name: Option<String>,
        #[arg(long)]
        context_window: Option<u64>,
        #[arg(long)]
        max_tokens: Option<u64>,
        #[arg(long)]
        tools: bool,
        #[arg(long)]
        vision: bool,
        #[arg(long)]
        cost_input: Option<f64>,
        #[arg(long)]
        cost_output: Option<f64>,
        /// Create the model disabled
        #[arg(long)]
        inactive: bool,
    },
    /// Update fields of a model
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        identifier: Option<String>,
        #[arg(long)]
        display_name: Option<String>,
        #[arg(long)]
        context_window: Option<u64>,
        #[arg(long)]
        max_tokens: Option<u64>,
        #[arg(long)]
        tools: Option<bool>,
        #[arg(long)]
        vision: Option<bool>,
        #[arg(long)]
        cost_input: Option<f64>,
        #[arg(long)]
        cost_output: Option<f64>,
        #[arg(long)]
        active: Option<bool>,
    },
    /// Delete a model
    Delete { id: i64 },
    /// Import models from a CSV file
    Import { file: PathBuf },
    /// Show the current model ranking
    Ranking {
        #[arg(long, default_value = "table")]
        format: String,
    },
}

#[derive(Debug, Subcommand)]
enum TestAction {
    /// Queue tests for one or more models
    Run {
        #[arg(required = true)]
        model_ids: Vec<i64>,
        /// speed (default), code or tool
        #[arg(long = "type", default_value = "speed", value_parser = parse_test_type)]
        test_type: TestType,
    },
    /// Show recent test results
    Results {
        #[arg(long, default_value = "20")]
        limit: u32,
        #[arg(long)]
        model: Option<i64>,
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Show a model's health summary
    Health { model_id: i64 },
    /// Recompute model rankings
    Rerank,
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Show the effective (merged) configuration
    Show,
    /// Create a default config file at ~/.aiswitch/config.toml
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
    /// Set a config value (e.g. `aiswitch config set backend.base_url http://gw:8000`)
    Set { key: String, value: String },
    /// Reset config to defaults
    Reset,
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    Ok((key.trim().to_string(), value.trim().to_string()))
}

fn parse_test_type(raw: &str) -> Result<TestType, String> {
    TestType::parse(raw).ok_or_else(|| format!("unknown test type '{raw}' (use speed, code or tool)"))
}

fn init_tracing(config: &ConsoleConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("aiswitch_console={}", config.logging.level)));

    // A second init (e.g. in tests) is harmless.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init();
}

fn main() -> Result<()> {
    let app = App::parse();
    let config = config::load();
    init_tracing(&config);

    match app.command {
        // Config commands work on files and need no backend.
        Commands::Config { action } => run_config(action),
        Commands::Web { addr } => web::serve(config, addr.as_deref()),
        command => run_console(&Console::new(config), command),
    }
}

fn run_config(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => cli::run_config_show(),
        ConfigAction::Init { force } => cli::run_config_init(force),
        ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
        ConfigAction::Reset => cli::run_config_reset(),
    }
}

fn run_console(console: &Console, command: Commands) -> Result<()> {
    match command {
        Commands::Analytics { days, format } => {
            cli::run_analytics(console, days, OutputFormat::from_str_opt(Some(&format)))
        }
        Commands::Performance {
            model_id,
            days,
            format,
        } => cli::run_performance(console, model_id, days, OutputFormat::from_str_opt(Some(&format))),
        Commands::Channels { action } => run_channels(console, action),
        Commands::Models { action } => run_models(console, action),
        Commands::Test { action } => run_tests(console, action),
        Commands::Generate {
            top_n,
            channel,
            output,
        } => cli::run_generate(console, top_n, channel, output.as_deref()),
        Commands::Health => cli::run_health(console),
        Commands::Activity { limit, format } => {
            cli::run_activity(console, limit, OutputFormat::from_str_opt(Some(&format)))
        }
        Commands::Config { action } => run_config(action),
        Commands::Web { .. } => anyhow::bail!("`web` is not a console command"),
    }
}

fn run_channels(console: &Console, action: ChannelAction) -> Result<()> {
    match action {
        ChannelAction::List { format } => {
            catalog::run_channels_list(console, OutputFormat::from_str_opt(Some(&format)))
        }
        ChannelAction::Show { id } => catalog::run_channel_show(console, id),
        ChannelAction::Add {
            name,
            base_url,
            api_key,
            auth_type,
            headers,
            inactive,
        } => {
            let channel = ChannelCreate {
                name,
                base_url,
                api_key,
                auth_type,
                headers: (!headers.is_empty()).then(|| headers.into_iter().collect::<BTreeMap<_, _>>()),
                is_active: !inactive,
            };
            catalog::run_channel_add(console, &channel)
        }
        ChannelAction::Update {
            id,
            name,
            base_url,
            api_key,
            auth_type,
            active,
        } => {
            let update = ChannelUpdate {
                name,
                base_url,
                api_key,
                auth_type,
                headers: None,
                is_active: active,
            };
            catalog::run_channel_update(console, id, &update)
        }
        ChannelAction::Delete { id } => catalog::run_channel_delete(console, id),
    }
}

fn run_models(console: &Console, action: ModelAction) -> Result<()> {
    match action {
        ModelAction::List { channel, format } => {
            catalog::run_models_list(console, channel, OutputFormat::from_str_opt(Some(&format)))
        }
        ModelAction::Show { id } => catalog::run_model_show(console, id),
        ModelAction::Add {
            channel,
            name,
            identifier,
            display_name,
            context_window,
            max_tokens,
            tools,
            vision,
            cost_input,
            cost_output,
            inactive,
        } => {
            let mut spec = ModelSpec::new(name, identifier);
            spec.display_name = display_name;
            spec.context_window = context_window;
            spec.max_tokens = max_tokens;
            spec.supports_tools = tools;
            spec.supports_vision = vision;
            spec.cost_input = cost_input;
            spec.cost_output = cost_output;
            spec.is_active = !inactive;
            catalog::run_model_add(
                console,
                &ModelCreate {
                    channel_id: channel,
                    spec,
                },
            )
        }
        ModelAction::Update {
            id,
            name,
            identifier,
            display_name,
            context_window,
            max_tokens,
            tools,
            vision,
            cost_input,
            cost_output,
            active,
        } => {
            let update = ModelUpdate {
                name,
                model_identifier: identifier,
                display_name,
                context_window,
                max_tokens,
                supports_tools: tools,
                supports_vision: vision,
                cost_input,
                cost_output,
                is_active: active,
            };
            catalog::run_model_update(console, id, &update)
        }
        ModelAction::Delete { id } => catalog::run_model_delete(console, id),
        ModelAction::Import { file } => catalog::run_models_import(console, &file),
        ModelAction::Ranking { format } => {
            catalog::run_models_ranking(console, OutputFormat::from_str_opt(Some(&format)))
        }
    }
}

fn run_tests(console: &Console, action: TestAction) -> Result<()> {
    match action {
        TestAction::Run {
            model_ids,
            test_type,
        } => testing::run_test(console, &model_ids, test_type),
        TestAction::Results {
            limit,
            model,
            format,
        } => testing::run_results(console, limit, model, OutputFormat::from_str_opt(Some(&format))),
        TestAction::Health { model_id } => testing::run_model_health(console, model_id),
        TestAction::Rerank => testing::run_rerank(console),
    }
}
