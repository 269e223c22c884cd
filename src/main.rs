use alicloud_resource::resource::{get_all_service_names, get_service};
use alicloud_resource::{get_resource, Config, Instance, Resource, ResourceCollection};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use futures::TryStreamExt;
use serde_json::Value;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Manage Alibaba Cloud instances from the command line
#[derive(Parser, Debug)]
#[command(name = "alicloud", version, about, long_about = None)]
struct Args {
    /// Service to talk to
    #[arg(long, default_value = "ecs")]
    service: String,

    /// Region to use (overrides ALIBABA_CLOUD_REGION_ID and the config file)
    #[arg(short, long)]
    region: Option<String>,

    /// Endpoint base URL override
    #[arg(long)]
    endpoint: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    output: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List instances
    List {
        /// Only the instance with this id
        #[arg(long)]
        instance_id: Option<String>,
        /// Only instances in this status (Running, Stopped, ...)
        #[arg(long)]
        status: Option<String>,
        /// Extra equality filter, KEY=VALUE
        #[arg(long = "filter", value_parser = parse_key_val)]
        filters: Vec<(String, String)>,
        /// Stop after this many instances
        #[arg(long)]
        limit: Option<String>,
        /// Instances per request
        #[arg(long)]
        page_size: Option<String>,
        /// Print page by page
        #[arg(long)]
        pages: bool,
    },
    /// Show one instance
    Describe { instance_id: String },
    /// Start a stopped instance
    Start { instance_id: String },
    /// Stop a running instance
    Stop { instance_id: String },
    /// Reboot a running instance
    Reboot { instance_id: String },
    /// Renew a subscription instance
    Renew {
        instance_id: String,
        /// Renewal period in months
        #[arg(long)]
        period: Option<u32>,
    },
    /// Reactivate an instance stopped for overdue payment
    Reactivate {
        instance_id: String,
        /// Reactivation period in months
        #[arg(long)]
        period: Option<u32>,
    },
    /// Release a stopped instance
    Delete { instance_id: String },
    /// Show the services this build knows about
    Services,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Yaml,
}

fn parse_key_val(raw: &str) -> std::result::Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))
}

/// Hand raw numeric flags to the library untouched so it reports bad input
fn numeric_arg(raw: &str) -> Value {
    if let Ok(n) = raw.parse::<i64>() {
        return Value::from(n);
    }
    if let Ok(f) = raw.parse::<f64>() {
        return Value::from(f);
    }
    Value::String(raw.to_string())
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Cannot open log file {:?}: {}", log_path, e);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("alicloud started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("alicloud").join("alicloud.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".alicloud").join("alicloud.log");
    }
    PathBuf::from("alicloud.log")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    if matches!(args.command, Command::Services) {
        print_services();
        return Ok(());
    }

    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(region) = &args.region {
        config = config.with_region(region);
    }
    if let Some(endpoint) = &args.endpoint {
        config = config.with_endpoint(endpoint);
    }

    let resource = get_resource(&args.service, &config)?;
    run(&resource, args.command, args.output).await
}

async fn run(resource: &Resource, command: Command, output: OutputFormat) -> Result<()> {
    match command {
        Command::List {
            instance_id,
            status,
            filters,
            limit,
            page_size,
            pages,
        } => {
            let collection = build_collection(resource, instance_id, status, filters, limit, page_size)?;
            tracing::debug!("Listing {}", collection);

            if pages {
                let mut stream = collection.pages();
                let mut number = 0;
                while let Some(page) = stream.try_next().await? {
                    number += 1;
                    println!("# page {} ({} instances)", number, page.len());
                    print_instances(&page, output)?;
                }
            } else {
                let instances = collection.fetch_all().await?;
                print_instances(&instances, output)?;
            }
        }
        Command::Describe { instance_id } => {
            let instance = find_instance(resource, &instance_id).await?;
            print_instances(std::slice::from_ref(&instance), output)?;
        }
        Command::Start { instance_id } => {
            find_instance(resource, &instance_id).await?.start().await?;
            println!("Start requested for {}", instance_id);
        }
        Command::Stop { instance_id } => {
            find_instance(resource, &instance_id).await?.stop().await?;
            println!("Stop requested for {}", instance_id);
        }
        Command::Reboot { instance_id } => {
            find_instance(resource, &instance_id).await?.reboot().await?;
            println!("Reboot requested for {}", instance_id);
        }
        Command::Renew { instance_id, period } => {
            find_instance(resource, &instance_id).await?.renew(period).await?;
            println!("Renewal requested for {}", instance_id);
        }
        Command::Reactivate { instance_id, period } => {
            find_instance(resource, &instance_id)
                .await?
                .reactivate(period)
                .await?;
            println!("Reactivation requested for {}", instance_id);
        }
        Command::Delete { instance_id } => {
            find_instance(resource, &instance_id).await?.delete().await?;
            println!("Delete requested for {}", instance_id);
        }
        Command::Services => print_services(),
    }

    Ok(())
}

fn build_collection(
    resource: &Resource,
    instance_id: Option<String>,
    status: Option<String>,
    filters: Vec<(String, String)>,
    limit: Option<String>,
    page_size: Option<String>,
) -> Result<ResourceCollection> {
    let mut criteria = filters;
    if let Some(id) = instance_id {
        criteria.push(("InstanceId".to_string(), id));
    }
    if let Some(status) = status {
        criteria.push(("Status".to_string(), status));
    }

    let mut collection = resource.instances().filter(criteria)?;
    if let Some(limit) = limit {
        collection = collection.limit(numeric_arg(&limit))?;
    }
    if let Some(page_size) = page_size {
        collection = collection.page_size(numeric_arg(&page_size))?;
    }
    Ok(collection)
}

async fn find_instance(resource: &Resource, instance_id: &str) -> Result<Instance> {
    resource
        .instances()
        .find_by_id(instance_id)
        .await?
        .with_context(|| format!("Instance not found: {}", instance_id))
}

fn print_services() {
    for name in get_all_service_names() {
        if let Some(service) = get_service(name) {
            println!("{:<8} {} ({})", name, service.display_name, service.api_version);
        }
    }
}

fn print_instances(instances: &[Instance], output: OutputFormat) -> Result<()> {
    match output {
        OutputFormat::Json => {
            let records: Vec<_> = instances.iter().map(|i| i.raw()).collect();
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        OutputFormat::Yaml => {
            let records: Vec<_> = instances.iter().map(|i| i.raw()).collect();
            print!("{}", serde_yaml::to_string(&records)?);
        }
        OutputFormat::Table => {
            println!(
                "{:<24} {:<28} {:<10} {:<18} {}",
                "INSTANCE ID", "NAME", "STATUS", "ZONE", "TYPE"
            );
            for instance in instances {
                println!(
                    "{:<24} {:<28} {:<10} {:<18} {}",
                    instance.id(),
                    instance.name().unwrap_or("-"),
                    instance.get_str("Status").unwrap_or("-"),
                    instance.get_str("ZoneId").unwrap_or("-"),
                    instance.get_str("InstanceType").unwrap_or("-"),
                );
            }
        }
    }
    Ok(())
}
