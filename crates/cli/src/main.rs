use clap::{Parser, Subcommand};
use dnsmux_application::QueryContext;
use dnsmux_domain::{
    fqdn, CliOverrides, DomainStrategy, Message, Question, RecordData, RecordType,
};
use dnsmux_infrastructure::dns::TransportRegistry;
use tracing::{debug, info};

mod bootstrap;
mod di;

#[derive(Parser)]
#[command(name = "dnsmux")]
#[command(version)]
#[command(about = "dnsmux - pluggable DNS resolution client")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Bypass the result cache
    #[arg(long)]
    no_cache: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a domain to its addresses
    Lookup {
        domain: String,

        /// as_is, prefer_ipv4, prefer_ipv6, ipv4_only or ipv6_only
        #[arg(short, long)]
        strategy: Option<DomainStrategy>,

        /// Configured server to use instead of the default one
        #[arg(long)]
        server: Option<String>,
    },
    /// Send a single-question query and print the response
    Query {
        domain: String,

        #[arg(short = 't', long = "type", default_value = "A")]
        record_type: RecordType,

        #[arg(short, long)]
        strategy: Option<DomainStrategy>,

        #[arg(long)]
        server: Option<String>,
    },
}

impl Command {
    fn server(&self) -> Option<&str> {
        match self {
            Command::Lookup { server, .. } | Command::Query { server, .. } => server.as_deref(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let overrides = CliOverrides {
        log_level: cli.log_level.clone(),
        disable_cache: cli.no_cache,
        default_server: None,
    };
    let config = bootstrap::load_config(cli.config.as_deref(), overrides)?;
    bootstrap::init_logging(&config);

    debug!(version = env!("CARGO_PKG_VERSION"), servers = config.servers.len(), "Configuration loaded");

    let registry = TransportRegistry::with_defaults();
    let resolution = di::Resolution::new(&config, &registry, cli.command.server()).await?;
    let ctx = QueryContext::new().with_transport_name(resolution.transport.name());

    let outcome = tokio::select! {
        result = run(&cli.command, &resolution, &ctx) => result,
        _ = tokio::signal::ctrl_c() => {
            ctx.cancel();
            info!("Interrupted");
            Ok(())
        }
    };

    resolution.shutdown().await;
    outcome
}

async fn run(
    command: &Command,
    resolution: &di::Resolution,
    ctx: &QueryContext,
) -> anyhow::Result<()> {
    match command {
        Command::Lookup {
            domain, strategy, ..
        } => {
            let strategy = strategy.unwrap_or(resolution.strategy);
            let addresses = resolution
                .client
                .lookup(ctx, resolution.transport.as_ref(), domain, strategy)
                .await?;
            for address in addresses {
                println!("{}", address);
            }
        }
        Command::Query {
            domain,
            record_type,
            strategy,
            ..
        } => {
            let strategy = strategy.unwrap_or(resolution.strategy);
            let request = Message::query(
                fastrand::u16(..),
                Question::internet(&fqdn(domain), *record_type),
            );
            let response = resolution
                .client
                .exchange(ctx, resolution.transport.as_ref(), &request, strategy)
                .await?;
            print_response(&response);
        }
    }
    Ok(())
}

fn print_response(response: &Message) {
    println!(";; id: {}, status: {}", response.id, response.rcode);
    for question in &response.questions {
        println!(";{}\t{}\t{}", question.name, question.class, question.record_type);
    }
    for record in &response.answers {
        let data = match &record.data {
            RecordData::A(v4) => v4.to_string(),
            RecordData::AAAA(v6) => v6.to_string(),
            RecordData::Opaque(bytes) => format!("\\# {} {}", bytes.len(), hex(bytes)),
        };
        println!(
            "{}\t{}\t{}\t{}\t{}",
            record.name, record.ttl, record.class, record.record_type, data
        );
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
