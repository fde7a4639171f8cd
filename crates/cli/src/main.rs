use clap::{Parser, Subcommand};
use lib::channels::ChannelHandle;

#[derive(Parser)]
#[command(name = "wajba")]
#[command(about = "Wajba — WhatsApp restaurant order bot", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Create the configuration directory and a default config file.
    Init {
        /// Config file path (default: WAJBA_CONFIG_PATH or ~/.wajba/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },

    /// Run the webhook server (UltraMsg and Whapi routes plus a health probe).
    Serve {
        /// Config file path (default: WAJBA_CONFIG_PATH or ~/.wajba/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// HTTP port (default from config or 8080)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Chat with the order-taking persona from the terminal (no WhatsApp involved).
    Chat {
        /// Config file path (default: WAJBA_CONFIG_PATH or ~/.wajba/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },

    /// Send a one-off text through a configured channel (delivery test).
    Send {
        /// Config file path (default: WAJBA_CONFIG_PATH or ~/.wajba/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// Channel to send through: "ultramsg" or "whapi"
        #[arg(long, default_value = "whapi")]
        channel: String,

        /// Recipient phone id (digits only, e.g. 212612345678)
        to: String,

        /// Message body
        message: String,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("wajba {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Init { config }) => {
            if let Err(e) = run_init(config) {
                log::error!("init failed: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Serve { config, port }) => {
            if let Err(e) = run_serve(config, port).await {
                log::error!("serve failed: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Chat { config }) => {
            if let Err(e) = run_chat(config).await {
                log::error!("chat failed: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Send { config, channel, to, message }) => {
            if let Err(e) = run_send(config, channel, to, message).await {
                log::error!("send failed: {}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

fn run_init(config_path: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(lib::config::default_config_path);
    let dir = lib::init::init_config_dir(&path)?;
    println!("initialized configuration at {}", dir.display());
    Ok(())
}

async fn run_serve(
    config_path: Option<std::path::PathBuf>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let (mut config, _path) = lib::config::load_config(config_path)?;
    if let Some(p) = port {
        config.server.port = p;
    }
    log::info!("starting webhook server on {}:{}", config.server.bind, config.server.port);
    lib::server::run_server(config).await
}

async fn run_chat(config_path: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    use std::io::{self, Write};

    let (config, _) = lib::config::load_config(config_path)?;
    let chat = lib::openai::ChatClient::from_config(&config);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;
        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("/exit") || input.eq_ignore_ascii_case("/quit") {
            break;
        }

        match chat.reply(input).await {
            Ok(reply) => println!("< {}", reply.trim()),
            Err(e) => eprintln!("chat error: {}", e),
        }
    }

    Ok(())
}

async fn run_send(
    config_path: Option<std::path::PathBuf>,
    channel: String,
    to: String,
    message: String,
) -> anyhow::Result<()> {
    let (config, _) = lib::config::load_config(config_path)?;
    let result = match channel.as_str() {
        "ultramsg" => {
            lib::channels::UltraMsgChannel::from_config(&config)
                .send_text(&to, &message)
                .await
        }
        "whapi" => {
            lib::channels::WhapiChannel::from_config(&config)
                .send_text(&to, &message)
                .await
        }
        other => anyhow::bail!("unknown channel: {} (expected ultramsg or whapi)", other),
    };
    result.map_err(|e| anyhow::anyhow!(e))?;
    println!("sent to {} via {}", to, channel);
    Ok(())
}
