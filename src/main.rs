/// CloudAuth command-line client
///
/// Thin non-interactive front end over the library:
/// 1. Load and validate the client configuration
/// 2. Initialize the application against the licensing server
/// 3. Run one operation and print the server response as JSON
use clap::{Parser, Subcommand};
use log::error;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

use cloudauth::{
    ApiResponse, AuthSession, AuthSessionClient, ClientConfig, FileCredentialStore, load_config,
};

#[derive(Debug, Parser)]
#[command(version, about = "Authenticate against a CloudAuth licensing server")]
struct Args {
    /// Path to the JSON client configuration
    #[arg(short, long, env = "CLOUDAUTH_CONFIG")]
    config: Option<PathBuf>,

    /// Use the plain login endpoint without signed headers
    #[arg(long, conflicts_with = "secure")]
    insecure: bool,

    /// Force signed logins even if the config disables them
    #[arg(long)]
    secure: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print this machine's hardware ID
    Hwid,
    /// Check that the application exists and is up to date
    Init,
    /// Register a new account with a license key
    Register {
        #[arg(long)]
        license_key: String,
        #[arg(long)]
        username: String,
        #[arg(long, env = "CLOUDAUTH_PASSWORD")]
        password: String,
        #[arg(long)]
        email: Option<String>,
    },
    /// Log in with a username and password
    Login {
        #[arg(long, required_unless_present = "auto")]
        username: Option<String>,
        #[arg(long, env = "CLOUDAUTH_PASSWORD", required_unless_present = "auto")]
        password: Option<String>,
        /// Save the credentials for --auto after a successful login
        #[arg(long)]
        remember: bool,
        /// Log in with previously saved credentials
        #[arg(long, conflicts_with_all = ["username", "remember"])]
        auto: bool,
    },
    /// Verify a license key for this machine
    Verify {
        #[arg(long)]
        license_key: String,
    },
    /// Create a license (requires the administrative app secret)
    CreateLicense {
        #[arg(long, env = "CLOUDAUTH_ADMIN_SECRET")]
        admin_secret: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: Option<String>,
        /// License lifetime in days (server default: 30)
        #[arg(long)]
        days: Option<u32>,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let logger_env = env_logger::Env::new()
        .filter_or("CLOUDAUTH_LOG", config.log_level.as_str())
        .write_style("CLOUDAUTH_LOG_STYLE");
    env_logger::Builder::from_env(logger_env).init();

    if args.insecure {
        config.secure_mode = false;
    } else if args.secure {
        config.secure_mode = true;
    }

    match run(&config, args.command) {
        Ok(code) => code,
        Err(e) => {
            error!("We encountered an error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(config: &ClientConfig, command: Command) -> cloudauth::Result<ExitCode> {
    let client = AuthSessionClient::from_config(config)?;

    if let Command::Hwid = command {
        println!("{}", client.hardware_id());
        return Ok(ExitCode::SUCCESS);
    }

    let mut session = AuthSession::new(client);
    match session.initialize() {
        Ok(app) => {
            if let Some(app) = app {
                eprintln!("✅ Connected to {} (version {})", app.app_name, app.version);
            }
        }
        Err(e) => {
            eprintln!("❌ Failed to connect: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    }

    if session.version_mismatch() {
        if let Some(app) = session.app() {
            eprintln!(
                "⚠️  Version mismatch: running {}, latest is {}. {}",
                app.your_version, app.current_version, app.message
            );
        }
    }

    let client = session.client();
    let store = FileCredentialStore::new(&config.credentials_path);

    let code = match command {
        Command::Hwid => ExitCode::SUCCESS,
        Command::Init => {
            let app = session.app().cloned().unwrap_or_default();
            println!("{}", serde_json::to_string_pretty(&app)?);
            ExitCode::SUCCESS
        }
        Command::Register {
            license_key,
            username,
            password,
            email,
        } => report(&client.register_user(&license_key, &username, &password, email.as_deref()))?,
        Command::Login { auto: true, .. } => match client.auto_login(&store) {
            Some(response) => report(&response)?,
            None => {
                eprintln!("❌ No saved credentials in {}", store.path().display());
                ExitCode::FAILURE
            }
        },
        Command::Login {
            username,
            password,
            remember,
            ..
        } => {
            let username = username.unwrap_or_default();
            let password = password.unwrap_or_default();
            if client.is_secure_mode() {
                eprintln!("🔐 Logging in (secure mode)...");
            }
            let response = if remember {
                client.login_and_remember(&store, &username, &password)
            } else {
                client.login_user(&username, &password)
            };
            report(&response)?
        }
        Command::Verify { license_key } => report(&client.verify_license(&license_key))?,
        Command::CreateLicense {
            admin_secret,
            username,
            email,
            days,
        } => report(&client.create_license(&admin_secret, &username, email.as_deref(), days))?,
    };

    Ok(code)
}

/// Print the response and map it to an exit code
fn report<T: Serialize>(response: &ApiResponse<T>) -> cloudauth::Result<ExitCode> {
    println!("{}", serde_json::to_string_pretty(response)?);

    if response.success {
        eprintln!("✅ {}", response.message);
        Ok(ExitCode::SUCCESS)
    } else {
        if let Some(kind) = response.failure_kind() {
            eprintln!("❌ {} ({} failure)", response.message, kind);
        }
        Ok(ExitCode::FAILURE)
    }
}
