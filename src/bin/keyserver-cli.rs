use clap::{Parser, Subcommand};
use reqwest::{Method, RequestBuilder};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "keyserver-cli")]
#[command(about = "Command line client for the Terra key server", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Key management
    #[command(subcommand)]
    Keys(KeysCommand),
    /// Print the server version
    Version,
}

#[derive(Subcommand)]
enum KeysCommand {
    /// Fetch all keys managed by the keyserver
    List { password: String },
    /// Add a new key, optionally restoring it from a mnemonic
    Create {
        password: String,
        name: String,
        mnemonic: Option<String>,
    },
    /// Fetch details for one key
    Show {
        password: String,
        name: String,
        /// Address kind: acc, val or cons
        #[arg(long, default_value = "acc")]
        bech: String,
    },
    /// Delete a key
    Delete { password: String, name: String },
    /// Re-encrypt the keyring under a new password
    Update {
        old_password: String,
        new_password: String,
        name: String,
    },
}

struct Client {
    http: reqwest::Client,
    base: String,
}

impl Client {
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{}", self.base.trim_end_matches('/'), path))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = Client {
        http: reqwest::Client::new(),
        base: cli.server,
    };

    let request = match cli.command {
        Commands::Version => client.request(Method::GET, "/version"),
        Commands::Keys(KeysCommand::List { password }) => client
            .request(Method::GET, "/keys")
            .json(&json!({ "password": password })),
        Commands::Keys(KeysCommand::Create {
            password,
            name,
            mnemonic,
        }) => {
            let mut body = json!({ "name": name, "password": password });
            if let Some(mnemonic) = mnemonic {
                body["mnemonic"] = Value::String(mnemonic);
            }
            client.request(Method::POST, "/keys").json(&body)
        }
        Commands::Keys(KeysCommand::Show {
            password,
            name,
            bech,
        }) => client
            .request(Method::GET, &format!("/keys/{name}"))
            .query(&[("bech", bech)])
            .json(&json!({ "password": password })),
        Commands::Keys(KeysCommand::Delete { password, name }) => client
            .request(Method::DELETE, &format!("/keys/{name}"))
            .json(&json!({ "password": password })),
        Commands::Keys(KeysCommand::Update {
            old_password,
            new_password,
            name,
        }) => client
            .request(Method::PUT, &format!("/keys/{name}"))
            .json(&json!({ "old_password": old_password, "new_password": new_password })),
    };

    print_response(request.send().await?).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    if !status.is_success() {
        eprintln!("Error: key server returned status {status}");
        if !text.is_empty() {
            eprintln!("Response: {text}");
        }
        std::process::exit(1);
    }

    if text.is_empty() {
        println!("OK");
        return Ok(());
    }
    let json: Value = serde_json::from_str(&text)?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
