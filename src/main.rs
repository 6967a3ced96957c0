mod commands;
mod context;
mod error;
mod generator;
mod lookup;
mod output;
mod secrets;
mod template;
mod traits;
mod vars;

use clap::{Parser, Subcommand};
use commands::{GenerateCommand, GenerateOptions, VaultOverrides};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "vault-config")]
#[command(about = "Render configuration files from templates, variables and Vault secrets", long_about = None)]
#[command(version)]
struct Cli {
    /// Print progress details to stderr
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a template into a configuration file
    Generate {
        /// Path to the template file
        #[arg(short, long)]
        template: PathBuf,

        /// Path to the variables file (HCL, JSON or YAML); a missing file means no variables
        #[arg(short, long, env = "VAULT_CONFIG_VARS", default_value = "vars.hcl")]
        vars: PathBuf,

        /// Write the result to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Set a variable, overriding the variables file (KEY=VALUE, repeatable)
        #[arg(short, long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,

        /// Opening delimiter for template actions
        #[arg(long, default_value = "[[")]
        left_delim: String,

        /// Closing delimiter for template actions
        #[arg(long, default_value = "]]")]
        right_delim: String,

        /// Vault server address (overrides VAULT_ADDR)
        #[arg(long)]
        vault_addr: Option<String>,

        /// Vault token (overrides VAULT_TOKEN)
        #[arg(long)]
        vault_token: Option<String>,

        /// Vault namespace (overrides VAULT_NAMESPACE)
        #[arg(long)]
        vault_namespace: Option<String>,

        /// Vault request timeout in seconds (overrides VAULT_CLIENT_TIMEOUT)
        #[arg(long, value_name = "SECONDS")]
        vault_timeout: Option<u64>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let ctx = context::Context::new(cli.verbose);

    let result = match cli.command {
        Commands::Generate {
            template,
            vars,
            output,
            set,
            left_delim,
            right_delim,
            vault_addr,
            vault_token,
            vault_namespace,
            vault_timeout,
        } => {
            let options = GenerateOptions {
                template,
                vars,
                output,
                set,
                left_delim: Some(left_delim),
                right_delim: Some(right_delim),
                vault: VaultOverrides {
                    address: vault_addr,
                    token: vault_token,
                    namespace: vault_namespace,
                    timeout_secs: vault_timeout,
                },
            };
            GenerateCommand::execute(&ctx, &options)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ctx.output.error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
