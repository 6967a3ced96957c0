use crate::context::Context;
use crate::generator::Generator;
use crate::secrets::{SecretReader, VaultConfig};
use crate::template::Delimiters;
use crate::template::delimiters::{DEFAULT_CLOSE, DEFAULT_OPEN};
use crate::vars::Variables;
use anyhow::{Context as _, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Options for the 'generate' command
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub template: PathBuf,
    pub vars: PathBuf,
    pub output: Option<PathBuf>,
    pub set: Vec<String>,
    pub left_delim: Option<String>,
    pub right_delim: Option<String>,
    pub vault: VaultOverrides,
}

/// Vault settings given on the command line; they win over the environment
#[derive(Debug, Clone, Default)]
pub struct VaultOverrides {
    pub address: Option<String>,
    pub token: Option<String>,
    pub namespace: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl VaultOverrides {
    fn apply(&self, mut config: VaultConfig) -> VaultConfig {
        if let Some(address) = &self.address {
            config.address = address.clone();
        }
        if let Some(token) = &self.token {
            config.token = Some(token.clone());
        }
        if let Some(namespace) = &self.namespace {
            config.namespace = Some(namespace.clone());
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout = Duration::from_secs(secs);
        }
        config
    }
}

/// Handles the 'generate' command - renders a template into a configuration file
pub struct GenerateCommand;

impl GenerateCommand {
    /// Execute the generate command against Vault
    pub fn execute(ctx: &Context, options: &GenerateOptions) -> Result<()> {
        let config = options
            .vault
            .apply(VaultConfig::from_env(ctx.env.as_ref(), ctx.fs.as_ref())?);

        ctx.output.key_value("Vault", &config.address);
        if config.token.is_none() {
            ctx.output
                .info("No Vault token configured; secret lookups will be unauthenticated");
        }

        Self::run(ctx, options, |vars, template| {
            Generator::with_vault(ctx.clone(), vars, template, config)
        })
    }

    /// Execute the generate command with a given secret reader
    pub fn execute_with_reader(
        ctx: &Context,
        options: &GenerateOptions,
        secrets: Box<dyn SecretReader>,
    ) -> Result<()> {
        Self::run(ctx, options, |vars, template| {
            Generator::new(ctx.clone(), vars, template, secrets)
        })
    }

    fn run<F>(ctx: &Context, options: &GenerateOptions, build: F) -> Result<()>
    where
        F: FnOnce(&Path, Vec<u8>) -> Result<Generator>,
    {
        // Parse assignments before doing any I/O
        let assignments = options
            .set
            .iter()
            .map(|s| Variables::parse_assignment(s))
            .collect::<Result<Vec<_>, _>>()?;

        let delimiters = Delimiters::new(
            options.left_delim.as_deref().unwrap_or(DEFAULT_OPEN),
            options.right_delim.as_deref().unwrap_or(DEFAULT_CLOSE),
        )?;

        let template = ctx
            .fs
            .read(&options.template)
            .with_context(|| format!("Failed to read template: {}", options.template.display()))?;

        let mut generator = build(&options.vars, template)?.with_delimiters(delimiters);

        for (key, value) in assignments {
            ctx.output.dimmed(&format!("Setting variable {}", key));
            generator.set_variable(&key, value);
        }

        let rendered = generator.generate_config()?;

        match &options.output {
            Some(path) => {
                ctx.fs.write(path, &rendered)?;
                ctx.output.success(&format!(
                    "Wrote {} bytes to {}",
                    rendered.len(),
                    path.display()
                ));
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout
                    .write_all(&rendered)
                    .and_then(|_| stdout.flush())
                    .context("Failed to write rendered configuration to stdout")?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerateError;
    use crate::secrets::MockSecretReader;
    use crate::traits::{MockEnvironment, MockFileSystem, MockOutput, OutputMessage};
    use std::sync::Arc;

    fn setup(template: &str) -> (Context, Arc<MockFileSystem>, Arc<MockOutput>) {
        let fs = Arc::new(
            MockFileSystem::new()
                .with_file("/work/vault.hcl.tpl", template)
                .with_file("/work/vars.hcl", "ui = true\nlog_level = \"info\"\n"),
        );
        let output = Arc::new(MockOutput::new());
        let ctx = Context::test_with(
            fs.clone(),
            output.clone(),
            Arc::new(MockEnvironment::new().with_var("CLUSTER", "east")),
        );
        (ctx, fs, output)
    }

    fn options() -> GenerateOptions {
        GenerateOptions {
            template: PathBuf::from("/work/vault.hcl.tpl"),
            vars: PathBuf::from("/work/vars.hcl"),
            output: Some(PathBuf::from("/work/out/vault.hcl")),
            ..GenerateOptions::default()
        }
    }

    fn reader() -> Box<MockSecretReader> {
        Box::new(MockSecretReader::new().with_secret("kv/seal", &[("key", "k")]))
    }

    #[test]
    fn test_writes_rendered_file() {
        let (ctx, fs, output) = setup(
            "ui = [[ui]]\nlog_level = \"[[log_level]]\"\ncluster_name = \"[[Lookup \"CLUSTER\"]]\"\n",
        );

        GenerateCommand::execute_with_reader(&ctx, &options(), reader()).unwrap();

        assert_eq!(
            fs.get_file_contents(Path::new("/work/out/vault.hcl")).unwrap(),
            "ui = true\nlog_level = \"info\"\ncluster_name = \"east\"\n"
        );
        assert!(
            output
                .get_messages()
                .iter()
                .any(|m| matches!(m, OutputMessage::Success(s) if s.contains("/work/out/vault.hcl")))
        );
    }

    #[test]
    fn test_set_overrides_vars_file() {
        let (ctx, fs, _) = setup("log_level = \"[[log_level]]\"");
        let mut opts = options();
        opts.set = vec!["log_level=debug".to_string()];

        GenerateCommand::execute_with_reader(&ctx, &opts, reader()).unwrap();

        assert_eq!(
            fs.get_file_contents(Path::new("/work/out/vault.hcl")).unwrap(),
            "log_level = \"debug\""
        );
    }

    #[test]
    fn test_invalid_assignment() {
        let (ctx, _, _) = setup("x");
        let mut opts = options();
        opts.set = vec!["missing-equals".to_string()];

        let err = GenerateCommand::execute_with_reader(&ctx, &opts, reader()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GenerateError>(),
            Some(GenerateError::InvalidAssignment(_))
        ));
    }

    #[test]
    fn test_custom_delimiters() {
        let (ctx, fs, _) = setup("seal = <%LookupSecret \"kv/seal\"%>");
        let mut opts = options();
        opts.left_delim = Some("<%".to_string());
        opts.right_delim = Some("%>".to_string());

        GenerateCommand::execute_with_reader(&ctx, &opts, reader()).unwrap();

        let written = fs.get_file_contents(Path::new("/work/out/vault.hcl")).unwrap();
        assert!(written.starts_with("seal = secret \"seal\" {"));
    }

    #[test]
    fn test_failure_writes_nothing() {
        let (ctx, fs, _) = setup("a = [[Lookup \"UNSET\"]]");

        assert!(GenerateCommand::execute_with_reader(&ctx, &options(), reader()).is_err());
        assert!(!fs.has_file(Path::new("/work/out/vault.hcl")));
    }

    #[test]
    fn test_missing_template() {
        let (ctx, _, _) = setup("x");
        let mut opts = options();
        opts.template = PathBuf::from("/work/none.tpl");

        let err = GenerateCommand::execute_with_reader(&ctx, &opts, reader()).unwrap_err();
        assert!(err.to_string().contains("Failed to read template"));
    }

    #[test]
    fn test_vault_overrides() {
        let overrides = VaultOverrides {
            address: Some("http://127.0.0.1:8201".to_string()),
            token: Some("s.cli".to_string()),
            namespace: None,
            timeout_secs: Some(5),
        };

        let config = overrides.apply(VaultConfig::default());
        assert_eq!(config.address, "http://127.0.0.1:8201");
        assert_eq!(config.token.as_deref(), Some("s.cli"));
        assert!(config.namespace.is_none());
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_execute_builds_vault_client_from_options() {
        let (ctx, fs, output) = setup("cluster_name = \"[[Lookup \"CLUSTER\"]]\"\n");
        let mut opts = options();
        opts.vault.address = Some("http://127.0.0.1:1".to_string());

        GenerateCommand::execute(&ctx, &opts).unwrap();

        assert_eq!(
            fs.get_file_contents(Path::new("/work/out/vault.hcl")).unwrap(),
            "cluster_name = \"east\"\n"
        );
        assert!(output.contains_message(&OutputMessage::KeyValue(
            "Vault".to_string(),
            "http://127.0.0.1:1".to_string()
        )));
    }

    #[test]
    fn test_execute_reports_missing_token_as_info() {
        let (ctx, _, output) = setup("x");
        let mut opts = options();
        opts.vault.address = Some("http://127.0.0.1:1".to_string());

        GenerateCommand::execute(&ctx, &opts).unwrap();

        assert!(output.get_messages().iter().any(
            |m| matches!(m, OutputMessage::Info(s) if s.contains("No Vault token configured"))
        ));
        assert!(
            !output
                .get_messages()
                .iter()
                .any(|m| matches!(m, OutputMessage::Error(_)))
        );
    }

    #[test]
    fn test_execute_rejects_bad_vault_address() {
        let (ctx, fs, _) = setup("x");
        let mut opts = options();
        opts.vault.address = Some("ftp://vault".to_string());

        let err = GenerateCommand::execute(&ctx, &opts).unwrap_err();
        assert!(err.to_string().contains("Failed to create Vault client"));
        assert!(!fs.has_file(Path::new("/work/out/vault.hcl")));
    }
}
