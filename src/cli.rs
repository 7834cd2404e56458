// Command-line definitions. Session flags (host, credentials, config file,
// account selection) go before the subcommand; most of them can also be set
// through `PNGX_*` variables.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::account::{normalize_host, validate_alias, DEFAULT_ALIAS};
use crate::config::LoginRequest;
use crate::document::{CustomFieldArg, ObjectRef};
use crate::error::ValidationError;

/// Command-line interface for Paperless-ngx.
#[derive(Debug, Parser)]
#[command(name = "pngx", version, about = "Command-line interface for Paperless-ngx")]
pub struct Cli {
    #[command(flatten)]
    pub session: SessionArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Ad-hoc credentials and account selection for this invocation.
#[derive(Debug, Clone, Default, Args)]
pub struct SessionArgs {
    /// URL of your Paperless-ngx host, possibly including a custom port and/or script path.
    #[arg(long, env = "PNGX_HOST", value_parser = parse_host)]
    pub host: Option<String>,

    /// Username.
    #[arg(long, env = "PNGX_USER", value_parser = parse_not_empty)]
    pub user: Option<String>,

    /// Password. Only used to request an API token.
    #[arg(long, env = "PNGX_PASSWORD", conflicts_with_all = ["token", "ask_token"])]
    pub password: Option<String>,

    /// Prompt for the password.
    #[arg(long, conflicts_with_all = ["password", "token", "ask_token"])]
    pub ask_password: bool,

    /// API token.
    #[arg(long, env = "PNGX_TOKEN")]
    pub token: Option<String>,

    /// Prompt for the API token.
    #[arg(long, conflicts_with = "token")]
    pub ask_token: bool,

    /// Path to configuration file.
    #[arg(long = "config", env = "PNGX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Name (alias) of the account to use instead of the current one.
    #[arg(
        long = "use",
        env = "PNGX_ACCOUNT",
        value_parser = parse_alias,
        conflicts_with_all = ["host", "user", "password", "ask_password", "token", "ask_token"]
    )]
    pub use_account: Option<String>,

    /// Show path of the configuration file in use.
    #[arg(long)]
    pub show_config: bool,
}

impl SessionArgs {
    /// Login request built from the session flags, if a host was given.
    pub fn login_request(&self, alias: &str) -> Option<LoginRequest> {
        let host = self.host.clone()?;
        Some(
            LoginRequest::new(host)
                .user(self.user.clone())
                .password(self.password.clone())
                .token(self.token.clone())
                .alias(alias),
        )
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage authentication information.
    #[command(subcommand)]
    Auth(AuthCommand),

    /// Work with your documents.
    #[command(subcommand)]
    Document(DocumentCommand),
}

impl Command {
    pub fn is_login(&self) -> bool {
        matches!(self, Command::Auth(AuthCommand::Login(_)))
    }
}

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Log in to your instance of Paperless-ngx.
    Login(LoginArgs),

    /// Remove credentials from disk for the given account (defaults to the current one).
    Logout {
        #[arg(value_parser = parse_alias)]
        alias: Option<String>,
    },

    /// Set the current account.
    Use {
        #[arg(value_parser = parse_alias)]
        alias: String,
    },

    /// Show details of an account (defaults to the current one).
    Show {
        #[arg(value_parser = parse_alias)]
        alias: Option<String>,
    },

    /// List available accounts.
    List,

    /// Rename an existing account.
    Rename {
        #[arg(value_parser = parse_alias)]
        alias: String,
        #[arg(value_parser = parse_alias)]
        new_alias: String,
    },
}

#[derive(Debug, Clone, Args)]
pub struct LoginArgs {
    /// URL of your Paperless-ngx host. Falls back to `--host` given before the subcommand.
    #[arg(value_parser = parse_host)]
    pub host: Option<String>,

    /// Username.
    #[arg(long, value_parser = parse_not_empty)]
    pub user: Option<String>,

    /// Password, exchanged for an API token; it is never stored.
    #[arg(long, conflicts_with_all = ["token", "ask_token"])]
    pub password: Option<String>,

    /// Prompt for the password.
    #[arg(long, conflicts_with_all = ["password", "token", "ask_token"])]
    pub ask_password: bool,

    /// API token.
    #[arg(long)]
    pub token: Option<String>,

    /// Prompt for the API token.
    #[arg(long, conflicts_with = "token")]
    pub ask_token: bool,

    /// Store the credentials under this alias. An existing alias is overwritten.
    #[arg(long, default_value = DEFAULT_ALIAS, value_parser = parse_alias)]
    pub alias: String,
}

#[derive(Debug, Subcommand)]
pub enum DocumentCommand {
    /// Show information about a document.
    Show {
        /// ID of the document.
        id: u64,

        /// Print the document as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Update a document's information.
    Edit(EditArgs),
}

#[derive(Debug, Clone, Args)]
pub struct EditArgs {
    /// ID of the document to update.
    pub id: u64,

    /// Archive serial number.
    #[arg(long)]
    pub asn: Option<u64>,

    /// ID of the correspondent.
    #[arg(long)]
    pub correspondent: Option<u64>,

    /// ID of the document type.
    #[arg(long)]
    pub document_type: Option<u64>,

    /// ID of the storage path.
    #[arg(long)]
    pub storage_path: Option<u64>,

    /// Document title.
    #[arg(long)]
    pub title: Option<String>,

    /// ISO 8601 date (YYYY-MM-DD) the document was issued.
    #[arg(long, value_parser = parse_date)]
    pub created_date: Option<String>,

    /// Assign tags, by ID or exact name.
    #[arg(long = "tags", visible_alias = "add-tags", num_args = 1.., help_heading = "Tags")]
    pub add_tags: Vec<ObjectRef>,

    /// Unassign tags, by ID or exact name.
    #[arg(long, num_args = 1.., help_heading = "Tags")]
    pub remove_tags: Vec<ObjectRef>,

    /// Assign custom fields as NAME|ID, optionally with =VALUE. An empty VALUE clears the field.
    #[arg(
        long = "custom-fields",
        visible_alias = "add-custom-fields",
        num_args = 1..,
        help_heading = "Custom fields"
    )]
    pub add_custom_fields: Vec<CustomFieldArg>,

    /// Unassign custom fields, by ID or exact name.
    #[arg(long, num_args = 1.., help_heading = "Custom fields")]
    pub remove_custom_fields: Vec<ObjectRef>,
}

fn parse_host(s: &str) -> Result<String, ValidationError> {
    normalize_host(s)
}

fn parse_alias(s: &str) -> Result<String, ValidationError> {
    validate_alias(s)?;
    Ok(s.to_string())
}

fn parse_not_empty(s: &str) -> Result<String, String> {
    if s.is_empty() {
        return Err("Must not be empty.".to_string());
    }
    Ok(s.to_string())
}

fn parse_date(s: &str) -> Result<String, String> {
    let parts: Vec<&str> = s.split('-').collect();
    let valid = parts.len() == 3
        && [4, 2, 2]
            .iter()
            .zip(&parts)
            .all(|(len, part)| part.len() == *len && part.chars().all(|c| c.is_ascii_digit()));
    if valid {
        Ok(s.to_string())
    } else {
        Err(format!("Expected a date as YYYY-MM-DD, got {s}."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("pngx").chain(args.iter().copied()))
    }

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn login_with_alias_and_token() {
        let cli = parse(&["auth", "login", "paperless.local/", "--token", "abc", "--alias", "home"]).unwrap();
        match cli.command {
            Some(Command::Auth(AuthCommand::Login(args))) => {
                assert_eq!(args.host.as_deref(), Some("https://paperless.local"));
                assert_eq!(args.token.as_deref(), Some("abc"));
                assert_eq!(args.alias, "home");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn login_alias_defaults_and_is_validated() {
        let cli = parse(&["auth", "login", "https://p"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Auth(AuthCommand::Login(LoginArgs { ref alias, .. }))) if alias == "default"
        ));
        assert!(parse(&["auth", "login", "https://p", "--alias", "1st"]).is_err());
        assert!(parse(&["auth", "rename", "home", "_x"]).is_err());
        assert!(parse(&["auth", "login", "https://p", "--alias", "current"]).is_err());
        assert!(parse(&["auth", "rename", "home", "current"]).is_err());
    }

    #[test]
    fn password_and_token_are_exclusive() {
        assert!(parse(&["auth", "login", "https://p", "--password", "x", "--token", "y"]).is_err());
        assert!(parse(&["--password", "x", "--token", "y", "auth", "list"]).is_err());
    }

    #[test]
    fn use_conflicts_with_adhoc_flags() {
        assert!(parse(&["--use", "home", "--host", "https://p", "auth", "list"]).is_err());
        let cli = parse(&["--use", "home", "auth", "list"]).unwrap();
        assert_eq!(cli.session.use_account.as_deref(), Some("home"));
    }

    #[test]
    fn session_flags_build_login_request() {
        let cli = parse(&["--host", "p.example", "--user", "bob", "document", "show", "3"]).unwrap();
        let req = cli.session.login_request("__adhoc__").unwrap();
        assert_eq!(req.host, "https://p.example");
        assert_eq!(req.user.as_deref(), Some("bob"));
        assert_eq!(req.alias, "__adhoc__");
        assert!(!cli.command.unwrap().is_login());
    }

    #[test]
    fn edit_collects_tags_and_custom_fields() {
        let cli = parse(&[
            "document", "edit", "5", "--tags", "Inbox", "7", "--remove-tags", "2",
            "--custom-fields", "Amount=12", "--created-date", "2024-03-01",
        ])
        .unwrap();
        let Some(Command::Document(DocumentCommand::Edit(args))) = cli.command else {
            panic!("expected document edit");
        };
        assert_eq!(args.id, 5);
        assert_eq!(
            args.add_tags,
            vec![ObjectRef::Name("Inbox".to_string()), ObjectRef::Id(7)]
        );
        assert_eq!(args.remove_tags, vec![ObjectRef::Id(2)]);
        assert_eq!(args.add_custom_fields[0].value.as_deref(), Some("12"));
        assert_eq!(args.created_date.as_deref(), Some("2024-03-01"));
    }

    #[test]
    fn created_date_must_be_iso() {
        assert!(parse_date("2024-3-1").is_err());
        assert!(parse_date("01.03.2024").is_err());
        assert!(parse_date("2024-03-01").is_ok());
    }
}
