// Command handlers. `App` carries the loaded account store and the
// credential verifier; every handler gets it explicitly instead of reaching
// for global state.

use anyhow::{anyhow, bail, Context, Result};
use reqwest::StatusCode;
use tracing::debug;

use crate::account::{Account, ADHOC_ALIAS};
use crate::api::{ApiClient, ApiError, CredentialVerifier};
use crate::cli::{AuthCommand, Command, DocumentCommand, EditArgs, LoginArgs, SessionArgs};
use crate::config::{ConfigStore, LoginRequest};
use crate::document::{CustomFieldAssignment, DocumentEdit, ObjectRef};
use crate::ui;

pub struct App {
    pub store: ConfigStore,
    verifier: Box<dyn CredentialVerifier>,
}

impl App {
    pub fn new(store: ConfigStore, verifier: Box<dyn CredentialVerifier>) -> Self {
        App { store, verifier }
    }

    /// Verify and store an account while a spinner runs.
    pub fn login(&mut self, request: LoginRequest) -> Result<&Account> {
        let spinner = ui::spinner(format!("Checking credentials for {}...", request.host));
        let result = self.store.add_account(self.verifier.as_ref(), request);
        spinner.finish_and_clear();
        Ok(result?)
    }

    /// API client for the account currently in use.
    fn api(&self) -> Result<ApiClient> {
        let account = self
            .store
            .current()
            .ok_or_else(|| anyhow!("No account is currently in use."))?;
        debug!(alias = %account.alias, host = %account.host, "using account");
        Ok(ApiClient::for_account(account)?)
    }
}

/// Set up the account this invocation runs as.
///
/// With `--host`, an `__adhoc__` account is verified and selected for every
/// command except `auth login` (which stores the credentials itself).
/// Otherwise the store must already hold an account.
pub fn prepare_session(app: &mut App, session: &SessionArgs, command: &Command) -> Result<()> {
    if command.is_login() {
        return Ok(());
    }
    if let Some(request) = session.login_request(ADHOC_ALIAS) {
        app.login(request).context("Ad-hoc login failed")?;
        return Ok(());
    }
    if app.store.is_empty() {
        bail!("No accounts configured that can be used.");
    }
    Ok(())
}

pub fn run(app: &mut App, session: &SessionArgs, command: Command) -> Result<()> {
    match command {
        Command::Auth(cmd) => run_auth(app, session, cmd),
        Command::Document(cmd) => run_document(app, cmd),
    }
}

fn run_auth(app: &mut App, session: &SessionArgs, cmd: AuthCommand) -> Result<()> {
    match cmd {
        AuthCommand::Login(args) => login(app, session, args),
        AuthCommand::Logout { alias } => {
            let alias = match alias {
                Some(alias) => alias,
                None => current_alias(app)?,
            };
            let removed = app.store.remove_account(&alias)?;
            println!("Logged out of {}.", removed);
            Ok(())
        }
        AuthCommand::Use { alias } => {
            app.store.use_account(&alias)?;
            app.store.write()?;
            println!("Now using account {}.", alias);
            Ok(())
        }
        AuthCommand::Show { alias } => {
            let account = match &alias {
                Some(alias) => app.store.get_account(alias)?,
                None => app
                    .store
                    .current()
                    .ok_or_else(|| anyhow!("No account is currently in use."))?,
            };
            let current = app.store.current().map(|a| a.alias.as_str());
            ui::print_accounts([account], current);
            Ok(())
        }
        AuthCommand::List => {
            if app.store.is_empty() {
                println!("No accounts configured. Add them via `pngx auth login`.");
                return Ok(());
            }
            let current = app.store.current().map(|a| a.alias.as_str());
            ui::print_accounts(app.store.accounts(), current);
            Ok(())
        }
        AuthCommand::Rename { alias, new_alias } => {
            app.store.rename_account(&alias, &new_alias)?;
            println!("Renamed {} to {}.", alias, new_alias);
            Ok(())
        }
    }
}

fn current_alias(app: &App) -> Result<String> {
    app.store
        .current()
        .map(|a| a.alias.clone())
        .ok_or_else(|| anyhow!("No account is currently in use."))
}

/// Build the login request from `auth login` arguments, falling back to the
/// session flags for anything not given after the subcommand. Password and
/// token are taken as a pair from whichever side supplied one.
pub fn login_request(session: &SessionArgs, args: LoginArgs) -> Result<LoginRequest> {
    let host = args
        .host
        .or_else(|| session.host.clone())
        .context("A host is required, either as argument or via --host.")?;
    let user = args.user.or_else(|| session.user.clone());

    let (password, token) = if args.ask_password {
        (Some(ui::prompt_secret("Password")?), None)
    } else if args.ask_token {
        (None, Some(ui::prompt_secret("API token")?))
    } else if args.password.is_some() || args.token.is_some() {
        (args.password, args.token)
    } else {
        (session.password.clone(), session.token.clone())
    };

    Ok(LoginRequest::new(host)
        .user(user)
        .password(password)
        .token(token)
        .alias(args.alias))
}

fn login(app: &mut App, session: &SessionArgs, args: LoginArgs) -> Result<()> {
    let request = login_request(session, args)?;
    let account = app.login(request)?;
    println!("Logged in as {}.", account);
    Ok(())
}

fn run_document(app: &mut App, cmd: DocumentCommand) -> Result<()> {
    let api = app.api()?;
    match cmd {
        DocumentCommand::Show { id, json } => show_document(&api, id, json),
        DocumentCommand::Edit(args) => edit_document(&api, args),
    }
}

fn not_found(err: &ApiError) -> bool {
    err.status() == Some(StatusCode::NOT_FOUND)
}

fn show_document(api: &ApiClient, id: u64, json: bool) -> Result<()> {
    let (document, raw) = api.document(id).map_err(|e| {
        if not_found(&e) {
            anyhow!("Document {} does not exist.", id)
        } else {
            anyhow::Error::new(e)
        }
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&raw)?);
        return Ok(());
    }

    let correspondent = document
        .correspondent
        .map(|id| api.correspondent(id))
        .transpose()?
        .map(|o| o.name);
    let document_type = document
        .document_type
        .map(|id| api.document_type(id))
        .transpose()?
        .map(|o| o.name);
    let storage_path = document
        .storage_path
        .map(|id| api.storage_path(id))
        .transpose()?
        .map(|o| match o.path {
            Some(path) => format!("{} ({})", o.name, path),
            None => o.name,
        });

    let tags = api.tags_by_ids(&document.tags)?;
    let tag_names = document
        .tags
        .iter()
        .filter_map(|id| tags.iter().find(|t| t.id == *id))
        .map(|t| t.name.clone())
        .collect();

    let field_ids: Vec<u64> = document.custom_fields.iter().map(|cf| cf.field).collect();
    let fields = api.custom_fields_by_ids(&field_ids)?;
    let custom_fields = document
        .custom_fields
        .iter()
        .map(|cf| {
            let name = fields
                .iter()
                .find(|f| f.id == cf.field)
                .map(|f| f.name.clone())
                .unwrap_or_else(|| format!("Custom field {}", cf.field));
            (name, cf.value.clone())
        })
        .collect();

    let url = format!("{}/documents/{}/details", api.base_url(), document.id);
    ui::print_document(&ui::DocumentDetails {
        document,
        correspondent,
        document_type,
        storage_path,
        tags: tag_names,
        custom_fields,
        url,
    });
    Ok(())
}

fn resolve_tag(api: &ApiClient, tag: &ObjectRef) -> Result<u64> {
    match tag {
        ObjectRef::Id(id) => match api.tag(*id) {
            Ok(t) => Ok(t.id),
            Err(e) if not_found(&e) => bail!("Tag {} does not exist.", id),
            Err(e) => Err(e.into()),
        },
        ObjectRef::Name(name) => api
            .find_tag(name)?
            .map(|t| t.id)
            .ok_or_else(|| anyhow!("Tag {} does not exist.", name)),
    }
}

fn resolve_tags(api: &ApiClient, refs: &[ObjectRef]) -> Result<Vec<u64>> {
    refs.iter().map(|r| resolve_tag(api, r)).collect()
}

fn resolve_custom_field(api: &ApiClient, field: &ObjectRef) -> Result<u64> {
    match field {
        ObjectRef::Id(id) => match api.custom_field(*id) {
            Ok(f) => Ok(f.id),
            Err(e) if not_found(&e) => bail!("Custom field {} does not exist.", id),
            Err(e) => Err(e.into()),
        },
        ObjectRef::Name(name) => api
            .find_custom_field(name)?
            .map(|f| f.id)
            .ok_or_else(|| anyhow!("Custom field {} does not exist.", name)),
    }
}

fn edit_document(api: &ApiClient, args: EditArgs) -> Result<()> {
    let edit = DocumentEdit {
        asn: args.asn,
        correspondent: args.correspondent,
        document_type: args.document_type,
        storage_path: args.storage_path,
        title: args.title,
        created_date: args.created_date,
        add_tags: resolve_tags(api, &args.add_tags)?,
        remove_tags: resolve_tags(api, &args.remove_tags)?,
        add_custom_fields: args
            .add_custom_fields
            .iter()
            .map(|arg| -> Result<CustomFieldAssignment> {
                let id = resolve_custom_field(api, &arg.field)?;
                Ok(CustomFieldAssignment::new(id, arg.value.as_deref()))
            })
            .collect::<Result<_>>()?,
        remove_custom_fields: args
            .remove_custom_fields
            .iter()
            .map(|r| resolve_custom_field(api, r))
            .collect::<Result<_>>()?,
    };

    let (mut document, _) = api
        .document(args.id)
        .with_context(|| format!("Cannot fetch document {}", args.id))?;
    let patch = edit.apply(&mut document);
    if patch.is_empty() {
        println!("Nothing to update.");
        return Ok(());
    }

    let spinner = ui::spinner(format!("Updating document {}...", args.id));
    let result = api.update_document(args.id, &patch);
    spinner.finish_and_clear();
    result.with_context(|| format!("Cannot update document {}", args.id))?;
    println!("Document {} updated.", args.id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ProbeAuth;

    struct AcceptAll;

    impl CredentialVerifier for AcceptAll {
        fn probe(&self, _host: &str, _auth: ProbeAuth<'_>) -> Result<(), ApiError> {
            Ok(())
        }

        fn issue_token(&self, _host: &str, _user: &str, _password: &str) -> Result<String, ApiError> {
            Ok("issued".to_string())
        }
    }

    fn app(dir: &tempfile::TempDir) -> App {
        App::new(
            ConfigStore::new(dir.path().join("pngx.toml")),
            Box::new(AcceptAll),
        )
    }

    fn login_args(host: Option<&str>) -> LoginArgs {
        LoginArgs {
            host: host.map(str::to_string),
            user: None,
            password: None,
            ask_password: false,
            token: None,
            ask_token: false,
            alias: "default".to_string(),
        }
    }

    #[test]
    fn empty_store_without_host_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        let cmd = Command::Auth(AuthCommand::List);
        let err = prepare_session(&mut app, &SessionArgs::default(), &cmd).unwrap_err();
        assert_eq!(err.to_string(), "No accounts configured that can be used.");
    }

    #[test]
    fn host_flag_creates_unsaved_adhoc_account() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        let session = SessionArgs {
            host: Some("https://p.example".to_string()),
            token: Some("t".to_string()),
            ..SessionArgs::default()
        };
        prepare_session(&mut app, &session, &Command::Auth(AuthCommand::List)).unwrap();
        assert_eq!(app.store.current().unwrap().alias, ADHOC_ALIAS);
        assert!(!dir.path().join("pngx.toml").exists());
    }

    #[test]
    fn login_skips_adhoc_account() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        let session = SessionArgs {
            host: Some("https://p.example".to_string()),
            ..SessionArgs::default()
        };
        let cmd = Command::Auth(AuthCommand::Login(login_args(None)));
        prepare_session(&mut app, &session, &cmd).unwrap();
        assert!(app.store.is_empty());
    }

    #[test]
    fn login_request_falls_back_to_session_flags() {
        let session = SessionArgs {
            host: Some("https://p.example".to_string()),
            user: Some("alice".to_string()),
            password: Some("pw".to_string()),
            ..SessionArgs::default()
        };
        let req = login_request(&session, login_args(None)).unwrap();
        assert_eq!(req.host, "https://p.example");
        assert_eq!(req.user.as_deref(), Some("alice"));
        assert_eq!(req.password.as_deref(), Some("pw"));

        let mut args = login_args(Some("https://other.example"));
        args.token = Some("tok".to_string());
        let req = login_request(&session, args).unwrap();
        assert_eq!(req.host, "https://other.example");
        assert_eq!(req.token.as_deref(), Some("tok"));
        assert_eq!(req.password, None);
    }

    #[test]
    fn login_request_needs_a_host() {
        assert!(login_request(&SessionArgs::default(), login_args(None)).is_err());
    }

    #[test]
    fn login_stores_account_and_makes_it_current() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        let mut args = login_args(Some("https://p.example"));
        args.user = Some("alice".to_string());
        args.password = Some("pw".to_string());
        login(&mut app, &SessionArgs::default(), args).unwrap();

        let current = app.store.current().unwrap();
        assert_eq!(current.alias, "default");
        assert_eq!(current.token.as_deref(), Some("issued"));
        assert!(dir.path().join("pngx.toml").is_file());
    }
}
