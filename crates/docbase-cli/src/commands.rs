use std::process;
use std::sync::Arc;

use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Password};

use docbase_db::{CredentialStore, Database, DbError, DocumentStore};
use docbase_report::{export_users, ReportError};
use docbase_types::{Document, Role};

use crate::{Auth, Command, DocCommand};

pub fn run(command: Command, db: Arc<Database>) -> Result<()> {
    let credentials = CredentialStore::new(db.clone());
    let documents = DocumentStore::new(db);

    match command {
        Command::Register {
            full_name,
            username,
            password,
            role,
        } => {
            require_non_empty(&full_name, "full name");
            require_non_empty(&username, "username");
            let password = match password {
                Some(p) => p,
                None => Password::with_theme(&ColorfulTheme::default())
                    .with_prompt("Password")
                    .with_confirmation("Confirm password", "Passwords don't match")
                    .interact()?,
            };
            require_non_empty(&password, "password");

            let role = Role::from(role);
            surface(credentials.register(&full_name, &username, &password, role))?;
            println!("Registered {username} ({role})");
        }

        Command::Login { auth } => {
            let role = authenticate(&credentials, &auth)?;
            println!("Login successful. Role: {role}");
        }

        Command::Doc(doc) => run_doc(doc, &credentials, &documents)?,

        Command::Users { auth } => {
            let role = authenticate(&credentials, &auth)?;
            require_admin(role);

            for user in surface(credentials.list_users())? {
                println!("{} - {}", user.username, user.role);
            }
        }

        Command::Report { auth, out_dir } => {
            let role = authenticate(&credentials, &auth)?;
            require_admin(role);

            let users = surface(credentials.all_users())?;
            match export_users(&users, &out_dir) {
                Ok(path) => println!("Report written to {}", path.display()),
                Err(e @ ReportError::NoData) => {
                    eprintln!("{e}");
                    process::exit(1);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    Ok(())
}

fn run_doc(
    command: DocCommand,
    credentials: &CredentialStore,
    documents: &DocumentStore,
) -> Result<()> {
    match command {
        DocCommand::Add {
            auth,
            name,
            content,
            keywords,
            category,
        } => {
            let role = authenticate(credentials, &auth)?;
            require_admin(role);

            require_non_empty(&name, "name");
            require_non_empty(&content, "content");
            require_non_empty(&keywords, "keywords");
            require_non_empty(&category, "category");

            let id = surface(documents.add_document(&name, &content, &keywords, &category))?;
            println!("Added document {id}");
        }

        DocCommand::List { auth, json } => {
            authenticate(credentials, &auth)?;
            let docs = surface(documents.list_documents())?;
            render_documents(&docs, json)?;
        }

        DocCommand::Search { auth, query, json } => {
            authenticate(credentials, &auth)?;
            let docs = surface(documents.search_documents(&query))?;
            render_documents(&docs, json)?;
        }

        DocCommand::Delete { auth, id } => {
            let role = authenticate(credentials, &auth)?;
            require_admin(role);

            surface(documents.delete_document(id))?;
            println!("Deleted document {id}");
        }
    }

    Ok(())
}

fn authenticate(credentials: &CredentialStore, auth: &Auth) -> Result<Role> {
    let password = match &auth.password {
        Some(p) => p.clone(),
        None => Password::with_theme(&ColorfulTheme::default())
            .with_prompt("Password")
            .interact()?,
    };
    surface(credentials.authenticate(&auth.username, &password))
}

fn render_documents(docs: &[Document], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(docs)?);
        return Ok(());
    }
    if docs.is_empty() {
        println!("No documents found.");
        return Ok(());
    }
    for doc in docs {
        println!("{}: {} ({}) - {}", doc.id, doc.name, doc.category, doc.content);
    }
    Ok(())
}

/// Recoverable store outcomes become plain messages with a nonzero exit;
/// anything else propagates as a fault.
fn surface<T>(result: Result<T, DbError>) -> Result<T> {
    match result {
        Err(e) if e.is_recoverable() => {
            eprintln!("{e}");
            process::exit(1);
        }
        other => Ok(other?),
    }
}

fn require_admin(role: Role) {
    if !role.is_admin() {
        eprintln!("This action requires an administrator account.");
        process::exit(1);
    }
}

/// Empty-field validation happens here; the stores are never invoked with
/// an empty required field.
fn require_non_empty(value: &str, field: &str) {
    if value.is_empty() {
        eprintln!("The {field} field must not be empty.");
        process::exit(1);
    }
}
