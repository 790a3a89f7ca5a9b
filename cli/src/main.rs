use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use docgraph::auth::demo_auth::{LoginRequest, LoginResponse};
use docgraph::db::models::Visibility;
use docgraph::models::document::{
    filter_by_title, CreateDocumentRequest, DocumentDetail, DocumentListItem, DocumentRecord,
    UpdateDocumentRequest,
};
use docgraph::rendering::links::{dedup_targets, extract_document_links};
use reqwest::Method;
use serde::de::DeserializeOwned;
use walkdir::WalkDir;

/// Sync Markdown files with a docgraph instance.
#[derive(Debug, Parser)]
#[command(name = "docgraph-sync", version, about)]
struct Cli {
    /// Base URL of the docgraph server.
    #[arg(long, env = "DOCGRAPH_SERVER", default_value = "http://127.0.0.1:3000")]
    server: String,

    /// Session token, sent as `Authorization: Bearer`.
    #[arg(long, env = "DOCGRAPH_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sign in as a demo user and print the session token.
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// List the documents you can read.
    List {
        /// Only titles containing this text (case-insensitive).
        #[arg(long)]
        filter: Option<String>,
        /// Leave this document id out of the result.
        #[arg(long)]
        exclude: Option<String>,
        #[arg(long, value_parser = parse_visibility)]
        visibility: Option<Visibility>,
    },
    /// Print a document's Markdown.
    Show { id: String },
    /// Create one document per Markdown file, titled with the file name.
    Import {
        /// A `.md` file or a directory scanned recursively.
        path: PathBuf,
        #[arg(long, value_parser = parse_visibility, default_value = "PRIVATE")]
        visibility: Visibility,
    },
    /// Upload a file as the new content of a document and replace its links.
    Push {
        id: String,
        file: PathBuf,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, value_parser = parse_visibility)]
        visibility: Option<Visibility>,
    },
    /// Delete a document and every link touching it.
    Delete { id: String },
}

fn parse_visibility(s: &str) -> std::result::Result<Visibility, String> {
    Visibility::from_str_ci(s).ok_or_else(|| format!("expected PUBLIC or PRIVATE, got '{s}'"))
}

struct ApiClient {
    http: reqwest::Client,
    base: String,
    token: Option<String>,
}

impl ApiClient {
    fn new(base: &str, token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: base.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let builder = self.http.request(method, format!("{}{}", self.base, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let response = builder.send().await.context("Request to server failed")?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v["error"].as_str().map(str::to_string))
            .unwrap_or(body);
        bail!("Server returned {status}: {message}")
    }

    async fn json<T: DeserializeOwned>(&self, builder: reqwest::RequestBuilder) -> Result<T> {
        self.send(builder)
            .await?
            .json()
            .await
            .context("Unexpected response body")
    }
}

/// Title given to an imported file: its name without the `.md` extension.
fn title_from_path(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .with_context(|| format!("Cannot derive a title from {}", path.display()))
}

/// The Markdown files under `path`, sorted by path.
fn collect_markdown_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to scan {}", path.display()))?;
        let is_markdown = entry
            .path()
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("md"));
        if entry.file_type().is_file() && is_markdown {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// The save request for new file content. `links` is left out so the server
/// derives the edges from the content and skips targets that no longer exist.
fn push_request(
    content: String,
    title: Option<String>,
    visibility: Option<Visibility>,
) -> UpdateDocumentRequest {
    UpdateDocumentRequest {
        title,
        content: Some(content),
        visibility,
        links: None,
    }
}

async fn import_file(client: &ApiClient, file: &Path, visibility: Visibility) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let title = title_from_path(file)?;
    let links = extract_document_links(&content);

    let created: DocumentRecord = client
        .json(
            client
                .request(Method::POST, "/api/documents")
                .json(&CreateDocumentRequest {
                    title,
                    content,
                    visibility: Some(visibility),
                }),
        )
        .await?;
    println!("{}\t{}", created.id, file.display());

    if !links.is_empty() {
        let request = UpdateDocumentRequest::default();
        let path = format!("/api/documents/{}", created.id);
        if let Err(e) = client.send(client.request(Method::PUT, &path).json(&request)).await {
            eprintln!("warning: links of {} not saved: {e}", file.display());
        }
    }
    Ok(())
}

fn print_list(items: &[&DocumentListItem]) {
    for item in items {
        println!(
            "{}\t{}\t{}\t{} out / {} in",
            item.document.id,
            item.document.visibility,
            item.document.title,
            item.links.len(),
            item.linked_by.len()
        );
    }
}

fn print_detail(detail: &DocumentDetail) {
    println!("# {}", detail.document.title);
    println!(
        "id: {}  visibility: {}  owner: {}",
        detail.document.id,
        detail.document.visibility,
        detail.user.name.as_deref().unwrap_or(&detail.user.id)
    );
    for link in &detail.links {
        println!(
            "-> {} ({})",
            link.target_document.title, link.target_document.id
        );
    }
    println!();
    println!("{}", detail.document.content);
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = ApiClient::new(&cli.server, cli.token);

    match cli.command {
        Command::Login { username, password } => {
            let response: LoginResponse = client
                .json(
                    client
                        .request(Method::POST, "/api/auth/demo-login")
                        .json(&LoginRequest { username, password }),
                )
                .await?;
            println!("{}", response.token);
        }
        Command::List {
            filter,
            exclude,
            visibility,
        } => {
            let mut builder = client.request(Method::GET, "/api/documents");
            if let Some(v) = visibility {
                builder = builder.query(&[("visibility", v.as_str())]);
            }
            let items: Vec<DocumentListItem> = client.json(builder).await?;
            let selected =
                filter_by_title(&items, filter.as_deref().unwrap_or(""), exclude.as_deref());
            print_list(&selected);
        }
        Command::Show { id } => {
            let detail: DocumentDetail = client
                .json(client.request(Method::GET, &format!("/api/documents/{id}")))
                .await?;
            print_detail(&detail);
        }
        Command::Import { path, visibility } => {
            let files = collect_markdown_files(&path)?;
            if files.is_empty() {
                bail!("No Markdown files found under {}", path.display());
            }
            for file in files {
                import_file(&client, &file, visibility).await?;
            }
        }
        Command::Push {
            id,
            file,
            title,
            visibility,
        } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let linked = dedup_targets(extract_document_links(&content)).len();
            let request = push_request(content, title, visibility);
            let saved: DocumentDetail = client
                .json(
                    client
                        .request(Method::PUT, &format!("/api/documents/{id}"))
                        .json(&request),
                )
                .await?;
            println!("Saved {id} with {} link(s)", saved.links.len());
            if saved.links.len() < linked {
                eprintln!(
                    "warning: {} link(s) point at missing or unreadable documents",
                    linked - saved.links.len()
                );
            }
        }
        Command::Delete { id } => {
            client
                .send(client.request(Method::DELETE, &format!("/api/documents/{id}")))
                .await?;
            println!("Deleted {id}");
        }
    }

    Ok(())
}
