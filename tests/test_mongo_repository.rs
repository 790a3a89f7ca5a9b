//! MongoDB repository suite. Needs a Docker daemon:
//! `cargo test --test test_mongo_repository -- --ignored`

use testcontainers::runners::AsyncRunner;
use testcontainers::ContainerAsync;
use testcontainers_modules::mongo::Mongo;

use docgraph::auth::models::{ProviderProfile, Session};
use docgraph::db::models::{Document, DocumentChanges, Visibility};
use docgraph::db::repository::{DocumentRepository, MongoDocumentRepository};
use docgraph::db::user_repository::{
    MongoSessionRepository, MongoUserRepository, SessionRepository, UserRepository,
};

struct MongoEnv {
    _mongo: ContainerAsync<Mongo>,
    db: mongodb::Database,
}

impl MongoEnv {
    async fn start() -> Self {
        let container = Mongo::default()
            .start()
            .await
            .expect("Failed to start MongoDB container");
        let port = container
            .get_host_port_ipv4(27017)
            .await
            .expect("Failed to get MongoDB port");
        let client = mongodb::Client::with_uri_str(format!("mongodb://127.0.0.1:{port}"))
            .await
            .expect("Failed to connect to MongoDB");

        Self {
            _mongo: container,
            db: client.database("docgraph_test"),
        }
    }

    async fn documents(&self) -> MongoDocumentRepository {
        let repo = MongoDocumentRepository::new(&self.db);
        repo.ensure_indexes().await.expect("Failed to create indexes");
        repo
    }
}

fn doc(owner: &str, title: &str, visibility: Visibility) -> Document {
    Document::new(owner, title.into(), String::new(), visibility)
}

fn links<S: AsRef<str>>(targets: &[S]) -> DocumentChanges {
    DocumentChanges {
        links_out: targets.iter().map(|t| t.as_ref().to_string()).collect(),
        ..Default::default()
    }
}

#[tokio::test]
#[ignore = "requires docker"]
async fn list_visible_respects_ownership() {
    let env = MongoEnv::start().await;
    let repo = env.documents().await;

    repo.insert(doc("u1", "Public", Visibility::Public)).await.unwrap();
    repo.insert(doc("u1", "Mine", Visibility::Private)).await.unwrap();
    repo.insert(doc("u2", "Theirs", Visibility::Private)).await.unwrap();

    let mut titles: Vec<String> = repo
        .list_visible(Some("u1"))
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.title)
        .collect();
    titles.sort();
    assert_eq!(titles, vec!["Mine", "Public"]);

    let anonymous = repo.list_visible(None).await.unwrap();
    assert_eq!(anonymous.len(), 1);
    assert_eq!(anonymous[0].title, "Public");
    assert_eq!(repo.count().await.unwrap(), 3);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn update_replaces_fields_and_edges() {
    let env = MongoEnv::start().await;
    let repo = env.documents().await;

    let d = doc("u1", "D", Visibility::Private);
    let (a, b) = (doc("u1", "A", Visibility::Public), doc("u1", "B", Visibility::Public));
    let (d_id, a_id, b_id) = (d.id.clone(), a.id.clone(), b.id.clone());
    for document in [d, a, b] {
        repo.insert(document).await.unwrap();
    }

    repo.update(&d_id, links(&[&a_id])).await.unwrap();
    let updated = repo
        .update(
            &d_id,
            DocumentChanges {
                title: Some("Renamed".into()),
                visibility: Some(Visibility::Public),
                links_out: vec![b_id.clone()],
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.title, "Renamed");
    assert_eq!(updated.visibility, Visibility::Public);
    assert_eq!(updated.links_out, vec![b_id]);
    assert!(updated.updated_at >= updated.created_at);

    assert!(repo.update("missing", links::<&str>(&[])).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires docker"]
async fn delete_pulls_incoming_edges() {
    let env = MongoEnv::start().await;
    let repo = env.documents().await;

    let a = doc("u1", "A", Visibility::Public);
    let d = doc("u1", "D", Visibility::Public);
    let (a_id, d_id) = (a.id.clone(), d.id.clone());
    repo.insert(a).await.unwrap();
    repo.insert(d).await.unwrap();
    repo.update(&a_id, links(&[&d_id, &a_id])).await.unwrap();

    assert!(repo.delete(&d_id).await.unwrap());
    assert!(!repo.delete(&d_id).await.unwrap());

    let a = repo.find_by_id(&a_id).await.unwrap().unwrap();
    assert_eq!(a.links_out, vec![a_id.clone()]);
    assert_eq!(repo.find_by_ids(&[a_id, d_id]).await.unwrap().len(), 1);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn user_upsert_is_keyed_by_account() {
    let env = MongoEnv::start().await;
    let users = MongoUserRepository::new(&env.db);
    users.ensure_indexes().await.unwrap();

    let profile = |name: &str| ProviderProfile {
        provider: "oidc".into(),
        subject: "sub-1".into(),
        name: Some(name.into()),
        email: None,
        image: None,
    };

    let first = users.upsert_from_profile(profile("Old")).await.unwrap();
    let second = users.upsert_from_profile(profile("New")).await.unwrap();
    assert_eq!(first.id, second.id);

    let stored = users.find_by_id(&first.id).await.unwrap().unwrap();
    assert_eq!(stored.name.as_deref(), Some("New"));
}

#[tokio::test]
#[ignore = "requires docker"]
async fn session_roundtrip() {
    let env = MongoEnv::start().await;
    let sessions = MongoSessionRepository::new(&env.db);
    sessions.ensure_indexes().await.unwrap();

    sessions
        .create(Session {
            token_hash: "hash-1".into(),
            user_id: "u1".into(),
            expires_at: chrono::Utc::now() + chrono::Duration::hours(1),
        })
        .await
        .unwrap();

    let found = sessions.find("hash-1").await.unwrap().unwrap();
    assert_eq!(found.user_id, "u1");

    sessions.delete("hash-1").await.unwrap();
    assert!(sessions.find("hash-1").await.unwrap().is_none());
}
