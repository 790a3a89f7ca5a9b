use crate::auth::demo_auth::demo_profile_for;
use crate::db::models::{Document, DocumentChanges, Visibility};
use crate::db::repository::DocumentRepository;
use crate::db::user_repository::UserRepository;
use crate::error::AppError;
use crate::rendering::links::{dedup_targets, extract_document_links};

const DEMO_OWNER: &str = "demo";

/// Demo documents as `(id, title, content)`; contents link to each other by id.
const DEMO_DOCUMENTS: &[(&str, &str, &str)] = &[
    (
        "welcome",
        "Welcome to docgraph",
        include_str!("../demo_data/welcome.md"),
    ),
    (
        "linking-notes",
        "Linking notes",
        include_str!("../demo_data/linking_notes.md"),
    ),
    (
        "graph-view",
        "Graph view",
        include_str!("../demo_data/graph_view.md"),
    ),
    (
        "visibility",
        "Visibility",
        include_str!("../demo_data/visibility.md"),
    ),
];

/// Seed a small linked set of public documents owned by the demo user.
///
/// Does nothing when the store already holds documents. Returns the number
/// of documents created.
pub async fn seed_demo_data(
    documents: &dyn DocumentRepository,
    users: &dyn UserRepository,
) -> Result<usize, AppError> {
    if documents.count().await? > 0 {
        tracing::info!("Document store not empty, skipping demo seeding");
        return Ok(0);
    }

    let profile = demo_profile_for(DEMO_OWNER)
        .ok_or_else(|| AppError::Internal(format!("Demo user '{DEMO_OWNER}' is not defined")))?;
    let owner = users.upsert_from_profile(profile).await?;

    // Insert every document first so links between them resolve.
    for (id, title, content) in DEMO_DOCUMENTS {
        let mut doc = Document::new(
            &owner.id,
            title.to_string(),
            content.to_string(),
            Visibility::Public,
        );
        doc.id = id.to_string();
        documents.insert(doc).await?;
        tracing::info!("Seeded demo document '{}'", id);
    }

    for (id, _, content) in DEMO_DOCUMENTS {
        let changes = DocumentChanges {
            links_out: dedup_targets(extract_document_links(content)),
            ..Default::default()
        };
        documents.update(id, changes).await?;
    }

    tracing::info!(count = DEMO_DOCUMENTS.len(), "Demo data seeding complete");
    Ok(DEMO_DOCUMENTS.len())
}
