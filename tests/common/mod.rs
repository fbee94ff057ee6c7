use std::path::PathBuf;
use std::sync::OnceLock;

use facturaflow::auth::{Session, SignUpPayload};
use facturaflow::commands::session::{sign_in, sign_up, SignInPayload};
use facturaflow::db::Database;
use facturaflow::models::ROLE_BUSINESS;
use facturaflow::services::storage::FileStore;
use facturaflow::AppState;

static TRACING: OnceLock<()> = OnceLock::new();

pub fn init_tracing() {
    TRACING.get_or_init(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

pub fn temp_dir(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!("facturaflow-{}-{}", label, uuid::Uuid::new_v4().simple()))
}

/// Fresh in-memory state with a working file store.
pub fn state() -> AppState {
    init_tracing();
    let db = Database::open_in_memory().expect("in-memory database");
    AppState::new(db, FileStore::new(temp_dir("files")))
}

/// State whose file store root is an existing plain file, so every upload
/// fails while the record store keeps working.
pub fn state_with_broken_file_store() -> AppState {
    init_tracing();
    let root = temp_dir("broken");
    std::fs::write(&root, b"not a directory").expect("write blocker file");
    let db = Database::open_in_memory().expect("in-memory database");
    AppState::new(db, FileStore::new(root))
}

pub async fn signed_in_business(state: &AppState, email: &str) -> Session {
    sign_up(
        state,
        SignUpPayload {
            name: "Owner".to_string(),
            email: email.to_string(),
            password: "secret1".to_string(),
            role: ROLE_BUSINESS.to_string(),
            assigned_clients: None,
        },
    )
    .await
    .expect("sign up");

    sign_in(
        state,
        SignInPayload {
            email: email.to_string(),
            password: "secret1".to_string(),
            role: ROLE_BUSINESS.to_string(),
        },
    )
    .await
    .expect("sign in")
}
