//! Shared test utilities for hub-server integration tests

use std::net::SocketAddr;
use std::sync::Arc;

use hub_core::{
    Agency, ClassificationLevel, HubConfig, IndexedDocument, KnowledgeHub, MemoryAuditSink,
    MemorySearchBackend,
};
use hub_server::{HubServer, ServerConfig};
use tokio::net::TcpListener;

/// A small corpus spread over three agencies
pub fn corpus() -> Vec<IndexedDocument> {
    vec![
        IndexedDocument::new(
            "dmv-100",
            Agency::Dmv,
            ClassificationLevel::Public,
            "Licensing requirements",
        )
        .with_keywords(["licensing", "requirements"])
        .with_content("General licensing requirements for drivers."),
        IndexedDocument::new(
            "dmv-300",
            Agency::Dmv,
            ClassificationLevel::Restricted,
            "Licensing fraud cases",
        )
        .with_content("Restricted licensing fraud case notes."),
        IndexedDocument::new(
            "dol-100",
            Agency::Dol,
            ClassificationLevel::Public,
            "Licensing for contractors",
        )
        .with_keywords(["licensing"])
        .with_content("Contractor licensing at the labor department."),
        IndexedDocument::new(
            "dol-200",
            Agency::Dol,
            ClassificationLevel::Public,
            "Personnel rules",
        )
        .with_keywords(["personnel"])
        .with_content("Personnel rules for labor department staff."),
        IndexedDocument::new(
            "doh-100",
            Agency::Doh,
            ClassificationLevel::Public,
            "Clinic licensing",
        )
        .with_keywords(["licensing"])
        .with_content("Health clinic licensing rules."),
    ]
}

/// Builds a hub over [`corpus`] with an inspectable audit sink
#[allow(dead_code)]
pub fn create_hub() -> (Arc<KnowledgeHub>, Arc<MemoryAuditSink>) {
    let audit = Arc::new(MemoryAuditSink::new());
    let hub = KnowledgeHub::builder(
        HubConfig::default(),
        Arc::new(MemorySearchBackend::with_documents(corpus())),
    )
    .audit_sink(audit.clone())
    .build()
    .unwrap();
    (Arc::new(hub), audit)
}

/// Creates a running test server, returns the audit sink and bound address
#[allow(dead_code)]
pub async fn create_test_server() -> (Arc<MemoryAuditSink>, SocketAddr) {
    let (hub, audit) = create_hub();
    let server = HubServer::new(ServerConfig::new("127.0.0.1", 0), hub);
    let addr = spawn_server(server).await;
    (audit, addr)
}

/// Spawns server in background task, returns bound address
async fn spawn_server(server: HubServer) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let _ = server.run_with_listener(listener).await;
    });

    // Brief delay to ensure server is accepting connections
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;

    addr
}
