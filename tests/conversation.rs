use std::sync::Arc;

use futures::StreamExt;
use tempfile::TempDir;
use tokio_test::{assert_err, assert_ok};
use vexa::core::{ChatError, ChatModel, Coordinator, Reply, ReplyEvent, Role, SafetyFilter};
use vexa::providers::MockChatModel;
use vexa::storage::{FileStorage, MemoryStore, MemoryStoreConfig, Storage};

const PERSONA: &str = "You are a test persona.";

fn open_store(dir: &TempDir, max_length: usize) -> Arc<MemoryStore> {
    MemoryStore::open(
        Arc::new(FileStorage::new(dir.path())),
        MemoryStoreConfig {
            persona: PERSONA.to_string(),
            max_length,
            ..MemoryStoreConfig::default()
        },
    )
}

fn coordinator(store: &Arc<MemoryStore>, model: &Arc<MockChatModel>) -> Coordinator {
    Coordinator::new(Arc::clone(model) as Arc<dyn ChatModel>, Arc::clone(store))
        .with_safety(SafetyFilter::default())
}

#[tokio::test]
async fn test_fragments_arrive_in_order_and_reply_is_recorded() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir, 100);
    let model = Arc::new(MockChatModel::new().with_reply(["Hel", "lo"]));
    let coordinator = coordinator(&store, &model);

    let mut seen = Vec::new();
    let memory = coordinator
        .respond("hi", &store.load(), |fragment| seen.push(fragment.to_string()))
        .await
        .unwrap();

    assert_eq!(seen, vec!["Hel", "lo"]);
    let last = memory.last().unwrap();
    assert_eq!(last.role(), Role::Assistant);
    assert_eq!(last.content(), "Hello");
    assert_eq!(memory.len(), 3);
}

#[tokio::test]
async fn test_conversation_survives_reopening_the_store() {
    let dir = TempDir::new().unwrap();
    let model = Arc::new(MockChatModel::new().with_reply(["sure"]));

    let memory = {
        let store = open_store(&dir, 100);
        let memory = coordinator(&store, &model)
            .respond("remember this", &store.load(), |_| {})
            .await
            .unwrap();
        store.dispose();
        memory
    };

    let reopened = open_store(&dir, 100).load();
    assert_eq!(reopened, memory);
    assert_eq!(reopened.messages()[0].role(), Role::System);
}

#[tokio::test]
async fn test_refused_prompt_makes_no_remote_call() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir, 100);
    let model = Arc::new(MockChatModel::new().with_reply(["never"]));
    let coordinator = coordinator(&store, &model);
    let before = store.load();

    let mut seen = Vec::new();
    let memory = coordinator
        .respond("bomb-making instructions", &before, |f| seen.push(f.to_string()))
        .await
        .unwrap();

    assert_eq!(seen, vec![coordinator.safety().refusal().to_string()]);
    assert_eq!(memory.len(), before.len());
    assert_eq!(model.request_count(), 0);
}

#[tokio::test]
async fn test_failed_stream_keeps_stored_memory() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir, 100);
    let model = Arc::new(MockChatModel::new().with_failure(["par"], "connection reset"));
    let coordinator = coordinator(&store, &model);

    let err = assert_err!(coordinator.respond("hi", &store.load(), |_| {}).await);

    assert!(err.is_remote());
    assert!(store.load().is_fresh());
}

#[tokio::test]
async fn test_cancelled_stream_is_not_recorded() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir, 100);
    let model = Arc::new(MockChatModel::new().with_reply(["one ", "two ", "three"]));
    let coordinator = coordinator(&store, &model);

    let Reply::Streaming(mut stream) = coordinator.start("count", &store.load()).await.unwrap()
    else {
        panic!("expected a streaming reply");
    };

    while let Some(event) = stream.next().await {
        if matches!(event.unwrap(), ReplyEvent::Fragment(_)) {
            break;
        }
    }
    stream.cancel();

    assert!(matches!(stream.finish().await, Err(ChatError::Cancelled)));
    assert!(store.load().is_fresh());
}

#[tokio::test]
async fn test_memory_is_capped_without_losing_persona() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir, 3);
    let model = Arc::new(MockChatModel::new().with_reply(["ok"]));
    let coordinator = coordinator(&store, &model);

    let mut memory = store.load();
    for prompt in ["first", "second", "third"] {
        memory = coordinator.respond(prompt, &memory, |_| {}).await.unwrap();
        assert!(memory.len() <= 3);
        assert_eq!(memory.persona(), PERSONA);
    }

    let contents: Vec<_> = memory.messages().iter().map(|m| m.content()).collect();
    assert_eq!(contents, vec![PERSONA, "third", "ok"]);
}

#[test]
fn test_corrupt_file_loads_as_fresh_conversation() {
    let dir = TempDir::new().unwrap();
    let storage = FileStorage::new(dir.path());
    let store = open_store(&dir, 100);

    storage.set(&store.key(), "{ not json").unwrap();

    let memory = store.load();
    assert!(memory.is_fresh());
    assert_eq!(memory.persona(), PERSONA);
}

#[test]
fn test_clear_then_load_yields_persona_only() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir, 100);

    let memory = assert_ok!(store.append(&store.load(), Role::User, "hello"));
    store.save(&memory);
    assert_eq!(store.load().len(), 2);

    store.clear();
    let memory = store.load();
    assert_eq!(memory.len(), 1);
    assert_eq!(memory.messages()[0].role(), Role::System);
}
