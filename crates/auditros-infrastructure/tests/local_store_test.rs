use std::sync::Arc;

use auditros_core::AuditSection;
use auditros_core::experience::{AuditExperience, ExperienceRepository, Importance};
use auditros_core::session::{ChatSession, Message, SessionRepository};
use auditros_core::storage::KeyValueStore;
use auditros_core::user::{AuthUser, UserRepository};
use auditros_infrastructure::storage::keys;
use auditros_infrastructure::{ChatHistoryStore, ExperienceStore, JsonFileStore, UserRegistryStore};
use tempfile::TempDir;

fn kv(temp_dir: &TempDir) -> Arc<dyn KeyValueStore> {
    Arc::new(JsonFileStore::new(temp_dir.path().join("data")))
}

fn experience(section: AuditSection, learning: &str, timestamp: i64) -> AuditExperience {
    AuditExperience::new(section, "what about SA 240?", learning, Importance::Medium)
        .with_timestamp(timestamp)
}

fn session(id: &str, last_update: i64) -> ChatSession {
    let mut session = ChatSession::new(AuditSection::AuditObservation);
    session.id = id.to_string();
    session.push_message(Message::user("Check SA 240"));
    session.push_message(Message::assistant("SECTION ----------------\nNoted."));
    session.last_update = last_update;
    session
}

#[test]
fn test_experience_store_keeps_fifty_newest() {
    let temp_dir = TempDir::new().unwrap();
    let store = ExperienceStore::new(kv(&temp_dir));

    // Interleave timestamps so insertion order differs from timestamp order
    for i in 0..60i64 {
        let ts = if i % 2 == 0 { 1_000 + i } else { 5_000 - i };
        store
            .save_experience(experience(AuditSection::AuditPlan, &format!("l{i}"), ts))
            .unwrap();
    }

    let all = store.get_all();
    assert_eq!(all.len(), 50);
    assert!(all.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));

    // The oldest ten (even i, ts 1000..1018) were evicted
    assert!(all.iter().all(|e| e.timestamp > 1_018));
}

#[test]
fn test_relevant_context_matches_section_only() {
    let temp_dir = TempDir::new().unwrap();
    let store = ExperienceStore::new(kv(&temp_dir));

    for i in 0..7i64 {
        store
            .save_experience(experience(
                AuditSection::AuditObservation,
                &format!("observation learning {i}"),
                100 + i,
            ))
            .unwrap();
    }
    store
        .save_experience(experience(AuditSection::TaxCompliance, "tax learning", 500))
        .unwrap();

    let feed = store.get_relevant_context(AuditSection::AuditObservation);
    let lines: Vec<&str> = feed.lines().collect();
    assert_eq!(lines[0], "INSTITUTIONAL MEMORY FEED:");
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[1], "[PREVIOUS LEARNING]: observation learning 6");
    assert_eq!(lines[5], "[PREVIOUS LEARNING]: observation learning 2");
    assert!(!feed.contains("tax learning"));

    assert_eq!(store.get_relevant_context(AuditSection::RegulatoryUpdates), "");
}

#[test]
fn test_session_round_trip_and_ordering() {
    let temp_dir = TempDir::new().unwrap();
    let store = ChatHistoryStore::new(kv(&temp_dir));

    let older = session("1000", 1_000);
    let newer = session("2000", 2_000);
    store.save(&older).unwrap();
    store.save(&newer).unwrap();

    let all = store.list_all();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0], newer);
    assert_eq!(all[1], older);

    // Upsert replaces the whole record and moves it to the front
    let mut updated = older.clone();
    updated.push_message(Message::user("and SA 500?"));
    updated.last_update = 3_000;
    store.save(&updated).unwrap();

    let all = store.list_all();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0], updated);
    assert_eq!(store.find_by_id("1000").unwrap().messages.len(), 3);
}

#[test]
fn test_delete_removes_exactly_one() {
    let temp_dir = TempDir::new().unwrap();
    let store = ChatHistoryStore::new(kv(&temp_dir));

    for (id, ts) in [("1", 1), ("2", 2), ("3", 3)] {
        store.save(&session(id, ts)).unwrap();
    }
    store.delete("2").unwrap();

    let ids: Vec<String> = store.list_all().into_iter().map(|s| s.id).collect();
    assert_eq!(ids, vec!["3".to_string(), "1".to_string()]);

    // Unknown id leaves everything in place
    store.delete("404").unwrap();
    assert_eq!(store.list_all().len(), 2);
}

#[test]
fn test_corrupted_blobs_read_as_empty() {
    let temp_dir = TempDir::new().unwrap();
    let kv = kv(&temp_dir);
    kv.set(keys::CHAT_HISTORY, "{ definitely not a list").unwrap();
    kv.set(keys::EXPERIENCE_BASE, "42").unwrap();
    kv.set(keys::CURRENT_USER, "[]").unwrap();

    assert!(ChatHistoryStore::new(kv.clone()).list_all().is_empty());
    assert!(ExperienceStore::new(kv.clone()).get_all().is_empty());
    assert!(UserRegistryStore::new(kv.clone()).get_current_user().is_none());

    // A save after corruption starts a fresh collection
    let history = ChatHistoryStore::new(kv);
    history.save(&session("9", 9)).unwrap();
    assert_eq!(history.list_all().len(), 1);
}

#[test]
fn test_user_registry_upserts_by_email() {
    let temp_dir = TempDir::new().unwrap();
    let store = UserRegistryStore::new(kv(&temp_dir));

    assert!(store.get_current_user().is_none());

    store
        .save_user(AuthUser::new("Asha", "asha@example.com", ""))
        .unwrap();
    store
        .save_user(AuthUser::new("Ravi", "ravi@example.com", ""))
        .unwrap();
    let renamed = store
        .save_user(AuthUser::new("Asha R.", "asha@example.com", "https://img"))
        .unwrap();

    let registry = store.get_registry();
    assert_eq!(registry.len(), 2);
    assert_eq!(registry[0].name, "Asha R.");
    assert_eq!(registry[0].picture, "https://img");

    assert_eq!(store.get_current_user(), Some(renamed));

    store.logout().unwrap();
    assert!(store.get_current_user().is_none());
    assert_eq!(store.get_registry().len(), 2);
}

#[test]
fn test_stores_share_one_key_value_root() {
    let temp_dir = TempDir::new().unwrap();
    let kv = kv(&temp_dir);

    ChatHistoryStore::new(kv.clone()).save(&session("1", 1)).unwrap();
    ExperienceStore::new(kv.clone())
        .save_experience(experience(AuditSection::AuditPlan, "plan", 1))
        .unwrap();

    let data_dir = temp_dir.path().join("data");
    assert!(data_dir.join("auditros_chat_history.json").exists());
    assert!(data_dir.join("auditros_experience_base.json").exists());
}

#[test]
fn test_concurrent_experience_saves_are_all_kept() {
    let temp_dir = TempDir::new().unwrap();
    let store = ExperienceStore::new(kv(&temp_dir));

    let handles: Vec<_> = (0..8i64)
        .map(|worker| {
            let store = store.clone();
            std::thread::spawn(move || {
                for i in 0..5i64 {
                    store
                        .save_experience(experience(
                            AuditSection::TaxCompliance,
                            &format!("worker {worker} learning {i}"),
                            worker * 10 + i,
                        ))
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.get_all().len(), 40);
}

#[test]
fn test_concurrent_session_saves_are_all_kept() {
    let temp_dir = TempDir::new().unwrap();
    let store = ChatHistoryStore::new(kv(&temp_dir));

    let handles: Vec<_> = (0..6i64)
        .map(|n| {
            let store = store.clone();
            std::thread::spawn(move || store.save(&session(&format!("s{n}"), n)).unwrap())
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let ids: Vec<_> = store.list_all().into_iter().map(|s| s.id).collect();
    assert_eq!(ids, vec!["s5", "s4", "s3", "s2", "s1", "s0"]);
}
