//! End-to-end store flow over a file-backed database.

use pretty_assertions::assert_eq;
use pw_core::{BackendSession, NewPost};
use pw_db::error::DatabaseError;
use pw_db::service::PwService;

async fn open(path: &str, user: &str) -> PwService {
    let svc = PwService::new_local(path).await.unwrap();
    svc.install_session(BackendSession::from_identity_token(user, format!("jwt-{user}")))
        .await
        .unwrap();
    svc
}

#[tokio::test]
async fn published_posts_survive_reopen() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("postwright.db");
    let path = path.to_str().unwrap();

    let tag = {
        let svc = open(path, "user_a").await;
        let tag = svc.create_tag("Launch", Some("emerald")).await.unwrap();
        svc.publish(
            NewPost::new("We shipped the new editor today", "editor launch")
                .with_tags(vec![tag.id.clone(), "linkedin".into()]),
        )
        .await
        .unwrap();
        tag
    };

    let svc = open(path, "user_a").await;
    let posts = svc.list_posts(20).await.unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].tags, vec![tag.id.clone(), "linkedin".to_string()]);
    assert_eq!(posts[0].word_count, 6);

    let stats = svc.read_stats().await.unwrap();
    assert_eq!(stats.total_posts, 1);
    assert_eq!(stats.total_words, 6);
    assert_eq!(stats.history.len(), 1);

    let names: Vec<_> = svc.list_tags().await.unwrap().into_iter().map(|t| t.name).collect();
    assert!(names.contains(&"Launch".to_string()));
}

#[tokio::test]
async fn clearing_session_locks_the_store() {
    let svc = open(":memory:", "user_a").await;
    svc.publish(NewPost::new("hello there", "greeting")).await.unwrap();

    svc.clear_session().await.unwrap();
    assert!(matches!(svc.list_posts(5).await, Err(DatabaseError::NotAuthenticated)));
    assert!(matches!(svc.read_stats().await, Err(DatabaseError::NotAuthenticated)));
}

#[tokio::test]
async fn each_user_sees_only_their_own_history() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("shared.db");
    let path = path.to_str().unwrap();

    let a = open(path, "user_a").await;
    a.publish(NewPost::new("one two three", "p")).await.unwrap();
    a.publish(NewPost::new("four five", "p")).await.unwrap();
    drop(a);

    let b = open(path, "user_b").await;
    b.publish(NewPost::new("solo", "p")).await.unwrap();

    assert_eq!(b.list_posts(20).await.unwrap().len(), 1);
    let stats = b.read_stats().await.unwrap();
    assert_eq!(stats.total_posts, 1);
    assert_eq!(stats.total_words, 1);
}
