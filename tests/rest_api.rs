use serde_json::{json, Value};
use socialconnect_backend::api;
use socialconnect_backend::auth::ROLE_ADMIN;
use socialconnect_backend::bootstrap;
use socialconnect_backend::config::{SocialConnectConfig, SocialConnectPaths};
use socialconnect_backend::profiles::ProfileService;
use tempfile::tempdir;
use tokio::time::{sleep, Duration};

fn next_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .expect("bind ephemeral port")
        .local_addr()
        .unwrap()
        .port()
}

async fn wait_for_health(base_url: &str) {
    let client = reqwest::Client::new();
    for _ in 0..50 {
        if let Ok(resp) = client.get(format!("{base_url}/health")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        sleep(Duration::from_millis(100)).await;
    }
    panic!("server did not become healthy in time");
}

struct TestUser {
    id: String,
    token: String,
}

async fn provision_user(client: &reqwest::Client, base_url: &str, body: Value) -> TestUser {
    let resp: Value = client
        .post(format!("{base_url}/profiles"))
        .json(&body)
        .send()
        .await
        .expect("provision response")
        .json()
        .await
        .expect("provision json");
    TestUser {
        id: resp["profile"]["id"].as_str().expect("profile id").into(),
        token: resp["session_token"].as_str().expect("session token").into(),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn rest_roundtrip() {
    let temp = tempdir().expect("tempdir");
    let port = next_port();
    let config = SocialConnectConfig::new(
        port,
        SocialConnectPaths::from_base_dir(temp.path()).expect("paths"),
    );

    let resources = bootstrap::initialize(&config).expect("bootstrap");
    let database = resources.database.clone();
    let server_config = config.clone();
    let server_database = resources.database.clone();
    let server = tokio::spawn(async move {
        let _ = api::serve_http(server_config, server_database).await;
    });

    let base_url = format!("http://127.0.0.1:{port}");
    wait_for_health(&base_url).await;
    let client = reqwest::Client::new();

    // Provision two members plus a future admin.
    let alice = provision_user(&client, &base_url, json!({ "username": "alice" })).await;
    let bob = provision_user(
        &client,
        &base_url,
        json!({ "username": "bob", "display_name": "Bob B" }),
    )
    .await;
    let admin = provision_user(&client, &base_url, json!({ "username": "root" })).await;
    // Promotion happens through the operator path, never the HTTP surface.
    ProfileService::new(database.clone())
        .set_role("root", ROLE_ADMIN)
        .expect("promote root");

    // A role claim smuggled into the signup payload is ignored.
    let eve = provision_user(
        &client,
        &base_url,
        json!({ "username": "eve", "role": ROLE_ADMIN }),
    )
    .await;
    let escalated = client
        .get(format!("{base_url}/admin/stats"))
        .bearer_auth(&eve.token)
        .send()
        .await
        .expect("escalation response");
    assert_eq!(escalated.status(), 403);

    // Duplicate usernames are rejected up front.
    let dup = client
        .post(format!("{base_url}/profiles"))
        .json(&json!({ "username": "alice" }))
        .send()
        .await
        .expect("dup response");
    assert_eq!(dup.status(), 400);

    // Alice follows Bob.
    let follow: Value = client
        .post(format!("{base_url}/profiles/{}/follow", bob.id))
        .bearer_auth(&alice.token)
        .send()
        .await
        .expect("follow response")
        .json()
        .await
        .expect("follow json");
    assert_eq!(follow["following"], json!(true));
    assert_eq!(follow["follower_count"], json!(1));

    // Self-follow is rejected.
    let self_follow = client
        .post(format!("{base_url}/profiles/{}/follow", alice.id))
        .bearer_auth(&alice.token)
        .send()
        .await
        .expect("self follow response");
    assert_eq!(self_follow.status(), 400);

    // Bob posts; the post shows up in Alice's feed.
    let post: Value = client
        .post(format!("{base_url}/posts"))
        .bearer_auth(&bob.token)
        .json(&json!({ "content": "hello feed" }))
        .send()
        .await
        .expect("post response")
        .json()
        .await
        .expect("post json");
    let post_id = post["id"].as_str().expect("post id").to_string();

    let feed: Value = client
        .get(format!("{base_url}/feed"))
        .bearer_auth(&alice.token)
        .send()
        .await
        .expect("feed response")
        .json()
        .await
        .expect("feed json");
    let feed_posts = feed["posts"].as_array().expect("feed posts");
    assert_eq!(feed_posts.len(), 1);
    assert_eq!(feed_posts[0]["content"], json!("hello feed"));
    assert_eq!(feed_posts[0]["author"]["username"], json!("bob"));

    // The feed requires authentication.
    let anon_feed = client
        .get(format!("{base_url}/feed"))
        .send()
        .await
        .expect("anon feed response");
    assert_eq!(anon_feed.status(), 401);

    // Alice likes the post, toggling back and forth.
    let like: Value = client
        .post(format!("{base_url}/posts/{post_id}/like"))
        .bearer_auth(&alice.token)
        .send()
        .await
        .expect("like response")
        .json()
        .await
        .expect("like json");
    assert_eq!(like["liked"], json!(true));
    assert_eq!(like["like_count"], json!(1));

    let unlike: Value = client
        .post(format!("{base_url}/posts/{post_id}/like"))
        .bearer_auth(&alice.token)
        .send()
        .await
        .expect("unlike response")
        .json()
        .await
        .expect("unlike json");
    assert_eq!(unlike["liked"], json!(false));
    assert_eq!(unlike["like_count"], json!(0));

    // Alice comments on Bob's post.
    let comment: Value = client
        .post(format!("{base_url}/posts/{post_id}/comments"))
        .bearer_auth(&alice.token)
        .json(&json!({ "content": "nice one" }))
        .send()
        .await
        .expect("comment response")
        .json()
        .await
        .expect("comment json");
    assert_eq!(comment["content"], json!("nice one"));

    let comments: Value = client
        .get(format!("{base_url}/posts/{post_id}/comments"))
        .send()
        .await
        .expect("comments response")
        .json()
        .await
        .expect("comments json");
    assert_eq!(comments["comments"].as_array().unwrap().len(), 1);

    // Bob has notifications from the like, the unliked like stays, plus the
    // comment and the follow.
    let unread: Value = client
        .get(format!("{base_url}/notifications/unread_count"))
        .bearer_auth(&bob.token)
        .send()
        .await
        .expect("unread response")
        .json()
        .await
        .expect("unread json");
    assert_eq!(unread["unread"], json!(3));

    let notifications: Value = client
        .get(format!("{base_url}/notifications"))
        .bearer_auth(&bob.token)
        .send()
        .await
        .expect("notifications response")
        .json()
        .await
        .expect("notifications json");
    assert_eq!(notifications["notifications"].as_array().unwrap().len(), 3);

    let unread_after: Value = client
        .get(format!("{base_url}/notifications/unread_count"))
        .bearer_auth(&bob.token)
        .send()
        .await
        .expect("unread after response")
        .json()
        .await
        .expect("unread after json");
    assert_eq!(unread_after["unread"], json!(0));

    // Search finds the post and Bob's profile.
    let search: Value = client
        .get(format!("{base_url}/search?q=hello"))
        .send()
        .await
        .expect("search response")
        .json()
        .await
        .expect("search json");
    assert_eq!(search["posts"].as_array().unwrap().len(), 1);
    let people: Value = client
        .get(format!("{base_url}/search?q=Bob"))
        .send()
        .await
        .expect("people response")
        .json()
        .await
        .expect("people json");
    assert_eq!(people["people"].as_array().unwrap().len(), 1);

    // Profile view carries counts and follow state.
    let profile: Value = client
        .get(format!("{base_url}/profiles/{}", bob.id))
        .bearer_auth(&alice.token)
        .send()
        .await
        .expect("profile response")
        .json()
        .await
        .expect("profile json");
    assert_eq!(profile["follower_count"], json!(1));
    assert_eq!(profile["post_count"], json!(1));
    assert_eq!(profile["viewer_is_following"], json!(true));

    let bob_posts: Value = client
        .get(format!("{base_url}/profiles/{}/posts", bob.id))
        .send()
        .await
        .expect("profile posts response")
        .json()
        .await
        .expect("profile posts json");
    assert_eq!(bob_posts["posts"].as_array().unwrap().len(), 1);

    // Profile editing: Alice updates her display name.
    let updated: Value = client
        .put(format!("{base_url}/profiles/me"))
        .bearer_auth(&alice.token)
        .json(&json!({ "display_name": "Alice A", "bio": "hi" }))
        .send()
        .await
        .expect("update response")
        .json()
        .await
        .expect("update json");
    assert_eq!(updated["username"], json!("alice"));
    assert_eq!(updated["display_name"], json!("Alice A"));

    // Admin stats are gated by role.
    let forbidden = client
        .get(format!("{base_url}/admin/stats"))
        .bearer_auth(&alice.token)
        .send()
        .await
        .expect("forbidden response");
    assert_eq!(forbidden.status(), 403);

    let anonymous = client
        .get(format!("{base_url}/admin/stats"))
        .send()
        .await
        .expect("anonymous response");
    assert_eq!(anonymous.status(), 401);

    let stats: Value = client
        .get(format!("{base_url}/admin/stats"))
        .bearer_auth(&admin.token)
        .send()
        .await
        .expect("stats response")
        .json()
        .await
        .expect("stats json");
    assert_eq!(stats["totals"]["total_users"], json!(4));
    assert_eq!(stats["totals"]["total_posts"], json!(1));
    assert!(stats["recent_users"].as_array().unwrap().len() <= 10);

    // Only the owner may delete a post.
    let not_owner = client
        .delete(format!("{base_url}/posts/{post_id}"))
        .bearer_auth(&alice.token)
        .send()
        .await
        .expect("not owner response");
    assert_eq!(not_owner.status(), 403);

    let deleted: Value = client
        .delete(format!("{base_url}/posts/{post_id}"))
        .bearer_auth(&bob.token)
        .send()
        .await
        .expect("delete response")
        .json()
        .await
        .expect("delete json");
    assert_eq!(deleted["deleted"], json!(true));

    let gone = client
        .get(format!("{base_url}/posts/{post_id}"))
        .send()
        .await
        .expect("gone response");
    assert_eq!(gone.status(), 404);

    server.abort();
    let _ = server.await;
}
