use catalog::MemeId;
use chrono::Utc;
use engagement::{
    count_uploads, merge_catalog, rank_memes, rank_users, MemoryStore, Meme, Metric, Overlay,
    Upload,
};

fn meme(id: &str, name: &str) -> Meme {
    Meme {
        id: MemeId::new(id),
        name: name.to_string(),
        url: format!("https://i.imgflip.com/{id}.jpg"),
        likes: 0,
        comments: Vec::new(),
        uploaded_by: None,
        created_at: None,
    }
}

fn main() {
    let overlay = Overlay::new(MemoryStore::new());

    overlay.record_like(&MemeId::new("1"), "alice", None).unwrap();
    overlay.record_like(&MemeId::new("1"), "bob", None).unwrap();
    overlay.record_like(&MemeId::new("2"), "alice", None).unwrap();
    overlay.record_like(&MemeId::new("gone"), "alice", None).unwrap();

    overlay
        .record_comment(&MemeId::new("2"), "certified classic")
        .unwrap();

    let catalog = vec![
        meme("1", "Drake Hotline Bling"),
        meme("2", "Two Buttons"),
        meme("3", "Distracted Boyfriend"),
    ];

    // The like on "gone" is an orphan and must not show up.
    let views = merge_catalog(catalog, &overlay);
    println!("Merged views: {}", views.len());

    for view in rank_memes(&views, Metric::Likes, None) {
        println!(
            "{} likes={} comments={}",
            view.name,
            view.likes,
            view.comments.len()
        );
    }

    let uploads = vec![
        Upload {
            uploaded_by: Some("bob".to_string()),
            url: "https://i.imgflip.com/up1.jpg".to_string(),
            top_text: "top".to_string(),
            bottom_text: "bottom".to_string(),
            template_id: MemeId::new("1"),
            created_at: Utc::now(),
        },
        Upload {
            uploaded_by: None,
            url: "https://i.imgflip.com/up2.jpg".to_string(),
            top_text: String::new(),
            bottom_text: String::new(),
            template_id: MemeId::new("2"),
            created_at: Utc::now(),
        },
    ];

    println!("\nLeaderboard:");
    for rank in rank_users(&count_uploads(&uploads), &overlay.user_stats()) {
        println!(
            "{} uploads={} likes={} score={}",
            rank.identity, rank.uploads, rank.likes, rank.score
        );
    }
}
