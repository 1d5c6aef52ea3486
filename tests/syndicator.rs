//! Syndicator behavior against a recording in-memory transport.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::{anyhow, bail};
use async_trait::async_trait;
use crosspost::embed::{Embed, ExternalCard, ImageAttachment, OutboundPost, QuotedRecord};
use crosspost::facets::{Facet, FacetFeature};
use crosspost::transport::{
    BlobRef, FacetDetector, PostRecord, RecordEmbed, Session, StrongRef, Transport,
};
use crosspost::{compose_post, Action, Composer, Config, ImageAsset, Outcome, PostProperties, SkipReason, Syndicator};

const PROFILE: &str = "https://bsky.app/profile";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Login,
    GetPost(String, String),
    Like(String),
    Repost(String),
    Upload(String, usize),
    Post(PostRecord),
}

/// Transport recording every call. Uploads of `fail_mime` fail.
#[derive(Default)]
struct Recorder {
    calls: Mutex<Vec<Call>>,
    fail_mime: Option<&'static str>,
    next: AtomicUsize,
}

impl Recorder {
    fn failing_uploads(mime: &'static str) -> Self {
        Self {
            fail_mime: Some(mime),
            ..Self::default()
        }
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn posted(&self) -> PostRecord {
        self.calls()
            .into_iter()
            .find_map(|c| match c {
                Call::Post(record) => Some(record),
                _ => None,
            })
            .expect("a post was published")
    }

    fn id(&self) -> usize {
        self.next.fetch_add(1, Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for Recorder {
    async fn login(&self) -> anyhow::Result<Session> {
        self.record(Call::Login);
        Ok(Session {
            did: "did:plc:me".to_string(),
            handle: "me.example".to_string(),
        })
    }

    async fn post(&self, _session: &Session, record: PostRecord) -> anyhow::Result<String> {
        self.record(Call::Post(record));
        Ok(format!("at://did:plc:me/app.bsky.feed.post/p{}", self.id()))
    }

    async fn like(&self, _session: &Session, subject: &StrongRef) -> anyhow::Result<String> {
        self.record(Call::Like(subject.uri.clone()));
        Ok("at://did:plc:me/app.bsky.feed.like/l1".to_string())
    }

    async fn repost(&self, _session: &Session, subject: &StrongRef) -> anyhow::Result<String> {
        self.record(Call::Repost(subject.uri.clone()));
        Ok("at://did:plc:me/app.bsky.feed.repost/r1".to_string())
    }

    async fn upload_blob(
        &self,
        _session: &Session,
        bytes: Vec<u8>,
        mime_type: &str,
    ) -> anyhow::Result<BlobRef> {
        self.record(Call::Upload(mime_type.to_string(), bytes.len()));
        if self.fail_mime == Some(mime_type) {
            bail!("upload rejected");
        }
        Ok(BlobRef {
            cid: format!("bafy{}", self.id()),
            mime_type: mime_type.to_string(),
            size: bytes.len(),
        })
    }

    async fn get_post(
        &self,
        _session: &Session,
        account: &str,
        rkey: &str,
    ) -> anyhow::Result<StrongRef> {
        self.record(Call::GetPost(account.to_string(), rkey.to_string()));
        Ok(StrongRef {
            uri: format!("at://{account}/app.bsky.feed.post/{rkey}"),
            cid: "cid-quoted".to_string(),
        })
    }
}

struct FixedFacets(Vec<Facet>);

#[async_trait]
impl FacetDetector for FixedFacets {
    async fn detect_facets(&self, _text: &str, _session: &Session) -> anyhow::Result<Vec<Facet>> {
        Ok(self.0.clone())
    }
}

struct BrokenFacets;

#[async_trait]
impl FacetDetector for BrokenFacets {
    async fn detect_facets(&self, _text: &str, _session: &Session) -> anyhow::Result<Vec<Facet>> {
        Err(anyhow!("detector offline"))
    }
}

fn composer() -> Composer {
    Composer::new(Config {
        profile_url: PROFILE.to_string(),
        ..Config::default()
    })
    .unwrap()
}

fn asset(len: usize) -> ImageAsset {
    ImageAsset {
        bytes: vec![0xAB; len],
        mime_type: "image/jpeg".to_string(),
    }
}

fn text_post(text: &str, embed: Embed, link_facets: Vec<Facet>) -> Action {
    Action::Post(OutboundPost {
        text: compose_post(None, text, None, false).unwrap(),
        embed,
        link_facets,
    })
}

fn mention(range: std::ops::Range<usize>) -> Facet {
    Facet {
        range,
        feature: FacetFeature::Mention {
            did: "did:plc:friend".to_string(),
        },
    }
}

// ─── Reactions ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn native_like_resolves_target_then_likes() {
    let syndicator = Syndicator::new(composer(), Recorder::default());
    let transport = syndicator.transport();

    let props = PostProperties {
        like_of: Some(format!("{PROFILE}/did:plc:abc/post/xyz")),
        ..Default::default()
    };
    let outcome = syndicator.syndicate(&props).await.unwrap();

    assert_eq!(
        transport.calls(),
        vec![
            Call::Login,
            Call::GetPost("did:plc:abc".to_string(), "xyz".to_string()),
            Call::Like("at://did:plc:abc/app.bsky.feed.post/xyz".to_string()),
        ]
    );
    assert_eq!(outcome.url(), Some("https://bsky.app/profile/did:plc:me/like/l1"));
}

#[tokio::test]
async fn native_repost_resolves_target_then_reposts() {
    let syndicator = Syndicator::new(composer(), Recorder::default());
    let transport = syndicator.transport();

    let outcome = syndicator
        .execute(Action::Repost {
            target: format!("{PROFILE}/alice.example/post/3k2"),
        })
        .await
        .unwrap();

    assert!(transport
        .calls()
        .contains(&Call::Repost("at://alice.example/app.bsky.feed.post/3k2".to_string())));
    assert!(matches!(outcome, Outcome::Published { .. }));
}

#[tokio::test]
async fn skip_touches_nothing() {
    let syndicator = Syndicator::new(composer(), Recorder::default());
    let transport = syndicator.transport();

    let props = PostProperties {
        repost_of: Some("https://other.example/post".to_string()),
        ..Default::default()
    };
    let outcome = syndicator.syndicate(&props).await.unwrap();

    assert_eq!(
        outcome,
        Outcome::Skipped {
            reason: SkipReason::ExternalRepostsDisabled
        }
    );
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn like_of_foreign_url_fails_before_liking() {
    let syndicator = Syndicator::new(composer(), Recorder::default());
    let transport = syndicator.transport();

    let err = syndicator
        .execute(Action::Like {
            target: "https://bsky.app/elsewhere/xyz".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, crosspost::Error::InvalidUrl { .. }));
    assert_eq!(transport.calls(), vec![Call::Login]);
}

// ─── Posts ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn quote_post_resolves_record_and_uploads_images() {
    let syndicator = Syndicator::new(composer(), Recorder::default());
    let transport = syndicator.transport();

    let embed = Embed::RecordWithImages {
        record: QuotedRecord {
            url: format!("{PROFILE}/did:plc:me/post/orig"),
        },
        images: vec![
            ImageAttachment {
                image: asset(10),
                alt: "a".to_string(),
            },
            ImageAttachment {
                image: asset(20),
                alt: "b".to_string(),
            },
        ],
    };
    let outcome = syndicator
        .execute(text_post("nice", embed, Vec::new()))
        .await
        .unwrap();

    let record = transport.posted();
    assert_eq!(record.text, "nice");
    match record.embed {
        RecordEmbed::RecordWithMedia { record, images } => {
            assert_eq!(record.uri, "at://did:plc:me/app.bsky.feed.post/orig");
            assert_eq!(images.len(), 2);
            assert_eq!(images[0].alt, "a");
            assert_eq!(images[0].blob.size, 10);
            assert_eq!(images[1].blob.size, 20);
        }
        other => panic!("expected record with media, got {other:?}"),
    }
    assert!(outcome
        .url()
        .unwrap()
        .starts_with("https://bsky.app/profile/did:plc:me/post/p"));
}

#[tokio::test]
async fn failed_thumbnail_upload_drops_thumbnail() {
    let syndicator = Syndicator::new(composer(), Recorder::failing_uploads("image/jpeg"));
    let transport = syndicator.transport();

    let embed = Embed::External {
        card: ExternalCard {
            url: "https://a.example/x".to_string(),
            title: "A".to_string(),
            description: String::new(),
            thumb: Some(asset(5)),
        },
    };
    syndicator
        .execute(text_post("look", embed, Vec::new()))
        .await
        .unwrap();

    match transport.posted().embed {
        RecordEmbed::External { uri, thumb, .. } => {
            assert_eq!(uri, "https://a.example/x");
            assert!(thumb.is_none());
        }
        other => panic!("expected external embed, got {other:?}"),
    }
}

#[tokio::test]
async fn failed_image_upload_is_fatal() {
    let syndicator = Syndicator::new(composer(), Recorder::failing_uploads("image/jpeg"));
    let transport = syndicator.transport();

    let embed = Embed::Images {
        images: vec![ImageAttachment {
            image: asset(5),
            alt: String::new(),
        }],
    };
    let err = syndicator
        .execute(text_post("photo", embed, Vec::new()))
        .await
        .unwrap_err();

    assert!(matches!(err, crosspost::Error::Transport(_)));
    assert!(!transport.calls().iter().any(|c| matches!(c, Call::Post(_))));
}

#[tokio::test]
async fn detected_facets_merge_with_derived_links() {
    let detector = FixedFacets(vec![mention(2..8), mention(20..26)]);
    let syndicator = Syndicator::with_facets(composer(), Recorder::default(), detector);
    let transport = syndicator.transport();

    let derived = vec![Facet::link(0..5, "https://a.example")];
    syndicator
        .execute(text_post(
            "hello there, my friend @alice",
            Embed::None,
            derived,
        ))
        .await
        .unwrap();

    let facets = transport.posted().facets;
    assert_eq!(facets.len(), 2);
    assert_eq!(facets[0], Facet::link(0..5, "https://a.example"));
    assert_eq!(facets[1].range, 20..26);
}

#[tokio::test]
async fn broken_detector_keeps_derived_links() {
    let syndicator = Syndicator::with_facets(composer(), Recorder::default(), BrokenFacets);
    let transport = syndicator.transport();

    let derived = vec![Facet::link(0..5, "https://a.example")];
    syndicator
        .execute(text_post("hello", Embed::None, derived.clone()))
        .await
        .unwrap();

    let record = transport.posted();
    assert_eq!(record.facets, derived);
    assert_eq!(record.embed, RecordEmbed::None);
}
