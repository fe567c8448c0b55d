//! Shared harness for integration tests.
//!
//! Stub upstreams are plain axum routers served on a random local port. The
//! fixture builders produce what the real site serves: sealed manifests and
//! segments hidden behind a PNG image.

#![allow(dead_code)]

use std::io::Write;
use std::net::SocketAddr;
use std::time::Duration;

use aes::Aes256;
use axum::Router;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use cbc::cipher::{BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};
use flate2::Compression;
use flate2::write::DeflateEncoder;
use sha2::{Digest, Sha256};
use tokio::net::TcpListener;

use vsub_engine::container::PNG_END_MARKER;
use vsub_engine::{PacingConfig, SiteConfig};

type Aes256CbcEnc = cbc::Encryptor<Aes256>;

pub const SECRET: &str = "dm_thang_suc_vat_get_link_an_dbt";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("vsub_engine=debug")
        .try_init();
}

/// Binds a random local port; the router can be built once the address is known.
pub async fn bind() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind random port");
    let addr = listener.local_addr().expect("failed to get local addr");
    (listener, addr)
}

pub fn serve(listener: TcpListener, app: Router) {
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
}

pub async fn spawn(app: Router) -> SocketAddr {
    let (listener, addr) = bind().await;
    serve(listener, app);
    addr
}

pub fn site_config(addr: SocketAddr) -> SiteConfig {
    SiteConfig::builder()
        .with_domain(format!("http://{addr}"))
        .with_secret(SECRET)
        .with_timeout(Duration::from_secs(5))
        .build()
}

/// Millisecond-scale pacing so retry tests stay fast.
pub fn fast_pacing() -> PacingConfig {
    PacingConfig {
        initial_delay: Duration::from_millis(5),
        min_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(50),
        backoff_factor: 1.8,
        decrease_step: Duration::from_millis(1),
        success_streak: 5,
        max_attempts: 10,
    }
}

/// Go-style quoting of `text`.
pub fn quote(text: &str) -> String {
    let mut out = String::from("\"");
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Encrypts `playlist` the way the player API does.
pub fn seal(secret: &str, playlist: &str) -> String {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(quote(playlist).as_bytes())
        .expect("deflate into memory");
    let compressed = encoder.finish().expect("finish deflate");

    let key = Sha256::digest(secret.as_bytes());
    let iv = [7u8; 16];
    let ciphertext = Aes256CbcEnc::new_from_slices(&key, &iv)
        .expect("valid key and iv")
        .encrypt_padded_vec_mut::<Pkcs7>(&compressed);

    let mut blob = iv.to_vec();
    blob.extend_from_slice(&ciphertext);
    STANDARD.encode(blob)
}

/// Player API body carrying one sealed playlist.
pub fn manifest_json(title: &str, playlist: &str) -> serde_json::Value {
    serde_json::json!({
        "success": 1,
        "title": title,
        "link": [{ "file": seal(SECRET, playlist), "type": "hls" }],
    })
}

/// Hides `payload` behind a minimal PNG image.
pub fn disguise(payload: &[u8]) -> Vec<u8> {
    let mut blob = vec![0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];
    blob.extend_from_slice(&[0, 0, 0, 13]);
    blob.extend_from_slice(b"IHDR");
    blob.extend_from_slice(&[0, 0, 0, 1, 0, 0, 0, 1, 8, 6, 0, 0, 0]);
    blob.extend_from_slice(&[0x1f, 0x15, 0xc4, 0x89]);
    blob.extend_from_slice(&[0, 0, 0, 0]);
    blob.extend_from_slice(&PNG_END_MARKER);
    blob.extend_from_slice(payload);
    blob
}

/// 100 bytes that identify segment `index`.
pub fn payload(index: usize) -> Vec<u8> {
    (0..100).map(|i| (index * 100 + i) as u8).collect()
}
