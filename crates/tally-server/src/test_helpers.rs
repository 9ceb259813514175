//! Router fixture shared by the handler tests.

use std::{path::PathBuf, sync::Arc};

use axum::{
  body::Body,
  http::{Method, Request, StatusCode, header},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use chrono::NaiveDate;
use serde_json::{Value, json};
use tally_codec::RawSubmission;
use tally_core::{
  judgement::Judgements,
  map::{MapInfo, RankedStatus},
  mods::Mods,
  ruleset::Ruleset,
  score::{ClientFlags, Grade},
  services::MapLookup,
};
use tally_store_sqlite::SqliteStore;
use tempfile::TempDir;
use tower::ServiceExt as _;
use uuid::Uuid;

use crate::{AppState, ServerConfig, router};

pub(crate) const RANKED: &str = "0123456789abcdef0123456789abcdef";
const BUILD: &str = "20240102";
const CLIENT_HASH: &str = "0f:1e:2d:3c:4b:";

pub(crate) struct Fixture {
  state: AppState<SqliteStore>,
  tmp:   TempDir,
}

pub(crate) async fn fixture() -> Fixture {
  let tmp = tempfile::tempdir().unwrap();
  let store = SqliteStore::open_in_memory().await.unwrap();
  store
    .register(MapInfo {
      map_id: 75,
      set_id: 1,
      md5:    RANKED.into(),
      status: RankedStatus::Ranked,
      plays:  0,
      passes: 0,
    })
    .await
    .unwrap();

  let config = ServerConfig {
    host:       "127.0.0.1".into(),
    port:       0,
    store_path: ":memory:".into(),
    replay_dir: tmp.path().join("replays"),
    submit:     Default::default(),
  };
  Fixture {
    state: AppState::new(Arc::new(store), config),
    tmp,
  }
}

fn md5_hex(s: &str) -> String { format!("{:x}", md5::compute(s)) }

impl Fixture {
  pub(crate) fn replay_dir(&self) -> PathBuf { self.tmp.path().join("replays") }

  /// Send one request through a fresh router and decode the JSON reply.
  /// Empty bodies decode as `null`.
  pub(crate) async fn send(
    &self,
    method: Method,
    uri: &str,
    token: Option<Uuid>,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
      req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let req = match body {
      Some(body) => req
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string())),
      None => req.body(Body::empty()),
    }
    .unwrap();

    let resp = router(self.state.clone()).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
  }

  /// Register `player<id>` and open a session for them.
  pub(crate) async fn login(&self, player_id: u32) -> Uuid {
    let (status, _) = self
      .send(
        Method::PUT,
        &format!("/players/{player_id}"),
        None,
        Some(json!({ "name": format!("player{player_id}") })),
      )
      .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let token = Uuid::new_v4();
    let session = json!({
      "player_id": player_id,
      "player_name": format!("player{player_id}"),
      "restricted": false,
      "fingerprint": {
        "build": BUILD,
        "client_hash": CLIENT_HASH,
        "adapters_md5": md5_hex("adapters"),
        "uninstall_md5": md5_hex(&format!("u{player_id}")),
        "disk_signature_md5": md5_hex(&format!("d{player_id}")),
      },
    });
    let (status, _) = self
      .send(Method::PUT, &format!("/sessions/{token}"), None, Some(session))
      .await;
    assert_eq!(status, StatusCode::CREATED);
    token
  }

  pub(crate) fn score_body(&self, player_id: u32, raw_score: u64) -> Value {
    Self::score_body_for(player_id, RANKED, raw_score)
  }

  /// What a genuine client would upload for a pass on `map_md5`.
  pub(crate) fn score_body_for(
    player_id: u32,
    map_md5: &str,
    raw_score: u64,
  ) -> Value {
    let mut raw = RawSubmission {
      map_md5:         map_md5.into(),
      player_name:     format!("player{player_id}"),
      online_checksum: String::new(),
      judgements:      Judgements {
        n300:  350,
        n100:  20,
        n50:   3,
        ngeki: 40,
        nkatu: 12,
        nmiss: 4,
      },
      raw_score,
      max_combo:       410,
      perfect:         false,
      grade:           Grade::A,
      mods:            Mods::HIDDEN,
      passed:          true,
      mode_vn:         0,
      ruleset:         Ruleset::VanillaOsu,
      client_time:     NaiveDate::from_ymd_opt(2024, 2, 29)
        .and_then(|d| d.and_hms_opt(23, 59, 1))
        .unwrap(),
      osu_version:     BUILD.into(),
      client_flags:    ClientFlags::CLEAN,
      client_hash:     CLIENT_HASH.into(),
    };
    raw.online_checksum = tally_codec::online_checksum(&raw, BUILD, "");
    let payload = tally_codec::encode(&raw, BUILD, &[3; 16]).unwrap();

    json!({
      "score_data": payload.score_data,
      "client_hash": payload.client_hash,
      "iv": payload.iv,
      "osu_version": BUILD,
      "unique_ids": format!("u{player_id}|d{player_id}"),
      "beatmap_hash": map_md5,
      "score_time_ms": 84_000,
      "replay": B64.encode([0x5a; 128]),
    })
  }
}
