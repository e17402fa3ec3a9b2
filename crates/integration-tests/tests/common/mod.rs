//! Wiring shared by the catalog integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use pb_auth_simple::OwnerAuthorizer;
use pb_core::testing::{FixedClock, ScriptedRandom};
use pb_core::{CatalogPolicy, CatalogPorts, PostCatalog, PostFields};
use pb_store_memory::MemoryBoardStore;

pub fn launch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2022, 2, 7, 12, 0, 0).unwrap()
}

pub struct Board {
    pub catalog: PostCatalog,
    pub store: Arc<MemoryBoardStore>,
    pub clock: Arc<FixedClock>,
}

pub fn board() -> Board {
    board_with_rng(ScriptedRandom::cycling(0))
}

pub fn board_with_rng(rng: ScriptedRandom) -> Board {
    let store = Arc::new(MemoryBoardStore::new());
    let clock = Arc::new(FixedClock::new(launch()));
    let ports = CatalogPorts {
        posts: store.clone(),
        votes: store.clone(),
        comments: store.clone(),
        authorizer: Arc::new(OwnerAuthorizer::new()),
        clock: clock.clone(),
        rng: Arc::new(rng),
    };
    Board {
        catalog: PostCatalog::new(ports, CatalogPolicy::default()),
        store,
        clock,
    }
}

pub fn fields(title: &str) -> PostFields {
    PostFields {
        title: title.to_string(),
        content: format!("{title} content"),
        image_url: Some(format!("{title}.png")),
    }
}
