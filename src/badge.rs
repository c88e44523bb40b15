//! Badge bitmaps and network-sourced badge metadata.
//!
//! [`BadgeTable`] is the static part: a closed set of badge kinds decoded
//! once at startup from embedded PNGs, read-only afterwards. The per-user
//! directory is the dynamic part: a JSON manifest fetched elsewhere is
//! merged into a concurrent map, with an explicit load state instead of the
//! silent-failure behavior this replaces — a failed fetch parks the
//! directory in `Unavailable`, and a later successful merge retries out of
//! it.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use image::RgbaImage;
use serde::Deserialize;

use crate::error::Result;

/// The closed set of badges with embedded artwork.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BadgeKind {
    Admin,
    Broadcaster,
    Dev,
    GlobalMod,
    Moderator,
    Staff,
    Turbo,
}

impl BadgeKind {
    pub const ALL: [BadgeKind; 7] = [
        BadgeKind::Admin,
        BadgeKind::Broadcaster,
        BadgeKind::Dev,
        BadgeKind::GlobalMod,
        BadgeKind::Moderator,
        BadgeKind::Staff,
        BadgeKind::Turbo,
    ];

    fn index(self) -> usize {
        match self {
            BadgeKind::Admin => 0,
            BadgeKind::Broadcaster => 1,
            BadgeKind::Dev => 2,
            BadgeKind::GlobalMod => 3,
            BadgeKind::Moderator => 4,
            BadgeKind::Staff => 5,
            BadgeKind::Turbo => 6,
        }
    }

    fn embedded_bytes(self) -> &'static [u8] {
        match self {
            BadgeKind::Admin => include_bytes!("../assets/badges/admin.png"),
            BadgeKind::Broadcaster => include_bytes!("../assets/badges/broadcaster.png"),
            BadgeKind::Dev => include_bytes!("../assets/badges/dev.png"),
            BadgeKind::GlobalMod => include_bytes!("../assets/badges/globalmod.png"),
            BadgeKind::Moderator => include_bytes!("../assets/badges/moderator.png"),
            BadgeKind::Staff => include_bytes!("../assets/badges/staff.png"),
            BadgeKind::Turbo => include_bytes!("../assets/badges/turbo.png"),
        }
    }
}

/// Static badge-kind → bitmap lookup. Populated once, then read-only; shared
/// references require no further synchronization.
pub struct BadgeTable {
    images: [Option<Arc<RgbaImage>>; 7],
}

impl BadgeTable {
    /// Decode the embedded badge art. A bitmap that fails to decode leaves
    /// its slot absent (logged), never fails the whole table.
    pub fn load() -> Self {
        let mut images: [Option<Arc<RgbaImage>>; 7] = Default::default();
        for kind in BadgeKind::ALL {
            match image::load_from_memory(kind.embedded_bytes()) {
                Ok(img) => images[kind.index()] = Some(Arc::new(img.to_rgba8())),
                Err(err) => {
                    tracing::warn!(?kind, %err, "embedded badge decode failed");
                }
            }
        }
        Self { images }
    }

    pub fn get(&self, kind: BadgeKind) -> Option<&Arc<RgbaImage>> {
        self.images[kind.index()].as_ref()
    }
}

/// Load state of the per-user badge directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeLoadState {
    /// No manifest merged yet.
    Loading,
    /// At least one manifest merged successfully.
    Ready,
    /// The last fetch or parse failed; a later merge retries out of this.
    Unavailable,
}

/// One badge as described by the manifest document.
#[derive(Debug, Clone, Deserialize)]
pub struct BadgeDef {
    pub image: String,
    pub tooltip: String,
    #[serde(default)]
    pub users: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct BadgeManifest {
    badges: Vec<BadgeDef>,
}

/// Assigned badge for one user.
#[derive(Debug, Clone)]
pub struct UserBadge {
    pub image_url: String,
    pub tooltip: String,
}

/// Concurrent user → badge map fed by background manifest fetches.
pub struct BadgeDirectory {
    users: RwLock<HashMap<String, Arc<UserBadge>>>,
    state: RwLock<BadgeLoadState>,
}

impl Default for BadgeDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl BadgeDirectory {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            state: RwLock::new(BadgeLoadState::Loading),
        }
    }

    pub fn state(&self) -> BadgeLoadState {
        *self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Merge a manifest document. Returns the number of badge definitions
    /// applied; a parse failure marks the directory unavailable and
    /// propagates the error to the caller.
    pub fn apply_manifest(&self, bytes: &[u8]) -> Result<usize> {
        let manifest: BadgeManifest = match serde_json::from_slice(bytes) {
            Ok(m) => m,
            Err(err) => {
                self.mark_unavailable();
                return Err(err.into());
            }
        };

        let mut users = self.users.write().unwrap_or_else(|e| e.into_inner());
        for badge in &manifest.badges {
            let entry = Arc::new(UserBadge {
                image_url: badge.image.clone(),
                tooltip: badge.tooltip.clone(),
            });
            for user in &badge.users {
                users.insert(user.clone(), entry.clone());
            }
        }
        drop(users);

        *self.state.write().unwrap_or_else(|e| e.into_inner()) = BadgeLoadState::Ready;
        tracing::debug!(badges = manifest.badges.len(), "badge manifest merged");
        Ok(manifest.badges.len())
    }

    /// Fire-and-forget merge of a fetched manifest. Rejection is recorded in
    /// the load state (and logged), not silently dropped.
    pub fn merge_in_background(self: Arc<Self>, bytes: Vec<u8>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            if let Err(err) = self.apply_manifest(&bytes) {
                tracing::warn!(%err, "badge manifest rejected");
            }
        })
    }

    /// Record a failed fetch so the UI can show a distinguishable
    /// "badges unavailable" state and offer retry.
    pub fn mark_unavailable(&self) {
        *self.state.write().unwrap_or_else(|e| e.into_inner()) = BadgeLoadState::Unavailable;
    }

    pub fn get(&self, user: &str) -> Option<Arc<UserBadge>> {
        self.users
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(user)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.users.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
