//! Sprite assets
//!
//! The engine never decodes images. It keeps one handle per sprite slot and
//! substitutes a blank placeholder of the slot's nominal size for any sprite
//! that failed to load, so a missing file never stops a run.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::consts::{OBSTACLE_HEIGHT, OBSTACLE_WIDTH, PLAYER_HEIGHT, PLAYER_WIDTH};
use crate::error::AssetError;
use crate::sim::{ObstacleVariant, SNOWMAN_VARIANTS, TREE_VARIANTS};

/// Which sprite slot an asset fills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpriteSlot {
    Player,
    Tree(u8),
    Snowman(u8),
}

impl SpriteSlot {
    /// Nominal draw size
    pub fn size(&self) -> (f32, f32) {
        match self {
            SpriteSlot::Player => (PLAYER_WIDTH, PLAYER_HEIGHT),
            SpriteSlot::Tree(_) | SpriteSlot::Snowman(_) => (OBSTACLE_WIDTH, OBSTACLE_HEIGHT),
        }
    }
}

impl From<ObstacleVariant> for SpriteSlot {
    fn from(variant: ObstacleVariant) -> Self {
        match variant {
            ObstacleVariant::Tree(i) => SpriteSlot::Tree(i),
            ObstacleVariant::Snowman(i) => SpriteSlot::Snowman(i),
        }
    }
}

/// Sprite file locations, relative to an asset root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetManifest {
    pub player: String,
    pub trees: Vec<String>,
    pub snowmen: Vec<String>,
}

impl Default for AssetManifest {
    fn default() -> Self {
        Self {
            player: "sprites/snowboarder.png".to_string(),
            trees: (0..TREE_VARIANTS).map(|i| format!("sprites/tree_{i}.png")).collect(),
            snowmen: (0..SNOWMAN_VARIANTS)
                .map(|i| format!("sprites/snowman_{i}.png"))
                .collect(),
        }
    }
}

impl AssetManifest {
    /// Every slot with its path
    pub fn entries(&self) -> Vec<(SpriteSlot, String)> {
        let mut entries = vec![(SpriteSlot::Player, self.player.clone())];
        entries.extend(
            self.trees
                .iter()
                .enumerate()
                .map(|(i, p)| (SpriteSlot::Tree(i as u8), p.clone())),
        );
        entries.extend(
            self.snowmen
                .iter()
                .enumerate()
                .map(|(i, p)| (SpriteSlot::Snowman(i as u8), p.clone())),
        );
        entries
    }
}

/// A loaded (or substituted) sprite
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteHandle {
    pub path: String,
    pub width: f32,
    pub height: f32,
    /// Encoded image bytes; empty for placeholders
    pub data: Arc<[u8]>,
    pub placeholder: bool,
}

impl SpriteHandle {
    pub fn loaded(slot: SpriteSlot, path: String, data: Vec<u8>) -> Self {
        let (width, height) = slot.size();
        Self {
            path,
            width,
            height,
            data: data.into(),
            placeholder: false,
        }
    }

    pub fn placeholder(slot: SpriteSlot, path: String) -> Self {
        let (width, height) = slot.size();
        Self {
            path,
            width,
            height,
            data: Arc::from(Vec::new()),
            placeholder: true,
        }
    }
}

/// Reject payloads that cannot be a sprite
pub fn validate(path: &str, data: Vec<u8>) -> Result<Vec<u8>, AssetError> {
    if data.is_empty() {
        return Err(AssetError::Empty {
            path: path.to_string(),
        });
    }
    Ok(data)
}

/// All sprites the renderer needs
#[derive(Debug, Clone, PartialEq)]
pub struct AssetSet {
    pub player: SpriteHandle,
    pub trees: Vec<SpriteHandle>,
    pub snowmen: Vec<SpriteHandle>,
}

impl Default for AssetSet {
    fn default() -> Self {
        Self::placeholders(&AssetManifest::default())
    }
}

impl AssetSet {
    /// Every slot filled with a placeholder
    pub fn placeholders(manifest: &AssetManifest) -> Self {
        let mut set = Self {
            player: SpriteHandle::placeholder(SpriteSlot::Player, manifest.player.clone()),
            trees: Vec::new(),
            snowmen: Vec::new(),
        };
        for (slot, path) in manifest.entries() {
            match slot {
                SpriteSlot::Player => {}
                SpriteSlot::Tree(i) => put(&mut set.trees, i, SpriteHandle::placeholder(slot, path)),
                SpriteSlot::Snowman(i) => {
                    put(&mut set.snowmen, i, SpriteHandle::placeholder(slot, path))
                }
            }
        }
        set
    }

    /// Build from per-slot load results, substituting placeholders for failures
    pub fn from_results(results: Vec<(SpriteSlot, String, Result<Vec<u8>, AssetError>)>) -> Self {
        let mut set = Self {
            player: SpriteHandle::placeholder(SpriteSlot::Player, String::new()),
            trees: Vec::new(),
            snowmen: Vec::new(),
        };

        for (slot, path, result) in results {
            let handle = match result.and_then(|data| validate(&path, data)) {
                Ok(data) => SpriteHandle::loaded(slot, path, data),
                Err(e) => {
                    log::warn!("{e}; using placeholder");
                    SpriteHandle::placeholder(slot, path)
                }
            };
            match slot {
                SpriteSlot::Player => set.player = handle,
                SpriteSlot::Tree(i) => put(&mut set.trees, i, handle),
                SpriteSlot::Snowman(i) => put(&mut set.snowmen, i, handle),
            }
        }
        set
    }

    /// Sprite for an obstacle; out-of-range variants fall back to a placeholder
    pub fn obstacle(&self, variant: ObstacleVariant) -> SpriteHandle {
        let (list, i) = match variant {
            ObstacleVariant::Tree(i) => (&self.trees, i),
            ObstacleVariant::Snowman(i) => (&self.snowmen, i),
        };
        list.get(usize::from(i))
            .cloned()
            .unwrap_or_else(|| SpriteHandle::placeholder(variant.into(), String::new()))
    }

    pub fn placeholder_count(&self) -> usize {
        std::iter::once(&self.player)
            .chain(&self.trees)
            .chain(&self.snowmen)
            .filter(|s| s.placeholder)
            .count()
    }
}

fn put(list: &mut Vec<SpriteHandle>, index: u8, handle: SpriteHandle) {
    let index = usize::from(index);
    if list.len() <= index {
        let slot_fill = SpriteHandle::placeholder(SpriteSlot::Tree(0), String::new());
        list.resize(index + 1, slot_fill);
    }
    list[index] = handle;
}

/// Load every sprite of `manifest` concurrently from `root`
#[cfg(not(target_arch = "wasm32"))]
pub async fn load_all(root: &std::path::Path, manifest: &AssetManifest) -> AssetSet {
    let mut tasks = tokio::task::JoinSet::new();
    for (slot, path) in manifest.entries() {
        let full = root.join(&path);
        tasks.spawn(async move {
            let result = tokio::fs::read(&full).await.map_err(|e| AssetError::LoadFailed {
                path: path.clone(),
                reason: e.to_string(),
            });
            (slot, path, result)
        });
    }

    let mut results = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(result) => results.push(result),
            Err(e) => log::error!("Sprite load task failed: {e}"),
        }
    }

    let set = AssetSet::from_results(results);
    log::info!(
        "Loaded sprites ({} placeholders)",
        set.placeholder_count()
    );
    set
}
