//! Level-up detection against the last level the user saw.

use patri_core::Notifier;
use patri_levels::WealthLevel;
use persistence::{keys, Store, StoreError, StoreExt};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// A detected promotion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LevelUp {
    pub from: u32,
    pub to: u32,
    pub name: String,
}

/// The previous level has been stored both as a number and as its decimal text.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredLevel {
    Number(u32),
    Text(String),
}

fn previous_level<S: Store + ?Sized>(store: &S) -> Result<Option<u32>, StoreError> {
    let stored: Option<StoredLevel> = match store.load_as(keys::PREVIOUS_LEVEL) {
        Ok(v) => v,
        Err(StoreError::Decode { key, source }) => {
            warn!(%key, %source, "ignoring unreadable previous level");
            None
        }
        Err(e) => return Err(e),
    };
    Ok(match stored {
        Some(StoredLevel::Number(n)) => Some(n),
        Some(StoredLevel::Text(t)) => t.trim().parse().ok(),
        None => None,
    })
}

/// Compare `current` with the persisted previous level, notify on a
/// promotion, then remember `current` either way.
///
/// The first call ever only records the level.
pub fn check_level_up<S, N>(
    store: &mut S,
    notifier: &N,
    current: &WealthLevel,
) -> Result<Option<LevelUp>, StoreError>
where
    S: Store + ?Sized,
    N: Notifier + ?Sized,
{
    let previous = previous_level(store)?;
    store.save_as(keys::PREVIOUS_LEVEL, &current.level)?;
    match previous {
        Some(from) if current.level > from => {
            info!(from, to = current.level, "level up");
            notifier.notify(
                "¡Felicidades!",
                &format!("¡Has alcanzado el nivel {}!", current.name),
            );
            Ok(Some(LevelUp {
                from,
                to: current.level,
                name: current.name.clone(),
            }))
        }
        _ => Ok(None),
    }
}
