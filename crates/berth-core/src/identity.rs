use crate::CoreError;
use berth_schema::{ContainerId, ContainerName};
use berth_store::{ContainerStore, NameIndex};
use tracing::debug;
use uuid::Uuid;

/// Width of the sliding window used to derive short names.
pub const NAME_WINDOW: usize = 6;

/// A fresh 64-character lowercase hex ID.
///
/// Two v4 UUIDs supply 32 bytes from the OS random source; blake3 spreads them
/// over the full output so no hex digit carries fixed version bits.
pub fn random_id() -> ContainerId {
    let mut entropy = [0u8; 32];
    entropy[..16].copy_from_slice(Uuid::new_v4().as_bytes());
    entropy[16..].copy_from_slice(Uuid::new_v4().as_bytes());
    ContainerId::new(blake3::hash(&entropy).to_hex().to_string())
}

/// Allocate an ID that the store has never recorded.
pub fn allocate_id<S>(store: &S) -> Result<ContainerId, CoreError>
where
    S: ContainerStore + ?Sized,
{
    allocate_id_with(store, random_id)
}

/// [`allocate_id`] with an explicit candidate generator.
///
/// Candidates already present in the store are discarded and regenerated. A
/// store that cannot answer aborts allocation with `StoreUnavailable`.
pub fn allocate_id_with<S, F>(store: &S, mut generate: F) -> Result<ContainerId, CoreError>
where
    S: ContainerStore + ?Sized,
    F: FnMut() -> ContainerId,
{
    loop {
        let candidate = generate();
        match store.exists(&candidate) {
            Ok(false) => return Ok(candidate),
            Ok(true) => debug!("container ID {candidate} already recorded, regenerating"),
            Err(e) => return Err(CoreError::StoreUnavailable(e.to_string())),
        }
    }
}

/// Find a short name for `source` that is not bound in `index`.
///
/// Windows of [`NAME_WINDOW`] characters are tried from offset 0, sliding one
/// character at a time; the first unbound one wins. Sources shorter than the
/// window yield `None` and the caller falls back to the full ID.
///
/// When every window is bound, the first window is still returned if the index
/// already maps it to `source` itself. Otherwise the search fails with
/// `NamesExhausted`.
///
/// The result is not reserved: binding it is the caller's job, and a failed
/// bind means another creator got there first.
pub fn allocate_name<I>(index: &I, source: &str) -> Result<Option<ContainerName>, CoreError>
where
    I: NameIndex + ?Sized,
{
    if source.len() < NAME_WINDOW {
        return Ok(None);
    }

    for offset in 0..=source.len() - NAME_WINDOW {
        let Some(candidate) = source.get(offset..offset + NAME_WINDOW) else {
            continue;
        };
        if !index.contains(candidate)? {
            return Ok(Some(ContainerName::new(candidate)));
        }
    }

    if let Some(first) = source.get(..NAME_WINDOW) {
        if index.get(first)?.is_some_and(|holder| holder == source) {
            debug!("every window of {source} is bound; reusing '{first}' already bound to it");
            return Ok(Some(ContainerName::new(first)));
        }
    }
    Err(CoreError::NamesExhausted(source.to_owned()))
}
