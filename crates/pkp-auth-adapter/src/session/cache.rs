/*
[INPUT]:  Session signature bundles keyed by PKP public key
[OUTPUT]: Cached bundles honoring the expiration safety margin
[POS]:    Session layer - in-memory session cache
[UPDATE]: When cache keying or the safety margin changes
*/

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Utc};

use crate::types::SessionSigs;

/// A cached bundle is unusable this close to its expiration
pub const SESSION_SAFETY_MARGIN_MINUTES: i64 = 5;

/// Thread-safe session signature cache: exactly one live bundle per PKP.
/// A new successful authentication replaces the slot, never appends.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    entries: Arc<RwLock<HashMap<String, SessionSigs>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached bundle for a PKP if it is still fresh at `now`
    /// (`now < expiration - safety margin`).
    pub fn fresh(&self, pkp_public_key: &str, now: DateTime<Utc>) -> Option<SessionSigs> {
        let guard = self.entries.read().unwrap();
        guard
            .get(pkp_public_key)
            .filter(|sigs| is_fresh(sigs, now))
            .cloned()
    }

    /// Whether a fresh bundle exists without cloning it
    pub fn has_fresh(&self, pkp_public_key: &str, now: DateTime<Utc>) -> bool {
        let guard = self.entries.read().unwrap();
        guard
            .get(pkp_public_key)
            .map(|sigs| is_fresh(sigs, now))
            .unwrap_or(false)
    }

    /// Store a bundle, replacing any previous one for the same PKP
    pub fn insert(&self, pkp_public_key: &str, sigs: SessionSigs) {
        let mut guard = self.entries.write().unwrap();
        guard.insert(pkp_public_key.to_string(), sigs);
    }

    /// Evict a single PKP's bundle
    pub fn remove(&self, pkp_public_key: &str) {
        let mut guard = self.entries.write().unwrap();
        guard.remove(pkp_public_key);
    }

    /// Drop every cached bundle (logout)
    pub fn clear(&self) {
        let mut guard = self.entries.write().unwrap();
        guard.clear();
    }
}

fn is_fresh(sigs: &SessionSigs, now: DateTime<Utc>) -> bool {
    now < sigs.expiration - Duration::minutes(SESSION_SAFETY_MARGIN_MINUTES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AuthSig;
    use std::collections::BTreeMap;

    fn sigs_expiring_at(expiration: DateTime<Utc>) -> SessionSigs {
        SessionSigs {
            signatures: BTreeMap::from([("http://node-1".to_string(), "0xsig".to_string())]),
            auth_sig: AuthSig {
                sig: "0xabc".into(),
                derived_via: "web3.eth.personal.sign".into(),
                signed_message: "challenge".into(),
                address: "0xf39F".into(),
            },
            expiration,
        }
    }

    #[test]
    fn test_empty_store() {
        let store = SessionStore::new();
        assert!(store.fresh("0x04ab", Utc::now()).is_none());
        assert!(!store.has_fresh("0x04ab", Utc::now()));
    }

    #[test]
    fn test_safety_margin_boundary() {
        let store = SessionStore::new();
        let expiration = Utc::now() + Duration::hours(1);
        store.insert("0x04ab", sigs_expiring_at(expiration));

        // six minutes before expiration: still usable
        let six_before = expiration - Duration::minutes(6);
        assert!(store.fresh("0x04ab", six_before).is_some());

        // four minutes before expiration: inside the margin, stale
        let four_before = expiration - Duration::minutes(4);
        assert!(store.fresh("0x04ab", four_before).is_none());
    }

    #[test]
    fn test_insert_replaces_previous_bundle() {
        let store = SessionStore::new();
        let first = sigs_expiring_at(Utc::now() + Duration::hours(1));
        let second = sigs_expiring_at(Utc::now() + Duration::hours(2));
        store.insert("0x04ab", first);
        store.insert("0x04ab", second.clone());

        let cached = store.fresh("0x04ab", Utc::now()).unwrap();
        assert_eq!(cached, second);
    }

    #[test]
    fn test_remove_and_clear() {
        let store = SessionStore::new();
        store.insert("0x04ab", sigs_expiring_at(Utc::now() + Duration::hours(1)));
        store.remove("0x04ab");
        assert!(store.fresh("0x04ab", Utc::now()).is_none());

        store.insert("0x04ab", sigs_expiring_at(Utc::now() + Duration::hours(1)));
        store.clear();
        assert!(!store.has_fresh("0x04ab", Utc::now()));
    }
}
