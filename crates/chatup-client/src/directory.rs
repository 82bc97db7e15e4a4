//! Live profile roster.

use std::sync::{Arc, Mutex};

use chatup_shared::{Profile, SubscriptionError, UserId};
use chatup_store::{ChatStore, Subscription};

use crate::events::{emit, ClientEvent, EventSink};

/// Order-stable (by username) view of every known profile except self.
pub struct ProfileDirectory {
    inner: Arc<Mutex<DirectoryInner>>,
    _sub: Subscription,
}

#[derive(Default)]
struct DirectoryInner {
    roster: Vec<Profile>,
    own: Option<Profile>,
}

impl ProfileDirectory {
    /// Subscribe to the roster. The store delivers profiles ordered by
    /// username; self is filtered out of the roster but kept aside as the
    /// own resolved profile.
    pub fn new(
        store: Arc<dyn ChatStore>,
        self_id: UserId,
        events: EventSink,
    ) -> Result<Self, SubscriptionError> {
        let inner = Arc::new(Mutex::new(DirectoryInner::default()));

        let listener_inner = inner.clone();
        let sub = store.subscribe_profiles(Arc::new(move |profiles: &[Profile]| {
            let mut roster = Vec::with_capacity(profiles.len());
            let mut own = None;
            for profile in profiles {
                if profile.id == self_id {
                    own = Some(profile.clone());
                } else {
                    roster.push(profile.clone());
                }
            }

            let count = roster.len();
            if let Ok(mut state) = listener_inner.lock() {
                state.roster = roster;
                state.own = own;
            }
            emit(&events, ClientEvent::RosterUpdated { count });
        }))?;

        Ok(Self { inner, _sub: sub })
    }

    /// Every known profile except self, ordered by username.
    pub fn roster(&self) -> Vec<Profile> {
        self.inner
            .lock()
            .map(|state| state.roster.clone())
            .unwrap_or_default()
    }

    /// Resolve a user id for header / sidebar display. Self resolves too.
    pub fn resolve(&self, id: &UserId) -> Option<Profile> {
        let Ok(state) = self.inner.lock() else {
            return None;
        };
        if state.own.as_ref().map(|p| &p.id) == Some(id) {
            return state.own.clone();
        }
        state.roster.iter().find(|p| &p.id == id).cloned()
    }

    /// The signed-in principal's own profile, once the roster snapshot
    /// containing it has arrived.
    pub fn own_profile(&self) -> Option<Profile> {
        self.inner.lock().ok().and_then(|state| state.own.clone())
    }
}
