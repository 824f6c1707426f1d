use tracing::debug;

use crate::domain::error::Result;
use crate::infrastructure::kv_store::KvStore;

/// Completed sessions allowed before the upgrade prompt takes over.
pub const FREE_SESSION_LIMIT: u32 = 3;

const KEY_LEAD_NAME: &str = "lead_name";
const KEY_LEAD_EMAIL: &str = "lead_email";
const KEY_SESSIONS_COMPLETED: &str = "sessions_completed";

/// Process-wide usage gate backed by an injected key-value store. The store
/// is only ever touched from the single-threaded flow, so read-modify-write
/// on the counter is atomic by construction.
pub struct SessionGate {
    store: Box<dyn KvStore>,
}

impl SessionGate {
    pub fn new(store: Box<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Contact is captured once a lead email has been stored.
    pub fn contact_captured(&self) -> bool {
        self.store
            .get(KEY_LEAD_EMAIL)
            .map(|email| !email.is_empty())
            .unwrap_or(false)
    }

    pub fn contact(&self) -> Option<(String, String)> {
        let email = self.store.get(KEY_LEAD_EMAIL)?;
        let name = self.store.get(KEY_LEAD_NAME).unwrap_or_default();
        Some((name, email))
    }

    /// Completed-session counter, stored as a base-10 string. Absent or
    /// unparseable values read as zero.
    pub fn sessions_completed(&self) -> u32 {
        self.store
            .get(KEY_SESSIONS_COMPLETED)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(0)
    }

    pub fn free_limit_reached(&self) -> bool {
        self.sessions_completed() >= FREE_SESSION_LIMIT
    }

    /// Store the captured contact. Re-capture overwrites, which keeps the
    /// operation idempotent for the same email.
    pub fn record_contact(&self, name: &str, email: &str) -> Result<()> {
        self.store.set(KEY_LEAD_NAME, name)?;
        self.store.set(KEY_LEAD_EMAIL, email)?;
        debug!(email, "Contact captured");
        Ok(())
    }

    /// Increment the counter. Called exactly once per session that reaches
    /// the feedback view; abandoned chats never count.
    pub fn record_completed_session(&self) -> Result<u32> {
        let next = self.sessions_completed() + 1;
        self.store.set(KEY_SESSIONS_COMPLETED, &next.to_string())?;
        debug!(completed = next, "Session counted");
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::kv_store::MemoryStore;

    fn gate() -> SessionGate {
        SessionGate::new(Box::new(MemoryStore::default()))
    }

    #[test]
    fn test_fresh_gate_has_no_contact_and_zero_sessions() {
        let gate = gate();
        assert!(!gate.contact_captured());
        assert_eq!(gate.sessions_completed(), 0);
        assert!(!gate.free_limit_reached());
    }

    #[test]
    fn test_record_contact_is_idempotent() {
        let gate = gate();
        gate.record_contact("Alex", "a@b.com").unwrap();
        assert!(gate.contact_captured());
        gate.record_contact("Alexandra", "a@b.com").unwrap();
        assert_eq!(
            gate.contact(),
            Some(("Alexandra".to_string(), "a@b.com".to_string()))
        );
    }

    #[test]
    fn test_counter_increments_to_limit() {
        let gate = gate();
        assert_eq!(gate.record_completed_session().unwrap(), 1);
        assert_eq!(gate.record_completed_session().unwrap(), 2);
        assert!(!gate.free_limit_reached());
        assert_eq!(gate.record_completed_session().unwrap(), 3);
        assert!(gate.free_limit_reached());
    }

    #[test]
    fn test_garbage_counter_reads_as_zero() {
        let store = MemoryStore::default();
        store.set("sessions_completed", "lots").unwrap();
        let gate = SessionGate::new(Box::new(store));
        assert_eq!(gate.sessions_completed(), 0);
    }
}
