//! Terminal-error slot a driver can fill in when a transfer fails.
//!
//! The slot is informational: nothing in the stream blocks or fails because an
//! error was recorded. Assignment reports success instead of panicking so a
//! driver can hand over whatever it caught without risking a second failure.

use std::any::Any;
use std::error::Error as StdError;
use std::sync::Arc;

use crate::error::Error;

/// Error value shared between the driver and whoever inspects the stream later.
pub type SharedError = Arc<dyn StdError + Send + Sync + 'static>;

#[derive(Default, Clone)]
pub struct ErrorCell {
    slot: Option<SharedError>,
}

impl ErrorCell {
    pub fn get(&self) -> Option<SharedError> {
        self.slot.clone()
    }

    /// Store a typed error. Always succeeds; a later assignment replaces it.
    pub fn set<E>(&mut self, err: E) -> bool
    where
        E: StdError + Send + Sync + 'static,
    {
        self.slot = Some(Arc::new(err));
        true
    }

    /// Store a type-erased payload, e.g. what `JoinHandle::join` hands back
    /// from a panicked driver thread.
    ///
    /// Accepted payloads: [`Error`], [`std::io::Error`], a boxed
    /// `dyn Error + Send + Sync`, or an already shared error. Anything else is
    /// rejected with `false` and the slot is left untouched.
    pub fn record(&mut self, payload: Box<dyn Any + Send>) -> bool {
        let payload = match payload.downcast::<Error>() {
            Ok(err) => return self.set(*err),
            Err(other) => other,
        };
        let payload = match payload.downcast::<std::io::Error>() {
            Ok(err) => return self.set(*err),
            Err(other) => other,
        };
        let payload = match payload.downcast::<Box<dyn StdError + Send + Sync>>() {
            Ok(err) => {
                self.slot = Some(Arc::from(*err));
                return true;
            }
            Err(other) => other,
        };
        match payload.downcast::<SharedError>() {
            Ok(err) => {
                self.slot = Some(*err);
                true
            }
            Err(_) => false,
        }
    }
}

impl std::fmt::Debug for ErrorCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.slot {
            Some(err) => write!(f, "ErrorCell({err})"),
            None => f.write_str("ErrorCell(None)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_error_is_stored() {
        let mut cell = ErrorCell::default();
        assert!(cell.get().is_none());
        assert!(cell.set(Error::Transfer("connection reset".into())));
        let err = cell.get().unwrap();
        assert_eq!(err.to_string(), "transfer failed: connection reset");
    }

    #[test]
    fn erased_error_payloads_are_accepted() {
        let mut cell = ErrorCell::default();
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        assert!(cell.record(Box::new(io)));
        assert_eq!(cell.get().unwrap().to_string(), "pipe closed");

        let boxed: Box<dyn StdError + Send + Sync> = "remote hung up".into();
        assert!(cell.record(Box::new(boxed)));
        assert_eq!(cell.get().unwrap().to_string(), "remote hung up");
    }

    #[test]
    fn non_error_payload_is_rejected_and_keeps_previous() {
        let mut cell = ErrorCell::default();
        assert!(cell.set(Error::Transfer("first".into())));

        assert!(!cell.record(Box::new(42u32)));
        assert!(!cell.record(Box::new("just a message")));
        assert_eq!(cell.get().unwrap().to_string(), "transfer failed: first");
    }

    #[test]
    fn panic_payload_from_thread_is_rejected() {
        let handle = std::thread::spawn(|| {
            if true {
                panic!("driver crashed");
            }
        });
        let payload = handle.join().unwrap_err();
        let mut cell = ErrorCell::default();
        assert!(!cell.record(payload));
        assert!(cell.get().is_none());
    }
}
