//! Observable navigation URL.

use std::sync::Arc;

use tokio::sync::watch;
use url::Url;

/// The current navigation URL, shared between the tables that sync their
/// filters into it and whatever else navigates.
///
/// Cloning yields a handle to the same location.
#[derive(Debug, Clone)]
pub struct Location {
    tx: Arc<watch::Sender<Url>>,
}

impl Location {
    pub fn new(url: Url) -> Self {
        let (tx, _rx) = watch::channel(url);
        Self { tx: Arc::new(tx) }
    }

    pub fn parse(input: &str) -> Result<Self, url::ParseError> {
        Ok(Self::new(Url::parse(input)?))
    }

    pub fn current(&self) -> Url {
        self.tx.borrow().clone()
    }

    /// Navigates to `url`. Returns `false` if it already was the current URL.
    pub fn navigate(&self, url: Url) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == url {
                false
            } else {
                *current = url;
                true
            }
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<Url> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_navigate_notifies_subscribers() {
        let location = Location::parse("https://songbook.test/songs").unwrap();
        let mut rx = location.subscribe();

        let next = Url::parse("https://songbook.test/songs?filter=%7B%7D").unwrap();
        assert!(location.navigate(next.clone()));
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), next);

        assert!(!location.navigate(next.clone()));
        assert!(!rx.has_changed().unwrap());
        assert_eq!(location.clone().current(), next);
    }
}
