//! Mock HTTP transport for testing.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use super::traits::{OtaTransport, PostResponse, TransportError, excerpt};

/// One captured POST.
#[derive(Debug, Clone)]
pub struct RecordedPost {
    pub device: String,
    pub endpoint: String,
    pub body_len: usize,
    /// When the POST was issued.
    pub at: Instant,
}

/// Mock transport for unit testing sequencing logic.
///
/// Responses are scripted with `queue_status` / `queue_error` and consumed
/// in order; an unscripted POST succeeds with an empty 200. Clones share
/// state, so a test can keep a handle while the session owns another.
#[derive(Clone)]
pub struct MockTransport {
    /// Scripted replies, consumed front to back.
    replies: Arc<Mutex<VecDeque<Result<PostResponse, TransportError>>>>,
    /// Captured posts.
    posts: Arc<Mutex<Vec<RecordedPost>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::new())),
            posts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue an HTTP response for the next POST.
    pub fn queue_status(&self, status: u16, body: &str) {
        self.replies.lock().unwrap().push_back(Ok(PostResponse {
            status,
            body_excerpt: excerpt(body),
        }));
    }

    /// Queue a transport-level failure for the next POST.
    pub fn queue_error(&self, error: TransportError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    /// All captured POSTs, in order.
    pub fn posts(&self) -> Vec<RecordedPost> {
        self.posts.lock().unwrap().clone()
    }

    /// Number of captured POSTs against one endpoint.
    pub fn posts_to(&self, endpoint: &str) -> usize {
        self.posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.endpoint == endpoint)
            .count()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl OtaTransport for MockTransport {
    fn post(
        &self,
        device: &str,
        endpoint: &str,
        body: Vec<u8>,
    ) -> Result<PostResponse, TransportError> {
        self.posts.lock().unwrap().push(RecordedPost {
            device: device.to_string(),
            endpoint: endpoint.to_string(),
            body_len: body.len(),
            at: Instant::now(),
        });
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(PostResponse {
                status: 200,
                body_excerpt: String::new(),
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_reply_queue() {
        let mock = MockTransport::new();
        mock.queue_status(200, "ok");
        mock.queue_status(500, "boom");

        let r1 = mock.post("10.0.0.1", "/a", vec![1, 2]).unwrap();
        assert!(r1.is_ok());

        let r2 = mock.post("10.0.0.1", "/a", vec![]).unwrap();
        assert_eq!(r2.status, 500);
        assert_eq!(r2.body_excerpt, "boom");
    }

    #[test]
    fn test_mock_post_capture() {
        let mock = MockTransport::new();
        mock.post("10.0.0.1", "/a", vec![0; 3]).unwrap();
        mock.post("10.0.0.2", "/b", vec![0; 7]).unwrap();

        let posts = mock.posts();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].device, "10.0.0.1");
        assert_eq!(posts[0].body_len, 3);
        assert_eq!(posts[1].endpoint, "/b");
        assert_eq!(mock.posts_to("/a"), 1);
    }

    #[test]
    fn test_mock_unscripted_defaults_to_200() {
        let mock = MockTransport::new();
        let r = mock.post("10.0.0.1", "/a", vec![]).unwrap();
        assert_eq!(r.status, 200);
    }

    #[test]
    fn test_mock_scripted_error() {
        let mock = MockTransport::new();
        mock.queue_error(TransportError::ConnectFailed("refused".into()));
        assert!(mock.post("10.0.0.1", "/a", vec![]).is_err());
    }
}
