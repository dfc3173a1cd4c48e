//! A mock HTTP server standing in for the marketplace API during tests.

use {
    std::{
        fmt::{self, Debug, Formatter},
        net::SocketAddr,
        sync::{
            Arc,
            Mutex,
            atomic::{AtomicBool, Ordering},
        },
    },
    tokio::task::JoinHandle,
};

#[derive(Clone)]
pub enum Path {
    Any,
    Exact(String),
}

impl Path {
    pub fn exact(s: impl ToString) -> Self {
        Self::Exact(s.to_string())
    }
}

impl PartialEq<Path> for String {
    fn eq(&self, path: &Path) -> bool {
        match path {
            Path::Any => true,
            Path::Exact(exact) => exact == self,
        }
    }
}

impl Debug for Path {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Path::Any => f.debug_tuple("Any").finish(),
            Path::Exact(exact) => f
                .debug_tuple("Exact")
                .field(&format_args!("{exact}"))
                .finish(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Expectation {
    pub path: Path,
    pub req: RequestBody,
    pub res: serde_json::Value,
}

#[derive(Clone, Debug)]
pub enum RequestBody {
    /// The received request body has to match the provided value exactly.
    Exact(serde_json::Value),
    /// Any request body will be accepted.
    Any,
}

/// Drop handle that verifies that the server task didn't panic throughout
/// the test and that all the expectations have been met.
pub struct ServerHandle {
    /// The address that handles requests to this server.
    pub address: SocketAddr,
    /// Handle to shut down the server task on drop.
    handle: JoinHandle<()>,
    /// Expectations that are left over after the test.
    expectations: Arc<Mutex<Vec<Expectation>>>,
    /// Indicates if some assertion failed.
    assert_failed: Arc<AtomicBool>,
}

impl ServerHandle {
    pub fn url(&self) -> reqwest::Url {
        format!("http://{}/", self.address).parse().unwrap()
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        if std::thread::panicking() {
            return;
        }

        // Panics happening in the server task might not cause the test to
        // fail on their own; surface them here.
        assert!(!self.assert_failed.load(Ordering::SeqCst));

        assert!(
            !self.handle.is_finished(),
            "mock http server terminated before test ended"
        );
        assert_eq!(
            self.expectations.lock().unwrap().len(),
            0,
            "mock server did not receive enough requests"
        );
        self.handle.abort();
    }
}

/// Set up a mock external HTTP API that answers POST requests in expectation
/// order.
pub async fn setup(mut expectations: Vec<Expectation>) -> ServerHandle {
    // Reverse expectations so tests can specify them in natural order while
    // the handler simply pops the last element.
    expectations.reverse();

    let expectations = Arc::new(Mutex::new(expectations));
    let failed_assert = Arc::new(AtomicBool::new(false));

    let app = axum::Router::new()
        .route(
            "/*path",
            axum::routing::post(
                |axum::extract::State(state),
                 axum::extract::Path(path),
                 axum::extract::Json(req)| async move {
                    axum::response::Json(post(state, path, req))
                },
            ),
        )
        .with_state(State {
            expectations: expectations.clone(),
            failed_assert: failed_assert.clone(),
        });

    let server = axum::Server::bind(&"0.0.0.0:0".parse().unwrap()).serve(app.into_make_service());
    let address = server.local_addr();
    let handle = tokio::spawn(async move { server.await.unwrap() });

    ServerHandle {
        handle,
        expectations,
        address,
        assert_failed: failed_assert,
    }
}

#[derive(Clone)]
struct State {
    expectations: Arc<Mutex<Vec<Expectation>>>,
    failed_assert: Arc<AtomicBool>,
}

fn post(state: State, path: String, req: serde_json::Value) -> serde_json::Value {
    let expectation = state.expectations.lock().unwrap().pop();
    let assertions = move || {
        let expectation = match expectation {
            Some(expectation) => expectation,
            None => panic!("got another POST request, but didn't expect any more"),
        };

        assert_eq!(path, expectation.path, "POST request has unexpected path");
        match expectation.req {
            RequestBody::Exact(value) => {
                assert_eq!(req, value, "POST request has unexpected body")
            }
            RequestBody::Any => (),
        }
        expectation.res
    };
    assert_and_propagate_panics(assertions, &state.failed_assert)
}

/// Runs the given closure and updates a flag if it panics.
fn assert_and_propagate_panics<F, R>(assertions: F, flag: &AtomicBool) -> R
where
    F: FnOnce() -> R + std::panic::UnwindSafe + 'static,
{
    std::panic::catch_unwind(assertions)
        .map_err(|_| {
            flag.store(true, Ordering::SeqCst);
        })
        .expect("ignore this panic; it was caused by the previous panic")
}
