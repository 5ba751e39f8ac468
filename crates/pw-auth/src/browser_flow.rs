use std::time::{Duration, Instant};

use crate::error::AuthError;

/// Query parameter names Clerk may use for the session JWT, depending on
/// whether a custom redirect page or Clerk hosted pages are in play.
const TOKEN_PARAMS: [&str; 3] = ["token", "__clerk_db_jwt", "session_token"];

/// What the local callback server made of one incoming request.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Callback {
    /// Not the callback route (favicon, preflight).
    Ignored,
    /// Callback route without a token yet (intermediate Clerk redirect).
    Pending,
    /// Token present and the CSRF state matched.
    Token(String),
    /// Token present but the state was missing or wrong.
    StateMismatch,
}

/// Execute the browser-based Clerk sign-in flow and return the raw JWT.
///
/// 1. Start `tiny_http` on `127.0.0.1:0` (random port)
/// 2. Open browser to Clerk sign-in with redirect to localhost
/// 3. Wait for callback with JWT (in `spawn_blocking`, `tiny_http::recv` blocks)
///
/// Validation and storage are left to the caller.
///
/// # Errors
///
/// Returns `AuthError::BrowserFlowFailed` if the server cannot bind or the
/// callback times out or fails the CSRF check.
pub async fn login(clerk_frontend_api: &str, timeout: Duration) -> Result<String, AuthError> {
    let server = tiny_http::Server::http("127.0.0.1:0")
        .map_err(|e| AuthError::BrowserFlowFailed(format!("failed to bind: {e}")))?;
    let port = server
        .server_addr()
        .to_ip()
        .map(|a| a.port())
        .ok_or_else(|| AuthError::BrowserFlowFailed("no port".into()))?;

    let state = csrf_nonce()?;
    let sign_in_url = sign_in_url(clerk_frontend_api, port, &state);

    eprintln!("Opening browser to: {sign_in_url}");
    if let Err(error) = open::that(&sign_in_url) {
        eprintln!("Failed to open browser: {error}");
        eprintln!("Open the URL above manually, then return here.");
    }

    tokio::task::spawn_blocking(move || wait_for_callback(&server, timeout, &state))
        .await
        .map_err(|e| AuthError::BrowserFlowFailed(format!("spawn_blocking join: {e}")))?
}

/// 16 random bytes, hex encoded.
fn csrf_nonce() -> Result<String, AuthError> {
    let mut nonce_bytes = [0u8; 16];
    getrandom::fill(&mut nonce_bytes)
        .map_err(|e| AuthError::BrowserFlowFailed(format!("failed to generate CSRF nonce: {e}")))?;
    Ok(nonce_bytes.iter().map(|b| format!("{b:02x}")).collect())
}

fn sign_in_url(clerk_frontend_api: &str, port: u16, state: &str) -> String {
    let redirect_url = format!("http://127.0.0.1:{port}/callback?state={state}");
    format!(
        "https://{clerk_frontend_api}/sign-in?redirect_url={redirect}",
        redirect = urlencoding::encode(&redirect_url)
    )
}

/// Classify a callback request URL (path plus query).
pub(crate) fn classify_callback(url: &str, expected_state: &str) -> Result<Callback, AuthError> {
    let Some(query) = url.strip_prefix("/callback?") else {
        return Ok(Callback::Ignored);
    };

    let mut found_jwt: Option<String> = None;
    let mut found_state: Option<String> = None;
    for (key, value) in query.split('&').filter_map(|pair| pair.split_once('=')) {
        let decoded = || {
            urlencoding::decode(value)
                .map(std::borrow::Cow::into_owned)
                .map_err(|e| AuthError::BrowserFlowFailed(format!("URL decode: {e}")))
        };
        if TOKEN_PARAMS.contains(&key) {
            found_jwt = Some(decoded()?);
        } else if key == "state" {
            found_state = Some(decoded()?);
        }
    }

    Ok(match found_jwt {
        None => Callback::Pending,
        Some(_) if found_state.as_deref() != Some(expected_state) => Callback::StateMismatch,
        Some(jwt) => Callback::Token(jwt),
    })
}

fn html_page(body: &str) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
    let response = tiny_http::Response::from_string(format!("<html><body>{body}</body></html>"));
    match tiny_http::Header::from_bytes("Content-Type", "text/html") {
        Ok(header) => response.with_header(header),
        Err(()) => response,
    }
}

/// Block until the callback server receives a request with a JWT.
///
/// Loops on `recv_timeout()`, ignoring favicon requests, preflight requests,
/// and intermediate redirects that would otherwise cause a false failure.
fn wait_for_callback(
    server: &tiny_http::Server,
    timeout: Duration,
    expected_state: &str,
) -> Result<String, AuthError> {
    let deadline = Instant::now() + timeout;
    let timed_out = || {
        AuthError::BrowserFlowFailed(format!(
            "browser callback timed out after {}s",
            timeout.as_secs()
        ))
    };

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(timed_out());
        }

        let request = match server.recv_timeout(remaining) {
            Ok(Some(req)) => req,
            Ok(None) => return Err(timed_out()),
            Err(e) => return Err(AuthError::BrowserFlowFailed(format!("recv error: {e}"))),
        };

        match classify_callback(request.url(), expected_state) {
            Ok(Callback::Ignored) => {
                let _ = request.respond(tiny_http::Response::from_string("").with_status_code(204));
            }
            Ok(Callback::Pending) => {
                let _ = request.respond(html_page(
                    "<h1>Waiting for authentication…</h1><p>Redirecting, please wait.</p>",
                ));
            }
            Ok(Callback::Token(jwt)) => {
                let _ = request.respond(html_page(
                    "<h1>Signed in to Postwright</h1><p>You can close this tab.</p>",
                ));
                return Ok(jwt);
            }
            Ok(Callback::StateMismatch) => {
                let _ = request.respond(html_page(
                    "<h1>Sign-in failed</h1><p>State mismatch. Check CLI output.</p>",
                ));
                return Err(AuthError::BrowserFlowFailed(
                    "state mismatch — possible CSRF".into(),
                ));
            }
            Err(error) => {
                let _ = request.respond(html_page(
                    "<h1>Sign-in failed</h1><p>Malformed callback. Check CLI output.</p>",
                ));
                return Err(error);
            }
        }
    }
}
