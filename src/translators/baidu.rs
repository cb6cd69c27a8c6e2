//! Baidu Translate (general text translation API) backend.

use std::{num::NonZeroU32, time::Duration};

use governor::state::NotKeyed;
use governor::{Quota, RateLimiter};
use log::debug;

use super::{split_into_chunks, translate_chunks, Translator};
use crate::config::{BaiduConfig, TranslationConfig};
use crate::credential_store::{self, KeyringSecretStore};
use crate::languages::{SourceLanguage, TargetLanguage};

pub const SERVICE_NAME: &str = "Baidu Translate";

const SALT_MIN: u32 = 32_768;
const SALT_MAX: u32 = 65_536;
// Baidu reports success with this code on some endpoints.
const SUCCESS_CODE: &str = "52000";
const RATE_LIMIT_POLL: Duration = Duration::from_millis(50);

type DirectLimiter =
    RateLimiter<NotKeyed, governor::state::InMemoryState, governor::clock::DefaultClock>;

#[derive(Debug, serde::Deserialize)]
struct TranslatedSegment {
    dst: String,
}

#[derive(Debug, serde::Deserialize)]
struct TranslateResponse {
    #[serde(default)]
    error_code: Option<serde_json::Value>,
    #[serde(default)]
    error_msg: Option<String>,
    #[serde(default)]
    trans_result: Vec<TranslatedSegment>,
}

/// Request signature: lowercase hex `md5(appid + q + salt + secret)`.
pub fn sign(app_id: &str, query: &str, salt: u32, secret_key: &str) -> String {
    format!(
        "{:x}",
        md5::compute(format!("{app_id}{query}{salt}{secret_key}"))
    )
}

fn make_salt() -> u32 {
    let mut bytes = [0u8; 4];
    let _ = getrandom::fill(&mut bytes);
    SALT_MIN + u32::from_le_bytes(bytes) % (SALT_MAX - SALT_MIN + 1)
}

fn error_code_text(code: &serde_json::Value) -> String {
    match code {
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Extracts the translated segments from a response body, one per
/// non-empty input line.
pub fn parse_segments(body: &str) -> Result<Vec<String>, String> {
    let response: TranslateResponse = serde_json::from_str(body)
        .map_err(|err| format!("Baidu Translate response parse failed: {err}"))?;
    if let Some(code) = response.error_code.as_ref().map(error_code_text) {
        if code != SUCCESS_CODE {
            return Err(format!(
                "Baidu Translate error {}: {}",
                code,
                response.error_msg.as_deref().unwrap_or("unknown error")
            ));
        }
    }
    if response.trans_result.is_empty() {
        return Err("Baidu Translate returned no translation".to_string());
    }
    Ok(response
        .trans_result
        .into_iter()
        .map(|segment| segment.dst)
        .collect())
}

/// Puts the blank lines of `query` back between translated segments. The
/// service skips empty lines, so segments map onto the non-empty ones.
pub fn restore_blank_lines(query: &str, segments: Vec<String>) -> String {
    let content_lines = query.split('\n').filter(|line| !line.trim().is_empty()).count();
    if content_lines != segments.len() {
        return segments.join("\n");
    }
    let mut segments = segments.into_iter();
    query
        .split('\n')
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                segments.next().unwrap_or_default()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Baidu Translate client.
pub struct BaiduTranslator {
    http_client: ureq::Agent,
    app_id: String,
    secret_key: String,
    endpoint: String,
    max_chunk_chars: usize,
    limiter: DirectLimiter,
}

impl BaiduTranslator {
    pub fn new(
        app_id: String,
        secret_key: String,
        endpoint: String,
        timeout: Duration,
        max_chunk_chars: usize,
        requests_per_second: u32,
    ) -> Self {
        let http_client = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(5))
            .timeout_read(timeout)
            .timeout_write(timeout)
            .build();
        let rate = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        Self {
            http_client,
            app_id,
            secret_key,
            endpoint,
            max_chunk_chars,
            limiter: RateLimiter::direct(Quota::per_second(rate)),
        }
    }

    /// Builds the client, reading the secret from the keyring when configured to.
    pub fn from_config(baidu: &BaiduConfig, translation: &TranslationConfig) -> Result<Self, String> {
        let app_id = baidu.app_id.trim().to_string();
        if app_id.is_empty() {
            return Err("app_id and secret_key are required".to_string());
        }
        let secret_key = credential_store::resolve_baidu_secret(&KeyringSecretStore, baidu)?;
        Ok(Self::new(
            app_id,
            secret_key,
            baidu.endpoint.clone(),
            Duration::from_secs(baidu.timeout_secs),
            translation.max_chunk_chars,
            translation.requests_per_second,
        ))
    }

    fn wait_for_rate_limit_slot(&self) {
        while self.limiter.check().is_err() {
            std::thread::sleep(RATE_LIMIT_POLL);
        }
    }

    fn translate_chunk(
        &self,
        chunk: &str,
        source: SourceLanguage,
        target: TargetLanguage,
    ) -> Result<String, String> {
        self.wait_for_rate_limit_slot();
        let salt = make_salt();
        let salt_text = salt.to_string();
        let signature = sign(&self.app_id, chunk, salt, &self.secret_key);
        let response = self
            .http_client
            .post(&self.endpoint)
            .send_form(&[
                ("q", chunk),
                ("from", source.baidu_code()),
                ("to", target.baidu_code()),
                ("appid", self.app_id.as_str()),
                ("salt", salt_text.as_str()),
                ("sign", signature.as_str()),
            ])
            .map_err(|err| format!("Baidu Translate request failed: {err}"))?;
        let body = response
            .into_string()
            .map_err(|err| format!("Baidu Translate response read failed: {err}"))?;
        Ok(restore_blank_lines(chunk, parse_segments(&body)?))
    }
}

impl Translator for BaiduTranslator {
    fn name(&self) -> &str {
        SERVICE_NAME
    }

    fn translate(
        &self,
        text: &str,
        source: SourceLanguage,
        target: TargetLanguage,
        progress: &mut dyn FnMut(i32),
    ) -> Result<String, String> {
        let chunks = split_into_chunks(text, self.max_chunk_chars);
        debug!(
            "Baidu Translate: {} chunk(s), {} -> {}",
            chunks.len(),
            source.baidu_code(),
            target.baidu_code()
        );
        translate_chunks(&chunks, progress, |chunk| {
            self.translate_chunk(chunk, source, target)
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    fn read_form_body(reader: &mut impl BufRead) -> String {
        let mut content_length = 0usize;
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).unwrap_or(0) == 0 || line == "\r\n" {
                break;
            }
            if let Some(value) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
        let mut body = vec![0u8; content_length];
        reader.read_exact(&mut body).expect("read request body");
        String::from_utf8_lossy(&body).into_owned()
    }

    /// Serves one canned JSON body per connection, in order, and returns
    /// the endpoint plus a handle yielding the form bodies received.
    pub(crate) fn serve_json_responses(
        bodies: Vec<&'static str>,
    ) -> (String, JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind test server");
        let address = listener.local_addr().expect("test server address");
        let handle = thread::spawn(move || {
            let mut requests = Vec::new();
            for body in bodies {
                let (mut stream, _) = listener.accept().expect("accept test connection");
                let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
                requests.push(read_form_body(&mut reader));
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                stream
                    .write_all(response.as_bytes())
                    .expect("write test response");
            }
            requests
        });
        (format!("http://{address}/api/trans/vip/translate"), handle)
    }
}
