use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::Result;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

/// Typed configuration, built once at startup and shared by reference.
///
/// Core logic never reads the process environment directly; everything it
/// needs is a field here.
#[derive(Clone, Debug)]
pub struct Config {
    // Storage
    pub seen_path: PathBuf,

    // Fetch behavior
    pub source_timeout: Duration,
    pub http_timeout: Duration,
    pub user_agent: String,
    pub accept_language: String,

    // Renderer (thorough strategy)
    pub chrome_path: Option<PathBuf>,
    pub render_nav_timeout: Duration,
    pub render_ready_timeout: Duration,
    pub render_scroll_steps: u32,
    pub render_scroll_pause: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let data_dir = env_path("DATA_DIR").unwrap_or_else(|| PathBuf::from("data"));
        fs::create_dir_all(&data_dir)?;
        let seen_path = env_path("SEEN_FILE").unwrap_or_else(|| data_dir.join("seen.json"));

        // Per-source budget inside the orchestrator; the HTTP timeout below is
        // the direct-GET budget and may be larger (a slow quick fetch is still
        // cut off by the orchestrator).
        let source_timeout = Duration::from_secs(env_u64("SOURCE_TIMEOUT_SECS").unwrap_or(8));
        let http_timeout = Duration::from_secs(env_u64("HTTP_TIMEOUT_SECS").unwrap_or(25));

        let user_agent = env_str("USER_AGENT")
            .and_then(non_empty)
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        let accept_language = env_str("ACCEPT_LANGUAGE")
            .and_then(non_empty)
            .unwrap_or_else(|| "ru-RU,ru;q=0.9".to_string());

        // None lets the renderer crate discover a system Chrome/Chromium.
        let chrome_path = env_path("CHROME_PATH");
        let render_nav_timeout =
            Duration::from_millis(env_u64("RENDER_NAV_TIMEOUT_MS").unwrap_or(30_000));
        let render_ready_timeout =
            Duration::from_millis(env_u64("RENDER_READY_TIMEOUT_MS").unwrap_or(5_000));
        let render_scroll_steps = env_u32("RENDER_SCROLL_STEPS").unwrap_or(6);
        let render_scroll_pause =
            Duration::from_millis(env_u64("RENDER_SCROLL_PAUSE_MS").unwrap_or(400));

        Ok(Self {
            seen_path,
            source_timeout,
            http_timeout,
            user_agent,
            accept_language,
            chrome_path,
            render_nav_timeout,
            render_ready_timeout,
            render_scroll_steps,
            render_scroll_pause,
        })
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn env_u32(key: &str) -> Option<u32> {
    env_str(key).and_then(|s| s.trim().parse::<u32>().ok())
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var_os(key).map(PathBuf::from)
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
