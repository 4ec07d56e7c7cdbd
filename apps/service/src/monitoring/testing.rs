use std::collections::HashMap;
use std::time::Duration;

use super::checker::{CheckError, Checker};

#[derive(Default)]
struct Script {
    failure: Option<CheckError>,
    delay: Duration,
}

/// Checker with per-url canned behaviour; unscripted urls answer 200 at once.
#[derive(Default)]
pub struct ScriptedChecker {
    scripts: HashMap<String, Script>,
}

impl ScriptedChecker {
    pub fn all_up() -> Self {
        Self::default()
    }

    pub fn with_failure(mut self, url: &str, error: CheckError) -> Self {
        self.scripts.entry(url.to_string()).or_default().failure = Some(error);
        self
    }

    pub fn with_delay(mut self, url: &str, delay: Duration) -> Self {
        self.scripts.entry(url.to_string()).or_default().delay = delay;
        self
    }
}

#[async_trait::async_trait]
impl Checker for ScriptedChecker {
    async fn check(&self, url: &str) -> Result<u16, CheckError> {
        let Some(script) = self.scripts.get(url) else {
            return Ok(200);
        };

        if !script.delay.is_zero() {
            tokio::time::sleep(script.delay).await;
        }

        match &script.failure {
            Some(error) => Err(error.clone()),
            None => Ok(200),
        }
    }
}
