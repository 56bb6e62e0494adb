pub const SONAR_HOST_ENV: &str = "SONAR_HOST";
pub const SONAR_TOKEN_ENV: &str = "SONAR_TOKEN";
pub const SONAR_USER_ENV: &str = "SONAR_USER";
pub const SONAR_PASSWORD_ENV: &str = "SONAR_PASSWORD";
pub const SONAR_PROJECT_KEY_ENV: &str = "SONAR_PROJECT_KEY";
pub const SONAR_PROJECT_NAME_ENV: &str = "SONAR_PROJECT_NAME";
pub const READY_ATTEMPTS_ENV: &str = "SONARPIPE_READY_ATTEMPTS";
pub const READY_INTERVAL_SECS_ENV: &str = "SONARPIPE_READY_INTERVAL_SECS";
pub const HTTP_TIMEOUT_MS_ENV: &str = "SONARPIPE_HTTP_TIMEOUT_MS";

/// Source of environment values. Production passes a closure over
/// `std::env::var`; tests pass fixed tables so they never mutate global state.
pub(super) trait EnvLookup {
    fn raw(&self, name: &str) -> Option<String>;

    fn non_empty(&self, name: &str) -> Option<String> {
        self.raw(name)
            .map(|raw| raw.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn u32_at_least(&self, name: &str, min_value: u32) -> Option<u32> {
        self.raw(name)
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .filter(|value| *value >= min_value)
    }

    fn u64_value(&self, name: &str) -> Option<u64> {
        self.raw(name).and_then(|raw| raw.trim().parse::<u64>().ok())
    }
}

impl<F> EnvLookup for F
where
    F: Fn(&str) -> Option<String>,
{
    fn raw(&self, name: &str) -> Option<String> {
        self(name)
    }
}
