use crate::config::AppConfig;
use crate::diary::{http::HttpDiary, DiaryProvider};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub diary: Arc<dyn DiaryProvider>,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let diary = Arc::new(HttpDiary::new(
            &config.diary_base_url,
            Duration::from_secs(config.diary_timeout_secs),
        )?) as Arc<dyn DiaryProvider>;

        Ok(Self::from_parts(config, diary))
    }

    pub fn from_parts(config: Arc<AppConfig>, diary: Arc<dyn DiaryProvider>) -> Self {
        Self { config, diary }
    }

    #[cfg(test)]
    pub fn fake(diary: crate::diary::fake::FakeDiary) -> Self {
        let config = Arc::new(AppConfig {
            diary_base_url: "http://diary.test".into(),
            diary_timeout_secs: 5,
            max_range_days: 31,
            fetch: crate::config::FetchConfig::default(),
        });
        Self::from_parts(config, Arc::new(diary) as Arc<dyn DiaryProvider>)
    }
}
