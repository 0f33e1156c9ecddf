//! In-memory diary used by tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use time::Date;

use super::{DayRecord, DiaryError, DiaryProvider, DiarySession, EntryRecord, MealRecord, WeightSample};
use crate::auth::Credentials;

#[derive(Default)]
struct Inner {
    days: BTreeMap<Date, DayRecord>,
    weights: Vec<WeightSample>,
    failing_days: HashSet<Date>,
    unauthorized_days: HashSet<Date>,
    flaky_days: Mutex<HashMap<Date, usize>>,
    weights_fail: bool,
    day_calls: AtomicUsize,
}

#[derive(Clone)]
pub struct FakeDiary {
    username: String,
    password: String,
    inner: Arc<Inner>,
}

impl FakeDiary {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            inner: Arc::new(Inner::default()),
        }
    }

    fn inner_mut(&mut self) -> &mut Inner {
        Arc::get_mut(&mut self.inner).expect("configure FakeDiary before sharing it")
    }

    pub fn with_day(mut self, day: DayRecord) -> Self {
        self.inner_mut().days.insert(day.date, day);
        self
    }

    pub fn with_weight(mut self, date: Date, value: f64) -> Self {
        self.inner_mut().weights.push(WeightSample { date, value });
        self
    }

    pub fn failing_on(mut self, date: Date) -> Self {
        self.inner_mut().failing_days.insert(date);
        self
    }

    /// The session is rejected when this day is requested.
    pub fn unauthorized_on(mut self, date: Date) -> Self {
        self.inner_mut().unauthorized_days.insert(date);
        self
    }

    /// The day fails `times` times before succeeding.
    pub fn flaky_on(mut self, date: Date, times: usize) -> Self {
        self.inner_mut()
            .flaky_days
            .get_mut()
            .expect("flaky lock")
            .insert(date, times);
        self
    }

    pub fn failing_weights(mut self) -> Self {
        self.inner_mut().weights_fail = true;
        self
    }

    pub fn day_calls(&self) -> usize {
        self.inner.day_calls.load(Ordering::SeqCst)
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

pub fn entry(name: &str, totals: &[(&str, f64)]) -> EntryRecord {
    EntryRecord {
        name: name.into(),
        totals: totals.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
    }
}

pub fn meal(name: &str, entries: Vec<EntryRecord>) -> MealRecord {
    MealRecord {
        name: name.into(),
        entries,
    }
}

pub fn day(date: Date, meals: Vec<MealRecord>) -> DayRecord {
    DayRecord { date, meals }
}

#[async_trait]
impl DiaryProvider for FakeDiary {
    async fn connect(&self, credentials: &Credentials) -> Result<Box<dyn DiarySession>, DiaryError> {
        if credentials.username != self.username || credentials.password != self.password {
            return Err(DiaryError::Unauthorized);
        }
        Ok(Box::new(FakeSession {
            inner: self.inner.clone(),
        }))
    }
}

struct FakeSession {
    inner: Arc<Inner>,
}

#[async_trait]
impl DiarySession for FakeSession {
    async fn day(&self, date: Date) -> Result<DayRecord, DiaryError> {
        self.inner.day_calls.fetch_add(1, Ordering::SeqCst);
        if self.inner.unauthorized_days.contains(&date) {
            return Err(DiaryError::Unauthorized);
        }
        if self.inner.failing_days.contains(&date) {
            return Err(DiaryError::Unavailable("connection reset".into()));
        }
        {
            let mut flaky = self.inner.flaky_days.lock().expect("flaky lock");
            if let Some(left) = flaky.get_mut(&date) {
                if *left > 0 {
                    *left -= 1;
                    return Err(DiaryError::Unavailable("temporarily unavailable".into()));
                }
            }
        }
        Ok(self
            .inner
            .days
            .get(&date)
            .cloned()
            .unwrap_or_else(|| DayRecord { date, meals: Vec::new() }))
    }

    async fn weights(&self, _start: Date, _end: Date) -> Result<Vec<WeightSample>, DiaryError> {
        if self.inner.weights_fail {
            return Err(DiaryError::Unavailable("measurements offline".into()));
        }
        Ok(self.inner.weights.clone())
    }
}
