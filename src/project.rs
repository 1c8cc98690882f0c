//! A project on the build service: its latest record, the derived
//! per-platform [`Compilations`], and a bounded wait for builds to finish.
//!
//! Transport is abstracted behind [`ProjectApi`] and time behind [`Clock`],
//! so the polling loop runs identically against a live service and in tests.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::compilation::{Compilation, Compilations, ProjectSnapshot};
use crate::config::ConfigDocument;
use crate::error::CocoonError;
use crate::platform::Platform;

/// Time between two refreshes while waiting.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Longest total wait before giving up.
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(60 * 60);

// ═══════════════════════════════════════════════════════════════════════════════
//  Seams
// ═══════════════════════════════════════════════════════════════════════════════

/// Requests the tracker makes against the build service.
pub trait ProjectApi {
    fn fetch_project_snapshot(
        &self,
        project_id: &str,
    ) -> impl Future<Output = Result<ProjectSnapshot, CocoonError>>;

    fn fetch_config_text(&self, project_id: &str) -> impl Future<Output = Result<String, CocoonError>>;

    fn store_config_text(
        &self,
        project_id: &str,
        text: &str,
    ) -> impl Future<Output = Result<(), CocoonError>>;
}

/// Source of time for the polling loop.
pub trait Clock {
    fn now(&self) -> Instant;

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()>;
}

/// [`Clock`] backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> {
        tokio::time::sleep(duration)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Poll options
// ═══════════════════════════════════════════════════════════════════════════════

/// Settings for [`Project::refresh_until_completed`].
#[derive(Debug, Clone)]
pub struct PollOptions {
    pub interval: Duration,
    pub max_wait: Duration,
    cancel: Option<Arc<AtomicBool>>,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self { interval: DEFAULT_POLL_INTERVAL, max_wait: DEFAULT_MAX_WAIT, cancel: None }
    }
}

impl PollOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }

    /// Stop the wait with [`CocoonError::Cancelled`] once `flag` is set.
    /// The flag is checked before every refresh.
    pub fn cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|f| f.load(Ordering::Relaxed))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Project
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct Project {
    snapshot: ProjectSnapshot,
    compilations: Compilations,
}

impl Project {
    pub fn from_snapshot(snapshot: ProjectSnapshot) -> Self {
        let compilations = Compilations::from_snapshot(&snapshot);
        Self { snapshot, compilations }
    }

    /// Load a project by id.
    pub async fn fetch<A: ProjectApi>(api: &A, project_id: &str) -> Result<Self, CocoonError> {
        let snapshot = api.fetch_project_snapshot(project_id).await?;
        Ok(Self::from_snapshot(snapshot))
    }

    pub fn id(&self) -> &str {
        &self.snapshot.id
    }

    pub fn snapshot(&self) -> &ProjectSnapshot {
        &self.snapshot
    }

    pub fn compilations(&self) -> &Compilations {
        &self.compilations
    }

    pub fn compilation(&self, platform: Platform) -> Option<&Compilation> {
        self.compilations.get(platform)
    }

    pub fn is_compiling(&self) -> bool {
        self.compilations.is_compiling()
    }

    pub fn is_ready(&self, platform: Platform) -> bool {
        self.compilations.is_ready(platform)
    }

    /// Replace the record with a fresh copy from the service.  On error the
    /// previous state is kept.
    pub async fn refresh<A: ProjectApi>(&mut self, api: &A) -> Result<(), CocoonError> {
        let snapshot = api.fetch_project_snapshot(&self.snapshot.id).await?;
        self.compilations = Compilations::from_snapshot(&snapshot);
        self.snapshot = snapshot;
        Ok(())
    }

    /// Download and parse the project's `config.xml`.
    pub async fn fetch_config<A: ProjectApi>(&self, api: &A) -> Result<ConfigDocument, CocoonError> {
        let text = api.fetch_config_text(self.id()).await?;
        ConfigDocument::parse(&text)
    }

    /// Upload `config` as the project's `config.xml`.
    pub async fn store_config<A: ProjectApi>(
        &self,
        api: &A,
        config: &ConfigDocument,
    ) -> Result<(), CocoonError> {
        if config.is_errored() {
            return Err(CocoonError::ErroredDocument);
        }
        api.store_config_text(self.id(), &config.xml()).await
    }

    /// Refresh every `interval` until no platform is compiling.
    ///
    /// `on_tick` is called with `false` after each refresh that still finds
    /// a build in progress and once with `true` when all are done.  Stops
    /// with [`CocoonError::Timeout`] when builds are still running at
    /// `max_wait` after the start, or with the first refresh error.
    pub async fn refresh_until_completed<A, C, F>(
        &mut self,
        api: &A,
        clock: &C,
        options: &PollOptions,
        mut on_tick: F,
    ) -> Result<(), CocoonError>
    where
        A: ProjectApi,
        C: Clock,
        F: FnMut(bool),
    {
        let started = clock.now();
        let deadline = started + options.max_wait;

        loop {
            if options.is_cancelled() {
                info!("stopped waiting for project {}", self.id());
                return Err(CocoonError::Cancelled);
            }

            self.refresh(api).await?;

            if !self.is_compiling() {
                debug!("project {} finished compiling", self.id());
                on_tick(true);
                return Ok(());
            }

            let now = clock.now();
            if now >= deadline {
                let waited = now.duration_since(started);
                warn!("project {} still compiling after {waited:?}", self.id());
                return Err(CocoonError::Timeout { waited });
            }

            debug!("project {} still compiling, next check in {:?}", self.id(), options.interval);
            on_tick(false);
            clock.sleep(options.interval).await;
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;

    use super::*;
    use crate::compilation::Status;

    // ── Fakes ────────────────────────────────────────────────────────────

    struct ManualClock {
        now: Cell<Instant>,
    }

    impl ManualClock {
        fn new() -> Self {
            Self { now: Cell::new(Instant::now()) }
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            self.now.get()
        }

        fn sleep(&self, duration: Duration) -> impl Future<Output = ()> {
            self.now.set(self.now.get() + duration);
            std::future::ready(())
        }
    }

    /// Replays scripted responses; the last one repeats forever.
    struct FakeApi {
        responses: RefCell<VecDeque<Result<ProjectSnapshot, String>>>,
        calls: Cell<usize>,
        stored: RefCell<Option<String>>,
        config: String,
    }

    impl FakeApi {
        fn new(responses: Vec<Result<ProjectSnapshot, String>>) -> Self {
            Self {
                responses: RefCell::new(responses.into()),
                calls: Cell::new(0),
                stored: RefCell::new(None),
                config: r#"<widget id="com.example.p"><name>P</name></widget>"#.to_string(),
            }
        }
    }

    impl ProjectApi for FakeApi {
        async fn fetch_project_snapshot(&self, _project_id: &str) -> Result<ProjectSnapshot, CocoonError> {
            self.calls.set(self.calls.get() + 1);
            let mut responses = self.responses.borrow_mut();
            let next = if responses.len() > 1 { responses.pop_front() } else { responses.front().cloned() };
            match next {
                Some(Ok(snapshot)) => Ok(snapshot),
                Some(Err(message)) => Err(CocoonError::api(message)),
                None => Err(CocoonError::api("no response scripted")),
            }
        }

        async fn fetch_config_text(&self, _project_id: &str) -> Result<String, CocoonError> {
            Ok(self.config.clone())
        }

        async fn store_config_text(&self, _project_id: &str, text: &str) -> Result<(), CocoonError> {
            *self.stored.borrow_mut() = Some(text.to_string());
            Ok(())
        }
    }

    fn record(ios: Status) -> ProjectSnapshot {
        let mut snapshot = ProjectSnapshot { id: "p1".into(), ..Default::default() };
        snapshot.status.insert("ios".into(), ios.as_str().into());
        snapshot
    }

    fn options() -> PollOptions {
        PollOptions::new()
            .interval(Duration::from_secs(10))
            .max_wait(Duration::from_secs(60))
    }

    // ── Facade ───────────────────────────────────────────────────────────

    #[tokio::test]
    async fn fetch_and_refresh() {
        let api = FakeApi::new(vec![Ok(record(Status::Compiling)), Ok(record(Status::Completed))]);
        let mut project = Project::fetch(&api, "p1").await.unwrap();
        assert_eq!(project.id(), "p1");
        assert!(project.is_compiling());
        assert!(!project.is_ready(Platform::Ios));

        project.refresh(&api).await.unwrap();
        assert!(!project.is_compiling());
        assert!(project.is_ready(Platform::Ios));
        assert_eq!(project.compilation(Platform::Ios).unwrap().status(), Status::Completed);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_state() {
        let api = FakeApi::new(vec![Ok(record(Status::Completed)), Err("offline".into())]);
        let mut project = Project::fetch(&api, "p1").await.unwrap();
        let err = project.refresh(&api).await.unwrap_err();
        assert!(matches!(err, CocoonError::Api(ref m) if m == "offline"));
        assert!(project.is_ready(Platform::Ios));
    }

    #[tokio::test]
    async fn config_round_trip() {
        let api = FakeApi::new(vec![Ok(record(Status::Created))]);
        let project = Project::fetch(&api, "p1").await.unwrap();
        let mut config = project.fetch_config(&api).await.unwrap();
        assert_eq!(config.get_name(), "P");

        config.set_name("Renamed");
        project.store_config(&api, &config).await.unwrap();
        let stored = api.stored.borrow().clone().unwrap();
        assert!(stored.contains("<name>Renamed</name>"));
    }

    #[tokio::test]
    async fn errored_config_is_not_stored() {
        let api = FakeApi::new(vec![Ok(record(Status::Created))]);
        let project = Project::fetch(&api, "p1").await.unwrap();
        let config = ConfigDocument::new("<broken");
        let err = project.store_config(&api, &config).await.unwrap_err();
        assert!(matches!(err, CocoonError::ErroredDocument));
        assert!(api.stored.borrow().is_none());
    }

    // ── Polling ──────────────────────────────────────────────────────────

    #[tokio::test]
    async fn poll_until_done() {
        let api = FakeApi::new(vec![
            Ok(record(Status::Waiting)),
            Ok(record(Status::Compiling)),
            Ok(record(Status::Completed)),
        ]);
        let clock = ManualClock::new();
        let mut project = Project::from_snapshot(record(Status::Waiting));
        let mut ticks = Vec::new();

        project
            .refresh_until_completed(&api, &clock, &options(), |done| ticks.push(done))
            .await
            .unwrap();

        assert_eq!(ticks, [false, false, true]);
        assert_eq!(api.calls.get(), 3);
        assert!(project.is_ready(Platform::Ios));
    }

    #[tokio::test]
    async fn poll_done_immediately() {
        let api = FakeApi::new(vec![Ok(record(Status::Completed))]);
        let clock = ManualClock::new();
        let start = clock.now();
        let mut project = Project::from_snapshot(record(Status::Compiling));
        let mut ticks = Vec::new();

        project
            .refresh_until_completed(&api, &clock, &options(), |done| ticks.push(done))
            .await
            .unwrap();

        assert_eq!(ticks, [true]);
        assert_eq!(clock.now(), start);
    }

    #[tokio::test]
    async fn poll_times_out() {
        let api = FakeApi::new(vec![Ok(record(Status::Compiling))]);
        let clock = ManualClock::new();
        let mut project = Project::from_snapshot(record(Status::Compiling));
        let mut ticks = Vec::new();

        let err = project
            .refresh_until_completed(&api, &clock, &options(), |done| ticks.push(done))
            .await
            .unwrap_err();

        assert!(matches!(err, CocoonError::Timeout { waited } if waited == Duration::from_secs(60)));
        // Refreshes at 0, 10, .., 60 seconds.
        assert_eq!(api.calls.get(), 7);
        assert_eq!(ticks, [false; 6]);
    }

    #[tokio::test]
    async fn poll_stops_on_refresh_error() {
        let api = FakeApi::new(vec![Ok(record(Status::Compiling)), Err("500".into())]);
        let clock = ManualClock::new();
        let mut project = Project::from_snapshot(record(Status::Compiling));
        let mut ticks = Vec::new();

        let err = project
            .refresh_until_completed(&api, &clock, &options(), |done| ticks.push(done))
            .await
            .unwrap_err();

        assert!(matches!(err, CocoonError::Api(_)));
        assert_eq!(api.calls.get(), 2);
        assert_eq!(ticks, [false]);
    }

    #[tokio::test]
    async fn poll_cancelled() {
        let api = FakeApi::new(vec![Ok(record(Status::Compiling))]);
        let clock = ManualClock::new();
        let flag = Arc::new(AtomicBool::new(false));
        let opts = options().cancel_flag(flag.clone());
        let mut project = Project::from_snapshot(record(Status::Compiling));

        let err = project
            .refresh_until_completed(&api, &clock, &opts, |_| flag.store(true, Ordering::Relaxed))
            .await
            .unwrap_err();

        assert!(matches!(err, CocoonError::Cancelled));
        assert_eq!(api.calls.get(), 1);
    }

    #[tokio::test]
    async fn poll_with_tokio_clock() {
        let api = FakeApi::new(vec![Ok(record(Status::Compiling)), Ok(record(Status::Completed))]);
        let mut project = Project::from_snapshot(record(Status::Compiling));
        let opts = PollOptions::new().interval(Duration::from_millis(1));
        let mut done = false;

        project
            .refresh_until_completed(&api, &TokioClock, &opts, |d| done = d)
            .await
            .unwrap();

        assert!(done);
    }

    #[test]
    fn default_options() {
        let opts = PollOptions::default();
        assert_eq!(opts.interval, DEFAULT_POLL_INTERVAL);
        assert_eq!(opts.max_wait, DEFAULT_MAX_WAIT);
        assert!(!opts.is_cancelled());
    }
}
