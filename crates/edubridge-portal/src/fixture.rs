//! In-memory portal backed by a fixture dataset.
//!
//! The dataset is plain JSON (see `fixtures/sample.json`). Writes such as
//! lunch orders, sent messages and uploads are kept in memory for the
//! lifetime of the [`FixturePortal`] and can be inspected afterwards.

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::error::{PortalError, Result};
use crate::portal::{Credentials, PortalConnector, PortalSession, SharedPortalSession};
use crate::recipient::Recipient;
use crate::records::{
    CloudFile, Grade, Lunch, NextRinging, RingingKind, Student, Teacher, TimelineEvent, Timetable,
    TimetableChange,
};

const SAMPLE_FIXTURE: &str = include_str!("../fixtures/sample.json");

// ─────────────────────────────────────────────────────────────────────────────
// Dataset
// ─────────────────────────────────────────────────────────────────────────────

/// A login accepted by the fixture portal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureAccount {
    pub username: String,
    pub password: String,
    pub subdomain: String,
}

/// Timetable of someone other than the logged-in account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignTimetable {
    pub person_id: i64,
    pub timetable: Timetable,
}

/// Absent teachers on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingTeachersDay {
    pub date: NaiveDate,
    pub teacher_ids: Vec<i64>,
}

/// Substitution notices for one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimetableChangesDay {
    pub date: NaiveDate,
    pub changes: Vec<TimetableChange>,
}

/// One lesson slot in the daily bell schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bell {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// Everything the fixture portal knows about one school.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalFixture {
    pub accounts: Vec<FixtureAccount>,
    pub school_year: i32,
    pub students: Vec<Student>,
    pub teachers: Vec<Teacher>,
    pub timetables: Vec<Timetable>,
    pub foreign_timetables: Vec<ForeignTimetable>,
    pub lunches: Vec<Lunch>,
    /// Notification feed, newest first.
    pub timeline: Vec<TimelineEvent>,
    pub grades: Vec<Grade>,
    pub missing_teachers: Vec<MissingTeachersDay>,
    pub timetable_changes: Vec<TimetableChangesDay>,
    pub bells: Vec<Bell>,
}

impl PortalFixture {
    /// Parse a dataset from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| PortalError::Fixture(e.to_string()))
    }

    /// Load a dataset from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            PortalError::Fixture(format!("failed to read '{}': {}", path.display(), e))
        })?;
        Self::from_json(&contents)
    }

    /// The built-in demo school.
    pub fn sample() -> Result<Self> {
        Self::from_json(SAMPLE_FIXTURE)
    }

    /// Add an accepted login.
    pub fn with_account(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
        subdomain: impl Into<String>,
    ) -> Self {
        self.accounts.push(FixtureAccount {
            username: username.into(),
            password: password.into(),
            subdomain: subdomain.into(),
        });
        self
    }

    /// Replace the notification feed.
    pub fn with_timeline(mut self, timeline: Vec<TimelineEvent>) -> Self {
        self.timeline = timeline;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Portal
// ─────────────────────────────────────────────────────────────────────────────

/// A message accepted by the fixture portal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub sender: String,
    pub recipients: Vec<Recipient>,
    pub body: String,
}

/// Mutable portal-side state.
#[derive(Debug, Default)]
struct PortalState {
    lunches: Vec<Lunch>,
    outbox: Vec<SentMessage>,
    uploads: Vec<CloudFile>,
}

struct Shared {
    fixture: PortalFixture,
    state: RwLock<PortalState>,
    sessions: Mutex<Vec<Weak<FixtureSession>>>,
    login_checks: AtomicUsize,
}

/// In-memory [`PortalConnector`].
///
/// Cloning yields another handle to the same portal.
#[derive(Clone)]
pub struct FixturePortal {
    shared: Arc<Shared>,
}

impl FixturePortal {
    /// Create a portal serving the given dataset.
    pub fn new(fixture: PortalFixture) -> Self {
        let state = PortalState {
            lunches: fixture.lunches.clone(),
            ..Default::default()
        };

        Self {
            shared: Arc::new(Shared {
                fixture,
                state: RwLock::new(state),
                sessions: Mutex::new(Vec::new()),
                login_checks: AtomicUsize::new(0),
            }),
        }
    }

    /// The dataset this portal was created from.
    pub fn fixture(&self) -> &PortalFixture {
        &self.shared.fixture
    }

    /// Messages sent so far, oldest first.
    pub async fn sent_messages(&self) -> Vec<SentMessage> {
        self.shared.state.read().await.outbox.clone()
    }

    /// Files uploaded so far, oldest first.
    pub async fn uploads(&self) -> Vec<CloudFile> {
        self.shared.state.read().await.uploads.clone()
    }

    /// Current lunch offer and order for a day.
    pub async fn lunch(&self, date: NaiveDate) -> Option<Lunch> {
        let state = self.shared.state.read().await;
        state.lunches.iter().find(|l| l.date == date).cloned()
    }

    /// Log out every live handle of `username` on the portal side.
    ///
    /// Returns the number of handles affected.
    pub async fn log_out(&self, username: &str) -> usize {
        let mut sessions = self.shared.sessions.lock().await;
        sessions.retain(|s| s.strong_count() > 0);

        let mut count = 0;
        for session in sessions.iter().filter_map(Weak::upgrade) {
            if session.username == username && session.logged_in.swap(false, Ordering::SeqCst) {
                count += 1;
            }
        }

        info!(username = %username, count, "Fixture portal logged out handles");
        count
    }

    /// How many times any handle was asked whether it is logged in.
    pub fn login_check_count(&self) -> usize {
        self.shared.login_checks.load(Ordering::SeqCst)
    }

    async fn open_session(&self, account: &FixtureAccount) -> SharedPortalSession {
        let session = Arc::new(FixtureSession {
            username: account.username.clone(),
            logged_in: AtomicBool::new(true),
            shared: Arc::clone(&self.shared),
        });

        let mut sessions = self.shared.sessions.lock().await;
        sessions.retain(|s| s.strong_count() > 0);
        sessions.push(Arc::downgrade(&session));

        debug!(username = %account.username, school = %account.subdomain, "Fixture login");
        session
    }
}

#[async_trait]
impl PortalConnector for FixturePortal {
    async fn login(&self, credentials: &Credentials) -> Result<SharedPortalSession> {
        let account = self
            .shared
            .fixture
            .accounts
            .iter()
            .find(|a| {
                a.username == credentials.username
                    && a.password == credentials.password
                    && a.subdomain.eq_ignore_ascii_case(&credentials.subdomain)
            })
            .ok_or(PortalError::BadCredentials)?;

        Ok(self.open_session(account).await)
    }

    async fn login_auto(&self, username: &str, password: &str) -> Result<SharedPortalSession> {
        let account = self
            .shared
            .fixture
            .accounts
            .iter()
            .find(|a| a.username == username && a.password == password)
            .ok_or(PortalError::BadCredentials)?;

        Ok(self.open_session(account).await)
    }

    fn name(&self) -> &str {
        "fixture"
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────────────────────────────────────

/// Handle returned by [`FixturePortal`] logins.
struct FixtureSession {
    username: String,
    logged_in: AtomicBool,
    shared: Arc<Shared>,
}

impl FixtureSession {
    fn data(&self) -> Result<&PortalFixture> {
        if self.logged_in.load(Ordering::SeqCst) {
            Ok(&self.shared.fixture)
        } else {
            Err(PortalError::NotLoggedIn)
        }
    }
}

#[async_trait]
impl PortalSession for FixtureSession {
    fn is_logged_in(&self) -> bool {
        self.shared.login_checks.fetch_add(1, Ordering::SeqCst);
        self.logged_in.load(Ordering::SeqCst)
    }

    async fn get_timetable(&self, date: NaiveDate) -> Result<Option<Timetable>> {
        let data = self.data()?;
        Ok(data.timetables.iter().find(|t| t.date == date).cloned())
    }

    async fn get_all_students(&self) -> Result<Vec<Student>> {
        Ok(self.data()?.students.clone())
    }

    async fn get_teachers(&self) -> Result<Vec<Teacher>> {
        Ok(self.data()?.teachers.clone())
    }

    async fn send_message(&self, recipients: &[Recipient], body: &str) -> Result<()> {
        self.data()?;
        if recipients.is_empty() {
            return Err(PortalError::InvalidRequest(
                "a message needs at least one recipient".to_string(),
            ));
        }

        let message = SentMessage {
            sender: self.username.clone(),
            recipients: recipients.to_vec(),
            body: body.to_string(),
        };
        self.shared.state.write().await.outbox.push(message);
        Ok(())
    }

    async fn get_lunches(&self, date: NaiveDate) -> Result<Option<Lunch>> {
        self.data()?;
        let state = self.shared.state.read().await;
        Ok(state.lunches.iter().find(|l| l.date == date).cloned())
    }

    async fn choose_lunch(&self, date: NaiveDate, number: u32) -> Result<()> {
        self.data()?;
        let mut state = self.shared.state.write().await;
        let lunch = state
            .lunches
            .iter_mut()
            .find(|l| l.date == date)
            .ok_or_else(|| PortalError::MissingData(format!("No lunch is served on {}", date)))?;

        if lunch.menu(number).is_none() {
            return Err(PortalError::InvalidRequest(format!(
                "menu {} is not offered on {}",
                number, date
            )));
        }

        lunch.chosen_menu = Some(number);
        lunch.signed_off = false;
        Ok(())
    }

    async fn sign_off_lunch(&self, date: NaiveDate) -> Result<()> {
        self.data()?;
        let mut state = self.shared.state.write().await;
        let lunch = state
            .lunches
            .iter_mut()
            .find(|l| l.date == date)
            .ok_or_else(|| PortalError::MissingData(format!("No lunch is served on {}", date)))?;

        lunch.chosen_menu = None;
        lunch.signed_off = true;
        Ok(())
    }

    async fn get_notifications(&self) -> Result<Vec<TimelineEvent>> {
        Ok(self.data()?.timeline.clone())
    }

    async fn cloud_upload(&self, file_name: &str, contents: Vec<u8>) -> Result<CloudFile> {
        self.data()?;
        if contents.is_empty() {
            return Err(PortalError::InvalidRequest("cannot upload an empty file".to_string()));
        }

        let extension = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let cloud_id = uuid::Uuid::new_v4().simple().to_string();

        let file = CloudFile {
            url: format!("/cloud/{}/{}", cloud_id, file_name),
            cloud_id,
            name: file_name.to_string(),
            file_type: file_type_for(&extension).to_string(),
            extension,
            size: contents.len(),
        };

        self.shared.state.write().await.uploads.push(file.clone());
        Ok(file)
    }

    async fn get_grades(&self) -> Result<Vec<Grade>> {
        Ok(self.data()?.grades.clone())
    }

    async fn get_missing_teachers(&self, date: NaiveDate) -> Result<Vec<Teacher>> {
        let data = self.data()?;
        let Some(day) = data.missing_teachers.iter().find(|d| d.date == date) else {
            return Ok(Vec::new());
        };

        Ok(day
            .teacher_ids
            .iter()
            .filter_map(|id| data.teachers.iter().find(|t| t.person_id == *id))
            .cloned()
            .collect())
    }

    async fn get_timetable_changes(&self, date: NaiveDate) -> Result<Vec<TimetableChange>> {
        let data = self.data()?;
        Ok(data
            .timetable_changes
            .iter()
            .find(|d| d.date == date)
            .map(|d| d.changes.clone())
            .unwrap_or_default())
    }

    async fn get_school_year(&self) -> Result<i32> {
        Ok(self.data()?.school_year)
    }

    async fn get_foreign_timetable(&self, person_id: i64, date: NaiveDate) -> Result<Timetable> {
        let data = self.data()?;
        data.foreign_timetables
            .iter()
            .find(|f| f.person_id == person_id && f.timetable.date == date)
            .map(|f| f.timetable.clone())
            .ok_or_else(|| {
                PortalError::MissingData(format!(
                    "Timetable for person {} on {} is not available",
                    person_id, date
                ))
            })
    }

    async fn get_next_ringing_time(&self, after: NaiveDateTime) -> Result<NextRinging> {
        let data = self.data()?;
        next_ringing(&data.bells, after)
            .ok_or_else(|| PortalError::MissingData("The school has no bell schedule".to_string()))
    }
}

fn file_type_for(extension: &str) -> &'static str {
    match extension {
        "pdf" | "doc" | "docx" | "odt" | "txt" => "document",
        "png" | "jpg" | "jpeg" | "gif" | "webp" => "image",
        _ => "file",
    }
}

fn is_school_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// First bell strictly after `after`: a lesson start (kind `Lesson`) or a
/// lesson end (kind `Break`). Rolls over to the next school day's first bell.
fn next_ringing(bells: &[Bell], after: NaiveDateTime) -> Option<NextRinging> {
    let mut bells = bells.to_vec();
    bells.sort_by_key(|b| b.start);
    let first = *bells.first()?;

    let date = after.date();
    let time = after.time();

    if is_school_day(date) {
        for bell in &bells {
            if time < bell.start {
                return Some(NextRinging {
                    kind: RingingKind::Lesson,
                    time: date.and_time(bell.start),
                });
            }
            if time < bell.end {
                return Some(NextRinging {
                    kind: RingingKind::Break,
                    time: date.and_time(bell.end),
                });
            }
        }
    }

    let mut next = date.succ_opt()?;
    while !is_school_day(next) {
        next = next.succ_opt()?;
    }

    Some(NextRinging {
        kind: RingingKind::Lesson,
        time: next.and_time(first.start),
    })
}
