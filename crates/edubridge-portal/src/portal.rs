//! Portal traits.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

use crate::error::Result;
use crate::recipient::Recipient;
use crate::records::{
    CloudFile, Grade, Lunch, NextRinging, Student, Teacher, TimelineEvent, Timetable,
    TimetableChange,
};

/// Login credentials for a specific school.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    /// School subdomain on the portal (e.g. `myschool` for `myschool.portal.example`).
    pub subdomain: String,
}

/// Entry point to a school portal: turns credentials into a logged-in handle.
#[async_trait]
pub trait PortalConnector: Send + Sync {
    /// Log in to the school named by `credentials.subdomain`.
    async fn login(&self, credentials: &Credentials) -> Result<SharedPortalSession>;

    /// Log in without knowing the school; the portal discovers it from the account.
    async fn login_auto(&self, username: &str, password: &str) -> Result<SharedPortalSession>;

    /// Backend name for logs.
    fn name(&self) -> &str;
}

/// An authenticated portal handle.
///
/// Handles can be logged out by the portal at any time, independently of
/// how long the caller keeps them; check [`PortalSession::is_logged_in`]
/// before use.
#[async_trait]
pub trait PortalSession: Send + Sync {
    /// Whether the portal still considers this handle logged in.
    fn is_logged_in(&self) -> bool;

    /// The account's own timetable for a day, if it has one.
    async fn get_timetable(&self, date: NaiveDate) -> Result<Option<Timetable>>;

    async fn get_all_students(&self) -> Result<Vec<Student>>;

    async fn get_teachers(&self) -> Result<Vec<Teacher>>;

    /// Send one message to all recipients.
    async fn send_message(&self, recipients: &[Recipient], body: &str) -> Result<()>;

    /// Canteen offer and current order for a day.
    async fn get_lunches(&self, date: NaiveDate) -> Result<Option<Lunch>>;

    /// Order menu `number` for a day.
    async fn choose_lunch(&self, date: NaiveDate, number: u32) -> Result<()>;

    /// Cancel the lunch order for a day.
    async fn sign_off_lunch(&self, date: NaiveDate) -> Result<()>;

    /// The notification feed, newest first.
    async fn get_notifications(&self) -> Result<Vec<TimelineEvent>>;

    async fn cloud_upload(&self, file_name: &str, contents: Vec<u8>) -> Result<CloudFile>;

    async fn get_grades(&self) -> Result<Vec<Grade>>;

    /// Teachers absent on a day.
    async fn get_missing_teachers(&self, date: NaiveDate) -> Result<Vec<Teacher>>;

    async fn get_timetable_changes(&self, date: NaiveDate) -> Result<Vec<TimetableChange>>;

    /// Starting calendar year of the current school year.
    async fn get_school_year(&self) -> Result<i32>;

    /// Timetable of another student or teacher.
    ///
    /// Fails with [`crate::PortalError::MissingData`] when the portal has none.
    async fn get_foreign_timetable(&self, person_id: i64, date: NaiveDate) -> Result<Timetable>;

    /// The first bell strictly after `after`.
    async fn get_next_ringing_time(&self, after: NaiveDateTime) -> Result<NextRinging>;
}

/// A portal handle that can be shared across tasks.
pub type SharedPortalSession = Arc<dyn PortalSession>;
