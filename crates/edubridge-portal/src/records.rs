//! Records returned by the school portal.
//!
//! These mirror what the portal hands back. The server serialises them
//! as-is, so field names here are the JSON field names clients see.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Timetable
// ─────────────────────────────────────────────────────────────────────────────

/// One lesson in a day's timetable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    /// Period number within the day, if the school numbers them.
    pub period: Option<u32>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub subject: Option<String>,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub teachers: Vec<String>,
    #[serde(default)]
    pub classrooms: Vec<String>,
    pub online_lesson_link: Option<String>,
}

/// A day's timetable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timetable {
    pub date: NaiveDate,
    pub lessons: Vec<Lesson>,
}

/// Kind of edit in a substitution notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeAction {
    Addition,
    Deletion,
    Change,
}

/// One entry in the day's substitution notice board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimetableChange {
    /// Class the change applies to.
    pub change_class: String,
    /// Affected period.
    pub lesson_n: u32,
    pub title: String,
    pub action: ChangeAction,
}

/// Whether the next bell starts a lesson or a break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RingingKind {
    Lesson,
    Break,
}

/// The next bell after a given moment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextRinging {
    #[serde(rename = "type")]
    pub kind: RingingKind,
    pub time: NaiveDateTime,
}

// ─────────────────────────────────────────────────────────────────────────────
// People
// ─────────────────────────────────────────────────────────────────────────────

/// A student as listed in the school directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub person_id: i64,
    pub name: String,
    pub class_id: Option<i64>,
    pub number_in_class: Option<u32>,
}

/// A teacher as listed in the school directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    pub person_id: i64,
    pub name: String,
    pub classroom_name: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Lunches
// ─────────────────────────────────────────────────────────────────────────────

/// One selectable menu on a lunch day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Menu {
    /// Number used when choosing this menu.
    pub number: u32,
    pub name: String,
    pub allergens: Option<String>,
    pub weight: Option<String>,
}

/// The canteen offer for one day, together with the account's order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lunch {
    pub date: NaiveDate,
    pub title: String,
    pub served_from: Option<NaiveDateTime>,
    pub served_to: Option<NaiveDateTime>,
    /// Orders can no longer be changed after this moment.
    pub can_be_changed_until: Option<NaiveDateTime>,
    pub menus: Vec<Menu>,
    /// Menu number currently ordered.
    #[serde(default)]
    pub chosen_menu: Option<u32>,
    #[serde(default)]
    pub signed_off: bool,
}

impl Lunch {
    /// Look up a menu by its number.
    pub fn menu(&self, number: u32) -> Option<&Menu> {
        self.menus.iter().find(|m| m.number == number)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Timeline, grades, cloud
// ─────────────────────────────────────────────────────────────────────────────

/// Category of a timeline entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Message,
    Homework,
    Grade,
    News,
    Substitution,
    Other,
}

/// One entry of the notification feed, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub event_id: i64,
    pub timestamp: NaiveDateTime,
    pub event_type: EventType,
    pub text: String,
    pub author: Option<String>,
    pub recipient: Option<String>,
}

/// A grade entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grade {
    pub event_id: i64,
    pub title: String,
    /// Grade as written by the teacher ("1", "A", "12/15").
    pub grade: Option<String>,
    pub subject_id: i64,
    pub subject_name: String,
    pub teacher: Option<String>,
    pub date: NaiveDateTime,
    pub max_points: Option<f64>,
    pub importance: f64,
    pub percent: Option<f64>,
    pub comment: Option<String>,
    #[serde(default)]
    pub verbal: bool,
}

/// A file stored in the portal's cloud after upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudFile {
    pub cloud_id: String,
    pub name: String,
    pub extension: String,
    pub file_type: String,
    pub size: usize,
    pub url: String,
}
