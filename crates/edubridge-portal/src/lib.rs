//! School portal client contract for edubridge.
//!
//! The HTTP layer never talks to a school system directly. It goes through
//! two traits:
//!
//! - [`PortalConnector`] turns credentials into an authenticated handle
//! - [`PortalSession`] is that handle: every read and write the REST API
//!   exposes is one method on it
//!
//! [`FixturePortal`] implements both on top of an in-memory dataset. It backs
//! offline runs of the server and every test in the workspace.

mod error;
mod fixture;
mod portal;
mod recipient;
mod records;

pub use error::{PortalError, Result};
pub use fixture::{
    Bell, FixtureAccount, FixturePortal, ForeignTimetable, MissingTeachersDay, PortalFixture,
    SentMessage, TimetableChangesDay,
};
pub use portal::{Credentials, PortalConnector, PortalSession, SharedPortalSession};
pub use recipient::{Recipient, RecipientKind};
pub use records::{
    ChangeAction, CloudFile, EventType, Grade, Lesson, Lunch, Menu, NextRinging, RingingKind,
    Student, Teacher, TimelineEvent, Timetable, TimetableChange,
};
