//! API routes.

pub mod auth;
pub mod cloud;
pub mod grades;
pub mod health;
pub mod lunches;
pub mod messages;
pub mod openapi;
pub mod pagination;
pub mod people;
pub mod timeline;
pub mod timetable;

pub use auth::{
    AuthenticateAutoRequest, AuthenticateRequest, TokenResponse, authenticate_auto_handler,
    authenticate_handler, logout_handler,
};
pub use cloud::cloud_upload_handler;
pub use grades::{grades_handler, school_year_handler};
pub use health::health_routes;
pub use lunches::{
    ChooseLunchRequest, choose_lunch_handler, get_lunches_handler, sign_off_lunch_handler,
};
pub use messages::{MessageRequest, resolve_recipients, send_message_handler};
pub use pagination::PageParams;
pub use people::{missing_teachers_handler, students_handler, teachers_handler};
pub use timeline::timeline_handler;
pub use timetable::{
    DateQuery, ForeignTimetableQuery, NextRingingQuery, foreign_timetable_handler,
    next_ringing_handler, timetable_changes_handler, timetable_handler,
};
