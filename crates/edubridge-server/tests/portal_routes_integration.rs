//! Integration tests for the portal-backed routes.

mod common;

use anyhow::Result;
use chrono::NaiveDate;
use serde_json::{Value, json};

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 9, 16).unwrap()
}

#[tokio::test]
async fn test_timetable_for_day() -> Result<()> {
    let server = common::TestServer::start().await?;
    let token = server.login().await?;

    let resp = server
        .get("/timetable?date=2024-09-16", &token)
        .send()
        .await?;
    assert_eq!(resp.status().as_u16(), 200);

    let timetable: Value = resp.json().await?;
    assert_eq!(timetable["date"], "2024-09-16");
    let lessons = timetable["lessons"].as_array().unwrap();
    assert_eq!(lessons.len(), 3);
    assert_eq!(lessons[0]["subject"], "Mathematics");
    assert_eq!(lessons[0]["start_time"], "08:00:00");

    Ok(())
}

#[tokio::test]
async fn test_timetable_without_lessons_is_null() -> Result<()> {
    let server = common::TestServer::start().await?;
    let token = server.login().await?;

    let resp = server
        .get("/timetable?date=2024-09-21", &token)
        .send()
        .await?;
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await?;
    assert!(body.is_null());

    Ok(())
}

#[tokio::test]
async fn test_timetable_requires_date() -> Result<()> {
    let server = common::TestServer::start().await?;
    let token = server.login().await?;

    let resp = server.get("/timetable", &token).send().await?;
    assert_eq!(resp.status().as_u16(), 400);

    Ok(())
}

#[tokio::test]
async fn test_people_lists() -> Result<()> {
    let server = common::TestServer::start().await?;
    let token = server.login().await?;

    let students: Value = server.get("/students", &token).send().await?.json().await?;
    let students = students.as_array().unwrap();
    assert_eq!(students.len(), 4);
    assert_eq!(students[0]["person_id"], 1001);
    assert_eq!(students[0]["name"], "Ada Lovelace");

    let teachers: Value = server.get("/teachers", &token).send().await?.json().await?;
    assert_eq!(teachers.as_array().unwrap().len(), 3);

    Ok(())
}

#[tokio::test]
async fn test_missing_teachers() -> Result<()> {
    let server = common::TestServer::start().await?;
    let token = server.login().await?;

    let absent: Value = server
        .get("/missing-teachers?date=2024-09-16", &token)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(absent, json!([{
        "person_id": 2003,
        "name": "Emmy Noether",
        "classroom_name": null
    }]));

    // Nobody missing is an empty array, not null.
    let absent: Value = server
        .get("/missing-teachers?date=2024-09-17", &token)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(absent, json!([]));

    Ok(())
}

#[tokio::test]
async fn test_timetable_changes() -> Result<()> {
    let server = common::TestServer::start().await?;
    let token = server.login().await?;

    let changes: Value = server
        .get("/timetable-changes?date=2024-09-16", &token)
        .send()
        .await?
        .json()
        .await?;
    let changes = changes.as_array().unwrap();
    assert_eq!(changes.len(), 2);
    assert_eq!(changes[1]["action"], "deletion");

    Ok(())
}

#[tokio::test]
async fn test_foreign_timetable() -> Result<()> {
    let server = common::TestServer::start().await?;
    let token = server.login().await?;

    let resp = server
        .get("/foreign-timetable?id=2002&date=2024-09-16", &token)
        .send()
        .await?;
    assert_eq!(resp.status().as_u16(), 200);
    let timetable: Value = resp.json().await?;
    assert_eq!(timetable["lessons"].as_array().unwrap().len(), 2);

    let resp = server
        .get("/foreign-timetable?id=9999&date=2024-09-16", &token)
        .send()
        .await?;
    assert_eq!(resp.status().as_u16(), 404);
    let body: Value = resp.json().await?;
    assert_eq!(body["code"], "not_found");
    assert!(body["message"].as_str().unwrap().contains("9999"));

    Ok(())
}

#[tokio::test]
async fn test_next_ringing() -> Result<()> {
    let server = common::TestServer::start().await?;
    let token = server.login().await?;

    let ringing: Value = server
        .get("/next-ringing?datetime=2024-09-16T08:10:00", &token)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(ringing, json!({ "type": "break", "time": "2024-09-16T08:45:00" }));

    Ok(())
}

#[tokio::test]
async fn test_school_year_is_plain_integer() -> Result<()> {
    let server = common::TestServer::start().await?;
    let token = server.login().await?;

    let body = server.get("/school-year", &token).send().await?.text().await?;
    assert_eq!(body, "2024");

    Ok(())
}

#[tokio::test]
async fn test_grades() -> Result<()> {
    let server = common::TestServer::start().await?;
    let token = server.login().await?;

    let grades: Value = server.get("/grades", &token).send().await?.json().await?;
    let grades = grades.as_array().unwrap();
    assert_eq!(grades.len(), 2);
    assert_eq!(grades[0]["subject_name"], "Mathematics");

    Ok(())
}

#[tokio::test]
async fn test_send_message() -> Result<()> {
    let server = common::TestServer::start().await?;
    let token = server.login().await?;

    let resp = server
        .post("/message", &token)
        .json(&json!({ "recipients": [1002, 2001], "body": "See you at the lab" }))
        .send()
        .await?;
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await?;
    assert_eq!(body, json!({ "response": "OK" }));

    let sent = server.portal.sent_messages().await;
    assert_eq!(sent.len(), 1);
    let ids: Vec<String> = sent[0].recipients.iter().map(|r| r.portal_id()).collect();
    assert_eq!(ids, vec!["Student-1002", "Teacher-2001"]);
    assert_eq!(sent[0].body, "See you at the lab");

    Ok(())
}

#[tokio::test]
async fn test_message_with_unknown_recipient_sends_nothing() -> Result<()> {
    let server = common::TestServer::start().await?;
    let token = server.login().await?;

    let resp = server
        .post("/message", &token)
        .json(&json!({ "recipients": [1001, 5, 2001], "body": "Hello" }))
        .send()
        .await?;
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = resp.json().await?;
    assert_eq!(body["code"], "invalid_recipient");

    assert!(server.portal.sent_messages().await.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_message_guard_failure_sends_nothing() -> Result<()> {
    let server = common::TestServer::start().await?;
    let token = server.login().await?;
    server.portal.log_out(common::USERNAME).await;

    let resp = server
        .post("/message", &token)
        .json(&json!({ "recipients": [1001], "body": "Hello" }))
        .send()
        .await?;
    assert_eq!(resp.status().as_u16(), 400);
    assert!(server.portal.sent_messages().await.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_lunch_lifecycle() -> Result<()> {
    let server = common::TestServer::start().await?;
    let token = server.login().await?;
    let day = NaiveDate::from_ymd_opt(2024, 9, 17).unwrap();

    let lunch: Value = server
        .get("/lunches?date=2024-09-17", &token)
        .send()
        .await?
        .json()
        .await?;
    assert!(lunch["chosen_menu"].is_null());
    assert_eq!(lunch["menus"].as_array().unwrap().len(), 2);

    let resp = server
        .post("/lunches", &token)
        .json(&json!({ "date": "2024-09-17", "choice": 2 }))
        .send()
        .await?;
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(server.portal.lunch(day).await.unwrap().chosen_menu, Some(2));

    let resp = server
        .delete("/lunches?date=2024-09-17", &token)
        .send()
        .await?;
    assert_eq!(resp.status().as_u16(), 200);
    let lunch = server.portal.lunch(day).await.unwrap();
    assert!(lunch.signed_off);
    assert_eq!(lunch.chosen_menu, None);

    Ok(())
}

#[tokio::test]
async fn test_lunch_errors() -> Result<()> {
    let server = common::TestServer::start().await?;
    let token = server.login().await?;

    let resp = server
        .post("/lunches", &token)
        .json(&json!({ "date": "2024-09-16", "choice": 7 }))
        .send()
        .await?;
    assert_eq!(resp.status().as_u16(), 400);

    let resp = server
        .delete("/lunches?date=2024-12-25", &token)
        .send()
        .await?;
    assert_eq!(resp.status().as_u16(), 404);

    let resp = server
        .get("/lunches?date=2024-12-25", &token)
        .send()
        .await?;
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await?;
    assert!(body.is_null());

    assert_eq!(
        server.portal.lunch(monday()).await.unwrap().chosen_menu,
        Some(1)
    );

    Ok(())
}

#[tokio::test]
async fn test_cloud_upload() -> Result<()> {
    let server = common::TestServer::start().await?;
    let token = server.login().await?;

    let form = reqwest::multipart::Form::new().part(
        "file",
        reqwest::multipart::Part::bytes(b"hello world".to_vec()).file_name("notes.txt"),
    );
    let resp = server
        .post("/cloud-upload", &token)
        .multipart(form)
        .send()
        .await?;
    assert_eq!(resp.status().as_u16(), 200);

    let file: Value = resp.json().await?;
    assert_eq!(file["name"], "notes.txt");
    assert_eq!(file["extension"], "txt");
    assert_eq!(file["size"], 11);
    assert_eq!(server.portal.uploads().await.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_cloud_upload_without_file() -> Result<()> {
    let server = common::TestServer::start().await?;
    let token = server.login().await?;

    let form = reqwest::multipart::Form::new().text("comment", "forgot the file");
    let resp = server
        .post("/cloud-upload", &token)
        .multipart(form)
        .send()
        .await?;
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = resp.json().await?;
    assert_eq!(body["code"], "no_file");
    assert_eq!(body["message"], "No file sent!");

    let resp = server.post("/cloud-upload", &token).send().await?;
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = resp.json().await?;
    assert_eq!(body["code"], "no_file");

    assert!(server.portal.uploads().await.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_cloud_upload_too_large() -> Result<()> {
    let server = common::TestServer::start_with(edubridge_portal::PortalFixture::sample()?, |c| {
        c.with_max_upload_size(1024)
    })
    .await?;
    let token = server.login().await?;

    let form = reqwest::multipart::Form::new().part(
        "file",
        reqwest::multipart::Part::bytes(vec![b'x'; 8 * 1024]).file_name("big.bin"),
    );
    let resp = server
        .post("/cloud-upload", &token)
        .multipart(form)
        .send()
        .await?;
    assert_eq!(resp.status().as_u16(), 413);
    assert!(server.portal.uploads().await.is_empty());

    Ok(())
}
