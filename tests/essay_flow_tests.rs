// tests/essay_flow_tests.rs

mod common;

use common::{ESSAY_ID, ESSAY_PASSWORD, REGISTRATION_NUMBER, spawn_app};
use serde_json::{Value, json};

#[tokio::test]
async fn essay_runs_from_gate_to_completed() {
    let app = spawn_app().await;
    let token = app.signed_in_session().await;

    let view: Value = app
        .get(&token, &format!("/modules/{}", ESSAY_ID))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(view["moduleType"], "Essay");

    app.unlock(&token, ESSAY_ID, ESSAY_PASSWORD).await;

    let guidelines: Value = app
        .get(&token, &format!("/guidelines/{}", ESSAY_ID))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(guidelines["timeLimitLabel"], "No time limit");

    app.post(&token, &format!("/guidelines/{}/accept", ESSAY_ID), json!({}))
        .await;

    let assignment: Value = app
        .get(&token, &format!("/assignment/{}", ESSAY_ID))
        .await
        .json()
        .await
        .unwrap();
    assert!(assignment["questions"][0].get("answer").is_none());
    assert!(assignment["questions"][0].get("options").is_none());

    let response = app
        .put(
            &token,
            &format!("/assignment/{}/answers/0", ESSAY_ID),
            json!({ "answer": "Safety comes first." }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);

    app.post(&token, &format!("/assignment/{}/review", ESSAY_ID), json!({}))
        .await;
    let dialog: Value = app
        .post(&token, &format!("/submission/{}/initiate", ESSAY_ID), json!({}))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(
        dialog["prompt"],
        "Are you sure you want to submit your essay? This action cannot be undone."
    );

    let body: Value = app
        .post(&token, &format!("/submission/{}/confirm", ESSAY_ID), json!({}))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["message"], "Essay submitted successfully!");

    let submitted = app.upstream.bodies(&format!("/essay/submit/{}", ESSAY_ID));
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0]["assignmentId"], ESSAY_ID);
    assert_eq!(submitted[0]["registrationNumber"], REGISTRATION_NUMBER);
    assert_eq!(
        submitted[0]["answers"],
        json!([
            { "questionId": "e1", "modelAnswer": "Model answer one", "studentAnswer": "Safety comes first." },
            { "questionId": "e2", "modelAnswer": "Model answer two", "studentAnswer": "" }
        ])
    );

    let score: Value = app
        .get(&token, &format!("/score/{}", ESSAY_ID))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(score["percentage"], 50);
    assert_eq!(score["message"], "Thanks for completing the assessment!");

    let body: Value = app
        .post(&token, &format!("/score/{}/continue", ESSAY_ID), json!({}))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["message"], "Loading feedback...");
    assert_eq!(body["redirect"], format!("/feedback/{}", ESSAY_ID));

    let response = app
        .post(&token, &format!("/feedback/{}", ESSAY_ID), json!({ "feedback": "   " }))
        .await;
    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Please enter some feedback or click 'Skip'");

    let body: Value = app
        .post(&token, &format!("/feedback/{}/skip", ESSAY_ID), json!({}))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["message"], "Moving to completed assignments");
    assert!(app.upstream.bodies("/feedback").is_empty());

    let dashboard: Value = app.get(&token, "/dashboard").await.json().await.unwrap();
    assert_eq!(dashboard["completedCount"], 1);
}

#[tokio::test]
async fn feedback_is_sanitized_before_sending() {
    let app = spawn_app().await;
    let token = app.signed_in_session().await;
    app.unlock(&token, ESSAY_ID, ESSAY_PASSWORD).await;
    app.post(&token, &format!("/guidelines/{}/accept", ESSAY_ID), json!({}))
        .await;
    app.post(&token, &format!("/assignment/{}/review", ESSAY_ID), json!({}))
        .await;
    app.post(&token, &format!("/submission/{}/initiate", ESSAY_ID), json!({}))
        .await;
    app.post(&token, &format!("/submission/{}/confirm", ESSAY_ID), json!({}))
        .await;
    app.post(&token, &format!("/score/{}/continue", ESSAY_ID), json!({}))
        .await;

    let response = app
        .post(
            &token,
            &format!("/feedback/{}", ESSAY_ID),
            json!({ "feedback": "Good<script>alert(1)</script>" }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);

    let sent = app.upstream.bodies("/feedback");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0], json!({ "assignmentId": ESSAY_ID, "feedback": "Good" }));

    let completed: Value = app.get(&token, "/completed").await.json().await.unwrap();
    assert_eq!(completed["completed"][0]["moduleType"], "Essay");
}
