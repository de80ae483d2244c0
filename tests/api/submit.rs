use crate::helpers::{assert_is_redirect_to, spawn_app, spawn_app_with, valid_form, with, without};

/// Asserts that every message shows up in `html_page`, in the given order.
fn assert_errors_in_order(html_page: &str, messages: &[&str]) {
    let mut previous = 0;
    for message in messages {
        let item = format!("<li>{message}</li>");
        let position = html_page[previous..]
            .find(&item)
            .unwrap_or_else(|| panic!("`{message}` is missing or out of order."));
        previous += position + item.len();
    }
}

#[tokio::test]
async fn a_valid_registration_is_stored_and_redirects_to_success() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app.post_submit(&valid_form("Ursula")).await;

    // Assert
    assert_is_redirect_to(&response, "/success");
    let stored = app.stored_submissions();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, 1);
    assert_eq!(stored[0].registration.first_name, "Ursula");
    assert_eq!(stored[0].registration.email, "ursula_le_guin@gmail.com");
    assert!(stored[0].registration.can_attend);
    assert!(!stored[0].registration.future_contact);
}

#[tokio::test]
async fn consecutive_registrations_get_consecutive_ids() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let first = app.post_submit(&valid_form("Ann")).await;
    let second = app.post_submit(&valid_form("Bob")).await;

    // Assert
    assert_is_redirect_to(&first, "/success");
    assert_is_redirect_to(&second, "/success");
    let stored = app.stored_submissions();
    assert_eq!(stored.iter().map(|s| s.id).collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(stored[0].registration.first_name, "Ann");
    assert_eq!(stored[1].registration.first_name, "Bob");
}

#[tokio::test]
async fn surrounding_whitespace_is_trimmed_before_storing() {
    // Arrange
    let app = spawn_app().await;
    let form = with(valid_form("Ann"), "firstName", "  Ann  ");
    let form = with(form, "dobYear", " 1985 ");

    // Act
    let response = app.post_submit(&form).await;

    // Assert
    assert_is_redirect_to(&response, "/success");
    let stored = app.stored_submissions();
    assert_eq!(stored[0].registration.first_name, "Ann");
    assert_eq!(stored[0].registration.dob_year, "1985");
}

#[tokio::test]
async fn the_optional_future_contact_answer_is_stored() {
    // Arrange
    let app = spawn_app().await;
    let mut form = valid_form("Ann");
    form.push(("futureContact", "on".into()));

    // Act
    app.post_submit(&form).await;

    // Assert
    assert!(app.stored_submissions()[0].registration.future_contact);
}

#[tokio::test]
async fn an_invalid_registration_is_not_stored_and_redirects_to_the_form() {
    // Arrange
    let app = spawn_app().await;
    let test_cases = vec![
        (without(valid_form("Ann"), &["canAttend"]), "can attend unticked"),
        (without(valid_form("Ann"), &["dataConsent"]), "no consent"),
        (with(valid_form("Ann"), "email", "not-an-email"), "invalid email"),
        (with(valid_form("Ann"), "dobYear", "85"), "two digit year"),
        (with(valid_form("Ann"), "city", "   "), "blank city"),
        (vec![], "empty form"),
    ];

    for (body, description) in test_cases {
        // Act
        let response = app.post_submit(&body).await;

        // Assert
        assert_eq!(
            303,
            response.status().as_u16(),
            "The API did not redirect when the payload was {}.",
            description
        );
        assert_is_redirect_to(&response, "/");
    }
    assert!(app.stored_submissions().is_empty());
}

#[tokio::test]
async fn every_error_is_shown_once_on_the_form() {
    // Arrange
    let app = spawn_app().await;

    // Act - Part 1 - Submit an empty form
    let response = app.post_submit(&[]).await;
    assert_is_redirect_to(&response, "/");

    // Act - Part 2 - Follow the redirect
    let html_page = app.get_registration_form_html().await;
    assert_errors_in_order(
        &html_page,
        &[
            "You must confirm you can attend all dates.",
            "You must confirm you are eligible to attend.",
            "First name is required.",
            "Last name is required.",
            "A valid email address is required.",
            "Phone number is required.",
            "Address line 1 is required.",
            "City is required.",
            "Post code is required.",
            "Gender is required.",
            "Day of birth is required.",
            "Month of birth is required.",
            "Year of birth is required.",
            "Ethnic group is required.",
            "Disability status is required.",
            "NHS satisfaction response is required.",
            "Educational qualification is required.",
            "You must consent to the use of your data.",
        ],
    );

    // Act - Part 3 - Reload the form
    let html_page = app.get_registration_form_html().await;
    assert!(!html_page.contains("First name is required."));
}

#[tokio::test]
async fn errors_from_different_steps_are_shown_together() {
    // Arrange
    let app = spawn_app().await;
    let form = without(valid_form("Ann"), &["canAttend", "isEligible"]);
    let form = with(form, "email", "not-an-email");

    // Act
    let response = app.post_submit(&form).await;
    assert_is_redirect_to(&response, "/");
    let html_page = app.get_registration_form_html().await;

    // Assert
    assert_errors_in_order(
        &html_page,
        &[
            "You must confirm you can attend all dates.",
            "You must confirm you are eligible to attend.",
            "A valid email address is required.",
        ],
    );
    assert!(!html_page.contains("First name is required."));
    assert!(app.stored_submissions().is_empty());
}

#[tokio::test]
async fn concurrent_registrations_get_unique_gap_free_ids() {
    // Arrange
    let app = spawn_app().await;
    let registrations = 10;
    // The clones share the cookie store, hence the session and its token.
    let csrf_token = app.csrf_token().await;

    // Act
    let handles: Vec<_> = (0..registrations)
        .map(|i| {
            let client = app.api_client.clone();
            let url = format!("{}/submit", &app.address);
            let mut form = valid_form(&format!("Participant{i}"));
            form.push(("csrfToken", csrf_token.clone()));
            tokio::spawn(async move {
                client
                    .post(&url)
                    .form(&form)
                    .send()
                    .await
                    .expect("Failed to execute request.")
            })
        })
        .collect();
    for handle in handles {
        let response = handle.await.unwrap();
        assert_is_redirect_to(&response, "/success");
    }

    // Assert
    let stored = app.stored_submissions();
    assert_eq!(
        stored.iter().map(|s| s.id).collect::<Vec<_>>(),
        (1..=registrations).collect::<Vec<u64>>()
    );
}

#[tokio::test]
async fn a_storage_failure_returns_an_opaque_500() {
    // Arrange
    let blocker = tempfile::NamedTempFile::new().unwrap();
    let app = spawn_app_with(|c| {
        // A regular file where the data directory should be.
        c.storage.data_file = blocker.path().join("submissions.json");
    })
    .await;

    // Act
    let response = app.post_submit(&valid_form("Ann")).await;

    // Assert
    assert_eq!(response.status().as_u16(), 500);
    let body = response.text().await.unwrap();
    assert_eq!(body, "Failed to store the registration.");
}

#[tokio::test]
async fn a_storage_failure_in_debug_mode_shows_the_error_chain() {
    // Arrange
    let blocker = tempfile::NamedTempFile::new().unwrap();
    let app = spawn_app_with(|c| {
        c.application.debug = true;
        c.storage.data_file = blocker.path().join("submissions.json");
    })
    .await;

    // Act
    let response = app.post_submit(&valid_form("Ann")).await;

    // Assert
    assert_eq!(response.status().as_u16(), 500);
    let body = response.text().await.unwrap();
    assert!(body.contains("Failed to store the registration."));
    assert!(body.contains("Caused by:"));
    assert!(body.contains("Failed to create the data directory"));
}

#[tokio::test]
async fn a_registration_without_a_csrf_token_is_refused() {
    // Arrange
    let app = spawn_app().await;
    // Render the form first: the session exists and holds a token.
    app.csrf_token().await;

    // Act
    let response = app
        .post_submit_with_csrf_token(&valid_form("Ann"), None)
        .await;

    // Assert
    assert_eq!(response.status().as_u16(), 400);
    assert!(app.stored_submissions().is_empty());
}

#[tokio::test]
async fn a_registration_with_a_mismatched_csrf_token_is_refused() {
    // Arrange
    let app = spawn_app().await;
    let csrf_token = app.csrf_token().await;
    let forged = format!("{}x", &csrf_token[1..]);

    // Act
    let response = app
        .post_submit_with_csrf_token(&valid_form("Ann"), Some(&forged))
        .await;

    // Assert
    assert_eq!(response.status().as_u16(), 400);
    assert!(app.stored_submissions().is_empty());
}

#[tokio::test]
async fn a_registration_from_a_client_that_never_saw_the_form_is_refused() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app
        .post_submit_with_csrf_token(&valid_form("Ann"), Some("a-token-from-somewhere-else"))
        .await;

    // Assert
    assert_eq!(response.status().as_u16(), 400);
    assert!(app.stored_submissions().is_empty());
}

#[tokio::test]
async fn a_registration_with_the_csrf_token_of_its_form_is_accepted() {
    // Arrange
    let app = spawn_app().await;
    let csrf_token = app.csrf_token().await;

    // Act
    let response = app
        .post_submit_with_csrf_token(&valid_form("Ann"), Some(&csrf_token))
        .await;

    // Assert
    assert_is_redirect_to(&response, "/success");
    assert_eq!(app.stored_submissions().len(), 1);
}
