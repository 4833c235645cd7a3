use chrono::Utc;
use log::{error, info, warn};

use crate::{
    db::PollStore,
    error::{add_error, FormErrors, PollError, NON_FIELD_ERRORS},
    models::{
        poll_api_model::{LoginForm, SignupForm},
        poll_model::User,
    },
};

pub const MAX_USERNAME_LENGTH: usize = 150;
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const LOGIN_FAILED: &str = "Please enter a correct username and password. Note that both fields may be case-sensitive.";

const COMMON_PASSWORDS: &[&str] = &[
    "password", "password1", "password123", "12345678", "123456789", "1234567890",
    "qwerty123", "qwertyuiop", "iloveyou", "sunshine", "princess", "football",
    "baseball", "welcome1", "admin123", "letmein1", "trustno1", "abc12345",
    "passw0rd", "11111111", "00000000", "monkey123", "dragon123", "superman",
];

fn valid_username_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_')
}

fn check_password_strength(errors: &mut FormErrors, username: &str, password: &str) {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        add_error(
            errors,
            "password2",
            &format!(
                "This password is too short. It must contain at least {} characters.",
                MIN_PASSWORD_LENGTH
            ),
        );
    }
    if password.chars().all(|c| c.is_ascii_digit()) {
        add_error(errors, "password2", "This password is entirely numeric.");
    }
    let username = username.to_lowercase();
    let lowered = password.to_lowercase();
    if username.chars().count() >= 3 && (lowered.contains(&username) || username.contains(&lowered)) {
        add_error(errors, "password2", "The password is too similar to the username.");
    }
    if COMMON_PASSWORDS.contains(&lowered.as_str()) {
        add_error(errors, "password2", "This password is too common.");
    }
}

/// Field checks that need no store access.
pub fn validate_signup(form: &SignupForm) -> FormErrors {
    let mut errors = FormErrors::new();
    let username = form.username.trim();

    if username.is_empty() {
        add_error(&mut errors, "username", "This field is required.");
    } else if username.chars().count() > MAX_USERNAME_LENGTH {
        add_error(
            &mut errors,
            "username",
            &format!("Ensure this value has at most {} characters.", MAX_USERNAME_LENGTH),
        );
    } else if !username.chars().all(valid_username_char) {
        add_error(
            &mut errors,
            "username",
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        );
    }

    if form.password1.is_empty() {
        add_error(&mut errors, "password1", "This field is required.");
    }
    if form.password2.is_empty() {
        add_error(&mut errors, "password2", "This field is required.");
    }
    if !form.password1.is_empty() && !form.password2.is_empty() {
        if form.password1 != form.password2 {
            add_error(&mut errors, "password2", "The two password fields didn't match.");
        } else {
            check_password_strength(&mut errors, username, &form.password2);
        }
    }
    errors
}

pub fn new_user(username: &str, password: &str, is_staff: bool, bcrypt_cost: u32) -> Result<User, PollError> {
    let password_hash = bcrypt::hash(password, bcrypt_cost).map_err(|e| {
        error!("Error hashing password {}", e);
        anyhow::Error::new(e)
    })?;
    Ok(User {
        id: nanoid::nanoid!(),
        username: username.to_string(),
        password_hash,
        is_staff,
        date_joined: Utc::now(),
    })
}

pub async fn signup(store: &dyn PollStore, form: &SignupForm, bcrypt_cost: u32) -> Result<User, PollError> {
    let mut errors = validate_signup(form);
    let username = form.username.trim();
    if !errors.contains_key("username") && store.find_user_by_username(username).await?.is_some() {
        add_error(&mut errors, "username", "A user with that username already exists.");
    }
    if !errors.is_empty() {
        return Err(PollError::Validation(errors));
    }

    let user = new_user(username, &form.password1, false, bcrypt_cost)?;
    if !store.insert_user(user.clone()).await? {
        add_error(&mut errors, "username", "A user with that username already exists.");
        return Err(PollError::Validation(errors));
    }
    info!("New user signed up: {}", user.username);
    Ok(user)
}

pub async fn login(store: &dyn PollStore, form: &LoginForm) -> Result<User, PollError> {
    let mut errors = FormErrors::new();
    if form.username.is_empty() {
        add_error(&mut errors, "username", "This field is required.");
    }
    if form.password.is_empty() {
        add_error(&mut errors, "password", "This field is required.");
    }
    if !errors.is_empty() {
        return Err(PollError::Validation(errors));
    }

    if let Some(user) = store.find_user_by_username(&form.username).await? {
        match bcrypt::verify(&form.password, &user.password_hash) {
            Ok(true) => return Ok(user),
            Ok(false) => {}
            Err(e) => error!("Error verifying password of {} {}", user.username, e),
        }
    }
    warn!("Failed login for {}", form.username);
    add_error(&mut errors, NON_FIELD_ERRORS, LOGIN_FAILED);
    Err(PollError::Validation(errors))
}

/// Creates the configured staff account unless the username already exists.
pub async fn ensure_admin(
    store: &dyn PollStore,
    username: &str,
    password: &str,
    bcrypt_cost: u32,
) -> Result<bool, PollError> {
    if store.find_user_by_username(username).await?.is_some() {
        return Ok(false);
    }
    let admin = new_user(username, password, true, bcrypt_cost)?;
    let created = store.insert_user(admin).await?;
    if created {
        info!("Created staff account {}", username);
    }
    Ok(created)
}
